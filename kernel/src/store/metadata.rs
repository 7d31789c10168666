// Member Metadata Store Abstraction
//
// Key -> opaque blob storage, independent of scores. Payload encoding
// is the adapter's business; callers see raw bytes.

use super::StoreResult;

pub trait MetadataStore: Send + Sync {
    /// Write `payload` for `id`, replacing any previous value.
    fn put(&self, namespace: &str, id: &str, payload: &[u8]) -> StoreResult<()>;

    /// Read the payload for `id`, or `StoreError::NotFound`.
    fn get(&self, namespace: &str, id: &str) -> StoreResult<Vec<u8>>;
}
