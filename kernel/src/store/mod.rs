// Backing Store Capabilities
//
// The leaderboard core talks to its storage only through the traits
// defined here. Adapters live under `crate::adapters`.

mod metadata;
mod ordered;

pub use metadata::MetadataStore;
pub use ordered::OrderedScoreStore;

/// One row of a descending range query.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredMember {
    pub id: String,
    pub score: f64,
}

/// Errors surfaced by store adapters.
///
/// `NotFound` is a normal outcome for lookups and is always kept apart
/// from transport and store-side failures.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("member `{member}` not found in `{key}`")]
    NotFound { key: String, member: String },

    /// Timeout, refused connection, poisoned lock and the like.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("store error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn not_found(key: &str, member: &str) -> Self {
        Self::NotFound {
            key: key.to_string(),
            member: member.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
