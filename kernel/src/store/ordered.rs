// Ordered Score Store Abstraction
//
// Defines the contract for a store holding member -> score pairs per
// named leaderboard. Implementations may be Redis sorted sets, an SQL
// table with an index on score, or the in-memory adapter.
//
// This module defines *interfaces only*.

use super::{ScoredMember, StoreResult};

/// Ordered score storage for named leaderboards.
///
/// Properties required from implementations:
/// - One entry per member id per board
/// - `increment_by` is atomic per member
/// - Positions are 0-based, highest score first
///
/// Scores are `f64`, so integers are exact only up to 2^53 in magnitude;
/// the leaderboard rejects inputs beyond that.
///
/// Implementations MUST NOT:
/// - Return a zero score or rank for a missing member
/// - Retry failed operations behind the caller's back
pub trait OrderedScoreStore: Send + Sync {
    /// Insert or overwrite the score of `id`.
    fn upsert(&self, board: &str, id: &str, score: f64) -> StoreResult<()>;

    /// Add `delta` (any sign) to the score of `id` and return the new score.
    ///
    /// A missing member starts from zero.
    fn increment_by(&self, board: &str, id: &str, delta: f64) -> StoreResult<f64>;

    /// 0-based descending position of `id`.
    fn rank(&self, board: &str, id: &str) -> StoreResult<u64>;

    fn score(&self, board: &str, id: &str) -> StoreResult<f64>;

    /// Number of members on the board. Unknown boards count as empty.
    fn count(&self, board: &str) -> StoreResult<u64>;

    /// Members at positions `start..=stop`, highest score first.
    ///
    /// `stop` past the end is clipped; a `start` past the end yields an
    /// empty vec.
    fn range_desc(&self, board: &str, start: u64, stop: u64) -> StoreResult<Vec<ScoredMember>>;

    /// Delete `id`, returning whether it was present.
    fn remove(&self, board: &str, id: &str) -> StoreResult<bool>;
}
