// Ranking Engine
//
// Composes an ordered score store and a metadata store into leaderboard
// operations. Holds no mutable state of its own; every operation is a
// short sequence of store calls and ranks are only valid at the instant
// they are returned.

pub mod page;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::{ConfigError, LeaderboardConfig, LeaderboardName};
use crate::store::{MetadataStore, OrderedScoreStore, StoreError};
use page::PageSize;

/// A ranked member as seen by a caller. Built on read, never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub score: i64,
    /// 1-based rank, or `User::UNRANKED`.
    pub rank: u64,
    pub metadata: Option<Vec<u8>>,
}

impl User {
    /// Rank reported for members that are not on the board.
    pub const UNRANKED: u64 = 0;

    fn ranked(id: impl Into<String>, score: f64, position: u64) -> Self {
        Self {
            id: id.into(),
            score: truncate_score(score),
            rank: position + 1,
            metadata: None,
        }
    }

    fn unranked(id: &str) -> Self {
        Self {
            id: id.to_string(),
            score: 0,
            rank: Self::UNRANKED,
            metadata: None,
        }
    }

    pub fn is_ranked(&self) -> bool {
        self.rank != Self::UNRANKED
    }
}

/// Largest magnitude a score or delta may have. Stores keep scores as
/// `f64`, which holds every integer up to 2^53 exactly.
pub const MAX_EXACT_SCORE: i64 = 1 << 53;

/// Stores keep scores as floats; the leaderboard reports whole numbers.
fn truncate_score(score: f64) -> i64 {
    score.trunc() as i64
}

/// How `get_leaders` assigns ranks to the rows of a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankStrategy {
    /// Rank from the row's position in the range query.
    #[default]
    Positional,

    /// One rank lookup per row. Slower, but reflects moves that happen
    /// after the range query.
    Revalidate,
}

#[derive(Debug, thiserror::Error)]
pub enum LeaderboardError {
    #[error("member `{member}` not found")]
    NotFound { member: String },

    #[error("invalid increment {delta}: delta must be positive")]
    InvalidIncrement { delta: i64 },

    #[error("score {score} is beyond the exact integer range of the store (2^53)")]
    ScoreOutOfRange { score: i64 },

    #[error("backend error: {0}")]
    Backend(#[source] StoreError),
}

impl LeaderboardError {
    pub fn is_backend(&self) -> bool {
        matches!(self, Self::Backend(_))
    }
}

impl From<StoreError> for LeaderboardError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { member, .. } => Self::NotFound { member },
            other => Self::Backend(other),
        }
    }
}

fn check_exact(score: i64) -> Result<(), LeaderboardError> {
    if score.unsigned_abs() > MAX_EXACT_SCORE as u64 {
        return Err(LeaderboardError::ScoreOutOfRange { score });
    }
    Ok(())
}

/// A single named leaderboard over a pair of stores.
pub struct Leaderboard<S, M> {
    scores: S,
    metadata: M,
    board: String,
    namespace: String,
    page_size: PageSize,
    rank_strategy: RankStrategy,
}

impl<S: OrderedScoreStore, M: MetadataStore> Leaderboard<S, M> {
    /// Build a leaderboard. A `page_size` outside the allowed set falls
    /// back to the default.
    pub fn new(scores: S, metadata: M, name: &LeaderboardName, page_size: u64) -> Self {
        let validated = PageSize::or_default(page_size);
        if validated.get() != page_size {
            warn!(
                requested = page_size,
                using = validated.get(),
                "page size not allowed, using default"
            );
        }

        Self {
            scores,
            metadata,
            board: name.key(),
            namespace: name.metadata_namespace(),
            page_size: validated,
            rank_strategy: RankStrategy::default(),
        }
    }

    pub fn from_config(
        scores: S,
        metadata: M,
        config: &LeaderboardConfig,
    ) -> Result<Self, ConfigError> {
        let name = config.name()?;
        Ok(Self::new(scores, metadata, &name, config.page_size)
            .with_rank_strategy(config.rank_strategy))
    }

    pub fn with_rank_strategy(mut self, rank_strategy: RankStrategy) -> Self {
        self.rank_strategy = rank_strategy;
        self
    }

    pub fn board_key(&self) -> &str {
        &self.board
    }

    pub fn page_size(&self) -> PageSize {
        self.page_size
    }

    /// Return the member if present, otherwise insert it with `score`.
    ///
    /// The existence check and the insert are separate store calls: two
    /// concurrent first inserts may both insert, and the last one wins.
    pub fn first_or_insert(&self, id: &str, score: i64) -> Result<User, LeaderboardError> {
        debug!(board = %self.board, member = id, score, "first_or_insert");

        match self.scores.rank(&self.board, id) {
            Ok(position) => {
                let current = self.scores.score(&self.board, id)?;
                return Ok(User::ranked(id, current, position));
            }
            Err(e) if e.is_not_found() => {}
            Err(e) => return Err(LeaderboardError::Backend(e)),
        }

        check_exact(score)?;
        let score = score as f64;
        self.scores.upsert(&self.board, id, score)?;
        let position = self.scores.rank(&self.board, id)?;
        Ok(User::ranked(id, score, position))
    }

    /// Look up a member. Absent members come back unranked with a zero
    /// score; missing metadata comes back as `None`.
    pub fn get_member(&self, id: &str, with_metadata: bool) -> Result<User, LeaderboardError> {
        debug!(board = %self.board, member = id, with_metadata, "get_member");

        let mut user = match self.ranked_member(id)? {
            Some(user) => user,
            None => User::unranked(id),
        };

        if with_metadata {
            user.metadata = match self.metadata.get(&self.namespace, id) {
                Ok(payload) => Some(payload),
                Err(e) if e.is_not_found() => None,
                Err(e) => return Err(LeaderboardError::Backend(e)),
            };
        }

        Ok(user)
    }

    /// Rank then score; `None` if either lookup says the member is gone.
    fn ranked_member(&self, id: &str) -> Result<Option<User>, LeaderboardError> {
        let position = match self.scores.rank(&self.board, id) {
            Ok(position) => position,
            Err(e) if e.is_not_found() => return Ok(None),
            Err(e) => return Err(LeaderboardError::Backend(e)),
        };

        match self.scores.score(&self.board, id) {
            Ok(score) => Ok(Some(User::ranked(id, score, position))),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(LeaderboardError::Backend(e)),
        }
    }

    /// Atomically add a positive `delta` and re-rank. Missing members are
    /// created starting from zero.
    pub fn increment_member_score(&self, id: &str, delta: i64) -> Result<User, LeaderboardError> {
        if delta <= 0 {
            return Err(LeaderboardError::InvalidIncrement { delta });
        }
        check_exact(delta)?;
        debug!(board = %self.board, member = id, delta, "increment_member_score");

        let score = self.scores.increment_by(&self.board, id, delta as f64)?;
        let position = self.scores.rank(&self.board, id)?;
        Ok(User::ranked(id, score, position))
    }

    /// Remove a member's score. Metadata is left in place.
    pub fn remove_member(&self, id: &str) -> Result<bool, LeaderboardError> {
        debug!(board = %self.board, member = id, "remove_member");
        Ok(self.scores.remove(&self.board, id)?)
    }

    pub fn upsert_member_info(&self, id: &str, payload: &[u8]) -> Result<(), LeaderboardError> {
        debug!(namespace = %self.namespace, member = id, bytes = payload.len(), "upsert_member_info");
        Ok(self.metadata.put(&self.namespace, id, payload)?)
    }

    /// Raw metadata for `id`. `LeaderboardError::NotFound` if none was stored.
    pub fn get_member_info(&self, id: &str) -> Result<Vec<u8>, LeaderboardError> {
        debug!(namespace = %self.namespace, member = id, "get_member_info");
        Ok(self.metadata.get(&self.namespace, id)?)
    }

    pub fn total_members(&self) -> Result<u64, LeaderboardError> {
        debug!(board = %self.board, "total_members");
        Ok(self.scores.count(&self.board)?)
    }

    pub fn total_pages(&self) -> Result<u64, LeaderboardError> {
        debug!(board = %self.board, page_size = self.page_size.get(), "total_pages");
        Ok(page::total_pages(self.total_members()?, self.page_size))
    }

    /// One page of members, highest score first, without metadata.
    ///
    /// `page` is clamped into `1..=total_pages`.
    pub fn get_leaders(&self, page: i64) -> Result<Vec<User>, LeaderboardError> {
        let pages = self.total_pages()?;
        let Some(page) = page::clamp_page(page, pages) else {
            return Ok(Vec::new());
        };
        let (start, stop) = page::page_bounds(page, self.page_size);
        debug!(board = %self.board, page, start, stop, "get_leaders");

        let rows = self.scores.range_desc(&self.board, start, stop)?;

        match self.rank_strategy {
            RankStrategy::Positional => Ok(rows
                .into_iter()
                .zip(start..)
                .map(|(row, position)| User::ranked(row.id, row.score, position))
                .collect()),
            RankStrategy::Revalidate => {
                let mut users = Vec::with_capacity(rows.len());
                for row in rows {
                    match self.scores.rank(&self.board, &row.id) {
                        Ok(position) => users.push(User::ranked(row.id, row.score, position)),
                        // removed since the range query
                        Err(e) if e.is_not_found() => continue,
                        Err(e) => return Err(LeaderboardError::Backend(e)),
                    }
                }
                Ok(users)
            }
        }
    }
}
