// In-Memory Store Adapters
//
// HashMap/BTreeSet backed implementations of the store traits, used by
// tests and the CLI. Each primitive runs under a single lock acquisition,
// which gives per-member atomicity for `increment_by`.

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, RwLock};

use crate::store::{MetadataStore, OrderedScoreStore, ScoredMember, StoreError, StoreResult};

/// Position key inside a board: score descending, then id descending.
#[derive(Debug, Clone)]
struct Entry {
    score: f64,
    id: String,
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .score
            .total_cmp(&self.score)
            .then_with(|| other.id.cmp(&self.id))
    }
}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Entry {}

#[derive(Debug, Default)]
struct Board {
    scores: HashMap<String, f64>,
    order: BTreeSet<Entry>,
}

impl Board {
    fn set(&mut self, id: &str, score: f64) {
        if let Some(previous) = self.scores.insert(id.to_string(), score) {
            self.order.remove(&Entry {
                score: previous,
                id: id.to_string(),
            });
        }
        self.order.insert(Entry {
            score,
            id: id.to_string(),
        });
    }

    fn position(&self, id: &str) -> Option<u64> {
        let score = *self.scores.get(id)?;
        let entry = Entry {
            score,
            id: id.to_string(),
        };
        Some(self.order.range(..entry).count() as u64)
    }
}

fn check_score(score: f64) -> StoreResult<f64> {
    if score.is_nan() {
        return Err(StoreError::Backend("score is not a number".into()));
    }
    Ok(score)
}

/// In-memory ordered score store.
///
/// Clone-friendly via Arc; clones share the same boards.
#[derive(Clone, Default)]
pub struct InMemoryScoreStore {
    boards: Arc<RwLock<HashMap<String, Board>>>,
}

impl InMemoryScoreStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl OrderedScoreStore for InMemoryScoreStore {
    fn upsert(&self, board: &str, id: &str, score: f64) -> StoreResult<()> {
        let score = check_score(score)?;
        let mut boards = self
            .boards
            .write()
            .map_err(|_| StoreError::Unavailable("lock poisoned".into()))?;

        boards.entry(board.to_string()).or_default().set(id, score);
        Ok(())
    }

    fn increment_by(&self, board: &str, id: &str, delta: f64) -> StoreResult<f64> {
        let delta = check_score(delta)?;
        let mut boards = self
            .boards
            .write()
            .map_err(|_| StoreError::Unavailable("lock poisoned".into()))?;

        let board = boards.entry(board.to_string()).or_default();
        let current = board.scores.get(id).copied().unwrap_or(0.0);
        let next = check_score(current + delta)?;
        board.set(id, next);
        Ok(next)
    }

    fn rank(&self, board: &str, id: &str) -> StoreResult<u64> {
        let boards = self
            .boards
            .read()
            .map_err(|_| StoreError::Unavailable("lock poisoned".into()))?;

        boards
            .get(board)
            .and_then(|b| b.position(id))
            .ok_or_else(|| StoreError::not_found(board, id))
    }

    fn score(&self, board: &str, id: &str) -> StoreResult<f64> {
        let boards = self
            .boards
            .read()
            .map_err(|_| StoreError::Unavailable("lock poisoned".into()))?;

        boards
            .get(board)
            .and_then(|b| b.scores.get(id).copied())
            .ok_or_else(|| StoreError::not_found(board, id))
    }

    fn count(&self, board: &str) -> StoreResult<u64> {
        let boards = self
            .boards
            .read()
            .map_err(|_| StoreError::Unavailable("lock poisoned".into()))?;

        Ok(boards.get(board).map(|b| b.scores.len() as u64).unwrap_or(0))
    }

    fn range_desc(&self, board: &str, start: u64, stop: u64) -> StoreResult<Vec<ScoredMember>> {
        let boards = self
            .boards
            .read()
            .map_err(|_| StoreError::Unavailable("lock poisoned".into()))?;

        let Some(board) = boards.get(board) else {
            return Ok(Vec::new());
        };
        if stop < start {
            return Ok(Vec::new());
        }

        let take = usize::try_from(stop - start)
            .map(|n| n.saturating_add(1))
            .unwrap_or(usize::MAX);
        let skip = usize::try_from(start).unwrap_or(usize::MAX);

        Ok(board
            .order
            .iter()
            .skip(skip)
            .take(take)
            .map(|e| ScoredMember {
                id: e.id.clone(),
                score: e.score,
            })
            .collect())
    }

    fn remove(&self, board: &str, id: &str) -> StoreResult<bool> {
        let mut boards = self
            .boards
            .write()
            .map_err(|_| StoreError::Unavailable("lock poisoned".into()))?;

        let Some(board) = boards.get_mut(board) else {
            return Ok(false);
        };
        match board.scores.remove(id) {
            Some(score) => {
                board.order.remove(&Entry {
                    score,
                    id: id.to_string(),
                });
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// In-memory metadata store.
///
/// Entries are grouped per namespace, so namespaces never share keys.
/// Payloads are kept as given.
#[derive(Clone, Default)]
pub struct InMemoryMetadataStore {
    namespaces: Arc<RwLock<HashMap<String, HashMap<String, Vec<u8>>>>>,
}

impl InMemoryMetadataStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MetadataStore for InMemoryMetadataStore {
    fn put(&self, namespace: &str, id: &str, payload: &[u8]) -> StoreResult<()> {
        let mut namespaces = self
            .namespaces
            .write()
            .map_err(|_| StoreError::Unavailable("lock poisoned".into()))?;

        namespaces
            .entry(namespace.to_string())
            .or_default()
            .insert(id.to_string(), payload.to_vec());
        Ok(())
    }

    fn get(&self, namespace: &str, id: &str) -> StoreResult<Vec<u8>> {
        let namespaces = self
            .namespaces
            .read()
            .map_err(|_| StoreError::Unavailable("lock poisoned".into()))?;

        namespaces
            .get(namespace)
            .and_then(|entries| entries.get(id))
            .cloned()
            .ok_or_else(|| StoreError::not_found(namespace, id))
    }
}
