// Operation Script Runner
//
// Replays a list of leaderboard operations and records what each one
// returned. Domain conditions are recorded and the run continues;
// a backend failure stops the run.

use serde::{Deserialize, Serialize};

use crate::ranking::{Leaderboard, LeaderboardError, User};
use crate::store::{MetadataStore, OrderedScoreStore, StoreError};

/// One leaderboard call, as written in a JSON script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    FirstOrInsert {
        id: String,
        score: i64,
    },
    GetMember {
        id: String,
        #[serde(default)]
        with_metadata: bool,
    },
    Increment {
        id: String,
        delta: i64,
    },
    /// Payload is taken as UTF-8 text and stored as its bytes.
    UpsertInfo {
        id: String,
        payload: String,
    },
    GetInfo {
        id: String,
    },
    Remove {
        id: String,
    },
    TotalMembers,
    TotalPages,
    GetLeaders {
        page: i64,
    },
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Operation::FirstOrInsert { .. } => "first_or_insert",
            Operation::GetMember { .. } => "get_member",
            Operation::Increment { .. } => "increment",
            Operation::UpsertInfo { .. } => "upsert_info",
            Operation::GetInfo { .. } => "get_info",
            Operation::Remove { .. } => "remove",
            Operation::TotalMembers => "total_members",
            Operation::TotalPages => "total_pages",
            Operation::GetLeaders { .. } => "get_leaders",
        }
    }
}

/// Printable form of a `User`. Metadata is shown as lossy UTF-8.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserView {
    pub id: String,
    pub score: i64,
    pub rank: u64,
    pub ranked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<String>,
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        Self {
            ranked: user.is_ranked(),
            metadata: user
                .metadata
                .map(|bytes| String::from_utf8_lossy(&bytes).into_owned()),
            id: user.id,
            score: user.score,
            rank: user.rank,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    User { user: UserView },
    Users { users: Vec<UserView> },
    Info { payload: String },
    Count { value: u64 },
    Removed { existed: bool },
    Stored,
    NotFound { member: String },
    InvalidIncrement { delta: i64 },
    ScoreOutOfRange { score: i64 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepResult {
    pub step: usize,
    pub op: &'static str,
    pub outcome: Outcome,
}

#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    #[error("step {step} ({op}) failed: {source}")]
    Backend {
        step: usize,
        op: &'static str,
        source: StoreError,
    },
}

/// Run `ops` in order against `leaderboard`. Steps are numbered from 1.
pub fn run_script<S, M>(
    leaderboard: &Leaderboard<S, M>,
    ops: impl IntoIterator<Item = Operation>,
) -> Result<Vec<StepResult>, ScriptError>
where
    S: OrderedScoreStore,
    M: MetadataStore,
{
    let mut results = Vec::new();

    for (index, op) in ops.into_iter().enumerate() {
        let step = index + 1;
        let name = op.name();

        let outcome = match apply(leaderboard, op) {
            Ok(outcome) => outcome,
            Err(LeaderboardError::NotFound { member }) => Outcome::NotFound { member },
            Err(LeaderboardError::InvalidIncrement { delta }) => {
                Outcome::InvalidIncrement { delta }
            }
            Err(LeaderboardError::ScoreOutOfRange { score }) => {
                Outcome::ScoreOutOfRange { score }
            }
            Err(LeaderboardError::Backend(source)) => {
                return Err(ScriptError::Backend {
                    step,
                    op: name,
                    source,
                })
            }
        };

        results.push(StepResult {
            step,
            op: name,
            outcome,
        });
    }

    Ok(results)
}

fn apply<S, M>(leaderboard: &Leaderboard<S, M>, op: Operation) -> Result<Outcome, LeaderboardError>
where
    S: OrderedScoreStore,
    M: MetadataStore,
{
    let user = |user: User| Outcome::User { user: user.into() };

    Ok(match op {
        Operation::FirstOrInsert { id, score } => user(leaderboard.first_or_insert(&id, score)?),
        Operation::GetMember { id, with_metadata } => {
            user(leaderboard.get_member(&id, with_metadata)?)
        }
        Operation::Increment { id, delta } => {
            user(leaderboard.increment_member_score(&id, delta)?)
        }
        Operation::UpsertInfo { id, payload } => {
            leaderboard.upsert_member_info(&id, payload.as_bytes())?;
            Outcome::Stored
        }
        Operation::GetInfo { id } => Outcome::Info {
            payload: String::from_utf8_lossy(&leaderboard.get_member_info(&id)?).into_owned(),
        },
        Operation::Remove { id } => Outcome::Removed {
            existed: leaderboard.remove_member(&id)?,
        },
        Operation::TotalMembers => Outcome::Count {
            value: leaderboard.total_members()?,
        },
        Operation::TotalPages => Outcome::Count {
            value: leaderboard.total_pages()?,
        },
        Operation::GetLeaders { page } => Outcome::Users {
            users: leaderboard
                .get_leaders(page)?
                .into_iter()
                .map(UserView::from)
                .collect(),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{InMemoryMetadataStore, InMemoryScoreStore};
    use crate::config::{Environment, LeaderboardName};
    use crate::store::StoreResult;

    fn leaderboard() -> Leaderboard<InMemoryScoreStore, InMemoryMetadataStore> {
        let name = LeaderboardName::new("arcade", "weekly", Environment::Development).unwrap();
        Leaderboard::new(
            InMemoryScoreStore::new(),
            InMemoryMetadataStore::new(),
            &name,
            10,
        )
    }

    fn user_of(outcome: &Outcome) -> &UserView {
        match outcome {
            Outcome::User { user } => user,
            other => panic!("expected a user, got {other:?}"),
        }
    }

    #[test]
    fn parse_and_run_script() {
        let json = r#"
        [
          { "op": "first_or_insert", "id": "12345", "score": 33 },
          { "op": "first_or_insert", "id": "45678", "score": 44 },
          { "op": "first_or_insert", "id": "111", "score": 12 },
          { "op": "total_members" },
          { "op": "increment", "id": "12345", "delta": 7481523 },
          { "op": "first_or_insert", "id": "12345", "score": 999 },
          { "op": "upsert_info", "id": "12345", "payload": "{\"name\":\"Ann\"}" },
          { "op": "get_member", "id": "12345", "with_metadata": true },
          { "op": "get_member", "id": "nobody" },
          { "op": "increment", "id": "x", "delta": -5 },
          { "op": "get_info", "id": "x" },
          { "op": "get_leaders", "page": 0 },
          { "op": "first_or_insert", "id": "huge", "score": 9007199254740993 }
        ]
        "#;

        let ops: Vec<Operation> = serde_json::from_str(json).unwrap();
        let results = run_script(&leaderboard(), ops).unwrap();

        assert_eq!(results.len(), 13);
        assert_eq!(results[3].outcome, Outcome::Count { value: 3 });

        let incremented = user_of(&results[4].outcome);
        assert_eq!((incremented.score, incremented.rank), (7_481_556, 1));
        assert_eq!(user_of(&results[5].outcome).score, 7_481_556);

        let with_info = user_of(&results[7].outcome);
        assert_eq!(with_info.metadata.as_deref(), Some("{\"name\":\"Ann\"}"));

        let nobody = user_of(&results[8].outcome);
        assert!(!nobody.ranked);
        assert_eq!(nobody.rank, 0);

        assert_eq!(results[9].outcome, Outcome::InvalidIncrement { delta: -5 });
        assert_eq!(
            results[10].outcome,
            Outcome::NotFound {
                member: "x".into()
            }
        );

        match &results[11].outcome {
            Outcome::Users { users } => {
                let ids: Vec<_> = users.iter().map(|u| u.id.as_str()).collect();
                assert_eq!(ids, vec!["12345", "45678", "111"]);
            }
            other => panic!("expected users, got {other:?}"),
        }
        assert_eq!(results[11].step, 12);
        assert_eq!(results[11].op, "get_leaders");
        assert_eq!(
            results[12].outcome,
            Outcome::ScoreOutOfRange {
                score: 9_007_199_254_740_993
            }
        );
    }

    #[test]
    fn unknown_operation_fails_to_parse() {
        let err = serde_json::from_str::<Vec<Operation>>(r#"[{ "op": "drop_table" }]"#);
        assert!(err.is_err());
    }

    #[test]
    fn outcome_serializes_with_kind_tag() {
        let json = serde_json::to_value(Outcome::Count { value: 2 }).unwrap();
        assert_eq!(json, serde_json::json!({ "kind": "count", "value": 2 }));
    }

    struct BrokenMetadata;

    impl MetadataStore for BrokenMetadata {
        fn put(&self, _: &str, _: &str, _: &[u8]) -> StoreResult<()> {
            Err(StoreError::Backend("disk full".into()))
        }

        fn get(&self, _: &str, _: &str) -> StoreResult<Vec<u8>> {
            Err(StoreError::Unavailable("timeout".into()))
        }
    }

    #[test]
    fn backend_error_stops_the_run() {
        let name = LeaderboardName::new("arcade", "weekly", Environment::Staging).unwrap();
        let lb = Leaderboard::new(InMemoryScoreStore::new(), BrokenMetadata, &name, 25);

        let ops = vec![
            Operation::FirstOrInsert {
                id: "a".into(),
                score: 1,
            },
            Operation::UpsertInfo {
                id: "a".into(),
                payload: "hello".into(),
            },
            Operation::TotalMembers,
        ];

        let err = run_script(&lb, ops).unwrap_err();
        let ScriptError::Backend { step, op, source } = err;
        assert_eq!((step, op), (2, "upsert_info"));
        assert_eq!(source, StoreError::Backend("disk full".into()));
    }
}
