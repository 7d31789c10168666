// Leaderboard Kernel
//
// Ranking engine for named leaderboards over pluggable score and
// metadata stores.

pub mod adapters;
pub mod config;
pub mod ranking;
pub mod script;
pub mod store;
