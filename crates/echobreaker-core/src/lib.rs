//! echobreaker-core: scoring, aggregation and ranking for the EchoBreaker quiz.
//!
//! Players guess what share of Democrats and Republicans would endorse a
//! post. This crate turns those guesses into accuracy scores, session
//! summaries and leaderboard placements, and defines the store seam the
//! results engine is injected with.

pub mod config;
pub mod engine;
pub mod error;
pub mod model;
pub mod parser;
pub mod ranking;
pub mod report;
pub mod scorer;
pub mod session;
pub mod statistics;
pub mod traits;
