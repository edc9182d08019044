//! kata - self-hosted daily coding practice.
//!
//! One practice question per difficulty per day, a judge that runs Python
//! submissions against the question's test cases, and a leaderboard of
//! solvers. Questions come from an upstream API and are cached locally so
//! the service keeps answering when the upstream is down.

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod judge;
pub mod leaderboard;
pub mod prompt;
pub mod questions;
pub mod server;
pub mod storage;
pub mod test_utils;

pub use error::{KataError, Result};
