//! regionbench scenarios
//!
//! The five benchmark scenario bodies ([`BenchmarkSuite`]) and the JSON
//! fixture provider ([`JsonInputProvider`]).

#![warn(unreachable_pub)]

pub mod fixtures;
pub mod suite;

pub use fixtures::{JsonInputProvider, DEFAULT_FIXTURES};
pub use suite::{actions, BenchmarkSuite};
