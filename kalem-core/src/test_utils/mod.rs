//! In-memory repositories, canned model answers and a wired-up harness for
//! tests and local runs.

pub mod fixtures;
pub mod helpers;
pub mod memory;

pub use helpers::TestHarness;
pub use memory::{InMemoryAnalysisRepository, InMemoryExerciseRepository, InMemoryMistakeStatRepository};
