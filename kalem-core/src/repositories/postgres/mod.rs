// src/repositories/postgres/mod.rs

pub mod analysis;
pub mod exercise;
pub mod mistake_stats;

pub use analysis::PostgresAnalysisRepository;
pub use exercise::PostgresExerciseRepository;
pub use mistake_stats::PostgresMistakeStatRepository;
