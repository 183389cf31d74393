pub mod postgres;

pub use postgres::{
    PostgresAnalysisRepository, PostgresExerciseRepository, PostgresMistakeStatRepository,
};
