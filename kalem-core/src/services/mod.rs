pub mod analysis_service;
pub mod exercise_service;
pub mod idiom_service;
pub mod mistake_service;

pub use analysis_service::{AnalysisService, PersistOutcome};
pub use exercise_service::ExerciseService;
pub use idiom_service::{fold_idioms, IdiomLibrary};
pub use mistake_service::MistakeTracker;
