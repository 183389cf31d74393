// File: kalem-common/src/models/mod.rs
pub mod analysis;
pub mod exercise;
pub mod idiom;
pub mod mistake;

pub use analysis::{
    Analysis, AnalysisRecord, Category, Correction, MistakePattern, Register, SuggestedIdiom,
    Variants,
};
pub use exercise::Exercise;
pub use idiom::{IdiomSummary, IdiomView};
pub use mistake::{MasteryLevel, MistakeStat};
