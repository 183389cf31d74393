//! A user's idiom library, recomputed from their stored analyses on every read.

use std::collections::HashMap;
use std::sync::Arc;

use uuid::Uuid;

use kalem_common::models::{AnalysisRecord, IdiomSummary, IdiomView};
use kalem_common::traits::repository_traits::AnalysisRepository;

use crate::Error;

/// Folds analyses into one [`IdiomView`] per distinct idiom text.
///
/// Expects newest-first input but does not rely on it: an occurrence only
/// replaces the stored example when its timestamp is strictly newer. Each
/// analysis counts once per idiom it mentions. Result is sorted by count,
/// descending, then by idiom text.
pub fn fold_idioms(analyses: &[AnalysisRecord]) -> Vec<IdiomView> {
    let mut views: HashMap<&str, IdiomView> = HashMap::new();

    for analysis in analyses {
        let mut seen_here: Vec<&str> = Vec::new();
        for suggestion in &analysis.suggested_idioms {
            let key = suggestion.idiom.as_str();
            if seen_here.contains(&key) {
                continue;
            }
            seen_here.push(key);

            match views.get_mut(key) {
                Some(view) => {
                    view.occurrences += 1;
                    if analysis.created_at > view.last_seen {
                        view.last_seen = analysis.created_at;
                        view.example_in_context = suggestion.example_in_context.clone();
                    }
                }
                None => {
                    views.insert(
                        key,
                        IdiomView {
                            idiom: suggestion.idiom.clone(),
                            meaning: suggestion.meaning.clone(),
                            usage_note: suggestion.usage_note.clone(),
                            example_in_context: suggestion.example_in_context.clone(),
                            occurrences: 1,
                            last_seen: analysis.created_at,
                        },
                    );
                }
            }
        }
    }

    let mut result: Vec<IdiomView> = views.into_values().collect();
    result.sort_by(|a, b| {
        b.occurrences
            .cmp(&a.occurrences)
            .then_with(|| a.idiom.cmp(&b.idiom))
    });
    result
}

/// Case-insensitive match on idiom text or meaning.
fn matches_search(view: &IdiomView, needle: &str) -> bool {
    view.idiom.to_lowercase().contains(needle) || view.meaning.to_lowercase().contains(needle)
}

#[derive(Clone)]
pub struct IdiomLibrary {
    analyses: Arc<dyn AnalysisRepository>,
}

impl IdiomLibrary {
    pub fn new(analyses: Arc<dyn AnalysisRepository>) -> Self {
        Self { analyses }
    }

    /// The user's idioms, optionally filtered. The summary always covers the
    /// whole library, not just the filtered entries.
    pub async fn library(
        &self,
        user_id: Uuid,
        search: Option<&str>,
    ) -> Result<(Vec<IdiomView>, IdiomSummary), Error> {
        let history = self.analyses.list_analyses_for_user(user_id).await?;
        let views = fold_idioms(&history);
        let summary = IdiomSummary::from_views(&views);

        let views = match search.map(str::trim).filter(|s| !s.is_empty()) {
            Some(term) => {
                let needle = term.to_lowercase();
                views.into_iter().filter(|v| matches_search(v, &needle)).collect()
            }
            None => views,
        };

        Ok((views, summary))
    }
}
