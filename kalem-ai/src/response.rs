//! Turns the model's raw answer into a validated [`Analysis`].

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::debug;

use kalem_common::models::Analysis;
use kalem_common::Error;

static OPENING_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^```[A-Za-z0-9_+\-]*").expect("opening fence pattern"));

/// Removes any number of surrounding Markdown code fences (with or without a
/// language tag) and the whitespace around them.
pub fn strip_code_fences(text: &str) -> &str {
    let mut current = text.trim();
    loop {
        let mut next = current;
        if let Some(m) = OPENING_FENCE.find(next) {
            next = next[m.end()..].trim_start();
        }
        if let Some(rest) = next.strip_suffix("```") {
            next = rest.trim_end();
        }
        if next.len() == current.len() {
            return current;
        }
        current = next;
    }
}

/// Parses and normalises the model answer.
///
/// Missing or `null` arrays become empty vectors and missing registers become
/// empty strings. Unknown categories are kept as they are. Anything that is
/// not a JSON object fails with [`Error::MalformedAnalysis`].
pub fn parse_analysis(raw: &str) -> Result<Analysis, Error> {
    let cleaned = strip_code_fences(raw);

    let value: Value = serde_json::from_str(cleaned)
        .map_err(|e| Error::MalformedAnalysis(format!("response is not valid JSON: {}", e)))?;

    if !value.is_object() {
        return Err(Error::MalformedAnalysis(
            "expected a JSON object at the top level".to_string(),
        ));
    }

    let mut analysis: Analysis = serde_json::from_value(value)
        .map_err(|e| Error::MalformedAnalysis(format!("unexpected analysis shape: {}", e)))?;

    normalize(&mut analysis);
    Ok(analysis)
}

/// Trims merge keys and drops entries that have none.
fn normalize(analysis: &mut Analysis) {
    analysis.mistake_patterns.retain_mut(|p| {
        p.description = p.description.trim().to_string();
        if p.description.is_empty() {
            debug!("Dropping mistake pattern without a description");
        }
        !p.description.is_empty()
    });

    analysis.suggested_idioms.retain_mut(|i| {
        i.idiom = i.idiom.trim().to_string();
        if i.idiom.is_empty() {
            debug!("Dropping suggested idiom without idiom text");
        }
        !i.idiom.is_empty()
    });

    for c in analysis.corrections.iter().filter(|c| !c.category.is_known()) {
        debug!("Correction with unrecognised category '{}' kept as-is", c.category);
    }

    let missing = analysis.variants.missing_registers();
    if !missing.is_empty() {
        debug!("Analysis has empty variants for {:?}", missing);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kalem_common::models::{Category, Register};

    const FULL: &str = r#"{
        "corrections": [
            {"original": "Ben gitmek okula", "corrected": "Ben okula gidiyorum", "type": "grammar", "explanation_de": "Wortstellung"},
            {"original": "a", "corrected": "b", "type": "idiomatic_flow", "explanation_de": "neu"}
        ],
        "variants": {
            "business_formal": "Resmi metin",
            "colloquial_smart": "Günlük metin",
            "c1_sophisticated": "Gözden düşmek üzere **etekleri zil çalıyor**"
        },
        "suggested_deyimler": [
            {"deyim": "etekleri zil çalmak", "meaning_de": "sehr froh sein", "usage": "Freude", "example_in_context": "Etekleri zil çalıyordu."}
        ],
        "mistake_patterns": [
            {"pattern": "missing aorist tense", "type": "grammar", "example_wrong": "gelir değil", "example_correct": "gelmez"}
        ]
    }"#;

    #[test]
    fn parses_complete_answer() {
        let analysis = parse_analysis(FULL).unwrap();
        assert_eq!(analysis.corrections.len(), 2);
        assert_eq!(analysis.corrections[0].category, Category::Grammar);
        assert_eq!(analysis.suggested_idioms[0].idiom, "etekleri zil çalmak");
        assert_eq!(analysis.mistake_patterns[0].description, "missing aorist tense");
        assert!(analysis.variants.missing_registers().is_empty());
    }

    #[test]
    fn unknown_category_passes_through_verbatim() {
        let analysis = parse_analysis(FULL).unwrap();
        let category = &analysis.corrections[1].category;
        assert_eq!(category, &Category::Other("idiomatic_flow".to_string()));

        let echoed = serde_json::to_value(&analysis).unwrap();
        assert_eq!(echoed["corrections"][1]["type"], "idiomatic_flow");
    }

    #[test]
    fn missing_arrays_become_empty() {
        for raw in [
            "{}",
            r#"{"corrections": null, "suggested_deyimler": null, "mistake_patterns": null, "variants": null}"#,
            r#"{"variants": {"business_formal": "x"}}"#,
        ] {
            let analysis = parse_analysis(raw).unwrap();
            assert!(analysis.corrections.is_empty(), "{raw}");
            assert!(analysis.suggested_idioms.is_empty(), "{raw}");
            assert!(analysis.mistake_patterns.is_empty(), "{raw}");
        }
    }

    #[test]
    fn empty_register_is_no_variant() {
        let analysis = parse_analysis(
            r#"{"variants": {"business_formal": "Resmi", "colloquial_smart": "", "c1_sophisticated": "   "}}"#,
        )
        .unwrap();
        assert_eq!(analysis.variants.get(Register::Formal), Some("Resmi"));
        assert_eq!(analysis.variants.get(Register::Colloquial), None);
        assert_eq!(analysis.variants.get(Register::Sophisticated), None);
        assert_eq!(
            analysis.variants.missing_registers(),
            vec![Register::Colloquial, Register::Sophisticated]
        );
    }

    #[test]
    fn camel_case_names_are_accepted() {
        let analysis = parse_analysis(
            r#"{
                "suggestedIdioms": [{"idiom": "ağzı kulaklarında", "meaningInNativeLanguage": "strahlen", "usageNote": "Freude", "exampleInContext": "..."}],
                "mistakePatterns": [{"patternDescription": "vowel harmony", "category": "grammar", "exampleWrong": "evlar", "exampleCorrect": "evler"}]
            }"#,
        )
        .unwrap();
        assert_eq!(analysis.suggested_idioms[0].meaning, "strahlen");
        assert_eq!(analysis.mistake_patterns[0].description, "vowel harmony");
        assert_eq!(analysis.mistake_patterns[0].example_correct, "evler");
    }

    #[test]
    fn blank_keys_are_dropped_and_keys_trimmed() {
        let analysis = parse_analysis(
            r#"{
                "suggested_deyimler": [{"deyim": "  "}, {"deyim": " göz atmak "}],
                "mistake_patterns": [{"pattern": ""}, {"pattern": " case endings\n"}]
            }"#,
        )
        .unwrap();
        assert_eq!(analysis.suggested_idioms.len(), 1);
        assert_eq!(analysis.suggested_idioms[0].idiom, "göz atmak");
        assert_eq!(analysis.mistake_patterns.len(), 1);
        assert_eq!(analysis.mistake_patterns[0].description, "case endings");
    }

    #[test]
    fn not_json_is_malformed() {
        let err = parse_analysis("not json").unwrap_err();
        assert!(matches!(err, Error::MalformedAnalysis(_)));
    }

    #[test]
    fn non_object_top_level_is_malformed() {
        for raw in ["[]", "\"text\"", "42", "null"] {
            let err = parse_analysis(raw).unwrap_err();
            assert!(matches!(err, Error::MalformedAnalysis(_)), "{raw}");
        }
    }

    #[test]
    fn wrong_field_type_is_malformed() {
        let err = parse_analysis(r#"{"corrections": "none"}"#).unwrap_err();
        assert!(matches!(err, Error::MalformedAnalysis(_)));
    }

    #[test]
    fn fences_are_stripped_in_layers() {
        let plain = parse_analysis(FULL).unwrap();
        let wrapped = [
            format!("```json\n{FULL}\n```"),
            format!("```\n{FULL}\n```"),
            format!("  ```json\n```\n{FULL}\n```\n```  "),
            format!("```json{FULL}```"),
        ];
        for raw in wrapped {
            assert_eq!(parse_analysis(&raw).unwrap(), plain, "{raw}");
        }
    }

    #[test]
    fn strip_leaves_unfenced_text_alone() {
        assert_eq!(strip_code_fences("  {\"a\": 1}\n"), "{\"a\": 1}");
        assert_eq!(strip_code_fences("```"), "");
    }
}
