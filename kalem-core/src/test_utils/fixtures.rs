use serde_json::{json, Value};

/// A realistic submission: the learner's sentence padded past the minimum length.
pub const SAMPLE_TEXT: &str =
    "Bugün çok yorgunum ama çalışmam gerekiyor. Yarın toplantımız var ve hazırlanmam lazım.";

/// The mistake pattern the sample answers report.
pub const SAMPLE_PATTERN: &str = "missing aorist tense";

/// Model answer for [`SAMPLE_TEXT`] with one correction, three variants, two
/// idioms and one mistake pattern whose examples can be varied.
pub fn sample_answer(example_wrong: &str, example_correct: &str) -> Value {
    json!({
        "corrections": [{
            "original": "çalışmam gerekiyor",
            "corrected": "çalışmam gerekiyor",
            "type": "grammar",
            "explanation_de": "Der Satz ist korrekt, achte aber auf die Vokalharmonie."
        }],
        "variants": {
            "business_formal": "Bugün oldukça yorgunum, ancak çalışmaya devam etmem gerekmektedir.",
            "colloquial_smart": "Bugün leş gibiyim ama çalışmak şart.",
            "c1_sophisticated": "Her ne kadar bugün bitkin olsam da çalışmaktan geri duramam."
        },
        "suggested_deyimler": [{
            "deyim": "canı çıkmak",
            "meaning_de": "völlig erschöpft sein",
            "usage": "umgangssprachlich",
            "example_in_context": "Bugün canım çıktı ama çalışmam gerekiyor."
        }, {
            "deyim": "dişini sıkmak",
            "meaning_de": "die Zähne zusammenbeißen",
            "usage": "Durchhalten trotz Müdigkeit",
            "example_in_context": "Yorgunum ama dişimi sıkıp çalışacağım."
        }],
        "mistake_patterns": [{
            "pattern": SAMPLE_PATTERN,
            "type": "grammar",
            "example_wrong": example_wrong,
            "example_correct": example_correct
        }]
    })
}

/// [`sample_answer`] serialized and wrapped in a markdown fence, as models
/// tend to reply.
pub fn fenced(answer: &Value) -> String {
    format!("```json\n{}\n```", answer)
}

/// A valid answer listing the given patterns, all categorized as grammar.
pub fn answer_with_patterns(patterns: &[&str]) -> Value {
    let patterns: Vec<Value> = patterns
        .iter()
        .map(|p| {
            json!({
                "pattern": p,
                "type": "grammar",
                "example_wrong": format!("{p} yanlış"),
                "example_correct": format!("{p} doğru")
            })
        })
        .collect();

    json!({
        "corrections": [],
        "variants": {
            "business_formal": "a",
            "colloquial_smart": "b",
            "c1_sophisticated": "c"
        },
        "suggested_deyimler": [],
        "mistake_patterns": patterns
    })
}

/// A valid answer suggesting the given idioms.
pub fn answer_with_idioms(idioms: &[(&str, &str)]) -> Value {
    let idioms: Vec<Value> = idioms
        .iter()
        .map(|(idiom, example)| {
            json!({
                "deyim": idiom,
                "meaning_de": format!("Bedeutung: {idiom}"),
                "usage": "Alltag",
                "example_in_context": example
            })
        })
        .collect();

    json!({
        "corrections": [],
        "variants": {
            "business_formal": "a",
            "colloquial_smart": "b",
            "c1_sophisticated": "c"
        },
        "suggested_deyimler": idioms,
        "mistake_patterns": []
    })
}
