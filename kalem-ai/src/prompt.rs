//! Builds the single instruction string sent to the model for one submission.

/// Shape the model must answer with. Field names here are the ones
/// [`crate::response::parse_analysis`] reads.
const RESPONSE_CONTRACT: &str = r#"{
  "corrections": [
    {
      "original": "the original sentence",
      "corrected": "the corrected sentence",
      "type": "grammar|vocabulary|word_choice|style",
      "explanation_de": "explanation in German"
    }
  ],
  "variants": {
    "business_formal": "formal business rewrite using domain vocabulary",
    "colloquial_smart": "quick-witted everyday rewrite",
    "c1_sophisticated": "C1 rewrite containing at least 2 deyimler, marked with **"
  },
  "suggested_deyimler": [
    {
      "deyim": "Turkish idiom",
      "meaning_de": "German meaning",
      "usage": "when to use it",
      "example_in_context": "example sentence built on the learner's text"
    }
  ],
  "mistake_patterns": [
    {
      "pattern": "short description of the recurring mistake",
      "type": "grammar|vocabulary|deyim|word_choice",
      "example_wrong": "wrong example",
      "example_correct": "correct example"
    }
  ]
}"#;

/// Returns the full instruction for `user_text`. The text is embedded as-is.
pub fn build_analysis_prompt(user_text: &str) -> String {
    format!(
        "You are a Turkish teacher for learners moving from B2 to C1.\n\
         \n\
         Analyse the following Turkish text written by a B2 learner (goal: C1).\n\
         Areas of interest: business, politics, sport.\n\
         \n\
         TEXT:\n\
         {user_text}\n\
         \n\
         Answer as JSON:\n\
         {RESPONSE_CONTRACT}\n\
         \n\
         IMPORTANT:\n\
         - Return plain JSON only, no Markdown\n\
         - Use at least 2 deyimler in the c1_sophisticated variant\n\
         - Categorise every mistake by type"
    )
}
