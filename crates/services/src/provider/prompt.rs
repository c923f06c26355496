use quiz_core::model::{MULTIPLE_CHOICE, ProficiencyLevel};

const OBJECT_SCHEMA: &str = r#"{
  "id": "string",
  "level": "string",
  "type": "MULTIPLE_CHOICE",
  "questionText": "string",
  "options": [
    {"id": "string", "text": "string"},
    {"id": "string", "text": "string"},
    {"id": "string", "text": "string"},
    {"id": "string", "text": "string"}
  ],
  "correctAnswer": "string",
  "explanation": "string"
}"#;

/// Prompt for `count` questions at one level.
#[must_use]
pub fn practice_prompt(level: ProficiencyLevel, count: u32) -> String {
    format!(
        "Generate {count} German multiple-choice quiz questions, CEFR level {level}.\n\
         Output: JSON array. Schema per object:\n\
         {OBJECT_SCHEMA}\n\
         Details:\n\
         - \"id\" fields must be unique strings.\n\
         - \"level\" field must be exactly \"{level}\".\n\
         - \"options\" array must contain exactly 4 distinct option objects.\n\
         - \"correctAnswer\" must be the \"id\" of one of the options.\n\
         - \"explanation\" is optional, 1-2 sentences.\n\
         - \"type\" must always be \"{MULTIPLE_CHOICE}\".\n\
         Respond ONLY with the JSON array. Provide exactly {count} questions. No markdown.\n"
    )
}

/// Prompt for a placement test covering `levels`, `per_level` questions each.
#[must_use]
pub fn placement_prompt(levels: &[ProficiencyLevel], per_level: u32) -> String {
    let level_count = u32::try_from(levels.len()).unwrap_or(u32::MAX);
    let total = level_count.saturating_mul(per_level);
    let distribution = levels
        .iter()
        .map(|level| format!("{per_level} questions for CEFR level {level}"))
        .collect::<Vec<_>>()
        .join(", ");
    let labels = levels
        .iter()
        .map(|level| level.label())
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "Generate a total of {total} German multiple-choice quiz questions for a placement test.\n\
         The questions should cover the following CEFR levels: {distribution}.\n\
         Output: A single JSON array containing all {total} questions.\n\
         For each question object, YOU MUST include a \"level\" field naming the CEFR level that \
         question was designed for, exactly matching one of these values: {labels}.\n\
         Schema per object:\n\
         {OBJECT_SCHEMA}\n\
         Details:\n\
         - \"id\" fields must be unique across all generated questions.\n\
         - \"options\" array must contain exactly 4 distinct option objects.\n\
         - \"correctAnswer\" must be the \"id\" of one of the options.\n\
         - \"explanation\" is optional, 1-2 sentences.\n\
         - \"type\" must always be \"{MULTIPLE_CHOICE}\".\n\
         - The \"level\" of EACH question must reflect its intended difficulty.\n\
         Respond ONLY with the JSON array. No markdown.\n"
    )
}
