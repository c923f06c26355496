//! Turning raw generator output into validated questions.

use std::collections::HashSet;

use log::{debug, warn};
use serde_json::Value;

use quiz_core::model::{Question, QuestionDraft};

use super::BatchScope;
use crate::error::ProviderError;

/// Parse a generator response and keep every item that validates.
///
/// Tolerates a BOM, a Markdown code fence and stray control characters around
/// the JSON. Accepts a bare array or an object with a `questions` array.
///
/// # Errors
///
/// Returns `ProviderError::MalformedPayload` if the text is not JSON of the
/// expected shape, and the scope's empty-result error if nothing survives.
pub fn parse_questions(raw: &str, scope: &BatchScope) -> Result<Vec<Question>, ProviderError> {
    let cleaned = clean_payload(raw);
    let value: Value = serde_json::from_str(&cleaned).map_err(|err| {
        debug!("unparsable generator payload: {cleaned}");
        ProviderError::MalformedPayload(err.to_string())
    })?;

    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("questions") {
            Some(Value::Array(items)) => items,
            _ => {
                return Err(ProviderError::MalformedPayload(
                    "expected a JSON array of questions".into(),
                ));
            }
        },
        _ => {
            return Err(ProviderError::MalformedPayload(
                "expected a JSON array of questions".into(),
            ));
        }
    };

    let received = items.len();
    let validated: Vec<Question> = items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| {
            let draft = match serde_json::from_value::<QuestionDraft>(item) {
                Ok(draft) => draft,
                Err(err) => {
                    debug!("dropping question #{index}: {err}");
                    return None;
                }
            };
            match draft.validate() {
                Ok(question) => Some(question),
                Err(err) => {
                    debug!("dropping question #{index}: {err}");
                    None
                }
            }
        })
        .collect();

    if validated.is_empty() && received > 0 {
        warn!("received {received} questions but none passed validation");
    }

    let kept = retain_in_scope(validated, scope);
    if kept.is_empty() {
        return Err(scope.empty_error());
    }
    if kept.len() != scope.requested() {
        warn!(
            "requested {} questions, kept {} of {received} received",
            scope.requested(),
            kept.len()
        );
    }
    Ok(kept)
}

/// Drop questions outside the scope's level(s) and repeated ids.
///
/// Order is preserved; the first occurrence of an id wins.
#[must_use]
pub fn retain_in_scope(questions: Vec<Question>, scope: &BatchScope) -> Vec<Question> {
    let mut seen = HashSet::with_capacity(questions.len());
    questions
        .into_iter()
        .filter(|question| {
            if !scope.allows(question.level()) {
                debug!(
                    "dropping question {}: level {} was not requested",
                    question.id(),
                    question.level().code()
                );
                return false;
            }
            if !seen.insert(question.id().clone()) {
                debug!("dropping question {}: duplicate id", question.id());
                return false;
            }
            true
        })
        .collect()
}

fn clean_payload(raw: &str) -> String {
    let mut text = raw.trim();
    text = text.strip_prefix('\u{feff}').unwrap_or(text).trim();
    if let Some(inner) = strip_fence(text) {
        text = inner.trim();
    }
    text.chars().filter(|c| !is_stray_control(*c)).collect()
}

fn strip_fence(text: &str) -> Option<&str> {
    let inner = text.strip_prefix("```")?.strip_suffix("```")?;
    Some(
        inner
            .strip_prefix("json")
            .or_else(|| inner.strip_prefix("JSON"))
            .unwrap_or(inner),
    )
}

/// Control characters JSON can't carry raw; tab, LF and CR are kept.
fn is_stray_control(c: char) -> bool {
    matches!(c, '\u{0}'..='\u{8}' | '\u{b}' | '\u{c}' | '\u{e}'..='\u{1f}')
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::ProficiencyLevel;

    fn item(id: &str, level: &str, correct: &str) -> String {
        format!(
            r#"{{"id":"{id}","level":"{level}","type":"MULTIPLE_CHOICE","questionText":"Frage {id}",
            "options":[{{"id":"a","text":"eins"}},{{"id":"b","text":"zwei"}},
            {{"id":"c","text":"drei"}},{{"id":"d","text":"vier"}}],"correctAnswer":"{correct}"}}"#
        )
    }

    fn practice(level: ProficiencyLevel, count: u32) -> BatchScope {
        BatchScope::Practice { level, count }
    }

    #[test]
    fn parses_fenced_payload_with_bom() {
        let raw = format!(
            "\u{feff}```json\n[{}, {}]\n```",
            item("1", "A1 (Beginner)", "a"),
            item("2", "A1", "b")
        );
        let questions = parse_questions(&raw, &practice(ProficiencyLevel::A1, 2)).unwrap();
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[1].correct_answer().as_str(), "b");
    }

    #[test]
    fn drops_invalid_items_but_keeps_the_rest() {
        let raw = format!(
            "[{}, {}, {{\"id\": \"3\"}}, 42]",
            item("1", "B1", "a"),
            item("2", "B1", "z")
        );
        let questions = parse_questions(&raw, &practice(ProficiencyLevel::B1, 4)).unwrap();
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].id().as_str(), "1");
    }

    #[test]
    fn practice_scope_drops_other_levels() {
        let raw = format!("[{}, {}]", item("1", "B1", "a"), item("2", "C1", "a"));
        let questions = parse_questions(&raw, &practice(ProficiencyLevel::B1, 2)).unwrap();
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].level(), ProficiencyLevel::B1);
    }

    #[test]
    fn placement_scope_keeps_requested_levels_and_dedups() {
        let raw = format!(
            "{{\"questions\": [{}, {}, {}]}}",
            item("1", "A1", "a"),
            item("1", "A2", "a"),
            item("2", "C1", "a")
        );
        let scope = BatchScope::Placement {
            levels: vec![ProficiencyLevel::A1, ProficiencyLevel::A2],
            count_per_level: 1,
        };
        let questions = parse_questions(&raw, &scope).unwrap();
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].level(), ProficiencyLevel::A1);
    }

    #[test]
    fn all_invalid_is_an_empty_result() {
        let raw = format!("[{}]", item("1", "A1", "x"));
        let err = parse_questions(&raw, &practice(ProficiencyLevel::A1, 1)).unwrap_err();
        assert!(matches!(
            err,
            ProviderError::EmptyResult {
                level: Some(ProficiencyLevel::A1)
            }
        ));

        let err = parse_questions("[]", &practice(ProficiencyLevel::A1, 1)).unwrap_err();
        assert!(matches!(err, ProviderError::EmptyResult { .. }));
    }

    #[test]
    fn non_json_is_malformed() {
        let err = parse_questions("Hier sind deine Fragen!", &practice(ProficiencyLevel::A1, 1))
            .unwrap_err();
        assert!(matches!(err, ProviderError::MalformedPayload(_)));

        let err =
            parse_questions("{\"foo\": 1}", &practice(ProficiencyLevel::A1, 1)).unwrap_err();
        assert!(matches!(err, ProviderError::MalformedPayload(_)));
    }

    #[test]
    fn strips_control_characters() {
        let raw = format!("[{}\u{1}]", item("1", "A2", "c"));
        let questions = parse_questions(&raw, &practice(ProficiencyLevel::A2, 1)).unwrap();
        assert_eq!(questions.len(), 1);
    }
}
