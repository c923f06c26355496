//! Text rendering of a `SessionView` and parsing of typed commands.

use std::fmt::Write as _;

use quiz_core::model::{OptionId, ProficiencyLevel};
use services::{Mode, SessionEvent, SessionView, StageTag};

/// A typed line, interpreted against the screen it was typed on.
#[derive(Debug)]
pub enum Input {
    Event(SessionEvent),
    Quit,
    Unrecognized,
}

pub fn parse_input(line: &str, view: &SessionView) -> Input {
    let line = line.trim();
    match line.to_ascii_lowercase().as_str() {
        "q" | "quit" | "exit" => return Input::Quit,
        "h" | "home" if view.can_go_home => return Input::Event(SessionEvent::GoHome),
        "r" | "retry" if view.can_retry => return Input::Event(SessionEvent::RetryLoad),
        _ => {}
    }

    let event = match view.stage {
        StageTag::ChoosingMode => match line {
            "1" | "t" | "test" => Some(SessionEvent::SelectMode(Mode::PlacementTest)),
            "2" | "p" | "practice" => Some(SessionEvent::SelectMode(Mode::Practice)),
            _ => None,
        },
        StageTag::PracticeLevelSelect => line
            .parse::<ProficiencyLevel>()
            .ok()
            .or_else(|| {
                line.parse::<u8>()
                    .ok()
                    .and_then(|n| n.checked_sub(1))
                    .and_then(ProficiencyLevel::from_rank)
            })
            .map(SessionEvent::SelectPracticeLevel),
        StageTag::PracticeActive | StageTag::PlacementActive => {
            if view.feedback.is_some() {
                matches!(line, "" | "n" | "next").then_some(SessionEvent::Advance)
            } else {
                pick_option(line, view).map(SessionEvent::SubmitAnswer)
            }
        }
        StageTag::PracticeComplete => match line {
            "a" | "again" => Some(SessionEvent::PlayAgain),
            "l" | "level" => Some(SessionEvent::ChangeLevel),
            _ => None,
        },
        StageTag::PlacementResult => match line {
            "p" | "practice" => Some(SessionEvent::PracticeDeterminedLevel),
            "l" | "level" => Some(SessionEvent::PracticeDifferentLevel),
            "t" | "retake" => Some(SessionEvent::RetakeTest),
            _ => None,
        },
        StageTag::PracticeLoading | StageTag::PlacementLoading | StageTag::PlacementCalculating => {
            None
        }
    };

    event.map_or(Input::Unrecognized, Input::Event)
}

/// Options are picked by their 1-based position or by id.
fn pick_option(line: &str, view: &SessionView) -> Option<OptionId> {
    let question = view.question.as_ref()?;
    if let Some(option) = line
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|index| question.options().get(index))
    {
        return Some(option.id.clone());
    }
    // Unknown ids are passed through; the session rejects them.
    (!line.is_empty()).then(|| OptionId::new(line))
}

fn score_message(score: u32, total: usize) -> &'static str {
    let total = u64::try_from(total).unwrap_or(u64::MAX);
    let percent = if total == 0 {
        0
    } else {
        (u64::from(score) * 100 + total / 2) / total
    };
    match percent {
        100.. => "Perfekt! Du bist ein Deutsch-Profi!",
        80..=99 => "Sehr gut! Fast alles richtig!",
        60..=79 => "Gut gemacht! Weiter so!",
        40..=59 => "Übung macht den Meister. Nicht aufgeben!",
        _ => "Das war schwierig, oder? Versuche es nochmal!",
    }
}

#[must_use]
pub fn render(view: &SessionView) -> String {
    let mut out = String::new();
    let _ = render_into(&mut out, view);
    out
}

fn render_into(out: &mut String, view: &SessionView) -> std::fmt::Result {
    writeln!(out)?;
    if let Some(error) = &view.error_message {
        writeln!(out, "! {error}")?;
        if view.can_retry {
            writeln!(out, "  [r] retry")?;
        }
    }
    if let Some(message) = &view.loading_message {
        writeln!(out, "{message}")?;
    }

    match view.stage {
        StageTag::ChoosingMode => {
            writeln!(out, "Wie möchtest du starten?")?;
            writeln!(out, "  [1] Einstufungstest (placement test)")?;
            writeln!(out, "  [2] Level üben (practice a level)")?;
        }
        StageTag::PracticeLevelSelect => {
            writeln!(out, "Wähle dein Level:")?;
            for (index, level) in ProficiencyLevel::ALL.iter().enumerate() {
                writeln!(out, "  [{}] {level}", index + 1)?;
            }
        }
        StageTag::PracticeActive | StageTag::PlacementActive => render_question(out, view)?,
        StageTag::PracticeComplete => {
            if let Some((score, total)) = view.final_score {
                writeln!(out, "{score} / {total}")?;
                writeln!(out, "{}", score_message(score, total))?;
            }
            let level = view.selected_level.map_or("", ProficiencyLevel::label);
            writeln!(out, "  [a] Nochmal spielen ({level})")?;
            writeln!(out, "  [l] Anderes Level wählen")?;
        }
        StageTag::PlacementResult => {
            if let Some(level) = view.determined_level {
                writeln!(out, "Dein geschätztes Deutsch-Niveau ist: {level}")?;
                if let Some(tally) = view.tally {
                    for candidate in ProficiencyLevel::ALL {
                        if tally.asked(candidate) > 0 {
                            writeln!(
                                out,
                                "  {}: {}/{}",
                                candidate.code(),
                                tally.correct(candidate),
                                tally.asked(candidate)
                            )?;
                        }
                    }
                }
                if let Some(next) = level.next_up() {
                    writeln!(out, "Nächstes Ziel: {next}")?;
                }
                writeln!(out, "  [p] Üben ({})", level.code())?;
            }
            writeln!(out, "  [l] Anderes Level üben")?;
            writeln!(out, "  [t] Test wiederholen")?;
        }
        StageTag::PracticeLoading | StageTag::PlacementLoading | StageTag::PlacementCalculating => {}
    }

    if view.can_go_home {
        writeln!(out, "  [h] home")?;
    }
    Ok(())
}

fn render_question(out: &mut String, view: &SessionView) -> std::fmt::Result {
    let Some(question) = &view.question else {
        return Ok(());
    };
    if let Some(progress) = view.progress {
        let header = match view.stage {
            StageTag::PlacementActive => "Placement Test".to_string(),
            _ => format!("Level: {}", question.level()),
        };
        writeln!(
            out,
            "{header} - Frage {} von {}",
            progress.position, progress.total
        )?;
    }
    if let Some(score) = view.running_score {
        writeln!(out, "Punkte: {score}")?;
    }
    writeln!(out, "{}", question.question_text())?;

    match &view.feedback {
        None => {
            for (index, option) in question.options().iter().enumerate() {
                writeln!(out, "  [{}] {}", index + 1, option.text)?;
            }
        }
        Some(feedback) => {
            if feedback.correct {
                writeln!(out, "Richtig!")?;
            } else {
                writeln!(out, "Leider Falsch!")?;
                if let Some(chosen) = question.option(&feedback.selected_option_id) {
                    writeln!(out, "Deine Antwort: {}", chosen.text)?;
                }
                if let Some(correct) = question.option(&feedback.correct_option_id) {
                    writeln!(out, "Richtige Antwort: {}", correct.text)?;
                }
            }
            if let Some(explanation) = &feedback.explanation {
                writeln!(out, "{explanation}")?;
            }
            writeln!(out, "  [n] weiter")?;
        }
    }
    Ok(())
}
