use std::collections::HashSet;
use std::time::Duration;

use tokio::time::Instant;

use quiz_core::model::{OptionId, ProficiencyLevel, Question, QuizSettings};
use services::{
    Effect, Mode, ProviderCall, ProviderError, QuestionProvider, SessionController, SessionEvent,
    SessionView, StageTag, StaticQuestionProvider,
};

fn settings() -> QuizSettings {
    QuizSettings::default()
        .with_practice_question_count(4)
        .unwrap()
        .with_result_delay(Duration::ZERO)
}

fn controller() -> (SessionController<StaticQuestionProvider>, StaticQuestionProvider) {
    let provider = StaticQuestionProvider::sample().unwrap();
    (
        SessionController::new(provider.clone(), settings()),
        provider,
    )
}

fn wrong_option(question: &Question) -> OptionId {
    question
        .options()
        .iter()
        .find(|option| &option.id != question.correct_answer())
        .map(|option| option.id.clone())
        .unwrap()
}

/// Answers A1 and A2 perfectly, two B1 questions right, everything else wrong.
async fn finish_placement(
    controller: &mut SessionController<StaticQuestionProvider>,
    mut view: SessionView,
) -> SessionView {
    let mut b1_right = 0;
    while view.stage == StageTag::PlacementActive {
        let question = view.question.clone().unwrap();
        let right = match question.level() {
            ProficiencyLevel::A1 | ProficiencyLevel::A2 => true,
            ProficiencyLevel::B1 => {
                b1_right += 1;
                b1_right <= 2
            }
            _ => false,
        };
        let option = if right {
            question.correct_answer().clone()
        } else {
            wrong_option(&question)
        };
        view = controller.dispatch(SessionEvent::SubmitAnswer(option)).await;
        if view.stage == StageTag::PlacementActive {
            view = controller.dispatch(SessionEvent::Advance).await;
        }
    }
    view
}

#[tokio::test]
async fn practice_run_scores_and_completes() {
    let (mut controller, provider) = controller();

    let view = controller
        .dispatch(SessionEvent::SelectMode(Mode::Practice))
        .await;
    assert_eq!(view.stage, StageTag::PracticeLevelSelect);
    assert!(!view.can_go_home);

    let mut view = controller
        .dispatch(SessionEvent::SelectPracticeLevel(ProficiencyLevel::B1))
        .await;
    assert_eq!(view.stage, StageTag::PracticeActive);
    assert_eq!(view.progress.unwrap().total, 4);

    let mut asked = 0;
    while view.stage == StageTag::PracticeActive {
        let question = view.question.clone().unwrap();
        assert_eq!(question.level(), ProficiencyLevel::B1);
        asked += 1;
        let option = if asked == 4 {
            wrong_option(&question)
        } else {
            question.correct_answer().clone()
        };

        view = controller.dispatch(SessionEvent::SubmitAnswer(option)).await;
        let feedback = view.feedback.clone().unwrap();
        assert_eq!(feedback.correct, asked != 4);
        assert_eq!(&feedback.correct_option_id, question.correct_answer());

        view = controller.dispatch(SessionEvent::Advance).await;
    }

    assert_eq!(asked, 4);
    assert_eq!(view.stage, StageTag::PracticeComplete);
    assert_eq!(view.final_score, Some((3, 4)));
    assert_eq!(
        provider.calls().unwrap(),
        vec![ProviderCall::Practice {
            level: ProficiencyLevel::B1,
            count: 4
        }]
    );
}

#[tokio::test]
async fn play_again_reloads_and_change_level_clears_it() {
    let (mut controller, provider) = controller();
    controller
        .dispatch(SessionEvent::SelectMode(Mode::Practice))
        .await;
    let mut view = controller
        .dispatch(SessionEvent::SelectPracticeLevel(ProficiencyLevel::A1))
        .await;
    while view.stage == StageTag::PracticeActive {
        let question = view.question.clone().unwrap();
        controller
            .dispatch(SessionEvent::SubmitAnswer(question.correct_answer().clone()))
            .await;
        view = controller.dispatch(SessionEvent::Advance).await;
    }
    assert_eq!(view.final_score, Some((4, 4)));

    let view = controller.dispatch(SessionEvent::PlayAgain).await;
    assert_eq!(view.stage, StageTag::PracticeActive);
    assert_eq!(view.running_score, Some(0));
    assert_eq!(provider.calls().unwrap().len(), 2);

    let generation = controller.state().generation();
    controller.dispatch(SessionEvent::GoHome).await;
    assert!(controller.state().generation() > generation);

    controller
        .dispatch(SessionEvent::SelectMode(Mode::Practice))
        .await;
    let mut view = controller
        .dispatch(SessionEvent::SelectPracticeLevel(ProficiencyLevel::C1))
        .await;
    while view.stage == StageTag::PracticeActive {
        let question = view.question.clone().unwrap();
        controller
            .dispatch(SessionEvent::SubmitAnswer(wrong_option(&question)))
            .await;
        view = controller.dispatch(SessionEvent::Advance).await;
    }
    assert_eq!(view.final_score, Some((0, 4)));

    let view = controller.dispatch(SessionEvent::ChangeLevel).await;
    assert_eq!(view.stage, StageTag::PracticeLevelSelect);
    assert_eq!(view.selected_level, None);
}

#[tokio::test]
async fn empty_practice_load_keeps_level_and_offers_retry() {
    let (mut controller, provider) = controller();
    provider.push_practice(Ok(Vec::new())).unwrap();

    controller
        .dispatch(SessionEvent::SelectMode(Mode::Practice))
        .await;
    let view = controller
        .dispatch(SessionEvent::SelectPracticeLevel(ProficiencyLevel::B1))
        .await;

    assert_eq!(view.stage, StageTag::PracticeLevelSelect);
    assert_eq!(view.selected_level, Some(ProficiencyLevel::B1));
    let message = view.error_message.unwrap();
    assert!(message.contains("B1 (Intermediate)"));
    assert!(view.can_retry);
    assert!(view.can_go_home);

    let view = controller.dispatch(SessionEvent::RetryLoad).await;
    assert_eq!(view.stage, StageTag::PracticeActive);
    assert!(view.error_message.is_none());
}

#[tokio::test]
async fn off_level_batch_from_provider_is_a_load_failure() {
    let (mut controller, provider) = controller();
    let advanced = provider
        .request_practice_questions(ProficiencyLevel::C1, 4)
        .await
        .unwrap();
    provider.push_practice(Ok(advanced)).unwrap();

    controller
        .dispatch(SessionEvent::SelectMode(Mode::Practice))
        .await;
    let view = controller
        .dispatch(SessionEvent::SelectPracticeLevel(ProficiencyLevel::A1))
        .await;
    assert_eq!(view.stage, StageTag::PracticeLevelSelect);
    assert!(view.error_message.is_some());
}

#[tokio::test]
async fn placement_run_reports_highest_level_over_threshold() {
    let (mut controller, provider) = controller();

    let view = controller
        .dispatch(SessionEvent::SelectMode(Mode::PlacementTest))
        .await;
    assert_eq!(view.stage, StageTag::PlacementActive);
    assert_eq!(view.progress.unwrap().total, 20);
    assert_eq!(
        provider.calls().unwrap(),
        vec![ProviderCall::Placement {
            levels: ProficiencyLevel::ALL.to_vec(),
            count_per_level: 4
        }]
    );

    let view = finish_placement(&mut controller, view).await;
    assert_eq!(view.stage, StageTag::PlacementResult);
    assert_eq!(view.determined_level, Some(ProficiencyLevel::A2));
    let tally = view.tally.unwrap();
    assert_eq!(tally.correct(ProficiencyLevel::A2), 4);
    assert_eq!(tally.correct(ProficiencyLevel::B1), 2);
    assert_eq!(tally.asked(ProficiencyLevel::C1), 4);
    assert!(view.can_go_home);

    let view = controller
        .dispatch(SessionEvent::PracticeDeterminedLevel)
        .await;
    assert_eq!(view.stage, StageTag::PracticeActive);
    assert_eq!(view.selected_level, Some(ProficiencyLevel::A2));
    assert_eq!(
        view.question.map(|question| question.level()),
        Some(ProficiencyLevel::A2)
    );
}

#[tokio::test(start_paused = true)]
async fn result_screen_offers_retake_and_level_menu() {
    let provider = StaticQuestionProvider::sample().unwrap();
    let mut controller = SessionController::new(provider, QuizSettings::default());

    let view = controller
        .dispatch(SessionEvent::SelectMode(Mode::PlacementTest))
        .await;
    let view = finish_placement(&mut controller, view).await;
    assert_eq!(view.determined_level, Some(ProficiencyLevel::A2));

    let view = controller.dispatch(SessionEvent::RetakeTest).await;
    assert_eq!(view.stage, StageTag::PlacementActive);
    assert_eq!(view.progress.unwrap().answered, 0);

    let view = finish_placement(&mut controller, view).await;
    assert_eq!(view.stage, StageTag::PlacementResult);
    let view = controller
        .dispatch(SessionEvent::PracticeDifferentLevel)
        .await;
    assert_eq!(view.stage, StageTag::PracticeLevelSelect);
    assert_eq!(view.selected_level, None);
}

#[tokio::test(start_paused = true)]
async fn placement_result_waits_for_the_reveal_delay() {
    let settings = QuizSettings::default();
    let delay = settings.result_delay();
    let provider = StaticQuestionProvider::sample().unwrap();
    let mut controller = SessionController::new(provider, settings);

    let mut view = controller
        .dispatch(SessionEvent::SelectMode(Mode::PlacementTest))
        .await;
    let reveal = loop {
        let question = view.question.clone().unwrap();
        if let Some(effect) =
            controller.handle(SessionEvent::SubmitAnswer(question.correct_answer().clone()))
        {
            break effect;
        }
        view = controller.dispatch(SessionEvent::Advance).await;
        assert_eq!(view.stage, StageTag::PlacementActive);
    };
    assert!(matches!(reveal, Effect::RevealResultAfter { .. }));
    assert_eq!(controller.view().stage, StageTag::PlacementCalculating);
    assert_eq!(controller.view().determined_level, None);

    let started = Instant::now();
    let completion = controller.perform(reveal).await;
    assert!(started.elapsed() >= delay);
    assert!(matches!(completion, SessionEvent::ResultDelayElapsed { .. }));
    assert_eq!(controller.view().stage, StageTag::PlacementCalculating);

    assert!(controller.handle(completion).is_none());
    let view = controller.view();
    assert_eq!(view.stage, StageTag::PlacementResult);
    assert_eq!(view.determined_level, Some(ProficiencyLevel::C1));
}

#[tokio::test]
async fn placement_questions_arrive_sorted_by_level() {
    let (mut controller, _) = controller();
    let mut view = controller
        .dispatch(SessionEvent::SelectMode(Mode::PlacementTest))
        .await;

    let mut levels = Vec::new();
    while view.stage == StageTag::PlacementActive {
        let question = view.question.clone().unwrap();
        levels.push(question.level());
        view = controller
            .dispatch(SessionEvent::SubmitAnswer(question.correct_answer().clone()))
            .await;
        if view.stage == StageTag::PlacementActive {
            view = controller.dispatch(SessionEvent::Advance).await;
        }
    }
    assert!(levels.windows(2).all(|pair| pair[0] <= pair[1]));
    assert_eq!(view.determined_level, Some(ProficiencyLevel::C1));
}

#[tokio::test]
async fn reveal_after_go_home_is_ignored() {
    let (mut controller, _) = controller();

    let fetch = controller
        .handle(SessionEvent::SelectMode(Mode::PlacementTest))
        .unwrap();
    let loaded = controller.perform(fetch).await;
    assert!(controller.handle(loaded).is_none());

    let reveal = loop {
        let question = controller.view().question.unwrap();
        let effect =
            controller.handle(SessionEvent::SubmitAnswer(question.correct_answer().clone()));
        if let Some(effect) = effect {
            break effect;
        }
        assert!(controller.handle(SessionEvent::Advance).is_none());
    };
    assert_eq!(controller.view().stage, StageTag::PlacementCalculating);

    controller.handle(SessionEvent::GoHome);
    let late = controller.perform(reveal).await;
    assert!(controller.handle(late).is_none());

    let view = controller.view();
    assert_eq!(view.stage, StageTag::ChoosingMode);
    assert!(view.determined_level.is_none());
}

#[tokio::test]
async fn late_questions_after_go_home_are_ignored() {
    let (mut controller, _) = controller();
    controller.handle(SessionEvent::SelectMode(Mode::Practice));
    let fetch = controller
        .handle(SessionEvent::SelectPracticeLevel(ProficiencyLevel::A2))
        .unwrap();

    controller.handle(SessionEvent::GoHome);
    let late = controller.perform(fetch).await;
    controller.handle(late);

    let view = controller.view();
    assert_eq!(view.stage, StageTag::ChoosingMode);
    assert!(view.question.is_none());
    assert_eq!(view.selected_level, None);
}

#[tokio::test]
async fn failed_placement_load_offers_retry_until_go_home() {
    let (mut controller, provider) = controller();
    provider
        .push_placement(Err(ProviderError::Unauthorized))
        .unwrap();

    let view = controller
        .dispatch(SessionEvent::SelectMode(Mode::PlacementTest))
        .await;
    assert_eq!(view.stage, StageTag::ChoosingMode);
    assert!(view.error_message.unwrap().contains("API key"));
    assert!(view.can_retry);

    let view = controller.dispatch(SessionEvent::GoHome).await;
    assert!(view.error_message.is_none());
    assert!(!view.can_retry);

    provider
        .push_placement(Err(ProviderError::QuotaExceeded))
        .unwrap();
    controller
        .dispatch(SessionEvent::SelectMode(Mode::PlacementTest))
        .await;
    let view = controller.dispatch(SessionEvent::RetryLoad).await;
    assert_eq!(view.stage, StageTag::PlacementActive);
}

#[tokio::test]
async fn unknown_option_changes_nothing() {
    let (mut controller, _) = controller();
    controller
        .dispatch(SessionEvent::SelectMode(Mode::Practice))
        .await;
    let before = controller
        .dispatch(SessionEvent::SelectPracticeLevel(ProficiencyLevel::A1))
        .await;

    let after = controller
        .dispatch(SessionEvent::SubmitAnswer(OptionId::new("not-an-option")))
        .await;
    assert_eq!(after, before);
    assert!(after.feedback.is_none());

    let after = controller.dispatch(SessionEvent::Advance).await;
    assert_eq!(after, before);
}

#[tokio::test]
async fn shuffled_practice_keeps_the_same_questions() {
    let provider = StaticQuestionProvider::sample().unwrap();
    let mut controller = SessionController::new(provider, settings()).with_shuffle(true);
    controller
        .dispatch(SessionEvent::SelectMode(Mode::Practice))
        .await;
    controller
        .dispatch(SessionEvent::SelectPracticeLevel(ProficiencyLevel::B2))
        .await;

    let engine = controller.state().engine().unwrap();
    let ids: HashSet<_> = engine
        .questions()
        .iter()
        .map(|question| question.id().as_str().to_owned())
        .collect();
    let expected: HashSet<_> = ["b2-1", "b2-2", "b2-3", "b2-4"]
        .into_iter()
        .map(str::to_owned)
        .collect();
    assert_eq!(ids, expected);
}
