/// Guided tour example — a guide character, a market quiz, and a HUD.
///
/// The guide's phases play through the presenter; the quiz reuses the same
/// presenter for its spoken feedback. A fake 30 fps frame loop drives
/// everything.
///
/// Run with: cargo run --example guided_tour

use dialogue_presenter::core::phases::{PhaseDirector, PhaseEvent, PhaseScript};
use dialogue_presenter::core::presenter::{Presenter, PresenterEvent};
use dialogue_presenter::core::quiz::{QuizDeck, QuizEvent, QuizFlow};
use dialogue_presenter::core::wallet::Wallet;
use std::path::Path;
use std::time::Duration;

const FRAME: Duration = Duration::from_millis(33);

fn main() {
    env_logger::init();

    let script = PhaseScript::load_from_ron(Path::new("tests/fixtures/guide_phases.ron"))
        .expect("Failed to load guide phases");
    let deck = QuizDeck::load_from_ron(Path::new("tests/fixtures/market_quiz.ron"))
        .expect("Failed to load quiz deck");

    let mut presenter = Presenter::builder()
        .display_duration(2.0)
        .build()
        .expect("Failed to build presenter");
    let mut guide = PhaseDirector::new(script);
    let mut quiz = QuizFlow::new(deck);
    let mut wallet = Wallet::new(0);

    guide.attach(&mut presenter);

    // --- The player rows into the harbour trigger ---
    println!("=== Harbour ===");
    let out = guide.on_trigger_enter("Player", &mut presenter);
    print_presenter(&out.presenter_events);

    let mut clock = Duration::ZERO;
    let mut quiz_started = false;
    // Scripted answers: right, wrong, right.
    let mut answers = vec![0usize, 2, 2].into_iter();

    while clock < Duration::from_secs(60) {
        clock += FRAME;

        let events = presenter.tick(FRAME);
        print_presenter(&events);
        for event in &events {
            let PresenterEvent::LineCompleted { token } = event else {
                continue;
            };
            for phase_event in guide.on_line_completed(*token) {
                match phase_event {
                    PhaseEvent::PhaseFinished { phase: 0 } => {
                        println!("\n=== Rowing across ===");
                        let out = guide.speak_next_phase(&mut presenter);
                        print_presenter(&out.presenter_events);
                    }
                    PhaseEvent::PhaseFinished { phase: 1 } => {
                        println!("\n=== Market ===");
                        let out = guide.speak_phase_by_name("Market_Quiz", &mut presenter);
                        print_presenter(&out.presenter_events);
                    }
                    PhaseEvent::AllPhasesComplete if !quiz_started => {
                        quiz_started = true;
                        let started = quiz.start();
                        print_quiz(&quiz, &started);
                    }
                    _ => {}
                }
            }
        }

        if quiz.is_active() && !quiz.in_feedback() {
            if let Some(choice) = answers.next() {
                let out = quiz.submit_answer(choice, &mut wallet, Some(&mut presenter));
                print_quiz(&quiz, &out.events);
                print_presenter(&out.presenter_events);
            }
        }
        let quiz_events = quiz.tick(FRAME);
        print_quiz(&quiz, &quiz_events);

        if quiz_started && !quiz.is_active() && !presenter.is_playing() {
            break;
        }
    }

    println!("\nFinal balance: {} coins", wallet.balance());
}

fn print_presenter(events: &[PresenterEvent]) {
    for event in events {
        if let PresenterEvent::SurfaceShown { surface, text } = event {
            let who = if surface.0 == 0 { "HUD" } else { "Guide" };
            println!("  [{}] {}", who, text);
        }
    }
}

fn print_quiz(quiz: &QuizFlow, events: &[QuizEvent]) {
    for event in events {
        match event {
            QuizEvent::QuestionShown { question } => {
                let q = &quiz.deck().questions[*question];
                println!("\n  Q: {}", q.question);
                for (i, choice) in q.choices.iter().enumerate() {
                    println!("     {}) {}", (b'A' + i as u8) as char, choice);
                }
            }
            QuizEvent::AnswerCorrect { reward, .. } => println!("  Correct! +{}", reward),
            QuizEvent::AnswerWrong { penalty, .. } => println!("  Wrong. -{}", penalty),
            QuizEvent::AllQuestionsAnswered => println!("\n  Every question answered."),
            _ => {}
        }
    }
}
