/// Quiz flow — multiple-choice questions with money rewards.
///
/// Answers pay out through a `Wallet`. After each answer the flow pauses
/// for a feedback period (the host shows a full or empty chest), then
/// moves on by itself. Optional feedback text is spoken through the
/// presenter so it preempts whatever a character was saying.

use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::core::presenter::Presenter;
use crate::core::producer::ProducerOutput;
use crate::core::wallet::{Wallet, WalletEvent};
use crate::schema::line::Line;

#[derive(Debug, Error)]
pub enum QuizError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("question {index} is invalid: {reason}")]
    InvalidQuestion { index: usize, reason: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub question: String,
    pub choices: Vec<String>,
    /// Index into `choices`.
    pub correct: usize,
    #[serde(default = "default_reward")]
    pub reward: u64,
    #[serde(default)]
    pub penalty: u64,
}

fn default_reward() -> u64 {
    100
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizSettings {
    #[serde(default)]
    pub randomize: bool,
    #[serde(default)]
    pub allow_retry: bool,
    #[serde(default = "default_feedback_duration")]
    pub feedback_duration_secs: f32,
    #[serde(default)]
    pub correct_feedback: Option<String>,
    #[serde(default)]
    pub wrong_feedback: Option<String>,
    /// Seed for question shuffling.
    #[serde(default)]
    pub seed: u64,
}

fn default_feedback_duration() -> f32 {
    2.0
}

impl Default for QuizSettings {
    fn default() -> Self {
        Self {
            randomize: false,
            allow_retry: false,
            feedback_duration_secs: default_feedback_duration(),
            correct_feedback: None,
            wrong_feedback: None,
            seed: 0,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuizDeck {
    pub questions: Vec<QuizQuestion>,
    #[serde(default)]
    pub settings: QuizSettings,
}

impl QuizDeck {
    pub fn validate(&self) -> Result<(), QuizError> {
        for (index, q) in self.questions.iter().enumerate() {
            if q.question.trim().is_empty() {
                return Err(QuizError::InvalidQuestion {
                    index,
                    reason: "question text is empty".to_string(),
                });
            }
            if q.correct >= q.choices.len() {
                return Err(QuizError::InvalidQuestion {
                    index,
                    reason: format!(
                        "correct answer {} but only {} choices",
                        q.correct,
                        q.choices.len()
                    ),
                });
            }
        }
        Ok(())
    }

    pub fn parse_ron(input: &str) -> Result<Self, QuizError> {
        let deck: QuizDeck = ron::from_str(input)?;
        deck.validate()?;
        Ok(deck)
    }

    pub fn load_from_ron(path: &Path) -> Result<Self, QuizError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuizEvent {
    Started,
    /// Show this question (an index into the deck) and its choices.
    QuestionShown { question: usize },
    AnswerCorrect { question: usize, reward: u64 },
    AnswerWrong { question: usize, penalty: u64 },
    Wallet(WalletEvent),
    /// The question panel gives way to the result chest.
    FeedbackShown { correct: bool },
    FeedbackHidden,
    Completed,
    AllQuestionsAnswered,
}

#[derive(Debug, Clone)]
struct Feedback {
    remaining: Duration,
}

pub struct QuizFlow {
    deck: QuizDeck,
    order: Vec<usize>,
    cursor: usize,
    answered: FxHashSet<usize>,
    active: bool,
    feedback: Option<Feedback>,
    feedback_duration: Duration,
    rng: StdRng,
}

impl QuizFlow {
    pub fn new(deck: QuizDeck) -> Self {
        let secs = deck.settings.feedback_duration_secs;
        let feedback_duration = match Duration::try_from_secs_f32(secs) {
            Ok(d) => d,
            Err(_) if secs > 0.0 => {
                warn!("feedback duration {}s is out of range; clamping", secs);
                Duration::MAX
            }
            Err(_) => Duration::ZERO,
        };
        let rng = StdRng::seed_from_u64(deck.settings.seed);
        let mut flow = Self {
            deck,
            order: Vec::new(),
            cursor: 0,
            answered: FxHashSet::default(),
            active: false,
            feedback: None,
            feedback_duration,
            rng,
        };
        flow.rebuild_order();
        flow
    }

    pub fn deck(&self) -> &QuizDeck {
        &self.deck
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn in_feedback(&self) -> bool {
        self.feedback.is_some()
    }

    /// The deck index of the question currently asked.
    pub fn current_index(&self) -> Option<usize> {
        if !self.active {
            return None;
        }
        self.order.get(self.cursor).copied()
    }

    pub fn current_question(&self) -> Option<&QuizQuestion> {
        self.current_index().map(|i| &self.deck.questions[i])
    }

    /// Questions in the order they will be asked.
    pub fn order(&self) -> &[usize] {
        &self.order
    }

    pub fn answered_count(&self) -> usize {
        self.answered.len()
    }

    pub fn total_questions(&self) -> usize {
        self.deck.questions.len()
    }

    pub fn start(&mut self) -> Vec<QuizEvent> {
        let mut events = Vec::new();
        if self.deck.questions.is_empty() {
            warn!("quiz has no questions");
            return events;
        }
        if !self.deck.settings.allow_retry {
            self.answered.clear();
        }
        self.rebuild_order();
        self.cursor = 0;
        self.active = true;
        self.feedback = None;
        events.push(QuizEvent::Started);
        self.show_current(&mut events);
        events
    }

    /// Jump to a specific deck question.
    pub fn show_question(&mut self, index: usize) -> Vec<QuizEvent> {
        let mut events = Vec::new();
        if index >= self.deck.questions.len() {
            warn!("question index {} is out of range", index);
            return events;
        }
        if !self.deck.settings.allow_retry && self.answered.contains(&index) {
            info!("question {} already answered", index);
            return events;
        }
        let Some(position) = self.order.iter().position(|&q| q == index) else {
            return events;
        };
        self.cursor = position;
        self.active = true;
        self.feedback = None;
        self.show_current(&mut events);
        events
    }

    pub fn show_next(&mut self) -> Vec<QuizEvent> {
        let mut events = Vec::new();
        self.advance_question(&mut events);
        events
    }

    /// Answer the current question with choice `choice`.
    pub fn submit_answer(
        &mut self,
        choice: usize,
        wallet: &mut Wallet,
        presenter: Option<&mut Presenter>,
    ) -> ProducerOutput<QuizEvent> {
        let mut out = ProducerOutput::new();
        if self.feedback.is_some() {
            debug!("answer ignored while feedback is showing");
            return out;
        }
        let Some(index) = self.current_index() else {
            debug!("answer ignored: quiz is not active");
            return out;
        };
        let question = &self.deck.questions[index];
        if choice >= question.choices.len() {
            warn!(
                "choice {} is out of range for question {} ({} choices)",
                choice,
                index,
                question.choices.len()
            );
            return out;
        }

        self.answered.insert(index);
        let correct = choice == question.correct;
        let feedback_text = if correct {
            info!("correct answer to question {}", index);
            out.push(QuizEvent::AnswerCorrect {
                question: index,
                reward: question.reward,
            });
            out.events
                .extend(wallet.add(question.reward).into_iter().map(QuizEvent::Wallet));
            self.deck.settings.correct_feedback.clone()
        } else {
            info!("wrong answer to question {}", index);
            out.push(QuizEvent::AnswerWrong {
                question: index,
                penalty: question.penalty,
            });
            out.events.extend(
                wallet
                    .remove(question.penalty)
                    .into_iter()
                    .map(QuizEvent::Wallet),
            );
            self.deck.settings.wrong_feedback.clone()
        };

        if let (Some(text), Some(presenter)) = (feedback_text, presenter) {
            out.extend_presenter(presenter.show_now(Line::primary(text)));
        }

        out.push(QuizEvent::FeedbackShown { correct });
        self.feedback = Some(Feedback {
            remaining: self.feedback_duration,
        });
        if self.feedback_duration.is_zero() {
            self.finish_feedback(&mut out.events);
        }
        out
    }

    /// Count down the feedback pause.
    pub fn tick(&mut self, dt: Duration) -> Vec<QuizEvent> {
        let mut events = Vec::new();
        let Some(feedback) = self.feedback.as_mut() else {
            return events;
        };
        feedback.remaining = feedback.remaining.saturating_sub(dt);
        if feedback.remaining.is_zero() {
            self.finish_feedback(&mut events);
        }
        events
    }

    pub fn end(&mut self) -> Vec<QuizEvent> {
        let mut events = Vec::new();
        self.end_into(&mut events);
        events
    }

    /// Forget answered questions and reshuffle.
    pub fn reset(&mut self) {
        self.answered.clear();
        self.rebuild_order();
        self.cursor = 0;
    }

    fn finish_feedback(&mut self, events: &mut Vec<QuizEvent>) {
        self.feedback = None;
        events.push(QuizEvent::FeedbackHidden);
        self.advance_question(events);
    }

    fn advance_question(&mut self, events: &mut Vec<QuizEvent>) {
        if self.cursor + 1 < self.order.len() {
            self.cursor += 1;
            self.show_current(events);
        } else {
            self.end_into(events);
        }
    }

    fn show_current(&mut self, events: &mut Vec<QuizEvent>) {
        match self.order.get(self.cursor) {
            Some(&question) => events.push(QuizEvent::QuestionShown { question }),
            None => self.end_into(events),
        }
    }

    fn end_into(&mut self, events: &mut Vec<QuizEvent>) {
        self.active = false;
        self.feedback = None;
        events.push(QuizEvent::Completed);
        if self.answered.len() >= self.deck.questions.len() {
            events.push(QuizEvent::AllQuestionsAnswered);
        }
    }

    fn rebuild_order(&mut self) {
        self.order = (0..self.deck.questions.len()).collect();
        if self.deck.settings.randomize {
            self.order.shuffle(&mut self.rng);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::presenter::PresenterEvent;

    fn question(text: &str, correct: usize) -> QuizQuestion {
        QuizQuestion {
            question: text.to_string(),
            choices: vec!["A".to_string(), "B".to_string(), "C".to_string()],
            correct,
            reward: 100,
            penalty: 25,
        }
    }

    fn deck() -> QuizDeck {
        QuizDeck {
            questions: vec![question("First?", 0), question("Second?", 2)],
            settings: QuizSettings::default(),
        }
    }

    #[test]
    fn start_shows_first_question() {
        let mut quiz = QuizFlow::new(deck());
        let events = quiz.start();
        assert_eq!(
            events,
            vec![QuizEvent::Started, QuizEvent::QuestionShown { question: 0 }]
        );
        assert_eq!(quiz.current_question().unwrap().question, "First?");
    }

    #[test]
    fn empty_deck_does_not_start() {
        let mut quiz = QuizFlow::new(QuizDeck::default());
        assert!(quiz.start().is_empty());
        assert!(!quiz.is_active());
    }

    #[test]
    fn correct_answer_pays_and_pauses() {
        let mut quiz = QuizFlow::new(deck());
        let mut wallet = Wallet::default();
        quiz.start();

        let out = quiz.submit_answer(0, &mut wallet, None);
        assert_eq!(
            out.events,
            vec![
                QuizEvent::AnswerCorrect {
                    question: 0,
                    reward: 100
                },
                QuizEvent::Wallet(WalletEvent::Added(100)),
                QuizEvent::Wallet(WalletEvent::Changed(100)),
                QuizEvent::FeedbackShown { correct: true },
            ]
        );
        assert_eq!(wallet.balance(), 100);
        assert!(quiz.in_feedback());

        // Answers during feedback are ignored.
        assert!(quiz.submit_answer(1, &mut wallet, None).is_empty());

        assert!(quiz.tick(Duration::from_secs(1)).is_empty());
        let events = quiz.tick(Duration::from_secs(1));
        assert_eq!(
            events,
            vec![
                QuizEvent::FeedbackHidden,
                QuizEvent::QuestionShown { question: 1 }
            ]
        );
    }

    #[test]
    fn wrong_answer_applies_penalty() {
        let mut quiz = QuizFlow::new(deck());
        let mut wallet = Wallet::new(10);
        quiz.start();
        let out = quiz.submit_answer(2, &mut wallet, None);
        assert_eq!(
            out.events[0],
            QuizEvent::AnswerWrong {
                question: 0,
                penalty: 25
            }
        );
        assert_eq!(wallet.balance(), 0);
    }

    #[test]
    fn finishing_every_question_completes_quiz() {
        let mut quiz = QuizFlow::new(deck());
        let mut wallet = Wallet::default();
        quiz.start();
        quiz.submit_answer(0, &mut wallet, None);
        quiz.tick(Duration::from_secs(2));
        quiz.submit_answer(1, &mut wallet, None);
        let events = quiz.tick(Duration::from_secs(2));
        assert_eq!(
            events,
            vec![
                QuizEvent::FeedbackHidden,
                QuizEvent::Completed,
                QuizEvent::AllQuestionsAnswered
            ]
        );
        assert!(!quiz.is_active());
        assert_eq!(quiz.answered_count(), 2);
        assert_eq!(wallet.balance(), 75);
    }

    #[test]
    fn ending_early_skips_all_answered() {
        let mut quiz = QuizFlow::new(deck());
        quiz.start();
        assert_eq!(quiz.end(), vec![QuizEvent::Completed]);
    }

    #[test]
    fn out_of_range_choice_is_ignored() {
        let mut quiz = QuizFlow::new(deck());
        let mut wallet = Wallet::default();
        quiz.start();
        assert!(quiz.submit_answer(7, &mut wallet, None).is_empty());
        assert_eq!(quiz.answered_count(), 0);
    }

    #[test]
    fn inactive_quiz_ignores_answers() {
        let mut quiz = QuizFlow::new(deck());
        let mut wallet = Wallet::default();
        assert!(quiz.submit_answer(0, &mut wallet, None).is_empty());
    }

    #[test]
    fn show_question_skips_answered_without_retry() {
        let mut quiz = QuizFlow::new(deck());
        let mut wallet = Wallet::default();
        quiz.start();
        quiz.submit_answer(0, &mut wallet, None);
        quiz.tick(Duration::from_secs(5));

        assert!(quiz.show_question(0).is_empty());
        assert!(quiz.show_question(5).is_empty());
        assert_eq!(
            quiz.show_question(1),
            vec![QuizEvent::QuestionShown { question: 1 }]
        );
    }

    #[test]
    fn feedback_text_goes_through_presenter() {
        let mut d = deck();
        d.settings.correct_feedback = Some("Treasure!".to_string());
        let mut quiz = QuizFlow::new(d);
        let mut wallet = Wallet::default();
        let mut presenter = Presenter::builder().build().unwrap();
        presenter.enqueue_batch(&["chatter", "more chatter"], None, None);
        quiz.start();

        let out = quiz.submit_answer(0, &mut wallet, Some(&mut presenter));
        assert!(out.presenter_events.contains(&PresenterEvent::SurfaceShown {
            surface: crate::schema::line::SurfaceId::PRIMARY,
            text: "Treasure!".to_string()
        }));
        assert_eq!(presenter.queue_len(), 0);
    }

    #[test]
    fn zero_feedback_moves_on_immediately() {
        let mut d = deck();
        d.settings.feedback_duration_secs = 0.0;
        let mut quiz = QuizFlow::new(d);
        let mut wallet = Wallet::default();
        quiz.start();
        let out = quiz.submit_answer(0, &mut wallet, None);
        assert_eq!(
            out.events.last(),
            Some(&QuizEvent::QuestionShown { question: 1 })
        );
        assert!(!quiz.in_feedback());
    }

    #[test]
    fn oversized_feedback_duration_is_clamped() {
        let mut d = deck();
        d.settings.feedback_duration_secs = 1e20;
        let mut quiz = QuizFlow::new(d);
        let mut wallet = Wallet::default();
        quiz.start();
        quiz.submit_answer(0, &mut wallet, None);
        assert!(quiz.in_feedback());
        assert!(quiz.tick(Duration::from_secs(3600)).is_empty());
        assert!(quiz.in_feedback());
    }

    #[test]
    fn shuffle_is_deterministic_per_seed() {
        let mut d = QuizDeck {
            questions: (0..8).map(|i| question(&format!("Q{}", i), 0)).collect(),
            settings: QuizSettings::default(),
        };
        d.settings.randomize = true;
        d.settings.seed = 7;

        let a = QuizFlow::new(d.clone());
        let b = QuizFlow::new(d);
        assert_eq!(a.order(), b.order());

        let mut sorted = a.order().to_vec();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..8).collect::<Vec<_>>());
    }

    #[test]
    fn validate_catches_bad_answer_index() {
        let deck = QuizDeck {
            questions: vec![question("Broken?", 3)],
            settings: QuizSettings::default(),
        };
        assert!(matches!(
            deck.validate(),
            Err(QuizError::InvalidQuestion { index: 0, .. })
        ));
    }

    #[test]
    fn deck_from_ron() {
        let deck = QuizDeck::parse_ron(
            r#"(
                questions: [
                    (question: "2 + 2?", choices: ["3", "4", "5"], correct: 1),
                ],
                settings: (allow_retry: true),
            )"#,
        )
        .unwrap();
        assert_eq!(deck.questions[0].reward, 100);
        assert_eq!(deck.questions[0].penalty, 0);
        assert!(deck.settings.allow_retry);
        assert_eq!(deck.settings.feedback_duration_secs, 2.0);
    }
}
