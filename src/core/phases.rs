/// Phase director — a character's named dialogue phases.
use log::{debug, info, warn};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::core::presenter::{Presenter, PresenterEvent};
use crate::core::producer::{speak_batch, ProducerOutput};
use crate::schema::line::{CompletionToken, Line, SurfaceId};

#[derive(Debug, Error)]
pub enum PhaseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
}

/// One named block of lines a character speaks in a single go.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DialoguePhase {
    pub name: String,
    #[serde(default)]
    pub lines: Vec<String>,
    /// The phase's own panel. Its first line is shown there.
    #[serde(default)]
    pub panel: Option<SurfaceId>,
}

/// When the director starts speaking without being asked explicitly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerSettings {
    #[serde(default)]
    pub speak_on_start: bool,
    #[serde(default)]
    pub start_phase: usize,
    #[serde(default)]
    pub speak_on_trigger_enter: bool,
    #[serde(default = "default_true")]
    pub speak_only_once: bool,
    #[serde(default = "default_player_tag")]
    pub player_tag: String,
}

fn default_true() -> bool {
    true
}

fn default_player_tag() -> String {
    "Player".to_string()
}

impl Default for TriggerSettings {
    fn default() -> Self {
        Self {
            speak_on_start: false,
            start_phase: 0,
            speak_on_trigger_enter: false,
            speak_only_once: true,
            player_tag: default_player_tag(),
        }
    }
}

/// Everything one character can say.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PhaseScript {
    pub phases: Vec<DialoguePhase>,
    #[serde(default)]
    pub triggers: TriggerSettings,
}

impl PhaseScript {
    pub fn parse_ron(input: &str) -> Result<Self, PhaseError> {
        Ok(ron::from_str(input)?)
    }

    pub fn load_from_ron(path: &Path) -> Result<Self, PhaseError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.phases.iter().position(|p| p.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PhaseEvent {
    /// A phase's lines were queued on the presenter.
    PhaseStarted { phase: usize },
    /// The last line of a phase finished.
    PhaseFinished { phase: usize },
    /// Every phase has been spoken, or there is no phase left to speak.
    AllPhasesComplete,
}

/// Drives a `PhaseScript` through a presenter.
///
/// The presenter knows nothing about phases; the director keeps the
/// speak-once bookkeeping and maps completion tokens back to phases.
#[derive(Debug, Clone)]
pub struct PhaseDirector {
    script: PhaseScript,
    current: Option<usize>,
    spoken: FxHashSet<usize>,
    pending: FxHashMap<CompletionToken, usize>,
}

impl PhaseDirector {
    pub fn new(script: PhaseScript) -> Self {
        Self {
            script,
            current: None,
            spoken: FxHashSet::default(),
            pending: FxHashMap::default(),
        }
    }

    pub fn script(&self) -> &PhaseScript {
        &self.script
    }

    /// Register every phase panel with the presenter.
    pub fn attach(&self, presenter: &mut Presenter) {
        for phase in &self.script.phases {
            if let Some(panel) = phase.panel {
                presenter.register_surface(panel);
            }
        }
    }

    /// Attach, then speak the start phase if the script asks for it.
    pub fn start(&mut self, presenter: &mut Presenter) -> ProducerOutput<PhaseEvent> {
        self.attach(presenter);
        let triggers = &self.script.triggers;
        if triggers.speak_on_start && triggers.start_phase < self.script.phases.len() {
            let start = triggers.start_phase;
            return self.speak_phase(start, presenter);
        }
        ProducerOutput::new()
    }

    pub fn speak_phase(
        &mut self,
        index: usize,
        presenter: &mut Presenter,
    ) -> ProducerOutput<PhaseEvent> {
        let mut out = ProducerOutput::new();
        let Some(phase) = self.script.phases.get(index) else {
            warn!("phase index {} is out of range", index);
            return out;
        };
        if phase.lines.is_empty() {
            warn!("phase '{}' has no dialogue lines", phase.name);
            return out;
        }
        if self.script.triggers.speak_only_once && self.spoken.contains(&index) {
            info!("phase '{}' already spoken", phase.name);
            return out;
        }

        self.current = Some(index);
        self.spoken.insert(index);
        out.push(PhaseEvent::PhaseStarted { phase: index });

        if let Some(token) = speak_batch(presenter, &phase.lines, phase.panel, &mut out.presenter_events)
        {
            self.pending.insert(token, index);
        }
        out
    }

    /// Speak the phase after the current one. Past the end this reports
    /// `AllPhasesComplete` instead.
    pub fn speak_next_phase(&mut self, presenter: &mut Presenter) -> ProducerOutput<PhaseEvent> {
        let next = self.current.map_or(0, |i| i + 1);
        if next < self.script.phases.len() {
            return self.speak_phase(next, presenter);
        }
        debug!("no more phases to speak");
        let mut out = ProducerOutput::new();
        out.push(PhaseEvent::AllPhasesComplete);
        out
    }

    pub fn speak_phase_by_name(
        &mut self,
        name: &str,
        presenter: &mut Presenter,
    ) -> ProducerOutput<PhaseEvent> {
        match self.script.index_of(name) {
            Some(index) => self.speak_phase(index, presenter),
            None => {
                warn!("phase with name '{}' not found", name);
                ProducerOutput::new()
            }
        }
    }

    /// Interrupt whatever is playing with one line of a phase, on that
    /// phase's panel. Does not count as speaking the phase. Phases that were
    /// still playing are cut off and never report `PhaseFinished`.
    pub fn speak_line_from_phase(
        &mut self,
        phase: usize,
        line: usize,
        presenter: &mut Presenter,
    ) -> ProducerOutput<PhaseEvent> {
        let mut out = ProducerOutput::new();
        let Some(p) = self.script.phases.get(phase) else {
            return out;
        };
        let Some(text) = p.lines.get(line) else {
            return out;
        };
        let line = match p.panel {
            Some(panel) => Line::secondary(text.clone(), panel),
            None => Line::primary(text.clone()),
        };
        self.pending.clear();
        out.extend_presenter(presenter.show_now(line));
        out
    }

    /// The host's trigger volume saw something with `tag` enter.
    pub fn on_trigger_enter(
        &mut self,
        tag: &str,
        presenter: &mut Presenter,
    ) -> ProducerOutput<PhaseEvent> {
        let triggers = &self.script.triggers;
        if !triggers.speak_on_trigger_enter || tag != triggers.player_tag {
            return ProducerOutput::new();
        }
        let start = triggers.start_phase;
        if triggers.speak_only_once && self.spoken.contains(&start) {
            return ProducerOutput::new();
        }
        self.speak_phase(start, presenter)
    }

    /// Resolve a presenter completion token. Tokens this director did not
    /// issue produce no events.
    pub fn on_line_completed(&mut self, token: CompletionToken) -> Vec<PhaseEvent> {
        let Some(phase) = self.pending.remove(&token) else {
            return Vec::new();
        };
        let mut events = vec![PhaseEvent::PhaseFinished { phase }];
        if self.spoken.len() >= self.script.phases.len() {
            events.push(PhaseEvent::AllPhasesComplete);
        }
        events
    }

    /// Allow a phase to be spoken again.
    pub fn reset_phase(&mut self, index: usize) {
        self.spoken.remove(&index);
    }

    pub fn reset_all(&mut self) {
        self.spoken.clear();
        self.pending.clear();
        self.current = None;
    }

    /// Stop the presenter and forget the phases it was playing.
    pub fn stop(&mut self, presenter: &mut Presenter) -> Vec<PresenterEvent> {
        self.pending.clear();
        presenter.stop()
    }

    /// Whether a spoken phase is still waiting for its last line.
    pub fn is_waiting(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn has_spoken(&self, index: usize) -> bool {
        self.spoken.contains(&index)
    }

    pub fn current_phase(&self) -> Option<usize> {
        self.current
    }
}
