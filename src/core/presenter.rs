/// The sequential message presenter: queue + drain state machine.
///
/// The host owns the frame loop. It feeds elapsed time through `tick`,
/// forwards the player's "next" input to `advance`, and mirrors the
/// returned `PresenterEvent`s onto its own UI.

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::core::surface::{SurfaceBoard, SurfaceState};
use crate::schema::config::{ConfigError, PlayMode, PresenterConfig, RoutingPolicy};
use crate::schema::line::{CompletionToken, Line, SurfaceId, SurfaceTarget};

#[derive(Debug, Error)]
pub enum PresenterError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}

/// Something the host has to react to, in the order it happened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PresenterEvent {
    /// A surface became visible (or stayed visible) with new text.
    SurfaceShown { surface: SurfaceId, text: String },
    /// A surface was hidden.
    SurfaceHidden { surface: SurfaceId },
    /// A line carrying a completion token finished its display period.
    LineCompleted { token: CompletionToken },
    /// The queue ran dry and every surface is hidden.
    StreamExhausted,
}

/// Public view of the playback state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackState {
    Idle,
    /// A line is up and its display timer is running.
    ShowingAuto,
    /// A line is up and waits for `advance`.
    AwaitingAdvance,
}

#[derive(Debug)]
enum Playback {
    Idle,
    ShowingAuto { line: Line, elapsed: Duration },
    AwaitingAdvance { line: Line },
}

/// Serializes lines from any number of producers onto the display surfaces.
pub struct Presenter {
    config: PresenterConfig,
    display_duration: Duration,
    board: SurfaceBoard,
    queue: VecDeque<Line>,
    playback: Playback,
    next_token: u64,
}

/// Builder for constructing a `Presenter`.
pub struct PresenterBuilder {
    config: PresenterConfig,
    config_path: Option<String>,
    surfaces: Vec<SurfaceId>,
}

impl Presenter {
    pub fn builder() -> PresenterBuilder {
        PresenterBuilder {
            config: PresenterConfig::default(),
            config_path: None,
            surfaces: Vec::new(),
        }
    }

    pub fn new(config: PresenterConfig) -> Result<Self, PresenterError> {
        config.validate()?;
        Ok(Self {
            display_duration: config.display_duration(),
            board: SurfaceBoard::new(config.primary_surface),
            queue: VecDeque::new(),
            playback: Playback::Idle,
            next_token: 0,
            config,
        })
    }

    pub fn config(&self) -> &PresenterConfig {
        &self.config
    }

    pub fn mode(&self) -> PlayMode {
        self.config.mode
    }

    /// Hand out a token no other line of this presenter carries.
    pub fn issue_token(&mut self) -> CompletionToken {
        let token = CompletionToken(self.next_token);
        self.next_token += 1;
        token
    }

    /// Make a secondary surface available for routing.
    pub fn register_surface(&mut self, id: SurfaceId) -> bool {
        self.board.register(id)
    }

    /// Withdraw a secondary surface. If it is showing the current line the
    /// surface is hidden, but the line keeps its place in playback.
    pub fn unregister_surface(&mut self, id: SurfaceId) -> Vec<PresenterEvent> {
        let mut events = Vec::new();
        if !self.board.unregister(id, &mut events) {
            warn!("cannot unregister surface {:?}: primary or unknown", id);
        }
        events
    }

    pub fn has_surface(&self, id: SurfaceId) -> bool {
        self.board.contains(id)
    }

    pub fn surface(&self, id: SurfaceId) -> Option<&SurfaceState> {
        self.board.get(id)
    }

    pub fn visible_surface(&self) -> Option<SurfaceId> {
        self.board.visible()
    }

    pub fn is_playing(&self) -> bool {
        !matches!(self.playback, Playback::Idle)
    }

    pub fn playback(&self) -> PlaybackState {
        match self.playback {
            Playback::Idle => PlaybackState::Idle,
            Playback::ShowingAuto { .. } => PlaybackState::ShowingAuto,
            Playback::AwaitingAdvance { .. } => PlaybackState::AwaitingAdvance,
        }
    }

    /// The line currently on screen, if any.
    pub fn current_line(&self) -> Option<&Line> {
        match &self.playback {
            Playback::Idle => None,
            Playback::ShowingAuto { line, .. } | Playback::AwaitingAdvance { line } => Some(line),
        }
    }

    /// Lines waiting behind the current one.
    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// Append one line. Starts playback if the presenter is idle.
    pub fn enqueue(&mut self, line: Line) -> Vec<PresenterEvent> {
        self.enqueue_lines(vec![line])
    }

    pub fn enqueue_text(
        &mut self,
        text: impl Into<String>,
        target: SurfaceTarget,
        on_complete: Option<CompletionToken>,
    ) -> Vec<PresenterEvent> {
        self.enqueue(Line {
            text: text.into(),
            target,
            on_complete,
        })
    }

    /// Append prebuilt lines in order.
    pub fn enqueue_lines(&mut self, lines: Vec<Line>) -> Vec<PresenterEvent> {
        let mut events = Vec::new();
        if lines.is_empty() {
            warn!("ignoring empty line batch");
            return events;
        }
        self.queue.extend(lines);
        if !self.is_playing() {
            self.start_next(Duration::ZERO, &mut events);
        }
        events
    }

    /// Append a batch of texts. The routing policy decides which lines go to
    /// `secondary`; only the last line carries `on_batch_complete`.
    pub fn enqueue_batch<S: AsRef<str>>(
        &mut self,
        texts: &[S],
        secondary: Option<SurfaceId>,
        on_batch_complete: Option<CompletionToken>,
    ) -> Vec<PresenterEvent> {
        if texts.is_empty() {
            warn!("ignoring empty text batch");
            return Vec::new();
        }
        let last = texts.len() - 1;
        let lines = texts
            .iter()
            .enumerate()
            .map(|(i, text)| Line {
                text: text.as_ref().to_string(),
                target: self.route(i, secondary),
                on_complete: if i == last { on_batch_complete } else { None },
            })
            .collect();
        self.enqueue_lines(lines)
    }

    /// Drop everything queued and in flight, then play `line` right away.
    pub fn show_now(&mut self, line: Line) -> Vec<PresenterEvent> {
        let mut events = self.stop();
        events.extend(self.enqueue(line));
        events
    }

    /// Release a manual-mode wait. A no-op in any other situation.
    pub fn advance(&mut self) -> Vec<PresenterEvent> {
        let mut events = Vec::new();
        if self.config.mode != PlayMode::Manual {
            debug!("advance ignored: presenter is in automatic mode");
            return events;
        }
        if !matches!(self.playback, Playback::AwaitingAdvance { .. }) {
            warn!("advance ignored: no line is waiting");
            return events;
        }
        self.finish_current(Duration::ZERO, &mut events);
        events
    }

    /// Feed elapsed frame time. Only automatic mode keeps time; leftover
    /// time after a line finishes counts toward the next one.
    pub fn tick(&mut self, dt: Duration) -> Vec<PresenterEvent> {
        let mut events = Vec::new();
        if let Playback::ShowingAuto { elapsed, .. } = &mut self.playback {
            *elapsed = elapsed.saturating_add(dt);
        } else {
            return events;
        }

        loop {
            let carry = match &self.playback {
                Playback::ShowingAuto { elapsed, .. } if *elapsed >= self.display_duration => {
                    *elapsed - self.display_duration
                }
                _ => break,
            };
            self.finish_current(carry, &mut events);
        }
        events
    }

    /// Abort: clear the queue, forget the current line, hide every surface.
    /// The current line's token is never reported.
    pub fn stop(&mut self) -> Vec<PresenterEvent> {
        let mut events = Vec::new();
        if let Some(line) = self.current_line() {
            debug!("stopping presenter on line {:?}", line.text);
        }
        self.queue.clear();
        self.playback = Playback::Idle;
        self.board.hide_all(&mut events);
        events
    }

    fn route(&self, index: usize, secondary: Option<SurfaceId>) -> SurfaceTarget {
        let Some(surface) = secondary else {
            return SurfaceTarget::Primary;
        };
        match self.config.routing {
            RoutingPolicy::FirstLineSecondary if index == 0 => SurfaceTarget::Secondary(surface),
            RoutingPolicy::AllSecondary => SurfaceTarget::Secondary(surface),
            _ => SurfaceTarget::Primary,
        }
    }

    fn resolve_surface(&self, target: SurfaceTarget) -> SurfaceId {
        match target {
            SurfaceTarget::Secondary(id) if self.board.contains(id) => id,
            SurfaceTarget::Secondary(id) => {
                warn!("surface {:?} is not registered; showing on primary", id);
                self.board.primary()
            }
            SurfaceTarget::Primary => self.board.primary(),
        }
    }

    fn finish_current(&mut self, carry: Duration, events: &mut Vec<PresenterEvent>) {
        let line = match std::mem::replace(&mut self.playback, Playback::Idle) {
            Playback::ShowingAuto { line, .. } | Playback::AwaitingAdvance { line } => line,
            Playback::Idle => return,
        };
        if let Some(token) = line.on_complete {
            events.push(PresenterEvent::LineCompleted { token });
        }
        if self.queue.is_empty() {
            self.board.hide_all(events);
            events.push(PresenterEvent::StreamExhausted);
        } else {
            self.start_next(carry, events);
        }
    }

    fn start_next(&mut self, elapsed: Duration, events: &mut Vec<PresenterEvent>) {
        let Some(line) = self.queue.pop_front() else {
            return;
        };
        let surface = self.resolve_surface(line.target);
        self.board.show(surface, &line.text, events);
        self.playback = match self.config.mode {
            PlayMode::Automatic => Playback::ShowingAuto { line, elapsed },
            PlayMode::Manual => Playback::AwaitingAdvance { line },
        };
    }
}

impl PresenterBuilder {
    pub fn config(mut self, config: PresenterConfig) -> Self {
        self.config = config;
        self
    }

    /// Load the configuration from a RON file at build time.
    pub fn config_file(mut self, path: &str) -> Self {
        self.config_path = Some(path.to_string());
        self
    }

    pub fn mode(mut self, mode: PlayMode) -> Self {
        self.config.mode = mode;
        self
    }

    pub fn display_duration(mut self, secs: f32) -> Self {
        self.config.display_duration_secs = secs;
        self
    }

    pub fn routing(mut self, routing: RoutingPolicy) -> Self {
        self.config.routing = routing;
        self
    }

    pub fn primary_surface(mut self, id: SurfaceId) -> Self {
        self.config.primary_surface = id;
        self
    }

    /// Register a secondary surface up front.
    pub fn surface(mut self, id: SurfaceId) -> Self {
        self.surfaces.push(id);
        self
    }

    pub fn build(self) -> Result<Presenter, PresenterError> {
        let config = match self.config_path {
            Some(ref path) => PresenterConfig::load_from_ron(Path::new(path))?,
            None => self.config,
        };
        let mut presenter = Presenter::new(config)?;
        for id in self.surfaces {
            presenter.register_surface(id);
        }
        Ok(presenter)
    }
}
