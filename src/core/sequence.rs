/// Text sequence — a standalone sentence sequencer for one text element,
/// with fade-in / fade-out opacity.
use log::warn;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::schema::config::PlayMode;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SequenceConfig {
    #[serde(default)]
    pub mode: PlayMode,
    /// Seconds each sentence holds at full opacity in automatic mode.
    #[serde(default = "default_display")]
    pub display_duration_secs: f32,
    #[serde(default = "default_use_fade")]
    pub use_fade: bool,
    #[serde(default = "default_fade")]
    pub fade_in_secs: f32,
    #[serde(default = "default_fade")]
    pub fade_out_secs: f32,
}

fn default_display() -> f32 {
    3.0
}

fn default_use_fade() -> bool {
    true
}

fn default_fade() -> f32 {
    0.5
}

impl Default for SequenceConfig {
    fn default() -> Self {
        Self {
            mode: PlayMode::Automatic,
            display_duration_secs: default_display(),
            use_fade: default_use_fade(),
            fade_in_secs: default_fade(),
            fade_out_secs: default_fade(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SequenceEvent {
    /// The text element now shows this sentence.
    TextChanged(String),
    /// The sequence ran out and has faded away.
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Stage {
    Idle,
    FadingIn { elapsed: Duration },
    Holding { elapsed: Duration },
    FadingOut { elapsed: Duration, from: f32 },
    Waiting,
    Finishing { elapsed: Duration, from: f32 },
}

pub struct TextSequence {
    sentences: Vec<String>,
    config: SequenceConfig,
    display: Duration,
    fade_in: Duration,
    fade_out: Duration,
    index: usize,
    playing: bool,
    alpha: f32,
    stage: Stage,
}

fn secs(value: f32) -> Duration {
    match Duration::try_from_secs_f32(value) {
        Ok(d) => d,
        Err(_) if value > 0.0 => {
            warn!("duration {}s is out of range; clamping", value);
            Duration::MAX
        }
        Err(_) => Duration::ZERO,
    }
}

fn ratio(elapsed: Duration, total: Duration) -> f32 {
    if total.is_zero() {
        1.0
    } else {
        (elapsed.as_secs_f32() / total.as_secs_f32()).clamp(0.0, 1.0)
    }
}

impl TextSequence {
    pub fn new(sentences: Vec<String>, config: SequenceConfig) -> Self {
        let alpha = if config.use_fade { 0.0 } else { 1.0 };
        Self {
            display: secs(config.display_duration_secs),
            fade_in: secs(config.fade_in_secs),
            fade_out: secs(config.fade_out_secs),
            sentences,
            config,
            index: 0,
            playing: false,
            alpha,
            stage: Stage::Idle,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Current opacity of the text element, 0.0..=1.0.
    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn text(&self) -> Option<&str> {
        self.sentences.get(self.index).map(String::as_str)
    }

    /// (Re)start from the first sentence.
    pub fn start(&mut self) -> Vec<SequenceEvent> {
        let mut events = Vec::new();
        if self.sentences.is_empty() {
            warn!("text sequence has no sentences");
            return events;
        }
        self.stop();
        self.index = 0;
        self.playing = true;
        self.show_current(&mut events);
        events
    }

    /// Manual mode: move on to the next sentence.
    pub fn next(&mut self) -> Vec<SequenceEvent> {
        let mut events = Vec::new();
        if !self.playing || self.config.mode != PlayMode::Manual {
            return events;
        }
        self.index += 1;
        if self.index < self.sentences.len() {
            self.show_current(&mut events);
        } else {
            self.finish(&mut events);
        }
        events
    }

    pub fn stop(&mut self) {
        self.stage = Stage::Idle;
        self.playing = false;
        if self.config.use_fade {
            self.alpha = 0.0;
        }
    }

    pub fn tick(&mut self, dt: Duration) -> Vec<SequenceEvent> {
        let mut events = Vec::new();
        let mut remaining = dt;
        loop {
            match self.stage {
                Stage::Idle | Stage::Waiting => break,
                Stage::FadingIn { elapsed } => {
                    let total = elapsed.saturating_add(remaining);
                    if total < self.fade_in {
                        self.alpha = ratio(total, self.fade_in);
                        self.stage = Stage::FadingIn { elapsed: total };
                        break;
                    }
                    remaining = total - self.fade_in;
                    self.alpha = 1.0;
                    self.stage = self.after_fade_in();
                }
                Stage::Holding { elapsed } => {
                    let total = elapsed.saturating_add(remaining);
                    if total < self.display {
                        self.stage = Stage::Holding { elapsed: total };
                        break;
                    }
                    remaining = total - self.display;
                    let is_last = self.index + 1 >= self.sentences.len();
                    if is_last {
                        self.finish(&mut events);
                    } else if self.config.use_fade {
                        self.stage = Stage::FadingOut {
                            elapsed: Duration::ZERO,
                            from: self.alpha,
                        };
                    } else {
                        self.index += 1;
                        self.show_current(&mut events);
                    }
                }
                Stage::FadingOut { elapsed, from } => {
                    let total = elapsed.saturating_add(remaining);
                    if total < self.fade_out {
                        self.alpha = from * (1.0 - ratio(total, self.fade_out));
                        self.stage = Stage::FadingOut {
                            elapsed: total,
                            from,
                        };
                        break;
                    }
                    remaining = total - self.fade_out;
                    self.alpha = 0.0;
                    self.index += 1;
                    self.show_current(&mut events);
                }
                Stage::Finishing { elapsed, from } => {
                    let total = elapsed.saturating_add(remaining);
                    if total < self.fade_out {
                        self.alpha = from * (1.0 - ratio(total, self.fade_out));
                        self.stage = Stage::Finishing {
                            elapsed: total,
                            from,
                        };
                        break;
                    }
                    self.alpha = 0.0;
                    self.stage = Stage::Idle;
                    events.push(SequenceEvent::Finished);
                    break;
                }
            }
        }
        events
    }

    fn after_fade_in(&self) -> Stage {
        match self.config.mode {
            PlayMode::Automatic => Stage::Holding {
                elapsed: Duration::ZERO,
            },
            PlayMode::Manual => Stage::Waiting,
        }
    }

    fn show_current(&mut self, events: &mut Vec<SequenceEvent>) {
        let Some(text) = self.sentences.get(self.index) else {
            self.finish(events);
            return;
        };
        events.push(SequenceEvent::TextChanged(text.clone()));
        if self.config.use_fade {
            self.alpha = 0.0;
            self.stage = Stage::FadingIn {
                elapsed: Duration::ZERO,
            };
        } else {
            self.alpha = 1.0;
            self.stage = self.after_fade_in();
        }
    }

    fn finish(&mut self, events: &mut Vec<SequenceEvent>) {
        self.playing = false;
        if self.config.use_fade {
            self.stage = Stage::Finishing {
                elapsed: Duration::ZERO,
                from: self.alpha,
            };
        } else {
            self.stage = Stage::Idle;
            events.push(SequenceEvent::Finished);
        }
    }
}
