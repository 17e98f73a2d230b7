//! WASM bindings for dialogue-presenter — lets a browser page host the presenter.
//!
//! The page owns `requestAnimationFrame` and calls `tick` with the frame
//! delta; every call returns a JSON batch of what to render.

use wasm_bindgen::prelude::*;

use dialogue_presenter::core::phases::{PhaseDirector, PhaseEvent, PhaseScript};
use dialogue_presenter::core::presenter::{Presenter, PresenterEvent};
use dialogue_presenter::core::producer::ProducerOutput;
use dialogue_presenter::schema::config::PresenterConfig;
use dialogue_presenter::schema::line::{Line, SurfaceId, SurfaceTarget};
use std::time::Duration;

// ---------------------------------------------------------------------------
// Embedded demo script — compiled into the WASM binary
// ---------------------------------------------------------------------------
mod data {
    pub const GUIDE_PHASES: &str = include_str!("../../tests/fixtures/guide_phases.ron");
}

// ---------------------------------------------------------------------------
// JSON helper types for communication across the WASM boundary
// ---------------------------------------------------------------------------
#[derive(serde::Serialize, Default)]
struct Batch {
    presenter: Vec<PresenterEvent>,
    phases: Vec<PhaseEvent>,
}

#[derive(serde::Serialize)]
struct Status {
    playing: bool,
    queued: usize,
    current: Option<String>,
    visible_surface: Option<u64>,
    current_phase: Option<usize>,
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, JsError> {
    serde_json::to_string(value).map_err(|e| JsError::new(&format!("Serialization error: {e}")))
}

// ---------------------------------------------------------------------------
// DialogueHost — the main exported struct
// ---------------------------------------------------------------------------
#[wasm_bindgen]
pub struct DialogueHost {
    presenter: Presenter,
    director: PhaseDirector,
}

#[wasm_bindgen]
impl DialogueHost {
    /// Create a host from a RON presenter config (empty for defaults) and a
    /// RON phase script (empty for the built-in guide script).
    #[wasm_bindgen(constructor)]
    pub fn new(config_ron: &str, script_ron: &str) -> Result<DialogueHost, JsError> {
        let config = if config_ron.trim().is_empty() {
            PresenterConfig::default()
        } else {
            PresenterConfig::parse_ron(config_ron)
                .map_err(|e| JsError::new(&format!("Config error: {e}")))?
        };
        let script_src = if script_ron.trim().is_empty() {
            data::GUIDE_PHASES
        } else {
            script_ron
        };
        let script = PhaseScript::parse_ron(script_src)
            .map_err(|e| JsError::new(&format!("Script parse error: {e}")))?;

        let mut presenter = Presenter::new(config)
            .map_err(|e| JsError::new(&format!("Presenter error: {e}")))?;
        let director = PhaseDirector::new(script);
        director.attach(&mut presenter);

        Ok(DialogueHost {
            presenter,
            director,
        })
    }

    /// Run the script's start trigger. Call once after construction.
    pub fn start(&mut self) -> Result<String, JsError> {
        let out = self.director.start(&mut self.presenter);
        to_json(&self.collect(out))
    }

    pub fn speak_phase(&mut self, index: usize) -> Result<String, JsError> {
        let out = self.director.speak_phase(index, &mut self.presenter);
        to_json(&self.collect(out))
    }

    pub fn speak_phase_by_name(&mut self, name: &str) -> Result<String, JsError> {
        let out = self.director.speak_phase_by_name(name, &mut self.presenter);
        to_json(&self.collect(out))
    }

    pub fn speak_next_phase(&mut self) -> Result<String, JsError> {
        let out = self.director.speak_next_phase(&mut self.presenter);
        to_json(&self.collect(out))
    }

    pub fn trigger_enter(&mut self, tag: &str) -> Result<String, JsError> {
        let out = self.director.on_trigger_enter(tag, &mut self.presenter);
        to_json(&self.collect(out))
    }

    /// Queue a free-form line. `surface` of `undefined` means the primary surface.
    pub fn enqueue_text(&mut self, text: &str, surface: Option<u64>) -> Result<String, JsError> {
        let target = match surface {
            Some(id) => SurfaceTarget::Secondary(SurfaceId(id)),
            None => SurfaceTarget::Primary,
        };
        let events = self.presenter.enqueue(Line::new(text, target));
        to_json(&self.collect_presenter(events))
    }

    /// Feed the frame delta in seconds.
    pub fn tick(&mut self, dt_secs: f32) -> Result<String, JsError> {
        let dt = Duration::try_from_secs_f32(dt_secs)
            .map_err(|_| JsError::new(&format!("Invalid frame delta: {dt_secs}")))?;
        let events = self.presenter.tick(dt);
        to_json(&self.collect_presenter(events))
    }

    pub fn advance(&mut self) -> Result<String, JsError> {
        let events = self.presenter.advance();
        to_json(&self.collect_presenter(events))
    }

    pub fn stop(&mut self) -> Result<String, JsError> {
        let events = self.director.stop(&mut self.presenter);
        to_json(&self.collect_presenter(events))
    }

    pub fn reset_phases(&mut self) {
        self.director.reset_all();
    }

    pub fn is_playing(&self) -> bool {
        self.presenter.is_playing()
    }

    pub fn status(&self) -> Result<String, JsError> {
        to_json(&Status {
            playing: self.presenter.is_playing(),
            queued: self.presenter.queue_len(),
            current: self.presenter.current_line().map(|l| l.text.clone()),
            visible_surface: self.presenter.visible_surface().map(|s| s.0),
            current_phase: self.director.current_phase(),
        })
    }

    /// Names of the loaded phases as a JSON array.
    pub fn phase_names(&self) -> Result<String, JsError> {
        let names: Vec<&str> = self
            .director
            .script()
            .phases
            .iter()
            .map(|p| p.name.as_str())
            .collect();
        to_json(&names)
    }
}

impl DialogueHost {
    fn collect(&mut self, out: ProducerOutput<PhaseEvent>) -> Batch {
        let mut batch = self.collect_presenter(out.presenter_events);
        let mut phases = out.events;
        phases.append(&mut batch.phases);
        batch.phases = phases;
        batch
    }

    /// Resolve completion tokens through the director.
    fn collect_presenter(&mut self, events: Vec<PresenterEvent>) -> Batch {
        let mut batch = Batch::default();
        for event in &events {
            if let PresenterEvent::LineCompleted { token } = event {
                batch.phases.extend(self.director.on_line_completed(*token));
            }
        }
        batch.presenter = events;
        batch
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_host_speaks_guide_script() {
        let mut host = DialogueHost::new("", "").unwrap();
        let json = host.speak_phase(0).unwrap();
        assert!(json.contains("PhaseStarted"));
        assert!(json.contains("Welcome to the harbour"));
        assert!(host.is_playing());
    }

    #[test]
    fn tick_reports_phase_completion() {
        let mut host = DialogueHost::new("(display_duration_secs: 1.0)", "").unwrap();
        host.speak_phase(1).unwrap();
        let json = host.tick(5.0).unwrap();
        assert!(json.contains("StreamExhausted"));
        assert!(json.contains("PhaseFinished"));
        assert!(!host.is_playing());
    }

    #[test]
    fn status_is_json() {
        let host = DialogueHost::new("", "").unwrap();
        let status = host.status().unwrap();
        assert!(status.contains("\"playing\":false"));
        let names = host.phase_names().unwrap();
        assert!(names.contains("Tutorial_Start"));
    }
}
