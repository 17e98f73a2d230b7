/// Shared plumbing for producers that speak through a `Presenter`.
use crate::core::presenter::{Presenter, PresenterEvent};
use crate::schema::line::{CompletionToken, SurfaceId};

/// What a producer call did: its own events plus the presenter events its
/// lines caused, both in order.
#[derive(Debug, Clone, PartialEq)]
pub struct ProducerOutput<E> {
    pub events: Vec<E>,
    pub presenter_events: Vec<PresenterEvent>,
}

impl<E> Default for ProducerOutput<E> {
    fn default() -> Self {
        Self {
            events: Vec::new(),
            presenter_events: Vec::new(),
        }
    }
}

impl<E> ProducerOutput<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty() && self.presenter_events.is_empty()
    }

    pub fn push(&mut self, event: E) {
        self.events.push(event);
    }

    pub fn extend_presenter(&mut self, events: Vec<PresenterEvent>) {
        self.presenter_events.extend(events);
    }
}

/// Queue `lines` as one batch whose last line reports a fresh token.
/// Returns the token so the caller can map it to its follow-up action.
pub fn speak_batch<S: AsRef<str>>(
    presenter: &mut Presenter,
    lines: &[S],
    panel: Option<SurfaceId>,
    out: &mut Vec<PresenterEvent>,
) -> Option<CompletionToken> {
    if lines.is_empty() {
        return None;
    }
    let token = presenter.issue_token();
    out.extend(presenter.enqueue_batch(lines, panel, Some(token)));
    Some(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn speak_batch_tags_last_line() {
        let mut presenter = Presenter::builder().display_duration(1.0).build().unwrap();
        let mut events = Vec::new();
        let token = speak_batch(&mut presenter, &["one", "two"], None, &mut events).unwrap();
        assert_eq!(events.len(), 1);

        let events = presenter.tick(Duration::from_secs(2));
        assert!(events.contains(&PresenterEvent::LineCompleted { token }));
    }

    #[test]
    fn speak_batch_skips_empty() {
        let mut presenter = Presenter::builder().build().unwrap();
        let mut events = Vec::new();
        let lines: [String; 0] = [];
        assert!(speak_batch(&mut presenter, &lines, None, &mut events).is_none());
        assert!(events.is_empty());
    }

    #[test]
    fn output_collects_both_streams() {
        let mut out: ProducerOutput<u8> = ProducerOutput::new();
        assert!(out.is_empty());
        out.push(1);
        out.extend_presenter(vec![PresenterEvent::StreamExhausted]);
        assert_eq!(out.events, vec![1]);
        assert_eq!(out.presenter_events.len(), 1);
    }
}
