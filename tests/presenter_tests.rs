/// Presenter integration tests — end-to-end playback scenarios.

use dialogue_presenter::core::presenter::{PlaybackState, Presenter, PresenterEvent};
use dialogue_presenter::schema::config::{PlayMode, PresenterConfig};
use dialogue_presenter::schema::line::{Line, SurfaceId};
use std::path::Path;
use std::time::Duration;

const S1: SurfaceId = SurfaceId::PRIMARY;

/// Drive a presenter with fixed-size frames, recording the time each event
/// happened at.
fn run_frames(presenter: &mut Presenter, frame: Duration, frames: u32) -> Vec<(Duration, PresenterEvent)> {
    let mut log = Vec::new();
    let mut now = Duration::ZERO;
    for _ in 0..frames {
        now += frame;
        for event in presenter.tick(frame) {
            log.push((now, event));
        }
    }
    log
}

#[test]
fn automatic_three_second_scenario() {
    let mut presenter = Presenter::builder()
        .mode(PlayMode::Automatic)
        .display_duration(3.0)
        .build()
        .unwrap();

    let token = presenter.issue_token();
    let at_zero = presenter.enqueue_batch(&["A", "B"], None, Some(token));
    assert_eq!(
        at_zero,
        vec![PresenterEvent::SurfaceShown {
            surface: S1,
            text: "A".to_string()
        }]
    );

    // 100 ms frames for eight seconds.
    let log = run_frames(&mut presenter, Duration::from_millis(100), 80);
    assert_eq!(
        log,
        vec![
            (
                Duration::from_secs(3),
                PresenterEvent::SurfaceShown {
                    surface: S1,
                    text: "B".to_string()
                }
            ),
            (Duration::from_secs(6), PresenterEvent::LineCompleted { token }),
            (Duration::from_secs(6), PresenterEvent::SurfaceHidden { surface: S1 }),
            (Duration::from_secs(6), PresenterEvent::StreamExhausted),
        ]
    );
    assert!(!presenter.is_playing());
    assert!(!presenter.surface(S1).unwrap().visible);
}

#[test]
fn manual_scenario() {
    let mut presenter = Presenter::builder().mode(PlayMode::Manual).build().unwrap();
    let token = presenter.issue_token();

    presenter.enqueue_batch(&["X", "Y"], None, Some(token));
    assert_eq!(presenter.current_line().unwrap().text, "X");

    // No amount of time moves a manual presenter.
    assert!(run_frames(&mut presenter, Duration::from_secs(1), 30).is_empty());
    assert_eq!(presenter.current_line().unwrap().text, "X");

    let events = presenter.advance();
    assert_eq!(
        events,
        vec![PresenterEvent::SurfaceShown {
            surface: S1,
            text: "Y".to_string()
        }]
    );

    let events = presenter.advance();
    assert_eq!(
        events,
        vec![
            PresenterEvent::LineCompleted { token },
            PresenterEvent::SurfaceHidden { surface: S1 },
            PresenterEvent::StreamExhausted,
        ]
    );

    // Advancing past the end is a no-op.
    assert!(presenter.advance().is_empty());
    assert_eq!(presenter.playback(), PlaybackState::Idle);
}

#[test]
fn fifo_across_producers() {
    let mut presenter = Presenter::builder().display_duration(1.0).build().unwrap();
    presenter.enqueue_batch(&["guide 1", "guide 2"], None, None);
    presenter.enqueue(Line::primary("hud warning"));
    presenter.enqueue_batch(&["merchant 1"], None, None);

    let shown: Vec<String> = run_frames(&mut presenter, Duration::from_millis(250), 20)
        .into_iter()
        .filter_map(|(_, e)| match e {
            PresenterEvent::SurfaceShown { text, .. } => Some(text),
            _ => None,
        })
        .collect();
    assert_eq!(shown, vec!["guide 2", "hud warning", "merchant 1"]);
}

#[test]
fn one_advance_moves_exactly_one_line() {
    let mut presenter = Presenter::builder().mode(PlayMode::Manual).build().unwrap();
    presenter.enqueue_batch(&["1", "2", "3", "4"], None, None);
    for expected in ["2", "3", "4"] {
        presenter.advance();
        assert_eq!(presenter.current_line().unwrap().text, expected);
    }
}

#[test]
fn stop_mid_sequence_leaves_clean_state() {
    let mut presenter = Presenter::builder()
        .display_duration(2.0)
        .surface(SurfaceId(1))
        .build()
        .unwrap();
    let token = presenter.issue_token();
    presenter.enqueue_batch(&["a", "b", "c"], Some(SurfaceId(1)), Some(token));
    presenter.tick(Duration::from_secs(3));

    presenter.stop();
    assert!(!presenter.is_playing());
    assert_eq!(presenter.queue_len(), 0);
    assert!(presenter.visible_surface().is_none());
    assert!(!presenter.surface(SurfaceId(1)).unwrap().visible);
    assert!(!presenter.surface(S1).unwrap().visible);

    let log = run_frames(&mut presenter, Duration::from_secs(1), 10);
    assert!(log.is_empty(), "stopped presenter produced {:?}", log);
}

#[test]
fn restart_after_exhaustion() {
    let mut presenter = Presenter::builder().display_duration(1.0).build().unwrap();
    presenter.enqueue(Line::primary("first"));
    presenter.tick(Duration::from_secs(1));
    assert!(!presenter.is_playing());

    let events = presenter.enqueue(Line::primary("second"));
    assert_eq!(events.len(), 1);
    assert!(presenter.is_playing());
}

#[test]
fn config_fixture_loads() {
    let config = PresenterConfig::load_from_ron(Path::new("tests/fixtures/presenter.ron")).unwrap();
    assert_eq!(config.mode, PlayMode::Manual);
    assert_eq!(config.display_duration_secs, 2.5);

    let mut presenter = Presenter::new(config).unwrap();
    presenter.enqueue(Line::primary("hello"));
    assert_eq!(presenter.visible_surface(), Some(SurfaceId(10)));
}
