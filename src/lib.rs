//! Dialogue Presenter — sequential message presentation for games.
//!
//! Serializes text lines from many producers onto one or two display
//! surfaces, advancing on a timer or on an explicit signal. The presenter
//! is a plain state machine driven by the host's frame loop, so it runs
//! the same inside any engine.

pub mod core;
pub mod schema;
