use serde::{Deserialize, Serialize};

/// Newtype wrapper for display surface IDs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SurfaceId(pub u64);

impl SurfaceId {
    /// The default primary surface (the player HUD).
    pub const PRIMARY: SurfaceId = SurfaceId(0);
}

impl Default for SurfaceId {
    fn default() -> Self {
        Self::PRIMARY
    }
}

/// Opaque handle reported back when a line's display period ends.
///
/// Tokens are issued by the presenter and resolved by whichever producer
/// attached them, so a line never holds a reference to its listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CompletionToken(pub u64);

/// Which surface a line asks to be shown on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SurfaceTarget {
    #[default]
    Primary,
    Secondary(SurfaceId),
}

/// One unit of displayable text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub text: String,
    #[serde(default)]
    pub target: SurfaceTarget,
    #[serde(default)]
    pub on_complete: Option<CompletionToken>,
}

impl Line {
    pub fn new(text: impl Into<String>, target: SurfaceTarget) -> Self {
        Self {
            text: text.into(),
            target,
            on_complete: None,
        }
    }

    /// A line for the primary surface.
    pub fn primary(text: impl Into<String>) -> Self {
        Self::new(text, SurfaceTarget::Primary)
    }

    /// A line for a secondary surface.
    pub fn secondary(text: impl Into<String>, surface: SurfaceId) -> Self {
        Self::new(text, SurfaceTarget::Secondary(surface))
    }

    pub fn with_completion(mut self, token: CompletionToken) -> Self {
        self.on_complete = Some(token);
        self
    }
}
