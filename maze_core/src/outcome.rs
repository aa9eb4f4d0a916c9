//! Per-tick outcomes.

/// What a physics tick ended with.
///
/// Anything other than [`TickOutcome::Continue`] ends the tick early; the
/// rest of that tick's work is skipped and never resumed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TickOutcome {
    #[default]
    Continue,
    /// The player lost a heart and was put back at the level start.
    Respawn,
    /// The player used a portal or door. The app loads the level.
    LevelChange(String),
    /// The player ran out of hearts.
    Death,
    /// The player went through a portal with nowhere left to go.
    Victory,
}

impl TickOutcome {
    pub fn is_continue(&self) -> bool {
        matches!(self, TickOutcome::Continue)
    }
}
