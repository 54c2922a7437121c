//! Vote transitions.
//!
//! A profile holds at most one vote per target. The client reports what the
//! user clicked (`status`) and the server moves the stored vote accordingly,
//! returning how much the target's net score changes.

use serde::{Deserialize, Serialize};

/// The click reported by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteAction {
    /// Cast (or switch to) an upvote.
    Upvote,
    /// Cast (or switch to) a downvote.
    Downvote,
    /// Withdraw an existing upvote.
    Upvoted,
    /// Withdraw an existing downvote.
    Downvoted,
}

impl VoteAction {
    pub fn parse(status: &str) -> Option<Self> {
        match status {
            "upvote" => Some(Self::Upvote),
            "downvote" => Some(Self::Downvote),
            "upvoted" => Some(Self::Upvoted),
            "downvoted" => Some(Self::Downvoted),
            _ => None,
        }
    }
}

/// What a profile currently has recorded against a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteState {
    None,
    Up,
    Down,
}

impl VoteState {
    /// Stored direction: `+1`, `-1`, or no row.
    pub fn from_direction(direction: Option<i64>) -> Self {
        match direction {
            Some(d) if d > 0 => Self::Up,
            Some(d) if d < 0 => Self::Down,
            _ => Self::None,
        }
    }

    pub fn direction(self) -> Option<i64> {
        match self {
            Self::None => None,
            Self::Up => Some(1),
            Self::Down => Some(-1),
        }
    }

    fn score(self) -> i64 {
        self.direction().unwrap_or(0)
    }
}

/// Outcome of applying an action to the current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoteTransition {
    pub next: VoteState,
    /// Change to the target's `votes` counter.
    pub delta: i64,
}

impl VoteTransition {
    pub fn is_noop(&self) -> bool {
        self.delta == 0
    }
}

/// Apply `action` to `current`.
pub fn transition(current: VoteState, action: VoteAction) -> VoteTransition {
    let next = match (action, current) {
        (VoteAction::Upvote, _) => VoteState::Up,
        (VoteAction::Downvote, _) => VoteState::Down,
        (VoteAction::Upvoted, VoteState::Up) => VoteState::None,
        (VoteAction::Downvoted, VoteState::Down) => VoteState::None,
        (VoteAction::Upvoted | VoteAction::Downvoted, other) => other,
    };
    VoteTransition {
        next,
        delta: next.score() - current.score(),
    }
}
