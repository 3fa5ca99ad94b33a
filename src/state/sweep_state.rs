/// Category sweep state definitions for the pagination engine
///
/// This module defines every state a category sweep can be in and which
/// transitions between them are legal.
use std::fmt;

/// Represents the current state of one category sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SweepState {
    // ===== Active States =====
    /// Waiting for the listing elements of the current page
    Listing,

    /// The current page's elements were handed out; looking for "next"
    Paginating,

    /// The listing wait timed out; reloading and retrying
    ErrorRecovery,

    // ===== Terminal State =====
    /// No more pages will be listed for this category
    Done,
}

impl SweepState {
    /// Returns true if no further pages will be listed
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// Returns true if the transition `self -> next` is legal
    ///
    /// ```text
    /// Listing       -> Paginating | ErrorRecovery
    /// Paginating    -> Listing | Done
    /// ErrorRecovery -> Paginating | Done
    /// ```
    pub fn can_transition_to(&self, next: SweepState) -> bool {
        matches!(
            (self, next),
            (Self::Listing, Self::Paginating)
                | (Self::Listing, Self::ErrorRecovery)
                | (Self::Paginating, Self::Listing)
                | (Self::Paginating, Self::Done)
                | (Self::ErrorRecovery, Self::Paginating)
                | (Self::ErrorRecovery, Self::Done)
        )
    }

    /// Short lowercase name used in logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Listing => "listing",
            Self::Paginating => "paginating",
            Self::ErrorRecovery => "error_recovery",
            Self::Done => "done",
        }
    }

    /// Returns all possible sweep states
    pub fn all_states() -> Vec<Self> {
        vec![
            Self::Listing,
            Self::Paginating,
            Self::ErrorRecovery,
            Self::Done,
        ]
    }
}

impl fmt::Display for SweepState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
