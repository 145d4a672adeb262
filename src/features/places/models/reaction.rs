//! Like/dislike state machine.
//!
//! A user holds at most one reaction per place. Toggling the active reaction
//! clears it; choosing the other one switches over. Each transition reports
//! how the place's like and dislike counters must move.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Stored reaction edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "place_reaction", rename_all = "lowercase")]
#[serde(rename_all = "UPPERCASE")]
pub enum Reaction {
    Like,
    Dislike,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReactionState {
    None,
    Liked,
    Disliked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub next: ReactionState,
    pub like_delta: i64,
    pub dislike_delta: i64,
}

impl ReactionState {
    pub fn from_edge(edge: Option<Reaction>) -> Self {
        match edge {
            None => ReactionState::None,
            Some(Reaction::Like) => ReactionState::Liked,
            Some(Reaction::Dislike) => ReactionState::Disliked,
        }
    }

    /// Edge to persist for this state; `None` means no row
    pub fn edge(self) -> Option<Reaction> {
        match self {
            ReactionState::None => None,
            ReactionState::Liked => Some(Reaction::Like),
            ReactionState::Disliked => Some(Reaction::Dislike),
        }
    }

    pub fn apply(self, action: Reaction) -> Transition {
        let (next, like_delta, dislike_delta) = match (self, action) {
            (ReactionState::None, Reaction::Like) => (ReactionState::Liked, 1, 0),
            (ReactionState::Liked, Reaction::Like) => (ReactionState::None, -1, 0),
            (ReactionState::Disliked, Reaction::Like) => (ReactionState::Liked, 1, -1),
            (ReactionState::None, Reaction::Dislike) => (ReactionState::Disliked, 0, 1),
            (ReactionState::Disliked, Reaction::Dislike) => (ReactionState::None, 0, -1),
            (ReactionState::Liked, Reaction::Dislike) => (ReactionState::Disliked, -1, 1),
        };

        Transition {
            next,
            like_delta,
            dislike_delta,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STATES: [ReactionState; 3] = [
        ReactionState::None,
        ReactionState::Liked,
        ReactionState::Disliked,
    ];

    /// Counters implied by a state for a single user
    fn counters(state: ReactionState) -> (i64, i64) {
        match state {
            ReactionState::None => (0, 0),
            ReactionState::Liked => (1, 0),
            ReactionState::Disliked => (0, 1),
        }
    }

    #[test]
    fn test_like_on_disliked_switches() {
        let t = ReactionState::Disliked.apply(Reaction::Like);
        assert_eq!(t.next, ReactionState::Liked);
        assert_eq!((t.like_delta, t.dislike_delta), (1, -1));
    }

    #[test]
    fn test_double_toggle_returns_to_start() {
        for action in [Reaction::Like, Reaction::Dislike] {
            let first = ReactionState::None.apply(action);
            let second = first.next.apply(action);
            assert_eq!(second.next, ReactionState::None);
            assert_eq!(first.like_delta + second.like_delta, 0);
            assert_eq!(first.dislike_delta + second.dislike_delta, 0);
        }
    }

    #[test]
    fn test_deltas_match_state_change() {
        for state in STATES {
            for action in [Reaction::Like, Reaction::Dislike] {
                let t = state.apply(action);
                let (like_before, dislike_before) = counters(state);
                let (like_after, dislike_after) = counters(t.next);
                assert_eq!(like_before + t.like_delta, like_after);
                assert_eq!(dislike_before + t.dislike_delta, dislike_after);
            }
        }
    }

    #[test]
    fn test_edge_round_trip() {
        for state in STATES {
            assert_eq!(ReactionState::from_edge(state.edge()), state);
        }
    }

    #[test]
    fn test_sequence_never_goes_negative() {
        let actions = [
            Reaction::Like,
            Reaction::Dislike,
            Reaction::Dislike,
            Reaction::Like,
            Reaction::Like,
            Reaction::Dislike,
        ];
        let mut state = ReactionState::None;
        let (mut likes, mut dislikes) = (0i64, 0i64);

        for action in actions {
            let t = state.apply(action);
            likes += t.like_delta;
            dislikes += t.dislike_delta;
            state = t.next;
            assert!(likes >= 0 && dislikes >= 0);
            assert!(likes + dislikes <= 1);
        }
        assert_eq!((likes, dislikes), counters(state));
    }
}
