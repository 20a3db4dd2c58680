//! Candidate pair bookkeeping.

use crate::body::BodyId;

/// Canonical unordered-pair key: the two ids in sorted order.
///
/// Replaces ad hoc string concatenation of identifiers with an explicit
/// key type, avoiding formatting overhead and collision risk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PairKey(BodyId, BodyId);

impl PairKey {
    /// Build the canonical key for an unordered pair of distinct ids.
    #[must_use]
    pub fn new(a: BodyId, b: BodyId) -> Self {
        if a <= b { Self(a, b) } else { Self(b, a) }
    }

    /// The lower id.
    #[must_use]
    pub fn first(&self) -> BodyId {
        self.0
    }

    /// The higher id.
    #[must_use]
    pub fn second(&self) -> BodyId {
        self.1
    }

    /// Whether `id` is one of the pair's endpoints.
    #[must_use]
    pub fn contains(&self, id: BodyId) -> bool {
        self.0 == id || self.1 == id
    }
}

/// Per-pair lock state machine. `Locked` is terminal: no transition
/// leaves it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PairState {
    /// Not yet within interaction distance.
    #[default]
    Idle,
    /// Within interaction distance; point pairs being scored.
    Evaluating,
    /// Snap performed or in flight. Terminal.
    Locked,
}

/// A tracked unordered pair of bodies eligible for interlock evaluation.
///
/// `anchor` and `mover` preserve registration order: on a qualifying
/// match the mover is tweened onto the anchor and reparented under it.
#[derive(Debug, Clone, Copy)]
pub struct CandidatePair {
    /// The body that stays put and becomes the parent.
    pub anchor: BodyId,
    /// The body that is moved onto the anchor and becomes the child.
    pub mover: BodyId,
    /// Compatibility weight in [0, 1]. Extension hook only; the matching
    /// algorithm does not currently weight by it.
    pub weight: f32,
    /// Current lock state.
    pub state: PairState,
}

impl CandidatePair {
    /// Whether this pair has reached the terminal state.
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.state == PairState::Locked
    }
}
