//! The net model: places, transitions, signed incidence data, and the
//! initial marking. Immutable once built by [`PetriNetBuilder`].

pub mod ilp;
pub mod oracle;
pub mod pnml;
pub mod reachability;
pub mod symbolic;

use crate::error::{AnalysisError, ParseError};
use bitvec::prelude::*;
use derive_more::Display as DeriveDisplay;
use std::collections::HashMap;

/// The index of a place, fixed at its declaration order in the source net.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, DeriveDisplay)]
#[display(fmt = "p{}", _0)]
pub struct PlaceId(pub usize);

/// The index of a transition, fixed at its declaration order in the source net.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, DeriveDisplay)]
#[display(fmt = "t{}", _0)]
pub struct TransitionId(pub usize);

/// A place: a stable string identifier, an optional display name, and the
/// fixed index this crate uses everywhere else to refer to it.
#[derive(Debug, Clone)]
pub struct Place {
    pub id: String,
    pub name: Option<String>,
    pub index: PlaceId,
}

/// A transition: a stable string identifier, an optional display name, and
/// its fixed index.
#[derive(Debug, Clone)]
pub struct Transition {
    pub id: String,
    pub name: Option<String>,
    pub index: TransitionId,
}

/// A marking is a dense 0/1 vector indexed by place index. It is a value
/// object: engines replace markings wholesale rather than mutating them in
/// place once published.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Marking(BitVec<u64, Lsb0>);

impl Marking {
    /// The all-zero marking over `places` places.
    pub fn empty(places: usize) -> Self {
        Marking(bitvec![u64, Lsb0; 0; places])
    }

    pub fn from_bits<I: IntoIterator<Item = bool>>(bits: I) -> Self {
        Marking(bits.into_iter().collect())
    }

    pub fn get(&self, p: PlaceId) -> bool {
        self.0[p.0]
    }

    pub fn set(&mut self, p: PlaceId, value: bool) {
        self.0.set(p.0, value);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        self.0.iter().by_vals()
    }
}

impl std::fmt::Display for Marking {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(")?;
        for (i, bit) in self.0.iter().by_vals().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", bit as u8)?;
        }
        write!(f, ")")
    }
}

/// A pre- or post-arc recorded for structural reporting (isolated
/// transitions, display). Enabling and firing go through the dense
/// incidence matrices below instead of walking this list.
#[derive(Debug, Clone)]
pub enum ArcRecord {
    PlaceToTransition {
        id: String,
        place: PlaceId,
        transition: TransitionId,
        weight: u32,
    },
    TransitionToPlace {
        id: String,
        transition: TransitionId,
        place: PlaceId,
        weight: u32,
    },
}

/// The fully-built, read-only net. Construct via [`PetriNetBuilder`].
///
/// Capacity is not a parameter of this type: the crate only analyzes
/// 1-safe nets, so every place's capacity is uniformly 1. The teacher
/// crate this was adapted from generalizes over a `CapacityFn`/`WeightFn`
/// pair to support k-bounded nets; that generality is dropped here because
/// k-bounded nets are an explicit non-goal, and with only one capacity
/// policy in play a dense incidence matrix is both simpler and what the
/// symbolic engine needs to build its transition relation anyway.
#[derive(Debug, Clone)]
pub struct PetriNet {
    places: Vec<Place>,
    transitions: Vec<Transition>,
    arcs: Vec<ArcRecord>,
    /// `pre[t][p]` = tokens place `p` must hold for transition `t` to fire.
    pre: Vec<Vec<u32>>,
    /// `post[t][p]` = tokens transition `t` deposits into place `p`.
    post: Vec<Vec<u32>>,
    initial_marking: Marking,
}

impl PetriNet {
    pub fn places(&self) -> &[Place] {
        &self.places
    }

    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    pub fn arcs(&self) -> &[ArcRecord] {
        &self.arcs
    }

    pub fn initial_marking(&self) -> &Marking {
        &self.initial_marking
    }

    pub fn place_index(&self, id: &str) -> Option<PlaceId> {
        self.places.iter().find(|p| p.id == id).map(|p| p.index)
    }

    pub fn transition_index(&self, id: &str) -> Option<TransitionId> {
        self.transitions
            .iter()
            .find(|t| t.id == id)
            .map(|t| t.index)
    }

    pub fn pre_weight(&self, t: TransitionId, p: PlaceId) -> u32 {
        self.pre[t.0][p.0]
    }

    pub fn post_weight(&self, t: TransitionId, p: PlaceId) -> u32 {
        self.post[t.0][p.0]
    }

    /// A transition with no pre-places is always enabled. This is the
    /// "always enabled" reading some PNML dialects dispute in favor of
    /// treating such transitions as pure sources gated by post-place
    /// capacity; this crate preserves the always-enabled reading.
    pub fn enabled(&self, m: &Marking, t: TransitionId) -> bool {
        let pre = &self.pre[t.0];
        (0..self.places.len()).all(|p| (m.get(PlaceId(p)) as u32) >= pre[p])
    }

    /// Fires `t` from `m`. Precondition: `self.enabled(m, t)`. Violating
    /// the precondition is a programming error in the caller and is
    /// reported as [`AnalysisError::InvariantViolation`] rather than
    /// silently producing a marking outside `{0,1}^P`.
    pub fn fire(&self, m: &Marking, t: TransitionId) -> Result<Marking, AnalysisError> {
        if !self.enabled(m, t) {
            return Err(AnalysisError::InvariantViolation(format!(
                "fire() called on disabled transition {}",
                t
            )));
        }
        let mut next = m.clone();
        for p in 0..self.places.len() {
            let place = PlaceId(p);
            let current = m.get(place) as i64;
            let updated = current - self.pre[t.0][p] as i64 + self.post[t.0][p] as i64;
            if !(0..=1).contains(&updated) {
                return Err(AnalysisError::InvariantViolation(format!(
                    "firing {} from {} would leave place {} outside {{0,1}}",
                    t, m, place
                )));
            }
            next.set(place, updated != 0);
        }
        Ok(next)
    }

    pub fn is_dead(&self, m: &Marking) -> bool {
        (0..self.transitions.len()).all(|t| !self.enabled(m, TransitionId(t)))
    }

    /// Transitions with no incident arcs at all. Reported as a structural
    /// warning, not a hard parse error.
    pub fn isolated_transitions(&self) -> Vec<TransitionId> {
        self.transitions
            .iter()
            .filter(|t| {
                !self.arcs.iter().any(|arc| match arc {
                    ArcRecord::PlaceToTransition { transition, .. } => *transition == t.index,
                    ArcRecord::TransitionToPlace { transition, .. } => *transition == t.index,
                })
            })
            .map(|t| t.index)
            .collect()
    }
}

/// Constructs a [`PetriNet`] from a stream of places, transitions, and
/// arcs, enforcing every structural invariant in §3 of the specification
/// before the net is considered built.
#[derive(Debug, Default)]
pub struct PetriNetBuilder {
    places: Vec<Place>,
    transitions: Vec<Transition>,
    arcs: Vec<ArcRecord>,
    place_ids: HashMap<String, PlaceId>,
    transition_ids: HashMap<String, TransitionId>,
    seen_arc_pairs: std::collections::HashSet<(String, String)>,
    initial_bits: Vec<bool>,
}

impl PetriNetBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_place(
        &mut self,
        id: String,
        name: Option<String>,
        initial_tokens: bool,
    ) -> Result<PlaceId, ParseError> {
        if self.place_ids.contains_key(&id) {
            return Err(ParseError::DuplicatePlaceId(id));
        }
        let index = PlaceId(self.places.len());
        self.place_ids.insert(id.clone(), index);
        self.places.push(Place { id, name, index });
        self.initial_bits.push(initial_tokens);
        Ok(index)
    }

    pub fn add_transition(
        &mut self,
        id: String,
        name: Option<String>,
    ) -> Result<TransitionId, ParseError> {
        if self.transition_ids.contains_key(&id) {
            return Err(ParseError::DuplicateTransitionId(id));
        }
        let index = TransitionId(self.transitions.len());
        self.transition_ids.insert(id.clone(), index);
        self.transitions.push(Transition { id, name, index });
        Ok(index)
    }

    /// Registers an arc. `source`/`target` are the original string ids
    /// (the PNML document's own endpoints); this resolves them against
    /// the places/transitions already added and enforces bipartiteness,
    /// endpoint existence, uniqueness, and the 1-safe weight bound.
    pub fn add_arc(
        &mut self,
        id: String,
        source: String,
        target: String,
        weight: u32,
    ) -> Result<(), ParseError> {
        if weight > 1 {
            return Err(ParseError::UnsupportedArcWeight { arc: id, weight });
        }
        if !self.seen_arc_pairs.insert((source.clone(), target.clone())) {
            return Err(ParseError::DuplicateArc { source, target });
        }

        let source_place = self.place_ids.get(&source).copied();
        let source_transition = self.transition_ids.get(&source).copied();
        let target_place = self.place_ids.get(&target).copied();
        let target_transition = self.transition_ids.get(&target).copied();

        match (source_place, source_transition, target_place, target_transition) {
            (Some(p), None, None, Some(t)) => {
                self.arcs.push(ArcRecord::PlaceToTransition {
                    id,
                    place: p,
                    transition: t,
                    weight,
                });
                Ok(())
            }
            (None, Some(t), Some(p), None) => {
                self.arcs.push(ArcRecord::TransitionToPlace {
                    id,
                    transition: t,
                    place: p,
                    weight,
                });
                Ok(())
            }
            (Some(_), None, Some(_), None) => Err(ParseError::NotBipartite {
                arc: id,
                kind: "place",
                source,
                target,
            }),
            (None, Some(_), None, Some(_)) => Err(ParseError::NotBipartite {
                arc: id,
                kind: "transition",
                source,
                target,
            }),
            _ => {
                let unknown = if source_place.is_none() && source_transition.is_none() {
                    source
                } else {
                    target
                };
                Err(ParseError::UnknownArcEndpoint {
                    arc: id,
                    endpoint: unknown,
                })
            }
        }
    }

    /// Structural warnings accumulated so far that do not block the build
    /// (currently: isolated transitions).
    pub fn build(self) -> PetriNet {
        let p = self.places.len();
        let t = self.transitions.len();
        let mut pre = vec![vec![0u32; p]; t];
        let mut post = vec![vec![0u32; p]; t];
        for arc in &self.arcs {
            match arc {
                ArcRecord::PlaceToTransition {
                    place,
                    transition,
                    weight,
                    ..
                } => pre[transition.0][place.0] = *weight,
                ArcRecord::TransitionToPlace {
                    transition,
                    place,
                    weight,
                    ..
                } => post[transition.0][place.0] = *weight,
            }
        }
        let initial_marking = Marking::from_bits(self.initial_bits);
        PetriNet {
            places: self.places,
            transitions: self.transitions,
            arcs: self.arcs,
            pre,
            post,
            initial_marking,
        }
    }
}
