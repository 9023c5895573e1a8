//! Explicit reachability: forward BFS enumeration of the markings
//! reachable from the initial marking, producing both the full reachable
//! set and a human-readable reachability graph in the manner of the
//! teacher crate's `ReachabilityAnalysis`.

use super::{Marking, PetriNet, TransitionId};
use derive_more::Display as DeriveDisplay;
use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt::{Display, Formatter, Result as FmtResult};

/// A unique id assigned to a marking the first time it is discovered.
/// Displayed as "M" followed by the id padded with leading zeros, e.g.
/// M000, M001, M002, ...
#[derive(Debug, Clone, Copy, PartialEq, Eq, DeriveDisplay)]
#[display(fmt = "M{:03}", _0)]
pub struct MarkingId(pub usize);

/// A transition fired from a marking and the id of the resulting marking.
/// Displayed as "{transition}->{marking}", e.g. t0->M001.
#[derive(Debug, Clone, Copy, DeriveDisplay)]
#[display(fmt = "{}->{}", _0, _1)]
pub struct Continuation(pub TransitionId, pub MarkingId);

struct Join<'a, T: Display>(&'a [T], &'a str);

impl<'a, T: Display> Display for Join<'a, T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let mut iter = self.0.iter();
        if let Some(first) = iter.next() {
            write!(f, "{}", first)?;
        }
        for item in iter {
            write!(f, "{}{}", self.1, item)?;
        }
        Ok(())
    }
}

/// The reachability graph: every discovered marking, its id, and the
/// continuations (enabled transition -> successor marking) out of it.
#[derive(Debug)]
pub struct ReachabilityAnalysis<'net> {
    petri_net: &'net PetriNet,
    pub rows: Vec<(MarkingId, Marking, Vec<Continuation>)>,
}

impl<'net> ReachabilityAnalysis<'net> {
    /// The full reachable set R, as a plain set of markings, independent
    /// of the ids/continuations used for the report.
    pub fn reachable_set(&self) -> HashSet<Marking> {
        self.rows.iter().map(|(_, m, _)| m.clone()).collect()
    }

    /// Dead markings discovered during the BFS (no outgoing continuation).
    pub fn dead_markings(&self) -> Vec<&Marking> {
        self.rows
            .iter()
            .filter(|(_, _, cont)| cont.is_empty())
            .map(|(_, m, _)| m)
            .collect()
    }
}

impl<'net> Display for ReachabilityAnalysis<'net> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        for transition in self.petri_net.transitions() {
            writeln!(
                f,
                "{} ... {}",
                transition.index,
                transition.name.as_deref().unwrap_or(&transition.id)
            )?;
        }
        writeln!(f)?;

        write!(f, "{:<7}", "M")?;
        for place in self.petri_net.places() {
            write!(f, "{:<5}", place.id)?;
        }
        writeln!(f, "Transitions")?;

        for (marking_id, marking, continuations) in &self.rows {
            write!(f, "{:<7}", marking_id.to_string())?;
            for bit in marking.iter() {
                write!(f, "{:<5}", bit as u8)?;
            }
            writeln!(f, "{}", Join(continuations, ", "))?;
        }
        writeln!(f)?;

        writeln!(f, "Dead markings")?;
        for (marking_id, marking, continuations) in &self.rows {
            if continuations.is_empty() {
                writeln!(f, "{}: {}", marking_id, marking)?;
            }
        }
        Ok(())
    }
}

impl PetriNet {
    /// Runs forward BFS from the initial marking, producing the full
    /// reachable set and reachability graph. Transitions are tried in
    /// declaration order at each marking, matching §4.2's fixed-order
    /// contract so results are deterministic across runs.
    pub fn reachability_analysis(&self) -> ReachabilityAnalysis<'_> {
        let mut ids: HashMap<Marking, MarkingId, ahash::RandomState> = HashMap::default();
        let mut rows = Vec::new();

        let initial = self.initial_marking().clone();
        let initial_id = MarkingId(0);
        ids.insert(initial.clone(), initial_id);

        let mut queue = VecDeque::new();
        queue.push_back((initial_id, initial));

        while let Some((source_id, source_marking)) = queue.pop_front() {
            let mut continuations = Vec::new();
            for t in 0..self.transitions().len() {
                let t = TransitionId(t);
                if !self.enabled(&source_marking, t) {
                    continue;
                }
                // `enabled` only checks pre-places (§4.1); a transition can
                // still be enabled by that definition while firing it would
                // push one of its post-places above 1, which `fire` rejects.
                // This mirrors the symbolic relation, whose (0,1) update
                // clause requires the post-place to currently be empty: such
                // a firing contributes no edge in either engine, so it is
                // skipped here rather than treated as a continuation.
                let next = match self.fire(&source_marking, t) {
                    Ok(next) => next,
                    Err(_) => continue,
                };
                let next_id = match ids.get(&next) {
                    Some(&id) => id,
                    None => {
                        let id = MarkingId(ids.len());
                        ids.insert(next.clone(), id);
                        queue.push_back((id, next));
                        id
                    }
                };
                continuations.push(Continuation(t, next_id));
            }
            rows.push((source_id, source_marking, continuations));
        }

        ReachabilityAnalysis {
            petri_net: self,
            rows,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::petri_net::PetriNetBuilder;

    #[test]
    fn toggle_net_has_two_reachable_markings() {
        let mut b = PetriNetBuilder::new();
        let p0 = b.add_place("p0".into(), None, true).unwrap();
        let p1 = b.add_place("p1".into(), None, false).unwrap();
        b.add_transition("t01".into(), None).unwrap();
        b.add_transition("t10".into(), None).unwrap();
        b.add_arc("a1".into(), "p0".into(), "t01".into(), 1).unwrap();
        b.add_arc("a2".into(), "t01".into(), "p1".into(), 1).unwrap();
        b.add_arc("a3".into(), "p1".into(), "t10".into(), 1).unwrap();
        b.add_arc("a4".into(), "t10".into(), "p0".into(), 1).unwrap();
        let net = b.build();

        let analysis = net.reachability_analysis();
        let reachable = analysis.reachable_set();
        assert_eq!(reachable.len(), 2);
        assert!(reachable.contains(net.initial_marking()));
        assert!(analysis.dead_markings().is_empty());
        let _ = (p0, p1);
    }

    #[test]
    fn empty_net_reaches_only_the_empty_marking() {
        let net = PetriNetBuilder::new().build();
        let analysis = net.reachability_analysis();
        assert_eq!(analysis.reachable_set().len(), 1);
        assert!(net.is_dead(net.initial_marking()));
    }

    #[test]
    fn isolated_transition_is_always_enabled_so_the_initial_marking_is_not_dead() {
        // An isolated transition (no pre- or post-arcs) is always enabled
        // under the "no pre-arcs means enabled" policy (see DESIGN.md), so
        // firing it loops M0 back to itself without ever making M0 dead;
        // R stays {M0} because the self-loop produces no new marking.
        let mut b = PetriNetBuilder::new();
        b.add_place("p".into(), None, true).unwrap();
        b.add_transition("t".into(), None).unwrap();
        let net = b.build();
        assert_eq!(net.isolated_transitions().len(), 1);
        assert!(!net.is_dead(net.initial_marking()));
        assert_eq!(net.reachability_analysis().reachable_set().len(), 1);
    }
}
