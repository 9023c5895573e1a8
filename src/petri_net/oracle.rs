//! The reachability oracle (component 4 of the core): wraps a computed
//! symbolic reach-set so concrete markings can be tested for membership
//! without exposing the BDD machinery to the ILP clients that are its only
//! callers.

use super::symbolic::ReachabilitySet;
use super::Marking;

/// A membership test over a fixed reachable set, backed by a
/// [`ReachabilitySet`]. ILP clients hold one of these instead of the
/// reach-set itself so a future alternate symbolic backend only has to
/// supply this interface, not anything BDD-specific.
pub struct ReachabilityOracle<'a> {
    reach: &'a ReachabilitySet,
}

impl<'a> ReachabilityOracle<'a> {
    pub fn new(reach: &'a ReachabilitySet) -> Self {
        Self { reach }
    }

    /// Returns true iff `m` is reachable from the initial marking, tested
    /// by restricting the reach-set's current variables to `m`'s bits.
    pub fn contains(&self, m: &Marking) -> bool {
        self.reach.contains(m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::petri_net::symbolic::{BddEngine, SymbolicEngine};
    use crate::petri_net::PetriNetBuilder;

    fn toggle_net() -> crate::petri_net::PetriNet {
        let mut b = PetriNetBuilder::new();
        b.add_place("p0".into(), None, true).unwrap();
        b.add_place("p1".into(), None, false).unwrap();
        b.add_transition("t01".into(), None).unwrap();
        b.add_transition("t10".into(), None).unwrap();
        b.add_arc("a1".into(), "p0".into(), "t01".into(), 1).unwrap();
        b.add_arc("a2".into(), "t01".into(), "p1".into(), 1).unwrap();
        b.add_arc("a3".into(), "p1".into(), "t10".into(), 1).unwrap();
        b.add_arc("a4".into(), "t10".into(), "p0".into(), 1).unwrap();
        b.build()
    }

    #[test]
    fn oracle_agrees_with_explicit_reach_on_every_marking() {
        let net = toggle_net();
        let reach = BddEngine.compute_reach(&net).unwrap();
        let oracle = ReachabilityOracle::new(&reach);
        let explicit = net.reachability_analysis().reachable_set();

        for bits in 0..(1u8 << net.places().len()) {
            let m = Marking::from_bits((0..net.places().len()).map(|i| (bits >> i) & 1 == 1));
            assert_eq!(oracle.contains(&m), explicit.contains(&m), "marking {m}");
        }
    }
}
