//! The two ILP clients (§4.5): deadlock feasibility and linear
//! optimization over the reachable set. Both share the same cut-and-restart
//! discipline: solve the 0/1 program, check the candidate against the
//! reachability oracle, and if it is unreachable add a no-good cut
//! excluding exactly that point before solving again.

use super::oracle::ReachabilityOracle;
use super::{Marking, PetriNet, PlaceId, TransitionId};
use crate::error::AnalysisError;
use good_lp::{
    constraint, microlp, variable, variables, Constraint, Expression, ResolutionError, Solution,
    SolverModel, Variable,
};

/// Any implementation capable of solving the two 0/1 programs this crate
/// needs, each validated against a reachability oracle. The core depends
/// only on this trait, not on `good_lp` directly, mirroring
/// [`super::symbolic::SymbolicEngine`]'s separation of interface from
/// backend.
pub trait IntegerSolver {
    /// Finds a reachable dead marking, if one exists.
    fn find_deadlock(
        &self,
        net: &PetriNet,
        oracle: &ReachabilityOracle<'_>,
    ) -> Result<Option<Marking>, AnalysisError>;

    /// Finds the reachable marking maximizing `sum_p weights[p] * m[p]`,
    /// together with that optimal value. `weights` must have one entry per
    /// place, in place-index order.
    fn optimize(
        &self,
        net: &PetriNet,
        oracle: &ReachabilityOracle<'_>,
        weights: &[i64],
    ) -> Result<Option<(Marking, i64)>, AnalysisError>;
}

/// The default, and only, [`IntegerSolver`] implementation: a `good_lp`
/// model solved with its pure-Rust `microlp` backend (no external solver
/// binary required), with `good_lp`'s own branch-and-bound handling the
/// binary variables.
#[derive(Debug, Default)]
pub struct GoodLpSolver;

impl IntegerSolver for GoodLpSolver {
    fn find_deadlock(
        &self,
        net: &PetriNet,
        oracle: &ReachabilityOracle<'_>,
    ) -> Result<Option<Marking>, AnalysisError> {
        let solved = solve_with_cuts(net, oracle, Problem::Deadlock)?;
        Ok(solved.map(|(m, _)| m))
    }

    fn optimize(
        &self,
        net: &PetriNet,
        oracle: &ReachabilityOracle<'_>,
        weights: &[i64],
    ) -> Result<Option<(Marking, i64)>, AnalysisError> {
        solve_with_cuts(net, oracle, Problem::Optimize(weights))
    }
}

enum Problem<'a> {
    /// Feasibility only: any dead marking. The objective is the constant 0.
    Deadlock,
    /// Maximize `sum_p weights[p] * m[p]` over the full 0/1 cube.
    Optimize(&'a [i64]),
}

/// One 0/1 variable per place, plus the base constraints for `problem` and
/// the accumulated no-good cuts so far.
fn solve_with_cuts(
    net: &PetriNet,
    oracle: &ReachabilityOracle<'_>,
    problem: Problem,
) -> Result<Option<(Marking, i64)>, AnalysisError> {
    let place_count = net.places().len();
    // Each no-good cut removes exactly one point from {0,1}^place_count, so
    // the loop terminates within that many iterations; this cap exists only
    // to turn a solver/oracle disagreement into a diagnosable error instead
    // of an infinite loop.
    let cut_budget = 1usize << place_count.min(usize::BITS as usize - 1);
    let mut cuts: Vec<Marking> = Vec::new();

    loop {
        let mut vars = variables!();
        let place_vars: Vec<Variable> = (0..place_count).map(|_| vars.add(variable().binary())).collect();

        let mut objective = Expression::from(0.0);
        if let Problem::Optimize(weights) = problem {
            for (&v, &w) in place_vars.iter().zip(weights) {
                objective = objective + (w as f64) * v;
            }
        }

        let mut model = vars.maximise(objective).using(microlp);

        if matches!(problem, Problem::Deadlock) {
            for t in 0..net.transitions().len() {
                let t_id = TransitionId(t);
                let mut pre_places_empty = Expression::from(0.0);
                for p in 0..place_count {
                    if net.pre_weight(t_id, PlaceId(p)) > 0 {
                        pre_places_empty = pre_places_empty + (1.0 - place_vars[p]);
                    }
                }
                // A transition with no pre-places has no term here at all,
                // i.e. the constraint becomes 0 >= 1: unsatisfiable,
                // matching "a transition with no pre-arcs is always
                // enabled and therefore never witnesses a dead marking."
                model = model.with(constraint!(pre_places_empty >= 1.0));
            }
        }

        for cut in &cuts {
            model = model.with(no_good_cut(&place_vars, cut));
        }

        let solution = match model.solve() {
            Ok(solution) => solution,
            Err(ResolutionError::Infeasible) => return Ok(None),
            Err(other) => return Err(AnalysisError::SolverError(format!("{other:?}"))),
        };

        let candidate = Marking::from_bits(place_vars.iter().map(|&v| solution.value(v) > 0.5));

        if oracle.contains(&candidate) {
            let value = match problem {
                Problem::Deadlock => 0,
                Problem::Optimize(weights) => candidate
                    .iter()
                    .zip(weights)
                    .filter(|(bit, _)| *bit)
                    .map(|(_, &w)| w)
                    .sum(),
            };
            return Ok(Some((candidate, value)));
        }

        if cuts.len() >= cut_budget {
            return Err(AnalysisError::SolverError(
                "no-good cuts exhausted the entire 0/1 cube without a reachable candidate; \
                 this indicates the oracle and ILP constraints disagree"
                    .to_string(),
            ));
        }
        cuts.push(candidate);
    }
}

/// Builds `sum_{p: m[p]=1} (1 - M_p) + sum_{p: m[p]=0} M_p >= 1`, which
/// every 0/1 point other than `m` satisfies and `m` itself violates.
fn no_good_cut(place_vars: &[Variable], m: &Marking) -> Constraint {
    let mut expr = Expression::from(0.0);
    for (p, &v) in place_vars.iter().enumerate() {
        if m.get(PlaceId(p)) {
            expr = expr + (1.0 - v);
        } else {
            expr = expr + v;
        }
    }
    constraint!(expr >= 1.0)
}
