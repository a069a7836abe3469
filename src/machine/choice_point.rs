//! Choice points: opaque values bearing a single capability, `follow`,
//! which either produces the next candidate machine state or fails.

use std::sync::Arc;

use crate::machine::clause::{rename_apart, split};
use crate::machine::core::Machine;
use crate::machine::error_handling::MachineError;
use crate::machine::term::Term;

/// The result of following a choice point: either a fresh machine to
/// resume from, or a local, non-error failure that tells the step loop
/// to keep backtracking.
pub enum FollowOutcome {
    Next(Machine),
    Fail,
}

#[derive(Clone)]
pub enum ChoicePoint {
    /// Captures the machine at the moment a predicate call was about to
    /// try `clause` against `goal`. Following it renames `clause`'s
    /// variables apart, unifies its head with `goal` under `m0`'s
    /// bindings, and on success pushes its body onto `m0`'s conjunctions.
    HeadBody { m0: Arc<Machine>, goal: Term, clause: Term },
    /// A distinguished marker delimiting the scope of cut. Always fails
    /// when followed; it exists only to be found by `$cut_to`.
    CutBarrier { id: u64 },
    /// The right-hand alternative of a `;/2` (or the else-branch of an
    /// if-then-else). Following it always succeeds: it schedules `goal`
    /// against the machine captured at the moment the disjunction was
    /// entered.
    Disj { m0: Arc<Machine>, goal: Term },
}

impl ChoicePoint {
    pub fn follow(&self) -> Result<FollowOutcome, MachineError> {
        match self {
            ChoicePoint::CutBarrier { .. } => Ok(FollowOutcome::Fail),
            ChoicePoint::Disj { m0, goal } => {
                let next = m0.push_conj(goal.clone());
                Ok(FollowOutcome::Next(next))
            }
            ChoicePoint::HeadBody { m0, goal, clause } => {
                let fresh = rename_apart(clause);
                let (head, body) = split(&fresh);
                match m0.bindings.unify(goal, &head) {
                    Ok(bindings) => {
                        let mut next = (**m0).clone();
                        next.bindings = bindings;
                        let next = next.push_conj(body);
                        Ok(FollowOutcome::Next(next))
                    }
                    Err(MachineError::CantUnify(_, _)) => Ok(FollowOutcome::Fail),
                    Err(e) => Err(e),
                }
            }
        }
    }

    /// Classifies a choice point as a cut barrier, returning its id.
    pub fn barrier_id(&self) -> Option<u64> {
        match self {
            ChoicePoint::CutBarrier { id } => Some(*id),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::machine::bindings::Bindings;
    use crate::machine::config::Config;
    use crate::machine::database::Database;
    use crate::machine::plist::PList;
    use crate::machine::registry::ForeignRegistry;

    fn empty_machine() -> Machine {
        Machine {
            database: Database::empty(),
            registry: ForeignRegistry::empty(),
            bindings: Bindings::empty(),
            disjunctions: PList::nil(),
            conjunctions: PList::nil(),
            config: Config::default(),
        }
    }

    #[test]
    fn cut_barrier_always_fails() {
        let cp = ChoicePoint::CutBarrier { id: 7 };
        assert!(matches!(cp.follow().unwrap(), FollowOutcome::Fail));
    }

    #[test]
    fn head_body_pushes_body_on_successful_unification() {
        let m0 = empty_machine();
        let goal = Term::compound("p", vec![Term::Integer(1)]);
        let clause = Term::compound("p", vec![Term::Integer(1)]);
        let cp = ChoicePoint::HeadBody { m0: Arc::new(m0), goal, clause };
        match cp.follow().unwrap() {
            FollowOutcome::Next(m) => assert_eq!(m.conjunctions.head(), Some(&Term::atom("true"))),
            FollowOutcome::Fail => panic!("expected unification to succeed"),
        }
    }

    #[test]
    fn head_body_fails_on_unification_mismatch() {
        let m0 = empty_machine();
        let goal = Term::compound("p", vec![Term::Integer(1)]);
        let clause = Term::compound("p", vec![Term::Integer(2)]);
        let cp = ChoicePoint::HeadBody { m0: Arc::new(m0), goal, clause };
        assert!(matches!(cp.follow().unwrap(), FollowOutcome::Fail));
    }
}
