//! Errors surfaced by the proof engine.
//!
//! Two kinds of failure exist: *logical* failure, which is just the
//! absence of a solution and never becomes a `MachineError`, and *engine*
//! errors, which are the
//! variants below. [`MachineError::CantUnify`] is the one variant that is
//! routinely caught and converted back into logical failure by the step
//! loop and by every built-in that performs a unification as part of
//! normal search (`=/2`, `HeadBody::follow`, the if-then condition); it
//! only escapes to a caller when `Bindings::unify` is invoked directly
//! through a low-level hook.

use thiserror::Error;

use crate::machine::term::Term;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum MachineError {
    #[error("no cut barrier is in scope")]
    NoBarriers,
    /// Reserved for a caller-built driver around the low-level `step`
    /// hook that wants to distinguish "I kept driving an already-done
    /// machine" from ordinary logical failure; `Proof` itself never
    /// needs it; it tracks exhaustion on its own and simply stops
    /// yielding once `step` reports `done`.
    #[error("the machine has no further answers")]
    MachineDone,
    #[error("the disjunction stack is empty")]
    EmptyDisjunctions,
    #[error("the conjunction stack is empty")]
    EmptyConjunctions,
    #[error("cannot unify {0:?} with {1:?}")]
    CantUnify(Term, Term),
    #[error("variable {0} is already bound")]
    AlreadyBound(u64),
    #[error("variable {0} is unbound")]
    UnboundVariable(u64),
    #[error("{0:?} is not a callable goal")]
    NotCallable(Term),
    #[error("a $cut_to barrier target must be an integer, got {0:?}")]
    MalformedCutTarget(Term),
    #[error("{0:?} is not a proper list")]
    ImproperList(Term),
    #[error("step budget exceeded before the proof completed")]
    StepBudgetExceeded,
    #[error("parse error: {0}")]
    Parse(String),
}
