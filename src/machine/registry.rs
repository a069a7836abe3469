//! The native-predicate registry: a persistent map from indicator to
//! host function, plus the small closed sum of outcomes a native
//! function may produce.

use std::fmt;
use std::sync::Arc;

use crate::machine::core::Machine;
use crate::machine::error_handling::MachineError;
use crate::machine::pmap::PMap;
use crate::machine::term::{Indicator, Term};

/// What a native predicate call does to the machine.
pub enum NativeResult {
    /// Succeeded with no binding change; continue with the next conjunction.
    True,
    /// Failed; backtrack to the next disjunction.
    Fail,
    /// Use this machine as the new state verbatim (arbitrary surgery,
    /// including pushing new conjunctions or choice points).
    Machine(Machine),
    /// Unify each pair left-to-right under the current bindings; if any
    /// fails, backtrack, otherwise continue with the extended bindings.
    Unify(Vec<(Term, Term)>),
}

/// A native predicate. Receives the machine and the goal's arguments,
/// each pre-resolved by walking the bindings once (non-recursively).
pub type NativeFn = Arc<dyn Fn(&Machine, &[Term]) -> Result<NativeResult, MachineError> + Send + Sync>;

#[derive(Clone, Default)]
pub struct ForeignRegistry {
    entries: PMap<Indicator, NativeFn>,
}

impl fmt::Debug for ForeignRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ForeignRegistry({} entries)", self.entries.len())
    }
}

impl ForeignRegistry {
    pub fn empty() -> Self {
        ForeignRegistry { entries: PMap::new() }
    }

    /// Registers (or replaces) the native function for `indicator`,
    /// returning a new registry.
    pub fn register(&self, indicator: Indicator, f: NativeFn) -> ForeignRegistry {
        ForeignRegistry { entries: self.entries.insert(indicator, f) }
    }

    pub fn get(&self, indicator: &Indicator) -> Option<&NativeFn> {
        self.entries.get(indicator)
    }
}
