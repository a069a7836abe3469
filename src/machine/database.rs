//! The clause store. `assertz` appends at the end of an indicator's
//! clause list; `candidates` returns them in that same insertion order.
//! No first-argument indexing is performed.

use std::sync::Arc;

use crate::machine::pmap::PMap;
use crate::machine::term::{Indicator, Term};

#[derive(Clone, Default)]
pub struct Database {
    clauses: PMap<Indicator, Arc<Vec<Term>>>,
}

impl Database {
    pub fn empty() -> Self {
        Database { clauses: PMap::new() }
    }

    /// Appends `clause` to the end of the list for `indicator`, returning
    /// a new database; `self` is unaffected.
    pub fn assertz(&self, indicator: Indicator, clause: Term) -> Database {
        let mut clauses: Vec<Term> = self
            .clauses
            .get(&indicator)
            .map(|existing| existing.as_ref().clone())
            .unwrap_or_default();
        clauses.push(clause);
        Database { clauses: self.clauses.insert(indicator, Arc::new(clauses)) }
    }

    /// The clauses whose head indicator matches `indicator`, in the
    /// order they were asserted.
    pub fn candidates(&self, indicator: &Indicator) -> Arc<Vec<Term>> {
        self.clauses.get(indicator).cloned().unwrap_or_default()
    }
}
