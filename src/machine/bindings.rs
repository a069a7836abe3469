//! A persistent variable-to-term substitution with occurs-check-free
//! unification.

use std::collections::HashMap;

use crate::machine::error_handling::MachineError;
use crate::machine::plist::PList;
use crate::machine::pmap::PMap;
use crate::machine::term::{Atom, Term};

/// The current variable-to-term substitution, plus (optionally) the
/// submitted query's variable names, so that answers can be reported
/// keyed by the names the caller actually used rather than internal ids.
#[derive(Clone, Default)]
pub struct Bindings {
    map: PMap<u64, Term>,
    display_names: PMap<u64, Atom>,
    display_name_ids: PList<u64>,
}

impl Bindings {
    pub fn empty() -> Self {
        Bindings { map: PMap::new(), display_names: PMap::new(), display_name_ids: PList::nil() }
    }

    /// Associates each submitted variable name with its id, so that
    /// answers built from these bindings are keyed by source-level names.
    pub fn with_display_names(&self, names: &HashMap<Atom, u64>) -> Bindings {
        let mut display_names = self.display_names.clone();
        let mut display_name_ids = self.display_name_ids.clone();
        for (name, id) in names {
            display_names = display_names.insert(*id, name.clone());
            display_name_ids = display_name_ids.cons(*id);
        }
        Bindings { map: self.map.clone(), display_names, display_name_ids }
    }

    /// Binds `var` to `term`. Binding an already-bound variable is an
    /// error; `unify` never does this because it resolves first.
    pub fn bind(&self, var: u64, term: Term) -> Result<Bindings, MachineError> {
        if self.map.get(&var).is_some() {
            return Err(MachineError::AlreadyBound(var));
        }
        Ok(Bindings {
            map: self.map.insert(var, term),
            display_names: self.display_names.clone(),
            display_name_ids: self.display_name_ids.clone(),
        })
    }

    /// Follows a variable's binding chain until it reaches a non-variable
    /// term or an unbound variable. Never recurses into compound
    /// arguments and never loops: a well-formed substitution built only
    /// through `bind`/`unify` cannot contain a cycle of variable-to-variable
    /// bindings, because `unify`'s variable/variable case always binds the
    /// newer id to the older one. Cyclic *non-variable* bindings (e.g. `X
    /// = f(X)`, allowed here since unification skips the occurs check)
    /// are possible, but `chase` does not loop on those either, since it
    /// only follows variable-to-variable links.
    pub fn chase(&self, term: &Term) -> Term {
        let mut current = term.clone();
        loop {
            match &current {
                Term::Var(id, _) => match self.map.get(id) {
                    Some(bound) => current = bound.clone(),
                    None => return current,
                },
                _ => return current,
            }
        }
    }

    /// Public chase operation for a named variable; errors if it is
    /// unbound rather than returning the bare variable.
    pub fn resolve(&self, var: u64) -> Result<Term, MachineError> {
        match self.chase(&Term::Var(var, None)) {
            Term::Var(id, _) if id == var => Err(MachineError::UnboundVariable(var)),
            other => Ok(other),
        }
    }

    /// Recursively substitutes through a whole term, chasing every
    /// variable it finds (including inside compound arguments). Unbound
    /// variables are left as-is.
    pub fn resolve_rec(&self, term: &Term) -> Term {
        match self.chase(term) {
            Term::Compound(name, args) => {
                let resolved: Vec<Term> = args.iter().map(|a| self.resolve_rec(a)).collect();
                Term::Compound(name, resolved.into())
            }
            other => other,
        }
    }

    /// Unifies `a` and `b`, returning the extended bindings or
    /// `MachineError::CantUnify`. The occurs-check is intentionally
    /// omitted, matching the source this engine is modeled on.
    pub fn unify(&self, a: &Term, b: &Term) -> Result<Bindings, MachineError> {
        let ra = self.chase(a);
        let rb = self.chase(b);
        match (&ra, &rb) {
            (Term::Var(id1, _), Term::Var(id2, _)) if id1 == id2 => Ok(self.clone()),
            (Term::Var(id1, _), Term::Var(id2, _)) => {
                // Bind the newer (larger) id to the older (smaller) one,
                // a fixed, deterministic direction.
                if id1 > id2 {
                    self.bind(*id1, rb.clone())
                } else {
                    self.bind(*id2, ra.clone())
                }
            }
            (Term::Var(id, _), _) => self.bind(*id, rb.clone()),
            (_, Term::Var(id, _)) => self.bind(*id, ra.clone()),
            (Term::Atom(x), Term::Atom(y)) => {
                if x == y {
                    Ok(self.clone())
                } else {
                    Err(MachineError::CantUnify(ra.clone(), rb.clone()))
                }
            }
            (Term::Integer(x), Term::Integer(y)) => {
                if x == y {
                    Ok(self.clone())
                } else {
                    Err(MachineError::CantUnify(ra.clone(), rb.clone()))
                }
            }
            (Term::Compound(f1, args1), Term::Compound(f2, args2)) => {
                if f1 != f2 || args1.len() != args2.len() {
                    return Err(MachineError::CantUnify(ra.clone(), rb.clone()));
                }
                let mut bindings = self.clone();
                for (x, y) in args1.iter().zip(args2.iter()) {
                    bindings = bindings.unify(x, y)?;
                }
                Ok(bindings)
            }
            _ => Err(MachineError::CantUnify(ra.clone(), rb.clone())),
        }
    }

    /// Builds the caller-facing answer map: display-named query variables
    /// only, resolved recursively against this substitution.
    pub fn answer_map(&self) -> HashMap<Atom, Term> {
        let mut out = HashMap::new();
        for id in self.display_name_ids.iter() {
            if let Some(name) = self.display_names.get(id) {
                out.insert(name.clone(), self.resolve_rec(&Term::Var(*id, None)));
            }
        }
        out
    }
}
