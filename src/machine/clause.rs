//! Clauses are just terms: a fact is a head term, a rule is a `:-/2`
//! term whose left argument is the head and right argument is the body.
//! This module holds the handful of helpers that look at a term through
//! that lens, plus the fresh-variable renaming used to pull a clause out
//! of the database.

use std::collections::HashMap;

use crate::machine::term::{fresh_var_id, Term};

/// Splits a clause term into `(head, body)`. A `:-/2` compound is a rule;
/// anything else is a fact, whose body is the atom `true`.
pub fn split(clause: &Term) -> (Term, Term) {
    match clause {
        Term::Compound(name, args) if &**name == ":-" && args.len() == 2 => {
            (args[0].clone(), args[1].clone())
        }
        other => (other.clone(), Term::atom("true")),
    }
}

/// Produces a copy of `term` in which every variable has been replaced by
/// a freshly-allocated one; repeated occurrences of the same variable
/// within `term` share the same fresh id. The original term is untouched.
pub fn rename_apart(term: &Term) -> Term {
    let mut mapping = HashMap::new();
    rename_with(term, &mut mapping)
}

fn rename_with(term: &Term, mapping: &mut HashMap<u64, Term>) -> Term {
    match term {
        Term::Var(id, hint) => mapping
            .entry(*id)
            .or_insert_with(|| Term::Var(fresh_var_id(), hint.clone()))
            .clone(),
        Term::Compound(name, args) => {
            let renamed: Vec<Term> = args.iter().map(|a| rename_with(a, mapping)).collect();
            Term::Compound(name.clone(), renamed.into())
        }
        Term::Atom(_) | Term::Integer(_) => term.clone(),
    }
}
