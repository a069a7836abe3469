//! The term algebra manipulated by the proof engine.
//!
//! Atoms are interned strings so that cloning a term never allocates;
//! compounds share their argument vectors the same way. Variables carry
//! a process-unique id allocated from a monotonic counter (see
//! [`fresh_var_id`]) plus an optional source-level hint kept only for
//! diagnostics.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use once_cell::sync::Lazy;
use std::collections::HashSet;
use std::sync::Mutex;

/// An interned atom name. Two atoms with equal text are cheap to compare
/// and cheap to clone.
pub type Atom = Arc<str>;

static INTERNER: Lazy<Mutex<HashSet<Atom>>> = Lazy::new(|| Mutex::new(HashSet::new()));

/// Interns `s`, returning the shared [`Atom`] for it.
pub fn intern(s: &str) -> Atom {
    let mut table = INTERNER.lock().unwrap();
    if let Some(existing) = table.get(s) {
        return existing.clone();
    }
    let atom: Atom = Arc::from(s);
    table.insert(atom.clone());
    atom
}

static NEXT_VAR_ID: AtomicU64 = AtomicU64::new(0);

/// Allocates a fresh, process-unique variable id.
///
/// Every variable id is unique for the lifetime of the process (the term
/// algebra's invariant), which is what lets [`crate::machine::core::rename_apart`]
/// produce disjoint copies of a clause on every use.
pub fn fresh_var_id() -> u64 {
    NEXT_VAR_ID.fetch_add(1, Ordering::Relaxed)
}

/// A value manipulated by the proof engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Term {
    /// An interned symbol.
    Atom(Atom),
    /// A machine-sized signed integer.
    Integer(i64),
    /// A functor applied to a non-empty, ordered sequence of arguments.
    Compound(Atom, Arc<[Term]>),
    /// A logic variable: a process-unique id plus an optional source hint.
    Var(u64, Option<Atom>),
}

/// The `name/arity` key used to dispatch predicates.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Indicator {
    pub name: Atom,
    pub arity: usize,
}

impl fmt::Display for Indicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.arity)
    }
}

impl Term {
    /// Builds an atom term, interning its name.
    pub fn atom(name: &str) -> Term {
        Term::Atom(intern(name))
    }

    /// Builds a compound term. Panics if `args` is empty — a functor with
    /// no arguments is an atom, not a compound.
    pub fn compound(name: &str, args: Vec<Term>) -> Term {
        assert!(!args.is_empty(), "compound terms must have at least one argument");
        Term::Compound(intern(name), Arc::from(args))
    }

    /// Allocates a fresh unnamed variable.
    pub fn fresh_var() -> Term {
        Term::Var(fresh_var_id(), None)
    }

    /// Allocates a fresh variable carrying `hint` as its source-level name.
    pub fn fresh_named_var(hint: &str) -> Term {
        Term::Var(fresh_var_id(), Some(intern(hint)))
    }

    /// The dispatch key for this term, if it is callable (an atom or a
    /// compound). Integers and variables have no indicator.
    pub fn indicator(&self) -> Option<Indicator> {
        match self {
            Term::Atom(name) => Some(Indicator { name: name.clone(), arity: 0 }),
            Term::Compound(name, args) => Some(Indicator { name: name.clone(), arity: args.len() }),
            Term::Integer(_) | Term::Var(_, _) => None,
        }
    }

    /// True if this term is the atom `[]`, the empty-list terminator.
    pub fn is_nil(&self) -> bool {
        matches!(self, Term::Atom(name) if &**name == "[]")
    }

    /// Builds a proper Prolog list term (`'.'/2` cons cells terminated by
    /// `[]`) from `items`.
    pub fn list(items: Vec<Term>) -> Term {
        let mut tail = Term::atom("[]");
        for item in items.into_iter().rev() {
            tail = Term::compound(".", vec![item, tail]);
        }
        tail
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Atom(name) => write!(f, "{}", name),
            Term::Integer(n) => write!(f, "{}", n),
            Term::Var(id, Some(hint)) => write!(f, "_{}{}", hint, id),
            Term::Var(id, None) => write!(f, "_G{}", id),
            Term::Compound(name, args) => {
                write!(f, "{}(", name)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
        }
    }
}
