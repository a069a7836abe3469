// src/lib.rs
//! A persistent SLD-resolution proof engine for a small Prolog-family
//! logic language.
//!
//! The engine itself lives under [`machine`]: a term algebra with
//! interned atoms, occurs-check-free unification over a persistent
//! substitution, a depth-first resolution loop driven by explicit
//! choice points, and cut pruning scoped by source-rewritten barriers.
//! [`reader`] turns Prolog source text into the [`machine::Term`] values
//! the engine works on.
//!
//! Modules:
//! - machine: the term algebra, bindings, database, registry, choice
//!   points, and the `Machine` type itself.
//! - reader: a pest-based parser from Prolog source text to `Term`.

pub mod machine;
pub mod reader;

pub use machine::{Answer, Bindings, Config, Machine, MachineError, Proof, Term};
