//! Source-text front end. Everything else in the crate works on [`Term`]
//! values directly; this module is the only place that knows about
//! concrete Prolog syntax.

mod parser;

pub use parser::{parse_goal, parse_program, ReaderError};
