//! The machine: an immutable snapshot of a proof in progress, plus the
//! single `step` transition that drives SLD resolution, and the public
//! `Machine` API consumers use to run proofs.

use std::collections::HashMap;
use std::sync::Arc;

use log::trace;

use crate::machine::bindings::Bindings;
use crate::machine::choice_point::{ChoicePoint, FollowOutcome};
use crate::machine::config::Config;
use crate::machine::database::Database;
use crate::machine::error_handling::MachineError;
use crate::machine::plist::PList;
use crate::machine::registry::{ForeignRegistry, NativeResult};
use crate::machine::term::{Atom, Term};
use crate::reader::{self, ReaderError};

/// The up-front, process-monotonic counter backing cut-barrier ids lives
/// next to variable-id allocation in `term.rs`'s style: a single atomic
/// counter, reused by every machine in the process.
static NEXT_BARRIER_ID: std::sync::atomic::AtomicU64 = std::sync::atomic::AtomicU64::new(0);

pub(crate) fn fresh_barrier_id() -> u64 {
    NEXT_BARRIER_ID.fetch_add(1, std::sync::atomic::Ordering::Relaxed)
}

/// An immutable interpreter snapshot. Every field is a persistent,
/// `Arc`-rooted structure, so `Machine: Clone` is a handful of reference
/// counter bumps — cheap enough that every operation below simply clones
/// `self`, mutates the clone, and returns it: every operation returns a
/// new machine rather than mutating in place, while reading like
/// ordinary imperative code internally.
#[derive(Clone)]
pub struct Machine {
    pub database: Database,
    pub registry: ForeignRegistry,
    pub bindings: Bindings,
    pub disjunctions: PList<ChoicePoint>,
    pub conjunctions: PList<Term>,
    pub config: Config,
}

/// An answer: the query's variables, resolved against the bindings in
/// effect the moment the conjunction stack emptied.
#[derive(Debug, Clone, PartialEq)]
pub struct Answer {
    pub bindings: HashMap<Atom, Term>,
}

fn is_true_zero(t: &Term) -> bool {
    matches!(t, Term::Atom(name) if &**name == "true")
}

/// Rewrites cut so it knows which choice points it prunes: every
/// syntactic `!` inside `term` is replaced by `$cut_to(barrier)`. The
/// rewrite descends into both arguments of `,/2` and `;/2`, only the
/// right (then-branch) argument of `->/2`, and nowhere else — so a cut
/// inside an if-then's condition, or inside the argument of some other
/// compound, is left untouched and will be captured by whatever barrier
/// is in scope when *that* subterm is itself scheduled.
fn rewrite_cuts(term: &Term, barrier: u64) -> Term {
    match term {
        Term::Atom(name) if &**name == "!" => cut_to_term(barrier),
        Term::Compound(name, args) if &**name == "," && args.len() == 2 => {
            Term::compound(",", vec![rewrite_cuts(&args[0], barrier), rewrite_cuts(&args[1], barrier)])
        }
        Term::Compound(name, args) if &**name == ";" && args.len() == 2 => {
            Term::compound(";", vec![rewrite_cuts(&args[0], barrier), rewrite_cuts(&args[1], barrier)])
        }
        Term::Compound(name, args) if &**name == "->" && args.len() == 2 => {
            Term::compound("->", vec![args[0].clone(), rewrite_cuts(&args[1], barrier)])
        }
        _ => term.clone(),
    }
}

pub(crate) fn cut_to_term(barrier: u64) -> Term {
    Term::compound("$cut_to", vec![Term::Integer(barrier as i64)])
}

impl Machine {
    /// A freshly-built machine: an empty database, only the control
    /// built-ins registered (see [`crate::machine::builtins::install`]),
    /// empty bindings and stacks.
    pub fn new() -> Self {
        let m = Machine {
            database: Database::empty(),
            registry: ForeignRegistry::empty(),
            bindings: Bindings::empty(),
            disjunctions: PList::nil(),
            conjunctions: PList::nil(),
            config: Config::unbounded(),
        };
        crate::machine::builtins::install(&m)
    }

    pub fn with_config(&self, config: Config) -> Machine {
        let mut m = self.clone();
        m.config = config;
        m
    }

    // --- low-level hooks for native-predicate authors ---------------

    pub fn bindings(&self) -> &Bindings {
        &self.bindings
    }

    pub fn set_bindings(&self, bindings: Bindings) -> Machine {
        let mut m = self.clone();
        m.bindings = bindings;
        m
    }

    /// Schedules `term` as the next goal to prove, rewriting any bare
    /// cut it contains against the machine's current innermost barrier.
    /// This is the one place the cut rewrite happens: it must occur at
    /// push time, never at execution time, or a cut could end up pruning
    /// choice points pushed after it was scheduled instead of before.
    pub fn push_conj(&self, term: Term) -> Machine {
        let mut m = self.clone();
        let scheduled = match self.most_recent_cut_barrier() {
            Some(barrier) => rewrite_cuts(&term, barrier),
            None => term,
        };
        m.conjunctions = m.conjunctions.cons(scheduled);
        m
    }

    pub fn pop_conj(&self) -> Result<(Term, Machine), MachineError> {
        let (goal, rest) = self.conjunctions.uncons().ok_or(MachineError::EmptyConjunctions)?;
        let mut m = self.clone();
        let goal = goal.clone();
        m.conjunctions = rest;
        Ok((goal, m))
    }

    pub fn clear_conjs(&self) -> Machine {
        let mut m = self.clone();
        m.conjunctions = PList::nil();
        m
    }

    pub fn push_disj(&self, cp: ChoicePoint) -> Machine {
        let mut m = self.clone();
        m.disjunctions = m.disjunctions.cons(cp);
        m
    }

    pub fn pop_disj(&self) -> Result<(ChoicePoint, Machine), MachineError> {
        let (cp, rest) = self.disjunctions.uncons().ok_or(MachineError::EmptyDisjunctions)?;
        let mut m = self.clone();
        let cp = cp.clone();
        m.disjunctions = rest;
        Ok((cp, m))
    }

    /// Pushes a fresh cut barrier unless the top of the disjunction stack
    /// is already one (so a predicate that is tried again on backtrack
    /// does not accumulate a barrier per attempt).
    pub fn demand_cut_barrier(&self) -> Machine {
        match self.disjunctions.head() {
            Some(cp) if cp.barrier_id().is_some() => self.clone(),
            _ => self.push_disj(ChoicePoint::CutBarrier { id: fresh_barrier_id() }),
        }
    }

    /// The id of the nearest cut barrier, searching from the top of the
    /// disjunction stack downward past any non-barrier choice points.
    pub fn most_recent_cut_barrier(&self) -> Option<u64> {
        self.disjunctions.iter().find_map(|cp| cp.barrier_id())
    }

    /// Pops disjunctions until (and retaining) the barrier with `id`.
    pub fn cut_to(&self, id: u64) -> Result<Machine, MachineError> {
        let mut stack = self.disjunctions.clone();
        loop {
            match stack.head() {
                None => return Err(MachineError::NoBarriers),
                Some(cp) if cp.barrier_id() == Some(id) => {
                    let mut m = self.clone();
                    m.disjunctions = stack;
                    return Ok(m);
                }
                _ => stack = stack.tail().expect("head() returned Some"),
            }
        }
    }

    pub fn register_foreign(&self, indicator: crate::machine::term::Indicator, f: crate::machine::registry::NativeFn) -> Machine {
        let mut m = self.clone();
        m.registry = m.registry.register(indicator, f);
        m
    }

    pub fn consult(&self, source: &str) -> Result<Machine, MachineError> {
        let clauses = reader::parse_program(source).map_err(reader_error_to_machine_error)?;
        let mut m = self.clone();
        for clause in clauses {
            if let Term::Compound(name, args) = &clause {
                if &**name == ":-" && args.len() == 1 {
                    // Directives are parsed but silently ignored.
                    continue;
                }
            }
            let indicator = clause_indicator(&clause);
            m.database = m.database.assertz(indicator, clause);
        }
        Ok(m)
    }

    /// Arguments shallow-resolved once against `self.bindings` (variable
    /// chains followed, nested compounds left alone), as native
    /// predicates receive them.
    fn shallow_args(&self, goal: &Term) -> Vec<Term> {
        match goal {
            Term::Compound(_, args) => args.iter().map(|a| self.bindings.chase(a)).collect(),
            _ => Vec::new(),
        }
    }

    /// A single resolution step. Returns the next machine, an answer if
    /// the conjunction stack just emptied, and whether the search is
    /// entirely done.
    pub fn step(&self) -> Result<(Machine, Option<Answer>, bool), MachineError> {
        let mut m = self.clone();
        loop {
            match m.conjunctions.head() {
                None => {
                    let answer = Answer { bindings: m.bindings.answer_map() };
                    let next = m.push_conj(Term::atom("fail"));
                    return Ok((next, Some(answer), false));
                }
                Some(g) if is_true_zero(g) => {
                    m.conjunctions = m.conjunctions.tail().expect("head() returned Some");
                    continue;
                }
                Some(_) => break,
            }
        }

        let (goal, mut m) = m.pop_conj()?;
        let goal = m.bindings.chase(&goal);
        let indicator = goal.indicator().ok_or_else(|| MachineError::NotCallable(goal.clone()))?;
        trace!("step: calling {}", indicator);

        if let Some(native) = m.registry.get(&indicator).cloned() {
            let args = m.shallow_args(&goal);
            match native(&m, &args)? {
                NativeResult::True => Ok((m, None, false)),
                NativeResult::Fail => Machine::backtrack(m),
                NativeResult::Machine(next) => Ok((next, None, false)),
                NativeResult::Unify(pairs) => {
                    let mut bindings = m.bindings.clone();
                    let mut ok = true;
                    for (x, y) in pairs {
                        match bindings.unify(&x, &y) {
                            Ok(next) => bindings = next,
                            Err(MachineError::CantUnify(_, _)) => {
                                ok = false;
                                break;
                            }
                            Err(e) => return Err(e),
                        }
                    }
                    if ok {
                        m.bindings = bindings;
                        Ok((m, None, false))
                    } else {
                        Machine::backtrack(m)
                    }
                }
            }
        } else {
            let candidates = m.database.candidates(&indicator);
            let mut m = m.demand_cut_barrier();
            // Each candidate's choice point captures the stack *below* it
            // (built by folding from the last candidate up) so that
            // following the first one never discards the remaining
            // siblings: on backtrack they are still there to try.
            for clause in candidates.iter().rev() {
                let m0 = Arc::new(m.clone());
                m = m.push_disj(ChoicePoint::HeadBody { m0, goal: goal.clone(), clause: clause.clone() });
            }
            Machine::backtrack(m)
        }
    }

    fn backtrack(start: Machine) -> Result<(Machine, Option<Answer>, bool), MachineError> {
        let mut m = start;
        loop {
            match m.pop_disj() {
                Err(MachineError::EmptyDisjunctions) => return Ok((m, None, true)),
                Err(e) => return Err(e),
                Ok((cp, rest)) => match cp.follow()? {
                    FollowOutcome::Next(next) => return Ok((next, None, false)),
                    FollowOutcome::Fail => {
                        m = rest;
                        continue;
                    }
                },
            }
        }
    }

    /// Enumerates all answers to `goal` as a lazy iterator (it may be
    /// infinite; bounding it — with `.take(n)` or a `Config` step/answer
    /// budget — is the caller's responsibility).
    pub fn prove_all(&self, goal: Term) -> Proof {
        let names = collect_display_names(&goal);
        let m = self.set_bindings(self.bindings.with_display_names(&names)).push_conj(goal);
        Proof { machine: m, steps_taken: 0, answers_taken: 0, done: false }
    }

    pub fn prove_all_unchecked(&self, goal: Term) -> Proof {
        self.prove_all(goal)
    }

    pub fn can_prove(&self, goal: Term) -> Result<bool, MachineError> {
        match self.prove_all(goal).next() {
            None => Ok(false),
            Some(Ok(_)) => Ok(true),
            Some(Err(e)) => Err(e),
        }
    }

    pub fn can_prove_unchecked(&self, goal: Term) -> bool {
        self.can_prove(goal).unwrap_or_else(|e| panic!("{e}"))
    }

    /// Parses `source` as a single goal and proves it, accepting a goal
    /// either as a parsed term ([`Machine::prove_all`]) or as raw source
    /// text, for callers that only have the latter on hand.
    pub fn prove_all_source(&self, source: &str) -> Result<Proof, MachineError> {
        let (goal, names) = reader::parse_goal(source).map_err(reader_error_to_machine_error)?;
        let m = self.set_bindings(self.bindings.with_display_names(&names)).push_conj(goal);
        Ok(Proof { machine: m, steps_taken: 0, answers_taken: 0, done: false })
    }

    pub fn can_prove_source(&self, source: &str) -> Result<bool, MachineError> {
        match self.prove_all_source(source)?.next() {
            None => Ok(false),
            Some(Ok(_)) => Ok(true),
            Some(Err(e)) => Err(e),
        }
    }
}

impl Default for Machine {
    fn default() -> Self {
        Machine::new()
    }
}

fn reader_error_to_machine_error(e: ReaderError) -> MachineError {
    MachineError::Parse(e.to_string())
}

fn clause_indicator(clause: &Term) -> crate::machine::term::Indicator {
    let (head, _) = crate::machine::clause::split(clause);
    head.indicator().unwrap_or_else(|| crate::machine::term::Indicator { name: crate::machine::term::intern("?"), arity: 0 })
}

fn collect_display_names(term: &Term) -> HashMap<Atom, u64> {
    let mut names = HashMap::new();
    collect_into(term, &mut names);
    names
}

fn collect_into(term: &Term, names: &mut HashMap<Atom, u64>) {
    match term {
        Term::Var(id, Some(hint)) if &**hint != "_" => {
            names.entry(hint.clone()).or_insert(*id);
        }
        Term::Compound(_, args) => {
            for a in args.iter() {
                collect_into(a, names);
            }
        }
        _ => {}
    }
}

/// A lazy sequence of answers, driving `Machine::step` one answer at a
/// time. Bounded by `Config::max_steps`/`max_answers` when set.
pub struct Proof {
    machine: Machine,
    steps_taken: u64,
    answers_taken: u64,
    done: bool,
}

impl Iterator for Proof {
    type Item = Result<Answer, MachineError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if let Some(max) = self.machine.config.max_answers {
            if self.answers_taken >= max {
                self.done = true;
                return None;
            }
        }
        loop {
            if let Some(max) = self.machine.config.max_steps {
                if self.steps_taken >= max {
                    self.done = true;
                    return Some(Err(MachineError::StepBudgetExceeded));
                }
            }
            self.steps_taken += 1;
            match self.machine.step() {
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
                Ok((next, answer, done)) => {
                    self.machine = next;
                    if done {
                        self.done = true;
                        return None;
                    }
                    if let Some(answer) = answer {
                        self.answers_taken += 1;
                        return Some(Ok(answer));
                    }
                }
            }
        }
    }
}

/// The same renaming operation `ChoicePoint::HeadBody::follow` uses,
/// re-exported at module level for native predicates (e.g. `copy_term/2`,
/// were it added) that need a fresh-variable copy of a term.
pub fn rename_apart(term: &Term) -> Term {
    crate::machine::clause::rename_apart(term)
}
