//! The native predicates every machine starts with: the control
//! constructs (`,/2`, `;/2`, `->/2`, cut, `call/N`) that the step loop
//! cannot express as ordinary database clauses, plus a handful of
//! supplemental predicates (`findall/3`, `msort/2`, term-inspection) that
//! round the engine out into something a real program can be written
//! against.

use std::cmp::Ordering;
use std::sync::Arc;

use crate::machine::core::{cut_to_term, fresh_barrier_id, Machine};
use crate::machine::choice_point::ChoicePoint;
use crate::machine::error_handling::MachineError;
use crate::machine::plist::PList;
use crate::machine::registry::{NativeFn, NativeResult};
use crate::machine::term::{intern, Indicator, Term};

fn reg<F>(m: Machine, name: &str, arity: usize, f: F) -> Machine
where
    F: Fn(&Machine, &[Term]) -> Result<NativeResult, MachineError> + Send + Sync + 'static,
{
    let indicator = Indicator { name: intern(name), arity };
    m.register_foreign(indicator, Arc::new(f) as NativeFn)
}

/// Registers every built-in this module provides on `m`, returning the
/// extended machine. Called once, by [`Machine::new`].
pub fn install(m: &Machine) -> Machine {
    let m = m.clone();
    let m = reg(m, "true", 0, |_m, _a| Ok(NativeResult::True));
    let m = reg(m, "fail", 0, |_m, _a| Ok(NativeResult::Fail));
    let m = reg(m, "false", 0, |_m, _a| Ok(NativeResult::Fail));
    let m = reg(m, "!", 0, |_m, _a| Ok(NativeResult::True));
    let m = reg(m, "$cut_to", 1, cut_to);
    let m = reg(m, ",", 2, conjunction);
    let m = reg(m, ";", 2, disjunction);
    let m = reg(m, "->", 2, if_then);
    let m = reg(m, "=", 2, |_m, args| Ok(NativeResult::Unify(vec![(args[0].clone(), args[1].clone())])));
    let m = reg(m, "\\=", 2, not_unifiable);
    let m = reg(m, "==", 2, structurally_equal);
    let m = reg(m, "\\==", 2, structurally_not_equal);
    let m = reg(m, "findall", 3, findall);
    let m = reg(m, "msort", 2, msort);
    let m = reg(m, "functor", 3, functor);
    let m = reg(m, "arg", 3, arg);
    let m = reg(m, "=..", 2, univ);
    let mut m = m;
    for arity in 1..=8 {
        m = reg(m, "call", arity, call_n);
    }
    m
}

fn cut_to(m: &Machine, args: &[Term]) -> Result<NativeResult, MachineError> {
    match &args[0] {
        Term::Integer(id) => Ok(NativeResult::Machine(m.cut_to(*id as u64)?)),
        other => Err(MachineError::MalformedCutTarget(other.clone())),
    }
}

/// `(A, B)`: prove `A` then `B`. Both arguments already had any bare cut
/// they contained rewritten against the enclosing barrier when this
/// conjunction was itself scheduled, so re-pushing them here is inert
/// with respect to cut.
fn conjunction(m: &Machine, args: &[Term]) -> Result<NativeResult, MachineError> {
    let next = m.push_conj(args[1].clone()).push_conj(args[0].clone());
    Ok(NativeResult::Machine(next))
}

/// `(A ; B)`. When `A` is itself `Cond -> Then`, this is an if-then-else:
/// a local cut barrier is introduced so that `Cond` succeeding commits to
/// its first solution and discards the `Else` alternative; `Cond`
/// failing falls through to `Else` untouched.
fn disjunction(m: &Machine, args: &[Term]) -> Result<NativeResult, MachineError> {
    if let Term::Compound(name, inner) = &args[0] {
        if &**name == "->" && inner.len() == 2 {
            let cond = inner[0].clone();
            let then = inner[1].clone();
            let else_branch = args[1].clone();
            let barrier = fresh_barrier_id();
            // The barrier must sit *below* the else choice point: `$cut_to`
            // retains the barrier and everything below it, so pushing the
            // barrier first and the else alternative on top of it means a
            // commit after `Cond` succeeds discards `Else` along with it.
            // Pushed the other way around, `Else` would survive the commit
            // and fire spuriously if `Then` later failed.
            let with_barrier = m.push_disj(ChoicePoint::CutBarrier { id: barrier });
            let with_else = with_barrier.push_disj(ChoicePoint::Disj { m0: Arc::new(m.clone()), goal: else_branch });
            let continuation = Term::compound(",", vec![cond, Term::compound(",", vec![cut_to_term(barrier), then])]);
            return Ok(NativeResult::Machine(with_else.push_conj(continuation)));
        }
    }
    let else_branch = args[1].clone();
    let with_else = m.push_disj(ChoicePoint::Disj { m0: Arc::new(m.clone()), goal: else_branch });
    Ok(NativeResult::Machine(with_else.push_conj(args[0].clone())))
}

/// Standalone `Cond -> Then`, outside of a `;/2`: succeeds at most once,
/// with no else branch to fall back to on `Cond`'s failure.
fn if_then(m: &Machine, args: &[Term]) -> Result<NativeResult, MachineError> {
    let cond = args[0].clone();
    let then = args[1].clone();
    let barrier = fresh_barrier_id();
    let with_barrier = m.push_disj(ChoicePoint::CutBarrier { id: barrier });
    let continuation = Term::compound(",", vec![cond, Term::compound(",", vec![cut_to_term(barrier), then])]);
    Ok(NativeResult::Machine(with_barrier.push_conj(continuation)))
}

fn not_unifiable(m: &Machine, args: &[Term]) -> Result<NativeResult, MachineError> {
    match m.bindings().unify(&args[0], &args[1]) {
        Ok(_) => Ok(NativeResult::Fail),
        Err(MachineError::CantUnify(_, _)) => Ok(NativeResult::True),
        Err(e) => Err(e),
    }
}

fn structurally_equal(m: &Machine, args: &[Term]) -> Result<NativeResult, MachineError> {
    let a = m.bindings().resolve_rec(&args[0]);
    let b = m.bindings().resolve_rec(&args[1]);
    if a == b {
        Ok(NativeResult::True)
    } else {
        Ok(NativeResult::Fail)
    }
}

fn structurally_not_equal(m: &Machine, args: &[Term]) -> Result<NativeResult, MachineError> {
    match structurally_equal(m, args)? {
        NativeResult::True => Ok(NativeResult::Fail),
        NativeResult::Fail => Ok(NativeResult::True),
        other => Ok(other),
    }
}

fn build_call_goal(base: &Term, extra: &[Term]) -> Result<Term, MachineError> {
    match base {
        Term::Atom(name) => {
            if extra.is_empty() {
                Ok(Term::Atom(name.clone()))
            } else {
                Ok(Term::compound(name, extra.to_vec()))
            }
        }
        Term::Compound(name, args) => {
            let mut all: Vec<Term> = args.iter().cloned().collect();
            all.extend(extra.iter().cloned());
            Ok(Term::compound(name, all))
        }
        other => Err(MachineError::NotCallable(other.clone())),
    }
}

fn call_n(m: &Machine, args: &[Term]) -> Result<NativeResult, MachineError> {
    let goal = build_call_goal(&args[0], &args[1..])?;
    Ok(NativeResult::Machine(m.push_conj(goal)))
}

/// `findall(Template, Goal, Bag)`: runs `Goal` to exhaustion in a fresh,
/// isolated sub-machine sharing this one's database, registry and
/// bindings but starting with empty choice-point and goal stacks, so
/// that nothing `Goal` does to them is visible once `findall` returns.
fn findall(m: &Machine, args: &[Term]) -> Result<NativeResult, MachineError> {
    let template = args[0].clone();
    let goal = args[1].clone();
    let sub = Machine {
        database: m.database.clone(),
        registry: m.registry.clone(),
        bindings: m.bindings.clone(),
        disjunctions: PList::nil(),
        conjunctions: PList::nil(),
        config: m.config.clone(),
    };
    let mut current = sub.push_conj(goal);
    let mut results = Vec::new();
    let mut steps: u64 = 0;
    loop {
        if let Some(max) = m.config.max_steps {
            if steps >= max {
                return Err(MachineError::StepBudgetExceeded);
            }
        }
        steps += 1;
        let (next, answer, done) = current.step()?;
        if let Some(_answer) = answer {
            results.push(next.bindings.resolve_rec(&template));
        }
        if done {
            break;
        }
        current = next;
    }
    Ok(NativeResult::Unify(vec![(args[2].clone(), Term::list(results))]))
}

fn list_to_vec(m: &Machine, term: &Term) -> Result<Vec<Term>, MachineError> {
    let mut out = Vec::new();
    let mut cur = m.bindings().chase(term);
    loop {
        if cur.is_nil() {
            return Ok(out);
        }
        match &cur {
            Term::Compound(name, cargs) if &**name == "." && cargs.len() == 2 => {
                out.push(m.bindings().resolve_rec(&cargs[0]));
                cur = m.bindings().chase(&cargs[1]);
            }
            other => return Err(MachineError::ImproperList(other.clone())),
        }
    }
}

/// The standard order of terms: `Var < Integer < Atom < Compound`, each
/// category then ordered by id, value, name, or (arity, name, args).
pub fn standard_order(a: &Term, b: &Term) -> Ordering {
    fn rank(t: &Term) -> u8 {
        match t {
            Term::Var(_, _) => 0,
            Term::Integer(_) => 1,
            Term::Atom(_) => 2,
            Term::Compound(_, _) => 3,
        }
    }
    let (ra, rb) = (rank(a), rank(b));
    if ra != rb {
        return ra.cmp(&rb);
    }
    match (a, b) {
        (Term::Var(i, _), Term::Var(j, _)) => i.cmp(j),
        (Term::Integer(x), Term::Integer(y)) => x.cmp(y),
        (Term::Atom(x), Term::Atom(y)) => x.as_ref().cmp(y.as_ref()),
        (Term::Compound(fx, ax), Term::Compound(fy, ay)) => ax
            .len()
            .cmp(&ay.len())
            .then_with(|| fx.as_ref().cmp(fy.as_ref()))
            .then_with(|| {
                for (x, y) in ax.iter().zip(ay.iter()) {
                    let c = standard_order(x, y);
                    if c != Ordering::Equal {
                        return c;
                    }
                }
                Ordering::Equal
            }),
        _ => unreachable!("rank equality implies matching variants"),
    }
}

fn msort(m: &Machine, args: &[Term]) -> Result<NativeResult, MachineError> {
    let mut items = list_to_vec(m, &args[0])?;
    items.sort_by(standard_order);
    Ok(NativeResult::Unify(vec![(args[1].clone(), Term::list(items))]))
}

fn functor(m: &Machine, args: &[Term]) -> Result<NativeResult, MachineError> {
    let t = m.bindings().chase(&args[0]);
    match &t {
        Term::Var(_, _) => {
            let name = m.bindings().chase(&args[1]);
            let arity = m.bindings().chase(&args[2]);
            match arity {
                Term::Integer(0) => Ok(NativeResult::Unify(vec![(args[0].clone(), name)])),
                Term::Integer(n) if n > 0 => match &name {
                    Term::Atom(functor_name) => {
                        let fresh_args: Vec<Term> = (0..n).map(|_| Term::fresh_var()).collect();
                        let built = Term::compound(functor_name, fresh_args);
                        Ok(NativeResult::Unify(vec![(args[0].clone(), built)]))
                    }
                    other => Err(MachineError::NotCallable(other.clone())),
                },
                other => Err(MachineError::NotCallable(other)),
            }
        }
        Term::Atom(_) | Term::Integer(_) => {
            Ok(NativeResult::Unify(vec![(args[1].clone(), t.clone()), (args[2].clone(), Term::Integer(0))]))
        }
        Term::Compound(name, cargs) => Ok(NativeResult::Unify(vec![
            (args[1].clone(), Term::Atom(name.clone())),
            (args[2].clone(), Term::Integer(cargs.len() as i64)),
        ])),
    }
}

fn arg(m: &Machine, args: &[Term]) -> Result<NativeResult, MachineError> {
    let n = match m.bindings().chase(&args[0]) {
        Term::Integer(n) => n,
        other => return Err(MachineError::NotCallable(other)),
    };
    let t = m.bindings().chase(&args[1]);
    match &t {
        Term::Compound(_, cargs) => {
            if n < 1 || (n as usize) > cargs.len() {
                Ok(NativeResult::Fail)
            } else {
                Ok(NativeResult::Unify(vec![(args[2].clone(), cargs[(n - 1) as usize].clone())]))
            }
        }
        other => Err(MachineError::NotCallable(other.clone())),
    }
}

fn univ(m: &Machine, args: &[Term]) -> Result<NativeResult, MachineError> {
    let t = m.bindings().chase(&args[0]);
    match &t {
        Term::Var(_, _) => {
            let items = list_to_vec(m, &args[1])?;
            let (head, rest) = items.split_first().ok_or_else(|| MachineError::ImproperList(args[1].clone()))?;
            if rest.is_empty() {
                Ok(NativeResult::Unify(vec![(args[0].clone(), head.clone())]))
            } else {
                match head {
                    Term::Atom(name) => Ok(NativeResult::Unify(vec![(args[0].clone(), Term::compound(name, rest.to_vec()))])),
                    other => Err(MachineError::NotCallable(other.clone())),
                }
            }
        }
        Term::Atom(_) | Term::Integer(_) => Ok(NativeResult::Unify(vec![(args[1].clone(), Term::list(vec![t.clone()]))])),
        Term::Compound(name, cargs) => {
            let mut items = vec![Term::Atom(name.clone())];
            items.extend(cargs.iter().cloned());
            Ok(NativeResult::Unify(vec![(args[1].clone(), Term::list(items))]))
        }
    }
}
