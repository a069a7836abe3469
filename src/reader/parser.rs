//! Turns Prolog source text into [`Term`] values using the grammar in
//! `grammar.pest`. Each clause gets its own variable-name table (reset at
//! the start of the clause, never shared with its neighbors); `_` always
//! allocates a fresh, unnamed variable rather than being looked up.

use std::collections::HashMap;

use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser as DeriveParser;
use thiserror::Error;

use crate::machine::term::{intern, Atom, Term};

#[derive(DeriveParser)]
#[grammar = "reader/grammar.pest"]
struct PrologParser;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct ReaderError(String);

/// Parses a whole program: a sequence of clauses, each terminated by
/// `.`. Directives (`:- Goal.`) are parsed like any other clause; what
/// to do with them is left to the caller (the machine's `consult`
/// silently skips them).
pub fn parse_program(source: &str) -> Result<Vec<Term>, ReaderError> {
    let mut pairs = PrologParser::parse(Rule::program, source).map_err(|e| ReaderError(e.to_string()))?;
    let program = pairs.next().expect("the program rule always produces exactly one pair");
    let mut clauses = Vec::new();
    for pair in program.into_inner() {
        match pair.as_rule() {
            Rule::clause => {
                let mut vars = HashMap::new();
                let inner_term = pair.into_inner().next().expect("a clause always wraps a term");
                clauses.push(build_term(inner_term, &mut vars));
            }
            Rule::EOI => {}
            other => unreachable!("unexpected top-level rule {other:?}"),
        }
    }
    Ok(clauses)
}

/// Parses a single ad-hoc goal (the trailing `.` is optional), returning
/// the goal term plus a map from each named variable it mentions to the
/// id it was allocated, so the caller can report an answer keyed by the
/// names the user actually typed.
pub fn parse_goal(source: &str) -> Result<(Term, HashMap<Atom, u64>), ReaderError> {
    let mut pairs = PrologParser::parse(Rule::goal_only, source).map_err(|e| ReaderError(e.to_string()))?;
    let goal_only = pairs.next().expect("the goal_only rule always produces exactly one pair");
    let mut vars = HashMap::new();
    let inner_term = goal_only
        .into_inner()
        .find(|p| p.as_rule() == Rule::term)
        .expect("goal_only always wraps a term");
    let term = build_term(inner_term, &mut vars);
    let mut names = HashMap::new();
    for (name, var_term) in vars {
        if let Term::Var(id, _) = var_term {
            names.insert(intern(&name), id);
        }
    }
    Ok((term, names))
}

fn fold_right_assoc(mut operands: Vec<Term>, functor: &str) -> Term {
    let mut acc = operands.pop().expect("at least one operand in a disjunction/conjunction chain");
    while let Some(left) = operands.pop() {
        acc = Term::compound(functor, vec![left, acc]);
    }
    acc
}

fn build_term(pair: Pair<Rule>, vars: &mut HashMap<String, Term>) -> Term {
    match pair.as_rule() {
        Rule::term | Rule::primary => {
            build_term(pair.into_inner().next().expect("a pass-through rule always wraps one child"), vars)
        }
        Rule::arg_level => {
            let mut inner = pair.into_inner();
            let left = build_term(inner.next().expect("arg_level always has a left operand"), vars);
            match inner.next() {
                None => left,
                Some(op) => {
                    let functor = op.as_str().to_string();
                    let right = build_term(inner.next().expect("a compare_op is always followed by a right operand"), vars);
                    Term::compound(&functor, vec![left, right])
                }
            }
        }
        Rule::rule_level => {
            let operands: Vec<Term> = pair
                .into_inner()
                .filter(|p| p.as_rule() == Rule::disjunction)
                .map(|p| build_term(p, vars))
                .collect();
            binary_or_single(operands, ":-")
        }
        Rule::disjunction => {
            let operands: Vec<Term> = pair
                .into_inner()
                .filter(|p| p.as_rule() == Rule::arrow_level)
                .map(|p| build_term(p, vars))
                .collect();
            fold_right_assoc(operands, ";")
        }
        Rule::arrow_level => {
            let operands: Vec<Term> = pair
                .into_inner()
                .filter(|p| p.as_rule() == Rule::conjunction)
                .map(|p| build_term(p, vars))
                .collect();
            binary_or_single(operands, "->")
        }
        Rule::conjunction => {
            let operands: Vec<Term> = pair
                .into_inner()
                .filter(|p| p.as_rule() == Rule::arg_level)
                .map(|p| build_term(p, vars))
                .collect();
            fold_right_assoc(operands, ",")
        }
        Rule::cut => Term::atom("!"),
        Rule::integer => {
            let value: i64 = pair.as_str().parse().expect("the integer rule only matches valid i64 literals");
            Term::Integer(value)
        }
        Rule::variable => {
            let name = pair.as_str();
            if name == "_" {
                Term::fresh_var()
            } else {
                vars.entry(name.to_string()).or_insert_with(|| Term::fresh_named_var(name)).clone()
            }
        }
        Rule::atom => Term::Atom(intern(&atom_text(pair.into_inner().next().expect("atom always wraps atom_name")))),
        Rule::compound => {
            let mut inner = pair.into_inner();
            let name = atom_text(inner.next().expect("compound always has a name"));
            let args: Vec<Term> = inner
                .next()
                .expect("compound always has an arg_list")
                .into_inner()
                .map(|p| build_term(p, vars))
                .collect();
            Term::compound(&name, args)
        }
        Rule::list => match pair.into_inner().next() {
            None => Term::atom("[]"),
            Some(body) => build_list_body(body, vars),
        },
        other => unreachable!("unexpected rule in term position: {other:?}"),
    }
}

fn binary_or_single(mut operands: Vec<Term>, functor: &str) -> Term {
    match operands.len() {
        1 => operands.pop().expect("checked len == 1"),
        2 => {
            let right = operands.pop().expect("checked len == 2");
            let left = operands.pop().expect("checked len == 2");
            Term::compound(functor, vec![left, right])
        }
        n => unreachable!("an optional binary operator never has {n} operands"),
    }
}

fn build_list_body(pair: Pair<Rule>, vars: &mut HashMap<String, Term>) -> Term {
    let mut items = Vec::new();
    let mut tail = None;
    let mut saw_bar = false;
    for p in pair.into_inner() {
        match p.as_rule() {
            Rule::bar => saw_bar = true,
            Rule::arg_level => {
                let t = build_term(p, vars);
                if saw_bar {
                    tail = Some(t);
                } else {
                    items.push(t);
                }
            }
            other => unreachable!("unexpected rule in a list body: {other:?}"),
        }
    }
    match tail {
        Some(tail_term) => {
            let mut result = tail_term;
            for item in items.into_iter().rev() {
                result = Term::compound(".", vec![item, result]);
            }
            result
        }
        None => Term::list(items),
    }
}

fn atom_text(pair: Pair<Rule>) -> String {
    let inner = pair.into_inner().next().expect("atom_name always has exactly one alternative");
    match inner.as_rule() {
        Rule::quoted_atom_name => {
            let s = inner.as_str();
            s[1..s.len() - 1].to_string()
        }
        _ => inner.as_str().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_fact_and_a_rule() {
        let clauses = parse_program("father(john).\nparent(X) :- father(X).\n").unwrap();
        assert_eq!(clauses.len(), 2);
        assert_eq!(clauses[0], Term::compound("father", vec![Term::atom("john")]));
        assert!(matches!(&clauses[1], Term::Compound(f, _) if &**f == ":-"));
    }

    #[test]
    fn repeated_variables_in_one_clause_share_identity() {
        let clauses = parse_program("same(X, X).\n").unwrap();
        if let Term::Compound(_, args) = &clauses[0] {
            assert_eq!(args[0], args[1]);
        } else {
            panic!("expected a compound");
        }
    }

    #[test]
    fn underscore_is_always_a_fresh_variable() {
        let clauses = parse_program("ignore(_, _).\n").unwrap();
        if let Term::Compound(_, args) = &clauses[0] {
            assert_ne!(args[0], args[1]);
        } else {
            panic!("expected a compound");
        }
    }

    #[test]
    fn parses_lists_with_a_tail() {
        let (goal, _) = parse_goal("p([1, 2 | T])").unwrap();
        if let Term::Compound(_, args) = &goal {
            assert!(matches!(&args[0], Term::Compound(f, _) if &**f == "."));
        } else {
            panic!("expected a compound");
        }
    }

    #[test]
    fn comma_and_semicolon_nest_right_associatively() {
        let (goal, _) = parse_goal("a, b, c").unwrap();
        match &goal {
            Term::Compound(f, args) if &**f == "," => {
                assert_eq!(args[0], Term::atom("a"));
                assert!(matches!(&args[1], Term::Compound(g, _) if &**g == ","));
            }
            _ => panic!("expected a right-nested conjunction"),
        }
    }

    #[test]
    fn parse_goal_reports_query_variable_names() {
        let (_, names) = parse_goal("parent(X)").unwrap();
        assert!(names.contains_key(&intern("X")));
    }

    #[test]
    fn infix_unification_operator_parses_without_parens() {
        let (goal, _) = parse_goal("X = Y").unwrap();
        match &goal {
            Term::Compound(f, args) if &**f == "=" => {
                assert!(matches!(&args[0], Term::Var(_, _)));
                assert!(matches!(&args[1], Term::Var(_, _)));
            }
            _ => panic!("expected a compound '='/2 term"),
        }
    }

    #[test]
    fn infix_operators_are_usable_inside_a_clause_body() {
        let clauses = parse_program("t(X, Y) :- X=Y.\n").unwrap();
        if let Term::Compound(name, args) = &clauses[0] {
            assert_eq!(&**name, ":-");
            assert!(matches!(&args[1], Term::Compound(f, _) if &**f == "="));
        } else {
            panic!("expected a rule");
        }
    }

    #[test]
    fn not_unifiable_and_structural_equality_operators_parse() {
        let (goal, _) = parse_goal("X \\= Y").unwrap();
        assert!(matches!(&goal, Term::Compound(f, _) if &**f == "\\="));
        let (goal, _) = parse_goal("X == Y").unwrap();
        assert!(matches!(&goal, Term::Compound(f, _) if &**f == "=="));
        let (goal, _) = parse_goal("X \\== Y").unwrap();
        assert!(matches!(&goal, Term::Compound(f, _) if &**f == "\\=="));
    }
}
