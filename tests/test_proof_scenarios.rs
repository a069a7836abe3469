#[cfg(test)]
mod tests {
    use sld_engine::{Machine, Term};

    fn var(name: &str) -> Term {
        Term::fresh_named_var(name)
    }

    fn names(answer: &sld_engine::Answer, name: &str) -> Term {
        answer.bindings.get(&sld_engine::machine::term::intern(name)).unwrap().clone()
    }

    #[test]
    fn father_and_mother_feed_parent_in_clause_order() {
        let m = Machine::new()
            .consult(
                "father(john).\n\
                 father(jacob).\n\
                 mother(sue).\n\
                 parent(X) :- father(X).\n\
                 parent(X) :- mother(X).\n",
            )
            .unwrap();
        let answers: Vec<_> = m.prove_all(Term::compound("parent", vec![var("X")])).map(|r| r.unwrap()).collect();
        let got: Vec<Term> = answers.iter().map(|a| names(a, "X")).collect();
        assert_eq!(got, vec![Term::atom("john"), Term::atom("jacob"), Term::atom("sue")]);
    }

    #[test]
    fn can_prove_answers_true_or_false_without_enumerating() {
        let m = Machine::new()
            .consult("father(john).\nfather(jacob).\nparent(X) :- father(X).\n")
            .unwrap();
        assert!(m.can_prove(Term::compound("parent", vec![Term::atom("jacob")])).unwrap());
        assert!(!m.can_prove(Term::compound("parent", vec![Term::atom("sue")])).unwrap());
    }

    #[test]
    fn cut_commits_to_the_first_matching_clause() {
        let m = Machine::new().consult("p(1).\np(2).\np(3).\nq(X) :- p(X), !.\n").unwrap();
        let answers: Vec<_> = m.prove_all(Term::compound("q", vec![var("X")])).map(|r| r.unwrap()).collect();
        assert_eq!(answers.len(), 1);
        assert_eq!(names(&answers[0], "X"), Term::Integer(1));
    }

    #[test]
    fn disjunction_interleaves_both_sides_in_source_order() {
        let m = Machine::new().consult("p(1).\np(2).\n").unwrap();
        let x = var("X");
        let y = var("Y");
        let goal = Term::compound(";", vec![Term::compound("p", vec![x]), Term::compound("p", vec![y])]);
        let answers: Vec<_> = m.prove_all(goal).map(|r| r.unwrap()).collect();
        assert_eq!(answers.len(), 4);
        assert_eq!(names(&answers[0], "X"), Term::Integer(1));
        assert_eq!(names(&answers[1], "X"), Term::Integer(2));
        assert_eq!(names(&answers[2], "Y"), Term::Integer(1));
        assert_eq!(names(&answers[3], "Y"), Term::Integer(2));
    }

    #[test]
    fn findall_gathers_every_solution_into_one_list() {
        let m = Machine::new().consult("p(1).\np(2).\np(3).\n").unwrap();
        let x = var("X");
        let bag = var("Bag");
        let goal = Term::compound(
            "findall",
            vec![x.clone(), Term::compound("p", vec![x]), bag.clone()],
        );
        let answers: Vec<_> = m.prove_all(goal).map(|r| r.unwrap()).collect();
        assert_eq!(answers.len(), 1);
        assert_eq!(
            names(&answers[0], "Bag"),
            Term::list(vec![Term::Integer(1), Term::Integer(2), Term::Integer(3)])
        );
    }

    #[test]
    fn if_then_else_discards_the_else_branch_once_committed_even_if_then_fails() {
        let m = Machine::new().consult("p(1).\np(2).\n").unwrap();
        let x = var("X");
        let goal = Term::compound(
            ";",
            vec![
                Term::compound("->", vec![Term::compound("p", vec![Term::Integer(1)]), Term::atom("fail")]),
                Term::compound("=", vec![x, Term::atom("else_ran")]),
            ],
        );
        let answers: Vec<_> = m.prove_all(goal).map(|r| r.unwrap()).collect();
        assert!(answers.is_empty(), "committing to Then must not leave Else as a fallback");
    }

    #[test]
    fn if_then_else_falls_back_to_else_only_when_cond_itself_fails() {
        let m = Machine::new().consult("p(1).\np(2).\n").unwrap();
        let x = var("X");
        let goal = Term::compound(
            ";",
            vec![
                Term::compound("->", vec![Term::compound("p", vec![Term::Integer(99)]), Term::atom("true")]),
                Term::compound("=", vec![x, Term::atom("else_ran")]),
            ],
        );
        let answers: Vec<_> = m.prove_all(goal).map(|r| r.unwrap()).collect();
        assert_eq!(answers.len(), 1);
        assert_eq!(names(&answers[0], "X"), Term::atom("else_ran"));
    }

    #[test]
    fn nested_unification_binds_both_sides() {
        let m = Machine::new().consult("t(X, Y) :- X = Y.\n").unwrap();
        let a = var("A");
        let b = var("B");
        let goal = Term::compound(
            "t",
            vec![
                Term::compound("foo", vec![a.clone(), b.clone()]),
                Term::compound("foo", vec![Term::Integer(1), Term::Integer(2)]),
            ],
        );
        let answers: Vec<_> = m.prove_all(goal).map(|r| r.unwrap()).collect();
        assert_eq!(answers.len(), 1);
        assert_eq!(names(&answers[0], "A"), Term::Integer(1));
        assert_eq!(names(&answers[0], "B"), Term::Integer(2));
    }
}
