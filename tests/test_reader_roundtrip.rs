#[cfg(test)]
mod tests {
    use sld_engine::reader::parse_program;
    use sld_engine::{Machine, Term};

    #[test]
    fn a_consulted_program_proves_the_same_goals_as_one_built_by_hand() {
        let source = "father(john).\nfather(jacob).\nparent(X) :- father(X).\n";
        let via_consult = Machine::new().consult(source).unwrap();

        let via_parse = parse_program(source).unwrap();
        assert_eq!(via_parse.len(), 3);

        let goal = Term::compound("parent", vec![Term::atom("jacob")]);
        assert!(via_consult.can_prove(goal).unwrap());
    }

    #[test]
    fn list_and_operator_syntax_parse_into_the_expected_term_shape() {
        let clauses = parse_program("member(X, [X|_]).\nmember(X, [_|T]) :- member(X, T).\n").unwrap();
        assert_eq!(clauses.len(), 2);
        if let Term::Compound(name, args) = &clauses[0] {
            assert_eq!(&**name, "member");
            assert!(matches!(&args[1], Term::Compound(f, _) if &**f == "."));
        } else {
            panic!("expected member/2's first clause to be a compound");
        }
    }

    #[test]
    fn directives_are_parsed_but_consult_does_not_assert_them() {
        let m = Machine::new().consult(":- initialization(main).\np(1).\n").unwrap();
        assert!(m.can_prove(Term::compound("p", vec![Term::Integer(1)])).unwrap());
        let goal = Term::compound("initialization", vec![Term::atom("main")]);
        assert!(!m.can_prove(goal).unwrap());
    }
}
