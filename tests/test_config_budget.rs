#[cfg(test)]
mod tests {
    use sld_engine::{Config, Machine, MachineError, Term};

    #[test]
    fn unbounded_config_is_the_default() {
        let m = Machine::new();
        assert_eq!(m.config.max_steps, None);
        assert_eq!(m.config.max_answers, None);
    }

    #[test]
    fn a_step_budget_surfaces_as_an_error_instead_of_looping_forever() {
        // loop(X) :- loop(X) never terminates on its own; a step budget
        // must turn that into a reported error rather than hanging.
        let m = Machine::new()
            .consult("loop(X) :- loop(X).\n")
            .unwrap()
            .with_config(Config::unbounded().with_max_steps(50));
        let mut proof = m.prove_all(Term::compound("loop", vec![Term::Integer(1)]));
        let outcome = proof.find(|r| r.is_err());
        assert!(matches!(outcome, Some(Err(MachineError::StepBudgetExceeded))));
    }

    #[test]
    fn an_answer_budget_stops_enumeration_early_without_erroring() {
        let m = Machine::new()
            .consult("p(1).\np(2).\np(3).\n")
            .unwrap()
            .with_config(Config::unbounded().with_max_answers(2));
        let answers: Vec<_> = m.prove_all(Term::compound("p", vec![Term::fresh_named_var("X")])).collect();
        assert_eq!(answers.len(), 2);
        assert!(answers.iter().all(|a| a.is_ok()));
    }
}
