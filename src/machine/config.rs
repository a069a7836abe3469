//! Bounding knobs for a host embedding the engine. Timeouts are left
//! entirely to callers; this gives a caller a structured way to express
//! "stop after N steps" or "give me at most N answers" instead of
//! hand-rolling a loop counter around `Proof`. Both default to
//! unbounded, so the default behavior does not change for a caller who
//! never touches `Config`.

#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Maximum number of `step` invocations a single `Proof` will make
    /// before reporting `MachineError::StepBudgetExceeded`.
    pub max_steps: Option<u64>,
    /// Maximum number of answers a single `Proof` will yield before
    /// stopping (not an error: the caller asked for a bound).
    pub max_answers: Option<u64>,
}

impl Config {
    pub fn unbounded() -> Self {
        Config::default()
    }

    pub fn with_max_steps(mut self, n: u64) -> Self {
        self.max_steps = Some(n);
        self
    }

    pub fn with_max_answers(mut self, n: u64) -> Self {
        self.max_answers = Some(n);
        self
    }
}
