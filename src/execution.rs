//! This module runs a [`TuringMachine`] on one input string. An [`Execution`] owns the tape,
//! head, cache and trace of a single run and only reads the machine it borrows.

use crate::machine::TuringMachine;
use crate::types::{
    Cell, Direction, InstantaneousDescription, Outcome, Simulation, Step, Symbol, Transition,
    NO_TRANSITION_MARKER,
};

/// The live configuration of one simulation.
pub struct Execution<'m> {
    machine: &'m TuringMachine,
    state: String,
    tape: Vec<Cell>,
    head: usize,
    cache: Cell,
    step_count: usize,
    trace: Vec<InstantaneousDescription>,
    last_transition: Option<&'m Transition>,
    outcome: Option<Outcome>,
}

impl<'m> Execution<'m> {
    /// Prepares a run of `machine` on `input`.
    ///
    /// The tape holds the input between one leading and one trailing blank with the head on the
    /// first input symbol. An empty input gives a single blank cell with the head on it. The
    /// cache starts blank and the initial configuration is recorded as step 0.
    pub fn new(machine: &'m TuringMachine, input: &str) -> Self {
        let (tape, head) = if input.is_empty() {
            (vec![None], 0)
        } else {
            let mut tape = Vec::with_capacity(input.chars().count() + 2);
            tape.push(None);
            tape.extend(input.chars().map(Symbol::from_char));
            tape.push(None);
            (tape, 1)
        };

        let mut execution = Self {
            machine,
            state: machine.initial_state().to_string(),
            tape,
            head,
            cache: None,
            step_count: 0,
            trace: Vec::new(),
            last_transition: None,
            outcome: None,
        };
        execution.record(execution.state.clone(), 0);
        execution
    }

    /// Executes a single step.
    ///
    /// # Returns
    ///
    /// * `Step::Continue` if a transition fired and the final state was not reached.
    /// * `Step::Halt(Outcome::Accepted)` if the machine is (or just became) final.
    /// * `Step::Halt(Outcome::NoTransition)` if nothing applies to the current configuration.
    ///   The trace then ends with an ID whose state label carries [`NO_TRANSITION_MARKER`].
    pub fn step(&mut self) -> Step {
        if let Some(outcome) = self.outcome {
            return Step::Halt(outcome);
        }

        if self.is_accepting() {
            return self.halt(Outcome::Accepted);
        }

        let machine = self.machine;
        let Some(transition) =
            machine.find_transition(&self.state, &self.cache, &self.tape[self.head])
        else {
            tracing::debug!(state = %self.state, step = self.step_count, "no applicable transition");
            let label = format!("{}{}", self.state, NO_TRANSITION_MARKER);
            self.record(label, self.step_count + 1);
            return self.halt(Outcome::NoTransition);
        };

        self.last_transition = Some(transition);
        self.step_count += 1;

        let output = &transition.output;
        self.state.clone_from(&output.next_state);
        self.cache.clone_from(&output.cache);
        self.tape[self.head].clone_from(&output.write);

        match output.direction {
            Direction::Left => {
                if self.head == 0 {
                    // Extend tape to the left
                    self.tape.insert(0, None);
                } else {
                    self.head -= 1;
                }
            }
            Direction::Right => {
                self.head += 1;
                if self.head >= self.tape.len() {
                    self.tape.push(None);
                }
            }
            Direction::Stay => {}
        }

        tracing::trace!(
            step = self.step_count,
            state = %self.state,
            head = self.head,
            tape_len = self.tape.len(),
            "applied {}",
            transition
        );

        self.record(self.state.clone(), self.step_count);

        if self.is_accepting() {
            return self.halt(Outcome::Accepted);
        }

        Step::Continue
    }

    /// Runs until the machine halts or `max_steps` transitions have fired.
    ///
    /// A machine already in its final state is accepted even with a zero step bound.
    pub fn run(mut self, max_steps: usize) -> Simulation {
        let outcome = loop {
            if self.step_count >= max_steps && !self.is_accepting() && self.outcome.is_none() {
                break Outcome::StepLimit;
            }

            if let Step::Halt(outcome) = self.step() {
                break outcome;
            }
        };

        tracing::debug!(
            outcome = %outcome,
            steps = self.step_count,
            max_steps,
            "simulation finished"
        );

        Simulation {
            outcome,
            trace: self.trace,
            last_transition: self.last_transition.cloned(),
        }
    }

    pub fn state(&self) -> &str {
        &self.state
    }

    pub fn tape(&self) -> &[Cell] {
        &self.tape
    }

    pub fn head(&self) -> usize {
        self.head
    }

    pub fn cache(&self) -> &Cell {
        &self.cache
    }

    /// The number of transitions applied so far.
    pub fn step_count(&self) -> usize {
        self.step_count
    }

    pub fn trace(&self) -> &[InstantaneousDescription] {
        &self.trace
    }

    pub fn last_transition(&self) -> Option<&'m Transition> {
        self.last_transition
    }

    /// The terminal outcome, once reached.
    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    fn is_accepting(&self) -> bool {
        self.state == self.machine.final_state()
    }

    fn halt(&mut self, outcome: Outcome) -> Step {
        self.outcome = Some(outcome);
        Step::Halt(outcome)
    }

    fn record(&mut self, state: String, step: usize) {
        self.trace.push(InstantaneousDescription {
            state,
            tape: self.tape.clone(),
            head: self.head,
            cache: self.cache.clone(),
            step,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::machine::Definition;
    use crate::types::{Mode, TransitionKey, TransitionOutput};

    fn sym(s: &str) -> Cell {
        Symbol::normalize(Some(s))
    }

    fn rule(
        state: &str,
        read: Cell,
        next: &str,
        write: Cell,
        direction: Direction,
    ) -> Transition {
        Transition {
            params: TransitionKey::new(state, None, read),
            output: TransitionOutput {
                next_state: next.to_string(),
                cache: None,
                write,
                direction,
            },
        }
    }

    fn machine(transitions: Vec<Transition>) -> TuringMachine {
        TuringMachine::new(Definition {
            states: vec!["q0".into(), "q1".into(), "qf".into()],
            initial_state: "q0".into(),
            final_state: "qf".into(),
            input_alphabet: vec!["a".into(), "b".into()],
            tape_alphabet: vec![None, sym("a"), sym("b")],
            transitions,
            mode: Mode::Normal,
        })
    }

    #[test]
    fn test_initial_configuration() {
        let machine = machine(vec![]);
        let execution = Execution::new(&machine, "ab");

        assert_eq!(execution.state(), "q0");
        assert_eq!(execution.tape(), &[None, sym("a"), sym("b"), None]);
        assert_eq!(execution.head(), 1);
        assert_eq!(execution.cache(), &None);
        assert_eq!(execution.step_count(), 0);
        assert_eq!(execution.trace().len(), 1);
        assert_eq!(execution.trace()[0].step, 0);
    }

    #[test]
    fn test_empty_input_is_single_blank_cell() {
        let machine = machine(vec![]);
        let execution = Execution::new(&machine, "");

        assert_eq!(execution.tape(), &[None]);
        assert_eq!(execution.head(), 0);
    }

    #[test]
    fn test_step_writes_and_moves_right() {
        let machine = machine(vec![rule("q0", sym("a"), "q1", sym("b"), Direction::Right)]);
        let mut execution = Execution::new(&machine, "a");

        assert_eq!(execution.step(), Step::Continue);
        assert_eq!(execution.state(), "q1");
        assert_eq!(execution.tape(), &[None, sym("b"), None]);
        assert_eq!(execution.head(), 2);
        assert_eq!(execution.step_count(), 1);
        assert_eq!(
            execution.last_transition().map(|t| t.output.next_state.as_str()),
            Some("q1")
        );
    }

    #[test]
    fn test_moving_right_past_the_end_extends_tape() {
        let machine = machine(vec![rule("q0", None, "q1", sym("a"), Direction::Right)]);
        let mut execution = Execution::new(&machine, "");

        execution.step();
        assert_eq!(execution.tape(), &[sym("a"), None]);
        assert_eq!(execution.head(), 1);
    }

    #[test]
    fn test_moving_left_from_zero_extends_tape() {
        let machine = machine(vec![rule("q0", None, "q1", sym("a"), Direction::Left)]);
        let mut execution = Execution::new(&machine, "");

        execution.step();
        assert_eq!(execution.tape(), &[None, sym("a")]);
        assert_eq!(execution.head(), 0);
    }

    #[test]
    fn test_stay_keeps_head() {
        let machine = machine(vec![rule("q0", sym("a"), "q1", sym("b"), Direction::Stay)]);
        let mut execution = Execution::new(&machine, "a");

        execution.step();
        assert_eq!(execution.head(), 1);
        assert_eq!(execution.tape().len(), 3);
    }

    #[test]
    fn test_accepts_after_reaching_final_state() {
        let machine = machine(vec![rule("q0", sym("a"), "qf", sym("a"), Direction::Right)]);
        let mut execution = Execution::new(&machine, "a");

        assert_eq!(execution.step(), Step::Halt(Outcome::Accepted));
        assert_eq!(execution.outcome(), Some(Outcome::Accepted));
        // Halted executions stay halted.
        assert_eq!(execution.step(), Step::Halt(Outcome::Accepted));
        assert_eq!(execution.trace().len(), 2);
    }

    #[test]
    fn test_no_transition_appends_marked_id() {
        let machine = machine(vec![]);
        let simulation = Execution::new(&machine, "a").run(10);

        assert_eq!(simulation.outcome, Outcome::NoTransition);
        assert_eq!(simulation.trace.len(), 2);

        let last = simulation.last().unwrap();
        assert_eq!(last.state, format!("q0{}", NO_TRANSITION_MARKER));
        assert_eq!(last.step, 1);
        assert!(simulation.last_transition.is_none());
    }

    #[test]
    fn test_step_limit() {
        let machine = machine(vec![rule("q0", None, "q0", None, Direction::Right)]);
        let simulation = Execution::new(&machine, "").run(5);

        assert_eq!(simulation.outcome, Outcome::StepLimit);
        assert_eq!(simulation.trace.len(), 6);
        assert_eq!(simulation.steps(), 5);
        assert!(!simulation.accepted());
    }

    #[test]
    fn test_final_initial_state_accepts_with_zero_bound() {
        let mut machine_def = machine(vec![]).definition().clone();
        machine_def.final_state = "q0".into();
        let machine = TuringMachine::new(machine_def);

        let simulation = machine.simulate("ab", 0);
        assert!(simulation.accepted());
        assert_eq!(simulation.trace.len(), 1);
    }

    #[test]
    fn test_reaching_final_on_last_allowed_step_accepts() {
        let machine = machine(vec![
            rule("q0", sym("a"), "q1", sym("a"), Direction::Right),
            rule("q1", None, "qf", None, Direction::Stay),
        ]);

        let simulation = machine.simulate("a", 2);
        assert_eq!(simulation.outcome, Outcome::Accepted);
        assert_eq!(simulation.steps(), 2);

        let simulation = machine.simulate("a", 1);
        assert_eq!(simulation.outcome, Outcome::StepLimit);
        assert_eq!(simulation.steps(), 1);
    }
}
