use vibe_lang::{parse, Interpreter, InterpreterError, State, TRANSITIONS};

fn interpreter_at(state: State) -> Interpreter {
    Interpreter::from_source(&format!("set state = {state}\nset friction = 0.2"))
}

#[test]
fn can_transition_to_matches_the_table_for_every_pair() {
    for from in State::ALL {
        let interp = interpreter_at(from);
        for to in State::ALL {
            assert_eq!(
                interp.can_transition_to(to),
                TRANSITIONS.contains(&(from, to)),
                "{from} -> {to}"
            );
        }
    }
}

#[test]
fn cooling_to_running_succeeds_and_cooling_to_candidate_does_not() {
    let mut interp = interpreter_at(State::Cooling);
    assert!(!interp.transition_to(State::Candidate));
    assert_eq!(interp.state(), State::Cooling);

    assert!(interp.transition_to(State::Running));
    assert_eq!(interp.state(), State::Running);
    assert_eq!(interp.context().history().len(), 2);
}

#[test]
fn available_transitions_follow_current_state() {
    let mut interp = interpreter_at(State::Candidate);
    assert_eq!(interp.available_transitions(), vec![State::Running]);
    interp.transition_to(State::Running);
    assert_eq!(
        interp.available_transitions(),
        vec![State::Cooling, State::Error]
    );
}

#[test]
fn every_mutation_is_recorded_once_in_call_order() {
    let mut interp = interpreter_at(State::Candidate);
    interp.transition_to(State::Running);
    interp.set_friction(0.6);
    interp.transition_to(State::Done); // rejected
    interp.transition_to(State::Cooling);

    let history = interp.context().history();
    let states: Vec<_> = history.iter().map(|h| h.state).collect();
    let frictions: Vec<_> = history.iter().map(|h| h.friction).collect();
    assert_eq!(
        states,
        vec![State::Candidate, State::Running, State::Running, State::Cooling]
    );
    assert_eq!(frictions, vec![0.2, 0.2, 0.6, 0.6]);
    assert!(history.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
}

#[test]
fn reset_restores_initial_values_after_any_sequence() {
    let mut interp = interpreter_at(State::Running);
    interp.transition_to(State::Cooling);
    interp.transition_to(State::Done);
    interp.transition_to(State::Candidate);
    interp.increase_friction(0.5);
    interp.set_friction(5.0);

    interp.reset();

    assert_eq!(interp.state(), State::Running);
    assert_eq!(interp.friction(), 0.2);
    assert_eq!(interp.context().history().len(), 1);
    assert!(interp.last_rejection().is_none());
}

#[test]
fn increase_friction_never_exceeds_one() {
    let mut interp = interpreter_at(State::Candidate);
    for _ in 0..10 {
        assert!(interp.increase_friction(0.3));
        assert!(interp.friction() <= 1.0);
    }
    assert_eq!(interp.friction(), 1.0);
}

#[test]
fn non_finite_increase_is_rejected_without_recording() {
    let mut interp = interpreter_at(State::Candidate);
    for delta in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
        assert!(!interp.increase_friction(delta));
        assert_eq!(interp.friction(), 0.2);
        assert_eq!(interp.context().history().len(), 1);
        assert!(matches!(
            interp.last_rejection(),
            Some(InterpreterError::FrictionOutOfRange { .. })
        ));
    }
}

#[test]
fn set_friction_outside_range_is_a_no_op() {
    let mut interp = interpreter_at(State::Candidate);
    assert!(!interp.set_friction(1.01));
    assert_eq!(interp.friction(), 0.2);
    assert_eq!(interp.context().history().len(), 1);
    assert!(matches!(
        interp.last_rejection(),
        Some(InterpreterError::FrictionOutOfRange { .. })
    ));
}

#[test]
fn derived_helpers_are_pure() {
    let mut interp = Interpreter::new(parse("set friction = 0.25"));
    assert!(interp.should_show_friction());
    assert_eq!(interp.friction_opacity(), 0.75);
    assert_eq!(interp.state_color(), "hsl(var(--muted))");
    assert_eq!(interp.context().history().len(), 1);

    interp.set_friction(0.0);
    assert!(!interp.should_show_friction());
    assert_eq!(interp.friction_opacity(), 1.0);
}

#[test]
fn invalid_program_still_yields_a_usable_interpreter() {
    let interp = Interpreter::from_source("set state = NOPE\nif x");
    assert!(!interp.parsed().is_valid);
    assert_eq!(interp.state(), State::Candidate);
}
