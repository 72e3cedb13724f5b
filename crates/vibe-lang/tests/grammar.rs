use vibe_lang::{
    parse, parse_with, validate, GrammarError, GrammarProfile, GrammarRule, State, TokenKind,
    TokenValue,
};

#[test]
fn running_with_half_friction_parses_cleanly() {
    let parsed = parse("set state = RUNNING\nset friction = 0.5");

    assert!(parsed.is_valid);
    assert_eq!(parsed.initial_state, State::Running);
    assert_eq!(parsed.initial_friction, 0.5);
    assert!(parsed.errors.is_empty());
    assert_eq!(parsed.tokens.len(), 2);
    assert_eq!(parsed.tokens[0].kind, TokenKind::SetState);
    assert_eq!(parsed.tokens[0].value, TokenValue::State(State::Running));
    assert_eq!(parsed.tokens[1].line, 2);
}

#[test]
fn invalid_state_is_reported_with_line() {
    let parsed = parse("set state = INVALID");

    assert!(!parsed.is_valid);
    assert_eq!(parsed.errors.len(), 1);
    assert!(parsed.errors[0].contains("Invalid state"));
    assert_eq!(
        parsed.errors[0],
        "Line 1: Invalid state \"INVALID\". Valid states: CANDIDATE, RUNNING, COOLING, DONE, ERROR"
    );
    assert_eq!(
        parsed.diagnostics[0],
        GrammarError::at(
            1,
            GrammarRule::InvalidState {
                value: "INVALID".to_string(),
                valid: State::names(),
            }
        )
    );
}

#[test]
fn keywords_are_case_insensitive() {
    let parsed = parse("SET STATE = cooling\nIncrease Friction By 0.1");
    assert!(parsed.is_valid);
    assert_eq!(parsed.initial_state, State::Cooling);
    assert_eq!(parsed.friction_increments, vec![0.1]);
}

#[test]
fn comments_and_blank_lines_are_ignored() {
    let source = "// header\n\n# another\n   \nset state = DONE\n";
    let parsed = parse(source);
    assert!(parsed.is_valid);
    assert_eq!(parsed.tokens.len(), 1);
    assert_eq!(parsed.tokens[0].line, 5);
}

#[test]
fn missing_declarations_produce_warnings_not_errors() {
    let result = validate("increase friction by 0.3");
    assert!(result.valid);
    assert_eq!(
        result.warnings,
        vec![
            "No state declaration found. Defaulting to CANDIDATE.".to_string(),
            "No friction declaration found. Defaulting to 0.".to_string(),
        ]
    );

    let parsed = parse("");
    assert_eq!(parsed.initial_state, State::Candidate);
    assert_eq!(parsed.initial_friction, 0.0);
}

#[test]
fn friction_out_of_range_is_an_error() {
    let parsed = parse("set friction = 1.2\nincrease friction by 7");
    assert_eq!(
        parsed.errors,
        vec![
            "Line 1: Friction must be a number between 0 and 1".to_string(),
            "Line 2: Friction increment must be a number between 0 and 1".to_string(),
        ]
    );
}

#[test]
fn control_flow_is_rejected_by_name() {
    let cases = [
        ("if ready", "if statement"),
        ("else", "else statement"),
        ("for each", "for loop"),
        ("while true", "while loop"),
        ("function go", "function declaration"),
        ("return", "return statement"),
        ("cell counter", "cell keyword"),
        ("trigger boom", "trigger keyword"),
        ("when clicked", "when keyword"),
        ("a == b", "comparison operator"),
        ("user.name", "property access"),
        ("friction * 2", "mathematical operation"),
    ];

    for (line, rule) in cases {
        let parsed = parse(line);
        assert!(!parsed.is_valid, "{line} should be rejected");
        assert!(
            parsed.errors.iter().any(|e| e.contains(rule)),
            "{line}: expected {rule}, got {:?}",
            parsed.errors
        );
    }
}

#[test]
fn unknown_line_is_unrecognized_command() {
    let parsed = parse("make it pop");
    assert_eq!(
        parsed.errors,
        vec!["Line 1: Unrecognized command \"make it pop\"".to_string()]
    );
}

#[test]
fn parsing_is_deterministic() {
    let sources = [
        "set state = RUNNING\nset friction = 0.5\nincrease friction by 0.1",
        "set state = DONE",
        "",
        "# only a comment",
    ];
    for source in sources {
        assert_eq!(parse(source), parse(source));
        assert_eq!(
            serde_json::to_string(&parse(source)).unwrap(),
            serde_json::to_string(&parse(source)).unwrap()
        );
    }
}

#[test]
fn parsed_program_serializes_with_camel_case_fields() {
    let json = serde_json::to_value(parse("set state = RUNNING")).unwrap();
    assert_eq!(json["initialState"], "RUNNING");
    assert_eq!(json["isValid"], true);
    assert_eq!(json["tokens"][0]["type"], "SET_STATE");
    assert!(json.get("diagnostics").is_none());
}

#[test]
fn event_block_profile_accepts_integer_friction() {
    let source = "\
set state = CANDIDATE
set friction = 0

on start {
  set state = RUNNING
  increase friction by 25
}

on finish {
  set state = DONE
}
";
    let parsed = parse_with(source, GrammarProfile::EventBlocks);
    assert!(parsed.is_valid, "{:?}", parsed.errors);
    assert_eq!(parsed.events, vec!["start".to_string(), "finish".to_string()]);
    assert_eq!(parsed.initial_state, State::Candidate);
    assert_eq!(parsed.friction_increments, vec![25.0]);
    let tagged: Vec<_> = parsed
        .tokens
        .iter()
        .filter(|t| t.event.as_deref() == Some("finish"))
        .collect();
    assert_eq!(tagged.len(), 1);
}

#[test]
fn event_block_syntax_is_unrecognized_in_fractional_profile() {
    let parsed = parse("on start {\n}");
    assert!(!parsed.is_valid);
    assert!(parsed.events.is_empty());
}
