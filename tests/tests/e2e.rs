use serde_json::json;
use shast::word::flatten;
use shast::{
    CommandName, ControlOperator, ParseError, ParserConfig, Redirect, Script, StatementKind,
    Word,
};
use shast_tests::{fixture_scripts, init_tracing, parse, random_grouping, random_pieces};
use std::io::Write;

fn json_of(script: &Script) -> serde_json::Value {
    serde_json::to_value(script).unwrap()
}

#[test]
fn and_or_then_sequence_is_one_chain() {
    let script = parse("a && b; c").unwrap();
    assert_eq!(script.statements.len(), 1);

    let cmd = |name: &str, control: &str, next: serde_json::Value| {
        json!({
            "type": "command",
            "command": { "type": "literal", "value": name },
            "args": [],
            "redirects": [],
            "env": {},
            "control": control,
            "next": next,
        })
    };
    assert_eq!(
        json_of(&script),
        json!([cmd("a", "&&", cmd("b", ";", cmd("c", ";", json!(null))))])
    );
}

#[test]
fn newline_separates_like_semicolon() {
    assert_eq!(parse("a\nb").unwrap(), parse("a; b").unwrap());
}

#[test]
fn trailing_background_operator() {
    let script = parse("make &").unwrap();
    assert_eq!(json_of(&script)[0]["control"], json!("&"));
    assert_eq!(json_of(&script)[0]["next"], json!(null));
}

#[test]
fn redirect_fd_defaults() {
    let script = parse("cmd > out < in").unwrap();
    assert_eq!(
        json_of(&script)[0]["redirects"],
        json!([
            { "type": "redirectFd", "fd": 1, "op": ">", "filename": { "type": "literal", "value": "out" } },
            { "type": "redirectFd", "fd": 0, "op": "<", "filename": { "type": "literal", "value": "in" } },
        ])
    );
}

#[test]
fn duplicate_and_move_fd_shapes() {
    let script = parse("cmd 2>&1 3>&4-").unwrap();
    assert_eq!(
        json_of(&script)[0]["redirects"],
        json!([
            { "type": "duplicateFd", "srcFd": 2, "op": ">&", "destFd": 1 },
            { "type": "moveFd", "fd": 3, "op": ">&", "dest": { "type": "literal", "value": "4-" } },
        ])
    );
}

#[test]
fn assignments_become_env() {
    let script = parse("VAR=val arg0 arg1").unwrap();
    let cmd = script.statements[0].as_command().unwrap();
    assert_eq!(cmd.env.len(), 1);
    assert_eq!(cmd.env["VAR"], Word::literal("val"));
    assert_eq!(cmd.command, Some(CommandName::Word(Word::literal("arg0"))));
    assert_eq!(cmd.args, vec![Word::literal("arg1")]);
    assert!(cmd.redirects.is_empty());
}

#[test]
fn repeated_assignment_keeps_last() {
    let script = parse("A=1 A=2 run").unwrap();
    let cmd = script.statements[0].as_command().unwrap();
    assert_eq!(cmd.env["A"], Word::literal("2"));
}

#[test]
fn pipeline_is_a_trailing_pipe_redirect() {
    let script = parse("ls 2>/dev/null | wc -l").unwrap();
    let cmd = script.statements[0].as_command().unwrap();
    assert_eq!(cmd.redirects.len(), 2);
    let Some(Redirect::Pipe { command }) = cmd.redirects.last() else {
        panic!("Expected pipe, got {:?}", cmd.redirects);
    };
    assert_eq!(command.command, Some(CommandName::Word(Word::literal("wc"))));
    assert_eq!(json_of(&script)[0]["redirects"][1]["type"], json!("pipe"));
}

#[test]
fn glob_infects_the_whole_word() {
    let script = parse("ls a*b").unwrap();
    let cmd = script.statements[0].as_command().unwrap();
    assert_eq!(cmd.args, vec![Word::glob("a*b")]);
}

#[test]
fn variable_keeps_its_boundaries() {
    let script = parse("echo a$x-b").unwrap();
    assert_eq!(
        json_of(&script)[0]["args"][0],
        json!({
            "type": "concatenation",
            "pieces": [
                { "type": "literal", "value": "a" },
                { "type": "variable", "name": "x" },
                { "type": "literal", "value": "-b" },
            ]
        })
    );
}

#[test]
fn empty_quotes_are_an_empty_literal() {
    let script = parse("echo \"\" ''").unwrap();
    let cmd = script.statements[0].as_command().unwrap();
    assert_eq!(cmd.args, vec![Word::literal(""), Word::literal("")]);
}

#[test]
fn back_quote_matches_independent_parse() {
    let script = parse("echo `echo hi`").unwrap();
    let cmd = script.statements[0].as_command().unwrap();
    assert_eq!(
        cmd.args,
        vec![Word::CommandSubstitution {
            commands: parse("echo hi").unwrap()
        }]
    );
}

#[test]
fn back_quote_and_paren_substitution_agree() {
    assert_eq!(
        parse("x=`date -u`").unwrap(),
        parse("x=$(date -u)").unwrap()
    );
}

#[test]
fn compound_statement_tags() {
    let script = parse(
        "(a); while a; do b; done; until a; do b; done; for i in 1 2; do b; done; if a; then b; fi; time b",
    )
    .unwrap();
    let tags: Vec<_> = script
        .iter_statements()
        .map(|statement| serde_json::to_value(&statement.kind).unwrap()["type"].clone())
        .collect();
    assert_eq!(
        tags,
        ["subshell", "whileLoop", "untilLoop", "forLoop", "ifElse", "time"].map(|tag| json!(tag))
    );
}

#[test]
fn if_without_elif_or_else_serialises_nulls() {
    let script = parse("if a; then b; fi").unwrap();
    let node = &json_of(&script)[0];
    assert_eq!(node["elifBlocks"], json!(null));
    assert_eq!(node["elseBody"], json!(null));
}

#[test]
fn for_loop_shape() {
    let script = parse("for x in a b; do echo $x; done").unwrap();
    let StatementKind::ForLoop(for_loop) = &script.statements[0].kind else {
        panic!("Expected for loop");
    };
    assert_eq!(for_loop.loop_variable, "x");
    assert_eq!(for_loop.subjects, vec![Word::literal("a"), Word::literal("b")]);
    assert_eq!(for_loop.body, parse("echo $x;").unwrap());
}

#[test]
fn builtin_bracket_name() {
    let script = parse("[[ -z $x ]]").unwrap();
    assert_eq!(
        json_of(&script)[0]["command"],
        json!({ "type": "builtin", "name": "[[" })
    );
}

#[test]
fn flatten_is_associative_under_random_grouping() {
    for len in 1..12 {
        let pieces = random_pieces(len);
        let flat = flatten(pieces.clone());
        assert_eq!(flatten(random_grouping(&pieces)), flat, "pieces: {pieces:?}");
        assert_eq!(flatten(vec![flat.clone()]), flat);
    }
}

#[test]
fn nesting_limit_applies_to_every_construct() {
    let config = ParserConfig {
        max_nesting_depth: 3,
        ..ParserConfig::default()
    };
    let parse_limited = |input: &str| {
        init_tracing();
        shast::parse_with_config(input, &config)
    };

    assert!(parse_limited("(echo $(if a; then b; fi))").is_ok());
    for input in [
        "((((a))))",
        "echo $(echo $(echo $(echo $(x))))",
        "(echo `echo $(echo $(x))`)",
        "while a; do if b; then (c; (d)); fi; done",
    ] {
        assert_eq!(
            parse_limited(input),
            Err(ParseError::MaxNestingExceeded { limit: 3 }),
            "input: {input}"
        );
    }
}

#[test]
fn oversized_input_is_rejected_before_parsing() {
    let config = ParserConfig {
        max_input_bytes: 16,
        ..ParserConfig::default()
    };
    let input = "echo ".repeat(10);
    assert_eq!(
        shast::parse_with_config(&input, &config),
        Err(ParseError::InputTooLarge { size: 50, limit: 16 })
    );
}

#[test]
fn syntax_errors_report_an_offset() {
    for input in ["echo (", "if a; then b;", "a &&"] {
        match parse(input) {
            Err(ParseError::Syntax { offset, .. }) => assert!(offset <= input.len(), "input: {input}"),
            other => panic!("Expected syntax error for {input:?}, got {other:?}"),
        }
    }
    assert!(matches!(parse("fi"), Err(ParseError::Syntax { .. })));
}

#[test]
fn limits_from_config_file() {
    let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
    writeln!(file, "parser:\n  max_nesting_depth: 1").unwrap();
    let config = shast_config::load_from_file(file.path().to_str().unwrap()).unwrap();

    assert!(shast::parse_with_config("(a)", &config.parser).is_ok());
    assert_eq!(
        shast::parse_with_config("((a))", &config.parser),
        Err(ParseError::MaxNestingExceeded { limit: 1 })
    );
}

#[test]
fn fixtures_parse_and_round_trip() {
    let scripts = fixture_scripts().unwrap();
    assert!(!scripts.is_empty());

    for (name, text) in scripts {
        let script = parse(&text).unwrap_or_else(|e| panic!("{name}: {e}"));
        assert!(!script.is_empty(), "{name}: parsed to nothing");

        let json = script.to_json().unwrap();
        let back: Script = serde_json::from_str(&json).unwrap();
        assert_eq!(back, script, "{name}: JSON round trip changed the tree");
    }
}

#[test]
fn control_operators_in_fixture_chain() {
    let text = std::fs::read_to_string(shast_tests::fixtures_dir().join("pipelines.sh")).unwrap();
    let script = parse(&text).unwrap();
    let controls: Vec<_> = script
        .iter_statements()
        .map(|statement| statement.control)
        .collect();
    assert_eq!(
        controls,
        [
            ControlOperator::Sequence,
            ControlOperator::And,
            ControlOperator::Or,
            ControlOperator::Sequence,
            ControlOperator::And,
            ControlOperator::Sequence,
            ControlOperator::And,
            ControlOperator::Sequence,
        ]
    );
}

#[test]
fn long_and_or_list_parses_and_drops() {
    let input = format!("{}a", "a&&".repeat(100_000));
    let script = parse(&input).unwrap();
    assert_eq!(script.statements.len(), 1);
    assert_eq!(script.iter_statements().count(), 100_001);
    assert_eq!(
        script.iter_statements().last().map(|statement| statement.control),
        Some(ControlOperator::Sequence)
    );
}

#[test]
fn long_pipeline_parses_and_drops() {
    let input = format!("{}a", "a|".repeat(100_000));
    let script = parse(&input).unwrap();
    let head = script.statements[0].as_command().unwrap();
    let stages = std::iter::successors(Some(head), |cmd| cmd.piped_to()).count();
    assert_eq!(stages, 100_001);
}

#[test]
fn quoted_reserved_words_name_commands() {
    for (input, name) in [("\"if\" x", "if"), ("\\fi", "fi"), ("'done'", "done")] {
        let script = parse(input).unwrap();
        assert_eq!(
            script.statements[0].as_command().unwrap().command,
            Some(CommandName::Word(Word::literal(name))),
            "input: {input}"
        );
    }
    assert!(matches!(parse("if x"), Err(ParseError::Syntax { .. })));
}

#[test]
fn reserved_word_error_points_at_the_word() {
    assert!(matches!(
        parse("echo a; fi"),
        Err(ParseError::Syntax { offset: 8, .. })
    ));
}

#[test]
fn nesting_is_blamed_only_at_the_furthest_error() {
    let config = ParserConfig {
        max_nesting_depth: 0,
        ..ParserConfig::default()
    };
    assert!(shast::parse_with_config("if-x", &config).is_ok());
    assert!(matches!(
        shast::parse_with_config("if-x; )", &config),
        Err(ParseError::Syntax { offset: 6, .. })
    ));
    assert_eq!(
        shast::parse_with_config("if-x; (a)", &config),
        Err(ParseError::MaxNestingExceeded { limit: 0 })
    );
}

#[test]
fn unclosed_substitutions_are_rejected() {
    let input = format!("echo \"{}", "$(".repeat(20_000));
    assert!(matches!(parse(&input), Err(ParseError::Syntax { .. })));
    assert!(matches!(parse("echo $(a"), Err(ParseError::Syntax { .. })));
    assert!(matches!(parse("(a; (b)"), Err(ParseError::Syntax { .. })));
}
