//! End-to-end behaviour of the command engine

use std::time::{Duration, Instant};

use bim_cmd::{
    CommandExecutor, CommandRegistry, ErrorKind, Grammar, GrammarError, ParseError, Rule,
    TabAction, Terminal,
};
use bim_model::{Element, ElementId, ElementKind, RelationKind};
use bim_settings::{id, Settings};

fn executor() -> CommandExecutor {
    CommandExecutor::new(Settings::new()).unwrap()
}

fn wall(n: u32) -> ElementId {
    ElementId::new(ElementKind::Wall, n)
}

// ============================================================================
// Parsing and dispatch
// ============================================================================

#[test]
fn positional_and_flag_syntax_are_equivalent() {
    let exec = executor();
    let forms = [
        "wall 0,0 5,0",
        "wall --start 0,0 --end 5,0",
        "wall (0, 0) (5, 0)",
        "wall 0,0 --end 500cm,0",
        "WALL --end 5,0 --start 0,0",
    ];
    let parsed: Vec<_> = forms.iter().map(|f| exec.parse(f).unwrap()).collect();
    for (form, cmd) in forms.iter().zip(&parsed) {
        assert_eq!(cmd, &parsed[0], "{}", form);
    }
}

#[test]
fn duplicate_argument_is_a_parse_error() {
    let exec = executor();
    let err = exec.parse("wall 0,0 5,0 --start 1,1").unwrap_err();
    assert!(matches!(err, ParseError::DuplicateArgument { .. }), "{:?}", err);
}

#[test]
fn missing_argument_reports_usage_and_records_nothing() {
    let mut exec = executor();
    let result = exec.execute("wall");
    assert!(!result.success);
    assert_eq!(result.error, Some(ErrorKind::MissingArgument));
    assert!(result.message.contains("missing"), "{}", result.message);
    assert!(result.message.contains("wall <start> <end>"), "{}", result.message);
    assert_eq!(exec.undo_depth(), 0);
    assert!(exec.model().is_empty());
}

#[test]
fn parse_errors_name_what_was_expected() {
    let mut exec = executor();
    let result = exec.execute("wall 0,0 5,");
    assert_eq!(result.error, Some(ErrorKind::Parse));
    assert!(result.message.contains("end of input"), "{}", result.message);

    let result = exec.execute("wall 0,0 5parsec,0");
    assert_eq!(result.error, Some(ErrorKind::Parse));
    assert!(result.message.contains("parsec"), "{}", result.message);
}

#[test]
fn overflowing_numbers_are_parse_errors() {
    let mut exec = executor();
    let huge = "9".repeat(400);
    let result = exec.execute(&format!("wall 0,0 {},0", huge));
    assert_eq!(result.error, Some(ErrorKind::Parse));
    assert!(result.message.contains("invalid number"), "{}", result.message);

    // finite as metres, infinite once scaled
    let result = exec.execute(&format!("wall 0,0 {}km,0", "9".repeat(308)));
    assert_eq!(result.error, Some(ErrorKind::Parse));
    assert!(exec.model().is_empty());
    assert_eq!(exec.undo_depth(), 0);

    assert!(exec.execute("wall 0,0 5km,0").success);
}

#[test]
fn unresolved_variables_fail_before_dispatch() {
    let mut exec = executor();
    let result = exec.execute("door $last --offset 1");
    assert_eq!(result.error, Some(ErrorKind::ElementReference));
    assert!(result.message.contains("no element has been created yet"), "{}", result.message);
}

// ============================================================================
// Levels
// ============================================================================

#[test]
fn unknown_level_is_rejected_with_available_names() {
    let mut exec = executor();
    exec.execute("level \"Level 2\"");
    let result = exec.execute("wall 0,0 5,0 --level Roof");
    assert!(!result.success);
    assert_eq!(result.error, Some(ErrorKind::LevelResolution));
    assert!(result.message.contains("Roof"));
    assert!(result.message.contains("Level 1, Level 2"), "{}", result.message);
    assert!(exec.model().is_empty());
}

#[test]
fn explicit_level_is_case_insensitive() {
    let mut exec = executor();
    exec.execute("level Upper --elevation 3");
    assert!(exec.execute("column 1,1 --level UPPER").success);
    let column = exec.model().elements().next().unwrap();
    assert_eq!(exec.model().level(column.level()).unwrap().name, "Upper");
    assert_eq!(exec.resolve_level(None).unwrap().name, "Level 1");
}

// ============================================================================
// Atomicity and undo
// ============================================================================

#[test]
fn failed_commands_leave_no_trace() {
    let mut exec = executor();
    exec.execute("wall 0,0 5,0");
    let before = exec.model().clone();
    for line in [
        "door wall-1 --offset 4.9",
        "window wall-1 --offset 2 --height 9",
        "delete wall-7",
        "room 0,0 1,0",
        "wall 2,2 2,2",
    ] {
        let result = exec.execute(line);
        assert!(!result.success, "{} should fail", line);
        assert_eq!(exec.model(), &before, "{}", line);
    }
    assert_eq!(exec.undo_depth(), 1);
}

#[test]
fn read_only_commands_are_not_undoable() {
    let mut exec = executor();
    exec.execute("wall 0,0 5,0");
    for line in ["status", "list", "get wall-1", "help", "select wall-1", "set snap_tolerance 0.02"] {
        assert!(exec.execute(line).success, "{}", line);
    }
    assert_eq!(exec.undo_depth(), 1);
}

#[test]
fn new_operation_invalidates_redo() {
    let mut exec = executor();
    exec.execute("wall 0,0 5,0");
    exec.execute("wall 5,0 5,5");
    exec.execute("undo");
    assert_eq!(exec.redo_depth(), 1);
    exec.execute("column 1,1");
    assert_eq!(exec.redo_depth(), 0);
    assert_eq!(exec.redo().message, "Nothing to redo");
}

#[test]
fn undo_of_delete_restores_relationships() {
    let mut exec = executor();
    for line in [
        "wall 0,0 5,0",
        "wall 5,0 5,4",
        "room 0,0 5,0 5,4 0,4 --name Hall",
        "door wall-1 --offset 2",
        "window wall-1 --offset 4",
    ] {
        assert!(exec.execute(line).success, "{}", line);
    }
    let before = exec.model().clone();

    assert!(exec.execute("delete wall-1").success);
    for element in exec.model().elements() {
        assert!(!element.relationships().references(wall(1)), "{}", element.id());
    }
    assert_eq!(exec.model().len(), 2);

    assert!(exec.execute("undo").success);
    assert_eq!(exec.model(), &before);
    let Some(Element::Door(door)) = exec.model().get(ElementId::new(ElementKind::Door, 1)) else {
        panic!("door not restored");
    };
    assert_eq!(door.base.relationships.host(), Some(wall(1)));
    assert!(door
        .base
        .relationships
        .contains(RelationKind::LeadsTo, ElementId::new(ElementKind::Room, 1)));
}

#[test]
fn undo_limit_follows_setting() {
    let mut settings = Settings::new();
    settings.set_int(id::undo_limit, 2).unwrap();
    let mut exec = CommandExecutor::new(settings).unwrap();
    for x in 0..4 {
        exec.execute(&format!("column {},0", x));
    }
    assert_eq!(exec.undo_depth(), 2);
    exec.execute("undo");
    exec.execute("undo");
    assert_eq!(exec.execute("undo").message, "Nothing to undo");
    assert_eq!(exec.model().len(), 2);
}

// ============================================================================
// Completion
// ============================================================================

#[test]
fn unique_completion_appends_space() {
    let mut exec = executor();
    assert_eq!(exec.handle_tab("wa").as_deref(), Some("wall "));
    exec.reset_completion();
    assert_eq!(exec.handle_tab("wall 0,0 5,0 --thi").as_deref(), Some("wall 0,0 5,0 --thickness "));
    exec.reset_completion();
    assert_eq!(exec.handle_tab("xyz"), None);
}

#[test]
fn ambiguous_completion_cycles() {
    let mut exec = executor();
    exec.execute("wall 0,0 5,0");
    exec.execute("wall 5,0 5,5");

    let first = exec.handle_tab("get wa").unwrap();
    assert_eq!(first, "get wall-1");
    let second = exec.handle_tab(&first).unwrap();
    assert_eq!(second, "get wall-2");
    assert_eq!(exec.handle_tab(&second).as_deref(), Some("get wall-1"));
    assert_eq!(exec.show_all_matches(&second), ["wall-1", "wall-2"]);
}

#[test]
fn completion_offers_level_names_and_types() {
    let mut exec = executor();
    let all = exec.show_all_matches("wall 0,0 5,0 --level ");
    assert_eq!(all, ["\"Level 1\""]);
    let types = exec.completions("door wall-1 --type s").candidates;
    assert_eq!(types, ["single", "sliding"]);
    assert_eq!(exec.handle_tab("set undo_l").as_deref(), Some("set undo_limit "));
}

#[test]
fn completion_matches_level_names_without_quotes() {
    let mut exec = executor();
    assert!(exec.execute("level \"Level 2\"").success);
    assert_eq!(exec.show_all_matches("activate Le"), ["\"Level 1\"", "\"Level 2\""]);
    assert_eq!(
        exec.handle_tab("wall 0,0 5,0 --level le").as_deref(),
        Some("wall 0,0 5,0 --level \"Level 1\"")
    );
    exec.reset_completion();

    assert!(exec.execute("level 2F").success);
    assert_eq!(exec.handle_tab("activate 2").as_deref(), Some("activate 2F "));
    assert!(exec.execute("activate 2F").success);
}

#[test]
fn double_tab_lists_all_matches() {
    let mut exec = executor();
    let t0 = Instant::now();
    assert!(matches!(exec.press_tab("re", t0), TabAction::Completed(ref s) if s == "redo "));
    exec.reset_completion();

    let first = exec.press_tab("s", t0);
    let TabAction::Completed(text) = first else {
        panic!("expected a completion, got {:?}", first);
    };
    let action = exec.press_tab(&text, t0 + Duration::from_millis(100));
    assert_eq!(action, TabAction::ShowAll(vec!["stair".into(), "select".into(), "status".into(), "set".into()]));
}

// ============================================================================
// Grammar
// ============================================================================

#[test]
fn builtin_grammar_is_closed_and_displays_root_first() {
    let exec = executor();
    let grammar = exec.describe_grammar();
    assert!(grammar.starts_with("command ::= wall | door | window"), "{}", grammar);
    assert!(grammar.contains("point ::= \"(\" <length> \",\" <length> \")\" | <length> \",\" <length>"));
    assert!(Grammar::from_registry(&CommandRegistry::with_builtins()).validate().is_ok());
}

#[test]
fn grammar_validation_reports_missing_rules() {
    let mut grammar = Grammar::new("command");
    grammar.define(
        "command",
        Rule::Sequence(vec![Rule::literal("inspect"), Rule::non_terminal("target")]),
    );
    grammar.define("other", Rule::Terminal(Terminal::Number));
    match grammar.validate() {
        Err(GrammarError::UndefinedRules(missing)) => {
            assert_eq!(missing, [("command".to_string(), "target".to_string())]);
        }
        other => panic!("expected undefined rules, got {:?}", other),
    }
}
