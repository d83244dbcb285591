//! Property tests for undo/redo over random command sequences

use bim_cmd::CommandExecutor;
use bim_model::{Element, Level, Model};
use bim_settings::Settings;
use proptest::prelude::*;

/// Visible model content; id counters are excluded since they never go back
fn content(model: &Model) -> (Vec<Element>, Vec<Level>) {
    (model.elements().cloned().collect(), model.levels().to_vec())
}

fn command() -> impl Strategy<Value = String> {
    prop_oneof![
        (0i32..8, 0i32..8, 0i32..8, 0i32..8)
            .prop_map(|(x1, y1, x2, y2)| format!("wall {},{} {},{}", x1, y1, x2, y2)),
        (0i32..8, 0i32..8).prop_map(|(x, y)| format!("column {},{} --width 30cm", x, y)),
        (1i32..6, 1i32..6).prop_map(|(w, h)| format!("room 0,0 {w},0 {w},{h} 0,{h}")),
        (1u32..5).prop_map(|n| format!("delete wall-{}", n)),
        (1u32..5, 5u32..60).prop_map(|(n, o)| format!("door wall-{} --offset {}", n, o as f64 / 10.0)),
        (1u32..5, 5u32..60).prop_map(|(n, o)| format!("window wall-{} --offset {}", n, o as f64 / 10.0)),
        (-3i32..3, -3i32..3).prop_map(|(dx, dy)| format!("move wall-1 --by {},{}", dx, dy)),
        (1u32..4).prop_map(|n| format!("level L{} --elevation {}", n, n * 3)),
        Just("select wall-1".to_string()),
        Just("status".to_string()),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn undo_then_redo_restores_each_step(lines in prop::collection::vec(command(), 1..16)) {
        let mut exec = CommandExecutor::new(Settings::new()).unwrap();
        for line in &lines {
            let before = content(exec.model());
            let depth = exec.undo_depth();
            let result = exec.execute(line);

            if exec.undo_depth() == depth + 1 {
                prop_assert!(result.success);
                let after = exec.model().clone();
                prop_assert!(exec.undo().success);
                prop_assert_eq!(content(exec.model()), before);
                prop_assert!(exec.redo().success);
                prop_assert_eq!(exec.model(), &after);
            } else {
                // Failed and read-only commands leave no trace
                prop_assert_eq!(content(exec.model()), before);
            }
            prop_assert!(exec.model().check_integrity().is_ok());
        }
    }

    #[test]
    fn undo_all_returns_to_start(lines in prop::collection::vec(command(), 1..16)) {
        let mut exec = CommandExecutor::new(Settings::new()).unwrap();
        let start = content(exec.model());
        for line in &lines {
            exec.execute(line);
        }
        let end = content(exec.model());
        let depth = exec.undo_depth();

        for _ in 0..depth {
            prop_assert!(exec.execute("undo").success);
        }
        prop_assert_eq!(content(exec.model()), start);
        prop_assert_eq!(exec.execute("undo").message, "Nothing to undo");

        for _ in 0..depth {
            prop_assert!(exec.execute("redo").success);
        }
        prop_assert_eq!(content(exec.model()), end);
    }

    #[test]
    fn new_operation_clears_redo(lines in prop::collection::vec(command(), 1..10), x in 10i32..20) {
        let mut exec = CommandExecutor::new(Settings::new()).unwrap();
        for line in &lines {
            exec.execute(line);
        }
        exec.execute("undo");
        let result = exec.execute(&format!("column {},{}", x, x));
        prop_assert!(result.success, "{}", result.message);
        prop_assert_eq!(exec.redo_depth(), 0);
        prop_assert_eq!(exec.execute("redo").message, "Nothing to redo");
    }
}
