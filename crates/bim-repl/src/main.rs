//! Interactive BIM command prompt
//!
//! ## Usage
//!
//! ```bash
//! cargo run --bin bim
//!
//! # Override settings at startup
//! cargo run --bin bim -- --set length_unit=mm --set undo_limit=50
//! ```
//!
//! Type commands at the `bim> ` prompt, `help` for the list of commands,
//! `quit` or `exit` to leave. Tab completes command names, flags, element
//! ids, level names and enumeration values; Up/Down walk the line history.

use std::cell::RefCell;
use std::process;
use std::rc::Rc;

use bim_cmd::CommandExecutor;
use bim_settings::Settings;
use rustyline::completion::Completer;
use rustyline::config::{CompletionType, Config};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};

const PROMPT: &str = "bim> ";

/// Line editor helper backed by the engine's completion
struct ReplHelper {
    executor: Rc<RefCell<CommandExecutor>>,
}

impl Completer for ReplHelper {
    type Candidate = String;

    fn complete(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> rustyline::Result<(usize, Vec<String>)> {
        let completions = self.executor.borrow().completions(&line[..pos]);
        let mut candidates = completions.candidates;
        if let [only] = candidates.as_mut_slice() {
            only.push(' ');
        }
        Ok((completions.start, candidates))
    }
}

impl Hinter for ReplHelper {
    type Hint = String;
}

impl Highlighter for ReplHelper {}

impl Validator for ReplHelper {}

impl Helper for ReplHelper {}

/// Apply `--set name=value` arguments
fn parse_args(args: impl Iterator<Item = String>) -> Result<Settings, String> {
    let mut settings = Settings::new();
    let mut args = args;
    while let Some(arg) = args.next() {
        let assignment = match arg.as_str() {
            "--set" => args.next().ok_or("--set needs name=value")?,
            other => match other.strip_prefix("--set=") {
                Some(rest) => rest.to_string(),
                None => return Err(format!("unexpected argument '{}'", other)),
            },
        };
        let (name, value) = assignment
            .split_once('=')
            .ok_or_else(|| format!("expected name=value, got '{}'", assignment))?;
        settings
            .set_from_str(name.trim(), value.trim())
            .map_err(|e| e.to_string())?;
    }
    Ok(settings)
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let settings = match parse_args(std::env::args().skip(1)) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Usage: bim [--set name=value]...");
            process::exit(2);
        }
    };

    let executor = match CommandExecutor::new(settings) {
        Ok(executor) => Rc::new(RefCell::new(executor)),
        Err(e) => {
            log::error!("invalid command grammar: {}", e);
            process::exit(1);
        }
    };

    let config = Config::builder()
        .completion_type(CompletionType::Circular)
        .auto_add_history(false)
        .build();
    let mut rl: Editor<ReplHelper, DefaultHistory> = match Editor::with_config(config) {
        Ok(rl) => rl,
        Err(e) => {
            log::error!("failed to create line editor: {}", e);
            process::exit(1);
        }
    };
    rl.set_helper(Some(ReplHelper {
        executor: Rc::clone(&executor),
    }));

    println!();
    println!("=== BIM command prompt ===");
    println!();
    println!("  wall 0,0 5,0          - Draw a wall on the active level");
    println!("  door $last --offset 2 - Place a door in the last element");
    println!("  undo / redo           - Step through changes");
    println!("  help [command]        - List commands or describe one");
    println!("  quit / exit           - Leave");
    println!();

    loop {
        match rl.readline(PROMPT) {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                if line == "quit" || line == "exit" {
                    break;
                }
                let _ = rl.add_history_entry(line);

                let result = executor.borrow_mut().execute(line);
                if result.success {
                    if !result.message.is_empty() {
                        println!("{}", result.message);
                    }
                } else {
                    eprintln!("Error: {}", result.message);
                }
            }
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => {
                log::info!("EOF/interrupt received, exiting...");
                break;
            }
            Err(e) => {
                eprintln!("Error reading input: {}", e);
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bim_settings::id;

    fn args(list: &[&str]) -> impl Iterator<Item = String> {
        list.iter().map(|s| s.to_string()).collect::<Vec<_>>().into_iter()
    }

    #[test]
    fn test_parse_args() {
        let settings = parse_args(args(&["--set", "undo_limit=5", "--set=length_unit=mm"])).unwrap();
        assert_eq!(settings.get_int(id::undo_limit), 5);
        assert_eq!(settings.get_string(id::length_unit), "mm");

        assert!(parse_args(args(&["--set"])).is_err());
        assert!(parse_args(args(&["--set", "undo_limit"])).is_err());
        assert!(parse_args(args(&["--set", "nonsense=1"])).is_err());
        assert!(parse_args(args(&["file.bim"])).is_err());
    }
}
