//! Tab completion
//!
//! Candidates come from the same registry metadata the grammar is built
//! from, so completion never offers something the parser would reject.
//! The word under the cursor decides the candidate set:
//!
//! 1. first word: command names, in registration order
//! 2. word starting with `-`: the command's flags not used yet
//! 3. word after a flag: values for that flag's parameter
//! 4. anything else: values for the next positional parameter
//!
//! Values depend on the parameter kind: element ids, enumeration members,
//! level names, command names or setting names.

use std::time::{Duration, Instant};

use bim_model::Model;

use crate::args::{ParamKind, ParamSpec};
use crate::command::CommandRegistry;

/// Default window for a double Tab
pub const DEFAULT_DOUBLE_TAB: Duration = Duration::from_millis(400);

/// What completion reads
#[derive(Clone, Copy)]
pub struct CompletionContext<'a> {
    pub registry: &'a CommandRegistry,
    pub model: &'a Model,
}

/// Candidates for the word starting at byte offset `start`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Completions {
    pub start: usize,
    pub candidates: Vec<String>,
}

/// Result of a Tab press
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TabAction {
    /// Replace the input line with this text
    Completed(String),
    /// Rapid second press: list every candidate, input unchanged
    ShowAll(Vec<String>),
    /// Nothing matches; signal and leave the input alone
    NoMatch,
}

/// Transient cycling state
#[derive(Debug, Clone, Default)]
pub struct CompletionState {
    /// Candidates being cycled
    pub matches: Vec<String>,
    pub match_index: usize,
    /// Word the candidates were computed for
    pub prefix: String,
    /// Input before the word
    base: String,
    /// Text returned by the last Tab; cycling continues only on this input
    last_output: Option<String>,
    /// Time and input of the last Tab press
    last_request: Option<(Instant, String)>,
}

impl CompletionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a Tab on `input` continues the current cycle
    pub fn is_cycling(&self, input: &str) -> bool {
        self.matches.len() > 1 && self.last_output.as_deref() == Some(input)
    }

    fn clear_matches(&mut self) {
        self.matches.clear();
        self.match_index = 0;
        self.prefix.clear();
        self.base.clear();
        self.last_output = None;
    }
}

/// The completion engine
#[derive(Debug, Clone)]
pub struct Autocomplete {
    state: CompletionState,
    double_tab: Duration,
}

impl Default for Autocomplete {
    fn default() -> Self {
        Self::new(DEFAULT_DOUBLE_TAB)
    }
}

impl Autocomplete {
    pub fn new(double_tab: Duration) -> Self {
        Self {
            state: CompletionState::new(),
            double_tab,
        }
    }

    pub fn state(&self) -> &CompletionState {
        &self.state
    }

    pub fn set_double_tab(&mut self, window: Duration) {
        self.double_tab = window;
    }

    /// Forget cycling state; call on any edit that is not a Tab
    pub fn reset(&mut self) {
        self.state = CompletionState::new();
    }

    /// Complete `input`
    ///
    /// One match completes the word and appends a space. Several matches
    /// complete to the first and start a cycle: a Tab on the returned text
    /// moves to the next candidate, wrapping after the last. No match
    /// returns `None` and leaves the state reset.
    pub fn handle_tab(&mut self, input: &str, ctx: CompletionContext<'_>) -> Option<String> {
        if self.state.is_cycling(input) {
            let state = &mut self.state;
            state.match_index = (state.match_index + 1) % state.matches.len();
            let out = format!("{}{}", state.base, state.matches[state.match_index]);
            state.last_output = Some(out.clone());
            return Some(out);
        }

        self.state.clear_matches();
        let Completions { start, candidates } = completions(input, ctx);
        let base = &input[..start];
        match candidates.len() {
            0 => None,
            1 => Some(format!("{}{} ", base, candidates[0])),
            _ => {
                let out = format!("{}{}", base, candidates[0]);
                self.state.prefix = input[start..].to_string();
                self.state.base = base.to_string();
                self.state.matches = candidates;
                self.state.last_output = Some(out.clone());
                Some(out)
            }
        }
    }

    /// Every candidate for `input`, without changing any state
    ///
    /// While cycling this is the full list for the original prefix.
    pub fn show_all_matches(&self, input: &str, ctx: CompletionContext<'_>) -> Vec<String> {
        if self.state.is_cycling(input) {
            return self.state.matches.clone();
        }
        completions(input, ctx).candidates
    }

    /// Tab press at `now`
    ///
    /// A second press within the double-Tab window, on the input the first
    /// press saw or produced, lists all matches instead of completing.
    pub fn press_tab(&mut self, input: &str, now: Instant, ctx: CompletionContext<'_>) -> TabAction {
        let rapid = match &self.state.last_request {
            Some((at, previous)) => {
                now.saturating_duration_since(*at) <= self.double_tab
                    && (previous == input || self.state.last_output.as_deref() == Some(input))
            }
            None => false,
        };

        if rapid {
            let all = self.show_all_matches(input, ctx);
            self.state.last_request = None;
            if !all.is_empty() {
                log::debug!("double tab: {} matches", all.len());
                return TabAction::ShowAll(all);
            }
        }

        self.state.last_request = Some((now, input.to_string()));
        match self.handle_tab(input, ctx) {
            Some(text) => TabAction::Completed(text),
            None => TabAction::NoMatch,
        }
    }
}

/// Candidates for the last word of `input`
pub fn completions(input: &str, ctx: CompletionContext<'_>) -> Completions {
    let start = input
        .char_indices()
        .rev()
        .find(|(_, c)| c.is_whitespace())
        .map(|(i, c)| i + c.len_utf8())
        .unwrap_or(0);
    let word = &input[start..];
    let words: Vec<&str> = input[..start].split_whitespace().collect();

    let candidates = match words.first() {
        None => ctx.registry.names().map(str::to_string).collect(),
        Some(name) => match ctx.registry.get(name) {
            Some(cmd) => argument_candidates(cmd.params(), &words[1..], word, ctx),
            None => Vec::new(),
        },
    };

    Completions {
        start,
        candidates: filter_prefix(candidates, word),
    }
}

fn argument_candidates(
    params: &[ParamSpec],
    previous: &[&str],
    word: &str,
    ctx: CompletionContext<'_>,
) -> Vec<String> {
    if word.starts_with('-') {
        return params
            .iter()
            .map(|p| format!("--{}", p.name))
            .filter(|flag| !previous.iter().any(|w| w.eq_ignore_ascii_case(flag)))
            .collect();
    }

    if let Some(flag) = previous.last().and_then(|w| w.strip_prefix("--")) {
        return params
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(flag))
            .map(|p| value_candidates(p.kind, word, ctx))
            .unwrap_or_default();
    }

    // count positional values already given, skipping flags and their values
    let mut index = 0;
    let mut after_flag = false;
    for w in previous {
        if w.starts_with("--") {
            after_flag = true;
        } else if after_flag {
            after_flag = false;
        } else {
            index += 1;
        }
    }
    params
        .iter()
        .filter(|p| p.positional)
        .nth(index)
        .map(|p| value_candidates(p.kind, word, ctx))
        .unwrap_or_default()
}

fn value_candidates(kind: ParamKind, word: &str, ctx: CompletionContext<'_>) -> Vec<String> {
    match kind {
        ParamKind::Element if word.starts_with('$') => {
            vec!["$last".to_string(), "$selected".to_string()]
        }
        ParamKind::Element => ctx.model.element_ids().map(|id| id.to_string()).collect(),
        ParamKind::Choice(items) => items.iter().map(|s| s.to_string()).collect(),
        ParamKind::Level => ctx
            .model
            .level_names()
            .into_iter()
            .map(|name| {
                if name.contains(char::is_whitespace) {
                    format!("\"{}\"", name)
                } else {
                    name.to_string()
                }
            })
            .collect(),
        ParamKind::CommandName => ctx.registry.names().map(str::to_string).collect(),
        ParamKind::Setting => bim_settings::setting_names()
            .into_iter()
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

/// Case-insensitive prefix filter; quoted candidates also match on their
/// unquoted text
fn filter_prefix(candidates: Vec<String>, word: &str) -> Vec<String> {
    let prefix = word.to_lowercase();
    let mut out: Vec<String> = Vec::with_capacity(candidates.len());
    for c in candidates {
        let lower = c.to_lowercase();
        let matches = lower.starts_with(&prefix)
            || lower.strip_prefix('"').is_some_and(|bare| bare.starts_with(&prefix));
        if matches && !out.contains(&c) {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::ParsedCommand;
    use crate::command::{Command, CommandContext, Outcome};
    use crate::error::CmdResult;

    struct Named(&'static str);

    impl Command for Named {
        fn name(&self) -> &str {
            self.0
        }

        fn description(&self) -> &str {
            "test"
        }

        fn execute(&self, _ctx: &mut CommandContext<'_>, _args: &ParsedCommand) -> CmdResult<Outcome> {
            Ok(Outcome::message(self.0))
        }
    }

    fn clash_registry() -> CommandRegistry {
        let mut registry = CommandRegistry::new();
        for name in ["clear", "clash", "clash-between", "clearance"] {
            registry.register(Named(name));
        }
        registry
    }

    #[test]
    fn test_cycling_wraps() {
        let registry = clash_registry();
        let model = Model::new();
        let ctx = CompletionContext {
            registry: &registry,
            model: &model,
        };
        let mut ac = Autocomplete::default();

        let mut input = "cl".to_string();
        let mut seen = Vec::new();
        for _ in 0..5 {
            input = ac.handle_tab(&input, ctx).unwrap();
            seen.push(input.clone());
        }
        assert_eq!(seen, ["clear", "clash", "clash-between", "clearance", "clear"]);
        assert_eq!(ac.state().prefix, "cl");
    }

    #[test]
    fn test_edit_resets_cycle() {
        let registry = clash_registry();
        let model = Model::new();
        let ctx = CompletionContext {
            registry: &registry,
            model: &model,
        };
        let mut ac = Autocomplete::default();
        assert_eq!(ac.handle_tab("cl", ctx).as_deref(), Some("clear"));
        // the user typed something else: a fresh completion on the new prefix
        assert_eq!(ac.handle_tab("clas", ctx).as_deref(), Some("clash"));
        assert_eq!(ac.handle_tab("clash", ctx).as_deref(), Some("clash-between"));
        ac.reset();
        assert!(!ac.state().is_cycling("clash-between"));
    }

    #[test]
    fn test_unique_match_appends_space() {
        let registry = CommandRegistry::with_builtins();
        let model = Model::new();
        let ctx = CompletionContext {
            registry: &registry,
            model: &model,
        };
        let mut ac = Autocomplete::default();
        assert_eq!(ac.handle_tab("wa", ctx).as_deref(), Some("wall "));
        assert_eq!(ac.handle_tab("zz", ctx), None);
    }

    #[test]
    fn test_flag_and_choice_candidates() {
        let registry = CommandRegistry::with_builtins();
        let model = Model::new();
        let ctx = CompletionContext {
            registry: &registry,
            model: &model,
        };
        let mut ac = Autocomplete::default();
        assert_eq!(
            ac.handle_tab("wall 0,0 5,0 --ty", ctx).as_deref(),
            Some("wall 0,0 5,0 --type ")
        );
        assert_eq!(
            ac.handle_tab("roof 0,0 4,0 4,4 --type g", ctx).as_deref(),
            Some("roof 0,0 4,0 4,4 --type gable ")
        );
        assert_eq!(
            ac.show_all_matches("window wall-1 --type ", ctx),
            ["fixed", "casement", "sliding", "awning", "double-hung"]
        );
        // used flags are not offered again
        let flags = ac.show_all_matches("wall --start 0,0 --", ctx);
        assert!(!flags.contains(&"--start".to_string()));
        assert!(flags.contains(&"--end".to_string()));
    }

    #[test]
    fn test_positional_candidates() {
        let registry = CommandRegistry::with_builtins();
        let model = Model::new();
        let ctx = CompletionContext {
            registry: &registry,
            model: &model,
        };
        let ac = Autocomplete::default();
        assert_eq!(ac.show_all_matches("help wi", ctx), ["window"]);
        assert_eq!(ac.show_all_matches("list ro", ctx), ["rooms", "roofs"]);
        assert_eq!(ac.show_all_matches("get $l", ctx), ["$last"]);
        assert!(ac.show_all_matches("set undo", ctx).contains(&"undo_limit".to_string()));
    }

    #[test]
    fn test_double_tab_shows_all() {
        let registry = clash_registry();
        let model = Model::new();
        let ctx = CompletionContext {
            registry: &registry,
            model: &model,
        };
        let mut ac = Autocomplete::default();
        let t0 = Instant::now();

        let first = ac.press_tab("clas", t0, ctx);
        assert_eq!(first, TabAction::Completed("clash".to_string()));
        let second = ac.press_tab("clash", t0 + Duration::from_millis(100), ctx);
        assert_eq!(
            second,
            TabAction::ShowAll(vec!["clash".to_string(), "clash-between".to_string()])
        );
        // a slow press cycles instead
        let third = ac.press_tab("clash", t0 + Duration::from_secs(5), ctx);
        assert_eq!(third, TabAction::Completed("clash-between".to_string()));
        assert_eq!(ac.press_tab("xyz", t0 + Duration::from_secs(9), ctx), TabAction::NoMatch);
    }
}
