//! Declarative command grammar
//!
//! The grammar is a set of named [`Rule`]s built once from the command
//! registry. The parser interprets it directly, `help` prints it, and the
//! completion engine reads the same parameter metadata it was built from.
//!
//! Every command contributes two rules:
//!
//! ```text
//! wall ::= "wall" {wall-option} [point [point]] {wall-option}
//! wall-option ::= "--start" point | "--end" point | ...
//! ```
//!
//! Positional parameters form a nested optional chain; every parameter also
//! has a `--name` clause. [`Rule::Bind`] marks where a matched value is
//! captured into a named argument.

use std::fmt::Write;

use ahash::AHashMap;

use crate::args::{ParamKind, ParamSpec};
use crate::command::CommandRegistry;
use crate::error::GrammarError;

/// Name of the root rule
pub const ROOT_RULE: &str = "command";

/// Token classes matched by [`Rule::Terminal`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Terminal {
    /// Unitless number
    Number,
    /// Number with optional length unit, normalized to metres
    Length,
    /// Number with optional angle unit, normalized to degrees
    Angle,
    /// Bare word
    Word,
    /// Quoted string
    Str,
    /// Element id, `$last` or `$selected`
    Reference,
}

impl Terminal {
    /// Label used in display form and error messages
    pub fn label(&self) -> &'static str {
        match self {
            Terminal::Number => "<number>",
            Terminal::Length => "<length>",
            Terminal::Angle => "<angle>",
            Terminal::Word => "<word>",
            Terminal::Str => "<string>",
            Terminal::Reference => "<element>",
        }
    }
}

/// How the atoms matched inside a [`Rule::Bind`] become an argument value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Number,
    Point,
    Points,
    Text,
    Element,
}

/// A grammar rule
#[derive(Debug, Clone, PartialEq)]
pub enum Rule {
    Terminal(Terminal),
    /// Reference to another named rule
    NonTerminal(String),
    /// Exact token text, compared case-insensitively
    Literal(String),
    /// Ordered choice
    Alternation(Vec<Rule>),
    Sequence(Vec<Rule>),
    Optional(Box<Rule>),
    /// Greedy repetition
    Repetition {
        rule: Box<Rule>,
        min: usize,
        max: Option<usize>,
    },
    /// Capture the value matched by `rule` into the argument `slot`
    Bind {
        slot: String,
        shape: Shape,
        rule: Box<Rule>,
    },
}

impl Rule {
    pub fn literal(text: impl Into<String>) -> Rule {
        Rule::Literal(text.into())
    }

    pub fn non_terminal(name: impl Into<String>) -> Rule {
        Rule::NonTerminal(name.into())
    }

    pub fn optional(rule: Rule) -> Rule {
        Rule::Optional(Box::new(rule))
    }

    /// Zero or more
    pub fn many(rule: Rule) -> Rule {
        Rule::Repetition {
            rule: Box::new(rule),
            min: 0,
            max: None,
        }
    }

    /// One or more
    pub fn many1(rule: Rule) -> Rule {
        Rule::Repetition {
            rule: Box::new(rule),
            min: 1,
            max: None,
        }
    }

    pub fn bind(slot: impl Into<String>, shape: Shape, rule: Rule) -> Rule {
        Rule::Bind {
            slot: slot.into(),
            shape,
            rule: Box::new(rule),
        }
    }

    /// Visit every non-terminal name referenced by this rule
    fn references<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Rule::NonTerminal(name) => out.push(name),
            Rule::Terminal(_) | Rule::Literal(_) => {}
            Rule::Alternation(rules) | Rule::Sequence(rules) => {
                for rule in rules {
                    rule.references(out);
                }
            }
            Rule::Optional(rule) | Rule::Repetition { rule, .. } | Rule::Bind { rule, .. } => {
                rule.references(out)
            }
        }
    }

    fn display(&self, out: &mut String, nested: bool) {
        match self {
            Rule::Terminal(t) => out.push_str(t.label()),
            Rule::NonTerminal(name) => out.push_str(name),
            Rule::Literal(text) => {
                let _ = write!(out, "\"{}\"", text);
            }
            Rule::Alternation(rules) => {
                if nested {
                    out.push('(');
                }
                for (i, rule) in rules.iter().enumerate() {
                    if i > 0 {
                        out.push_str(" | ");
                    }
                    rule.display(out, true);
                }
                if nested {
                    out.push(')');
                }
            }
            Rule::Sequence(rules) => {
                for (i, rule) in rules.iter().enumerate() {
                    if i > 0 {
                        out.push(' ');
                    }
                    rule.display(out, true);
                }
            }
            Rule::Optional(rule) => {
                out.push('[');
                rule.display(out, false);
                out.push(']');
            }
            Rule::Repetition { rule, min, max } => match (min, max) {
                (0, None) => {
                    out.push('{');
                    rule.display(out, false);
                    out.push('}');
                }
                (1, None) => {
                    rule.display(out, true);
                    out.push_str(" {");
                    rule.display(out, false);
                    out.push('}');
                }
                (min, Some(max)) => {
                    rule.display(out, true);
                    let _ = write!(out, "{{{},{}}}", min, max);
                }
                (min, None) => {
                    rule.display(out, true);
                    let _ = write!(out, "{{{},}}", min);
                }
            },
            Rule::Bind { rule, .. } => rule.display(out, nested),
        }
    }
}

/// Rule matching the value of a parameter of `kind`, with its capture shape
pub fn value_rule(kind: ParamKind) -> (Rule, Shape) {
    match kind {
        ParamKind::Length => (Rule::Terminal(Terminal::Length), Shape::Number),
        ParamKind::Angle => (Rule::Terminal(Terminal::Angle), Shape::Number),
        ParamKind::Count => (Rule::Terminal(Terminal::Number), Shape::Number),
        ParamKind::Point => (Rule::non_terminal("point"), Shape::Point),
        ParamKind::Points => (Rule::many1(Rule::non_terminal("point")), Shape::Points),
        ParamKind::Text | ParamKind::Level => (Rule::non_terminal("text"), Shape::Text),
        ParamKind::Element => (Rule::Terminal(Terminal::Reference), Shape::Element),
        ParamKind::Choice(items) => (
            Rule::Alternation(items.iter().map(|s| Rule::literal(*s)).collect()),
            Shape::Text,
        ),
        ParamKind::CommandName | ParamKind::Setting => {
            (Rule::Terminal(Terminal::Word), Shape::Text)
        }
    }
}

fn param_bind(param: &ParamSpec) -> Rule {
    let (rule, shape) = value_rule(param.kind);
    Rule::bind(param.name, shape, rule)
}

/// The command grammar: ordered named rules plus the command-word index
#[derive(Debug, Clone)]
pub struct Grammar {
    root: String,
    rules: Vec<(String, Rule)>,
    index: AHashMap<String, usize>,
    /// Lowercase command name or alias -> canonical command name
    commands: AHashMap<String, String>,
}

impl Grammar {
    /// Create an empty grammar with the given root rule name
    pub fn new(root: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            rules: Vec::new(),
            index: AHashMap::new(),
            commands: AHashMap::new(),
        }
    }

    /// Build the grammar for every command in `registry`
    pub fn from_registry(registry: &CommandRegistry) -> Self {
        let mut grammar = Grammar::new(ROOT_RULE);
        let names: Vec<&str> = registry.names().collect();

        grammar.define(
            ROOT_RULE,
            Rule::Alternation(names.iter().map(|n| Rule::non_terminal(*n)).collect()),
        );
        grammar.define(
            "point",
            Rule::Alternation(vec![
                Rule::Sequence(vec![
                    Rule::literal("("),
                    Rule::Terminal(Terminal::Length),
                    Rule::literal(","),
                    Rule::Terminal(Terminal::Length),
                    Rule::literal(")"),
                ]),
                Rule::Sequence(vec![
                    Rule::Terminal(Terminal::Length),
                    Rule::literal(","),
                    Rule::Terminal(Terminal::Length),
                ]),
            ]),
        );
        grammar.define(
            "text",
            Rule::Alternation(vec![
                Rule::Terminal(Terminal::Str),
                Rule::Terminal(Terminal::Word),
                Rule::Terminal(Terminal::Number),
            ]),
        );

        for name in names {
            let Some(cmd) = registry.get(name) else {
                continue;
            };
            let aliases = cmd.aliases();
            let head = if aliases.is_empty() {
                Rule::literal(name)
            } else {
                Rule::Alternation(
                    std::iter::once(name)
                        .chain(aliases.iter().copied())
                        .map(Rule::literal)
                        .collect(),
                )
            };

            let params = cmd.params();
            let option_name = format!("{}-option", name);
            let mut seq = vec![head];
            if !params.is_empty() {
                seq.push(Rule::many(Rule::non_terminal(&option_name)));
                if let Some(chain) = positional_chain(params) {
                    seq.push(Rule::optional(chain));
                    seq.push(Rule::many(Rule::non_terminal(&option_name)));
                }
            }
            let rule = if seq.len() == 1 {
                seq.remove(0)
            } else {
                Rule::Sequence(seq)
            };
            grammar.define(name, rule);

            if !params.is_empty() {
                let clauses = params
                    .iter()
                    .map(|p| Rule::Sequence(vec![Rule::literal(format!("--{}", p.name)), param_bind(p)]))
                    .collect();
                grammar.define(option_name, Rule::Alternation(clauses));
            }

            grammar.add_command(name, name);
            for alias in aliases {
                grammar.add_command(alias, name);
            }
        }

        grammar
    }

    /// Define or replace a rule; new rules keep declaration order
    pub fn define(&mut self, name: impl Into<String>, rule: Rule) {
        let name = name.into();
        match self.index.get(&name) {
            Some(&i) => self.rules[i].1 = rule,
            None => {
                self.index.insert(name.clone(), self.rules.len());
                self.rules.push((name, rule));
            }
        }
    }

    /// Map a command word (name or alias) to the rule of command `name`
    pub fn add_command(&mut self, word: &str, name: &str) {
        self.commands
            .insert(word.to_ascii_lowercase(), name.to_string());
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn rule(&self, name: &str) -> Option<&Rule> {
        self.index.get(name).map(|&i| &self.rules[i].1)
    }

    /// Rules in declaration order
    pub fn rules(&self) -> impl Iterator<Item = (&str, &Rule)> {
        self.rules.iter().map(|(name, rule)| (name.as_str(), rule))
    }

    /// Canonical command name for a command word, case-insensitive
    pub fn command_for(&self, word: &str) -> Option<&str> {
        self.commands
            .get(&word.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Check that the root exists and every referenced rule is defined
    pub fn validate(&self) -> Result<(), GrammarError> {
        if !self.index.contains_key(&self.root) {
            return Err(GrammarError::MissingRoot(self.root.clone()));
        }
        let mut missing = Vec::new();
        for (name, rule) in &self.rules {
            let mut refs = Vec::new();
            rule.references(&mut refs);
            for r in refs {
                if !self.index.contains_key(r)
                    && !missing.iter().any(|(n, m): &(String, String)| n == name && m == r)
                {
                    missing.push((name.clone(), r.to_string()));
                }
            }
        }
        if missing.is_empty() {
            Ok(())
        } else {
            Err(GrammarError::UndefinedRules(missing))
        }
    }

    /// Render the grammar one rule per line, root first
    pub fn to_display_form(&self) -> String {
        let mut out = String::new();
        let root = self.rules.iter().filter(|(name, _)| *name == self.root);
        let rest = self.rules.iter().filter(|(name, _)| *name != self.root);
        for (name, rule) in root.chain(rest) {
            let _ = write!(out, "{} ::= ", name);
            rule.display(&mut out, false);
            out.push('\n');
        }
        out
    }

    /// Display form of a single rule
    pub fn display_rule(&self, name: &str) -> Option<String> {
        self.rule(name).map(|rule| {
            let mut out = format!("{} ::= ", name);
            rule.display(&mut out, false);
            out
        })
    }
}

/// `[a [b [c]]]` without the outer optional
fn positional_chain(params: &[ParamSpec]) -> Option<Rule> {
    params
        .iter()
        .filter(|p| p.positional)
        .rev()
        .fold(None, |tail, param| {
            let mut seq = vec![param_bind(param)];
            if let Some(tail) = tail {
                seq.push(Rule::optional(tail));
            }
            Some(if seq.len() == 1 {
                seq.remove(0)
            } else {
                Rule::Sequence(seq)
            })
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_grammar_is_valid() {
        let grammar = Grammar::from_registry(&CommandRegistry::with_builtins());
        assert!(grammar.validate().is_ok());
        assert_eq!(grammar.command_for("LS"), Some("list"));
        assert_eq!(grammar.command_for("wall"), Some("wall"));
        assert_eq!(grammar.command_for("tower"), None);
    }

    #[test]
    fn test_missing_rule_reported() {
        let mut grammar = Grammar::new(ROOT_RULE);
        grammar.define(
            ROOT_RULE,
            Rule::Sequence(vec![Rule::literal("wall"), Rule::non_terminal("point")]),
        );
        assert_eq!(
            grammar.validate(),
            Err(GrammarError::UndefinedRules(vec![(
                ROOT_RULE.to_string(),
                "point".to_string()
            )]))
        );

        let empty = Grammar::new(ROOT_RULE);
        assert_eq!(
            empty.validate(),
            Err(GrammarError::MissingRoot(ROOT_RULE.to_string()))
        );
    }

    #[test]
    fn test_display_form_root_first() {
        let mut grammar = Grammar::new(ROOT_RULE);
        grammar.define("point", Rule::Terminal(Terminal::Length));
        grammar.define(ROOT_RULE, Rule::non_terminal("point"));
        let text = grammar.to_display_form();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, ["command ::= point", "point ::= <length>"]);
    }

    #[test]
    fn test_point_rule_has_both_forms() {
        let grammar = Grammar::from_registry(&CommandRegistry::with_builtins());
        assert_eq!(
            grammar.display_rule("point").unwrap(),
            "point ::= \"(\" <length> \",\" <length> \")\" | <length> \",\" <length>"
        );
    }

    #[test]
    fn test_wall_rule_shape() {
        let grammar = Grammar::from_registry(&CommandRegistry::with_builtins());
        assert_eq!(
            grammar.display_rule("wall").unwrap(),
            "wall ::= \"wall\" {wall-option} [point [point]] {wall-option}"
        );
        let option = grammar.display_rule("wall-option").unwrap();
        assert!(option.contains("\"--start\" point"));
        assert!(option.contains("\"--type\" (\"basic\" | \"structural\" | \"curtain\" | \"retaining\")"));
    }

    #[test]
    fn test_repetition_display() {
        let mut out = String::new();
        Rule::many1(Rule::non_terminal("point")).display(&mut out, false);
        assert_eq!(out, "point {point}");
    }
}
