//! Grammar-driven command parser
//!
//! Interprets [`Grammar`] rules over the token stream with PEG semantics:
//! ordered choice, greedy repetition, no backtracking into a repetition once
//! it has stopped. The furthest position at which a token was rejected is
//! tracked so failures can name everything that would have been accepted
//! there.

use std::collections::BTreeMap;

use bim_model::{ElementId, Point2};

use crate::args::{ArgValue, ParsedCommand};
use crate::error::ParseError;
use crate::grammar::{Grammar, Rule, Shape, Terminal};
use crate::lexer::{tokenize, Token, TokenKind};
use crate::units;

/// Session facts the parser needs to resolve contextual references
#[derive(Debug, Clone, PartialEq)]
pub struct ParseContext {
    /// Element created by the most recent command, for `$last`
    pub last_created: Option<ElementId>,
    /// Current selection, for `$selected`
    pub selected: Option<ElementId>,
    /// Unit assumed for lengths written without a suffix
    pub length_unit: String,
}

impl Default for ParseContext {
    fn default() -> Self {
        Self {
            last_created: None,
            selected: None,
            length_unit: "m".to_string(),
        }
    }
}

impl ParseContext {
    fn length_factor(&self) -> f64 {
        units::length_factor(&self.length_unit).unwrap_or(1.0)
    }

    fn resolve_variable(&self, name: &str) -> Result<ElementId, ParseError> {
        let unresolved = |reason: &str| ParseError::UnresolvedReference {
            variable: name.to_string(),
            reason: reason.to_string(),
        };
        match name {
            "last" => self
                .last_created
                .ok_or_else(|| unresolved("no element has been created yet")),
            "selected" => self
                .selected
                .ok_or_else(|| unresolved("no element is selected")),
            _ => Err(unresolved("unknown variable; use $last or $selected")),
        }
    }
}

/// Value matched by a rule before it is bound to a parameter
#[derive(Debug, Clone, PartialEq)]
enum Atom {
    Number { value: f64, lexeme: String },
    Text(String),
    Element(ElementId),
    Keyword(String),
    Bound { slot: String, value: ArgValue },
}

type Match = Option<(usize, Vec<Atom>)>;

struct Parser<'a> {
    grammar: &'a Grammar,
    ctx: &'a ParseContext,
    tokens: Vec<Token>,
    furthest: usize,
    expected: Vec<String>,
}

impl<'a> Parser<'a> {
    fn token(&self, pos: usize) -> &Token {
        // the stream always ends with Eof
        &self.tokens[pos.min(self.tokens.len() - 1)]
    }

    fn fail(&mut self, pos: usize, label: impl Into<String>) {
        if pos > self.furthest {
            self.furthest = pos;
            self.expected.clear();
        }
        if pos == self.furthest {
            let label = label.into();
            if !self.expected.contains(&label) {
                self.expected.push(label);
            }
        }
    }

    fn error(&self) -> ParseError {
        let token = self.token(self.furthest);
        ParseError::Expected {
            expected: self.expected.clone(),
            found: token.describe(),
            position: token.position,
        }
    }

    fn eval(&mut self, rule: &Rule, pos: usize) -> Result<Match, ParseError> {
        match rule {
            Rule::Terminal(t) => self.terminal(*t, pos),
            Rule::Literal(text) => {
                let token = self.token(pos);
                if !token.is_eof() && token.lexeme.eq_ignore_ascii_case(text) {
                    Ok(Some((pos + 1, vec![Atom::Keyword(text.clone())])))
                } else {
                    self.fail(pos, format!("\"{}\"", text));
                    Ok(None)
                }
            }
            Rule::NonTerminal(name) => {
                let grammar = self.grammar;
                let Some(inner) = grammar.rule(name) else {
                    self.fail(pos, format!("<{}>", name));
                    return Ok(None);
                };
                let saved = (self.furthest, self.expected.clone());
                let result = self.eval(inner, pos)?;
                if result.is_none() && self.furthest == pos {
                    // no progress inside: report the rule, not its first tokens
                    (self.furthest, self.expected) = saved;
                    self.fail(pos, format!("<{}>", name));
                }
                Ok(result)
            }
            Rule::Alternation(rules) => {
                for alt in rules {
                    if let Some(found) = self.eval(alt, pos)? {
                        return Ok(Some(found));
                    }
                }
                Ok(None)
            }
            Rule::Sequence(rules) => {
                let mut cur = pos;
                let mut atoms = Vec::new();
                for item in rules {
                    match self.eval(item, cur)? {
                        Some((next, mut found)) => {
                            cur = next;
                            atoms.append(&mut found);
                        }
                        None => return Ok(None),
                    }
                }
                Ok(Some((cur, atoms)))
            }
            Rule::Optional(inner) => Ok(Some(self.eval(inner, pos)?.unwrap_or((pos, Vec::new())))),
            Rule::Repetition { rule, min, max } => {
                let mut cur = pos;
                let mut atoms = Vec::new();
                let mut count = 0;
                while max.map_or(true, |max| count < max) {
                    match self.eval(rule, cur)? {
                        Some((next, mut found)) if next > cur => {
                            cur = next;
                            atoms.append(&mut found);
                            count += 1;
                        }
                        _ => break,
                    }
                }
                if count < *min {
                    return Ok(None);
                }
                Ok(Some((cur, atoms)))
            }
            Rule::Bind { slot, shape, rule } => {
                let Some((next, atoms)) = self.eval(rule, pos)? else {
                    return Ok(None);
                };
                let value = bind_value(*shape, atoms);
                Ok(Some((
                    next,
                    vec![Atom::Bound {
                        slot: slot.clone(),
                        value,
                    }],
                )))
            }
        }
    }

    fn terminal(&mut self, terminal: Terminal, pos: usize) -> Result<Match, ParseError> {
        let token = self.token(pos).clone();
        let atom = match (&token.kind, terminal) {
            (TokenKind::Number { value, unit }, Terminal::Length) => {
                let factor = match unit {
                    None => Some(self.ctx.length_factor()),
                    Some(u) => units::length_factor(u),
                };
                scaled(&token, *value, unit.as_deref(), factor)?
            }
            (TokenKind::Number { value, unit }, Terminal::Angle) => {
                let factor = match unit {
                    None => Some(1.0),
                    Some(u) => units::angle_factor(u),
                };
                scaled(&token, *value, unit.as_deref(), factor)?
            }
            // `2F` where a name is expected
            (TokenKind::Number { unit: Some(u), .. }, Terminal::Word) if !units::is_known_unit(u) => {
                Some(Atom::Text(token.lexeme.clone()))
            }
            (TokenKind::Number { value, unit: None }, Terminal::Number) => Some(Atom::Number {
                value: *value,
                lexeme: token.lexeme.clone(),
            }),
            (TokenKind::Word(w), Terminal::Word) => Some(Atom::Text(w.clone())),
            (TokenKind::Str(s), Terminal::Str) => Some(Atom::Text(s.clone())),
            (TokenKind::Variable(name), Terminal::Reference) => {
                Some(Atom::Element(self.ctx.resolve_variable(name)?))
            }
            (TokenKind::Word(w), Terminal::Reference) => {
                let lower = w.to_ascii_lowercase();
                if lower == "last" || lower == "selected" {
                    Some(Atom::Element(self.ctx.resolve_variable(&lower)?))
                } else {
                    w.parse::<ElementId>().ok().map(Atom::Element)
                }
            }
            _ => None,
        };

        match atom {
            Some(atom) => Ok(Some((pos + 1, vec![atom]))),
            None => {
                self.fail(pos, terminal.label());
                Ok(None)
            }
        }
    }
}

/// Number token scaled by the factor of its unit
///
/// An unknown suffix is an error in a numeric slot; a value that overflows
/// after scaling is rejected so that only finite numbers reach the model.
fn scaled(token: &Token, value: f64, unit: Option<&str>, factor: Option<f64>) -> Result<Option<Atom>, ParseError> {
    match factor {
        Some(f) => {
            let value = value * f;
            if !value.is_finite() {
                return Err(ParseError::InvalidNumber {
                    text: token.lexeme.clone(),
                    position: token.position,
                });
            }
            Ok(Some(Atom::Number {
                value,
                lexeme: token.lexeme.clone(),
            }))
        }
        None => match unit {
            Some(u) if !units::is_known_unit(u) => Err(ParseError::UnknownUnit {
                unit: u.to_string(),
                position: token.position,
            }),
            _ => Ok(None),
        },
    }
}

/// Convert the atoms matched inside a bind into its argument value
fn bind_value(shape: Shape, atoms: Vec<Atom>) -> ArgValue {
    let numbers: Vec<f64> = atoms
        .iter()
        .filter_map(|a| match a {
            Atom::Number { value, .. } => Some(*value),
            _ => None,
        })
        .collect();

    match shape {
        Shape::Number => ArgValue::Number(numbers.first().copied().unwrap_or_default()),
        Shape::Point => match numbers.as_slice() {
            [x, y, ..] => ArgValue::Point(Point2::new(*x, *y)),
            _ => ArgValue::Point(Point2::ORIGIN),
        },
        Shape::Points => ArgValue::Points(
            numbers
                .chunks_exact(2)
                .map(|xy| Point2::new(xy[0], xy[1]))
                .collect(),
        ),
        Shape::Text => {
            let text = atoms.into_iter().find_map(|a| match a {
                Atom::Text(s) | Atom::Keyword(s) => Some(s),
                Atom::Number { lexeme, .. } => Some(lexeme),
                _ => None,
            });
            ArgValue::Text(text.unwrap_or_default())
        }
        Shape::Element => match atoms.into_iter().find_map(|a| match a {
            Atom::Element(id) => Some(id),
            _ => None,
        }) {
            Some(id) => ArgValue::Element(id),
            None => ArgValue::Text(String::new()),
        },
    }
}

/// Parse one command line against `grammar`
///
/// Commands the grammar does not know are still parsed, with every
/// argument captured positionally, so the dispatcher can report them as
/// unknown with suggestions.
pub fn parse_command(
    input: &str,
    grammar: &Grammar,
    ctx: &ParseContext,
) -> Result<ParsedCommand, ParseError> {
    let tokens = tokenize(input)?;
    let first = &tokens[0];
    let word = match &first.kind {
        TokenKind::Eof => return Err(ParseError::EmptyCommand),
        TokenKind::Word(w) => w.clone(),
        _ => {
            return Err(ParseError::Expected {
                expected: vec!["<command>".to_string()],
                found: first.describe(),
                position: first.position,
            })
        }
    };

    let Some(name) = grammar.command_for(&word).map(str::to_string) else {
        log::debug!("'{}' is not in the grammar, capturing arguments", word);
        return Ok(capture_unknown(word, &tokens[1..], ctx));
    };

    let mut parser = Parser {
        grammar,
        ctx,
        tokens,
        furthest: 0,
        expected: Vec::new(),
    };
    let rule = Rule::NonTerminal(name.clone());
    let Some((end, atoms)) = parser.eval(&rule, 0)? else {
        return Err(parser.error());
    };
    if !parser.token(end).is_eof() {
        parser.fail(end, "end of input");
        return Err(parser.error());
    }

    let mut flags = BTreeMap::new();
    for atom in atoms {
        if let Atom::Bound { slot, value } = atom {
            if flags.insert(slot.clone(), value).is_some() {
                return Err(ParseError::DuplicateArgument(slot));
            }
        }
    }

    log::debug!("parsed '{}' with {} arguments", name, flags.len());
    Ok(ParsedCommand {
        name,
        positional: Vec::new(),
        flags,
    })
}

fn capture_unknown(name: String, tokens: &[Token], ctx: &ParseContext) -> ParsedCommand {
    let mut cmd = ParsedCommand::new(name);
    for token in tokens {
        let value = match &token.kind {
            TokenKind::Number { value, unit: None } => ArgValue::Number(*value * ctx.length_factor()),
            TokenKind::Word(w) | TokenKind::Str(w) => ArgValue::Text(w.clone()),
            TokenKind::Eof | TokenKind::Comma | TokenKind::LParen | TokenKind::RParen => continue,
            _ => ArgValue::Text(token.lexeme.clone()),
        };
        cmd.positional.push(value);
    }
    cmd
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::CommandRegistry;
    use bim_model::ElementKind;

    fn grammar() -> Grammar {
        Grammar::from_registry(&CommandRegistry::with_builtins())
    }

    fn parse(input: &str) -> Result<ParsedCommand, ParseError> {
        parse_command(input, &grammar(), &ParseContext::default())
    }

    #[test]
    fn test_positional_and_flag_forms_match() {
        let a = parse("wall --start 0,0 --end 5,0").unwrap();
        let b = parse("wall 0,0 5,0").unwrap();
        let c = parse("WALL (0, 0) --end (5,0)").unwrap();
        assert_eq!(a, b);
        assert_eq!(a, c);
        assert_eq!(a.point("end"), Some(Point2::new(5.0, 0.0)));
        assert!(a.positional.is_empty());
    }

    #[test]
    fn test_units_normalized() {
        let cmd = parse("wall 0,0 500cm,0 --height 2700mm --thickness 0.2").unwrap();
        assert_eq!(cmd.point("end"), Some(Point2::new(5.0, 0.0)));
        assert!((cmd.number("height").unwrap() - 2.7).abs() < 1e-9);

        let ctx = ParseContext {
            length_unit: "mm".to_string(),
            ..Default::default()
        };
        let cmd = parse_command("column 1000,2000", &grammar(), &ctx).unwrap();
        assert_eq!(cmd.point("position"), Some(Point2::new(1.0, 2.0)));
    }

    #[test]
    fn test_angle_units() {
        let cmd = parse("roof 0,0 4,0 4,4 --slope 0.5rad").unwrap();
        assert!((cmd.number("slope").unwrap() - 28.64788975654116).abs() < 1e-9);
        assert_eq!(cmd.points("boundary").unwrap().len(), 3);
        assert!(parse("roof 0,0 4,0 4,4 --slope 3m").is_err());
    }

    #[test]
    fn test_overflowing_values_rejected() {
        let huge = "9".repeat(308);
        assert!(matches!(
            parse(&format!("wall 0,0 {}km,0", huge)),
            Err(ParseError::InvalidNumber { position: 9, .. })
        ));
        assert!(matches!(
            parse(&format!("column 1,1 --height {}", huge)),
            Ok(_)
        ));
        assert!(matches!(
            parse(&format!("roof 0,0 4,0 4,4 --slope {}rad", huge)),
            Err(ParseError::InvalidNumber { .. })
        ));
    }

    #[test]
    fn test_unknown_unit_in_numeric_slot() {
        assert_eq!(
            parse("wall 5furlong,0 9,0"),
            Err(ParseError::UnknownUnit {
                unit: "furlong".into(),
                position: 5
            })
        );
        let cmd = parse("level 2F --elevation 3").unwrap();
        assert_eq!(cmd.text("name"), Some("2F"));
        let cmd = parse("wall 0,0 5,0 --level 2f").unwrap();
        assert_eq!(cmd.text("level"), Some("2f"));
    }

    #[test]
    fn test_flags_before_positionals() {
        let cmd = parse("roof --type flat 0,0 4,0 4,4 --overhang 0.3").unwrap();
        assert_eq!(cmd.text("type"), Some("flat"));
        assert_eq!(cmd.number("overhang"), Some(0.3));
    }

    #[test]
    fn test_element_references() {
        let last = ElementId::new(ElementKind::Wall, 4);
        let ctx = ParseContext {
            last_created: Some(last),
            ..Default::default()
        };
        let g = grammar();
        let cmd = parse_command("door $last --offset 1", &g, &ctx).unwrap();
        assert_eq!(cmd.element("host"), Some(last));
        let cmd = parse_command("get wall-2", &g, &ctx).unwrap();
        assert_eq!(cmd.element("ref"), Some(ElementId::new(ElementKind::Wall, 2)));

        let err = parse_command("delete $selected", &g, &ctx).unwrap_err();
        assert!(matches!(err, ParseError::UnresolvedReference { ref variable, .. } if variable == "selected"));
    }

    #[test]
    fn test_expected_set_reported() {
        match parse("wall 0,0 --end").unwrap_err() {
            ParseError::Expected {
                expected,
                found,
                position,
            } => {
                assert_eq!(expected, ["<point>"]);
                assert_eq!(found, "end of input");
                assert_eq!(position, 14);
            }
            other => panic!("unexpected error {other:?}"),
        }

        let err = parse("wall 0,0 5,0 --color red").unwrap_err();
        let text = err.to_string();
        assert!(text.contains("<wall-option>"), "{}", text);
        assert!(text.contains("'--color'"), "{}", text);
    }

    #[test]
    fn test_duplicate_argument() {
        assert_eq!(
            parse("wall 0,0 5,0 --start 1,1"),
            Err(ParseError::DuplicateArgument("start".to_string()))
        );
    }

    #[test]
    fn test_choice_and_text() {
        let cmd = parse("room 0,0 4,0 4,3 --name \"Living Room\" --type LIVING").unwrap();
        assert_eq!(cmd.text("name"), Some("Living Room"));
        assert_eq!(cmd.text("type"), Some("living"));
        let cmd = parse("set default_wall_height 2.8").unwrap();
        assert_eq!(cmd.text("value"), Some("2.8"));
    }

    #[test]
    fn test_alias_resolves_to_canonical_name() {
        let cmd = parse("ls walls").unwrap();
        assert_eq!(cmd.name, "list");
        assert_eq!(cmd.text("category"), Some("walls"));
    }

    #[test]
    fn test_unknown_command_captured() {
        let cmd = parse("tower 3 high").unwrap();
        assert_eq!(cmd.name, "tower");
        assert_eq!(
            cmd.positional,
            vec![ArgValue::Number(3.0), ArgValue::Text("high".to_string())]
        );
    }

    #[test]
    fn test_empty_and_bad_start() {
        assert_eq!(parse("   "), Err(ParseError::EmptyCommand));
        assert!(matches!(parse("5 wall"), Err(ParseError::Expected { .. })));
    }
}
