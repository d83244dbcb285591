//! Command argument types
//!
//! A [`ParsedCommand`] is the normalized output of the parser. Parameters
//! of known commands always land in `flags`, keyed by parameter name, no
//! matter whether they were written positionally or as `--name value`.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use bim_model::{ElementId, Point2};

/// A command argument value, already unit-normalized
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ArgValue {
    /// Number (lengths in metres, angles in degrees)
    Number(f64),
    /// Single plan point
    Point(Point2),
    /// Point list (boundaries)
    Points(Vec<Point2>),
    /// Word or quoted string
    Text(String),
    /// Resolved element reference
    Element(ElementId),
}

impl fmt::Display for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgValue::Number(n) => write!(f, "{}", bim_model::geometry::format_length(*n)),
            ArgValue::Point(p) => write!(f, "{}", p),
            ArgValue::Points(points) => {
                for (i, p) in points.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", p)?;
                }
                Ok(())
            }
            ArgValue::Text(s) if s.contains(char::is_whitespace) => write!(f, "\"{}\"", s),
            ArgValue::Text(s) => write!(f, "{}", s),
            ArgValue::Element(id) => write!(f, "{}", id),
        }
    }
}

impl ArgValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            ArgValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_point(&self) -> Option<Point2> {
        match self {
            ArgValue::Point(p) => Some(*p),
            _ => None,
        }
    }

    /// Point list; a single point is a one-element list
    pub fn as_points(&self) -> Option<Vec<Point2>> {
        match self {
            ArgValue::Points(points) => Some(points.clone()),
            ArgValue::Point(p) => Some(vec![*p]),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ArgValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_element(&self) -> Option<ElementId> {
        match self {
            ArgValue::Element(id) => Some(*id),
            _ => None,
        }
    }
}

impl From<f64> for ArgValue {
    fn from(n: f64) -> Self {
        ArgValue::Number(n)
    }
}

impl From<Point2> for ArgValue {
    fn from(p: Point2) -> Self {
        ArgValue::Point(p)
    }
}

impl From<Vec<Point2>> for ArgValue {
    fn from(points: Vec<Point2>) -> Self {
        ArgValue::Points(points)
    }
}

impl From<&str> for ArgValue {
    fn from(s: &str) -> Self {
        ArgValue::Text(s.to_string())
    }
}

impl From<String> for ArgValue {
    fn from(s: String) -> Self {
        ArgValue::Text(s)
    }
}

impl From<ElementId> for ArgValue {
    fn from(id: ElementId) -> Self {
        ArgValue::Element(id)
    }
}

/// A parsed command: name plus positional and named arguments
///
/// Produced fresh by each parse and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ParsedCommand {
    /// Canonical command name (aliases resolved), or the raw word for
    /// commands the grammar does not know
    pub name: String,
    /// Arguments not bound to a parameter (only for unknown commands)
    pub positional: Vec<ArgValue>,
    /// Arguments bound to parameters
    pub flags: BTreeMap<String, ArgValue>,
}

impl ParsedCommand {
    /// Create a new parsed command with no arguments
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Add a positional argument (builder pattern)
    pub fn with_positional(mut self, value: impl Into<ArgValue>) -> Self {
        self.positional.push(value.into());
        self
    }

    /// Add a named argument (builder pattern)
    pub fn with_flag(mut self, name: impl Into<String>, value: impl Into<ArgValue>) -> Self {
        self.flags.insert(name.into(), value.into());
        self
    }

    /// Check whether a named argument is present
    pub fn has(&self, name: &str) -> bool {
        self.flags.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&ArgValue> {
        self.flags.get(name)
    }

    pub fn number(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(ArgValue::as_number)
    }

    pub fn number_or(&self, name: &str, default: f64) -> f64 {
        self.number(name).unwrap_or(default)
    }

    pub fn point(&self, name: &str) -> Option<Point2> {
        self.get(name).and_then(ArgValue::as_point)
    }

    pub fn points(&self, name: &str) -> Option<Vec<Point2>> {
        self.get(name).and_then(ArgValue::as_points)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(ArgValue::as_text)
    }

    pub fn element(&self, name: &str) -> Option<ElementId> {
        self.get(name).and_then(ArgValue::as_element)
    }

    /// Canonical text form, flags in name order
    pub fn to_command_line(&self) -> String {
        let mut out = self.name.clone();
        for value in &self.positional {
            out.push(' ');
            out.push_str(&value.to_string());
        }
        for (name, value) in &self.flags {
            out.push_str(&format!(" --{} {}", name, value));
        }
        out
    }
}

/// What kind of value a parameter takes
///
/// Drives both the grammar rule generated for the parameter and the
/// completion candidates offered for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// Length with optional unit, normalized to metres
    Length,
    /// Angle with optional `deg`/`rad`, normalized to degrees
    Angle,
    /// Unitless number
    Count,
    /// One point, `x,y` or `(x,y)`
    Point,
    /// One or more points
    Points,
    /// Word or quoted string
    Text,
    /// Element id or `$last` / `$selected`
    Element,
    /// One of a fixed set of words
    Choice(&'static [&'static str]),
    /// Name of an existing level
    Level,
    /// Name of a registered command
    CommandName,
    /// Name of a setting
    Setting,
}

impl ParamKind {
    /// Placeholder used in usage strings
    pub fn placeholder(&self) -> &'static str {
        match self {
            ParamKind::Length => "n",
            ParamKind::Angle => "deg",
            ParamKind::Count => "count",
            ParamKind::Point => "x,y",
            ParamKind::Points => "x,y ...",
            ParamKind::Text => "text",
            ParamKind::Element => "ref",
            ParamKind::Choice(_) => "type",
            ParamKind::Level => "level",
            ParamKind::CommandName => "command",
            ParamKind::Setting => "setting",
        }
    }
}

/// Declaration of one command parameter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamKind,
    /// Must be present for the command to run
    pub required: bool,
    /// May also be written positionally, in declaration order
    pub positional: bool,
    pub help: &'static str,
}

impl ParamSpec {
    /// Parameter accepted positionally or as `--name`
    pub const fn positional(name: &'static str, kind: ParamKind) -> Self {
        ParamSpec {
            name,
            kind,
            required: false,
            positional: true,
            help: "",
        }
    }

    /// Parameter accepted only as `--name`
    pub const fn flag(name: &'static str, kind: ParamKind) -> Self {
        ParamSpec {
            name,
            kind,
            required: false,
            positional: false,
            help: "",
        }
    }

    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub const fn help(mut self, help: &'static str) -> Self {
        self.help = help;
        self
    }

    /// Placeholder text for usage strings, e.g. `basic|structural`
    pub fn value_hint(&self) -> String {
        match self.kind {
            ParamKind::Choice(items) => items.join("|"),
            kind => kind.placeholder().to_string(),
        }
    }
}
