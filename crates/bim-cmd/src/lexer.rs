//! Lexer for the command language
//!
//! Converts one input line into a flat token stream using nom combinators.
//! Numbers keep their unit suffix, known or not; the parser normalizes units
//! once it knows whether a length, an angle or a plain number is expected,
//! and reads an unknown suffix as part of a word where a name is expected.

use nom::{
    IResult,
    branch::alt,
    bytes::complete::{tag, take_while, take_while1},
    character::complete::{char, digit0, digit1, multispace0, satisfy},
    combinator::{map, map_res, opt, recognize, value},
    sequence::{pair, preceded, tuple},
};

use crate::error::ParseError;

/// Token types
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// Identifier or keyword (`wall`, `wall-3`, `double-hung`)
    Word(String),
    /// Number with optional unit suffix (`5`, `-2.5`, `300mm`)
    Number { value: f64, unit: Option<String> },
    /// Named flag without its dashes (`--start` is `Flag("start")`)
    Flag(String),
    /// Quoted string with escapes resolved
    Str(String),
    /// Contextual variable without its `$`
    Variable(String),
    /// Opening parenthesis
    LParen,
    /// Closing parenthesis
    RParen,
    /// Comma separator
    Comma,
    /// End of input
    Eof,
}

/// A token with its source text and byte offset
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub position: usize,
}

impl Token {
    /// Description used in "found ..." error messages
    pub fn describe(&self) -> String {
        match self.kind {
            TokenKind::Eof => "end of input".to_string(),
            _ => format!("'{}'", self.lexeme),
        }
    }

    pub fn is_eof(&self) -> bool {
        matches!(self.kind, TokenKind::Eof)
    }
}

/// Result of lexing
type LexResult<'a, T> = IResult<&'a str, T>;

fn ws(input: &str) -> LexResult<'_, ()> {
    value((), multispace0)(input)
}

fn lparen(input: &str) -> LexResult<'_, TokenKind> {
    value(TokenKind::LParen, char('('))(input)
}

fn rparen(input: &str) -> LexResult<'_, TokenKind> {
    value(TokenKind::RParen, char(')'))(input)
}

fn comma(input: &str) -> LexResult<'_, TokenKind> {
    value(TokenKind::Comma, char(','))(input)
}

fn is_word_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '-' | '.')
}

/// Identifier body shared by words, flags and variables
fn identifier(input: &str) -> LexResult<'_, &str> {
    recognize(pair(satisfy(is_word_start), take_while(is_word_char)))(input)
}

fn word(input: &str) -> LexResult<'_, TokenKind> {
    map(identifier, |s: &str| TokenKind::Word(s.to_string()))(input)
}

fn flag(input: &str) -> LexResult<'_, TokenKind> {
    map(preceded(tag("--"), identifier), |s: &str| {
        TokenKind::Flag(s.to_ascii_lowercase())
    })(input)
}

fn variable(input: &str) -> LexResult<'_, TokenKind> {
    map(preceded(char('$'), identifier), |s: &str| {
        TokenKind::Variable(s.to_ascii_lowercase())
    })(input)
}

/// Number with optional leading minus, fraction and unit suffix
fn number(input: &str) -> LexResult<'_, TokenKind> {
    let (input, value) = map_res(
        recognize(tuple((
            opt(char('-')),
            alt((
                recognize(pair(digit1, opt(pair(char('.'), digit0)))),
                recognize(pair(char('.'), digit1)),
            )),
        ))),
        |s: &str| s.parse::<f64>(),
    )(input)?;
    let (input, unit) = opt(take_while1(|c: char| c.is_ascii_alphabetic()))(input)?;
    Ok((
        input,
        TokenKind::Number {
            value,
            unit: unit.map(str::to_ascii_lowercase),
        },
    ))
}

/// Quoted string, single or double quotes, with `\n \t \\ \" \'` escapes
fn quoted(input: &str) -> LexResult<'_, TokenKind> {
    let (rest, quote) = alt((char('"'), char('\'')))(input)?;
    let mut out = String::new();
    let mut chars = rest.char_indices();
    while let Some((i, c)) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some((_, 'n')) => out.push('\n'),
                Some((_, 't')) => out.push('\t'),
                Some((_, other)) => out.push(other),
                None => break,
            },
            c if c == quote => return Ok((&rest[i + c.len_utf8()..], TokenKind::Str(out))),
            c => out.push(c),
        }
    }
    Err(nom::Err::Failure(nom::error::Error::new(
        input,
        nom::error::ErrorKind::Char,
    )))
}

fn token(input: &str) -> LexResult<'_, TokenKind> {
    alt((flag, number, variable, quoted, word, lparen, rparen, comma))(input)
}

/// Tokenize one command line
///
/// The returned stream always ends with a [`TokenKind::Eof`] token.
pub fn tokenize(input: &str) -> Result<Vec<Token>, ParseError> {
    let mut tokens = Vec::new();
    let mut remaining = input;

    loop {
        if let Ok((rest, _)) = ws(remaining) {
            remaining = rest;
        }
        let position = input.len() - remaining.len();

        if remaining.is_empty() {
            tokens.push(Token {
                kind: TokenKind::Eof,
                lexeme: String::new(),
                position,
            });
            break;
        }

        match token(remaining) {
            Ok((rest, kind)) => {
                let lexeme = &remaining[..remaining.len() - rest.len()];
                if let TokenKind::Number { value, .. } = &kind {
                    if rest.starts_with(|c: char| c.is_alphanumeric() || c == '_' || c == '.') {
                        let tail = rest.find(|c: char| !is_word_char(c)).unwrap_or(rest.len());
                        return Err(ParseError::InvalidNumber {
                            text: format!("{}{}", lexeme, &rest[..tail]),
                            position,
                        });
                    }
                    if !value.is_finite() {
                        return Err(ParseError::InvalidNumber {
                            text: lexeme.to_string(),
                            position,
                        });
                    }
                }
                tokens.push(Token {
                    kind,
                    lexeme: lexeme.to_string(),
                    position,
                });
                remaining = rest;
            }
            Err(_) => {
                let found = remaining.chars().next().unwrap_or(' ');
                return Err(if found == '"' || found == '\'' {
                    ParseError::UnterminatedString(position)
                } else {
                    ParseError::UnexpectedChar { found, position }
                });
            }
        }
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        tokenize(input).unwrap().into_iter().map(|t| t.kind).collect()
    }

    fn num(value: f64, unit: Option<&str>) -> TokenKind {
        TokenKind::Number {
            value,
            unit: unit.map(str::to_string),
        }
    }

    #[test]
    fn test_tokenize_simple() {
        assert_eq!(
            kinds("wall 0,0 5,0"),
            vec![
                TokenKind::Word("wall".into()),
                num(0.0, None),
                TokenKind::Comma,
                num(0.0, None),
                num(5.0, None),
                TokenKind::Comma,
                num(0.0, None),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_tokenize_flags_and_units() {
        assert_eq!(
            kinds("--height 300mm --slope 0.5rad"),
            vec![
                TokenKind::Flag("height".into()),
                num(300.0, Some("mm")),
                TokenKind::Flag("slope".into()),
                num(0.5, Some("rad")),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_tokenize_parenthesized_point() {
        assert_eq!(
            kinds("(-1.5, .25)"),
            vec![
                TokenKind::LParen,
                num(-1.5, None),
                TokenKind::Comma,
                num(0.25, None),
                TokenKind::RParen,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_tokenize_references() {
        assert_eq!(
            kinds("door wall-12 $last"),
            vec![
                TokenKind::Word("door".into()),
                TokenKind::Word("wall-12".into()),
                TokenKind::Variable("last".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_tokenize_quoted() {
        assert_eq!(
            kinds(r#"--name "Living \"Room\"" 'x'"#),
            vec![
                TokenKind::Flag("name".into()),
                TokenKind::Str("Living \"Room\"".into()),
                TokenKind::Str("x".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_positions() {
        let tokens = tokenize("wall  --start").unwrap();
        assert_eq!(tokens[1].position, 6);
        assert_eq!(tokens[1].lexeme, "--start");
        assert_eq!(tokens[2].position, 13);
        assert_eq!(tokens[2].describe(), "end of input");
    }

    #[test]
    fn test_errors() {
        assert_eq!(
            tokenize("wall @"),
            Err(ParseError::UnexpectedChar { found: '@', position: 5 })
        );
        assert_eq!(
            tokenize("room --name \"open"),
            Err(ParseError::UnterminatedString(12))
        );
        assert!(matches!(
            tokenize(&format!("wall 0,0 {},0", "9".repeat(400))),
            Err(ParseError::InvalidNumber { position: 9, .. })
        ));
        assert!(matches!(
            tokenize("wall 5m2,0"),
            Err(ParseError::InvalidNumber { .. })
        ));
    }

    #[test]
    fn test_unknown_suffix_kept() {
        assert_eq!(
            kinds("level 2F"),
            vec![TokenKind::Word("level".into()), num(2.0, Some("f")), TokenKind::Eof]
        );
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(kinds("   "), vec![TokenKind::Eof]);
    }
}
