//! Chainable token patterns with captures.
//!
//! A [`Pattern`] is built left to right from primitives and matched against a
//! token stream. Matching is greedy and does not backtrack; every pattern the
//! compiler composes places a closer (`]`, `)`) after a `codeblock`, which is
//! where a code block stops on its own.

use std::fmt;
use std::ops::Range;

use crate::error::PatternError;
use crate::lexer::{self, Token, TokenKind};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Element {
    Literal(String),
    Alphanumeric,
    Numeric,
    CodeBlock,
    SpaceOptional,
    SpaceMandated,
    Capture(Vec<Element>),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pattern {
    elements: Vec<Element>,
}

/// One occurrence of a pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    /// The full matched text.
    pub literal: String,
    /// Captured texts, numbered by opening position (outer before inner).
    pub captures: Vec<String>,
    /// Byte range of `literal` in the matched source.
    pub range: Range<usize>,
}

impl Pattern {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(mut self, element: Element) -> Self {
        self.elements.push(element);
        self
    }

    pub fn literal(self, text: &str) -> Self {
        self.push(Element::Literal(text.to_string()))
    }

    pub fn alphanumeric(self) -> Self {
        self.push(Element::Alphanumeric)
    }

    pub fn numeric(self) -> Self {
        self.push(Element::Numeric)
    }

    pub fn codeblock(self) -> Self {
        self.push(Element::CodeBlock)
    }

    pub fn space_optional(self) -> Self {
        self.push(Element::SpaceOptional)
    }

    pub fn space_mandated(self) -> Self {
        self.push(Element::SpaceMandated)
    }

    pub fn dot(self) -> Self {
        self.literal(".")
    }

    pub fn semicolon(self) -> Self {
        self.literal(";")
    }

    pub fn bracket_open(self) -> Self {
        self.literal("[")
    }

    pub fn bracket_close(self) -> Self {
        self.literal("]")
    }

    pub fn parentheses_open(self) -> Self {
        self.literal("(")
    }

    pub fn parentheses_close(self) -> Self {
        self.literal(")")
    }

    pub fn curly_open(self) -> Self {
        self.literal("{")
    }

    pub fn curly_close(self) -> Self {
        self.literal("}")
    }

    pub fn comma(self) -> Self {
        self.literal(",")
    }

    pub fn capture(self, inner: Pattern) -> Self {
        self.push(Element::Capture(inner.elements))
    }

    /// Finds every non-overlapping occurrence, scanning left to right.
    pub fn find_all(&self, src: &str) -> Result<Vec<Match>, PatternError> {
        let tokens = lexer::tokenize(src);
        let mut found = Vec::new();
        let mut pos = 0;

        while pos < tokens.len() {
            let mut captures = Vec::new();
            match match_seq(&self.elements, &tokens, pos, &mut captures) {
                Some(end) if end == pos => {
                    return Err(PatternError::ZeroLengthMatch(self.to_string()));
                }
                Some(end) => {
                    let range = tokens[pos].offset..tokens[end - 1].end();
                    found.push(Match {
                        literal: src[range.clone()].to_string(),
                        captures,
                        range,
                    });
                    pos = end;
                }
                None => pos += 1,
            }
        }

        Ok(found)
    }

    /// Replaces every occurrence with the text produced by `replace`.
    pub fn replace_all<F>(&self, src: &str, mut replace: F) -> Result<String, PatternError>
    where
        F: FnMut(&Match) -> String,
    {
        let matches = self.find_all(src)?;
        let mut out = String::with_capacity(src.len());
        let mut cursor = 0;
        for m in &matches {
            out.push_str(&src[cursor..m.range.start]);
            out.push_str(&replace(m));
            cursor = m.range.end;
        }
        out.push_str(&src[cursor..]);
        Ok(out)
    }
}

fn match_seq(
    elements: &[Element],
    tokens: &[Token<'_>],
    mut pos: usize,
    captures: &mut Vec<String>,
) -> Option<usize> {
    for element in elements {
        pos = match_one(element, tokens, pos, captures)?;
    }
    Some(pos)
}

fn match_one(
    element: &Element,
    tokens: &[Token<'_>],
    pos: usize,
    captures: &mut Vec<String>,
) -> Option<usize> {
    let tok = tokens.get(pos);
    match element {
        Element::Literal(text) => tok.filter(|t| t.is(text)).map(|_| pos + 1),
        Element::Alphanumeric => tok
            .filter(|t| matches!(t.kind, TokenKind::Ident | TokenKind::Number))
            .map(|_| pos + 1),
        Element::Numeric => tok.filter(|t| t.kind == TokenKind::Number).map(|_| pos + 1),
        Element::SpaceOptional => match tok {
            Some(t) if t.kind == TokenKind::Space => Some(pos + 1),
            _ => Some(pos),
        },
        Element::SpaceMandated => tok.filter(|t| t.kind == TokenKind::Space).map(|_| pos + 1),
        Element::CodeBlock => match_codeblock(tokens, pos),
        Element::Capture(inner) => {
            let slot = captures.len();
            captures.push(String::new());
            let end = match_seq(inner, tokens, pos, captures)?;
            captures[slot] = tokens[pos..end].iter().map(|t| t.text).collect();
            Some(end)
        }
    }
}

/// Greedy run of tokens with balanced `()`/`[]`.
///
/// Stops before an unbalanced closer, before any brace and before a `;` at
/// depth zero. Matches at least one token.
fn match_codeblock(tokens: &[Token<'_>], start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut pos = start;

    while let Some(tok) = tokens.get(pos) {
        match tok.text {
            "(" | "[" => depth += 1,
            ")" | "]" => {
                if depth == 0 {
                    break;
                }
                depth -= 1;
            }
            "{" | "}" => break,
            ";" if depth == 0 => break,
            _ => {}
        }
        pos += 1;
    }

    // An unclosed bracket cannot end a code block.
    if depth != 0 || pos == start { None } else { Some(pos) }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn write_elements(f: &mut fmt::Formatter<'_>, elements: &[Element]) -> fmt::Result {
            for element in elements {
                match element {
                    Element::Literal(text) => {
                        for c in text.chars() {
                            if c.is_ascii_alphanumeric() || c == '_' {
                                write!(f, "{c}")?;
                            } else {
                                write!(f, "\\{c}")?;
                            }
                        }
                    }
                    Element::Alphanumeric => f.write_str("\\w+")?,
                    Element::Numeric => f.write_str("[0-9]+")?,
                    Element::CodeBlock => f.write_str("[\\w\\s\\+\\-\\*\\/%\\(\\),:;]+")?,
                    Element::SpaceOptional => f.write_str("\\s*")?,
                    Element::SpaceMandated => f.write_str("\\s+")?,
                    Element::Capture(inner) => {
                        f.write_str("(")?;
                        write_elements(f, inner)?;
                        f.write_str(")")?;
                    }
                }
            }
            Ok(())
        }
        write_elements(f, &self.elements)
    }
}
