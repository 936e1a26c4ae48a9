// ── Token ─────────────────────────────────────────────────────────────────

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// `[A-Za-z_][A-Za-z0-9_]*`
    Ident,
    /// Numeric literal, including a fractional part, exponent and suffix.
    Number,
    /// A run of whitespace.
    Space,
    /// Any other single character.
    Punct,
}

/// A token borrowing its text from the source.
///
/// Tokens are lossless: concatenating every token's `text` reproduces the
/// source exactly, which is what lets rewrite passes splice by byte offset.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Token<'s> {
    pub kind: TokenKind,
    pub text: &'s str,
    /// Byte offset of `text` in the source.
    pub offset: usize,
}

impl Token<'_> {
    #[inline]
    pub fn end(&self) -> usize {
        self.offset + self.text.len()
    }

    #[inline]
    pub fn is(&self, text: &str) -> bool {
        self.text == text
    }
}

// ── Lexer ─────────────────────────────────────────────────────────────────

pub struct Lexer<'s> {
    src: &'s str,
    pos: usize,
}

impl<'s> Lexer<'s> {
    pub fn new(src: &'s str) -> Self {
        Self { src, pos: 0 }
    }

    pub fn tokenize(mut self) -> Vec<Token<'s>> {
        let mut tokens = Vec::new();
        while let Some(tok) = self.next_token() {
            tokens.push(tok);
        }
        tokens
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        self.src[self.pos..].chars().nth(1)
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.src[self.pos..].chars().next()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn next_token(&mut self) -> Option<Token<'s>> {
        let start = self.pos;
        let ch = self.peek()?;

        let kind = match ch {
            c if c.is_whitespace() => {
                while matches!(self.peek(), Some(c) if c.is_whitespace()) {
                    self.advance();
                }
                TokenKind::Space
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                while matches!(self.peek(), Some(c) if c.is_ascii_alphanumeric() || c == '_') {
                    self.advance();
                }
                TokenKind::Ident
            }
            c if c.is_ascii_digit() => {
                self.lex_number();
                TokenKind::Number
            }
            '.' if matches!(self.peek_second(), Some(c) if c.is_ascii_digit()) => {
                self.lex_number();
                TokenKind::Number
            }
            _ => {
                self.advance();
                TokenKind::Punct
            }
        };

        Some(Token { kind, text: &self.src[start..self.pos], offset: start })
    }

    /// Consumes `1`, `1.0`, `.5`, `1e-3`, `2.0f`, `0x1F`, `4u`.
    fn lex_number(&mut self) {
        let mut prev = '\0';
        while let Some(c) = self.peek() {
            let exponent_sign = (c == '+' || c == '-') && matches!(prev, 'e' | 'E');
            if c.is_ascii_alphanumeric() || c == '.' || c == '_' || exponent_sign {
                prev = c;
                self.advance();
            } else {
                break;
            }
        }
    }
}

/// Splits `src` into lossless tokens.
pub fn tokenize(src: &str) -> Vec<Token<'_>> {
    Lexer::new(src).tokenize()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<(TokenKind, &str)> {
        tokenize(src).into_iter().map(|t| (t.kind, t.text)).collect()
    }

    #[test]
    fn lossless() {
        let src = "uniform Float1D input;\n[float] thread (int x) { thread[0] = input[x] * 1.5e-3; }";
        let joined: String = tokenize(src).iter().map(|t| t.text).collect();
        assert_eq!(joined, src);
    }

    #[test]
    fn member_access_is_not_a_number() {
        assert_eq!(
            kinds("a.width"),
            vec![(TokenKind::Ident, "a"), (TokenKind::Punct, "."), (TokenKind::Ident, "width")]
        );
    }

    #[test]
    fn numbers() {
        assert_eq!(kinds("1.0"), vec![(TokenKind::Number, "1.0")]);
        assert_eq!(kinds(".5"), vec![(TokenKind::Number, ".5")]);
        assert_eq!(kinds("1e-3"), vec![(TokenKind::Number, "1e-3")]);
        assert_eq!(
            kinds("1-3"),
            vec![(TokenKind::Number, "1"), (TokenKind::Punct, "-"), (TokenKind::Number, "3")]
        );
    }

    #[test]
    fn whitespace_runs_collapse() {
        assert_eq!(
            kinds("int  \n\tx"),
            vec![(TokenKind::Ident, "int"), (TokenKind::Space, "  \n\t"), (TokenKind::Ident, "x")]
        );
    }

    #[test]
    fn offsets() {
        let toks = tokenize("ab cd");
        assert_eq!(toks[2].offset, 3);
        assert_eq!(toks[2].end(), 5);
    }
}
