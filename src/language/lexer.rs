use crate::language::{
    span::Span,
    token::{BinaryOp, Token, TokenKind},
};
use nom::{
    branch::alt,
    bytes::complete::take_while1,
    character::complete::{char, one_of},
    combinator::{opt, recognize},
    sequence::{pair, tuple},
    IResult,
};

#[derive(Debug)]
pub struct LexError {
    pub message: String,
    pub span: Span,
}

pub fn lex(source: &str) -> Result<Vec<Token>, Vec<LexError>> {
    let lexer = Lexer::new(source);
    lexer.run()
}

struct Lexer<'a> {
    src: &'a str,
    chars: std::str::Chars<'a>,
    current: Option<char>,
    offset: usize,
    tokens: Vec<Token>,
    errors: Vec<LexError>,
}

impl<'a> Lexer<'a> {
    fn new(src: &'a str) -> Self {
        let mut chars = src.chars();
        let current = chars.next();
        Self {
            src,
            chars,
            current,
            offset: 0,
            tokens: Vec::new(),
            errors: Vec::new(),
        }
    }

    fn run(mut self) -> Result<Vec<Token>, Vec<LexError>> {
        while let Some(ch) = self.current {
            match ch {
                '\n' => {
                    self.insert_semi(self.offset);
                    self.bump();
                }
                '/' if self.peek() == Some('/') => self.eat_line_comment(),
                '/' if self.peek() == Some('*') => self.eat_block_comment(),
                ch if ch.is_whitespace() => {
                    self.bump();
                }
                ch if ch.is_alphabetic() || ch == '_' => self.lex_identifier(),
                ch if ch.is_ascii_digit() => self.lex_number(),
                '.' if self.peek().is_some_and(|next| next.is_ascii_digit()) => self.lex_number(),
                '"' => self.lex_string(),
                '`' => self.lex_raw_string(),
                '\'' => self.lex_rune(),
                _ => self.lex_symbol(),
            }
        }
        self.insert_semi(self.offset);
        self.push_token(TokenKind::Eof, self.offset, self.offset);

        if self.errors.is_empty() {
            Ok(self.tokens)
        } else {
            Err(self.errors)
        }
    }

    fn bump(&mut self) -> Option<char> {
        if let Some(ch) = self.current {
            self.offset += ch.len_utf8();
        }
        self.current = self.chars.next();
        self.current
    }

    fn peek(&self) -> Option<char> {
        self.chars.clone().next()
    }

    fn push_token(&mut self, kind: TokenKind, start: usize, end: usize) {
        self.tokens.push(Token {
            kind,
            span: Span::new(start, end),
        });
    }

    fn insert_semi(&mut self, at: usize) {
        let needed = self
            .tokens
            .last()
            .map(|token| token.kind.ends_statement())
            .unwrap_or(false);
        if needed {
            self.push_token(TokenKind::Semi { implicit: true }, at, at);
        }
    }

    fn error(&mut self, start: usize, end: usize, message: impl Into<String>) {
        self.errors.push(LexError {
            message: message.into(),
            span: Span::new(start, end),
        });
    }

    fn eat_line_comment(&mut self) {
        self.bump();
        self.bump();
        while let Some(ch) = self.current {
            if ch == '\n' {
                break;
            }
            self.bump();
        }
    }

    fn eat_block_comment(&mut self) {
        let start = self.offset;
        self.bump();
        self.bump();
        let mut saw_newline = false;
        while let Some(ch) = self.current {
            if ch == '*' && self.peek() == Some('/') {
                self.bump();
                self.bump();
                // A comment spanning lines acts like a newline.
                if saw_newline {
                    self.insert_semi(start);
                }
                return;
            }
            saw_newline |= ch == '\n';
            self.bump();
        }
        self.error(start, self.offset, "Unterminated block comment");
    }

    fn lex_identifier(&mut self) {
        let start = self.offset;
        while let Some(ch) = self.current {
            if ch.is_alphanumeric() || ch == '_' {
                self.bump();
            } else {
                break;
            }
        }

        let end = self.offset;
        let slice = &self.src[start..end];
        let kind =
            TokenKind::keyword(slice).unwrap_or_else(|| TokenKind::Identifier(slice.to_string()));
        self.push_token(kind, start, end);
    }

    fn lex_number(&mut self) {
        let start = self.offset;
        let text = match number_literal(&self.src[start..]) {
            Ok((_, text)) => text,
            Err(_) => {
                self.bump();
                self.error(start, self.offset, "Invalid number literal");
                return;
            }
        };
        let end = start + text.len();
        while self.offset < end {
            self.bump();
        }
        self.push_token(TokenKind::Number(text.to_string()), start, end);
    }

    fn lex_string(&mut self) {
        let start = self.offset;
        self.bump();
        while let Some(ch) = self.current {
            match ch {
                '"' => {
                    self.bump();
                    let end = self.offset;
                    let raw = self.src[start..end].to_string();
                    self.push_token(TokenKind::String(raw), start, end);
                    return;
                }
                '\\' => {
                    self.bump();
                    if self.current.is_some() {
                        self.bump();
                    }
                }
                '\n' => break,
                _ => {
                    self.bump();
                }
            }
        }
        self.error(start, self.offset, "Unterminated string literal");
    }

    fn lex_raw_string(&mut self) {
        let start = self.offset;
        self.bump();
        while let Some(ch) = self.current {
            self.bump();
            if ch == '`' {
                let end = self.offset;
                let raw = self.src[start..end].to_string();
                self.push_token(TokenKind::String(raw), start, end);
                return;
            }
        }
        self.error(start, self.offset, "Unterminated raw string literal");
    }

    fn lex_rune(&mut self) {
        let start = self.offset;
        self.bump();
        while let Some(ch) = self.current {
            match ch {
                '\'' => {
                    self.bump();
                    let end = self.offset;
                    let raw = self.src[start..end].to_string();
                    self.push_token(TokenKind::Rune(raw), start, end);
                    return;
                }
                '\\' => {
                    self.bump();
                    if self.current.is_some() {
                        self.bump();
                    }
                }
                '\n' => break,
                _ => {
                    self.bump();
                }
            }
        }
        self.error(start, self.offset, "Unterminated rune literal");
    }

    fn lex_symbol(&mut self) {
        let start = self.offset;
        let Some(ch) = self.current else {
            return;
        };
        self.bump();
        let kind = match ch {
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            ',' => TokenKind::Comma,
            ';' => TokenKind::Semi { implicit: false },
            '~' => TokenKind::Tilde,
            '.' => {
                if self.current == Some('.') && self.peek() == Some('.') {
                    self.bump();
                    self.bump();
                    TokenKind::Ellipsis
                } else {
                    TokenKind::Dot
                }
            }
            ':' => {
                if self.eat('=') {
                    TokenKind::Define
                } else {
                    TokenKind::Colon
                }
            }
            '=' => {
                if self.eat('=') {
                    TokenKind::Binary(BinaryOp::Eq)
                } else {
                    TokenKind::Assign
                }
            }
            '!' => {
                if self.eat('=') {
                    TokenKind::Binary(BinaryOp::NotEq)
                } else {
                    TokenKind::Bang
                }
            }
            '+' => {
                if self.eat('+') {
                    TokenKind::Inc
                } else {
                    self.with_assign(BinaryOp::Add)
                }
            }
            '-' => {
                if self.eat('-') {
                    TokenKind::Dec
                } else {
                    self.with_assign(BinaryOp::Sub)
                }
            }
            '*' => self.with_assign(BinaryOp::Mul),
            '/' => self.with_assign(BinaryOp::Div),
            '%' => self.with_assign(BinaryOp::Rem),
            '^' => self.with_assign(BinaryOp::Xor),
            '&' => {
                if self.eat('&') {
                    TokenKind::Binary(BinaryOp::LogAnd)
                } else if self.eat('^') {
                    self.with_assign(BinaryOp::AndNot)
                } else {
                    self.with_assign(BinaryOp::And)
                }
            }
            '|' => {
                if self.eat('|') {
                    TokenKind::Binary(BinaryOp::LogOr)
                } else {
                    self.with_assign(BinaryOp::Or)
                }
            }
            '<' => {
                if self.eat('-') {
                    TokenKind::Arrow
                } else if self.eat('<') {
                    self.with_assign(BinaryOp::Shl)
                } else if self.eat('=') {
                    TokenKind::Binary(BinaryOp::LtEq)
                } else {
                    TokenKind::Binary(BinaryOp::Lt)
                }
            }
            '>' => {
                if self.eat('>') {
                    self.with_assign(BinaryOp::Shr)
                } else if self.eat('=') {
                    TokenKind::Binary(BinaryOp::GtEq)
                } else {
                    TokenKind::Binary(BinaryOp::Gt)
                }
            }
            other => {
                self.error(start, self.offset, format!("Unexpected character '{}'", other));
                return;
            }
        };
        self.push_token(kind, start, self.offset);
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.current == Some(expected) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn with_assign(&mut self, op: BinaryOp) -> TokenKind {
        if self.eat('=') {
            TokenKind::OpAssign(op)
        } else {
            TokenKind::Binary(op)
        }
    }
}

fn is_digit_or_sep(ch: char) -> bool {
    ch.is_ascii_digit() || ch == '_'
}

fn decimal_exponent(input: &str) -> IResult<&str, &str> {
    recognize(tuple((
        one_of("eE"),
        opt(one_of("+-")),
        take_while1(is_digit_or_sep),
    )))(input)
}

fn binary_exponent(input: &str) -> IResult<&str, &str> {
    recognize(tuple((
        one_of("pP"),
        opt(one_of("+-")),
        take_while1(is_digit_or_sep),
    )))(input)
}

fn hex_literal(input: &str) -> IResult<&str, &str> {
    recognize(tuple((
        char('0'),
        one_of("xX"),
        take_while1(|ch: char| ch.is_ascii_hexdigit() || ch == '_' || ch == '.'),
        opt(binary_exponent),
    )))(input)
}

fn radix_literal(input: &str) -> IResult<&str, &str> {
    recognize(tuple((
        char('0'),
        one_of("bBoO"),
        take_while1(is_digit_or_sep),
    )))(input)
}

fn decimal_literal(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        take_while1(|ch: char| is_digit_or_sep(ch) || ch == '.'),
        opt(decimal_exponent),
    ))(input)
}

/// Recognizes any Go number literal, including the imaginary suffix.
pub fn number_literal(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        alt((hex_literal, radix_literal, decimal_literal)),
        opt(char('i')),
    ))(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        lex(source)
            .expect("lex")
            .into_iter()
            .map(|token| token.kind)
            .collect()
    }

    #[test]
    fn inserts_semicolons_at_line_ends() {
        let kinds = kinds("x := 1\nreturn\n");
        assert_eq!(
            kinds,
            vec![
                TokenKind::Identifier("x".into()),
                TokenKind::Define,
                TokenKind::Number("1".into()),
                TokenKind::Semi { implicit: true },
                TokenKind::Return,
                TokenKind::Semi { implicit: true },
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn no_semicolon_after_operator_or_open_brace() {
        let kinds = kinds("if a &&\n b {\n}");
        assert!(!kinds[..4].contains(&TokenKind::Semi { implicit: true }));
    }

    #[test]
    fn comments_are_not_tokens() {
        let kinds = kinds("// context.TODO()\nx /* context.TODO() */ y");
        assert_eq!(
            kinds,
            vec![
                TokenKind::Identifier("x".into()),
                TokenKind::Identifier("y".into()),
                TokenKind::Semi { implicit: true },
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn multiline_block_comment_acts_as_newline() {
        let kinds = kinds("x /* a\nb */ y");
        assert_eq!(kinds[1], TokenKind::Semi { implicit: true });
    }

    #[test]
    fn strings_keep_their_raw_text() {
        let kinds = kinds(r#"s := "context.TODO() \"q\"""#);
        assert_eq!(
            kinds[2],
            TokenKind::String(r#""context.TODO() \"q\"""#.into())
        );
        let raw = self::kinds("`a\nb`");
        assert_eq!(raw[0], TokenKind::String("`a\nb`".into()));
    }

    #[test]
    fn number_forms() {
        for text in ["0x1F", "0b1010", "0o17", "1_000", "3.14", ".5", "1e9", "0x1p-2", "2i"] {
            let (rest, matched) = number_literal(text).expect(text);
            assert_eq!(rest, "", "{text}");
            assert_eq!(matched, text);
        }
    }

    #[test]
    fn compound_operators() {
        let kinds = kinds("a &^= b <- c ... d")
            .into_iter()
            .filter(|kind| !matches!(kind, TokenKind::Identifier(_)))
            .collect::<Vec<_>>();
        assert_eq!(
            kinds,
            vec![
                TokenKind::OpAssign(BinaryOp::AndNot),
                TokenKind::Arrow,
                TokenKind::Ellipsis,
                TokenKind::Semi { implicit: true },
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn reports_unterminated_string() {
        let errors = lex("\"abc\n").unwrap_err();
        assert_eq!(errors[0].message, "Unterminated string literal");
    }
}
