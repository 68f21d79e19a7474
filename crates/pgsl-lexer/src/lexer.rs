// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! The lexer implementation using logos.

use logos::Logos;
use pgsl_ast::token::{NumberSuffix, Token, TokenKind};
use pgsl_ast::Span;

use crate::template;

/// Raw token type for logos - we parse values in a second pass.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"\s+")]
enum RawToken {
    // === Keywords ===
    #[token("alias")]
    Alias,
    #[token("enum")]
    Enum,
    #[token("struct")]
    Struct,
    #[token("function")]
    Function,
    #[token("const")]
    Const,
    #[token("let")]
    Let,
    #[token("storage")]
    Storage,
    #[token("uniform")]
    Uniform,
    #[token("workgroup")]
    Workgroup,
    #[token("private")]
    Private,
    #[token("param")]
    Param,
    #[token("if")]
    If,
    #[token("else")]
    Else,
    #[token("switch")]
    Switch,
    #[token("case")]
    Case,
    #[token("default")]
    Default,
    #[token("for")]
    For,
    #[token("while")]
    While,
    #[token("do")]
    Do,
    #[token("break")]
    Break,
    #[token("continue")]
    Continue,
    #[token("return")]
    Return,
    #[token("discard")]
    Discard,
    #[token("new")]
    New,
    #[token("true")]
    True,
    #[token("false")]
    False,

    // === Reserved for future use ===
    #[token("var")]
    #[token("fn")]
    #[token("loop")]
    #[token("async")]
    #[token("await")]
    #[token("class")]
    #[token("self")]
    #[token("super")]
    #[token("template")]
    #[token("typeof")]
    #[token("unsafe")]
    #[token("virtual")]
    #[token("yield")]
    #[token("impl")]
    #[token("trait")]
    #[token("use")]
    #[token("static")]
    #[token("goto")]
    #[token("mut")]
    #[token("macro")]
    #[token("module")]
    #[token("namespace")]
    Reserved,

    // === Operators (longest match wins) ===
    #[token("<<=")]
    LtLtEq,
    #[token(">>=")]
    GtGtEq,
    #[token("<<")]
    LtLt,
    #[token(">>")]
    GtGt,
    #[token("==")]
    EqEq,
    #[token("!=")]
    BangEq,
    #[token("<=")]
    LtEq,
    #[token(">=")]
    GtEq,
    #[token("&&")]
    AmpAmp,
    #[token("||")]
    PipePipe,
    #[token("++")]
    PlusPlus,
    #[token("--")]
    MinusMinus,
    #[token("+=")]
    PlusEq,
    #[token("-=")]
    MinusEq,
    #[token("*=")]
    StarEq,
    #[token("/=")]
    SlashEq,
    #[token("%=")]
    PercentEq,
    #[token("&=")]
    AmpEq,
    #[token("|=")]
    PipeEq,
    #[token("^=")]
    CaretEq,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("=")]
    Eq,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("!")]
    Bang,
    #[token(".")]
    Dot,
    #[token("&")]
    Amp,
    #[token("|")]
    Pipe,
    #[token("^")]
    Caret,
    #[token("~")]
    Tilde,

    // === Delimiters ===
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(":")]
    Colon,
    #[token(";")]
    Semi,
    #[token(",")]
    Comma,

    // === Comments (skip them) ===
    #[regex(r"//[^\n]*", logos::skip)]
    LineComment,

    // Block comments - handled specially for nesting
    #[token("/*", block_comment)]
    BlockComment,

    // === Literals ===
    // Hex floats: a point in the mantissa or a binary exponent. The f/h
    // suffix is only allowed after the exponent since both are hex digits.
    #[regex(r"0[xX]([0-9a-fA-F]*\.[0-9a-fA-F]+|[0-9a-fA-F]+\.[0-9a-fA-F]*)([pP][+-]?[0-9]+[fh]?)?")]
    #[regex(r"0[xX][0-9a-fA-F]+[pP][+-]?[0-9]+[fh]?")]
    HexFloat,

    #[regex(r"0[xX][0-9a-fA-F]+[iu]?")]
    HexInt,

    #[regex(r"([0-9]+\.[0-9]*|\.[0-9]+)([eE][+-]?[0-9]+)?[fh]?")]
    #[regex(r"[0-9]+[eE][+-]?[0-9]+[fh]?")]
    #[regex(r"[0-9]+[fh]")]
    DecFloat,

    #[regex(r"[0-9]+[iu]?")]
    DecInt,

    #[regex(r#""([^"\\\n]|\\.)*""#)]
    String,

    // === Identifier (must come after keywords) ===
    #[regex(r"[\p{XID_Start}_]\p{XID_Continue}*")]
    Ident,
}

/// Skip block comments, handling nesting. Unterminated comments are errors.
fn block_comment(lexer: &mut logos::Lexer<RawToken>) -> logos::FilterResult<(), ()> {
    let mut depth = 1;
    let remainder = lexer.remainder();
    let mut chars = remainder.chars().peekable();
    let mut consumed = 0;

    while depth > 0 {
        match chars.next() {
            Some('/') if chars.peek() == Some(&'*') => {
                chars.next();
                consumed += 2;
                depth += 1;
            }
            Some('*') if chars.peek() == Some(&'/') => {
                chars.next();
                consumed += 2;
                depth -= 1;
            }
            Some(c) => {
                consumed += c.len_utf8();
            }
            None => return logos::FilterResult::Error(()),
        }
    }

    lexer.bump(consumed);
    logos::FilterResult::Skip
}

/// The lexer for PGSL source code.
pub struct Lexer<'a> {
    source: &'a str,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given source code.
    pub fn new(source: &'a str) -> Self {
        Self { source }
    }

    /// Tokenize the entire source. Stops at the first error.
    ///
    /// The returned stream always ends with [`TokenKind::Eof`], and every `<`
    /// that opens a template list has been replaced by
    /// [`TokenKind::TemplateListStart`].
    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        let mut logos_lexer = RawToken::lexer(self.source);

        while let Some(result) = logos_lexer.next() {
            let span = logos_lexer.span();
            let slice = logos_lexer.slice();

            let kind = match result {
                Ok(raw) => self.convert_token(raw, slice, span.start, span.end)?,
                Err(()) if slice.starts_with("/*") => {
                    return Err(LexError::unterminated_comment(span.start, self.source.len()));
                }
                Err(()) => {
                    let ch = self.source[span.start..].chars().next().unwrap_or('?');
                    return Err(LexError::unexpected_char(ch, span.start));
                }
            };

            tokens.push(Token {
                kind,
                span: Span::new(span.start, span.end),
            });
        }

        tokens.push(Token {
            kind: TokenKind::Eof,
            span: Span::new(self.source.len(), self.source.len()),
        });

        template::mark_template_lists(&mut tokens);
        log::debug!("lexed {} tokens from {} bytes", tokens.len(), self.source.len());
        Ok(tokens)
    }

    /// Convert a raw logos token to our TokenKind, parsing literals.
    fn convert_token(&self, raw: RawToken, slice: &str, start: usize, end: usize) -> Result<TokenKind, LexError> {
        Ok(match raw {
            // Keywords
            RawToken::Alias => TokenKind::Alias,
            RawToken::Enum => TokenKind::Enum,
            RawToken::Struct => TokenKind::Struct,
            RawToken::Function => TokenKind::Function,
            RawToken::Const => TokenKind::Const,
            RawToken::Let => TokenKind::Let,
            RawToken::Storage => TokenKind::Storage,
            RawToken::Uniform => TokenKind::Uniform,
            RawToken::Workgroup => TokenKind::Workgroup,
            RawToken::Private => TokenKind::Private,
            RawToken::Param => TokenKind::Param,
            RawToken::If => TokenKind::If,
            RawToken::Else => TokenKind::Else,
            RawToken::Switch => TokenKind::Switch,
            RawToken::Case => TokenKind::Case,
            RawToken::Default => TokenKind::Default,
            RawToken::For => TokenKind::For,
            RawToken::While => TokenKind::While,
            RawToken::Do => TokenKind::Do,
            RawToken::Break => TokenKind::Break,
            RawToken::Continue => TokenKind::Continue,
            RawToken::Return => TokenKind::Return,
            RawToken::Discard => TokenKind::Discard,
            RawToken::New => TokenKind::New,
            RawToken::True => TokenKind::Bool(true),
            RawToken::False => TokenKind::Bool(false),
            RawToken::Reserved => return Err(LexError::reserved_word(slice, start, end)),

            // Operators
            RawToken::Plus => TokenKind::Plus,
            RawToken::Minus => TokenKind::Minus,
            RawToken::Star => TokenKind::Star,
            RawToken::Slash => TokenKind::Slash,
            RawToken::Percent => TokenKind::Percent,
            RawToken::Eq => TokenKind::Eq,
            RawToken::EqEq => TokenKind::EqEq,
            RawToken::BangEq => TokenKind::BangEq,
            RawToken::Lt => TokenKind::Lt,
            RawToken::Gt => TokenKind::Gt,
            RawToken::LtEq => TokenKind::LtEq,
            RawToken::GtEq => TokenKind::GtEq,
            RawToken::AmpAmp => TokenKind::AmpAmp,
            RawToken::PipePipe => TokenKind::PipePipe,
            RawToken::Bang => TokenKind::Bang,
            RawToken::Dot => TokenKind::Dot,
            RawToken::Amp => TokenKind::Amp,
            RawToken::Pipe => TokenKind::Pipe,
            RawToken::Caret => TokenKind::Caret,
            RawToken::Tilde => TokenKind::Tilde,
            RawToken::LtLt => TokenKind::LtLt,
            RawToken::GtGt => TokenKind::GtGt,
            RawToken::PlusPlus => TokenKind::PlusPlus,
            RawToken::MinusMinus => TokenKind::MinusMinus,
            RawToken::PlusEq => TokenKind::PlusEq,
            RawToken::MinusEq => TokenKind::MinusEq,
            RawToken::StarEq => TokenKind::StarEq,
            RawToken::SlashEq => TokenKind::SlashEq,
            RawToken::PercentEq => TokenKind::PercentEq,
            RawToken::AmpEq => TokenKind::AmpEq,
            RawToken::PipeEq => TokenKind::PipeEq,
            RawToken::CaretEq => TokenKind::CaretEq,
            RawToken::LtLtEq => TokenKind::LtLtEq,
            RawToken::GtGtEq => TokenKind::GtGtEq,

            // Delimiters
            RawToken::LBrace => TokenKind::LBrace,
            RawToken::RBrace => TokenKind::RBrace,
            RawToken::LParen => TokenKind::LParen,
            RawToken::RParen => TokenKind::RParen,
            RawToken::LBracket => TokenKind::LBracket,
            RawToken::RBracket => TokenKind::RBracket,
            RawToken::Colon => TokenKind::Colon,
            RawToken::Semi => TokenKind::Semi,
            RawToken::Comma => TokenKind::Comma,

            // Literals - parse the values
            RawToken::DecInt => {
                let (digits, suffix) = split_int_suffix(slice);
                let value = digits.parse::<u64>().map_err(|_| LexError::invalid_number(start, end))?;
                int_token(value, suffix, slice, start, end)?
            }
            RawToken::HexInt => {
                let (digits, suffix) = split_int_suffix(slice);
                let value = u64::from_str_radix(&digits[2..], 16)
                    .map_err(|_| LexError::invalid_number(start, end))?;
                int_token(value, suffix, slice, start, end)?
            }
            RawToken::DecFloat => {
                let (digits, suffix) = split_float_suffix(slice);
                let value = digits.parse::<f64>().map_err(|_| LexError::invalid_number(start, end))?;
                float_token(value, suffix, slice, start, end)?
            }
            RawToken::HexFloat => {
                // Suffixes only follow an exponent, which never ends in a hex letter.
                let (digits, suffix) = if slice.contains(['p', 'P']) {
                    split_float_suffix(slice)
                } else {
                    (slice, None)
                };
                let value = parse_hex_float(&digits[2..]).ok_or(LexError::invalid_number(start, end))?;
                float_token(value, suffix, slice, start, end)?
            }
            RawToken::String => {
                let inner = &slice[1..slice.len() - 1]; // Remove quotes
                TokenKind::String(parse_string(inner, start)?)
            }
            RawToken::Ident => TokenKind::Ident(slice.to_string()),

            // These are skipped by logos, but we list them for completeness
            RawToken::LineComment | RawToken::BlockComment => {
                unreachable!("comments are skipped")
            }
        })
    }
}

/// Largest finite `f16`.
const F16_MAX: f64 = 65504.0;

/// Suffixed literals must fit their type; unsuffixed ones fit a 64-bit
/// signed integer. Literals carry no sign, so `i` allows up to `i32::MAX`.
fn int_token(
    value: u64,
    suffix: Option<NumberSuffix>,
    slice: &str,
    start: usize,
    end: usize,
) -> Result<TokenKind, LexError> {
    let (max, ty) = match suffix {
        Some(NumberSuffix::Int) => (i32::MAX as u64, "Integer"),
        Some(NumberSuffix::Uint) => (u64::from(u32::MAX), "UnsignedInteger"),
        _ => (i64::MAX as u64, "an abstract integer"),
    };
    if value > max {
        return Err(LexError::number_out_of_range(slice, ty, start, end));
    }
    Ok(TokenKind::Int { value, suffix })
}

fn float_token(
    value: f64,
    suffix: Option<NumberSuffix>,
    slice: &str,
    start: usize,
    end: usize,
) -> Result<TokenKind, LexError> {
    if !value.is_finite() {
        return Err(LexError::invalid_number(start, end));
    }
    match suffix {
        Some(NumberSuffix::Half) if value > F16_MAX => {
            return Err(LexError::number_out_of_range(slice, "Float16", start, end))
        }
        Some(NumberSuffix::Float) if value > f64::from(f32::MAX) => {
            return Err(LexError::number_out_of_range(slice, "Float", start, end))
        }
        _ => {}
    }
    Ok(TokenKind::Float { value, suffix })
}

/// Split an `i`/`u` suffix from an integer literal.
fn split_int_suffix(s: &str) -> (&str, Option<NumberSuffix>) {
    if let Some(digits) = s.strip_suffix('i') {
        (digits, Some(NumberSuffix::Int))
    } else if let Some(digits) = s.strip_suffix('u') {
        (digits, Some(NumberSuffix::Uint))
    } else {
        (s, None)
    }
}

/// Split an `f`/`h` suffix from a float literal.
fn split_float_suffix(s: &str) -> (&str, Option<NumberSuffix>) {
    if let Some(digits) = s.strip_suffix('f') {
        (digits, Some(NumberSuffix::Float))
    } else if let Some(digits) = s.strip_suffix('h') {
        (digits, Some(NumberSuffix::Half))
    } else {
        (s, None)
    }
}

/// Parse the part of a hex float after `0x`: `mantissa[.fraction][p[+-]exp]`.
fn parse_hex_float(s: &str) -> Option<f64> {
    let (mantissa, exponent) = match s.find(['p', 'P']) {
        Some(i) => (&s[..i], s[i + 1..].parse::<i32>().ok()?),
        None => (s, 0),
    };
    let (whole, fraction) = mantissa.split_once('.').unwrap_or((mantissa, ""));

    let mut value = 0.0f64;
    for c in whole.chars() {
        value = value * 16.0 + f64::from(c.to_digit(16)?);
    }
    let mut scale = 1.0 / 16.0;
    for c in fraction.chars() {
        value += f64::from(c.to_digit(16)?) * scale;
        scale /= 16.0;
    }
    Some(value * 2f64.powi(exponent))
}

/// Parse a string literal (handling escape sequences).
fn parse_string(s: &str, pos: usize) -> Result<String, LexError> {
    let mut result = String::new();
    let mut chars = s.chars();

    while let Some(c) = chars.next() {
        if c == '\\' {
            result.push(match chars.next() {
                Some('n') => '\n',
                Some('r') => '\r',
                Some('t') => '\t',
                Some('\\') => '\\',
                Some('0') => '\0',
                Some('"') => '"',
                _ => return Err(LexError::invalid_escape(pos)),
            });
        } else {
            result.push(c);
        }
    }

    Ok(result)
}

/// A lexer error with location and friendly message.
#[derive(Debug, Clone)]
pub struct LexError {
    pub span: Span,
    pub message: String,
    pub hint: Option<String>,
}

impl std::fmt::Display for LexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for LexError {}

impl LexError {
    fn unexpected_char(ch: char, pos: usize) -> Self {
        Self {
            span: Span::new(pos, pos + ch.len_utf8()),
            message: format!("Unexpected character '{}'", ch),
            hint: None,
        }
    }

    fn unterminated_comment(start: usize, end: usize) -> Self {
        Self {
            span: Span::new(start, end),
            message: "Unterminated block comment".to_string(),
            hint: Some("Add a closing '*/'".to_string()),
        }
    }

    fn invalid_escape(pos: usize) -> Self {
        Self {
            span: Span::new(pos, pos + 1),
            message: "Invalid escape sequence".to_string(),
            hint: Some("Valid: \\n \\r \\t \\\\ \\0 \\\"".to_string()),
        }
    }

    fn invalid_number(start: usize, end: usize) -> Self {
        Self {
            span: Span::new(start, end),
            message: "Invalid number".to_string(),
            hint: None,
        }
    }

    fn number_out_of_range(literal: &str, ty: &str, start: usize, end: usize) -> Self {
        Self {
            span: Span::new(start, end),
            message: format!("Number '{}' does not fit in {}", literal, ty),
            hint: Some("Use a smaller value or a wider suffix".to_string()),
        }
    }

    fn reserved_word(word: &str, start: usize, end: usize) -> Self {
        Self {
            span: Span::new(start, end),
            message: format!("'{}' is a reserved word", word),
            hint: Some("Reserved words cannot be used as names".to_string()),
        }
    }
}
