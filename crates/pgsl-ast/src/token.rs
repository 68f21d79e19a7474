// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Token definitions for the lexer.

use crate::Span;

/// A token produced by the lexer.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

/// Type suffix on a numeric literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumberSuffix {
    /// `i`
    Int,
    /// `u`
    Uint,
    /// `f`
    Float,
    /// `h`
    Half,
}

impl NumberSuffix {
    pub fn as_str(self) -> &'static str {
        match self {
            NumberSuffix::Int => "i",
            NumberSuffix::Uint => "u",
            NumberSuffix::Float => "f",
            NumberSuffix::Half => "h",
        }
    }
}

/// The kind of token.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Literals
    Int { value: u64, suffix: Option<NumberSuffix> },
    Float { value: f64, suffix: Option<NumberSuffix> },
    String(String),
    Bool(bool),

    // Identifier
    Ident(String),

    // Keywords
    Alias,
    Enum,
    Struct,
    Function,
    Const,
    Let,
    Storage,
    Uniform,
    Workgroup,
    Private,
    Param,
    If,
    Else,
    Switch,
    Case,
    Default,
    For,
    While,
    Do,
    Break,
    Continue,
    Return,
    Discard,
    New,

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Eq,
    EqEq,
    BangEq,
    Lt,
    Gt,
    LtEq,
    GtEq,
    AmpAmp,
    PipePipe,
    Bang,
    Dot,
    Amp,          // &
    Pipe,         // |
    Caret,        // ^
    Tilde,        // ~
    LtLt,         // <<
    GtGt,         // >>
    PlusPlus,     // ++
    MinusMinus,   // --
    PlusEq,       // +=
    MinusEq,      // -=
    StarEq,       // *=
    SlashEq,      // /=
    PercentEq,    // %=
    AmpEq,        // &=
    PipeEq,       // |=
    CaretEq,      // ^=
    LtLtEq,       // <<=
    GtGtEq,       // >>=

    /// A `<` confirmed to open a template list after a type name.
    TemplateListStart,

    // Delimiters
    LBrace,
    RBrace,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Colon,
    Semi,
    Comma,

    // Special
    Eof,
}

impl TokenKind {
    /// Returns a human-readable name for this token kind.
    pub fn display_name(&self) -> &'static str {
        match self {
            // Literals
            TokenKind::Int { .. } => "a number",
            TokenKind::Float { .. } => "a number",
            TokenKind::String(_) => "a string",
            TokenKind::Bool(_) => "'true' or 'false'",

            // Identifier
            TokenKind::Ident(_) => "a name",

            // Keywords
            TokenKind::Alias => "'alias'",
            TokenKind::Enum => "'enum'",
            TokenKind::Struct => "'struct'",
            TokenKind::Function => "'function'",
            TokenKind::Const => "'const'",
            TokenKind::Let => "'let'",
            TokenKind::Storage => "'storage'",
            TokenKind::Uniform => "'uniform'",
            TokenKind::Workgroup => "'workgroup'",
            TokenKind::Private => "'private'",
            TokenKind::Param => "'param'",
            TokenKind::If => "'if'",
            TokenKind::Else => "'else'",
            TokenKind::Switch => "'switch'",
            TokenKind::Case => "'case'",
            TokenKind::Default => "'default'",
            TokenKind::For => "'for'",
            TokenKind::While => "'while'",
            TokenKind::Do => "'do'",
            TokenKind::Break => "'break'",
            TokenKind::Continue => "'continue'",
            TokenKind::Return => "'return'",
            TokenKind::Discard => "'discard'",
            TokenKind::New => "'new'",

            // Operators
            TokenKind::Plus => "'+'",
            TokenKind::Minus => "'-'",
            TokenKind::Star => "'*'",
            TokenKind::Slash => "'/'",
            TokenKind::Percent => "'%'",
            TokenKind::Eq => "'='",
            TokenKind::EqEq => "'=='",
            TokenKind::BangEq => "'!='",
            TokenKind::Lt => "'<'",
            TokenKind::Gt => "'>'",
            TokenKind::LtEq => "'<='",
            TokenKind::GtEq => "'>='",
            TokenKind::AmpAmp => "'&&'",
            TokenKind::PipePipe => "'||'",
            TokenKind::Bang => "'!'",
            TokenKind::Dot => "'.'",
            TokenKind::Amp => "'&'",
            TokenKind::Pipe => "'|'",
            TokenKind::Caret => "'^'",
            TokenKind::Tilde => "'~'",
            TokenKind::LtLt => "'<<'",
            TokenKind::GtGt => "'>>'",
            TokenKind::PlusPlus => "'++'",
            TokenKind::MinusMinus => "'--'",
            TokenKind::PlusEq => "'+='",
            TokenKind::MinusEq => "'-='",
            TokenKind::StarEq => "'*='",
            TokenKind::SlashEq => "'/='",
            TokenKind::PercentEq => "'%='",
            TokenKind::AmpEq => "'&='",
            TokenKind::PipeEq => "'|='",
            TokenKind::CaretEq => "'^='",
            TokenKind::LtLtEq => "'<<='",
            TokenKind::GtGtEq => "'>>='",
            TokenKind::TemplateListStart => "'<'",

            // Delimiters
            TokenKind::LBrace => "'{'",
            TokenKind::RBrace => "'}'",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::LBracket => "'['",
            TokenKind::RBracket => "']'",
            TokenKind::Colon => "':'",
            TokenKind::Semi => "';'",
            TokenKind::Comma => "','",

            TokenKind::Eof => "end of file",
        }
    }

    /// Keywords that open a module-scope variable declaration.
    pub fn is_module_variable_keyword(&self) -> bool {
        matches!(
            self,
            TokenKind::Const
                | TokenKind::Storage
                | TokenKind::Uniform
                | TokenKind::Workgroup
                | TokenKind::Private
                | TokenKind::Param
        )
    }
}
