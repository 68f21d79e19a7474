// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Build-in declarations available to every module.

use pgsl_ast::token::Token;
use pgsl_lexer::{LexError, Lexer};

/// Enums used as attribute arguments.
pub const PRELUDE: &str = r#"
enum AccessMode { Read = "read", Write = "write", ReadWrite = "read_write" }
enum InterpolationType { Perspective = "perspective", Linear = "linear", Flat = "flat" }
enum InterpolationSampling { Center = "center", Centroid = "centroid", Sample = "sample" }
"#;

/// Tokens of [`PRELUDE`], ready for [`crate::Parser::with_prelude`].
pub fn prelude_tokens() -> Result<Vec<Token>, LexError> {
    Lexer::new(PRELUDE).tokenize()
}
