// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Lexer for PGSL.
//!
//! Tokenizes source code into a stream of tokens for the parser, marking
//! every `<` that opens a template list.

mod lexer;
mod template;

pub use lexer::{LexError, Lexer};
pub use template::is_template_list_start;
