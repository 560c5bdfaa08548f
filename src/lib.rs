//! A lex/yacc style toolkit: a regex-driven lexer with named states, plus a
//! recursive-descent and an Earley parser engine, wired together through a
//! builder API instead of reflecting over host-language globals.
//!
//! - [`lexer`]: tokenize text against ordered regex rules, with a state
//!   stack for things like nested comments or template literals.
//! - [`parser`]: turn a token stream into an application-defined tree,
//!   either with a memoized top-down parser ([`parser::rd`]) or a
//!   chart-based Earley parser ([`parser::earley`]) that also accepts
//!   left-recursive and ambiguous grammars.

pub mod error;
pub mod lexer;
pub mod log;
pub mod parser;
pub mod position;

pub use error::{ConfigError, ConfigErrorKind, InternalError, LexerStuck, ParseFailure};
pub use lexer::{LexError, LexItem, Lexer, LexerBuilder, Token, TokenStream};
pub use log::Log;
pub use parser::{Engine, NodeValue, Parser, ParserBuilder};
pub use position::Position;
