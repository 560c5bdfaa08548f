//! The crate's error taxonomy.
//!
//! Configuration errors are returned from builders; lexical errors travel
//! in-band through the token stream; parse failures are returned, never
//! thrown; and [`InternalError`] marks an invariant violation that indicates
//! a bug in the engine rather than in the user's grammar.

use crate::position::Position;
use std::fmt::{self, Display, Formatter};

/// The closed set of ways a [`LexerBuilder`](crate::lexer::LexerBuilder) or
/// [`ParserBuilder`](crate::parser::ParserBuilder) can reject a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigErrorKind {
    DuplicateToken,
    DuplicateState,
    MissingErrorRule,
    BadRegex,
    EmptyPatternMatch,
    UnknownTokenName,
    UndefinedNonterminal,
    GrammarTerminalCollision,
    LeftRecursive,
}

/// A build-time configuration error, fatal to the builder's `build()` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    pub kind: ConfigErrorKind,
    pub detail: String,
}

impl ConfigError {
    pub fn new(kind: ConfigErrorKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "ConfigError::{:?}: {}", self.kind, self.detail)
    }
}

impl std::error::Error for ConfigError {}

/// Raised from [`Lexer::token`](crate::lexer::Lexer::token) when an error
/// rule returns without advancing the cursor. This is the one runtime
/// condition the engine refuses to loop on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexerStuck {
    pub pos: usize,
    pub position: Position,
}

impl Display for LexerStuck {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "lexer stuck at byte {} ({}): error rule did not advance the cursor",
            self.pos, self.position
        )
    }
}

impl std::error::Error for LexerStuck {}

/// Returned (never thrown) from a parser's `parse()` when the grammar does
/// not accept the token stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseFailure {
    pub last_token_index: usize,
    pub position: Option<Position>,
}

impl Display for ParseFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.position {
            Some(position) => write!(
                f,
                "parse failed at token {} ({})",
                self.last_token_index, position
            ),
            None => write!(
                f,
                "parse failed at token {} (end of input)",
                self.last_token_index
            ),
        }
    }
}

impl std::error::Error for ParseFailure {}

/// An invariant violation inside the engine itself: a state referenced by
/// name that was never registered, a missing error rule on a state that is
/// actually entered, an Earley item that completes with no cached value,
/// and the like. These are bugs, not malformed user input, and are the only
/// condition this crate allows to panic at runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InternalError(pub String);

impl Display for InternalError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "internal error: {}", self.0)
    }
}

impl std::error::Error for InternalError {}
