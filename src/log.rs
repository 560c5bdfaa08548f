//! Opt-in leveled debug logging, settable once per engine instance.

use std::fmt::{Display, Formatter};

/// Logging verbosity assigned to a [`Lexer`](crate::lexer::Lexer) or parser
/// engine. Printed only under `cfg(debug_assertions)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Log<T> {
    None,
    Default(T),
    Success(T),
    Result(T),
    Verbose(T),
}

impl<T> Log<T> {
    pub fn order(&self) -> u8 {
        match self {
            Log::None => 0,
            Log::Default(_) => 1,
            Log::Success(_) => 2,
            Log::Result(_) => 3,
            Log::Verbose(_) => 4,
        }
    }
}

impl<T: Display> Display for Log<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Log::None => Ok(()),
            Log::Default(s) | Log::Success(s) | Log::Result(s) | Log::Verbose(s) => {
                write!(f, "{}", s)
            }
        }
    }
}
