//! Compiled rule tables produced by [`LexerBuilder::build`](super::builder::LexerBuilder::build).

use super::{LexError, Lexer, Token};
use regex::bytes::Regex;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

/// Invoked once a token rule's pattern matches. May mutate the token, return
/// a replacement to emit, return `None` to consume silently, and may reach
/// into the owning lexer to change the state stack or line counter.
pub type TokenAction = Rc<dyn Fn(&mut Token, &mut Lexer) -> Option<Token>>;

/// Invoked once an ignore rule's pattern matches, for side effects only
/// (state stack changes). The matched span itself is never emitted.
pub type IgnoreAction = Rc<dyn Fn(&mut Lexer)>;

/// Invoked when no ignore or token rule matches at the cursor. May call
/// [`Lexer::skip`] to advance past the bad input and returns a `LexError`
/// to yield, or `None` to suppress it.
pub type ErrorAction = Rc<dyn Fn(&mut LexError, &mut Lexer) -> Option<LexError>>;

/// Whether a state's rules replace or extend `INITIAL`'s.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Inclusive,
    Exclusive,
}

pub struct TokenRule {
    pub name: String,
    pub pattern: Regex,
    pub action: TokenAction,
    pub order: usize,
}

pub enum IgnoreSpec {
    Pattern(Regex),
    Chars(HashSet<char>),
}

pub struct IgnoreRule {
    pub spec: IgnoreSpec,
    pub action: Option<IgnoreAction>,
    pub order: usize,
}

pub struct ErrorRule {
    pub action: ErrorAction,
}

pub struct CompiledState {
    pub name: String,
    pub mode: Mode,
    pub token_rules: Vec<TokenRule>,
    pub ignore_rules: Vec<IgnoreRule>,
    pub error_rule: Option<ErrorRule>,
}

/// Immutable, `Rc`-shared tables produced by a successful `build()`. Cloning
/// a `Lexer` to re-run it over new input is O(1): only this handle is shared.
pub struct LexerTables {
    pub token_names: HashSet<String>,
    pub states: HashMap<String, CompiledState>,
    pub initial: String,
}

impl LexerTables {
    pub fn state(&self, name: &str) -> Option<&CompiledState> {
        self.states.get(name)
    }
}
