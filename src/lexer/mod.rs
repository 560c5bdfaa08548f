//! A regex-driven lexer with named states, ordered token/ignore rules, and
//! a per-state error rule.
//!
//! Build one through [`LexerBuilder`](builder::LexerBuilder); run it by
//! calling [`Lexer::input`] followed by repeated [`Lexer::token`] calls, or
//! via [`Lexer::tokens`] / [`stream::TokenStream`] for a filtered adapter.

pub mod builder;
pub mod rule;
pub mod stream;

pub use builder::LexerBuilder;
pub use stream::TokenStream;

use crate::error::LexerStuck;
use crate::log::Log;
use crate::position::Position;
use once_cell::unsync::OnceCell;
use rule::{IgnoreSpec, LexerTables, Mode};
use std::rc::Rc;

pub const INITIAL: &str = "INITIAL";

/// A single emitted token: its declared name, the matched text, and where
/// in the input it started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub ty: String,
    pub value: String,
    pub lexpos: usize,
    pub lineno: usize,
}

impl Token {
    pub fn new(ty: impl Into<String>, value: impl Into<String>, lexpos: usize, lineno: usize) -> Self {
        Self {
            ty: ty.into(),
            value: value.into(),
            lexpos,
            lineno,
        }
    }
}

/// Carries the unmatched tail of input to an error rule, and optionally
/// travels onward as an in-band entry in the token stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexError {
    pub message: String,
    pub value: String,
    pub lexpos: usize,
    pub lineno: usize,
}

impl LexError {
    pub fn new(message: impl Into<String>, value: impl Into<String>, lexpos: usize, lineno: usize) -> Self {
        Self {
            message: message.into(),
            value: value.into(),
            lexpos,
            lineno,
        }
    }
}

/// One item pulled from the lexer: either a token or an in-band error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexItem {
    Token(Token),
    Error(LexError),
}

impl LexItem {
    pub fn is_error(&self) -> bool {
        matches!(self, LexItem::Error(_))
    }
}

/// A running lexical analyzer over one piece of input text.
///
/// Rule tables are immutable and `Rc`-shared; everything else here is
/// per-[`input`](Lexer::input) runtime state, reset on each call. Cloning a
/// `Lexer` is O(1) in the shared table (an `Rc::clone`) plus the cost of
/// copying its current run state; two independent cursors over the same
/// compiled rules need not repeat `build()`'s validation and regex
/// compilation.
#[derive(Clone)]
pub struct Lexer {
    tables: Rc<LexerTables>,
    text: Vec<u8>,
    lexpos: usize,
    lineno: usize,
    stack: Vec<String>,
    num_tokens: usize,
    debug: OnceCell<Log<&'static str>>,
}

impl Lexer {
    pub(crate) fn new(tables: Rc<LexerTables>) -> Self {
        Self {
            tables,
            text: Vec::new(),
            lexpos: 0,
            lineno: 1,
            stack: vec![INITIAL.to_string()],
            num_tokens: 0,
            debug: OnceCell::new(),
        }
    }

    /// Assign a debug logging level, printed under `cfg(debug_assertions)`.
    /// May only be set once; a second call is rejected.
    pub fn set_log(&mut self, level: Log<&'static str>) -> Result<(), String> {
        self.debug
            .set(level)
            .map_err(|level| format!("log level {} is already assigned", level))
    }

    fn log_level(&self) -> Log<&'static str> {
        self.debug.get().copied().unwrap_or(Log::None)
    }

    /// Bind new input text, resetting the cursor, line counter, state
    /// stack, and token counter.
    pub fn input(&mut self, text: impl Into<String>) {
        self.text = text.into().into_bytes();
        self.lexpos = 0;
        self.lineno = 1;
        self.stack = vec![INITIAL.to_string()];
        self.num_tokens = 0;
    }

    pub fn lexpos(&self) -> usize {
        self.lexpos
    }

    pub fn get_lineno(&self) -> usize {
        self.lineno
    }

    pub fn set_lineno(&mut self, n: usize) {
        self.lineno = n;
    }

    /// Number of non-error tokens emitted so far from the current input.
    pub fn num_tokens(&self) -> usize {
        self.num_tokens
    }

    /// Advance the cursor by `n` bytes without matching any rule. Used from
    /// inside token/error actions.
    pub fn skip(&mut self, n: usize) {
        self.lexpos = (self.lexpos + n).min(self.text.len());
    }

    fn current_state(&self) -> &str {
        self.stack.last().map(String::as_str).unwrap_or(INITIAL)
    }

    /// Replace the top of the state stack with `state`.
    pub fn begin(&mut self, state: impl Into<String>) {
        let state = state.into();
        if let Some(top) = self.stack.last_mut() {
            *top = state;
        } else {
            self.stack.push(state);
        }
    }

    /// Push `state` onto the stack.
    pub fn push(&mut self, state: impl Into<String>) {
        self.stack.push(state.into());
    }

    /// Pop the current state, returning to the previous one. A no-op when
    /// only the base state remains.
    pub fn pop(&mut self) {
        if self.stack.len() > 1 {
            self.stack.pop();
        }
    }

    fn position(&self, pointer: usize) -> Position {
        Position::of(&self.text, pointer)
    }

    fn advance_lineno(&mut self, matched: &[u8]) {
        let breaks = matched.iter().filter(|b| **b == b'\n').count();
        if breaks > 0 {
            self.lineno += breaks;
        }
    }

    /// Produce the next token or in-band error, or `None` once the input is
    /// fully consumed.
    pub fn token(&mut self) -> Result<Option<LexItem>, LexerStuck> {
        loop {
            if self.lexpos >= self.text.len() {
                return Ok(None);
            }

            let state_name = self.current_state().to_string();

            // Ignore phase: iterate ignore rules in combined declaration order.
            if let Some((action, matched_len)) = self.try_ignore(&state_name) {
                let start = self.lexpos;
                self.lexpos += matched_len;
                self.advance_lineno(&self.text[start..self.lexpos].to_vec());
                if let Some(action) = action {
                    action(self);
                }
                continue;
            }

            // Token phase: first matching rule wins (leftmost-first, not longest-match).
            if let Some((rule_name, action, matched_len)) = self.try_token(&state_name) {
                let start = self.lexpos;
                let lineno_before = self.lineno;
                let matched_text =
                    String::from_utf8_lossy(&self.text[start..start + matched_len]).into_owned();
                self.lexpos += matched_len;
                self.advance_lineno(&self.text[start..self.lexpos].to_vec());

                let mut token = Token::new(rule_name, matched_text, start, lineno_before);
                let emitted = action(&mut token, self);
                if let Some(tok) = &emitted {
                    if !self.tables.token_names.contains(&tok.ty) {
                        panic!(
                            "token rule produced unknown token name {:?}; this should have been rejected at build()",
                            tok.ty
                        );
                    }
                }
                if let Some(tok) = emitted {
                    self.num_tokens += 1;
                    #[cfg(debug_assertions)]
                    if self.log_level().order() >= Log::Success(()).order() {
                        println!(
                            "[{}; token]: {:?} at {}",
                            self.log_level(),
                            tok.ty,
                            self.position(tok.lexpos)
                        );
                    }
                    return Ok(Some(LexItem::Token(tok)));
                }
                continue;
            }

            // Error phase: no ignore or token rule matched at the cursor. A
            // state entered without an error rule (declared exclusive but
            // never given one, or never declared at all) is as stuck as a
            // rule that fails to advance the cursor.
            let error_rule = match self
                .tables
                .state(self.current_state())
                .and_then(|s| s.error_rule.as_ref())
            {
                Some(rule) => rule,
                None => {
                    return Err(LexerStuck {
                        pos: self.lexpos,
                        position: self.position(self.lexpos),
                    })
                }
            };
            let action = Rc::clone(&error_rule.action);

            let before = self.lexpos;
            let tail = String::from_utf8_lossy(&self.text[before..]).into_owned();
            let mut err = LexError::new(String::new(), tail, before, self.lineno);
            let result = action(&mut err, self);
            if self.lexpos == before {
                let stuck = LexerStuck {
                    pos: before,
                    position: self.position(before),
                };
                return Err(stuck);
            }
            if let Some(err) = result {
                return Ok(Some(LexItem::Error(err)));
            }
        }
    }

    /// Drain every remaining item from this input. Not restartable without
    /// another [`input`](Lexer::input) call.
    pub fn tokens(&mut self) -> Result<Vec<LexItem>, LexerStuck> {
        let mut out = Vec::new();
        while let Some(item) = self.token()? {
            out.push(item);
        }
        Ok(out)
    }

    fn active_rule_names(&self, state_name: &str) -> Vec<&str> {
        let mut names = vec![state_name];
        if state_name != INITIAL {
            if let Some(state) = self.tables.state(state_name) {
                if state.mode == Mode::Inclusive {
                    names.push(INITIAL);
                }
            }
        }
        names
    }

    fn try_ignore(&self, state_name: &str) -> Option<(Option<rule::IgnoreAction>, usize)> {
        let remaining = &self.text[self.lexpos..];
        if remaining.is_empty() {
            return None;
        }
        let mut candidates: Vec<&rule::IgnoreRule> = Vec::new();
        for name in self.active_rule_names(state_name) {
            if let Some(state) = self.tables.state(name) {
                candidates.extend(state.ignore_rules.iter());
            }
        }
        candidates.sort_by_key(|r| r.order);

        for rule in candidates {
            match &rule.spec {
                IgnoreSpec::Pattern(re) => {
                    if let Some(m) = re.find(remaining) {
                        if m.start() == 0 && m.end() > 0 {
                            return Some((rule.action.clone(), m.end()));
                        }
                    }
                }
                IgnoreSpec::Chars(set) => {
                    let ch = remaining[0] as char;
                    if set.contains(&ch) {
                        return Some((rule.action.clone(), 1));
                    }
                }
            }
        }
        None
    }

    fn try_token(&self, state_name: &str) -> Option<(String, rule::TokenAction, usize)> {
        let remaining = &self.text[self.lexpos..];
        let mut candidates: Vec<&rule::TokenRule> = Vec::new();
        for name in self.active_rule_names(state_name) {
            if let Some(state) = self.tables.state(name) {
                candidates.extend(state.token_rules.iter());
            }
        }
        candidates.sort_by_key(|r| r.order);

        for rule in candidates {
            if let Some(m) = rule.pattern.find(remaining) {
                if m.start() == 0 && m.end() > 0 {
                    return Some((rule.name.clone(), Rc::clone(&rule.action), m.end()));
                }
            }
        }
        None
    }
}
