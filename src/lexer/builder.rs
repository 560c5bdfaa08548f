//! Eager, validating construction of a [`Lexer`](super::Lexer).

use super::rule::{
    CompiledState, ErrorAction, ErrorRule, IgnoreAction, IgnoreRule, IgnoreSpec, LexerTables, Mode,
    TokenAction, TokenRule,
};
use super::{LexError, Lexer, Token, INITIAL};
use crate::error::{ConfigError, ConfigErrorKind};
use regex::bytes::Regex;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

struct PendingTokenRule {
    state: Option<String>,
    name: String,
    pattern: String,
    order: Option<usize>,
    action: TokenAction,
}

struct PendingIgnoreRule {
    state: Option<String>,
    pattern: Option<String>,
    one_of: Option<String>,
    order: Option<usize>,
    action: Option<IgnoreAction>,
}

struct PendingErrorRule {
    state: Option<String>,
    action: ErrorAction,
}

/// Accumulates token names, states, and rules, then validates and compiles
/// them into an immutable [`LexerTables`] at [`build`](LexerBuilder::build).
#[derive(Default)]
pub struct LexerBuilder {
    token_names: Vec<String>,
    states: Vec<(String, Mode)>,
    token_rules: Vec<PendingTokenRule>,
    ignore_rules: Vec<PendingIgnoreRule>,
    error_rules: Vec<PendingErrorRule>,
    next_order: usize,
}

impl LexerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tokens<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.token_names.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn state(mut self, name: impl Into<String>, mode: Mode) -> Self {
        self.states.push((name.into(), mode));
        self
    }

    /// `state: None` means `INITIAL`. `name` is the token type this rule
    /// produces when its action emits a token. Validity of `name`, the
    /// pattern, and the target state is checked eagerly at `build()`.
    pub fn token_rule<F>(
        mut self,
        state: Option<&str>,
        name: impl Into<String>,
        pattern: impl Into<String>,
        order: Option<usize>,
        action: F,
    ) -> Self
    where
        F: Fn(&mut Token, &mut Lexer) -> Option<Token> + 'static,
    {
        let order = order.unwrap_or_else(|| self.take_order());
        self.token_rules.push(PendingTokenRule {
            state: state.map(str::to_string),
            name: name.into(),
            pattern: pattern.into(),
            order: Some(order),
            action: Rc::new(action),
        });
        self
    }

    /// Either `pattern` (a regex) or a literal character class may supply
    /// the match; use [`ignore_chars`](Self::ignore_chars) for the latter.
    pub fn ignore_rule(
        mut self,
        state: Option<&str>,
        pattern: impl Into<String>,
        action: Option<IgnoreAction>,
    ) -> Self {
        let order = self.take_order();
        self.ignore_rules.push(PendingIgnoreRule {
            state: state.map(str::to_string),
            pattern: Some(pattern.into()),
            one_of: None,
            order: Some(order),
            action,
        });
        self
    }

    pub fn ignore_chars(
        mut self,
        state: Option<&str>,
        chars: impl Into<String>,
        action: Option<IgnoreAction>,
    ) -> Self {
        let order = self.take_order();
        self.ignore_rules.push(PendingIgnoreRule {
            state: state.map(str::to_string),
            pattern: None,
            one_of: Some(chars.into()),
            order: Some(order),
            action,
        });
        self
    }

    pub fn error_rule<F>(mut self, state: Option<&str>, action: F) -> Self
    where
        F: Fn(&mut LexError, &mut Lexer) -> Option<LexError> + 'static,
    {
        self.error_rules.push(PendingErrorRule {
            state: state.map(str::to_string),
            action: Rc::new(action),
        });
        self
    }

    fn take_order(&mut self) -> usize {
        let order = self.next_order;
        self.next_order += 1;
        order
    }

    pub fn build(self) -> Result<Lexer, ConfigError> {
        let mut token_names: HashSet<String> = HashSet::new();
        for name in &self.token_names {
            if name.is_empty() {
                return Err(ConfigError::new(
                    ConfigErrorKind::UnknownTokenName,
                    "token names must be non-empty",
                ));
            }
            if !token_names.insert(name.clone()) {
                return Err(ConfigError::new(
                    ConfigErrorKind::DuplicateToken,
                    format!("token {:?} declared more than once", name),
                ));
            }
        }

        let mut state_modes: HashMap<String, Mode> = HashMap::new();
        for (name, mode) in &self.states {
            if name == INITIAL {
                return Err(ConfigError::new(
                    ConfigErrorKind::DuplicateState,
                    "INITIAL is an implicit default state and may not be redeclared",
                ));
            }
            if state_modes.insert(name.clone(), *mode).is_some() {
                return Err(ConfigError::new(
                    ConfigErrorKind::DuplicateState,
                    format!("state {:?} declared more than once", name),
                ));
            }
        }
        state_modes.insert(INITIAL.to_string(), Mode::Exclusive);

        // States referenced by a rule but never declared via `.state()` are
        // accepted as exclusive states with no rules of their own beyond
        // what that rule contributes; they behave like any other exclusive
        // state (including needing an error rule before they can be
        // entered safely).
        for name in self
            .token_rules
            .iter()
            .filter_map(|r| r.state.as_ref())
            .chain(self.ignore_rules.iter().filter_map(|r| r.state.as_ref()))
            .chain(self.error_rules.iter().filter_map(|r| r.state.as_ref()))
        {
            state_modes.entry(name.clone()).or_insert(Mode::Exclusive);
        }

        let mut states: HashMap<String, CompiledState> = state_modes
            .iter()
            .map(|(name, mode)| {
                (
                    name.clone(),
                    CompiledState {
                        name: name.clone(),
                        mode: *mode,
                        token_rules: Vec::new(),
                        ignore_rules: Vec::new(),
                        error_rule: None,
                    },
                )
            })
            .collect();

        for rule in self.token_rules {
            if !token_names.contains(&rule.name) {
                return Err(ConfigError::new(
                    ConfigErrorKind::UnknownTokenName,
                    format!("token rule produces unregistered token {:?}", rule.name),
                ));
            }
            let regex = compile_anchored(&rule.pattern)?;
            if regex.is_match(b"") {
                return Err(ConfigError::new(
                    ConfigErrorKind::EmptyPatternMatch,
                    format!("pattern for token {:?} matches the empty string", rule.name),
                ));
            }
            let state_name = rule.state.unwrap_or_else(|| INITIAL.to_string());
            let state = states.get_mut(&state_name).expect("state registered above");
            state.token_rules.push(TokenRule {
                name: rule.name,
                pattern: regex,
                action: rule.action,
                order: rule.order.unwrap(),
            });
        }

        for rule in self.ignore_rules {
            let spec = match (rule.pattern, rule.one_of) {
                (Some(pattern), None) => {
                    let regex = compile_anchored(&pattern)?;
                    if regex.is_match(b"") {
                        return Err(ConfigError::new(
                            ConfigErrorKind::EmptyPatternMatch,
                            "ignore rule pattern matches the empty string",
                        ));
                    }
                    IgnoreSpec::Pattern(regex)
                }
                (None, Some(chars)) => {
                    if chars.is_empty() {
                        return Err(ConfigError::new(
                            ConfigErrorKind::BadRegex,
                            "ignore rule character set must be non-empty",
                        ));
                    }
                    IgnoreSpec::Chars(chars.chars().collect())
                }
                (None, None) => {
                    return Err(ConfigError::new(
                        ConfigErrorKind::BadRegex,
                        "ignore rule must supply a pattern or a character set",
                    ))
                }
                (Some(_), Some(_)) => {
                    return Err(ConfigError::new(
                        ConfigErrorKind::BadRegex,
                        "ignore rule must supply exactly one of pattern or character set",
                    ))
                }
            };
            let state_name = rule.state.unwrap_or_else(|| INITIAL.to_string());
            let state = states.get_mut(&state_name).expect("state registered above");
            state.ignore_rules.push(IgnoreRule {
                spec,
                action: rule.action,
                order: rule.order.unwrap(),
            });
        }

        for rule in self.error_rules {
            let state_name = rule.state.unwrap_or_else(|| INITIAL.to_string());
            let state = states.get_mut(&state_name).expect("state registered above");
            if state.error_rule.is_some() {
                return Err(ConfigError::new(
                    ConfigErrorKind::DuplicateState,
                    format!("state {:?} already has an error rule", state_name),
                ));
            }
            state.error_rule = Some(ErrorRule { action: rule.action });
        }

        // Every exclusive state must have an error rule, checked eagerly at
        // build() rather than deferred to the first time the state is
        // entered — an exclusive state with no error rule can never recover
        // from unmatched input, so there is no useful lexer to construct.
        let mut missing_error_rule: Vec<&str> = states
            .iter()
            .filter(|(_, state)| state.mode == Mode::Exclusive && state.error_rule.is_none())
            .map(|(name, _)| name.as_str())
            .collect();
        missing_error_rule.sort_unstable();
        if let Some(name) = missing_error_rule.first() {
            return Err(ConfigError::new(
                ConfigErrorKind::MissingErrorRule,
                format!("exclusive state {:?} requires an error rule", name),
            ));
        }

        let tables = LexerTables {
            token_names,
            states,
            initial: INITIAL.to_string(),
        };
        Ok(Lexer::new(Rc::new(tables)))
    }
}

fn compile_anchored(pattern: &str) -> Result<Regex, ConfigError> {
    let anchored = if pattern.starts_with('^') {
        pattern.to_string()
    } else {
        format!("^(?:{})", pattern)
    };
    Regex::new(&anchored)
        .map_err(|err| ConfigError::new(ConfigErrorKind::BadRegex, format!("{}: {}", pattern, err)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_duplicate_token_names() {
        let err = LexerBuilder::new()
            .tokens(["A", "A"])
            .error_rule(None, |e, _| Some(e.clone()))
            .build()
            .unwrap_err();
        assert_eq!(err.kind, ConfigErrorKind::DuplicateToken);
    }

    #[test]
    fn rejects_empty_match_pattern() {
        let err = LexerBuilder::new()
            .tokens(["A"])
            .token_rule(None, "A", r"^a*", None, |t, _| Some(t.clone()))
            .error_rule(None, |e, _| Some(e.clone()))
            .build()
            .unwrap_err();
        assert_eq!(err.kind, ConfigErrorKind::EmptyPatternMatch);
    }

    #[test]
    fn requires_initial_error_rule() {
        let err = LexerBuilder::new().tokens(["A"]).build().unwrap_err();
        assert_eq!(err.kind, ConfigErrorKind::MissingErrorRule);
    }

    #[test]
    fn rejects_token_rule_for_unregistered_name() {
        let err = LexerBuilder::new()
            .tokens(["A"])
            .token_rule(None, "B", r"^b", None, |t, _| Some(t.clone()))
            .error_rule(None, |e, _| Some(e.clone()))
            .build()
            .unwrap_err();
        assert_eq!(err.kind, ConfigErrorKind::UnknownTokenName);
    }

    #[test]
    fn rejects_exclusive_state_missing_error_rule() {
        let err = LexerBuilder::new()
            .tokens(["A"])
            .state("other", Mode::Exclusive)
            .token_rule(Some("other"), "A", r"^a", None, |t, _| Some(t.clone()))
            .error_rule(None, |e, _| Some(e.clone()))
            .build()
            .unwrap_err();
        assert_eq!(err.kind, ConfigErrorKind::MissingErrorRule);
    }

    #[test]
    fn inclusive_state_does_not_need_its_own_error_rule() {
        let lexer = LexerBuilder::new()
            .tokens(["A"])
            .state("other", Mode::Inclusive)
            .token_rule(Some("other"), "A", r"^a", None, |t, _| Some(t.clone()))
            .error_rule(None, |e, _| Some(e.clone()))
            .build();
        assert!(lexer.is_ok());
    }
}
