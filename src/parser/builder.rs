//! Accumulates productions and compiles them into a [`Parser`] against a
//! chosen engine.

use super::grammar::{parse_alternatives, Atom, Grammar, Production, EPSILON};
use super::{new_earley, new_rd, Engine, NodeValue, Parser};
use crate::error::{ConfigError, ConfigErrorKind};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

struct PendingProduction<V> {
    head: String,
    body_string: String,
    action: super::grammar::Action<V>,
}

/// Builds a [`Parser`] from a token-name set and a list of `head : body`
/// productions, in the declarative style of a grammar file rather than a
/// hand-written recursive descent.
pub struct ParserBuilder<V> {
    engine: Engine,
    token_names: HashSet<String>,
    productions: Vec<PendingProduction<V>>,
}

impl<V: NodeValue> Default for ParserBuilder<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: NodeValue> ParserBuilder<V> {
    pub fn new() -> Self {
        Self {
            engine: Engine::RecursiveDescent,
            token_names: HashSet::new(),
            productions: Vec::new(),
        }
    }

    pub fn engine(mut self, engine: Engine) -> Self {
        self.engine = engine;
        self
    }

    pub fn tokens<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.token_names.extend(names.into_iter().map(Into::into));
        self
    }

    /// Register one or more alternatives (`body_string` may contain `|`) for
    /// a nonterminal. `action` receives `children` with `children[0]` the
    /// pre-filled output slot and `children[1..]` the body's child values in
    /// left-to-right order; it runs once per alternative per call.
    pub fn production<F>(mut self, head: impl Into<String>, body_string: impl Into<String>, action: F) -> Self
    where
        F: Fn(&mut Vec<V>) + 'static,
    {
        self.productions.push(PendingProduction {
            head: head.into(),
            body_string: body_string.into(),
            action: Rc::new(action),
        });
        self
    }

    pub fn build(self) -> Result<Parser<V>, ConfigError> {
        if self.token_names.contains(EPSILON) {
            return Err(ConfigError::new(
                ConfigErrorKind::GrammarTerminalCollision,
                format!("{:?} is reserved and cannot be declared as a token name", EPSILON),
            ));
        }
        if self.productions.is_empty() {
            return Err(ConfigError::new(
                ConfigErrorKind::UndefinedNonterminal,
                "a grammar needs at least one production",
            ));
        }

        let heads: HashSet<String> = self.productions.iter().map(|p| p.head.clone()).collect();
        for head in &heads {
            if self.token_names.contains(head) {
                return Err(ConfigError::new(
                    ConfigErrorKind::GrammarTerminalCollision,
                    format!("{:?} is declared both as a token and as a nonterminal", head),
                ));
            }
            if head == EPSILON {
                return Err(ConfigError::new(
                    ConfigErrorKind::GrammarTerminalCollision,
                    format!("{:?} is reserved and cannot be declared as a nonterminal", EPSILON),
                ));
            }
        }

        let mut token_ids: HashMap<String, u32> = HashMap::new();
        for name in &self.token_names {
            let next_id = token_ids.len() as u32;
            token_ids.entry(name.clone()).or_insert(next_id);
        }

        let start = self.productions[0].head.clone();
        let mut productions: Vec<Production<V>> = Vec::new();

        for pending in &self.productions {
            for atoms in parse_alternatives(&pending.body_string) {
                let mut body = Vec::with_capacity(atoms.len());
                for atom in atoms {
                    body.push(self.classify(atom, &heads, &token_ids)?);
                }
                productions.push(Production {
                    head: pending.head.clone(),
                    body,
                    action: Rc::clone(&pending.action),
                });
            }
        }

        let grammar = Rc::new(Grammar::new(productions, start, token_ids));

        if matches!(self.engine, Engine::RecursiveDescent) {
            check_not_left_recursive(&grammar)?;
        }

        Ok(match self.engine {
            Engine::RecursiveDescent => new_rd(grammar),
            Engine::Earley => new_earley(grammar),
        })
    }

    fn classify(&self, atom: Atom, heads: &HashSet<String>, token_ids: &HashMap<String, u32>) -> Result<Atom, ConfigError> {
        let name = match &atom {
            Atom::Nonterminal(name) => name.clone(),
            Atom::Epsilon | Atom::Token(_) => return Ok(atom),
        };
        if name == EPSILON {
            return Ok(Atom::Epsilon);
        }
        if let Some(&id) = token_ids.get(&name) {
            return Ok(Atom::Token(id));
        }
        if heads.contains(&name) {
            return Ok(Atom::Nonterminal(name));
        }
        Err(ConfigError::new(
            ConfigErrorKind::UndefinedNonterminal,
            format!("{:?} is neither a declared token nor the head of a production", name),
        ))
    }
}

/// Static left-recursion check for the recursive-descent engine: reject any
/// nonterminal that can reach itself through a chain of leftmost atoms
/// without having consumed a token. Only the first atom of each alternative
/// matters, since a leftmost-recursive call happens before anything else in
/// the body is parsed.
fn check_not_left_recursive<V>(grammar: &Grammar<V>) -> Result<(), ConfigError> {
    let mut first_nonterminal: HashMap<&str, Vec<&str>> = HashMap::new();
    for production in &grammar.productions {
        if let Some(Atom::Nonterminal(name)) = production.body.first() {
            first_nonterminal.entry(&production.head).or_default().push(name);
        }
    }

    for start in first_nonterminal.keys() {
        let mut visiting = HashSet::new();
        if reaches_self(start, start, &first_nonterminal, &mut visiting) {
            return Err(ConfigError::new(
                ConfigErrorKind::LeftRecursive,
                format!("{:?} is left-recursive", start),
            ));
        }
    }
    Ok(())
}

fn reaches_self<'a>(
    origin: &'a str,
    current: &'a str,
    edges: &HashMap<&'a str, Vec<&'a str>>,
    visiting: &mut HashSet<&'a str>,
) -> bool {
    let Some(neighbors) = edges.get(current) else {
        return false;
    };
    for &next in neighbors {
        if next == origin {
            return true;
        }
        if visiting.insert(next) && reaches_self(origin, next, edges, visiting) {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Token;

    #[derive(Debug, Clone, PartialEq)]
    enum Val {
        Epsilon,
        Leaf(String),
    }

    impl NodeValue for Val {
        fn epsilon() -> Self {
            Val::Epsilon
        }
        fn from_token(token: &Token) -> Self {
            Val::Leaf(token.value.clone())
        }
    }

    #[test]
    fn rejects_undefined_nonterminal() {
        let err = ParserBuilder::<Val>::new()
            .tokens(["A"])
            .production("S", "A B", |_: &mut Vec<Val>| {})
            .build()
            .unwrap_err();
        assert_eq!(err.kind, ConfigErrorKind::UndefinedNonterminal);
    }

    #[test]
    fn rejects_token_nonterminal_collision() {
        let err = ParserBuilder::<Val>::new()
            .tokens(["S"])
            .production("S", "S", |_: &mut Vec<Val>| {})
            .build()
            .unwrap_err();
        assert_eq!(err.kind, ConfigErrorKind::GrammarTerminalCollision);
    }

    #[test]
    fn rejects_epsilon_as_token_name() {
        let err = ParserBuilder::<Val>::new()
            .tokens(["EPSILON"])
            .production("S", "EPSILON", |_: &mut Vec<Val>| {})
            .build()
            .unwrap_err();
        assert_eq!(err.kind, ConfigErrorKind::GrammarTerminalCollision);
    }

    #[test]
    fn accepts_indirect_left_recursion_as_recursive() {
        let err = ParserBuilder::<Val>::new()
            .engine(Engine::RecursiveDescent)
            .tokens(["N"])
            .production("A", "B", |_: &mut Vec<Val>| {})
            .production("B", "A N", |_: &mut Vec<Val>| {})
            .production("B", "N", |_: &mut Vec<Val>| {})
            .build()
            .unwrap_err();
        assert_eq!(err.kind, ConfigErrorKind::LeftRecursive);
    }

    #[test]
    fn non_left_recursive_grammar_builds() {
        let parser = ParserBuilder::<Val>::new()
            .engine(Engine::RecursiveDescent)
            .tokens(["N", "PLUS"])
            .production("E", "N PLUS E", |_: &mut Vec<Val>| {})
            .production("E", "N", |_: &mut Vec<Val>| {})
            .build();
        assert!(parser.is_ok());
    }
}
