//! A memoized (Packrat-style) top-down parser: C4.

use super::grammar::{Atom, Grammar};
use super::NodeValue;
use crate::error::ParseFailure;
use crate::lexer::Token;
use std::collections::HashMap;
use std::rc::Rc;

/// Top-down parser over a grammar with no left recursion (rejected at
/// build time). Each `(nonterminal, position)` pair is computed at most
/// once per [`parse`](RdParser::parse) call.
pub struct RdParser<V> {
    grammar: Rc<Grammar<V>>,
}

type Memo<V> = HashMap<(u32, usize), Option<(V, usize)>>;

impl<V: NodeValue> RdParser<V> {
    pub fn new(grammar: Rc<Grammar<V>>) -> Self {
        Self { grammar }
    }

    pub fn parse(&self, tokens: &[Token]) -> Result<V, ParseFailure> {
        let mut memo: Memo<V> = HashMap::new();
        let token_ids: Vec<Option<u32>> = tokens.iter().map(|t| self.grammar.token_id(&t.ty)).collect();
        let start = Atom::Nonterminal(self.grammar.start.clone());
        match self.parse_atom(&start, 0, tokens, &token_ids, &mut memo) {
            Some((tree, next)) if next == tokens.len() => Ok(tree),
            Some((_, next)) => Err(ParseFailure {
                last_token_index: next,
                position: None,
            }),
            None => Err(ParseFailure {
                last_token_index: 0,
                position: None,
            }),
        }
    }

    fn parse_atom(
        &self,
        atom: &Atom,
        i: usize,
        tokens: &[Token],
        token_ids: &[Option<u32>],
        memo: &mut Memo<V>,
    ) -> Option<(V, usize)> {
        match atom {
            Atom::Epsilon => Some((V::epsilon(), i)),
            Atom::Token(id) => {
                if i < tokens.len() && token_ids[i] == Some(*id) {
                    Some((V::from_token(&tokens[i]), i + 1))
                } else {
                    None
                }
            }
            Atom::Nonterminal(name) => {
                let key = (self.grammar.nonterminal_id(name), i);
                if let Some(cached) = memo.get(&key) {
                    return cached.clone();
                }
                let mut result = None;
                for &prod_idx in self.grammar.productions_for(name) {
                    if let Some(hit) = self.parse_sequence(prod_idx, i, tokens, token_ids, memo) {
                        result = Some(hit);
                        break;
                    }
                }
                memo.insert(key, result.clone());
                result
            }
        }
    }

    fn parse_sequence(
        &self,
        prod_idx: usize,
        i: usize,
        tokens: &[Token],
        token_ids: &[Option<u32>],
        memo: &mut Memo<V>,
    ) -> Option<(V, usize)> {
        let production = &self.grammar.productions[prod_idx];
        let mut result = vec![V::epsilon()];
        let mut pos = i;
        for atom in &production.body {
            let (value, next) = self.parse_atom(atom, pos, tokens, token_ids, memo)?;
            result.push(value);
            pos = next;
        }
        (production.action)(&mut result);
        Some((result[0].clone(), pos))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::builder::ParserBuilder;
    use crate::parser::Engine;

    #[derive(Debug, Clone, PartialEq)]
    enum Val {
        Epsilon,
        Leaf(String),
        List(Vec<Val>),
    }

    impl NodeValue for Val {
        fn epsilon() -> Self {
            Val::Epsilon
        }
        fn from_token(token: &Token) -> Self {
            Val::Leaf(token.value.clone())
        }
    }

    fn tok(ty: &str, value: &str) -> Token {
        Token::new(ty, value, 0, 1)
    }

    #[test]
    fn parses_simple_sequence() {
        let parser = ParserBuilder::<Val>::new()
            .engine(Engine::RecursiveDescent)
            .tokens(["A", "B"])
            .production("S", "A B", |children: &mut Vec<Val>| {
                children[0] = Val::List(vec![children[1].clone(), children[2].clone()]);
            })
            .build()
            .unwrap();

        let tokens = vec![tok("A", "a"), tok("B", "b")];
        let result = parser.parse(&tokens).unwrap();
        assert_eq!(
            result,
            Val::List(vec![Val::Leaf("a".to_string()), Val::Leaf("b".to_string())])
        );
    }

    #[test]
    fn rejects_left_recursive_grammar() {
        let err = ParserBuilder::<Val>::new()
            .engine(Engine::RecursiveDescent)
            .tokens(["PLUS", "N"])
            .production("E", "E PLUS E | N", |_: &mut Vec<Val>| {})
            .build()
            .unwrap_err();
        assert_eq!(err.kind, crate::error::ConfigErrorKind::LeftRecursive);
    }

    #[test]
    fn reports_parse_failure_on_leftover_tokens() {
        let parser = ParserBuilder::<Val>::new()
            .engine(Engine::RecursiveDescent)
            .tokens(["A"])
            .production("S", "A", |_: &mut Vec<Val>| {})
            .build()
            .unwrap();
        let tokens = vec![tok("A", "a"), tok("A", "a")];
        let err = parser.parse(&tokens).unwrap_err();
        assert_eq!(err.last_token_index, 1);
    }
}
