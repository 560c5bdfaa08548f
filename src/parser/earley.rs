//! A chart-based Earley parser: C5. Accepts left-recursive and ambiguous
//! grammars that the recursive-descent engine rejects or mishandles.

use super::grammar::{Atom, Grammar};
use super::NodeValue;
use crate::error::ParseFailure;
use crate::lexer::Token;
use once_cell::unsync::OnceCell;
use std::collections::HashSet;
use std::rc::Rc;

/// One chart entry: a production, how far its dot has advanced, the column
/// it started in, and the child values accumulated so far (one per atom
/// already crossed by the dot).
struct Item<V> {
    prod_idx: usize,
    dot: usize,
    start: usize,
    tree: Vec<V>,
    result: OnceCell<V>,
}

impl<V> Item<V> {
    fn new(prod_idx: usize, start: usize) -> Self {
        Self {
            prod_idx,
            dot: 0,
            start,
            tree: Vec::new(),
            result: OnceCell::new(),
        }
    }

    fn key(&self) -> (usize, usize, usize) {
        (self.prod_idx, self.dot, self.start)
    }
}

pub struct EarleyParser<V> {
    grammar: Rc<Grammar<V>>,
}

impl<V: NodeValue> EarleyParser<V> {
    pub fn new(grammar: Rc<Grammar<V>>) -> Self {
        Self { grammar }
    }

    pub fn parse(&self, tokens: &[Token]) -> Result<V, ParseFailure> {
        let n = tokens.len();
        let token_ids: Vec<Option<u32>> = tokens.iter().map(|t| self.grammar.token_id(&t.ty)).collect();
        let mut chart: Vec<Vec<Rc<Item<V>>>> = (0..=n).map(|_| Vec::new()).collect();
        let mut seen: Vec<HashSet<(usize, usize, usize)>> = (0..=n).map(|_| HashSet::new()).collect();

        for &prod_idx in self.grammar.productions_for(&self.grammar.start) {
            self.add_item(&mut chart, &mut seen, 0, Item::new(prod_idx, 0));
        }

        for k in 0..=n {
            let mut i = 0;
            while i < chart[k].len() {
                let item = Rc::clone(&chart[k][i]);
                let production = &self.grammar.productions[item.prod_idx];

                match production.body.get(item.dot) {
                    None => {
                        // Complete: advance every item in `item.start` waiting on this head.
                        let head = production.head.clone();
                        let start = item.start;
                        let value = self.evaluate(&item);
                        let waiting: Vec<Rc<Item<V>>> = chart[start]
                            .iter()
                            .filter(|w| {
                                let wp = &self.grammar.productions[w.prod_idx];
                                wp.body.get(w.dot) == Some(&Atom::Nonterminal(head.clone()))
                            })
                            .cloned()
                            .collect();
                        for w in waiting {
                            let mut advanced = Item::new(w.prod_idx, w.start);
                            advanced.dot = w.dot + 1;
                            advanced.tree = w.tree.clone();
                            advanced.tree.push(value.clone());
                            self.add_item(&mut chart, &mut seen, k, advanced);
                        }
                    }
                    Some(Atom::Epsilon) => {
                        let mut advanced = Item::new(item.prod_idx, item.start);
                        advanced.dot = item.dot + 1;
                        advanced.tree = item.tree.clone();
                        advanced.tree.push(V::epsilon());
                        self.add_item(&mut chart, &mut seen, k, advanced);
                    }
                    Some(Atom::Nonterminal(name)) => {
                        // Predict.
                        for &prod_idx in self.grammar.productions_for(name) {
                            self.add_item(&mut chart, &mut seen, k, Item::new(prod_idx, k));
                        }
                    }
                    Some(Atom::Token(id)) => {
                        // Scan.
                        if k < n && token_ids[k] == Some(*id) {
                            let mut advanced = Item::new(item.prod_idx, item.start);
                            advanced.dot = item.dot + 1;
                            advanced.tree = item.tree.clone();
                            advanced.tree.push(V::from_token(&tokens[k]));
                            self.add_item(&mut chart, &mut seen, k + 1, advanced);
                        }
                    }
                }
                i += 1;
            }
        }

        for item in &chart[n] {
            let production = &self.grammar.productions[item.prod_idx];
            if item.dot == production.body.len() && item.start == 0 && production.head == self.grammar.start {
                return Ok(self.evaluate(item));
            }
        }

        Err(ParseFailure {
            last_token_index: n,
            position: None,
        })
    }

    fn evaluate(&self, item: &Rc<Item<V>>) -> V {
        item.result
            .get_or_init(|| {
                let production = &self.grammar.productions[item.prod_idx];
                let mut slots = vec![V::epsilon()];
                slots.extend(item.tree.iter().cloned());
                (production.action)(&mut slots);
                slots[0].clone()
            })
            .clone()
    }

    fn add_item(
        &self,
        chart: &mut [Vec<Rc<Item<V>>>],
        seen: &mut [HashSet<(usize, usize, usize)>],
        column: usize,
        item: Item<V>,
    ) {
        let key = item.key();
        if seen[column].insert(key) {
            chart[column].push(Rc::new(item));
        }
    }
}
