//! Productions, atoms, and the grammar table built from a `bodyString`.

use std::collections::HashMap;
use std::rc::Rc;

pub const EPSILON: &str = "EPSILON";

/// One element of a production body: a terminal (by its interned id), a
/// nonterminal (by name), or the empty-body marker.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Atom {
    Token(u32),
    Nonterminal(String),
    Epsilon,
}

/// A production's semantic action. `children[0]` is a pre-filled output
/// slot (via [`NodeValue::epsilon`](super::NodeValue::epsilon)); the action
/// sets it from `children[1..]`, the child results in body order.
pub type Action<V> = Rc<dyn Fn(&mut Vec<V>)>;

pub struct Production<V> {
    pub head: String,
    pub body: Vec<Atom>,
    pub action: Action<V>,
}

/// The grammar's declaration-ordered production table, indexed by head.
pub struct Grammar<V> {
    pub productions: Vec<Production<V>>,
    heads: HashMap<String, Vec<usize>>,
    nonterminal_ids: HashMap<String, u32>,
    token_ids: HashMap<String, u32>,
    pub start: String,
}

impl<V> Grammar<V> {
    /// `token_ids` is the token-name-to-id table interned once at
    /// `ParserBuilder::build()` (§3: tokens are interned the same as
    /// nonterminals, so neither engine compares token names as strings at
    /// every atom it visits during a parse).
    pub fn new(productions: Vec<Production<V>>, start: String, token_ids: HashMap<String, u32>) -> Self {
        let mut heads: HashMap<String, Vec<usize>> = HashMap::new();
        for (i, p) in productions.iter().enumerate() {
            heads.entry(p.head.clone()).or_default().push(i);
        }
        let mut nonterminal_ids = HashMap::new();
        for head in heads.keys() {
            let next_id = nonterminal_ids.len() as u32;
            nonterminal_ids.entry(head.clone()).or_insert(next_id);
        }
        Self {
            productions,
            heads,
            nonterminal_ids,
            token_ids,
            start,
        }
    }

    /// Production indices for `head`, in declaration order. Empty if `head`
    /// is not a nonterminal of this grammar.
    pub fn productions_for(&self, head: &str) -> &[usize] {
        self.heads.get(head).map_or(&[], |v| v.as_slice())
    }

    pub fn is_nonterminal(&self, name: &str) -> bool {
        self.heads.contains_key(name)
    }

    /// The dense id assigned to a nonterminal, used as half of the Packrat
    /// memo key `(id, position)`.
    pub fn nonterminal_id(&self, name: &str) -> u32 {
        *self
            .nonterminal_ids
            .get(name)
            .unwrap_or_else(|| panic!("{:?} is not a nonterminal of this grammar", name))
    }

    /// The id interned for a declared token name, or `None` if `name` was
    /// never declared to this grammar. Engines call this once per input
    /// token at the start of a parse, then compare ids for the rest of it.
    pub fn token_id(&self, name: &str) -> Option<u32> {
        self.token_ids.get(name).copied()
    }
}

/// Parse a `HEAD ":" RHS`-style right-hand side into one atom list per
/// alternative. `RHS = ALT ("|" ALT)*`, `ALT = ATOM*` (whitespace
/// separated); an empty `ALT` denotes epsilon.
pub fn parse_alternatives(rhs: &str) -> Vec<Vec<Atom>> {
    rhs.split('|')
        .map(|alt| {
            let atoms: Vec<&str> = alt.split_whitespace().collect();
            if atoms.is_empty() {
                vec![Atom::Epsilon]
            } else {
                atoms.iter().map(|a| classify_raw(a)).collect()
            }
        })
        .collect()
}

/// Atoms are classified against the token/nonterminal sets, and tokens
/// interned to their id, later (see `ParserBuilder::classify`) once both
/// sets are fully known; this just captures the raw name for now.
fn classify_raw(name: &str) -> Atom {
    Atom::Nonterminal(name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_alternatives_and_atoms() {
        let alts = parse_alternatives("a b | c");
        assert_eq!(alts.len(), 2);
        assert_eq!(alts[0].len(), 2);
        assert_eq!(alts[1].len(), 1);
    }

    #[test]
    fn empty_alternative_is_epsilon() {
        let alts = parse_alternatives("");
        assert_eq!(alts, vec![vec![Atom::Epsilon]]);
    }
}
