//! # Common Types

use core::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// An integer id assigned by a [`crate::vocab::Vocabulary`].
pub type TokenId = usize;

cfg_if::cfg_if! {
    if #[cfg(feature = "ahash")] {
        /// Type Alias for hash maps in this crate.
        pub type UTHashMap<K, V> = ahash::AHashMap<K, V>;

        /// Type Alias for hash sets in this crate.
        pub type UTHashSet<V> = ahash::AHashSet<V>;
    } else {
        /// Type Alias for hash maps in this crate.
        pub type UTHashMap<K, V> = std::collections::HashMap<K, V>;

        /// Type Alias for hash sets in this crate.
        pub type UTHashSet<V> = std::collections::HashSet<V>;
    }
}

/// One tokenized value: a single id, or a list of ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    /// Output of an atomic tokenizer.
    Atom(TokenId),

    /// Output of a list tokenizer.
    List(Vec<TokenId>),
}

impl Cell {
    /// The single id, if this is an atomic cell.
    pub fn as_atom(&self) -> Option<TokenId> {
        match self {
            Cell::Atom(id) => Some(*id),
            Cell::List(_) => None,
        }
    }

    /// The id list, if this is a list cell.
    pub fn as_list(&self) -> Option<&[TokenId]> {
        match self {
            Cell::Atom(_) => None,
            Cell::List(ids) => Some(ids),
        }
    }

    /// Number of ids in the cell; atoms count as one.
    pub fn len(&self) -> usize {
        match self {
            Cell::Atom(_) => 1,
            Cell::List(ids) => ids.len(),
        }
    }

    /// True for an empty list.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<TokenId> for Cell {
    fn from(id: TokenId) -> Self {
        Cell::Atom(id)
    }
}

impl From<Vec<TokenId>> for Cell {
    fn from(ids: Vec<TokenId>) -> Self {
        Cell::List(ids)
    }
}

impl Display for Cell {
    fn fmt(
        &self,
        f: &mut Formatter<'_>,
    ) -> core::fmt::Result {
        match self {
            Cell::Atom(id) => write!(f, "{id}"),
            Cell::List(ids) => write!(f, "{ids:?}"),
        }
    }
}

/// A packed row: `{feature name: value}`.
pub type Sample = UTHashMap<String, Cell>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_accessors() {
        let atom = Cell::from(3);
        assert_eq!(atom.as_atom(), Some(3));
        assert_eq!(atom.as_list(), None);
        assert_eq!(atom.len(), 1);

        let list = Cell::from(vec![1, 2]);
        assert_eq!(list.as_atom(), None);
        assert_eq!(list.as_list(), Some(&[1, 2][..]));
        assert!(!list.is_empty());
        assert!(Cell::List(vec![]).is_empty());
    }

    #[test]
    fn test_cell_json_shape() {
        let cells = vec![Cell::Atom(1), Cell::List(vec![2, 3])];
        let text = serde_json::to_string(&cells).unwrap();
        assert_eq!(text, "[1,[2,3]]");

        let back: Vec<Cell> = serde_json::from_str(&text).unwrap();
        assert_eq!(back, cells);
    }
}
