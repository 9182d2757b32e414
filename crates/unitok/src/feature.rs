//! # Features
//!
//! A [`Feature`] binds a tokenizer to a source [`Column`] and an export name,
//! together with the truncation policy applied to list outputs and the
//! processing-order bookkeeping of the dataset that owns it.

use core::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::{
    errors::{UTResult, UnitokError},
    tokenizer::TokenizerRef,
    types::TokenId,
};

/// Persisted name of the row-index column.
pub const INDEX_COLUMN: &str = "<index>";

/// The source of a feature's raw values.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Column {
    /// The row position in the input table.
    Index,

    /// A named input column.
    Named(String),
}

impl Column {
    /// True for the row-index column.
    pub fn is_index(&self) -> bool {
        matches!(self, Column::Index)
    }

    /// The persisted column name.
    pub fn as_str(&self) -> &str {
        match self {
            Column::Index => INDEX_COLUMN,
            Column::Named(name) => name,
        }
    }
}

impl From<String> for Column {
    fn from(name: String) -> Self {
        if name == INDEX_COLUMN {
            Column::Index
        } else {
            Column::Named(name)
        }
    }
}

impl From<&str> for Column {
    fn from(name: &str) -> Self {
        name.to_string().into()
    }
}

impl From<Column> for String {
    fn from(column: Column) -> Self {
        match column {
            Column::Index => INDEX_COLUMN.to_string(),
            Column::Named(name) => name,
        }
    }
}

impl Display for Column {
    fn fmt(
        &self,
        f: &mut Formatter<'_>,
    ) -> core::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The part of a token list a feature keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSlice {
    /// Everything.
    Full,

    /// The first `n` ids.
    Head(usize),

    /// The last `n` ids.
    Tail(usize),
}

impl TokenSlice {
    /// Slice policy for a truncate value.
    ///
    /// `None` and `0` keep everything; `n > 0` keeps the head; `n < 0` keeps the tail.
    pub fn from_truncate(truncate: Option<i64>) -> Self {
        match truncate.unwrap_or(0) {
            0 => TokenSlice::Full,
            n if n > 0 => TokenSlice::Head(n.unsigned_abs() as usize),
            n => TokenSlice::Tail(n.unsigned_abs() as usize),
        }
    }

    /// Apply to an id list.
    pub fn apply(
        &self,
        ids: &[TokenId],
    ) -> Vec<TokenId> {
        match *self {
            TokenSlice::Full => ids.to_vec(),
            TokenSlice::Head(n) => ids[..n.min(ids.len())].to_vec(),
            TokenSlice::Tail(n) => ids[ids.len().saturating_sub(n)..].to_vec(),
        }
    }
}

/// Optional arguments when declaring a feature.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeatureOptions {
    /// Source column; defaults to the tokenizer's vocabulary name.
    pub column: Option<Column>,

    /// Export name; defaults to the column name.
    pub name: Option<String>,

    /// Truncation for list tokenizers; `0` keeps the full list.
    pub truncate: Option<i64>,

    /// Marks the row-identity feature.
    pub key: bool,
}

impl FeatureOptions {
    /// All defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the source column.
    pub fn with_column(
        mut self,
        column: impl Into<Column>,
    ) -> Self {
        self.column = Some(column.into());
        self
    }

    /// Set the export name.
    pub fn with_name(
        mut self,
        name: impl Into<String>,
    ) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the truncation.
    pub fn with_truncate(
        mut self,
        truncate: i64,
    ) -> Self {
        self.truncate = Some(truncate);
        self
    }

    /// Set the key flag.
    pub fn with_key(
        mut self,
        key: bool,
    ) -> Self {
        self.key = key;
        self
    }
}

/// Manifest entry for a feature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureDescriptor {
    /// Export name.
    pub name: String,

    /// Source column, or [`INDEX_COLUMN`].
    pub column: Column,

    /// Tokenizer id.
    pub tokenizer: String,

    /// Truncation; `None` for atomic features.
    pub truncate: Option<i64>,

    /// Processing order; `-1` until tokenized.
    pub order: i64,

    /// Row-identity flag.
    #[serde(default)]
    pub key: bool,

    /// Longest stored list.
    #[serde(default)]
    pub max_len: usize,
}

/// A tokenizer bound to a column and an export name.
#[derive(Debug, Clone)]
pub struct Feature {
    tokenizer: TokenizerRef,
    column: Column,
    name: String,
    truncate: Option<i64>,
    order: i64,
    key: bool,
    max_len: usize,
    from_union: bool,
    generation: u64,
}

impl Feature {
    /// Declare a feature, applying the column/name/truncate defaults.
    ///
    /// A truncate on an atomic tokenizer is ignored with a warning; a
    /// list tokenizer without one keeps full lists.
    pub fn new(
        tokenizer: TokenizerRef,
        options: FeatureOptions,
    ) -> UTResult<Self> {
        let FeatureOptions {
            column,
            name,
            truncate,
            key,
        } = options;

        let column = column.unwrap_or_else(|| Column::Named(tokenizer.vocab().name().to_string()));
        let name = match (name, &column) {
            (Some(name), _) => name,
            (None, Column::Named(column)) => column.clone(),
            (None, Column::Index) => {
                return Err(UnitokError::InvalidFeature(
                    "name must be set when column is the row index".to_string(),
                ));
            }
        };

        let truncate = if tokenizer.return_list() {
            Some(truncate.unwrap_or(0))
        } else {
            if let Some(truncate) = truncate {
                log::warn!(
                    "truncate ({truncate}) will be ignored for atomic value, as tokenizer {} does not return list",
                    tokenizer.tokenizer_id()
                );
            }
            None
        };

        Ok(Self {
            tokenizer,
            column,
            name,
            truncate,
            order: -1,
            key,
            max_len: 0,
            from_union: false,
            generation: 0,
        })
    }

    /// Rebuild a persisted feature around its (already restored) tokenizer.
    pub fn restore(
        descriptor: FeatureDescriptor,
        tokenizer: TokenizerRef,
    ) -> Self {
        let generation = tokenizer.vocab().generation();
        Self {
            tokenizer,
            column: descriptor.column,
            name: descriptor.name,
            truncate: descriptor.truncate,
            order: descriptor.order,
            key: descriptor.key,
            max_len: descriptor.max_len,
            from_union: false,
            generation,
        }
    }

    /// The tokenizer.
    pub fn tokenizer(&self) -> &TokenizerRef {
        &self.tokenizer
    }

    /// The source column.
    pub fn column(&self) -> &Column {
        &self.column
    }

    /// The export name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The truncation; `None` for atomic features.
    pub fn truncate(&self) -> Option<i64> {
        self.truncate
    }

    /// The slice applied to list outputs.
    pub fn slice(&self) -> TokenSlice {
        TokenSlice::from_truncate(self.truncate)
    }

    /// Processing order; `-1` until tokenized.
    pub fn order(&self) -> i64 {
        self.order
    }

    /// Is this the row-identity feature?
    pub fn is_key(&self) -> bool {
        self.key
    }

    /// Longest stored list.
    pub fn max_len(&self) -> usize {
        self.max_len
    }

    /// True when the feature was attached by a soft union and has no local data.
    pub fn from_union(&self) -> bool {
        self.from_union
    }

    /// True once tokenized.
    pub fn is_processed(&self) -> bool {
        self.order >= 0
    }

    /// True for list features.
    pub fn return_list(&self) -> bool {
        self.truncate.is_some()
    }

    /// Vocabulary generation the stored ids were minted under.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Has the vocabulary been rebuilt since this feature was tokenized?
    pub fn is_stale(&self) -> bool {
        self.is_processed() && self.generation != self.tokenizer.vocab().generation()
    }

    pub(crate) fn mark_processed(
        &mut self,
        order: i64,
        max_len: usize,
    ) {
        self.order = order;
        self.max_len = max_len;
        self.generation = self.tokenizer.vocab().generation();
    }

    pub(crate) fn set_truncate(
        &mut self,
        truncate: i64,
        max_len: usize,
    ) {
        self.truncate = Some(truncate);
        self.max_len = max_len;
    }

    /// A non-key copy under a new export name.
    pub(crate) fn replicate(
        &self,
        name: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            key: false,
            ..self.clone()
        }
    }

    /// The error for reading ids minted under an older vocabulary.
    pub(crate) fn stale_error(&self) -> UnitokError {
        UnitokError::StaleVocabulary {
            feature: self.name.clone(),
            vocab: self.tokenizer.vocab().name().to_string(),
        }
    }

    /// A copy for a merged registry.
    ///
    /// `tokenizer` may sit on another instance of the vocabulary, so the copy
    /// is re-stamped with that instance's generation. A stale source cannot
    /// be re-stamped and fails with [`UnitokError::StaleVocabulary`].
    pub(crate) fn merged(
        &self,
        tokenizer: TokenizerRef,
        order: i64,
        from_union: bool,
    ) -> UTResult<Self> {
        if self.is_stale() {
            return Err(self.stale_error());
        }
        let generation = tokenizer.vocab().generation();
        Ok(Self {
            tokenizer,
            order,
            key: false,
            from_union,
            generation,
            ..self.clone()
        })
    }

    /// Manifest entry.
    pub fn descriptor(&self) -> FeatureDescriptor {
        FeatureDescriptor {
            name: self.name.clone(),
            column: self.column.clone(),
            tokenizer: self.tokenizer.tokenizer_id().to_string(),
            truncate: self.truncate,
            order: self.order,
            key: self.key,
            max_len: self.max_len,
        }
    }
}

impl Display for Feature {
    fn fmt(
        &self,
        f: &mut Formatter<'_>,
    ) -> core::fmt::Result {
        write!(f, "Feature({} => {})", self.column, self.name)?;
        if self.key {
            write!(f, " [PK]")?;
        }
        Ok(())
    }
}
