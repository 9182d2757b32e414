//! # Vocabulary
//!
//! A named, bidirectional `token <-> id` mapping with dense ids `[0, len)`.
//!
//! Vocabularies are shared between tokenizers, features, and datasets through
//! [`VocabRef`] handles; the mapping itself lives behind a [`RefCell`], so
//! growth through any handle is visible through all of them.

use core::{
    cell::{Ref, RefCell},
    fmt::{Display, Formatter},
};
use std::{
    path::{Path, PathBuf},
    rc::Rc,
};

use serde::{Deserialize, Serialize};

use crate::{
    errors::{UTResult, UnitokError},
    types::{TokenId, UTHashMap},
    vocab::{
        counter::{CountBound, Counter},
        io::{VOCAB_EXTENSION, has_line_break, load_token_list_path, save_token_list_path},
    },
};

/// Shared handle to a [`Vocabulary`].
pub type VocabRef = Rc<Vocabulary>;

/// How two vocabularies are compared when merging or unioning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VocabEquality {
    /// Same name and same size.
    #[default]
    NameAndSize,

    /// Same name and identical ordered token lists.
    Content,
}

/// Fallback for unseen tokens in a frozen vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OovToken<'a> {
    /// Use this id; must be in range.
    Id(TokenId),

    /// Use the id of this (already present) token.
    Token(&'a str),
}

/// Manifest entry for a vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabularyDescriptor {
    /// The vocabulary name.
    pub name: String,

    /// The number of tokens at save time.
    #[serde(default)]
    pub vocab_size: usize,
}

#[derive(Debug, Clone)]
struct VocabState {
    o2i: UTHashMap<String, TokenId>,
    i2o: Vec<String>,
    editable: bool,
    reserved: usize,
    counter: Counter,
    generation: u64,
}

impl Default for VocabState {
    fn default() -> Self {
        Self {
            o2i: Default::default(),
            i2o: Vec::new(),
            editable: true,
            reserved: 0,
            counter: Counter::default(),
            generation: 0,
        }
    }
}

impl VocabState {
    fn insert(
        &mut self,
        token: String,
    ) -> TokenId {
        let index = self.i2o.len();
        self.o2i.insert(token.clone(), index);
        self.i2o.push(token);
        index
    }

    fn rebuild(
        &mut self,
        tokens: Vec<String>,
    ) {
        self.o2i.clear();
        self.i2o.clear();
        for token in tokens {
            if !self.o2i.contains_key(&token) {
                self.insert(token);
            }
        }
        self.generation += 1;
    }
}

/// A saved copy of a vocabulary's state; see [`Vocabulary::rollback`].
#[derive(Debug)]
pub(crate) struct VocabCheckpoint(VocabState);

/// Bidirectional object-to-index mapping with an edit lock and frequency counting.
#[derive(Debug)]
pub struct Vocabulary {
    name: String,
    state: RefCell<VocabState>,
}

impl Vocabulary {
    /// Create an empty, editable vocabulary.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: RefCell::new(VocabState::default()),
        }
    }

    /// Create an empty, editable vocabulary behind a shared handle.
    pub fn shared(name: impl Into<String>) -> VocabRef {
        Rc::new(Self::new(name))
    }

    /// Create a vocabulary from an ordered token list.
    pub fn from_tokens<I, S>(
        name: impl Into<String>,
        tokens: I,
    ) -> UTResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let vocab = Self::new(name);
        vocab.extend(tokens)?;
        Ok(vocab)
    }

    /// The vocabulary name; unique within a dataset.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The number of tokens.
    pub fn len(&self) -> usize {
        self.state.borrow().i2o.len()
    }

    /// True if no tokens have been assigned.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bumped every time the id space is rebuilt (trim, load).
    ///
    /// Ids minted under one generation are meaningless under another.
    pub fn generation(&self) -> u64 {
        self.state.borrow().generation
    }

    pub(crate) fn checkpoint(&self) -> VocabCheckpoint {
        VocabCheckpoint(self.state.borrow().clone())
    }

    /// Discard every change since `checkpoint`, counts included.
    pub(crate) fn rollback(
        &self,
        checkpoint: VocabCheckpoint,
    ) {
        let VocabCheckpoint(state) = checkpoint;
        log::debug!(
            "rollback vocab {}: {} -> {}",
            self.name,
            self.len(),
            state.i2o.len()
        );
        *self.state.borrow_mut() = state;
    }

    /// Look up or mint the id for `token`.
    ///
    /// Fails with [`UnitokError::VocabNotEditable`] for unseen tokens while frozen.
    pub fn append(
        &self,
        token: &str,
    ) -> UTResult<TokenId> {
        self.resolve(token, None)
    }

    /// Look up or mint the id for `token`, falling back to `oov` while frozen.
    pub fn append_or(
        &self,
        token: &str,
        oov: OovToken<'_>,
    ) -> UTResult<TokenId> {
        self.resolve(token, Some(oov))
    }

    fn resolve(
        &self,
        token: &str,
        oov: Option<OovToken<'_>>,
    ) -> UTResult<TokenId> {
        let mut state = self.state.borrow_mut();

        let index = match state.o2i.get(token) {
            Some(&index) => index,
            None => {
                if has_line_break(token) {
                    return Err(UnitokError::InvalidToken {
                        token: token.to_string(),
                    });
                }

                if state.editable {
                    state.insert(token.to_string())
                } else {
                    match oov {
                        None => {
                            return Err(UnitokError::VocabNotEditable {
                                vocab: self.name.clone(),
                                token: token.to_string(),
                            });
                        }
                        Some(OovToken::Id(index)) if index < state.i2o.len() => index,
                        Some(OovToken::Id(index)) => {
                            return Err(UnitokError::InvalidOov {
                                vocab: self.name.clone(),
                                token: index.to_string(),
                            });
                        }
                        Some(OovToken::Token(oov)) => match state.o2i.get(oov) {
                            Some(&index) => index,
                            None => {
                                return Err(UnitokError::InvalidOov {
                                    vocab: self.name.clone(),
                                    token: oov.to_string(),
                                });
                            }
                        },
                    }
                }
            }
        };

        state.counter.record(index);
        Ok(index)
    }

    /// Element-wise [`append`](Self::append).
    pub fn extend<I, S>(
        &self,
        tokens: I,
    ) -> UTResult<Vec<TokenId>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        tokens
            .into_iter()
            .map(|token| self.append(token.as_ref()))
            .collect()
    }

    /// The id of `token`, without minting or counting.
    pub fn get_id(
        &self,
        token: &str,
    ) -> Option<TokenId> {
        self.state.borrow().o2i.get(token).copied()
    }

    /// The token for `id`.
    pub fn get_token(
        &self,
        id: TokenId,
    ) -> Option<String> {
        self.state.borrow().i2o.get(id).cloned()
    }

    /// All tokens, in id order.
    pub fn tokens(&self) -> Vec<String> {
        self.state.borrow().i2o.clone()
    }

    /// Borrow the ordered token list.
    pub fn borrow_tokens(&self) -> Ref<'_, [String]> {
        Ref::map(self.state.borrow(), |state| state.i2o.as_slice())
    }

    /// Is the vocabulary accepting new tokens?
    pub fn is_editable(&self) -> bool {
        self.state.borrow().editable
    }

    /// Allow new tokens.
    pub fn allow_edit(&self) -> &Self {
        self.state.borrow_mut().editable = true;
        self
    }

    /// Freeze the vocabulary against growth.
    pub fn deny_edit(&self) -> &Self {
        self.state.borrow_mut().editable = false;
        self
    }

    /// The number of leading tokens which always survive [`trim`](Self::trim).
    pub fn reserved(&self) -> usize {
        self.state.borrow().reserved
    }

    /// Mark the first `reserved` tokens as always surviving [`trim`](Self::trim).
    pub fn set_reserved(
        &self,
        reserved: usize,
    ) -> &Self {
        self.state.borrow_mut().reserved = reserved;
        self
    }

    /// Start counting token resolutions.
    pub fn activate_counter(&self) -> &Self {
        self.state.borrow_mut().counter.activate();
        self
    }

    /// Stop counting token resolutions.
    pub fn deactivate_counter(&self) -> &Self {
        self.state.borrow_mut().counter.deactivate();
        self
    }

    /// Drop all recorded counts.
    pub fn reset_counter(&self) -> &Self {
        self.state.borrow_mut().counter.initialize();
        self
    }

    /// The recorded frequency of `id`.
    pub fn count(
        &self,
        id: TokenId,
    ) -> u64 {
        self.state.borrow().counter.count(id)
    }

    /// Rebuild keeping the reserved prefix and tokens counted `>= min_count` times.
    ///
    /// Survivors keep their relative order. Every id issued before the trim is
    /// invalidated; [`generation`](Self::generation) is bumped so stale data can
    /// be detected.
    pub fn trim(
        &self,
        min_count: u64,
    ) {
        let mut state = self.state.borrow_mut();

        let size = state.i2o.len();
        let reserved = state.reserved.min(size);
        let survivors = state
            .counter
            .trim(min_count)
            .into_iter()
            .filter(|&index| index >= reserved && index < size);

        let tokens = (0..reserved)
            .chain(survivors)
            .map(|index| state.i2o[index].clone())
            .collect::<Vec<_>>();

        log::debug!(
            "trim vocab {} (min_count={min_count}): {} -> {}",
            self.name,
            state.i2o.len(),
            tokens.len()
        );

        state.counter.deactivate();
        state.counter.initialize();
        state.rebuild(tokens);
    }

    /// Histogram of recorded frequencies; see [`Counter::summarize`].
    pub fn summarize(
        &self,
        base: u64,
    ) -> Vec<(CountBound, usize)> {
        self.state.borrow().counter.summarize(base)
    }

    /// Merge compatibility: same name and same size.
    pub fn equals(
        &self,
        other: &Vocabulary,
    ) -> bool {
        self.name == other.name && self.len() == other.len()
    }

    /// Strict compatibility: same name and identical ordered tokens.
    pub fn content_equals(
        &self,
        other: &Vocabulary,
    ) -> bool {
        if core::ptr::eq(self, other) {
            return true;
        }
        self.name == other.name && *self.borrow_tokens() == *other.borrow_tokens()
    }

    /// Compare under the given policy.
    pub fn equals_with(
        &self,
        other: &Vocabulary,
        equality: VocabEquality,
    ) -> bool {
        match equality {
            VocabEquality::NameAndSize => self.equals(other),
            VocabEquality::Content => self.content_equals(other),
        }
    }

    /// The vocab file name: `{name}.vocab`.
    pub fn filename(&self) -> String {
        format!("{}.{VOCAB_EXTENSION}", self.name)
    }

    /// The vocab file path inside `store_dir`.
    pub fn filepath(
        &self,
        store_dir: impl AsRef<Path>,
    ) -> PathBuf {
        store_dir.as_ref().join(self.filename())
    }

    /// Write the ordered token list into `save_dir`.
    ///
    /// ## Returns
    /// The written file path.
    pub fn save(
        &self,
        save_dir: impl AsRef<Path>,
    ) -> UTResult<PathBuf> {
        let path = self.filepath(save_dir);
        save_token_list_path(&self.borrow_tokens(), &path)?;
        Ok(path)
    }

    /// Replace the contents with a saved token list.
    ///
    /// `path` is either a `.vocab` file or a directory holding [`filename`](Self::filename).
    pub fn load(
        &self,
        path: impl AsRef<Path>,
    ) -> UTResult<&Self> {
        let path = path.as_ref();
        let path = if path.extension().is_some_and(|ext| ext == VOCAB_EXTENSION) {
            path.to_path_buf()
        } else {
            self.filepath(path)
        };

        let tokens = load_token_list_path(&path)?;
        self.state.borrow_mut().rebuild(tokens);
        Ok(self)
    }

    /// Load a named vocabulary from `save_dir`.
    pub fn load_from(
        name: impl Into<String>,
        save_dir: impl AsRef<Path>,
    ) -> UTResult<Self> {
        let vocab = Self::new(name);
        vocab.load(save_dir)?;
        Ok(vocab)
    }

    /// Manifest entry.
    pub fn descriptor(&self) -> VocabularyDescriptor {
        VocabularyDescriptor {
            name: self.name.clone(),
            vocab_size: self.len(),
        }
    }
}

impl Display for Vocabulary {
    fn fmt(
        &self,
        f: &mut Formatter<'_>,
    ) -> core::fmt::Result {
        write!(f, "Vocabulary({}, vocab_size={})", self.name, self.len())
    }
}
