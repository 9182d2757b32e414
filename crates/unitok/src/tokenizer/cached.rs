use core::cell::RefCell;
use std::rc::Rc;

use crate::{
    errors::UTResult,
    table::Value,
    tokenizer::{Tokenizer, TokenizerParams, TokenizerRef, TokenizerShape},
    types::{Cell, UTHashMap},
    vocab::VocabRef,
};

/// Memoizes a list tokenizer's output per input string.
///
/// Repeated inputs skip the vocabulary, so they are not frequency-counted again.
#[derive(Debug)]
pub struct CachedTokenizer {
    inner: TokenizerRef,
    cache: RefCell<UTHashMap<String, Cell>>,
}

/// Wrap `inner` in a [`CachedTokenizer`].
///
/// Atomic tokenizers gain nothing from caching and are returned unchanged.
pub fn with_cache(inner: TokenizerRef) -> TokenizerRef {
    if inner.shape() == TokenizerShape::Atomic {
        log::warn!(
            "only list tokenizers may need a cache; use_cache of {} is ignored",
            inner.classname()
        );
        return inner;
    }
    Rc::new(CachedTokenizer {
        inner,
        cache: RefCell::new(UTHashMap::default()),
    })
}

impl CachedTokenizer {
    /// The number of cached inputs.
    pub fn cached(&self) -> usize {
        self.cache.borrow().len()
    }
}

impl Tokenizer for CachedTokenizer {
    fn classname(&self) -> &str {
        self.inner.classname()
    }

    fn tokenizer_id(&self) -> &str {
        self.inner.tokenizer_id()
    }

    fn vocab(&self) -> &VocabRef {
        self.inner.vocab()
    }

    fn shape(&self) -> TokenizerShape {
        self.inner.shape()
    }

    fn params(&self) -> TokenizerParams {
        let mut params = self.inner.params();
        params.insert("use_cache".to_string(), true.into());
        params
    }

    fn tokenize(
        &self,
        value: &Value,
    ) -> UTResult<Cell> {
        let Some(key) = value.as_str() else {
            return self.inner.tokenize(value);
        };

        if let Some(hit) = self.cache.borrow().get(key) {
            return Ok(hit.clone());
        }

        let cell = self.inner.tokenize(value)?;
        self.cache.borrow_mut().insert(key.to_string(), cell.clone());
        Ok(cell)
    }

    fn detailed_classname(&self) -> String {
        self.inner.detailed_classname()
    }
}
