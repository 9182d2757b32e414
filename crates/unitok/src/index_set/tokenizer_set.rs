use std::rc::Rc;

use crate::{
    errors::{UTResult, UnitokError},
    index_set::{IndexSet, Indexed},
    tokenizer::TokenizerRef,
    vocab::VocabEquality,
};

/// Tokenizers keyed by tokenizer id.
pub type TokenizerSet = IndexSet<TokenizerRef>;

impl Indexed for TokenizerRef {
    const REGISTRY: &'static str = "tokenizers";

    fn index_key(&self) -> &str {
        self.tokenizer_id()
    }

    fn is_same(
        &self,
        other: &Self,
    ) -> bool {
        Rc::ptr_eq(self, other)
    }
}

impl TokenizerSet {
    /// Validate folding `other` in; returns the tokenizers to add.
    ///
    /// Same-id tokenizers must be backed by equal vocabularies; the
    /// registered tokenizer is kept.
    pub fn plan_merge(
        &self,
        other: &TokenizerSet,
        equality: VocabEquality,
    ) -> UTResult<Vec<TokenizerRef>> {
        let mut staged = Vec::new();
        for tokenizer in other {
            let Some(current) = self.get(tokenizer.tokenizer_id()) else {
                staged.push(tokenizer.clone());
                continue;
            };
            if current.is_same(tokenizer) {
                continue;
            }
            if !current
                .vocab()
                .equals_with(tokenizer.vocab(), equality)
            {
                return Err(UnitokError::TokenizerVocabConflict {
                    tokenizer_id: tokenizer.tokenizer_id().to_string(),
                    left: current.vocab().to_string(),
                    right: tokenizer.vocab().to_string(),
                });
            }
        }
        Ok(staged)
    }

    /// Fold `other` in; see [`plan_merge`](Self::plan_merge).
    pub fn merge(
        &mut self,
        other: &TokenizerSet,
        equality: VocabEquality,
    ) -> UTResult<()> {
        let staged = self.plan_merge(other, equality)?;
        self.absorb(staged);
        Ok(())
    }

    /// Is any tokenizer backed by the vocabulary named `vocab`?
    pub fn uses_vocab(
        &self,
        vocab: &str,
    ) -> bool {
        self.iter().any(|t| t.vocab().name() == vocab)
    }
}
