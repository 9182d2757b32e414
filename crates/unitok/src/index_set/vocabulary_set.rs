use std::rc::Rc;

use crate::{
    errors::{UTResult, UnitokError},
    index_set::{IndexSet, Indexed},
    vocab::{VocabEquality, VocabRef},
};

/// Vocabularies keyed by name.
pub type VocabularySet = IndexSet<VocabRef>;

impl Indexed for VocabRef {
    const REGISTRY: &'static str = "vocabularies";

    fn index_key(&self) -> &str {
        self.name()
    }

    fn is_same(
        &self,
        other: &Self,
    ) -> bool {
        Rc::ptr_eq(self, other)
    }
}

impl VocabularySet {
    /// Validate folding `other` in; returns the vocabularies to add.
    ///
    /// Same-named vocabularies must be equal under `equality`; they are kept
    /// as-is, not replaced.
    pub fn plan_merge(
        &self,
        other: &VocabularySet,
        equality: VocabEquality,
    ) -> UTResult<Vec<VocabRef>> {
        let mut staged = Vec::new();
        for vocab in other {
            let Some(current) = self.get(vocab.name()) else {
                staged.push(vocab.clone());
                continue;
            };
            if current.is_same(vocab) {
                continue;
            }

            if current.len() != vocab.len() {
                return Err(UnitokError::VocabSizeConflict {
                    name: vocab.name().to_string(),
                    left: current.len(),
                    right: vocab.len(),
                });
            }
            if equality == VocabEquality::Content && !current.content_equals(vocab) {
                return Err(UnitokError::VocabContentConflict {
                    name: vocab.name().to_string(),
                });
            }
        }
        Ok(staged)
    }

    /// Fold `other` in; see [`plan_merge`](Self::plan_merge).
    pub fn merge(
        &mut self,
        other: &VocabularySet,
        equality: VocabEquality,
    ) -> UTResult<()> {
        let staged = self.plan_merge(other, equality)?;
        self.absorb(staged);
        Ok(())
    }
}
