use std::rc::Rc;

use crate::{
    errors::{UTResult, UnitokError},
    feature::Feature,
    index_set::{IndexSet, Indexed},
    tokenizer::TokenizerRef,
};

/// Features keyed by export name.
pub type FeatureSet = IndexSet<Feature>;

impl Indexed for Feature {
    const REGISTRY: &'static str = "features";

    fn index_key(&self) -> &str {
        self.name()
    }

    fn is_same(
        &self,
        other: &Self,
    ) -> bool {
        self.name() == other.name()
            && self.column() == other.column()
            && Rc::ptr_eq(self.tokenizer(), other.tokenizer())
            && self.truncate() == other.truncate()
            && self.order() == other.order()
            && self.is_key() == other.is_key()
    }

    fn conflict(key: &str) -> UnitokError {
        UnitokError::FeatureNameConflict {
            name: key.to_string(),
        }
    }
}

impl FeatureSet {
    /// The order for the next tokenization pass: `max(order) + 1`, or `0`.
    pub fn next_order(&self) -> i64 {
        self.iter()
            .map(Feature::order)
            .max()
            .map_or(0, |order| order.max(-1) + 1)
    }

    /// The row-identity feature, if declared.
    pub fn key_feature(&self) -> Option<&Feature> {
        self.iter().find(|f| f.is_key())
    }

    /// Does any feature use the tokenizer `tokenizer_id`?
    pub fn uses_tokenizer(
        &self,
        tokenizer_id: &str,
    ) -> bool {
        self.iter()
            .any(|f| f.tokenizer().tokenizer_id() == tokenizer_id)
    }

    /// Validate folding `other` in; returns re-ordered copies to add.
    ///
    /// Every incoming feature must be processed, and no name may collide.
    /// `skip` names the incoming key feature, which collapses into the link.
    /// `resolve` maps each incoming tokenizer onto the registered one.
    pub fn plan_merge<F>(
        &self,
        other: &FeatureSet,
        skip: Option<&str>,
        from_union: bool,
        resolve: F,
    ) -> UTResult<Vec<Feature>>
    where
        F: Fn(&TokenizerRef) -> TokenizerRef,
    {
        let order = self.next_order();

        let mut staged = Vec::new();
        for feature in other {
            if Some(feature.name()) == skip {
                continue;
            }
            if !feature.is_processed() {
                return Err(UnitokError::InvalidFeature(format!(
                    "merge unprocessed feature: {feature}"
                )));
            }
            if self.has(feature.name()) {
                return Err(Feature::conflict(feature.name()));
            }
            staged.push(feature.merged(resolve(feature.tokenizer()), order, from_union)?);
        }
        Ok(staged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        feature::FeatureOptions,
        tokenizer::{EntitiesTokenizer, EntityTokenizer},
        vocab::Vocabulary,
    };

    fn feature(
        name: &str,
        order: i64,
    ) -> Feature {
        let tokenizer = Rc::new(EntityTokenizer::new(Vocabulary::shared(name)));
        let mut feature = Feature::new(tokenizer, FeatureOptions::new()).unwrap();
        if order >= 0 {
            feature.mark_processed(order, 0);
        }
        feature
    }

    #[test]
    fn test_next_order() {
        let mut set = FeatureSet::new();
        assert_eq!(set.next_order(), 0);

        set.add(feature("a", -1)).unwrap();
        assert_eq!(set.next_order(), 0);

        set.add(feature("b", 2)).unwrap();
        assert_eq!(set.next_order(), 3);
    }

    #[test]
    fn test_name_conflict() {
        let mut set = FeatureSet::new();
        set.add(feature("a", 0)).unwrap();
        assert!(matches!(
            set.add(feature("a", 0)),
            Err(UnitokError::FeatureNameConflict { .. })
        ));
    }

    #[test]
    fn test_plan_merge() {
        let left: FeatureSet = [feature("id", 0), feature("title", 0)].into_iter().collect();

        let tags = Rc::new(EntitiesTokenizer::new(Vocabulary::shared("tags")));
        let mut tags = Feature::new(tags, FeatureOptions::new()).unwrap();
        tags.mark_processed(4, 2);

        let right: FeatureSet = [feature("id", 0), tags].into_iter().collect();
        let staged = left
            .plan_merge(&right, Some("id"), true, Rc::clone)
            .unwrap();
        assert_eq!(staged.len(), 1);
        assert_eq!(staged[0].name(), "tags");
        assert_eq!(staged[0].order(), 1);
        assert_eq!(staged[0].max_len(), 2);
        assert!(staged[0].from_union());

        assert!(matches!(
            left.plan_merge(&right, None, false, Rc::clone),
            Err(UnitokError::FeatureNameConflict { .. })
        ));

        let pending: FeatureSet = [feature("body", -1)].into_iter().collect();
        assert!(matches!(
            left.plan_merge(&pending, None, false, Rc::clone),
            Err(UnitokError::InvalidFeature(_))
        ));
    }
}
