use std::rc::Rc;

use crate::{
    errors::{UTResult, UnitokError},
    feature::Feature,
    index_set::FeatureSet,
    tokenizer::TokenizerRef,
    types::Sample,
    vocab::VocabRef,
};

/// Narrows a packed [`Sample`] to a subset of its features.
#[derive(Debug, Clone)]
pub enum Selector {
    /// One feature, by export name.
    Feature(String),

    /// Every feature produced by this tokenizer instance.
    Tokenizer(TokenizerRef),

    /// Every feature produced by a tokenizer of this class.
    TokenizerClass(String),

    /// Every feature whose vocabulary equals this one.
    Vocab(VocabRef),
}

impl From<&str> for Selector {
    fn from(name: &str) -> Self {
        Selector::Feature(name.to_string())
    }
}

impl From<String> for Selector {
    fn from(name: String) -> Self {
        Selector::Feature(name)
    }
}

impl From<&Feature> for Selector {
    fn from(feature: &Feature) -> Self {
        Selector::Feature(feature.name().to_string())
    }
}

impl From<TokenizerRef> for Selector {
    fn from(tokenizer: TokenizerRef) -> Self {
        Selector::Tokenizer(tokenizer)
    }
}

impl From<VocabRef> for Selector {
    fn from(vocab: VocabRef) -> Self {
        Selector::Vocab(vocab)
    }
}

impl Selector {
    fn matches(
        &self,
        feature: &Feature,
    ) -> bool {
        match self {
            Selector::Feature(name) => feature.name() == name,
            Selector::Tokenizer(tokenizer) => Rc::ptr_eq(feature.tokenizer(), tokenizer),
            Selector::TokenizerClass(classname) => feature.tokenizer().classname() == classname,
            Selector::Vocab(vocab) => feature.tokenizer().vocab().equals(vocab),
        }
    }
}

/// Keep the sample entries matched by any of `selectors`.
///
/// Naming a feature the sample does not hold is an error.
pub fn select_sample(
    features: &FeatureSet,
    sample: &Sample,
    selectors: &[Selector],
) -> UTResult<Sample> {
    let mut selected = Sample::default();
    for selector in selectors {
        if let Selector::Feature(name) = selector {
            let value = sample
                .get(name)
                .ok_or_else(|| UnitokError::FeatureNotFound(name.clone()))?;
            selected.insert(name.clone(), value.clone());
            continue;
        }

        for (name, value) in sample {
            if features.get(name).is_some_and(|f| selector.matches(f)) {
                selected.insert(name.clone(), value.clone());
            }
        }
    }
    Ok(selected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        feature::FeatureOptions,
        tokenizer::{EntitiesTokenizer, EntityTokenizer},
        types::Cell,
        vocab::Vocabulary,
    };

    #[test]
    fn test_select() {
        let words = Vocabulary::shared("words");
        let title: TokenizerRef = Rc::new(EntitiesTokenizer::new(words.clone()));
        let body: TokenizerRef = Rc::new(EntitiesTokenizer::new(words.clone()));
        let category: TokenizerRef = Rc::new(EntityTokenizer::new(Vocabulary::shared("category")));

        let features: FeatureSet = [
            Feature::new(title.clone(), FeatureOptions::new().with_name("title")).unwrap(),
            Feature::new(body, FeatureOptions::new().with_name("body")).unwrap(),
            Feature::new(category, FeatureOptions::new()).unwrap(),
        ]
        .into_iter()
        .collect();

        let mut sample = Sample::default();
        sample.insert("title".into(), Cell::List(vec![0, 1]));
        sample.insert("body".into(), Cell::List(vec![2]));
        sample.insert("category".into(), Cell::Atom(0));

        let picked = select_sample(&features, &sample, &["category".into()]).unwrap();
        assert_eq!(picked.len(), 1);
        assert_eq!(picked["category"], Cell::Atom(0));

        let picked = select_sample(&features, &sample, &[title.into()]).unwrap();
        assert_eq!(picked.keys().collect::<Vec<_>>(), vec!["title"]);

        let picked = select_sample(&features, &sample, &[words.into()]).unwrap();
        assert_eq!(picked.len(), 2);

        let picked = select_sample(
            &features,
            &sample,
            &[Selector::TokenizerClass("entity".into())],
        )
        .unwrap();
        assert_eq!(picked.keys().collect::<Vec<_>>(), vec!["category"]);

        assert!(matches!(
            select_sample(&features, &sample, &["missing".into()]),
            Err(UnitokError::FeatureNotFound(_))
        ));
    }
}
