use crate::{
    errors::{UTResult, UnitokError},
    table::Value,
    tokenizer::{Tokenizer, TokenizerCore, TokenizerShape},
    types::Cell,
    vocab::VocabRef,
};

/// One token per value: the value's string form.
#[derive(Debug, Clone)]
pub struct EntityTokenizer {
    core: TokenizerCore,
}

impl EntityTokenizer {
    /// Registry name.
    pub const CLASSNAME: &'static str = "entity";

    /// Create a tokenizer over `vocab` with a generated id.
    pub fn new(vocab: VocabRef) -> Self {
        Self::with_id(vocab, None)
    }

    /// Create a tokenizer over `vocab` with an explicit id.
    pub fn with_id(
        vocab: VocabRef,
        tokenizer_id: Option<String>,
    ) -> Self {
        Self {
            core: TokenizerCore::new("auto_", vocab, tokenizer_id),
        }
    }
}

impl Tokenizer for EntityTokenizer {
    fn classname(&self) -> &str {
        Self::CLASSNAME
    }

    fn tokenizer_id(&self) -> &str {
        self.core.tokenizer_id()
    }

    fn vocab(&self) -> &VocabRef {
        self.core.vocab()
    }

    fn shape(&self) -> TokenizerShape {
        TokenizerShape::Atomic
    }

    fn tokenize(
        &self,
        value: &Value,
    ) -> UTResult<Cell> {
        if let Value::List(_) = value {
            return Err(UnitokError::UnexpectedShape(format!(
                "(tokenizer.{}) expected an atomic value, got a list",
                Self::CLASSNAME
            )));
        }
        Ok(Cell::Atom(self.core.convert_value(value)?))
    }
}

/// One token per list item.
#[derive(Debug, Clone)]
pub struct EntitiesTokenizer {
    core: TokenizerCore,
}

impl EntitiesTokenizer {
    /// Registry name.
    pub const CLASSNAME: &'static str = "entities";

    /// Create a tokenizer over `vocab` with a generated id.
    pub fn new(vocab: VocabRef) -> Self {
        Self::with_id(vocab, None)
    }

    /// Create a tokenizer over `vocab` with an explicit id.
    pub fn with_id(
        vocab: VocabRef,
        tokenizer_id: Option<String>,
    ) -> Self {
        Self {
            core: TokenizerCore::new("auto_", vocab, tokenizer_id),
        }
    }
}

impl Tokenizer for EntitiesTokenizer {
    fn classname(&self) -> &str {
        Self::CLASSNAME
    }

    fn tokenizer_id(&self) -> &str {
        self.core.tokenizer_id()
    }

    fn vocab(&self) -> &VocabRef {
        self.core.vocab()
    }

    fn shape(&self) -> TokenizerShape {
        TokenizerShape::List
    }

    fn tokenize(
        &self,
        value: &Value,
    ) -> UTResult<Cell> {
        Ok(Cell::List(
            self.core.convert_values(Self::CLASSNAME, value)?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocab::Vocabulary;

    #[test]
    fn test_entity() {
        let tokenizer = EntityTokenizer::new(Vocabulary::shared("cat"));
        assert_eq!(tokenizer.shape(), TokenizerShape::Atomic);
        assert!(tokenizer.tokenizer_id().starts_with("auto_"));

        assert_eq!(tokenizer.tokenize(&"x".into()).unwrap(), Cell::Atom(0));
        assert_eq!(tokenizer.tokenize(&"y".into()).unwrap(), Cell::Atom(1));
        assert_eq!(tokenizer.tokenize(&"x".into()).unwrap(), Cell::Atom(0));
        assert_eq!(tokenizer.tokenize(&Value::Int(7)).unwrap(), Cell::Atom(2));
        assert_eq!(tokenizer.vocab().get_token(2).as_deref(), Some("7"));

        assert!(matches!(
            tokenizer.tokenize(&Value::from(vec!["a"])),
            Err(UnitokError::UnexpectedShape(_))
        ));
    }

    #[test]
    fn test_entities() {
        let tokenizer = EntitiesTokenizer::with_id(Vocabulary::shared("tags"), Some("tags".into()));
        assert!(tokenizer.return_list());
        assert_eq!(tokenizer.describe(), "entities(tags, vocab=tags)");

        assert_eq!(
            tokenizer
                .tokenize(&Value::from(vec!["a", "b", "a"]))
                .unwrap(),
            Cell::List(vec![0, 1, 0])
        );
        assert_eq!(tokenizer.tokenize(&Value::Null).unwrap(), Cell::List(vec![]));
        assert!(tokenizer.tokenize(&"a".into()).is_err());
    }
}
