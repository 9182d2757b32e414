use crate::{
    errors::{UTResult, UnitokError},
    table::Value,
    tokenizer::{Tokenizer, TokenizerCore, TokenizerParams, TokenizerShape},
    types::{Cell, TokenId},
    vocab::VocabRef,
};

/// Shared digit logic: the vocabulary is `"0", "1", ...` so a number is its own id.
#[derive(Debug, Clone)]
struct DigitCore {
    core: TokenizerCore,
    vocab_size: Option<usize>,
}

impl DigitCore {
    fn new(
        vocab: VocabRef,
        vocab_size: Option<usize>,
        tokenizer_id: Option<String>,
    ) -> UTResult<Self> {
        let core = TokenizerCore::new("auto_", vocab, tokenizer_id);
        if let Some(size) = vocab_size {
            let vocab = core.vocab();
            vocab.extend((vocab.len()..size).map(|i| i.to_string()))?;
            vocab.deny_edit();
        }
        Ok(Self { core, vocab_size })
    }

    fn params(&self) -> TokenizerParams {
        let mut params = TokenizerParams::new();
        params.insert(
            "vocab_size".to_string(),
            self.vocab_size.map_or(serde_json::Value::Null, Into::into),
        );
        params
    }

    fn convert(
        &self,
        classname: &str,
        value: &Value,
    ) -> UTResult<TokenId> {
        let number = value.as_index().ok_or_else(|| {
            UnitokError::Parse(format!(
                "(tokenizer.{classname}) expected a non-negative integer, got {value:?}"
            ))
        })?;

        if let Some(size) = self.vocab_size
            && number >= size
        {
            return Err(UnitokError::VocabNotEditable {
                vocab: self.core.vocab().name().to_string(),
                token: number.to_string(),
            });
        }

        let vocab = self.core.vocab();
        if number >= vocab.len() {
            vocab.extend((vocab.len()..number).map(|i| i.to_string()))?;
        }
        vocab.append(&number.to_string())
    }
}

/// Non-negative integers, each its own id.
#[derive(Debug, Clone)]
pub struct DigitTokenizer {
    digits: DigitCore,
}

impl DigitTokenizer {
    /// Registry name.
    pub const CLASSNAME: &'static str = "digit";

    /// Create a growable digit tokenizer with a generated id.
    pub fn new(vocab: VocabRef) -> Self {
        Self {
            digits: DigitCore {
                core: TokenizerCore::new("auto_", vocab, None),
                vocab_size: None,
            },
        }
    }

    /// Create a digit tokenizer.
    ///
    /// With a `vocab_size`, the vocabulary is pre-filled with `0..vocab_size`
    /// and frozen.
    pub fn with_options(
        vocab: VocabRef,
        vocab_size: Option<usize>,
        tokenizer_id: Option<String>,
    ) -> UTResult<Self> {
        Ok(Self {
            digits: DigitCore::new(vocab, vocab_size, tokenizer_id)?,
        })
    }

    /// The fixed vocab size, if any.
    pub fn vocab_size(&self) -> Option<usize> {
        self.digits.vocab_size
    }
}

impl Tokenizer for DigitTokenizer {
    fn classname(&self) -> &str {
        Self::CLASSNAME
    }

    fn tokenizer_id(&self) -> &str {
        self.digits.core.tokenizer_id()
    }

    fn vocab(&self) -> &VocabRef {
        self.digits.core.vocab()
    }

    fn shape(&self) -> TokenizerShape {
        TokenizerShape::Atomic
    }

    fn params(&self) -> TokenizerParams {
        self.digits.params()
    }

    fn tokenize(
        &self,
        value: &Value,
    ) -> UTResult<Cell> {
        Ok(Cell::Atom(self.digits.convert(Self::CLASSNAME, value)?))
    }
}

/// Lists of non-negative integers, each its own id.
#[derive(Debug, Clone)]
pub struct DigitsTokenizer {
    digits: DigitCore,
}

impl DigitsTokenizer {
    /// Registry name.
    pub const CLASSNAME: &'static str = "digits";

    /// Create a digits tokenizer; see [`DigitTokenizer::with_options`].
    pub fn with_options(
        vocab: VocabRef,
        vocab_size: Option<usize>,
        tokenizer_id: Option<String>,
    ) -> UTResult<Self> {
        Ok(Self {
            digits: DigitCore::new(vocab, vocab_size, tokenizer_id)?,
        })
    }
}

impl Tokenizer for DigitsTokenizer {
    fn classname(&self) -> &str {
        Self::CLASSNAME
    }

    fn tokenizer_id(&self) -> &str {
        self.digits.core.tokenizer_id()
    }

    fn vocab(&self) -> &VocabRef {
        self.digits.core.vocab()
    }

    fn shape(&self) -> TokenizerShape {
        TokenizerShape::List
    }

    fn params(&self) -> TokenizerParams {
        self.digits.params()
    }

    fn tokenize(
        &self,
        value: &Value,
    ) -> UTResult<Cell> {
        let items = match value {
            Value::Null => return Ok(Cell::List(Vec::new())),
            Value::List(items) => items,
            other => {
                return Err(UnitokError::UnexpectedShape(format!(
                    "(tokenizer.{}) expected a list, got {}",
                    Self::CLASSNAME,
                    other.kind()
                )));
            }
        };

        let ids = items
            .iter()
            .map(|item| self.digits.convert(Self::CLASSNAME, item))
            .collect::<UTResult<Vec<_>>>()?;
        Ok(Cell::List(ids))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocab::Vocabulary;

    #[test]
    fn test_digit_grows_vocab() {
        let tokenizer = DigitTokenizer::new(Vocabulary::shared("index"));

        assert_eq!(tokenizer.tokenize(&Value::Int(3)).unwrap(), Cell::Atom(3));
        assert_eq!(tokenizer.vocab().len(), 4);
        assert_eq!(tokenizer.tokenize(&"1".into()).unwrap(), Cell::Atom(1));
        assert_eq!(tokenizer.vocab().len(), 4);

        assert!(matches!(
            tokenizer.tokenize(&Value::Int(-1)),
            Err(UnitokError::Parse(_))
        ));
    }

    #[test]
    fn test_digit_fixed_size() {
        let tokenizer =
            DigitTokenizer::with_options(Vocabulary::shared("rating"), Some(5), None).unwrap();
        assert_eq!(tokenizer.vocab().len(), 5);
        assert!(!tokenizer.vocab().is_editable());

        assert_eq!(tokenizer.tokenize(&Value::Int(4)).unwrap(), Cell::Atom(4));
        assert!(matches!(
            tokenizer.tokenize(&Value::Int(5)),
            Err(UnitokError::VocabNotEditable { .. })
        ));
        assert_eq!(
            tokenizer.params().get("vocab_size"),
            Some(&serde_json::Value::from(5))
        );
    }

    #[test]
    fn test_digits() {
        let tokenizer =
            DigitsTokenizer::with_options(Vocabulary::shared("history"), None, None).unwrap();
        assert_eq!(
            tokenizer
                .tokenize(&Value::from(vec![2i64, 0, 5]))
                .unwrap(),
            Cell::List(vec![2, 0, 5])
        );
        assert_eq!(tokenizer.vocab().len(), 6);
        assert!(tokenizer.tokenize(&Value::Int(1)).is_err());
    }
}
