use crate::{
    errors::{UTResult, UnitokError},
    table::Value,
    tokenizer::{Tokenizer, TokenizerCore, TokenizerParams, TokenizerShape},
    types::Cell,
    vocab::VocabRef,
};

/// Splits a string on a separator; one token per piece.
#[derive(Debug, Clone)]
pub struct SplitTokenizer {
    core: TokenizerCore,
    sep: String,
}

impl SplitTokenizer {
    /// Registry name.
    pub const CLASSNAME: &'static str = "split";

    /// Create a tokenizer over `vocab` with a generated id.
    pub fn new(
        vocab: VocabRef,
        sep: impl Into<String>,
    ) -> Self {
        Self::with_id(vocab, sep, None)
    }

    /// Create a tokenizer over `vocab` with an explicit id.
    pub fn with_id(
        vocab: VocabRef,
        sep: impl Into<String>,
        tokenizer_id: Option<String>,
    ) -> Self {
        Self {
            core: TokenizerCore::new("auto_", vocab, tokenizer_id),
            sep: sep.into(),
        }
    }

    /// The separator.
    pub fn sep(&self) -> &str {
        &self.sep
    }
}

impl Tokenizer for SplitTokenizer {
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

    fn params(&self) -> TokenizerParams {
        let mut params = TokenizerParams::new();
        params.insert("sep".to_string(), self.sep.clone().into());
        params
    }

    fn tokenize(
        &self,
        value: &Value,
    ) -> UTResult<Cell> {
        let text = match value {
            Value::Null => return Ok(Cell::List(Vec::new())),
            Value::Str(text) => text,
            other => {
                return Err(UnitokError::UnexpectedShape(format!(
                    "(tokenizer.{}) expected a string, got {}",
                    Self::CLASSNAME,
                    other.kind()
                )));
            }
        };

        let ids = text
            .split(self.sep.as_str())
            .map(|piece| self.core.vocab().append(piece))
            .collect::<UTResult<Vec<_>>>()?;
        Ok(Cell::List(ids))
    }
}
