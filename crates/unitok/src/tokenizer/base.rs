use rand::{Rng, distr::Alphanumeric};

use crate::{
    errors::{UTResult, UnitokError},
    table::Value,
    types::TokenId,
    vocab::VocabRef,
};

/// Generate a tokenizer id: `{prefix}{6 random alphanumerics}`.
pub fn random_tokenizer_id(prefix: &str) -> String {
    let suffix: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(6)
        .map(char::from)
        .collect();
    format!("{prefix}{suffix}")
}

/// State shared by every tokenizer: its id and its vocabulary.
#[derive(Debug, Clone)]
pub struct TokenizerCore {
    tokenizer_id: String,
    vocab: VocabRef,
}

impl TokenizerCore {
    /// Bind a vocabulary, generating an id from `prefix` if none is given.
    pub fn new(
        prefix: &str,
        vocab: VocabRef,
        tokenizer_id: Option<String>,
    ) -> Self {
        Self {
            tokenizer_id: tokenizer_id.unwrap_or_else(|| random_tokenizer_id(prefix)),
            vocab,
        }
    }

    /// The tokenizer id.
    pub fn tokenizer_id(&self) -> &str {
        &self.tokenizer_id
    }

    /// The vocabulary.
    pub fn vocab(&self) -> &VocabRef {
        &self.vocab
    }

    /// Stringify and append one value.
    pub fn convert_value(
        &self,
        value: &Value,
    ) -> UTResult<TokenId> {
        self.vocab.append(&value.to_string())
    }

    /// Stringify and append each item of a list value; null is an empty list.
    pub fn convert_values(
        &self,
        classname: &str,
        value: &Value,
    ) -> UTResult<Vec<TokenId>> {
        match value {
            Value::Null => Ok(Vec::new()),
            Value::List(items) => items.iter().map(|item| self.convert_value(item)).collect(),
            other => Err(UnitokError::UnexpectedShape(format!(
                "(tokenizer.{classname}) expected a list, got {}",
                other.kind()
            ))),
        }
    }
}
