use crate::{
    errors::{UTResult, UnitokError},
    table::Value,
    tokenizer::{Tokenizer, TokenizerCore, TokenizerParams, TokenizerShape},
    types::Cell,
    vocab::VocabRef,
};

/// Stand-in for a persisted tokenizer whose class is not registered.
///
/// Keeps the tokenizer id, vocabulary, class name and parameters so the
/// dataset can still be read and re-saved; it cannot tokenize.
#[derive(Debug, Clone)]
pub struct UnknownTokenizer {
    core: TokenizerCore,
    classname: String,
    params: TokenizerParams,
}

impl UnknownTokenizer {
    /// Registry name of the placeholder itself.
    pub const CLASSNAME: &'static str = "unknown";

    /// Wrap a persisted tokenizer descriptor.
    pub fn new(
        vocab: VocabRef,
        tokenizer_id: Option<String>,
        classname: impl Into<String>,
        params: TokenizerParams,
    ) -> Self {
        Self {
            core: TokenizerCore::new("unk_", vocab, tokenizer_id),
            classname: classname.into(),
            params,
        }
    }
}

impl Tokenizer for UnknownTokenizer {
    fn classname(&self) -> &str {
        &self.classname
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

    fn params(&self) -> TokenizerParams {
        self.params.clone()
    }

    fn tokenize(
        &self,
        _value: &Value,
    ) -> UTResult<Cell> {
        Err(UnitokError::External(format!(
            "tokenizer {} ({}) is a placeholder and cannot tokenize",
            self.core.tokenizer_id(),
            self.classname
        )))
    }

    fn detailed_classname(&self) -> String {
        format!("{}[{}]", Self::CLASSNAME, self.classname)
    }
}
