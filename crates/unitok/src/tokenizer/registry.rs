//! # Tokenizer Registry
//!
//! Explicit ``{ classname -> constructor }`` table, used to rebuild
//! persisted tokenizers and to construct tokenizers by name from the CLI.

use std::rc::Rc;

use crate::{
    errors::{UTResult, UnitokError},
    tokenizer::{
        DigitTokenizer,
        DigitsTokenizer,
        EntitiesTokenizer,
        EntityTokenizer,
        SplitTokenizer,
        TokenizerParams,
        TokenizerRef,
        UnknownTokenizer,
        with_cache,
    },
    types::UTHashMap,
    vocab::VocabRef,
};

/// Constructor arguments common to every tokenizer.
#[derive(Debug, Clone)]
pub struct TokenizerArgs {
    /// The vocabulary to bind.
    pub vocab: VocabRef,

    /// An explicit id; generated when `None`.
    pub tokenizer_id: Option<String>,

    /// Class-specific parameters.
    pub params: TokenizerParams,
}

impl TokenizerArgs {
    /// Arguments with no id and no parameters.
    pub fn new(vocab: VocabRef) -> Self {
        Self {
            vocab,
            tokenizer_id: None,
            params: TokenizerParams::new(),
        }
    }

    /// Set the tokenizer id.
    pub fn with_tokenizer_id(
        mut self,
        tokenizer_id: Option<String>,
    ) -> Self {
        self.tokenizer_id = tokenizer_id;
        self
    }

    /// Set one parameter.
    pub fn with_param(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// A string parameter.
    pub fn param_str(
        &self,
        key: &str,
    ) -> UTResult<Option<String>> {
        match self.params.get(key) {
            None | Some(serde_json::Value::Null) => Ok(None),
            Some(serde_json::Value::String(s)) => Ok(Some(s.clone())),
            Some(other) => Err(UnitokError::Parse(format!(
                "tokenizer param {key}: expected a string, got {other}"
            ))),
        }
    }

    /// An unsigned integer parameter; decimal strings are accepted.
    pub fn param_usize(
        &self,
        key: &str,
    ) -> UTResult<Option<usize>> {
        let parsed = match self.params.get(key) {
            None | Some(serde_json::Value::Null) => return Ok(None),
            Some(serde_json::Value::Number(n)) => n.as_u64().and_then(|n| usize::try_from(n).ok()),
            Some(serde_json::Value::String(s)) => s.trim().parse().ok(),
            Some(_) => None,
        };
        parsed.map(Some).ok_or_else(|| {
            UnitokError::Parse(format!(
                "tokenizer param {key}: expected an unsigned integer"
            ))
        })
    }

    /// A boolean parameter; `"true"`/`"false"` strings are accepted.
    pub fn param_bool(
        &self,
        key: &str,
    ) -> UTResult<Option<bool>> {
        match self.params.get(key) {
            None | Some(serde_json::Value::Null) => Ok(None),
            Some(serde_json::Value::Bool(b)) => Ok(Some(*b)),
            Some(serde_json::Value::String(s)) => match s.to_ascii_lowercase().as_str() {
                "true" | "1" => Ok(Some(true)),
                "false" | "0" => Ok(Some(false)),
                _ => Err(UnitokError::Parse(format!(
                    "tokenizer param {key}: expected a boolean, got {s}"
                ))),
            },
            Some(other) => Err(UnitokError::Parse(format!(
                "tokenizer param {key}: expected a boolean, got {other}"
            ))),
        }
    }
}

/// Builds a tokenizer from its arguments.
pub type TokenizerFactory = fn(&TokenizerArgs) -> UTResult<TokenizerRef>;

fn build_entity(args: &TokenizerArgs) -> UTResult<TokenizerRef> {
    Ok(Rc::new(EntityTokenizer::with_id(
        args.vocab.clone(),
        args.tokenizer_id.clone(),
    )))
}

fn build_entities(args: &TokenizerArgs) -> UTResult<TokenizerRef> {
    Ok(Rc::new(EntitiesTokenizer::with_id(
        args.vocab.clone(),
        args.tokenizer_id.clone(),
    )))
}

fn build_split(args: &TokenizerArgs) -> UTResult<TokenizerRef> {
    let sep = args
        .param_str("sep")?
        .ok_or_else(|| UnitokError::Parse("split tokenizer requires a `sep` param".into()))?;
    Ok(Rc::new(SplitTokenizer::with_id(
        args.vocab.clone(),
        sep,
        args.tokenizer_id.clone(),
    )))
}

fn build_digit(args: &TokenizerArgs) -> UTResult<TokenizerRef> {
    Ok(Rc::new(DigitTokenizer::with_options(
        args.vocab.clone(),
        args.param_usize("vocab_size")?,
        args.tokenizer_id.clone(),
    )?))
}

fn build_digits(args: &TokenizerArgs) -> UTResult<TokenizerRef> {
    Ok(Rc::new(DigitsTokenizer::with_options(
        args.vocab.clone(),
        args.param_usize("vocab_size")?,
        args.tokenizer_id.clone(),
    )?))
}

/// ``{ classname -> constructor }`` table.
#[derive(Debug, Clone)]
pub struct TokenizerRegistry {
    factories: UTHashMap<String, TokenizerFactory>,
}

impl Default for TokenizerRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(EntityTokenizer::CLASSNAME, build_entity);
        registry.register(EntitiesTokenizer::CLASSNAME, build_entities);
        registry.register(SplitTokenizer::CLASSNAME, build_split);
        registry.register(DigitTokenizer::CLASSNAME, build_digit);
        registry.register(DigitsTokenizer::CLASSNAME, build_digits);
        registry
    }
}

impl TokenizerRegistry {
    /// A registry with no classes.
    pub fn empty() -> Self {
        Self {
            factories: UTHashMap::default(),
        }
    }

    /// Register (or replace) a class.
    pub fn register(
        &mut self,
        classname: impl Into<String>,
        factory: TokenizerFactory,
    ) -> &mut Self {
        self.factories.insert(classname.into(), factory);
        self
    }

    /// Is the class registered?
    pub fn has(
        &self,
        classname: &str,
    ) -> bool {
        self.factories.contains_key(classname)
    }

    /// Registered class names, sorted.
    pub fn classnames(&self) -> Vec<&str> {
        let mut names = self.factories.keys().map(String::as_str).collect::<Vec<_>>();
        names.sort_unstable();
        names
    }

    /// Construct a registered class.
    ///
    /// A truthy `use_cache` param wraps list tokenizers with [`with_cache`].
    pub fn build(
        &self,
        classname: &str,
        args: &TokenizerArgs,
    ) -> UTResult<TokenizerRef> {
        let factory = self.factories.get(classname).ok_or_else(|| {
            UnitokError::TokenizerNotFound(format!(
                "{classname}; available: {}",
                self.classnames().join(", ")
            ))
        })?;

        let tokenizer = factory(args)?;
        if args.param_bool("use_cache")?.unwrap_or(false) {
            return Ok(with_cache(tokenizer));
        }
        Ok(tokenizer)
    }

    /// Construct a registered class, or an [`UnknownTokenizer`] placeholder.
    pub fn build_or_unknown(
        &self,
        classname: &str,
        args: &TokenizerArgs,
    ) -> UTResult<TokenizerRef> {
        if self.has(classname) {
            return self.build(classname, args);
        }

        log::warn!("(unitok.meta) tokenizer class {classname} not found in the registry");
        Ok(Rc::new(UnknownTokenizer::new(
            args.vocab.clone(),
            args.tokenizer_id.clone(),
            classname,
            args.params.clone(),
        )))
    }
}
