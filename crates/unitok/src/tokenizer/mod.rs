//! # Tokenizers
//!
//! A [`Tokenizer`] turns one raw [`Value`] into a [`Cell`]: a single id for
//! [`TokenizerShape::Atomic`] tokenizers, or a list of ids for
//! [`TokenizerShape::List`] tokenizers. Every id comes from the tokenizer's
//! own [`crate::vocab::Vocabulary`].
//!
//! Built-in tokenizers:
//! * [`EntityTokenizer`] / [`EntitiesTokenizer`] - one token per value / list item.
//! * [`SplitTokenizer`] - split a string on a separator.
//! * [`DigitTokenizer`] / [`DigitsTokenizer`] - integers as their own ids.
//! * [`UnknownTokenizer`] - placeholder for classes missing at load time.
//!
//! Tokenizers are constructed by name through a [`TokenizerRegistry`].

use core::fmt::Debug;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::{errors::UTResult, table::Value, types::Cell, vocab::VocabRef};

mod base;
mod cached;
mod digit;
mod entity;
pub mod registry;
mod split;
mod unknown;

#[doc(inline)]
pub use base::{TokenizerCore, random_tokenizer_id};
#[doc(inline)]
pub use cached::{CachedTokenizer, with_cache};
#[doc(inline)]
pub use digit::{DigitTokenizer, DigitsTokenizer};
#[doc(inline)]
pub use entity::{EntitiesTokenizer, EntityTokenizer};
#[doc(inline)]
pub use registry::{TokenizerArgs, TokenizerFactory, TokenizerRegistry};
#[doc(inline)]
pub use split::SplitTokenizer;
#[doc(inline)]
pub use unknown::UnknownTokenizer;

/// Constructor parameters, as recorded in the manifest.
pub type TokenizerParams = serde_json::Map<String, serde_json::Value>;

/// The shape of every value a tokenizer produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenizerShape {
    /// One id per value.
    Atomic,

    /// A list of ids per value.
    List,
}

/// Shared handle to a tokenizer.
pub type TokenizerRef = Rc<dyn Tokenizer>;

/// Manifest entry for a tokenizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenizerDescriptor {
    /// Stable tokenizer id.
    pub tokenizer_id: String,

    /// Registry name of the tokenizer class.
    pub classname: String,

    /// Name of the owning vocabulary.
    pub vocab: String,

    /// Constructor parameters.
    #[serde(default)]
    pub params: TokenizerParams,
}

/// Converts raw values into ids from one vocabulary.
pub trait Tokenizer: Debug {
    /// Registry name of this tokenizer class.
    fn classname(&self) -> &str;

    /// Stable id used for registry keying and persistence.
    fn tokenizer_id(&self) -> &str;

    /// The vocabulary every returned id comes from.
    fn vocab(&self) -> &VocabRef;

    /// The shape of every returned [`Cell`].
    fn shape(&self) -> TokenizerShape;

    /// Constructor parameters to persist.
    fn params(&self) -> TokenizerParams {
        TokenizerParams::new()
    }

    /// Tokenize one raw value.
    fn tokenize(
        &self,
        value: &Value,
    ) -> UTResult<Cell>;

    /// True for [`TokenizerShape::List`] tokenizers.
    fn return_list(&self) -> bool {
        self.shape() == TokenizerShape::List
    }

    /// Human-readable class name.
    fn detailed_classname(&self) -> String {
        self.classname().to_string()
    }

    /// `classname(id, vocab=name)`.
    fn describe(&self) -> String {
        format!(
            "{}({}, vocab={})",
            self.detailed_classname(),
            self.tokenizer_id(),
            self.vocab().name()
        )
    }

    /// Manifest entry.
    fn descriptor(&self) -> TokenizerDescriptor {
        TokenizerDescriptor {
            tokenizer_id: self.tokenizer_id().to_string(),
            classname: self.classname().to_string(),
            vocab: self.vocab().name().to_string(),
            params: self.params(),
        }
    }
}
