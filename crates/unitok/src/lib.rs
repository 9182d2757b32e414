//! # `unitok` Dataset Tokenization
//!
//! `unitok` turns tabular data into integer-encoded datasets, keeping the
//! vocabularies needed to read them back, and joins independently built
//! datasets through shared key vocabularies.
//!
//! See:
//! * [`vocab`] for the named ``{ token <-> id }`` mappings.
//! * [`tokenizer`] for the value-to-id capabilities, and the registry
//!   used to rebuild them by class name.
//! * [`feature`] for binding a tokenizer to a column.
//! * [`index_set`] for the uniqueness-enforcing registries.
//! * [`dataset`] for [`UniTok`]: tokenize, filter, union, save and load.
//!
//! ## Crate Features
//!
//! #### feature: ``default``
//!
//! * ``ahash``
//!
//! #### feature: ``ahash``
//!
//! This swaps all HashMap/HashSet implementations for ``ahash``.
//!
//! This is done by the ``types::UTHash{*}`` type alias machinery.
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::rc::Rc;
//! use unitok::{
//!     DataFrame, FeatureOptions, UniTok,
//!     tokenizer::{EntityTokenizer, SplitTokenizer},
//!     vocab::Vocabulary,
//! };
//!
//! let df = DataFrame::new()
//!     .with_column("nid", ["n1", "n2"])?
//!     .with_column("title", ["hello world", "hello"])?;
//!
//! let mut ut = UniTok::new();
//! ut.add_feature(
//!     Rc::new(EntityTokenizer::new(Vocabulary::shared("nid"))),
//!     FeatureOptions::new().with_key(true),
//! )?;
//! ut.add_feature(
//!     Rc::new(SplitTokenizer::new(Vocabulary::shared("words"), " ")),
//!     FeatureOptions::new().with_column("title").with_truncate(10),
//! )?;
//! ut.tokenize(&df)?.save("news")?;
//! ```
#![warn(missing_docs, unused)]

pub mod dataset;
pub mod errors;
pub mod feature;
pub mod index_set;
pub mod meta;
pub mod table;
pub mod tokenizer;
pub mod types;
pub mod vocab;

#[doc(inline)]
pub use dataset::{Selector, Status, UnionMode, UniTok};
#[doc(inline)]
pub use errors::{UTResult, UnitokError};
#[doc(inline)]
pub use feature::{Column, Feature, FeatureOptions};
#[doc(inline)]
pub use table::{DataFrame, Table, Value};
#[doc(inline)]
pub use types::{Cell, Sample, TokenId};
