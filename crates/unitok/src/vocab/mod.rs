//! # Vocabulary
//!
//! This module provides the vocabulary and related io mechanisms.
//!
//! * [`Vocabulary`] - a named ``{ token <-> id }`` mapping with an edit lock,
//!   frequency counting, and trimming.
//! * [`Counter`] - the frequency counter behind count mode.
//! * [`io`] - the line-delimited token list format.

pub mod counter;
pub mod io;
pub mod vocabulary;

#[doc(inline)]
pub use counter::{CountBound, Counter};
#[doc(inline)]
pub use vocabulary::{OovToken, VocabEquality, VocabRef, Vocabulary, VocabularyDescriptor};
