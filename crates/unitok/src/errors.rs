//! # Error Types

use crate::dataset::Status;

/// Errors from unitok operations.
#[derive(Debug, thiserror::Error)]
pub enum UnitokError {
    /// An unseen token was appended to a frozen vocabulary with no oov fallback.
    #[error("the fixed vocab {vocab} is not allowed to add new token ({token})")]
    VocabNotEditable {
        /// The vocabulary name.
        vocab: String,
        /// The rejected token.
        token: String,
    },

    /// A token contains a line break, which the vocab file format cannot hold.
    #[error("token ({token:?}) contains line break")]
    InvalidToken {
        /// The rejected token.
        token: String,
    },

    /// An oov fallback does not resolve inside the vocabulary.
    #[error("oov token {token} is not in vocab {vocab}")]
    InvalidOov {
        /// The vocabulary name.
        vocab: String,
        /// The fallback that failed to resolve.
        token: String,
    },

    /// Two same-named vocabularies disagree on their size.
    #[error("conflict vocabulary size: {name} ({left} != {right})")]
    VocabSizeConflict {
        /// The vocabulary name.
        name: String,
        /// The size of the registered vocabulary.
        left: usize,
        /// The size of the incoming vocabulary.
        right: usize,
    },

    /// Two same-named vocabularies disagree on their contents (strict equality).
    #[error("conflict vocabulary content: {name}")]
    VocabContentConflict {
        /// The vocabulary name.
        name: String,
    },

    /// Two same-id tokenizers are backed by unequal vocabularies.
    #[error("conflict vocabulary for tokenizer {tokenizer_id}: {left} and {right}")]
    TokenizerVocabConflict {
        /// The shared tokenizer id.
        tokenizer_id: String,
        /// The registered vocabulary.
        left: String,
        /// The incoming vocabulary.
        right: String,
    },

    /// A merged feature collides with an existing feature name.
    #[error("conflict feature name: {name}")]
    FeatureNameConflict {
        /// The colliding feature name.
        name: String,
    },

    /// A registry already holds a distinct object under the same key.
    #[error("key conflict in {registry}: {key}")]
    KeyConflict {
        /// The registry kind.
        registry: &'static str,
        /// The colliding key.
        key: String,
    },

    /// The linking features of a union are backed by unequal vocabularies.
    #[error("union key vocab mismatch: {left} != {right}")]
    UnionKeyVocabMismatch {
        /// The local link vocabulary.
        left: String,
        /// The other dataset's key vocabulary.
        right: String,
    },

    /// The union key is missing, unprocessed, or not atomic.
    #[error("invalid union key {key}: {reason}")]
    InvalidUnionKey {
        /// The union key.
        key: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Soft and hard union were mixed on one dataset.
    #[error("union type is already set: {current}, cannot switch to {requested}")]
    UnionModeConflict {
        /// The established mode.
        current: String,
        /// The rejected mode.
        requested: String,
    },

    /// A soft union would make a dataset reachable from itself.
    ///
    /// Not constructible under today's `Rc` ownership; kept for shared-mutable datasets.
    #[error("soft union cycle detected: {0}")]
    UnionCycle(String),

    /// Re-tokenizing against a table of a different row count.
    #[error("sample size mismatch: {expected} != {actual}")]
    SampleSizeMismatch {
        /// The established sample size.
        expected: usize,
        /// The incoming row count.
        actual: usize,
    },

    /// Key feature declaration or removal rules were broken.
    #[error("key feature violation: {0}")]
    KeyFeatureViolation(String),

    /// An operation was called in a lifecycle state that forbids it.
    #[error("{operation} requires status {expected}, but the dataset is {actual}")]
    StateViolation {
        /// The rejected operation.
        operation: &'static str,
        /// The accepted statuses.
        expected: String,
        /// The current status.
        actual: Status,
    },

    /// A feature declaration is malformed.
    #[error("invalid feature: {0}")]
    InvalidFeature(String),

    /// The operation needs local data, but the feature arrives through a soft union.
    #[error("soft union constraint: {0}")]
    SoftUnionConstraint(String),

    /// A feature's source column is absent from the input table.
    #[error("column {0} not found in dataframe")]
    ColumnNotFound(String),

    /// A feature name is not registered.
    #[error("feature {0} not found")]
    FeatureNotFound(String),

    /// A tokenizer id is not registered.
    #[error("tokenizer {0} not found")]
    TokenizerNotFound(String),

    /// A vocabulary name is not registered.
    #[error("vocabulary {0} not found")]
    VocabularyNotFound(String),

    /// A feature's ids were minted against an older vocabulary generation.
    #[error("feature {feature} is stale: vocab {vocab} was rebuilt after tokenization")]
    StaleVocabulary {
        /// The stale feature.
        feature: String,
        /// The rebuilt vocabulary.
        vocab: String,
    },

    /// A tokenizer or operation received a value of the wrong shape.
    #[error("unexpected shape: {0}")]
    UnexpectedShape(String),

    /// A row index is outside the sample range.
    #[error("index {index} out of range for sample size {size}")]
    IndexOutOfRange {
        /// The rejected index.
        index: usize,
        /// The sample size.
        size: usize,
    },

    /// A sample key does not exist in the key vocabulary.
    #[error("sample {0} not found")]
    SampleNotFound(String),

    /// A sample exists but is hidden by the current filter.
    #[error("current sample has been filtered out: {0}")]
    SampleFilteredOut(String),

    /// A manifest version this release cannot read.
    #[error("UniDep version ({version}) is not supported. {hint}")]
    UnsupportedVersion {
        /// The manifest version.
        version: String,
        /// Migration instructions.
        hint: &'static str,
    },

    /// I/O error.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Parse error (integers, params, etc.)
    #[error("parse error: {0}")]
    Parse(String),

    /// Error from an external component.
    #[error("{0}")]
    External(String),
}

/// Result type for unitok operations.
pub type UTResult<T> = core::result::Result<T, UnitokError>;
