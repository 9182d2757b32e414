//! # Dataset Engine
//!
//! [`UniTok`] owns the tokenized columns of one table, the registries
//! describing them, and the visible ("legal") subset of rows.
//!
//! ## Lifecycle
//!
//! ```text
//! initialized --tokenize--> tokenized --filter/union/replicate--> organized
//! ```
//!
//! Features are declared while initialized; once organized, raw tokenization
//! is no longer allowed.
//!
//! ## Unions
//!
//! Two datasets join through a link feature whose vocabulary equals the other
//! dataset's key vocabulary:
//! * [`UnionMode::Soft`] records the other dataset and resolves its rows on
//!   every read;
//! * [`UnionMode::Hard`] copies the other dataset's columns in, row by row.
//!
//! A dataset commits to one mode at its first union.

use core::fmt::{Display, Formatter};
use std::{
    borrow::Cow,
    collections::{BTreeMap, HashMap},
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::{Path, PathBuf},
    rc::Rc,
    sync::atomic::{AtomicU64, Ordering},
};

use crate::{
    errors::{UTResult, UnitokError},
    feature::{Column, Feature, FeatureOptions, TokenSlice},
    meta::{Meta, VERSION, parse_version},
    table::{Table, Value},
    tokenizer::{DigitTokenizer, TokenizerRef, TokenizerRegistry},
    types::{Cell, Sample, UTHashMap},
    vocab::{VocabEquality, VocabRef, Vocabulary},
};

mod selector;
mod status;
mod summary;

#[doc(inline)]
pub use selector::{Selector, select_sample};
#[doc(inline)]
pub use status::Status;
#[doc(inline)]
pub use summary::{FeatureSummary, Summary};

/// Data blob file name.
pub const DATA_FILENAME: &str = "data.json";

const NULL: &Value = &Value::Null;

static NEXT_INSTANCE_ID: AtomicU64 = AtomicU64::new(0);

/// How a union attaches the other dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnionMode {
    /// Keep a reference; join on every read.
    Soft,

    /// Copy the joined columns in now.
    Hard,
}

impl Display for UnionMode {
    fn fmt(
        &self,
        f: &mut Formatter<'_>,
    ) -> core::fmt::Result {
        match self {
            UnionMode::Soft => write!(f, "soft"),
            UnionMode::Hard => write!(f, "hard"),
        }
    }
}

/// A tokenized table.
#[derive(Debug)]
pub struct UniTok {
    instance_id: u64,
    meta: Meta,
    data: UTHashMap<String, Vec<Cell>>,
    key_feature: Option<String>,
    save_dir: Option<PathBuf>,
    status: Status,

    sample_size: Option<usize>,
    legal_indices: Vec<usize>,
    legal_flags: Vec<bool>,

    union_mode: Option<UnionMode>,
    soft_unions: Vec<(String, Vec<Rc<UniTok>>)>,
    equality: VocabEquality,
}

impl Default for UniTok {
    fn default() -> Self {
        Self {
            instance_id: NEXT_INSTANCE_ID.fetch_add(1, Ordering::Relaxed),
            meta: Meta::new(),
            data: UTHashMap::default(),
            key_feature: None,
            save_dir: None,
            status: Status::Initialized,
            sample_size: None,
            legal_indices: Vec::new(),
            legal_flags: Vec::new(),
            union_mode: None,
            soft_unions: Vec::new(),
            equality: VocabEquality::default(),
        }
    }
}

impl UniTok {
    /// An empty dataset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set how vocabularies are compared by [`union`](Self::union).
    pub fn with_vocab_equality(
        mut self,
        equality: VocabEquality,
    ) -> Self {
        self.equality = equality;
        self
    }

    /// The registries.
    pub fn meta(&self) -> &Meta {
        &self.meta
    }

    /// The lifecycle status.
    pub fn status(&self) -> Status {
        self.status
    }

    /// The union mode, once committed.
    pub fn union_mode(&self) -> Option<UnionMode> {
        self.union_mode
    }

    /// The directory last saved to or loaded from.
    pub fn save_dir(&self) -> Option<&Path> {
        self.save_dir.as_deref()
    }

    /// The row-identity feature.
    pub fn key_feature(&self) -> Option<&Feature> {
        self.key_feature
            .as_deref()
            .and_then(|name| self.meta.features.get(name))
    }

    /// A registered feature.
    pub fn feature(
        &self,
        name: &str,
    ) -> UTResult<&Feature> {
        self.meta
            .features
            .get(name)
            .ok_or_else(|| UnitokError::FeatureNotFound(name.to_string()))
    }

    /// The locally stored column of a feature, over all underlying rows.
    pub fn column(
        &self,
        name: &str,
    ) -> Option<&[Cell]> {
        self.data.get(name).map(Vec::as_slice)
    }

    /// Number of visible rows.
    pub fn len(&self) -> usize {
        self.legal_indices.len()
    }

    /// True if no rows are visible.
    pub fn is_empty(&self) -> bool {
        self.legal_indices.is_empty()
    }

    /// Number of underlying rows; `0` before tokenization.
    pub fn sample_size(&self) -> usize {
        self.sample_size.unwrap_or(0)
    }

    /// Underlying row indices of the visible rows.
    pub fn legal_indices(&self) -> &[usize] {
        &self.legal_indices
    }

    /// Declare a feature.
    ///
    /// See [`Feature::new`] for the column/name/truncate defaults.
    /// At most one feature may be the key, and its tokenizer must be atomic.
    pub fn add_feature(
        &mut self,
        tokenizer: TokenizerRef,
        options: FeatureOptions,
    ) -> UTResult<&Feature> {
        self.status.require("add_feature", Status::NOT_ORGANIZED)?;

        let feature = Feature::new(tokenizer, options)?;
        if feature.is_key() {
            if let Some(key) = &self.key_feature {
                return Err(UnitokError::KeyFeatureViolation(format!(
                    "key feature already exists: {key}"
                )));
            }
            if feature.tokenizer().return_list() {
                return Err(UnitokError::KeyFeatureViolation(format!(
                    "key feature {} should be tokenized into atomic values",
                    feature.name()
                )));
            }
        }

        let tokenizer = feature.tokenizer().clone();
        let vocab = tokenizer.vocab().clone();
        self.meta.features.check_add(&feature)?;
        self.meta.tokenizers.check_add(&tokenizer)?;
        self.meta.vocabularies.check_add(&vocab)?;

        let name = feature.name().to_string();
        log::debug!("add {feature} with {}", tokenizer.describe());
        if feature.is_key() {
            self.key_feature = Some(name.clone());
        }
        self.meta.features.add(feature)?;
        self.meta.tokenizers.add(tokenizer)?;
        self.meta.vocabularies.add(vocab)?;

        self.feature(&name)
    }

    /// Declare a key feature over the row index, backed by a digit tokenizer.
    pub fn add_index_feature(
        &mut self,
        name: &str,
    ) -> UTResult<&Feature> {
        self.status
            .require("add_index_feature", Status::INITIALIZED)?;

        let tokenizer = Rc::new(DigitTokenizer::new(Vocabulary::shared(name)));
        self.add_feature(
            tokenizer,
            FeatureOptions::new()
                .with_column(Column::Index)
                .with_name(name)
                .with_key(true),
        )
    }

    /// Tokenize every unprocessed feature against `table`.
    ///
    /// Features run in registration order and share one processing order.
    /// Nothing is stored unless every feature succeeds; a failed pass leaves
    /// the vocabularies as it found them.
    pub fn tokenize<T>(
        &mut self,
        table: &T,
    ) -> UTResult<&mut Self>
    where
        T: Table + ?Sized,
    {
        self.status.require("tokenize", Status::NOT_ORGANIZED)?;

        for feature in &self.meta.features {
            if feature.is_processed() {
                continue;
            }
            if let Column::Named(column) = feature.column()
                && !table.has_column(column)
            {
                return Err(UnitokError::ColumnNotFound(column.clone()));
            }
        }

        let key = self.key_feature().ok_or_else(|| {
            UnitokError::KeyFeatureViolation("key feature should be set before tokenization".into())
        })?;

        if let Some(expected) = self.sample_size
            && expected != table.len()
        {
            return Err(UnitokError::SampleSizeMismatch {
                expected,
                actual: table.len(),
            });
        }

        let checkpoints = self
            .pending_vocabs()
            .into_iter()
            .map(|vocab| {
                let checkpoint = vocab.checkpoint();
                (vocab, checkpoint)
            })
            .collect::<Vec<_>>();

        let order = self.meta.features.next_order();
        let staged = match self.stage(key, table) {
            Ok(staged) => staged,
            Err(err) => {
                for (vocab, checkpoint) in checkpoints {
                    vocab.rollback(checkpoint);
                }
                return Err(err);
            }
        };

        for (name, max_len, cells) in staged {
            if let Some(feature) = self.meta.features.get_mut(&name) {
                feature.mark_processed(order, max_len);
            }
            self.data.insert(name, cells);
        }

        self.status = Status::Tokenized;
        if self.sample_size.is_none() {
            self.init_indices()?;
        }
        Ok(self)
    }

    /// Vocabularies a tokenize pass may grow: the key's and every unprocessed feature's.
    fn pending_vocabs(&self) -> Vec<VocabRef> {
        let mut vocabs: Vec<VocabRef> = Vec::new();
        for feature in self
            .meta
            .features
            .iter()
            .filter(|f| f.is_key() || !f.is_processed())
        {
            let vocab = feature.tokenizer().vocab();
            if !vocabs.iter().any(|v| Rc::ptr_eq(v, vocab)) {
                vocabs.push(vocab.clone());
            }
        }
        vocabs
    }

    /// Tokenize the unprocessed features into detached columns.
    fn stage<T>(
        &self,
        key: &Feature,
        table: &T,
    ) -> UTResult<Vec<(String, usize, Vec<Cell>)>>
    where
        T: Table + ?Sized,
    {
        if key.column().is_index() && !key.is_processed() && !table.is_empty() {
            key.tokenizer().tokenize(&row_value(table.len() - 1)?)?;
        }

        let mut staged = Vec::new();
        for feature in self.meta.features.iter().filter(|f| !f.is_processed()) {
            log::info!(
                "tokenizing feature: {} ({} -> {})",
                feature.tokenizer().describe(),
                feature.column(),
                feature.name()
            );

            let slice = feature.slice();
            let mut max_len = 0;
            let mut cells = Vec::with_capacity(table.len());
            for row in 0..table.len() {
                let value = match feature.column() {
                    Column::Index => Cow::Owned(row_value(row)?),
                    Column::Named(column) => Cow::Borrowed(table.value(column, row).unwrap_or(NULL)),
                };

                let cell = match feature.tokenizer().tokenize(&value)? {
                    Cell::List(ids) if feature.return_list() => {
                        let ids = slice.apply(&ids);
                        max_len = max_len.max(ids.len());
                        Cell::List(ids)
                    }
                    cell => cell,
                };
                cells.push(cell);
            }
            staged.push((feature.name().to_string(), max_len, cells));
        }

        Ok(staged)
    }

    fn init_indices(&mut self) -> UTResult<()> {
        let key = self
            .key_feature()
            .ok_or_else(|| UnitokError::KeyFeatureViolation("key feature not found".into()))?;

        let size = self.data.get(key.name()).map_or(0, Vec::len);
        let vocab = key.tokenizer().vocab();
        if vocab.len() != size {
            log::warn!(
                "key vocab {} holds {} tokens for {size} samples",
                vocab.name(),
                vocab.len()
            );
        }

        self.sample_size = Some(size);
        self.set_legal((0..size).collect());
        Ok(())
    }

    fn set_legal(
        &mut self,
        indices: Vec<usize>,
    ) {
        let mut flags = vec![false; self.sample_size()];
        for &index in &indices {
            flags[index] = true;
        }
        self.legal_indices = indices;
        self.legal_flags = flags;
    }

    fn check_fresh(
        &self,
        feature: &Feature,
    ) -> UTResult<()> {
        if feature.is_stale() {
            return Err(feature.stale_error());
        }
        Ok(())
    }

    /// Keep the rows whose packed sample satisfies `predicate`.
    ///
    /// Evaluated over every underlying row, so the result replaces (rather
    /// than narrows) any earlier filter.
    pub fn filter<F>(
        &mut self,
        mut predicate: F,
    ) -> UTResult<&mut Self>
    where
        F: FnMut(&Sample) -> bool,
    {
        self.status.require("filter", Status::NOT_INITIALIZED)?;

        let mut indices = Vec::new();
        for index in 0..self.sample_size() {
            if predicate(&self.pack(index)?) {
                indices.push(index);
            }
        }

        log::debug!("filter: {} -> {} samples", self.len(), indices.len());
        self.set_legal(indices);
        self.status = Status::Organized;
        Ok(self)
    }

    /// Keep the visible rows whose `feature` value satisfies `predicate`.
    ///
    /// Evaluated over the currently visible rows only, so repeated calls narrow.
    pub fn filter_feature<F>(
        &mut self,
        feature: &str,
        mut predicate: F,
    ) -> UTResult<&mut Self>
    where
        F: FnMut(&Cell) -> bool,
    {
        self.status
            .require("filter_feature", Status::NOT_INITIALIZED)?;

        let target = self.feature(feature)?;
        let local = match self.data.get(feature) {
            Some(column) if !target.from_union() => {
                self.check_fresh(target)?;
                Some(column)
            }
            _ => None,
        };

        let mut indices = Vec::new();
        for &index in &self.legal_indices {
            let keep = match local {
                Some(column) => predicate(&column[index]),
                None => self.pack(index)?.get(feature).is_some_and(&mut predicate),
            };
            if keep {
                indices.push(index);
            }
        }

        log::debug!(
            "filter on {feature}: {} -> {} samples",
            self.len(),
            indices.len()
        );
        self.set_legal(indices);
        self.status = Status::Organized;
        Ok(self)
    }

    /// Is `instance_id` this dataset or one it soft-unions, transitively?
    ///
    /// While unions hold `Rc<UniTok>` and `union` takes `&mut self`, no dataset
    /// can reach the one being mutated; the check in `union` holds the line if
    /// datasets ever become shared and mutable.
    fn reaches(
        &self,
        instance_id: u64,
    ) -> bool {
        self.instance_id == instance_id
            || self
                .soft_unions
                .iter()
                .flat_map(|(_, others)| others)
                .any(|other| other.reaches(instance_id))
    }

    /// Join `other` through its key feature.
    ///
    /// `union_key` names the local link feature and defaults to the name of
    /// `other`'s key feature. The link vocabulary must equal `other`'s key
    /// vocabulary. `other`'s registries are merged in (minus its key feature);
    /// on any failure nothing is merged.
    pub fn union(
        &mut self,
        other: &Rc<UniTok>,
        mode: UnionMode,
        union_key: Option<&str>,
    ) -> UTResult<&mut Self> {
        self.status.require("union", Status::NOT_INITIALIZED)?;

        if let Some(current) = self.union_mode
            && current != mode
        {
            return Err(UnitokError::UnionModeConflict {
                current: current.to_string(),
                requested: mode.to_string(),
            });
        }

        if other.reaches(self.instance_id) {
            return Err(UnitokError::UnionCycle(format!(
                "{self} is reachable from {other}"
            )));
        }

        let other_key = other.key_feature().ok_or_else(|| {
            UnitokError::KeyFeatureViolation(format!("{other} has no key feature"))
        })?;
        let union_key = union_key.unwrap_or(other_key.name());

        let invalid = |reason: &str| UnitokError::InvalidUnionKey {
            key: union_key.to_string(),
            reason: reason.to_string(),
        };
        let link = self
            .meta
            .features
            .get(union_key)
            .ok_or_else(|| invalid("not found in the table"))?;
        if !link.is_processed() || !other_key.is_processed() {
            return Err(invalid("features of the union key should be processed"));
        }
        if link.return_list() {
            return Err(invalid("the link feature should be atomic"));
        }
        if link.from_union() {
            return Err(invalid("the link feature is itself attached through a soft union"));
        }

        let left = link.tokenizer().vocab();
        let right = other_key.tokenizer().vocab();
        if !left.equals_with(right, self.equality) {
            return Err(UnitokError::UnionKeyVocabMismatch {
                left: left.to_string(),
                right: right.to_string(),
            });
        }

        let vocabularies = self
            .meta
            .vocabularies
            .plan_merge(&other.meta.vocabularies, self.equality)?;
        let tokenizers = self
            .meta
            .tokenizers
            .plan_merge(&other.meta.tokenizers, self.equality)?;
        let registered = &self.meta.tokenizers;
        let features = self.meta.features.plan_merge(
            &other.meta.features,
            Some(other_key.name()),
            mode == UnionMode::Soft,
            |tokenizer| {
                registered
                    .get(tokenizer.tokenizer_id())
                    .cloned()
                    .unwrap_or_else(|| tokenizer.clone())
            },
        )?;

        let link = link.name().to_string();
        let columns = match mode {
            UnionMode::Soft => Vec::new(),
            UnionMode::Hard => self.gather(other, &link, &features)?,
        };

        log::debug!(
            "{mode} union {other} into {self} via {link}: +{} features",
            features.len()
        );

        self.meta.vocabularies.absorb(vocabularies);
        self.meta.tokenizers.absorb(tokenizers);
        self.meta.features.absorb(features);
        self.data.extend(columns);

        if mode == UnionMode::Soft {
            match self.soft_unions.iter_mut().find(|(name, _)| *name == link) {
                Some((_, others)) => others.push(other.clone()),
                None => self.soft_unions.push((link, vec![other.clone()])),
            }
        }

        self.union_mode = Some(mode);
        self.status = Status::Organized;
        Ok(self)
    }

    fn gather(
        &self,
        other: &UniTok,
        link: &str,
        features: &[Feature],
    ) -> UTResult<Vec<(String, Vec<Cell>)>> {
        let links = self
            .data
            .get(link)
            .ok_or_else(|| UnitokError::FeatureNotFound(link.to_string()))?;

        let mut columns = features
            .iter()
            .map(|f| (f.name().to_string(), Vec::with_capacity(links.len())))
            .collect::<Vec<_>>();

        for cell in links {
            let index = link_index(link, cell)?;
            let mut sample = other.pack(index)?;
            for (name, column) in columns.iter_mut() {
                let value = sample
                    .remove(name.as_str())
                    .ok_or_else(|| UnitokError::FeatureNotFound(name.clone()))?;
                column.push(value);
            }
        }
        Ok(columns)
    }

    /// The sample of one underlying row.
    ///
    /// Soft-unioned datasets are read through the current row's link values.
    pub fn pack(
        &self,
        index: usize,
    ) -> UTResult<Sample> {
        self.status.require("pack", Status::NOT_INITIALIZED)?;
        if index >= self.sample_size() {
            return Err(UnitokError::IndexOutOfRange {
                index,
                size: self.sample_size(),
            });
        }

        let mut sample = Sample::default();
        for feature in &self.meta.features {
            if feature.from_union() || !feature.is_processed() {
                continue;
            }
            self.check_fresh(feature)?;
            let column = self
                .data
                .get(feature.name())
                .ok_or_else(|| UnitokError::FeatureNotFound(feature.name().to_string()))?;
            sample.insert(feature.name().to_string(), column[index].clone());
        }

        for (link, others) in &self.soft_unions {
            let cell = sample
                .get(link)
                .ok_or_else(|| UnitokError::FeatureNotFound(link.clone()))?;
            let linked = link_index(link, cell)?;
            for other in others {
                for (name, value) in other.pack(linked)? {
                    if self.meta.features.has(&name) {
                        sample.insert(name, value);
                    }
                }
            }
        }
        Ok(sample)
    }

    /// The sample at a visible position.
    pub fn get(
        &self,
        position: usize,
    ) -> UTResult<Sample> {
        self.status.require("get", Status::NOT_INITIALIZED)?;
        let index = *self
            .legal_indices
            .get(position)
            .ok_or(UnitokError::IndexOutOfRange {
                index: position,
                size: self.len(),
            })?;
        self.pack(index)
    }

    /// The sample whose key token is `key`.
    pub fn get_by_key(
        &self,
        key: &str,
    ) -> UTResult<Sample> {
        self.status.require("get_by_key", Status::NOT_INITIALIZED)?;
        let feature = self
            .key_feature()
            .ok_or_else(|| UnitokError::KeyFeatureViolation("key feature not found".into()))?;

        let index = feature
            .tokenizer()
            .vocab()
            .get_id(key)
            .ok_or_else(|| UnitokError::SampleNotFound(key.to_string()))?;
        match self.legal_flags.get(index) {
            None => Err(UnitokError::IndexOutOfRange {
                index,
                size: self.sample_size(),
            }),
            Some(false) => Err(UnitokError::SampleFilteredOut(key.to_string())),
            Some(true) => self.pack(index),
        }
    }

    /// The sample at a visible position, narrowed to `selectors`.
    pub fn get_selected(
        &self,
        position: usize,
        selectors: &[Selector],
    ) -> UTResult<Sample> {
        let sample = self.get(position)?;
        self.select(&sample, selectors)
    }

    /// Narrow `sample` to the features matched by any of `selectors`.
    pub fn select(
        &self,
        sample: &Sample,
        selectors: &[Selector],
    ) -> UTResult<Sample> {
        self.status.require("select", Status::NOT_INITIALIZED)?;
        select_sample(&self.meta.features, sample, selectors)
    }

    /// Visible samples, in order.
    pub fn iter(&self) -> impl Iterator<Item = UTResult<Sample>> + '_ {
        (0..self.len()).map(move |position| self.get(position))
    }

    /// Re-slice a list feature's stored data and recompute its `max_len`.
    pub fn retruncate(
        &mut self,
        feature: &str,
        truncate: i64,
    ) -> UTResult<&mut Self> {
        self.status.require("retruncate", Status::NOT_INITIALIZED)?;

        let target = self.feature(feature)?;
        if truncate == 0 {
            log::warn!("retruncate {feature} with truncate=0 will do nothing");
        }
        if truncate.unsigned_abs() >= target.max_len() as u64 {
            log::warn!(
                "feature {feature} has the max length of {}, which is shorter than truncate value {truncate}",
                target.max_len()
            );
        }
        if !target.return_list() {
            return Err(UnitokError::UnexpectedShape(format!(
                "feature {feature} does not return list, not applicable to retruncate"
            )));
        }
        if target.from_union() {
            return Err(UnitokError::SoftUnionConstraint(format!(
                "feature {feature} has no local data; hard union or save and reload first"
            )));
        }

        let column = self
            .data
            .get_mut(feature)
            .ok_or_else(|| UnitokError::FeatureNotFound(feature.to_string()))?;

        let slice = TokenSlice::from_truncate(Some(truncate));
        let mut max_len = 0;
        for cell in column.iter_mut() {
            if let Cell::List(ids) = cell {
                *ids = slice.apply(ids);
                max_len = max_len.max(ids.len());
            }
        }

        if let Some(target) = self.meta.features.get_mut(feature) {
            target.set_truncate(truncate, max_len);
        }
        Ok(self)
    }

    /// Copy a processed feature and its data under `new_name`.
    pub fn replicate(
        &mut self,
        feature: &str,
        new_name: &str,
    ) -> UTResult<&Feature> {
        self.status.require("replicate", Status::NOT_INITIALIZED)?;

        let source = self.feature(feature)?;
        if !source.is_processed() {
            return Err(UnitokError::InvalidFeature(format!(
                "feature {feature} is not processed"
            )));
        }
        if source.from_union() {
            return Err(UnitokError::SoftUnionConstraint(format!(
                "feature {feature} has no local data; hard union or save and reload first"
            )));
        }

        let replica = source.replicate(new_name);
        let column = self
            .data
            .get(feature)
            .cloned()
            .ok_or_else(|| UnitokError::FeatureNotFound(feature.to_string()))?;

        self.meta.features.add(replica)?;
        self.data.insert(new_name.to_string(), column);
        self.status = Status::Organized;
        self.feature(new_name)
    }

    /// Remove a feature and its data.
    ///
    /// Its tokenizer goes too if no remaining feature uses it, and likewise
    /// its vocabulary if no remaining tokenizer uses it.
    pub fn remove_feature(
        &mut self,
        name: &str,
    ) -> UTResult<Feature> {
        let feature = self.feature(name)?;
        if feature.is_key() {
            return Err(UnitokError::KeyFeatureViolation(format!(
                "key feature {name} cannot be removed"
            )));
        }
        if self.soft_unions.iter().any(|(link, _)| link == name) {
            return Err(UnitokError::SoftUnionConstraint(format!(
                "feature {name} links a soft union and cannot be removed"
            )));
        }

        let feature = self
            .meta
            .features
            .remove(name)
            .ok_or_else(|| UnitokError::FeatureNotFound(name.to_string()))?;
        self.data.remove(name);

        let tokenizer = feature.tokenizer();
        if !self.meta.features.uses_tokenizer(tokenizer.tokenizer_id()) {
            self.meta.tokenizers.remove(tokenizer.tokenizer_id());
            let vocab = tokenizer.vocab().name();
            if !self.meta.tokenizers.uses_vocab(vocab) {
                self.meta.vocabularies.remove(vocab);
            }
        }

        log::debug!("removed {feature}");
        Ok(feature)
    }

    /// Overview of the registries.
    pub fn summarize(&self) -> UTResult<Summary> {
        self.status.require("summarize", Status::NOT_INITIALIZED)?;

        let features = self
            .meta
            .features
            .iter()
            .map(|feature| {
                let tokenizer = feature.tokenizer();
                let vocab = tokenizer.vocab();
                FeatureSummary {
                    tokenizer: tokenizer.detailed_classname(),
                    tokenizer_id: tokenizer.tokenizer_id().to_string(),
                    column_mapping: format!("{} -> {}", feature.column(), feature.name()),
                    vocab: format!("{} (size={})", vocab.name(), vocab.len()),
                    max_len: feature.return_list().then_some(feature.max_len()),
                }
            })
            .collect();

        Ok(Summary {
            unitok_version: parse_version(VERSION)?.to_string(),
            data_version: parse_version(&self.meta.version)?.to_string(),
            sample_size: self.sample_size(),
            key_feature: self.key_feature.clone().unwrap_or_default(),
            features,
        })
    }

    /// Write the manifest, vocabularies, and data blob into `save_dir`.
    ///
    /// Soft-unioned features are materialized, so the directory loads on its own.
    pub fn save(
        &mut self,
        save_dir: impl AsRef<Path>,
    ) -> UTResult<PathBuf> {
        self.status.require("save", Status::NOT_INITIALIZED)?;
        let save_dir = save_dir.as_ref();
        std::fs::create_dir_all(save_dir)?;

        let attached = self.materialize()?;
        self.meta.save(save_dir)?;

        let mut data: BTreeMap<&str, &[Cell]> = BTreeMap::new();
        for feature in &self.meta.features {
            if let Some(column) = self.data.get(feature.name()) {
                data.insert(feature.name(), column);
            }
        }
        for (name, column) in &attached {
            data.insert(name, column);
        }

        let path = save_dir.join(DATA_FILENAME);
        let mut writer = BufWriter::new(File::create(&path)?);
        serde_json::to_writer(&mut writer, &data)?;
        writer.flush()?;

        log::info!("saved {} features to {}", data.len(), save_dir.display());
        self.save_dir = Some(save_dir.to_path_buf());
        Ok(path)
    }

    fn materialize(&self) -> UTResult<Vec<(String, Vec<Cell>)>> {
        let mut columns = self
            .meta
            .features
            .iter()
            .filter(|f| f.from_union() && f.is_processed())
            .map(|f| (f.name().to_string(), Vec::with_capacity(self.sample_size())))
            .collect::<Vec<_>>();
        if columns.is_empty() {
            return Ok(columns);
        }

        for index in 0..self.sample_size() {
            let mut sample = self.pack(index)?;
            for (name, column) in columns.iter_mut() {
                let value = sample
                    .remove(name.as_str())
                    .ok_or_else(|| UnitokError::FeatureNotFound(name.clone()))?;
                column.push(value);
            }
        }
        Ok(columns)
    }

    /// Load a saved dataset with the built-in tokenizer classes.
    pub fn load(save_dir: impl AsRef<Path>) -> UTResult<Self> {
        Self::load_with(save_dir, &TokenizerRegistry::default())
    }

    /// Load a saved dataset, constructing tokenizers through `registry`.
    pub fn load_with(
        save_dir: impl AsRef<Path>,
        registry: &TokenizerRegistry,
    ) -> UTResult<Self> {
        let save_dir = save_dir.as_ref();
        let meta = Meta::load(save_dir, registry)?;

        let path = save_dir.join(DATA_FILENAME);
        let data: HashMap<String, Vec<Cell>> =
            serde_json::from_reader(BufReader::new(File::open(&path)?))?;

        let mut keys = meta.features.iter().filter(|f| f.is_key());
        let key = keys
            .next()
            .ok_or_else(|| UnitokError::KeyFeatureViolation("key feature not found".into()))?
            .name()
            .to_string();
        if let Some(extra) = keys.next() {
            return Err(UnitokError::KeyFeatureViolation(format!(
                "multiple key features found: {key} and {}",
                extra.name()
            )));
        }

        for feature in meta.features.iter().filter(|f| f.is_processed()) {
            if !data.contains_key(feature.name()) {
                return Err(UnitokError::FeatureNotFound(format!(
                    "{} in {}",
                    feature.name(),
                    path.display()
                )));
            }
        }

        let mut ut = Self {
            meta,
            data: data.into_iter().collect(),
            key_feature: Some(key),
            save_dir: Some(save_dir.to_path_buf()),
            status: Status::Tokenized,
            ..Self::default()
        };
        ut.init_indices()?;

        for (name, column) in &ut.data {
            if column.len() != ut.sample_size() {
                return Err(UnitokError::SampleSizeMismatch {
                    expected: ut.sample_size(),
                    actual: column.len(),
                });
            }
            log::debug!("loaded column {name} ({} rows)", column.len());
        }
        Ok(ut)
    }
}

impl Display for UniTok {
    fn fmt(
        &self,
        f: &mut Formatter<'_>,
    ) -> core::fmt::Result {
        match &self.save_dir {
            Some(dir) => write!(f, "UniTok({}, size={})", dir.display(), self.sample_size()),
            None => write!(f, "UniTok(Runtime Instance, size={})", self.sample_size()),
        }
    }
}

fn row_value(row: usize) -> UTResult<Value> {
    i64::try_from(row)
        .map(Value::Int)
        .map_err(|_| UnitokError::Parse(format!("row index {row} overflows i64")))
}

fn link_index(
    link: &str,
    cell: &Cell,
) -> UTResult<usize> {
    cell.as_atom().ok_or_else(|| {
        UnitokError::UnexpectedShape(format!("link feature {link} holds a list, expected an id"))
    })
}
