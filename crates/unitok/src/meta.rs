//! # Manifest
//!
//! [`Meta`] holds a dataset's registries and persists them as a versioned
//! `meta.json` manifest; vocabulary contents live in sibling `.vocab` files.

use std::{
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::{Path, PathBuf},
    rc::Rc,
};

use serde::{Deserialize, Serialize};

use crate::{
    errors::{UTResult, UnitokError},
    feature::{Feature, FeatureDescriptor},
    index_set::{FeatureSet, TokenizerSet, VocabularySet},
    tokenizer::{TokenizerArgs, TokenizerDescriptor, TokenizerRegistry},
    vocab::{Vocabulary, VocabularyDescriptor},
};

/// The manifest version written by this crate.
pub const VERSION: &str = "unidep-v4.1";

/// Manifest file name.
pub const META_FILENAME: &str = "meta.json";

/// Manifest file name used by older releases.
pub const LEGACY_META_FILENAME: &str = "meta.data.json";

const VERSION_PREFIX: &str = "unidep-v";
const LEGACY_VERSION_PREFIX: &str = "UniDep-";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const NOTE: &str = "Not compatible with unitok-v3 or lower version, \
please upgrade by `pip install unitok>4.0.0` to load the data.";
const WEBSITE: &str = "https://unitok.github.io";

/// Strip the `unidep-v` prefix from a manifest version.
///
/// Legacy `UniDep-` and unrecognized versions fail with migration instructions.
pub fn parse_version(version: &str) -> UTResult<&str> {
    if let Some(number) = version.strip_prefix(VERSION_PREFIX) {
        return Ok(number);
    }

    let hint = if version.starts_with(LEGACY_VERSION_PREFIX) {
        "Please downgrade the unitok version by `pip install unitok==3.5.3`, \
or use `unidep-upgrade-v4` to upgrade the version."
    } else {
        "Please downgrade the unitok version by `pip install unitok==3.5.3` for compatible upgrade, \
and then install the latest unitok version, following the use of `unidep-upgrade-v4` to upgrade the version."
    };
    Err(UnitokError::UnsupportedVersion {
        version: version.to_string(),
        hint,
    })
}

fn now() -> String {
    chrono::Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// The on-disk manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    /// Format version, `unidep-v{N}`.
    pub version: Option<String>,

    /// Compatibility note.
    #[serde(default)]
    pub note: String,

    /// Project website.
    #[serde(default)]
    pub website: String,

    /// Creation timestamp.
    #[serde(default)]
    pub created_at: Option<String>,

    /// Last save timestamp.
    #[serde(default)]
    pub modified_at: Option<String>,

    /// Vocabulary entries.
    #[serde(default)]
    pub vocabularies: Vec<VocabularyDescriptor>,

    /// Tokenizer entries.
    #[serde(default)]
    pub tokenizers: Vec<TokenizerDescriptor>,

    /// Feature entries; older manifests call them `jobs`.
    #[serde(default, alias = "jobs")]
    pub features: Vec<FeatureDescriptor>,
}

impl Manifest {
    /// Read the manifest in `save_dir`, falling back to the legacy file name.
    ///
    /// A version other than [`VERSION`] only warns.
    pub fn read(save_dir: impl AsRef<Path>) -> UTResult<Self> {
        let save_dir = save_dir.as_ref();
        let mut path = save_dir.join(META_FILENAME);
        if !path.exists() {
            path = save_dir.join(LEGACY_META_FILENAME);
        }
        if !path.exists() {
            return Err(UnitokError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("meta file not found in {}", save_dir.display()),
            )));
        }

        let manifest: Manifest = serde_json::from_reader(BufReader::new(File::open(&path)?))?;
        let version = manifest.version.as_deref().ok_or_else(|| {
            UnitokError::Parse(format!("version not found in the meta file {}", path.display()))
        })?;

        if parse_version(version)? != parse_version(VERSION)? {
            log::warn!("version mismatch ({version} != {VERSION}), unexpected error may occur");
        }
        Ok(manifest)
    }

    /// Write to `{save_dir}/meta.json`.
    pub fn write(
        &self,
        save_dir: impl AsRef<Path>,
    ) -> UTResult<PathBuf> {
        let path = save_dir.as_ref().join(META_FILENAME);
        let mut writer = BufWriter::new(File::create(&path)?);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush()?;
        Ok(path)
    }
}

/// A dataset's registries, plus manifest bookkeeping.
#[derive(Debug, Clone)]
pub struct Meta {
    /// The version the registries were loaded from.
    pub version: String,

    /// Compatibility note.
    pub note: String,

    /// Project website.
    pub website: String,

    /// Creation timestamp.
    pub created_at: String,

    /// Last save timestamp.
    pub modified_at: String,

    /// Vocabularies, by name.
    pub vocabularies: VocabularySet,

    /// Tokenizers, by tokenizer id.
    pub tokenizers: TokenizerSet,

    /// Features, by export name.
    pub features: FeatureSet,
}

impl Default for Meta {
    fn default() -> Self {
        let created_at = now();
        Self {
            version: VERSION.to_string(),
            note: NOTE.to_string(),
            website: WEBSITE.to_string(),
            modified_at: created_at.clone(),
            created_at,
            vocabularies: VocabularySet::new(),
            tokenizers: TokenizerSet::new(),
            features: FeatureSet::new(),
        }
    }
}

impl Meta {
    /// Empty registries.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the manifest for the current registries.
    pub fn manifest(&self) -> Manifest {
        Manifest {
            version: Some(VERSION.to_string()),
            note: self.note.clone(),
            website: self.website.clone(),
            created_at: Some(self.created_at.clone()),
            modified_at: Some(self.modified_at.clone()),
            vocabularies: self.vocabularies.iter().map(|v| v.descriptor()).collect(),
            tokenizers: self.tokenizers.iter().map(|t| t.descriptor()).collect(),
            features: self.features.iter().map(Feature::descriptor).collect(),
        }
    }

    /// Write the manifest and every vocabulary into `save_dir`.
    pub fn save(
        &mut self,
        save_dir: impl AsRef<Path>,
    ) -> UTResult<PathBuf> {
        let save_dir = save_dir.as_ref();
        self.modified_at = now();

        for vocab in &self.vocabularies {
            vocab.save(save_dir)?;
        }
        self.manifest().write(save_dir)
    }

    /// Load the manifest and vocabularies in `save_dir`.
    ///
    /// Tokenizer classes missing from `registry` load as placeholders.
    pub fn load(
        save_dir: impl AsRef<Path>,
        registry: &TokenizerRegistry,
    ) -> UTResult<Self> {
        let save_dir = save_dir.as_ref();
        let manifest = Manifest::read(save_dir)?;

        let mut vocabularies = VocabularySet::new();
        vocabularies.update(
            manifest
                .vocabularies
                .iter()
                .map(|v| Vocabulary::load_from(v.name.clone(), save_dir).map(Rc::new))
                .collect::<UTResult<Vec<_>>>()?,
        )?;

        let mut tokenizers = TokenizerSet::new();
        for descriptor in manifest.tokenizers {
            let vocab = vocabularies
                .get(&descriptor.vocab)
                .cloned()
                .ok_or_else(|| UnitokError::VocabularyNotFound(descriptor.vocab.clone()))?;

            let args = TokenizerArgs {
                vocab,
                tokenizer_id: Some(descriptor.tokenizer_id),
                params: descriptor.params,
            };
            tokenizers.add(registry.build_or_unknown(&descriptor.classname, &args)?)?;
        }

        let mut features = FeatureSet::new();
        for descriptor in manifest.features {
            let tokenizer = tokenizers
                .get(&descriptor.tokenizer)
                .cloned()
                .ok_or_else(|| UnitokError::TokenizerNotFound(descriptor.tokenizer.clone()))?;
            features.add(Feature::restore(descriptor, tokenizer))?;
        }

        log::debug!(
            "loaded meta from {}: {} vocabularies, {} tokenizers, {} features",
            save_dir.display(),
            vocabularies.len(),
            tokenizers.len(),
            features.len()
        );

        let created_at = manifest.created_at.unwrap_or_else(now);
        Ok(Self {
            version: manifest.version.unwrap_or_else(|| VERSION.to_string()),
            note: NOTE.to_string(),
            website: WEBSITE.to_string(),
            modified_at: manifest.modified_at.unwrap_or_else(|| created_at.clone()),
            created_at,
            vocabularies,
            tokenizers,
            features,
        })
    }
}
