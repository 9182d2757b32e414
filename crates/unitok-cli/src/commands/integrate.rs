use std::{path::PathBuf, rc::Rc};

use unitok::{
    FeatureOptions,
    UniTok,
    tokenizer::{TokenizerArgs, TokenizerRef, TokenizerRegistry},
    vocab::{VocabRef, Vocabulary, io::VOCAB_EXTENSION},
};

use crate::{
    input::{FileFormat, read_table},
    logging::LogArgs,
};

/// Parse a `key=value` tokenizer parameter.
fn parse_param(arg: &str) -> Result<(String, String), String> {
    arg.split_once('=')
        .map(|(key, value)| (key.trim().to_string(), value.to_string()))
        .filter(|(key, _)| !key.is_empty())
        .ok_or_else(|| format!("expected key=value, got {arg:?}"))
}

/// Args for the integrate command.
#[derive(clap::Args, Debug)]
pub struct IntegrateArgs {
    /// Dataset directory.
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Input file (csv, tsv or parquet).
    #[arg(long, short)]
    file: PathBuf,

    /// Input format; guessed from the file extension by default.
    #[arg(long)]
    format: Option<FileFormat>,

    /// Column to tokenize.
    #[arg(long, short)]
    column: String,

    /// Exported feature name; defaults to the column name.
    #[arg(long, short)]
    name: Option<String>,

    /// Vocabulary name, or a path to a `.vocab` file.
    #[arg(long)]
    vocab: Option<String>,

    /// Tokenizer class name.
    #[arg(long)]
    tokenizer: Option<String>,

    /// Reuse the dataset's tokenizer with this id, or give a new tokenizer this id.
    #[arg(long)]
    tokenizer_id: Option<String>,

    /// Truncation for list tokenizers; negative keeps the tail.
    #[arg(long, allow_negative_numbers = true)]
    truncate: Option<i64>,

    /// Tokenizer parameter as `key=value`; repeatable.
    #[arg(long = "param", value_parser = parse_param)]
    params: Vec<(String, String)>,

    #[clap(flatten)]
    logging: LogArgs,
}

impl IntegrateArgs {
    /// Run the integrate command.
    pub fn run(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.logging.setup_logging()?;

        let table = read_table(&self.file, self.format)?;
        let mut ut = UniTok::load(&self.path)?;
        let tokenizer = self.tokenizer(&ut, &TokenizerRegistry::default())?;

        let mut options = FeatureOptions::new().with_column(self.column.as_str());
        if let Some(name) = &self.name {
            options = options.with_name(name.as_str());
        }
        if let Some(truncate) = self.truncate {
            options = options.with_truncate(truncate);
        }
        ut.add_feature(tokenizer, options)?;

        let path = ut.tokenize(&table)?.save(&self.path)?;
        log::info!("wrote {}", path.display());
        Ok(())
    }

    /// Reuse a registered tokenizer, or build a new one by class name.
    fn tokenizer(
        &self,
        ut: &UniTok,
        registry: &TokenizerRegistry,
    ) -> Result<TokenizerRef, Box<dyn std::error::Error>> {
        if let Some(id) = &self.tokenizer_id
            && let Some(tokenizer) = ut.meta().tokenizers.get(id)
        {
            log::info!("reusing tokenizer {}", tokenizer.describe());
            return Ok(tokenizer.clone());
        }

        let (Some(classname), Some(vocab)) = (&self.tokenizer, &self.vocab) else {
            return Err("--tokenizer and --vocab are required unless --tokenizer-id names an existing tokenizer".into());
        };
        if let Some(id) = &self.tokenizer_id {
            log::warn!("unknown tokenizer id {id}, creating a new {classname} tokenizer");
        }

        let mut args = TokenizerArgs::new(self.vocab(ut, vocab)?)
            .with_tokenizer_id(self.tokenizer_id.clone());
        for (key, value) in &self.params {
            args = args.with_param(key.as_str(), value.as_str());
        }
        Ok(registry.build(classname, &args)?)
    }

    /// Resolve `--vocab`: a `.vocab` file, a vocabulary of the dataset, or a new one.
    fn vocab(
        &self,
        ut: &UniTok,
        vocab: &str,
    ) -> Result<VocabRef, Box<dyn std::error::Error>> {
        let path = PathBuf::from(vocab);
        if path.extension().is_some_and(|ext| ext == VOCAB_EXTENSION) {
            let name = path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .ok_or_else(|| format!("invalid vocab path: {vocab}"))?;
            return Ok(Rc::new(Vocabulary::load_from(name, &path)?));
        }

        Ok(match ut.meta().vocabularies.get(vocab) {
            Some(existing) => existing.clone(),
            None => Vocabulary::shared(vocab),
        })
    }
}
