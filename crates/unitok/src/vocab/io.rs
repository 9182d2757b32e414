//! # Vocabulary IO
//!
//! Vocabularies are stored as an ordered token list, one token per line;
//! a token's id is its line number.
//!
//! ```terminaloutput
//! {TOKEN 0}
//! {TOKEN 1}
//! ...
//! ```

use std::{
    fs::File,
    io::{BufRead, BufReader, BufWriter, Write},
    path::Path,
};

use crate::errors::{UTResult, UnitokError};

/// The file extension for vocabulary files.
pub const VOCAB_EXTENSION: &str = "vocab";

/// Load an ordered token list from a vocab file.
///
/// # Arguments
/// * `path` - the path to the vocabulary file.
pub fn load_token_list_path<P: AsRef<Path>>(path: P) -> UTResult<Vec<String>> {
    let reader = BufReader::new(File::open(path)?);
    read_token_list(reader)
}

/// Read an ordered token list from a line reader.
///
/// # Arguments
/// * `reader` - the line reader.
pub fn read_token_list<R: BufRead>(reader: R) -> UTResult<Vec<String>> {
    let mut tokens = Vec::new();
    for line in reader.lines() {
        tokens.push(line?);
    }
    Ok(tokens)
}

/// Save an ordered token list to a vocab file.
///
/// # Arguments
/// * `tokens` - the tokens, in id order.
/// * `path` - the path to save the vocabulary to.
pub fn save_token_list_path<S: AsRef<str>, P: AsRef<Path>>(
    tokens: &[S],
    path: P,
) -> UTResult<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_token_list(tokens, &mut writer)?;
    writer.flush()?;
    Ok(())
}

/// Write an ordered token list to a [`Write`] writer.
///
/// # Arguments
/// * `tokens` - the tokens, in id order.
/// * `writer` - the writer to target.
pub fn write_token_list<S, W>(
    tokens: &[S],
    writer: &mut W,
) -> UTResult<()>
where
    S: AsRef<str>,
    W: Write,
{
    for token in tokens {
        let token = token.as_ref();
        if has_line_break(token) {
            return Err(UnitokError::InvalidToken {
                token: token.to_string(),
            });
        }
        writeln!(writer, "{token}")?;
    }
    Ok(())
}

/// True if the token cannot be stored on a single line.
pub fn has_line_break(token: &str) -> bool {
    token.contains(['\n', '\r'])
}
