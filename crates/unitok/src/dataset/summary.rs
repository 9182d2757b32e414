use core::fmt::{Display, Formatter};

use serde::Serialize;

/// One feature row of a [`Summary`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeatureSummary {
    /// Tokenizer class, e.g. `entity` or `unknown[bert]`.
    pub tokenizer: String,

    /// Tokenizer id.
    pub tokenizer_id: String,

    /// `column -> name`.
    pub column_mapping: String,

    /// `vocab (size=N)`.
    pub vocab: String,

    /// Longest stored list; `None` for atomic features.
    pub max_len: Option<usize>,
}

/// Structured overview of a dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    /// Version of this library's manifest format.
    pub unitok_version: String,

    /// Version the data was loaded from.
    pub data_version: String,

    /// Number of underlying rows.
    pub sample_size: usize,

    /// Key feature name.
    pub key_feature: String,

    /// One row per feature, in registration order.
    pub features: Vec<FeatureSummary>,
}

const HEADERS: [&str; 5] = [
    "Tokenizer",
    "Tokenizer ID",
    "Column Mapping",
    "Vocab",
    "Max Length",
];

impl Display for Summary {
    fn fmt(
        &self,
        f: &mut Formatter<'_>,
    ) -> core::fmt::Result {
        writeln!(
            f,
            "UniTok (v{}), Data (v{})",
            self.unitok_version, self.data_version
        )?;
        writeln!(f, "Sample Size: {}", self.sample_size)?;
        writeln!(f, "ID Column: {}", self.key_feature)?;
        writeln!(f)?;

        let rows = self
            .features
            .iter()
            .map(|row| {
                [
                    row.tokenizer.clone(),
                    row.tokenizer_id.clone(),
                    row.column_mapping.clone(),
                    row.vocab.clone(),
                    row.max_len
                        .map_or_else(|| "N/A".to_string(), |len| len.to_string()),
                ]
            })
            .collect::<Vec<_>>();

        let mut widths = HEADERS.map(str::len);
        for row in &rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let header = HEADERS.map(str::to_string);
        for row in core::iter::once(&header).chain(&rows) {
            let line = row
                .iter()
                .zip(widths)
                .map(|(cell, width)| format!("{cell:<width$}"))
                .collect::<Vec<_>>()
                .join(" | ");
            writeln!(f, "{}", line.trim_end())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let summary = Summary {
            unitok_version: "4.1".into(),
            data_version: "4.1".into(),
            sample_size: 3,
            key_feature: "id".into(),
            features: vec![
                FeatureSummary {
                    tokenizer: "entity".into(),
                    tokenizer_id: "t_id".into(),
                    column_mapping: "id -> id".into(),
                    vocab: "id (size=3)".into(),
                    max_len: None,
                },
                FeatureSummary {
                    tokenizer: "split".into(),
                    tokenizer_id: "t_words".into(),
                    column_mapping: "title -> title".into(),
                    vocab: "words (size=12)".into(),
                    max_len: Some(4),
                },
            ],
        };

        let text = summary.to_string();
        let lines = text.lines().collect::<Vec<_>>();
        assert_eq!(lines[0], "UniTok (v4.1), Data (v4.1)");
        assert_eq!(lines[1], "Sample Size: 3");
        assert_eq!(lines[2], "ID Column: id");
        assert!(lines[4].starts_with("Tokenizer | Tokenizer ID | Column Mapping"));
        assert!(lines[5].ends_with("| N/A"));
        assert!(lines[6].ends_with("| 4"));
    }
}
