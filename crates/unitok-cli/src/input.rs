//! Reading tabular input files into a [`DataFrame`].

use std::{fs::File, path::Path};

use arrow::{
    array::{Array, AsArray},
    compute::cast,
    datatypes::{DataType, Float64Type, Int64Type},
    error::ArrowError,
};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use unitok::{DataFrame, Value};

/// Supported input formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum FileFormat {
    /// Comma separated values.
    Csv,

    /// Tab separated values.
    Tsv,

    /// Apache Parquet.
    Parquet,
}

impl FileFormat {
    /// Guess the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "csv" => Some(FileFormat::Csv),
            "tsv" => Some(FileFormat::Tsv),
            "parquet" => Some(FileFormat::Parquet),
            _ => None,
        }
    }
}

/// Load `path` as a [`DataFrame`].
///
/// `format` overrides the extension-based guess.
pub fn read_table(
    path: &Path,
    format: Option<FileFormat>,
) -> Result<DataFrame, Box<dyn std::error::Error>> {
    let format = format
        .or_else(|| FileFormat::from_path(path))
        .ok_or_else(|| format!("unsupported file format: {}", path.display()))?;

    log::info!("reading {} as {format:?}", path.display());
    match format {
        FileFormat::Csv => read_delimited(path, b','),
        FileFormat::Tsv => read_delimited(path, b'\t'),
        FileFormat::Parquet => read_parquet(path),
    }
}

/// Delimited text; fields are typed by [`parse_field`].
fn read_delimited(
    path: &Path,
    delimiter: u8,
) -> Result<DataFrame, Box<dyn std::error::Error>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .from_path(path)?;

    let names = reader
        .headers()?
        .iter()
        .map(str::to_string)
        .collect::<Vec<_>>();
    let mut columns = vec![Vec::new(); names.len()];

    for record in reader.records() {
        let record = record?;
        for (column, field) in columns.iter_mut().zip(record.iter()) {
            column.push(parse_field(field));
        }
    }

    let mut frame = DataFrame::new();
    for (name, values) in names.into_iter().zip(columns) {
        frame = frame.with_column(name, values)?;
    }
    Ok(frame)
}

/// Type a text field: empty is null, then integer, float, or string.
pub fn parse_field(field: &str) -> Value {
    if field.is_empty() {
        Value::Null
    } else if let Ok(i) = field.parse::<i64>() {
        Value::Int(i)
    } else if let Ok(f) = field.parse::<f64>() {
        Value::Float(f)
    } else {
        Value::Str(field.to_string())
    }
}

fn read_parquet(path: &Path) -> Result<DataFrame, Box<dyn std::error::Error>> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(File::open(path)?)?;
    let names = builder
        .schema()
        .fields()
        .iter()
        .map(|field| field.name().clone())
        .collect::<Vec<_>>();
    let mut columns = vec![Vec::new(); names.len()];

    for batch in builder.build()? {
        let batch = batch?;
        for (column, array) in columns.iter_mut().zip(batch.columns()) {
            column.extend(array_values(array.as_ref())?);
        }
    }

    let mut frame = DataFrame::new();
    for (name, values) in names.into_iter().zip(columns) {
        frame = frame.with_column(name, values)?;
    }
    Ok(frame)
}

/// Convert one arrow column into raw values.
///
/// Integers and floats of any width are widened; list columns recurse.
fn array_values(array: &dyn Array) -> Result<Vec<Value>, ArrowError> {
    let values = match array.data_type() {
        DataType::Null => vec![Value::Null; array.len()],
        DataType::Boolean => array
            .as_boolean()
            .iter()
            .map(|v| v.map_or(Value::Null, Value::Bool))
            .collect(),
        DataType::Utf8 => array
            .as_string::<i32>()
            .iter()
            .map(|v| v.map_or(Value::Null, Value::from))
            .collect(),
        DataType::LargeUtf8 => array
            .as_string::<i64>()
            .iter()
            .map(|v| v.map_or(Value::Null, Value::from))
            .collect(),
        DataType::Int8
        | DataType::Int16
        | DataType::Int32
        | DataType::Int64
        | DataType::UInt8
        | DataType::UInt16
        | DataType::UInt32 => cast(array, &DataType::Int64)?
            .as_primitive::<Int64Type>()
            .iter()
            .map(|v| v.map_or(Value::Null, Value::Int))
            .collect(),
        DataType::Float16 | DataType::Float32 | DataType::Float64 => cast(array, &DataType::Float64)?
            .as_primitive::<Float64Type>()
            .iter()
            .map(|v| v.map_or(Value::Null, Value::Float))
            .collect(),
        DataType::List(_) => {
            let lists = array.as_list::<i32>();
            let mut values = Vec::with_capacity(lists.len());
            for row in 0..lists.len() {
                values.push(if lists.is_null(row) {
                    Value::Null
                } else {
                    Value::List(array_values(lists.value(row).as_ref())?)
                });
            }
            values
        }
        DataType::LargeList(_) => {
            let lists = array.as_list::<i64>();
            let mut values = Vec::with_capacity(lists.len());
            for row in 0..lists.len() {
                values.push(if lists.is_null(row) {
                    Value::Null
                } else {
                    Value::List(array_values(lists.value(row).as_ref())?)
                });
            }
            values
        }
        other => {
            log::debug!("casting unsupported arrow type {other} to utf8");
            return array_values(cast(array, &DataType::Utf8)?.as_ref());
        }
    };
    Ok(values)
}

#[cfg(test)]
mod tests {
    use std::{io::Write, sync::Arc};

    use arrow::{
        array::{ArrayRef, Int32Array, ListArray, StringArray},
        datatypes::Int32Type,
        record_batch::RecordBatch,
    };
    use parquet::arrow::ArrowWriter;
    use unitok::Table;

    use super::*;

    #[test]
    fn test_parse_field() {
        assert_eq!(parse_field(""), Value::Null);
        assert_eq!(parse_field("42"), Value::Int(42));
        assert_eq!(parse_field("-1.5"), Value::Float(-1.5));
        assert_eq!(parse_field("n01"), Value::from("n01"));
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(
            FileFormat::from_path(Path::new("news.tsv")),
            Some(FileFormat::Tsv)
        );
        assert_eq!(
            FileFormat::from_path(Path::new("a/b.parquet")),
            Some(FileFormat::Parquet)
        );
        assert_eq!(FileFormat::from_path(Path::new("news.json")), None);
    }

    #[test]
    fn test_read_tsv() {
        tempdir::TempDir::new("input")
            .and_then(|dir| {
                let path = dir.path().join("news.tsv");
                let mut file = File::create(&path)?;
                writeln!(file, "nid\ttitle\tclicks")?;
                writeln!(file, "n0\thello world\t3")?;
                writeln!(file, "n1\tbye\t")?;
                drop(file);

                let frame = read_table(&path, None).unwrap();
                assert_eq!(frame.len(), 2);
                assert_eq!(frame.value("title", 0), Some(&Value::from("hello world")));
                assert_eq!(frame.value("clicks", 0), Some(&Value::Int(3)));
                assert_eq!(frame.value("clicks", 1), Some(&Value::Null));
                Ok(())
            })
            .unwrap();
    }

    #[test]
    fn test_read_parquet() {
        tempdir::TempDir::new("input")
            .and_then(|dir| {
                let nid: ArrayRef = Arc::new(StringArray::from(vec!["n0", "n1"]));
                let size: ArrayRef = Arc::new(Int32Array::from(vec![Some(7), None]));
                let tags: ArrayRef = Arc::new(ListArray::from_iter_primitive::<Int32Type, _, _>(
                    vec![Some(vec![Some(1), Some(2)]), None],
                ));
                let batch = RecordBatch::try_from_iter([("nid", nid), ("size", size), ("tags", tags)])
                    .unwrap();

                let path = dir.path().join("news.parquet");
                let mut writer = ArrowWriter::try_new(File::create(&path)?, batch.schema(), None).unwrap();
                writer.write(&batch).unwrap();
                writer.close().unwrap();

                let frame = read_table(&path, None).unwrap();
                assert_eq!(frame.len(), 2);
                assert_eq!(frame.value("nid", 1), Some(&Value::from("n1")));
                assert_eq!(frame.value("size", 0), Some(&Value::Int(7)));
                assert_eq!(frame.value("size", 1), Some(&Value::Null));
                assert_eq!(
                    frame.value("tags", 0),
                    Some(&Value::List(vec![Value::Int(1), Value::Int(2)]))
                );
                assert_eq!(frame.value("tags", 1), Some(&Value::Null));
                Ok(())
            })
            .unwrap();
    }
}
