//! Loading datasets from disk.

use crate::config::InputSettings;
use anyhow::{Context as _, Result};
use polars::prelude::*;
use std::path::Path;

/// Read a CSV, Parquet or JSON file into a frame, chosen by extension.
pub fn load_df(path: &Path, settings: &InputSettings) -> Result<DataFrame> {
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or("")
        .to_lowercase();

    let df = match ext.as_str() {
        "csv" => {
            let separator = u8::try_from(settings.separator)
                .ok()
                .filter(u8::is_ascii)
                .with_context(|| {
                    format!("CSV separator '{}' must be ASCII", settings.separator)
                })?;
            let null_values = (!settings.null_values.is_empty()).then(|| {
                let tokens = settings.null_values.iter().map(|v| v.as_str().into());
                NullValues::AllColumns(tokens.collect())
            });

            LazyCsvReader::new(path)
                .with_has_header(settings.has_header)
                .with_separator(separator)
                .with_null_values(null_values)
                .with_infer_schema_length(settings.infer_schema_length)
                .finish()?
                .collect()
                .with_context(|| format!("Failed to read CSV {}", path.display()))?
        }
        "parquet" => ParquetReader::new(
            std::fs::File::open(path)
                .with_context(|| format!("Failed to open {}", path.display()))?,
        )
        .finish()
        .context("Failed to read Parquet")?,
        "json" => JsonReader::new(
            std::fs::File::open(path)
                .with_context(|| format!("Failed to open {}", path.display()))?,
        )
        .finish()
        .context("Failed to read JSON")?,
        _ => return Err(anyhow::anyhow!("Unsupported file extension: {ext}")),
    };

    tracing::debug!(
        path = %path.display(),
        rows = df.height(),
        columns = df.width(),
        "dataset loaded"
    );
    Ok(df)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    fn write_file(dir: &Path, name: &str, content: &str) -> Result<std::path::PathBuf> {
        let path = dir.join(name);
        let mut file = std::fs::File::create(&path)?;
        file.write_all(content.as_bytes())?;
        Ok(path)
    }

    #[test]
    fn test_csv_null_tokens() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = write_file(dir.path(), "data.csv", "a,b\n1,x\nNA,y\n3,\n")?;

        let df = load_df(&path, &InputSettings::default())?;
        assert_eq!(df.shape(), (3, 2));
        assert_eq!(df.column("a")?.null_count(), 1);
        assert_eq!(df.column("b")?.null_count(), 1);
        Ok(())
    }

    #[test]
    fn test_custom_separator() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = write_file(dir.path(), "data.csv", "a;b\n1;2\n")?;
        let settings = InputSettings {
            separator: ';',
            ..Default::default()
        };

        let df = load_df(&path, &settings)?;
        assert_eq!(df.get_column_names_str(), ["a", "b"]);
        Ok(())
    }

    #[test]
    fn test_unsupported_extension() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = write_file(dir.path(), "data.txt", "a\n1\n")?;
        let err = load_df(&path, &InputSettings::default()).expect_err("txt is unsupported");
        assert!(err.to_string().contains("Unsupported file extension"));
        Ok(())
    }

    #[test]
    fn test_non_ascii_separator_rejected() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = write_file(dir.path(), "data.csv", "a\n1\n")?;
        let settings = InputSettings {
            separator: '§',
            ..Default::default()
        };
        assert!(load_df(&path, &settings).is_err());
        Ok(())
    }
}
