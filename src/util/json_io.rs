
use anyhow::Context;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Loads a JSON file into any deserializable type, transparently handling gzip.
/// # Arguments
/// * `filename` - the file path to open and parse
/// # Errors
/// * if the file is absent or cannot be opened
/// * if the contents are not valid JSON for the target type
pub fn load_json<T: serde::de::DeserializeOwned>(filename: &Path) -> anyhow::Result<T> {
    let fp: Box<dyn std::io::Read> = if filename.extension().unwrap_or_default() == "gz" {
        Box::new(
            flate2::read::MultiGzDecoder::new(
                File::open(filename)
                    .with_context(|| format!("Error while opening {filename:?}:"))?
            )
        )
    } else {
        Box::new(
            File::open(filename)
                .with_context(|| format!("Error while opening {filename:?}:"))?
        )
    };
    let result: T = serde_json::from_reader(fp)
        .with_context(|| format!("Error while deserializing {filename:?}:"))?;
    Ok(result)
}

/// Saves a serializable value as JSON, transparently handling gzip.
/// # Arguments
/// * `data` - the value to serialize
/// * `out_filename` - user provided path to write to
/// # Errors
/// * if opening or writing to the file throw errors
/// * if JSON serialization throws errors
pub fn save_json<T: serde::Serialize>(data: &T, out_filename: &Path) -> anyhow::Result<()> {
    let file: Box<dyn std::io::Write> = if out_filename.extension().unwrap_or_default() == "gz" {
        Box::new(
            flate2::write::GzEncoder::new(
                File::create(out_filename)
                    .with_context(|| format!("Error while creating {out_filename:?}:"))?,
                flate2::Compression::best()
            )
        )
    } else {
        Box::new(
            File::create(out_filename)
                .with_context(|| format!("Error while creating {out_filename:?}:"))?
        )
    };
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, data)
        .with_context(|| format!("Error while serializing {out_filename:?}:"))?;
    writer.flush()
        .with_context(|| format!("Error while flushing output to {out_filename:?}:"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_json_round_trip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let json_fn = temp_dir.path().join("dump.json");

        let mut data: BTreeMap<String, Vec<u64>> = Default::default();
        data.insert("alpha".to_string(), vec![1, 2, 3]);
        data.insert("beta".to_string(), vec![]);

        save_json(&data, &json_fn).unwrap();
        let reloaded: BTreeMap<String, Vec<u64>> = load_json(&json_fn).unwrap();
        assert_eq!(data, reloaded);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let missing_fn = temp_dir.path().join("not_there.json");
        let result: anyhow::Result<Vec<String>> = load_json(&missing_fn);
        assert!(result.is_err());
    }
}
