//! File utilities for configuration and reference data.

use std::fs::File;
use std::io::{BufReader, Error};
use std::path::Path;

use serde::de::DeserializeOwned;
use serde_json::from_reader;

/// Reads a JSON-encoded type from a given file `path`.
pub fn read_json<D: DeserializeOwned>(path: impl AsRef<Path>) -> Result<D, Error> {
    let file = File::open(path)?;
    Ok(from_reader(BufReader::new(file))?)
}

pub trait ReadJsonFile<D> {
    fn read_json_file(path: impl AsRef<Path>) -> Result<D, Error>;
}

impl<D: DeserializeOwned> ReadJsonFile<D> for D {
    fn read_json_file(path: impl AsRef<Path>) -> Result<D, Error> {
        read_json(path)
    }
}

/// A scratch path under the system temp directory, unique to this process and `name`.
#[cfg(test)]
pub(crate) fn scratch_path(name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!("rivals-{}-{name}", std::process::id()))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use serde::Deserialize;

    use super::*;

    #[derive(Debug, PartialEq, Deserialize)]
    struct Sample {
        name: String,
        count: u32,
    }

    #[test]
    fn read_json_file() {
        let path = scratch_path("sample.json");
        fs::write(&path, r#"{"name": "storm", "count": 3}"#).unwrap();
        let sample = Sample::read_json_file(&path).unwrap();
        fs::remove_file(&path).unwrap();
        assert_eq!(
            Sample {
                name: "storm".into(),
                count: 3
            },
            sample
        );
    }

    #[test]
    fn read_json_file_malformed() {
        let path = scratch_path("malformed.json");
        fs::write(&path, r#"{"name": "storm""#).unwrap();
        let result = Sample::read_json_file(&path);
        fs::remove_file(&path).unwrap();
        assert!(result.is_err());
    }
}
