//! JSON persistence helpers shared by the index store and the build summary.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::ser::{PrettyFormatter, Serializer};
use std::path::{Path, PathBuf};

use crate::error::{EdgarError, Result};

/// Indentation used for every persisted JSON file.
const INDENT: &[u8] = b"    ";

/// Serializes `value` as JSON indented with four spaces.
///
/// # Errors
/// Returns [`EdgarError::Parse`] if the value cannot be serialized.
pub fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let mut ser = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(INDENT));
    value
        .serialize(&mut ser)
        .map_err(|e| EdgarError::Parse(format!("Failed to serialize JSON: {}", e)))?;
    Ok(buf)
}

/// A JSON file written to a `.tmp` sibling of its destination but not yet
/// moved into place.
///
/// Dropping an uncommitted file removes the `.tmp` sibling. Staging several
/// files before committing any of them keeps a failed write from replacing
/// only some of them.
#[derive(Debug)]
#[must_use = "a staged file is discarded unless committed"]
pub struct StagedJson {
    tmp: PathBuf,
    path: PathBuf,
    committed: bool,
}

impl StagedJson {
    /// Serializes `value` into the `.tmp` sibling of `path`.
    ///
    /// # Errors
    /// Returns [`EdgarError::Filesystem`] if the file cannot be written.
    pub fn write<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<Self> {
        let bytes = to_pretty_json(value)?;
        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        std::fs::write(&tmp, &bytes).map_err(|e| EdgarError::filesystem(&tmp, e))?;
        Ok(Self {
            tmp,
            path: path.to_path_buf(),
            committed: false,
        })
    }

    /// Renames the staged file over its destination.
    ///
    /// # Errors
    /// Returns [`EdgarError::Filesystem`] if the rename fails; the `.tmp`
    /// file is removed in that case.
    pub fn commit(mut self) -> Result<()> {
        std::fs::rename(&self.tmp, &self.path)
            .map_err(|e| EdgarError::filesystem(&self.path, e))?;
        self.committed = true;
        Ok(())
    }
}

impl Drop for StagedJson {
    fn drop(&mut self) {
        if !self.committed {
            let _ = std::fs::remove_file(&self.tmp);
        }
    }
}

/// Writes `value` to `path` as pretty-printed JSON.
///
/// The bytes go to a sibling `.tmp` file first, which is then renamed over
/// `path`, so an interrupted write never leaves a truncated file behind.
///
/// # Errors
/// Returns [`EdgarError::Filesystem`] if the file cannot be written or renamed.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    StagedJson::write(path, value)?.commit()
}

/// Reads and deserializes a JSON file.
///
/// # Errors
/// Returns [`EdgarError::Filesystem`] if the file cannot be read and
/// [`EdgarError::Parse`] if it is not valid JSON for `T`.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let bytes = std::fs::read(path).map_err(|e| EdgarError::filesystem(path, e))?;
    serde_json::from_slice(&bytes)
        .map_err(|e| EdgarError::Parse(format!("{}: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_four_space_indent() {
        let mut map = BTreeMap::new();
        map.insert("AAPL", "0000320193");
        let json = String::from_utf8(to_pretty_json(&map).unwrap()).unwrap();
        assert_eq!(json, "{\n    \"AAPL\": \"0000320193\"\n}");
    }

    #[test]
    fn test_write_then_read() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("map.json");

        let mut map = BTreeMap::new();
        map.insert("Apple Inc.".to_string(), "0000320193".to_string());
        write_json(&path, &map).unwrap();

        let back: BTreeMap<String, String> = read_json(&path).unwrap();
        assert_eq!(back, map);
        assert!(!tmp.path().join("map.json.tmp").exists());
    }

    #[test]
    fn test_failed_rename_removes_tmp() {
        let tmp = tempfile::tempdir().unwrap();
        // A non-empty directory cannot be replaced by a file
        let path = tmp.path().join("map.json");
        std::fs::create_dir(&path).unwrap();
        std::fs::write(path.join("keep"), "").unwrap();

        let err = write_json(&path, &BTreeMap::from([("AAPL", "0000320193")])).unwrap_err();
        assert!(matches!(err, EdgarError::Filesystem(_)));
        assert!(!tmp.path().join("map.json.tmp").exists());
        assert!(path.join("keep").exists());
    }

    #[test]
    fn test_uncommitted_stage_is_discarded() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("map.json");
        std::fs::write(&path, "old").unwrap();

        let staged = StagedJson::write(&path, &BTreeMap::from([("AAPL", "0000320193")])).unwrap();
        assert!(tmp.path().join("map.json.tmp").exists());
        drop(staged);

        assert!(!tmp.path().join("map.json.tmp").exists());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "old");
    }

    #[test]
    fn test_read_invalid_json() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("broken.json");
        std::fs::write(&path, "{\"AAPL\": ").unwrap();

        let result: Result<BTreeMap<String, String>> = read_json(&path);
        assert!(matches!(result, Err(EdgarError::Parse(_))));
    }

    #[test]
    fn test_read_missing_file() {
        let tmp = tempfile::tempdir().unwrap();
        let result: Result<BTreeMap<String, String>> = read_json(&tmp.path().join("nope.json"));
        assert!(matches!(result, Err(EdgarError::Filesystem(_))));
    }
}
