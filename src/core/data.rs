//! RON file helpers shared by every data registry.

use std::fs;
use std::path::Path;

use bevy::prelude::*;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::error::DataLoadError;

/// Read and parse a single RON file.
pub fn read_ron_file<T: DeserializeOwned>(path: &Path) -> Result<T, DataLoadError> {
    let display = path.display().to_string();

    if !path.exists() {
        return Err(DataLoadError::FileNotFound(display));
    }

    let contents = fs::read_to_string(path).map_err(|e| DataLoadError::ReadError {
        path: display.clone(),
        details: e.to_string(),
    })?;

    ron::from_str(&contents).map_err(|e| DataLoadError::ParseError {
        path: display,
        details: e.to_string(),
    })
}

/// Serialize a value to a pretty-printed RON file.
pub fn write_ron_file<T: Serialize>(path: &Path, value: &T) -> Result<(), DataLoadError> {
    let display = path.display().to_string();

    let contents = ron::ser::to_string_pretty(value, ron::ser::PrettyConfig::default())
        .map_err(|e| DataLoadError::WriteError {
            path: display.clone(),
            details: e.to_string(),
        })?;

    fs::write(path, contents).map_err(|e| DataLoadError::WriteError {
        path: display,
        details: e.to_string(),
    })
}

/// Load every `.ron` file in a directory, keyed by file stem.
///
/// Files that fail to load are logged and skipped.
pub fn read_ron_dir<T: DeserializeOwned>(dir: &Path) -> Vec<(String, T)> {
    let mut loaded = Vec::new();

    if !dir.exists() {
        warn!("Data directory not found: {:?}", dir);
        return loaded;
    }

    let Ok(entries) = fs::read_dir(dir) else {
        warn!("Failed to read data directory {:?}", dir);
        return loaded;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if !path.extension().is_some_and(|ext| ext == "ron") {
            continue;
        }

        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown")
            .to_string();

        match read_ron_file::<T>(&path) {
            Ok(value) => loaded.push((stem, value)),
            Err(e) => error!("{}", e),
        }
    }

    loaded
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, Serialize, PartialEq)]
    struct Sample {
        name: String,
        value: f32,
    }

    #[test]
    fn missing_file_is_reported() {
        let result = read_ron_file::<Sample>(Path::new("does/not/exist.ron"));
        assert!(matches!(result, Err(DataLoadError::FileNotFound(_))));
    }

    #[test]
    fn write_then_read_back() {
        let path = std::env::temp_dir().join("frag_arena_data_test.ron");
        let sample = Sample {
            name: "rocket".to_string(),
            value: 100.0,
        };

        write_ron_file(&path, &sample).unwrap();
        let loaded: Sample = read_ron_file(&path).unwrap();
        assert_eq!(loaded, sample);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn parse_errors_name_the_file() {
        let path = std::env::temp_dir().join("frag_arena_bad_data_test.ron");
        std::fs::write(&path, "(name: ").unwrap();

        let err = read_ron_file::<Sample>(&path).unwrap_err();
        assert!(err.to_string().contains("frag_arena_bad_data_test.ron"));

        let _ = std::fs::remove_file(&path);
    }
}
