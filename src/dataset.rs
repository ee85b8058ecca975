//! On-disk alignment datasets.
//!
//! A dataset is a directory with one sub-directory per model, each holding
//! alignment files produced by that model:
//!
//! ```text
//! data/
//!   NeedlemanWunsch/NC_002018_NC_002019.aln
//!   EdgeAlign/NC_002018_NC_002019.aln
//! ```
//!
//! This module only locates and reads files; nothing is cached.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

/// Errors that can occur while reading a dataset.
#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("Dataset directory not found: {0}")]
    NotFound(PathBuf),

    #[error("Model '{0}' is not available in this dataset")]
    UnknownModel(String),

    #[error("File '{file}' is not available for model '{model}'")]
    UnknownFile { model: String, file: String },

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for dataset operations.
pub type DatasetResult<T> = Result<T, DatasetError>;

/// Which models provide a given file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileMetadata {
    pub file: String,
    pub models_with_file: Vec<String>,
    pub total_models: usize,
}

/// A dataset rooted at a directory.
#[derive(Debug, Clone)]
pub struct Dataset {
    root: PathBuf,
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> DatasetError + '_ {
    move |source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Sorted names of the entries in `dir` that satisfy `keep`.
fn entry_names(dir: &Path, keep: impl Fn(&fs::FileType) -> bool) -> DatasetResult<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_error(dir))? {
        let entry = entry.map_err(io_error(dir))?;
        let file_type = entry.file_type().map_err(io_error(&entry.path()))?;
        if keep(&file_type) {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort();
    Ok(names)
}

impl Dataset {
    /// Opens a dataset; the root must be an existing directory.
    pub fn open<P: AsRef<Path>>(root: P) -> DatasetResult<Self> {
        let root = root.as_ref();
        if !root.is_dir() {
            return Err(DatasetError::NotFound(root.to_path_buf()));
        }
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Model names (sub-directories), sorted.
    pub fn models(&self) -> DatasetResult<Vec<String>> {
        entry_names(&self.root, fs::FileType::is_dir)
    }

    fn model_dir(&self, model: &str) -> DatasetResult<PathBuf> {
        let dir = self.root.join(model);
        if dir.is_dir() {
            Ok(dir)
        } else {
            Err(DatasetError::UnknownModel(model.to_string()))
        }
    }

    /// File names available for a model, sorted.
    pub fn files(&self, model: &str) -> DatasetResult<Vec<String>> {
        entry_names(&self.model_dir(model)?, fs::FileType::is_file)
    }

    pub fn has_file(&self, model: &str, file: &str) -> bool {
        self.root.join(model).join(file).is_file()
    }

    /// Reads an alignment file as text.
    pub fn load(&self, model: &str, file: &str) -> DatasetResult<String> {
        let dir = self.model_dir(model)?;
        let path = dir.join(file);
        if !path.is_file() {
            return Err(DatasetError::UnknownFile {
                model: model.to_string(),
                file: file.to_string(),
            });
        }
        log::debug!("loading {}", path.display());
        fs::read_to_string(&path).map_err(io_error(&path))
    }

    /// Lists which models provide `file`.
    pub fn metadata(&self, file: &str) -> DatasetResult<FileMetadata> {
        let models = self.models()?;
        let total_models = models.len();
        let models_with_file = models
            .into_iter()
            .filter(|m| self.has_file(m, file))
            .collect();

        Ok(FileMetadata {
            file: file.to_string(),
            models_with_file,
            total_models,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const ALN: &str = ">a\nACGT\n>b\nACGA\n";

    fn fixture() -> TempDir {
        let dir = TempDir::new().unwrap();
        for model in ["NeedlemanWunsch", "EdgeAlign", "MLP"] {
            fs::create_dir(dir.path().join(model)).unwrap();
        }
        fs::write(dir.path().join("NeedlemanWunsch/x.aln"), ALN).unwrap();
        fs::write(dir.path().join("EdgeAlign/x.aln"), ALN).unwrap();
        fs::write(dir.path().join("EdgeAlign/y.aln"), ALN).unwrap();
        fs::write(dir.path().join("README"), "not a model").unwrap();
        dir
    }

    #[test]
    fn test_open_missing_root() {
        let result = Dataset::open("/nonexistent/alnscore-data");
        assert!(matches!(result, Err(DatasetError::NotFound(_))));
    }

    #[test]
    fn test_models_are_sorted_directories() {
        let dir = fixture();
        let dataset = Dataset::open(dir.path()).unwrap();

        assert_eq!(
            dataset.models().unwrap(),
            vec!["EdgeAlign", "MLP", "NeedlemanWunsch"]
        );
    }

    #[test]
    fn test_files_and_load() {
        let dir = fixture();
        let dataset = Dataset::open(dir.path()).unwrap();

        assert_eq!(dataset.files("EdgeAlign").unwrap(), vec!["x.aln", "y.aln"]);
        assert!(dataset.files("MLP").unwrap().is_empty());
        assert!(dataset.has_file("NeedlemanWunsch", "x.aln"));
        assert!(!dataset.has_file("MLP", "x.aln"));
        assert_eq!(dataset.load("EdgeAlign", "y.aln").unwrap(), ALN);
    }

    #[test]
    fn test_load_unknown() {
        let dir = fixture();
        let dataset = Dataset::open(dir.path()).unwrap();

        assert!(matches!(
            dataset.load("Missing", "x.aln"),
            Err(DatasetError::UnknownModel(_))
        ));
        assert!(matches!(
            dataset.load("MLP", "x.aln"),
            Err(DatasetError::UnknownFile { .. })
        ));
    }

    #[test]
    fn test_metadata() {
        let dir = fixture();
        let dataset = Dataset::open(dir.path()).unwrap();
        let meta = dataset.metadata("x.aln").unwrap();

        assert_eq!(meta.total_models, 3);
        assert_eq!(meta.models_with_file, vec!["EdgeAlign", "NeedlemanWunsch"]);
    }
}
