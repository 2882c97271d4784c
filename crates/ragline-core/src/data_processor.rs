//! Loads raw source text from files and directories for ingestion.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::types::SourceText;

const SUPPORTED_EXTENSIONS: &[&str] = &["txt", "md"];

#[derive(Debug, Default)]
pub struct DataProcessor;

impl DataProcessor {
    pub fn new() -> Self { Self }

    /// Load a single file, or every supported file under a directory (sorted).
    pub fn load_path(&self, path: &Path) -> Result<Vec<SourceText>> {
        if path.is_dir() {
            return self.load_directory(path);
        }
        if !path.is_file() {
            return Err(Error::invalid_argument(format!("no such file or directory: {}", path.display())));
        }
        Ok(vec![self.load_file(path)?])
    }

    pub fn load_directory(&self, dir: &Path) -> Result<Vec<SourceText>> {
        let files = self.list_source_files(dir);
        if files.is_empty() {
            tracing::warn!(target: "data_processor", "no .txt or .md files found under {}", dir.display());
            return Ok(vec![]);
        }
        let mut sources = Vec::with_capacity(files.len());
        for (file_index, file_path) in files.iter().enumerate() {
            tracing::debug!(target: "data_processor", "reading file {}/{}: {}", file_index + 1, files.len(), file_path.display());
            sources.push(self.load_file(file_path)?);
        }
        tracing::info!(target: "data_processor", "loaded {} files from {}", sources.len(), dir.display());
        Ok(sources)
    }

    pub fn load_file(&self, file_path: &Path) -> Result<SourceText> {
        let text = self.read_file_content(file_path)?;
        Ok(SourceText::new(text).with_source(file_path.to_string_lossy()))
    }

    fn read_file_content(&self, file_path: &Path) -> Result<String> {
        match fs::read_to_string(file_path) {
            Ok(content) => Ok(content),
            Err(_) => Ok(String::from_utf8_lossy(&fs::read(file_path)?).to_string()),
        }
    }

    fn list_source_files(&self, root: &Path) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = walkdir::WalkDir::new(root)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .filter(|p| {
                p.extension()
                    .and_then(|s| s.to_str())
                    .is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext))
            })
            .collect();
        files.sort();
        files
    }
}
