use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;
use walkdir::WalkDir;

use crate::errors::{PlaceMatchError, Result};
use crate::types::RawPlace;

/// Source of raw gazetteer place records.
pub trait PlaceProvider {
    /// All pids in the dataset.
    fn pids(&self) -> Result<Vec<String>>;

    /// The raw record for a pid, or `None` if the dataset has no such place.
    fn get(&self, pid: &str) -> Result<Option<RawPlace>>;
}

/// A gazetteer stored as a directory tree of `<pid>.json` files.
#[derive(Debug)]
pub struct FileGazetteer {
    root: PathBuf,
    paths: HashMap<String, PathBuf>,
}

impl FileGazetteer {
    /// Scans `root` recursively for place records.
    ///
    /// The file stem is the pid; two files with the same stem are a fatal
    /// duplicate-id error.
    pub fn open(root: &Path) -> Result<Self> {
        let mut paths = HashMap::new();
        for entry in WalkDir::new(root).into_iter().filter_map(|e| e.ok()) {
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(pid) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if paths.insert(pid.to_string(), path.to_path_buf()).is_some() {
                return Err(PlaceMatchError::DuplicateId {
                    id: pid.to_string(),
                });
            }
        }
        info!(
            records = paths.len(),
            root = %root.display(),
            "discovered gazetteer records"
        );
        Ok(Self {
            root: root.to_path_buf(),
            paths,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

impl PlaceProvider for FileGazetteer {
    fn pids(&self) -> Result<Vec<String>> {
        let mut pids: Vec<String> = self.paths.keys().cloned().collect();
        pids.sort_unstable();
        Ok(pids)
    }

    fn get(&self, pid: &str) -> Result<Option<RawPlace>> {
        let Some(path) = self.paths.get(pid) else {
            return Ok(None);
        };
        let contents = fs::read_to_string(path)?;
        let raw: RawPlace =
            serde_json::from_str(&contents).map_err(|e| PlaceMatchError::Dataset {
                message: format!("failed to parse place record: {}", e),
                path: path.display().to_string(),
            })?;
        Ok(Some(raw))
    }
}
