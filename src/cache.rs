use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use crate::dataset::{Dataset, ParsePolicy, prepare, read_players};
use crate::error::LoadError;

/// Identity of a source file: a change to any part forces a reload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceKey {
    pub path: PathBuf,
    pub modified: Option<SystemTime>,
    pub len: u64,
}

impl SourceKey {
    pub fn probe(path: &Path) -> Result<Self, LoadError> {
        let metadata = fs::metadata(path).map_err(|err| LoadError::io(path, err))?;
        let path = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        Ok(Self {
            path,
            modified: metadata.modified().ok(),
            len: metadata.len(),
        })
    }
}

/// Memoizes the prepared dataset of the most recently loaded source.
#[derive(Debug, Default)]
pub struct DatasetCache {
    policy: ParsePolicy,
    entry: Option<(SourceKey, Arc<Dataset>)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Hit,
    Miss,
}

impl DatasetCache {
    pub fn new(policy: ParsePolicy) -> Self {
        Self {
            policy,
            entry: None,
        }
    }

    /// Returns the cached dataset when `path` is unchanged, otherwise loads
    /// and prepares it from scratch.
    pub fn load(&mut self, path: &Path) -> Result<(Arc<Dataset>, CacheStatus), LoadError> {
        let key = SourceKey::probe(path)?;
        if let Some((_, dataset)) = self.entry.as_ref().filter(|(cached, _)| *cached == key) {
            tracing::debug!(path = %key.path.display(), "dataset cache hit");
            return Ok((Arc::clone(dataset), CacheStatus::Hit));
        }

        tracing::debug!(path = %key.path.display(), "dataset cache miss");
        let dataset = Arc::new(prepare(read_players(path)?, self.policy)?);
        self.entry = Some((key, Arc::clone(&dataset)));
        Ok((dataset, CacheStatus::Miss))
    }

    /// Drops the cached dataset so the next `load` is a full reload.
    pub fn invalidate(&mut self) {
        self.entry = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const HEADER: &str = "name,team,Best position,foot,Age,Value,Wage,Release clause";

    fn create_csv(rows: &[&str]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{HEADER}").unwrap();
        for row in rows {
            writeln!(file, "{row}").unwrap();
        }
        file.flush().unwrap();
        file
    }

    #[test]
    fn unchanged_source_is_a_hit() {
        let file = create_csv(&["Ana,Lyon,CB,Left,30,€20M,€40K,€38M"]);
        let mut cache = DatasetCache::new(ParsePolicy::Impute);

        let (first, status) = cache.load(file.path()).unwrap();
        assert_eq!(status, CacheStatus::Miss);
        let (second, status) = cache.load(file.path()).unwrap();
        assert_eq!(status, CacheStatus::Hit);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn changed_source_is_reloaded() {
        let mut file = create_csv(&["Ana,Lyon,CB,Left,30,€20M,€40K,€38M"]);
        let mut cache = DatasetCache::default();
        let (first, _) = cache.load(file.path()).unwrap();
        assert_eq!(first.len(), 1);

        writeln!(file, "Bo,Oslo,GK,Right,22,€2M,€5K,€4M").unwrap();
        file.flush().unwrap();

        let (second, status) = cache.load(file.path()).unwrap();
        assert_eq!(status, CacheStatus::Miss);
        assert_eq!(second.len(), 2);
        assert_eq!(first.len(), 1);
    }

    #[test]
    fn invalidate_forces_reload() {
        let file = create_csv(&["Ana,Lyon,CB,Left,30,€20M,€40K,€38M"]);
        let mut cache = DatasetCache::default();
        let (first, _) = cache.load(file.path()).unwrap();
        cache.invalidate();
        let (second, status) = cache.load(file.path()).unwrap();
        assert_eq!(status, CacheStatus::Miss);
        assert!(!Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let mut cache = DatasetCache::default();
        let err = cache.load(Path::new("definitely/not/here.csv")).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }
}
