use crate::error::Result;
use crate::lang::{ParseOutput, parse_source};
use lru::LruCache;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Parsed declaration files of one sync run, keyed by absolute path.
///
/// Entries are validated against the file content digest, so an external edit
/// between two lookups is never served stale.
#[derive(Debug)]
pub struct AstCache {
    entries: LruCache<PathBuf, CacheEntry>,
}

#[derive(Debug, Clone)]
struct CacheEntry {
    output: ParseOutput,
    source: String,
    file_hash: String,
}

/// A parsed file together with the text it was parsed from
#[derive(Debug, Clone)]
pub struct ParsedFile {
    pub output: ParseOutput,
    pub source: String,
}

impl AstCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: LruCache::new(capacity),
        }
    }

    /// Parse `path`, reusing the cached tree when the file is unchanged
    pub fn get_or_parse(&mut self, path: &Path) -> Result<ParsedFile> {
        let source = std::fs::read_to_string(path)?;
        let file_hash = compute_hash(&source);

        if let Some(entry) = self.entries.get(path)
            && entry.file_hash == file_hash
        {
            debug!("AST cache hit for {:?}", path);
            return Ok(ParsedFile {
                output: entry.output.clone(),
                source: entry.source.clone(),
            });
        }

        debug!("Parsing {:?}", path);
        let output = parse_source(&source);
        self.entries.put(
            path.to_path_buf(),
            CacheEntry {
                output: output.clone(),
                source: source.clone(),
                file_hash,
            },
        );
        Ok(ParsedFile { output, source })
    }

    pub fn invalidate(&mut self, path: &Path) {
        self.entries.pop(path);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn compute_hash(contents: &str) -> String {
    format!("{:x}", md5::compute(contents.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_cache_reparses_after_external_edit() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("BUILD");
        fs::write(&path, "a()\n").unwrap();

        let mut cache = AstCache::new(4);
        let first = cache.get_or_parse(&path).unwrap();
        assert!(first.output.root.find_call("a").is_some());
        assert_eq!(cache.len(), 1);

        fs::write(&path, "b()\n").unwrap();
        let second = cache.get_or_parse(&path).unwrap();
        assert!(second.output.root.find_call("b").is_some());
        assert_eq!(second.source, "b()\n");

        cache.invalidate(&path);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_cache_capacity_evicts_oldest() {
        let temp = TempDir::new().unwrap();
        let mut cache = AstCache::new(1);
        for name in ["one", "two"] {
            let path = temp.path().join(name);
            fs::write(&path, "x = 1\n").unwrap();
            cache.get_or_parse(&path).unwrap();
        }
        assert_eq!(cache.len(), 1);
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let temp = TempDir::new().unwrap();
        let mut cache = AstCache::new(1);
        assert!(cache.get_or_parse(&temp.path().join("BUILD")).is_err());
    }
}
