use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use std::{
    collections::HashMap,
    fmt::Debug,
    fs, io,
    path::PathBuf,
    sync::Mutex,
};

/// Generation-tagged storage for cached shell asset bodies.
///
/// Each tag names one bucket; entries within a bucket are keyed by URL
/// path. Exactly one tag is current at a time, so everything else is
/// fair game for [`BucketStore::delete`] during activation.
pub trait BucketStore: Send + Sync + Debug {
    /// Tags of every existing bucket, in no particular order.
    fn list(&self) -> Result<Vec<String>>;

    /// Remove a bucket and all its entries. Absent buckets are a no-op.
    fn delete(&self, tag: &str) -> Result<()>;

    /// Store one entry, creating the bucket as needed.
    fn put(&self, tag: &str, entry: &str, body: &[u8]) -> Result<()>;

    /// Read one entry, `None` on a miss.
    fn get(&self, tag: &str, entry: &str) -> Result<Option<Vec<u8>>>;

    /// Entry keys present in a bucket, in no particular order.
    fn entries(&self, tag: &str) -> Result<Vec<String>>;
}

/// Filesystem bucket store: one directory per generation tag under a
/// root, one file per entry.
#[derive(Debug)]
pub struct FsBucketStore {
    root: PathBuf,
}

impl FsBucketStore {
    /// Store under the platform cache directory.
    pub fn new() -> Result<Self> {
        let dirs = ProjectDirs::from("dev", "daily-lures", "lures")
            .ok_or_else(|| anyhow!("Could not determine platform cache directory"))?;

        Ok(Self {
            root: dirs.cache_dir().join("shell"),
        })
    }

    /// Store under an explicit root.
    pub fn at_root(root: PathBuf) -> Self {
        Self { root }
    }

    fn bucket_dir(&self, tag: &str) -> PathBuf {
        self.root.join(tag)
    }

    fn entry_path(&self, tag: &str, entry: &str) -> PathBuf {
        self.bucket_dir(tag).join(entry_file_name(entry))
    }
}

/// Flatten a URL path into a single safe file name. The root path gets a
/// reserved name so it cannot collide with a real asset.
fn entry_file_name(entry: &str) -> String {
    if entry.is_empty() || entry == "/" {
        return "__root__".to_string();
    }
    entry
        .trim_start_matches('/')
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

impl BucketStore for FsBucketStore {
    fn list(&self) -> Result<Vec<String>> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }

        let mut tags = Vec::new();
        let dir = fs::read_dir(&self.root)
            .with_context(|| format!("Failed to read cache root: {}", self.root.display()))?;
        for entry in dir {
            let entry = entry.context("Failed to read cache root entry")?;
            if entry.path().is_dir() {
                tags.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        Ok(tags)
    }

    fn delete(&self, tag: &str) -> Result<()> {
        let dir = self.bucket_dir(tag);
        if dir.exists() {
            fs::remove_dir_all(&dir)
                .with_context(|| format!("Failed to delete cache bucket: {}", dir.display()))?;
        }
        Ok(())
    }

    fn put(&self, tag: &str, entry: &str, body: &[u8]) -> Result<()> {
        let dir = self.bucket_dir(tag);
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create cache bucket: {}", dir.display()))?;

        let path = self.entry_path(tag, entry);
        fs::write(&path, body)
            .with_context(|| format!("Failed to write cache entry: {}", path.display()))?;
        Ok(())
    }

    fn get(&self, tag: &str, entry: &str) -> Result<Option<Vec<u8>>> {
        let path = self.entry_path(tag, entry);
        match fs::read(&path) {
            Ok(body) => Ok(Some(body)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err)
                .with_context(|| format!("Failed to read cache entry: {}", path.display())),
        }
    }

    fn entries(&self, tag: &str) -> Result<Vec<String>> {
        let dir = self.bucket_dir(tag);
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        let read = fs::read_dir(&dir)
            .with_context(|| format!("Failed to read cache bucket: {}", dir.display()))?;
        for entry in read {
            let entry = entry.context("Failed to read cache bucket entry")?;
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        Ok(names)
    }
}

/// In-memory bucket store for tests.
#[derive(Debug, Default)]
pub struct MemoryBucketStore {
    buckets: Mutex<HashMap<String, HashMap<String, Vec<u8>>>>,
}

impl MemoryBucketStore {
    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, HashMap<String, Vec<u8>>>>> {
        self.buckets.lock().map_err(|_| anyhow!("bucket lock poisoned"))
    }
}

impl BucketStore for MemoryBucketStore {
    fn list(&self) -> Result<Vec<String>> {
        Ok(self.lock()?.keys().cloned().collect())
    }

    fn delete(&self, tag: &str) -> Result<()> {
        self.lock()?.remove(tag);
        Ok(())
    }

    fn put(&self, tag: &str, entry: &str, body: &[u8]) -> Result<()> {
        self.lock()?
            .entry(tag.to_string())
            .or_default()
            .insert(entry.to_string(), body.to_vec());
        Ok(())
    }

    fn get(&self, tag: &str, entry: &str) -> Result<Option<Vec<u8>>> {
        Ok(self
            .lock()?
            .get(tag)
            .and_then(|bucket| bucket.get(entry))
            .cloned())
    }

    fn entries(&self, tag: &str) -> Result<Vec<String>> {
        Ok(self
            .lock()?
            .get(tag)
            .map(|bucket| bucket.keys().cloned().collect())
            .unwrap_or_default())
    }
}
