use std::fs::{self, File};
use std::io::{self, Read, Seek, SeekFrom};
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};

use boreal_result::{Error, Result};

use super::{normalize_prefix, Bucket, IterVisitor, ObjectAttributes};
use crate::cancel::CancelToken;

/// Bucket backed by a local directory tree.
///
/// Each `/`-separated key maps to a file under the root. Directory listings
/// are sorted before visiting because the filesystem makes no ordering
/// promise, while the bucket contract does.
pub struct LocalBucket {
    root: PathBuf,
}

impl LocalBucket {
    /// Open (creating if needed) a bucket rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn object_path(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }

    fn map_not_found(key: &str, err: io::Error) -> Error {
        if err.kind() == io::ErrorKind::NotFound {
            Error::NotFound(key.to_string())
        } else {
            Error::Io(err)
        }
    }
}

impl Bucket for LocalBucket {
    fn upload(&self, token: &CancelToken, key: &str, body: &mut dyn Read) -> Result<()> {
        token.check()?;
        let path = self.object_path(key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = File::create(&path)?;
        io::copy(body, &mut file)?;
        Ok(())
    }

    fn iter(&self, token: &CancelToken, prefix: &str, visit: IterVisitor<'_>) -> Result<()> {
        token.check()?;
        let dir = if prefix.is_empty() {
            self.root.clone()
        } else {
            self.root.join(prefix)
        };

        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            // A prefix nothing was ever written under is an empty listing.
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(err) => return Err(err.into()),
        };

        let mut names: Vec<String> = Vec::new();
        for entry in entries {
            let entry = entry?;
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        names.sort_unstable();

        let prefix = normalize_prefix(prefix);
        for name in &names {
            token.check()?;
            let child = format!("{prefix}{name}");
            if let ControlFlow::Break(()) = visit(&child)? {
                return Ok(());
            }
        }
        Ok(())
    }

    fn attributes(&self, token: &CancelToken, key: &str) -> Result<ObjectAttributes> {
        token.check()?;
        let meta = fs::metadata(self.object_path(key)).map_err(|e| Self::map_not_found(key, e))?;
        Ok(ObjectAttributes { size: meta.len() })
    }

    fn get_range(
        &self,
        token: &CancelToken,
        key: &str,
        offset: u64,
        len: u64,
    ) -> Result<Box<dyn Read + Send>> {
        token.check()?;
        let mut file =
            File::open(self.object_path(key)).map_err(|e| Self::map_not_found(key, e))?;
        let size = file.metadata()?.len();
        if offset.checked_add(len).is_none_or(|end| end > size) {
            return Err(Error::InvalidArgumentError(format!(
                "range {offset}..{} out of bounds for '{key}' ({size} bytes)",
                offset.saturating_add(len)
            )));
        }
        file.seek(SeekFrom::Start(offset))?;
        Ok(Box::new(file.take(len)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tempfile::TempDir;

    #[test]
    fn upload_creates_nested_directories() {
        let tmp = TempDir::new().expect("tempdir");
        let bucket = LocalBucket::new(tmp.path().join("bucket")).expect("open");

        bucket
            .upload(
                &CancelToken::new(),
                "metrics/01A/data.parquet",
                &mut Cursor::new(b"payload".to_vec()),
            )
            .expect("upload");

        let attrs = bucket
            .attributes(&CancelToken::new(), "metrics/01A/data.parquet")
            .expect("attributes");
        assert_eq!(attrs.size, 7);
    }

    #[test]
    fn iter_sorts_directory_entries() {
        let tmp = TempDir::new().expect("tempdir");
        let bucket = LocalBucket::new(tmp.path()).expect("open");
        for id in ["01C", "01A", "01B"] {
            bucket
                .upload(
                    &CancelToken::new(),
                    &format!("t/{id}/data.parquet"),
                    &mut Cursor::new(vec![0u8; 4]),
                )
                .expect("upload");
        }

        let mut seen = Vec::new();
        bucket
            .iter(&CancelToken::new(), "t", &mut |child| {
                seen.push(child.to_string());
                Ok(ControlFlow::Continue(()))
            })
            .expect("iter");
        assert_eq!(seen, vec!["t/01A", "t/01B", "t/01C"]);
    }

    #[test]
    fn missing_objects_are_not_found() {
        let tmp = TempDir::new().expect("tempdir");
        let bucket = LocalBucket::new(tmp.path()).expect("open");
        assert!(matches!(
            bucket.attributes(&CancelToken::new(), "t/nope"),
            Err(Error::NotFound(_))
        ));
    }
}
