//! Blob store backed by a directory: object `key` of `bucket` is the file
//! `<root>/<bucket>/<key>`.

use std::io::ErrorKind;
use std::path::PathBuf;

use evalframe_core::error::StoreError;
use evalframe_core::store::BlobStore;

use crate::resolve_under;

#[derive(Debug, Clone)]
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl BlobStore for FsBlobStore {
    fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, StoreError> {
        let path = resolve_under(&self.root, bucket)
            .filter(|_| !bucket.contains('/'))
            .and_then(|bucket_dir| resolve_under(&bucket_dir, key))
            .ok_or_else(|| StoreError::InvalidName(format!("{bucket}/{key}")))?;
        tracing::debug!(bucket, key, path = %path.display(), "reading object");

        std::fs::read(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => StoreError::NoSuchKey {
                bucket: bucket.to_string(),
                key: key.to_string(),
            },
            _ => StoreError::Io(e),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn reads_objects_below_bucket_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("eval-data/kb-chat")).unwrap();
        std::fs::write(dir.path().join("eval-data/kb-chat/ground_truth.csv"), b"a,b\n").unwrap();

        let store = FsBlobStore::new(dir.path());
        assert_eq!(
            store.get_object("eval-data", "kb-chat/ground_truth.csv").unwrap(),
            b"a,b\n".to_vec()
        );
    }

    #[test]
    fn missing_object_is_no_such_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::new(dir.path());
        assert!(matches!(
            store.get_object("eval-data", "missing.csv"),
            Err(StoreError::NoSuchKey { bucket, key }) if bucket == "eval-data" && key == "missing.csv"
        ));
    }

    #[test]
    fn bucket_must_be_a_single_segment() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::new(dir.path());
        assert!(matches!(store.get_object("a/b", "k"), Err(StoreError::InvalidName(_))));
        assert!(matches!(store.get_object("..", "k"), Err(StoreError::InvalidName(_))));
        assert!(matches!(store.get_object("b", "../../k"), Err(StoreError::InvalidName(_))));
    }
}
