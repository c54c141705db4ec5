use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use renderer::HostError;
use renderer::host::{DocumentRecord, DocumentStore, SharePayload};

/// Shared documents kept as `<id>.json` files in one directory.
pub struct DirStore {
    root: PathBuf,
}

impl DirStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        DirStore { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn record_path(&self, id: &str) -> Result<PathBuf, HostError> {
        let valid = !id.is_empty()
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(HostError::NotFound(id.to_string()));
        }
        Ok(self.root.join(format!("{}.json", id)))
    }
}

impl DocumentStore for DirStore {
    fn fetch(&self, id: &str) -> Result<Option<DocumentRecord>, HostError> {
        let path = self.record_path(id)?;
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        serde_json::from_str(&text)
            .map(Some)
            .map_err(|e| HostError::Decode(format!("{}: {}", path.display(), e)))
    }

    fn publish(&mut self, payload: &SharePayload) -> Result<String, HostError> {
        std::fs::create_dir_all(&self.root)?;
        let id = uuid::Uuid::new_v4().simple().to_string();
        let json = serde_json::to_string_pretty(payload)
            .map_err(|e| HostError::Custom(format!("cannot encode payload: {}", e)))?;
        std::fs::write(self.record_path(&id)?, json)?;
        log::debug!("published document '{}' to {}", id, self.root.display());
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(data: &str) -> SharePayload {
        SharePayload {
            kind: "linky".into(),
            data: data.into(),
            image: String::new(),
        }
    }

    #[test]
    fn publish_then_fetch() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = DirStore::new(dir.path().join("docs"));
        let id = store.publish(&payload("main: hello")).unwrap();
        let record = store.fetch(&id).unwrap().unwrap();
        assert_eq!(record.data, "main: hello");
        assert_eq!(record.image.as_deref(), Some(""));
    }

    #[test]
    fn unknown_id_is_absent() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirStore::new(dir.path());
        assert!(store.fetch("missing").unwrap().is_none());
    }

    #[test]
    fn path_like_id_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirStore::new(dir.path());
        assert!(matches!(store.fetch("../etc/passwd"), Err(HostError::NotFound(_))));
    }

    #[test]
    fn corrupt_record_is_a_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("bad.json"), "{ not json").unwrap();
        let store = DirStore::new(dir.path());
        assert!(matches!(store.fetch("bad"), Err(HostError::Decode(_))));
    }
}
