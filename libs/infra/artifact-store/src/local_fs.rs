// [libs/infra/artifact-store/src/local_fs.rs]
/*!
 * APARATO: LOCAL FILESYSTEM ARTIFACT STORE
 * CLASIFICACIÓN: INFRASTRUCTURE LAYER (ESTRATO L3)
 *
 * Direcciona cada blob por el SHA-256 de su clave lógica, sharding en dos
 * niveles de subdirectorio (como `object`-style stores) para no saturar un
 * único directorio con miles de entradas.
 */

use std::path::{Path, PathBuf};

use futures_util::future::BoxFuture;
use sha2::{Digest, Sha256};
use tracing::instrument;

use reelforge_domain_models::ArtifactRef;

use crate::{ArtifactStore, ArtifactStoreError};

pub struct LocalFsArtifactStore {
    root: PathBuf,
}

impl LocalFsArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn shard_path(&self, key: &str) -> PathBuf {
        let mut hasher = Sha256::new();
        hasher.update(key.as_bytes());
        let digest = hex::encode(hasher.finalize());
        self.root.join(&digest[0..2]).join(&digest[2..4]).join(&digest)
    }
}

impl ArtifactStore for LocalFsArtifactStore {
    #[instrument(skip(self, bytes), fields(key))]
    fn put<'a>(&'a self, key: &'a str, bytes: Vec<u8>) -> BoxFuture<'a, Result<ArtifactRef, ArtifactStoreError>> {
        Box::pin(async move {
            let path = self.shard_path(key);
            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(&path, &bytes).await?;
            Ok(ArtifactRef::new(key.to_string()))
        })
    }

    #[instrument(skip(self), fields(key))]
    fn get<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<Vec<u8>, ArtifactStoreError>> {
        Box::pin(async move {
            let path = self.shard_path(key);
            tokio::fs::read(&path)
                .await
                .map_err(|_| ArtifactStoreError::NotFound(key.to_string()))
        })
    }

    #[instrument(skip(self), fields(key))]
    fn delete<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<(), ArtifactStoreError>> {
        Box::pin(async move {
            let path = self.shard_path(key);
            match tokio::fs::remove_file(&path).await {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(ArtifactStoreError::Io(e)),
            }
        })
    }

    fn exists<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<bool, ArtifactStoreError>> {
        Box::pin(async move {
            let path: PathBuf = self.shard_path(key);
            Ok(tokio::fs::metadata(&path).await.is_ok())
        })
    }
}

fn _assert_path_is_sendable(_: &Path) {}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_then_get_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalFsArtifactStore::new(dir.path());
        let reference = store.put("scenes/0001.json", b"hello".to_vec()).await.unwrap();
        assert_eq!(reference.0, "scenes/0001.json");
        let loaded = store.get("scenes/0001.json").await.unwrap();
        assert_eq!(loaded, b"hello".to_vec());
    }

    #[tokio::test]
    async fn get_missing_key_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalFsArtifactStore::new(dir.path());
        let err = store.get("missing").await.unwrap_err();
        assert!(matches!(err, ArtifactStoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn exists_reflects_put_and_delete() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalFsArtifactStore::new(dir.path());
        assert!(!store.exists("k").await.unwrap());
        store.put("k", vec![1, 2, 3]).await.unwrap();
        assert!(store.exists("k").await.unwrap());
        store.delete("k").await.unwrap();
        assert!(!store.exists("k").await.unwrap());
    }

    #[tokio::test]
    async fn delete_missing_key_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalFsArtifactStore::new(dir.path());
        store.delete("never-existed").await.unwrap();
    }

    #[tokio::test]
    async fn distinct_keys_shard_into_distinct_paths() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalFsArtifactStore::new(dir.path());
        let a = store.shard_path("a");
        let b = store.shard_path("b");
        assert_ne!(a, b);
    }
}
