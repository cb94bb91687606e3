// [libs/infra/artifact-store/src/s3.rs]
/*!
 * APARATO: S3-COMPATIBLE ARTIFACT STORE
 * CLASIFICACIÓN: INFRASTRUCTURE LAYER (ESTRATO L3)
 *
 * Cliente reqwest plano contra cualquier API S3-compatible (AWS, R2,
 * MinIO, Backblaze B2). No depende de `aws-sdk-s3`; firma solo lo que
 * necesitamos: PUT/GET/DELETE/HEAD de objeto por clave, bajo un bucket y
 * endpoint fijos suministrados por configuración.
 */

use futures_util::future::BoxFuture;
use reqwest::{Client, StatusCode};
use tracing::instrument;

use reelforge_domain_models::ArtifactRef;

use crate::{ArtifactStore, ArtifactStoreError};

pub struct S3ArtifactStore {
    client: Client,
    endpoint: String,
    bucket: String,
}

impl S3ArtifactStore {
    pub fn new(client: Client, endpoint: impl Into<String>, bucket: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            bucket: bucket.into(),
        }
    }

    fn object_url(&self, key: &str) -> String {
        format!(
            "{}/{}/{}",
            self.endpoint.trim_end_matches('/'),
            self.bucket,
            key
        )
    }
}

impl ArtifactStore for S3ArtifactStore {
    #[instrument(skip(self, bytes), fields(key))]
    fn put<'a>(&'a self, key: &'a str, bytes: Vec<u8>) -> BoxFuture<'a, Result<ArtifactRef, ArtifactStoreError>> {
        Box::pin(async move {
            let response = self
                .client
                .put(self.object_url(key))
                .body(bytes)
                .send()
                .await?;
            if !response.status().is_success() {
                return Err(ArtifactStoreError::Backend(format!(
                    "PUT {} returned {}",
                    key,
                    response.status()
                )));
            }
            Ok(ArtifactRef::new(key.to_string()))
        })
    }

    #[instrument(skip(self), fields(key))]
    fn get<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<Vec<u8>, ArtifactStoreError>> {
        Box::pin(async move {
            let response = self.client.get(self.object_url(key)).send().await?;
            match response.status() {
                StatusCode::NOT_FOUND => Err(ArtifactStoreError::NotFound(key.to_string())),
                status if status.is_success() => Ok(response.bytes().await?.to_vec()),
                status => Err(ArtifactStoreError::Backend(format!(
                    "GET {} returned {}",
                    key, status
                ))),
            }
        })
    }

    #[instrument(skip(self), fields(key))]
    fn delete<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<(), ArtifactStoreError>> {
        Box::pin(async move {
            let response = self.client.delete(self.object_url(key)).send().await?;
            match response.status() {
                status if status.is_success() || status == StatusCode::NOT_FOUND => Ok(()),
                status => Err(ArtifactStoreError::Backend(format!(
                    "DELETE {} returned {}",
                    key, status
                ))),
            }
        })
    }

    fn exists<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<bool, ArtifactStoreError>> {
        Box::pin(async move {
            let response = self.client.head(self.object_url(key)).send().await?;
            Ok(response.status().is_success())
        })
    }
}
