// [libs/infra/artifact-store/src/lib.rs]
/*!
 * =================================================================
 * APARATO: ARTIFACT STORE (V1.0 - GOLD MASTER)
 * CLASIFICACIÓN: INFRASTRUCTURE LAYER (ESTRATO L3)
 * RESPONSABILIDAD: ALMACENAMIENTO DE BLOBS DIRECCIONADOS POR CONTENIDO
 *
 * `put`/`get`/`delete`/`exists`, seguro para uso concurrente (§5). Dos
 * backends: `LocalFsArtifactStore` (disco, direccionado por SHA-256 de la
 * clave, grounded en el protocolo de hidratación de
 * `worker-client/src/hydrator.rs`) y `S3ArtifactStore` (reqwest plano sobre
 * una API S3-compatible, sin el stack pesado de `aws-sdk-s3`).
 * =================================================================
 */

pub mod errors;
pub mod local_fs;
pub mod s3;

pub use errors::ArtifactStoreError;
pub use local_fs::LocalFsArtifactStore;
pub use s3::S3ArtifactStore;

use futures_util::future::BoxFuture;
use reelforge_domain_models::ArtifactRef;

/// Contrato de almacenamiento de blobs del dominio. El dominio nunca
/// interpreta el contenido referenciado por un `ArtifactRef`; solo lo
/// transporta entre etapas.
pub trait ArtifactStore: Send + Sync {
    fn put<'a>(&'a self, key: &'a str, bytes: Vec<u8>) -> BoxFuture<'a, Result<ArtifactRef, ArtifactStoreError>>;
    fn get<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<Vec<u8>, ArtifactStoreError>>;
    fn delete<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<(), ArtifactStoreError>>;
    fn exists<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<bool, ArtifactStoreError>>;
}
