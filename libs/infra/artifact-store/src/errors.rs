// [libs/infra/artifact-store/src/errors.rs]
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ArtifactStoreError {
    #[error("[ARTIFACT_NOT_FOUND]: no blob stored under key '{0}'")]
    NotFound(String),

    #[error("[ARTIFACT_IO_FAULT]: {0}")]
    Io(#[from] std::io::Error),

    #[error("[ARTIFACT_TRANSPORT_FAULT]: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("[ARTIFACT_BACKEND_FAULT]: {0}")]
    Backend(String),
}
