// [libs/core/workflow/src/errors.rs]
use thiserror::Error;

use reelforge_core_pricing::PricingError;
use reelforge_domain_models::{ErrorKind, ProductionStatus, StageId};
use reelforge_infra_db::DbError;

/// Catálogo de errores del Workflow Engine. Cada variante corresponde a una
/// fila de la tabla de §7; `to_error_kind` proyecta hacia `ErrorKind` para
/// poblar `Production.last_error` en el Production Store.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("[WORKFLOW_STORE_FAULT]: {0}")]
    Store(#[from] DbError),

    #[error("[WORKFLOW_FORBIDDEN_FAULT]: effective role does not permit this operation")]
    Forbidden,

    #[error("[WORKFLOW_QUOTA_FAULT]: insufficient quota: required {required}, remaining {remaining}")]
    InsufficientQuota { required: f64, remaining: f64 },

    #[error("[WORKFLOW_DECLINED_FAULT]: export declined by user")]
    DeclinedByUser,

    #[error("[WORKFLOW_PREREQ_FAULT]: missing output of stage {0:?}")]
    MissingPrerequisite(StageId),

    #[error("[WORKFLOW_STAGE_FAULT]: stage {stage:?} failed permanently: {message}")]
    StagePermanent { stage: StageId, message: String },

    #[error("[WORKFLOW_STATUS_FAULT]: production status {0:?} does not permit this operation")]
    InvalidStatus(ProductionStatus),

    #[error("[WORKFLOW_REGISTRY_FAULT]: {0}")]
    RegistryIncomplete(String),
}

impl WorkflowError {
    pub fn to_error_kind(&self) -> ErrorKind {
        match self {
            WorkflowError::Store(DbError::NotFound) => ErrorKind::NotFound,
            WorkflowError::Store(DbError::VersionConflict) => ErrorKind::VersionConflict,
            WorkflowError::Store(_) => ErrorKind::InvalidInput,
            WorkflowError::Forbidden => ErrorKind::Forbidden,
            WorkflowError::InsufficientQuota { .. } => ErrorKind::InsufficientQuota,
            WorkflowError::DeclinedByUser => ErrorKind::DeclinedByUser,
            WorkflowError::MissingPrerequisite(_) => ErrorKind::MissingPrerequisite,
            WorkflowError::StagePermanent { .. } => ErrorKind::StagePermanent,
            WorkflowError::InvalidStatus(_) => ErrorKind::InvalidInput,
            WorkflowError::RegistryIncomplete(_) => ErrorKind::InvalidInput,
        }
    }
}

impl From<PricingError> for WorkflowError {
    fn from(value: PricingError) -> Self {
        match value {
            PricingError::InsufficientQuota { required, remaining } => {
                WorkflowError::InsufficientQuota { required, remaining }
            }
        }
    }
}
