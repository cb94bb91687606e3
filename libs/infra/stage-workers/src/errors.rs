// [libs/infra/stage-workers/src/errors.rs]
//! =================================================================
//! APARATO: STAGE WORKER HTTP ERRORS
//! RESPONSABILIDAD: CATALOGACIÓN DE FALLOS DE COMUNICACIÓN CON LOS
//!                   MODELOS DE IA EXTERNOS, Y SU CLASIFICACIÓN HACIA
//!                   `StageWorkerError` (transitorio vs. permanente)
//! =================================================================

use reelforge_core_workflow::StageWorkerError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AdapterError {
    #[error("NETWORK_UNREACHABLE: {0}")]
    Network(#[from] reqwest::Error),

    #[error("ENVELOPE_CORRUPTION: failed to decode response body: {0}")]
    Decoding(#[from] serde_json::Error),

    #[error("MODEL_REJECTION: status {0}")]
    Rejection(reqwest::StatusCode),
}

/// Clasifica un fallo de transporte como transitorio o permanente (§4.3,
/// §5 "Timeouts"): 5xx y fallos de conexión se reintentan, 4xx no.
impl From<AdapterError> for StageWorkerError {
    fn from(value: AdapterError) -> Self {
        match value {
            AdapterError::Network(err) if err.is_timeout() || err.is_connect() => {
                StageWorkerError::Transient(err.to_string())
            }
            AdapterError::Network(err) => StageWorkerError::Transient(err.to_string()),
            AdapterError::Decoding(err) => StageWorkerError::Permanent(err.to_string()),
            AdapterError::Rejection(status) if status.is_server_error() => {
                StageWorkerError::Transient(format!("HTTP_{status}"))
            }
            AdapterError::Rejection(status) => StageWorkerError::Permanent(format!("HTTP_{status}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_error_classifies_as_transient() {
        let classified: StageWorkerError = AdapterError::Rejection(reqwest::StatusCode::SERVICE_UNAVAILABLE).into();
        assert!(matches!(classified, StageWorkerError::Transient(_)));
    }

    #[test]
    fn client_error_classifies_as_permanent() {
        let classified: StageWorkerError = AdapterError::Rejection(reqwest::StatusCode::BAD_REQUEST).into();
        assert!(matches!(classified, StageWorkerError::Permanent(_)));
    }

    #[test]
    fn decoding_failure_classifies_as_permanent() {
        let decode_err = serde_json::from_str::<u8>("not json").unwrap_err();
        let classified: StageWorkerError = AdapterError::Decoding(decode_err).into();
        assert!(matches!(classified, StageWorkerError::Permanent(_)));
    }
}
