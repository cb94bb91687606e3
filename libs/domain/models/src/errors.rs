// [libs/domain/models/src/errors.rs]
use thiserror::Error;

/// Fallos de validación al construir un valor de dominio. Estos errores
/// nunca cruzan una frontera de I/O; son puramente de construcción.
#[derive(Debug, Error, PartialEq)]
pub enum ModelError {
    #[error("target_minutes debe estar en [0.5, 10.0], recibido {0}")]
    TargetMinutesOutOfRange(f64),

    #[error("el correo de la invitación no puede estar vacío")]
    EmptyInvitationEmail,
}
