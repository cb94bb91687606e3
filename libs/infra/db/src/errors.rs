// [libs/infra/db/src/errors.rs]
/*!
 * =================================================================
 * APARATO: DATABASE ERROR CATALOG (V1.0 - GOLD MASTER)
 * CLASIFICACIÓN: INFRASTRUCTURE CORE (ESTRATO L3)
 * RESPONSABILIDAD: CATALOGACIÓN SEMÁNTICA DE FALLOS DE PERSISTENCIA
 * =================================================================
 */

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("[L3_DB_NET_FAULT]: DATABASE_UPLINK_SEVERED -> {0}")]
    ConnectionError(String),

    #[error("[L3_DB_CONFIG_FAULT]: STRATEGIC_ENV_VOID -> {0}")]
    ConfigurationError(String),

    #[error("[L3_DB_QUERY_FAULT]: SQL_QUERY_REJECTED -> {0}")]
    QueryError(#[from] libsql::Error),

    #[error("[L3_DB_MAPPING_FAULT]: DATA_MAPPING_VIOLATION -> {0}")]
    MappingError(String),

    #[error("[L3_DB_FAULT]: TRANSACTION_COLLAPSE")]
    TransactionError,

    /// §7 `NotFound` — la entidad solicitada no existe en las tablas activas.
    #[error("[L3_NOT_FOUND]: ENTITY_NOT_FOUND")]
    NotFound,

    /// La entidad ya existe; viola la precondición de `create`.
    #[error("[L3_CONFLICT]: ENTITY_ALREADY_EXISTS")]
    Conflict,

    /// §7 `VersionConflict` — el CAS sobre `version` no afectó ninguna fila.
    #[error("[L3_VERSION_CONFLICT]: OPTIMISTIC_LOCK_REJECTED")]
    VersionConflict,
}
