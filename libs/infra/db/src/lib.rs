// [libs/infra/db/src/lib.rs]
//! Adaptador de persistencia sobre `libsql`: conexión, esquema y los
//! repositorios de Tenant, Production, Collaboration y Version.

pub mod client;
pub mod errors;
pub mod repositories;
pub mod schema;

pub use client::TursoClient;
pub use errors::DbError;
pub use repositories::{
    CollaborationRepository, Paging, ProductionFilter, ProductionRepository, TenantRepository,
    VersionRepository,
};
