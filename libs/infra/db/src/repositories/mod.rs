// [libs/infra/db/src/repositories/mod.rs]
/*!
 * APARATO: REPOSITORY ACCESS MATRIX
 * CLASIFICACIÓN: INFRASTRUCTURE LAYER (ESTRATO L3)
 * RESPONSABILIDAD: ORQUESTACIÓN DE SUBSISTEMAS DE PERSISTENCIA
 */

pub mod collaboration;
pub mod production;
pub mod tenant;
pub mod version;

pub use collaboration::CollaborationRepository;
pub use production::{Paging, ProductionFilter, ProductionRepository};
pub use tenant::TenantRepository;
pub use version::VersionRepository;
