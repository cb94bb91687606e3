// [apps/orchestrator/src/services/mod.rs]
/*!
 * APARATO: BACKGROUND SERVICES INDEX
 * CLASIFICACIÓN: APPLICATION SERVICES (ESTRATO L4)
 * RESPONSABILIDAD: EXPOSICIÓN NOMINAL DE DAEMONS DE FONDO
 */

pub mod version_reaper;

pub use version_reaper::spawn_version_reaper;
