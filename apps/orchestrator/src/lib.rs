// [apps/orchestrator/src/lib.rs]
/*!
 * =================================================================
 * APARATO: ORCHESTRATOR LIBRARY ROOT (V1.0 - GOLD MASTER)
 * CLASIFICACIÓN: CRATE ROOT (ESTRATO L3)
 * RESPONSABILIDAD: DEFINICIÓN SUPREMA DEL ÁRBOL DE MÓDULOS
 * =================================================================
 */

/// Configuración tipada del proceso, resuelta desde variables de entorno.
pub mod config;
/// Adaptadores de entrada HTTP para producciones, colaboración y exportación.
pub mod handlers;
/// Núcleo de mando y control para la ignición del sistema.
pub mod kernel;
/// Guardianes perimetrales de salud y autenticación.
pub mod middleware;
/// El túnel de mando: definición de rutas y topología de red.
pub mod routes;
/// Daemons de fondo.
pub mod services;
/// Gestor del estado compartido del orquestador.
pub mod state;

/**
 * PRELUDIO DEL ORQUESTADOR
 *
 * Re-exportación estratégica de los componentes necesarios para
 * la ignición mínima del sistema. Reduce el acoplamiento en 'main.rs'.
 */
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::kernel::OrchestratorKernel;
    pub use crate::state::AppState;
    pub use crate::state::SystemMode;
}
