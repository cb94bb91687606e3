// [libs/core/workflow/src/lib.rs]
/*!
 * =================================================================
 * APARATO: WORKFLOW ENGINE WORKSPACE (V1.0 - GOLD MASTER)
 * CLASIFICACIÓN: CORE LOGIC (ESTRATO L2-CORE)
 * RESPONSABILIDAD: STAGE REGISTRY, MOTOR DE FLUJO, EXPORT COORDINATOR,
 *                  PROGRESS REPORTER (§4.3, §4.6, §4.7, §4.8)
 * =================================================================
 */

pub mod engine;
pub mod errors;
pub mod export;
pub mod progress;
pub mod registry;
pub mod worker;

pub use engine::WorkflowEngine;
pub use errors::WorkflowError;
pub use export::{ExportCoordinator, ExportEstimate};
pub use progress::{snapshot, ProgressSnapshot};
pub use registry::{RetryPolicy, StageRegistry, StageSpec};
pub use worker::{StageInput, StageOutput, StageWorker, StageWorkerError};
