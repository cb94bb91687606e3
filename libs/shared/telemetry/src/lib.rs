// [libs/shared/telemetry/src/lib.rs]
/*!
 * =================================================================
 * APARATO: OBSERVABILITY NERVE (V1.0 - GOLD MASTER)
 * CLASIFICACIÓN: SHARED UTILITY (ESTRATO L4/L6)
 * RESPONSABILIDAD: GESTIÓN DE TELEMETRÍA, TRAZADO Y CAPTURA DE PÁNICOS
 *
 * Capa domain-agnostic compartida por `apps/orchestrator` y cualquier
 * binario auxiliar (migrator, seed). La arquitectura de registro no
 * bloqueante garantiza que el rastro de ejecución se preserve incluso
 * ante una terminación abrupta del proceso.
 * =================================================================
 */

use std::panic;

use tracing::{error, info, instrument};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt as formatting_layer, EnvFilter};

/// Inicializa el sistema de trazas con blindaje de pánicos soberano.
///
/// - Desarrollo: logs interactivos compactos.
/// - Producción: estructura JSON plana apta para ingesta centralizada.
///
/// # Errors
/// Entra en pánico si otro suscriptor global ya fue inicializado en el
/// runtime — refleja que este aparato solo debe invocarse una vez, al
/// arrancar `apps/orchestrator`.
#[instrument(skip_all)]
pub fn init_tracing(service_nominal_identifier: &str) {
    let environmental_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!(
            "{}={level},tower_http=warn,hyper=warn,libsql=error",
            service_nominal_identifier,
            level = if cfg!(debug_assertions) { "debug" } else { "info" }
        )
        .into()
    });

    let is_production_strata = !cfg!(debug_assertions);

    if is_production_strata {
        tracing_subscriber::registry()
            .with(environmental_filter)
            .with(formatting_layer::layer().json().flatten_event(true))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(environmental_filter)
            .with(formatting_layer::layer().compact().with_target(false))
            .init();
    }

    let service_id_snapshot = service_nominal_identifier.to_string();

    panic::set_hook(Box::new(move |panic_metadata| {
        let panic_location = panic_metadata
            .location()
            .map(|location| format!("{}:{}:{}", location.file(), location.line(), location.column()))
            .unwrap_or_else(|| "UNKNOWN_LOCATION".to_string());

        let panic_payload_message = panic_metadata
            .payload()
            .downcast_ref::<&str>()
            .copied()
            .or_else(|| panic_metadata.payload().downcast_ref::<String>().map(|s| s.as_str()))
            .unwrap_or("UNDEFINED_PANIC_PAYLOAD");

        error!(
            target: "panic_monitor",
            service = %service_id_snapshot,
            location = %panic_location,
            "[CRITICAL_PANIC]: thread terminated abruptly. Analysis: {}",
            panic_payload_message
        );
    }));

    info!("[TELEMETRY_ONLINE]: observability initialized for [{}]", service_nominal_identifier);
}
