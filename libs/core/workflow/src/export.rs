// [libs/core/workflow/src/export.rs]
/*!
 * APARATO: EXPORT COORDINATOR
 * CLASIFICACIÓN: CORE LOGIC (ESTRATO L2-CORE)
 * RESPONSABILIDAD: PROTOCOLO DE DOS FASES PARA LA ETAPA `RENDER`
 *
 * Guardia delgada que no reemplaza al Workflow Engine (§4.7): solo
 * certifica consentimiento explícito antes de dejarlo avanzar `RENDER`.
 */

use reelforge_domain_billing::{estimate, Estimate};
use reelforge_domain_models::{CollaboratorGrant, Production, ProductionId, TenantId};
use reelforge_domain_policy::{is_permitted, resolve_role, Operation};

use crate::engine::WorkflowEngine;
use crate::errors::WorkflowError;

#[derive(Debug, Clone, Copy)]
pub struct ExportEstimate {
    pub breakdown: Estimate,
    pub needs_payment: bool,
}

pub struct ExportCoordinator<'a> {
    engine: &'a WorkflowEngine,
}

impl<'a> ExportCoordinator<'a> {
    pub fn new(engine: &'a WorkflowEngine) -> Self {
        Self { engine }
    }

    /// Fase de estimación: ningún cambio de estado. Carga el tenant y la
    /// producción, delega el cálculo en §4.2.
    pub async fn estimate(&self, production_id: ProductionId) -> Result<ExportEstimate, WorkflowError> {
        let production = self.engine.load_production(production_id).await?;
        let tenant = self.engine.load_tenant(production.tenant_id).await?;
        let breakdown = estimate(tenant.tier, tenant.quota_minutes_remaining, production.config.target_minutes);
        Ok(ExportEstimate {
            needs_payment: breakdown.needs_payment,
            breakdown,
        })
    }

    /// Fase de confirmación: `confirmed = false` es un no-op que retorna
    /// `DeclinedByUser`; de lo contrario re-verifica la Policy Gate y deja
    /// correr exactamente una etapa del Workflow Engine (se espera que sea
    /// `RENDER`, la única a la que este guardia se antepone).
    pub async fn confirm(
        &self,
        production_id: ProductionId,
        tenant_id: TenantId,
        grants: &[CollaboratorGrant],
        confirmed: bool,
    ) -> Result<Production, WorkflowError> {
        if !confirmed {
            return Err(WorkflowError::DeclinedByUser);
        }
        let production = self.engine.load_production(production_id).await?;
        let role = resolve_role(tenant_id, &production, grants);
        if !is_permitted(role, Operation::TriggerExport) {
            return Err(WorkflowError::Forbidden);
        }
        self.engine.step(production_id).await
    }
}
