// [libs/domain/models/src/tenant.rs]
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use typeshare::typeshare;

use crate::ids::TenantId;

/// Nivel de suscripción del operador. Vive en `models` (no en `billing`)
/// porque `TenantAccount` lo porta como dato propio; `reelforge-domain-billing`
/// depende de este crate para construir su `TierTable` de precios, nunca al
/// revés.
#[typeshare]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionTier {
    Free,
    PayPerUse,
    Professional,
    Enterprise,
}

/// Cuenta de un operador de la plataforma: propietaria de cero o más
/// producciones, titular de una cuota mensual de minutos de render.
#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TenantAccount {
    pub id: TenantId,
    pub email: String,
    pub password_digest: String,
    pub tier: SubscriptionTier,
    /// Minutos de cuota restantes en el ciclo de facturación vigente.
    pub quota_minutes_remaining: f64,
    pub display_name: String,
    pub created_at: DateTime<Utc>,
}

impl TenantAccount {
    pub fn new(
        email: String,
        password_digest: String,
        tier: SubscriptionTier,
        quota_minutes_remaining: f64,
        display_name: String,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: TenantId::new(),
            email,
            password_digest,
            tier,
            quota_minutes_remaining,
            display_name,
            created_at: now,
        }
    }
}
