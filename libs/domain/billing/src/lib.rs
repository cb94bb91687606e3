// [libs/domain/billing/src/lib.rs]
/*!
 * =================================================================
 * APARATO: BILLING CORE ENGINE (V1.0 - GOLD MASTER)
 * CLASIFICACIÓN: DOMAIN LOGIC (ESTRATO L2)
 * RESPONSABILIDAD: TABLA DE NIVELES Y ESTIMACIÓN PURA DE COSTO DE EXPORTACIÓN
 *
 * Este aparato no toca I/O ni persistencia: `estimate` y `check_admissible`
 * son funciones puras de `(tier, quota_remaining, duration)`. La aplicación
 * del débito contra el saldo vivo vive en `reelforge-core-pricing`, bajo
 * exclusión por tenant.
 * =================================================================
 */

use serde::{Deserialize, Serialize};
use typeshare::typeshare;

use reelforge_domain_models::SubscriptionTier;

/// Reglas de precio y cuota de un nivel de suscripción (tabla §3 de la
/// especificación de precios).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TierRule {
    pub monthly_quota_minutes: f64,
    pub monthly_price: f64,
    pub overage_permitted: bool,
    pub overage_rate: f64,
    /// Tarifa por minuto para PAY_PER_USE; `0.0` para el resto de niveles,
    /// que no facturan por unidad sino por cuota + excedente.
    pub per_unit_rate: f64,
}

/// Tabla de niveles fija, equivalente a `PRICING_CONFIG` de la fuente
/// original: FREE no permite excedente; PAY_PER_USE no tiene cuota fija y
/// factura todo por unidad; PROFESSIONAL/ENTERPRISE combinan cuota mensual
/// con tarifa de excedente.
pub fn tier_rule(tier: SubscriptionTier) -> TierRule {
    match tier {
        SubscriptionTier::Free => TierRule {
            monthly_quota_minutes: 5.0,
            monthly_price: 0.0,
            overage_permitted: false,
            overage_rate: 0.0,
            per_unit_rate: 0.0,
        },
        SubscriptionTier::PayPerUse => TierRule {
            monthly_quota_minutes: 0.0,
            monthly_price: 0.0,
            overage_permitted: true,
            overage_rate: 0.0,
            per_unit_rate: 10.0,
        },
        SubscriptionTier::Professional => TierRule {
            monthly_quota_minutes: 50.0,
            monthly_price: 299.0,
            overage_permitted: true,
            overage_rate: 12.0,
            per_unit_rate: 0.0,
        },
        SubscriptionTier::Enterprise => TierRule {
            monthly_quota_minutes: 200.0,
            monthly_price: 999.0,
            overage_permitted: true,
            overage_rate: 10.0,
            per_unit_rate: 0.0,
        },
    }
}

/// Desglose de costo de una exportación propuesta, exactamente como lo
/// describe §4.2: `total_cost = base_cost + overage_cost`.
#[typeshare]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Estimate {
    pub tier: SubscriptionTier,
    pub duration_minutes: f64,
    pub quota_before: f64,
    pub quota_consumed: f64,
    pub overage_minutes: f64,
    pub base_cost: f64,
    pub overage_cost: f64,
    pub total_cost: f64,
    pub needs_payment: bool,
    pub admissible: bool,
}

/// Calcula el desglose de costo para un render de `duration_minutes` bajo el
/// `tier` dado con `quota_remaining` minutos disponibles. Función pura, sin
/// efectos secundarios — propiedad testable 4 de la especificación.
pub fn estimate(tier: SubscriptionTier, quota_remaining: f64, duration_minutes: f64) -> Estimate {
    let rule = tier_rule(tier);
    let is_pay_per_use = matches!(tier, SubscriptionTier::PayPerUse);

    let quota_consumed = if is_pay_per_use {
        0.0
    } else {
        duration_minutes.min(quota_remaining)
    };
    let overage_minutes = if is_pay_per_use {
        duration_minutes
    } else {
        (duration_minutes - quota_remaining).max(0.0)
    };
    let base_cost = if is_pay_per_use {
        duration_minutes * rule.per_unit_rate
    } else {
        0.0
    };
    let overage_cost = if rule.overage_permitted {
        overage_minutes * rule.overage_rate
    } else {
        0.0
    };
    let total_cost = base_cost + overage_cost;
    let admissible = overage_minutes == 0.0 || rule.overage_permitted;

    Estimate {
        tier,
        duration_minutes,
        quota_before: quota_remaining,
        quota_consumed,
        overage_minutes,
        base_cost,
        overage_cost,
        total_cost,
        needs_payment: total_cost > 0.0,
        admissible,
    }
}

/// Resultado de una verificación de admisibilidad sin calcular costo.
#[typeshare]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct AdmissionCheck {
    pub ok: bool,
    pub insufficient_quota: bool,
    pub tier_forbids_overage: bool,
}

/// §4.2 `check_admissible`: para FREE, rechaza cuando `d > q`; el resto de
/// niveles siempre admite porque permiten excedente.
pub fn check_admissible(tier: SubscriptionTier, quota_remaining: f64, duration_minutes: f64) -> AdmissionCheck {
    let rule = tier_rule(tier);
    if !rule.overage_permitted && duration_minutes > quota_remaining {
        return AdmissionCheck {
            ok: false,
            insufficient_quota: true,
            tier_forbids_overage: true,
        };
    }
    AdmissionCheck {
        ok: true,
        insufficient_quota: false,
        tier_forbids_overage: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn professional_happy_path_has_zero_cost_within_quota() {
        let est = estimate(SubscriptionTier::Professional, 50.0, 2.0);
        assert_eq!(est.total_cost, 0.0);
        assert!(!est.needs_payment);
        assert!(est.admissible);
    }

    #[test]
    fn free_tier_over_quota_is_inadmissible() {
        let check = check_admissible(SubscriptionTier::Free, 3.0, 5.0);
        assert!(!check.ok);
        assert!(check.insufficient_quota);
    }

    #[test]
    fn professional_overage_bills_at_tier_rate() {
        let est = estimate(SubscriptionTier::Professional, 1.0, 3.0);
        assert_eq!(est.quota_consumed, 1.0);
        assert_eq!(est.overage_minutes, 2.0);
        assert_eq!(est.overage_cost, 24.0);
        assert_eq!(est.total_cost, 24.0);
        assert!(est.needs_payment);
    }

    #[test]
    fn pay_per_use_bills_every_minute_at_per_unit_rate() {
        let est = estimate(SubscriptionTier::PayPerUse, 0.0, 4.0);
        assert_eq!(est.quota_consumed, 0.0);
        assert_eq!(est.overage_minutes, 4.0);
        assert_eq!(est.base_cost, 40.0);
        assert_eq!(est.overage_cost, 0.0);
        assert_eq!(est.total_cost, 40.0);
    }

    #[test]
    fn total_cost_always_equals_base_plus_overage() {
        for tier in [
            SubscriptionTier::Free,
            SubscriptionTier::PayPerUse,
            SubscriptionTier::Professional,
            SubscriptionTier::Enterprise,
        ] {
            let est = estimate(tier, 10.0, 7.5);
            assert_eq!(est.total_cost, est.base_cost + est.overage_cost);
        }
    }
}
