// [libs/core/pricing/src/lib.rs]
/*!
 * =================================================================
 * APARATO: QUOTA & PRICING ENGINE (V1.0 - GOLD MASTER)
 * CLASIFICACIÓN: CORE LOGIC (ESTRATO L2-CORE)
 * RESPONSABILIDAD: ADMISIÓN, DÉBITO Y REEMBOLSO DE CUOTA
 *
 * `commit_debit`/`refund` son puros sobre un snapshot de cuota ya cargado:
 * no abren conexión ni adquieren locks. La exclusión por tenant (§5) y la
 * persistencia del nuevo valor de `quota_minutes_remaining` son
 * responsabilidad del Workflow Engine, que carga el tenant bajo su lock,
 * invoca estas funciones, y escribe el resultado con CAS.
 * =================================================================
 */

use serde::{Deserialize, Serialize};
use thiserror::Error;
use typeshare::typeshare;

use reelforge_domain_billing::{check_admissible, estimate, AdmissionCheck, Estimate};
use reelforge_domain_models::SubscriptionTier;

pub use reelforge_domain_billing::{check_admissible as estimate_admission, estimate as estimate_cost};

#[derive(Debug, Error, PartialEq)]
pub enum PricingError {
    #[error("cuota insuficiente: se requieren {required} minutos, quedan {remaining}")]
    InsufficientQuota { required: f64, remaining: f64 },
}

#[typeshare]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct DebitOutcome {
    pub debited: bool,
    pub cost: f64,
    pub quota_after: f64,
}

/// §4.2 `commit_debit`: re-verifica admisibilidad contra la cuota vigente
/// (`quota_remaining`, ya leída por el llamador bajo el lock de tenant) y
/// calcula el nuevo saldo. No persiste nada — el llamador escribe
/// `quota_after` con CAS sobre `version`.
#[tracing::instrument(skip_all, fields(tier = ?tier, duration_minutes))]
pub fn commit_debit(
    tier: SubscriptionTier,
    quota_remaining: f64,
    duration_minutes: f64,
) -> Result<DebitOutcome, PricingError> {
    let admission: AdmissionCheck = check_admissible(tier, quota_remaining, duration_minutes);
    if !admission.ok {
        return Err(PricingError::InsufficientQuota {
            required: duration_minutes,
            remaining: quota_remaining,
        });
    }
    let est: Estimate = estimate(tier, quota_remaining, duration_minutes);
    let quota_after = (quota_remaining - duration_minutes).max(0.0);
    Ok(DebitOutcome {
        debited: true,
        cost: est.total_cost,
        quota_after,
    })
}

/// §4.2 `refund`: añade `duration_minutes` de vuelta al saldo. Usado cuando
/// un render ya debitado falla de forma irrecuperable antes de producir el
/// artefacto final (sin penalización de costo — ver §9 Design Notes).
pub fn refund(quota_remaining: f64, duration_minutes: f64) -> f64 {
    quota_remaining + duration_minutes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commit_debit_clamps_quota_to_zero_on_overage() {
        let outcome = commit_debit(SubscriptionTier::Professional, 1.0, 3.0).unwrap();
        assert_eq!(outcome.quota_after, 0.0);
        assert_eq!(outcome.cost, 24.0);
    }

    #[test]
    fn commit_debit_rejects_free_tier_over_quota() {
        let err = commit_debit(SubscriptionTier::Free, 3.0, 5.0).unwrap_err();
        assert_eq!(
            err,
            PricingError::InsufficientQuota {
                required: 5.0,
                remaining: 3.0
            }
        );
    }

    #[test]
    fn debit_then_refund_with_no_intervening_debit_restores_quota() {
        let before = 50.0;
        let outcome = commit_debit(SubscriptionTier::Professional, before, 2.0).unwrap();
        let after_refund = refund(outcome.quota_after, 2.0);
        assert_eq!(after_refund, before);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn quota_never_goes_negative(quota in 0.0f64..500.0, duration in 0.01f64..50.0) {
            let outcome = commit_debit(SubscriptionTier::Enterprise, quota, duration);
            if let Ok(outcome) = outcome {
                prop_assert!(outcome.quota_after >= 0.0);
            }
        }

        #[test]
        fn estimate_total_cost_is_sum_of_parts(
            quota in 0.0f64..200.0,
            duration in 0.01f64..50.0,
        ) {
            for tier in [
                SubscriptionTier::Free,
                SubscriptionTier::PayPerUse,
                SubscriptionTier::Professional,
                SubscriptionTier::Enterprise,
            ] {
                let est = estimate_cost(tier, quota, duration);
                prop_assert_eq!(est.total_cost, est.base_cost + est.overage_cost);
                if tier != SubscriptionTier::PayPerUse {
                    prop_assert_eq!(est.overage_minutes, (duration - quota).max(0.0));
                } else {
                    prop_assert_eq!(est.overage_minutes, duration);
                }
            }
        }
    }
}
