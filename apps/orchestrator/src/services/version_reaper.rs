// [apps/orchestrator/src/services/version_reaper.rs]
/*!
 * APARATO: VERSION REAPER DAEMON
 * CLASIFICACIÓN: BACKGROUND INFRASTRUCTURE (ESTRATO L4)
 * RESPONSABILIDAD: PURGA DE SNAPSHOTS HISTÓRICOS Y EXPIRACIÓN DE INVITACIONES
 *
 * Hace normativo el límite de 30 días que la fuente original solo
 * documentaba sin aplicar (§9): `production_versions` más viejos que ese
 * umbral se purgan, y las invitaciones `pending` vencidas pasan a `expired`.
 */

use std::time::Duration;

use chrono::Utc;
use tokio::time::interval;
use tracing::{info, warn};

use reelforge_domain_models::InvitationStatus;

use crate::state::AppState;

const SNAPSHOT_RETENTION_DAYS: i64 = 30;

pub async fn spawn_version_reaper(state: AppState) {
    let mut ticker = interval(Duration::from_secs(60));

    tokio::spawn(async move {
        info!("🧹 [VERSION_REAPER_ACTIVE]: snapshot and invitation hygiene daemon initiated");

        loop {
            ticker.tick().await;

            let cutoff = Utc::now() - chrono::Duration::days(SNAPSHOT_RETENTION_DAYS);
            match state.version_repository.purge_older_than(cutoff).await {
                Ok(purged) if purged > 0 => info!("🧹 [VERSION_REAPER]: purged {} stale production snapshots", purged),
                Ok(_) => {}
                Err(fault) => warn!("⚠️ [VERSION_REAPER_FAULT]: snapshot purge failed: {}", fault),
            }

            let now = Utc::now();
            match state.collaboration_repository.list_stale_pending_invitations(&now.to_rfc3339()).await {
                Ok(stale) => {
                    for mut invitation in stale {
                        invitation.status = InvitationStatus::Expired;
                        invitation.responded_at = Some(now);
                        if let Err(fault) = state.collaboration_repository.update_invitation(&invitation).await {
                            warn!("⚠️ [VERSION_REAPER_FAULT]: failed to expire invitation {}: {}", invitation.id, fault);
                        }
                    }
                }
                Err(fault) => warn!("⚠️ [VERSION_REAPER_FAULT]: stale invitation sweep failed: {}", fault),
            }
        }
    });
}
