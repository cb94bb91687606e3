// [apps/orchestrator/src/config.rs]
/*!
 * APARATO: CONFIGURATION RESOLVER
 * CLASIFICACIÓN: COMPOSITION ROOT (ESTRATO L3)
 * RESPONSABILIDAD: TRADUCCIÓN DE VARIABLES DE ENTORNO A CONFIGURACIÓN TIPADA
 *
 * `dotenvy` solo rellena huecos de `std::env` (ver `main.rs`: `dotenvy::dotenv()`
 * se invoca antes de leer nada aquí), así que una variable ya exportada en el
 * proceso siempre gana sobre la del archivo `.env` — el orden de precedencia
 * no se repite aparato por aparato.
 */

use std::collections::HashMap;
use std::env;
use std::path::PathBuf;

use reelforge_domain_models::StageId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("[ORCH_CONFIG_FAULT]: missing required environment variable '{0}'")]
    Missing(&'static str),

    #[error("[ORCH_CONFIG_FAULT]: invalid value for '{name}': {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub enum StorageConfig {
    Local { root: PathBuf },
    S3 { endpoint: String, bucket: String, region: String, access_key: String, secret_key: String },
}

/// Un `base_url` por etapa, per §6 — cada uno aloja un modelo de IA externo
/// distinto detrás de un `StageHttpClient` propio.
#[derive(Debug, Clone)]
pub struct StageModelEndpoints {
    pub script_parse_base_url: String,
    pub character_model_base_url: String,
    pub storyboard_base_url: String,
    pub lip_sync_base_url: String,
    pub sound_match_base_url: String,
    pub render_base_url: String,
    pub bearer_token: String,
}

impl StageModelEndpoints {
    pub fn base_url_for(&self, stage: StageId) -> &str {
        match stage {
            StageId::ScriptParse => &self.script_parse_base_url,
            StageId::CharacterModel => &self.character_model_base_url,
            StageId::Storyboard => &self.storyboard_base_url,
            StageId::LipSync => &self.lip_sync_base_url,
            StageId::SoundMatch => &self.sound_match_base_url,
            StageId::Render => &self.render_base_url,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub db_dsn: String,
    pub db_auth_token: Option<String>,
    pub storage: StorageConfig,
    pub stage_models: StageModelEndpoints,
    pub auth_shared_secret: String,
    /// Reconocido per §6 ("auth.token_ttl_seconds") pero inerte: la emisión
    /// de credenciales es responsabilidad de un colaborador externo (§1); se
    /// conserva el valor para cuando ese colaborador exista.
    pub auth_token_ttl_seconds: u64,
    /// Reconocido per §6 ("retry.max_attempts" / "retry.backoff_base_seconds")
    /// pero no conectado a `StageRegistry::new` — la política de reintento
    /// vigente vive fija en `reelforge-core-workflow::registry::RetryPolicy`.
    pub retry_max_attempts_hint: u32,
    pub retry_backoff_base_seconds_hint: u64,
    /// Reconocido per §6 ("tier.table_overrides") pero no aplicado: la tabla
    /// de niveles vigente es la función pura `reelforge_domain_billing::tier_rule`,
    /// que no expone un punto de inyección por despliegue. Ver DESIGN.md.
    pub tier_table_overrides: Option<serde_json::Value>,
}

fn env_var(name: &'static str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::Missing(name))
}

fn env_var_or(name: &'static str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn env_parse_or<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw.parse().map_err(|_| ConfigError::Invalid { name, value: raw }),
        Err(_) => Ok(default),
    }
}

impl Config {
    /// Resuelve la configuración del proceso desde `std::env`. El llamador
    /// (`main.rs`, `bin/migrator.rs`, `bin/seed.rs`) ya invocó `dotenvy::dotenv()`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = env_parse_or("REELFORGE_PORT", 8080u16)?;

        let db_dsn = env_var_or("REELFORGE_DB_DSN", "reelforge.db");
        let db_auth_token = env::var("REELFORGE_DB_AUTH_TOKEN").ok();

        let storage_backend = env_var_or("REELFORGE_STORAGE_BACKEND", "local");
        let storage = match storage_backend.as_str() {
            "local" => StorageConfig::Local {
                root: PathBuf::from(env_var_or("REELFORGE_STORAGE_LOCAL_ROOT", "./artifacts")),
            },
            "s3" => StorageConfig::S3 {
                endpoint: env_var("REELFORGE_STORAGE_S3_ENDPOINT")?,
                bucket: env_var("REELFORGE_STORAGE_S3_BUCKET")?,
                region: env_var_or("REELFORGE_STORAGE_S3_REGION", "auto"),
                access_key: env_var("REELFORGE_STORAGE_S3_KEY")?,
                secret_key: env_var("REELFORGE_STORAGE_S3_SECRET")?,
            },
            other => {
                return Err(ConfigError::Invalid {
                    name: "REELFORGE_STORAGE_BACKEND",
                    value: other.to_string(),
                })
            }
        };

        let gateway_default = env_var_or("REELFORGE_STAGE_MODEL_BASE_URL", "http://localhost:9000");
        let stage_models = StageModelEndpoints {
            script_parse_base_url: env_var_or("REELFORGE_STAGE_MODEL_BASE_URL_SCRIPT_PARSE", &gateway_default),
            character_model_base_url: env_var_or("REELFORGE_STAGE_MODEL_BASE_URL_CHARACTER_MODEL", &gateway_default),
            storyboard_base_url: env_var_or("REELFORGE_STAGE_MODEL_BASE_URL_STORYBOARD", &gateway_default),
            lip_sync_base_url: env_var_or("REELFORGE_STAGE_MODEL_BASE_URL_LIP_SYNC", &gateway_default),
            sound_match_base_url: env_var_or("REELFORGE_STAGE_MODEL_BASE_URL_SOUND_MATCH", &gateway_default),
            render_base_url: env_var_or("REELFORGE_STAGE_MODEL_BASE_URL_RENDER", &gateway_default),
            bearer_token: env_var_or("REELFORGE_STAGE_MODEL_BEARER_TOKEN", "dev-stage-model-token"),
        };

        let auth_shared_secret = env_var_or("REELFORGE_AUTH_SHARED_SECRET", "dev-shared-secret");
        let auth_token_ttl_seconds = env_parse_or("REELFORGE_AUTH_TOKEN_TTL_SECONDS", 3600u64)?;
        let retry_max_attempts_hint = env_parse_or("REELFORGE_RETRY_MAX_ATTEMPTS", 3u32)?;
        let retry_backoff_base_seconds_hint = env_parse_or("REELFORGE_RETRY_BACKOFF_BASE_SECONDS", 1u64)?;

        let tier_table_overrides = match env::var("REELFORGE_TIER_TABLE_OVERRIDES") {
            Ok(raw) => Some(serde_json::from_str(&raw).map_err(|_| ConfigError::Invalid {
                name: "REELFORGE_TIER_TABLE_OVERRIDES",
                value: raw,
            })?),
            Err(_) => None,
        };

        Ok(Self {
            port,
            db_dsn,
            db_auth_token,
            storage,
            stage_models,
            auth_shared_secret,
            auth_token_ttl_seconds,
            retry_max_attempts_hint,
            retry_backoff_base_seconds_hint,
            tier_table_overrides,
        })
    }
}

/// Timeout por etapa recibido de `REELFORGE_STAGE_TIMEOUT_<ETAPA>`, si el
/// operador lo fijó. No se conecta a `StageRegistry::timeout_for` por la
/// misma razón que `retry_max_attempts_hint`: ver DESIGN.md.
pub fn stage_timeout_overrides() -> HashMap<StageId, u64> {
    let mut overrides = HashMap::new();
    for (stage, suffix) in [
        (StageId::ScriptParse, "SCRIPT_PARSE"),
        (StageId::CharacterModel, "CHARACTER_MODEL"),
        (StageId::Storyboard, "STORYBOARD"),
        (StageId::LipSync, "LIP_SYNC"),
        (StageId::SoundMatch, "SOUND_MATCH"),
        (StageId::Render, "RENDER"),
    ] {
        if let Ok(raw) = env::var(format!("REELFORGE_STAGE_TIMEOUT_{suffix}")) {
            if let Ok(seconds) = raw.parse() {
                overrides.insert(stage, seconds);
            }
        }
    }
    overrides
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_for_selects_the_right_stage() {
        let endpoints = StageModelEndpoints {
            script_parse_base_url: "http://a".into(),
            character_model_base_url: "http://b".into(),
            storyboard_base_url: "http://c".into(),
            lip_sync_base_url: "http://d".into(),
            sound_match_base_url: "http://e".into(),
            render_base_url: "http://f".into(),
            bearer_token: "tok".into(),
        };
        assert_eq!(endpoints.base_url_for(StageId::Render), "http://f");
        assert_eq!(endpoints.base_url_for(StageId::ScriptParse), "http://a");
    }
}
