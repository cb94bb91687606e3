// [libs/infra/stage-workers/src/http.rs]
/*!
 * APARATO: STAGE MODEL UPLINK
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTER (ESTRATO L3)
 * RESPONSABILIDAD: CLIENTE HTTP COMPARTIDO POR LOS SEIS ADAPTADORES
 *
 * Cada modelo de IA externo (fuera de alcance de este workspace) se
 * expone como un endpoint `POST` que recibe la entrada de la etapa y
 * responde con su salida tipada. Un `StageHttpClient` por etapa fija su
 * propio `base_url`; el resto del comportamiento — cabeceras, timeout de
 * transporte, serialización — es idéntico entre etapas.
 */

use std::time::Duration;

use reqwest::Client;
use serde::{de::DeserializeOwned, Serialize};
use tracing::instrument;

use crate::errors::AdapterError;

#[derive(Clone)]
pub struct StageHttpClient {
    client: Client,
    base_url: String,
}

impl StageHttpClient {
    pub fn new(base_url: impl Into<String>, bearer_token: impl Into<String>) -> Self {
        let mut headers = reqwest::header::HeaderMap::new();
        let auth_value = reqwest::header::HeaderValue::from_str(&format!("Bearer {}", bearer_token.into()))
            .expect("invalid stage model bearer token");
        headers.insert(reqwest::header::AUTHORIZATION, auth_value);

        Self {
            client: Client::builder()
                .default_headers(headers)
                .user_agent("reelforge-stage-worker/1.0")
                // El timeout de transporte fino del lado del cliente es
                // deliberadamente más corto que el presupuesto por etapa de
                // `registry::timeout_for`, que envuelve la llamada entera en
                // `tokio::time::timeout` desde el Workflow Engine.
                .timeout(Duration::from_secs(120))
                .build()
                .expect("failed to build stage model HTTP client"),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    #[instrument(skip(self, body), fields(path))]
    pub async fn post_json<Req, Resp>(&self, path: &str, body: &Req) -> Result<Resp, AdapterError>
    where
        Req: Serialize + ?Sized,
        Resp: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        let response = self.client.post(&url).json(body).send().await?;
        if response.status().is_success() {
            Ok(response.json::<Resp>().await?)
        } else {
            Err(AdapterError::Rejection(response.status()))
        }
    }
}
