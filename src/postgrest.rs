use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error};

use crate::config::{BackendConfig, ConfigError};
use crate::consulta::{Consulta, Contagem, ContentRange, ErroConsulta, Pagina};

/// Cliente da API REST (PostgREST) do banco hospedado.
#[derive(Clone)]
pub struct PostgrestClient {
    client: Client,
    base_url: String,
    chave_api: String,
}

impl PostgrestClient {
    pub fn new(base_url: &str, chave_api: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            chave_api: chave_api.to_string(),
        }
    }

    pub fn from_config(config: &BackendConfig) -> Result<Self, ConfigError> {
        let (url, chave_api) = config.rest()?;
        Ok(Self::new(url, chave_api))
    }

    fn url(&self, tabela: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, tabela)
    }

    pub async fn executar<T: DeserializeOwned>(&self, consulta: &Consulta) -> Result<Pagina<T>, ErroConsulta> {
        let url = self.url(consulta.tabela());
        let parametros = consulta.parametros();
        debug!("GET {} {:?}", url, parametros);

        let mut request = self
            .client
            .get(&url)
            .query(&parametros)
            .header("apikey", &self.chave_api)
            .bearer_auth(&self.chave_api)
            .header("accept", "application/json");
        if consulta.contagem() == Contagem::Exata {
            request = request.header("prefer", "count=exact");
        }

        let response = request.send().await.map_err(|e| {
            error!("Failed to send request to {}: {:?}", url, e);
            e
        })?;

        let status = response.status();
        let content_range = response
            .headers()
            .get("content-range")
            .and_then(|valor| valor.to_str().ok())
            .map(str::to_string);
        let corpo = response.text().await?;

        if !status.is_success() {
            // o corpo de erro do PostgREST e JSON; se nao for, guarda o texto cru
            let corpo = serde_json::from_str::<Value>(&corpo).unwrap_or(Value::String(corpo));
            error!("Backend respondeu {} para {}: {}", status, consulta.tabela(), corpo);
            return Err(ErroConsulta::Backend {
                status: status.as_u16(),
                corpo,
            });
        }

        let linhas: Vec<T> = serde_json::from_str(&corpo).map_err(|e| {
            error!("Failed to deserialize response from {}: {:?}", consulta.tabela(), e);
            e
        })?;

        let total = match consulta.contagem() {
            Contagem::Nenhuma => None,
            Contagem::Exata => {
                let content_range: ContentRange = content_range.ok_or(ErroConsulta::ContagemAusente)?.parse()?;
                Some(content_range.total.ok_or(ErroConsulta::ContagemAusente)?)
            }
        };

        debug!("{} linhas recebidas de {} (total {:?})", linhas.len(), consulta.tabela(), total);
        Ok(Pagina { linhas, total })
    }
}
