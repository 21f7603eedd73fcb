use std::env;
use std::net::SocketAddr;

use dotenv::dotenv;
use thiserror::Error;
use tracing::error;

const ENDERECO_PADRAO: &str = "127.0.0.1:8080";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    VariavelAusente(&'static str),
    #[error("endereco invalido em REVENDA_ADDR: {0}")]
    EnderecoInvalido(String),
}

/// Credenciais dos backends e parametros de execucao.
///
/// Nenhuma credencial e exigida na leitura; cada backend cobra as suas em
/// [`BackendConfig::rest`] ou [`BackendConfig::database_url`].
#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub url: Option<String>,
    /// Chave publicavel (anon) enviada em `apikey` e `Authorization`.
    pub chave_api: Option<String>,
    pub database_url: Option<String>,
    pub endereco: SocketAddr,
}

impl BackendConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();
        Self::from_vars(|nome| env::var(nome).ok())
    }

    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let preenchida = |nome: &str| var(nome).filter(|valor| !valor.trim().is_empty());

        let endereco = var("REVENDA_ADDR").unwrap_or_else(|| ENDERECO_PADRAO.to_string());
        let endereco = endereco.parse::<SocketAddr>().map_err(|e| {
            error!("REVENDA_ADDR invalido {}: {:?}", endereco, e);
            ConfigError::EnderecoInvalido(endereco.clone())
        })?;

        Ok(Self {
            url: preenchida("SUPABASE_URL"),
            chave_api: preenchida("SUPABASE_ANON_KEY"),
            database_url: preenchida("DATABASE_URL"),
            endereco,
        })
    }

    /// URL base e chave da API REST.
    pub fn rest(&self) -> Result<(&str, &str), ConfigError> {
        let url = obrigatoria(&self.url, "SUPABASE_URL")?;
        let chave_api = obrigatoria(&self.chave_api, "SUPABASE_ANON_KEY")?;
        Ok((url, chave_api))
    }

    pub fn database_url(&self) -> Result<&str, ConfigError> {
        obrigatoria(&self.database_url, "DATABASE_URL")
    }
}

fn obrigatoria<'a>(valor: &'a Option<String>, nome: &'static str) -> Result<&'a str, ConfigError> {
    valor.as_deref().ok_or_else(|| {
        error!("{} must be set", nome);
        ConfigError::VariavelAusente(nome)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pares: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let mapa: HashMap<String, String> = pares.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |nome| mapa.get(nome).cloned()
    }

    #[test]
    fn le_credenciais_rest_e_padroes() {
        let config = BackendConfig::from_vars(vars(&[
            ("SUPABASE_URL", "https://exemplo.supabase.co"),
            ("SUPABASE_ANON_KEY", "anon"),
        ]))
        .unwrap();

        assert_eq!(config.rest().unwrap(), ("https://exemplo.supabase.co", "anon"));
        assert_eq!(config.database_url(), Err(ConfigError::VariavelAusente("DATABASE_URL")));
        assert_eq!(config.endereco, "127.0.0.1:8080".parse::<SocketAddr>().unwrap());
    }

    #[test]
    fn chave_ausente_ou_vazia_e_erro_so_para_o_rest() {
        let config = BackendConfig::from_vars(vars(&[("SUPABASE_URL", "https://x"), ("SUPABASE_ANON_KEY", " ")])).unwrap();
        assert_eq!(config.rest(), Err(ConfigError::VariavelAusente("SUPABASE_ANON_KEY")));

        let config = BackendConfig::from_vars(vars(&[])).unwrap();
        assert_eq!(config.rest(), Err(ConfigError::VariavelAusente("SUPABASE_URL")));
    }

    #[test]
    fn backend_postgres_dispensa_credenciais_rest() {
        let config = BackendConfig::from_vars(vars(&[("DATABASE_URL", "postgres://revenda@localhost/revenda")])).unwrap();

        assert_eq!(config.database_url(), Ok("postgres://revenda@localhost/revenda"));
        assert!(config.rest().is_err());
    }

    #[test]
    fn endereco_invalido_e_erro() {
        let erro = BackendConfig::from_vars(vars(&[
            ("SUPABASE_URL", "https://x"),
            ("SUPABASE_ANON_KEY", "anon"),
            ("REVENDA_ADDR", "porta-errada"),
        ]))
        .unwrap_err();
        assert_eq!(erro, ConfigError::EnderecoInvalido("porta-errada".to_string()));
    }
}
