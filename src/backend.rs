use serde::de::DeserializeOwned;

use crate::consulta::{Consulta, ErroConsulta, Pagina};
use crate::db::PgExecutor;
use crate::postgrest::PostgrestClient;

/// Onde as consultas sao executadas.
#[derive(Clone)]
pub enum Backend {
    Rest(PostgrestClient),
    Postgres(PgExecutor),
}

impl Backend {
    pub async fn executar<T: DeserializeOwned>(&self, consulta: &Consulta) -> Result<Pagina<T>, ErroConsulta> {
        match self {
            Backend::Rest(client) => client.executar(consulta).await,
            Backend::Postgres(executor) => executor.executar(consulta).await,
        }
    }
}
