use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, error};

use crate::consulta::Intervalo;
use crate::AppState;

use super::pedido::{buscar_pedidos, ErroPedidos};
use super::pedido_model::{Aba, ErroFiltro, FiltrosPedido, PaginaPedidos};

// sem serde(flatten): serde_urlencoded nao converte numeros dentro de campos achatados
#[derive(Debug, Default, Deserialize)]
pub struct PedidosQuery {
    pub aba: Option<String>,
    pub data_inicio: Option<String>,
    pub data_fim: Option<String>,
    pub corretor_id: Option<String>,
    pub busca: Option<String>,
    pub de: Option<u64>,
    pub ate: Option<u64>,
}

impl PedidosQuery {
    fn intervalo(&self) -> Result<Intervalo, ErroFiltro> {
        let inicio = self.de.unwrap_or(0);
        let fim = self
            .ate
            .unwrap_or_else(|| inicio.saturating_add(Intervalo::default().quantidade() - 1));
        Ok(Intervalo::new(inicio, fim)?)
    }

    fn filtros(&self) -> FiltrosPedido {
        FiltrosPedido {
            data_inicio: self.data_inicio.clone(),
            data_fim: self.data_fim.clone(),
            corretor_id: self.corretor_id.clone(),
            busca: self.busca.clone(),
        }
    }
}

pub async fn listar_pedidos(
    State(state): State<AppState>,
    Query(query): Query<PedidosQuery>,
) -> Result<Json<PaginaPedidos>, (StatusCode, Json<Value>)> {
    debug!("Listando pedidos: {:?}", query);

    let entrada = query
        .aba
        .as_deref()
        .unwrap_or_default()
        .parse::<Aba>()
        .and_then(|aba| Ok((aba, query.intervalo()?)));
    let (aba, intervalo) = entrada.map_err(|e| {
        error!("Parametros invalidos: {:?}", e);
        (StatusCode::BAD_REQUEST, Json(json!({ "erro": e.to_string() })))
    })?;

    match buscar_pedidos(&state.backend, aba, &query.filtros(), intervalo).await {
        Ok(pagina) => Ok(Json(pagina)),
        Err(ErroPedidos::Filtro(e)) => Err((StatusCode::BAD_REQUEST, Json(json!({ "erro": e.to_string() })))),
        Err(ErroPedidos::Consulta(e)) => {
            error!("Falha ao consultar pedidos: {:?}", e);
            Err((StatusCode::BAD_GATEWAY, Json(json!({ "erro": e.to_string() }))))
        }
    }
}
