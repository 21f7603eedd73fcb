pub mod backend;
pub mod compras;
pub mod config;
pub mod consulta;
pub mod db;
pub mod postgrest;

use axum::routing::get;
use axum::Router;

use backend::Backend;
use compras::pedido_handler::listar_pedidos;

#[derive(Clone)]
pub struct AppState {
    pub backend: Backend,
}

pub fn router(state: AppState) -> Router {
    let compras_routes = Router::new().route("/pedidos", get(listar_pedidos));

    Router::new().nest("/compras", compras_routes).with_state(state)
}
