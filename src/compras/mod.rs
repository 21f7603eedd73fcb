pub mod pedido;
pub mod pedido_handler;
pub mod pedido_model;
