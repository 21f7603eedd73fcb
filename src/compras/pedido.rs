use thiserror::Error;
use time::macros::time;
use time::Time;
use tracing::{debug, error};
use validator::Validate;

use crate::backend::Backend;
use crate::consulta::filtro::parse_data;
use crate::consulta::{Consulta, ErroConsulta, Filtro, Intervalo, Operador, Selecao};

use super::pedido_model::{Aba, ErroFiltro, FiltrosPedido, PaginaPedidos, Pedido, StatusPedido};

pub const TABELA_PEDIDOS: &str = "cmp_pedidos";

const FIM_DO_DIA: Time = time!(23:59:59);

const COLUNAS_BUSCA: [&str; 2] = ["observacoes", "nota_fiscal"];

#[derive(Error, Debug)]
pub enum ErroPedidos {
    #[error(transparent)]
    Filtro(#[from] ErroFiltro),
    #[error(transparent)]
    Consulta(#[from] ErroConsulta),
}

/// Linha completa do pedido com parceiro, corretor e veiculos (cada um com marca, modelo e versao).
pub fn selecao_pedidos() -> Selecao {
    let cadastro = || Selecao::new().colunas(&["id", "nome"]);

    Selecao::new()
        .todos()
        .um(
            "parceiro",
            "cad_parceiros",
            "parceiro_id",
            Selecao::new().colunas(&["nome", "documento", "cidade", "estado"]),
        )
        .um("corretor", "cad_corretores", "corretor_id", Selecao::new().colunas(&["nome", "sobrenome"]))
        .muitos(
            "veiculos",
            "est_veiculos",
            "pedido_id",
            Selecao::new()
                .todos()
                .um("marca", "cad_marcas", "marca_id", cadastro())
                .um("modelo", "cad_modelos", "modelo_id", cadastro())
                .um("versao", "cad_versoes", "versao_id", cadastro()),
        )
}

/// Status aceitos pela aba; `None` quando a aba nao restringe status.
pub fn status_da_aba(aba: Aba) -> Option<Vec<StatusPedido>> {
    match aba {
        Aba::Rascunhos => Some(vec![StatusPedido::Rascunho]),
        Aba::Concluidos => Some(vec![StatusPedido::Concluido, StatusPedido::Rascunho]),
        Aba::Todos => None,
    }
}

/// Monta a consulta da listagem de pedidos.
///
/// Aba e filtros sao combinados com AND; cada filtro preenchido acrescenta
/// exatamente um predicado. A contagem exata e sempre pedida.
pub fn montar_consulta_pedidos(aba: Aba, filtros: &FiltrosPedido, intervalo: Intervalo) -> Result<Consulta, ErroFiltro> {
    filtros.validate()?;

    let mut consulta = Consulta::nova(TABELA_PEDIDOS).select(selecao_pedidos());

    if let Some(status) = status_da_aba(aba) {
        consulta = match status.as_slice() {
            [unico] => consulta.eq("status", unico.como_str()),
            varios => consulta.in_list("status", varios.iter().map(|status| status.como_str().to_string())),
        };
    }

    let inicio = filtros
        .data_inicio()
        .map(|valor| parse_data(valor).ok_or_else(|| data_invalida("data_inicio", valor)))
        .transpose()?;
    let fim = filtros
        .data_fim()
        .map(|valor| parse_data(valor).ok_or_else(|| data_invalida("data_fim", valor)))
        .transpose()?;

    if let (Some(inicio), Some(fim)) = (inicio, fim) {
        if inicio > fim {
            return Err(ErroFiltro::DatasInvertidas {
                inicio: inicio.to_string(),
                fim: fim.to_string(),
            });
        }
    }
    if let Some(inicio) = inicio {
        consulta = consulta.gte("data_compra", inicio);
    }
    if let Some(fim) = fim {
        // fim do dia: compras com hora no ultimo dia entram
        consulta = consulta.lte("data_compra", fim.with_time(FIM_DO_DIA));
    }

    if let Some(corretor_id) = filtros.corretor_id() {
        consulta = consulta.eq("corretor_id", corretor_id);
    }
    if let Some(busca) = filtros.busca() {
        let padrao = format!("%{}%", escapa_curingas(busca));
        consulta = consulta.or(COLUNAS_BUSCA
            .iter()
            .map(|coluna| Filtro::comparacao(coluna, Operador::Ilike, padrao.as_str()))
            .collect());
    }

    Ok(consulta
        .order("data_compra", false)
        .order("id", false)
        .count_exact()
        .range(intervalo))
}

// `%` e `_` digitados na busca valem como texto, nao como curinga
fn escapa_curingas(busca: &str) -> String {
    let mut escapado = String::with_capacity(busca.len());
    for c in busca.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escapado.push('\\');
        }
        escapado.push(c);
    }
    escapado
}

fn data_invalida(campo: &'static str, valor: &str) -> ErroFiltro {
    ErroFiltro::DataInvalida {
        campo,
        valor: valor.to_string(),
    }
}

pub async fn buscar_pedidos(
    backend: &Backend,
    aba: Aba,
    filtros: &FiltrosPedido,
    intervalo: Intervalo,
) -> Result<PaginaPedidos, ErroPedidos> {
    let consulta = montar_consulta_pedidos(aba, filtros, intervalo).map_err(|e| {
        error!("Filtros de pedido invalidos: {:?}", e);
        e
    })?;
    debug!("Consulta de pedidos: {:?}", consulta.parametros());

    let pagina = backend.executar::<Pedido>(&consulta).await.map_err(|e| {
        error!("Failed to fetch pedidos: {:?}", e);
        e
    })?;
    let total = pagina.total.ok_or(ErroConsulta::ContagemAusente)?;

    Ok(PaginaPedidos {
        linhas: pagina.linhas,
        total,
    })
}
