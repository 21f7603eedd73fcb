use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use time::PrimitiveDateTime;
use validator::{Validate, ValidationErrors};

use crate::consulta::filtro::parse_data_hora;
use crate::consulta::IntervaloInvertido;

/// Id opaco: o banco pode usar inteiro ou uuid.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum IdRegistro {
    Numero(i64),
    Texto(String),
}

impl fmt::Display for IdRegistro {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdRegistro::Numero(numero) => write!(f, "{}", numero),
            IdRegistro::Texto(texto) => f.write_str(texto),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(from = "String", into = "String")]
pub enum StatusPedido {
    Rascunho,
    EmAndamento,
    Concluido,
    Cancelado,
    // status novo no banco nao derruba a leitura
    Outro(String),
}

impl StatusPedido {
    pub fn como_str(&self) -> &str {
        match self {
            StatusPedido::Rascunho => "RASCUNHO",
            StatusPedido::EmAndamento => "EM_ANDAMENTO",
            StatusPedido::Concluido => "CONCLUIDO",
            StatusPedido::Cancelado => "CANCELADO",
            StatusPedido::Outro(status) => status,
        }
    }
}

impl From<String> for StatusPedido {
    fn from(status: String) -> Self {
        match status.as_str() {
            "RASCUNHO" => StatusPedido::Rascunho,
            "EM_ANDAMENTO" => StatusPedido::EmAndamento,
            "CONCLUIDO" => StatusPedido::Concluido,
            "CANCELADO" => StatusPedido::Cancelado,
            _ => StatusPedido::Outro(status),
        }
    }
}

impl From<StatusPedido> for String {
    fn from(status: StatusPedido) -> Self {
        status.como_str().to_string()
    }
}

/// Parceiro fornecedor, somente leitura.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Parceiro {
    pub nome: Option<String>,
    pub documento: Option<String>,
    pub cidade: Option<String>,
    pub estado: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Corretor {
    pub nome: Option<String>,
    pub sobrenome: Option<String>,
}

impl Corretor {
    pub fn nome_completo(&self) -> String {
        [self.nome.as_deref(), self.sobrenome.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|parte| !parte.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Linha de cad_marcas, cad_modelos ou cad_versoes.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ItemCadastro {
    pub id: IdRegistro,
    pub nome: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Veiculo {
    pub id: IdRegistro,
    pub pedido_id: Option<IdRegistro>,
    pub valor_custo: Option<f64>,
    pub placa: Option<String>,
    #[serde(default)]
    pub fotos: Option<Vec<String>>,
    pub marca: Option<ItemCadastro>,
    pub modelo: Option<ItemCadastro>,
    pub versao: Option<ItemCadastro>,
    #[serde(flatten)]
    pub outros: Map<String, Value>,
}

impl Veiculo {
    /// "Marca Modelo Versao" com o que estiver preenchido.
    pub fn descricao(&self) -> String {
        [&self.marca, &self.modelo, &self.versao]
            .into_iter()
            .flatten()
            .map(|item| item.nome.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Pedido de compra (`cmp_pedidos`) com as relacoes hidratadas.
///
/// Colunas que nao tem campo proprio ficam em `outros`, assim a linha completa
/// sobrevive ida e volta.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Pedido {
    pub id: IdRegistro,
    pub status: StatusPedido,
    pub data_compra: Option<String>,
    pub observacoes: Option<String>,
    pub nota_fiscal: Option<String>,
    pub parceiro_id: Option<IdRegistro>,
    pub corretor_id: Option<IdRegistro>,
    pub parceiro: Option<Parceiro>,
    pub corretor: Option<Corretor>,
    #[serde(default)]
    pub veiculos: Vec<Veiculo>,
    #[serde(flatten)]
    pub outros: Map<String, Value>,
}

impl Pedido {
    pub fn data_compra(&self) -> Option<PrimitiveDateTime> {
        self.data_compra.as_deref().and_then(parse_data_hora)
    }

    pub fn custo_total(&self) -> f64 {
        self.veiculos.iter().filter_map(|veiculo| veiculo.valor_custo).sum()
    }
}

/// Aba da tela de pedidos; define quais status entram na listagem.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Aba {
    #[default]
    Todos,
    Rascunhos,
    Concluidos,
}

impl FromStr for Aba {
    type Err = ErroFiltro;

    fn from_str(valor: &str) -> Result<Self, Self::Err> {
        match valor.trim().to_lowercase().as_str() {
            "" | "todos" => Ok(Aba::Todos),
            "rascunhos" => Ok(Aba::Rascunhos),
            "concluidos" => Ok(Aba::Concluidos),
            _ => Err(ErroFiltro::AbaDesconhecida(valor.to_string())),
        }
    }
}

/// Filtros opcionais da listagem; string vazia conta como ausente.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, Validate)]
pub struct FiltrosPedido {
    pub data_inicio: Option<String>,
    pub data_fim: Option<String>,
    pub corretor_id: Option<String>,
    #[validate(length(max = 120))]
    pub busca: Option<String>,
}

impl FiltrosPedido {
    pub fn data_inicio(&self) -> Option<&str> {
        preenchido(&self.data_inicio)
    }

    pub fn data_fim(&self) -> Option<&str> {
        preenchido(&self.data_fim)
    }

    pub fn corretor_id(&self) -> Option<&str> {
        preenchido(&self.corretor_id)
    }

    pub fn busca(&self) -> Option<&str> {
        preenchido(&self.busca)
    }
}

fn preenchido(campo: &Option<String>) -> Option<&str> {
    campo.as_deref().map(str::trim).filter(|valor| !valor.is_empty())
}

#[derive(Error, Debug)]
pub enum ErroFiltro {
    #[error("aba desconhecida: {0}")]
    AbaDesconhecida(String),
    #[error("data invalida em {campo}: {valor} (esperado AAAA-MM-DD)")]
    DataInvalida { campo: &'static str, valor: String },
    #[error("data inicial {inicio} depois da data final {fim}")]
    DatasInvertidas { inicio: String, fim: String },
    #[error(transparent)]
    Intervalo(#[from] IntervaloInvertido),
    #[error("filtros invalidos: {0}")]
    Validacao(#[from] ValidationErrors),
}

/// Resultado da listagem: pedidos da janela e total que satisfaz os filtros.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaginaPedidos {
    pub linhas: Vec<Pedido>,
    pub total: u64,
}
