//! Modelo de consulta de leitura independente do backend.
//!
//! Uma [`Consulta`] descreve tabela, projecao aninhada, predicados, ordenacao,
//! modo de contagem e janela de linhas. Ela e renderizada como query string do
//! PostgREST ([`Consulta::parametros`]) ou como SQL parametrizado ([`sql`]).

#[cfg(test)]
mod avaliacao;
pub mod filtro;
pub mod intervalo;
pub mod selecao;
pub mod sql;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

pub use filtro::{Filtro, Operador, Valor};
pub use intervalo::{ContentRange, ContentRangeInvalido, Intervalo, IntervaloInvertido};
pub use selecao::{Cardinalidade, Campo, Relacao, Selecao};

/// Falha de consulta; nenhum resultado parcial acompanha o erro.
#[derive(Error, Debug)]
pub enum ErroConsulta {
    #[error("falha de transporte: {0}")]
    Transporte(#[from] reqwest::Error),
    #[error("erro no banco de dados: {0}")]
    Banco(#[from] sqlx::Error),
    #[error("backend respondeu {status}: {corpo}")]
    Backend { status: u16, corpo: Value },
    #[error(transparent)]
    ContentRange(#[from] ContentRangeInvalido),
    #[error("contagem exata pedida mas ausente na resposta")]
    ContagemAusente,
    #[error("falha ao decodificar resposta: {0}")]
    Decodificacao(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Contagem {
    #[default]
    Nenhuma,
    Exata,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ordem {
    pub coluna: String,
    pub ascendente: bool,
}

/// Linhas da janela pedida mais o total de linhas que satisfazem os filtros.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pagina<T> {
    pub linhas: Vec<T>,
    pub total: Option<u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Consulta {
    tabela: String,
    selecao: Selecao,
    filtros: Vec<Filtro>,
    ordem: Vec<Ordem>,
    contagem: Contagem,
    intervalo: Option<Intervalo>,
}

impl Consulta {
    pub fn nova(tabela: &str) -> Self {
        Self {
            tabela: tabela.to_string(),
            selecao: Selecao::new(),
            filtros: Vec::new(),
            ordem: Vec::new(),
            contagem: Contagem::Nenhuma,
            intervalo: None,
        }
    }

    pub fn select(mut self, selecao: Selecao) -> Self {
        self.selecao = selecao;
        self
    }

    pub fn filtro(mut self, filtro: Filtro) -> Self {
        self.filtros.push(filtro);
        self
    }

    pub fn eq(self, coluna: &str, valor: impl Into<Valor>) -> Self {
        self.filtro(Filtro::comparacao(coluna, Operador::Eq, valor))
    }

    pub fn gte(self, coluna: &str, valor: impl Into<Valor>) -> Self {
        self.filtro(Filtro::comparacao(coluna, Operador::Gte, valor))
    }

    pub fn lte(self, coluna: &str, valor: impl Into<Valor>) -> Self {
        self.filtro(Filtro::comparacao(coluna, Operador::Lte, valor))
    }

    pub fn ilike(self, coluna: &str, padrao: &str) -> Self {
        self.filtro(Filtro::comparacao(coluna, Operador::Ilike, padrao))
    }

    pub fn in_list<V: Into<Valor>>(self, coluna: &str, valores: impl IntoIterator<Item = V>) -> Self {
        self.filtro(Filtro::Em {
            coluna: coluna.to_string(),
            valores: valores.into_iter().map(Into::into).collect(),
        })
    }

    pub fn or(self, filtros: Vec<Filtro>) -> Self {
        self.filtro(Filtro::Ou(filtros))
    }

    pub fn order(mut self, coluna: &str, ascendente: bool) -> Self {
        self.ordem.push(Ordem {
            coluna: coluna.to_string(),
            ascendente,
        });
        self
    }

    pub fn count_exact(mut self) -> Self {
        self.contagem = Contagem::Exata;
        self
    }

    pub fn range(mut self, intervalo: Intervalo) -> Self {
        self.intervalo = Some(intervalo);
        self
    }

    pub fn tabela(&self) -> &str {
        &self.tabela
    }

    pub fn selecao(&self) -> &Selecao {
        &self.selecao
    }

    pub fn filtros(&self) -> &[Filtro] {
        &self.filtros
    }

    pub fn ordem(&self) -> &[Ordem] {
        &self.ordem
    }

    pub fn contagem(&self) -> Contagem {
        self.contagem
    }

    pub fn intervalo(&self) -> Option<Intervalo> {
        self.intervalo
    }

    /// Query string do PostgREST, sempre na mesma ordem: select, filtros, order, offset, limit.
    pub fn parametros(&self) -> Vec<(String, String)> {
        let mut parametros = vec![("select".to_string(), self.selecao.postgrest())];
        parametros.extend(self.filtros.iter().map(Filtro::parametro));

        if !self.ordem.is_empty() {
            let ordem = self
                .ordem
                .iter()
                .map(|ordem| format!("{}.{}", ordem.coluna, if ordem.ascendente { "asc" } else { "desc" }))
                .collect::<Vec<_>>()
                .join(",");
            parametros.push(("order".to_string(), ordem));
        }

        if let Some(intervalo) = self.intervalo {
            parametros.push(("offset".to_string(), intervalo.inicio().to_string()));
            parametros.push(("limit".to_string(), intervalo.quantidade().to_string()));
        }
        parametros
    }
}
