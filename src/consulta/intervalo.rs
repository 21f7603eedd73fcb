use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("intervalo invertido: fim {fim} antes do inicio {inicio}")]
pub struct IntervaloInvertido {
    pub inicio: u64,
    pub fim: u64,
}

/// Janela de paginacao por indice de linha, base zero, com as duas pontas inclusivas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Intervalo {
    inicio: u64,
    fim: u64,
}

impl Intervalo {
    pub fn new(inicio: u64, fim: u64) -> Result<Self, IntervaloInvertido> {
        if fim < inicio {
            return Err(IntervaloInvertido { inicio, fim });
        }
        Ok(Self { inicio, fim })
    }

    /// Pagina `numero` (base zero) com `tamanho` linhas; `tamanho` zero vira um.
    pub fn pagina(numero: u64, tamanho: u64) -> Self {
        let tamanho = tamanho.max(1);
        let inicio = numero.saturating_mul(tamanho);
        Self {
            inicio,
            fim: inicio.saturating_add(tamanho - 1),
        }
    }

    pub fn inicio(&self) -> u64 {
        self.inicio
    }

    pub fn fim(&self) -> u64 {
        self.fim
    }

    /// Quantidade de linhas pedidas; (0, 9) pede 10. A janela (0, u64::MAX) satura em u64::MAX.
    pub fn quantidade(&self) -> u64 {
        (self.fim - self.inicio).saturating_add(1)
    }
}

impl Default for Intervalo {
    fn default() -> Self {
        Self::pagina(0, 10)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("content-range invalido: {0:?}")]
pub struct ContentRangeInvalido(pub String);

/// Cabecalho `Content-Range` devolvido pelo PostgREST: `0-9/42`, `*/0` ou `0-9/*`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentRange {
    pub linhas: Option<(u64, u64)>,
    pub total: Option<u64>,
}

impl FromStr for ContentRange {
    type Err = ContentRangeInvalido;

    fn from_str(valor: &str) -> Result<Self, Self::Err> {
        let invalido = || ContentRangeInvalido(valor.to_string());

        // alguns proxies mantem a unidade: "items 0-9/42"
        let sem_unidade = valor.trim().trim_start_matches("items").trim();
        let (faixa, total) = sem_unidade.split_once('/').ok_or_else(invalido)?;

        let linhas = match faixa.trim() {
            "*" => None,
            faixa => {
                let (inicio, fim) = faixa.split_once('-').ok_or_else(invalido)?;
                let inicio = inicio.trim().parse::<u64>().map_err(|_| invalido())?;
                let fim = fim.trim().parse::<u64>().map_err(|_| invalido())?;
                Some((inicio, fim))
            }
        };
        let total = match total.trim() {
            "*" => None,
            total => Some(total.parse::<u64>().map_err(|_| invalido())?),
        };

        Ok(ContentRange { linhas, total })
    }
}
