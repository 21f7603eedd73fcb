use std::fmt;

use time::macros::format_description;
use time::{Date, PrimitiveDateTime, Time};

/// Valor usado do lado direito de um predicado.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Valor {
    Texto(String),
    Inteiro(i64),
    Data(Date),
    DataHora(PrimitiveDateTime),
}

impl Valor {
    /// Representacao textual aceita pelo PostgREST (datas em ISO 8601, sem fuso).
    pub fn literal(&self) -> String {
        match self {
            Valor::Texto(texto) => texto.clone(),
            Valor::Inteiro(numero) => numero.to_string(),
            Valor::Data(data) => formata_data(*data),
            Valor::DataHora(data_hora) => formata_data_hora(*data_hora),
        }
    }

    // dentro de in.(...) e or=(...) virgula, ponto, dois pontos e parenteses sao reservados
    fn literal_em_lista(&self) -> String {
        let literal = self.literal();
        if literal.chars().any(|c| matches!(c, ',' | '.' | ':' | '(' | ')' | '"' | '\\')) {
            let escapado = literal.replace('\\', "\\\\").replace('"', "\\\"");
            format!("\"{}\"", escapado)
        } else {
            literal
        }
    }
}

impl fmt::Display for Valor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.literal())
    }
}

impl From<&str> for Valor {
    fn from(texto: &str) -> Self {
        Valor::Texto(texto.to_string())
    }
}

impl From<String> for Valor {
    fn from(texto: String) -> Self {
        Valor::Texto(texto)
    }
}

impl From<i64> for Valor {
    fn from(numero: i64) -> Self {
        Valor::Inteiro(numero)
    }
}

impl From<Date> for Valor {
    fn from(data: Date) -> Self {
        Valor::Data(data)
    }
}

impl From<PrimitiveDateTime> for Valor {
    fn from(data_hora: PrimitiveDateTime) -> Self {
        Valor::DataHora(data_hora)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operador {
    Eq,
    Gte,
    Lte,
    Ilike,
}

impl Operador {
    pub fn como_str(&self) -> &'static str {
        match self {
            Operador::Eq => "eq",
            Operador::Gte => "gte",
            Operador::Lte => "lte",
            Operador::Ilike => "ilike",
        }
    }
}

/// Predicado aplicado sobre uma coluna da tabela principal da consulta.
///
/// `Ou` agrupa predicados em disjuncao; os predicados de nivel superior de uma
/// [`Consulta`](super::Consulta) sao sempre combinados com AND.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filtro {
    Comparacao {
        coluna: String,
        operador: Operador,
        valor: Valor,
    },
    Em {
        coluna: String,
        valores: Vec<Valor>,
    },
    Ou(Vec<Filtro>),
}

impl Filtro {
    pub fn comparacao(coluna: &str, operador: Operador, valor: impl Into<Valor>) -> Self {
        Filtro::Comparacao {
            coluna: coluna.to_string(),
            operador,
            valor: valor.into(),
        }
    }

    /// Par `chave=valor` da query string do PostgREST.
    pub fn parametro(&self) -> (String, String) {
        match self {
            Filtro::Comparacao { coluna, operador, valor } => {
                (coluna.clone(), format!("{}.{}", operador.como_str(), valor.literal()))
            }
            Filtro::Em { coluna, valores } => (coluna.clone(), format!("in.({})", lista(valores))),
            Filtro::Ou(filtros) => ("or".to_string(), format!("({})", expressoes(filtros))),
        }
    }

    // forma usada dentro de um grupo or(...)
    fn expressao(&self) -> String {
        match self {
            Filtro::Comparacao { coluna, operador, valor } => {
                format!("{}.{}.{}", coluna, operador.como_str(), valor.literal_em_lista())
            }
            Filtro::Em { coluna, valores } => format!("{}.in.({})", coluna, lista(valores)),
            Filtro::Ou(filtros) => format!("or({})", expressoes(filtros)),
        }
    }
}

fn lista(valores: &[Valor]) -> String {
    valores.iter().map(Valor::literal_em_lista).collect::<Vec<_>>().join(",")
}

fn expressoes(filtros: &[Filtro]) -> String {
    filtros.iter().map(Filtro::expressao).collect::<Vec<_>>().join(",")
}

/// Le `YYYY-MM-DD` ou `YYYY-MM-DDTHH:MM:SS`; fracao de segundo e fuso sao descartados.
pub fn parse_data_hora(texto: &str) -> Option<PrimitiveDateTime> {
    let texto = texto.trim();
    if texto.len() == 10 {
        return parse_data(texto).map(|data| data.with_time(Time::MIDNIGHT));
    }
    let base = texto.get(..19)?.replacen(' ', "T", 1);
    PrimitiveDateTime::parse(&base, format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]")).ok()
}

pub fn parse_data(texto: &str) -> Option<Date> {
    Date::parse(texto.trim(), format_description!("[year]-[month]-[day]")).ok()
}

pub fn formata_data(data: Date) -> String {
    format!("{:04}-{:02}-{:02}", data.year(), u8::from(data.month()), data.day())
}

pub fn formata_data_hora(data_hora: PrimitiveDateTime) -> String {
    format!(
        "{}T{:02}:{:02}:{:02}",
        formata_data(data_hora.date()),
        data_hora.hour(),
        data_hora.minute(),
        data_hora.second()
    )
}
