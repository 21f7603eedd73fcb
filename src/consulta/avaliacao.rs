//! Avaliacao em memoria de predicados contra linhas JSON.
//!
//! Usada nos testes como referencia da semantica que o PostgREST e o SQL
//! renderizado aplicam do lado do banco.

use std::cmp::Ordering;

use serde_json::Value;
use time::Time;

use super::filtro::{parse_data_hora, Filtro, Operador, Valor};
use super::Consulta;

impl Filtro {
    /// Coluna ausente ou nula nunca satisfaz o predicado, como no SQL.
    pub(crate) fn aceita(&self, linha: &Value) -> bool {
        match self {
            Filtro::Comparacao { coluna, operador, valor } => {
                let Some(campo) = campo(linha, coluna) else {
                    return false;
                };
                match operador {
                    Operador::Ilike => match (campo.as_str(), valor) {
                        (Some(texto), Valor::Texto(padrao)) => like_sem_caixa(texto, padrao),
                        _ => false,
                    },
                    Operador::Eq => compara(campo, valor) == Some(Ordering::Equal),
                    Operador::Gte => matches!(compara(campo, valor), Some(Ordering::Greater | Ordering::Equal)),
                    Operador::Lte => matches!(compara(campo, valor), Some(Ordering::Less | Ordering::Equal)),
                }
            }
            Filtro::Em { coluna, valores } => match campo(linha, coluna) {
                Some(campo) => valores.iter().any(|valor| compara(campo, valor) == Some(Ordering::Equal)),
                None => false,
            },
            Filtro::Ou(filtros) => filtros.iter().any(|filtro| filtro.aceita(linha)),
        }
    }
}

impl Consulta {
    /// Verdadeiro quando a linha satisfaz todos os filtros (AND).
    pub(crate) fn aceita(&self, linha: &Value) -> bool {
        self.filtros().iter().all(|filtro| filtro.aceita(linha))
    }
}

fn campo<'a>(linha: &'a Value, coluna: &str) -> Option<&'a Value> {
    match linha.get(coluna) {
        Some(Value::Null) | None => None,
        Some(valor) => Some(valor),
    }
}

fn compara(campo: &Value, valor: &Valor) -> Option<Ordering> {
    match valor {
        Valor::Texto(texto) => match campo {
            Value::String(s) => Some(s.as_str().cmp(texto.as_str())),
            Value::Number(n) => Some(n.to_string().as_str().cmp(texto.as_str())),
            Value::Bool(b) => Some(b.to_string().as_str().cmp(texto.as_str())),
            _ => None,
        },
        Valor::Inteiro(numero) => match campo {
            Value::Number(n) => n.as_i64().map(|n| n.cmp(numero)),
            Value::String(s) => s.parse::<i64>().ok().map(|n| n.cmp(numero)),
            _ => None,
        },
        // data comparada com timestamp vale como meia-noite
        Valor::Data(data) => {
            let campo = campo.as_str().and_then(parse_data_hora)?;
            Some(campo.cmp(&data.with_time(Time::MIDNIGHT)))
        }
        Valor::DataHora(data_hora) => {
            let campo = campo.as_str().and_then(parse_data_hora)?;
            Some(campo.cmp(data_hora))
        }
    }
}

// `%` casa qualquer sequencia, `_` um caractere, `\` torna o proximo literal; sem caixa
fn like_sem_caixa(texto: &str, padrao: &str) -> bool {
    let texto: Vec<char> = texto.to_lowercase().chars().collect();
    let padrao: Vec<char> = padrao.to_lowercase().chars().collect();

    let (mut t, mut p) = (0, 0);
    let mut retorno: Option<(usize, usize)> = None;
    while t < texto.len() {
        let literal = match padrao.get(p) {
            Some('\\') => padrao.get(p + 1).map(|c| (*c, 2)),
            Some('_') => Some((texto[t], 1)),
            Some('%') | None => None,
            Some(c) => Some((*c, 1)),
        };
        match literal {
            Some((c, passo)) if c == texto[t] => {
                t += 1;
                p += passo;
            }
            _ if padrao.get(p) == Some(&'%') => {
                retorno = Some((p, t));
                p += 1;
            }
            _ => match retorno {
                Some((p_salvo, t_salvo)) => {
                    p = p_salvo + 1;
                    t = t_salvo + 1;
                    retorno = Some((p_salvo, t_salvo + 1));
                }
                None => return false,
            },
        }
    }
    while p < padrao.len() && padrao[p] == '%' {
        p += 1;
    }
    p == padrao.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use time::macros::{date, datetime};

    #[test]
    fn data_fim_com_fim_do_dia_aceita_ultimo_segundo_e_rejeita_dia_seguinte() {
        let filtro = Filtro::comparacao("data_compra", Operador::Lte, datetime!(2026-02-28 23:59:59));
        assert!(filtro.aceita(&json!({ "data_compra": "2026-02-28T23:59:59" })));
        assert!(filtro.aceita(&json!({ "data_compra": "2026-02-28" })));
        assert!(!filtro.aceita(&json!({ "data_compra": "2026-03-01T00:00:00" })));
    }

    #[test]
    fn data_inicio_e_inclusiva() {
        let filtro = Filtro::comparacao("data_compra", Operador::Gte, date!(2026 - 02 - 01));
        assert!(filtro.aceita(&json!({ "data_compra": "2026-02-01T00:00:00" })));
        assert!(filtro.aceita(&json!({ "data_compra": "2026-02-01 08:30:00.123+00" })));
        assert!(!filtro.aceita(&json!({ "data_compra": "2026-01-31T23:59:59" })));
    }

    #[test]
    fn coluna_nula_ou_ausente_nao_satisfaz() {
        let filtro = Filtro::comparacao("status", Operador::Eq, "RASCUNHO");
        assert!(!filtro.aceita(&json!({ "status": null })));
        assert!(!filtro.aceita(&json!({})));
    }

    #[test]
    fn em_testa_pertinencia() {
        let filtro = Filtro::Em {
            coluna: "status".to_string(),
            valores: vec!["CONCLUIDO".into(), "RASCUNHO".into()],
        };
        assert!(filtro.aceita(&json!({ "status": "CONCLUIDO" })));
        assert!(filtro.aceita(&json!({ "status": "RASCUNHO" })));
        assert!(!filtro.aceita(&json!({ "status": "CANCELADO" })));
    }

    #[test]
    fn inteiro_compara_numero_ou_texto() {
        let filtro = Filtro::comparacao("corretor_id", Operador::Eq, 7_i64);
        assert!(filtro.aceita(&json!({ "corretor_id": 7 })));
        assert!(filtro.aceita(&json!({ "corretor_id": "7" })));
        assert!(!filtro.aceita(&json!({ "corretor_id": 8 })));
    }

    #[test]
    fn filtros_da_consulta_combinam_com_and() {
        let consulta = Consulta::nova("cmp_pedidos")
            .in_list("status", ["CONCLUIDO", "RASCUNHO"])
            .gte("valor", 10_i64);

        assert!(consulta.aceita(&json!({ "status": "CONCLUIDO", "valor": 12 })));
        assert!(!consulta.aceita(&json!({ "status": "CONCLUIDO", "valor": 9 })));
        assert!(!consulta.aceita(&json!({ "status": "CANCELADO", "valor": 12 })));
    }

    #[test]
    fn ilike_ignora_caixa_e_respeita_curingas() {
        assert!(like_sem_caixa("Troca com Revisao", "%revisao%"));
        assert!(like_sem_caixa("ABC-1234", "abc-1_34"));
        assert!(like_sem_caixa("", "%"));
        assert!(!like_sem_caixa("ABC-1234", "abc%99"));
        assert!(!like_sem_caixa("abc", "ab"));
    }

    #[test]
    fn ilike_com_barra_casa_curinga_literal() {
        assert!(like_sem_caixa("Desconto de 50%", "%50\\%%"));
        assert!(!like_sem_caixa("Desconto de 500", "%50\\%%"));
        assert!(like_sem_caixa("placa_antiga", "placa\\_antiga"));
        assert!(!like_sem_caixa("placaXantiga", "placa\\_antiga"));
        assert!(like_sem_caixa("c:\\docs", "c:\\\\docs"));
    }
}
