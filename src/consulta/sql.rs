//! Renderizacao de uma [`Consulta`] em SQL do PostgreSQL.
//!
//! Cada linha volta como um unico `jsonb` com o mesmo formato que o PostgREST
//! entregaria: colunas da tabela mais uma chave por relacao aninhada. Valores
//! de filtro e de paginacao vao sempre como parametros (`$n`); nomes de tabela e
//! coluna sao citados como identificadores.

use sqlx::{Postgres, QueryBuilder};

use super::{Cardinalidade, Consulta, Filtro, Operador, Selecao, Valor};

const ALIAS_RAIZ: &str = "t0";

/// `SELECT <jsonb> AS linha FROM ... WHERE ... ORDER BY ... LIMIT ... OFFSET ...`
pub fn montar_select(consulta: &Consulta) -> QueryBuilder<'static, Postgres> {
    let mut proximo_alias = 1;
    let objeto = objeto_json(consulta.selecao(), ALIAS_RAIZ, &mut proximo_alias);

    let mut qb = QueryBuilder::new("SELECT ");
    qb.push(objeto)
        .push(" AS linha FROM ")
        .push(identificador(consulta.tabela()))
        .push(" ")
        .push(ALIAS_RAIZ);
    push_where(&mut qb, consulta.filtros());

    if !consulta.ordem().is_empty() {
        let ordem = consulta
            .ordem()
            .iter()
            .map(|ordem| {
                format!(
                    "{} {}",
                    coluna(ALIAS_RAIZ, &ordem.coluna),
                    if ordem.ascendente { "ASC" } else { "DESC" }
                )
            })
            .collect::<Vec<_>>()
            .join(", ");
        qb.push(" ORDER BY ").push(ordem);
    }

    if let Some(intervalo) = consulta.intervalo() {
        qb.push(" LIMIT ")
            .push_bind(i64::try_from(intervalo.quantidade()).unwrap_or(i64::MAX))
            .push(" OFFSET ")
            .push_bind(i64::try_from(intervalo.inicio()).unwrap_or(i64::MAX));
    }
    qb
}

/// `SELECT count(*)` com os mesmos filtros, ignorando a janela.
pub fn montar_contagem(consulta: &Consulta) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("SELECT count(*) FROM ");
    qb.push(identificador(consulta.tabela())).push(" ").push(ALIAS_RAIZ);
    push_where(&mut qb, consulta.filtros());
    qb
}

fn push_where(qb: &mut QueryBuilder<'static, Postgres>, filtros: &[Filtro]) {
    for (i, filtro) in filtros.iter().enumerate() {
        qb.push(if i == 0 { " WHERE " } else { " AND " });
        push_filtro(qb, filtro);
    }
}

fn push_filtro(qb: &mut QueryBuilder<'static, Postgres>, filtro: &Filtro) {
    match filtro {
        Filtro::Comparacao { coluna: nome, operador, valor } => {
            let operador = match operador {
                Operador::Eq => " = ",
                Operador::Gte => " >= ",
                Operador::Lte => " <= ",
                Operador::Ilike => " ILIKE ",
            };
            qb.push(coluna_para(nome, std::slice::from_ref(valor))).push(operador);
            push_valor(qb, valor);
        }
        Filtro::Em { coluna: nome, valores } => {
            if valores.is_empty() {
                qb.push("FALSE");
                return;
            }
            qb.push(coluna_para(nome, valores)).push(" IN (");
            for (i, valor) in valores.iter().enumerate() {
                if i > 0 {
                    qb.push(", ");
                }
                push_valor(qb, valor);
            }
            qb.push(")");
        }
        Filtro::Ou(filtros) => {
            if filtros.is_empty() {
                qb.push("FALSE");
                return;
            }
            qb.push("(");
            for (i, filtro) in filtros.iter().enumerate() {
                if i > 0 {
                    qb.push(" OR ");
                }
                push_filtro(qb, filtro);
            }
            qb.push(")");
        }
    }
}

fn push_valor(qb: &mut QueryBuilder<'static, Postgres>, valor: &Valor) {
    match valor {
        Valor::Texto(texto) => qb.push_bind(texto.clone()),
        Valor::Inteiro(numero) => qb.push_bind(*numero),
        Valor::Data(data) => qb.push_bind(*data),
        Valor::DataHora(data_hora) => qb.push_bind(*data_hora),
    };
}

// texto e comparado contra a coluna convertida, assim enums e uuids casam com o literal
fn coluna_para(nome: &str, valores: &[Valor]) -> String {
    let coluna = coluna(ALIAS_RAIZ, nome);
    if valores.iter().all(|valor| matches!(valor, Valor::Texto(_))) {
        format!("{}::text", coluna)
    } else {
        coluna
    }
}

fn objeto_json(selecao: &Selecao, alias: &str, proximo_alias: &mut usize) -> String {
    let mut partes = vec![if selecao.inclui_todos() {
        format!("to_jsonb({})", alias)
    } else {
        let colunas = selecao
            .campos()
            .iter()
            .filter_map(|campo| match campo {
                super::Campo::Coluna(nome) => Some(format!("{}, {}", literal(nome), coluna(alias, nome))),
                _ => None,
            })
            .collect::<Vec<_>>();
        if colunas.is_empty() {
            "'{}'::jsonb".to_string()
        } else {
            format!("jsonb_build_object({})", colunas.join(", "))
        }
    }];

    for relacao in selecao.relacoes() {
        let filho = format!("t{}", proximo_alias);
        *proximo_alias += 1;
        let objeto = objeto_json(&relacao.selecao, &filho, proximo_alias);
        let tabela = identificador(&relacao.tabela);

        let sub = match &relacao.cardinalidade {
            Cardinalidade::Um { chave } => format!(
                "(SELECT {} FROM {} {} WHERE {} = {})",
                objeto,
                tabela,
                filho,
                coluna(&filho, "id"),
                coluna(alias, chave)
            ),
            Cardinalidade::Muitos { chave } => format!(
                "COALESCE((SELECT jsonb_agg({}) FROM {} {} WHERE {} = {}), '[]'::jsonb)",
                objeto,
                tabela,
                filho,
                coluna(&filho, chave),
                coluna(alias, "id")
            ),
        };
        partes.push(format!("jsonb_build_object({}, {})", literal(&relacao.apelido), sub));
    }
    partes.join(" || ")
}

fn identificador(nome: &str) -> String {
    format!("\"{}\"", nome.replace('"', "\"\""))
}

fn coluna(alias: &str, nome: &str) -> String {
    format!("{}.{}", alias, identificador(nome))
}

fn literal(texto: &str) -> String {
    format!("'{}'", texto.replace('\'', "''"))
}
