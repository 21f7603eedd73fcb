use std::fmt;

/// Como a tabela relacionada se liga a tabela de origem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cardinalidade {
    /// A origem guarda `chave`, que aponta para o `id` da relacionada.
    Um { chave: String },
    /// A relacionada guarda `chave`, que aponta para o `id` da origem.
    Muitos { chave: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relacao {
    pub apelido: String,
    pub tabela: String,
    pub cardinalidade: Cardinalidade,
    pub selecao: Selecao,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Campo {
    Todos,
    Coluna(String),
    Relacao(Relacao),
}

/// Arvore de projecao de uma consulta: colunas da tabela e relacoes aninhadas.
///
/// Uma selecao vazia equivale a `*`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selecao {
    campos: Vec<Campo>,
}

impl Selecao {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn todos(mut self) -> Self {
        self.campos.push(Campo::Todos);
        self
    }

    pub fn colunas(mut self, colunas: &[&str]) -> Self {
        self.campos
            .extend(colunas.iter().map(|coluna| Campo::Coluna(coluna.to_string())));
        self
    }

    /// Relacao a-um: `chave` e a coluna da origem.
    pub fn um(self, apelido: &str, tabela: &str, chave: &str, selecao: Selecao) -> Self {
        self.relacao(apelido, tabela, Cardinalidade::Um { chave: chave.to_string() }, selecao)
    }

    /// Relacao a-muitos: `chave` e a coluna da tabela relacionada.
    pub fn muitos(self, apelido: &str, tabela: &str, chave: &str, selecao: Selecao) -> Self {
        self.relacao(apelido, tabela, Cardinalidade::Muitos { chave: chave.to_string() }, selecao)
    }

    fn relacao(mut self, apelido: &str, tabela: &str, cardinalidade: Cardinalidade, selecao: Selecao) -> Self {
        self.campos.push(Campo::Relacao(Relacao {
            apelido: apelido.to_string(),
            tabela: tabela.to_string(),
            cardinalidade,
            selecao,
        }));
        self
    }

    pub fn campos(&self) -> &[Campo] {
        &self.campos
    }

    pub fn inclui_todos(&self) -> bool {
        self.campos.is_empty() || self.campos.iter().any(|campo| matches!(campo, Campo::Todos))
    }

    pub fn relacoes(&self) -> impl Iterator<Item = &Relacao> {
        self.campos.iter().filter_map(|campo| match campo {
            Campo::Relacao(relacao) => Some(relacao),
            _ => None,
        })
    }

    /// Texto do parametro `select` do PostgREST.
    pub fn postgrest(&self) -> String {
        if self.campos.is_empty() {
            return "*".to_string();
        }
        self.campos
            .iter()
            .map(|campo| match campo {
                Campo::Todos => "*".to_string(),
                Campo::Coluna(coluna) => coluna.clone(),
                Campo::Relacao(relacao) => {
                    format!("{}:{}({})", relacao.apelido, relacao.tabela, relacao.selecao.postgrest())
                }
            })
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl fmt::Display for Selecao {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.postgrest())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn selecao_vazia_vira_asterisco() {
        assert_eq!(Selecao::new().postgrest(), "*");
        assert!(Selecao::new().inclui_todos());
    }

    #[test]
    fn relacoes_aninhadas_sao_renderizadas_com_apelido() {
        let selecao = Selecao::new().todos().muitos(
            "veiculos",
            "est_veiculos",
            "pedido_id",
            Selecao::new()
                .todos()
                .um("marca", "cad_marcas", "marca_id", Selecao::new().colunas(&["id", "nome"])),
        );

        assert_eq!(selecao.postgrest(), "*,veiculos:est_veiculos(*,marca:cad_marcas(id,nome))");
        assert_eq!(selecao.relacoes().count(), 1);
    }

    #[test]
    fn somente_colunas_nao_inclui_todos() {
        let selecao = Selecao::new().colunas(&["nome", "sobrenome"]);
        assert!(!selecao.inclui_todos());
        assert_eq!(selecao.to_string(), "nome,sobrenome");
    }
}
