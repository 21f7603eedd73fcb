use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use revenda::backend::Backend;
use revenda::compras::pedido::buscar_pedidos;
use revenda::compras::pedido_model::{Aba, Corretor, FiltrosPedido, Veiculo};
use revenda::config::BackendConfig;
use revenda::consulta::Intervalo;
use revenda::db::{create_postgres_pool, PgExecutor};
use revenda::postgrest::PostgrestClient;
use revenda::{router, AppState};
use tokio::net::TcpListener;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "revenda", version, about = "Consulta de pedidos de compra da revenda")]
struct Cli {
    #[arg(long, value_enum, default_value_t = TipoBackend::Rest, global = true)]
    backend: TipoBackend,
    #[command(subcommand)]
    comando: Comando,
}

#[derive(Clone, Copy, ValueEnum)]
enum TipoBackend {
    Rest,
    Postgres,
}

#[derive(Subcommand)]
enum Comando {
    /// Executa a consulta de pedidos uma vez e loga o resultado
    Pedidos(PedidosArgs),
    /// Sobe o endpoint JSON da listagem de pedidos
    Serve,
}

#[derive(Args)]
struct PedidosArgs {
    #[arg(long, default_value = "todos")]
    aba: Aba,
    #[arg(long)]
    inicio: Option<String>,
    #[arg(long)]
    fim: Option<String>,
    #[arg(long)]
    corretor: Option<String>,
    #[arg(long)]
    busca: Option<String>,
    #[arg(long, default_value_t = 0)]
    de: u64,
    #[arg(long, default_value_t = 9)]
    ate: u64,
}

async fn criar_backend(tipo: TipoBackend, config: &BackendConfig) -> anyhow::Result<Backend> {
    match tipo {
        TipoBackend::Rest => Ok(Backend::Rest(PostgrestClient::from_config(config)?)),
        TipoBackend::Postgres => {
            let database_url = config.database_url()?;
            let pool = create_postgres_pool(database_url).await.context("erro ao criar pool")?;
            info!("postgres pool criado");
            Ok(Backend::Postgres(PgExecutor::new(pool)))
        }
    }
}

async fn pedidos(backend: &Backend, args: PedidosArgs) -> anyhow::Result<()> {
    let intervalo = Intervalo::new(args.de, args.ate)?;
    let filtros = FiltrosPedido {
        data_inicio: args.inicio,
        data_fim: args.fim,
        corretor_id: args.corretor,
        busca: args.busca,
    };

    match buscar_pedidos(backend, args.aba, &filtros, intervalo).await {
        Ok(pagina) => {
            info!("{} pedidos na pagina, {} no total", pagina.linhas.len(), pagina.total);
            for pedido in &pagina.linhas {
                let corretor = pedido.corretor.as_ref().map(Corretor::nome_completo).unwrap_or_default();
                let veiculos = pedido.veiculos.iter().map(Veiculo::descricao).collect::<Vec<_>>();
                info!(
                    "pedido {} [{}] corretor={:?} custo={:.2} veiculos={:?}",
                    pedido.id,
                    pedido.status.como_str(),
                    corretor,
                    pedido.custo_total(),
                    veiculos
                );
            }
            info!("{}", serde_json::to_string_pretty(&pagina.linhas)?);
            Ok(())
        }
        Err(e) => {
            error!("erro na consulta de pedidos: {:?}", e);
            Err(e.into())
        }
    }
}

async fn serve(backend: Backend, config: &BackendConfig) -> anyhow::Result<()> {
    let app = router(AppState { backend });

    let listener = TcpListener::bind(&config.endereco)
        .await
        .with_context(|| format!("erro ao criar listener em {}", config.endereco))?;

    info!("Listening on {}", config.endereco);
    axum::serve(listener, app).await.context("erro ao iniciar o servidor")?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let config = BackendConfig::from_env()?;
    let backend = criar_backend(cli.backend, &config).await?;

    match cli.comando {
        Comando::Pedidos(args) => pedidos(&backend, args).await,
        Comando::Serve => serve(backend, &config).await,
    }
}
