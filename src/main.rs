use anyhow::Context;
use askrag::{
    AppState, AskragConfig, AskragConfigManager,
    api::create_router,
    cli::{
        Cli, Commands,
        init::{self, InitConfig, InitResult},
        output::Output,
    },
    llm::generate_with_optional_system,
    rag::SearchStrategy,
    utils::{
        logging::init_logging,
        toml_config::{ConfigError, ENV_OVERRIDES},
    },
};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse_args();
    let output = Output::from_flag(cli.no_color);

    match cli.command {
        Some(Commands::Init { path, force }) => {
            match init::run(InitConfig { path, force }, &output) {
                InitResult::Success | InitResult::AlreadyExists => Ok(()),
                InitResult::Error(e) => anyhow::bail!("init failed: {}", e),
            }
        }
        Some(Commands::Config { validate }) => show_config(&cli.config, validate, &output),
        Some(Commands::Ask {
            prompt,
            system,
            rag,
            strategy,
        }) => {
            let manager = load_config_manager(&cli.config)?;
            init_cli_logging(&manager.config(), cli.verbose);
            ask(manager, &prompt, system, rag, strategy, &output).await
        }
        Some(Commands::Retrieve { query, strategy }) => {
            let manager = load_config_manager(&cli.config)?;
            init_cli_logging(&manager.config(), cli.verbose);
            retrieve(manager, &query, strategy, &output).await
        }
        Some(Commands::Serve { watch }) => serve(&cli.config, watch).await,
        None => serve(&cli.config, false).await,
    }
}

/// Load the config file, or run on defaults plus environment overrides when
/// there is none.
fn load_config_manager(path: &Path) -> anyhow::Result<AskragConfigManager> {
    match AskragConfigManager::new(path) {
        Ok(manager) => Ok(manager),
        Err(ConfigError::FileNotFound(missing)) => {
            let mut config = AskragConfig::default();
            config.apply_env_overrides(|name| std::env::var(name).ok())?;
            config.validate()?;
            eprintln!(
                "{} not found, using defaults (run `askrag-server init` to create one)",
                missing.display()
            );
            Ok(AskragConfigManager::from_config(config).with_config_path(missing))
        }
        Err(e) => Err(e).with_context(|| format!("loading {}", path.display())),
    }
}

fn init_cli_logging(config: &AskragConfig, verbose: bool) {
    let level = if verbose {
        config.server.log_level.as_str()
    } else {
        "warn"
    };
    init_logging(level, config.server.log_format);
}

async fn serve(config_path: &Path, watch: bool) -> anyhow::Result<()> {
    let manager = Arc::new(load_config_manager(config_path)?);
    let config = manager.config();
    init_logging(&config.server.log_level, config.server.log_format);

    if watch {
        if manager.config_path().exists() {
            manager.start_watching()?;
        } else {
            warn!("No configuration file to watch, hot reload disabled");
        }
    }

    let state = AppState::from_config(manager.clone())?;
    info!(
        model = %config.llm.model,
        strategy = %config.rag.strategy,
        knowledge_base = %config.rag.knowledge_base.display(),
        "Application state initialized"
    );

    let app = create_router(state);

    let addr = build_socket_addr(&config)?;
    info!("Starting askrag server on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    manager.stop_watching();
    info!("Server stopped");
    Ok(())
}

fn build_socket_addr(config: &AskragConfig) -> anyhow::Result<SocketAddr> {
    let ip = config
        .server
        .host
        .parse::<std::net::IpAddr>()
        .with_context(|| format!("invalid server.host '{}'", config.server.host))?;
    Ok(SocketAddr::from((ip, config.server.port)))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

fn show_config(path: &Path, validate_only: bool, output: &Output) -> anyhow::Result<()> {
    let manager = match load_config_manager(path) {
        Ok(manager) => manager,
        Err(e) => {
            output.error(&format!("{:#}", e));
            return Err(e);
        }
    };

    if validate_only {
        output.success(&format!("{} is valid", path.display()));
        return Ok(());
    }

    let config = manager.config();
    output.header("Effective configuration");
    output.kv("file", &manager.config_path().display().to_string());
    output.newline();
    output.block(&config.to_toml()?);

    output.subheader("Environment overrides");
    for name in ENV_OVERRIDES {
        match std::env::var(name) {
            Ok(value) => output.kv(name, &value),
            Err(_) => output.list_item(&format!("{} (unset)", name)),
        }
    }
    Ok(())
}

/// Apply a `--strategy` flag on top of the loaded configuration
fn with_strategy(manager: &AskragConfigManager, strategy: Option<SearchStrategy>) {
    if let Some(strategy) = strategy {
        let mut config = (*manager.config()).clone();
        config.rag.strategy = strategy;
        manager.store(config);
    }
}

async fn ask(
    manager: AskragConfigManager,
    prompt: &str,
    system: Option<String>,
    rag: bool,
    strategy: Option<SearchStrategy>,
    output: &Output,
) -> anyhow::Result<()> {
    with_strategy(&manager, strategy);
    if rag && system.is_some() {
        let mut config = (*manager.config()).clone();
        config.rag.system_prompt = system.clone();
        manager.store(config);
    }

    let state = AppState::from_config(Arc::new(manager))?;

    if rag {
        let answer = state.rag_pipeline().answer(prompt).await?;
        output.header("Context");
        output.block(&answer.retrieval.context);
        output.header("Answer");
        output.block(&answer.response);
    } else {
        let config = state.config_manager.config();
        let system = system.unwrap_or_else(|| config.llm.system_prompt.clone());
        let response =
            generate_with_optional_system(state.llm.as_ref(), Some(system.as_str()), prompt).await?;
        output.header("Answer");
        output.block(&response);
    }
    Ok(())
}

async fn retrieve(
    manager: AskragConfigManager,
    query: &str,
    strategy: Option<SearchStrategy>,
    output: &Output,
) -> anyhow::Result<()> {
    with_strategy(&manager, strategy);
    let state = AppState::from_config(Arc::new(manager))?;
    let pipeline = state.rag_pipeline();

    let retrieval = pipeline.retrieve(query).await?;
    let total = state.knowledge.chunks().await?.len();

    output.header(&format!(
        "Retrieved with {} ({} of {} chunks)",
        pipeline.retriever().strategy(),
        retrieval.chunks.len(),
        total
    ));
    for chunk in &retrieval.chunks {
        output.list_item(&format!("#{} {}", chunk.index, chunk.text));
    }
    output.subheader("Context");
    output.block(&retrieval.context);
    Ok(())
}
