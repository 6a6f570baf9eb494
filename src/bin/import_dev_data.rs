// src/bin/import_dev_data.rs
//
// Uso:
//   import-dev-data --import [--file caminho.json]
//   import-dev-data --delete

use std::path::PathBuf;

use clap::{ArgGroup, Parser};
use tracing_subscriber::EnvFilter;

use tours_backend::{
    config::{AppState, Config},
    seed::{self, SeedCommand, SeedOutcome, DEFAULT_DATA_FILE},
};

#[derive(Debug, Parser)]
#[command(name = "import-dev-data", about = "Carrega ou apaga os tours de desenvolvimento")]
#[command(group(ArgGroup::new("mode").required(true).args(["import", "delete"])))]
struct Cli {
    /// Importa os tours do arquivo JSON
    #[arg(long)]
    import: bool,

    /// Apaga todos os tours
    #[arg(long)]
    delete: bool,

    /// Arquivo com o array de tours
    #[arg(long, default_value = DEFAULT_DATA_FILE)]
    file: PathBuf,
}

impl Cli {
    fn command(&self) -> SeedCommand {
        if self.import {
            SeedCommand::Import
        } else {
            SeedCommand::Delete
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();
    let command = cli.command();
    tracing::info!(flag = command.flag(), file = %cli.file.display(), "Executando seed");

    // O processo sempre termina aqui, com sucesso ou falha.
    let code = match execute(command, &cli).await {
        Ok(SeedOutcome::Imported(count)) => {
            tracing::info!(count, "✅ Dados carregados com sucesso!");
            0
        }
        Ok(SeedOutcome::Deleted(count)) => {
            tracing::info!(count, "✅ Dados deletados com sucesso!");
            0
        }
        Err(e) => {
            tracing::error!("🔥 {:#}", e);
            1
        }
    };

    std::process::exit(code);
}

async fn execute(command: SeedCommand, cli: &Cli) -> anyhow::Result<SeedOutcome> {
    let config = Config::from_env()?;
    let app_state = AppState::new(&config).await?;
    sqlx::migrate!().run(&app_state.db_pool).await?;

    seed::run(command, &app_state.tour_service, &cli.file).await
}
