// src/seed.rs
//
// Carga e limpeza da base de desenvolvimento (usado pelo binário import-dev-data).

use std::path::Path;

use anyhow::Context;

use crate::{
    db::TourStore,
    services::{tour_schema::TourInput, tour_service::TourService},
};

pub const DEFAULT_DATA_FILE: &str = "dev-data/data/tours-simple.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedCommand {
    Import,
    Delete,
}

// Tabela de despacho: flag da linha de comando -> operação
pub const SEED_COMMANDS: [(&str, SeedCommand); 2] = [
    ("--import", SeedCommand::Import),
    ("--delete", SeedCommand::Delete),
];

impl SeedCommand {
    pub fn from_flag(flag: &str) -> Option<Self> {
        SEED_COMMANDS
            .iter()
            .find(|(name, _)| *name == flag)
            .map(|(_, command)| *command)
    }

    pub fn flag(&self) -> &'static str {
        SEED_COMMANDS
            .iter()
            .find(|(_, command)| *command == *self)
            .map(|(name, _)| *name)
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    Imported(usize),
    Deleted(u64),
}

/// Lê o arquivo JSON com o array de tours.
pub fn load_tours(path: &Path) -> anyhow::Result<Vec<TourInput>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Falha ao ler {}", path.display()))?;
    let tours = serde_json::from_str(&raw)
        .with_context(|| format!("JSON inválido em {}", path.display()))?;
    Ok(tours)
}

pub async fn run<S: TourStore>(
    command: SeedCommand,
    service: &TourService<S>,
    data_file: &Path,
) -> anyhow::Result<SeedOutcome> {
    match command {
        SeedCommand::Import => {
            let inputs = load_tours(data_file)?;
            let tours = service
                .create_tours(inputs)
                .await
                .context("Erro ao carregar os dados")?;
            Ok(SeedOutcome::Imported(tours.len()))
        }
        SeedCommand::Delete => {
            let removed = service
                .delete_all_tours()
                .await
                .context("Erro ao deletar os dados")?;
            Ok(SeedOutcome::Deleted(removed))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_map_to_commands() {
        assert_eq!(SeedCommand::from_flag("--import"), Some(SeedCommand::Import));
        assert_eq!(SeedCommand::from_flag("--delete"), Some(SeedCommand::Delete));
        assert_eq!(SeedCommand::from_flag("--drop"), None);
        assert_eq!(SeedCommand::Delete.flag(), "--delete");
    }

    #[test]
    fn bundled_dev_data_parses() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join(DEFAULT_DATA_FILE);
        let tours = load_tours(&path).unwrap();
        assert!(!tours.is_empty());
        assert!(tours.iter().all(|t| t.validate_schema().is_ok()));
    }
}
