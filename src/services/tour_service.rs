// src/services/tour_service.rs

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{
        query::{Condition, FindQuery, Pipeline, Stage, StatsOrder},
        TourStore,
    },
    models::tour::{Tour, TourStats},
    services::tour_schema::{self, TourInput},
};

/// Nota mínima considerada nas estatísticas.
pub const STATS_MIN_RATING: f64 = 4.5;

// Ponto único de entrada para leitura e escrita de tours:
// escrita passa pelo pre-save, leitura passa pelo prepare() das consultas.
#[derive(Clone)]
pub struct TourService<S> {
    store: S,
}

impl<S: TourStore> TourService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // --- CREATE ---
    pub async fn create_tour(&self, input: TourInput) -> Result<Tour, AppError> {
        let tour = tour_schema::pre_save(input, None)?;
        self.store.insert(&tour).await
    }

    /// Carga em lote: valida tudo antes de gravar qualquer coisa.
    pub async fn create_tours(&self, inputs: Vec<TourInput>) -> Result<Vec<Tour>, AppError> {
        let mut tours = Vec::with_capacity(inputs.len());
        for input in inputs {
            tours.push(tour_schema::pre_save(input, None)?);
        }
        check_batch_names(&tours)?;

        self.store.insert_many(&tours).await
    }

    // --- READ ---
    pub async fn find_tours(&self, query: FindQuery) -> Result<Vec<Tour>, AppError> {
        let prepared = query.prepare();
        let tours = self.store.find(&prepared).await?;
        prepared.finish(tours.len());
        Ok(tours)
    }

    pub async fn get_tour(&self, id: Uuid) -> Result<Tour, AppError> {
        self.find_tours(FindQuery::find_by_id(id))
            .await?
            .into_iter()
            .next()
            .ok_or(AppError::TourNotFound)
    }

    // --- UPDATE ---
    pub async fn update_tour(&self, id: Uuid, patch: TourInput) -> Result<Tour, AppError> {
        let current = self.get_tour(id).await?;
        let tour = tour_schema::pre_save(TourInput::from(&current).overlay(patch), Some(&current))?;

        let prepared = FindQuery::find_one_and_update(id).prepare();
        let updated = self.store.find_one_and_update(&prepared, &tour).await?;
        prepared.finish(usize::from(updated.is_some()));

        updated.ok_or(AppError::TourNotFound)
    }

    // --- DELETE ---
    pub async fn delete_tour(&self, id: Uuid) -> Result<Tour, AppError> {
        let prepared = FindQuery::find_one_and_delete(id).prepare();
        let deleted = self.store.find_one_and_delete(&prepared).await?;
        prepared.finish(usize::from(deleted.is_some()));

        deleted.ok_or(AppError::TourNotFound)
    }

    pub async fn delete_all_tours(&self) -> Result<u64, AppError> {
        let removed = self.store.delete_many().await?;
        tracing::info!(removed, "Tours removidos");
        Ok(removed)
    }

    // --- AGGREGATE ---
    pub async fn aggregate(&self, pipeline: Pipeline) -> Result<Vec<TourStats>, AppError> {
        let prepared = pipeline.prepare();
        self.store.aggregate(&prepared).await
    }

    /// Estatísticas por dificuldade dos tours bem avaliados, do mais barato ao mais caro.
    pub async fn tour_stats(&self) -> Result<Vec<TourStats>, AppError> {
        let pipeline = Pipeline::new()
            .stage(Stage::Match(vec![Condition::MinRatingsAverage(STATS_MIN_RATING)]))
            .stage(Stage::GroupByDifficulty)
            .stage(Stage::Sort(StatsOrder::AvgPriceAsc));

        self.aggregate(pipeline).await
    }
}

// Nome repetido dentro do próprio lote: o índice único rejeitaria de qualquer forma.
fn check_batch_names(tours: &[Tour]) -> Result<(), AppError> {
    let mut seen = std::collections::HashSet::new();
    for tour in tours {
        if !seen.insert(tour.name.as_str()) {
            return Err(AppError::TourNameAlreadyExists(tour.name.clone()));
        }
    }
    Ok(())
}
