//! Helpers compartilhados pelos testes de integração.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::Mutex;

use rust_decimal::Decimal;
use serde_json::{json, Value};

use tours_backend::{
    common::error::AppError,
    db::{
        query::{matches_all, PreparedFind, PreparedPipeline, Stage, StatsOrder},
        TourStore,
    },
    models::tour::{Difficulty, Tour, TourStats},
    services::{tour_schema::TourInput, tour_service::TourService},
};

// =============================================================================
// Store em memória (mesmo contrato do TourRepository)
// =============================================================================

#[derive(Default)]
pub struct MemoryStore {
    tours: Mutex<Vec<Tour>>,
}

impl MemoryStore {
    pub fn len(&self) -> usize {
        self.tours.lock().unwrap().len()
    }

    /// Todos os registros, inclusive secretos (sem passar pelos hooks).
    pub fn all(&self) -> Vec<Tour> {
        self.tours.lock().unwrap().clone()
    }

    fn check_unique(tours: &[Tour], tour: &Tour) -> Result<(), AppError> {
        if tours.iter().any(|t| t.name == tour.name && t.id != tour.id) {
            return Err(AppError::TourNameAlreadyExists(tour.name.clone()));
        }
        Ok(())
    }
}

impl TourStore for MemoryStore {
    async fn insert(&self, tour: &Tour) -> Result<Tour, AppError> {
        let mut tours = self.tours.lock().unwrap();
        Self::check_unique(&tours, tour)?;
        tours.push(tour.clone());
        Ok(tour.clone())
    }

    async fn insert_many(&self, batch: &[Tour]) -> Result<Vec<Tour>, AppError> {
        let mut tours = self.tours.lock().unwrap();
        let mut staged = tours.clone();
        for tour in batch {
            Self::check_unique(&staged, tour)?;
            staged.push(tour.clone());
        }
        *tours = staged;
        Ok(batch.to_vec())
    }

    async fn find(&self, query: &PreparedFind) -> Result<Vec<Tour>, AppError> {
        let tours = self.tours.lock().unwrap();
        let limit = if query.op().is_single() { 1 } else { usize::MAX };
        Ok(tours
            .iter()
            .filter(|t| matches_all(query.conditions(), t))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn find_one_and_update(
        &self,
        query: &PreparedFind,
        tour: &Tour,
    ) -> Result<Option<Tour>, AppError> {
        let mut tours = self.tours.lock().unwrap();
        Self::check_unique(&tours, tour)?;
        match tours.iter_mut().find(|t| matches_all(query.conditions(), t)) {
            Some(slot) => {
                *slot = tour.clone();
                Ok(Some(tour.clone()))
            }
            None => Ok(None),
        }
    }

    async fn find_one_and_delete(&self, query: &PreparedFind) -> Result<Option<Tour>, AppError> {
        let mut tours = self.tours.lock().unwrap();
        let position = tours.iter().position(|t| matches_all(query.conditions(), t));
        Ok(position.map(|i| tours.remove(i)))
    }

    async fn delete_many(&self) -> Result<u64, AppError> {
        let mut tours = self.tours.lock().unwrap();
        let removed = tours.len() as u64;
        tours.clear();
        Ok(removed)
    }

    async fn aggregate(&self, pipeline: &PreparedPipeline) -> Result<Vec<TourStats>, AppError> {
        let tours = self.tours.lock().unwrap();
        let mut docs: Vec<&Tour> = tours.iter().collect();
        let mut groups: Option<Vec<TourStats>> = None;

        for stage in pipeline.stages() {
            match stage {
                Stage::Match(conditions) => docs.retain(|t| matches_all(conditions, t)),
                Stage::GroupByDifficulty => groups = Some(group_by_difficulty(&docs)),
                Stage::Sort(order) => {
                    if let Some(stats) = groups.as_mut() {
                        match order {
                            StatsOrder::AvgPriceAsc => stats.sort_by(|a, b| a.avg_price.cmp(&b.avg_price)),
                            StatsOrder::NumToursDesc => stats.sort_by(|a, b| b.num_tours.cmp(&a.num_tours)),
                        }
                    }
                }
            }
        }

        Ok(groups.unwrap_or_default())
    }
}

fn group_by_difficulty(docs: &[&Tour]) -> Vec<TourStats> {
    let mut buckets: BTreeMap<&'static str, (Difficulty, Vec<&Tour>)> = BTreeMap::new();
    for &tour in docs {
        buckets
            .entry(tour.difficulty.as_str())
            .or_insert_with(|| (tour.difficulty, Vec::new()))
            .1
            .push(tour);
    }

    buckets
        .into_values()
        .map(|(difficulty, tours)| {
            let count = tours.len() as i64;
            let total_price: Decimal = tours.iter().map(|t| t.price).sum();
            TourStats {
                difficulty,
                num_tours: count,
                num_ratings: tours.iter().map(|t| t.ratings_quantity).sum(),
                avg_rating: tours.iter().map(|t| t.ratings_average).sum::<f64>() / count as f64,
                avg_price: total_price / Decimal::from(count),
                min_price: tours.iter().map(|t| t.price).min().unwrap_or_default(),
                max_price: tours.iter().map(|t| t.price).max().unwrap_or_default(),
            }
        })
        .collect()
}

// =============================================================================
// Fixtures
// =============================================================================

pub fn service() -> TourService<MemoryStore> {
    TourService::new(MemoryStore::default())
}

/// Registro mínimo válido (campos obrigatórios apenas).
pub fn valid_tour_json(name: &str) -> Value {
    json!({
        "name": name,
        "duration": 5,
        "maxGroupSize": 10,
        "difficulty": "easy",
        "price": 100,
        "summary": "s",
        "imageCover": "x.jpg"
    })
}

pub fn input(value: Value) -> TourInput {
    serde_json::from_value(value).expect("fixture deve ser um TourInput válido")
}

pub fn with(mut value: Value, key: &str, field: Value) -> Value {
    value[key] = field;
    value
}

pub fn without(mut value: Value, key: &str) -> Value {
    if let Some(map) = value.as_object_mut() {
        map.remove(key);
    }
    value
}
