// src/db/query.rs
//
// Construção de consultas sobre `tours`. Toda consulta "find" e todo pipeline
// de agregação precisam passar por `prepare()` antes de chegar ao repositório:
// é ali que o filtro de tours secretos é aplicado e o cronômetro é iniciado.

use std::time::{Duration, Instant};

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::models::tour::{Difficulty, Tour};

/// Operações da família "find".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FindOp {
    Find,
    FindOne,
    FindOneAndUpdate,
    FindOneAndDelete,
}

impl FindOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            FindOp::Find => "find",
            FindOp::FindOne => "findOne",
            FindOp::FindOneAndUpdate => "findOneAndUpdate",
            FindOp::FindOneAndDelete => "findOneAndDelete",
        }
    }

    /// Operações que devolvem no máximo um documento.
    pub fn is_single(&self) -> bool {
        !matches!(self, FindOp::Find)
    }
}

/// Uma condição do filtro. Várias condições são sempre combinadas com AND.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Id(Uuid),
    Slug(String),
    Difficulty(Difficulty),
    MinRatingsAverage(f64),
    MaxPrice(Decimal),
    SecretTour(bool),
    // secretTour != true
    NotSecret,
}

impl Condition {
    pub fn matches(&self, tour: &Tour) -> bool {
        match self {
            Condition::Id(id) => tour.id == *id,
            Condition::Slug(slug) => tour.slug == *slug,
            Condition::Difficulty(d) => tour.difficulty == *d,
            Condition::MinRatingsAverage(min) => tour.ratings_average >= *min,
            Condition::MaxPrice(max) => tour.price <= *max,
            Condition::SecretTour(secret) => tour.secret_tour == *secret,
            Condition::NotSecret => !tour.secret_tour,
        }
    }

    fn scopes_secret(&self) -> bool {
        matches!(self, Condition::SecretTour(_) | Condition::NotSecret)
    }
}

pub fn matches_all(conditions: &[Condition], tour: &Tour) -> bool {
    conditions.iter().all(|c| c.matches(tour))
}

// =========================================================================
//  FIND
// =========================================================================

#[derive(Debug, Clone)]
pub struct FindQuery {
    op: FindOp,
    conditions: Vec<Condition>,
    include_secret: bool,
}

impl FindQuery {
    fn new(op: FindOp) -> Self {
        Self {
            op,
            conditions: Vec::new(),
            include_secret: false,
        }
    }

    pub fn find() -> Self {
        Self::new(FindOp::Find)
    }

    pub fn find_one() -> Self {
        Self::new(FindOp::FindOne)
    }

    pub fn find_by_id(id: Uuid) -> Self {
        Self::new(FindOp::FindOne).filter(Condition::Id(id))
    }

    pub fn find_one_and_update(id: Uuid) -> Self {
        Self::new(FindOp::FindOneAndUpdate).filter(Condition::Id(id))
    }

    pub fn find_one_and_delete(id: Uuid) -> Self {
        Self::new(FindOp::FindOneAndDelete).filter(Condition::Id(id))
    }

    pub fn filter(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    /// Opt-out explícito do filtro de tours secretos.
    pub fn include_secret(mut self) -> Self {
        self.include_secret = true;
        self
    }

    pub fn op(&self) -> FindOp {
        self.op
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    /// Hook pre-find: aplica o filtro e inicia o cronômetro.
    pub fn prepare(self) -> PreparedFind {
        PreparedFind {
            query: exclude_secret_tours(self),
            started_at: Instant::now(),
        }
    }
}

/// Acrescenta `secretTour != true` como conjunção, exceto quando quem chamou
/// já escopou `secretTour` ou pediu `include_secret()`.
pub fn exclude_secret_tours(query: FindQuery) -> FindQuery {
    if query.include_secret || query.conditions.iter().any(Condition::scopes_secret) {
        return query;
    }
    query.filter(Condition::NotSecret)
}

/// Consulta já reescrita, pronta para o repositório.
#[derive(Debug)]
pub struct PreparedFind {
    query: FindQuery,
    started_at: Instant,
}

impl PreparedFind {
    pub fn op(&self) -> FindOp {
        self.query.op
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.query.conditions
    }

    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Hook post-find: só diagnóstico, não mexe no resultado.
    pub fn finish(&self, results: usize) {
        tracing::info!(
            operation = self.op().as_str(),
            results,
            "Consulta realizada em {} millisegundos!",
            self.elapsed().as_millis()
        );
    }
}

// =========================================================================
//  AGGREGATE
// =========================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatsOrder {
    AvgPriceAsc,
    NumToursDesc,
}

/// Estágios suportados. O agrupamento é sempre por dificuldade e produz `TourStats`.
#[derive(Debug, Clone, PartialEq)]
pub enum Stage {
    Match(Vec<Condition>),
    GroupByDifficulty,
    Sort(StatsOrder),
}

#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    stages: Vec<Stage>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage(mut self, stage: Stage) -> Self {
        self.stages.push(stage);
        self
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Hook pre-aggregate.
    pub fn prepare(self) -> PreparedPipeline {
        PreparedPipeline {
            pipeline: exclude_secret_stage(self),
        }
    }
}

/// Insere `{ $match: secretTour != true }` como primeiro estágio.
pub fn exclude_secret_stage(mut pipeline: Pipeline) -> Pipeline {
    pipeline
        .stages
        .insert(0, Stage::Match(vec![Condition::NotSecret]));
    pipeline
}

#[derive(Debug)]
pub struct PreparedPipeline {
    pipeline: Pipeline,
}

impl PreparedPipeline {
    pub fn stages(&self) -> &[Stage] {
        self.pipeline.stages()
    }
}
