// src/db/tour_repo.rs

use std::future::Future;

use sqlx::{Executor, PgPool, Postgres, QueryBuilder};
use validator::{ValidationError, ValidationErrors};

use crate::{
    common::error::AppError,
    db::query::{Condition, PreparedFind, PreparedPipeline, Stage, StatsOrder},
    models::tour::{Tour, TourStats},
};

const TOUR_COLUMNS: &str = "id, name, slug, duration, max_group_size, difficulty, price, \
     price_discount, ratings_average, ratings_quantity, summary, description, image_cover, \
     images, created_at, start_dates, secret_tour";

/// Camada de armazenamento de tours.
///
/// Os métodos de leitura só aceitam consultas já preparadas (`PreparedFind`,
/// `PreparedPipeline`), então o filtro de tours secretos nunca é esquecido.
pub trait TourStore: Send + Sync {
    fn insert(&self, tour: &Tour) -> impl Future<Output = Result<Tour, AppError>> + Send;

    /// Tudo ou nada.
    fn insert_many(&self, tours: &[Tour]) -> impl Future<Output = Result<Vec<Tour>, AppError>> + Send;

    fn find(&self, query: &PreparedFind) -> impl Future<Output = Result<Vec<Tour>, AppError>> + Send;

    /// Substitui o documento encontrado por `tour`.
    fn find_one_and_update(
        &self,
        query: &PreparedFind,
        tour: &Tour,
    ) -> impl Future<Output = Result<Option<Tour>, AppError>> + Send;

    fn find_one_and_delete(
        &self,
        query: &PreparedFind,
    ) -> impl Future<Output = Result<Option<Tour>, AppError>> + Send;

    /// Remove todos os tours; devolve quantos foram removidos.
    fn delete_many(&self) -> impl Future<Output = Result<u64, AppError>> + Send;

    fn aggregate(
        &self,
        pipeline: &PreparedPipeline,
    ) -> impl Future<Output = Result<Vec<TourStats>, AppError>> + Send;
}

// O repositório de tours, responsável por todas as interações com a tabela 'tours'
#[derive(Clone)]
pub struct TourRepository {
    pool: PgPool,
}

impl TourRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn insert_with<'e, E>(&self, executor: E, tour: &Tour) -> Result<Tour, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Tour>(
            r#"
            INSERT INTO tours (
                id, name, slug, duration, max_group_size, difficulty, price,
                price_discount, ratings_average, ratings_quantity, summary, description,
                image_cover, images, created_at, start_dates, secret_tour
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            RETURNING *
            "#,
        )
        .bind(tour.id)
        .bind(&tour.name)
        .bind(&tour.slug)
        .bind(tour.duration)
        .bind(tour.max_group_size)
        .bind(tour.difficulty)
        .bind(tour.price)
        .bind(tour.price_discount)
        .bind(tour.ratings_average)
        .bind(tour.ratings_quantity)
        .bind(&tour.summary)
        .bind(&tour.description)
        .bind(&tour.image_cover)
        .bind(&tour.images)
        .bind(tour.created_at)
        .bind(&tour.start_dates)
        .bind(tour.secret_tour)
        .fetch_one(executor)
        .await
        .map_err(|e| map_write_error(e, &tour.name))
    }
}

// CHECKs da tabela -> campo e mensagem equivalentes às do validador
const CHECK_CONSTRAINTS: [(&str, &str, &str); 2] = [
    (
        "tours_price_discount_check",
        "price_discount",
        "O desconto deve ser menor que o preço",
    ),
    (
        "tours_ratings_average_check",
        "ratings_average",
        "A avaliação deve estar entre 1.0 e 5.0",
    ),
];

fn check_violation_error(constraint: &str) -> Option<AppError> {
    let (_, field, message) = CHECK_CONSTRAINTS
        .iter()
        .find(|(name, _, _)| *name == constraint)?;

    let mut err = ValidationError::new("check");
    err.message = Some((*message).into());

    let mut errors = ValidationErrors::new();
    errors.add(*field, err);
    Some(AppError::ValidationError(errors))
}

// Índice único de `name` vira conflito; CHECK conhecido vira erro de campo
fn map_write_error(e: sqlx::Error, name: &str) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return AppError::TourNameAlreadyExists(name.to_string());
        }
        if db_err.is_check_violation() {
            if let Some(err) = db_err.constraint().and_then(check_violation_error) {
                return err;
            }
        }
    }
    e.into()
}

fn push_conditions(qb: &mut QueryBuilder<'_, Postgres>, conditions: &[Condition]) {
    for (i, condition) in conditions.iter().enumerate() {
        qb.push(if i == 0 { " WHERE " } else { " AND " });
        match condition {
            Condition::Id(id) => {
                qb.push("id = ").push_bind(*id);
            }
            Condition::Slug(slug) => {
                qb.push("slug = ").push_bind(slug.clone());
            }
            Condition::Difficulty(difficulty) => {
                qb.push("difficulty = ").push_bind(*difficulty);
            }
            Condition::MinRatingsAverage(min) => {
                qb.push("ratings_average >= ").push_bind(*min);
            }
            Condition::MaxPrice(max) => {
                qb.push("price <= ").push_bind(*max);
            }
            Condition::SecretTour(secret) => {
                qb.push("secret_tour = ").push_bind(*secret);
            }
            Condition::NotSecret => {
                qb.push("secret_tour IS NOT TRUE");
            }
        }
    }
}

fn build_find_sql(query: &PreparedFind) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::<Postgres>::new("SELECT ");
    qb.push(TOUR_COLUMNS).push(" FROM tours");
    push_conditions(&mut qb, query.conditions());
    qb.push(" ORDER BY created_at ASC, name ASC");
    if query.op().is_single() {
        qb.push(" LIMIT 1");
    }
    qb
}

// Substitui todas as colunas editáveis; id e created_at nunca mudam
fn build_update_sql(query: &PreparedFind, tour: &Tour) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::<Postgres>::new("UPDATE tours SET ");
    {
        let mut set = qb.separated(", ");
        set.push("name = ").push_bind_unseparated(tour.name.clone());
        set.push("slug = ").push_bind_unseparated(tour.slug.clone());
        set.push("duration = ").push_bind_unseparated(tour.duration);
        set.push("max_group_size = ").push_bind_unseparated(tour.max_group_size);
        set.push("difficulty = ").push_bind_unseparated(tour.difficulty);
        set.push("price = ").push_bind_unseparated(tour.price);
        set.push("price_discount = ").push_bind_unseparated(tour.price_discount);
        set.push("ratings_average = ").push_bind_unseparated(tour.ratings_average);
        set.push("ratings_quantity = ").push_bind_unseparated(tour.ratings_quantity);
        set.push("summary = ").push_bind_unseparated(tour.summary.clone());
        set.push("description = ").push_bind_unseparated(tour.description.clone());
        set.push("image_cover = ").push_bind_unseparated(tour.image_cover.clone());
        set.push("images = ").push_bind_unseparated(tour.images.clone());
        set.push("start_dates = ").push_bind_unseparated(tour.start_dates.clone());
        set.push("secret_tour = ").push_bind_unseparated(tour.secret_tour);
    }
    push_conditions(&mut qb, query.conditions());
    qb.push(" RETURNING ").push(TOUR_COLUMNS);
    qb
}

fn build_delete_sql(query: &PreparedFind) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::<Postgres>::new("DELETE FROM tours");
    push_conditions(&mut qb, query.conditions());
    qb.push(" RETURNING ").push(TOUR_COLUMNS);
    qb
}

/// Traduz o pipeline para um único SELECT: `Match` antes do agrupamento vira
/// WHERE, `Sort` vira ORDER BY. Match depois do agrupamento não é suportado.
fn build_aggregate_sql(stages: &[Stage]) -> Result<QueryBuilder<'static, Postgres>, AppError> {
    let mut conditions = Vec::new();
    let mut grouped = false;
    let mut order = None;

    for stage in stages {
        match stage {
            Stage::Match(stage_conditions) if !grouped => {
                conditions.extend(stage_conditions.iter().cloned());
            }
            Stage::Match(_) => {
                return Err(anyhow::anyhow!("$match após $group não é suportado").into());
            }
            Stage::GroupByDifficulty => grouped = true,
            Stage::Sort(stats_order) => order = Some(*stats_order),
        }
    }

    if !grouped {
        return Err(anyhow::anyhow!("o pipeline precisa de um estágio de agrupamento").into());
    }

    let mut qb = QueryBuilder::<Postgres>::new(
        r#"SELECT difficulty,
               COUNT(*) AS num_tours,
               COALESCE(SUM(ratings_quantity), 0)::FLOAT8 AS num_ratings,
               AVG(ratings_average)::FLOAT8 AS avg_rating,
               AVG(price) AS avg_price,
               MIN(price) AS min_price,
               MAX(price) AS max_price
           FROM tours"#,
    );
    push_conditions(&mut qb, &conditions);
    qb.push(" GROUP BY difficulty");

    match order {
        Some(StatsOrder::AvgPriceAsc) => {
            qb.push(" ORDER BY avg_price ASC");
        }
        Some(StatsOrder::NumToursDesc) => {
            qb.push(" ORDER BY num_tours DESC");
        }
        None => {}
    }

    Ok(qb)
}

impl TourStore for TourRepository {
    async fn insert(&self, tour: &Tour) -> Result<Tour, AppError> {
        self.insert_with(&self.pool, tour).await
    }

    async fn insert_many(&self, tours: &[Tour]) -> Result<Vec<Tour>, AppError> {
        // --- INÍCIO DA TRANSAÇÃO ---
        let mut tx = self.pool.begin().await?;

        let mut inserted = Vec::with_capacity(tours.len());
        for tour in tours {
            inserted.push(self.insert_with(&mut *tx, tour).await?);
        }

        tx.commit().await?;
        Ok(inserted)
    }

    async fn find(&self, query: &PreparedFind) -> Result<Vec<Tour>, AppError> {
        let mut qb = build_find_sql(query);
        let tours = qb.build_query_as::<Tour>().fetch_all(&self.pool).await?;
        Ok(tours)
    }

    async fn find_one_and_update(
        &self,
        query: &PreparedFind,
        tour: &Tour,
    ) -> Result<Option<Tour>, AppError> {
        let mut qb = build_update_sql(query, tour);
        qb.build_query_as::<Tour>()
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_write_error(e, &tour.name))
    }

    async fn find_one_and_delete(&self, query: &PreparedFind) -> Result<Option<Tour>, AppError> {
        let mut qb = build_delete_sql(query);
        let deleted = qb.build_query_as::<Tour>().fetch_optional(&self.pool).await?;
        Ok(deleted)
    }

    async fn delete_many(&self) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM tours").execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    async fn aggregate(&self, pipeline: &PreparedPipeline) -> Result<Vec<TourStats>, AppError> {
        let mut qb = build_aggregate_sql(pipeline.stages())?;
        let stats = qb.build_query_as::<TourStats>().fetch_all(&self.pool).await?;
        Ok(stats)
    }
}
