// src/models/tour.rs

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// --- Dificuldade ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "tour_difficulty", rename_all = "lowercase")] // Banco
#[serde(rename_all = "lowercase")] // JSON
pub enum Difficulty {
    Easy,
    Medium,
    Difficult,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Difficult];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Difficult => "difficult",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Difficulty::ALL
            .into_iter()
            .find(|d| d.as_str() == s)
            .ok_or_else(|| format!("dificuldade desconhecida: '{}'", s))
    }
}

// --- Tour ---
// Registro já validado e persistido. Só é construído pelo hook de pre-save
// (services::tour_schema) ou lido do banco.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Tour {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub duration: f64,
    pub max_group_size: f64,
    pub difficulty: Difficulty,
    pub price: Decimal,
    pub price_discount: Option<Decimal>,
    pub ratings_average: f64,
    pub ratings_quantity: f64,
    pub summary: String,
    pub description: Option<String>,
    pub image_cover: String,
    pub images: Vec<String>,

    // Fora da projeção padrão: só aparece via TourView com Projection::WithCreatedAt
    #[serde(skip_serializing)]
    pub created_at: DateTime<Utc>,

    pub start_dates: Vec<DateTime<Utc>>,
    pub secret_tour: bool,
}

impl Tour {
    /// Campo virtual: nunca é gravado no banco.
    pub fn duration_weeks(&self) -> f64 {
        self.duration / 7.0
    }

    pub fn view(&self, projection: Projection) -> TourView<'_> {
        TourView {
            tour: self,
            duration_weeks: self.duration_weeks(),
            created_at: match projection {
                Projection::Default => None,
                Projection::WithCreatedAt => Some(self.created_at),
            },
        }
    }
}

/// Quais campos "escondidos" entram na leitura.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Projection {
    #[default]
    Default,
    WithCreatedAt,
}

impl Projection {
    /// Interpreta um `select` no estilo "+createdAt".
    pub fn from_select(select: Option<&str>) -> Self {
        let wants_created_at = select
            .into_iter()
            .flat_map(|s| s.split(','))
            .map(str::trim)
            .any(|field| field == "+createdAt" || field == "createdAt");

        if wants_created_at {
            Projection::WithCreatedAt
        } else {
            Projection::Default
        }
    }
}

// O que vai para o JSON de resposta: o tour + virtuais.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TourView<'a> {
    #[serde(flatten)]
    tour: &'a Tour,
    duration_weeks: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    created_at: Option<DateTime<Utc>>,
}

// --- Estatísticas (resultado de agregação) ---
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TourStats {
    pub difficulty: Difficulty,
    pub num_tours: i64,
    pub num_ratings: f64,
    pub avg_rating: f64,
    pub avg_price: Decimal,
    pub min_price: Decimal,
    pub max_price: Decimal,
}
