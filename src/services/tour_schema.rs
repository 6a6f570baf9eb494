// src/services/tour_schema.rs

use chrono::{DateTime, Utc};
use std::borrow::Cow;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors, ValidationErrorsKind};

use crate::models::tour::{Difficulty, Tour};

pub const NAME_MIN_LEN: usize = 10;
pub const NAME_MAX_LEN: usize = 40;
pub const DEFAULT_RATINGS_AVERAGE: f64 = 4.5;

// ---
// Validações Customizadas
// ---

fn rule_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

/// Nome: 10 a 40 caracteres, só letras (qualquer alfabeto) e espaços.
pub fn validate_tour_name(name: &str) -> Result<(), ValidationError> {
    let len = name.chars().count();
    if len > NAME_MAX_LEN {
        return Err(rule_error("maxlength", "Um tour deve ter 40 ou menos caracteres"));
    }
    if len < NAME_MIN_LEN {
        return Err(rule_error("minlength", "Um tour deve ter 10 ou mais caracteres"));
    }
    if !name.chars().all(|c| c.is_alphabetic() || c == ' ') {
        return Err(rule_error("alpha", "O nome do tour deve conter apenas letras"));
    }
    Ok(())
}

pub fn validate_difficulty(difficulty: &str) -> Result<(), ValidationError> {
    difficulty
        .parse::<Difficulty>()
        .map(|_| ())
        .map_err(|_| rule_error("enum", "A dificuldade deve ser: easy, medium ou difficult"))
}

// ---
// Payload: TourInput (registro candidato, parcial ou completo)
// ---
// Sem derive de Deserialize: cada campo é lido isoladamente (ver `from_json`),
// assim um tipo errado vira erro de campo em vez de derrubar o registro inteiro.
#[derive(Debug, Clone, Default, Validate)]
pub struct TourInput {
    #[validate(required(message = "Um tour deve ter um nome"))]
    pub name: Option<String>,

    #[validate(required(message = "Um tour deve ter uma duração"))]
    pub duration: Option<f64>,

    #[validate(required(message = "Um tour deve ter um tamanho máximo de grupo"))]
    pub max_group_size: Option<f64>,

    // String e não Difficulty: valor fora do enum vira erro de campo, não erro de parse do JSON
    #[validate(required(message = "Um tour deve ter uma dificuldade"))]
    pub difficulty: Option<String>,

    #[validate(required(message = "Um tour deve ter um preço"))]
    pub price: Option<Decimal>,

    // Some(None) = `null` explícito: apaga o valor num update
    pub price_discount: Option<Option<Decimal>>,

    #[validate(range(min = 1.0, max = 5.0, message = "A avaliação deve estar entre 1.0 e 5.0"))]
    pub ratings_average: Option<f64>,

    pub ratings_quantity: Option<f64>,

    #[validate(
        required(message = "Um tour deve ter um resumo"),
        length(min = 1, message = "Um tour deve ter um resumo")
    )]
    pub summary: Option<String>,

    pub description: Option<Option<String>>,

    #[validate(
        required(message = "Um tour deve ter uma imagem de capa"),
        length(min = 1, message = "Um tour deve ter uma imagem de capa")
    )]
    pub image_cover: Option<String>,

    pub images: Option<Vec<String>>,
    pub start_dates: Option<Vec<DateTime<Utc>>>,
    pub secret_tour: Option<bool>,

    // Campos cujo valor JSON não tinha o tipo esperado
    pub type_errors: Vec<(&'static str, ValidationError)>,
}

fn type_error(key: &str, expected: &str) -> ValidationError {
    let mut err = ValidationError::new("type");
    err.message = Some(format!("O campo '{}' deve ser {}", key, expected).into());
    err
}

impl TourInput {
    /// Monta o candidato a partir de um objeto JSON, campo a campo.
    /// Ausente ou `null` = None; tipo errado = None + erro em `type_errors`.
    pub fn from_json(value: Value) -> Self {
        let mut input = TourInput::default();

        let Value::Object(mut map) = value else {
            input
                .type_errors
                .push(("tour", type_error("tour", "um objeto JSON")));
            return input;
        };

        macro_rules! read {
            ($field:ident, $key:literal, $expected:literal) => {
                match map.remove($key) {
                    None | Some(Value::Null) => None,
                    Some(raw) => match serde_json::from_value(raw) {
                        Ok(v) => Some(v),
                        Err(_) => {
                            input
                                .type_errors
                                .push((stringify!($field), type_error($key, $expected)));
                            None
                        }
                    },
                }
            };
        }

        // Campos que aceitam `null` para apagar o valor
        macro_rules! read_clearable {
            ($field:ident, $key:literal, $expected:literal) => {
                match map.remove($key) {
                    None => None,
                    Some(Value::Null) => Some(None),
                    Some(raw) => match serde_json::from_value(raw) {
                        Ok(v) => Some(Some(v)),
                        Err(_) => {
                            input
                                .type_errors
                                .push((stringify!($field), type_error($key, $expected)));
                            None
                        }
                    },
                }
            };
        }

        input.name = read!(name, "name", "um texto");
        input.duration = read!(duration, "duration", "um número");
        input.max_group_size = read!(max_group_size, "maxGroupSize", "um número");
        input.difficulty = read!(difficulty, "difficulty", "um texto");
        input.price = read!(price, "price", "um número");
        input.price_discount = read_clearable!(price_discount, "priceDiscount", "um número");
        input.ratings_average = read!(ratings_average, "ratingsAverage", "um número");
        input.ratings_quantity = read!(ratings_quantity, "ratingsQuantity", "um número");
        input.summary = read!(summary, "summary", "um texto");
        input.description = read_clearable!(description, "description", "um texto");
        input.image_cover = read!(image_cover, "imageCover", "um texto");
        input.images = read!(images, "images", "uma lista de textos");
        input.start_dates = read!(start_dates, "startDates", "uma lista de datas");
        input.secret_tour = read!(secret_tour, "secretTour", "um booleano");

        input
    }

    /// Trim dos campos de texto (acontece antes de qualquer validação).
    pub fn normalize(&mut self) {
        let description = self.description.as_mut().and_then(Option::as_mut);
        for value in [self.name.as_mut(), self.summary.as_mut(), description]
            .into_iter()
            .flatten()
        {
            let trimmed = value.trim();
            if trimmed.len() != value.len() {
                *value = trimmed.to_string();
            }
        }
    }

    // Regras que o derive não cobre (formato do nome, enum, consistência de preço)
    fn validate_rules(&self) -> Vec<(&'static str, ValidationError)> {
        let mut failures = Vec::new();

        if let Some(name) = &self.name {
            if let Err(e) = validate_tour_name(name) {
                failures.push(("name", e));
            }
        }

        if let Some(difficulty) = &self.difficulty {
            if let Err(e) = validate_difficulty(difficulty) {
                failures.push(("difficulty", e));
            }
        }

        // Regra: o desconto precisa ser menor que o preço.
        if let (Some(Some(discount)), Some(price)) = (self.price_discount, self.price) {
            if discount >= price {
                let mut err = rule_error(
                    "price_discount",
                    "O desconto deve ser menor que o preço",
                );
                err.add_param("value".into(), &discount.to_string());
                err.add_param("price".into(), &price.to_string());
                failures.push(("price_discount", err));
            }
        }

        failures
    }

    /// Validação completa: derive + regras manuais no mesmo ValidationErrors.
    pub fn validate_schema(&self) -> Result<(), ValidationErrors> {
        let mut errors = match self.validate() {
            Ok(()) => ValidationErrors::new(),
            Err(e) => e,
        };

        for (field, err) in self.validate_rules() {
            errors.add(field, err);
        }

        // Tipo errado substitui o "obrigatório" que o campo vazio geraria
        for (field, err) in &self.type_errors {
            errors
                .errors_mut()
                .insert(Cow::Borrowed(*field), ValidationErrorsKind::Field(vec![err.clone()]));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Aplica um patch parcial sobre este registro (campos ausentes são mantidos).
    pub fn overlay(mut self, patch: TourInput) -> Self {
        macro_rules! take {
            ($($field:ident),* $(,)?) => {
                $( if patch.$field.is_some() { self.$field = patch.$field; } )*
            };
        }
        take!(
            name,
            duration,
            max_group_size,
            difficulty,
            price,
            price_discount,
            ratings_average,
            ratings_quantity,
            summary,
            description,
            image_cover,
            images,
            start_dates,
            secret_tour,
        );
        self.type_errors.extend(patch.type_errors);
        self
    }
}

impl From<&Tour> for TourInput {
    fn from(tour: &Tour) -> Self {
        Self {
            name: Some(tour.name.clone()),
            duration: Some(tour.duration),
            max_group_size: Some(tour.max_group_size),
            difficulty: Some(tour.difficulty.to_string()),
            price: Some(tour.price),
            price_discount: Some(tour.price_discount),
            ratings_average: Some(tour.ratings_average),
            ratings_quantity: Some(tour.ratings_quantity),
            summary: Some(tour.summary.clone()),
            description: Some(tour.description.clone()),
            image_cover: Some(tour.image_cover.clone()),
            images: Some(tour.images.clone()),
            start_dates: Some(tour.start_dates.clone()),
            secret_tour: Some(tour.secret_tour),
            type_errors: Vec::new(),
        }
    }
}

// Qualquer JSON bem formado vira um candidato; os problemas aparecem na validação.
impl<'de> Deserialize<'de> for TourInput {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Value::deserialize(deserializer).map(Self::from_json)
    }
}

pub fn slugify_name(name: &str) -> String {
    slug::slugify(name)
}

pub fn round_rating(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

// ---
// Hook: pre-save
// ---
/// Normaliza, valida e monta o registro final (slug, arredondamento, defaults).
/// `existing` preserva id e createdAt em updates. Nada é gravado aqui.
pub fn pre_save(mut input: TourInput, existing: Option<&Tour>) -> Result<Tour, ValidationErrors> {
    input.normalize();
    input.validate_schema()?;

    // validate_schema garante que os obrigatórios estão presentes
    let (
        Some(name),
        Some(duration),
        Some(max_group_size),
        Some(difficulty),
        Some(price),
        Some(summary),
        Some(image_cover),
    ) = (
        input.name,
        input.duration,
        input.max_group_size,
        input.difficulty.as_deref().and_then(|d| d.parse::<Difficulty>().ok()),
        input.price,
        input.summary,
        input.image_cover,
    )
    else {
        return Err(ValidationErrors::new());
    };

    let (id, created_at) = match existing {
        Some(tour) => (tour.id, tour.created_at),
        None => (Uuid::new_v4(), Utc::now()),
    };

    Ok(Tour {
        id,
        slug: slugify_name(&name),
        name,
        duration,
        max_group_size,
        difficulty,
        price,
        price_discount: input.price_discount.flatten(),
        ratings_average: round_rating(input.ratings_average.unwrap_or(DEFAULT_RATINGS_AVERAGE)),
        ratings_quantity: input.ratings_quantity.unwrap_or(0.0),
        summary,
        description: input.description.flatten(),
        image_cover,
        images: input.images.unwrap_or_default(),
        created_at,
        start_dates: input.start_dates.unwrap_or_default(),
        secret_tour: input.secret_tour.unwrap_or(false),
    })
}
