// src/common/error.rs

use std::collections::HashMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use heck::ToLowerCamelCase;
use serde_json::json;
use thiserror::Error;
use validator::ValidationErrors;

// Taxonomia de erros da aplicação (validação, conflito, não encontrado, infra).
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação: {0}")]
    ValidationError(#[from] ValidationErrors),

    // Violação do índice único de `name` (vem do banco, não do validador)
    #[error("Já existe um tour com o nome '{0}'")]
    TourNameAlreadyExists(String),

    #[error("Tour não encontrado")]
    TourNotFound,

    #[error("Esta rota ainda não foi definida")]
    RouteNotDefined,

    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::TourNameAlreadyExists(_) => StatusCode::CONFLICT,
            AppError::TourNotFound => StatusCode::NOT_FOUND,
            AppError::RouteNotDefined
            | AppError::DatabaseError(_)
            | AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Mensagens por campo, com a chave no nome usado pelo cliente (`priceDiscount`).
pub fn validation_details(errors: &ValidationErrors) -> HashMap<String, Vec<String>> {
    errors
        .field_errors()
        .into_iter()
        .map(|(field, field_errors)| {
            let messages = field_errors
                .iter()
                .map(|e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string())
                })
                .collect();
            (field.to_lower_camel_case(), messages)
        })
        .collect()
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let error_message = match self {
            // Retorna todos os detalhes da validação, campo a campo.
            AppError::ValidationError(errors) => {
                let body = Json(json!({
                    "status": "fail",
                    "error": "Um ou mais campos são inválidos.",
                    "details": validation_details(&errors),
                }));
                return (status, body).into_response();
            }
            AppError::TourNameAlreadyExists(ref name) => {
                format!("Já existe um tour com o nome '{}'.", name)
            }
            AppError::TourNotFound => "Nenhum tour encontrado com esse ID.".to_string(),
            AppError::RouteNotDefined => "Esta rota ainda não foi definida!".to_string(),

            // DatabaseError e InternalServerError viram 500 genérico.
            // O detalhe fica só no log.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {:?}", e);
                "Ocorreu um erro inesperado.".to_string()
            }
        };

        let status_label = if status.is_client_error() { "fail" } else { "error" };
        let body = Json(json!({ "status": status_label, "error": error_message }));
        (status, body).into_response()
    }
}
