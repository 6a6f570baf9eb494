// src/handlers/users.rs
//
// As rotas de usuário existem mas ainda não têm implementação.

use axum::response::IntoResponse;

use crate::common::error::AppError;

pub async fn get_all_users() -> Result<impl IntoResponse, AppError> {
    Err::<(), _>(AppError::RouteNotDefined)
}

pub async fn create_user() -> Result<impl IntoResponse, AppError> {
    Err::<(), _>(AppError::RouteNotDefined)
}

pub async fn get_user() -> Result<impl IntoResponse, AppError> {
    Err::<(), _>(AppError::RouteNotDefined)
}

pub async fn update_user() -> Result<impl IntoResponse, AppError> {
    Err::<(), _>(AppError::RouteNotDefined)
}

pub async fn delete_user() -> Result<impl IntoResponse, AppError> {
    Err::<(), _>(AppError::RouteNotDefined)
}
