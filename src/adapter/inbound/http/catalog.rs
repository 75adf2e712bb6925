//! `/api/apis`: the directory of integrated APIs.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query};
use axum::Json;
use serde::Serialize;

use super::error::ProxyError;
use crate::domain::catalog::{self, ApiInfo, CatalogPage, CatalogQuery, CATEGORIES};

#[derive(Debug, Serialize)]
pub struct Categories {
    pub categories: Vec<&'static str>,
}

/// `GET /api/apis?page=&per_page=&category=&search=`.
pub async fn list(
    query: Result<Query<CatalogQuery>, QueryRejection>,
) -> Result<Json<CatalogPage>, ProxyError> {
    let Query(query) = query.map_err(|rejection| ProxyError::rejected_query(&rejection))?;
    Ok(Json(query.run()?))
}

/// `GET /api/apis/categories`.
pub async fn categories() -> Json<Categories> {
    Json(Categories {
        categories: CATEGORIES.to_vec(),
    })
}

/// `GET /api/apis/{id}`.
pub async fn detail(Path(id): Path<String>) -> Result<Json<ApiInfo>, ProxyError> {
    catalog::find(&id)
        .map(Json)
        .ok_or_else(|| ProxyError::NotFound(format!("API '{id}' not found")))
}
