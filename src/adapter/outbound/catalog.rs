//! In-process catalog, for running without the proxy.

use async_trait::async_trait;

use crate::domain::catalog::{CatalogPage, CatalogQuery};
use crate::error::FetchError;
use crate::port::outbound::upstream::CatalogSource;

#[derive(Debug, Clone, Copy, Default)]
pub struct StaticCatalog;

#[async_trait]
impl CatalogSource for StaticCatalog {
    async fn catalog(&self, query: &CatalogQuery) -> Result<CatalogPage, FetchError> {
        query.run().map_err(|err| FetchError::api(400, err.to_string()))
    }
}
