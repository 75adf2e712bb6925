//! Static catalog of the APIs the dashboard knows about.

use serde::{Deserialize, Serialize};

use super::error::{FieldError, ValidationError};

pub const DEFAULT_PER_PAGE: u32 = 20;
pub const MAX_PER_PAGE: u32 = 100;

pub const CATEGORIES: [&str; 10] = [
    "data",
    "testing",
    "weather",
    "news",
    "finance",
    "entertainment",
    "social",
    "utilities",
    "health",
    "education",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiInfo {
    pub id: String,
    pub name: String,
    pub description: String,
    pub base_url: String,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authentication: Option<String>,
    pub documentation_url: String,
    pub is_free: bool,
    pub status: String,
}

fn entry(
    id: &str,
    name: &str,
    description: &str,
    base_url: &str,
    category: &str,
    authentication: Option<&str>,
    documentation_url: &str,
) -> ApiInfo {
    ApiInfo {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        base_url: base_url.to_string(),
        category: category.to_string(),
        authentication: authentication.map(str::to_string),
        documentation_url: documentation_url.to_string(),
        is_free: true,
        status: "active".to_string(),
    }
}

/// Every catalogued API, in display order.
#[must_use]
pub fn all() -> Vec<ApiInfo> {
    vec![
        entry(
            "nasa-apod",
            "NASA APOD",
            "Astronomy Picture of the Day with explanations from professional astronomers",
            "https://api.nasa.gov/planetary/apod",
            "education",
            Some("api_key"),
            "https://api.nasa.gov/",
        ),
        entry(
            "rick-and-morty",
            "Rick and Morty",
            "Characters, locations and episodes from the Rick and Morty show",
            "https://rickandmortyapi.com/api",
            "entertainment",
            None,
            "https://rickandmortyapi.com/documentation",
        ),
        entry(
            "giphy",
            "GIPHY",
            "Trending, searchable and random animated GIFs",
            "https://api.giphy.com/v1",
            "entertainment",
            Some("api_key"),
            "https://developers.giphy.com/docs/api/",
        ),
        entry(
            "jsonplaceholder",
            "JSONPlaceholder",
            "Fake REST API for testing and prototyping",
            "https://jsonplaceholder.typicode.com",
            "testing",
            None,
            "https://jsonplaceholder.typicode.com/guide/",
        ),
        entry(
            "restcountries",
            "REST Countries",
            "Information about countries via REST API",
            "https://restcountries.com/v3.1",
            "data",
            None,
            "https://restcountries.com/",
        ),
    ]
}

#[must_use]
pub fn find(id: &str) -> Option<ApiInfo> {
    all().into_iter().find(|api| api.id.eq_ignore_ascii_case(id.trim()))
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub per_page: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogPage {
    pub apis: Vec<ApiInfo>,
    pub total: usize,
    pub page: u32,
    pub per_page: u32,
}

impl CatalogQuery {
    /// Filter and page the catalog.
    ///
    /// `category` matches exactly (case-insensitive); `search` matches name or
    /// description as a substring. `total` counts matches before paging.
    pub fn run(&self) -> Result<CatalogPage, ValidationError> {
        let page = self.page.unwrap_or(1);
        let per_page = self.per_page.unwrap_or(DEFAULT_PER_PAGE);

        let mut errors = Vec::new();
        if page == 0 {
            errors.push(FieldError::value("page", "Page must be 1 or greater"));
        }
        if !(1..=MAX_PER_PAGE).contains(&per_page) {
            errors.push(FieldError::value(
                "per_page",
                format!("per_page must be between 1 and {MAX_PER_PAGE}"),
            ));
        }
        if !errors.is_empty() {
            return Err(ValidationError::new(errors));
        }

        let category = self
            .category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty());
        let search = self
            .search
            .as_deref()
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty());

        let matches: Vec<ApiInfo> = all()
            .into_iter()
            .filter(|api| category.map_or(true, |c| api.category.eq_ignore_ascii_case(c)))
            .filter(|api| {
                search.as_deref().map_or(true, |needle| {
                    api.name.to_lowercase().contains(needle)
                        || api.description.to_lowercase().contains(needle)
                })
            })
            .collect();

        let total = matches.len();
        let skip = (page as usize - 1).saturating_mul(per_page as usize);
        let apis = matches
            .into_iter()
            .skip(skip)
            .take(per_page as usize)
            .collect();

        Ok(CatalogPage {
            apis,
            total,
            page,
            per_page,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_list_everything() {
        let page = CatalogQuery::default().run().unwrap();
        assert_eq!(page.total, all().len());
        assert_eq!(page.page, 1);
        assert_eq!(page.per_page, DEFAULT_PER_PAGE);
    }

    #[test]
    fn category_and_search_filters() {
        let page = CatalogQuery {
            category: Some("Entertainment".into()),
            ..CatalogQuery::default()
        }
        .run()
        .unwrap();
        assert_eq!(page.total, 2);

        let page = CatalogQuery {
            search: Some("countries".into()),
            ..CatalogQuery::default()
        }
        .run()
        .unwrap();
        assert_eq!(page.apis.len(), 1);
        assert_eq!(page.apis[0].id, "restcountries");
    }

    #[test]
    fn paging_beyond_end_is_empty() {
        let page = CatalogQuery {
            page: Some(3),
            per_page: Some(2),
            ..CatalogQuery::default()
        }
        .run()
        .unwrap();
        assert_eq!(page.apis.len(), 1);

        let page = CatalogQuery {
            page: Some(10),
            per_page: Some(2),
            ..CatalogQuery::default()
        }
        .run()
        .unwrap();
        assert!(page.apis.is_empty());
        assert_eq!(page.total, all().len());
    }

    #[test]
    fn per_page_bounds() {
        let err = CatalogQuery {
            per_page: Some(101),
            page: Some(0),
            ..CatalogQuery::default()
        }
        .run()
        .unwrap_err();
        assert!(err.mentions("per_page"));
        assert!(err.mentions("page"));
    }

    #[test]
    fn find_is_case_insensitive() {
        assert!(find("GIPHY").is_some());
        assert!(find("unknown").is_none());
    }
}
