//! Handler for the `catalog` command.

use tabled::{Table, Tabled};

use crate::adapter::inbound::cli::command::CatalogArgs;
use crate::adapter::inbound::cli::output;
use crate::adapter::inbound::cli::session::SessionOptions;
use crate::domain::catalog::{self, ApiInfo, CatalogPage, CatalogQuery, CATEGORIES};
use crate::domain::error::{FieldError, ValidationError};
use crate::error::Result;

#[derive(Tabled)]
struct ApiRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Auth")]
    auth: String,
}

impl From<&ApiInfo> for ApiRow {
    fn from(api: &ApiInfo) -> Self {
        Self {
            id: api.id.clone(),
            name: api.name.clone(),
            category: api.category.clone(),
            auth: api.authentication.clone().unwrap_or_else(|| "none".into()),
        }
    }
}

fn query(args: &CatalogArgs) -> CatalogQuery {
    CatalogQuery {
        page: args.page,
        per_page: args.per_page,
        category: args.category.clone(),
        search: args.search.clone(),
    }
}

pub async fn execute(session: &SessionOptions, args: &CatalogArgs) -> Result<()> {
    if args.categories {
        if !output::data("categories", &CATEGORIES) {
            output::section("Categories");
            output::lines(&CATEGORIES.join("\n"));
        }
        return Ok(());
    }

    if let Some(id) = &args.id {
        let api = catalog::find(id).ok_or_else(|| {
            ValidationError::single(FieldError::value("id", format!("API '{id}' not found")))
        })?;
        show(&api);
        return Ok(());
    }

    let dashboard = session.open()?;
    let page = dashboard.catalog(&query(args)).await?;
    render(&page);
    Ok(())
}

fn show(api: &ApiInfo) {
    if output::data("api", api) {
        return;
    }
    output::section(&api.name);
    output::field("ID", &api.id);
    output::field("Category", &api.category);
    output::field("Base URL", output::highlight(&api.base_url));
    output::field("Auth", api.authentication.as_deref().unwrap_or("none"));
    output::field("Docs", &api.documentation_url);
    output::field("Status", &api.status);
    output::lines(&api.description);
}

fn render(page: &CatalogPage) {
    if output::data("catalog", page) {
        return;
    }
    if page.apis.is_empty() {
        output::warning("No APIs match the filters");
        return;
    }
    let rows: Vec<ApiRow> = page.apis.iter().map(ApiRow::from).collect();
    output::lines(&Table::new(rows).to_string());
    output::note(&format!(
        "page {} · {} of {} APIs",
        page.page,
        page.apis.len(),
        page.total
    ));
}
