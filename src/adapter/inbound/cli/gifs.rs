//! Handlers for the `gifs` command group.

use tabled::{Table, Tabled};

use crate::adapter::inbound::cli::command::{GifCommand, GifListArgs};
use crate::adapter::inbound::cli::output;
use crate::adapter::inbound::cli::session::SessionOptions;
use crate::domain::gif::{Gif, GifParams};
use crate::domain::preferences::Preferences;
use crate::error::Result;
use crate::port::inbound::dashboard::Feed;

#[derive(Tabled)]
struct GifRow {
    #[tabled(rename = "")]
    favorite: String,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Rating")]
    rating: String,
}

fn list_params(list: &GifListArgs, q: Option<String>, lang: Option<String>) -> GifParams {
    GifParams {
        q,
        limit: list.limit,
        rating: list.rating.clone(),
        lang,
        ..GifParams::default()
    }
}

pub async fn execute(session: &SessionOptions, command: &GifCommand) -> Result<()> {
    match command {
        GifCommand::Trending(list) => {
            let params = list_params(list, None, None);
            feed(session, "Fetching trending GIFs...", params, list.pages, false).await
        }
        GifCommand::Search { query, lang, list } => {
            let params = list_params(list, Some(query.clone()), lang.clone());
            feed(session, "Searching GIFs...", params, list.pages, true).await
        }
        GifCommand::Random { tag, rating } => {
            let params = GifParams {
                tag: tag.clone(),
                rating: rating.clone(),
                ..GifParams::default()
            };
            let dashboard = session.open()?;
            let gif = dashboard.random_gif(&params).await?;
            let preferences = dashboard.preferences()?;
            render_one(&gif, &preferences);
            Ok(())
        }
        GifCommand::Show { id } => {
            let dashboard = session.open()?;
            let gif = dashboard.gif(id).await?;
            let preferences = dashboard.preferences()?;
            render_one(&gif, &preferences);
            Ok(())
        }
    }
}

async fn feed(
    session: &SessionOptions,
    message: &str,
    params: GifParams,
    pages: usize,
    search: bool,
) -> Result<()> {
    let dashboard = session.open()?;
    let spinner = output::spinner(message);
    let result = if search {
        dashboard.search_gifs(&params, pages).await
    } else {
        dashboard.trending_gifs(&params, pages).await
    };
    let feed = match result {
        Ok(feed) => {
            output::spinner_success(&spinner, &format!("Loaded {} GIFs", feed.items.len()));
            feed
        }
        Err(err) => {
            output::spinner_fail(&spinner, "GIPHY request failed");
            return Err(err);
        }
    };

    let preferences = dashboard.preferences()?;
    render_feed(&feed, &preferences);
    Ok(())
}

fn render_feed(feed: &Feed<Gif>, preferences: &Preferences) {
    if output::data("gifs", feed) {
        return;
    }
    let rows: Vec<GifRow> = feed
        .items
        .iter()
        .map(|gif| GifRow {
            favorite: output::favorite_marker(preferences.is_favorite_gif(&gif.id)),
            id: gif.id.clone(),
            title: if gif.title.trim().is_empty() {
                output::muted("(untitled)")
            } else {
                gif.title.clone()
            },
            rating: gif.rating.clone(),
        })
        .collect();
    output::lines(&Table::new(rows).to_string());
    output::note(&format!("{} shown of {}", feed.items.len(), feed.total));
    if feed.has_more {
        output::hint(&format!("more available: --pages {}", feed.pages_loaded + 1));
    }
}

fn render_one(gif: &Gif, preferences: &Preferences) {
    if output::data("gif", gif) {
        return;
    }
    let marker = if preferences.is_favorite_gif(&gif.id) {
        format!(" {}", output::favorite_marker(true))
    } else {
        String::new()
    };
    output::section(&format!("{}{marker}", gif.title));
    output::field("ID", &gif.id);
    output::field("Rating", &gif.rating);
    if let Some(user) = gif.username.as_deref().filter(|u| !u.is_empty()) {
        output::field("By", user);
    }
    if let Some(url) = gif.preview_url() {
        output::field("Preview", output::highlight(url));
    }
    output::field("Page", &gif.url);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_args_become_gif_params() {
        let list = GifListArgs {
            limit: Some(10),
            rating: Some("pg".into()),
            pages: 2,
        };
        let params = list_params(&list, Some("cats".into()), None);
        assert_eq!(params.q.as_deref(), Some("cats"));
        assert_eq!(params.limit, Some(10));
        assert_eq!(params.rating.as_deref(), Some("pg"));
        assert_eq!(params.offset, None);
    }
}
