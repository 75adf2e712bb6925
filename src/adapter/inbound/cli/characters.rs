//! Handlers for the Rick and Morty commands.

use tabled::{Table, Tabled};

use crate::adapter::inbound::cli::command::{CharacterArgs, EpisodeArgs, LocationArgs};
use crate::adapter::inbound::cli::output;
use crate::adapter::inbound::cli::session::SessionOptions;
use crate::domain::character::{
    Character, CharacterFilter, CharacterIds, Episode, EpisodeFilter, Location, LocationFilter,
};
use crate::domain::pagination::PageInfo;
use crate::domain::preferences::Preferences;
use crate::error::Result;

#[derive(Tabled)]
struct CharacterRow {
    #[tabled(rename = "")]
    favorite: String,
    #[tabled(rename = "ID")]
    id: u32,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Species")]
    species: String,
    #[tabled(rename = "Location")]
    location: String,
}

impl CharacterRow {
    fn new(character: &Character, preferences: &Preferences) -> Self {
        Self {
            favorite: output::favorite_marker(preferences.is_favorite_character(character.id)),
            id: character.id,
            name: character.name.clone(),
            status: character.status.clone(),
            species: character.species.clone(),
            location: character.location.name.clone(),
        }
    }
}

#[derive(Tabled)]
struct LocationRow {
    #[tabled(rename = "ID")]
    id: u32,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Dimension")]
    dimension: String,
    #[tabled(rename = "Residents")]
    residents: usize,
}

#[derive(Tabled)]
struct EpisodeRow {
    #[tabled(rename = "ID")]
    id: u32,
    #[tabled(rename = "Code")]
    code: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Air date")]
    air_date: String,
    #[tabled(rename = "Characters")]
    characters: usize,
}

fn character_filter(args: &CharacterArgs) -> CharacterFilter {
    CharacterFilter {
        name: args.name.clone(),
        status: args.status.clone(),
        species: args.species.clone(),
        kind: args.kind.clone(),
        gender: args.gender.clone(),
        page: args.page,
    }
}

fn page_footer(info: &PageInfo, shown: usize) {
    output::note(&format!(
        "{shown} shown of {} ({} pages)",
        info.count, info.pages
    ));
    if let Some(next) = info.next_page() {
        output::hint(&format!("next page: --page {next}"));
    }
}

/// `characters`: one page, or `--pages N` through the infinite query.
pub async fn list(session: &SessionOptions, args: &CharacterArgs) -> Result<()> {
    let filter = character_filter(args);
    let dashboard = session.open()?;
    let spinner = output::spinner("Fetching characters...");

    if let Some(pages) = args.pages {
        let feed = match dashboard.character_feed(&filter, pages).await {
            Ok(feed) => feed,
            Err(err) => {
                output::spinner_fail(&spinner, "Character request failed");
                return Err(err);
            }
        };
        output::spinner_success(&spinner, &format!("Loaded {} pages", feed.pages_loaded));
        if output::data("characters", &feed) {
            return Ok(());
        }
        let preferences = dashboard.preferences()?;
        let rows: Vec<CharacterRow> = feed
            .items
            .iter()
            .map(|c| CharacterRow::new(c, &preferences))
            .collect();
        output::lines(&Table::new(rows).to_string());
        output::note(&format!("{} shown of {}", feed.items.len(), feed.total));
        if feed.has_more {
            output::hint(&format!("more available: --pages {}", feed.pages_loaded + 1));
        }
        return Ok(());
    }

    let page = match dashboard.characters(&filter).await {
        Ok(page) => page,
        Err(err) => {
            output::spinner_fail(&spinner, "Character request failed");
            return Err(err);
        }
    };
    output::spinner_success(&spinner, "Fetched characters");
    if output::data("characters", &page) {
        return Ok(());
    }
    let preferences = dashboard.preferences()?;
    let rows: Vec<CharacterRow> = page
        .results
        .iter()
        .map(|c| CharacterRow::new(c, &preferences))
        .collect();
    output::lines(&Table::new(rows).to_string());
    page_footer(&page.info, page.results.len());
    Ok(())
}

/// `character <ids>`.
pub async fn show(session: &SessionOptions, raw_ids: &str) -> Result<()> {
    let ids = CharacterIds::parse(raw_ids)?;
    let dashboard = session.open()?;
    let characters = dashboard.characters_by_ids(&ids).await?;
    if output::data("characters", &characters) {
        return Ok(());
    }

    let preferences = dashboard.preferences()?;
    if let [character] = characters.as_slice() {
        let marker = if preferences.is_favorite_character(character.id) {
            format!(" {}", output::favorite_marker(true))
        } else {
            String::new()
        };
        output::section(&format!("{}{marker}", character.name));
        output::field("ID", character.id);
        output::field("Status", &character.status);
        output::field("Species", &character.species);
        if !character.kind.is_empty() {
            output::field("Type", &character.kind);
        }
        output::field("Gender", &character.gender);
        output::field("Origin", &character.origin.name);
        output::field("Location", &character.location.name);
        output::field("Episodes", character.episode.len());
        output::field("Image", output::highlight(&character.image));
        return Ok(());
    }

    let rows: Vec<CharacterRow> = characters
        .iter()
        .map(|c| CharacterRow::new(c, &preferences))
        .collect();
    output::lines(&Table::new(rows).to_string());
    Ok(())
}

/// `locations`.
pub async fn locations(session: &SessionOptions, args: &LocationArgs) -> Result<()> {
    let filter = LocationFilter {
        name: args.name.clone(),
        kind: args.kind.clone(),
        dimension: args.dimension.clone(),
        page: args.page,
    };
    let dashboard = session.open()?;
    let page = dashboard.locations(&filter).await?;
    if output::data("locations", &page) {
        return Ok(());
    }

    let rows: Vec<LocationRow> = page
        .results
        .iter()
        .map(|l: &Location| LocationRow {
            id: l.id,
            name: l.name.clone(),
            kind: l.kind.clone(),
            dimension: l.dimension.clone(),
            residents: l.residents.len(),
        })
        .collect();
    output::lines(&Table::new(rows).to_string());
    page_footer(&page.info, page.results.len());
    Ok(())
}

/// `episodes`.
pub async fn episodes(session: &SessionOptions, args: &EpisodeArgs) -> Result<()> {
    let filter = EpisodeFilter {
        name: args.name.clone(),
        episode: args.episode.clone(),
        page: args.page,
    };
    let dashboard = session.open()?;
    let page = dashboard.episodes(&filter).await?;
    if output::data("episodes", &page) {
        return Ok(());
    }

    let rows: Vec<EpisodeRow> = page
        .results
        .iter()
        .map(|e: &Episode| EpisodeRow {
            id: e.id,
            code: e.episode.clone(),
            name: e.name.clone(),
            air_date: e.air_date.clone(),
            characters: e.characters.len(),
        })
        .collect();
    output::lines(&Table::new(rows).to_string());
    page_footer(&page.info, page.results.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_carries_every_flag() {
        let args = CharacterArgs {
            name: Some("rick".into()),
            status: Some("alive".into()),
            kind: Some("Parasite".into()),
            page: Some(2),
            ..CharacterArgs::default()
        };
        let filter = character_filter(&args);
        assert_eq!(filter.name.as_deref(), Some("rick"));
        assert_eq!(filter.status.as_deref(), Some("alive"));
        assert_eq!(filter.kind.as_deref(), Some("Parasite"));
        assert_eq!(filter.page, Some(2));
        assert!(filter.gender.is_none());
    }

    #[test]
    fn row_marks_favorites() {
        output::configure(output::OutputConfig::new(false, false, 0).with_color(false));
        let character: Character =
            serde_json::from_value(serde_json::json!({"id": 7, "name": "Abradolf Lincler"}))
                .unwrap();
        let mut preferences = Preferences::default();
        preferences.toggle_character(7);
        let row = CharacterRow::new(&character, &preferences);
        assert_eq!(row.favorite, "★");
        assert_eq!(row.id, 7);
    }
}
