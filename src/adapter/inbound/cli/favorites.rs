//! Handlers for the `favorites` command group.

use chrono::{NaiveDate, Utc};
use serde::Serialize;

use crate::adapter::inbound::cli::command::FavoritesCommand;
use crate::adapter::inbound::cli::output;
use crate::adapter::inbound::cli::session::SessionOptions;
use crate::domain::apod::{ApodParams, ApodSelection};
use crate::domain::error::{FieldError, ValidationError};
use crate::domain::preferences::{Tab, ViewMode};
use crate::error::Result;

#[derive(Serialize)]
struct Toggled<'a, T: Serialize> {
    kind: &'a str,
    id: T,
    favorite: bool,
}

/// Favorite dates go through the same checks as APOD requests, so a date
/// before the first picture or in the future is refused.
fn parse_favorite_date(raw: &str, today: NaiveDate) -> Result<NaiveDate> {
    let params = ApodParams {
        date: Some(raw.to_string()),
        ..ApodParams::default()
    };
    match params.validate(today)?.selection {
        ApodSelection::Date(date) => Ok(date),
        _ => Err(ValidationError::single(FieldError::missing("date", "A date is required")).into()),
    }
}

fn parse_setting<T: std::str::FromStr<Err = String>>(field: &str, raw: &str) -> Result<T> {
    raw.parse::<T>()
        .map_err(|message| ValidationError::single(FieldError::value(field, message)).into())
}

fn report_toggle<T: Serialize + std::fmt::Display>(kind: &str, id: T, favorite: bool) {
    if output::data(
        "favorite",
        &Toggled {
            kind,
            id: &id,
            favorite,
        },
    ) {
        return;
    }
    if favorite {
        output::success(&format!("Added {kind} {id} to favorites"));
    } else {
        output::success(&format!("Removed {kind} {id} from favorites"));
    }
}

pub async fn execute(session: &SessionOptions, command: &FavoritesCommand) -> Result<()> {
    let dashboard = session.open()?;
    match command {
        FavoritesCommand::List => {
            let preferences = dashboard.preferences()?;
            if output::data("preferences", &preferences) {
                return Ok(());
            }
            output::section("Preferences");
            output::field("Tab", preferences.tab);
            output::field("View", preferences.view);
            output::field("Favorites", preferences.favorite_count());

            if !preferences.favorite_dates.is_empty() {
                output::section("APOD dates");
                for date in &preferences.favorite_dates {
                    output::lines(&format!("{} {date}", output::favorite_marker(true)));
                }
            }
            if !preferences.favorite_characters.is_empty() {
                output::section("Characters");
                for id in &preferences.favorite_characters {
                    output::lines(&format!("{} #{id}", output::favorite_marker(true)));
                }
            }
            if !preferences.favorite_gifs.is_empty() {
                output::section("GIFs");
                for id in &preferences.favorite_gifs {
                    output::lines(&format!("{} {id}", output::favorite_marker(true)));
                }
            }
            if preferences.favorite_count() == 0 {
                output::hint("add one with `grabapis favorites toggle-date 2024-01-01`");
            }
        }
        FavoritesCommand::ToggleDate { date } => {
            let date = parse_favorite_date(date, Utc::now().date_naive())?;
            let favorite = dashboard.toggle_favorite_date(date)?;
            report_toggle("date", date, favorite);
        }
        FavoritesCommand::ToggleCharacter { id } => {
            let favorite = dashboard.toggle_favorite_character(*id)?;
            report_toggle("character", id, favorite);
        }
        FavoritesCommand::ToggleGif { id } => {
            let id = id.trim();
            if id.is_empty() {
                return Err(
                    ValidationError::single(FieldError::missing("id", "GIF id is required"))
                        .into(),
                );
            }
            let favorite = dashboard.toggle_favorite_gif(id)?;
            report_toggle("gif", id, favorite);
        }
        FavoritesCommand::Tab { tab } => {
            let tab: Tab = parse_setting("tab", tab)?;
            dashboard.set_tab(tab)?;
            if !output::data("tab", &tab) {
                output::success(&format!("Active tab set to {tab}"));
            }
        }
        FavoritesCommand::View { view } => {
            let view: ViewMode = parse_setting("view", view)?;
            dashboard.set_view(view)?;
            if !output::data("view", &view) {
                output::success(&format!("View mode set to {view}"));
            }
        }
    }
    Ok(())
}
