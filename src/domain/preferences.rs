//! Persisted dashboard preferences: favorites, active tab, view mode.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::apod::format_date;

/// Dashboard tab.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    #[default]
    Apod,
    Characters,
    Gifs,
}

impl Tab {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Apod => "apod",
            Self::Characters => "characters",
            Self::Gifs => "gifs",
        }
    }
}

impl FromStr for Tab {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "apod" => Ok(Self::Apod),
            "characters" => Ok(Self::Characters),
            "gifs" => Ok(Self::Gifs),
            other => Err(format!("unknown tab '{other}' (expected apod, characters or gifs)")),
        }
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Grid,
    List,
}

impl ViewMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Grid => "grid",
            Self::List => "list",
        }
    }
}

impl FromStr for ViewMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "grid" => Ok(Self::Grid),
            "list" => Ok(Self::List),
            other => Err(format!("unknown view mode '{other}' (expected grid or list)")),
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User preferences. Mutated only through explicit toggles and setters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub favorite_dates: BTreeSet<String>,
    pub favorite_characters: BTreeSet<u32>,
    pub favorite_gifs: BTreeSet<String>,
    pub tab: Tab,
    pub view: ViewMode,
}

/// Flip membership; returns whether the item is now present.
fn toggle<T: Ord>(set: &mut BTreeSet<T>, item: T) -> bool {
    if set.remove(&item) {
        false
    } else {
        set.insert(item);
        true
    }
}

impl Preferences {
    /// Toggle an APOD date. Returns `true` if it is now a favorite.
    pub fn toggle_date(&mut self, date: NaiveDate) -> bool {
        toggle(&mut self.favorite_dates, format_date(date))
    }

    pub fn toggle_character(&mut self, id: u32) -> bool {
        toggle(&mut self.favorite_characters, id)
    }

    pub fn toggle_gif(&mut self, id: &str) -> bool {
        toggle(&mut self.favorite_gifs, id.trim().to_string())
    }

    #[must_use]
    pub fn is_favorite_date(&self, date: NaiveDate) -> bool {
        self.favorite_dates.contains(&format_date(date))
    }

    #[must_use]
    pub fn is_favorite_character(&self, id: u32) -> bool {
        self.favorite_characters.contains(&id)
    }

    #[must_use]
    pub fn is_favorite_gif(&self, id: &str) -> bool {
        self.favorite_gifs.contains(id.trim())
    }

    #[must_use]
    pub fn favorite_count(&self) -> usize {
        self.favorite_dates.len() + self.favorite_characters.len() + self.favorite_gifs.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_twice_restores() {
        let mut prefs = Preferences::default();
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();

        assert!(prefs.toggle_date(date));
        assert!(prefs.is_favorite_date(date));
        assert!(!prefs.toggle_date(date));
        assert_eq!(prefs, Preferences::default());
    }

    #[test]
    fn counts_across_kinds() {
        let mut prefs = Preferences::default();
        prefs.toggle_character(1);
        prefs.toggle_character(2);
        prefs.toggle_gif("abc");
        assert_eq!(prefs.favorite_count(), 3);
        assert!(prefs.is_favorite_gif(" abc "));
    }

    #[test]
    fn deserialize_partial_file() {
        let prefs: Preferences = serde_json::from_str(r#"{"tab":"gifs"}"#).unwrap();
        assert_eq!(prefs.tab, Tab::Gifs);
        assert_eq!(prefs.view, ViewMode::Grid);
        assert!(prefs.favorite_dates.is_empty());
    }

    #[test]
    fn tab_and_view_parse() {
        assert_eq!("Characters".parse::<Tab>(), Ok(Tab::Characters));
        assert_eq!("LIST".parse::<ViewMode>(), Ok(ViewMode::List));
        assert!("settings".parse::<Tab>().is_err());
    }
}
