//! Preference persistence port.

use crate::domain::preferences::Preferences;
use crate::error::StoreError;

/// Loads and saves the user's [`Preferences`].
///
/// A store that has never been written loads as `Preferences::default()`.
pub trait PreferenceStore: Send + Sync {
    fn load(&self) -> Result<Preferences, StoreError>;

    fn save(&self, preferences: &Preferences) -> Result<(), StoreError>;
}
