//! Persistence of the display theme, independent of the ledger

use log::{debug, warn};

use crate::{
    errors::Error,
    storage::{Storage, DARK_MODE_KEY},
    types::Theme,
};

/// Reads the persisted theme.
///
/// A missing or unreadable flag means [`Theme::Light`].
///
/// # Errors
/// Only when the storage itself fails to read.
pub fn load_theme<S: Storage + ?Sized>(storage: &S) -> Result<Theme, Error> {
    let Some(stored) = storage.load(DARK_MODE_KEY)? else {
        debug!("no stored theme, using light");
        return Ok(Theme::Light);
    };
    match serde_json::from_str::<bool>(stored.trim()) {
        Ok(dark) => Ok(Theme::from(dark)),
        Err(err) => {
            warn!("stored theme flag {stored:?} is not a boolean ({err}), using light");
            Ok(Theme::Light)
        }
    }
}

/// Persists `theme` as a JSON boolean
///
/// # Errors
/// If the storage write fails
pub fn save_theme<S: Storage + ?Sized>(storage: &mut S, theme: Theme) -> Result<(), Error> {
    storage.save(DARK_MODE_KEY, &serde_json::to_string(&theme.is_dark())?)
}
