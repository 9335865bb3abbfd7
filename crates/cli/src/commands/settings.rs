//! Setting commands.
//!
//! Operate on whichever store `STAYS_STORE` selects.

use super::{CommandError, open_configured_store};

/// Print a setting's value, or nothing if unset.
///
/// # Errors
///
/// Returns an error if the store cannot be opened or read.
pub async fn get(key: &str) -> Result<(), CommandError> {
    let store = open_configured_store().await?;
    match store.get_setting(key).await? {
        Some(value) => {
            #[allow(clippy::print_stdout)]
            {
                println!("{value}");
            }
        }
        None => tracing::warn!("Setting {key} is not set"),
    }
    Ok(())
}

/// Create or replace a setting.
///
/// # Errors
///
/// Returns an error if the store cannot be opened or written.
pub async fn set(key: &str, value: &str) -> Result<(), CommandError> {
    let store = open_configured_store().await?;
    let stored = store.set_setting(key, value).await?;
    tracing::info!("Setting {key} = {stored}");
    Ok(())
}
