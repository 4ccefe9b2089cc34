//! Interactive override of default settings.

use tracing::{debug, info};

use stencil_settings::{ConfigStore, Setting};

use crate::error::{CoreError, CoreResult};

/// Something that can be asked for a replacement value.
///
/// Returning an empty string keeps the current value.
pub trait InputCollaborator {
    fn offer(&mut self, name: &str, current: &str) -> std::io::Result<String>;
}

/// Offer every setting to `input`, keeping only the ones it replaced.
///
/// The result preserves the order of `all_settings`, with each entry's
/// original name and the offered value.
pub fn negotiate<I>(all_settings: &[Setting], input: &mut I) -> CoreResult<Vec<Setting>>
where
    I: InputCollaborator + ?Sized,
{
    let mut updated = Vec::new();
    for setting in all_settings {
        let offered = input
            .offer(&setting.name, &setting.value)
            .map_err(CoreError::Input)?;
        if !offered.is_empty() {
            debug!("Override {} = {:?}", setting.name, offered);
            updated.push(Setting::new(setting.name.clone(), offered));
        }
    }
    Ok(updated)
}

/// Flatten the store, negotiate overrides and write them back.
///
/// Returns the settings that were changed.
pub fn offer_overrides<S, I>(store: &mut S, input: &mut I) -> CoreResult<Vec<Setting>>
where
    S: ConfigStore + ?Sized,
    I: InputCollaborator + ?Sized,
{
    let editable = store.get_all_values()?;
    let updated = negotiate(&editable, input)?;
    store.set_values(&updated)?;
    info!(
        "Applied {} of {} settings as overrides",
        updated.len(),
        editable.len()
    );
    Ok(updated)
}
