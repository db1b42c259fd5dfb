// src/application/commands/settings_commands.rs

use crate::application::{error_handling::ErrorResponse, state::AppState};
use crate::domain::PlayerSettings;

pub async fn get_settings(state: &AppState) -> Result<PlayerSettings, String> {
    Ok(state.settings_service.load())
}

pub async fn update_settings(
    state: &AppState,
    settings: PlayerSettings,
) -> Result<PlayerSettings, String> {
    if !settings.volume.is_finite() {
        return Err(ErrorResponse::validation("Volume must be a number".to_string()).into_message());
    }

    Ok(state.settings_service.update(|current| *current = settings))
}
