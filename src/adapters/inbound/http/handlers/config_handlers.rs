use axum::{extract::State, Json};

use crate::adapters::inbound::http::{dto::ConfigResponseDto, router::AppState};

/// Public settings the UI needs before it has credentials
pub async fn get_config(State(state): State<AppState>) -> Json<ConfigResponseDto> {
    Json(ConfigResponseDto {
        api_path: state.settings.api_path.clone(),
        delimiter: state.settings.delimiter.as_str().to_string(),
        endpoint: state.connector.endpoint(),
        instance_id: state.settings.instance_id.clone(),
    })
}
