//! Core client logic for the civilization world map.
//! This crate keeps the marker set consistent with the remote civilization
//! service and owns every client-side invariant.

pub mod config;
pub mod draft;
pub mod logging;
pub mod model;
pub mod projection;
pub mod session;
pub mod store;
pub mod sync;

pub use config::{ClientConfig, ConfigError};
pub use draft::editor::{DraftEditor, DraftError, DraftResult, EditDraft, SettleOutcome};
pub use draft::field::{DraftEdit, DraftField, FieldInputError};
pub use logging::{default_log_level, init_logging, logging_status, LogSettings};
pub use model::civilization::{
    CivilizationFields, CivilizationForm, CivilizationId, CivilizationRecord,
    NewCivilizationDraft, ValidationError,
};
pub use model::image::ImagePayload;
pub use projection::icons::{default_icons, init_default_icons, DefaultMarkerIcons, MarkerIcon};
pub use projection::marker::{Marker, MarkerProjector, PopupContent, PopupForm};
pub use projection::viewport::{Bounds, LatLng, MapViewport};
pub use session::{MapSession, SessionError, SessionResult};
pub use store::geo_store::{
    GeoEntityStore, ReplaceSummary, StoreError, SubscriptionId, UpsertOutcome,
};
pub use sync::api::{ApiError, ApiResult, CivilizationApi};
pub use sync::gateway::{SyncError, SyncGateway, SyncResult};
pub use sync::http::HttpCivilizationApi;

/// Builds an HTTP-backed session from configuration.
pub fn connect(config: &ClientConfig) -> ApiResult<MapSession<HttpCivilizationApi>> {
    let api = HttpCivilizationApi::from_config(config)?;
    Ok(MapSession::new(
        api,
        MarkerProjector::new(&config.media_base_url),
    ))
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
