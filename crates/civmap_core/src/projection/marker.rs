//! Marker projection from store records.
//!
//! # Responsibility
//! - Derive one renderable marker per record, in store order.
//! - Resolve stored image references into fetchable URLs.
//! - Feed popup edit forms from active drafts so re-renders keep typed input.
//!
//! # Invariants
//! - Projection is a pure function of its inputs; nothing is cached.
//! - Marker position and title always come from the record, never a draft.

use crate::draft::editor::DraftEditor;
use crate::model::civilization::{CivilizationFields, CivilizationId, CivilizationRecord};
use crate::projection::icons::{default_icons, MarkerIcon};
use crate::projection::viewport::LatLng;
use reqwest::Url;

/// Popup edit form state shown under a marker.
#[derive(Debug, Clone, PartialEq)]
pub struct PopupForm {
    pub fields: CivilizationFields,
    /// Name of an image picked in the draft but not uploaded yet.
    pub pending_image: Option<String>,
    /// Whether the values come from an open draft.
    pub editing: bool,
}

/// Popup content for one marker.
#[derive(Debug, Clone, PartialEq)]
pub struct PopupContent {
    pub title: String,
    pub description: String,
    pub image_url: Option<String>,
    pub form: PopupForm,
}

/// Renderable marker derived from one record.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub id: CivilizationId,
    pub position: LatLng,
    pub icon: MarkerIcon,
    pub popup: PopupContent,
}

/// Builds markers against a media base location.
#[derive(Debug, Clone)]
pub struct MarkerProjector {
    media_base: String,
}

impl MarkerProjector {
    pub fn new(media_base_url: &Url) -> Self {
        Self {
            media_base: media_base_url.as_str().trim_end_matches('/').to_string(),
        }
    }

    pub fn media_base(&self) -> &str {
        &self.media_base
    }

    /// Lazily projects markers without draft overlays.
    pub fn project<'a>(
        &'a self,
        records: &'a [CivilizationRecord],
    ) -> impl Iterator<Item = Marker> + 'a {
        records.iter().map(move |record| self.marker(record, None))
    }

    /// Lazily projects markers, filling popup forms from open drafts.
    pub fn project_with_drafts<'a>(
        &'a self,
        records: &'a [CivilizationRecord],
        drafts: &'a DraftEditor,
    ) -> impl Iterator<Item = Marker> + 'a {
        records
            .iter()
            .map(move |record| self.marker(record, Some(drafts)))
    }

    /// Maps a stored image reference to an icon.
    pub fn resolve(&self, image_ref: Option<&str>) -> MarkerIcon {
        match self.image_url(image_ref) {
            Some(url) => MarkerIcon::custom(url),
            None => MarkerIcon::Default(default_icons()),
        }
    }

    /// Fully-qualified URL of a stored image, if any.
    pub fn image_url(&self, image_ref: Option<&str>) -> Option<String> {
        let image_ref = image_ref.map(str::trim).filter(|value| !value.is_empty())?;
        if image_ref.starts_with("http://") || image_ref.starts_with("https://") {
            return Some(image_ref.to_string());
        }
        Some(format!(
            "{}/{}",
            self.media_base,
            image_ref.trim_start_matches('/')
        ))
    }

    fn marker(&self, record: &CivilizationRecord, drafts: Option<&DraftEditor>) -> Marker {
        let form = match drafts.and_then(|drafts| drafts.get(record.id)) {
            Some(draft) => PopupForm {
                fields: draft.form.fields.clone(),
                pending_image: draft.form.image.as_ref().map(|image| image.file_name.clone()),
                editing: true,
            },
            None => PopupForm {
                fields: record.fields(),
                pending_image: None,
                editing: false,
            },
        };

        Marker {
            id: record.id,
            position: LatLng::new(record.latitude, record.longitude),
            icon: self.resolve(record.image_ref.as_deref()),
            popup: PopupContent {
                title: record.name.clone(),
                description: record.description.clone(),
                image_url: self.image_url(record.image_ref.as_deref()),
                form,
            },
        }
    }
}
