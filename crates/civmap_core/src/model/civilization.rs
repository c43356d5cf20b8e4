//! Civilization record and form models.
//!
//! # Responsibility
//! - Define the canonical record returned by the remote service.
//! - Define the editable field set shared by create and edit flows.
//! - Validate names and coordinates before they reach the store or network.
//!
//! # Invariants
//! - `id` is assigned by the backend and never reassigned.
//! - `latitude` is finite and within [-90, 90].
//! - `longitude` is finite and within [-180, 180].

use crate::model::image::ImagePayload;
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Backend-assigned identifier for one civilization.
pub type CivilizationId = i64;

pub const MIN_LATITUDE: f64 = -90.0;
pub const MAX_LATITUDE: f64 = 90.0;
pub const MIN_LONGITUDE: f64 = -180.0;
pub const MAX_LONGITUDE: f64 = 180.0;

/// Which coordinate axis a validation failure refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Latitude,
    Longitude,
}

impl Display for Axis {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Latitude => write!(f, "latitude"),
            Self::Longitude => write!(f, "longitude"),
        }
    }
}

/// Validation errors for records and forms.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Name is blank after trim.
    EmptyName,
    /// Coordinate is NaN or infinite.
    NonFiniteCoordinate(Axis),
    /// Coordinate is outside world bounds.
    CoordinateOutOfRange { axis: Axis, value: f64 },
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "name must not be empty"),
            Self::NonFiniteCoordinate(axis) => write!(f, "{axis} must be a finite number"),
            Self::CoordinateOutOfRange { axis, value } => {
                write!(f, "{axis} {value} is outside world bounds")
            }
        }
    }
}

impl Error for ValidationError {}

/// Server-owned civilization record.
///
/// Field names follow the backend JSON shape; the stored image reference is
/// published as `image`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CivilizationRecord {
    pub id: CivilizationId,
    pub name: String,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub description: String,
    #[serde(deserialize_with = "deserialize_coordinate")]
    pub latitude: f64,
    #[serde(deserialize_with = "deserialize_coordinate")]
    pub longitude: f64,
    /// Relative path (or absolute URL) of the stored image.
    #[serde(
        rename = "image",
        default,
        deserialize_with = "deserialize_image_ref",
        skip_serializing_if = "Option::is_none"
    )]
    pub image_ref: Option<String>,
}

impl CivilizationRecord {
    pub fn new(
        id: CivilizationId,
        name: impl Into<String>,
        latitude: f64,
        longitude: f64,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            description: String::new(),
            latitude,
            longitude,
            image_ref: None,
        }
    }

    /// Validates record-level invariants required before storing.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_name(&self.name)?;
        validate_coordinates(self.latitude, self.longitude)
    }

    /// Returns the editable field set of this record.
    pub fn fields(&self) -> CivilizationFields {
        CivilizationFields {
            name: self.name.clone(),
            description: self.description.clone(),
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}

/// Text and coordinate fields shared by create and edit forms.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CivilizationFields {
    pub name: String,
    pub description: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl CivilizationFields {
    pub fn new(name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            latitude,
            longitude,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Validates the fields before they are sent to the remote service.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_name(&self.name)?;
        validate_coordinates(self.latitude, self.longitude)
    }
}

/// Submittable form: fields plus an optional image selected but not uploaded.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CivilizationForm {
    pub fields: CivilizationFields,
    pub image: Option<ImagePayload>,
}

impl CivilizationForm {
    pub fn new(fields: CivilizationFields) -> Self {
        Self {
            fields,
            image: None,
        }
    }

    pub fn with_image(mut self, image: ImagePayload) -> Self {
        self.image = Some(image);
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        self.fields.validate()
    }
}

/// Pre-creation draft owned by the "add civilization" form.
///
/// Starts empty (blank text, 0/0 coordinates, no image).
pub type NewCivilizationDraft = CivilizationForm;

pub fn validate_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::EmptyName);
    }
    Ok(())
}

pub fn validate_coordinates(latitude: f64, longitude: f64) -> Result<(), ValidationError> {
    check_axis(Axis::Latitude, latitude, MIN_LATITUDE, MAX_LATITUDE)?;
    check_axis(Axis::Longitude, longitude, MIN_LONGITUDE, MAX_LONGITUDE)
}

fn check_axis(axis: Axis, value: f64, min: f64, max: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFiniteCoordinate(axis));
    }
    if value < min || value > max {
        return Err(ValidationError::CoordinateOutOfRange { axis, value });
    }
    Ok(())
}

// The backend receives coordinates as multipart text and may echo them back
// as JSON strings, so both encodings are accepted.
fn deserialize_coordinate<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    struct CoordinateVisitor;

    impl Visitor<'_> for CoordinateVisitor {
        type Value = f64;

        fn expecting(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
            write!(f, "a number or a numeric string")
        }

        fn visit_f64<E: de::Error>(self, value: f64) -> Result<f64, E> {
            Ok(value)
        }

        fn visit_i64<E: de::Error>(self, value: i64) -> Result<f64, E> {
            Ok(value as f64)
        }

        fn visit_u64<E: de::Error>(self, value: u64) -> Result<f64, E> {
            Ok(value as f64)
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<f64, E> {
            value
                .trim()
                .parse::<f64>()
                .map_err(|_| E::invalid_value(de::Unexpected::Str(value), &self))
        }
    }

    deserializer.deserialize_any(CoordinateVisitor)
}

fn deserialize_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn deserialize_image_ref<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|path| !path.trim().is_empty()))
}
