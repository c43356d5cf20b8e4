//! Typed field changes for civilization forms.

use crate::model::civilization::CivilizationForm;
use crate::model::image::ImagePayload;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Text-editable form fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftField {
    Name,
    Description,
    Latitude,
    Longitude,
}

impl Display for DraftField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Name => write!(f, "name"),
            Self::Description => write!(f, "description"),
            Self::Latitude => write!(f, "latitude"),
            Self::Longitude => write!(f, "longitude"),
        }
    }
}

/// One field change applied to a draft.
#[derive(Debug, Clone, PartialEq)]
pub enum DraftEdit {
    Name(String),
    Description(String),
    Latitude(f64),
    Longitude(f64),
    Image(ImagePayload),
    ClearImage,
}

/// Raw input that cannot become a field value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldInputError {
    NotANumber { field: DraftField, input: String },
}

impl Display for FieldInputError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotANumber { field, input } => {
                write!(f, "{field} expects a finite number, got `{input}`")
            }
        }
    }
}

impl Error for FieldInputError {}

impl DraftEdit {
    /// Parses raw text typed into a form field.
    ///
    /// Coordinate text must parse to a finite number; it is never stored
    /// as NaN.
    pub fn from_input(field: DraftField, raw: &str) -> Result<Self, FieldInputError> {
        match field {
            DraftField::Name => Ok(Self::Name(raw.to_string())),
            DraftField::Description => Ok(Self::Description(raw.to_string())),
            DraftField::Latitude => parse_coordinate(field, raw).map(Self::Latitude),
            DraftField::Longitude => parse_coordinate(field, raw).map(Self::Longitude),
        }
    }

    /// Applies this change to a form in place.
    pub fn apply(self, form: &mut CivilizationForm) {
        match self {
            Self::Name(value) => form.fields.name = value,
            Self::Description(value) => form.fields.description = value,
            Self::Latitude(value) => form.fields.latitude = value,
            Self::Longitude(value) => form.fields.longitude = value,
            Self::Image(payload) => form.image = Some(payload),
            Self::ClearImage => form.image = None,
        }
    }
}

fn parse_coordinate(field: DraftField, raw: &str) -> Result<f64, FieldInputError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| FieldInputError::NotANumber {
            field,
            input: raw.to_string(),
        })
}
