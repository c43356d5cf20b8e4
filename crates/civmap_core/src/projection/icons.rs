//! Marker icon descriptors and the process-wide default icon set.
//!
//! # Invariants
//! - Default icons are installed at most once per process.
//! - Reading defaults never fails; built-in asset paths are used until
//!   `init_default_icons` runs.

use once_cell::sync::OnceCell;

/// Pixel size of custom civilization icons.
pub const CUSTOM_ICON_SIZE: (u32, u32) = (30, 30);
/// Anchor point of custom icons, relative to their top-left corner.
pub const CUSTOM_ICON_ANCHOR: (i32, i32) = (15, 40);

const DEFAULT_ICON_URL: &str = "leaflet/dist/images/marker-icon.png";
const DEFAULT_ICON_RETINA_URL: &str = "leaflet/dist/images/marker-icon-2x.png";
const DEFAULT_SHADOW_URL: &str = "leaflet/dist/images/marker-shadow.png";

static DEFAULT_ICONS: OnceCell<DefaultMarkerIcons> = OnceCell::new();

/// Icon a renderer should draw for one marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkerIcon {
    /// Civilization image sized as a custom pin.
    Custom {
        url: String,
        size: (u32, u32),
        anchor: (i32, i32),
    },
    /// Stock pin from the default icon set.
    Default(DefaultMarkerIcons),
}

impl MarkerIcon {
    pub fn custom(url: impl Into<String>) -> Self {
        Self::Custom {
            url: url.into(),
            size: CUSTOM_ICON_SIZE,
            anchor: CUSTOM_ICON_ANCHOR,
        }
    }

    /// Primary image URL regardless of icon kind.
    pub fn url(&self) -> &str {
        match self {
            Self::Custom { url, .. } => url,
            Self::Default(icons) => &icons.icon_url,
        }
    }

    pub fn is_default(&self) -> bool {
        matches!(self, Self::Default(_))
    }
}

/// Asset locations of the stock marker pin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultMarkerIcons {
    pub icon_url: String,
    pub icon_retina_url: String,
    pub shadow_url: String,
}

impl DefaultMarkerIcons {
    pub fn builtin() -> Self {
        Self {
            icon_url: DEFAULT_ICON_URL.to_string(),
            icon_retina_url: DEFAULT_ICON_RETINA_URL.to_string(),
            shadow_url: DEFAULT_SHADOW_URL.to_string(),
        }
    }
}

impl Default for DefaultMarkerIcons {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Installs the default icon set once, before the first render.
///
/// Returns `Ok(())` for the first call and for repeated calls with the same
/// icons; a different icon set after initialization is rejected.
pub fn init_default_icons(icons: DefaultMarkerIcons) -> Result<(), String> {
    let installed = DEFAULT_ICONS.get_or_init(|| icons.clone());
    if *installed != icons {
        return Err(format!(
            "default marker icons already initialized with `{}`; refusing to switch to `{}`",
            installed.icon_url, icons.icon_url
        ));
    }
    Ok(())
}

/// Returns the installed default icons, or the built-in set.
pub fn default_icons() -> DefaultMarkerIcons {
    DEFAULT_ICONS.get().cloned().unwrap_or_default()
}
