/// Shared data structures for the gallery state
///
/// These structs represent the data model that flows between
/// the listing-service layer and the layout/navigation core.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default sort order requested from the listing service.
/// Newest captures first, matching the gallery's public ordering.
pub const DEFAULT_SORT_ORDER: &str = "-captured_at";

/// One image as served by the listing service.
///
/// Everything here is read-only to the core: dimensions feed the
/// classifier, the URL is the dedup identity, the slug is the deep-link
/// identifier, and the remaining metadata is displayed in the lightbox
/// info panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GalleryImage {
    /// Canonical image URL; also the identity used for deduplication
    pub url: String,
    /// Pixel width of the original image
    pub width: u32,
    /// Pixel height of the original image
    pub height: u32,
    /// URL-safe identifier used by deep links (None for untitled uploads)
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    /// Capture timestamp; the listing sort key
    #[serde(default)]
    pub captured_at: Option<DateTime<Utc>>,
    // EXIF metadata for the info panel
    #[serde(default)]
    pub camera_model: Option<String>,
    #[serde(default)]
    pub lens_model: Option<String>,
    #[serde(default)]
    pub iso_speed: Option<u32>,
    #[serde(default)]
    pub aperture_f_number: Option<f32>,
    /// Shutter speed in seconds (0.004 = 1/250)
    #[serde(default)]
    pub shutter_speed: Option<f32>,
    #[serde(default)]
    pub focal_length: Option<f32>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub location: Option<String>,
}

impl GalleryImage {
    /// Create an image with only the fields the layout core needs.
    /// Metadata stays empty; useful for fixtures and synthetic data.
    pub fn new(url: impl Into<String>, width: u32, height: u32) -> Self {
        GalleryImage {
            url: url.into(),
            width,
            height,
            slug: None,
            title: None,
            captured_at: None,
            camera_model: None,
            lens_model: None,
            iso_speed: None,
            aperture_f_number: None,
            shutter_speed: None,
            focal_length: None,
            latitude: None,
            longitude: None,
            location: None,
        }
    }

    /// Portrait orientation check (strictly taller than wide)
    pub fn is_portrait(&self) -> bool {
        self.height > self.width
    }
}

/// Grid coordinates assigned by the layout engine, 1-based
/// (CSS grid convention). Assigned exactly once per layout generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub column_start: u32,
    pub row_start: u32,
}

/// One image wrapped with its layout-derived fields.
#[derive(Debug, Clone, PartialEq)]
pub struct GalleryItem {
    pub image: GalleryImage,
    /// Footprint decided once by the classifier (cols in {1,2}, rows in {1,2,4})
    pub base_cols: u32,
    pub base_rows: u32,
    /// Effective footprint after clamping to the active column count
    pub cols: u32,
    pub rows: u32,
    /// Grid position; None until the engine places the item
    pub placement: Option<Placement>,
    /// Rendering-readiness flag, cleared by the rendering collaborator
    pub loading: bool,
}

impl GalleryItem {
    pub fn new(image: GalleryImage, base_cols: u32, base_rows: u32) -> Self {
        GalleryItem {
            image,
            base_cols,
            base_rows,
            cols: base_cols,
            rows: base_rows,
            placement: None,
            loading: true,
        }
    }

    pub fn is_placed(&self) -> bool {
        self.placement.is_some()
    }
}

/// One page request to the listing service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageRequest {
    /// 1-based page index
    pub page_index: u32,
    pub page_size: u32,
    pub sort_order: String,
}

/// One page of results from the listing service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageResponse {
    /// Stable-ordered page of images
    pub items: Vec<GalleryImage>,
    /// Total images matching the query, across all pages
    pub total_count: u32,
    /// Whether another page exists after this one
    pub has_next: bool,
}

impl PageResponse {
    /// Convert to JSON (fixtures, caching)
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parse from a JSON listing-service body
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
