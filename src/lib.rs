/// photo-masonry: incremental masonry layout for photo galleries
///
/// The crate packs paginated, variable-aspect-ratio photos into a
/// gap-free multi-column grid and drives the lightbox that steps
/// through them. Rendering, routing and the HTTP client are left to
/// the embedding application; the core is a synchronous state machine
/// plus one async port for the listing service.

pub mod layout;
pub mod service;
pub mod state;
pub mod viewport;

pub use layout::classify::{Classifier, ConstantRoll, Footprint, RandomRoll, RollSource, SeededRoll};
pub use layout::engine::LayoutEngine;
pub use service::{FetchError, GalleryController, ImageListingService};
pub use state::data::{GalleryImage, GalleryItem, PageRequest, PageResponse, Placement};
pub use state::gallery::{Effect, Gallery, Message};
pub use state::lightbox::{
    fit_size, format_shutter_speed, preload_window, render_width, Lightbox, NavOutcome, PageFlip,
    SlugOpen,
};
pub use viewport::{columns_for_width, page_size_for_columns, FixedViewport, Viewport};
