/// Gallery state machine
///
/// The single owned state object behind the gallery view. External
/// events come in as messages, state transitions happen synchronously,
/// and side effects (page fetches, preload hints) leave as data for the
/// caller to execute. No reactive runtime, no internal suspension: the
/// only asynchronous boundary is the listing-service fetch, which lives
/// outside this struct.

use crate::layout::classify::Classifier;
use crate::layout::engine::LayoutEngine;
use crate::service::FetchError;
use crate::state::data::{GalleryImage, GalleryItem, PageRequest, PageResponse, DEFAULT_SORT_ORDER};
use crate::state::lightbox::{
    preload_window, Lightbox, NavOutcome, PageFlip, SlugOpen, LOOKAHEAD_MARGIN,
};
use crate::state::paging::Pager;
use crate::viewport::{columns_for_width, page_size_for_columns};

/// Every external event the gallery reacts to.
#[derive(Debug, Clone)]
pub enum Message {
    /// Viewport width changed (resize or first measurement)
    ViewportChanged { width: u32 },
    /// The grid scrolled near its bottom edge
    ScrollNearEnd,
    /// A requested page arrived
    PageLoaded(PageResponse),
    /// A requested page failed
    PageFailed(FetchError),
    /// User opened the lightbox at a grid index
    Open(usize),
    /// User followed a deep link
    OpenBySlug(String),
    Next,
    Prev,
    Close,
    /// The renderer finished decoding an image
    ImageReady { url: String },
}

/// Side effects requested by a transition. The caller (driver or
/// presentation layer) executes them and feeds results back as
/// messages.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Fetch one page from the listing service
    Fetch(PageRequest),
    /// Warm the image cache for these neighbors
    Preload(Vec<GalleryImage>),
}

/// Complete gallery state: items, layout, pagination, lightbox.
pub struct Gallery {
    items: Vec<GalleryItem>,
    engine: LayoutEngine,
    pager: Pager,
    classifier: Classifier,
    lightbox: Lightbox,
    last_error: Option<FetchError>,
}

impl Gallery {
    /// Gallery sized for an initial viewport width.
    pub fn new(viewport_width: u32) -> Self {
        Self::with_classifier(viewport_width, Classifier::new())
    }

    /// Same, with an injected classifier (deterministic tests).
    pub fn with_classifier(viewport_width: u32, classifier: Classifier) -> Self {
        let columns = columns_for_width(viewport_width);
        Gallery {
            items: Vec::new(),
            engine: LayoutEngine::new(columns),
            pager: Pager::new(page_size_for_columns(columns), DEFAULT_SORT_ORDER),
            classifier,
            lightbox: Lightbox::new(),
            last_error: None,
        }
    }

    /// Apply one message and return the effects it produced.
    pub fn update(&mut self, message: Message) -> Vec<Effect> {
        match message {
            Message::ViewportChanged { width } => self.on_viewport_changed(width),
            Message::ScrollNearEnd => self.request_page(),
            Message::PageLoaded(response) => self.on_page_loaded(response),
            Message::PageFailed(error) => {
                eprintln!("⚠️  Page fetch failed: {}", error);
                self.pager.fail();
                self.last_error = Some(error);
                Vec::new()
            }
            Message::Open(index) => self.on_open(index),
            Message::OpenBySlug(slug) => self.on_open_by_slug(&slug),
            Message::Next => self.on_next(),
            Message::Prev => self.on_prev(),
            Message::Close => {
                self.lightbox.close();
                Vec::new()
            }
            Message::ImageReady { url } => {
                for item in self.items.iter_mut().filter(|i| i.image.url == url) {
                    item.loading = false;
                }
                Vec::new()
            }
        }
    }

    fn on_viewport_changed(&mut self, width: u32) -> Vec<Effect> {
        let columns = columns_for_width(width);
        self.pager.set_page_size(page_size_for_columns(columns));

        if columns != self.engine.columns() {
            // Breakpoint crossed: placed coordinates are meaningless in
            // the new grid, so the layout starts over. Items and
            // pagination survive.
            println!("📐 Viewport now {} columns wide, relaying {} items", columns, self.items.len());
            self.engine.reset(columns);
            self.engine.place(&mut self.items);
        }

        if self.items.is_empty() {
            return self.request_page();
        }
        Vec::new()
    }

    fn request_page(&mut self) -> Vec<Effect> {
        match self.pager.next_request() {
            Some(request) => vec![Effect::Fetch(request)],
            None => Vec::new(),
        }
    }

    fn on_page_loaded(&mut self, response: PageResponse) -> Vec<Effect> {
        self.last_error = None;
        let fresh = self.pager.accept(&response);
        if !fresh.is_empty() {
            for image in fresh {
                let footprint = self.classifier.classify(&image);
                self.items
                    .push(GalleryItem::new(image, footprint.cols, footprint.rows));
            }
            self.engine.place(&mut self.items);
            println!("🖼️  Gallery holds {} of {} images", self.items.len(), self.pager.total_count());
        }

        // A pending deep link may live on the page that just arrived
        if self.lightbox.resolve(&self.items) {
            return self.show_current();
        }
        Vec::new()
    }

    fn on_open(&mut self, index: usize) -> Vec<Effect> {
        if index >= self.items.len() {
            return Vec::new();
        }
        let near_edge = self.lightbox.open(index, self.items.len());
        let mut effects = self.show_current();
        if near_edge && self.pager.has_more() {
            effects.extend(self.request_page());
        }
        effects
    }

    fn on_open_by_slug(&mut self, slug: &str) -> Vec<Effect> {
        match self.lightbox.open_by_slug(slug, &self.items) {
            SlugOpen::Found { near_edge } => {
                let mut effects = self.show_current();
                if near_edge && self.pager.has_more() {
                    effects.extend(self.request_page());
                }
                effects
            }
            // LookupMiss: the image is shown from its detail endpoint by
            // the presentation layer; navigation stays disabled until
            // the owning page loads
            SlugOpen::Unresolved => Vec::new(),
        }
    }

    fn on_next(&mut self) -> Vec<Effect> {
        match self.lightbox.next(self.items.len(), self.pager.has_more()) {
            NavOutcome::Stepped => {
                let mut effects = self.show_current();
                if let Some(index) = self.lightbox.current_index() {
                    if index + LOOKAHEAD_MARGIN >= self.items.len() && self.pager.has_more() {
                        effects.extend(self.request_page());
                    }
                }
                effects
            }
            NavOutcome::NeedsPage => self.request_page(),
            NavOutcome::Ignored => Vec::new(),
        }
    }

    fn on_prev(&mut self) -> Vec<Effect> {
        match self.lightbox.prev(self.items.len()) {
            NavOutcome::Stepped => self.show_current(),
            _ => Vec::new(),
        }
    }

    /// A new current image: restart its loading state (the lightbox
    /// fetches a larger render than the grid tile) and hint the renderer
    /// about its neighbors.
    fn show_current(&mut self) -> Vec<Effect> {
        let Some(index) = self.lightbox.current_index() else {
            return Vec::new();
        };
        if let Some(item) = self.items.get_mut(index) {
            item.loading = true;
        }
        let window = preload_window(index, &self.items);
        if window.is_empty() {
            Vec::new()
        } else {
            vec![Effect::Preload(window)]
        }
    }

    // Read-only snapshot for the presentation layer

    pub fn items(&self) -> &[GalleryItem] {
        &self.items
    }

    pub fn columns(&self) -> usize {
        self.engine.columns()
    }

    pub fn column_heights(&self) -> &[u32] {
        self.engine.column_heights()
    }

    pub fn current_index(&self) -> Option<usize> {
        self.lightbox.current_index()
    }

    pub fn current_item(&self) -> Option<&GalleryItem> {
        self.lightbox.current_index().and_then(|i| self.items.get(i))
    }

    pub fn lightbox_open(&self) -> bool {
        self.lightbox.is_open()
    }

    pub fn controls_enabled(&self) -> bool {
        self.lightbox.controls_enabled()
    }

    pub fn page_flip(&self) -> PageFlip {
        self.lightbox.page_flip()
    }

    pub fn loaded_count(&self) -> usize {
        self.items.len()
    }

    pub fn total_count(&self) -> u32 {
        self.pager.total_count()
    }

    pub fn has_more_pages(&self) -> bool {
        self.pager.has_more()
    }

    pub fn last_error(&self) -> Option<&FetchError> {
        self.last_error.as_ref()
    }
}

impl std::fmt::Debug for Gallery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gallery")
            .field("items", &self.items.len())
            .field("columns", &self.engine.columns())
            .field("has_more", &self.pager.has_more())
            .finish()
    }
}
