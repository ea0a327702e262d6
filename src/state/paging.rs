/// Pagination state for the listing service
///
/// Owns the page cursor, the in-flight guard and the identity dedup.
/// Fetching itself happens outside the core; this struct only decides
/// when a request may go out and how a response merges in.

use std::collections::HashSet;

use super::data::{GalleryImage, PageRequest, PageResponse};

/// Tracks which pages have been consumed and which images are already
/// part of the gallery.
#[derive(Debug, Clone)]
pub struct Pager {
    /// Next page to request, 1-based
    page_index: u32,
    page_size: u32,
    sort_order: String,
    in_flight: bool,
    has_more: bool,
    total_count: u32,
    /// Identity set of every image ever merged (by URL)
    seen: HashSet<String>,
}

impl Pager {
    pub fn new(page_size: u32, sort_order: impl Into<String>) -> Self {
        Pager {
            page_index: 1,
            page_size,
            sort_order: sort_order.into(),
            in_flight: false,
            has_more: true,
            total_count: 0,
            seen: HashSet::new(),
        }
    }

    /// Build the next page request, or None when a fetch is already in
    /// flight or the listing is exhausted. Marks the request in flight;
    /// duplicate triggers are ignored until it settles.
    pub fn next_request(&mut self) -> Option<PageRequest> {
        if self.in_flight || !self.has_more {
            return None;
        }
        self.in_flight = true;
        Some(PageRequest {
            page_index: self.page_index,
            page_size: self.page_size,
            sort_order: self.sort_order.clone(),
        })
    }

    /// Merge a page response, returning only the images not seen
    /// before. The cursor advances only for the response that was
    /// actually requested; a stale page (for example one resolving
    /// after a viewport reset) still merges through the dedup but
    /// leaves the cursor and the has-more signal alone.
    pub fn accept(&mut self, response: &PageResponse) -> Vec<GalleryImage> {
        let fresh: Vec<GalleryImage> = response
            .items
            .iter()
            .filter(|image| self.seen.insert(image.url.clone()))
            .cloned()
            .collect();

        self.total_count = response.total_count;
        if self.in_flight {
            self.in_flight = false;
            self.page_index += 1;
            self.has_more = response.has_next;
        }
        fresh
    }

    /// A failed fetch is retryable: only the in-flight guard clears,
    /// the cursor and the has-more signal stay untouched.
    pub fn fail(&mut self) {
        self.in_flight = false;
    }

    /// Page size follows the viewport breakpoint; takes effect on the
    /// next request.
    pub fn set_page_size(&mut self, page_size: u32) {
        self.page_size = page_size;
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn total_count(&self) -> u32 {
        self.total_count
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }
}
