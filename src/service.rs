/// Listing-service port and effect driver
///
/// The gallery core never talks to the network itself; it emits fetch
/// effects and consumes page messages. This module defines the one
/// collaborator contract those effects target, the error taxonomy a
/// fetch can produce, and a small driver that pumps the effect loop on
/// behalf of a presentation layer.

use thiserror::Error;

use crate::state::data::{PageRequest, PageResponse};
use crate::state::gallery::{Effect, Gallery, Message};
use crate::viewport::Viewport;

/// Why a page fetch failed. All variants are retryable: pagination
/// state is left untouched and the next trigger re-issues the request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The request never reached the server or the connection dropped
    #[error("network error: {0}")]
    Network(String),
    /// The server answered with a non-success status
    #[error("listing service returned HTTP {0}")]
    Status(u16),
    /// The response body was not a valid listing page
    #[error("could not decode listing response: {0}")]
    Decode(String),
}

/// The image-listing collaborator. Responses must be stable-ordered
/// across calls with the same sort order, or dedup and append-only
/// layout fall apart.
pub trait ImageListingService {
    fn list(
        &mut self,
        request: &PageRequest,
    ) -> impl std::future::Future<Output = Result<PageResponse, FetchError>>;
}

/// Owns a gallery and a listing service and runs the effect loop:
/// fetch effects are executed inline, their results are fed straight
/// back into the state machine, and anything presentation-bound (the
/// preload hints) is returned to the caller.
pub struct GalleryController<S> {
    gallery: Gallery,
    service: S,
}

impl<S: ImageListingService> GalleryController<S> {
    pub fn new(gallery: Gallery, service: S) -> Self {
        GalleryController { gallery, service }
    }

    /// Controller sized from a display port measurement.
    pub fn with_viewport(viewport: &impl Viewport, service: S) -> Self {
        Self::new(Gallery::new(viewport.width()), service)
    }

    pub fn gallery(&self) -> &Gallery {
        &self.gallery
    }

    /// Apply one message, executing every fetch it (transitively)
    /// requests. Returns the presentation-bound effects.
    ///
    /// Fetches are never cancelled: a response that comes back after a
    /// state reset still merges through the identity dedup.
    pub async fn dispatch(&mut self, message: Message) -> Vec<Effect> {
        let mut queue: std::collections::VecDeque<Effect> = self.gallery.update(message).into();
        let mut presentation = Vec::new();

        while let Some(effect) = queue.pop_front() {
            match effect {
                Effect::Fetch(request) => {
                    let follow_up = match self.service.list(&request).await {
                        Ok(response) => self.gallery.update(Message::PageLoaded(response)),
                        Err(error) => self.gallery.update(Message::PageFailed(error)),
                    };
                    queue.extend(follow_up);
                }
                other => presentation.push(other),
            }
        }
        presentation
    }
}
