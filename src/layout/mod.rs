/// Masonry layout module
///
/// This module handles:
/// - Classifying images into grid footprints (classify.rs)
/// - Packing classified items into the column grid (engine.rs)

pub mod classify;
pub mod engine;
