/// Item footprint classification
///
/// Decides how many grid cells an image occupies before the layout
/// engine ever sees it. Portrait images get a double-height tile, and a
/// small share of items is promoted to a "featured" double-width tile
/// for visual emphasis. Two featured items never appear back to back.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::state::data::GalleryImage;

/// Share of items promoted to a featured tile
const FEATURED_RATE: f64 = 0.2;

/// Base footprint of an item in grid cells
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Footprint {
    pub cols: u32,
    pub rows: u32,
}

/// Source of the featured-promotion roll.
///
/// The production source is unseeded randomness; tests inject a
/// deterministic one so classification outcomes can be pinned.
pub trait RollSource {
    /// Returns true when the next eligible item should be featured
    fn featured_roll(&mut self) -> bool;
}

/// Unseeded random roll at the configured featured rate
pub struct RandomRoll {
    rate: f64,
}

impl RandomRoll {
    pub fn new() -> Self {
        RandomRoll { rate: FEATURED_RATE }
    }
}

impl Default for RandomRoll {
    fn default() -> Self {
        Self::new()
    }
}

impl RollSource for RandomRoll {
    fn featured_roll(&mut self) -> bool {
        rand::thread_rng().gen_bool(self.rate)
    }
}

/// Seeded roll for reproducible classification sequences
pub struct SeededRoll {
    rng: StdRng,
    rate: f64,
}

impl SeededRoll {
    pub fn new(seed: u64) -> Self {
        SeededRoll {
            rng: StdRng::seed_from_u64(seed),
            rate: FEATURED_RATE,
        }
    }
}

impl RollSource for SeededRoll {
    fn featured_roll(&mut self) -> bool {
        self.rng.gen_bool(self.rate)
    }
}

/// Roll that always answers the same; pins tests to one branch
pub struct ConstantRoll(pub bool);

impl RollSource for ConstantRoll {
    fn featured_roll(&mut self) -> bool {
        self.0
    }
}

/// Classifies incoming images into grid footprints.
///
/// Holds the sequential "last item was featured" state, so one
/// classifier instance must see the item stream in order.
pub struct Classifier {
    roll: Box<dyn RollSource + Send>,
    last_featured: bool,
}

impl Classifier {
    /// Classifier with the production (unseeded) roll source
    pub fn new() -> Self {
        Self::with_roll(Box::new(RandomRoll::new()))
    }

    pub fn with_roll(roll: Box<dyn RollSource + Send>) -> Self {
        Classifier {
            roll,
            last_featured: false,
        }
    }

    /// Decide the base footprint for one image.
    ///
    /// Portrait images are 1x2, landscape 1x1. An eligible item has a
    /// 20% chance of promotion to featured: landscape becomes 2x2,
    /// portrait 2x4. An item directly after a featured one is never
    /// promoted.
    pub fn classify(&mut self, image: &GalleryImage) -> Footprint {
        let portrait = image.is_portrait();

        if !self.last_featured && self.roll.featured_roll() {
            self.last_featured = true;
            return if portrait {
                Footprint { cols: 2, rows: 4 }
            } else {
                Footprint { cols: 2, rows: 2 }
            };
        }

        self.last_featured = false;
        Footprint {
            cols: 1,
            rows: if portrait { 2 } else { 1 },
        }
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Classifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Classifier")
            .field("last_featured", &self.last_featured)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn landscape() -> GalleryImage {
        GalleryImage::new("l", 600, 400)
    }

    fn portrait() -> GalleryImage {
        GalleryImage::new("p", 400, 600)
    }

    #[test]
    fn test_base_footprints_without_promotion() {
        let mut classifier = Classifier::with_roll(Box::new(ConstantRoll(false)));
        assert_eq!(classifier.classify(&landscape()), Footprint { cols: 1, rows: 1 });
        assert_eq!(classifier.classify(&portrait()), Footprint { cols: 1, rows: 2 });
    }

    #[test]
    fn test_featured_footprints() {
        let mut classifier = Classifier::with_roll(Box::new(ConstantRoll(true)));
        assert_eq!(classifier.classify(&landscape()), Footprint { cols: 2, rows: 2 });
        // the item right after a featured one is demoted to its base size
        assert_eq!(classifier.classify(&portrait()), Footprint { cols: 1, rows: 2 });
        // eligibility returns after one non-featured item
        assert_eq!(classifier.classify(&portrait()), Footprint { cols: 2, rows: 4 });
    }

    #[test]
    fn test_no_two_consecutive_featured() {
        let mut classifier = Classifier::with_roll(Box::new(SeededRoll::new(42)));
        let mut prev_featured = false;
        for _ in 0..500 {
            let fp = classifier.classify(&landscape());
            let featured = fp.cols == 2;
            assert!(!(featured && prev_featured), "two featured items in a row");
            prev_featured = featured;
        }
    }

    #[test]
    fn test_featured_rate_is_bounded() {
        let mut classifier = Classifier::with_roll(Box::new(SeededRoll::new(7)));
        let featured = (0..1000)
            .filter(|_| classifier.classify(&landscape()).cols == 2)
            .count();
        // ~20% nominal, reduced a little by the no-consecutive rule
        assert!(featured > 100, "featured rate collapsed: {featured}/1000");
        assert!(featured < 300, "featured rate exploded: {featured}/1000");
    }
}
