/// Demo shell for the masonry gallery core
///
/// Serves a synthetic photo catalog through the listing-service port,
/// pages it into the layout engine and walks the lightbox, printing the
/// resulting grid as ASCII after every step. Everything the crate
/// exposes gets exercised here; a real deployment would swap the
/// synthetic service for an HTTP client and the println calls for a
/// renderer.

use chrono::{Duration, TimeZone, Utc};

use photo_masonry::{
    format_shutter_speed, Classifier, Effect, FetchError, Gallery, GalleryController,
    GalleryImage, ImageListingService, Message, PageRequest, PageResponse, SeededRoll,
};

/// A handful of real-world aspect ratios to cycle through
const SHAPES: [(u32, u32); 7] = [
    (1600, 1067),
    (1200, 1800),
    (2048, 1365),
    (900, 1350),
    (1600, 1600),
    (2400, 1600),
    (1080, 1620),
];

/// In-memory listing service over a fixed synthetic catalog
struct DemoListing {
    catalog: Vec<GalleryImage>,
}

impl DemoListing {
    fn new(count: usize) -> Self {
        let base = Utc
            .with_ymd_and_hms(2024, 6, 1, 12, 0, 0)
            .single()
            .expect("valid demo timestamp");

        let catalog = (0..count)
            .map(|i| {
                let (width, height) = SHAPES[i % SHAPES.len()];
                let mut image =
                    GalleryImage::new(format!("https://photos.example/full/{i:03}.jpg"), width, height);
                image.slug = Some(format!("shot-{i:03}"));
                image.title = Some(format!("Shot #{i:03}"));
                image.captured_at = Some(base - Duration::days(i as i64));
                image.camera_model = Some("Z 6II".to_string());
                image.iso_speed = Some(100 * (1 + (i as u32 % 8)));
                image.aperture_f_number = Some(2.8);
                image.shutter_speed = Some(1.0 / (60.0 + (i as f32 * 10.0)));
                image
            })
            .collect();

        DemoListing { catalog }
    }
}

impl ImageListingService for DemoListing {
    async fn list(&mut self, request: &PageRequest) -> Result<PageResponse, FetchError> {
        let start = ((request.page_index - 1) * request.page_size) as usize;
        if start > self.catalog.len() {
            return Err(FetchError::Status(404));
        }
        let end = (start + request.page_size as usize).min(self.catalog.len());
        println!(
            "🌐 Serving page {} ({} images, sorted by {})",
            request.page_index,
            end - start,
            request.sort_order
        );
        Ok(PageResponse {
            items: self.catalog[start..end].to_vec(),
            total_count: self.catalog.len() as u32,
            has_next: end < self.catalog.len(),
        })
    }
}

/// Render the placed grid as ASCII, one letter per item
fn print_grid(gallery: &Gallery) {
    let columns = gallery.columns();
    let height = gallery.column_heights().iter().copied().max().unwrap_or(0) as usize;
    let mut grid = vec![vec!['.'; columns]; height];

    for (index, item) in gallery.items().iter().enumerate() {
        let Some(p) = item.placement else { continue };
        let letter = (b'A' + (index % 26) as u8) as char;
        for r in 0..item.rows as usize {
            for c in 0..item.cols as usize {
                grid[(p.row_start - 1) as usize + r][(p.column_start - 1) as usize + c] = letter;
            }
        }
    }

    println!("   ┌{}┐", "─".repeat(columns * 2 + 1));
    for row in &grid {
        let cells: String = row.iter().map(|&ch| format!("{ch} ")).collect();
        println!("   │ {cells}│");
    }
    println!("   └{}┘", "─".repeat(columns * 2 + 1));
    println!("   column heights: {:?}", gallery.column_heights());
}

fn print_effects(effects: &[Effect]) {
    for effect in effects {
        if let Effect::Preload(window) = effect {
            let names: Vec<&str> = window.iter().map(|i| i.url.as_str()).collect();
            println!("   🔥 warming cache: {names:?}");
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let listing = DemoListing::new(64);
    println!("🖼️  Masonry demo with {} synthetic images", listing.catalog.len());

    // Seeded classifier so every run shows the same featured tiles
    let gallery = Gallery::with_classifier(1280, Classifier::with_roll(Box::new(SeededRoll::new(7))));
    let mut controller = GalleryController::new(gallery, listing);

    // First measurement: 1280px maps to three columns and loads page one
    controller.dispatch(Message::ViewportChanged { width: 1280 }).await;
    println!(
        "📐 {} columns, {} of {} images loaded",
        controller.gallery().columns(),
        controller.gallery().loaded_count(),
        controller.gallery().total_count()
    );
    print_grid(controller.gallery());

    // Scroll to the bottom: the next page appends without moving
    // anything already placed
    controller.dispatch(Message::ScrollNearEnd).await;
    println!("📜 After scrolling: {} images loaded", controller.gallery().loaded_count());
    print_grid(controller.gallery());

    // Open the lightbox and step through a few images
    let effects = controller.dispatch(Message::Open(0)).await;
    print_effects(&effects);
    for _ in 0..3 {
        let effects = controller.dispatch(Message::Next).await;
        let item = controller.gallery().current_item().expect("lightbox is open");
        println!(
            "👁️  #{} {} ({}x{}, {})",
            controller.gallery().current_index().expect("lightbox is open"),
            item.image.title.as_deref().unwrap_or("untitled"),
            item.image.width,
            item.image.height,
            format_shutter_speed(item.image.shutter_speed),
        );
        print_effects(&effects);
    }
    controller.dispatch(Message::Prev).await;
    controller.dispatch(Message::Close).await;

    // Deep link to an image on a page that is not loaded yet: it shows
    // right away, but the arrows stay off until its index resolves
    controller.dispatch(Message::OpenBySlug("shot-060".to_string())).await;
    println!(
        "🔗 Deep link pending: index {:?}, arrows enabled: {}",
        controller.gallery().current_index(),
        controller.gallery().controls_enabled()
    );
    controller.dispatch(Message::ScrollNearEnd).await;
    println!(
        "🔗 Deep link resolved: index {:?}, arrows enabled: {}",
        controller.gallery().current_index(),
        controller.gallery().controls_enabled()
    );

    // Shrink to a phone: the breakpoint change relays everything into
    // one column
    controller.dispatch(Message::ViewportChanged { width: 480 }).await;
    println!("📱 Phone width: {} column", controller.gallery().columns());
    print_grid(controller.gallery());

    println!("✅ Demo complete");
}
