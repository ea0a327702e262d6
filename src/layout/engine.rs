/// Incremental masonry layout engine
///
/// Packs an append-only list of classified items into an N-column grid
/// using a shelf/min-height heuristic. Each call only processes items
/// that have not been placed yet, so redraw cost stays proportional to
/// the new page, never to the whole gallery. Coordinates of placed
/// items are never revisited.

use crate::state::data::{GalleryItem, Placement};

/// Scoring weights for candidate selection on the open shelf.
/// Wider beats taller beats anything that pokes above the neighbors.
const WIDTH_WEIGHT: i64 = 1000;
const HEIGHT_WEIGHT: i64 = 10;
const OVERSHOOT_PENALTY: i64 = 20;

/// The widest contiguous run of columns currently sharing the minimum
/// height, plus the height of the lowest column flanking it.
#[derive(Debug, Clone, Copy)]
struct Shelf {
    start: usize,
    width: usize,
    min_height: u32,
    /// Height of the lowest flanking column; None when the shelf spans
    /// the whole grid
    ceiling: Option<u32>,
}

/// Per-column-count layout state.
///
/// Created fresh whenever the column count changes; mutated in place as
/// pages arrive. Column heights always equal the sum of `rows` over the
/// items placed in each column.
#[derive(Debug, Clone)]
pub struct LayoutEngine {
    columns: usize,
    column_heights: Vec<u32>,
    processed_count: usize,
    prefer_right_side: bool,
}

impl LayoutEngine {
    pub fn new(columns: usize) -> Self {
        let columns = columns.max(1);
        LayoutEngine {
            columns,
            column_heights: vec![0; columns],
            processed_count: 0,
            prefer_right_side: false,
        }
    }

    /// Throw away all placement state and start over with `columns`
    /// columns. Used on viewport breakpoint changes; existing items are
    /// re-laid from scratch on the next `place` call.
    pub fn reset(&mut self, columns: usize) {
        *self = LayoutEngine::new(columns);
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn column_heights(&self) -> &[u32] {
        &self.column_heights
    }

    pub fn processed_count(&self) -> usize {
        self.processed_count
    }

    /// Place every item not yet placed.
    ///
    /// Items before `processed_count` are never touched. If the list
    /// shrank below `processed_count` (external list reset), the whole
    /// state is rebuilt rather than reporting an error.
    pub fn place(&mut self, items: &mut [GalleryItem]) {
        if items.len() < self.processed_count {
            eprintln!(
                "⚠️  Item list shrank below {} processed items, resetting layout",
                self.processed_count
            );
            let columns = self.columns;
            self.reset(columns);
        }

        // Clamp the unplaced suffix to the active column count
        for item in items[self.processed_count..].iter_mut() {
            let (cols, rows) = effective_size(item.base_cols, item.base_rows, self.columns);
            item.cols = cols;
            item.rows = rows;
            item.placement = None;
        }

        let mut unplaced: Vec<usize> = (self.processed_count..items.len()).collect();

        // Livelock guard; the loop places one item per pass, so this
        // bound is never reached in practice
        let mut budget = 2 * unplaced.len() + 100;

        while !unplaced.is_empty() {
            if budget == 0 {
                eprintln!("⚠️  Layout iteration budget exhausted, {} items left", unplaced.len());
                break;
            }
            budget -= 1;

            let shelf = self.open_shelf();

            match self.pick_candidate(items, &unplaced, &shelf) {
                Some((pos, offset)) => {
                    let index = unplaced.remove(pos);
                    let column = self.choose_column(&shelf, items[index].cols, offset);
                    self.commit(&mut items[index], column, shelf.min_height);
                }
                None => {
                    // Gap: every remaining item is too wide or blocked.
                    // Force-shrink the first unplaced item to close it.
                    let index = unplaced.remove(0);
                    let item = &mut items[index];
                    if item.cols == 2 && item.rows == 4 {
                        item.cols = 1;
                        item.rows = 2;
                    } else {
                        item.cols = 1;
                        item.rows = 1;
                    }
                    self.commit(&mut items[index], shelf.start, shelf.min_height);
                }
            }
        }

        self.processed_count = items.len();
    }

    /// Find the open shelf: the widest contiguous run of columns at the
    /// minimum height. Ties go to the leftmost run.
    fn open_shelf(&self) -> Shelf {
        let min_height = self.column_heights.iter().copied().min().unwrap_or(0);

        let mut best_start = 0;
        let mut best_width = 0;
        let mut run_start = 0;
        let mut run_width = 0;
        for (col, &height) in self.column_heights.iter().enumerate() {
            if height == min_height {
                if run_width == 0 {
                    run_start = col;
                }
                run_width += 1;
                if run_width > best_width {
                    best_start = run_start;
                    best_width = run_width;
                }
            } else {
                run_width = 0;
            }
        }

        let left = (best_start > 0).then(|| self.column_heights[best_start - 1]);
        let right_edge = best_start + best_width;
        let right = (right_edge < self.columns).then(|| self.column_heights[right_edge]);
        let ceiling = match (left, right) {
            (Some(l), Some(r)) => Some(l.min(r)),
            (Some(l), None) => Some(l),
            (None, Some(r)) => Some(r),
            (None, None) => None,
        };

        Shelf {
            start: best_start,
            width: best_width,
            min_height,
            ceiling,
        }
    }

    /// Pick the best-scoring unplaced item that fits the shelf and
    /// violates no adjacency constraint. Returns the position within
    /// `unplaced` plus a fixed column offset for tall 1-wide items.
    /// Ties favor the earliest-indexed item.
    fn pick_candidate(
        &self,
        items: &[GalleryItem],
        unplaced: &[usize],
        shelf: &Shelf,
    ) -> Option<(usize, Option<usize>)> {
        let mut best: Option<(usize, Option<usize>, i64)> = None;

        for (pos, &index) in unplaced.iter().enumerate() {
            let item = &items[index];
            if item.cols as usize > shelf.width {
                continue;
            }
            if item.cols >= 2 && self.wide_span_collides(items, shelf.min_height, item.rows) {
                continue;
            }
            let offset = if item.cols == 1 && item.rows >= 2 {
                match self.tall_item_offset(items, shelf, item.rows) {
                    Some(column) => Some(column),
                    None => continue,
                }
            } else {
                None
            };

            let score = score(item, shelf);
            if best.map_or(true, |(_, _, s)| score > s) {
                best = Some((pos, offset, score));
            }
        }

        best.map(|(pos, offset, _)| (pos, offset))
    }

    /// Constraint: a multi-column item may not share any row span with
    /// another placed multi-column item, anywhere in the grid.
    fn wide_span_collides(&self, items: &[GalleryItem], row: u32, rows: u32) -> bool {
        items.iter().any(|placed| {
            placed.cols >= 2
                && placed
                    .placement
                    .map_or(false, |p| spans_overlap(row, rows, p.row_start - 1, placed.rows))
        })
    }

    /// Constraint: a 1-wide tall item needs a column whose immediate
    /// neighbors hold no tall item overlapping its row span. Returns the
    /// first valid column within the shelf.
    fn tall_item_offset(&self, items: &[GalleryItem], shelf: &Shelf, rows: u32) -> Option<usize> {
        (shelf.start..shelf.start + shelf.width).find(|&column| {
            !items.iter().any(|placed| {
                let Some(p) = placed.placement else {
                    return false;
                };
                if placed.rows < 2 {
                    return false;
                }
                let first = (p.column_start - 1) as usize;
                let last = first + placed.cols as usize - 1;
                let neighbors = (column > 0 && last == column - 1) || first == column + 1;
                neighbors && spans_overlap(shelf.min_height, rows, p.row_start - 1, placed.rows)
            })
        })
    }

    /// Horizontal position within the shelf. Tall items bring their own
    /// offset; wide items alternate left/right to keep the grid from
    /// leaning; everything else hugs the left end of the shelf.
    fn choose_column(&mut self, shelf: &Shelf, cols: u32, offset: Option<usize>) -> usize {
        if let Some(column) = offset {
            return column;
        }
        if cols >= 2 {
            let column = if self.prefer_right_side {
                shelf.start + shelf.width - cols as usize
            } else {
                shelf.start
            };
            // The alternation flag only tracks wide tiles in 3+ column
            // grids; narrower grids have no horizontal slack to balance
            if cols == 2 && self.columns >= 3 {
                self.prefer_right_side = column == 0;
            }
            return column;
        }
        shelf.start
    }

    /// Write coordinates and grow the occupied columns.
    fn commit(&mut self, item: &mut GalleryItem, column: usize, row: u32) {
        item.placement = Some(Placement {
            column_start: column as u32 + 1,
            row_start: row + 1,
        });
        for height in self.column_heights[column..column + item.cols as usize].iter_mut() {
            *height += item.rows;
        }
    }
}

/// Clamp a base footprint to the active column count. Single-column
/// grids collapse wide tiles to one column with half the rows.
fn effective_size(base_cols: u32, base_rows: u32, columns: usize) -> (u32, u32) {
    if columns == 1 && base_cols > 1 {
        (1, base_rows.div_ceil(2))
    } else {
        (base_cols.min(columns as u32), base_rows)
    }
}

fn spans_overlap(a_start: u32, a_len: u32, b_start: u32, b_len: u32) -> bool {
    a_start < b_start + b_len && b_start < a_start + a_len
}

/// Flat-top scoring: prefer wide items, then tall ones, and penalize a
/// placement that would protrude above the shelf's flanking columns.
/// Overshoot only applies when the item fills the shelf; a partial fill
/// leaves the shelf open at the same height.
fn score(item: &GalleryItem, shelf: &Shelf) -> i64 {
    let overshoot = if item.cols as usize == shelf.width {
        match shelf.ceiling {
            Some(ceiling) => (shelf.min_height + item.rows).saturating_sub(ceiling) as i64,
            None => 0,
        }
    } else {
        0
    };
    item.cols as i64 * WIDTH_WEIGHT + item.rows as i64 * HEIGHT_WEIGHT - overshoot * OVERSHOOT_PENALTY
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::data::{GalleryImage, GalleryItem};

    fn items(footprints: &[(u32, u32)]) -> Vec<GalleryItem> {
        footprints
            .iter()
            .enumerate()
            .map(|(i, &(cols, rows))| {
                GalleryItem::new(GalleryImage::new(format!("img-{i}"), 600, 400), cols, rows)
            })
            .collect()
    }

    /// Every (column, row) cell occupied by every placed item, with
    /// duplicate detection
    fn occupied_cells(placed: &[GalleryItem]) -> Vec<(u32, u32)> {
        let mut cells = Vec::new();
        for it in placed {
            let p = it.placement.expect("item not placed");
            for c in 0..it.cols {
                for r in 0..it.rows {
                    cells.push((p.column_start - 1 + c, p.row_start - 1 + r));
                }
            }
        }
        cells
    }

    fn assert_no_overlap(placed: &[GalleryItem]) {
        let mut cells = occupied_cells(placed);
        let total = cells.len();
        cells.sort_unstable();
        cells.dedup();
        assert_eq!(cells.len(), total, "two items share a grid cell");
    }

    fn assert_heights_consistent(engine: &LayoutEngine, placed: &[GalleryItem]) {
        let mut expected = vec![0u32; engine.columns()];
        for it in placed {
            let p = it.placement.expect("item not placed");
            for c in 0..it.cols as usize {
                expected[(p.column_start - 1) as usize + c] += it.rows;
            }
        }
        assert_eq!(engine.column_heights(), expected.as_slice());
    }

    #[test]
    fn test_flatness_on_reference_scenario() {
        // 3 columns, 6 items: the flat-top heuristic must end within one
        // row of level
        let mut engine = LayoutEngine::new(3);
        let mut list = items(&[(1, 1), (1, 1), (2, 2), (1, 2), (1, 1), (1, 1)]);
        engine.place(&mut list);

        assert_no_overlap(&list);
        assert_heights_consistent(&engine, &list);

        let max = *engine.column_heights().iter().max().unwrap();
        let min = *engine.column_heights().iter().min().unwrap();
        assert!(max - min <= 1, "columns not flat: {:?}", engine.column_heights());
    }

    #[test]
    fn test_append_only_placement() {
        let mut engine = LayoutEngine::new(3);
        let mut list = items(&[(1, 1), (2, 2), (1, 2), (1, 1)]);
        engine.place(&mut list);
        let first_pass: Vec<_> = list.iter().map(|i| i.placement).collect();

        list.extend(items(&[(1, 1), (2, 4), (1, 1)]));
        engine.place(&mut list);

        for (before, after) in first_pass.iter().zip(list.iter()) {
            assert_eq!(*before, after.placement, "placed coordinates changed");
        }
        assert!(list.iter().all(|i| i.is_placed()));
        assert_no_overlap(&list);
        assert_heights_consistent(&engine, &list);
    }

    #[test]
    fn test_single_column_collapses_wide_items() {
        let mut engine = LayoutEngine::new(1);
        let mut list = items(&[(2, 4), (2, 2), (1, 2), (1, 1)]);
        engine.place(&mut list);

        assert_eq!((list[0].cols, list[0].rows), (1, 2));
        assert_eq!((list[1].cols, list[1].rows), (1, 1));
        assert_eq!((list[2].cols, list[2].rows), (1, 2));
        // everything stacks in the only column, in selection order
        assert!(list.iter().all(|i| i.placement.unwrap().column_start == 1));
        assert_heights_consistent(&engine, &list);
    }

    #[test]
    fn test_gap_forcing_shrinks_blocked_item() {
        // Two featured 2x4 tiles in a 4-column grid: the second may not
        // share rows with the first, leaving no legal wide slot, so it
        // is forced down to 1x2
        let mut engine = LayoutEngine::new(4);
        let mut list = items(&[(2, 4), (2, 4)]);
        engine.place(&mut list);

        assert_eq!((list[0].cols, list[0].rows), (2, 4));
        assert_eq!((list[1].cols, list[1].rows), (1, 2));
        assert!(list.iter().all(|i| i.is_placed()));
        assert_no_overlap(&list);
    }

    #[test]
    fn test_gap_forcing_shrinks_to_single_cell() {
        // A 2x2 blocked by an overlapping wide span is forced to 1x1
        let mut engine = LayoutEngine::new(4);
        let mut list = items(&[(2, 2), (2, 2)]);
        engine.place(&mut list);

        assert_eq!((list[0].cols, list[0].rows), (2, 2));
        assert_eq!((list[1].cols, list[1].rows), (1, 1));
        assert_no_overlap(&list);
    }

    #[test]
    fn test_tall_item_waits_for_legal_offset() {
        // The 2x2 fills columns 1-2 first; the tall single is blocked
        // beside it and only lands once the shelf clears the wide tile
        let mut engine = LayoutEngine::new(3);
        let mut list = items(&[(2, 2), (1, 1), (1, 1), (1, 2)]);
        engine.place(&mut list);

        let tall = list[3].placement.unwrap();
        assert_eq!((list[3].cols, list[3].rows), (1, 2));
        assert_eq!(tall.row_start, 3, "tall single should start below the wide tile");
        assert_no_overlap(&list);
        assert_heights_consistent(&engine, &list);
    }

    #[test]
    fn test_blocked_tall_single_is_forced_smaller() {
        // With nothing else to place, the only open column sits beside
        // the wide tile, so the tall single shrinks to 1x1 instead
        let mut engine = LayoutEngine::new(3);
        let mut list = items(&[(2, 2), (1, 2)]);
        engine.place(&mut list);

        assert_eq!((list[1].cols, list[1].rows), (1, 1));
        assert_eq!(list[1].placement.unwrap().column_start, 3);
        assert_no_overlap(&list);
    }

    #[test]
    fn test_wide_placement_alternates_sides() {
        let mut engine = LayoutEngine::new(4);
        // Interleave enough singles so consecutive wides find a full-width shelf
        let mut list = items(&[
            (2, 2),
            (1, 1), (1, 1), (1, 1), (1, 1), (1, 1), (1, 1),
            (2, 2),
        ]);
        engine.place(&mut list);

        let first = list[0].placement.unwrap();
        let second = list[7].placement.unwrap();
        assert_eq!(first.column_start, 1, "first wide tile should hug the left edge");
        assert!(second.column_start > 1, "second wide tile should move off the left edge");
        assert_no_overlap(&list);
    }

    #[test]
    fn test_termination_on_mixed_input() {
        // A worst-case mix across every supported column count must
        // always place every item
        let footprints = [(1, 1), (2, 2), (1, 2), (2, 4), (1, 1), (2, 2), (2, 4), (1, 2)];
        for columns in 1..=4 {
            let mut engine = LayoutEngine::new(columns);
            let mut list: Vec<GalleryItem> = (0..40)
                .map(|i| {
                    let (c, r) = footprints[i % footprints.len()];
                    GalleryItem::new(GalleryImage::new(format!("t-{i}"), 400, 300), c, r)
                })
                .collect();
            engine.place(&mut list);
            assert!(list.iter().all(|i| i.is_placed()), "unplaced items at {columns} columns");
            assert_no_overlap(&list);
            assert_heights_consistent(&engine, &list);
            assert_eq!(engine.processed_count(), list.len());
        }
    }

    #[test]
    fn test_shrunken_list_triggers_full_reset() {
        let mut engine = LayoutEngine::new(3);
        let mut list = items(&[(1, 1), (1, 1), (1, 1), (1, 1)]);
        engine.place(&mut list);
        assert_eq!(engine.processed_count(), 4);

        // external list reset: fewer items than processed
        let mut shorter = items(&[(1, 1), (1, 1)]);
        engine.place(&mut shorter);

        assert_eq!(engine.processed_count(), 2);
        assert!(shorter.iter().all(|i| i.is_placed()));
        assert_heights_consistent(&engine, &shorter);
    }

    #[test]
    fn test_heights_never_decrease_across_calls() {
        let mut engine = LayoutEngine::new(3);
        let mut list = items(&[(1, 1), (2, 2), (1, 2)]);
        engine.place(&mut list);
        let before = engine.column_heights().to_vec();

        list.extend(items(&[(1, 1), (1, 1)]));
        engine.place(&mut list);

        for (b, a) in before.iter().zip(engine.column_heights()) {
            assert!(a >= b, "column height decreased: {before:?} -> {:?}", engine.column_heights());
        }
    }

    #[test]
    fn test_effective_size_clamping() {
        assert_eq!(effective_size(2, 4, 1), (1, 2));
        assert_eq!(effective_size(2, 2, 1), (1, 1));
        assert_eq!(effective_size(1, 2, 1), (1, 2));
        assert_eq!(effective_size(2, 2, 2), (2, 2));
        assert_eq!(effective_size(2, 4, 4), (2, 4));
    }
}
