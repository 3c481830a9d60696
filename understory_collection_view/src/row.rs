// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A row of items within a grid section.

use kurbo::{Point, Rect, Size};
use smallvec::SmallVec;

use crate::config::{CrossAxisAlignment, RowAlignment};
use crate::item::GridLayoutItem;
use crate::util::{Axes, mirror_x};

/// Inputs a row needs to lay itself out.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RowMetrics {
    /// Whether rows stack horizontally (items then flow along y).
    pub horizontal: bool,
    /// Extent available along the flow axis, section insets already removed.
    pub available: f64,
    /// Minimum spacing between adjacent items.
    pub spacing: f64,
    /// Distribution of leftover space along the row.
    pub alignment: RowAlignment,
    /// Placement of thin items across the row.
    pub cross_alignment: CrossAxisAlignment,
    /// Whether this is the last row of its section.
    pub last_row: bool,
}

/// An ordered run of items packed along the flow axis.
///
/// Rows with a fixed item size hold no [`GridLayoutItem`]s: their item rects
/// are computed on demand from the item count, the shared item size, and the
/// spacing resolved by [`layout_row`](Self::layout_row).
#[derive(Clone, Debug, PartialEq)]
pub struct GridLayoutRow {
    items: SmallVec<[GridLayoutItem; 4]>,
    size: Size,
    frame: Rect,
    index: usize,
    section: usize,
    first_item: usize,
    complete: bool,
    fixed_item_size: bool,
    item_count: usize,
    uniform_size: Size,
    // Fast-path geometry, row-local along the flow axis.
    leading: f64,
    pitch: f64,
    horizontal: bool,
    mirrored: bool,
    valid: bool,
}

impl GridLayoutRow {
    /// An empty row for materialized items.
    pub fn new(section: usize, index: usize, first_item: usize) -> Self {
        Self {
            items: SmallVec::new(),
            size: Size::ZERO,
            frame: Rect::ZERO,
            index,
            section,
            first_item,
            complete: false,
            fixed_item_size: false,
            item_count: 0,
            uniform_size: Size::ZERO,
            leading: 0.0,
            pitch: 0.0,
            horizontal: false,
            mirrored: false,
            valid: false,
        }
    }

    /// An empty row whose items all have `item_size`.
    pub fn with_uniform_item_size(
        section: usize,
        index: usize,
        first_item: usize,
        item_size: Size,
    ) -> Self {
        Self {
            fixed_item_size: true,
            uniform_size: item_size,
            ..Self::new(section, index, first_item)
        }
    }

    /// Materialized items; empty for fixed-size rows.
    pub fn items(&self) -> &[GridLayoutItem] {
        &self.items
    }

    /// Size of the row, valid after [`layout_row`](Self::layout_row).
    pub const fn size(&self) -> Size {
        self.size
    }

    /// Frame of the row in content coordinates.
    pub const fn frame(&self) -> Rect {
        self.frame
    }

    /// Index of the row within its section.
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Index of the owning section.
    pub const fn section(&self) -> usize {
        self.section
    }

    /// Section-relative index of the row's first item.
    pub const fn first_item(&self) -> usize {
        self.first_item
    }

    /// Whether no more items will be appended.
    pub const fn is_complete(&self) -> bool {
        self.complete
    }

    /// Mark the row complete (or reopen it).
    pub fn set_complete(&mut self, complete: bool) {
        self.complete = complete;
    }

    /// Whether the row uses the fixed item size fast path.
    pub const fn fixed_item_size(&self) -> bool {
        self.fixed_item_size
    }

    /// Number of items in the row.
    pub const fn item_count(&self) -> usize {
        self.item_count
    }

    /// Whether the row's layout is current.
    pub const fn is_valid(&self) -> bool {
        self.valid
    }

    /// Append a materialized item.
    ///
    /// On a fixed-size row the item only counts towards
    /// [`item_count`](Self::item_count); its size is ignored.
    pub fn add_item(&mut self, mut item: GridLayoutItem) {
        debug_assert!(!self.complete, "cannot add items to a complete row");
        if self.fixed_item_size {
            self.add_uniform_item();
            return;
        }
        item.section = self.section;
        item.row = self.index;
        self.items.push(item);
        self.item_count = self.items.len();
        self.valid = false;
    }

    /// Append one item of the row's uniform size.
    pub fn add_uniform_item(&mut self) {
        debug_assert!(
            self.fixed_item_size,
            "uniform items require a fixed-size row"
        );
        debug_assert!(!self.complete, "cannot add items to a complete row");
        self.item_count += 1;
        self.valid = false;
    }

    /// Mark the row's layout stale.
    pub fn invalidate(&mut self) {
        self.valid = false;
    }

    /// A deep, independent copy of the row.
    #[must_use]
    pub fn snapshot(&self) -> Self {
        self.clone()
    }

    fn natural_size(&self, index: usize) -> Size {
        if self.fixed_item_size {
            self.uniform_size
        } else {
            self.items.get(index).map_or(Size::ZERO, GridLayoutItem::size)
        }
    }

    /// Resolve item positions and the row's size.
    ///
    /// The row keeps its current origin; item frames are placed relative to it.
    pub fn layout_row(&mut self, metrics: &RowMetrics) {
        let axes = Axes::new(metrics.horizontal);
        self.horizontal = metrics.horizontal;
        let n = self.item_count;
        if n == 0 {
            self.size = Size::ZERO;
            self.frame = Rect::from_origin_size(self.frame.origin(), self.size);
            self.valid = true;
            return;
        }

        let spacing = metrics.spacing.max(0.0);
        let mut used = spacing * (n - 1) as f64;
        let mut thickness = 0.0_f64;
        for i in 0..n {
            let size = self.natural_size(i);
            used += axes.flow(size);
            thickness = thickness.max(axes.stack(size));
        }
        let leftover = (metrics.available - used).max(0.0);

        let (leading, gap) = match metrics.alignment {
            RowAlignment::Start => (0.0, 0.0),
            RowAlignment::Center => (leftover / 2.0, 0.0),
            RowAlignment::End => (leftover, 0.0),
            RowAlignment::Justify => {
                let reference = axes.flow(self.natural_size(n - 1)) + spacing;
                let virtual_items = if metrics.last_row {
                    virtual_fill(leftover, reference)
                } else {
                    0
                };
                let slots = n + virtual_items;
                if slots <= 1 {
                    (leftover / 2.0, 0.0)
                } else {
                    let spread = (leftover - virtual_items as f64 * reference).max(0.0);
                    (0.0, spread / (slots - 1) as f64)
                }
            }
        };

        let end = leading + used + gap * (n - 1) as f64;
        let flow_extent = if used <= metrics.available {
            end.min(metrics.available)
        } else {
            end
        };
        self.size = axes.size(thickness, flow_extent);
        self.frame = Rect::from_origin_size(self.frame.origin(), self.size);
        self.leading = leading;
        self.pitch = axes.flow(self.uniform_size) + spacing + gap;

        if !self.fixed_item_size {
            let factor = metrics.cross_alignment.factor();
            let mut cursor = leading;
            for i in 0..n {
                let size = self.natural_size(i);
                let cross = (thickness - axes.stack(size)) * factor;
                let local = axes.rect(cross, cursor, axes.stack(size), axes.flow(size));
                let frame = self.place(local);
                self.items[i].frame = frame;
                cursor += axes.flow(size) + spacing + gap;
            }
        }
        self.valid = true;
    }

    /// Convert a row-local rect to content coordinates.
    fn place(&self, local: Rect) -> Rect {
        let local = if self.mirrored {
            mirror_x(local, self.size.width)
        } else {
            local
        };
        local + self.frame.origin().to_vec2()
    }

    /// Move the row (and its items) so its frame starts at `origin`.
    pub fn set_origin(&mut self, origin: Point) {
        let delta = origin - self.frame.origin();
        self.frame = Rect::from_origin_size(origin, self.size);
        for item in &mut self.items {
            item.frame = item.frame + delta;
        }
    }

    /// Return to an unplaced, unmirrored state so the row can be laid out again.
    pub(crate) fn reset_placement(&mut self) {
        self.frame = Rect::ZERO;
        self.mirrored = false;
        self.valid = false;
    }

    /// Reflect the row horizontally within `[0, width]`.
    pub(crate) fn mirror(&mut self, width: f64) {
        self.frame = mirror_x(self.frame, width);
        for item in &mut self.items {
            item.frame = mirror_x(item.frame, width);
        }
        self.mirrored = !self.mirrored;
    }

    /// Frame of the row's `index`-th item.
    pub fn item_rect(&self, index: usize) -> Option<Rect> {
        if index >= self.item_count {
            return None;
        }
        if !self.fixed_item_size {
            return self.items.get(index).map(GridLayoutItem::frame);
        }
        let axes = Axes::new(self.horizontal);
        let flow = self.leading + index as f64 * self.pitch;
        let local = axes.rect(
            0.0,
            flow,
            axes.stack(self.uniform_size),
            axes.flow(self.uniform_size),
        );
        Some(self.place(local))
    }

    /// Frames of all items in row order, computed on demand for fixed-size rows.
    pub fn item_rects(&self) -> impl Iterator<Item = Rect> + '_ {
        (0..self.item_count).filter_map(move |i| self.item_rect(i))
    }
}

/// How many more items of flow extent `step` (spacing included) fit in `leftover`.
///
/// A justified last row lines up with the rows above it by pretending these
/// extra items exist.
#[allow(
    clippy::cast_possible_truncation,
    reason = "The ratio is non-negative and truncation is the intended floor"
)]
fn virtual_fill(leftover: f64, step: f64) -> usize {
    if step <= 0.0 || !leftover.is_finite() {
        return 0;
    }
    (leftover / step) as usize
}
