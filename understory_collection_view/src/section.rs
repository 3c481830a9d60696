// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A section of the grid: header, rows of items, footer.

use alloc::sync::Arc;
use alloc::vec::Vec;
use core::num::NonZeroUsize;

use kurbo::{Insets, Point, Rect, Size};

use crate::config::RowAlignmentOptions;
use crate::item::GridLayoutItem;
use crate::row::{GridLayoutRow, RowMetrics};
use crate::util::{Axes, clamp_to, intersects, mirror_x};

/// Grid-wide parameters a section is laid out with.
#[derive(Clone, Copy, Debug)]
pub(crate) struct SectionLayout {
    pub(crate) horizontal: bool,
    pub(crate) dimension: f64,
    pub(crate) alignment: RowAlignmentOptions,
    /// Offset along the stacking axis where the section begins.
    pub(crate) origin: f64,
}

/// Inputs the current rows were packed with.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Packing {
    horizontal: bool,
    available: f64,
}

/// One section of a [`GridLayoutInfo`](crate::GridLayoutInfo).
///
/// A section owns its rows. Item sizing is either uniform, in which case rows
/// derive item rects arithmetically, or per item, in which case each row
/// materializes [`GridLayoutItem`]s.
///
/// Along the stacking axis a section is laid out as: header, leading inset,
/// rows separated by line spacing, trailing inset, footer. Across it, the
/// section spans at least the grid's dimension.
///
/// Rows and items are kept across re-layouts; they are only rebuilt when the
/// items, spacing, insets, axis, or available extent change.
#[derive(Clone, Debug, PartialEq)]
pub struct GridLayoutSection {
    index: usize,
    rows: Vec<GridLayoutRow>,
    frame: Rect,
    header_frame: Rect,
    footer_frame: Rect,
    floating_header_frame: Rect,
    floating_footer_frame: Rect,
    header_dimension: f64,
    footer_dimension: f64,
    insets: Insets,
    interitem_spacing: f64,
    line_spacing: f64,
    fixed_item_size: bool,
    item_size: Size,
    item_sizes: Vec<Size>,
    item_count: usize,
    items_per_row: usize,
    index_of_incomplete_row: Option<usize>,
    decoration_kind: Option<Arc<str>>,
    packing: Option<Packing>,
    valid: bool,
}

impl GridLayoutSection {
    /// An empty section at `index`.
    pub fn new(index: usize) -> Self {
        Self {
            index,
            rows: Vec::new(),
            frame: Rect::ZERO,
            header_frame: Rect::ZERO,
            footer_frame: Rect::ZERO,
            floating_header_frame: Rect::ZERO,
            floating_footer_frame: Rect::ZERO,
            header_dimension: 0.0,
            footer_dimension: 0.0,
            insets: Insets::ZERO,
            interitem_spacing: 0.0,
            line_spacing: 0.0,
            fixed_item_size: false,
            item_size: Size::ZERO,
            item_sizes: Vec::new(),
            item_count: 0,
            items_per_row: 0,
            index_of_incomplete_row: None,
            decoration_kind: None,
            packing: None,
            valid: false,
        }
    }

    /// Index of the section within its grid.
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Rows, valid after layout.
    pub fn rows(&self) -> &[GridLayoutRow] {
        &self.rows
    }

    /// Frame of the whole section including header and footer.
    pub const fn frame(&self) -> Rect {
        self.frame
    }

    /// Header frame at rest.
    pub const fn header_frame(&self) -> Rect {
        self.header_frame
    }

    /// Footer frame at rest.
    pub const fn footer_frame(&self) -> Rect {
        self.footer_frame
    }

    /// Header frame pinned to the visible rect.
    ///
    /// Equal to [`header_frame`](Self::header_frame) unless the grid uses
    /// floating headers and footers.
    pub const fn floating_header_frame(&self) -> Rect {
        self.floating_header_frame
    }

    /// Footer frame pinned to the visible rect.
    pub const fn floating_footer_frame(&self) -> Rect {
        self.floating_footer_frame
    }

    /// Header extent along the stacking axis.
    pub const fn header_dimension(&self) -> f64 {
        self.header_dimension
    }

    /// Footer extent along the stacking axis.
    pub const fn footer_dimension(&self) -> f64 {
        self.footer_dimension
    }

    /// Insets around the section's rows.
    pub const fn insets(&self) -> Insets {
        self.insets
    }

    /// Whether items share one size.
    pub const fn fixed_item_size(&self) -> bool {
        self.fixed_item_size
    }

    /// Number of items in the section.
    pub const fn item_count(&self) -> usize {
        self.item_count
    }

    /// Items per row for uniform sections; zero otherwise.
    pub const fn items_per_row(&self) -> usize {
        self.items_per_row
    }

    /// Index of the trailing, not yet complete row.
    pub const fn index_of_incomplete_row(&self) -> Option<usize> {
        self.index_of_incomplete_row
    }

    /// Kind of the decoration view spanning the section, if any.
    pub fn decoration_kind(&self) -> Option<&Arc<str>> {
        self.decoration_kind.as_ref()
    }

    /// Whether the section's layout is current.
    pub const fn is_valid(&self) -> bool {
        self.valid
    }

    /// Mark the section's layout stale.
    pub fn invalidate(&mut self) {
        self.valid = false;
    }

    /// Set header and footer extents. Negative and NaN extents become zero.
    pub fn set_header_footer(&mut self, header: f64, footer: f64) {
        self.header_dimension = header.max(0.0);
        self.footer_dimension = footer.max(0.0);
        self.valid = false;
    }

    /// Set insets around the rows.
    pub fn set_insets(&mut self, insets: Insets) {
        if self.insets != insets {
            self.insets = insets;
            self.packing = None;
        }
        self.valid = false;
    }

    /// Set spacing between items in a row and between rows. Negative and NaN
    /// spacings become zero.
    pub fn set_spacing(&mut self, interitem: f64, line: f64) {
        let interitem = interitem.max(0.0);
        if self.interitem_spacing != interitem {
            self.interitem_spacing = interitem;
            self.packing = None;
        }
        self.line_spacing = line.max(0.0);
        self.valid = false;
    }

    /// Use `count` items that all have `size`.
    pub fn set_uniform_items(&mut self, count: usize, size: Size) {
        if !self.fixed_item_size || self.item_count != count || self.item_size != size {
            self.packing = None;
        }
        self.fixed_item_size = true;
        self.item_size = size;
        self.item_sizes.clear();
        self.item_count = count;
        self.valid = false;
    }

    /// Use one item per entry of `sizes`.
    pub fn set_item_sizes(&mut self, sizes: Vec<Size>) {
        if self.fixed_item_size || self.item_sizes != sizes {
            self.packing = None;
        }
        self.fixed_item_size = false;
        self.item_size = Size::ZERO;
        self.item_count = sizes.len();
        self.item_sizes = sizes;
        self.valid = false;
    }

    /// Set the decoration view kind.
    pub fn set_decoration_kind(&mut self, kind: Option<Arc<str>>) {
        self.decoration_kind = kind;
    }

    pub(crate) fn set_index(&mut self, index: usize) {
        if self.index != index {
            self.index = index;
            self.packing = None;
        }
    }

    /// Pack items into rows and resolve every frame.
    pub(crate) fn compute_layout(&mut self, params: &SectionLayout) {
        let axes = Axes::new(params.horizontal);
        let (flow_lead, flow_trail) = axes.flow_insets(self.insets);
        let (stack_lead, stack_trail) = axes.stack_insets(self.insets);
        let available = (params.dimension - flow_lead - flow_trail).max(0.0);

        let packing = Packing {
            horizontal: params.horizontal,
            available,
        };
        if self.packing == Some(packing) {
            for row in &mut self.rows {
                row.reset_placement();
            }
        } else {
            if self.fixed_item_size {
                self.pack_uniform(axes, available);
            } else {
                self.pack_items(axes, available);
            }
            self.packing = Some(packing);
        }
        self.index_of_incomplete_row = self.rows.len().checked_sub(1);

        let origin = params.origin;
        let mut cursor = origin + self.header_dimension + stack_lead;
        let mut widest = 0.0_f64;
        let row_count = self.rows.len();
        for (r, row) in self.rows.iter_mut().enumerate() {
            if r > 0 {
                cursor += self.line_spacing;
            }
            let last_row = r + 1 == row_count;
            row.layout_row(&RowMetrics {
                horizontal: params.horizontal,
                available,
                spacing: self.interitem_spacing,
                alignment: params.alignment.for_row(last_row),
                cross_alignment: params.alignment.cross_axis,
                last_row,
            });
            row.set_origin(axes.point(cursor, flow_lead));
            cursor += axes.stack(row.size());
            widest = widest.max(axes.flow(row.size()));
        }

        let body_end = cursor + stack_trail;
        let end = body_end + self.footer_dimension;
        let cross = params.dimension.max(widest + flow_lead + flow_trail);
        self.frame = axes.rect(origin, 0.0, end - origin, cross);
        self.header_frame = axes.rect(origin, 0.0, self.header_dimension, cross);
        self.footer_frame = axes.rect(body_end, 0.0, self.footer_dimension, cross);
        self.floating_header_frame = self.header_frame;
        self.floating_footer_frame = self.footer_frame;
        self.valid = true;
    }

    fn pack_uniform(&mut self, axes: Axes, available: f64) {
        self.rows.clear();
        self.items_per_row = if self.item_count == 0 {
            0
        } else {
            uniform_items_per_row(
                axes.flow(self.item_size),
                self.interitem_spacing,
                available,
                self.item_count,
            )
        };
        let Some(per_row) = NonZeroUsize::new(self.items_per_row) else {
            return;
        };
        let mut first = 0;
        while first < self.item_count {
            let mut row = GridLayoutRow::with_uniform_item_size(
                self.index,
                self.rows.len(),
                first,
                self.item_size,
            );
            let in_row = per_row.get().min(self.item_count - first);
            for _ in 0..in_row {
                row.add_uniform_item();
            }
            first += in_row;
            row.set_complete(first < self.item_count);
            self.rows.push(row);
        }
    }

    fn pack_items(&mut self, axes: Axes, available: f64) {
        self.rows.clear();
        self.items_per_row = 0;
        let mut row = GridLayoutRow::new(self.index, 0, 0);
        let mut used = 0.0;
        for (i, size) in self.item_sizes.iter().enumerate() {
            let extent = axes.flow(*size);
            let next = if row.item_count() == 0 {
                extent
            } else {
                used + self.interitem_spacing + extent
            };
            // An item that does not fit starts a new row; an oversize item
            // still gets a row of its own.
            if row.item_count() > 0 && next > available {
                row.set_complete(true);
                let index = self.rows.len() + 1;
                self.rows
                    .push(core::mem::replace(&mut row, GridLayoutRow::new(self.index, index, i)));
                used = extent;
            } else {
                used = next;
            }
            row.add_item(GridLayoutItem::new(self.index, *size));
        }
        if row.item_count() > 0 {
            self.rows.push(row);
        }
    }

    /// Frame of the item at section-relative `item`.
    pub fn frame_for_item(&self, item: usize) -> Option<Rect> {
        if item >= self.item_count {
            return None;
        }
        if self.fixed_item_size {
            let per_row = NonZeroUsize::new(self.items_per_row)?;
            let row = self.rows.get(item / per_row)?;
            return row.item_rect(item % per_row);
        }
        let row = self.row_for_item(item)?;
        row.item_rect(item - row.first_item())
    }

    fn row_for_item(&self, item: usize) -> Option<&GridLayoutRow> {
        let r = self
            .rows
            .partition_point(|row| row.first_item() <= item)
            .checked_sub(1)?;
        self.rows.get(r)
    }

    /// Frames of all items in index order.
    pub fn item_frames(&self) -> impl Iterator<Item = Rect> + '_ {
        self.rows.iter().flat_map(GridLayoutRow::item_rects)
    }

    /// Section-relative indices and frames of the items intersecting `rect`.
    pub fn item_frames_in_rect(&self, rect: Rect) -> impl Iterator<Item = (usize, Rect)> + '_ {
        self.rows
            .iter()
            .filter(move |row| intersects(row.frame(), rect))
            .flat_map(move |row| {
                row.item_rects()
                    .enumerate()
                    .map(move |(i, frame)| (row.first_item() + i, frame))
                    .filter(move |(_, frame)| intersects(*frame, rect))
            })
    }

    /// Section-relative index of the item containing `point`.
    pub fn item_at_point(&self, point: Point) -> Option<usize> {
        let row = self.rows.iter().find(|row| row.frame().contains(point))?;
        row.item_rects()
            .position(|frame| frame.contains(point))
            .map(|i| row.first_item() + i)
    }

    /// Reflect every frame horizontally within `[0, width]`.
    pub(crate) fn mirror(&mut self, width: f64) {
        self.frame = mirror_x(self.frame, width);
        self.header_frame = mirror_x(self.header_frame, width);
        self.footer_frame = mirror_x(self.footer_frame, width);
        self.floating_header_frame = mirror_x(self.floating_header_frame, width);
        self.floating_footer_frame = mirror_x(self.floating_footer_frame, width);
        for row in &mut self.rows {
            row.mirror(width);
        }
    }

    /// Pin the header and footer to `visible` without touching the rows.
    ///
    /// The header follows the leading edge of `visible` and the footer its
    /// trailing edge, both clamped to the section's frame. `mirror_width` is
    /// the content width when frames have been mirrored.
    pub(crate) fn restick(&mut self, visible: Rect, horizontal: bool, mirror_width: Option<f64>) {
        let unmirror = |rect: Rect| match mirror_width {
            Some(width) => mirror_x(rect, width),
            None => rect,
        };
        let axes = Axes::new(horizontal);
        let frame = unmirror(self.frame);
        let visible = unmirror(visible);
        let header = unmirror(self.header_frame);
        let footer = unmirror(self.footer_frame);
        let start = axes.stack_start(frame);
        let end = axes.stack_end(frame);

        let header_at = clamp_to(axes.stack_start(visible), start, end - self.header_dimension);
        let footer_at = clamp_to(
            axes.stack_end(visible) - self.footer_dimension,
            start,
            end - self.footer_dimension,
        );
        self.floating_header_frame =
            unmirror(header + axes.stack_offset(header_at - axes.stack_start(header)));
        self.floating_footer_frame =
            unmirror(footer + axes.stack_offset(footer_at - axes.stack_start(footer)));
    }

    /// Return the header and footer to their rest positions.
    pub(crate) fn unstick(&mut self) {
        self.floating_header_frame = self.header_frame;
        self.floating_footer_frame = self.footer_frame;
    }

    /// A deep, independent copy of the section.
    #[must_use]
    pub fn snapshot(&self) -> Self {
        self.clone()
    }
}

/// The most items of flow extent `extent` that fit in `available`, at least
/// one and at most `count`.
#[allow(
    clippy::cast_possible_truncation,
    reason = "The ratio is clamped to the item count immediately after the cast"
)]
fn uniform_items_per_row(extent: f64, spacing: f64, available: f64, count: usize) -> usize {
    let step = extent + spacing;
    if step <= 0.0 {
        return count;
    }
    let ratio = (available + spacing) / step;
    if !ratio.is_finite() || ratio < 1.0 {
        return 1;
    }
    (ratio as usize).clamp(1, count)
}
