// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Capabilities the cache consumes: item counts and item sizing.

use alloc::sync::Arc;
use alloc::vec::Vec;

use kurbo::{Insets, Size};

use crate::index_path::IndexPath;

/// Reports how many sections and items a collection has.
///
/// Answers must stay the same between two invalidations of the cache that
/// reads them.
pub trait DataSource {
    /// Number of sections.
    fn number_of_sections(&self) -> usize;

    /// Number of items in `section`. Only called for `section < number_of_sections()`.
    fn number_of_items(&self, section: usize) -> usize;
}

impl<T: DataSource + ?Sized> DataSource for &T {
    fn number_of_sections(&self) -> usize {
        (**self).number_of_sections()
    }

    fn number_of_items(&self, section: usize) -> usize {
        (**self).number_of_items(section)
    }
}

/// A slice of per-section item counts.
impl DataSource for [usize] {
    fn number_of_sections(&self) -> usize {
        self.len()
    }

    fn number_of_items(&self, section: usize) -> usize {
        self.get(section).copied().unwrap_or(0)
    }
}

impl<const N: usize> DataSource for [usize; N] {
    fn number_of_sections(&self) -> usize {
        N
    }

    fn number_of_items(&self, section: usize) -> usize {
        self.as_slice().number_of_items(section)
    }
}

impl DataSource for Vec<usize> {
    fn number_of_sections(&self) -> usize {
        self.len()
    }

    fn number_of_items(&self, section: usize) -> usize {
        self.as_slice().number_of_items(section)
    }
}

/// Sizing policy for the grid: the natural size of each item plus
/// per-section spacing, insets, and header/footer extents.
///
/// Only [`item_size`](Self::item_size) is required. Returning `Some` from
/// [`uniform_item_size`](Self::uniform_item_size) switches the section to the
/// fixed-size fast path, where rows derive item rects arithmetically and
/// `item_size` is never consulted.
pub trait FlowLayoutDelegate {
    /// Natural size of the item at `index_path`.
    fn item_size(&self, index_path: IndexPath) -> Size;

    /// Size shared by every item in `section`, if uniform.
    fn uniform_item_size(&self, _section: usize) -> Option<Size> {
        None
    }

    /// Insets around the items of `section`.
    fn section_insets(&self, _section: usize) -> Insets {
        Insets::ZERO
    }

    /// Minimum spacing between items of the same row.
    fn interitem_spacing(&self, _section: usize) -> f64 {
        0.0
    }

    /// Spacing between consecutive rows.
    fn line_spacing(&self, _section: usize) -> f64 {
        0.0
    }

    /// Extent of the section header along the stacking axis; `0.0` for none.
    fn header_extent(&self, _section: usize) -> f64 {
        0.0
    }

    /// Extent of the section footer along the stacking axis; `0.0` for none.
    fn footer_extent(&self, _section: usize) -> f64 {
        0.0
    }

    /// Kind of a decoration view spanning the whole section, if any.
    fn decoration_kind(&self, _section: usize) -> Option<Arc<str>> {
        None
    }
}

impl<T: FlowLayoutDelegate + ?Sized> FlowLayoutDelegate for &T {
    fn item_size(&self, index_path: IndexPath) -> Size {
        (**self).item_size(index_path)
    }

    fn uniform_item_size(&self, section: usize) -> Option<Size> {
        (**self).uniform_item_size(section)
    }

    fn section_insets(&self, section: usize) -> Insets {
        (**self).section_insets(section)
    }

    fn interitem_spacing(&self, section: usize) -> f64 {
        (**self).interitem_spacing(section)
    }

    fn line_spacing(&self, section: usize) -> f64 {
        (**self).line_spacing(section)
    }

    fn header_extent(&self, section: usize) -> f64 {
        (**self).header_extent(section)
    }

    fn footer_extent(&self, section: usize) -> f64 {
        (**self).footer_extent(section)
    }

    fn decoration_kind(&self, section: usize) -> Option<Arc<str>> {
        (**self).decoration_kind(section)
    }
}

/// A [`FlowLayoutDelegate`] where every section shares one item size and one
/// set of metrics.
#[derive(Clone, Debug, PartialEq)]
pub struct UniformLayout {
    /// Size of every item.
    pub item_size: Size,
    /// Minimum spacing between items of a row.
    pub interitem_spacing: f64,
    /// Spacing between rows.
    pub line_spacing: f64,
    /// Insets around each section's items.
    pub insets: Insets,
    /// Header extent for every section.
    pub header_extent: f64,
    /// Footer extent for every section.
    pub footer_extent: f64,
}

impl UniformLayout {
    /// Items of `item_size` with no spacing, insets, headers, or footers.
    pub fn new(item_size: Size) -> Self {
        Self {
            item_size,
            interitem_spacing: 0.0,
            line_spacing: 0.0,
            insets: Insets::ZERO,
            header_extent: 0.0,
            footer_extent: 0.0,
        }
    }

    /// Set item and line spacing.
    pub fn with_spacing(mut self, interitem: f64, line: f64) -> Self {
        self.interitem_spacing = interitem;
        self.line_spacing = line;
        self
    }

    /// Set section insets.
    pub fn with_insets(mut self, insets: Insets) -> Self {
        self.insets = insets;
        self
    }

    /// Set header and footer extents.
    pub fn with_header_footer(mut self, header: f64, footer: f64) -> Self {
        self.header_extent = header;
        self.footer_extent = footer;
        self
    }
}

impl FlowLayoutDelegate for UniformLayout {
    fn item_size(&self, _index_path: IndexPath) -> Size {
        self.item_size
    }

    fn uniform_item_size(&self, _section: usize) -> Option<Size> {
        Some(self.item_size)
    }

    fn section_insets(&self, _section: usize) -> Insets {
        self.insets
    }

    fn interitem_spacing(&self, _section: usize) -> f64 {
        self.interitem_spacing
    }

    fn line_spacing(&self, _section: usize) -> f64 {
        self.line_spacing
    }

    fn header_extent(&self, _section: usize) -> f64 {
        self.header_extent
    }

    fn footer_extent(&self, _section: usize) -> f64 {
        self.footer_extent
    }
}
