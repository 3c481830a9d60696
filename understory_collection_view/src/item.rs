// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A single materialized grid item.

use kurbo::{Point, Rect, Size};

/// One item of a section with non-uniform item sizes.
///
/// Sections with a uniform item size never create these; their rows derive
/// item rects arithmetically. The `section` and `row` back-references are
/// plain indices into the owning [`GridLayoutInfo`](crate::GridLayoutInfo)
/// and [`GridLayoutSection`](crate::GridLayoutSection).
#[derive(Clone, Debug, PartialEq)]
pub struct GridLayoutItem {
    pub(crate) frame: Rect,
    pub(crate) section: usize,
    pub(crate) row: usize,
}

impl GridLayoutItem {
    /// An item of natural `size` in `section`, not yet placed in a row.
    pub fn new(section: usize, size: Size) -> Self {
        Self {
            frame: Rect::from_origin_size(Point::ZERO, size),
            section,
            row: 0,
        }
    }

    /// The resolved frame. Only meaningful once the owning row is laid out.
    pub const fn frame(&self) -> Rect {
        self.frame
    }

    /// The item's size.
    pub fn size(&self) -> Size {
        self.frame.size()
    }

    /// Index of the owning section.
    pub const fn section(&self) -> usize {
        self.section
    }

    /// Index of the owning row within its section.
    pub const fn row(&self) -> usize {
        self.row
    }
}
