// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Grid configuration: scroll direction, viewport, and row alignment.

use kurbo::Size;

/// The axis along which the content scrolls and sections stack.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ScrollDirection {
    /// Rows stack top to bottom; items flow along x.
    #[default]
    Vertical,
    /// Columns stack left to right; items flow along y.
    Horizontal,
}

/// Distribution of leftover space along a row.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RowAlignment {
    /// Pack items against the leading edge.
    Start,
    /// Center the packed items.
    Center,
    /// Pack items against the trailing edge.
    End,
    /// Spread leftover space evenly between items. A row holding a single
    /// item is centered.
    #[default]
    Justify,
}

/// Placement of an item that is thinner than its row.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CrossAxisAlignment {
    /// Align with the row's leading edge.
    Start,
    /// Center within the row.
    #[default]
    Center,
    /// Align with the row's trailing edge.
    End,
}

impl CrossAxisAlignment {
    pub(crate) fn factor(self) -> f64 {
        match self {
            Self::Start => 0.0,
            Self::Center => 0.5,
            Self::End => 1.0,
        }
    }
}

/// Row alignment settings for a grid.
///
/// The last row of each section can be aligned differently from the others.
/// When the last row is justified it is spaced as if it were filled with
/// items like its last one, so partial rows line up with the rows above.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RowAlignmentOptions {
    /// Alignment of every row except the last one in a section.
    pub common_row: RowAlignment,
    /// Alignment of the last row in a section.
    pub last_row: RowAlignment,
    /// Placement of thin items across their row.
    pub cross_axis: CrossAxisAlignment,
}

impl RowAlignmentOptions {
    /// Use `alignment` for every row, centering items across rows.
    pub const fn uniform(alignment: RowAlignment) -> Self {
        Self {
            common_row: alignment,
            last_row: alignment,
            cross_axis: CrossAxisAlignment::Center,
        }
    }

    /// Set the cross-axis placement.
    pub const fn with_cross_axis(mut self, cross_axis: CrossAxisAlignment) -> Self {
        self.cross_axis = cross_axis;
        self
    }

    /// The alignment that applies to a row.
    pub const fn for_row(&self, last_row: bool) -> RowAlignment {
        if last_row {
            self.last_row
        } else {
            self.common_row
        }
    }
}

/// Configuration for a [`GridLayoutInfo`](crate::GridLayoutInfo) and the
/// [`CollectionViewData`](crate::CollectionViewData) that builds it.
///
/// ```rust
/// use kurbo::Size;
/// use understory_collection_view::{GridLayoutConfig, RowAlignment, RowAlignmentOptions};
///
/// let config = GridLayoutConfig::default()
///     .horizontal()
///     .with_viewport(Size::new(320.0, 200.0))
///     .with_row_alignment(RowAlignmentOptions::uniform(RowAlignment::Start));
/// // Horizontal grids pack columns within the viewport's height.
/// assert_eq!(config.dimension(), 200.0);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridLayoutConfig {
    /// Scroll direction.
    pub scroll_direction: ScrollDirection,
    /// `false` mirrors all frames along x.
    pub left_to_right: bool,
    /// Visible size of the collection; its cross-axis extent bounds each row.
    pub viewport: Size,
    /// Row alignment.
    pub row_alignment: RowAlignmentOptions,
    /// Keep section headers and footers pinned to the visible rect.
    pub floating_header_footer: bool,
}

impl Default for GridLayoutConfig {
    fn default() -> Self {
        Self {
            scroll_direction: ScrollDirection::Vertical,
            left_to_right: true,
            viewport: Size::ZERO,
            row_alignment: RowAlignmentOptions::default(),
            floating_header_footer: false,
        }
    }
}

impl GridLayoutConfig {
    /// Scroll vertically.
    pub fn vertical(mut self) -> Self {
        self.scroll_direction = ScrollDirection::Vertical;
        self
    }

    /// Scroll horizontally.
    pub fn horizontal(mut self) -> Self {
        self.scroll_direction = ScrollDirection::Horizontal;
        self
    }

    /// Mirror frames for right-to-left locales.
    pub fn right_to_left(mut self) -> Self {
        self.left_to_right = false;
        self
    }

    /// Set the viewport size.
    pub fn with_viewport(mut self, viewport: Size) -> Self {
        self.viewport = viewport;
        self
    }

    /// Set the row alignment.
    pub fn with_row_alignment(mut self, row_alignment: RowAlignmentOptions) -> Self {
        self.row_alignment = row_alignment;
        self
    }

    /// Pin headers and footers to the visible rect.
    pub fn floating_header_footer(mut self) -> Self {
        self.floating_header_footer = true;
        self
    }

    /// Whether sections stack horizontally.
    pub fn is_horizontal(&self) -> bool {
        self.scroll_direction == ScrollDirection::Horizontal
    }

    /// The cross-axis extent rows are packed into.
    pub fn dimension(&self) -> f64 {
        if self.is_horizontal() {
            self.viewport.height
        } else {
            self.viewport.width
        }
    }
}
