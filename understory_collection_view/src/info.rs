// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The root of the grid geometry tree.

use alloc::vec::Vec;

use kurbo::{Point, Rect, Size};

use crate::config::{GridLayoutConfig, RowAlignmentOptions};
use crate::index_path::IndexPath;
use crate::section::{GridLayoutSection, SectionLayout};
use crate::util::{Axes, intersects};

/// What [`GridLayoutInfo::invalidate`] marks stale.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InvalidationScope {
    /// Every section, row, and frame.
    All,
    /// Only the pinned positions of floating headers and footers.
    FloatingHeaderFooter,
}

/// Sections of a grid, packed along one axis.
///
/// `GridLayoutInfo` exclusively owns its sections, which own their rows,
/// which own their items. Geometry is computed lazily by
/// [`validate`](Self::validate): only sections from the first stale one onward
/// are recomputed, and floating headers can be re-stuck without re-flowing
/// any rows.
///
/// ```rust
/// use kurbo::{Rect, Size};
/// use understory_collection_view::{GridLayoutConfig, GridLayoutInfo, IndexPath};
///
/// let config = GridLayoutConfig::default().with_viewport(Size::new(100.0, 300.0));
/// let mut info = GridLayoutInfo::from_config(&config);
/// info.add_section().set_uniform_items(3, Size::new(50.0, 20.0));
/// info.add_section().set_uniform_items(1, Size::new(100.0, 30.0));
/// info.validate();
///
/// assert_eq!(info.content_size(), Size::new(100.0, 70.0));
/// assert_eq!(
///     info.frame_for_item_at_index_path(IndexPath::new(1, 0)),
///     Some(Rect::new(0.0, 40.0, 100.0, 70.0)),
/// );
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct GridLayoutInfo {
    sections: Vec<GridLayoutSection>,
    row_alignment_options: RowAlignmentOptions,
    uses_floating_header_footer: bool,
    dimension: f64,
    horizontal: bool,
    left_to_right: bool,
    content_size: Size,
    visible_rect: Rect,
    valid: bool,
    floating_valid: bool,
    mirrored: bool,
}

impl Default for GridLayoutInfo {
    fn default() -> Self {
        Self::from_config(&GridLayoutConfig::default())
    }
}

impl GridLayoutInfo {
    /// An empty grid configured by `config`.
    pub fn from_config(config: &GridLayoutConfig) -> Self {
        Self {
            sections: Vec::new(),
            row_alignment_options: config.row_alignment,
            uses_floating_header_footer: config.floating_header_footer,
            dimension: config.dimension(),
            horizontal: config.is_horizontal(),
            left_to_right: config.left_to_right,
            content_size: Size::ZERO,
            visible_rect: Rect::from_origin_size(Point::ZERO, config.viewport),
            valid: false,
            floating_valid: false,
            mirrored: false,
        }
    }

    /// Append a new, empty section and return it for configuration.
    pub fn add_section(&mut self) -> &mut GridLayoutSection {
        let index = self.sections.len();
        self.sections.push(GridLayoutSection::new(index));
        self.valid = false;
        &mut self.sections[index]
    }

    /// Drop all sections.
    pub fn clear_sections(&mut self) {
        self.sections.clear();
        self.invalidate(InvalidationScope::All);
    }

    /// Sections in order.
    pub fn sections(&self) -> &[GridLayoutSection] {
        &self.sections
    }

    /// The section at `index`.
    pub fn section(&self, index: usize) -> Option<&GridLayoutSection> {
        self.sections.get(index)
    }

    /// Mutable access to a section. Marks the grid stale.
    pub fn section_mut(&mut self, index: usize) -> Option<&mut GridLayoutSection> {
        self.valid = false;
        self.sections.get_mut(index)
    }

    /// Number of sections.
    pub fn number_of_sections(&self) -> usize {
        self.sections.len()
    }

    /// Row alignment settings.
    pub const fn row_alignment_options(&self) -> RowAlignmentOptions {
        self.row_alignment_options
    }

    /// Whether headers and footers are pinned to the visible rect.
    pub const fn uses_floating_header_footer(&self) -> bool {
        self.uses_floating_header_footer
    }

    /// Cross-axis extent rows pack within.
    pub const fn dimension(&self) -> f64 {
        self.dimension
    }

    /// Whether rows stack along x.
    pub const fn horizontal(&self) -> bool {
        self.horizontal
    }

    /// Whether frames are laid out left to right.
    pub const fn left_to_right(&self) -> bool {
        self.left_to_right
    }

    /// Size of the union of all section frames, valid after
    /// [`validate`](Self::validate).
    pub const fn content_size(&self) -> Size {
        self.content_size
    }

    /// Rect used to pin floating headers and footers.
    pub const fn visible_rect(&self) -> Rect {
        self.visible_rect
    }

    /// Whether all geometry is current.
    pub const fn is_valid(&self) -> bool {
        self.valid && self.floating_valid
    }

    /// Set row alignment.
    pub fn set_row_alignment_options(&mut self, options: RowAlignmentOptions) {
        if self.row_alignment_options != options {
            self.row_alignment_options = options;
            self.invalidate(InvalidationScope::All);
        }
    }

    /// Set the cross-axis extent.
    pub fn set_dimension(&mut self, dimension: f64) {
        if self.dimension != dimension {
            self.dimension = dimension;
            self.invalidate(InvalidationScope::All);
        }
    }

    /// Set the stacking axis.
    pub fn set_horizontal(&mut self, horizontal: bool) {
        if self.horizontal != horizontal {
            self.horizontal = horizontal;
            self.invalidate(InvalidationScope::All);
        }
    }

    /// Set the horizontal direction.
    pub fn set_left_to_right(&mut self, left_to_right: bool) {
        if self.left_to_right != left_to_right {
            self.left_to_right = left_to_right;
            self.invalidate(InvalidationScope::All);
        }
    }

    /// Turn floating headers and footers on or off.
    pub fn set_uses_floating_header_footer(&mut self, floating: bool) {
        if self.uses_floating_header_footer != floating {
            self.uses_floating_header_footer = floating;
            self.invalidate(InvalidationScope::FloatingHeaderFooter);
        }
    }

    /// Update the visible rect, marking floating headers stale if they move.
    pub fn set_visible_rect(&mut self, rect: Rect) {
        if self.visible_rect != rect {
            self.visible_rect = rect;
            if self.uses_floating_header_footer {
                self.invalidate(InvalidationScope::FloatingHeaderFooter);
            }
        }
    }

    /// Mark geometry stale.
    ///
    /// Sections, rows, and items are kept; only their frames are recomputed
    /// on the next [`validate`](Self::validate).
    pub fn invalidate(&mut self, scope: InvalidationScope) {
        match scope {
            InvalidationScope::All => {
                for section in &mut self.sections {
                    section.invalidate();
                }
                self.valid = false;
                self.floating_valid = false;
            }
            InvalidationScope::FloatingHeaderFooter => self.floating_valid = false,
        }
    }

    /// Recompute whatever is stale.
    pub fn validate(&mut self) {
        if !self.valid {
            self.layout_sections();
            self.floating_valid = false;
        }
        if !self.floating_valid {
            self.restick();
        }
    }

    fn layout_sections(&mut self) {
        let axes = Axes::new(self.horizontal);
        // Mirrored frames cannot be extended in place.
        let from = if self.mirrored {
            0
        } else {
            self.sections
                .iter()
                .position(|section| !section.is_valid())
                .unwrap_or(self.sections.len())
        };
        let mut origin = match from.checked_sub(1) {
            Some(prev) => axes.stack_end(self.sections[prev].frame()),
            None => 0.0,
        };
        for (index, section) in self.sections.iter_mut().enumerate().skip(from) {
            section.set_index(index);
            section.compute_layout(&SectionLayout {
                horizontal: self.horizontal,
                dimension: self.dimension,
                alignment: self.row_alignment_options,
                origin,
            });
            origin = axes.stack_end(section.frame());
        }
        cv_debug!(
            sections = self.sections.len(),
            recomputed = self.sections.len() - from,
            "grid geometry rebuilt"
        );

        let stack = self
            .sections
            .last()
            .map_or(0.0, |section| axes.stack_end(section.frame()));
        let cross = self
            .sections
            .iter()
            .map(|section| axes.flow(section.frame().size()))
            .fold(0.0, f64::max);
        self.content_size = axes.size(stack, cross);

        self.mirrored = false;
        if !self.left_to_right {
            let width = self.content_size.width;
            for section in &mut self.sections {
                section.mirror(width);
            }
            self.mirrored = true;
        }
        self.valid = true;
    }

    fn restick(&mut self) {
        if self.uses_floating_header_footer {
            let mirror_width = self.mirrored.then_some(self.content_size.width);
            let visible = self.visible_rect;
            for section in &mut self.sections {
                section.restick(visible, self.horizontal, mirror_width);
            }
            cv_trace!(visible = ?visible, "floating headers re-stuck");
        } else {
            for section in &mut self.sections {
                section.unstick();
            }
        }
        self.floating_valid = true;
    }

    /// Frame of the item at `index_path`, valid after
    /// [`validate`](Self::validate).
    pub fn frame_for_item_at_index_path(&self, index_path: IndexPath) -> Option<Rect> {
        self.sections
            .get(index_path.section)?
            .frame_for_item(index_path.item)
    }

    /// The content rect, from the origin to [`content_size`](Self::content_size).
    pub fn content_rect(&self) -> Rect {
        Rect::from_origin_size(Point::ZERO, self.content_size)
    }

    /// Sections whose frame intersects `rect`.
    pub fn sections_in_rect(&self, rect: Rect) -> impl Iterator<Item = &GridLayoutSection> + '_ {
        self.sections
            .iter()
            .filter(move |section| intersects(section.frame(), rect))
    }

    /// Index path of the item containing `point`.
    pub fn index_path_for_item_at_point(&self, point: Point) -> Option<IndexPath> {
        self.sections
            .iter()
            .filter(|section| section.frame().contains(point))
            .find_map(|section| {
                section
                    .item_at_point(point)
                    .map(|item| IndexPath::new(section.index(), item))
            })
    }

    /// A deep, independent copy of the whole tree.
    #[must_use]
    pub fn snapshot(&self) -> Self {
        self.clone()
    }
}
