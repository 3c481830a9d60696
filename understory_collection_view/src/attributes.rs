// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Resolved per-element layout attributes.

use alloc::sync::Arc;
use kurbo::{Point, Rect, Size};

use crate::index_path::IndexPath;
use crate::key::{ElementCategory, ElementKey};

/// Layout attributes resolved for one element in the current generation.
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutAttributes {
    /// The element's category.
    pub category: ElementCategory,
    /// The element's index path. Section-level views use item `0`.
    pub index_path: IndexPath,
    /// Kind name for supplementary and decoration views; `None` for cells.
    pub element_kind: Option<Arc<str>>,
    /// Frame in content coordinates.
    pub frame: Rect,
    /// Stacking order; higher is drawn on top.
    pub z_index: i32,
    /// Opacity in `0.0..=1.0`.
    pub alpha: f64,
    /// Whether the element should be hidden.
    pub hidden: bool,
}

impl LayoutAttributes {
    /// Attributes for the cell at `index_path`.
    pub fn cell(index_path: IndexPath, frame: Rect) -> Self {
        Self {
            category: ElementCategory::Cell,
            index_path,
            element_kind: None,
            frame,
            z_index: 0,
            alpha: 1.0,
            hidden: false,
        }
    }

    /// Attributes for a supplementary view of `kind`.
    pub fn supplementary(kind: impl Into<Arc<str>>, index_path: IndexPath, frame: Rect) -> Self {
        Self {
            category: ElementCategory::SupplementaryView,
            element_kind: Some(kind.into()),
            ..Self::cell(index_path, frame)
        }
    }

    /// Attributes for a decoration view of `kind`. Decorations sit below cells.
    pub fn decoration(kind: impl Into<Arc<str>>, index_path: IndexPath, frame: Rect) -> Self {
        Self {
            category: ElementCategory::DecorationView,
            element_kind: Some(kind.into()),
            z_index: -1,
            ..Self::cell(index_path, frame)
        }
    }

    /// Set the stacking order.
    pub fn with_z_index(mut self, z_index: i32) -> Self {
        self.z_index = z_index;
        self
    }

    /// Whether these attributes describe a cell.
    pub fn is_cell(&self) -> bool {
        self.category == ElementCategory::Cell
    }

    /// The cache key for this element.
    pub fn key(&self) -> ElementKey {
        ElementKey::from_attributes(self)
    }

    /// Center of the frame.
    pub fn center(&self) -> Point {
        self.frame.center()
    }

    /// Size of the frame.
    pub fn size(&self) -> Size {
        self.frame.size()
    }
}

#[cfg(test)]
mod tests {
    use super::LayoutAttributes;
    use crate::{ElementCategory, IndexPath};
    use kurbo::{Point, Rect, Size};

    #[test]
    fn constructors_set_category_and_defaults() {
        let frame = Rect::new(0.0, 0.0, 20.0, 10.0);
        let cell = LayoutAttributes::cell(IndexPath::new(0, 0), frame);
        assert!(cell.is_cell());
        assert_eq!(cell.alpha, 1.0);
        assert_eq!(cell.center(), Point::new(10.0, 5.0));
        assert_eq!(cell.size(), Size::new(20.0, 10.0));

        let deco = LayoutAttributes::decoration("bg", IndexPath::new(0, 0), frame);
        assert_eq!(deco.category, ElementCategory::DecorationView);
        assert!(deco.z_index < cell.z_index);
        assert_eq!(deco.element_kind.as_deref(), Some("bg"));
    }
}
