// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Identity of a laid-out element, used to key cached attributes.

use alloc::sync::Arc;

use crate::attributes::LayoutAttributes;
use crate::index_path::IndexPath;

/// Element kind name used for section headers.
pub const ELEMENT_KIND_SECTION_HEADER: &str = "section-header";

/// Element kind name used for section footers.
pub const ELEMENT_KIND_SECTION_FOOTER: &str = "section-footer";

/// The broad category of a laid-out element.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ElementCategory {
    /// A data item.
    Cell,
    /// A view attached to a section, such as a header or footer.
    SupplementaryView,
    /// A purely visual adornment that carries no data.
    DecorationView,
}

impl ElementCategory {
    /// The single-category filter matching this category.
    pub const fn as_kinds(self) -> ElementKinds {
        match self {
            Self::Cell => ElementKinds::CELLS,
            Self::SupplementaryView => ElementKinds::SUPPLEMENTARY,
            Self::DecorationView => ElementKinds::DECORATION,
        }
    }
}

bitflags::bitflags! {
    /// Element categories an attribute query should return.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct ElementKinds: u8 {
        /// Cells.
        const CELLS         = 0b0000_0001;
        /// Supplementary views (headers, footers).
        const SUPPLEMENTARY = 0b0000_0010;
        /// Decoration views.
        const DECORATION    = 0b0000_0100;
    }
}

impl Default for ElementKinds {
    fn default() -> Self {
        Self::all()
    }
}

impl ElementKinds {
    /// Whether elements of `category` pass this filter.
    pub fn matches(self, category: ElementCategory) -> bool {
        self.contains(category.as_kinds())
    }
}

/// Identity of an element: category, index path, and an optional kind name.
///
/// Two keys are equal when all three parts are equal. Cells never carry an
/// identifier; supplementary and decoration views use theirs to tell apart
/// several views at the same index path (for example a header and a footer).
///
/// ```rust
/// use understory_collection_view::{ELEMENT_KIND_SECTION_HEADER, ElementKey, IndexPath};
///
/// let ip = IndexPath::new(2, 0);
/// assert_eq!(ElementKey::cell(ip), ElementKey::cell(ip));
/// assert_ne!(
///     ElementKey::cell(ip),
///     ElementKey::supplementary(ELEMENT_KIND_SECTION_HEADER, ip),
/// );
/// ```
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ElementKey {
    category: ElementCategory,
    index_path: IndexPath,
    identifier: Option<Arc<str>>,
}

impl ElementKey {
    /// Key for the cell at `index_path`.
    pub const fn cell(index_path: IndexPath) -> Self {
        Self {
            category: ElementCategory::Cell,
            index_path,
            identifier: None,
        }
    }

    /// Key for the supplementary view of `kind` at `index_path`.
    pub fn supplementary(kind: impl Into<Arc<str>>, index_path: IndexPath) -> Self {
        Self {
            category: ElementCategory::SupplementaryView,
            index_path,
            identifier: Some(kind.into()),
        }
    }

    /// Key for the decoration view of `kind` at `index_path`.
    pub fn decoration(kind: impl Into<Arc<str>>, index_path: IndexPath) -> Self {
        Self {
            category: ElementCategory::DecorationView,
            index_path,
            identifier: Some(kind.into()),
        }
    }

    /// Key identifying the element described by `attributes`.
    pub fn from_attributes(attributes: &LayoutAttributes) -> Self {
        Self {
            category: attributes.category,
            index_path: attributes.index_path,
            identifier: match attributes.category {
                ElementCategory::Cell => None,
                _ => attributes.element_kind.clone(),
            },
        }
    }

    /// The element category.
    pub const fn category(&self) -> ElementCategory {
        self.category
    }

    /// The element's index path.
    pub const fn index_path(&self) -> IndexPath {
        self.index_path
    }

    /// The kind name, if any.
    pub fn identifier(&self) -> Option<&str> {
        self.identifier.as_deref()
    }
}
