// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error type shared by the cache, the geometry tree, and update items.

use core::fmt;

use kurbo::Size;

use crate::index_path::IndexPath;
use crate::key::ElementKey;
use crate::update::UpdateAction;

/// Errors reported by collection-view queries and update construction.
#[derive(Clone, Debug, PartialEq)]
pub enum CollectionError {
    /// A section index was outside `0..sections`.
    SectionOutOfRange {
        /// The requested section.
        section: usize,
        /// Number of sections in the current generation.
        sections: usize,
    },
    /// An item index was outside its section's item range.
    ItemOutOfRange {
        /// The requested index path.
        index_path: IndexPath,
        /// Number of items in that section.
        items: usize,
    },
    /// A global item index was outside `0..items`.
    GlobalIndexOutOfRange {
        /// The requested global index.
        index: usize,
        /// Total number of items.
        items: usize,
    },
    /// No attributes are cached for this element in the current generation.
    MissingAttributes(ElementKey),
    /// An update item whose index paths do not match its action.
    InvalidUpdate {
        /// The requested action.
        action: UpdateAction,
        /// Index path before the update, if any.
        before: Option<IndexPath>,
        /// Index path after the update, if any.
        after: Option<IndexPath>,
    },
    /// The layout strategy produced a negative or non-finite item size.
    InvalidItemSize {
        /// The offending item.
        index_path: IndexPath,
        /// The size that was reported.
        size: Size,
    },
    /// The layout strategy produced a non-finite inset, or a negative or
    /// non-finite spacing or header/footer extent.
    InvalidSectionMetric {
        /// The offending section.
        section: usize,
        /// Which metric, e.g. `"line_spacing"`.
        metric: &'static str,
        /// The value that was reported.
        value: f64,
    },
    /// Applying an update batch does not produce the data source's new counts.
    InconsistentUpdate {
        /// The first section whose count disagrees.
        section: usize,
        /// Count implied by applying the updates to the previous counts.
        expected: usize,
        /// Count reported by the data source.
        actual: usize,
    },
}

impl fmt::Display for CollectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SectionOutOfRange { section, sections } => {
                write!(f, "section {section} out of range ({sections} sections)")
            }
            Self::ItemOutOfRange { index_path, items } => {
                write!(f, "index path {index_path} out of range ({items} items in section)")
            }
            Self::GlobalIndexOutOfRange { index, items } => {
                write!(f, "global index {index} out of range ({items} items)")
            }
            Self::MissingAttributes(key) => {
                write!(
                    f,
                    "no layout attributes for {:?} at {}",
                    key.category(),
                    key.index_path()
                )
            }
            Self::InvalidUpdate {
                action,
                before,
                after,
            } => write!(
                f,
                "invalid {action:?} update (before: {before:?}, after: {after:?})"
            ),
            Self::InvalidItemSize { index_path, size } => {
                write!(f, "invalid item size {size:?} at {index_path}")
            }
            Self::InvalidSectionMetric {
                section,
                metric,
                value,
            } => write!(f, "invalid {metric} {value} in section {section}"),
            Self::InconsistentUpdate {
                section,
                expected,
                actual,
            } => write!(
                f,
                "section {section} should contain {expected} items after the update, data source reports {actual}"
            ),
        }
    }
}

impl core::error::Error for CollectionError {}
