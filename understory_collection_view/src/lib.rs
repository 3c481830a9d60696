// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Collection View: a grid layout cache for collection views.
//!
//! This crate computes and caches the geometry behind a grid-style collection
//! view. Given per-section item counts and item sizes it packs items into rows
//! and rows into sections, caches the resulting frames keyed by element
//! identity, and answers positional queries by index path, by flat global
//! index, by rect, and by point. It also models the structural changes between
//! two data generations so an animation driver can sequence them safely.
//!
//! The core concepts are:
//!
//! - [`DataSource`]: reports the number of sections and items per section.
//! - [`FlowLayoutDelegate`]: reports item sizes (per item, or one
//!   [uniform size](FlowLayoutDelegate::uniform_item_size) per section),
//!   spacing, insets, and header/footer extents. [`UniformLayout`] is a
//!   ready-made implementation.
//! - [`GridLayoutInfo`]: the geometry tree. It owns [`GridLayoutSection`]s,
//!   which own [`GridLayoutRow`]s, which own [`GridLayoutItem`]s when item
//!   sizes differ. Rows with a uniform item size derive item rects on demand.
//! - [`CollectionViewData`]: the cache and query façade. It pulls counts and
//!   sizes lazily, maintains the `(section, item)` ↔ global index mapping, and
//!   caches [`LayoutAttributes`] keyed by [`ElementKey`].
//! - [`UpdateItem`] and [`UpdatePlan`]: inserts, deletes, reloads, and moves,
//!   with the forward and inverse orderings needed to apply them without
//!   index shifts.
//!
//! Grids scroll vertically or horizontally ([`GridLayoutConfig`]). Rows pack
//! items along the cross axis within the viewport's extent; an item that does
//! not fit starts a new row. Right-to-left layouts mirror every frame, and
//! section headers and footers can float, staying pinned to the visible rect.
//!
//! ## Minimal example
//!
//! ```rust
//! use kurbo::{Rect, Size};
//! use understory_collection_view::{
//!     CollectionViewData, GridLayoutConfig, IndexPath, RowAlignment, RowAlignmentOptions,
//!     UniformLayout,
//! };
//!
//! // One section of 5 items, 50×50 each, in a 220 wide viewport.
//! let mut data = CollectionViewData::new(
//!     [5_usize],
//!     UniformLayout::new(Size::new(50.0, 50.0)),
//!     GridLayoutConfig::default()
//!         .with_viewport(Size::new(220.0, 400.0))
//!         .with_row_alignment(RowAlignmentOptions::uniform(RowAlignment::Start)),
//! );
//! data.validate_layout_in_rect(Rect::new(0.0, 0.0, 220.0, 400.0)).unwrap();
//!
//! // Four items fit in the first row; the fifth wraps.
//! let fifth = data.rect_for_item_at_index_path(IndexPath::new(0, 4)).unwrap();
//! assert_eq!(fifth.y0, 50.0);
//! assert_eq!(
//!     data.collection_view_content_rect(),
//!     Ok(Rect::new(0.0, 0.0, 220.0, 100.0)),
//! );
//!
//! // Hosts realize views for the elements in the visible rect.
//! let visible = data
//!     .layout_attributes_for_elements_in_rect(Rect::new(0.0, 0.0, 220.0, 40.0))
//!     .unwrap()
//!     .count();
//! assert_eq!(visible, 4);
//! ```
//!
//! ## Features
//!
//! - `std` *(default)*: enables `kurbo/std`.
//! - `libm`: enables `kurbo/libm` for `no_std` targets.
//! - `tracing`: emits `tracing` events (target `understory_collection_view`) when
//!   counts are reloaded, geometry is rebuilt, and a layout delegate violates
//!   its contract.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

#[macro_use]
mod macros;

mod attributes;
mod config;
mod counts;
mod data;
mod error;
mod index_path;
mod info;
mod item;
mod key;
mod row;
mod section;
mod source;
mod update;
mod util;

pub use attributes::LayoutAttributes;
pub use config::{
    CrossAxisAlignment, GridLayoutConfig, RowAlignment, RowAlignmentOptions, ScrollDirection,
};
pub use counts::SectionCounts;
pub use data::CollectionViewData;
pub use error::CollectionError;
pub use index_path::IndexPath;
pub use info::{GridLayoutInfo, InvalidationScope};
pub use item::GridLayoutItem;
pub use key::{
    ELEMENT_KIND_SECTION_FOOTER, ELEMENT_KIND_SECTION_HEADER, ElementCategory, ElementKey,
    ElementKinds,
};
pub use row::{GridLayoutRow, RowMetrics};
pub use section::GridLayoutSection;
pub use source::{DataSource, FlowLayoutDelegate, UniformLayout};
pub use update::{ItemTransition, UpdateAction, UpdateItem, UpdatePlan};
