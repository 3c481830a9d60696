// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The layout cache and query façade.

use alloc::sync::Arc;
use alloc::vec::Vec;

use hashbrown::HashMap;
use kurbo::{Insets, Point, Rect, Size};

use crate::attributes::LayoutAttributes;
use crate::config::GridLayoutConfig;
use crate::counts::SectionCounts;
use crate::error::CollectionError;
use crate::index_path::IndexPath;
use crate::info::GridLayoutInfo;
use crate::key::{
    ELEMENT_KIND_SECTION_FOOTER, ELEMENT_KIND_SECTION_HEADER, ElementCategory, ElementKey,
    ElementKinds,
};
use crate::source::{DataSource, FlowLayoutDelegate};
use crate::update::UpdatePlan;
use crate::util::intersects;

/// Cached layout of a collection view.
///
/// `CollectionViewData` pulls item counts from a [`DataSource`] and sizes from
/// a [`FlowLayoutDelegate`], packs them into a [`GridLayoutInfo`], and caches
/// the resulting [`LayoutAttributes`] keyed by [`ElementKey`]. Queries lazily
/// prepare the layout on first use; [`invalidate`](Self::invalidate) drops
/// everything so the next query asks the data source again.
///
/// Count queries only need the count table. Geometry queries prepare the
/// whole layout.
///
/// ```rust
/// use kurbo::{Rect, Size};
/// use understory_collection_view::{
///     CollectionViewData, GridLayoutConfig, IndexPath, UniformLayout,
/// };
///
/// let counts = [6_usize, 2];
/// let mut data = CollectionViewData::new(
///     &counts[..],
///     UniformLayout::new(Size::new(40.0, 40.0)).with_header_footer(20.0, 0.0),
///     GridLayoutConfig::default().with_viewport(Size::new(120.0, 400.0)),
/// );
///
/// assert_eq!(data.number_of_items(), 8);
/// assert_eq!(data.global_index_for_item_at_index_path(IndexPath::new(1, 1)), Ok(7));
/// assert_eq!(
///     data.rect_for_item_at_index_path(IndexPath::new(1, 0)),
///     Ok(Rect::new(0.0, 120.0, 40.0, 160.0)),
/// );
/// assert!(data.layout_is_prepared());
/// ```
#[derive(Clone, Debug)]
pub struct CollectionViewData<D, L> {
    data_source: D,
    layout: L,
    config: GridLayoutConfig,
    layout_info: GridLayoutInfo,
    counts: SectionCounts,
    counts_valid: bool,
    attributes: HashMap<ElementKey, LayoutAttributes>,
    // Keys of supplementary and decoration views in population order.
    supplementary_keys: Vec<ElementKey>,
    validated_rect: Option<Rect>,
    layout_is_prepared: bool,
}

impl<D: DataSource, L: FlowLayoutDelegate> CollectionViewData<D, L> {
    /// A cache for `data_source` laid out by `layout`. Nothing is computed yet.
    pub fn new(data_source: D, layout: L, config: GridLayoutConfig) -> Self {
        Self {
            data_source,
            layout,
            layout_info: GridLayoutInfo::from_config(&config),
            config,
            counts: SectionCounts::new(),
            counts_valid: false,
            attributes: HashMap::new(),
            supplementary_keys: Vec::new(),
            validated_rect: None,
            layout_is_prepared: false,
        }
    }

    /// The data source.
    pub fn data_source(&self) -> &D {
        &self.data_source
    }

    /// Mutable access to the data source. Invalidates the cache.
    pub fn data_source_mut(&mut self) -> &mut D {
        self.invalidate();
        &mut self.data_source
    }

    /// The layout delegate.
    pub fn layout(&self) -> &L {
        &self.layout
    }

    /// Mutable access to the layout delegate. Invalidates the cache.
    pub fn layout_mut(&mut self) -> &mut L {
        self.invalidate();
        &mut self.layout
    }

    /// The configuration.
    pub fn config(&self) -> &GridLayoutConfig {
        &self.config
    }

    /// Replace the configuration. Invalidates the cache.
    pub fn set_config(&mut self, config: GridLayoutConfig) {
        self.config = config;
        self.invalidate();
    }

    /// The geometry tree as of the last preparation.
    pub fn layout_info(&self) -> &GridLayoutInfo {
        &self.layout_info
    }

    /// Whether counts, geometry, and attributes are current.
    pub fn layout_is_prepared(&self) -> bool {
        self.layout_is_prepared
    }

    /// Drop all cached state.
    ///
    /// The next query asks the data source for counts again and rebuilds the
    /// geometry from scratch.
    pub fn invalidate(&mut self) {
        cv_debug!(was_prepared = self.layout_is_prepared, "layout invalidated");
        self.counts_valid = false;
        self.layout_info = GridLayoutInfo::from_config(&self.config);
        self.attributes.clear();
        self.supplementary_keys.clear();
        self.validated_rect = None;
        self.layout_is_prepared = false;
    }

    /// Make sure counts and geometry covering `rect` are cached.
    ///
    /// Prepares the layout if needed. Once prepared this only re-sticks
    /// floating headers and footers when `rect` moved.
    pub fn validate_layout_in_rect(&mut self, rect: Rect) -> Result<(), CollectionError> {
        if !self.layout_is_prepared {
            self.validated_rect = Some(rect);
            return self.prepare_layout(rect);
        }
        if self.validated_rect != Some(rect) {
            self.validated_rect = Some(rect);
            if self.config.floating_header_footer {
                self.layout_info.set_visible_rect(rect);
                self.layout_info.validate();
                self.refresh_floating_attributes();
            }
        }
        Ok(())
    }

    fn ensure_counts(&mut self) {
        if !self.counts_valid {
            self.counts.rebuild(&self.data_source);
            self.counts_valid = true;
            cv_debug!(sections = self.counts.len(), "item counts reloaded");
        }
    }

    fn ensure_prepared(&mut self) -> Result<(), CollectionError> {
        if self.layout_is_prepared {
            return Ok(());
        }
        let rect = self
            .validated_rect
            .unwrap_or_else(|| Rect::from_origin_size(Point::ZERO, self.config.viewport));
        self.validate_layout_in_rect(rect)
    }

    fn prepare_layout(&mut self, visible: Rect) -> Result<(), CollectionError> {
        self.ensure_counts();
        let mut info = GridLayoutInfo::from_config(&self.config);
        info.set_visible_rect(visible);
        let layout = &self.layout;
        for (section, &count) in self.counts.as_slice().iter().enumerate() {
            let header = check_metric(section, "header_extent", layout.header_extent(section))?;
            let footer = check_metric(section, "footer_extent", layout.footer_extent(section))?;
            let insets = check_insets(section, layout.section_insets(section))?;
            let interitem =
                check_metric(section, "interitem_spacing", layout.interitem_spacing(section))?;
            let line = check_metric(section, "line_spacing", layout.line_spacing(section))?;
            let target = info.add_section();
            target.set_header_footer(header, footer);
            target.set_insets(insets);
            target.set_spacing(interitem, line);
            target.set_decoration_kind(layout.decoration_kind(section));
            if let Some(size) = layout.uniform_item_size(section) {
                if count > 0 {
                    check_item_size(IndexPath::new(section, 0), size)?;
                }
                target.set_uniform_items(count, size);
            } else {
                let sizes = (0..count)
                    .map(|item| {
                        let index_path = IndexPath::new(section, item);
                        let size = layout.item_size(index_path);
                        check_item_size(index_path, size).map(|()| size)
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                target.set_item_sizes(sizes);
            }
        }
        info.validate();
        cv_debug!(
            sections = info.number_of_sections(),
            content_width = info.content_size().width,
            content_height = info.content_size().height,
            "layout prepared"
        );
        self.layout_info = info;
        self.populate_attributes();
        self.layout_is_prepared = true;
        Ok(())
    }

    /// Fill the attribute cache: cells, then headers and footers, then
    /// decoration views, each in section order.
    fn populate_attributes(&mut self) {
        self.attributes.clear();
        self.supplementary_keys.clear();
        let z_index = if self.config.floating_header_footer { 1 } else { 0 };
        let header: Arc<str> = Arc::from(ELEMENT_KIND_SECTION_HEADER);
        let footer: Arc<str> = Arc::from(ELEMENT_KIND_SECTION_FOOTER);

        for section in self.layout_info.sections() {
            for (item, frame) in section.item_frames().enumerate() {
                let index_path = IndexPath::new(section.index(), item);
                let attributes = LayoutAttributes::cell(index_path, frame);
                self.attributes.insert(ElementKey::cell(index_path), attributes);
            }
        }
        for section in self.layout_info.sections() {
            let index_path = IndexPath::new(section.index(), 0);
            let views = [
                (&header, section.header_dimension(), section.floating_header_frame()),
                (&footer, section.footer_dimension(), section.floating_footer_frame()),
            ];
            for (kind, extent, frame) in views {
                if extent > 0.0 {
                    let attributes =
                        LayoutAttributes::supplementary(kind.clone(), index_path, frame)
                            .with_z_index(z_index);
                    let key = attributes.key();
                    self.supplementary_keys.push(key.clone());
                    self.attributes.insert(key, attributes);
                }
            }
        }
        for section in self.layout_info.sections() {
            if let Some(kind) = section.decoration_kind() {
                let index_path = IndexPath::new(section.index(), 0);
                let attributes =
                    LayoutAttributes::decoration(kind.clone(), index_path, section.frame());
                let key = attributes.key();
                self.supplementary_keys.push(key.clone());
                self.attributes.insert(key, attributes);
            }
        }
        cv_trace!(
            elements = self.attributes.len(),
            views = self.supplementary_keys.len(),
            "attribute cache populated"
        );
    }

    fn refresh_floating_attributes(&mut self) {
        let header: Arc<str> = Arc::from(ELEMENT_KIND_SECTION_HEADER);
        let footer: Arc<str> = Arc::from(ELEMENT_KIND_SECTION_FOOTER);
        for section in self.layout_info.sections() {
            let index_path = IndexPath::new(section.index(), 0);
            let views = [
                (&header, section.floating_header_frame()),
                (&footer, section.floating_footer_frame()),
            ];
            for (kind, frame) in views {
                let key = ElementKey::supplementary(kind.clone(), index_path);
                if let Some(attributes) = self.attributes.get_mut(&key) {
                    attributes.frame = frame;
                }
            }
        }
    }

    /// Number of sections reported by the data source.
    pub fn number_of_sections(&mut self) -> usize {
        self.ensure_counts();
        self.counts.len()
    }

    /// Number of items in `section`.
    ///
    /// An out-of-range section is an error, never a silent zero.
    pub fn number_of_items_in_section(&mut self, section: usize) -> Result<usize, CollectionError> {
        self.ensure_counts();
        self.counts
            .count(section)
            .ok_or(CollectionError::SectionOutOfRange {
                section,
                sections: self.counts.len(),
            })
    }

    /// Total number of items in the sections before `section`.
    pub fn number_of_items_before_section(
        &mut self,
        section: usize,
    ) -> Result<usize, CollectionError> {
        self.ensure_counts();
        let sections = self.counts.len();
        self.counts
            .items_before(section)
            .ok_or(CollectionError::SectionOutOfRange { section, sections })
    }

    /// Total number of items.
    pub fn number_of_items(&mut self) -> usize {
        self.ensure_counts();
        self.counts.total()
    }

    /// Per-section item counts of the current generation.
    pub fn item_counts(&mut self) -> &[usize] {
        self.ensure_counts();
        self.counts.as_slice()
    }

    /// Flat index of the item at `index_path`.
    pub fn global_index_for_item_at_index_path(
        &mut self,
        index_path: IndexPath,
    ) -> Result<usize, CollectionError> {
        let items = self.number_of_items_in_section(index_path.section)?;
        if index_path.item >= items {
            return Err(CollectionError::ItemOutOfRange { index_path, items });
        }
        Ok(self.number_of_items_before_section(index_path.section)? + index_path.item)
    }

    /// Index path of the item at flat `index`.
    pub fn index_path_for_item_at_global_index(
        &mut self,
        index: usize,
    ) -> Result<IndexPath, CollectionError> {
        self.ensure_counts();
        let section = self
            .counts
            .section_for_global_index(index)
            .ok_or(CollectionError::GlobalIndexOutOfRange {
                index,
                items: self.counts.total(),
            })?;
        let before = self.number_of_items_before_section(section)?;
        Ok(IndexPath::new(section, index - before))
    }

    /// Cached attributes of the cell at `index_path`.
    pub fn layout_attributes_for_item_at_index_path(
        &mut self,
        index_path: IndexPath,
    ) -> Result<&LayoutAttributes, CollectionError> {
        self.global_index_for_item_at_index_path(index_path)?;
        self.ensure_prepared()?;
        let key = ElementKey::cell(index_path);
        self.attributes
            .get(&key)
            .ok_or(CollectionError::MissingAttributes(key))
    }

    /// Cached attributes of the cell at flat `index`.
    pub fn layout_attributes_for_global_item_index(
        &mut self,
        index: usize,
    ) -> Result<&LayoutAttributes, CollectionError> {
        let index_path = self.index_path_for_item_at_global_index(index)?;
        self.layout_attributes_for_item_at_index_path(index_path)
    }

    /// Frame of the cell at `index_path`.
    pub fn rect_for_item_at_index_path(
        &mut self,
        index_path: IndexPath,
    ) -> Result<Rect, CollectionError> {
        self.layout_attributes_for_item_at_index_path(index_path)
            .map(|attributes| attributes.frame)
    }

    /// Frame of the cell at flat `index`.
    pub fn rect_for_global_item_index(&mut self, index: usize) -> Result<Rect, CollectionError> {
        self.layout_attributes_for_global_item_index(index)
            .map(|attributes| attributes.frame)
    }

    /// Frame of the supplementary view of `kind` at `index_path`.
    pub fn rect_for_supplementary_element(
        &mut self,
        kind: &str,
        index_path: IndexPath,
    ) -> Result<Rect, CollectionError> {
        self.rect_for_view(ElementKey::supplementary(kind, index_path))
    }

    /// Frame of the decoration view of `kind` at `index_path`.
    pub fn rect_for_decoration_element(
        &mut self,
        kind: &str,
        index_path: IndexPath,
    ) -> Result<Rect, CollectionError> {
        self.rect_for_view(ElementKey::decoration(kind, index_path))
    }

    fn rect_for_view(&mut self, key: ElementKey) -> Result<Rect, CollectionError> {
        self.attributes_for_view(key).map(|attributes| attributes.frame)
    }

    /// Cached attributes of the supplementary view of `kind` at `index_path`.
    pub fn layout_attributes_for_supplementary_element(
        &mut self,
        kind: &str,
        index_path: IndexPath,
    ) -> Result<&LayoutAttributes, CollectionError> {
        self.attributes_for_view(ElementKey::supplementary(kind, index_path))
    }

    /// Cached attributes of the decoration view of `kind` at `index_path`.
    pub fn layout_attributes_for_decoration_element(
        &mut self,
        kind: &str,
        index_path: IndexPath,
    ) -> Result<&LayoutAttributes, CollectionError> {
        self.attributes_for_view(ElementKey::decoration(kind, index_path))
    }

    fn attributes_for_view(
        &mut self,
        key: ElementKey,
    ) -> Result<&LayoutAttributes, CollectionError> {
        self.ensure_prepared()?;
        self.attributes
            .get(&key)
            .ok_or(CollectionError::MissingAttributes(key))
    }

    /// Supplementary views of `section` that are already cached.
    ///
    /// Never prepares the layout; yields nothing while it is not prepared.
    pub fn existing_supplementary_layout_attributes_in_section(
        &self,
        section: usize,
    ) -> impl Iterator<Item = &LayoutAttributes> + '_ {
        let attributes = &self.attributes;
        self.supplementary_keys
            .iter()
            .filter(move |key| {
                key.category() == ElementCategory::SupplementaryView
                    && key.index_path().section == section
            })
            .filter_map(move |key| attributes.get(key))
    }

    /// All cached attributes whose frame intersects `rect`.
    ///
    /// The sequence is produced lazily: cells are found through the sections
    /// and rows that intersect `rect`, followed by supplementary and
    /// decoration views. Its order is stable for an unchanged generation.
    pub fn layout_attributes_for_elements_in_rect(
        &mut self,
        rect: Rect,
    ) -> Result<impl Iterator<Item = &LayoutAttributes> + '_, CollectionError> {
        self.layout_attributes_for_elements_in_rect_filtered(rect, ElementKinds::all())
    }

    /// Like [`layout_attributes_for_elements_in_rect`], restricted to `kinds`.
    ///
    /// [`layout_attributes_for_elements_in_rect`]: Self::layout_attributes_for_elements_in_rect
    pub fn layout_attributes_for_elements_in_rect_filtered(
        &mut self,
        rect: Rect,
        kinds: ElementKinds,
    ) -> Result<impl Iterator<Item = &LayoutAttributes> + '_, CollectionError> {
        self.ensure_prepared()?;
        let attributes = &self.attributes;
        let include_cells = kinds.contains(ElementKinds::CELLS);
        let cells = self
            .layout_info
            .sections_in_rect(rect)
            .filter(move |_| include_cells)
            .flat_map(move |section| {
                let index = section.index();
                section.item_frames_in_rect(rect).filter_map(move |(item, _)| {
                    attributes.get(&ElementKey::cell(IndexPath::new(index, item)))
                })
            });
        let views = self
            .supplementary_keys
            .iter()
            .filter(move |key| kinds.matches(key.category()))
            .filter_map(move |key| attributes.get(key))
            .filter(move |view| intersects(view.frame, rect));
        Ok(cells.chain(views))
    }

    /// All cached attributes belonging to `section`, cells first.
    pub fn layout_attributes_for_elements_in_section(
        &mut self,
        section: usize,
    ) -> Result<impl Iterator<Item = &LayoutAttributes> + '_, CollectionError> {
        let items = self.number_of_items_in_section(section)?;
        self.ensure_prepared()?;
        let attributes = &self.attributes;
        let cells = (0..items).filter_map(move |item| {
            attributes.get(&ElementKey::cell(IndexPath::new(section, item)))
        });
        let views = self
            .supplementary_keys
            .iter()
            .filter(move |key| key.index_path().section == section)
            .filter_map(move |key| attributes.get(key));
        Ok(cells.chain(views))
    }

    /// Union of all section frames.
    pub fn collection_view_content_rect(&mut self) -> Result<Rect, CollectionError> {
        self.ensure_prepared()?;
        Ok(self.layout_info.content_rect())
    }

    /// Size of [`collection_view_content_rect`](Self::collection_view_content_rect).
    pub fn content_size(&mut self) -> Result<Size, CollectionError> {
        self.ensure_prepared()?;
        Ok(self.layout_info.content_size())
    }

    /// Index path of the cell containing `point`, if any.
    pub fn index_path_for_item_at_point(
        &mut self,
        point: Point,
    ) -> Result<Option<IndexPath>, CollectionError> {
        self.ensure_prepared()?;
        Ok(self.layout_info.index_path_for_item_at_point(point))
    }

    /// An independent copy of the current geometry, for diffing generations.
    pub fn layout_snapshot(&mut self) -> Result<GridLayoutInfo, CollectionError> {
        self.ensure_prepared()?;
        Ok(self.layout_info.snapshot())
    }

    /// Check `plan` against the counts it was computed from and the data
    /// source's current counts.
    pub fn validate_update_plan(
        &mut self,
        plan: &UpdatePlan,
        before_counts: &[usize],
    ) -> Result<(), CollectionError> {
        let after = self.item_counts();
        plan.validate_counts(before_counts, after)
    }
}

fn check_item_size(index_path: IndexPath, size: Size) -> Result<(), CollectionError> {
    let valid = size.width.is_finite()
        && size.height.is_finite()
        && size.width >= 0.0
        && size.height >= 0.0;
    if valid {
        Ok(())
    } else {
        cv_warn!(%index_path, ?size, "layout delegate returned an invalid item size");
        Err(CollectionError::InvalidItemSize { index_path, size })
    }
}

fn check_metric(section: usize, metric: &'static str, value: f64) -> Result<f64, CollectionError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        cv_warn!(
            section,
            metric,
            value,
            "layout delegate returned an invalid section metric"
        );
        Err(CollectionError::InvalidSectionMetric {
            section,
            metric,
            value,
        })
    }
}

/// Insets may be negative but must be finite.
fn check_insets(section: usize, insets: Insets) -> Result<Insets, CollectionError> {
    let sides = [
        ("inset_x0", insets.x0),
        ("inset_y0", insets.y0),
        ("inset_x1", insets.x1),
        ("inset_y1", insets.y1),
    ];
    for (metric, value) in sides {
        if !value.is_finite() {
            cv_warn!(
                section,
                metric,
                value,
                "layout delegate returned an invalid section inset"
            );
            return Err(CollectionError::InvalidSectionMetric {
                section,
                metric,
                value,
            });
        }
    }
    Ok(insets)
}

#[cfg(test)]
mod tests {
    use super::CollectionViewData;
    use crate::config::{GridLayoutConfig, RowAlignment, RowAlignmentOptions};
    use crate::error::CollectionError;
    use crate::index_path::IndexPath;
    use crate::key::{
        ELEMENT_KIND_SECTION_FOOTER, ELEMENT_KIND_SECTION_HEADER, ElementCategory, ElementKey,
        ElementKinds,
    };
    use crate::source::{DataSource, FlowLayoutDelegate, UniformLayout};
    use crate::update::{UpdateItem, UpdatePlan};
    use alloc::sync::Arc;
    use alloc::vec;
    use alloc::vec::Vec;
    use core::cell::Cell;
    use kurbo::{Insets, Point, Rect, Size};

    /// Counts how often the section count is requested.
    struct CountingSource {
        counts: Vec<usize>,
        fetches: Cell<usize>,
    }

    impl CountingSource {
        fn new(counts: Vec<usize>) -> Self {
            Self {
                counts,
                fetches: Cell::new(0),
            }
        }
    }

    impl DataSource for CountingSource {
        fn number_of_sections(&self) -> usize {
            self.fetches.set(self.fetches.get() + 1);
            self.counts.len()
        }

        fn number_of_items(&self, section: usize) -> usize {
            self.counts.get(section).copied().unwrap_or(0)
        }
    }

    /// Items grow wider with their index; section 0 has a background.
    struct Staircase;

    impl FlowLayoutDelegate for Staircase {
        fn item_size(&self, index_path: IndexPath) -> Size {
            Size::new(20.0 * (index_path.item + 1) as f64, 10.0)
        }

        fn header_extent(&self, _section: usize) -> f64 {
            5.0
        }

        fn decoration_kind(&self, section: usize) -> Option<Arc<str>> {
            (section == 0).then(|| Arc::from("background"))
        }
    }

    struct Broken;

    impl FlowLayoutDelegate for Broken {
        fn item_size(&self, index_path: IndexPath) -> Size {
            if index_path.item == 1 {
                Size::new(-1.0, 10.0)
            } else {
                Size::new(10.0, 10.0)
            }
        }
    }

    fn start_aligned(width: f64) -> GridLayoutConfig {
        GridLayoutConfig::default()
            .with_viewport(Size::new(width, 400.0))
            .with_row_alignment(RowAlignmentOptions::uniform(RowAlignment::Start))
    }

    #[test]
    fn uniform_items_fill_rows_left_to_right() {
        let mut data = CollectionViewData::new(
            [5_usize],
            UniformLayout::new(Size::new(50.0, 50.0)),
            start_aligned(220.0),
        );
        data.validate_layout_in_rect(Rect::new(0.0, 0.0, 220.0, 400.0))
            .unwrap();

        let section = &data.layout_info().sections()[0];
        assert_eq!(section.rows().len(), 2);
        assert_eq!(section.rows()[0].item_count(), 4);
        assert_eq!(section.rows()[1].item_count(), 1);
        assert_eq!(section.rows()[1].first_item(), 4);
        assert_eq!(
            data.rect_for_item_at_index_path(IndexPath::new(0, 3)),
            Ok(Rect::new(150.0, 0.0, 200.0, 50.0))
        );
        assert_eq!(
            data.rect_for_item_at_index_path(IndexPath::new(0, 4)),
            Ok(Rect::new(0.0, 50.0, 50.0, 100.0))
        );
    }

    #[test]
    fn invalidate_refetches_counts() {
        let source = CountingSource::new(vec![3, 2]);
        let mut data = CollectionViewData::new(
            &source,
            UniformLayout::new(Size::new(10.0, 10.0)),
            start_aligned(100.0),
        );
        assert!(!data.layout_is_prepared());
        data.validate_layout_in_rect(Rect::new(0.0, 0.0, 100.0, 100.0))
            .unwrap();
        assert!(data.layout_is_prepared());
        assert_eq!(source.fetches.get(), 1);

        data.invalidate();
        assert!(!data.layout_is_prepared());
        assert_eq!(source.fetches.get(), 1);

        assert_eq!(data.number_of_items(), 5);
        assert_eq!(source.fetches.get(), 2);
        assert!(!data.layout_is_prepared());
        data.rect_for_item_at_index_path(IndexPath::new(1, 1))
            .unwrap();
        assert!(data.layout_is_prepared());
        assert_eq!(source.fetches.get(), 2);
    }

    #[test]
    fn validation_is_idempotent() {
        let source = CountingSource::new(vec![4, 0, 3]);
        let mut data = CollectionViewData::new(&source, Staircase, start_aligned(100.0));
        let rect = Rect::new(0.0, 0.0, 100.0, 400.0);
        data.validate_layout_in_rect(rect).unwrap();
        let first = data.attributes.clone();
        let info = data.layout_info().snapshot();

        data.validate_layout_in_rect(rect).unwrap();
        assert_eq!(data.attributes, first);
        assert_eq!(data.layout_info(), &info);
        assert_eq!(source.fetches.get(), 1);
    }

    #[test]
    fn out_of_range_section_is_not_an_empty_section() {
        let mut data = CollectionViewData::new(
            vec![2_usize, 0],
            UniformLayout::new(Size::new(10.0, 10.0)),
            start_aligned(100.0),
        );
        let sections = data.number_of_sections();
        assert_eq!(data.number_of_items_in_section(1), Ok(0));
        assert_eq!(
            data.number_of_items_in_section(sections),
            Err(CollectionError::SectionOutOfRange {
                section: 2,
                sections: 2,
            })
        );
        assert!(data.number_of_items_before_section(sections).is_err());
        assert_eq!(
            data.rect_for_item_at_index_path(IndexPath::new(0, 2)),
            Err(CollectionError::ItemOutOfRange {
                index_path: IndexPath::new(0, 2),
                items: 2,
            })
        );
        assert!(!data.layout_is_prepared());
    }

    #[test]
    fn global_index_mapping_is_a_bijection() {
        let mut data = CollectionViewData::new(
            [3_usize, 0, 0, 4, 1, 0],
            UniformLayout::new(Size::new(10.0, 10.0)),
            start_aligned(100.0),
        );
        let total = data.number_of_items();
        assert_eq!(total, 8);
        for section in 0..data.number_of_sections() {
            let expected: usize = data.item_counts()[..section].iter().sum();
            assert_eq!(data.number_of_items_before_section(section), Ok(expected));
        }
        for index in 0..total {
            let index_path = data.index_path_for_item_at_global_index(index).unwrap();
            assert_eq!(data.global_index_for_item_at_index_path(index_path), Ok(index));
        }
        assert_eq!(
            data.index_path_for_item_at_global_index(3),
            Ok(IndexPath::new(3, 0))
        );
        assert_eq!(
            data.index_path_for_item_at_global_index(total),
            Err(CollectionError::GlobalIndexOutOfRange {
                index: 8,
                items: 8,
            })
        );
        assert_eq!(
            data.rect_for_global_item_index(7),
            data.rect_for_item_at_index_path(IndexPath::new(4, 0))
        );
    }

    #[test]
    fn content_rect_is_union_of_section_frames() {
        for horizontal in [false, true] {
            for left_to_right in [true, false] {
                let mut config = start_aligned(100.0);
                if horizontal {
                    config = config.horizontal();
                }
                if !left_to_right {
                    config = config.right_to_left();
                }
                let mut data = CollectionViewData::new([4_usize, 0, 3], Staircase, config);
                let content = data.collection_view_content_rect().unwrap();
                let union = data
                    .layout_info()
                    .sections()
                    .iter()
                    .map(|section| section.frame())
                    .reduce(|a, b| a.union(b))
                    .unwrap();
                assert_eq!(
                    content, union,
                    "horizontal={horizontal} left_to_right={left_to_right}"
                );
            }
        }
    }

    #[test]
    fn elements_in_rect_include_views_and_honor_filters() {
        let mut data = CollectionViewData::new([4_usize, 3], Staircase, start_aligned(100.0));
        // Section 0: header 0..5, rows [20, 40] at 5..15, [60] at 15..25, [80] at 25..35.
        let rect = Rect::new(0.0, 0.0, 100.0, 12.0);
        let mut found: Vec<_> = data
            .layout_attributes_for_elements_in_rect(rect)
            .unwrap()
            .map(|attributes| attributes.key())
            .collect();
        found.sort();
        let ip = IndexPath::new;
        assert_eq!(
            found,
            [
                ElementKey::cell(ip(0, 0)),
                ElementKey::cell(ip(0, 1)),
                ElementKey::supplementary(ELEMENT_KIND_SECTION_HEADER, ip(0, 0)),
                ElementKey::decoration("background", ip(0, 0)),
            ]
        );

        let cells_only = data
            .layout_attributes_for_elements_in_rect_filtered(rect, ElementKinds::CELLS)
            .unwrap()
            .count();
        assert_eq!(cells_only, 2);
        let views_only: Vec<_> = data
            .layout_attributes_for_elements_in_rect_filtered(rect, ElementKinds::DECORATION)
            .unwrap()
            .map(|attributes| attributes.category)
            .collect();
        assert_eq!(views_only, [ElementCategory::DecorationView]);

        // Edges that only touch do not intersect.
        let touching = Rect::new(0.0, 35.0, 100.0, 40.0);
        assert!(
            data.layout_attributes_for_elements_in_rect_filtered(touching, ElementKinds::CELLS)
                .unwrap()
                .next()
                .is_none()
        );
    }

    #[test]
    fn section_queries_and_view_rects() {
        let mut data = CollectionViewData::new([2_usize, 1], Staircase, start_aligned(100.0));
        let in_section: Vec<_> = data
            .layout_attributes_for_elements_in_section(0)
            .unwrap()
            .map(|attributes| attributes.category)
            .collect();
        assert_eq!(
            in_section,
            [
                ElementCategory::Cell,
                ElementCategory::Cell,
                ElementCategory::SupplementaryView,
                ElementCategory::DecorationView,
            ]
        );
        assert_eq!(
            data.rect_for_supplementary_element(ELEMENT_KIND_SECTION_HEADER, IndexPath::new(1, 0)),
            Ok(Rect::new(0.0, 15.0, 100.0, 20.0))
        );
        assert_eq!(
            data.rect_for_decoration_element("background", IndexPath::new(0, 0)),
            Ok(Rect::new(0.0, 0.0, 100.0, 15.0))
        );
        let footer = ElementKey::supplementary(ELEMENT_KIND_SECTION_FOOTER, IndexPath::new(0, 0));
        assert_eq!(
            data.rect_for_supplementary_element(ELEMENT_KIND_SECTION_FOOTER, IndexPath::new(0, 0)),
            Err(CollectionError::MissingAttributes(footer))
        );
        assert!(data.layout_attributes_for_elements_in_section(2).is_err());
    }

    #[test]
    fn hit_testing_finds_cells() {
        let mut data = CollectionViewData::new(
            [6_usize],
            UniformLayout::new(Size::new(30.0, 30.0)).with_spacing(5.0, 5.0),
            start_aligned(100.0),
        );
        assert_eq!(
            data.index_path_for_item_at_point(Point::new(40.0, 40.0)),
            Ok(Some(IndexPath::new(0, 4)))
        );
        // The gap between items.
        assert_eq!(data.index_path_for_item_at_point(Point::new(32.0, 10.0)), Ok(None));
    }

    #[test]
    fn floating_headers_follow_the_validated_rect() {
        let layout = UniformLayout::new(Size::new(100.0, 50.0)).with_header_footer(20.0, 0.0);
        let config = start_aligned(100.0).floating_header_footer();
        let mut data = CollectionViewData::new([4_usize, 4], layout, config);
        let header = ELEMENT_KIND_SECTION_HEADER;
        data.validate_layout_in_rect(Rect::new(0.0, 0.0, 100.0, 100.0))
            .unwrap();
        let item = data.rect_for_item_at_index_path(IndexPath::new(0, 1));

        // Section 0 spans 0..220; scroll 60 into it.
        data.validate_layout_in_rect(Rect::new(0.0, 60.0, 100.0, 160.0))
            .unwrap();
        assert_eq!(
            data.rect_for_supplementary_element(header, IndexPath::new(0, 0)),
            Ok(Rect::new(0.0, 60.0, 100.0, 80.0))
        );
        assert_eq!(
            data.rect_for_supplementary_element(header, IndexPath::new(1, 0)),
            Ok(Rect::new(0.0, 220.0, 100.0, 240.0))
        );
        assert_eq!(data.rect_for_item_at_index_path(IndexPath::new(0, 1)), item);
        let z = data
            .layout_attributes_for_elements_in_rect_filtered(
                Rect::new(0.0, 60.0, 100.0, 61.0),
                ElementKinds::SUPPLEMENTARY,
            )
            .unwrap()
            .map(|attributes| attributes.z_index)
            .next();
        assert_eq!(z, Some(1));
    }

    #[test]
    fn invalid_item_sizes_are_reported() {
        let mut data = CollectionViewData::new([3_usize], Broken, start_aligned(100.0));
        assert_eq!(
            data.collection_view_content_rect(),
            Err(CollectionError::InvalidItemSize {
                index_path: IndexPath::new(0, 1),
                size: Size::new(-1.0, 10.0),
            })
        );
        assert!(!data.layout_is_prepared());
        assert_eq!(data.number_of_items(), 3);
    }

    #[test]
    fn invalid_section_metrics_are_reported() {
        let layout = UniformLayout::new(Size::new(10.0, 10.0))
            .with_insets(Insets::new(f64::NAN, 0.0, 0.0, 0.0));
        let mut data = CollectionViewData::new([2_usize], layout, start_aligned(100.0));
        let result = data.rect_for_item_at_index_path(IndexPath::new(0, 0));
        assert!(matches!(
            result,
            Err(CollectionError::InvalidSectionMetric {
                section: 0,
                metric: "inset_x0",
                value,
            }) if value.is_nan()
        ));
        assert!(!data.layout_is_prepared());

        let layout =
            UniformLayout::new(Size::new(10.0, 10.0)).with_header_footer(f64::INFINITY, 0.0);
        let mut data = CollectionViewData::new([1_usize, 1], layout, start_aligned(100.0));
        assert_eq!(
            data.collection_view_content_rect(),
            Err(CollectionError::InvalidSectionMetric {
                section: 0,
                metric: "header_extent",
                value: f64::INFINITY,
            })
        );
        assert!(data.rect_for_item_at_index_path(IndexPath::new(1, 0)).is_err());

        let layout = UniformLayout::new(Size::new(10.0, 10.0)).with_spacing(0.0, -2.0);
        let mut data = CollectionViewData::new([3_usize], layout, start_aligned(100.0));
        assert_eq!(
            data.layout_snapshot(),
            Err(CollectionError::InvalidSectionMetric {
                section: 0,
                metric: "line_spacing",
                value: -2.0,
            })
        );

        // Negative but finite insets are accepted.
        let layout = UniformLayout::new(Size::new(10.0, 10.0))
            .with_insets(Insets::new(-5.0, 0.0, 0.0, 0.0));
        let mut data = CollectionViewData::new([1_usize], layout, start_aligned(100.0));
        assert_eq!(
            data.rect_for_item_at_index_path(IndexPath::new(0, 0)),
            Ok(Rect::new(-5.0, 0.0, 5.0, 10.0))
        );
    }

    #[test]
    fn view_attributes_are_addressable_by_kind() {
        let mut data = CollectionViewData::new([4_usize, 0, 3], Staircase, start_aligned(100.0));
        let header = ELEMENT_KIND_SECTION_HEADER;
        assert_eq!(
            data.existing_supplementary_layout_attributes_in_section(0)
                .count(),
            0
        );

        let attributes = data
            .layout_attributes_for_supplementary_element(header, IndexPath::new(2, 0))
            .unwrap()
            .clone();
        assert_eq!(attributes.key().category(), ElementCategory::SupplementaryView);
        assert_eq!(attributes.z_index, 0);
        assert_eq!(
            data.rect_for_supplementary_element(header, IndexPath::new(2, 0)),
            Ok(attributes.frame)
        );

        let background = data
            .layout_attributes_for_decoration_element("background", IndexPath::new(0, 0))
            .map(|attributes| attributes.frame);
        assert_eq!(background, Ok(data.layout_info().sections()[0].frame()));
        assert_eq!(
            data.layout_attributes_for_decoration_element("background", IndexPath::new(1, 0)),
            Err(CollectionError::MissingAttributes(ElementKey::decoration(
                "background",
                IndexPath::new(1, 0)
            )))
        );

        // Headers only; decoration views are not supplementary.
        let existing: Vec<_> = data
            .existing_supplementary_layout_attributes_in_section(0)
            .map(|attributes| attributes.key().category())
            .collect();
        assert_eq!(existing, [ElementCategory::SupplementaryView]);
        assert_eq!(
            data.existing_supplementary_layout_attributes_in_section(3)
                .count(),
            0
        );
    }

    #[test]
    fn snapshots_survive_new_generations() {
        let mut data = CollectionViewData::new(
            vec![3_usize],
            UniformLayout::new(Size::new(50.0, 50.0)),
            start_aligned(100.0),
        );
        let before = data.layout_snapshot().unwrap();
        let before_counts = data.item_counts().to_vec();

        data.data_source_mut()[0] = 4;
        let plan = UpdatePlan::new([UpdateItem::insert(IndexPath::new(0, 0))]);
        assert_eq!(data.validate_update_plan(&plan, &before_counts), Ok(()));
        assert!(
            data.validate_update_plan(&UpdatePlan::default(), &before_counts)
                .is_err()
        );

        let after = data.layout_snapshot().unwrap();
        assert_eq!(before.content_size(), Size::new(100.0, 100.0));
        assert_eq!(after.content_size(), Size::new(100.0, 100.0));
        assert_eq!(after.section(0).unwrap().item_count(), 4);
        assert_eq!(before.section(0).unwrap().item_count(), 3);

        let moves: Vec<_> = plan.transitions(&before, &after).collect();
        assert_eq!(moves[0].from, None);
        assert_eq!(moves[0].to, Some(Rect::new(0.0, 0.0, 50.0, 50.0)));
    }
}
