// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use kurbo::{Insets, Point, Rect, Size, Vec2};

/// Maps between the grid's logical axes and x/y.
///
/// Rows *stack* along one axis and items *flow* within a row along the other.
/// Vertical grids stack along y and flow along x; horizontal grids swap them.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Axes {
    horizontal: bool,
}

impl Axes {
    pub(crate) const fn new(horizontal: bool) -> Self {
        Self { horizontal }
    }

    pub(crate) fn flow(self, size: Size) -> f64 {
        if self.horizontal {
            size.height
        } else {
            size.width
        }
    }

    pub(crate) fn stack(self, size: Size) -> f64 {
        if self.horizontal {
            size.width
        } else {
            size.height
        }
    }

    pub(crate) fn size(self, stack: f64, flow: f64) -> Size {
        if self.horizontal {
            Size::new(stack, flow)
        } else {
            Size::new(flow, stack)
        }
    }

    pub(crate) fn point(self, stack: f64, flow: f64) -> Point {
        if self.horizontal {
            Point::new(stack, flow)
        } else {
            Point::new(flow, stack)
        }
    }

    pub(crate) fn rect(self, stack: f64, flow: f64, stack_len: f64, flow_len: f64) -> Rect {
        Rect::from_origin_size(self.point(stack, flow), self.size(stack_len, flow_len))
    }

    /// Offset along the stacking axis only.
    pub(crate) fn stack_offset(self, delta: f64) -> Vec2 {
        if self.horizontal {
            Vec2::new(delta, 0.0)
        } else {
            Vec2::new(0.0, delta)
        }
    }

    pub(crate) fn stack_start(self, rect: Rect) -> f64 {
        if self.horizontal { rect.x0 } else { rect.y0 }
    }

    pub(crate) fn stack_end(self, rect: Rect) -> f64 {
        if self.horizontal { rect.x1 } else { rect.y1 }
    }

    /// Leading and trailing insets along the flow axis.
    pub(crate) fn flow_insets(self, insets: Insets) -> (f64, f64) {
        if self.horizontal {
            (insets.y0, insets.y1)
        } else {
            (insets.x0, insets.x1)
        }
    }

    /// Leading and trailing insets along the stacking axis.
    pub(crate) fn stack_insets(self, insets: Insets) -> (f64, f64) {
        if self.horizontal {
            (insets.x0, insets.x1)
        } else {
            (insets.y0, insets.y1)
        }
    }
}

/// Reflect `rect` horizontally within `[0, width]`.
pub(crate) fn mirror_x(rect: Rect, width: f64) -> Rect {
    Rect::new(width - rect.x1, rect.y0, width - rect.x0, rect.y1)
}

/// Whether two rectangles share interior area. Touching edges do not count.
pub(crate) fn intersects(a: Rect, b: Rect) -> bool {
    a.x0 < b.x1 && b.x0 < a.x1 && a.y0 < b.y1 && b.y0 < a.y1
}

/// Clamp without panicking when `hi < lo`; `lo` wins.
pub(crate) fn clamp_to(value: f64, lo: f64, hi: f64) -> f64 {
    value.min(hi).max(lo)
}
