use serde::{Deserialize, Serialize};

/// Axis-aligned box in model-input pixels, kept in corner and size form at once.
#[derive(Default, Debug, Clone, Copy, PartialEq, Serialize, Deserialize, PartialOrd)]
pub struct YoloBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    pub w: f32,
    pub h: f32,
}

impl YoloBox {
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self::default().with_x1y1_x2y2(x1, y1, x2, y2)
    }

    /// `(x1, y1, x2, y2)`
    pub fn xy1_xy2(&self) -> (f32, f32, f32, f32) {
        (self.x1, self.y1, self.x2, self.y2)
    }

    /// `(x1, y1, w, h)`
    pub fn xy1_wh(&self) -> (f32, f32, f32, f32) {
        (self.x1, self.y1, self.w, self.h)
    }

    /// `(cx, cy, w, h)`
    pub fn cxy_wh(&self) -> (f32, f32, f32, f32) {
        (self.x1 + self.w / 2., self.y1 + self.h / 2., self.w, self.h)
    }

    pub fn area(&self) -> f32 {
        self.w * self.h
    }

    /// True unless both sides are strictly positive. NaN sides count as degenerate.
    pub fn is_degenerate(&self) -> bool {
        !(self.w > 0. && self.h > 0.)
    }

    pub fn intersect(&self, other: &YoloBox) -> f32 {
        let overlap_w = self.x2.min(other.x2) - self.x1.max(other.x1);
        let overlap_h = self.y2.min(other.y2) - self.y1.max(other.y1);
        overlap_w.max(0.) * overlap_h.max(0.)
    }

    pub fn union(&self, other: &YoloBox) -> f32 {
        self.area() + other.area() - self.intersect(other)
    }

    /// Intersection over union. Two boxes with no covered area have an IoU of 0.
    pub fn iou(&self, other: &YoloBox) -> f32 {
        let union = self.union(other);
        if union > 0. {
            self.intersect(other) / union
        } else {
            0.
        }
    }

    /// Maps the box into the unit square of a `input_width x input_height` model input.
    ///
    /// The origin is clamped to `[0, 1]` and the size to `[0, 1 - origin]`, so the result
    /// never spills past the right or bottom edge.
    pub fn normalized(&self, input_width: f32, input_height: f32) -> YoloBox {
        // NaN coordinates collapse to 0
        let x = (self.x1 / input_width).max(0.).min(1.);
        let y = (self.y1 / input_height).max(0.).min(1.);
        let w = (self.w / input_width).max(0.).min(1. - x);
        let h = (self.h / input_height).max(0.).min(1. - y);
        YoloBox::default().with_x1y1_wh(x, y, w, h)
    }

    pub fn with_x1y1_x2y2(mut self, x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        self.x1 = x1;
        self.y1 = y1;
        self.x2 = x2;
        self.y2 = y2;
        self.w = x2 - x1;
        self.h = y2 - y1;
        self
    }

    pub fn with_x1y1_wh(mut self, x: f32, y: f32, w: f32, h: f32) -> Self {
        self.x1 = x;
        self.y1 = y;
        self.w = w;
        self.h = h;
        self.x2 = x + w;
        self.y2 = y + h;
        self
    }

    /// Center-form input, as emitted by the legacy head.
    pub fn with_cxcy_wh(mut self, cx: f32, cy: f32, w: f32, h: f32) -> Self {
        self.x1 = cx - w / 2.;
        self.y1 = cy - h / 2.;
        self.x2 = cx + w / 2.;
        self.y2 = cy + h / 2.;
        self.w = w;
        self.h = h;
        self
    }
}
