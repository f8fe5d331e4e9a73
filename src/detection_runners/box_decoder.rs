use ndarray::ArrayView1;
use crate::common::{OutputConvention, YoloBox};

/// Turns the first four fields of a record into a pixel-space box.
#[derive(Debug, Clone, Copy)]
pub struct BoxDecoder {
    convention: OutputConvention,
}

impl BoxDecoder {
    pub fn new(convention: OutputConvention) -> Self {
        Self { convention }
    }

    /// Legacy records are `(cx, cy, w, h)`; fixed-stride records are `(x1, y1, x2, y2)`
    /// and are dropped when they do not span a positive area.
    pub fn decode(&self, record: ArrayView1<f32>) -> Option<YoloBox> {
        let (a, b, c, d) = (record[0], record[1], record[2], record[3]);
        match self.convention {
            OutputConvention::Legacy => Some(YoloBox::default().with_cxcy_wh(a, b, c, d)),
            OutputConvention::FixedStride => {
                let bbox = YoloBox::default().with_x1y1_x2y2(a, b, c, d);
                if bbox.is_degenerate() {
                    return None;
                }
                Some(bbox)
            }
        }
    }
}
