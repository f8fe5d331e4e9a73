use serde::{Deserialize, Serialize};

/// Layout of the raw detection tensor produced by an exported model.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputConvention {
    /// `[4 + nc + extras, anchors]`: center-form boxes, one channel per class, anchors last.
    #[default]
    Legacy,
    /// `[detections, 6 + extras]`: corner-form boxes, then score and class id, one row per detection.
    FixedStride,
}

// Hardcoded convention names. Storing the "proper" spelling and the lowercase version.
const LEGACY: [&str; 2] = ["Legacy", "legacy"];
const FIXED_STRIDE: [&str; 2] = ["FixedStride", "fixed_stride"];

/// Fields preceding the extras in a fixed-stride row: x1, y1, x2, y2, score, class id.
pub const FIXED_STRIDE_HEAD: usize = 6;

/// Box channels preceding the class scores in a legacy layout.
pub const LEGACY_BOX_CHANNELS: usize = 4;

impl OutputConvention {
    pub fn from_str(convention: &str) -> Option<Self> {
        match convention.to_lowercase().as_str() {
            "legacy" | "yolov8" | "yolo11" | "yolov11" => Some(OutputConvention::Legacy),
            "fixed_stride" | "fixedstride" | "yolo26" | "yolov10" => Some(OutputConvention::FixedStride),
            _ => None,
        }
    }

    pub fn str(&self) -> &'static str {
        match self {
            OutputConvention::Legacy => LEGACY[0],
            OutputConvention::FixedStride => FIXED_STRIDE[0],
        }
    }

    pub fn str_lowercase(&self) -> &'static str {
        match self {
            OutputConvention::Legacy => LEGACY[1],
            OutputConvention::FixedStride => FIXED_STRIDE[1],
        }
    }

    /// Offset of the first value after the box and score fields.
    pub fn extras_offset(&self, num_classes: usize) -> usize {
        match self {
            OutputConvention::Legacy => LEGACY_BOX_CHANNELS.saturating_add(num_classes),
            OutputConvention::FixedStride => FIXED_STRIDE_HEAD,
        }
    }
}

impl std::fmt::Display for OutputConvention {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.str())
    }
}
