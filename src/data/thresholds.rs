use serde::{Deserialize, Serialize};
use crate::error::DecodeError;
use crate::Result;

/// Per-call filtering knobs. Passed fresh on every run, so a live slider upstream
/// only has to build a new value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub confidence_threshold: f32,
    pub iou_threshold: f32,
    pub max_detections: usize,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.25,
            iou_threshold: 0.45,
            max_detections: 30,
        }
    }
}

impl Thresholds {
    pub fn new(confidence_threshold: f32, iou_threshold: f32, max_detections: usize) -> Self {
        Self {
            confidence_threshold,
            iou_threshold,
            max_detections,
        }
    }

    pub fn with_confidence(mut self, x: f32) -> Self {
        self.confidence_threshold = x;
        self
    }

    pub fn with_iou(mut self, x: f32) -> Self {
        self.iou_threshold = x;
        self
    }

    pub fn with_max_detections(mut self, n: usize) -> Self {
        self.max_detections = n;
        self
    }

    /// True when `conf` survives the confidence filter. NaN never does.
    pub fn check_conf(&self, conf: f32) -> bool {
        conf > self.confidence_threshold
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(DecodeError::thresholds(format!(
                "confidence threshold {} is outside [0, 1]",
                self.confidence_threshold
            )));
        }
        if !(0.0..=1.0).contains(&self.iou_threshold) {
            return Err(DecodeError::thresholds(format!(
                "IoU threshold {} is outside [0, 1]",
                self.iou_threshold
            )));
        }
        if self.max_detections == 0 {
            return Err(DecodeError::thresholds("max_detections must be greater than 0"));
        }
        Ok(())
    }
}
