use ndarray::{s, ArrayView1};
use crate::common::{Keypoint, ModelOutputDescriptor};

/// Copies the trailing per-record values: mask coefficients for segmentation
/// models, keypoints for pose models.
#[derive(Debug, Clone, Copy)]
pub struct ExtrasExtractor {
    offset: usize,
    mask_channel_count: usize,
    keypoint_count: usize,
    keypoint_dims: usize,
}

impl ExtrasExtractor {
    pub fn new(descriptor: &ModelOutputDescriptor) -> Self {
        Self {
            offset: descriptor.output_convention.extras_offset(descriptor.num_classes),
            mask_channel_count: descriptor.mask_channel_count,
            keypoint_count: descriptor.keypoint_count,
            keypoint_dims: descriptor.keypoint_dims,
        }
    }

    /// Mask coefficients for one record. Empty when the model has no mask channels.
    pub fn mask_coefficients(&self, record: ArrayView1<f32>) -> Vec<f32> {
        if self.mask_channel_count == 0 {
            return Vec::new();
        }
        record
            .slice(s![self.offset..self.offset + self.mask_channel_count])
            .to_vec()
    }

    /// Keypoints for one record. Empty unless the model is a pose model.
    pub fn keypoints(&self, record: ArrayView1<f32>) -> Vec<Keypoint> {
        if self.keypoint_count == 0 {
            return Vec::new();
        }
        let start = self.offset + self.mask_channel_count;
        (0..self.keypoint_count)
            .map(|k| {
                let base = start + k * self.keypoint_dims;
                Keypoint {
                    x: record[base],
                    y: record[base + 1],
                    confidence: if self.keypoint_dims > 2 { record[base + 2] } else { 1. },
                }
            })
            .collect()
    }
}
