use serde::{Deserialize, Serialize};
use crate::common::output_convention::{OutputConvention, FIXED_STRIDE_HEAD, LEGACY_BOX_CHANNELS};
use crate::error::DecodeError;
use crate::Result;

/// Static description of a loaded model's detection output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelOutputDescriptor {
    pub num_classes: usize,
    /// Mask-coefficient channels. Zero unless the model is a segmentation model.
    pub mask_channel_count: usize,
    /// Pose keypoints per detection. Zero unless the model is a pose model.
    pub keypoint_count: usize,
    /// Values per keypoint: 2 (x, y) or 3 (x, y, visibility).
    pub keypoint_dims: usize,
    pub output_convention: OutputConvention,
    pub input_width: f32,
    pub input_height: f32,
}

impl Default for ModelOutputDescriptor {
    fn default() -> Self {
        Self {
            num_classes: 80, // Default COCO class number
            mask_channel_count: 0,
            keypoint_count: 0,
            keypoint_dims: 3,
            output_convention: OutputConvention::Legacy,
            input_width: 640.,
            input_height: 640.,
        }
    }
}

impl ModelOutputDescriptor {
    pub fn new(num_classes: usize, mask_channel_count: usize, output_convention: OutputConvention) -> Self {
        Self {
            num_classes,
            mask_channel_count,
            output_convention,
            ..Default::default()
        }
    }

    pub fn detect(num_classes: usize, output_convention: OutputConvention) -> Self {
        Self::new(num_classes, 0, output_convention)
    }

    pub fn segment(num_classes: usize, mask_channel_count: usize, output_convention: OutputConvention) -> Self {
        Self::new(num_classes, mask_channel_count, output_convention)
    }

    pub fn pose(num_classes: usize, keypoint_count: usize, keypoint_dims: usize, output_convention: OutputConvention) -> Self {
        Self {
            num_classes,
            keypoint_count,
            keypoint_dims,
            output_convention,
            ..Default::default()
        }
    }

    pub fn with_input_size(mut self, width: f32, height: f32) -> Self {
        self.input_width = width;
        self.input_height = height;
        self
    }

    pub fn keypoint_channels(&self) -> usize {
        self.keypoint_count.saturating_mul(self.keypoint_dims)
    }

    /// Trailing per-record values after the box and score fields.
    pub fn extra_channels(&self) -> usize {
        self.mask_channel_count.saturating_add(self.keypoint_channels())
    }

    /// Smallest feature (Legacy) or stride (FixedStride) count this descriptor can decode,
    /// or `None` when the channel counts overflow `usize`.
    pub fn checked_record_len(&self) -> Option<usize> {
        let extras = self
            .keypoint_count
            .checked_mul(self.keypoint_dims)?
            .checked_add(self.mask_channel_count)?;
        match self.output_convention {
            OutputConvention::Legacy => LEGACY_BOX_CHANNELS.checked_add(self.num_classes)?.checked_add(extras),
            OutputConvention::FixedStride => FIXED_STRIDE_HEAD.checked_add(extras),
        }
    }

    /// Same as [`Self::checked_record_len`], saturating at `usize::MAX`.
    pub fn min_record_len(&self) -> usize {
        self.checked_record_len().unwrap_or(usize::MAX)
    }

    /// Checks the descriptor's own invariants, independent of any tensor.
    pub fn validate(&self) -> Result<()> {
        if self.mask_channel_count > 0 && self.keypoint_count > 0 {
            return Err(DecodeError::descriptor(format!(
                "a model cannot carry both mask coefficients ({}) and keypoints ({})",
                self.mask_channel_count, self.keypoint_count
            )));
        }
        if self.keypoint_count > 0 && !(2..=3).contains(&self.keypoint_dims) {
            return Err(DecodeError::descriptor(format!(
                "keypoint_dims must be 2 or 3, got {}",
                self.keypoint_dims
            )));
        }
        if self.checked_record_len().is_none() {
            return Err(DecodeError::descriptor(format!(
                "channel counts overflow: {} classes, {} mask channels, {}x{} keypoint values",
                self.num_classes, self.mask_channel_count, self.keypoint_count, self.keypoint_dims
            )));
        }
        if self.output_convention == OutputConvention::Legacy && self.num_classes == 0 {
            return Err(DecodeError::descriptor("legacy layout needs at least one class channel"));
        }
        if !(self.input_width > 0. && self.input_height > 0.) {
            return Err(DecodeError::descriptor(format!(
                "model input size must be positive, got {}x{}",
                self.input_width, self.input_height
            )));
        }
        Ok(())
    }

    pub fn to_string(&self) -> String {
        format!("Output Convention: {}\n\
        Classes: {}\n\
        Mask Channels: {}\n\
        Keypoints: {}x{}\n\
        Model Input Resolution: {}x{}",
                self.output_convention, self.num_classes, self.mask_channel_count,
                self.keypoint_count, self.keypoint_dims,
                self.input_width, self.input_height)
    }
}
