//! Options for building a detection pipeline.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use crate::common::{ModelOutputDescriptor, OutputConvention};
use crate::data::{LabelTable, Thresholds};
use crate::detection_runners::{CapOrder, DetectionPipeline, ScoreNormalization};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub descriptor: ModelOutputDescriptor,
    pub thresholds: Thresholds,
    pub score_normalization: ScoreNormalization,
    pub cap_order: CapOrder,
    pub parallel_decode: bool,
    pub profile: bool,
    pub names: Option<Vec<String>>,
    /// Label file, one class name per line. Ignored when `names` is set.
    pub labels_path: Option<String>,
    /// Class-name blob taken from the exported model's metadata.
    pub names_metadata: Option<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            descriptor: ModelOutputDescriptor::default(),
            thresholds: Thresholds::default(),
            score_normalization: ScoreNormalization::default(),
            cap_order: CapOrder::default(),
            parallel_decode: true,
            profile: false,
            names: None,
            labels_path: None,
            names_metadata: None,
        }
    }
}

impl PipelineConfig {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("invalid pipeline config JSON")
    }

    pub fn from_json_file(path: &str) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read pipeline config {path}"))?;
        Self::from_json_str(&json)
    }

    pub fn with_descriptor(mut self, descriptor: ModelOutputDescriptor) -> Self {
        self.descriptor = descriptor;
        self
    }

    pub fn with_convention(mut self, x: OutputConvention) -> Self {
        self.descriptor.output_convention = x;
        self
    }

    pub fn with_nc(mut self, nc: usize) -> Self {
        self.descriptor.num_classes = nc;
        self
    }

    pub fn with_mask_channels(mut self, n: usize) -> Self {
        self.descriptor.mask_channel_count = n;
        self
    }

    pub fn with_keypoints(mut self, count: usize, dims: usize) -> Self {
        self.descriptor.keypoint_count = count;
        self.descriptor.keypoint_dims = dims;
        self
    }

    pub fn with_model_width(mut self, x: f32) -> Self {
        self.descriptor.input_width = x;
        self
    }

    pub fn with_model_height(mut self, x: f32) -> Self {
        self.descriptor.input_height = x;
        self
    }

    pub fn with_thresholds(mut self, x: Thresholds) -> Self {
        self.thresholds = x;
        self
    }

    pub fn with_conf(mut self, x: f32) -> Self {
        self.thresholds.confidence_threshold = x;
        self
    }

    pub fn with_iou(mut self, x: f32) -> Self {
        self.thresholds.iou_threshold = x;
        self
    }

    pub fn with_max_detections(mut self, n: usize) -> Self {
        self.thresholds.max_detections = n;
        self
    }

    pub fn with_score_normalization(mut self, x: ScoreNormalization) -> Self {
        self.score_normalization = x;
        self
    }

    pub fn with_cap_order(mut self, x: CapOrder) -> Self {
        self.cap_order = x;
        self
    }

    pub fn with_parallel_decode(mut self, x: bool) -> Self {
        self.parallel_decode = x;
        self
    }

    pub fn with_profile(mut self, profile: bool) -> Self {
        self.profile = profile;
        self
    }

    pub fn with_names(mut self, names: &[&str]) -> Self {
        self.names = Some(names.iter().map(|x| x.to_string()).collect::<Vec<String>>());
        self
    }

    pub fn with_labels_path(mut self, path: &str) -> Self {
        self.labels_path = Some(path.to_string());
        self
    }

    pub fn with_names_metadata(mut self, blob: &str) -> Self {
        self.names_metadata = Some(blob.to_string());
        self
    }

    /// Class names: user-defined, then label file, then model metadata.
    pub fn labels(&self) -> Result<LabelTable> {
        if let Some(names) = &self.names {
            return Ok(LabelTable::new(names.clone()));
        }
        if let Some(path) = &self.labels_path {
            return LabelTable::from_file(path);
        }
        if let Some(blob) = &self.names_metadata {
            return LabelTable::from_metadata(blob);
        }
        Ok(LabelTable::default())
    }

    pub fn build(&self) -> Result<DetectionPipeline> {
        let labels = self.labels()?;

        if labels.is_empty() {
            log::warn!("No class names configured, detections will carry empty labels");
        } else if labels.len() != self.descriptor.num_classes {
            match self.descriptor.output_convention {
                OutputConvention::Legacy => bail!(
                    "The lengths of class names: {} and the model's class count: {} do not match.",
                    labels.len(),
                    self.descriptor.num_classes,
                ),
                // fixed-stride rows carry a class id, not one channel per class
                OutputConvention::FixedStride => log::warn!(
                    "{} class names configured for a model with {} classes",
                    labels.len(),
                    self.descriptor.num_classes
                ),
            }
        }

        let pipeline = DetectionPipeline::new(self.descriptor)?
            .with_labels(labels)
            .with_score_normalization(self.score_normalization)
            .with_cap_order(self.cap_order)
            .with_parallel_decode(self.parallel_decode)
            .with_profile(self.profile);

        // Summary
        log::info!(
            "Pipeline ready: {} layout, {} classes, {} mask channels, {} keypoints, score {:?}, cap {:?}",
            self.descriptor.output_convention,
            self.descriptor.num_classes,
            self.descriptor.mask_channel_count,
            self.descriptor.keypoint_count,
            self.score_normalization,
            self.cap_order,
        );

        Ok(pipeline)
    }
}
