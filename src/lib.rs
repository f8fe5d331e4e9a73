mod utils;
pub mod common;
pub mod data;
pub mod detection_runners;
pub mod error;
pub mod extern_c_api;

use std::time::Instant;
use crate::common::{Detection, ModelOutputDescriptor};
use crate::data::{PipelineConfig, LabelTable, Thresholds};
use crate::detection_runners::{DetectionPipeline, TensorView};
use crate::error::DecodeError;

pub type Result<T, E = DecodeError> = std::result::Result<T, E>;

pub fn init_pipeline(config: &PipelineConfig) -> anyhow::Result<DetectionPipeline> {
    log::info!("Initializing post-processing pipeline\n{}", config.descriptor.to_string());
    config.build()
}

/// Decodes one raw output buffer with a pipeline built by [`init_pipeline`].
pub fn run_detection(pipeline: &DetectionPipeline, buffer: &[f32], shape: &[usize], thresholds: &Thresholds) -> Result<Vec<Detection>> {
    let now = Instant::now();

    let tensor = TensorView::new(buffer, shape)?;
    let detections = pipeline.run(&tensor, thresholds)?;

    log::debug!("Post-processing time: {:?}", now.elapsed());

    Ok(detections)
}

/// One-shot decode with default pipeline options.
pub fn decode(tensor: &TensorView, descriptor: &ModelOutputDescriptor, thresholds: &Thresholds, labels: &LabelTable) -> Result<Vec<Detection>> {
    DetectionPipeline::new(*descriptor)?
        .with_labels(labels.clone())
        .run(tensor, thresholds)
}
