use std::collections::BTreeMap;
use std::time::Instant;
use ndarray::{ArrayView1, Axis};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::common::{Detection, Keypoint, ModelOutputDescriptor, YoloBox};
use crate::data::{LabelTable, Thresholds};
use crate::detection_runners::box_decoder::BoxDecoder;
use crate::detection_runners::extras::ExtrasExtractor;
use crate::detection_runners::nms::{self, Nms};
use crate::detection_runners::score_decoder::{ScoreDecoder, ScoreNormalization};
use crate::detection_runners::tensor_view::TensorView;
use crate::error::DecodeError;
use crate::{utils, Result};

/// Below this many records the decode loop stays on the calling thread.
pub const PARALLEL_MIN_RECORDS: usize = 1024;

/// How the `max_detections` cap picks which kept detections survive.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapOrder {
    /// Keep the prefix of the class-ascending, confidence-descending list.
    #[default]
    ClassOrder,
    /// Re-sort all kept detections by confidence before taking the prefix.
    GlobalConfidence,
}

/// A decoded record that passed the confidence filter, before suppression.
#[derive(Debug, Clone)]
struct Candidate {
    class_index: usize,
    confidence: f32,
    bbox: YoloBox,
    mask_coefficients: Vec<f32>,
    keypoints: Vec<Keypoint>,
}

impl Nms for Candidate {
    fn iou(&self, other: &Self) -> f32 {
        self.bbox.iou(&other.bbox)
    }

    fn confidence(&self) -> f32 {
        self.confidence
    }
}

/// Raw output tensor in, ordered detection list out.
///
/// The pipeline holds only static per-model state, so one instance can serve any
/// number of frames and threads at once.
#[derive(Debug, Clone)]
pub struct DetectionPipeline {
    descriptor: ModelOutputDescriptor,
    labels: LabelTable,
    score_decoder: ScoreDecoder,
    box_decoder: BoxDecoder,
    extras: ExtrasExtractor,
    cap_order: CapOrder,
    parallel_decode: bool,
    profile: bool,
}

impl DetectionPipeline {
    pub fn new(descriptor: ModelOutputDescriptor) -> Result<Self> {
        descriptor.validate()?;
        Ok(Self {
            descriptor,
            labels: LabelTable::default(),
            score_decoder: ScoreDecoder::new(&descriptor, ScoreNormalization::default()),
            box_decoder: BoxDecoder::new(descriptor.output_convention),
            extras: ExtrasExtractor::new(&descriptor),
            cap_order: CapOrder::default(),
            parallel_decode: true,
            profile: false,
        })
    }

    pub fn with_labels(mut self, labels: LabelTable) -> Self {
        self.labels = labels;
        self
    }

    pub fn with_score_normalization(mut self, normalization: ScoreNormalization) -> Self {
        self.score_decoder = ScoreDecoder::new(&self.descriptor, normalization);
        self
    }

    pub fn with_cap_order(mut self, cap_order: CapOrder) -> Self {
        self.cap_order = cap_order;
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

    pub fn descriptor(&self) -> &ModelOutputDescriptor {
        &self.descriptor
    }

    pub fn labels(&self) -> &LabelTable {
        &self.labels
    }

    pub fn cap_order(&self) -> CapOrder {
        self.cap_order
    }

    /// Checks the tensor and thresholds against this model before any decode work.
    pub fn validate(&self, tensor: &TensorView, thresholds: &Thresholds) -> Result<()> {
        thresholds.validate()?;
        let convention = self.descriptor.output_convention;
        let record_len = tensor.feature_or_stride_count(convention);
        let needed = self.descriptor.min_record_len();
        if record_len < needed {
            return Err(DecodeError::descriptor(format!(
                "{convention} records hold {record_len} values but {} classes, {} mask channels and {} keypoint values need {needed}",
                self.descriptor.num_classes,
                self.descriptor.mask_channel_count,
                self.descriptor.keypoint_channels(),
            )));
        }
        Ok(())
    }

    /// Runs decode, confidence filtering, per-class suppression and the result cap.
    ///
    /// Detections come back grouped by ascending class index, each group in the order
    /// suppression kept them (confidence descending), unless [`CapOrder::GlobalConfidence`]
    /// is selected.
    pub fn run(&self, tensor: &TensorView, thresholds: &Thresholds) -> Result<Vec<Detection>> {
        self.validate(tensor, thresholds)?;

        let start = Instant::now();
        let mut elapsed = start.elapsed();

        let candidates = self.decode_candidates(tensor, thresholds);
        let num_candidates = candidates.len();
        if self.profile {
            elapsed = utils::trace("TIME", "Decode", start, elapsed);
        }

        let mut kept = self.suppress(candidates, thresholds.iou_threshold);
        let num_kept = kept.len();
        if self.profile {
            elapsed = utils::trace("TIME", "NMS", start, elapsed);
        }

        if self.cap_order == CapOrder::GlobalConfidence {
            kept.sort_by(|a, b| {
                b.confidence
                    .partial_cmp(&a.confidence)
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
        }
        kept.truncate(thresholds.max_detections);

        let detections = kept
            .into_iter()
            .map(|c| self.to_detection(c))
            .collect::<Vec<_>>();

        log::debug!(
            "{} records -> {} candidates -> {} kept -> {} returned",
            tensor.anchor_or_detection_count(self.descriptor.output_convention),
            num_candidates,
            num_kept,
            detections.len()
        );
        if self.profile {
            utils::trace("TIME", "Collect", start, elapsed);
        }

        Ok(detections)
    }

    /// Number of records that pass the score filter and box checks, before suppression.
    pub fn count_candidates(&self, tensor: &TensorView, thresholds: &Thresholds) -> Result<usize> {
        self.validate(tensor, thresholds)?;
        Ok(self.decode_candidates(tensor, thresholds).len())
    }

    fn decode_record(&self, record: ArrayView1<f32>, thresholds: &Thresholds) -> Option<Candidate> {
        let (class_index, confidence) = self.score_decoder.decode(record)?;

        // filtering low scores
        if !thresholds.check_conf(confidence) {
            return None;
        }

        let bbox = self.box_decoder.decode(record)?;

        Some(Candidate {
            class_index,
            confidence,
            bbox,
            mask_coefficients: self.extras.mask_coefficients(record),
            keypoints: self.extras.keypoints(record),
        })
    }

    fn decode_candidates(&self, tensor: &TensorView, thresholds: &Thresholds) -> Vec<Candidate> {
        let records = tensor.records(self.descriptor.output_convention);

        // rayon's Vec collect keeps record order, so both paths agree
        if self.parallel_decode && records.nrows() >= PARALLEL_MIN_RECORDS {
            records
                .axis_iter(Axis(0))
                .into_par_iter()
                .filter_map(|record| self.decode_record(record, thresholds))
                .collect()
        } else {
            records
                .axis_iter(Axis(0))
                .filter_map(|record| self.decode_record(record, thresholds))
                .collect()
        }
    }

    fn suppress(&self, candidates: Vec<Candidate>, iou_threshold: f32) -> Vec<Candidate> {
        let mut groups: BTreeMap<usize, Vec<Candidate>> = BTreeMap::new();
        for candidate in candidates {
            groups.entry(candidate.class_index).or_default().push(candidate);
        }
        let groups = groups.into_values().collect::<Vec<_>>();

        let kept: Vec<Vec<Candidate>> = if self.parallel_decode && groups.len() > 1 {
            groups
                .into_par_iter()
                .map(|group| nms::suppressed(group, iou_threshold))
                .collect()
        } else {
            groups
                .into_iter()
                .map(|group| nms::suppressed(group, iou_threshold))
                .collect()
        };

        kept.into_iter().flatten().collect()
    }

    fn to_detection(&self, candidate: Candidate) -> Detection {
        let label = self.labels.name(candidate.class_index);
        Detection::new(candidate.class_index, candidate.bbox, label, candidate.confidence)
            .with_input_size(self.descriptor.input_width, self.descriptor.input_height)
            .with_mask_coefficients(candidate.mask_coefficients)
            .with_keypoints(candidate.keypoints)
    }
}
