use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};
use crate::common::output_convention::LEGACY_BOX_CHANNELS;
use crate::common::{ModelOutputDescriptor, OutputConvention};

const FIXED_STRIDE_SCORE: usize = 4;
const FIXED_STRIDE_CLASS: usize = 5;

/// Transform applied to a fixed-stride row's raw score before thresholding.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreNormalization {
    /// The exported head already emits probabilities.
    #[default]
    Identity,
    /// The exported head emits logits.
    Sigmoid,
}

impl ScoreNormalization {
    pub fn apply(&self, raw: f32) -> f32 {
        match self {
            ScoreNormalization::Identity => raw,
            ScoreNormalization::Sigmoid => sigmoid(raw),
        }
    }
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

/// Picks the best class and its score for one record.
#[derive(Debug, Clone, Copy)]
pub struct ScoreDecoder {
    convention: OutputConvention,
    num_classes: usize,
    normalization: ScoreNormalization,
}

impl ScoreDecoder {
    pub fn new(descriptor: &ModelOutputDescriptor, normalization: ScoreNormalization) -> Self {
        Self {
            convention: descriptor.output_convention,
            num_classes: descriptor.num_classes,
            normalization,
        }
    }

    pub fn normalization(&self) -> ScoreNormalization {
        self.normalization
    }

    /// Returns `(class_index, score)`, or `None` when the record carries no usable class.
    ///
    /// Legacy records take the raw maximum over the class channels; the first maximum
    /// wins and NaN never wins. Fixed-stride records read the score field through the
    /// configured normalization and round the class-id field.
    pub fn decode(&self, record: ArrayView1<f32>) -> Option<(usize, f32)> {
        match self.convention {
            OutputConvention::Legacy => {
                let mut class_index = 0;
                let mut class_score = f32::NEG_INFINITY;
                let mut found = false;
                for c in 0..self.num_classes {
                    let score = record[LEGACY_BOX_CHANNELS + c];
                    if score > class_score {
                        class_index = c;
                        class_score = score;
                        found = true;
                    }
                }
                found.then_some((class_index, class_score))
            }
            OutputConvention::FixedStride => {
                let class_field = record[FIXED_STRIDE_CLASS].round();
                if !class_field.is_finite() || class_field < 0. {
                    return None;
                }
                let score = self.normalization.apply(record[FIXED_STRIDE_SCORE]);
                Some((class_field as usize, score))
            }
        }
    }
}
