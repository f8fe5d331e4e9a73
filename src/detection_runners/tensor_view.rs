use half::f16;
use ndarray::ArrayView2;
use crate::common::OutputConvention;
use crate::error::DecodeError;
use crate::Result;

/// Read-only 2-D view over a flat model output buffer.
///
/// Rank-2 shapes are taken as-is. Rank-3 shapes must carry a leading batch of 1,
/// which is dropped. The remaining axes are `[features, anchors]` for the legacy
/// layout and `[detections, stride]` for the fixed-stride layout.
#[derive(Debug, Clone)]
pub struct TensorView<'a> {
    view: ArrayView2<'a, f32>,
}

impl<'a> TensorView<'a> {
    pub fn new(buffer: &'a [f32], shape: &[usize]) -> Result<Self> {
        let dims = match *shape {
            [outer, inner] => (outer, inner),
            [batch, outer, inner] => {
                if batch != 1 {
                    return Err(DecodeError::shape(format!(
                        "batch dimension must be 1, got shape {shape:?}"
                    )));
                }
                (outer, inner)
            }
            _ => {
                return Err(DecodeError::shape(format!(
                    "rank {} is not supported, expected 2 or 3 (shape {shape:?})",
                    shape.len()
                )))
            }
        };

        let expected = dims
            .0
            .checked_mul(dims.1)
            .ok_or_else(|| DecodeError::shape(format!("shape {shape:?} overflows")))?;
        if buffer.len() != expected {
            return Err(DecodeError::shape(format!(
                "buffer holds {} values but shape {shape:?} needs {expected}",
                buffer.len()
            )));
        }

        let view = ArrayView2::from_shape(dims, buffer)
            .map_err(|e| DecodeError::shape(e.to_string()))?;
        Ok(Self { view })
    }

    /// `(outer, inner)` extents after the batch axis is dropped.
    pub fn dims(&self) -> (usize, usize) {
        self.view.dim()
    }

    /// Reads `[outer, inner]`: `(channel, anchor)` for Legacy, `(detection, field)` for FixedStride.
    ///
    /// # Panics
    ///
    /// Both indexes must be below [`TensorView::dims`].
    pub fn element_at(&self, outer: usize, inner: usize) -> f32 {
        self.view[[outer, inner]]
    }

    pub fn anchor_or_detection_count(&self, convention: OutputConvention) -> usize {
        let (outer, inner) = self.dims();
        match convention {
            OutputConvention::Legacy => inner,
            OutputConvention::FixedStride => outer,
        }
    }

    pub fn feature_or_stride_count(&self, convention: OutputConvention) -> usize {
        let (outer, inner) = self.dims();
        match convention {
            OutputConvention::Legacy => outer,
            OutputConvention::FixedStride => inner,
        }
    }

    /// One row per anchor or detection, one column per feature.
    ///
    /// The legacy layout is transposed without copying, so each row is a strided view.
    pub fn records(&self, convention: OutputConvention) -> ArrayView2<'a, f32> {
        match convention {
            OutputConvention::Legacy => self.view.clone().reversed_axes(),
            OutputConvention::FixedStride => self.view.clone(),
        }
    }
}

/// Owned `f32` tensor, used when the model hands back a different element type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OwnedTensor {
    data: Vec<f32>,
    shape: Vec<usize>,
}

impl OwnedTensor {
    pub fn new(data: Vec<f32>, shape: &[usize]) -> Self {
        Self {
            data,
            shape: shape.to_vec(),
        }
    }

    /// Widens a half-precision output (Core ML and GPU delegates commonly emit fp16).
    pub fn from_f16(data: &[f16], shape: &[usize]) -> Self {
        Self::new(data.iter().map(|x| x.to_f32()).collect(), shape)
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn view(&self) -> Result<TensorView<'_>> {
        TensorView::new(&self.data, &self.shape)
    }
}
