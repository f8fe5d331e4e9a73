pub mod box_decoder;
pub mod extras;
pub mod nms;
pub mod pipeline;
pub mod score_decoder;
pub mod tensor_view;

pub use pipeline::{CapOrder, DetectionPipeline, PARALLEL_MIN_RECORDS};
pub use score_decoder::ScoreNormalization;
pub use tensor_view::{OwnedTensor, TensorView};
