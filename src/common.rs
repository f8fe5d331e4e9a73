mod detection;
mod model_descriptor;
mod yolo_box;
pub mod output_convention;

pub use detection::*;
pub use model_descriptor::*;
pub use output_convention::OutputConvention;
pub use yolo_box::*;
