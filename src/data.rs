mod config_pipeline;
mod label_table;
mod thresholds;
pub mod time_calc;

pub use config_pipeline::PipelineConfig;
pub use label_table::LabelTable;
pub use thresholds::Thresholds;
pub use time_calc::{smooth, FpsMeter};
