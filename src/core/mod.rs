//! Core confidence-mask processing modules

pub mod binary;
pub mod aggregate;
pub mod confidence;
pub mod clump;
pub mod pipeline;

// Re-export main types
pub use binary::{class_presence, presence_stack};
pub use aggregate::{normalized_frequency, reduce_and, reduce_or, reduce_sum, AggregateMethod};
pub use confidence::{
    mask_positive, mask_positive_counts, ConfidenceParams, ConfidenceProcessor, ConfidenceProducts,
};
pub use clump::{connected_pixel_count, label_components, ClumpFilter, ClumpParams};
pub use pipeline::{MaskPipeline, PipelineParams};
