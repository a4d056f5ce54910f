//! The two network variants and their shared activation instrumentation.

pub mod batchnorm;
pub mod normalized;
pub mod recorder;

pub use batchnorm::BatchNormMlp;
pub use normalized::{BoundaryTransform, NormalizedMlp};
pub use recorder::ActivationRecorder;
