pub mod network;

pub use network::{BatchNormMlpBuilder, NormalizedMlpBuilder};
