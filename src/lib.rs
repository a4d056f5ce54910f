//! # Metis - Normalized Policy/Value Networks
//!
//! Metis provides configurable feed-forward function approximators intended
//! to serve as policy or value networks inside a reinforcement-learning
//! training loop, together with an instrumentation layer for inspecting and
//! recording their internal activations.
//!
//! ## Key Features
//!
//! - **NormalizedMlp**: a fully-connected stack bracketed by static affine
//!   input/output normalization, so raw observation and action scales never
//!   need pre-normalization by the caller
//! - **BatchNormMlp**: the same stack with running-statistics input
//!   normalization and per-layer dropout instead of static transforms
//! - **Activation instrumentation**: opt-in per-layer output capture into an
//!   in-memory cache plus a CSV histogram sink
//! - **Experiment logging**: named scalar time series with CSV/binary
//!   persistence and optional dashboard mirroring
//! - **Device-aware state**: all network state migrates between compute
//!   devices as one bundle, so buffers and parameters cannot desynchronize
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use metis::builders::NormalizedMlpBuilder;
//! use metis::activations::Nonlinearity;
//! use ndarray::Array2;
//!
//! let mut policy = NormalizedMlpBuilder::new(4, 2)
//!     .hidden_sizes(&[64, 64])
//!     .nonlinearity(Nonlinearity::Tanh)
//!     .build()
//!     .unwrap();
//!
//! let observations = Array2::<f32>::zeros((16, 4));
//! let actions = policy.forward_batch(observations.view());
//! assert_eq!(actions.shape(), &[16, 2]);
//! ```
//!
//! ## Module Organization
//!
//! - [`activations`] - Nonlinearities between fully-connected layers
//! - [`builders`] - Builder patterns for network construction
//! - [`device`] - Compute-device placement for network state bundles
//! - [`error`] - Error types and result handling
//! - [`layers`] - Linear, batch-norm, and dropout layers
//! - [`logging`] - Experiment log (scalar time series)
//! - [`network`] - The two network variants and activation recording
//! - [`tensorboard`] - CSV histogram sink for activation visualization

pub mod activations;
pub mod builders;
pub mod device;
pub mod error;
pub mod layers;
pub mod logging;
pub mod network;
pub mod tensorboard;

#[cfg(test)]
mod tests;
