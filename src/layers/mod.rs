pub mod batch_norm;
pub mod dropout;
pub mod initialization;
pub mod linear;

pub use batch_norm::BatchNormLayer;
pub use dropout::Dropout;
pub use initialization::WeightInit;
pub use linear::LinearLayer;
