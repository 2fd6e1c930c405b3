pub mod classifier;
pub mod encoder;

pub use classifier::classify;
pub use encoder::{PayloadFields, WifiSecurity};
