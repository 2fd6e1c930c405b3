pub mod scan;

pub use scan::{IntentType, ScanEvent};
