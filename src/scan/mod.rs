pub mod payload;
pub mod validator;

pub use payload::QrPayload;
pub use validator::{GeoPoint, ScanError, ValidatedScan};
