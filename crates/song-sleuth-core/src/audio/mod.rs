pub(crate) mod capture;

pub use capture::{CpalRecorder, DEFAULT_RECORD_DURATION};
