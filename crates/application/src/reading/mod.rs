mod commands;
mod parse;
mod service;

pub use commands::{ConfirmCommand, ImagePayload, ListQuery, UploadCommand};
pub use parse::parse_extracted_value;
pub use service::{CustomerReadings, ReadingLifecycleService, ReadingSummary, UploadReceipt};
