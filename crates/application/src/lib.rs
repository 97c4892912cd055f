//! Application layer - Use cases and business workflows

pub mod reading;

pub use reading::{
    ConfirmCommand, CustomerReadings, ImagePayload, ListQuery, ReadingLifecycleService,
    ReadingSummary, UploadCommand, UploadReceipt,
};
