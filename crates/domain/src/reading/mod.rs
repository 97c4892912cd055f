mod customer_code;
mod entity;
mod measure_type;
mod repository;

pub use customer_code::CustomerCode;
pub use entity::{NaturalKey, Reading};
pub use measure_type::MeasureType;
pub use repository::ReadingRepository;
