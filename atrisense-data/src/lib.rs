pub mod point;
pub mod record;
pub mod validation;

pub use point::CartesianPoint;
pub use record::Record;
pub use validation::ValidationResult;
