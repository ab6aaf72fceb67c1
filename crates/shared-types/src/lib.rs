pub mod config;
pub mod error;
pub mod holiday;
pub mod timetable;

pub use config::*;
pub use error::*;
pub use holiday::*;
pub use timetable::*;
