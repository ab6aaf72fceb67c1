pub mod config;

pub mod error_convert;

pub mod telemetry;

// Deadline domain modules
pub mod holidays;

pub mod timetable;

pub use holidays::HolidayCache;
pub use timetable::TimetableEngine;
