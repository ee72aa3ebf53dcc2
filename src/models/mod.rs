//! Record schemas and request DTOs for all domain entities.

pub mod achievement;
pub mod assignment;
pub mod course;
pub mod discussion;
pub mod lenient;
pub mod pagination;
pub mod progress;
pub mod schedule;
pub mod user;
