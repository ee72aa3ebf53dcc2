//! Business logic services.

pub mod achievement;
pub mod aggregator;
pub mod assignment;
pub mod auth;
pub mod catalog;
pub mod dashboard;
pub mod discussion;
pub mod enrollment;
pub mod import;
pub mod progress;
pub mod schedule;
pub mod session;
