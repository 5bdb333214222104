pub mod catalog;
pub mod dial;
pub mod ephemeris;
pub mod error;
pub mod frame;
pub mod report;
pub mod snapshot;
pub mod sphere;
