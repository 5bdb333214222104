pub mod math;
pub mod projection;
pub mod sexagesimal;
pub mod solar_system;
