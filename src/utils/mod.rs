pub mod io_utils;
pub mod timer;
