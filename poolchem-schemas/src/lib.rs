pub mod adjustment;
pub mod calibration;
pub mod file_formats;
pub mod pool;
pub mod reading;
pub mod safety;
pub mod weather;
