pub mod fs;
pub mod unit;
