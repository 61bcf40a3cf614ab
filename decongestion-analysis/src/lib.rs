pub mod app;
pub mod util;
