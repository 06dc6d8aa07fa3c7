pub mod model;
pub mod views;
