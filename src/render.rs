pub mod gradient;
pub mod views;
