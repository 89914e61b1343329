pub mod fred;
pub mod treasury;
