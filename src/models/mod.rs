pub mod enums;

pub use enums::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Invalid value '{value}' for {field}")]
    InvalidEnum { field: String, value: String },
}
