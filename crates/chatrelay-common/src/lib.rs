pub mod error;
pub mod turn;

pub use error::{Error, Result};
pub use turn::{Role, Turn};
