pub mod color_key;
pub mod command;
pub mod fixed;

pub use color_key::*;
pub use command::*;
pub use fixed::*;
