pub mod backend;
pub mod window;

pub use backend::*;
pub use window::*;
