pub mod dir;
pub mod kind;
pub mod manager;
pub mod options;

pub use dir::*;
pub use kind::*;
pub use manager::*;
pub use options::*;
