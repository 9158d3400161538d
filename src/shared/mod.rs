//! Cross-cutting building blocks shared by every layer.

pub mod errors;
pub mod pagination;
pub mod retry;
pub mod shutdown;
pub mod time;

pub use errors::*;
pub use pagination::*;
pub use retry::*;
pub use shutdown::*;
pub use time::*;
