pub mod error;
pub mod event;
pub mod resolved;
pub mod session;

pub use error::{Error, Result};
pub use event::*;
pub use resolved::*;
pub use session::*;
