pub mod error;
pub mod jsonl;
pub mod registry;
pub mod token;
pub mod traits;

pub use error::{Error, Result};
pub use jsonl::JsonlProvider;
pub use registry::{ProviderId, ProviderSet};
pub use token::CancelToken;
pub use traits::DebugLogProvider;
