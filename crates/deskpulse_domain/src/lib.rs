mod conversation;
mod directory;
mod environment;
mod error;
mod fetch_config;
mod page;
mod progress;
mod query;

pub use conversation::*;
pub use directory::*;
pub use environment::*;
pub use error::*;
pub use fetch_config::*;
pub use page::*;
pub use progress::*;
pub use query::*;
