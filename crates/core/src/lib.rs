pub mod config;
pub mod credential;
pub mod error;
pub mod slot;
pub mod time;

pub use config::Config;
pub use credential::*;
pub use error::*;
pub use slot::*;
