pub mod calculator;
pub mod config;
pub mod error;
pub mod formatter;
pub mod source;
pub mod traits;
pub mod types;

pub use calculator::*;
pub use config::*;
pub use error::*;
pub use formatter::*;
pub use source::StaticProfileSource;
pub use traits::*;
pub use types::*;
