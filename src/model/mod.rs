pub mod task;
pub mod filter;
pub mod clock;
pub mod config;

pub use task::*;
pub use filter::*;
pub use clock::*;
pub use config::*;
