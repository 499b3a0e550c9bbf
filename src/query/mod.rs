pub mod error;
pub mod params;
pub mod server;

pub use error::ApiError;
pub use params::*;
pub use server::*;
