//! Client for the Keyshelf REST API

mod client;
mod error;
mod traits;

pub use client::ApiClient;
pub use error::ApiError;
pub use traits::{ApiResult, KeyServiceTrait};

#[cfg(test)]
pub use traits::MockKeyServiceTrait;
