//! Infrastructure layer - concrete backends for the domain capability traits

pub mod embedding;
pub mod http_client;
pub mod logging;
pub mod memory;
pub mod provider;
pub mod vector_store;

pub use http_client::{HttpClient, HttpClientTrait};
