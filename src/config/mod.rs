pub mod schema;

pub use schema::{Config, GatewayConfig, MemoryConfig, ModelConfig};
