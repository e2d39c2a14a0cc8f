pub mod lightrag;

pub use lightrag::LightRagClient;
