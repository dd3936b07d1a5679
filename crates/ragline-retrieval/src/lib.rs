pub mod error;
pub mod service;

pub use error::RetrievalError;
pub use service::SearchService;
