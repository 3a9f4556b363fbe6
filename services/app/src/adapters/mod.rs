pub mod generation;
pub mod payload;
pub mod store;

pub use generation::HttpGenerationAdapter;
pub use store::FileStore;
