pub mod context;
pub mod pipeline;
pub mod rank;
pub mod store;
pub mod types;
