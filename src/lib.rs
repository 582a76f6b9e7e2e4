pub mod aggregate;
pub mod api;
pub mod error;
pub mod model;
pub mod output;
pub mod parser;
pub mod state;
pub mod storage;
