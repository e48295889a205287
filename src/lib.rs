#![doc = include_str!("../README.md")]

pub mod config;
pub mod db;
pub mod error;
pub mod http;
pub mod job;
pub mod probe;
pub mod schema;
pub mod store;

pub use http::{
    build_router,
    AppState,
};
