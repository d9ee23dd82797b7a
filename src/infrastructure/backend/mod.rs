//! Note backend adapters

pub mod http;

pub use http::HttpNoteBackend;
