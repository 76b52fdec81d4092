//! Media relay server
//!
//! Serves JPEG and MP3 files from per-category directories and relays a
//! fixed bundle of files to a downstream upload endpoint as multipart form data.

pub mod config;
pub mod forward;
pub mod handler;
pub mod http;
pub mod logger;
pub mod server;
