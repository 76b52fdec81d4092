//! Request handler module
//!
//! Responsible for request routing dispatch and the two kinds of endpoint:
//! static media lookup and upload forwarding.

pub mod router;
pub mod send_files;
pub mod static_files;

// Re-export main entry point
pub use router::handle_request;
