//! MIME type module
//!
//! Media types are fixed per endpoint rather than sniffed from the file
//! extension: every image is served as JPEG and every track as MPEG audio.

pub const IMAGE_JPEG: &str = "image/jpeg";
pub const AUDIO_MPEG: &str = "audio/mpeg";
pub const APPLICATION_JSON: &str = "application/json";
pub const TEXT_PLAIN: &str = "text/plain; charset=utf-8";
