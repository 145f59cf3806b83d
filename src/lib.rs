#![forbid(unsafe_code)]

//! Library half of ytinfo: turns yt-dlp's metadata dump into a compact
//! format listing and builds copy-paste yt-dlp command lines.
//!
//! The `backend` binary serves this over HTTP; the `ytinfo` binary exposes
//! the same operations on the command line.

pub mod command;
pub mod config;
pub mod extractor;
pub mod formats;
pub mod info;
pub mod page;
pub mod server;
pub mod telemetry;
