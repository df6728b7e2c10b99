//! Ishikawa (fishbone) diagram editor.
//!
//! - `domain`: bone forest edits, spine layout, pan/zoom state
//! - `application`: editing sessions and the diagram catalog
//! - `infrastructure`: HTTP diagram store, id generation, wiring
//! - `cli`: command line front end

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
