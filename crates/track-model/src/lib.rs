//! Icetrack Track Model
//!
//! GPS fix/track data structures and the CSV loader that feeds the
//! pipeline: parse, validate, filter, group by animal, sort.

pub mod fix;
pub mod reader;

pub use fix::*;
pub use reader::*;
