//! Icetrack Render
//!
//! Map composition and output: raster layer stacking, static annotated
//! figures, GIF track animations, and the render report sidecar.

pub mod animate;
pub mod figure;
pub mod report;
pub mod scene;
pub mod style;
pub mod text;

pub use animate::*;
pub use figure::*;
pub use report::*;
pub use scene::*;
pub use style::*;
pub use text::*;
