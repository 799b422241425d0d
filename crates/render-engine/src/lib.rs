//! Burnsub Render Engine
//!
//! Turns a caption list into numbered, palette-indexed subtitle bitmaps.
//!
//! # Pipeline Architecture
//!
//! ```text
//! captions ── group by start (overlap check)
//!                   │
//!                   ├── one-frame gap nudge (optional)
//!                   │
//! font catalog ─────┼── resolve nearest language ── glyph coverage
//!                   │
//!                   ├── place lines (top / bottom / source, off-screen check)
//!                   │
//!                   ├── outline + fill, quantize to 4 colours (parallel)
//!                   ▼
//!            RenderedSequence ── PNG / TIFF encoders
//! ```

pub mod encode;
pub mod font;
pub mod font_catalog;
pub mod pipeline;
pub mod placement;
pub mod quantize;
pub mod raster;

pub use encode::{encode_png, encode_tiff};
pub use font::{GlyphFont, TrueTypeFont};
pub use font_catalog::{FontAsset, FontCatalog};
pub use pipeline::*;
pub use placement::{CanvasSize, SourceAnchor};
pub use quantize::{IndexedBitmap, Palette};
