//! Burnsub Mux
//!
//! Delivery-format adapters for rendered subtitle images:
//! - `dvd`: Scenarist `.sst` descriptor with TIFF frames
//! - `concat`: ffmpeg concat-demuxer script with PNG frames
//! - `filtergraph`: ffmpeg overlay filtergraph with PNG frames
//! - `ttml`: IMSC1 image-profile TTML
//! - `ass`: picture-event ASS script
//!
//! Adapters produce an [`OutputBundle`] in memory; nothing touches the
//! filesystem until [`OutputBundle::write_to_dir`].

pub mod adapter;
pub mod ass;
pub mod bundle;
pub mod concat;
pub mod dvd;
pub mod filtergraph;
pub mod ttml;
pub mod writer;

pub use adapter::MuxAdapter;
pub use bundle::{BundleEntry, OutputBundle};
pub use writer::{MuxFormat, SubtitleWriter};
