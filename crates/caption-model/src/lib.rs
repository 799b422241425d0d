//! Burnsub Caption Model
//!
//! Data contracts handed to the rendering core by caption readers:
//! - **Captions:** timed cues made of text, break, and style nodes
//! - **Sets:** per-language cue lists with shared styles and layout
//! - **Grouping:** start-time grouping with the same-start/same-end check,
//!   shared by cue merging and rendering
//!
//! Timestamps are integer microseconds. Layout axes carry their own unit so
//! pixel positions can be relativized to percentages of the video frame.

pub mod caption;
pub mod grouping;
pub mod layout;
pub mod set;

pub use caption::*;
pub use grouping::*;
pub use layout::*;
pub use set::*;
