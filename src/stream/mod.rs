//! The streaming response pipeline.
//!
//! A streaming request hands its open response body to this module, which
//! turns it into an [`EventStream`] of typed items:
//!
//! ```text
//! BodyStream ─▶ LineFramer ─▶ FrameDecoder ─▶ pump ─▶ EventStream<T>
//! ```
//!
//! - [`LineFramer`] splits the body into newline-delimited frames.
//! - [`FrameDecoder`] turns each frame into an item. Move streams use
//!   [`GameEventDecoder`], which classifies frames through [`FRAME_SHAPES`];
//!   game streams use [`ResourceDecoder`].
//! - The [pump](pump::pump) delivers items over a bounded channel and closes
//!   the body once the stream ends, for whatever reason it ends.

mod decode;
mod events;
mod framer;
pub mod pump;
mod response;

pub use decode::{
    classify, classify_and_decode, FrameDecoder, FrameKind, FrameShape, GameEventDecoder,
    ResourceDecoder, FRAME_SHAPES,
};
pub use events::{CollectedGame, GameStreamEvent};
pub use framer::{BodyReader, LineFramer};
pub use pump::{spawn_pump, PumpHandle, PumpState, Termination};
pub use response::{with_deadline, with_timeout, Deadline, EventStream, GameEventStream};
