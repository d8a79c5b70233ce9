//! Playback: the controller task, its handle and the audio outputs.

mod controller;
mod handle;
mod output;
mod rodio_output;
mod types;

pub use controller::Controller;
pub use handle::Player;
pub use output::{AudioOutput, OutputEvent, SourceId};
pub use rodio_output::RodioOutput;
pub use types::{Notice, PlayerCmd, SnapshotHandle};
