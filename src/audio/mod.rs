//! Playback of synthesized audio through `rodio`.

mod player;

pub use player::{play_blocking, AudioError};
