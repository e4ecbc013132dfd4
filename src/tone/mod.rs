mod error;
mod player;
mod waveform;

pub use player::{CommandAudioBackend, TonePlayer};
pub use waveform::{ToneKind, ToneSpec, DEFAULT_SAMPLE_RATE_HZ};

#[cfg(test)]
pub(crate) use player::testing;
