use std::io::{ErrorKind, Write};
use std::process::{Command, Stdio};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use super::error::AudioError;
use super::waveform::{ToneKind, ToneSpec, DEFAULT_SAMPLE_RATE_HZ};

/// Something that can play mono 16-bit PCM.
pub trait AudioBackend: Send + Sync {
    fn play(&self, samples: &[i16], sample_rate: u32) -> Result<(), AudioError>;
}

/// Pipes raw little-endian PCM into an external player process.
///
/// `{rate}` in the command line is replaced with the sample rate.
pub struct CommandAudioBackend {
    command: String,
}

impl CommandAudioBackend {
    pub fn new(command: &str) -> Self {
        Self {
            command: command.to_string(),
        }
    }

    fn command_line(&self, sample_rate: u32) -> String {
        self.command.replace("{rate}", &sample_rate.to_string())
    }
}

impl AudioBackend for CommandAudioBackend {
    fn play(&self, samples: &[i16], sample_rate: u32) -> Result<(), AudioError> {
        let cmd = self.command_line(sample_rate);
        log::debug!("Starting audio player: {}", cmd);

        let mut child = Command::new("sh")
            .arg("-c")
            .arg(&cmd)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;

        let bytes: Vec<u8> = samples.iter().flat_map(|s| s.to_le_bytes()).collect();
        // stdin is closed at the end of this block so the player sees EOF
        let written = match child.stdin.take() {
            Some(mut stdin) => stdin.write_all(&bytes),
            None => Ok(()),
        };

        // Always reap the child, even if it stopped reading early
        let status = child.wait()?;
        if !status.success() {
            return Err(AudioError::Player {
                command: cmd,
                code: status.code().unwrap_or(-1),
            });
        }
        match written {
            Err(e) if e.kind() != ErrorKind::BrokenPipe => Err(e.into()),
            _ => Ok(()),
        }
    }
}

/// Fire-and-forget tone playback. Without a backend every call is a no-op.
#[derive(Clone)]
pub struct TonePlayer {
    backend: Option<Arc<dyn AudioBackend>>,
    sample_rate: u32,
}

impl TonePlayer {
    pub fn new(backend: Arc<dyn AudioBackend>, sample_rate: u32) -> Self {
        Self {
            backend: Some(backend),
            sample_rate,
        }
    }

    pub fn silent() -> Self {
        Self {
            backend: None,
            sample_rate: DEFAULT_SAMPLE_RATE_HZ,
        }
    }

    pub fn has_backend(&self) -> bool {
        self.backend.is_some()
    }

    /// Render and play `kind` on a background thread. The handle may be
    /// dropped; playback finishes on its own.
    pub fn play(&self, kind: ToneKind) -> Option<JoinHandle<()>> {
        let Some(backend) = self.backend.clone() else {
            log::debug!("No audio backend, skipping {} tone", kind);
            return None;
        };
        let sample_rate = self.sample_rate;

        let spawned = thread::Builder::new()
            .name(format!("tone-{}", kind))
            .spawn(move || {
                let samples = ToneSpec::for_kind(kind).render(sample_rate);
                if let Err(e) = backend.play(&samples, sample_rate) {
                    log::warn!("Failed to play {} tone: {}", kind, e);
                }
            });

        match spawned {
            Ok(handle) => Some(handle),
            Err(e) => {
                log::warn!("Failed to start tone thread: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::mpsc;
    use std::sync::Mutex;

    use super::*;

    /// Reports the length of every buffer it is asked to play.
    pub struct RecordingBackend {
        tx: Mutex<mpsc::Sender<usize>>,
    }

    impl RecordingBackend {
        pub fn new() -> (Arc<Self>, mpsc::Receiver<usize>) {
            let (tx, rx) = mpsc::channel();
            (Arc::new(Self { tx: Mutex::new(tx) }), rx)
        }
    }

    impl AudioBackend for RecordingBackend {
        fn play(&self, samples: &[i16], _sample_rate: u32) -> Result<(), AudioError> {
            let _ = self.tx.lock().unwrap().send(samples.len());
            Ok(())
        }
    }
}
