use thiserror::Error;

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("failed to run audio player: {0}")]
    Io(#[from] std::io::Error),
    #[error("audio player `{command}` exited with code {code}")]
    Player { command: String, code: i32 },
}
