use thiserror::Error;

/// The closed set of ways a run of the emulator can end other than by
/// running off the end of a well-formed program via `die`.
#[derive(Error, Debug)]
pub enum EmuError {
    #[error("decode error: {0}")]
    Decode(String),

    #[error("cannot take a reference to an immediate operand")]
    Operand,

    #[error("arithmetic error: {0}")]
    Arithmetic(String),

    #[error("unknown segment selector {0}")]
    Segment(u16),

    #[error("load error: {0}")]
    Load(String),

    #[error("debugger quit")]
    DebuggerQuit,

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
