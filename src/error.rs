use std::{io, path::PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("symbol {symbol:?} at position {position} is not in the alphabet")]
    InvalidSymbol { symbol: char, position: usize },

    #[error("symbol {0:?} is not in the alphabet")]
    UnknownSymbol(char),

    #[error("symbol {0:?} appears more than once in the alphabet")]
    DuplicateSymbol(char),

    #[error("alphabet has no symbols")]
    EmptyAlphabet,

    #[error("corpus contains no symbols from the alphabet")]
    EmptyProfile,

    #[error("failed to read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
