use std::io;

use thiserror::Error;

pub type ChainbreakResult<T> = std::result::Result<T, ChainbreakError>;

#[derive(Error, Debug)]
pub enum ChainbreakError {
    #[error("The plaintext length should be between {min} and {max}, but {0} was provided", min = crate::MIN_PASSWORD_LENGTH, max = crate::MAX_PASSWORD_LENGTH_ALLOWED)]
    PasswordLength(u8),

    #[error("The chain length should be between {min} and {max}, but {0} was provided", min = crate::MIN_CHAIN_LENGTH, max = crate::MAX_CHAIN_LENGTH)]
    ChainLength(u64),

    #[error("The chain count should be between {min} and {max}, but {0} was provided", min = crate::MIN_CHAIN_COUNT, max = crate::MAX_CHAIN_COUNT)]
    ChainCount(u64),

    #[error("Unknown hash function {0:?}")]
    UnknownHashFunction(String),

    #[error("Invalid charset: {0}")]
    Charset(&'static str),

    #[error("A {hash_function} digest is {expected} hexadecimal characters long, but {actual} were provided")]
    DigestLength {
        hash_function: crate::HashFunction,
        expected: usize,
        actual: usize,
    },

    #[error("The digest is not valid hexadecimal")]
    Hex(#[from] hex::FromHexError),

    #[error("The plaintext {0:?} does not fit the table's charset or length")]
    Plaintext(String),

    #[error("The operation was cancelled")]
    Cancelled,

    #[error(
        "Unable to access the file at the given path. Make sure the right permissions are available"
    )]
    Io(#[from] io::Error),

    #[error("Failed to serialize the rainbow table")]
    Serialize(#[source] bincode::Error),

    #[error("Failed to deserialize the rainbow table: {0}")]
    Deserialize(#[source] bincode::Error),
}
