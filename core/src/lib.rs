pub mod batch;
pub mod cancel;
pub mod chain;
pub mod charset;
pub mod cracker;
pub mod ctx;
pub mod error;
pub mod event;
pub mod generation;
pub mod hash;
pub mod rainbow_table;
pub mod slot;

use arrayvec::ArrayVec;

pub use {
    cancel::CancelToken,
    charset::Charset,
    cracker::{success_rate, CrackReport, Cracker, SuccessRate},
    ctx::{estimated_coverage, RainbowTableCtx, RainbowTableCtxBuilder},
    error::{ChainbreakError, ChainbreakResult},
    event::{Event, SimpleTableHandle},
    generation::{BuildReport, TableGeneration},
    hash::HashFunction,
    rainbow_table::{RainbowChain, RainbowTable, SimpleTable},
    slot::TableSlot,
};

/// The default chain length.
pub const DEFAULT_CHAIN_LENGTH: u64 = 1_000;

/// The default number of chains.
pub const DEFAULT_CHAIN_COUNT: u64 = 5_000;

/// The default plaintext length.
pub const DEFAULT_PASSWORD_LENGTH: u8 = 8;

/// The default charset: lowercase, uppercase, digits and a few symbols.
/// It has 69 symbols, so `B = 69` for tables built with it.
pub const DEFAULT_CHARSET: &[u8] =
    b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789@!#$%&*";

/// The number of chains computed between two progress events.
pub const DEFAULT_PROGRESS_INTERVAL: u64 = 100;

/// The minimum plaintext length allowed.
pub const MIN_PASSWORD_LENGTH: u8 = 1;

/// The maximum plaintext length allowed.
pub const MAX_PASSWORD_LENGTH_ALLOWED: usize = 16;

/// The minimum chain length allowed.
pub const MIN_CHAIN_LENGTH: u64 = 100;

/// The maximum chain length allowed.
pub const MAX_CHAIN_LENGTH: u64 = 10_000;

/// The minimum number of chains allowed.
pub const MIN_CHAIN_COUNT: u64 = 100;

/// The maximum number of chains allowed.
pub const MAX_CHAIN_COUNT: u64 = 100_000;

/// The maximum digest size allowed, in bytes (SHA-512).
pub const MAX_DIGEST_LENGTH_ALLOWED: usize = 64;

/// An ASCII plaintext stored in a stack-allocated vector.
pub type Password = ArrayVec<u8, MAX_PASSWORD_LENGTH_ALLOWED>;

/// A raw digest stored in a stack-allocated vector.
pub type Digest = ArrayVec<u8, MAX_DIGEST_LENGTH_ALLOWED>;

/// Well-known MD5 digests and their plaintexts, handy to check a table end to end.
pub const KNOWN_MD5_DIGESTS: &[(&str, &str)] = &[
    ("ceb6c970658f31504a901b89dcd3e461", "test@123"),
    ("5f4dcc3b5aa765d61d8327deb882cf99", "password"),
    ("e10adc3949ba59abbe56e057f20f883e", "123456"),
    ("25d55ad283aa400af464c76d713c07ad", "12345678"),
    ("d8578edf8458ce06fbc5bb76a58c5ca4", "qwerty"),
];

#[cfg(test)]
pub fn password(s: &str) -> Password {
    s.bytes().collect()
}

/// Renders a plaintext as a string.
/// Plaintexts are always made of charset symbols, which are ASCII.
pub fn plaintext_to_string(plaintext: &[u8]) -> String {
    String::from_utf8_lossy(plaintext).into_owned()
}
