use serde::{Deserialize, Serialize};

use crate::{
    charset::Charset,
    error::{ChainbreakError, ChainbreakResult},
    hash::HashFunction,
    DEFAULT_CHAIN_COUNT, DEFAULT_CHAIN_LENGTH, DEFAULT_PASSWORD_LENGTH, MAX_CHAIN_COUNT,
    MAX_CHAIN_LENGTH, MAX_PASSWORD_LENGTH_ALLOWED, MIN_CHAIN_COUNT, MIN_CHAIN_LENGTH,
    MIN_PASSWORD_LENGTH,
};

/// A builder for a rainbow table context.
#[derive(Clone)]
pub struct RainbowTableCtxBuilder {
    hash_function: HashFunction,
    charset: Vec<u8>,
    t: u64,
    m: u64,
    password_length: u8,
}

impl Default for RainbowTableCtxBuilder {
    fn default() -> Self {
        Self {
            hash_function: HashFunction::Md5,
            charset: Charset::default().as_bytes().to_owned(),
            t: DEFAULT_CHAIN_LENGTH,
            m: DEFAULT_CHAIN_COUNT,
            password_length: DEFAULT_PASSWORD_LENGTH,
        }
    }
}

impl RainbowTableCtxBuilder {
    /// Creates a new RainbowTableCtxBuilder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the hash function of the context.
    pub fn hash(mut self, hash_function: HashFunction) -> Self {
        self.hash_function = hash_function;

        self
    }

    /// Sets the charset of the context.
    pub fn charset(mut self, charset: &[u8]) -> Self {
        self.charset = charset.to_owned();

        self
    }

    /// Sets the length of the chain of the context.
    /// Increasing the chain length will reduce the memory used
    /// to store the table but increase the time taken to attack.
    pub fn chain_length(mut self, chain_length: u64) -> Self {
        self.t = chain_length;

        self
    }

    /// Sets the number of chains to generate.
    pub fn chain_count(mut self, chain_count: u64) -> Self {
        self.m = chain_count;

        self
    }

    /// Sets the length of the plaintexts covered by the table.
    pub fn password_length(mut self, password_length: u8) -> Self {
        self.password_length = password_length;

        self
    }

    /// Builds a RainbowTableCtx with the specified parameters.
    /// Out of range parameters are rejected, never clamped.
    pub fn build(self) -> ChainbreakResult<RainbowTableCtx> {
        if !(MIN_PASSWORD_LENGTH..=MAX_PASSWORD_LENGTH_ALLOWED as u8)
            .contains(&self.password_length)
        {
            return Err(ChainbreakError::PasswordLength(self.password_length));
        }

        if !(MIN_CHAIN_LENGTH..=MAX_CHAIN_LENGTH).contains(&self.t) {
            return Err(ChainbreakError::ChainLength(self.t));
        }

        if !(MIN_CHAIN_COUNT..=MAX_CHAIN_COUNT).contains(&self.m) {
            return Err(ChainbreakError::ChainCount(self.m));
        }

        Ok(RainbowTableCtx {
            hash_function: self.hash_function,
            charset: Charset::new(&self.charset)?,
            t: self.t,
            m: self.m,
            password_length: self.password_length,
        })
    }
}

/// Context used to store all parameters used to generate a rainbow table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RainbowTableCtx {
    /// The hash function used.
    pub hash_function: HashFunction,
    /// The charset used.
    pub charset: Charset,
    /// The length of a chain.
    pub t: u64,
    /// The number of chains to generate.
    pub m: u64,
    /// The length of every plaintext of the table.
    pub password_length: u8,
}

impl RainbowTableCtx {
    /// Returns the number of plaintexts of the search space, `B^L`.
    pub fn keyspace(&self) -> u128 {
        (self.charset.len() as u128).pow(self.password_length as u32)
    }

    /// Returns the estimated coverage of a table built with this context, in percent.
    pub fn estimated_coverage(&self) -> f64 {
        estimated_coverage(
            self.m,
            self.t,
            self.charset.len(),
            self.password_length,
        )
    }
}

/// Estimates the fraction of the keyspace covered by `m` chains of length `t`, in percent.
/// Chains merge and overlap, so this is an upper estimate rather than a bound.
pub fn estimated_coverage(m: u64, t: u64, charset_len: usize, password_length: u8) -> f64 {
    let keyspace = (charset_len as f64).powi(password_length as i32);

    ((m * t) as f64 / keyspace * 100.).min(100.)
}

#[cfg(test)]
pub fn build_test_ctx() -> RainbowTableCtx {
    RainbowTableCtxBuilder::new()
        .hash(HashFunction::Md5)
        .chain_length(100)
        .chain_count(100)
        .password_length(8)
        .build()
        .unwrap()
}

#[cfg(test)]
mod tests {
    use crate::{
        ctx::{estimated_coverage, RainbowTableCtxBuilder},
        error::ChainbreakError,
        DEFAULT_CHARSET,
    };

    #[test]
    fn test_defaults() {
        let ctx = RainbowTableCtxBuilder::new().build().unwrap();
        assert_eq!(1_000, ctx.t);
        assert_eq!(5_000, ctx.m);
        assert_eq!(8, ctx.password_length);
        assert_eq!(DEFAULT_CHARSET, ctx.charset.as_bytes());
    }

    #[test]
    fn test_rejects_out_of_range() {
        assert!(matches!(
            RainbowTableCtxBuilder::new().password_length(0).build(),
            Err(ChainbreakError::PasswordLength(0))
        ));
        assert!(matches!(
            RainbowTableCtxBuilder::new().password_length(17).build(),
            Err(ChainbreakError::PasswordLength(17))
        ));
        assert!(matches!(
            RainbowTableCtxBuilder::new().chain_length(99).build(),
            Err(ChainbreakError::ChainLength(99))
        ));
        assert!(matches!(
            RainbowTableCtxBuilder::new().chain_length(10_001).build(),
            Err(ChainbreakError::ChainLength(10_001))
        ));
        assert!(matches!(
            RainbowTableCtxBuilder::new().chain_count(100_001).build(),
            Err(ChainbreakError::ChainCount(100_001))
        ));
        assert!(matches!(
            RainbowTableCtxBuilder::new().charset(b"aa").build(),
            Err(ChainbreakError::Charset(_))
        ));
    }

    #[test]
    fn test_accepts_bounds() {
        for (length, t, m) in [(1, 100, 100), (16, 10_000, 100_000)] {
            let ctx = RainbowTableCtxBuilder::new()
                .password_length(length)
                .chain_length(t)
                .chain_count(m)
                .build()
                .unwrap();
            assert_eq!((length, t, m), (ctx.password_length, ctx.t, ctx.m));
        }
    }

    #[test]
    fn test_coverage_formula() {
        let expected = 5_000_000. / 70f64.powi(8) * 100.;
        assert_eq!(expected, estimated_coverage(5_000, 1_000, 70, 8));
    }

    #[test]
    fn test_coverage_is_capped() {
        assert_eq!(100., estimated_coverage(100_000, 10_000, 2, 4));

        let ctx = RainbowTableCtxBuilder::new()
            .charset(b"ab")
            .password_length(4)
            .chain_count(100)
            .chain_length(100)
            .build()
            .unwrap();
        assert_eq!(16, ctx.keyspace());
        assert_eq!(100., ctx.estimated_coverage());
    }
}
