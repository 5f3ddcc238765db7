use std::fmt::Display;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{
    error::{ChainbreakError, ChainbreakResult},
    Password, DEFAULT_CHARSET,
};

/// An ordered alphabet of distinct printable ASCII symbols.
/// The order matters: the reduction function indexes into it.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Charset(Vec<u8>);

impl Charset {
    /// Creates a new charset, checking that the symbols are printable ASCII and distinct.
    pub fn new(symbols: &[u8]) -> ChainbreakResult<Self> {
        if symbols.len() < 2 {
            return Err(ChainbreakError::Charset(
                "at least two symbols are required",
            ));
        }

        let mut seen = [false; 128];
        for &c in symbols {
            if !c.is_ascii_graphic() && c != b' ' {
                return Err(ChainbreakError::Charset(
                    "only printable ASCII symbols are allowed",
                ));
            }

            if seen[c as usize] {
                return Err(ChainbreakError::Charset("symbols should be distinct"));
            }
            seen[c as usize] = true;
        }

        Ok(Self(symbols.to_vec()))
    }

    /// Returns the number of symbols.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns the symbols as bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Converts a symbol index into its ASCII representation.
    #[inline]
    pub fn symbol(&self, n: usize) -> u8 {
        self.0[n]
    }

    /// Returns true if every character of the plaintext belongs to the charset.
    pub fn contains_all(&self, plaintext: &[u8]) -> bool {
        plaintext.iter().all(|c| self.0.contains(c))
    }

    /// Draws a plaintext uniformly from `charset^length`.
    pub fn random_plaintext<R: Rng + ?Sized>(&self, rng: &mut R, length: u8) -> Password {
        (0..length)
            .map(|_| self.0[rng.gen_range(0..self.0.len())])
            .collect()
    }
}

impl Default for Charset {
    fn default() -> Self {
        Self(DEFAULT_CHARSET.to_vec())
    }
}

impl TryFrom<String> for Charset {
    type Error = ChainbreakError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value.as_bytes())
    }
}

impl From<Charset> for String {
    fn from(charset: Charset) -> Self {
        crate::plaintext_to_string(&charset.0)
    }
}

impl Display for Charset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", crate::plaintext_to_string(&self.0))
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use crate::{charset::Charset, DEFAULT_CHARSET};

    #[test]
    fn test_default_charset() {
        let charset = Charset::default();
        assert_eq!(69, charset.len());
        assert_eq!(DEFAULT_CHARSET.len(), charset.len());
        assert_eq!(b'a', charset.symbol(0));
        assert_eq!(b'*', charset.symbol(charset.len() - 1));
        assert!(Charset::new(DEFAULT_CHARSET).is_ok());
    }

    #[test]
    fn test_invalid_charsets() {
        assert!(Charset::new(b"").is_err());
        assert!(Charset::new(b"a").is_err());
        assert!(Charset::new(b"abca").is_err());
        assert!(Charset::new(b"ab\n").is_err());
        assert!(Charset::new("abé".as_bytes()).is_err());
    }

    #[test]
    fn test_random_plaintext() {
        let charset = Charset::new(b"abc").unwrap();
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..100 {
            let plaintext = charset.random_plaintext(&mut rng, 5);
            assert_eq!(5, plaintext.len());
            assert!(charset.contains_all(&plaintext));
        }
    }
}
