use std::{
    collections::{hash_map::Iter, HashMap},
    mem,
};

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use super::{RainbowChain, RainbowTable};
use crate::{
    ctx::{RainbowTableCtx, RainbowTableCtxBuilder},
    error::{ChainbreakError, ChainbreakResult},
    plaintext_to_string, Digest, Password,
};

/// A simple rainbow table, backed by two hash maps.
pub struct SimpleTable {
    /// The chains of the table, indexed by startpoint.
    chains: HashMap<Password, Digest>,
    /// The reverse index: the startpoints of the chains ending with a given endpoint.
    endpoints: HashMap<Digest, Vec<Password>>,
    /// The context.
    ctx: RainbowTableCtx,
}

impl SimpleTable {
    /// Creates an empty table.
    fn empty(ctx: RainbowTableCtx) -> Self {
        Self {
            chains: HashMap::new(),
            endpoints: HashMap::new(),
            ctx,
        }
    }

    /// Creates a new simple rainbow table from chains.
    /// The chains must be made of valid startpoints and endpoints.
    /// If a startpoint appears twice, the last chain wins.
    pub fn from_chains<I: IntoIterator<Item = RainbowChain>>(chains: I, ctx: RainbowTableCtx) -> Self {
        let mut table = Self::empty(ctx);

        for chain in chains {
            table.insert(chain);
        }

        table.chains.shrink_to_fit();
        table.endpoints.shrink_to_fit();

        table
    }

    fn insert(&mut self, chain: RainbowChain) {
        let RainbowChain {
            startpoint,
            endpoint,
        } = chain;

        if let Some(previous) = self.chains.insert(startpoint.clone(), endpoint.clone()) {
            if let Some(startpoints) = self.endpoints.get_mut(&previous) {
                startpoints.retain(|s| *s != startpoint);
                if startpoints.is_empty() {
                    self.endpoints.remove(&previous);
                }
            }
        }

        self.endpoints.entry(endpoint).or_default().push(startpoint);
    }

    /// Returns the endpoint of the chain starting at `startpoint`, if it exists.
    /// Startpoints longer than any plaintext are never found.
    pub fn endpoint(&self, startpoint: &[u8]) -> Option<&Digest> {
        let startpoint = Password::try_from(startpoint).ok()?;
        self.chains.get(&startpoint)
    }

    /// Returns the number of distinct endpoints.
    /// It is lower than the number of chains when chains merged.
    pub fn unique_endpoints(&self) -> usize {
        self.endpoints.len()
    }
}

impl RainbowTable for SimpleTable {
    type Iter<'a> = SimpleTableIterator<'a>;

    fn len(&self) -> usize {
        self.chains.len()
    }

    fn iter(&self) -> Self::Iter<'_> {
        self.into_iter()
    }

    #[inline]
    fn search_endpoints(&self, endpoint: &Digest) -> &[Password] {
        self.endpoints
            .get(endpoint)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    fn ctx(&self) -> &RainbowTableCtx {
        &self.ctx
    }

    fn memory_footprint(&self) -> usize {
        let chains = self.chains.capacity() * mem::size_of::<(Password, Digest)>();
        let endpoints = self.endpoints.capacity() * mem::size_of::<(Digest, Vec<Password>)>();
        let startpoints: usize = self
            .endpoints
            .values()
            .map(|startpoints| startpoints.capacity() * mem::size_of::<Password>())
            .sum();

        mem::size_of::<Self>() + chains + endpoints + startpoints
    }
}

impl<'a> IntoIterator for &'a SimpleTable {
    type Item = RainbowChain;
    type IntoIter = <SimpleTable as RainbowTable>::Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        Self::IntoIter::new(self)
    }
}

pub struct SimpleTableIterator<'a> {
    inner: Iter<'a, Password, Digest>,
}

impl<'a> SimpleTableIterator<'a> {
    pub fn new(table: &'a SimpleTable) -> Self {
        Self {
            inner: table.chains.iter(),
        }
    }
}

impl Iterator for SimpleTableIterator<'_> {
    type Item = RainbowChain;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner
            .next()
            .map(|(startpoint, endpoint)| RainbowChain::from_parts(startpoint.clone(), endpoint.clone()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

/// The portable form of a table: its context and its chains as
/// (startpoint, hexadecimal endpoint) string pairs, in no particular order.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TableRecord {
    pub ctx: RainbowTableCtx,
    pub chains: Vec<(String, String)>,
}

impl From<&SimpleTable> for TableRecord {
    fn from(table: &SimpleTable) -> Self {
        Self {
            ctx: table.ctx.clone(),
            chains: table
                .chains
                .iter()
                .map(|(startpoint, endpoint)| (plaintext_to_string(startpoint), hex::encode(endpoint)))
                .collect(),
        }
    }
}

impl TryFrom<TableRecord> for SimpleTable {
    type Error = ChainbreakError;

    /// Rebuilds a table from its portable form, checking every parameter and chain.
    fn try_from(record: TableRecord) -> ChainbreakResult<Self> {
        let ctx = RainbowTableCtxBuilder::new()
            .hash(record.ctx.hash_function)
            .charset(record.ctx.charset.as_bytes())
            .chain_length(record.ctx.t)
            .chain_count(record.ctx.m)
            .password_length(record.ctx.password_length)
            .build()?;

        let chains = record
            .chains
            .into_iter()
            .map(|(startpoint, endpoint)| {
                if startpoint.len() != ctx.password_length as usize
                    || !ctx.charset.contains_all(startpoint.as_bytes())
                {
                    return Err(ChainbreakError::Plaintext(startpoint));
                }

                let endpoint = ctx.hash_function.parse_digest(&endpoint)?;
                Ok(RainbowChain::from_parts(
                    startpoint.bytes().collect(),
                    endpoint,
                ))
            })
            .collect::<ChainbreakResult<Vec<_>>>()?;

        Ok(Self::from_chains(chains, ctx))
    }
}

impl Serialize for SimpleTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        TableRecord::from(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SimpleTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let record = TableRecord::deserialize(deserializer)?;
        SimpleTable::try_from(record).map_err(de::Error::custom)
    }
}

impl std::fmt::Debug for SimpleTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let chains_count = self.chains.len().min(10);
        let some_chains = self.chains.iter().take(chains_count);

        for (startpoint, endpoint) in some_chains {
            writeln!(
                f,
                "{} -> {}",
                plaintext_to_string(startpoint),
                hex::encode(endpoint)
            )?;
        }
        writeln!(f, "...")
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        chain::generate_chain,
        ctx::build_test_ctx,
        error::ChainbreakError,
        password,
        rainbow_table::{RainbowChain, RainbowTable, SimpleTable, TableRecord},
        Digest,
    };

    fn digest(byte: u8) -> Digest {
        [byte; 16].into_iter().collect()
    }

    #[test]
    fn test_reverse_index_keeps_collisions() {
        let ctx = build_test_ctx();
        let table = SimpleTable::from_chains(
            [
                RainbowChain::from_parts(password("aaaaaaaa"), digest(1)),
                RainbowChain::from_parts(password("bbbbbbbb"), digest(1)),
                RainbowChain::from_parts(password("cccccccc"), digest(2)),
            ],
            ctx,
        );

        assert_eq!(3, table.len());
        assert_eq!(2, table.unique_endpoints());
        assert_eq!(
            &[password("aaaaaaaa"), password("bbbbbbbb")],
            table.search_endpoints(&digest(1))
        );
        assert_eq!(&[password("cccccccc")], table.search_endpoints(&digest(2)));
        assert!(table.search_endpoints(&digest(3)).is_empty());
    }

    #[test]
    fn test_duplicate_startpoint_last_write_wins() {
        let ctx = build_test_ctx();
        let table = SimpleTable::from_chains(
            [
                RainbowChain::from_parts(password("aaaaaaaa"), digest(1)),
                RainbowChain::from_parts(password("aaaaaaaa"), digest(2)),
            ],
            ctx,
        );

        assert_eq!(1, table.len());
        assert_eq!(Some(&digest(2)), table.endpoint(b"aaaaaaaa"));
        assert!(table.search_endpoints(&digest(1)).is_empty());
        assert_eq!(&[password("aaaaaaaa")], table.search_endpoints(&digest(2)));
    }

    #[test]
    fn test_record_roundtrip() {
        let ctx = build_test_ctx();
        let chains = ["test@123", "Ab3@xyz!", "00000000"]
            .map(|s| RainbowChain::new(password(s), &ctx));
        let table = SimpleTable::from_chains(chains, ctx.clone());

        let record = TableRecord::from(&table);
        assert_eq!(3, record.chains.len());
        assert!(record.chains.contains(&(
            "test@123".to_owned(),
            hex::encode(generate_chain(&password("test@123"), &ctx))
        )));

        let restored = SimpleTable::try_from(record).unwrap();
        assert_eq!(table.ctx(), restored.ctx());
        for chain in table.iter() {
            assert_eq!(Some(&chain.endpoint), restored.endpoint(&chain.startpoint));
        }
    }

    #[test]
    fn test_record_rejects_invalid_chains() {
        let ctx = build_test_ctx();
        let endpoint = hex::encode(generate_chain(&password("test@123"), &ctx));

        let wrong_length = TableRecord {
            ctx: ctx.clone(),
            chains: vec![("test".to_owned(), endpoint.clone())],
        };
        assert!(matches!(
            SimpleTable::try_from(wrong_length),
            Err(ChainbreakError::Plaintext(_))
        ));

        let wrong_symbol = TableRecord {
            ctx: ctx.clone(),
            chains: vec![("test~123".to_owned(), endpoint)],
        };
        assert!(matches!(
            SimpleTable::try_from(wrong_symbol),
            Err(ChainbreakError::Plaintext(_))
        ));

        let wrong_digest = TableRecord {
            ctx,
            chains: vec![("test@123".to_owned(), "abcd".to_owned())],
        };
        assert!(matches!(
            SimpleTable::try_from(wrong_digest),
            Err(ChainbreakError::DigestLength { .. })
        ));
    }

    #[test]
    fn test_store_and_load() {
        let ctx = build_test_ctx();
        let chains = ["test@123", "qwertyui"].map(|s| RainbowChain::new(password(s), &ctx));
        let table = SimpleTable::from_chains(chains, ctx);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("table.rt");
        table.store(&path).unwrap();

        let loaded = SimpleTable::load(&path).unwrap();
        assert_eq!(table.len(), loaded.len());
        assert_eq!(table.endpoint(b"test@123"), loaded.endpoint(b"test@123"));
        assert!(loaded.memory_footprint() > 0);
    }

    #[test]
    fn test_endpoint_of_oversized_startpoint() {
        let ctx = build_test_ctx();
        let table =
            SimpleTable::from_chains([RainbowChain::new(password("test@123"), &ctx)], ctx);

        assert_eq!(None, table.endpoint(b"this startpoint is too long"));
        assert_eq!(None, table.endpoint(b"test@12"));
        assert!(table.endpoint(b"test@123").is_some());
    }

    #[test]
    fn test_load_reports_invalid_record() {
        let ctx = build_test_ctx();
        let record = TableRecord {
            chains: vec![(
                "test~123".to_owned(),
                hex::encode(generate_chain(&password("test@123"), &ctx)),
            )],
            ctx,
        };

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("invalid.rt");
        bincode::serialize_into(std::fs::File::create(&path).unwrap(), &record).unwrap();

        match SimpleTable::load(&path) {
            Err(err @ ChainbreakError::Deserialize(_)) => {
                assert!(err.to_string().contains("test~123"), "{err}")
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
