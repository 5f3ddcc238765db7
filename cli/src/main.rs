mod attack;
mod generate;
mod hash;

use std::path::PathBuf;

use anyhow::Result;
use clap::{value_parser, Args, Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use chainbreak_core::{
    HashFunction, DEFAULT_CHAIN_COUNT, DEFAULT_CHAIN_LENGTH, DEFAULT_CHARSET,
    DEFAULT_PASSWORD_LENGTH, DEFAULT_PROGRESS_INTERVAL, MAX_CHAIN_COUNT, MAX_CHAIN_LENGTH,
    MAX_PASSWORD_LENGTH_ALLOWED, MIN_CHAIN_COUNT, MIN_CHAIN_LENGTH, MIN_PASSWORD_LENGTH,
};

use attack::attack;
use generate::generate;
use hash::hash;
use test::test;

/// Rainbow table application: precompute hash chains, then find the plaintext of a digest.
#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    #[clap(subcommand)]
    commands: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Generate(Generate),
    Attack(Attack),
    Hash(Hash),
    Test(Test),
}

/// Generate a rainbow table and store it to the disk.
#[derive(Args)]
pub struct Generate {
    /// The file where the generated table should be stored.
    #[clap(value_parser)]
    out: PathBuf,

    /// The hash function.
    #[clap(short = 'H', long = "hash", value_parser, default_value_t = HashFunction::Md5)]
    hash_function: HashFunction,

    /// The chain length.
    /// Increasing the chain length reduces the memory used
    /// to store the table but increases the time taken to attack.
    #[clap(short = 't', long, value_parser = value_parser!(u64).range(MIN_CHAIN_LENGTH..=MAX_CHAIN_LENGTH), default_value_t = DEFAULT_CHAIN_LENGTH)]
    chain_length: u64,

    /// The number of chains.
    #[clap(short = 'm', long, value_parser = value_parser!(u64).range(MIN_CHAIN_COUNT..=MAX_CHAIN_COUNT), default_value_t = DEFAULT_CHAIN_COUNT)]
    chain_count: u64,

    /// The length of the plaintexts covered by the table.
    #[clap(short = 'l', long, value_parser = value_parser!(u8).range(MIN_PASSWORD_LENGTH as i64..=MAX_PASSWORD_LENGTH_ALLOWED as i64), default_value_t = DEFAULT_PASSWORD_LENGTH)]
    password_length: u8,

    /// The charset to use.
    #[clap(short, long, value_parser, default_value_t = String::from_utf8_lossy(DEFAULT_CHARSET).to_string())]
    charset: String,

    /// Seed the random startpoints, to generate the same table twice.
    #[clap(short, long, value_parser)]
    seed: Option<u64>,

    /// Use these startpoints instead of random ones.
    #[clap(long, value_parser, value_delimiter = ',', conflicts_with = "seed")]
    startpoints: Vec<String>,

    /// The number of chains computed between two progress reports.
    #[clap(long, value_parser = value_parser!(u64).range(1..), default_value_t = DEFAULT_PROGRESS_INTERVAL)]
    progress_interval: u64,
}

/// Find the plaintext producing a certain hash digest.
#[derive(Args)]
pub struct Attack {
    /// The digest to attack, in hexadecimal.
    #[clap(value_parser)]
    digest: String,

    /// The rainbow table to use.
    #[clap(value_parser)]
    table: PathBuf,
}

/// Compute the digest of a plaintext.
#[derive(Args)]
pub struct Hash {
    /// The plaintext to hash.
    #[clap(value_parser)]
    plaintext: String,

    /// The hash function.
    #[clap(short = 'H', long = "hash", value_parser, default_value_t = HashFunction::Md5)]
    hash_function: HashFunction,
}

/// Measure the success rate of a rainbow table.
#[derive(Args)]
pub struct Test {
    /// The rainbow table to test.
    #[clap(value_parser)]
    table: PathBuf,

    /// The number of random plaintexts to attack.
    #[clap(short = 'n', long, value_parser = value_parser!(u32).range(1..), default_value_t = 20)]
    attempts: u32,

    /// Seed the random plaintexts.
    #[clap(short, long, value_parser)]
    seed: Option<u64>,

    /// Also attack the well-known MD5 digests.
    #[clap(long, value_parser)]
    known: bool,
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).with_target(false).init();

    let cli = Cli::parse();

    match cli.commands {
        Commands::Generate(gen) => generate(gen)?,
        Commands::Attack(atk) => attack(atk)?,
        Commands::Hash(args) => hash(args)?,
        Commands::Test(args) => test(args)?,
    }

    Ok(())
}
