use anyhow::Result;

use crate::Hash;

pub fn hash(args: Hash) -> Result<()> {
    println!("{}", args.hash_function.hex_digest(args.plaintext.as_bytes()));

    Ok(())
}
