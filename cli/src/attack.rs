use anyhow::{Context, Result};
use chainbreak_core::{CancelToken, Cracker, RainbowTable, SimpleTable};
use comfy_table::{presets::UTF8_BORDERS_ONLY, Cell, Color, Table};
use human_repr::HumanDuration;

use crate::Attack;

pub fn attack(atk: Attack) -> Result<()> {
    let table = SimpleTable::load(&atk.table).context("Unable to load the rainbow table")?;

    let report = Cracker::new(&table)
        .crack(atk.digest.trim(), &CancelToken::new())
        .context("Unable to attack the digest")?;

    let mut display_table = Table::new();
    display_table.load_preset(UTF8_BORDERS_ONLY);
    display_table.set_header(vec!["Digest", "Plaintext", "Duration", "False alarms"]);

    let plaintext = report
        .plaintext_string()
        .map(|plaintext| Cell::new(plaintext).fg(Color::Green))
        .unwrap_or_else(|| Cell::new("No plaintext found").fg(Color::Red));

    display_table.add_row(vec![
        Cell::new(atk.digest.trim()),
        plaintext,
        Cell::new(report.duration.human_duration()),
        Cell::new(report.false_alarms),
    ]);

    println!("{display_table}");

    Ok(())
}
