use anyhow::{Context, Result};
use chainbreak_core::{
    BuildReport, Event, RainbowTable, RainbowTableCtx, RainbowTableCtxBuilder, TableGeneration,
};
use comfy_table::{presets::UTF8_BORDERS_ONLY, Cell, Table};
use human_repr::{HumanCount, HumanDuration, HumanThroughput};
use tracing::{debug, info};

use crate::Generate;

/// Displays the parameters and statistics of a generated table.
fn display_report(ctx: &RainbowTableCtx, report: &BuildReport) {
    let mut display_table = Table::new();
    display_table.load_preset(UTF8_BORDERS_ONLY);
    display_table.set_header(vec!["Statistic", "Value"]);

    let rows = [
        ("Hash function", ctx.hash_function.to_string()),
        ("Charset", ctx.charset.to_string()),
        ("Plaintext length", ctx.password_length.to_string()),
        ("Chain length (t)", ctx.t.to_string()),
        ("Chains", report.chains.to_string()),
        ("Unique endpoints", report.unique_endpoints.to_string()),
        ("Duration", report.duration.human_duration().to_string()),
        ("Hash operations", report.total_hash_ops.human_count_bare().to_string()),
        ("Hash rate", report.hash_rate.human_throughput("H").to_string()),
        ("Memory used", report.memory_footprint.human_count_bytes().to_string()),
        ("Estimated coverage", format!("{:.4}%", report.estimated_coverage)),
    ];

    for (name, value) in rows {
        display_table.add_row(vec![Cell::new(name), Cell::new(value)]);
    }

    println!("{display_table}");
}

pub fn generate(args: Generate) -> Result<()> {
    let ctx = RainbowTableCtxBuilder::new()
        .hash(args.hash_function)
        .charset(args.charset.as_bytes())
        .chain_length(args.chain_length)
        .chain_count(args.chain_count)
        .password_length(args.password_length)
        .build()
        .context("Invalid rainbow table parameters")?;

    let generation = if !args.startpoints.is_empty() {
        TableGeneration::try_from_startpoints(ctx, &args.startpoints)
            .context("Invalid startpoint")?
    } else if let Some(seed) = args.seed {
        TableGeneration::with_seed(ctx, seed)
    } else {
        TableGeneration::new(ctx)
    };

    let handle = generation.progress_interval(args.progress_interval).spawn();

    while let Some(event) = handle.recv() {
        match event {
            Event::Progress(progress) => info!("{progress:.1}% of the chains computed"),
            Event::Batch {
                batch_number,
                batch_count,
                chains,
            } => debug!("batch {batch_number}/{batch_count} done (chains {chains:?})"),
        }
    }

    let (table, report) = handle
        .join()
        .context("Unable to generate the rainbow table")?;

    table
        .store(&args.out)
        .context("Unable to store the generated rainbow table to the disk")?;

    display_report(table.ctx(), &report);
    println!("Rainbow table stored to {}", args.out.display());

    Ok(())
}
