use std::io::Write;

use anyhow::{Context, Result};
use tracing::{info, info_span};

use regime_calendar::period_sequence;

use crate::cli::DistributionArgs;
use crate::config::ModelToml;
use crate::convert;

/// Print the marginal state distribution for each model time step.
pub fn run(args: DistributionArgs) -> Result<()> {
    let _cmd = info_span!("distribution").entered();
    // 1. Load model
    let config = ModelToml::from_path(&args.config)?;
    let mut model = convert::build_scheduled_model(&config)?;
    model.precalculate_state_distributions(convert::cache_size(&config, args.steps));
    info!(
        dim = model.model().dim(),
        segments = model.model().segment_count(),
        cache_size = model.model().cache_size(),
        "model loaded"
    );

    // 2. Dates of model times 0..=steps
    let dates = period_sequence(model.start_date(), model.period(), args.steps + 1)
        .context("failed to build date sequence")?;

    // 3. Tab-separated table on stdout
    let mut out = std::io::stdout().lock();
    write!(out, "date")?;
    for k in 0..model.model().dim() {
        write!(out, "\tstate_{k}")?;
    }
    writeln!(out)?;
    for date in dates {
        let p = model
            .calc_state_distribution(date)
            .with_context(|| format!("failed to compute distribution at {date}"))?;
        write!(out, "{date}")?;
        for x in &p {
            write!(out, "\t{x:.6}")?;
        }
        writeln!(out)?;
    }
    Ok(())
}
