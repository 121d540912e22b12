use std::io::Write;

use anyhow::{Context, Result, ensure};
use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, info_span};

use regime_calendar::period_sequence;

use crate::cli::SimulateArgs;
use crate::config::ModelToml;
use crate::convert;

/// Simulate a cohort through the scheduled model and report occupancy.
///
/// Each row compares the simulated share of every state with the model's
/// marginal distribution, plus the cohort's mean percentile (0.5 in
/// expectation when percentiles are preserved).
pub fn run(args: SimulateArgs) -> Result<()> {
    let _cmd = info_span!("simulate").entered();
    ensure!(args.cohort > 0, "cohort must contain at least one individual");

    // 1. Load model
    let config = ModelToml::from_path(&args.config)?;
    let mut model = convert::build_scheduled_model(&config)?;
    model.precalculate_state_distributions(convert::cache_size(&config, args.steps));
    let dim = model.model().dim();

    // 2. Seeded RNG; the CLI flag overrides the model file
    let seed = args.seed.or(config.seed);
    let mut rng = match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_os_rng(),
    };
    info!(cohort = args.cohort, steps = args.steps, ?seed, "simulating cohort");

    // 3. Dates of model times 0..=steps
    let dates = period_sequence(model.start_date(), model.period(), args.steps + 1)
        .context("failed to build date sequence")?;

    // 4. Simulate; column i of `counts` is model time i
    let mut counts = Array2::<f64>::zeros((dim, args.steps + 1));
    let mut percentile_sums = Array1::<f64>::zeros(args.steps + 1);
    for individual in 0..args.cohort {
        let u: f64 = rng.random();
        let mut state = model.draw_initial_state(u)?;
        counts[[state, 0]] += 1.0;
        percentile_sums[0] += u;
        for (i, &date) in dates[..args.steps].iter().enumerate() {
            let (next, percentile) = model
                .draw_next_state_and_percentile(state, date, rng.random())
                .with_context(|| format!("draw failed for individual {individual} at {date}"))?;
            state = next;
            counts[[state, i + 1]] += 1.0;
            percentile_sums[i + 1] += percentile;
        }
    }
    counts /= args.cohort as f64;
    percentile_sums /= args.cohort as f64;
    debug!("simulation complete");

    // 5. Tab-separated table on stdout
    let mut out = std::io::stdout().lock();
    write!(out, "date")?;
    for k in 0..dim {
        write!(out, "\tsimulated_{k}\texpected_{k}")?;
    }
    writeln!(out, "\tmean_percentile")?;
    for (i, &date) in dates.iter().enumerate() {
        let expected = model.calc_state_distribution(date)?;
        write!(out, "{date}")?;
        for k in 0..dim {
            write!(out, "\t{:.4}\t{:.4}", counts[[k, i]], expected[k])?;
        }
        writeln!(out, "\t{:.4}", percentile_sums[i])?;
    }
    Ok(())
}
