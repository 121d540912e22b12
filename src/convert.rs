//! Pure conversion functions: TOML model structs -> library model types.

use anyhow::{Context, Result, bail, ensure};
use chrono::NaiveDate;
use ndarray::{Array1, Array2};

use regime_markov::{ScheduledStitchedMarkovModel, StitchedMarkovModel};

use crate::config::{ModelToml, SegmentToml};

/// How consecutive segments are joined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StitchMode {
    /// Inter-segment matrices derived by percentile-to-percentile mapping.
    Ordinal,
    /// Inter-segment matrices given in the model file.
    Explicit,
}

/// Parses a stitching mode name into the corresponding enum variant.
pub fn parse_mode(s: &str) -> Result<StitchMode> {
    match s.to_lowercase().as_str() {
        "ordinal" => Ok(StitchMode::Ordinal),
        "explicit" => Ok(StitchMode::Explicit),
        other => bail!("unknown stitching mode: {other:?}"),
    }
}

/// Parses an ISO `YYYY-MM-DD` date.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").with_context(|| format!("invalid date: {s:?}"))
}

/// Builds a matrix from row vectors; rows are destination states.
pub fn matrix_from_rows(rows: &[Vec<f64>]) -> Result<Array2<f64>> {
    let n_rows = rows.len();
    let n_cols = rows.first().map_or(0, Vec::len);
    if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != n_cols) {
        bail!("matrix row {i} has {} entries, expected {n_cols}", row.len());
    }
    let flat: Vec<f64> = rows.iter().flatten().copied().collect();
    Ok(Array2::from_shape_vec((n_rows, n_cols), flat)?)
}

/// Builds the stitched model described by the model file.
pub fn build_stitched_model(config: &ModelToml) -> Result<StitchedMarkovModel> {
    let mode = parse_mode(&config.mode)?;
    let segments = &config.segments;
    ensure!(!segments.is_empty(), "model file defines no segments");

    let lengths = segment_lengths(segments)?;
    let intra = segments
        .iter()
        .enumerate()
        .map(|(m, s)| {
            matrix_from_rows(&s.transition)
                .with_context(|| format!("segment {m}: invalid transition matrix"))
        })
        .collect::<Result<Vec<_>>>()?;

    let model = match mode {
        StitchMode::Ordinal => {
            let initials = segments
                .iter()
                .enumerate()
                .map(|(m, s)| {
                    ensure!(
                        s.inter.is_none(),
                        "segment {m}: inter is not allowed in ordinal mode"
                    );
                    let initial = s.initial.as_ref().with_context(|| {
                        format!("segment {m}: initial is required in ordinal mode")
                    })?;
                    Ok(Array1::from(initial.clone()))
                })
                .collect::<Result<Vec<_>>>()?;
            StitchedMarkovModel::ordinal(initials, intra, lengths)?
        }
        StitchMode::Explicit => {
            let last = segments.len() - 1;
            let mut inter = Vec::with_capacity(last);
            for (m, s) in segments.iter().enumerate() {
                ensure!(
                    m == 0 || s.initial.is_none(),
                    "segment {m}: initial is only allowed on the first segment in explicit mode"
                );
                match (&s.inter, m == last) {
                    (Some(rows), false) => inter.push(
                        matrix_from_rows(rows)
                            .with_context(|| format!("segment {m}: invalid inter matrix"))?,
                    ),
                    (None, false) => bail!("segment {m}: inter is required in explicit mode"),
                    (Some(_), true) => bail!("the last segment must not have an inter matrix"),
                    (None, true) => {}
                }
            }
            let initial = segments[0]
                .initial
                .as_ref()
                .context("segment 0: initial is required")?;
            StitchedMarkovModel::new(Array1::from(initial.clone()), intra, inter, lengths)?
        }
    };
    Ok(model)
}

/// Builds the date-addressed model described by the model file.
pub fn build_scheduled_model(config: &ModelToml) -> Result<ScheduledStitchedMarkovModel> {
    let model = build_stitched_model(config)?;
    let start = parse_date(&config.start_date)?;
    Ok(ScheduledStitchedMarkovModel::new(model, start, config.period)?)
}

/// Number of time steps to precompute for a run covering model times
/// `0..=steps`: at least the configured cache size, and never fewer than the
/// run needs.
pub fn cache_size(config: &ModelToml, steps: usize) -> usize {
    config.cache_size.max(steps.saturating_add(1))
}

/// Lengths of all but the last segment.
fn segment_lengths(segments: &[SegmentToml]) -> Result<Vec<u64>> {
    let last = segments.len() - 1;
    segments
        .iter()
        .enumerate()
        .filter_map(|(m, s)| match (s.length, m == last) {
            (Some(length), false) => Some(Ok(length)),
            (None, false) => Some(Err(anyhow::anyhow!("segment {m}: length is required"))),
            (Some(_), true) => Some(Err(anyhow::anyhow!(
                "the last segment is open-ended and must not have a length"
            ))),
            (None, true) => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use regime_calendar::Period;

    fn parse(s: &str) -> ModelToml {
        toml::from_str(s).unwrap()
    }

    const ORDINAL: &str = r#"
        start_date = "2020-01-01"
        period = "1Y"

        [[segments]]
        initial = [0.5, 0.5]
        transition = [[1.0, 0.0], [0.0, 1.0]]
        length = 1

        [[segments]]
        initial = [0.2, 0.8]
        transition = [[1.0, 0.0], [0.0, 1.0]]
    "#;

    const EXPLICIT: &str = r#"
        mode = "explicit"

        [[segments]]
        initial = [1.0, 0.0]
        transition = [[1.0, 0.0], [0.0, 1.0]]
        length = 2
        inter = [[0.0, 1.0], [1.0, 0.0]]

        [[segments]]
        transition = [[1.0, 0.0], [0.0, 1.0]]
    "#;

    #[test]
    fn cache_covers_requested_steps() {
        let config = parse(ORDINAL);
        assert_eq!(config.cache_size, 50);
        assert_eq!(cache_size(&config, 10), 50);
        assert_eq!(cache_size(&config, 49), 50);
        assert_eq!(cache_size(&config, 200), 201);
        assert_eq!(cache_size(&config, usize::MAX), usize::MAX);
    }

    #[test]
    fn parse_mode_names() {
        assert_eq!(parse_mode("ordinal").unwrap(), StitchMode::Ordinal);
        assert_eq!(parse_mode("Explicit").unwrap(), StitchMode::Explicit);
        assert!(parse_mode("linear").is_err());
    }

    #[test]
    fn parse_dates() {
        assert_eq!(
            parse_date("2024-02-29").unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
        assert!(parse_date("2023-02-29").is_err());
        assert!(parse_date("29/02/2024").is_err());
    }

    #[test]
    fn matrix_rows_are_destinations() {
        let m = matrix_from_rows(&[vec![0.9, 0.2], vec![0.1, 0.8]]).unwrap();
        assert_eq!(m.column(0).to_vec(), vec![0.9, 0.1]);
        assert!(matrix_from_rows(&[vec![1.0, 0.0], vec![1.0]]).is_err());
    }

    #[test]
    fn builds_ordinal_model() {
        let model = build_stitched_model(&parse(ORDINAL)).unwrap();
        assert_eq!(model.segment_count(), 2);
        let inter = model.inter_transition(0).unwrap();
        assert_abs_diff_eq!(inter[[0, 0]], 0.4, epsilon = 1e-15);
        assert_abs_diff_eq!(inter[[1, 0]], 0.6, epsilon = 1e-15);
    }

    #[test]
    fn builds_explicit_model() {
        let model = build_stitched_model(&parse(EXPLICIT)).unwrap();
        assert_eq!(model.cumulative_lengths(), &[2]);
        assert_eq!(model.draw_next_state(0, 1, 0.5).unwrap(), 1);
    }

    #[test]
    fn builds_scheduled_model() {
        let model = build_scheduled_model(&parse(ORDINAL)).unwrap();
        assert_eq!(model.period(), Period::years(1));
        assert_eq!(
            model.start_date(),
            NaiveDate::from_ymd_opt(2020, 1, 1).unwrap()
        );
    }

    #[test]
    fn rejects_inconsistent_segments() {
        let missing_length = ORDINAL.replace("length = 1", "");
        let err = build_stitched_model(&parse(&missing_length)).unwrap_err();
        assert!(err.to_string().contains("length is required"), "{err}");

        let missing_inter = EXPLICIT.replace("inter = [[0.0, 1.0], [1.0, 0.0]]", "");
        let err = build_stitched_model(&parse(&missing_inter)).unwrap_err();
        assert!(err.to_string().contains("inter is required"), "{err}");

        let missing_initial = ORDINAL.replace("initial = [0.2, 0.8]", "");
        assert!(build_stitched_model(&parse(&missing_initial)).is_err());

        let no_segments = parse("segments = []");
        assert!(build_stitched_model(&no_segments).is_err());
    }

    #[test]
    fn library_errors_are_reported() {
        let bad = ORDINAL.replace("initial = [0.2, 0.8]", "initial = [0.3, 0.8]");
        let err = build_stitched_model(&parse(&bad)).unwrap_err();
        assert!(format!("{err:#}").contains("invalid model"), "{err:#}");
    }
}
