//! Markov chains stitched together from successive regimes.
//!
//! A stitched model splits global time into `M` segments. Segment `m` runs
//! for `length[m]` steps under its intra-segment matrix; the step that
//! crosses from segment `m` into segment `m + 1` applies the intra matrix
//! followed by the inter-segment matrix. The last segment never ends.
//!
//! ```text
//!   t:   0    1    2  |  3    4    5    6  |  7 ...
//!        ── intra[0] ─┤──── intra[1] ──────┤── intra[2] ...
//!                2→3: inter[0]·intra[0]    6→7: inter[1]·intra[1]
//!   cumulative lengths: [3, 7]
//! ```

use ndarray::{Array1, Array2, ArrayView1};
use tracing::debug;

use crate::cache::DistributionCache;
use crate::cdf::{bracket, check_uniform, cumulative, cumulative_columns, select_in};
use crate::error::MarkovError;
use crate::model::MarkovModel;
use crate::ordinal::map_percentiles;
use crate::validate::{check_distribution, check_state, check_transition_matrix};

/// Discrete time index.
pub type Time = u64;

/// A Markov chain whose transition law changes between successive segments.
///
/// All `draw_*` methods are pure functions of the model, the time index and
/// the caller's uniform draw, so a model can be shared between threads once
/// [`precalculate_state_distributions`](Self::precalculate_state_distributions)
/// has run.
#[derive(Debug, Clone)]
pub struct StitchedMarkovModel {
    initial: Array1<f64>,
    initial_cdf: Array1<f64>,
    intra: Vec<Array2<f64>>,
    intra_cdfs: Vec<Array2<f64>>,
    inter: Vec<Array2<f64>>,
    /// `crossing[m]` is the law of the step leaving segment `m`.
    crossing: Vec<Array2<f64>>,
    crossing_cdfs: Vec<Array2<f64>>,
    cumulative_lengths: Vec<Time>,
    cache: Option<DistributionCache>,
}

impl StitchedMarkovModel {
    /// Builds a stitched model from explicit inter-segment matrices.
    ///
    /// # Arguments
    ///
    /// * `initial` - State distribution at the start of segment 0.
    /// * `intra` - One column-stochastic matrix per segment (`M >= 1`).
    /// * `inter` - `M - 1` matrices; `inter[m]` links segment `m` to `m + 1`.
    /// * `lengths` - `M - 1` segment lengths; the last segment is open-ended.
    ///
    /// Several boundaries may coincide when a segment has length zero; the
    /// crossing step then applies every inter-segment matrix at that
    /// boundary in order. Boundaries at time 0 (leading zero-length
    /// segments) are folded into the time-0 distribution, which becomes
    /// `inter[k]···inter[0]·initial`.
    ///
    /// # Errors
    ///
    /// Returns [`MarkovError::InvalidModel`] if any count or dimension is
    /// inconsistent, a matrix is not column-stochastic, the initial vector
    /// is not a distribution, or the total length overflows.
    #[tracing::instrument(skip_all, fields(dim = initial.len(), segments = intra.len()))]
    pub fn new(
        initial: Array1<f64>,
        intra: Vec<Array2<f64>>,
        inter: Vec<Array2<f64>>,
        lengths: Vec<Time>,
    ) -> Result<Self, MarkovError> {
        let dim = initial.len();
        if dim == 0 {
            return Err(MarkovError::invalid("dimension must be positive"));
        }
        check_segment_counts(intra.len(), inter.len(), lengths.len(), "inter-segment matrices")?;
        check_distribution("initial distribution", initial.view())?;
        for (m, matrix) in intra.iter().enumerate() {
            check_transition_matrix(&format!("intra-segment matrix {m}"), matrix, Some(dim))?;
        }
        for (m, matrix) in inter.iter().enumerate() {
            check_transition_matrix(&format!("inter-segment matrix {m}"), matrix, Some(dim))?;
        }
        let cumulative_lengths = cumulate_lengths(&lengths)?;
        Ok(Self::assemble(initial, intra, inter, cumulative_lengths))
    }

    /// Builds a stitched model whose inter-segment matrices are derived by
    /// percentile-to-percentile mapping.
    ///
    /// Segment `m` starts from `initial_distributions[m]`. Its terminal
    /// distribution (after `lengths[m]` intra-segment steps) is mapped
    /// ordinally onto `initial_distributions[m + 1]` (see
    /// [`ordinal_mapping`](crate::ordinal_mapping)). The model's own time-0
    /// distribution is `initial_distributions[0]`, or that of the first
    /// segment with a positive length when leading segments are empty.
    ///
    /// # Errors
    ///
    /// Returns [`MarkovError::InvalidModel`] if the counts are inconsistent
    /// (`M` distributions, `M` matrices, `M - 1` lengths), or if any
    /// distribution or matrix is invalid.
    #[tracing::instrument(skip_all, fields(segments = intra.len()))]
    pub fn ordinal(
        initial_distributions: Vec<Array1<f64>>,
        intra: Vec<Array2<f64>>,
        lengths: Vec<Time>,
    ) -> Result<Self, MarkovError> {
        if initial_distributions.len() != intra.len() {
            return Err(MarkovError::invalid(format!(
                "got {} initial distributions for {} segments",
                initial_distributions.len(),
                intra.len()
            )));
        }
        check_segment_counts(intra.len(), lengths.len(), lengths.len(), "segment lengths")?;
        let dim = initial_distributions[0].len();
        for (m, p) in initial_distributions.iter().enumerate() {
            if p.len() != dim {
                return Err(MarkovError::invalid(format!(
                    "initial distribution {m} has {} states, expected {dim}",
                    p.len()
                )));
            }
            check_distribution(&format!("initial distribution {m}"), p.view())?;
        }
        for (m, matrix) in intra.iter().enumerate() {
            check_transition_matrix(&format!("intra-segment matrix {m}"), matrix, Some(dim))?;
        }

        let inter: Vec<Array2<f64>> = lengths
            .iter()
            .enumerate()
            .map(|(m, &length)| {
                let mut terminal = initial_distributions[m].clone();
                for _ in 0..length {
                    terminal = intra[m].dot(&terminal);
                }
                let mapping = map_percentiles(
                    &cumulative(terminal.view()),
                    &cumulative(initial_distributions[m + 1].view()),
                );
                debug!(segment = m, length, ?terminal, "derived ordinal inter-segment matrix");
                mapping
            })
            .collect();

        let initial = initial_distributions.into_iter().next().unwrap_or_default();
        Self::new(initial, intra, inter, lengths)
    }

    /// Builds a single-segment (time-homogeneous) model.
    ///
    /// # Errors
    ///
    /// Returns [`MarkovError::InvalidModel`] if `matrix` or `initial` is
    /// invalid or their dimensions differ.
    pub fn homogeneous(initial: Array1<f64>, matrix: Array2<f64>) -> Result<Self, MarkovError> {
        Self::new(initial, vec![matrix], Vec::new(), Vec::new())
    }

    /// Derives the crossing matrices and all CDFs from validated inputs.
    fn assemble(
        mut initial: Array1<f64>,
        intra: Vec<Array2<f64>>,
        inter: Vec<Array2<f64>>,
        cumulative_lengths: Vec<Time>,
    ) -> Self {
        let crossing: Vec<Array2<f64>> = (0..inter.len())
            .map(|m| {
                let boundary = cumulative_lengths[m];
                let mut product = inter[m].dot(&intra[m]);
                // Zero-length segments share the boundary: jump straight through them.
                let mut k = m + 1;
                while k < inter.len() && cumulative_lengths[k] == boundary {
                    product = inter[k].dot(&product);
                    k += 1;
                }
                product
            })
            .collect();

        // Boundaries at time 0 are crossed before the first observation.
        for (m, matrix) in inter.iter().enumerate() {
            if cumulative_lengths[m] != 0 {
                break;
            }
            initial = matrix.dot(&initial);
        }

        let intra_cdfs = intra.iter().map(cumulative_columns).collect();
        let crossing_cdfs = crossing.iter().map(cumulative_columns).collect();
        let initial_cdf = cumulative(initial.view());
        debug!(?cumulative_lengths, "stitched model assembled");

        Self {
            initial,
            initial_cdf,
            intra,
            intra_cdfs,
            inter,
            crossing,
            crossing_cdfs,
            cumulative_lengths,
            cache: None,
        }
    }

    /// Number of states.
    pub fn dim(&self) -> usize {
        self.initial.len()
    }

    /// Number of segments.
    pub fn segment_count(&self) -> usize {
        self.intra.len()
    }

    /// State distribution at time 0.
    ///
    /// Differs from the supplied initial distribution when leading segments
    /// have length zero; see [`new`](Self::new).
    pub fn initial_distribution(&self) -> &Array1<f64> {
        &self.initial
    }

    /// Intra-segment transition matrix of segment `m`.
    pub fn intra_transition(&self, m: usize) -> Option<&Array2<f64>> {
        self.intra.get(m)
    }

    /// Inter-segment matrix linking segment `m` to segment `m + 1`.
    pub fn inter_transition(&self, m: usize) -> Option<&Array2<f64>> {
        self.inter.get(m)
    }

    /// Cumulative segment lengths (segment boundaries).
    pub fn cumulative_lengths(&self) -> &[Time] {
        &self.cumulative_lengths
    }

    /// Number of precomputed time indices (0 when there is no cache).
    pub fn cache_size(&self) -> usize {
        self.cache.as_ref().map_or(0, DistributionCache::len)
    }

    /// Precomputes distributions and CDFs for times `0..cache_size`.
    ///
    /// Calling again with the same size is a no-op; any other size rebuilds
    /// the cache from scratch, and a size of zero drops it. Query results
    /// are identical with or without the cache.
    #[tracing::instrument(skip(self), fields(dim = self.dim()))]
    pub fn precalculate_state_distributions(&mut self, cache_size: usize) {
        if self.cache_size() == cache_size {
            return;
        }
        self.cache = None;
        if cache_size > 0 {
            let cache = DistributionCache::build(&self.initial, cache_size, |t, p| {
                self.transition_at(t).dot(p)
            });
            self.cache = Some(cache);
        }
        debug!(cache_size, "state distribution cache built");
    }

    /// Index of the segment owning time `t`.
    ///
    /// This is the position of the first cumulative boundary strictly
    /// greater than `t`; times past every boundary belong to the last
    /// segment.
    pub fn calc_model_index(&self, t: Time) -> usize {
        self.cumulative_lengths.partition_point(|&boundary| boundary <= t)
    }

    /// `Some(m)` if the step `t -> t + 1` leaves segment `m`.
    fn crossing_from(&self, t: Time) -> Option<usize> {
        let m = self.calc_model_index(t);
        self.cumulative_lengths
            .get(m)
            .is_some_and(|&boundary| t.checked_add(1) == Some(boundary))
            .then_some(m)
    }

    /// Transition matrix of the step `t -> t + 1`.
    fn transition_at(&self, t: Time) -> &Array2<f64> {
        match self.crossing_from(t) {
            Some(m) => &self.crossing[m],
            None => &self.intra[self.calc_model_index(t)],
        }
    }

    /// Transition CDFs of the step `t -> t + 1`.
    fn transition_cdfs_at(&self, t: Time) -> &Array2<f64> {
        match self.crossing_from(t) {
            Some(m) => &self.crossing_cdfs[m],
            None => &self.intra_cdfs[self.calc_model_index(t)],
        }
    }

    /// Advances `distribution` from time `from` to time `to`.
    fn propagate(&self, mut distribution: Array1<f64>, from: Time, to: Time) -> Array1<f64> {
        for s in from..to {
            distribution = self.transition_at(s).dot(&distribution);
        }
        distribution
    }

    /// Marginal state distribution at time `t`.
    ///
    /// Served from the cache when `t` is in range; otherwise propagated
    /// forward from the latest cached entry, or from time 0.
    pub fn calc_state_distribution(&self, t: Time) -> Array1<f64> {
        match &self.cache {
            Some(cache) => match cache.distribution(t) {
                Some(p) => p.to_owned(),
                None => {
                    let (last_t, last) = cache.last();
                    self.propagate(last.to_owned(), last_t, t)
                }
            },
            None => self.propagate(self.initial.clone(), 0, t),
        }
    }

    /// CDF of the marginal state distribution at time `t`.
    ///
    /// Non-decreasing, with the last entry exactly 1.
    pub fn calc_state_cdf(&self, t: Time) -> Array1<f64> {
        if let Some(cdf) = self.cache.as_ref().and_then(|c| c.cdf(t)) {
            return cdf.to_owned();
        }
        cumulative(self.calc_state_distribution(t).view())
    }

    /// Samples a state at time 0.
    ///
    /// # Errors
    ///
    /// Returns [`MarkovError::UniformOutOfRange`] if `u` is outside `[0, 1]`.
    pub fn draw_initial_state(&self, u: f64) -> Result<usize, MarkovError> {
        let u = check_uniform(u)?;
        Ok(select_in(self.initial_cdf.view(), u))
    }

    /// Samples the state at time `t + 1` given `state` at time `t`.
    ///
    /// Uses the crossing law when `t + 1` starts a new segment and the
    /// intra-segment law otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error if `state` or `u` is out of range.
    pub fn draw_next_state(&self, state: usize, t: Time, u: f64) -> Result<usize, MarkovError> {
        let column = self.transition_column(state, t)?;
        let u = check_uniform(u)?;
        Ok(select_in(column, u))
    }

    /// Samples the next state and remaps `u` to a percentile of the time
    /// `t + 1` marginal distribution.
    ///
    /// If the selected state `l` occupies `[a, b)` of the transition column
    /// and `[c, d)` of the `t + 1` marginal CDF, the returned percentile is
    /// `c + (d - c) * (u - a) / (b - a)`, or `(c + d) / 2` when `a == b`,
    /// clamped to `[0, 1]`. Feeding it into another variable's draw keeps
    /// the two variables rank-correlated.
    ///
    /// # Errors
    ///
    /// Returns an error if `state` or `u` is out of range, or if `t + 1`
    /// overflows.
    pub fn draw_next_state_and_percentile(
        &self,
        state: usize,
        t: Time,
        u: f64,
    ) -> Result<(usize, f64), MarkovError> {
        let column = self.transition_column(state, t)?;
        let u = check_uniform(u)?;
        let next_t = t.checked_add(1).ok_or(MarkovError::TimeOutOfRange { t })?;
        let next = select_in(column, u);

        let (a, b) = bracket(column, next);
        let marginal = self.calc_state_cdf(next_t);
        let (c, d) = bracket(marginal.view(), next);
        let percentile = if b > a {
            c + (d - c) * (u - a) / (b - a)
        } else {
            0.5 * (c + d)
        };
        Ok((next, percentile.clamp(0.0, 1.0)))
    }

    fn transition_column(&self, state: usize, t: Time) -> Result<ArrayView1<'_, f64>, MarkovError> {
        let state = check_state(state, self.dim())?;
        Ok(self.transition_cdfs_at(t).column(state))
    }
}

impl From<&MarkovModel> for StitchedMarkovModel {
    /// One-segment model with the same transition matrix and initial
    /// distribution. Holding periods are not carried over.
    fn from(model: &MarkovModel) -> Self {
        Self::assemble(
            model.initial_distribution().clone(),
            vec![model.transitions().clone()],
            Vec::new(),
            Vec::new(),
        )
    }
}

/// Checks `M > 0` and that the per-boundary vectors have `M - 1` entries.
fn check_segment_counts(
    segments: usize,
    links: usize,
    lengths: usize,
    links_name: &str,
) -> Result<(), MarkovError> {
    if segments == 0 {
        return Err(MarkovError::invalid("at least one segment is required"));
    }
    if links != segments - 1 {
        return Err(MarkovError::invalid(format!(
            "got {links} {links_name} for {segments} segments, expected {}",
            segments - 1
        )));
    }
    if lengths != segments - 1 {
        return Err(MarkovError::invalid(format!(
            "got {lengths} segment lengths for {segments} segments, expected {}",
            segments - 1
        )));
    }
    Ok(())
}

fn cumulate_lengths(lengths: &[Time]) -> Result<Vec<Time>, MarkovError> {
    let mut total: Time = 0;
    lengths
        .iter()
        .map(|&length| {
            total = total
                .checked_add(length)
                .ok_or_else(|| MarkovError::invalid("total segment length overflows"))?;
            Ok(total)
        })
        .collect()
}
