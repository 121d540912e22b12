//! Stitched models addressed by calendar date.

use chrono::NaiveDate;
use ndarray::Array1;
use regime_calendar::{CalendarError, Period};

use crate::cdf::{check_uniform, select_in};
use crate::error::MarkovError;
use crate::stitched::{StitchedMarkovModel, Time};
use crate::validate::check_state;

/// A [`StitchedMarkovModel`] whose time index is derived from a date.
///
/// Model time is the number of whole `period`s elapsed since `start_date`;
/// dates before the start map to time 0.
#[derive(Debug, Clone)]
pub struct ScheduledStitchedMarkovModel {
    model: StitchedMarkovModel,
    start_date: NaiveDate,
    period: Period,
}

impl ScheduledStitchedMarkovModel {
    /// Attaches a calendar schedule to `model`.
    ///
    /// # Errors
    ///
    /// Returns [`MarkovError::Calendar`] wrapping
    /// [`CalendarError::NonPositivePeriod`] if `period` is zero or negative.
    pub fn new(
        model: StitchedMarkovModel,
        start_date: NaiveDate,
        period: Period,
    ) -> Result<Self, MarkovError> {
        if period.is_zero() || period.is_negative() {
            return Err(CalendarError::NonPositivePeriod {
                period: period.to_string(),
            }
            .into());
        }
        Ok(Self {
            model,
            start_date,
            period,
        })
    }

    /// The wrapped stitched model.
    pub fn model(&self) -> &StitchedMarkovModel {
        &self.model
    }

    /// Date of model time 0.
    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    /// Length of one model time step.
    pub fn period(&self) -> Period {
        self.period
    }

    /// Forwards to [`StitchedMarkovModel::precalculate_state_distributions`].
    pub fn precalculate_state_distributions(&mut self, cache_size: usize) {
        self.model.precalculate_state_distributions(cache_size);
    }

    /// Model time index of `date`: whole periods since the start date, or 0
    /// for earlier dates.
    ///
    /// Month and year periods count calendar months, so a partial month is
    /// not counted.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use ndarray::array;
    /// use regime_calendar::Period;
    /// use regime_markov::{ScheduledStitchedMarkovModel, StitchedMarkovModel};
    ///
    /// let model = StitchedMarkovModel::homogeneous(array![1.0], array![[1.0]]).unwrap();
    /// let start = NaiveDate::from_ymd_opt(2020, 1, 31).unwrap();
    /// let scheduled = ScheduledStitchedMarkovModel::new(model, start, Period::months(1)).unwrap();
    ///
    /// let feb_28 = NaiveDate::from_ymd_opt(2020, 2, 28).unwrap();
    /// assert_eq!(scheduled.calc_model_time(feb_28).unwrap(), 0);
    /// let feb_29 = NaiveDate::from_ymd_opt(2020, 2, 29).unwrap();
    /// assert_eq!(scheduled.calc_model_time(feb_29).unwrap(), 1);
    /// let mar_31 = NaiveDate::from_ymd_opt(2020, 3, 31).unwrap();
    /// assert_eq!(scheduled.calc_model_time(mar_31).unwrap(), 2);
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`MarkovError::Calendar`] if the date arithmetic overflows.
    pub fn calc_model_time(&self, date: NaiveDate) -> Result<Time, MarkovError> {
        if date < self.start_date {
            return Ok(0);
        }
        Ok(self.period.whole_periods_between(self.start_date, date)?)
    }

    /// Marginal state distribution at `date`.
    ///
    /// # Errors
    ///
    /// Returns [`MarkovError::Calendar`] if the date arithmetic overflows.
    pub fn calc_state_distribution(&self, date: NaiveDate) -> Result<Array1<f64>, MarkovError> {
        let t = self.calc_model_time(date)?;
        Ok(self.model.calc_state_distribution(t))
    }

    /// CDF of the marginal state distribution at `date`.
    ///
    /// # Errors
    ///
    /// Returns [`MarkovError::Calendar`] if the date arithmetic overflows.
    pub fn calc_state_cdf(&self, date: NaiveDate) -> Result<Array1<f64>, MarkovError> {
        let t = self.calc_model_time(date)?;
        Ok(self.model.calc_state_cdf(t))
    }

    /// Samples a state at the start date.
    ///
    /// # Errors
    ///
    /// Returns [`MarkovError::UniformOutOfRange`] if `u` is outside `[0, 1]`.
    pub fn draw_initial_state(&self, u: f64) -> Result<usize, MarkovError> {
        self.model.draw_initial_state(u)
    }

    /// Samples a state from the marginal distribution at `date`, without
    /// conditioning on any earlier state.
    ///
    /// # Errors
    ///
    /// Returns an error if `u` is outside `[0, 1]` or the date arithmetic
    /// overflows.
    pub fn draw_future_state(&self, date: NaiveDate, u: f64) -> Result<usize, MarkovError> {
        let u = check_uniform(u)?;
        let cdf = self.calc_state_cdf(date)?;
        Ok(select_in(cdf.view(), u))
    }

    /// Samples the state one period after `date` given `state` at `date`.
    ///
    /// Before the start date the chain has not begun: `state` is returned
    /// unchanged.
    ///
    /// # Errors
    ///
    /// Returns an error if `state` or `u` is out of range, or if the date
    /// arithmetic overflows.
    pub fn draw_next_state(
        &self,
        state: usize,
        date: NaiveDate,
        u: f64,
    ) -> Result<usize, MarkovError> {
        if date < self.start_date {
            check_uniform(u)?;
            return check_state(state, self.model.dim());
        }
        let t = self.calc_model_time(date)?;
        self.model.draw_next_state(state, t, u)
    }

    /// Samples the next state and its marginal percentile at `date`.
    ///
    /// Before the start date `(state, u)` is returned unchanged. See
    /// [`StitchedMarkovModel::draw_next_state_and_percentile`].
    ///
    /// # Errors
    ///
    /// Returns an error if `state` or `u` is out of range, or if the date
    /// arithmetic overflows.
    pub fn draw_next_state_and_percentile(
        &self,
        state: usize,
        date: NaiveDate,
        u: f64,
    ) -> Result<(usize, f64), MarkovError> {
        if date < self.start_date {
            let u = check_uniform(u)?;
            return Ok((check_state(state, self.model.dim())?, u));
        }
        let t = self.calc_model_time(date)?;
        self.model.draw_next_state_and_percentile(state, t, u)
    }
}
