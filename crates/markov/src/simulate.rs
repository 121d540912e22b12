//! Trajectory simulation over a stitched model.

use crate::error::MarkovError;
use crate::stitched::{StitchedMarkovModel, Time};

/// Simulates one trajectory.
///
/// # Arguments
///
/// * `model` - The stitched model.
/// * `initial_state` - The state at time `start`.
/// * `start` - Time index of `initial_state`.
/// * `uniforms` - One draw in `[0, 1]` per simulated step.
///
/// # Returns
///
/// The states at times `start + 1 ..= start + uniforms.len()`.
///
/// # Errors
///
/// Returns an error if `initial_state` or any draw is out of range, or if
/// the time index overflows.
pub fn simulate_states(
    model: &StitchedMarkovModel,
    initial_state: usize,
    start: Time,
    uniforms: &[f64],
) -> Result<Vec<usize>, MarkovError> {
    let mut out = vec![0; uniforms.len()];
    simulate_states_into(model, initial_state, start, uniforms, &mut out)?;
    Ok(out)
}

/// Simulates one trajectory into a pre-allocated buffer.
///
/// # Arguments
///
/// * `model` - The stitched model.
/// * `initial_state` - The state at time `start`.
/// * `start` - Time index of `initial_state`.
/// * `uniforms` - One draw in `[0, 1]` per simulated step.
/// * `out` - Output buffer; must have the same length as `uniforms`.
///
/// # Errors
///
/// Returns [`MarkovError::LengthMismatch`] if `out.len() != uniforms.len()`,
/// and the errors of [`simulate_states`] otherwise.
pub fn simulate_states_into(
    model: &StitchedMarkovModel,
    initial_state: usize,
    start: Time,
    uniforms: &[f64],
    out: &mut [usize],
) -> Result<(), MarkovError> {
    if out.len() != uniforms.len() {
        return Err(MarkovError::LengthMismatch {
            what: "output buffer",
            expected: uniforms.len(),
            got: out.len(),
        });
    }
    let mut prev = initial_state;
    let mut t = start;
    for (slot, &u) in out.iter_mut().zip(uniforms) {
        let next = model.draw_next_state(prev, t, u)?;
        *slot = next;
        prev = next;
        t = t.checked_add(1).ok_or(MarkovError::TimeOutOfRange { t })?;
    }
    Ok(())
}
