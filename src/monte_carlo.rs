use rand::Rng;

use asgsim_core::AlleleType;

use crate::parameters::{validate_mutation_rate, validate_observed, validate_trials};
use crate::{overlay, project, AsgError, EventHistory};

/// Estimate the probability of `observed` by simulation.
///
/// Each of the `trials` replicates overlays fresh mutations on
/// `history` and projects the ancestor's type down to the samples.
/// The estimate is the fraction of replicates reproducing `observed`
/// exactly and converges to [`crate::likelihood`].
///
/// # Errors
///
/// [`AsgError::InvalidParameter`] if `trials` is zero, the mutation
/// rate is not finite and positive, or `observed` does not match the
/// sample size, and [`AsgError::MutationError`] if mutations
/// cannot be generated at this rate.
pub fn empirical_likelihood<R: Rng>(
    observed: &[AlleleType],
    history: &EventHistory,
    mutation_rate: f64,
    ancestor_type: AlleleType,
    trials: usize,
    rng: &mut R,
) -> Result<f64, AsgError> {
    validate_trials(trials)?;
    validate_mutation_rate(mutation_rate)?;
    validate_observed(observed, history)?;

    let mut matches = 0_usize;
    for _ in 0..trials {
        let annotated = overlay(history, mutation_rate, rng)?;
        if project(&annotated, ancestor_type)? == observed {
            matches += 1;
        }
    }
    log::debug!("{} of {} replicates match the observed sample", matches, trials);
    Ok(matches as f64 / trials as f64)
}
