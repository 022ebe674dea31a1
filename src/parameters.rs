//! Model parameters.
//!
//! The free functions of this crate validate their own
//! arguments. [`ModelParametersBuilder`] collects a complete
//! set of parameters up front and drives whole analyses.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use asgsim_core::AlleleType;
use asgsim_genetics::TwoStateMutation;

use crate::{AsgError, EventHistory};

pub(crate) fn validate_sample_size(sample_size: usize) -> Result<(), AsgError> {
    if sample_size > 1 {
        Ok(())
    } else {
        Err(AsgError::invalid_parameter("sample size", sample_size))
    }
}

pub(crate) fn validate_selection(selection: f64) -> Result<(), AsgError> {
    if selection.is_finite() && selection >= 0.0 {
        Ok(())
    } else {
        Err(AsgError::invalid_parameter("selection strength", selection))
    }
}

pub(crate) fn validate_mutation_rate(mutation_rate: f64) -> Result<TwoStateMutation, AsgError> {
    TwoStateMutation::new(mutation_rate)
        .ok_or_else(|| AsgError::invalid_parameter("mutation rate", mutation_rate))
}

pub(crate) fn validate_trials(trials: usize) -> Result<(), AsgError> {
    if trials > 0 {
        Ok(())
    } else {
        Err(AsgError::invalid_parameter("trials", trials))
    }
}

pub(crate) fn validate_observed(
    observed: &[AlleleType],
    history: &EventHistory,
) -> Result<(), AsgError> {
    if observed.len() == history.sample_size() {
        Ok(())
    } else {
        Err(AsgError::invalid_parameter(
            "observed sample",
            format!(
                "{} types for a sample of size {}",
                observed.len(),
                history.sample_size()
            ),
        ))
    }
}

/// A validated set of model parameters.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ModelParameters {
    sample_size: usize,
    selection: f64,
    mutation_rate: f64,
    ancestor_type: AlleleType,
    trials: usize,
    seed: u64,
}

/// The outcome of [`ModelParameters::validate_likelihood`].
#[derive(Clone, Debug, PartialEq)]
pub struct LikelihoodComparison {
    /// The simulated history
    pub history: EventHistory,
    /// The sample simulated on `history`
    pub observed: Vec<AlleleType>,
    /// Exact likelihood of `observed`
    pub exact: f64,
    /// Monte-Carlo estimate of the same quantity
    pub empirical: f64,
}

impl LikelihoodComparison {
    /// `|exact - empirical|`
    pub fn absolute_difference(&self) -> f64 {
        (self.exact - self.empirical).abs()
    }
}

impl ModelParameters {
    /// Number of sampled lineages.
    pub fn sample_size(&self) -> usize {
        self.sample_size
    }

    /// Selection strength `sigma`.
    pub fn selection(&self) -> f64 {
        self.selection
    }

    /// Per-lineage mutation rate `u`.
    pub fn mutation_rate(&self) -> f64 {
        self.mutation_rate
    }

    /// Type of the ultimate ancestor.
    pub fn ancestor_type(&self) -> AlleleType {
        self.ancestor_type
    }

    /// Number of Monte-Carlo replicates.
    pub fn trials(&self) -> usize {
        self.trials
    }

    /// Seed of [`ModelParameters::rng`].
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// A random number generator seeded with [`ModelParameters::seed`].
    pub fn rng(&self) -> StdRng {
        StdRng::seed_from_u64(self.seed)
    }

    /// Simulate an event history with these parameters.
    pub fn simulate_history<R: Rng>(&self, rng: &mut R) -> Result<EventHistory, AsgError> {
        crate::simulate(self.sample_size, self.selection, rng)
    }

    /// Overlay mutations on `history` and read off the sample.
    pub fn simulate_sample<R: Rng>(
        &self,
        history: &EventHistory,
        rng: &mut R,
    ) -> Result<Vec<AlleleType>, AsgError> {
        let annotated = crate::overlay(history, self.mutation_rate, rng)?;
        crate::project(&annotated, self.ancestor_type)
    }

    /// Simulate a history and a sample from it, then compare the
    /// exact likelihood of that sample to its Monte-Carlo estimate.
    ///
    /// The result is reproducible for a given seed.
    pub fn validate_likelihood(&self) -> Result<LikelihoodComparison, AsgError> {
        let mut rng = self.rng();
        let history = self.simulate_history(&mut rng)?;
        let observed = self.simulate_sample(&history, &mut rng)?;
        let exact = crate::likelihood(&observed, &history, self.mutation_rate, self.ancestor_type)?;
        let empirical = crate::empirical_likelihood(
            &observed,
            &history,
            self.mutation_rate,
            self.ancestor_type,
            self.trials,
            &mut rng,
        )?;
        log::debug!(
            "exact likelihood {} vs empirical {} over {} trials",
            exact,
            empirical,
            self.trials
        );
        Ok(LikelihoodComparison {
            history,
            observed,
            exact,
            empirical,
        })
    }
}

/// Build [`ModelParameters`].
///
/// Sample size and mutation rate are required.
/// By default there is no selection, the ancestor is
/// of type `0`, `10_000` Monte-Carlo trials are used,
/// and the seed is `0`.
///
/// # Examples
///
/// ```
/// use asgsim::prelude::*;
///
/// let params = ModelParametersBuilder::default()
///     .sample_size(4)
///     .selection(1.0)
///     .mutation_rate(0.5)
///     .ancestor_type(1)
///     .build()
///     .unwrap();
/// assert_eq!(params.ancestor_type(), AlleleType::Advantaged);
///
/// assert!(ModelParametersBuilder::default().sample_size(4).build().is_err());
/// ```
#[derive(Default, Debug, Clone)]
pub struct ModelParametersBuilder {
    sample_size: Option<usize>,
    selection: Option<f64>,
    mutation_rate: Option<f64>,
    ancestor_type: Option<u8>,
    trials: Option<usize>,
    seed: Option<u64>,
}

impl ModelParametersBuilder {
    /// Number of Monte-Carlo trials unless set.
    pub const DEFAULT_TRIALS: usize = 10_000;

    /// Set the sample size.
    pub fn sample_size(mut self, sample_size: usize) -> Self {
        self.sample_size = Some(sample_size);
        self
    }

    /// Set the selection strength.
    pub fn selection(mut self, selection: f64) -> Self {
        self.selection = Some(selection);
        self
    }

    /// Set the mutation rate.
    pub fn mutation_rate(mut self, mutation_rate: f64) -> Self {
        self.mutation_rate = Some(mutation_rate);
        self
    }

    /// Set the ancestor type, `0` or `1`.
    pub fn ancestor_type(mut self, ancestor_type: u8) -> Self {
        self.ancestor_type = Some(ancestor_type);
        self
    }

    /// Set the number of Monte-Carlo trials.
    pub fn trials(mut self, trials: usize) -> Self {
        self.trials = Some(trials);
        self
    }

    /// Set the random number seed.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validate the parameters.
    ///
    /// # Errors
    ///
    /// [`AsgError::InvalidParameter`] naming the first
    /// missing or out-of-range parameter.
    pub fn build(self) -> Result<ModelParameters, AsgError> {
        let sample_size = self
            .sample_size
            .ok_or_else(|| AsgError::invalid_parameter("sample size", "missing"))?;
        validate_sample_size(sample_size)?;
        let selection = self.selection.unwrap_or(0.0);
        validate_selection(selection)?;
        let mutation_rate = self
            .mutation_rate
            .ok_or_else(|| AsgError::invalid_parameter("mutation rate", "missing"))?;
        validate_mutation_rate(mutation_rate)?;
        let raw_ancestor_type = self.ancestor_type.unwrap_or(0);
        let ancestor_type = AlleleType::try_from(raw_ancestor_type)
            .map_err(|_| AsgError::invalid_parameter("ancestor type", raw_ancestor_type))?;
        let trials = self.trials.unwrap_or(Self::DEFAULT_TRIALS);
        validate_trials(trials)?;
        Ok(ModelParameters {
            sample_size,
            selection,
            mutation_rate,
            ancestor_type,
            trials,
            seed: self.seed.unwrap_or(0),
        })
    }
}
