//! Exact sample likelihoods.
//!
//! Given the type of every lineage in a history, the number of
//! mutations along different lineages are independent and only
//! their parity matters, so the probability of a complete type
//! assignment is a product of two-state transition probabilities.
//! The likelihood of an observed sample sums that product over
//! every assignment of types to the internal lineages.
//!
//! The sum is evaluated in parallel. Floating-point addition is
//! not associative, so repeated calls may differ in the last few
//! units of precision.

use rayon::prelude::*;

use asgsim_core::AlleleType;
use asgsim_genetics::TwoStateMutation;

use crate::history::Parentage;
use crate::parameters::{validate_mutation_rate, validate_observed};
use crate::{AsgError, EventHistory};

/// A branch reduced to what a single summand needs.
#[derive(Copy, Clone, Debug)]
struct Factor {
    lineage: usize,
    parentage: FactorParentage,
    same: f64,
    switch: f64,
}

#[derive(Copy, Clone, Debug)]
enum FactorParentage {
    Single(usize),
    Selective { continuing: usize, incoming: usize },
}

impl Factor {
    fn probability(&self, types: &[AlleleType]) -> f64 {
        let parent = match self.parentage {
            FactorParentage::Single(p) => types[p],
            FactorParentage::Selective {
                continuing,
                incoming,
            } => AlleleType::select(types[continuing], types[incoming]),
        };
        if types[self.lineage] == parent {
            self.same
        } else {
            self.switch
        }
    }
}

fn factors(history: &EventHistory, model: &TwoStateMutation) -> Vec<Factor> {
    history
        .branches()
        .into_iter()
        .map(|branch| Factor {
            lineage: branch.lineage.index(),
            parentage: match branch.parentage {
                Parentage::Single(p) => FactorParentage::Single(p.index()),
                Parentage::Selective {
                    continuing,
                    incoming,
                } => FactorParentage::Selective {
                    continuing: continuing.index(),
                    incoming: incoming.index(),
                },
            },
            same: model.same_state_probability(branch.length),
            switch: model.switch_probability(branch.length),
        })
        .collect()
}

/// Exact likelihood calculator.
///
/// The cost is proportional to `2^m` times the size of the history,
/// where `m` is the number of internal lineages. Histories with more
/// than [`ExactLikelihood::max_internal`] internal lineages are
/// rejected with [`AsgError::EnumerationTooLarge`] before any work
/// is done.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ExactLikelihood {
    max_internal: usize,
}

impl Default for ExactLikelihood {
    fn default() -> Self {
        Self {
            max_internal: Self::DEFAULT_MAX_INTERNAL,
        }
    }
}

impl ExactLikelihood {
    /// About a billion summands.
    pub const DEFAULT_MAX_INTERNAL: usize = 30;

    /// Assignments are enumerated with a `u64` counter.
    pub const HARD_MAX_INTERNAL: usize = 62;

    /// # Returns
    ///
    /// * `Some` if `max_internal` <= [`ExactLikelihood::HARD_MAX_INTERNAL`]
    /// * `None` otherwise
    pub fn with_max_internal(max_internal: usize) -> Option<Self> {
        if max_internal <= Self::HARD_MAX_INTERNAL {
            Some(Self { max_internal })
        } else {
            None
        }
    }

    /// Largest number of internal lineages accepted.
    pub fn max_internal(&self) -> usize {
        self.max_internal
    }

    /// Probability of `observed` given `history`, the mutation
    /// rate, and the type of the ultimate ancestor.
    ///
    /// `observed[i]` is the type of sample `i + 1`.
    ///
    /// # Errors
    ///
    /// * [`AsgError::InvalidParameter`] if `mutation_rate` is not finite
    ///   and positive or `observed` does not match the sample size.
    /// * [`AsgError::EnumerationTooLarge`] if the history has too many
    ///   internal lineages.
    pub fn likelihood(
        &self,
        observed: &[AlleleType],
        history: &EventHistory,
        mutation_rate: f64,
        ancestor_type: AlleleType,
    ) -> Result<f64, AsgError> {
        let model = validate_mutation_rate(mutation_rate)?;
        validate_observed(observed, history)?;
        let internal = history.num_internal();
        if internal > self.max_internal {
            return Err(AsgError::EnumerationTooLarge {
                internal,
                limit: self.max_internal,
            });
        }
        if internal >= 20 {
            log::warn!(
                "enumerating 2^{} type assignments of internal lineages",
                internal
            );
        } else {
            log::debug!(
                "enumerating 2^{} type assignments of internal lineages",
                internal
            );
        }

        let factors = factors(history, &model);
        let sample_size = history.sample_size();
        let mut template = Vec::with_capacity(sample_size + internal + 1);
        template.extend_from_slice(observed);
        template.resize(sample_size + internal, AlleleType::Disadvantaged);
        template.push(ancestor_type);

        let total: f64 = (0..1_u64 << internal)
            .into_par_iter()
            .map_init(
                || template.clone(),
                |types, assignment| {
                    for (bit, allele) in types[sample_size..sample_size + internal]
                        .iter_mut()
                        .enumerate()
                    {
                        *allele = AlleleType::from((assignment >> bit) & 1 == 1);
                    }
                    let types: &[AlleleType] = types;
                    factors.iter().map(|f| f.probability(types)).product::<f64>()
                },
            )
            .sum();

        // rounding can push a sum of probabilities past one
        Ok(total.min(1.0))
    }

    /// Likelihood averaged over the type of the ultimate
    /// ancestor with the given `weights`, indexed by type.
    pub fn weighted_likelihood(
        &self,
        observed: &[AlleleType],
        history: &EventHistory,
        mutation_rate: f64,
        weights: [f64; 2],
    ) -> Result<f64, AsgError> {
        for w in weights {
            if !w.is_finite() || w < 0.0 {
                return Err(AsgError::invalid_parameter("ancestor weight", w));
            }
        }
        let mut total = 0.0;
        for (allele, weight) in AlleleType::ALL.into_iter().zip(weights) {
            total += weight * self.likelihood(observed, history, mutation_rate, allele)?;
        }
        Ok(total)
    }

    /// Likelihood with the ancestor drawn from the stationary
    /// distribution of the mutation process.
    pub fn unconditional_likelihood(
        &self,
        observed: &[AlleleType],
        history: &EventHistory,
        mutation_rate: f64,
    ) -> Result<f64, AsgError> {
        let model = validate_mutation_rate(mutation_rate)?;
        let weights = AlleleType::ALL.map(|a| model.stationary_probability(a));
        self.weighted_likelihood(observed, history, mutation_rate, weights)
    }
}

/// [`ExactLikelihood::likelihood`] with the default enumeration limit.
///
/// # Examples
///
/// ```
/// use asgsim::prelude::*;
///
/// let id = |x| LineageId::new(x).unwrap();
/// let history = EventHistory::from_events(
///     2,
///     vec![Event::Coalescence {
///         time: Time::new(1.0).unwrap(),
///         parent: id(3),
///         children: (id(1), id(2)),
///     }],
/// )
/// .unwrap();
/// let same = 0.5 * (1.0 + (-1.0_f64).exp());
/// let p = asgsim::likelihood(
///     &[AlleleType::Advantaged, AlleleType::Advantaged],
///     &history,
///     0.5,
///     AlleleType::Advantaged,
/// )
/// .unwrap();
/// assert!((p - same * same).abs() < 1e-12);
/// ```
pub fn likelihood(
    observed: &[AlleleType],
    history: &EventHistory,
    mutation_rate: f64,
    ancestor_type: AlleleType,
) -> Result<f64, AsgError> {
    ExactLikelihood::default().likelihood(observed, history, mutation_rate, ancestor_type)
}

/// [`ExactLikelihood::unconditional_likelihood`] with the default enumeration limit.
pub fn unconditional_likelihood(
    observed: &[AlleleType],
    history: &EventHistory,
    mutation_rate: f64,
) -> Result<f64, AsgError> {
    ExactLikelihood::default().unconditional_likelihood(observed, history, mutation_rate)
}
