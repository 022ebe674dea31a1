use rand::Rng;

use asgsim_core::AlleleType;
use asgsim_core::Time;

use crate::Error;

/// Per-lineage rate of the mutation process.
#[derive(Copy, Clone, Debug, PartialEq, PartialOrd)]
pub struct MutationRate(f64);

impl MutationRate {
    /// # Returns
    ///
    /// * `Some` if `rate` is finite and positive
    /// * `None` otherwise
    pub fn new(rate: f64) -> Option<Self> {
        if rate.is_finite() && rate > 0.0 {
            Some(Self(rate))
        } else {
            None
        }
    }

    /// The rate as a raw value.
    pub fn rate(&self) -> f64 {
        self.0
    }
}

impl From<MutationRate> for f64 {
    fn from(value: MutationRate) -> Self {
        value.0
    }
}

/// Symmetric mutation between the two allele types.
///
/// A lineage switches type at rate `u`, so the
/// number of mutations along a branch of length `t`
/// is Poisson with mean `u * t` and only its parity
/// matters for the type at the end of the branch.
///
/// # Examples
///
/// ```
/// use asgsim_core::AlleleType;
/// use asgsim_genetics::TwoStateMutation;
///
/// let m = TwoStateMutation::new(0.5).unwrap();
/// let p = m.same_state_probability(1.0);
/// assert!((p - 0.5 * (1.0 + (-1.0_f64).exp())).abs() < 1e-12);
/// let q = m.transition_probability(AlleleType::Advantaged, AlleleType::Disadvantaged, 1.0);
/// assert!((p + q - 1.0).abs() < 1e-12);
/// ```
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TwoStateMutation {
    rate: MutationRate,
}

impl TwoStateMutation {
    /// # Returns
    ///
    /// * `Some` if `rate` is finite and positive
    /// * `None` otherwise
    pub fn new(rate: f64) -> Option<Self> {
        MutationRate::new(rate).map(Self::from_rate)
    }

    /// Build a model from an already validated rate.
    pub fn from_rate(rate: MutationRate) -> Self {
        Self { rate }
    }

    /// Per-lineage mutation rate.
    pub fn rate(&self) -> f64 {
        self.rate.rate()
    }

    /// Probability of an even number of mutations in `elapsed` time.
    pub fn same_state_probability(&self, elapsed: f64) -> f64 {
        0.5 * (1.0 + (-2.0 * self.rate() * elapsed).exp())
    }

    /// Probability of an odd number of mutations in `elapsed` time.
    pub fn switch_probability(&self, elapsed: f64) -> f64 {
        // expm1 keeps precision for short branches
        -0.5 * (-2.0 * self.rate() * elapsed).exp_m1()
    }

    /// Probability that a lineage of type `from`
    /// has type `to` after `elapsed` time.
    pub fn transition_probability(&self, from: AlleleType, to: AlleleType, elapsed: f64) -> f64 {
        if from == to {
            self.same_state_probability(elapsed)
        } else {
            self.switch_probability(elapsed)
        }
    }

    /// The stationary distribution is uniform
    /// because switching is symmetric.
    pub fn stationary_probability(&self, _allele: AlleleType) -> f64 {
        0.5
    }
}

/// Generation of mutation times along an interval.
pub trait GenerateMutations {
    /// Generate mutation times falling strictly
    /// between `start` and the more recent `end`
    /// while `lineages` lineages are active.
    ///
    /// # Errors
    ///
    /// Implementations return an [`Error`] rather than
    /// generating an unbounded number of mutations.
    fn generate_mutations<T: Rng>(
        &mut self,
        start: Time,
        end: Time,
        lineages: usize,
        rng: &mut T,
    ) -> Result<(), Error>;

    /// The times generated by the last call
    /// to [`GenerateMutations::generate_mutations`].
    fn mutations(&self) -> &[Time];

    /// Number of generated mutations.
    fn len(&self) -> usize {
        self.mutations().len()
    }

    /// Checks if generated mutations are empty.
    fn is_empty(&self) -> bool {
        self.mutations().is_empty()
    }
}

/// Mutation arrivals along an interval, generated
/// as a Poisson process with exponential waiting times.
///
/// Times are stored from the most ancient to the most recent.
///
/// An interval whose expected number of mutations exceeds
/// [`MutationArrivals::MAX_EXPECTED_MUTATIONS`] is rejected
/// with [`Error::TooManyMutations`].
#[derive(Debug, Clone)]
pub struct MutationArrivals {
    model: TwoStateMutation,
    mutations: Vec<Time>,
}

impl MutationArrivals {
    /// Largest expected number of mutations on one interval.
    pub const MAX_EXPECTED_MUTATIONS: f64 = 1e6;

    /// Create a generator with an empty buffer.
    pub fn new(model: TwoStateMutation) -> Self {
        Self {
            model,
            mutations: vec![],
        }
    }
}

impl GenerateMutations for MutationArrivals {
    fn generate_mutations<T: Rng>(
        &mut self,
        start: Time,
        end: Time,
        lineages: usize,
        rng: &mut T,
    ) -> Result<(), Error> {
        self.mutations.clear();
        if lineages == 0 || start <= end {
            return Ok(());
        }
        let total_rate = self.model.rate() * lineages as f64;
        let expected = total_rate * (start - end);
        if expected > Self::MAX_EXPECTED_MUTATIONS {
            return Err(Error::TooManyMutations {
                expected,
                limit: Self::MAX_EXPECTED_MUTATIONS,
            });
        }
        let exp =
            rand_distr::Exp::new(total_rate).map_err(|_| Error::MutationRateError(total_rate))?;
        let mut current = start;
        loop {
            let waiting: f64 = rng.sample(exp);
            match current.after(waiting) {
                Some(next) if next > end => {
                    // waiting times below the precision of `current`
                    if next >= current {
                        return Err(Error::StalledArrivals {
                            time: current.raw(),
                            waiting,
                        });
                    }
                    self.mutations.push(next);
                    current = next;
                }
                _ => break,
            }
        }
        Ok(())
    }

    fn mutations(&self) -> &[Time] {
        &self.mutations
    }
}
