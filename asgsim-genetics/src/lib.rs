//! Mutation models

use thiserror::Error;

mod mutation_model;

pub use mutation_model::GenerateMutations;
pub use mutation_model::MutationArrivals;
pub use mutation_model::MutationRate;
pub use mutation_model::TwoStateMutation;

/// Error type for mutation generation.
#[derive(Error, Debug, PartialEq)]
pub enum Error {
    /// An interval would carry too many mutations to generate.
    #[error("{expected} mutations expected on one interval, more than the limit of {limit}")]
    TooManyMutations {
        /// Expected number of mutations
        expected: f64,
        /// The limit
        limit: f64,
    },
    /// A total mutation rate that cannot parameterize
    /// exponential waiting times.
    #[error("invalid total mutation rate {0}")]
    MutationRateError(f64),
    /// A waiting time too short to move away from `time`.
    #[error("waiting time {waiting} does not advance time {time}")]
    StalledArrivals {
        /// Time of the last arrival
        time: f64,
        /// The waiting time drawn
        waiting: f64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use asgsim_core::Time;
    use rand::Rng;
    use rand::SeedableRng;

    struct NoMutations {}

    impl GenerateMutations for NoMutations {
        fn generate_mutations<T: Rng>(
            &mut self,
            _start: Time,
            _end: Time,
            _lineages: usize,
            _rng: &mut T,
        ) -> Result<(), Error> {
            Ok(())
        }
        fn mutations(&self) -> &[Time] {
            &[]
        }
    }

    #[test]
    fn test_default_len() {
        let mut m = NoMutations {};
        let mut rng = rand::rngs::StdRng::seed_from_u64(0);
        m.generate_mutations(Time::new(1.0).unwrap(), Time::PRESENT, 10, &mut rng)
            .unwrap();
        assert!(m.is_empty());
        assert_eq!(m.len(), 0);
    }
}

#[test]
fn test_mutation_rate() {
    assert!(MutationRate::new(1e-3).is_some());
    assert!(MutationRate::new(0.0).is_none());
    assert!(MutationRate::new(-1e-3).is_none());
    assert!(MutationRate::new(f64::INFINITY).is_none());
    assert!(MutationRate::new(f64::NAN).is_none());
}

#[test]
fn test_two_state_mutation() {
    let rate = MutationRate::new(0.5).unwrap();
    assert_eq!(TwoStateMutation::from_rate(rate), TwoStateMutation::new(0.5).unwrap());
    assert_eq!(TwoStateMutation::from_rate(rate).rate(), 0.5);
    assert!(TwoStateMutation::new(0.0).is_none());
    assert!(TwoStateMutation::new(f64::NEG_INFINITY).is_none());
}
