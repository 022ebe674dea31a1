use rand::Rng;

use asgsim_core::LineageId;
use asgsim_genetics::{GenerateMutations, MutationArrivals};

use crate::history::ForwardReplay;
use crate::parameters::validate_mutation_rate;
use crate::{AsgError, Event, EventHistory};

/// An event history with mutations interleaved in time.
///
/// The last event is always [`Event::Present`].
#[derive(Clone, Debug, PartialEq)]
pub struct AnnotatedHistory {
    sample_size: usize,
    ancestor: LineageId,
    events: Vec<Event>,
}

impl AnnotatedHistory {
    /// Wrap hand-constructed events without validation.
    ///
    /// [`crate::project`] reports any inconsistency.
    /// A missing [`Event::Present`] is appended.
    pub fn from_events(sample_size: usize, ancestor: LineageId, mut events: Vec<Event>) -> Self {
        if events.last() != Some(&Event::Present) {
            events.push(Event::Present);
        }
        Self {
            sample_size,
            ancestor,
            events,
        }
    }

    /// Structural events and mutations, most ancient first.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Number of sampled lineages.
    pub fn sample_size(&self) -> usize {
        self.sample_size
    }

    /// The lineage at the root of the history.
    pub fn ultimate_ancestor(&self) -> LineageId {
        self.ancestor
    }

    /// Number of [`Event::Mutation`] records.
    pub fn num_mutations(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, Event::Mutation { .. }))
            .count()
    }
}

/// Place neutral mutations on the lineages of `history`.
///
/// The history is replayed from the ultimate ancestor
/// to the present. Between consecutive events, each of the
/// active lineages mutates at rate `mutation_rate`; every
/// mutation lands on an active lineage chosen uniformly.
/// No mutations fall on the ultimate ancestor before the
/// most ancient event.
///
/// # Errors
///
/// * [`AsgError::InvalidParameter`] if `mutation_rate` is not
///   finite and positive.
/// * [`AsgError::MutationError`] if an interval between events
///   would carry more than
///   [`asgsim_genetics::MutationArrivals::MAX_EXPECTED_MUTATIONS`]
///   mutations.
pub fn overlay<R: Rng>(
    history: &EventHistory,
    mutation_rate: f64,
    rng: &mut R,
) -> Result<AnnotatedHistory, AsgError> {
    let model = validate_mutation_rate(mutation_rate)?;
    let mut arrivals = MutationArrivals::new(model);
    let mut replay = ForwardReplay::new(history.ultimate_ancestor());
    let mut events = Vec::with_capacity(history.len() + 1);
    let mut previous = None;

    let structural = history.events().iter().chain(std::iter::once(&Event::Present));
    for (index, event) in structural.enumerate() {
        if let Some(start) = previous {
            arrivals.generate_mutations(start, event.time(), replay.active().len(), rng)?;
            for &time in arrivals.mutations() {
                let lineage = replay
                    .active()
                    .choose(rng)
                    .ok_or_else(|| AsgError::inconsistent(index, "no active lineages"))?;
                events.push(Event::Mutation { time, lineage });
            }
        }
        replay.apply(index, event)?;
        events.push(*event);
        previous = Some(event.time());
    }

    Ok(AnnotatedHistory {
        sample_size: history.sample_size(),
        ancestor: history.ultimate_ancestor(),
        events,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::tests::branching_events;
    use rand::SeedableRng;

    #[test]
    fn test_structure_is_preserved() {
        let history = EventHistory::from_events(2, branching_events()).unwrap();
        let mut rng = rand::rngs::StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let annotated = overlay(&history, 2.0, &mut rng).unwrap();
            assert_eq!(annotated.events().last(), Some(&Event::Present));
            let structural: Vec<Event> = annotated
                .events()
                .iter()
                .filter(|e| e.is_structural())
                .copied()
                .collect();
            assert_eq!(structural, history.events());
            assert_eq!(
                annotated.events().len(),
                history.len() + 1 + annotated.num_mutations()
            );
            assert!(annotated
                .events()
                .windows(2)
                .all(|w| w[0].time() >= w[1].time()));
        }
    }

    #[test]
    fn test_mutations_land_on_active_lineages() {
        let history = EventHistory::from_events(2, branching_events()).unwrap();
        let mut rng = rand::rngs::StdRng::seed_from_u64(11);
        let annotated = overlay(&history, 5.0, &mut rng).unwrap();
        assert!(annotated.num_mutations() > 0);
        let mut replay = ForwardReplay::new(annotated.ultimate_ancestor());
        for (index, event) in annotated.events().iter().enumerate() {
            replay.apply(index, event).unwrap();
        }
    }

    #[test]
    fn test_huge_rate_fails_fast() {
        let history = EventHistory::from_events(2, branching_events()).unwrap();
        let mut rng = rand::rngs::StdRng::seed_from_u64(0);
        assert!(matches!(
            overlay(&history, 1e20, &mut rng),
            Err(AsgError::MutationError {
                value: asgsim_genetics::Error::TooManyMutations { .. }
            })
        ));
    }

    #[test]
    fn test_invalid_rate() {
        let history = EventHistory::from_events(2, branching_events()).unwrap();
        let mut rng = rand::rngs::StdRng::seed_from_u64(0);
        assert!(matches!(
            overlay(&history, 0.0, &mut rng),
            Err(AsgError::InvalidParameter { .. })
        ));
    }
}
