use rand::Rng;
use rand_distr::Exp;

use asgsim_core::{ActiveSet, LineageId, Time};

use crate::history::sample_lineages;
use crate::parameters::{validate_sample_size, validate_selection};
use crate::{AsgError, Event, EventHistory};

/// State of the dual process between events.
struct DualProcess {
    active: ActiveSet<LineageId>,
    next: LineageId,
    time: Time,
    events: Vec<Event>,
}

impl DualProcess {
    fn new(sample_size: usize) -> Result<Self, AsgError> {
        Ok(Self {
            active: sample_lineages(sample_size)?,
            next: LineageId::try_from(sample_size)?.next(),
            time: Time::PRESENT,
            events: vec![],
        })
    }

    fn fresh(&mut self) -> LineageId {
        let lineage = self.next;
        self.next = lineage.next();
        lineage
    }

    fn coalesce<R: Rng>(&mut self, rng: &mut R) {
        let (a, b) = match self.active.remove_sample(2, rng).as_deref() {
            Some(&[a, b]) => (a, b),
            _ => unreachable!("coalescence requires two active lineages"),
        };
        let parent = self.fresh();
        self.active.insert(parent);
        log::trace!("{}: {} and {} coalesce into {}", self.time, a, b, parent);
        self.events.push(Event::Coalescence {
            time: self.time,
            parent,
            children: (a, b),
        });
    }

    fn branch<R: Rng>(&mut self, rng: &mut R) {
        let lineage = match self.active.remove_random(rng) {
            Some(lineage) => lineage,
            None => unreachable!("branching requires an active lineage"),
        };
        let continuing = self.fresh();
        let incoming = self.fresh();
        self.active.insert(continuing);
        self.active.insert(incoming);
        log::trace!(
            "{}: {} branches into {} and {}",
            self.time,
            lineage,
            continuing,
            incoming
        );
        self.events.push(Event::Branching {
            time: self.time,
            lineage,
            continuing,
            incoming,
        });
    }
}

/// Simulate the ancestral selection graph of
/// `sample_size` lineages with selection strength `selection`.
///
/// With `j` active lineages, coalescence happens at rate
/// `j(j - 1) / 2` and branching at rate `selection * j / 2`.
/// The process stops when a single lineage, the ultimate
/// ancestor, remains.
///
/// # Errors
///
/// [`AsgError::InvalidParameter`] if `sample_size` < 2 or
/// `selection` is negative or not finite.
///
/// # Examples
///
/// ```
/// use rand::SeedableRng;
///
/// let mut rng = rand::rngs::StdRng::seed_from_u64(101);
/// let history = asgsim::simulate(5, 0.0, &mut rng).unwrap();
/// assert_eq!(history.num_coalescences(), 4);
/// assert_eq!(history.num_branchings(), 0);
/// ```
pub fn simulate<R: Rng>(
    sample_size: usize,
    selection: f64,
    rng: &mut R,
) -> Result<EventHistory, AsgError> {
    validate_sample_size(sample_size)?;
    validate_selection(selection)?;

    let mut dual = DualProcess::new(sample_size)?;
    while dual.active.len() > 1 {
        let j = dual.active.len() as f64;
        let coalescence_rate = j * (j - 1.0) / 2.0;
        let branching_rate = selection * j / 2.0;
        let total_rate = coalescence_rate + branching_rate;

        let is_coalescence = rng.random_bool(coalescence_rate / total_rate);
        let exp = Exp::new(total_rate)
            .map_err(|_| AsgError::invalid_parameter("selection strength", selection))?;
        let waiting: f64 = rng.sample(exp);
        dual.time = dual
            .time
            .before(waiting)
            .ok_or(asgsim_core::Error::TimeError(waiting))?;

        if is_coalescence {
            dual.coalesce(rng);
        } else {
            dual.branch(rng);
        }
    }

    let ancestor = dual.active.as_slice()[0];
    let mut events = dual.events;
    // most ancient first
    events.reverse();
    let history = EventHistory::new_unchecked(sample_size, ancestor, events);
    log::debug!(
        "simulated {} coalescences and {} branchings, ultimate ancestor {} at time {}",
        history.num_coalescences(),
        history.num_branchings(),
        ancestor,
        dual.time
    );
    Ok(history)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_no_selection_means_no_branching() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(0);
        for n in 2..20 {
            let history = simulate(n, 0.0, &mut rng).unwrap();
            assert_eq!(history.len(), n - 1);
            assert!(history
                .events()
                .iter()
                .all(|e| matches!(e, Event::Coalescence { .. })));
            assert_eq!(history.num_internal(), n - 2);
        }
    }

    #[test]
    fn test_invalid_parameters() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(0);
        for (n, sigma) in [(0, 1.0), (1, 1.0), (2, -1.0), (2, f64::NAN), (2, f64::INFINITY)] {
            assert!(matches!(
                simulate(n, sigma, &mut rng),
                Err(AsgError::InvalidParameter { .. })
            ));
        }
    }

    #[test]
    fn test_simulated_history_is_valid() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(1234);
        for _ in 0..100 {
            let history = simulate(4, 2.0, &mut rng).unwrap();
            let rebuilt =
                EventHistory::from_events(history.sample_size(), history.events().to_vec()).unwrap();
            assert_eq!(rebuilt, history);
        }
    }

    #[test]
    fn test_reproducible() {
        let a = simulate(6, 1.5, &mut rand::rngs::StdRng::seed_from_u64(42)).unwrap();
        let b = simulate(6, 1.5, &mut rand::rngs::StdRng::seed_from_u64(42)).unwrap();
        assert_eq!(a, b);
    }
}
