//! Event histories of the dual process.
//!
//! Events are stored from the most ancient
//! (the root coalescence producing the ultimate ancestor)
//! to the most recent. Times are measured backwards
//! from the present, so reading a history in storage order
//! visits strictly decreasing times.

use asgsim_core::{ActiveSet, LineageId, Time};

use crate::AsgError;

/// A record in an (annotated) event history.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Event {
    /// Backwards in time, two lineages merge into `parent`.
    /// Forwards in time, `parent` gives rise to both `children`.
    Coalescence {
        /// When the lineages merge
        time: Time,
        /// The merged lineage
        parent: LineageId,
        /// The two merging lineages
        children: (LineageId, LineageId),
    },
    /// Backwards in time, `lineage` splits into the potential
    /// parents `continuing` and `incoming`.
    Branching {
        /// When the lineage splits
        time: Time,
        /// The splitting lineage
        lineage: LineageId,
        /// The parent along the continuing branch
        continuing: LineageId,
        /// The parent along the incoming branch
        incoming: LineageId,
    },
    /// A neutral mutation flipping the type of `lineage`.
    Mutation {
        /// When the mutation happens
        time: Time,
        /// The mutated lineage
        lineage: LineageId,
    },
    /// Terminates a forward replay at time zero.
    Present,
}

impl Event {
    /// Time of the event. [`Event::Present`] is at [`Time::PRESENT`].
    pub fn time(&self) -> Time {
        match *self {
            Event::Coalescence { time, .. } => time,
            Event::Branching { time, .. } => time,
            Event::Mutation { time, .. } => time,
            Event::Present => Time::PRESENT,
        }
    }

    /// `true` for coalescence and branching events.
    pub fn is_structural(&self) -> bool {
        matches!(self, Event::Coalescence { .. } | Event::Branching { .. })
    }
}

/// How the type at the start of a lineage is determined.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Parentage {
    /// Inherited unchanged from a single parent.
    Single(LineageId),
    /// Resolved by selection between two potential parents.
    Selective {
        /// Parent along the continuing branch
        continuing: LineageId,
        /// Parent along the incoming branch
        incoming: LineageId,
    },
}

/// A lineage other than the ultimate ancestor,
/// together with its parentage and the time it was active.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Branch {
    /// The lineage
    pub lineage: LineageId,
    /// Where its type comes from
    pub parentage: Parentage,
    /// Time between the event creating the lineage
    /// and the one ending it (or the present)
    pub length: f64,
}

/// A validated realization of the dual process.
///
/// Instances are immutable and can only be obtained
/// from [`crate::simulate`] or [`EventHistory::from_events`],
/// so lineage numbering and time ordering always hold.
#[derive(Clone, Debug, PartialEq)]
pub struct EventHistory {
    sample_size: usize,
    ancestor: LineageId,
    events: Vec<Event>,
}

impl EventHistory {
    /// Validate a hand-constructed history.
    ///
    /// `events` must be ordered from the most ancient to the most recent.
    ///
    /// # Errors
    ///
    /// * [`AsgError::InvalidParameter`] if `sample_size` < 2.
    /// * [`AsgError::InconsistentHistory`] naming the offending event if
    ///   times are not strictly decreasing and positive, if an event refers
    ///   to a lineage that is not active at that point, if created lineages
    ///   do not receive consecutive fresh identifiers, if the history
    ///   contains mutations or the present marker, or if more than one
    ///   lineage remains.
    ///
    /// # Examples
    ///
    /// ```
    /// use asgsim::prelude::*;
    ///
    /// let t = Time::new(1.0).unwrap();
    /// let id = |x| LineageId::new(x).unwrap();
    /// let history = EventHistory::from_events(
    ///     2,
    ///     vec![Event::Coalescence { time: t, parent: id(3), children: (id(1), id(2)) }],
    /// )
    /// .unwrap();
    /// assert_eq!(history.ultimate_ancestor(), 3);
    /// assert_eq!(history.num_internal(), 0);
    /// ```
    pub fn from_events(sample_size: usize, events: Vec<Event>) -> Result<Self, AsgError> {
        crate::parameters::validate_sample_size(sample_size)?;
        let mut active = sample_lineages(sample_size)?;
        let mut next = LineageId::try_from(sample_size)?.next();
        let mut later = Time::PRESENT;

        for (index, event) in events.iter().enumerate().rev() {
            let time = event.time();
            if time <= later {
                return Err(AsgError::inconsistent(
                    index,
                    format!("time {} is not older than {}", time, later),
                ));
            }
            later = time;
            match *event {
                Event::Coalescence {
                    parent,
                    children: (a, b),
                    ..
                } => {
                    consume(&mut active, index, a)?;
                    consume(&mut active, index, b)?;
                    if parent != next {
                        return Err(AsgError::inconsistent(
                            index,
                            format!("lineage {} is not the next fresh id {}", parent, next),
                        ));
                    }
                    active.insert(parent);
                    next = next.next();
                }
                Event::Branching {
                    lineage,
                    continuing,
                    incoming,
                    ..
                } => {
                    consume(&mut active, index, lineage)?;
                    let (low, high) = if continuing < incoming {
                        (continuing, incoming)
                    } else {
                        (incoming, continuing)
                    };
                    if low != next || high != next.next() {
                        return Err(AsgError::inconsistent(
                            index,
                            format!(
                                "lineages {} and {} are not the next fresh ids {} and {}",
                                continuing,
                                incoming,
                                next,
                                next.next()
                            ),
                        ));
                    }
                    active.insert(low);
                    active.insert(high);
                    next = high.next();
                }
                Event::Mutation { .. } | Event::Present => {
                    return Err(AsgError::inconsistent(
                        index,
                        "only coalescence and branching events belong to a history",
                    ))
                }
            }
        }

        if active.len() != 1 {
            return Err(AsgError::inconsistent(
                0,
                format!(
                    "{} lineages remain after the most ancient event",
                    active.len()
                ),
            ));
        }
        let ancestor = active.as_slice()[0];
        Ok(Self::new_unchecked(sample_size, ancestor, events))
    }

    pub(crate) fn new_unchecked(sample_size: usize, ancestor: LineageId, events: Vec<Event>) -> Self {
        Self {
            sample_size,
            ancestor,
            events,
        }
    }

    /// The structural events, most ancient first.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Number of structural events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Always `false` for a valid history.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Number of sampled lineages, `N`.
    pub fn sample_size(&self) -> usize {
        self.sample_size
    }

    /// The single lineage left when the dual process stops.
    /// It carries the largest identifier.
    pub fn ultimate_ancestor(&self) -> LineageId {
        self.ancestor
    }

    /// Number of lineages that are neither
    /// sampled nor the ultimate ancestor.
    ///
    /// Their identifiers are `N + 1..=N + m`.
    pub fn num_internal(&self) -> usize {
        self.ancestor.index() - self.sample_size
    }

    /// Number of [`Event::Coalescence`] records.
    pub fn num_coalescences(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, Event::Coalescence { .. }))
            .count()
    }

    /// Number of [`Event::Branching`] records.
    pub fn num_branchings(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, Event::Branching { .. }))
            .count()
    }

    /// Every lineage except the ultimate ancestor,
    /// in increasing order of identifier.
    pub fn branches(&self) -> Vec<Branch> {
        let nlineages = self.ancestor.index() + 1;
        let mut birth: Vec<Option<Time>> = vec![None; nlineages];
        let mut death = vec![Time::PRESENT; nlineages];
        let mut parentage: Vec<Option<Parentage>> = vec![None; nlineages];

        for event in &self.events {
            match *event {
                Event::Coalescence {
                    time,
                    parent,
                    children: (a, b),
                } => {
                    death[parent.index()] = time;
                    for child in [a, b] {
                        birth[child.index()] = Some(time);
                        parentage[child.index()] = Some(Parentage::Single(parent));
                    }
                }
                Event::Branching {
                    time,
                    lineage,
                    continuing,
                    incoming,
                } => {
                    death[continuing.index()] = time;
                    death[incoming.index()] = time;
                    birth[lineage.index()] = Some(time);
                    parentage[lineage.index()] = Some(Parentage::Selective {
                        continuing,
                        incoming,
                    });
                }
                Event::Mutation { .. } | Event::Present => (),
            }
        }

        birth
            .into_iter()
            .zip(parentage)
            .zip(death)
            .enumerate()
            .filter_map(|(index, ((birth, parentage), death))| {
                Some(Branch {
                    lineage: LineageId::try_from(index + 1).ok()?,
                    parentage: parentage?,
                    length: birth? - death,
                })
            })
            .collect()
    }

    /// Time each lineage was active, indexed by [`LineageId::index`].
    ///
    /// The ultimate ancestor has no beginning and is
    /// assigned [`f64::INFINITY`].
    pub fn branch_lengths(&self) -> Vec<f64> {
        let mut lengths = vec![f64::INFINITY; self.ancestor.index() + 1];
        for branch in self.branches() {
            lengths[branch.lineage.index()] = branch.length;
        }
        lengths
    }
}

/// The active set `1..=sample_size` at the present.
pub(crate) fn sample_lineages(sample_size: usize) -> Result<ActiveSet<LineageId>, AsgError> {
    let last_sample = LineageId::try_from(sample_size)?;
    let mut active = ActiveSet::with_capacity(sample_size);
    let mut lineage = LineageId::FIRST;
    while lineage <= last_sample {
        active.insert(lineage);
        lineage = lineage.next();
    }
    Ok(active)
}

fn consume(
    active: &mut ActiveSet<LineageId>,
    index: usize,
    lineage: LineageId,
) -> Result<(), AsgError> {
    if active.remove(&lineage) {
        Ok(())
    } else {
        Err(AsgError::inconsistent(
            index,
            format!("lineage {} is not active", lineage),
        ))
    }
}

/// Tracks the active lineages while
/// replaying a history from the ancestor to the present.
pub(crate) struct ForwardReplay {
    active: ActiveSet<LineageId>,
}

impl ForwardReplay {
    pub(crate) fn new(ancestor: LineageId) -> Self {
        Self {
            active: ActiveSet::from_iter([ancestor]),
        }
    }

    pub(crate) fn active(&self) -> &ActiveSet<LineageId> {
        &self.active
    }

    pub(crate) fn apply(&mut self, index: usize, event: &Event) -> Result<(), AsgError> {
        match *event {
            Event::Coalescence {
                parent,
                children: (a, b),
                ..
            } => {
                consume(&mut self.active, index, parent)?;
                self.create(index, a)?;
                self.create(index, b)
            }
            Event::Branching {
                lineage,
                continuing,
                incoming,
                ..
            } => {
                consume(&mut self.active, index, continuing)?;
                consume(&mut self.active, index, incoming)?;
                self.create(index, lineage)
            }
            Event::Mutation { lineage, .. } => {
                if self.active.contains(&lineage) {
                    Ok(())
                } else {
                    Err(AsgError::inconsistent(
                        index,
                        format!("mutation on inactive lineage {}", lineage),
                    ))
                }
            }
            Event::Present => Ok(()),
        }
    }

    fn create(&mut self, index: usize, lineage: LineageId) -> Result<(), AsgError> {
        if self.active.insert(lineage) {
            Ok(())
        } else {
            Err(AsgError::inconsistent(
                index,
                format!("lineage {} is already active", lineage),
            ))
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn id(x: u32) -> LineageId {
        LineageId::new(x).unwrap()
    }

    pub(crate) fn time(t: f64) -> Time {
        Time::new(t).unwrap()
    }

    /// Two samples. Sample 1 branches into 3 (continuing)
    /// and 4 (incoming) at time 0.5, 3 and 2 coalesce into 5
    /// at time 1, and 4 and 5 coalesce into the ancestor 6
    /// at time 2.
    pub(crate) fn branching_events() -> Vec<Event> {
        vec![
            Event::Coalescence {
                time: time(2.0),
                parent: id(6),
                children: (id(4), id(5)),
            },
            Event::Coalescence {
                time: time(1.0),
                parent: id(5),
                children: (id(3), id(2)),
            },
            Event::Branching {
                time: time(0.5),
                lineage: id(1),
                continuing: id(3),
                incoming: id(4),
            },
        ]
    }

    #[test]
    fn test_counts() {
        let history = EventHistory::from_events(2, branching_events()).unwrap();
        assert_eq!(history.ultimate_ancestor(), 6);
        assert_eq!(history.num_internal(), 3);
        assert_eq!(history.num_branchings(), 1);
        assert_eq!(history.num_coalescences(), 2);
        assert_eq!(history.len(), 3);
    }

    #[test]
    fn test_branches() {
        let history = EventHistory::from_events(2, branching_events()).unwrap();
        let branches = history.branches();
        assert_eq!(branches.len(), 5);
        let expected = [
            (1, Parentage::Selective { continuing: id(3), incoming: id(4) }, 0.5),
            (2, Parentage::Single(id(5)), 1.0),
            (3, Parentage::Single(id(5)), 0.5),
            (4, Parentage::Single(id(6)), 1.5),
            (5, Parentage::Single(id(6)), 1.0),
        ];
        for (branch, (lineage, parentage, length)) in branches.iter().zip(expected) {
            assert_eq!(branch.lineage, lineage);
            assert_eq!(branch.parentage, parentage);
            assert!((branch.length - length).abs() < 1e-12);
        }
        let lengths = history.branch_lengths();
        assert_eq!(lengths.len(), 6);
        assert_eq!(lengths[5], f64::INFINITY);
    }

    #[test]
    fn test_reject_inactive_lineage() {
        let mut events = branching_events();
        events[1] = Event::Coalescence {
            time: time(1.0),
            parent: id(5),
            children: (id(3), id(1)),
        };
        match EventHistory::from_events(2, events) {
            Err(AsgError::InconsistentHistory { index, .. }) => assert_eq!(index, 1),
            other => panic!("{:?}", other),
        }
    }

    #[test]
    fn test_reject_time_order() {
        let mut events = branching_events();
        events[2] = Event::Branching {
            time: time(1.5),
            lineage: id(1),
            continuing: id(3),
            incoming: id(4),
        };
        match EventHistory::from_events(2, events) {
            Err(AsgError::InconsistentHistory { index, .. }) => assert_eq!(index, 1),
            other => panic!("{:?}", other),
        }
    }

    #[test]
    fn test_reject_reused_id() {
        let events = vec![
            Event::Coalescence {
                time: time(2.0),
                parent: id(5),
                children: (id(3), id(4)),
            },
            Event::Coalescence {
                time: time(1.0),
                parent: id(3),
                children: (id(1), id(2)),
            },
        ];
        match EventHistory::from_events(2, events) {
            Err(AsgError::InconsistentHistory { index, .. }) => assert_eq!(index, 0),
            other => panic!("{:?}", other),
        }
    }

    #[test]
    fn test_reject_unfinished() {
        let events = branching_events()[1..].to_vec();
        match EventHistory::from_events(2, events) {
            Err(AsgError::InconsistentHistory { index, reason }) => {
                assert_eq!(index, 0);
                assert!(reason.contains("2 lineages remain"));
            }
            other => panic!("{:?}", other),
        }
        assert!(matches!(
            EventHistory::from_events(2, vec![]),
            Err(AsgError::InconsistentHistory { .. })
        ));
        assert!(matches!(
            EventHistory::from_events(1, vec![]),
            Err(AsgError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_reject_mutation() {
        let mut events = branching_events();
        events.push(Event::Mutation {
            time: time(0.1),
            lineage: id(1),
        });
        match EventHistory::from_events(2, events) {
            Err(AsgError::InconsistentHistory { index, .. }) => assert_eq!(index, 3),
            other => panic!("{:?}", other),
        }
    }

    #[test]
    fn test_forward_replay() {
        let history = EventHistory::from_events(2, branching_events()).unwrap();
        let mut replay = ForwardReplay::new(history.ultimate_ancestor());
        for (index, event) in history.events().iter().enumerate() {
            replay.apply(index, event).unwrap();
        }
        let mut active = replay.active().as_slice().to_vec();
        active.sort();
        assert_eq!(active, vec![id(1), id(2)]);
        assert!(replay
            .apply(
                3,
                &Event::Mutation {
                    time: time(0.1),
                    lineage: id(4)
                }
            )
            .is_err());
    }
}
