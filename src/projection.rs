use std::collections::HashMap;

use asgsim_core::{AlleleType, LineageId};

use crate::{AnnotatedHistory, AsgError, Event};

/// Current type of every active lineage during a forward replay.
struct TypeMap {
    types: HashMap<LineageId, AlleleType>,
}

impl TypeMap {
    fn take(&mut self, index: usize, lineage: LineageId) -> Result<AlleleType, AsgError> {
        self.types.remove(&lineage).ok_or_else(|| {
            AsgError::inconsistent(index, format!("lineage {} is not active", lineage))
        })
    }

    fn give(&mut self, index: usize, lineage: LineageId, allele: AlleleType) -> Result<(), AsgError> {
        match self.types.insert(lineage, allele) {
            None => Ok(()),
            Some(_) => Err(AsgError::inconsistent(
                index,
                format!("lineage {} is already active", lineage),
            )),
        }
    }
}

/// Propagate `ancestor_type` from the ultimate ancestor
/// through `annotated` and return the types of the samples,
/// ordered by lineage id.
///
/// Forwards in time, a coalescence passes the parent's type to
/// both children, a branching gives the branching lineage the
/// advantaged type if either of its potential parents carries it,
/// and a mutation flips the type of its lineage.
///
/// # Errors
///
/// [`AsgError::InconsistentHistory`] if an event refers to a
/// lineage that is not active, or if a sample is never reached.
pub fn project(
    annotated: &AnnotatedHistory,
    ancestor_type: AlleleType,
) -> Result<Vec<AlleleType>, AsgError> {
    let mut map = TypeMap {
        types: HashMap::from([(annotated.ultimate_ancestor(), ancestor_type)]),
    };

    for (index, event) in annotated.events().iter().enumerate() {
        match *event {
            Event::Coalescence {
                parent,
                children: (a, b),
                ..
            } => {
                let allele = map.take(index, parent)?;
                map.give(index, a, allele)?;
                map.give(index, b, allele)?;
            }
            Event::Branching {
                lineage,
                continuing,
                incoming,
                ..
            } => {
                let continuing = map.take(index, continuing)?;
                let incoming = map.take(index, incoming)?;
                map.give(index, lineage, AlleleType::select(continuing, incoming))?;
            }
            Event::Mutation { lineage, .. } => match map.types.get_mut(&lineage) {
                Some(allele) => *allele = allele.flip(),
                None => {
                    return Err(AsgError::inconsistent(
                        index,
                        format!("mutation on inactive lineage {}", lineage),
                    ))
                }
            },
            Event::Present => break,
        }
    }

    let end = annotated.events().len();
    (1..=annotated.sample_size())
        .map(|sample| -> Result<AlleleType, AsgError> {
            let lineage = LineageId::try_from(sample)?;
            map.types.get(&lineage).copied().ok_or_else(|| {
                AsgError::inconsistent(end, format!("sample {} is never reached", lineage))
            })
        })
        .collect()
}
