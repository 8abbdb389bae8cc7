//! # Qualifier Ordering Relation
//!
//! Programs may declare `order q < q'`, making `q'` strictly more general
//! than `q` for dispatch purposes. The relation is a strict partial order,
//! kept transitively closed as declarations are ingested; a declaration
//! that would relate a qualifier to itself (directly or through the
//! closure) is rejected as a cycle.
//!
//! Dispatch consults the relation in two forms: [`OrderingGraph::compare`]
//! on individual qualifier names, and [`OrderingGraph::compare_sets`] on
//! whole qualifier sets, where the subset rule is tried first and the
//! graph only breaks ties between sets that differ in both directions.

use std::collections::{HashMap, HashSet};
use std::fmt;

use super::ty::QualifierSet;

/// Outcome of comparing qualifiers or qualifier sets by generality.
///
/// `Less` means the *left* side is strictly more general; a dispatch chain
/// is sorted so that every adjacent pair compares `Less` or `Equal`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Less,
    Greater,
    Equal,
    Incomparable,
}

/// A declaration that would make the ordering relation cyclic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderingCycle {
    pub before: String,
    pub after: String,
}

impl fmt::Display for OrderingCycle {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "ordering cycle: order {} < {} contradicts the existing ordering",
            self.before, self.after
        )
    }
}

/// The user-declared ordering over qualifier names, transitively closed.
#[derive(Debug, Clone, Default)]
pub struct OrderingGraph {
    /// For each qualifier, every qualifier it is strictly more general than.
    below: HashMap<String, HashSet<String>>,
}

impl OrderingGraph {
    pub fn new() -> Self {
        OrderingGraph::default()
    }

    /// Ingest `order before < after`: `after` becomes strictly more general
    /// than `before`, and the closure is extended. Rejects cycles.
    pub fn declare(&mut self, before: &str, after: &str) -> Result<(), OrderingCycle> {
        let cycle = || OrderingCycle {
            before: before.to_string(),
            after: after.to_string(),
        };
        if before == after || self.is_more_general(before, after) {
            return Err(cycle());
        }

        let mut gained: HashSet<String> =
            self.below.get(before).cloned().unwrap_or_default();
        gained.insert(before.to_string());

        self.below
            .entry(after.to_string())
            .or_default()
            .extend(gained.iter().cloned());

        // one propagation round suffices: the closure invariant means
        // anything above `after` already lists `after` directly
        let above: Vec<String> = self
            .below
            .iter()
            .filter(|(_, below)| below.contains(after))
            .map(|(q, _)| q.clone())
            .collect();
        for q in above {
            self.below
                .entry(q)
                .or_default()
                .extend(gained.iter().cloned());
        }
        Ok(())
    }

    /// Is `a` strictly more general than `b`?
    pub fn is_more_general(&self, a: &str, b: &str) -> bool {
        self.below.get(a).is_some_and(|below| below.contains(b))
    }

    /// Compare two qualifier names by generality.
    pub fn compare(&self, a: &str, b: &str) -> Comparison {
        if a == b {
            Comparison::Equal
        } else if self.is_more_general(a, b) {
            Comparison::Less
        } else if self.is_more_general(b, a) {
            Comparison::Greater
        } else {
            Comparison::Incomparable
        }
    }

    /// Compare two qualifier sets by generality: subset rule first, then
    /// the graph over the differing qualifiers. The graph orders the pair
    /// only when every differing pair agrees on one direction.
    pub fn compare_sets(&self, a: &QualifierSet, b: &QualifierSet) -> Comparison {
        if a == b {
            return Comparison::Equal;
        }
        if a.is_subset(b) {
            return Comparison::Less;
        }
        if b.is_subset(a) {
            return Comparison::Greater;
        }

        let only_a = a.difference(b);
        let only_b = b.difference(a);
        let mut direction: Option<Comparison> = None;
        for qa in only_a.iter() {
            for qb in only_b.iter() {
                let cmp = self.compare(qa, qb);
                match cmp {
                    Comparison::Less | Comparison::Greater => match direction {
                        Some(d) if d != cmp => return Comparison::Incomparable,
                        _ => direction = Some(cmp),
                    },
                    _ => return Comparison::Incomparable,
                }
            }
        }
        direction.unwrap_or(Comparison::Incomparable)
    }
}
