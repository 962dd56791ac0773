//! Grouped aggregates over sales.

mod states;
pub use states::*;

use std::fmt::Debug;
use std::hash::Hash;

use hashbrown::HashMap;
use rayon::prelude::*;

use crate::record::ValidSale;

/// State for a single group's aggregate.
///
/// An example state for SUM would be a struct that takes a running sum from
/// values provided in `update`.
pub trait AggregateState: Debug {
    type Input;
    type Output;

    /// Merge other state into this state.
    fn merge(&mut self, other: Self);

    /// Update this state with some input.
    fn update(&mut self, input: Self::Input);

    /// Produce a single value from the state, None if the aggregate is null.
    fn finalize(self) -> Option<Self::Output>;
}

/// Aggregate states keyed by group.
#[derive(Debug)]
pub struct HashGrouper<K, S> {
    groups: HashMap<K, S>,
}

impl<K, S> Default for HashGrouper<K, S> {
    fn default() -> Self {
        HashGrouper {
            groups: HashMap::new(),
        }
    }
}

impl<K, S> HashGrouper<K, S>
where
    K: Hash + Eq + Ord,
    S: AggregateState,
{
    pub fn num_groups(&self) -> usize {
        self.groups.len()
    }

    /// Update the state for `key`, creating it with `new_state` if this is the
    /// first time we've seen the key.
    pub fn update(&mut self, key: K, input: S::Input, new_state: impl FnOnce() -> S) {
        self.groups.entry(key).or_insert_with(new_state).update(input);
    }

    /// Merge all groups from `other` into self.
    pub fn merge(&mut self, other: Self) {
        for (key, state) in other.groups {
            match self.groups.get_mut(&key) {
                Some(existing) => existing.merge(state),
                None => {
                    self.groups.insert(key, state);
                }
            }
        }
    }

    /// Finalize every group, returning the results ordered by key.
    pub fn finalize(self) -> Vec<(K, Option<S::Output>)> {
        let mut out: Vec<_> = self
            .groups
            .into_iter()
            .map(|(key, state)| (key, state.finalize()))
            .collect();
        out.sort_by(|a, b| a.0.cmp(&b.0));
        out
    }
}

/// Group sales and compute an aggregate for each group.
///
/// `key_input` extracts the group key and aggregate input for a sale, sales
/// where it returns None are skipped. Partial states are built in parallel and
/// merged.
pub fn aggregate_groups<K, S, F, N>(
    sales: &[ValidSale],
    new_state: N,
    key_input: F,
) -> Vec<(K, Option<S::Output>)>
where
    K: Hash + Eq + Ord + Send,
    S: AggregateState + Send,
    F: Fn(&ValidSale) -> Option<(K, S::Input)> + Sync,
    N: Fn() -> S + Sync,
{
    let grouper = sales
        .par_iter()
        .fold(HashGrouper::default, |mut grouper, sale| {
            if let Some((key, input)) = key_input(sale) {
                grouper.update(key, input, &new_state);
            }
            grouper
        })
        .reduce(HashGrouper::default, |mut a, b| {
            a.merge(b);
            a
        });

    grouper.finalize()
}
