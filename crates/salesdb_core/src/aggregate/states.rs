use std::fmt::Debug;
use std::hash::Hash;

use hashbrown::HashSet;
use rust_decimal::Decimal;
use tracing::warn;

use super::AggregateState;

/// A value that can be summed without wrapping.
pub trait SumValue: Copy + Default + Debug {
    fn checked_add(self, other: Self) -> Option<Self>;
}

impl SumValue for i64 {
    fn checked_add(self, other: Self) -> Option<Self> {
        i64::checked_add(self, other)
    }
}

impl SumValue for Decimal {
    fn checked_add(self, other: Self) -> Option<Self> {
        Decimal::checked_add(self, other)
    }
}

/// Running sum. Null if no values were seen or if the sum overflowed.
#[derive(Debug, Default)]
pub struct SumState<T> {
    sum: T,
    valid: bool,
    overflowed: bool,
}

impl<T: SumValue> SumState<T> {
    fn add(&mut self, value: T) {
        if self.overflowed {
            return;
        }
        match self.sum.checked_add(value) {
            Some(sum) => self.sum = sum,
            None => self.overflowed = true,
        }
    }
}

impl<T> AggregateState for SumState<T>
where
    T: SumValue,
{
    type Input = T;
    type Output = T;

    fn merge(&mut self, other: Self) {
        self.overflowed |= other.overflowed;
        if other.valid {
            self.add(other.sum);
            self.valid = true;
        }
    }

    fn update(&mut self, input: T) {
        self.add(input);
        self.valid = true;
    }

    fn finalize(self) -> Option<T> {
        if self.overflowed {
            warn!("sum overflowed, returning null");
            return None;
        }
        self.valid.then_some(self.sum)
    }
}

/// Number of rows in a group.
#[derive(Debug, Default)]
pub struct CountState {
    count: i64,
}

impl AggregateState for CountState {
    type Input = ();
    type Output = i64;

    fn merge(&mut self, other: Self) {
        self.count += other.count;
    }

    fn update(&mut self, _input: ()) {
        self.count += 1;
    }

    fn finalize(self) -> Option<i64> {
        Some(self.count)
    }
}

/// Average of decimal inputs. Null if no values were seen or if the running
/// sum overflowed.
#[derive(Debug, Default)]
pub struct AvgState {
    sum: SumState<Decimal>,
    count: i64,
}

impl AggregateState for AvgState {
    type Input = Decimal;
    type Output = Decimal;

    fn merge(&mut self, other: Self) {
        self.sum.merge(other.sum);
        self.count += other.count;
    }

    fn update(&mut self, input: Decimal) {
        self.sum.update(input);
        self.count += 1;
    }

    fn finalize(self) -> Option<Decimal> {
        if self.count == 0 {
            return None;
        }
        let count = Decimal::from(self.count);
        self.sum.finalize()?.checked_div(count)
    }
}

/// Number of distinct non-null values in a group.
#[derive(Debug)]
pub struct DistinctCountState<T> {
    seen: HashSet<T>,
}

impl<T> Default for DistinctCountState<T> {
    fn default() -> Self {
        DistinctCountState {
            seen: HashSet::new(),
        }
    }
}

impl<T> AggregateState for DistinctCountState<T>
where
    T: Hash + Eq + Debug,
{
    type Input = Option<T>;
    type Output = i64;

    fn merge(&mut self, other: Self) {
        self.seen.extend(other.seen);
    }

    fn update(&mut self, input: Option<T>) {
        if let Some(input) = input {
            self.seen.insert(input);
        }
    }

    fn finalize(self) -> Option<i64> {
        Some(self.seen.len() as i64)
    }
}

/// Two aggregates computed over the same group.
impl<A, B> AggregateState for (A, B)
where
    A: AggregateState,
    B: AggregateState,
{
    type Input = (A::Input, B::Input);
    type Output = (Option<A::Output>, Option<B::Output>);

    fn merge(&mut self, other: Self) {
        self.0.merge(other.0);
        self.1.merge(other.1);
    }

    fn update(&mut self, input: Self::Input) {
        self.0.update(input.0);
        self.1.update(input.1);
    }

    fn finalize(self) -> Option<Self::Output> {
        Some((self.0.finalize(), self.1.finalize()))
    }
}
