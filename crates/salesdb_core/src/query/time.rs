use std::collections::BTreeMap;

use rust_decimal::Decimal;

use super::category::round_dp;
use crate::aggregate::{AvgState, CountState, aggregate_groups};
use crate::cleaner::CleanedDataset;
use crate::rank::competition_rank_desc;
use crate::record::Shift;
use crate::table::{ScalarValue, TableRow};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BestMonth {
    pub year: i32,
    pub month: u32,
    /// Unrounded average sale for the month.
    pub avg_sale: Decimal,
}

impl TableRow for BestMonth {
    const COLUMNS: &'static [&'static str] = &["year", "month", "avg_sale"];

    fn into_values(self) -> Vec<ScalarValue> {
        vec![
            i64::from(self.year).into(),
            i64::from(self.month).into(),
            round_dp(self.avg_sale, 2).into(),
        ]
    }
}

/// The month with the highest average sale in each year.
///
/// Months are ranked within their year with competition ranking, every month
/// with rank 1 is returned. Output is ordered by year then month.
pub fn best_month_per_year(dataset: &CleanedDataset) -> Vec<BestMonth> {
    let monthly = aggregate_groups(dataset.sales(), AvgState::default, |sale| {
        Some(((sale.year(), sale.month()), sale.total_sale))
    });

    let mut by_year: BTreeMap<i32, Vec<BestMonth>> = BTreeMap::new();
    for ((year, month), avg) in monthly {
        if let Some(avg_sale) = avg {
            by_year.entry(year).or_default().push(BestMonth {
                year,
                month,
                avg_sale,
            });
        }
    }

    let mut out = Vec::with_capacity(by_year.len());
    for (_year, months) in by_year {
        let mut best: Vec<_> = competition_rank_desc(months, |m| m.avg_sale)
            .into_iter()
            .take_while(|(rank, _)| *rank == 1)
            .map(|(_, month)| month)
            .collect();
        best.sort_by_key(|m| m.month);
        out.extend(best);
    }

    out
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShiftCount {
    pub shift: Shift,
    pub total_orders: i64,
}

impl TableRow for ShiftCount {
    const COLUMNS: &'static [&'static str] = &["shift", "total_orders"];

    fn into_values(self) -> Vec<ScalarValue> {
        vec![self.shift.as_str().into(), self.total_orders.into()]
    }
}

/// Number of orders in each shift. Every shift is reported, including shifts
/// without orders.
pub fn shift_counts(dataset: &CleanedDataset) -> Vec<ShiftCount> {
    let counts: BTreeMap<Shift, i64> =
        aggregate_groups(dataset.sales(), CountState::default, |sale| {
            Some((sale.shift(), ()))
        })
        .into_iter()
        .map(|(shift, count)| (shift, count.unwrap_or_default()))
        .collect();

    Shift::ALL
        .iter()
        .map(|shift| ShiftCount {
            shift: *shift,
            total_orders: counts.get(shift).copied().unwrap_or_default(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;
    use crate::query::test_util::{dataset, sale};

    #[test]
    fn best_month_each_year() {
        let ds = dataset(vec![
            sale(1).date(2022, 1, 10).total(dec!(1200)).build(),
            sale(2).date(2022, 1, 22).total(dec!(800)).build(),
            sale(3).date(2022, 2, 14).total(dec!(60)).build(),
            sale(4).date(2022, 7, 3).total(dec!(1100)).build(),
            sale(5).date(2023, 3, 8).total(dec!(2000)).build(),
            sale(6).date(2023, 6, 30).total(dec!(90)).build(),
        ]);

        assert_eq!(
            vec![
                BestMonth {
                    year: 2022,
                    month: 7,
                    avg_sale: dec!(1100),
                },
                BestMonth {
                    year: 2023,
                    month: 3,
                    avg_sale: dec!(2000),
                },
            ],
            best_month_per_year(&ds)
        );
    }

    #[test]
    fn tied_months_share_first_place() {
        let ds = dataset(vec![
            sale(1).date(2022, 5, 1).total(dec!(100)).build(),
            sale(2).date(2022, 3, 1).total(dec!(50)).build(),
            sale(3).date(2022, 3, 2).total(dec!(150)).build(),
            sale(4).date(2022, 9, 1).total(dec!(20)).build(),
        ]);

        let months: Vec<_> = best_month_per_year(&ds).iter().map(|m| m.month).collect();
        assert_eq!(vec![3, 5], months);
    }

    #[test]
    fn winner_beats_every_other_month() {
        let ds = dataset(
            (0..48)
                .map(|id| {
                    let month = (id % 12) as u32 + 1;
                    let year = 2022 + (id / 24) as i32;
                    sale(id)
                        .date(year, month, 1)
                        .total(Decimal::from(id * 37 % 101))
                        .build()
                })
                .collect(),
        );

        let monthly = aggregate_groups(ds.sales(), AvgState::default, |sale| {
            Some(((sale.year(), sale.month()), sale.total_sale))
        });

        for best in best_month_per_year(&ds) {
            for ((year, _), avg) in &monthly {
                if *year == best.year {
                    assert!(best.avg_sale >= avg.unwrap());
                }
            }
        }
    }

    #[test]
    fn shift_example() {
        let ds = dataset(vec![
            sale(1).time(9, 0).build(),
            sale(2).time(14, 30).build(),
            sale(3).time(20, 0).build(),
        ]);

        let counts: Vec<_> = shift_counts(&ds)
            .into_iter()
            .map(|c| (c.shift, c.total_orders))
            .collect();
        assert_eq!(
            vec![
                (Shift::Morning, 1),
                (Shift::Afternoon, 1),
                (Shift::Evening, 1)
            ],
            counts
        );
    }

    #[test]
    fn shifts_partition_dataset() {
        let ds = dataset(
            (0..96)
                .map(|id| sale(id).time((id % 24) as u32, (id * 7 % 60) as u32).build())
                .collect(),
        );

        let counts = shift_counts(&ds);
        assert_eq!(3, counts.len());
        assert_eq!(ds.len() as i64, counts.iter().map(|c| c.total_orders).sum::<i64>());
        assert_eq!(48, counts[0].total_orders);
        assert_eq!(24, counts[1].total_orders);
        assert_eq!(24, counts[2].total_orders);
    }

    #[test]
    fn empty_dataset_reports_zero_shifts() {
        let counts = shift_counts(&dataset(vec![]));
        assert!(counts.iter().all(|c| c.total_orders == 0));
        assert!(best_month_per_year(&dataset(vec![])).is_empty());
    }
}
