use std::path::PathBuf;

use chrono::NaiveDate;
use rust_decimal_macros::dec;
use salesdb_core::query::{self, DatasetOverview};
use salesdb_core::table::ScalarValue;
use salesdb_core::{
    CleanedDataset,
    CleaningPolicy,
    Column,
    LoadOptions,
    Query,
    QueryParams,
    Shift,
    clean,
    load_path,
    load_reader,
};

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/retail_sales.csv")
}

fn cleaned(policy: CleaningPolicy) -> CleanedDataset {
    logutil::init_test();
    let loaded = load_path(fixture_path(), &LoadOptions::default()).unwrap();
    assert_eq!(16, loaded.records.len());
    clean(&loaded.records, policy)
}

fn ids(sales: &[salesdb_core::ValidSale]) -> Vec<i64> {
    sales.iter().map(|s| s.transaction_id).collect()
}

#[test]
fn cleaning_fixture() {
    let ds = cleaned(CleaningPolicy::Lenient);
    assert_eq!(12, ds.len());
    assert_eq!(4, ds.report().dropped_rows());
    for col in [
        Column::SaleDate,
        Column::Gender,
        Column::Cogs,
        Column::Quantity,
    ] {
        assert_eq!(Some(&1), ds.report().missing_by_column.get(&col), "{col}");
    }

    let strict = cleaned(CleaningPolicy::Strict);
    assert_eq!(10, strict.len());
}

#[test]
fn cleaning_is_idempotent() {
    let ds = cleaned(CleaningPolicy::Lenient);
    let again = clean(&ds.to_records(), CleaningPolicy::Lenient);
    assert_eq!(ds.sales(), again.sales());
}

#[test]
fn sales_on_date_and_high_value() {
    let ds = cleaned(CleaningPolicy::Lenient);

    let on_date = query::sales_on_date(&ds, NaiveDate::from_ymd_opt(2022, 11, 5).unwrap());
    assert_eq!(vec![1, 2, 3], ids(&on_date));

    let high = query::high_value_sales(&ds, dec!(1000));
    assert_eq!(vec![4, 5, 8], ids(&high));
}

#[test]
fn category_queries() {
    let ds = cleaned(CleaningPolicy::Lenient);

    let quantity = query::category_quantity(&ds, "clothing");
    assert_eq!(1, quantity.len());
    assert_eq!(Some(12), quantity[0].total_quantity);

    let totals: Vec<_> = query::category_totals(&ds)
        .into_iter()
        .map(|t| (t.category, t.net_sale, t.total_orders))
        .collect();
    assert_eq!(
        vec![
            ("Beauty".to_string(), Some(dec!(1850)), 4),
            ("Clothing".to_string(), Some(dec!(1490)), 4),
            ("Electronics".to_string(), Some(dec!(2860)), 4),
        ],
        totals
    );

    assert_eq!(Some(dec!(27.33)), query::average_age(&ds, "beauty").avg_age);

    let genders: Vec<_> = query::category_gender_counts(&ds)
        .into_iter()
        .map(|c| (c.category, c.gender, c.total_transactions))
        .collect();
    let expected = [
        ("Beauty", "Female", 3),
        ("Beauty", "Male", 1),
        ("Clothing", "Female", 2),
        ("Clothing", "Male", 2),
        ("Electronics", "Female", 2),
        ("Electronics", "Male", 2),
    ];
    assert_eq!(
        expected
            .iter()
            .map(|(c, g, n)| (c.to_string(), g.to_string(), *n))
            .collect::<Vec<_>>(),
        genders
    );

    let customers: Vec<_> = query::unique_customers_per_category(&ds)
        .into_iter()
        .map(|c| c.unique_customers)
        .collect();
    assert_eq!(vec![3, 3, 4], customers);
}

#[test]
fn best_month_and_top_customers() {
    let ds = cleaned(CleaningPolicy::Lenient);

    let best: Vec<_> = query::best_month_per_year(&ds)
        .into_iter()
        .map(|m| (m.year, m.month, m.avg_sale))
        .collect();
    assert_eq!(vec![(2022, 1, dec!(1200)), (2023, 3, dec!(1025))], best);

    let top: Vec<_> = query::top_customers(&ds, 5)
        .into_iter()
        .map(|c| (c.customer_id, c.total_sales))
        .collect();
    assert_eq!(
        vec![
            (106, Some(dec!(2000))),
            (101, Some(dec!(1350))),
            (104, Some(dec!(1200))),
            (103, Some(dec!(590))),
            (102, Some(dec!(550))),
        ],
        top
    );
}

#[test]
fn shifts_partition_fixture() {
    let ds = cleaned(CleaningPolicy::Lenient);

    let shifts: Vec<_> = query::shift_counts(&ds)
        .into_iter()
        .map(|s| (s.shift, s.total_orders))
        .collect();
    assert_eq!(
        vec![
            (Shift::Morning, 5),
            (Shift::Afternoon, 4),
            (Shift::Evening, 3)
        ],
        shifts
    );
}

#[test]
fn overview_of_fixture() {
    let ds = cleaned(CleaningPolicy::Lenient);
    let overview = DatasetOverview::compute(&ds);

    assert_eq!(12, overview.total_sales);
    assert_eq!(9, overview.unique_customers);
    assert_eq!(vec!["Beauty", "Clothing", "Electronics"], overview.categories);
    assert_eq!(NaiveDate::from_ymd_opt(2022, 1, 10), overview.first_sale);
    assert_eq!(NaiveDate::from_ymd_opt(2023, 12, 24), overview.last_sale);
    assert_eq!(Some(dec!(6200)), overview.total_revenue);
    assert_eq!(Some(dec!(886.4)), overview.total_cogs);
    assert_eq!(Some(dec!(5313.6)), overview.gross_profit);
}

#[test]
fn sums_at_type_limits_are_null() {
    logutil::init_test();
    let csv = "\
transactions_id,sale_date,sale_time,customer_id,gender,age,category,quantiy,price_per_unit,cogs,total_sale
1,2023-01-01,10:00:00,1,Male,30,Clothing,9223372036854775807,1,1,79228162514264337593543950335
2,2023-01-02,11:00:00,1,Female,40,Clothing,1,1,1,79228162514264337593543950335
3,2023-01-03,12:00:00,2,Female,50,Beauty,2,10,5,20
";
    let loaded = load_reader(csv.as_bytes(), &LoadOptions::default()).unwrap();
    let ds = clean(&loaded.records, CleaningPolicy::Lenient);
    assert_eq!(3, ds.len());

    assert_eq!(None, query::category_quantity(&ds, "Clothing")[0].total_quantity);
    assert_eq!(Some(2), query::category_quantity(&ds, "Beauty")[0].total_quantity);

    let totals: Vec<_> = query::category_totals(&ds)
        .into_iter()
        .map(|t| (t.category, t.net_sale, t.total_orders))
        .collect();
    assert_eq!(
        vec![
            ("Beauty".to_string(), Some(dec!(20)), 1),
            ("Clothing".to_string(), None, 2),
        ],
        totals
    );

    let top: Vec<_> = query::top_customers(&ds, 5)
        .into_iter()
        .map(|c| (c.customer_id, c.total_sales))
        .collect();
    assert_eq!(vec![(2, Some(dec!(20))), (1, None)], top);

    let overview = DatasetOverview::compute(&ds);
    assert_eq!(None, overview.total_revenue);
    assert_eq!(None, overview.gross_profit);

    // Every query still renders, with nulls for the overflowed sums.
    for q in Query::ALL {
        q.execute(&ds, &QueryParams::default());
    }
}

#[test]
fn every_query_produces_a_table() {
    let ds = cleaned(CleaningPolicy::Lenient);
    let params = QueryParams::default();

    let tables: Vec<_> = Query::ALL
        .iter()
        .map(|q| q.execute(&ds, &params))
        .collect();

    assert_eq!("1. Sales on 2022-11-05", tables[0].title);
    assert_eq!(3, tables[0].num_rows());
    assert_eq!(Some(&ScalarValue::Int64(12)), tables[1].value(0, "total_quantity"));
    assert_eq!(
        Some(&ScalarValue::Decimal(dec!(1025.00))),
        tables[6].value(1, "avg_sale")
    );
    assert_eq!(5, tables[7].num_rows());
    assert_eq!(3, tables[9].num_rows());
    assert_eq!(
        Some(&ScalarValue::Int64(12)),
        tables[10].value(0, "value")
    );
}
