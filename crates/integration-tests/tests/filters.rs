//! Product and sales filtering, stock labels, and summaries.

use tokoku_core::product::categories;
use tokoku_core::transaction::{revenue_by_day, top_products};
use tokoku_core::{
    InventorySummary, ProductFilter, Rupiah, SalesSummary, StockLevel, TransactionFilter,
    TransactionStatus,
};
use tokoku_integration_tests::{product, transaction};

#[test]
fn test_stock_label_boundaries() {
    for stock in [-3, 0, 1, 5] {
        assert_eq!(StockLevel::from_stock(stock).label(), "Low Stock", "stock {stock}");
    }
    for stock in [6, 13, 20] {
        assert_eq!(StockLevel::from_stock(stock).label(), "Medium", "stock {stock}");
    }
    for stock in [21, 500] {
        assert_eq!(StockLevel::from_stock(stock).label(), "In Stock", "stock {stock}");
    }
}

#[test]
fn test_product_filter_search_and_category() {
    let products = vec![
        product(1, "Kopi Susu", "Minuman", 18_000, 40),
        product(2, "Keripik Kopi", "Camilan", 9_000, 3),
        product(3, "Teh Tarik", "Minuman", 12_500, 10),
    ];

    let by_text = ProductFilter {
        query: Some("  KOPI ".to_owned()),
        category: None,
    };
    let ids: Vec<i32> = by_text.apply(&products).iter().map(|p| p.id.as_i32()).collect();
    assert_eq!(ids, [1, 2]);

    let by_both = ProductFilter {
        query: Some("kopi".to_owned()),
        category: Some("Minuman".to_owned()),
    };
    let ids: Vec<i32> = by_both.apply(&products).iter().map(|p| p.id.as_i32()).collect();
    assert_eq!(ids, [1]);

    let category_text = ProductFilter {
        query: Some("minum".to_owned()),
        category: Some("all".to_owned()),
    };
    assert_eq!(category_text.apply(&products).len(), 2);

    assert_eq!(categories(&products), ["Camilan", "Minuman"]);
}

#[test]
fn test_inventory_summary() {
    let products = vec![
        product(1, "Kopi Susu", "Minuman", 18_000, 2),
        product(2, "Teh Tarik", "Minuman", 10_000, 30),
    ];
    let summary = InventorySummary::from_products(&products);
    assert_eq!(summary.product_count, 2);
    assert_eq!(summary.total_units, 32);
    assert_eq!(summary.low_stock_count, 1);
    assert_eq!(summary.stock_value, Rupiah::from_whole(336_000));
}

#[test]
fn test_transaction_filter_composes_status_and_search() {
    let transactions = vec![
        transaction(101, Some("Bu Sari"), TransactionStatus::Completed, 18_000, 1),
        transaction(102, Some("Pak Budi"), TransactionStatus::Pending, 12_000, 2),
        transaction(103, None, TransactionStatus::Completed, 5_000, 3),
        transaction(210, Some("Sarinah"), TransactionStatus::Cancelled, 7_000, 1),
    ];

    let ids = |filter: &TransactionFilter| -> Vec<i32> {
        filter.apply(&transactions).iter().map(|t| t.id.as_i32()).collect()
    };

    let all = TransactionFilter::default();
    assert_eq!(ids(&all), [101, 102, 103, 210]);

    let sari = TransactionFilter {
        status: None,
        query: Some("SARI".to_owned()),
    };
    assert_eq!(ids(&sari), [101, 210]);

    let completed_sari = TransactionFilter {
        status: Some(TransactionStatus::Completed),
        query: Some("sari".to_owned()),
    };
    assert_eq!(ids(&completed_sari), [101]);

    let by_id = TransactionFilter {
        status: None,
        query: Some("10".to_owned()),
    };
    assert_eq!(ids(&by_id), [101, 102, 103, 210]);

    let pending = TransactionFilter {
        status: Some(TransactionStatus::Pending),
        query: None,
    };
    assert_eq!(ids(&pending), [102]);
}

#[test]
fn test_sales_summary_counts_completed_revenue_only() {
    let transactions = vec![
        transaction(1, None, TransactionStatus::Completed, 10_000, 2),
        transaction(2, None, TransactionStatus::Completed, 5_000, 1),
        transaction(3, None, TransactionStatus::Cancelled, 50_000, 1),
        transaction(4, None, TransactionStatus::Pending, 8_000, 1),
    ];

    let summary = SalesSummary::from_transactions(&transactions);
    assert_eq!(summary.revenue, Rupiah::from_whole(25_000));
    assert_eq!(summary.transaction_count, 4);
    assert_eq!(summary.completed_count, 2);
    assert_eq!(summary.pending_count, 1);
    assert_eq!(summary.cancelled_count, 1);
    assert_eq!(summary.units_sold, 3);

    let days = revenue_by_day(&transactions);
    assert_eq!(days.len(), 1);
    assert_eq!(days.first().map(|(_, r)| *r), Some(Rupiah::from_whole(25_000)));

    assert_eq!(top_products(&transactions, 5), [("Kopi Susu".to_owned(), 3)]);
}
