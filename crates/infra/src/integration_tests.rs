//! Integration tests for the full write → project → query pipeline.
//!
//! Covers the end-to-end flows: the stock-movement scenario with low-stock
//! detection, bootstrap and repair reconciliation, and lost-update
//! prevention under real threads.

use std::sync::Arc;
use std::thread;

use stockline_core::CategoryId;
use stockline_inventory::{NewProduct, Sku, StockChange, UnitPrice};

use crate::read_store::{DocumentFilter, InMemoryReadStore, ReadStore, SortKey};
use crate::service::InventoryService;
use crate::write_store::{InMemoryWriteStore, WriteStore};

type Service = InventoryService<Arc<InMemoryWriteStore>, Arc<InMemoryReadStore>>;

fn service() -> (Service, Arc<InMemoryWriteStore>, Arc<InMemoryReadStore>) {
    stockline_observability::init();
    let write_store = Arc::new(InMemoryWriteStore::new());
    let read_store = Arc::new(InMemoryReadStore::new());
    (
        InventoryService::new(write_store.clone(), read_store.clone()),
        write_store,
        read_store,
    )
}

fn new_product(sku: &str, category_id: CategoryId, stock: i64, min: i64) -> NewProduct {
    NewProduct {
        sku: Sku::new(sku).unwrap(),
        name: format!("Producto {sku}"),
        description: String::new(),
        category_id,
        unit_price: UnitPrice::from_minor_units(1250),
        initial_stock: stock,
        min_stock_level: min,
        supplier: "Proveedora Andina".to_string(),
    }
}

#[test]
fn stock_movements_drive_low_stock_detection() {
    let (service, _, _) = service();
    let category = service.create_category("Guantes", "").unwrap();
    let product = service
        .create_product(new_product("GS-001", category.id_typed(), 100, 10))
        .unwrap();

    let entry = service
        .apply_stock_change(product.id_typed(), StockChange::Out { quantity: 30 }, "")
        .unwrap();
    assert_eq!(entry.previous_stock, 100);
    assert_eq!(entry.new_stock, 70);
    assert_eq!(service.count(DocumentFilter::LowStock).unwrap(), 0);

    let entry = service
        .apply_stock_change(product.id_typed(), StockChange::Out { quantity: 65 }, "")
        .unwrap();
    assert_eq!(entry.new_stock, 5);
    assert_eq!(service.count(DocumentFilter::LowStock).unwrap(), 1);
}

#[test]
fn bootstrap_reconciliation_fills_an_empty_read_store() {
    let (service, write_store, read_store) = service();
    let category = service.create_category("Cascos", "").unwrap();

    // Seed the write store directly, bypassing the synchronous projection,
    // as a bulk import would.
    for i in 0..3 {
        write_store
            .create_product(new_product(&format!("CA-{i:03}"), category.id_typed(), 20, 5))
            .unwrap();
    }
    assert_eq!(read_store.count(DocumentFilter::All).unwrap(), 0);

    let report = service.reconcile().unwrap();
    assert_eq!(report.total, 3);
    assert_eq!(report.synced, 3);
    assert_eq!(report.failed, 0);

    let documents = service.find_all(10, SortKey::Name).unwrap();
    assert_eq!(documents.len(), 3);
}

#[test]
fn reconciliation_repairs_drift_after_an_outage() {
    let (service, write_store, read_store) = service();
    let category = service.create_category("Guantes", "").unwrap();
    let product = service
        .create_product(new_product("GS-001", category.id_typed(), 100, 10))
        .unwrap();

    read_store.set_available(false);
    service
        .apply_stock_change(product.id_typed(), StockChange::Out { quantity: 25 }, "")
        .unwrap();

    // The authoritative store reflects the change despite the outage.
    assert_eq!(
        write_store
            .product(product.id_typed())
            .unwrap()
            .unwrap()
            .stock_quantity(),
        75
    );

    read_store.set_available(true);
    assert_eq!(
        read_store.get(product.sku()).unwrap().unwrap().stock_quantity,
        100
    );

    let report = service.reconcile().unwrap();
    assert_eq!(report.failed, 0);
    assert_eq!(
        read_store.get(product.sku()).unwrap().unwrap().stock_quantity,
        75
    );
}

#[test]
fn reconciliation_matches_write_store_values_field_by_field() {
    let (service, write_store, read_store) = service();
    let category = service.create_category("Extintores", "").unwrap();
    for i in 0..5i64 {
        let product = write_store
            .create_product(new_product(&format!("EX-{i:03}"), category.id_typed(), 30, 10))
            .unwrap();
        write_store
            .apply_stock_change(product.id_typed(), StockChange::Out { quantity: i + 1 }, "")
            .unwrap();
    }

    service.reconcile().unwrap();

    let mut cursor = None;
    loop {
        let page = write_store.product_page(cursor.as_ref(), 2).unwrap();
        for product in &page.products {
            let doc = read_store.get(product.sku()).unwrap().unwrap();
            assert_eq!(doc.stock_quantity, product.stock_quantity());
            assert_eq!(doc.unit_price, product.unit_price().as_major_units());
            assert_eq!(doc.name, product.name());
        }
        match page.next_cursor {
            Some(next) => cursor = Some(next),
            None => break,
        }
    }
}

#[test]
fn concurrent_inbound_changes_are_never_lost() {
    let (service, write_store, _) = service();
    let category = service.create_category("Conos", "").unwrap();
    let product = service
        .create_product(new_product("CO-001", category.id_typed(), 100, 10))
        .unwrap();
    let product_id = product.id_typed();

    let threads: Vec<_> = [17i64, 29]
        .into_iter()
        .map(|quantity| {
            let store = write_store.clone();
            thread::spawn(move || {
                store
                    .apply_stock_change(product_id, StockChange::In { quantity }, "")
                    .unwrap();
            })
        })
        .collect();
    for handle in threads {
        handle.join().unwrap();
    }

    let stock = write_store.product(product_id).unwrap().unwrap().stock_quantity();
    assert_eq!(stock, 100 + 17 + 29);
}

#[test]
fn many_concurrent_unit_changes_sum_exactly() {
    let (service, write_store, _) = service();
    let category = service.create_category("Cintas", "").unwrap();
    let product = service
        .create_product(new_product("CI-001", category.id_typed(), 0, 0))
        .unwrap();
    let product_id = product.id_typed();

    let threads: Vec<_> = (0..8)
        .map(|_| {
            let store = write_store.clone();
            thread::spawn(move || {
                for _ in 0..50 {
                    store
                        .apply_stock_change(product_id, StockChange::In { quantity: 1 }, "")
                        .unwrap();
                }
            })
        })
        .collect();
    for handle in threads {
        handle.join().unwrap();
    }

    let stock = write_store.product(product_id).unwrap().unwrap().stock_quantity();
    assert_eq!(stock, 400);
    assert_eq!(write_store.ledger_for(product_id).unwrap().len(), 400);
}

#[test]
fn ledger_invariant_holds_across_interleaved_entries() {
    let (service, write_store, _) = service();
    let category = service.create_category("Chalecos", "").unwrap();
    let product = service
        .create_product(new_product("CH-001", category.id_typed(), 50, 5))
        .unwrap();
    let product_id = product.id_typed();

    let threads: Vec<_> = (0..4)
        .map(|i| {
            let store = write_store.clone();
            thread::spawn(move || {
                for _ in 0..20 {
                    let change = if i % 2 == 0 {
                        StockChange::In { quantity: 3 }
                    } else {
                        StockChange::Out { quantity: 2 }
                    };
                    store.apply_stock_change(product_id, change, "").unwrap();
                }
            })
        })
        .collect();
    for handle in threads {
        handle.join().unwrap();
    }

    // Every entry individually satisfies its formula; serialization means
    // no two entries share a previous_stock snapshot out of order.
    for entry in write_store.ledger_for(product_id).unwrap() {
        let expected = match entry.transaction_type {
            stockline_inventory::TransactionType::In => entry.previous_stock + entry.quantity,
            stockline_inventory::TransactionType::Out => {
                (entry.previous_stock - entry.quantity).max(0)
            }
            stockline_inventory::TransactionType::Adj => entry.previous_stock + entry.quantity,
        };
        assert_eq!(entry.new_stock, expected);
    }
}

#[test]
fn adjustment_asymmetry_is_visible_end_to_end() {
    let (service, _, read_store) = service();
    let category = service.create_category("Botiquines", "").unwrap();
    let product = service
        .create_product(new_product("BQ-001", category.id_typed(), 10, 5))
        .unwrap();

    // OUT clamps at zero.
    let entry = service
        .apply_stock_change(product.id_typed(), StockChange::Out { quantity: 25 }, "")
        .unwrap();
    assert_eq!(entry.new_stock, 0);

    // ADJ applies its signed delta unclamped.
    let entry = service
        .apply_stock_change(product.id_typed(), StockChange::Adj { delta: -4 }, "conteo")
        .unwrap();
    assert_eq!(entry.new_stock, -4);

    let doc = read_store.get(product.sku()).unwrap().unwrap();
    assert_eq!(doc.stock_quantity, -4);
    assert!(doc.is_low_stock());
}
