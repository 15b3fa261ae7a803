use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use chrono::{DateTime, Duration, TimeZone, Utc};
use orderdesk_core::{AggregateId, Money, SessionContext, TenantId, UserId, VatRate};
use orderdesk_infra::ledger::{InMemoryStockLedger, StockLedger};
use orderdesk_infra::projections::HistoryWindow;
use orderdesk_infra::projections::stock_levels::{current_stock, history};
use orderdesk_inventory::{NewStockMovement, StockMovement};
use orderdesk_invoicing::{Invoice, InvoiceId, InvoiceItem, IssueInvoice};
use orderdesk_parties::ClientId;
use orderdesk_products::{Product, ProductId, RegisterProduct};

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 1, 8, 0, 0).unwrap()
}

fn product() -> Product {
    Product::register(RegisterProduct {
        product_id: ProductId::new(AggregateId::new()),
        name: "Cement 35kg".to_string(),
        sku: "CEM-35".to_string(),
        category: "Building".to_string(),
        purchase_price: Money::from_major(50),
        sale_price: Money::from_major(65),
        unit: "bag".to_string(),
        initial_stock: 1_000_000,
        min_stock: 100,
        occurred_at: start(),
    })
    .unwrap()
}

/// `count` invoices, one per hour, each selling the product and one other line.
fn invoices(product: &Product, count: usize) -> Vec<Invoice> {
    (0..count)
        .map(|i| {
            Invoice::issue(IssueInvoice {
                invoice_id: InvoiceId::new(AggregateId::new()),
                number: format!("FA-2026-{:05}", i + 1),
                client_id: ClientId::new(AggregateId::new()),
                date: start() + Duration::hours(i as i64),
                items: vec![
                    InvoiceItem::new(1, product.name.clone(), 3, product.sale_price, VatRate::ZERO),
                    InvoiceItem::new(2, "Sand", 1, Money::from_major(5), VatRate::ZERO),
                ],
                occurred_at: start(),
            })
            .unwrap()
        })
        .collect()
}

/// `count` adjustments of +1, appended through the ledger so positions are real.
fn adjustments(product: &Product, count: usize) -> Vec<StockMovement> {
    let ctx = SessionContext::new(TenantId::new(), UserId::new(), "bench");
    let ledger = InMemoryStockLedger::new();
    let base = product.initial_stock;
    let batch: Vec<NewStockMovement> = (0..count)
        .map(|i| {
            let previous = base + i as i64;
            NewStockMovement::adjustment(
                &ctx,
                product.id,
                &product.name,
                previous,
                previous + 1,
                "Recount",
                start() + Duration::minutes(i as i64 * 37),
            )
        })
        .collect();
    ledger.append(ctx.tenant_id(), batch).unwrap()
}

fn bench_current_stock(c: &mut Criterion) {
    let mut group = c.benchmark_group("current_stock");
    let product = product();

    for invoice_count in [100usize, 1_000, 10_000] {
        let invs = invoices(&product, invoice_count);
        let moves = adjustments(&product, invoice_count / 10);
        group.throughput(Throughput::Elements(invoice_count as u64));
        group.bench_with_input(
            BenchmarkId::new("invoices", invoice_count),
            &(invs, moves),
            |b, (invs, moves)| {
                b.iter(|| current_stock(black_box(&product), black_box(moves), black_box(invs)))
            },
        );
    }

    group.finish();
}

fn bench_history(c: &mut Criterion) {
    let mut group = c.benchmark_group("stock_history");
    let product = product();
    let now = start() + Duration::days(400);

    for invoice_count in [100usize, 1_000, 10_000] {
        let invs = invoices(&product, invoice_count);
        let moves = adjustments(&product, invoice_count / 10);

        group.bench_with_input(
            BenchmarkId::new("all", invoice_count),
            &(invs.clone(), moves.clone()),
            |b, (invs, moves)| {
                b.iter(|| history(&product, moves, invs, HistoryWindow::All, black_box(now)))
            },
        );
        group.bench_with_input(
            BenchmarkId::new("month", invoice_count),
            &(invs, moves),
            |b, (invs, moves)| {
                b.iter(|| history(&product, moves, invs, HistoryWindow::Month, black_box(now)))
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_current_stock, bench_history);
criterion_main!(benches);
