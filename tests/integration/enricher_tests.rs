//! SKU lookup tests: the crawl position survives every lookup outcome

use crate::fake_store::{
    category_url, product_url, test_site, Card, Category, FakeStorefront, ListingPage,
};
use std::time::Duration;
use vitrina::crawler::SkuEnricher;

fn enricher() -> SkuEnricher {
    SkuEnricher::new(&test_site().selectors, Duration::from_millis(50))
}

fn store_on_listing() -> (FakeStorefront, String) {
    let listing = category_url(4, "bebidas");
    let store = FakeStorefront::new().with_category(
        &listing,
        Category::new(vec![ListingPage::new(vec![Card::new(9, "agua", "₲ 3.500")])]),
    );
    store.go_to(&listing);
    (store, listing)
}

#[tokio::test]
async fn test_lookup_reads_barcode_from_detail_page() {
    let (store, listing) = store_on_listing();
    let product = product_url(9, "agua");
    let store = store.with_detail(&product, " Código de Barras: 7840064137020 ");

    let sku = enricher().lookup(&store, &product).await;

    assert_eq!(sku.as_deref(), Some("7840064137020"));
    assert_eq!(store.detail_visits(), vec![product]);
    assert_eq!(store.current_url(), listing);
    assert!(!store.isolated_open());
    assert_eq!(store.isolated_contexts(), (1, 1));
}

#[tokio::test]
async fn test_lookup_timeout_restores_primary_context() {
    let (store, listing) = store_on_listing();
    let product = product_url(9, "agua");

    let sku = enricher().lookup(&store, &product).await;

    assert_eq!(sku, None);
    assert_eq!(store.current_url(), listing);
    assert!(!store.isolated_open());
    assert_eq!(store.isolated_contexts(), (1, 1));
    // The listing itself was never navigated away from
    assert!(store.navigations().is_empty());
}

#[tokio::test]
async fn test_lookup_without_label_yields_none() {
    let (store, _) = store_on_listing();
    let product = product_url(9, "agua");
    let store = store.with_detail(&product, "Referencia: 42");

    assert_eq!(enricher().lookup(&store, &product).await, None);
    assert!(!store.isolated_open());
}

#[tokio::test]
async fn test_consecutive_lookups_each_get_a_fresh_context() {
    let (store, _) = store_on_listing();
    let first = product_url(1, "a");
    let second = product_url(2, "b");
    let store = store
        .with_detail(&first, "Código de Barras:111")
        .with_detail(&second, "Código de Barras:222");

    let enricher = enricher();
    assert_eq!(enricher.lookup(&store, &first).await.as_deref(), Some("111"));
    assert_eq!(enricher.lookup(&store, &second).await.as_deref(), Some("222"));
    assert_eq!(store.isolated_contexts(), (2, 2));
}
