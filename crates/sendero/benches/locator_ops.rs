//! Locator Operations Benchmarks
//!
//! Benchmarks for locator rendering, registry lookups and URL pattern matching.
//!
//! Run with: `cargo bench --bench locator_ops`

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use sendero::prelude::*;

fn locators() -> Vec<(&'static str, Locator)> {
    vec![
        (
            "attribute",
            Locator::attribute("username", "input", "name", "username"),
        ),
        (
            "attribute_contains",
            Locator::attribute_contains("pim_menu", "a", "href", "viewPimModule"),
        ),
        ("role", Locator::role("add_button", "button", "Add")),
        (
            "class",
            Locator::class("profile_menu", Some("span"), "oxd-userdropdown-tab"),
        ),
        (
            "scoped",
            Locator::role("save_button", "button", "Save")
                .within(Locator::class("form", Some("form"), "oxd-form")),
        ),
    ]
}

fn bench_query_rendering(c: &mut Criterion) {
    let mut group = c.benchmark_group("query_rendering");

    for (name, locator) in locators() {
        group.bench_with_input(BenchmarkId::from_parameter(name), &locator, |bench, loc| {
            bench.iter(|| black_box(loc.query_js()));
        });
    }

    group.finish();
}

fn bench_display(c: &mut Criterion) {
    let mut group = c.benchmark_group("locator_display");

    for (name, locator) in locators() {
        group.bench_with_input(BenchmarkId::from_parameter(name), &locator, |bench, loc| {
            bench.iter(|| black_box(loc.to_string()));
        });
    }

    group.finish();
}

fn bench_registry(c: &mut Criterion) {
    let targets = sendero::scenarios::targets();

    c.bench_function("registry_resolve_hit", |bench| {
        bench.iter(|| black_box(targets.resolve(black_box("save_button")).unwrap()));
    });
    c.bench_function("registry_resolve_miss", |bench| {
        bench.iter(|| black_box(targets.resolve(black_box("nope")).is_err()));
    });
}

fn bench_url_patterns(c: &mut Criterion) {
    let mut group = c.benchmark_group("url_pattern_match");
    let url = "https://opensource-demo.orangehrmlive.com/web/index.php/pim/viewPersonalDetails/empNumber/7";

    let patterns = vec![
        ("exact", UrlPattern::Exact(url.to_string())),
        ("prefix", UrlPattern::Prefix("https://opensource-demo".to_string())),
        ("contains", UrlPattern::contains("viewPersonalDetails")),
        ("glob", UrlPattern::glob("**/pim/viewPersonalDetails/**")),
        ("regex", UrlPattern::Regex(r"/empNumber/\d+$".to_string())),
    ];

    for (name, pattern) in patterns {
        group.bench_with_input(BenchmarkId::from_parameter(name), &pattern, |bench, p| {
            bench.iter(|| black_box(p.matches(black_box(url))));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_query_rendering,
    bench_display,
    bench_registry,
    bench_url_patterns
);
criterion_main!(benches);
