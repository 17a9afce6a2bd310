use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use std::sync::Arc;

use medfac_auth::guard::{authenticated_admin_guard, for_permission};
use medfac_auth::{
    AccessRequirement, GuardContext, IdentitySnapshot, InMemoryIdentityProvider, Permission,
    ProviderConfig, Role, UserClaims, evaluate, evaluate_snapshot,
};
use medfac_core::NavigationIntent;

fn nurse_admin() -> UserClaims {
    UserClaims::new(
        [Role::NURSE_ADMIN],
        [
            Permission::READ_SUBMISSIONS,
            Permission::APPROVE_SUBMISSIONS,
            Permission::WRITE_FACILITIES,
            Permission::VIEW_ANALYTICS,
        ],
    )
}

fn bench_evaluate_snapshot(c: &mut Criterion) {
    let snapshot = IdentitySnapshot::signed_in(nurse_admin());
    let navigation = NavigationIntent::new("/admin", "/admin/facilities/resources");

    let mut group = c.benchmark_group("evaluate_snapshot");
    for required in [1usize, 4, 10] {
        let requirement = AccessRequirement::any_permission(
            (0..required).map(|i| Permission::new(format!("custom:perm{}", i))),
        );
        group.bench_with_input(BenchmarkId::new("any_permission_miss", required), &requirement, |b, r| {
            b.iter(|| evaluate_snapshot(black_box(&snapshot), black_box(r), &navigation))
        });
    }
    group.bench_function("admin_area_hit", |b| {
        b.iter(|| evaluate_snapshot(black_box(&snapshot), &AccessRequirement::AdminArea, &navigation))
    });
    group.finish();
}

fn bench_live_guard(c: &mut Criterion) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("runtime");
    let config = ProviderConfig::default();
    let (_publisher, provider) =
        InMemoryIdentityProvider::channel(&config, IdentitySnapshot::signed_in(nurse_admin()));
    let context = GuardContext::new(Arc::new(provider), &config);
    let navigation = NavigationIntent::new("/admin", "/admin/analytics/overview");
    let guard = authenticated_admin_guard().then(for_permission([Permission::VIEW_ANALYTICS]));

    c.bench_function("guard_check_admin_chain", |b| {
        b.iter(|| runtime.block_on(guard.check(black_box(&context), &navigation)))
    });
    c.bench_function("evaluate_single_requirement", |b| {
        b.iter(|| runtime.block_on(evaluate(&context, &AccessRequirement::AdminArea, &navigation)))
    });
}

criterion_group!(benches, bench_evaluate_snapshot, bench_live_guard);
criterion_main!(benches);
