use std::time::Duration;

use medfac_auth::{BuildMode, IdentitySnapshot, Permission, ProviderConfig, Role, UserClaims};
use medfac_console::{Console, NavigationOutcome, build_console};

fn start(identity: IdentitySnapshot) -> Console {
    build_console(&ProviderConfig::default(), BuildMode::Production, identity)
}

fn signed_in(roles: Vec<Role>, permissions: Vec<Permission>) -> IdentitySnapshot {
    IdentitySnapshot::signed_in(UserClaims::new(roles, permissions))
}

fn arrived(outcome: NavigationOutcome) -> (String, String) {
    match outcome {
        NavigationOutcome::Arrived { path, title, .. } => (path, title),
        other => panic!("expected arrival, got {:?}", other),
    }
}

#[tokio::test]
async fn signed_out_admin_entry_lands_on_login_page() {
    let console = start(IdentitySnapshot::signed_out());

    let (path, title) = arrived(console.navigator.navigate("/admin").await);
    assert_eq!(path, "/admin/login");
    assert_eq!(title, "Admin Login");
}

#[tokio::test]
async fn signed_in_user_without_admin_role_is_unauthorized() {
    let console = start(signed_in(vec![Role::new("volunteer")], vec![Permission::READ_ALL]));

    let (path, _) = arrived(console.navigator.navigate("/admin/profile").await);
    assert_eq!(path, "/admin/unauthorized");
}

#[tokio::test]
async fn reviewer_is_forbidden_from_user_management() {
    let console = start(signed_in(vec![Role::REVIEWER], Vec::new()));

    let (path, title) = arrived(console.navigator.navigate("/admin/users").await);
    assert_eq!(path, "/admin/forbidden");
    assert_eq!(title, "Access Forbidden - Medical Facilities Admin");
}

#[tokio::test]
async fn any_listed_permission_opens_pending_submissions() {
    let console = start(signed_in(vec![Role::NURSE_ADMIN], vec![Permission::READ_SUBMISSIONS]));

    let (path, title) = arrived(console.navigator.navigate("/admin/submissions").await);
    assert_eq!(path, "/admin/submissions/pending");
    assert_eq!(title, "Pending Submissions - Medical Facilities Admin");
}

#[tokio::test]
async fn parent_guard_denies_before_child_routes_are_considered() {
    let console = start(signed_in(vec![Role::NURSE_ADMIN], vec![Permission::READ_SUBMISSIONS]));

    let (path, _) = arrived(console.navigator.navigate("/admin/facilities/aba-centers/new").await);
    assert_eq!(path, "/admin/forbidden");

    let console = start(signed_in(vec![Role::NURSE_ADMIN], vec![Permission::EDIT_FACILITIES]));
    let (path, title) = arrived(console.navigator.navigate("/admin/facilities/aba-centers/new").await);
    assert_eq!(path, "/admin/facilities/aba-centers/new");
    assert_eq!(title, "Add ABA Center - Medical Facilities Admin");
}

#[tokio::test]
async fn super_admin_reaches_every_admin_screen() {
    let console = start(signed_in(
        vec![Role::SUPER_ADMIN],
        vec![
            Permission::READ_SUBMISSIONS,
            Permission::WRITE_FACILITIES,
            Permission::VIEW_ANALYTICS,
        ],
    ));

    for target in [
        "/admin",
        "/admin/submissions/all",
        "/admin/facilities/providers",
        "/admin/analytics/reports",
        "/admin/users",
        "/admin/settings",
        "/admin/profile",
    ] {
        let (path, _) = arrived(console.navigator.navigate(target).await);
        assert_eq!(path, target);
    }
}

#[tokio::test]
async fn unknown_paths_fall_back_to_their_area_root() {
    let console = start(signed_in(vec![Role::REVIEWER], Vec::new()));

    let (path, title) = arrived(console.navigator.navigate("/admin/does-not-exist").await);
    assert_eq!(path, "/admin");
    assert_eq!(title, "Dashboard - Medical Facilities Admin");

    let (path, _) = arrived(console.navigator.navigate("/somewhere/else?x=1").await);
    assert_eq!(path, "/");
}

#[tokio::test]
async fn navigation_waits_for_the_provider_to_finish_loading() {
    let console = start(IdentitySnapshot::loading());

    let pending = tokio::spawn({
        let navigator = console.navigator.clone();
        async move { navigator.navigate("/admin/analytics").await }
    });

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(!pending.is_finished());

    console
        .identity
        .sign_in(UserClaims::new([Role::NURSE_ADMIN], [Permission::VIEW_ANALYTICS]));

    let (path, _) = arrived(pending.await.unwrap());
    assert_eq!(path, "/admin/analytics/overview");
}

#[tokio::test]
async fn provider_closing_while_loading_counts_as_signed_out() {
    let Console { navigator, identity } = start(IdentitySnapshot::loading());

    let pending = tokio::spawn({
        let navigator = navigator.clone();
        async move { navigator.navigate("/admin/settings").await }
    });

    tokio::time::sleep(Duration::from_millis(20)).await;
    drop(identity);

    let (path, _) = arrived(pending.await.unwrap());
    assert_eq!(path, "/admin/login");
}

#[tokio::test]
async fn outcomes_are_reported_as_json() {
    let console = start(IdentitySnapshot::signed_out());
    let outcome = console.navigator.navigate("/admin/login").await;

    let json = serde_json::to_value(&outcome).unwrap();
    assert_eq!(json["outcome"], "arrived");
    assert_eq!(json["path"], "/admin/login");
    assert_eq!(json["view"], "AdminLogin");
}
