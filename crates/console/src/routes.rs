//! Declarative route table of the console.
//!
//! Each node maps a path segment to an optional lazily-resolved view, a static
//! [`AccessRequirement`], and the [`Guard`] enforcing it. Guards are resolved
//! once, when the table is built.

use serde::Serialize;

use medfac_auth::guard::{authenticated_admin_guard, for_permission, for_role};
use medfac_auth::{AccessRequirement, Guard, Permission, Role};
use medfac_core::paths;

const APP_NAME: &str = "Medical Facilities";
const ADMIN_APP_NAME: &str = "Medical Facilities Admin";

/// Identifier of a view component, resolved by the UI layer when first shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ViewId(&'static str);

impl ViewId {
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl core::fmt::Display for ViewId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteNode {
    /// Path relative to the parent (`""` for an index route). A trailing `*`
    /// segment matches any remainder.
    pub segment: &'static str,
    pub name: Option<&'static str>,
    pub title: Option<&'static str>,
    pub view: Option<ViewId>,
    pub access: AccessRequirement,
    pub guard: Option<Guard>,

    /// Static redirect; relative targets resolve against the parent path.
    pub redirect: Option<&'static str>,
    pub children: Vec<RouteNode>,
}

impl RouteNode {
    pub fn new(segment: &'static str) -> Self {
        Self {
            segment,
            name: None,
            title: None,
            view: None,
            access: AccessRequirement::None,
            guard: None,
            redirect: None,
            children: Vec::new(),
        }
    }

    /// Route rendering `view` under `name`.
    pub fn page(segment: &'static str, name: &'static str, view: &'static str) -> Self {
        Self {
            name: Some(name),
            view: Some(ViewId::new(view)),
            ..Self::new(segment)
        }
    }

    pub fn redirect(segment: &'static str, to: &'static str) -> Self {
        Self {
            redirect: Some(to),
            ..Self::new(segment)
        }
    }

    pub fn title(mut self, title: &'static str) -> Self {
        self.title = Some(title);
        self
    }

    /// Require `access`, enforced by a guard built from it.
    pub fn requires(mut self, access: AccessRequirement) -> Self {
        self.guard = (!access.is_public()).then(|| Guard::require(access.clone()));
        self.access = access;
        self
    }

    /// Enforce a composed guard; the node's requirement is the guard's last one.
    pub fn guarded_by(mut self, guard: Guard) -> Self {
        self.access = guard
            .requirements()
            .last()
            .map(|r| (*r).clone())
            .unwrap_or(AccessRequirement::None);
        self.guard = Some(guard);
        self
    }

    pub fn children(mut self, children: Vec<RouteNode>) -> Self {
        self.children = children;
        self
    }

    fn pattern(&self) -> impl Iterator<Item = &'static str> {
        self.segment.split('/').filter(|s| !s.is_empty())
    }

    fn is_terminal(&self) -> bool {
        self.view.is_some() || self.redirect.is_some()
    }
}

/// Result of resolving a path against the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution<'a> {
    Matched(RouteMatch<'a>),

    /// Static redirect to another in-app path.
    Redirect(String),

    NotFound,
}

/// A matched route: the nodes from the top-level route down to the leaf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch<'a> {
    path: String,
    chain: Vec<&'a RouteNode>,
}

impl<'a> RouteMatch<'a> {
    /// Matched path, normalized (no trailing slash, no query).
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Nodes from the top-level route down to the leaf; never empty.
    pub fn chain(&self) -> &[&'a RouteNode] {
        &self.chain
    }

    pub fn leaf(&self) -> &'a RouteNode {
        self.chain[self.chain.len() - 1]
    }

    pub fn name(&self) -> Option<&'static str> {
        self.leaf().name
    }

    pub fn view(&self) -> Option<ViewId> {
        self.leaf().view
    }

    /// Title of the deepest node that has one.
    pub fn title(&self) -> Option<&'static str> {
        self.chain.iter().rev().find_map(|node| node.title)
    }

    /// Guards to run, outermost first.
    pub fn guards(&self) -> impl Iterator<Item = &'a Guard> + '_ {
        self.chain.iter().copied().filter_map(|node| node.guard.as_ref())
    }

    pub fn is_admin(&self) -> bool {
        self.path == paths::ADMIN_ROOT || self.path.starts_with("/admin/")
    }

    /// Browser tab title for the route.
    pub fn document_title(&self) -> String {
        let app = if self.is_admin() { ADMIN_APP_NAME } else { APP_NAME };
        match self.title() {
            Some(title) if title.contains("Admin") => title.to_string(),
            Some(title) => format!("{} - {}", title, app),
            None => app.to_string(),
        }
    }
}

/// Route tree, matched top to bottom in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RouteTable {
    routes: Vec<RouteNode>,
}

impl RouteTable {
    pub fn new(routes: Vec<RouteNode>) -> Self {
        Self { routes }
    }

    pub fn routes(&self) -> &[RouteNode] {
        &self.routes
    }

    /// Resolve a path (without query string).
    pub fn resolve(&self, path: &str) -> Resolution<'_> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        for route in &self.routes {
            let Some((chain, parent_path)) = walk(route, &segments, "") else {
                continue;
            };
            let leaf = chain[chain.len() - 1];
            if let Some(to) = leaf.redirect {
                return Resolution::Redirect(join_redirect(&parent_path, to));
            }
            return Resolution::Matched(RouteMatch {
                path: normalize(&segments),
                chain,
            });
        }

        Resolution::NotFound
    }

    /// Route table of the admin console.
    pub fn admin() -> Self {
        Self::new(vec![
            RouteNode::page(paths::HOME, "Home", "PublicApp").title("Medical Facilities Finder"),
            RouteNode::page(paths::LOGIN, "AdminLogin", "AdminLogin").title("Admin Login"),
            RouteNode::page(paths::CALLBACK, "AdminCallback", "AdminCallback").title("Processing Login..."),
            RouteNode::page(paths::UNAUTHORIZED, "AdminUnauthorized", "AdminUnauthorized").title("Unauthorized"),
            RouteNode::page(paths::FORBIDDEN, "AdminForbidden", "AdminForbidden").title("Access Forbidden"),
            RouteNode {
                view: Some(ViewId::new("AdminLayout")),
                ..RouteNode::new(paths::ADMIN_ROOT)
            }
            .guarded_by(authenticated_admin_guard())
            .children(vec![
                RouteNode::page("", "AdminDashboard", "AdminDashboard").title("Dashboard"),
                RouteNode::new("submissions").title("Submissions").children(vec![
                    RouteNode::page("pending", "PendingSubmissions", "PendingSubmissions")
                        .title("Pending Submissions")
                        .requires(AccessRequirement::any_permission([
                            Permission::READ_SUBMISSIONS,
                            Permission::APPROVE_SUBMISSIONS,
                        ])),
                    RouteNode::page("all", "AllSubmissions", "AllSubmissions")
                        .title("All Submissions")
                        .requires(AccessRequirement::any_permission([Permission::READ_SUBMISSIONS])),
                    RouteNode::redirect("", "pending"),
                ]),
                RouteNode::new("facilities")
                    .title("Facility Management")
                    .guarded_by(for_permission([Permission::WRITE_FACILITIES, Permission::EDIT_FACILITIES]))
                    .children(vec![
                        RouteNode::page("aba-centers", "ABACentersManager", "ABACentersManager").title("ABA Centers"),
                        RouteNode::page("aba-centers/new", "NewABACenter", "NewABACenter").title("Add ABA Center"),
                        RouteNode::page("regional-centers", "RegionalCentersManager", "RegionalCentersManager")
                            .title("Regional Centers"),
                        RouteNode::page("resources", "ResourcesManager", "ResourcesManager").title("Resources"),
                        RouteNode::page("providers", "ProvidersManager", "ProvidersManager").title("Providers"),
                        RouteNode::redirect("", "aba-centers"),
                    ]),
                RouteNode::new("analytics")
                    .title("Analytics")
                    .guarded_by(for_permission([Permission::VIEW_ANALYTICS]))
                    .children(vec![
                        RouteNode::page("overview", "AnalyticsOverview", "AnalyticsOverview")
                            .title("Analytics Overview"),
                        RouteNode::page("reports", "ReportsManager", "ReportsManager").title("Reports"),
                        RouteNode::redirect("", "overview"),
                    ]),
                RouteNode::page("users", "UserManagement", "UserManagement")
                    .title("User Management")
                    .guarded_by(for_role([Role::SUPER_ADMIN])),
                RouteNode::page("settings", "SystemSettings", "SystemSettings")
                    .title("System Settings")
                    .guarded_by(for_role([Role::SUPER_ADMIN])),
                RouteNode::page("profile", "AdminProfile", "AdminProfile").title("Profile"),
            ]),
            RouteNode::redirect("/admin/*", paths::ADMIN_ROOT),
            RouteNode::redirect("/*", paths::HOME),
        ])
    }
}

/// Match `node` against `remaining`; returns the node chain and the path of
/// the leaf's parent.
fn walk<'a>(node: &'a RouteNode, remaining: &[&str], parent_path: &str) -> Option<(Vec<&'a RouteNode>, String)> {
    let mut rest = remaining;
    let mut path = parent_path.to_string();

    for part in node.pattern() {
        if part == "*" {
            // Catch-all consumes everything left.
            return Some((vec![node], parent_path.to_string()));
        }
        let (head, tail) = rest.split_first()?;
        if *head != part {
            return None;
        }
        path.push('/');
        path.push_str(head);
        rest = tail;
    }

    for child in &node.children {
        if let Some((mut chain, leaf_parent)) = walk(child, rest, &path) {
            chain.insert(0, node);
            return Some((chain, leaf_parent));
        }
    }

    if rest.is_empty() && node.is_terminal() {
        return Some((vec![node], parent_path.to_string()));
    }
    None
}

fn join_redirect(parent_path: &str, to: &str) -> String {
    if to.starts_with('/') {
        to.to_string()
    } else {
        format!("{}/{}", parent_path, to)
    }
}

fn normalize(segments: &[&str]) -> String {
    format!("/{}", segments.join("/"))
}
