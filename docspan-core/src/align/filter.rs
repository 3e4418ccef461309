//! Statement filter applied before location

use crate::align::diff::DiffStatus;
use crate::align::fragment::Fragment;
use std::collections::BTreeSet;

/// Restricts which statements are located and navigated. Empty sets do not constrain.
///
/// Directive and role comparisons ignore ASCII case. Header fragments pass unless
/// [`without_headers`](Self::without_headers) was set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementFilter {
    directives: BTreeSet<String>,
    roles: BTreeSet<String>,
    statuses: BTreeSet<DiffStatus>,
    include_headers: bool,
}

impl Default for StatementFilter {
    fn default() -> Self {
        Self {
            directives: BTreeSet::new(),
            roles: BTreeSet::new(),
            statuses: BTreeSet::new(),
            include_headers: true,
        }
    }
}

impl StatementFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn without_headers(mut self) -> Self {
        self.include_headers = false;
        self
    }

    pub fn with_directive(mut self, directive: &str) -> Self {
        self.directives.insert(directive.to_ascii_lowercase());
        self
    }

    pub fn with_role(mut self, role: &str) -> Self {
        self.roles.insert(role.to_ascii_lowercase());
        self
    }

    pub fn with_status(mut self, status: DiffStatus) -> Self {
        self.statuses.insert(status);
        self
    }

    pub fn is_unrestricted(&self) -> bool {
        self.include_headers
            && self.directives.is_empty()
            && self.roles.is_empty()
            && self.statuses.is_empty()
    }

    pub fn matches(&self, fragment: &Fragment) -> bool {
        if fragment.is_header {
            return self.include_headers;
        }
        allows(&self.directives, fragment.directive.as_deref())
            && allows(&self.roles, fragment.role.as_deref())
            && (self.statuses.is_empty()
                || fragment
                    .diff
                    .is_some_and(|tag| self.statuses.contains(&tag.status)))
    }

    /// Matching fragments, in input order.
    pub fn apply(&self, fragments: &[Fragment]) -> Vec<Fragment> {
        fragments
            .iter()
            .filter(|fragment| self.matches(fragment))
            .cloned()
            .collect()
    }
}

fn allows(allowed: &BTreeSet<String>, value: Option<&str>) -> bool {
    allowed.is_empty() || value.is_some_and(|v| allowed.contains(&v.to_ascii_lowercase()))
}
