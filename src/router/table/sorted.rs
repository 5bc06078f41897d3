use super::RouteTable;
use crate::router::{Route, RouteMatch, Strategy};
use crate::RouteError;
use std::cmp::Reverse;
use std::sync::Arc;

/// A single list of every route, kept sorted by specificity.
///
/// Static patterns come first, then patterns with fewer parameters, then
/// earlier registrations.  A lookup walks the list and returns the first
/// route whose pattern matches; there is no separate index, so every lookup
/// is linear in the number of routes.
pub struct SortedTable<H, M> {
    routes: Vec<Arc<Route<H, M>>>,
}

impl<H, M> SortedTable<H, M> {
    /// Creates an empty table.
    pub fn new() -> Self {
        SortedTable { routes: vec![] }
    }
}

impl<H, M> Default for SortedTable<H, M> {
    fn default() -> Self {
        SortedTable::new()
    }
}

impl<H, M> RouteTable<H, M> for SortedTable<H, M>
where
    H: Send + Sync + 'static,
    M: Send + Sync + 'static,
{
    fn insert(&mut self, route: Arc<Route<H, M>>) -> Result<(), RouteError> {
        self.routes.push(route);
        self.routes.sort_by_key(|r| {
            let matcher = r.pattern().matcher();
            (
                Reverse(matcher.is_static()),
                matcher.param_count(),
                r.insertion_index(),
            )
        });
        Ok(())
    }

    fn lookup(&self, method: &http::Method, path: &str) -> Option<RouteMatch<H, M>> {
        self.routes
            .iter()
            .filter(|route| route.matches(method))
            .find_map(|route| {
                let params = route.pattern().matcher().captures(path)?;
                Some(RouteMatch::new(route.clone(), params))
            })
    }

    fn candidates(&self, path: &str) -> Vec<&Arc<Route<H, M>>> {
        self.routes
            .iter()
            .filter(|route| route.pattern().matcher().regex().is_match(path))
            .collect()
    }

    fn strategy(&self) -> Strategy {
        Strategy::SortedScan
    }
}

impl<H, M> std::fmt::Debug for SortedTable<H, M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SortedTable")
            .field("routes", &self.routes)
            .finish()
    }
}
