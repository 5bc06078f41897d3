mod exact;
mod radix;
mod sorted;

pub use self::exact::ExactTable;
pub use self::radix::{RadixTable, TreeStats};
pub use self::sorted::SortedTable;
use super::{Route, RouteMatch, Strategy};
use crate::RouteError;
use std::sync::Arc;

/// The storage and matching structure behind a [`crate::Router`].
///
/// Every strategy satisfies the same contract: given a method and a path,
/// return the route that should handle it (with its extracted parameters),
/// or nothing.  Where they differ is in how they get there, and in how they
/// break ties between overlapping patterns:
///
/// - [`ExactTable`]: static patterns by hash, dynamic patterns by a scan
///   ordered by `(parameter count, registration order)`.
/// - [`SortedTable`]: one scan over every pattern, ordered by
///   `(static first, parameter count, registration order)`.
/// - [`RadixTable`]: a tree over path segments, preferring a static segment
///   over a parameter over a wildcard at every depth.
///
/// Tables are filled during registration, and then only read.  `lookup` takes
/// `&self`, and keeps all of its working state local to the call, so a
/// filled table may be shared between threads.
pub trait RouteTable<H, M>: Send + Sync + 'static {
    /// Adds the route.  This should fail, without changing the table, if the
    /// table cannot represent the route's pattern.
    ///
    /// # Errors
    /// Only the radix tree can currently fail here; see
    /// [`RouteError::PartialSegment`].
    fn insert(&mut self, route: Arc<Route<H, M>>) -> Result<(), RouteError>;

    /// Finds the route for the given method and path.
    fn lookup(&self, method: &http::Method, path: &str) -> Option<RouteMatch<H, M>>;

    /// Every route that would match the path under some method.  A method
    /// is allowed for a path exactly when `lookup` with that method finds a
    /// route, so this follows the table's own matching rules.
    fn candidates(&self, path: &str) -> Vec<&Arc<Route<H, M>>>;

    /// The strategy this table implements.
    fn strategy(&self) -> Strategy;

    /// Shape statistics, for tables that are trees.
    fn tree_stats(&self) -> Option<TreeStats> {
        None
    }
}

// The distinct methods of the given routes, in registration order.  `None`
// stands for a route registered for any method.
pub(super) fn methods_of<H, M>(mut routes: Vec<&Arc<Route<H, M>>>) -> Vec<Option<http::Method>> {
    routes.sort_by_key(|route| route.insertion_index());
    let mut methods: Vec<Option<http::Method>> = vec![];
    for route in routes {
        let method = route.method().cloned();
        if !methods.contains(&method) {
            methods.push(method);
        }
    }
    methods
}

impl<H, M> std::fmt::Debug for dyn RouteTable<H, M>
where
    H: 'static,
    M: 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.strategy())
    }
}
