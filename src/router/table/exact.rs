use super::RouteTable;
use crate::router::{Route, RouteMatch, Strategy};
use crate::{Params, RouteError};
use std::collections::HashMap;
use std::sync::Arc;

type Key = (Option<http::Method>, String);

/// A hash index for static patterns, with an ordered list for dynamic ones.
///
/// A static pattern is stored under both its bare form and its
/// trailing-slash form (lower-cased), so that a static lookup is a single
/// hash probe no matter how the path ends.  Registering the same static
/// pattern and method twice replaces the first route.
///
/// Dynamic patterns are kept sorted by parameter count, then registration
/// order, and are tried one after another; registering one twice keeps both,
/// and the first still wins.  This is cheapest for a handful of routes.
pub struct ExactTable<H, M> {
    statics: HashMap<Key, Arc<Route<H, M>>>,
    dynamic: Vec<Arc<Route<H, M>>>,
}

impl<H, M> ExactTable<H, M> {
    /// Creates an empty table.
    pub fn new() -> Self {
        ExactTable {
            statics: HashMap::new(),
            dynamic: vec![],
        }
    }

    fn probe(&self, method: Option<&http::Method>, path: &str) -> Option<&Arc<Route<H, M>>> {
        self.statics.get(&(method.cloned(), path.to_owned()))
    }
}

impl<H, M> Default for ExactTable<H, M> {
    fn default() -> Self {
        ExactTable::new()
    }
}

impl<H, M> RouteTable<H, M> for ExactTable<H, M>
where
    H: Send + Sync + 'static,
    M: Send + Sync + 'static,
{
    fn insert(&mut self, route: Arc<Route<H, M>>) -> Result<(), RouteError> {
        let matcher = route.pattern().matcher();
        if !matcher.is_static() {
            self.dynamic.push(route);
            self.dynamic
                .sort_by_key(|r| (r.pattern().matcher().param_count(), r.insertion_index()));
            return Ok(());
        }

        let base = route.pattern().as_str().to_lowercase();
        let slashed = format!("{}/", base);
        for path in [base, slashed] {
            let key = (route.method().cloned(), path);
            if let Some(previous) = self.statics.insert(key, route.clone()) {
                if previous.insertion_index() != route.insertion_index() {
                    log::warn!(
                        "route {} {} replaces an earlier registration of the same path",
                        route.method_str(),
                        route.pattern().as_str()
                    );
                }
            }
        }

        Ok(())
    }

    fn lookup(&self, method: &http::Method, path: &str) -> Option<RouteMatch<H, M>> {
        let key = path.to_lowercase();
        let found = self
            .probe(Some(method), &key)
            .or_else(|| self.probe(None, &key));
        if let Some(route) = found {
            return Some(RouteMatch::new(route.clone(), Params::new()));
        }

        self.dynamic
            .iter()
            .filter(|route| route.matches(method))
            .find_map(|route| {
                let params = route.pattern().matcher().captures(path)?;
                Some(RouteMatch::new(route.clone(), params))
            })
    }

    fn candidates(&self, path: &str) -> Vec<&Arc<Route<H, M>>> {
        let key = path.to_lowercase();
        let statics = self
            .statics
            .iter()
            .filter(|((_, static_path), _)| *static_path == key)
            .map(|(_, route)| route);
        let dynamic = self
            .dynamic
            .iter()
            .filter(|route| route.pattern().matcher().regex().is_match(path));
        statics.chain(dynamic).collect()
    }

    fn strategy(&self) -> Strategy {
        Strategy::ExactIndex
    }
}

impl<H, M> std::fmt::Debug for ExactTable<H, M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExactTable")
            .field("statics", &self.statics.keys().collect::<Vec<_>>())
            .field("dynamic", &self.dynamic)
            .finish()
    }
}
