use super::pattern::{Pattern, Segment};
use crate::{Params, RouteError};
use std::sync::Arc;

/// A registered route: a pattern, a method, a handler, and the middleware to
/// run in front of it.
///
/// Routes are created by the registration methods on [`crate::Router`] and
/// [`crate::Group`], and are shared between the router's route list and its
/// matching structure.
pub struct Route<H, M> {
    pub(crate) pattern: Pattern,
    method: Option<http::Method>,
    handler: H,
    middleware: Vec<M>,
    name: Option<String>,
    index: u64,
}

impl<H, M> Route<H, M> {
    pub(crate) fn new(
        pattern: Pattern,
        method: Option<http::Method>,
        handler: H,
        options: RouteOptions<M>,
        index: u64,
    ) -> Self {
        Route {
            pattern,
            method,
            handler,
            middleware: options.middleware,
            name: options.name,
            index,
        }
    }

    /// Get a reference to the route's pattern.
    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    /// Get a reference to the route's method.  This is `None` for routes
    /// that respond to any method.
    pub fn method(&self) -> Option<&http::Method> {
        self.method.as_ref()
    }

    /// Get a reference to the route's handler.
    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// The route's middleware, outermost first: every enclosing group's
    /// middleware, then the route's own.
    pub fn middleware(&self) -> &[M] {
        &self.middleware
    }

    /// The route's name, if it was given one.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The order in which the route was registered, unique within one router.
    pub fn insertion_index(&self) -> u64 {
        self.index
    }

    pub(crate) fn matches(&self, method: &http::Method) -> bool {
        self.method.is_none() || self.method.as_ref() == Some(method)
    }

    pub(crate) fn method_str(&self) -> &str {
        self.method.as_ref().map_or("ALL", http::Method::as_str)
    }

    /// Builds a concrete path for this route from the given parameters.
    ///
    /// Optional parameters that are not given are left out (along with their
    /// leading slash), and a missing wildcard renders as empty.
    ///
    /// # Errors
    /// Fails if a required parameter is missing, or if a given value does not
    /// satisfy the parameter's constraint.
    pub fn path_for(&self, params: &Params) -> Result<String, RouteError> {
        let route_name = || {
            self.name
                .clone()
                .unwrap_or_else(|| self.pattern.as_str().to_owned())
        };
        let mut buffer = String::with_capacity(self.pattern.as_str().len());

        for segment in self.pattern.segments() {
            match segment {
                Segment::Static(text) => buffer.push_str(text),
                Segment::Param {
                    name,
                    optional,
                    constraint,
                } => match params.get(name.as_str()) {
                    Some(value) => {
                        let allowed = match constraint {
                            Some(constraint) => constraint.is_match(value),
                            None => !value.is_empty() && !value.contains('/'),
                        };
                        if !allowed {
                            return Err(RouteError::ConstraintMismatch {
                                route: route_name(),
                                param: name.clone(),
                                value: value.to_owned(),
                            });
                        }
                        buffer.push_str(value);
                    }
                    None if *optional => trim_slash(&mut buffer),
                    None => {
                        return Err(RouteError::MissingParameter {
                            route: route_name(),
                            param: name.clone(),
                        })
                    }
                },
                Segment::Wildcard => match params.get("*") {
                    Some(value) if !value.is_empty() => buffer.push_str(value),
                    _ => trim_slash(&mut buffer),
                },
            }
        }

        if buffer.is_empty() {
            buffer.push('/');
        }
        Ok(buffer)
    }
}

fn trim_slash(buffer: &mut String) {
    if buffer.ends_with('/') {
        buffer.pop();
    }
}

impl<H, M> std::fmt::Debug for Route<H, M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Route")
            .field("pattern", &self.pattern.as_str())
            .field("method", &self.method)
            .field("name", &self.name)
            .field("index", &self.index)
            .finish_non_exhaustive()
    }
}

/// Options given when registering a route.
///
/// # Examples
/// ```rust
/// # fn main() -> Result<(), anyhow::Error> {
/// use underpass::{RouteOptions, Router, Strategy};
/// let mut router = Router::<&str, &str>::new(Strategy::SortedScan);
/// router.get_with(
///     "/admin",
///     "admin",
///     RouteOptions::new().named("admin").with("auth"),
/// )?;
/// let found = router.lookup("GET", "/admin").unwrap();
/// assert_eq!(found.name(), Some("admin"));
/// assert_eq!(found.middleware(), &["auth"]);
/// # Ok(())
/// # }
/// ```
pub struct RouteOptions<M> {
    pub(crate) name: Option<String>,
    pub(crate) middleware: Vec<M>,
}

impl<M> RouteOptions<M> {
    /// Creates empty options: no name, and no middleware.
    pub fn new() -> Self {
        RouteOptions {
            name: None,
            middleware: vec![],
        }
    }

    /// Names the route, for introspection and [`crate::Router::path_for`].
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Appends middleware to the route's own chain.  This runs after any
    /// middleware inherited from enclosing groups.
    #[must_use]
    pub fn with(mut self, middleware: M) -> Self {
        self.middleware.push(middleware);
        self
    }
}

impl<M> Default for RouteOptions<M> {
    fn default() -> Self {
        RouteOptions::new()
    }
}

impl<M> std::fmt::Debug for RouteOptions<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteOptions")
            .field("name", &self.name)
            .field("middleware", &self.middleware.len())
            .finish()
    }
}

/// The result of a successful lookup: the matched route, and the parameters
/// extracted from the path.
pub struct RouteMatch<H, M> {
    route: Arc<Route<H, M>>,
    params: Params,
}

impl<H, M> RouteMatch<H, M> {
    pub(crate) fn new(route: Arc<Route<H, M>>, params: Params) -> Self {
        RouteMatch { route, params }
    }

    /// The handler of the matched route.
    pub fn handler(&self) -> &H {
        self.route.handler()
    }

    /// The parameters extracted from the path.
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// The middleware chain of the matched route, outermost first.
    pub fn middleware(&self) -> &[M] {
        self.route.middleware()
    }

    /// The name of the matched route.
    pub fn name(&self) -> Option<&str> {
        self.route.name()
    }

    /// The matched route itself.
    pub fn route(&self) -> &Arc<Route<H, M>> {
        &self.route
    }

    /// Consumes the match, returning the route and the parameters.
    pub fn into_parts(self) -> (Arc<Route<H, M>>, Params) {
        (self.route, self.params)
    }
}

impl<H, M> std::fmt::Debug for RouteMatch<H, M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteMatch")
            .field("route", &self.route)
            .field("params", &self.params)
            .finish()
    }
}

/// A description of a registered route, as returned by
/// [`crate::Router::routes`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RouteInfo {
    /// The route's method, or `"ALL"`.
    pub method: String,
    /// The full pattern, including any group prefixes.
    pub pattern: String,
    /// The route's name.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub name: Option<String>,
}

impl<H, M> From<&Route<H, M>> for RouteInfo {
    fn from(route: &Route<H, M>) -> Self {
        RouteInfo {
            method: route.method_str().to_owned(),
            pattern: route.pattern.as_str().to_owned(),
            name: route.name.clone(),
        }
    }
}
