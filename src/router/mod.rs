// Generates the per-method registration shortcuts.  Both `Router` and
// `Group` expand this, and both provide the `route` it forwards to.
macro_rules! method {
    ($($(#[$m:meta])* $v:vis fn $n:ident, $w:ident = $meth:expr;)+) => {
        $(
            $(#[$m])*
            $v fn $n(&mut self, pattern: &str, handler: H) -> Result<&mut Self, RouteError> {
                self.route($meth, pattern, handler, RouteOptions::default())
            }

            #[doc = concat!(
                "Like [`Self::",
                stringify!($n),
                "`], with the given [`RouteOptions`]."
            )]
            $v fn $w(
                &mut self,
                pattern: &str,
                handler: H,
                options: RouteOptions<M>,
            ) -> Result<&mut Self, RouteError> {
                self.route($meth, pattern, handler, options)
            }
        )+
    };
}

mod group;
pub(crate) mod pattern;
mod route;
mod table;

pub use self::group::Group;
pub use self::pattern::{Constraint, Matcher, Pattern, Segment};
pub use self::route::{Route, RouteInfo, RouteMatch, RouteOptions};
pub use self::table::{ExactTable, RadixTable, RouteTable, SortedTable, TreeStats};
use crate::{Params, RouteError};
use std::sync::Arc;

/// Which structure a [`Router`] stores its routes in.
///
/// All three give the same answers for unambiguous route sets, and differ in
/// cost and in how they order overlapping patterns.  See [`RouteTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "kebab-case")
)]
pub enum Strategy {
    /// A hash index for static patterns, and a short list for the rest.
    /// Best for around ten routes or fewer.
    ExactIndex,
    /// One list, sorted by specificity.  Best for up to around a hundred
    /// routes.
    SortedScan,
    /// A tree over path segments.  Best for larger route sets.
    RadixTree,
}

impl Strategy {
    /// Picks the strategy suited to the expected number of routes.
    ///
    /// # Examples
    /// ```rust
    /// use underpass::Strategy;
    /// assert_eq!(Strategy::for_route_count(5), Strategy::ExactIndex);
    /// assert_eq!(Strategy::for_route_count(50), Strategy::SortedScan);
    /// assert_eq!(Strategy::for_route_count(500), Strategy::RadixTree);
    /// ```
    pub fn for_route_count(routes: usize) -> Self {
        match routes {
            0..=10 => Strategy::ExactIndex,
            11..=100 => Strategy::SortedScan,
            _ => Strategy::RadixTree,
        }
    }

    /// The name of the strategy, as accepted by [`std::str::FromStr`].
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::ExactIndex => "exact-index",
            Strategy::SortedScan => "sorted-scan",
            Strategy::RadixTree => "radix-tree",
        }
    }

    fn table<H, M>(self) -> Box<dyn RouteTable<H, M>>
    where
        H: Send + Sync + 'static,
        M: Send + Sync + 'static,
    {
        match self {
            Strategy::ExactIndex => Box::new(ExactTable::new()),
            Strategy::SortedScan => Box::new(SortedTable::new()),
            Strategy::RadixTree => Box::new(RadixTable::new()),
        }
    }
}

impl Default for Strategy {
    fn default() -> Self {
        Strategy::RadixTree
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Strategy {
    type Err = RouteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "exact" | "exact-index" => Ok(Strategy::ExactIndex),
            "sorted" | "sorted-scan" => Ok(Strategy::SortedScan),
            "radix" | "radix-tree" => Ok(Strategy::RadixTree),
            _ => Err(RouteError::UnknownStrategy(s.to_owned())),
        }
    }
}

/// A request router.
///
/// This maps an HTTP method and a path to a registered handler, extracting
/// the path's parameters along the way.  Handlers (`H`) and middleware (`M`)
/// are opaque to the router: it stores them, and hands them back on a match,
/// but never calls them.
///
/// Patterns are paths with placeholders:
///
/// ```text
/// /users/:id           a parameter, matching one path segment
/// /users/:id?          an optional parameter
/// /users/:id<\d+>      a parameter with a custom regex constraint
/// /files/*             a wildcard, matching the rest of the path as "*"
/// ```
///
/// Matching ignores case, and one trailing slash.  Where patterns overlap,
/// static patterns win over dynamic ones; past that, the tie-break depends
/// on the [`Strategy`].
///
/// Routers are built in two phases: first every route is registered (through
/// `&mut self`), and then the router is only read.  Lookups take `&self`,
/// so a built router can be shared between threads (e.g. in an [`Arc`]).
///
/// # Examples
/// ```rust
/// # fn main() -> Result<(), anyhow::Error> {
/// let mut router = underpass::router();
/// router
///     .get("/health", "health")?
///     .get("/users/:userId/posts/:postId", "post")?;
///
/// let found = router.lookup("GET", "/users/42/posts/100").unwrap();
/// assert_eq!(*found.handler(), "post");
/// assert_eq!(found.params().get("userId"), Some("42"));
/// assert!(router.lookup("POST", "/health").is_none());
/// # Ok(())
/// # }
/// ```
pub struct Router<H, M = ()> {
    table: Box<dyn RouteTable<H, M>>,
    routes: Vec<Arc<Route<H, M>>>,
    next_index: u64,
}

impl<H, M> Router<H, M>
where
    H: Send + Sync + 'static,
    M: Clone + Send + Sync + 'static,
{
    /// Creates an empty router using the given strategy.
    pub fn new(strategy: Strategy) -> Self {
        log::debug!("router({})", strategy);
        Router {
            table: strategy.table(),
            routes: vec![],
            next_index: 0,
        }
    }

    /// Creates an empty router, picking the strategy from the number of
    /// routes it is expected to hold.  See [`Strategy::for_route_count`].
    pub fn with_expected_routes(routes: usize) -> Self {
        let strategy = Strategy::for_route_count(routes);
        log::debug!("{} expected routes, using {}", routes, strategy);
        Router::new(strategy)
    }

    /// Registers a route for the given method (or, for `None`, any method).
    ///
    /// A pattern without a leading slash is taken relative to the root.
    ///
    /// # Errors
    /// Fails if the pattern is malformed, or (for the radix tree) cannot be
    /// represented; see [`RouteError`].  The router is left unchanged.
    ///
    /// # Examples
    /// ```rust
    /// # fn main() -> Result<(), anyhow::Error> {
    /// use underpass::RouteOptions;
    /// let mut router = underpass::router::<&str>();
    /// let method = http::Method::from_bytes(b"PURGE")?;
    /// router.route(Some(method), "/cache/*", "purge", RouteOptions::new())?;
    /// assert!(router.lookup("PURGE", "/cache/a/b").is_some());
    /// assert!(router.route(None, "/bad/:", "bad", RouteOptions::new()).is_err());
    /// # Ok(())
    /// # }
    /// ```
    pub fn route(
        &mut self,
        method: Option<http::Method>,
        pattern: &str,
        handler: H,
        options: RouteOptions<M>,
    ) -> Result<&mut Self, RouteError> {
        let pattern = Pattern::new(&join_paths("", pattern))?;
        let route = Arc::new(Route::new(
            pattern,
            method,
            handler,
            options,
            self.next_index,
        ));
        self.table.insert(route.clone())?;

        log::trace!(
            "route: {} {} ({})",
            route.method_str(),
            route.pattern().as_str(),
            route.pattern().matcher().regex()
        );
        self.next_index += 1;
        self.routes.push(route);
        Ok(self)
    }

    /// Registers a route responding to the given method.
    pub fn method(
        &mut self,
        method: http::Method,
        pattern: &str,
        handler: H,
    ) -> Result<&mut Self, RouteError> {
        self.route(Some(method), pattern, handler, RouteOptions::default())
    }

    method![
        /// Registers a GET route.
        ///
        /// # Errors
        /// Fails if the pattern is malformed; see [`Router::route`].
        pub fn get, get_with = Some(http::Method::GET);
        /// Registers a POST route.
        pub fn post, post_with = Some(http::Method::POST);
        /// Registers a PUT route.
        pub fn put, put_with = Some(http::Method::PUT);
        /// Registers a PATCH route.
        pub fn patch, patch_with = Some(http::Method::PATCH);
        /// Registers a DELETE route.
        pub fn delete, delete_with = Some(http::Method::DELETE);
        /// Registers a HEAD route.
        pub fn head, head_with = Some(http::Method::HEAD);
        /// Registers an OPTIONS route.
        pub fn options, options_with = Some(http::Method::OPTIONS);
        /// Registers a route responding to any method.
        ///
        /// For a static pattern, and in the radix tree, a route registered
        /// for the request's own method is preferred over this one at the
        /// same path.
        pub fn all, all_with = None;
    ];

    /// Starts a [`Group`] at the given prefix.
    ///
    /// Routes registered through the group are stored in this router, with
    /// the prefix joined to their pattern.
    ///
    /// # Examples
    /// ```rust
    /// # fn main() -> Result<(), anyhow::Error> {
    /// let mut router = underpass::router();
    /// router.group("/api").group("/v1").get("/users", "users")?;
    /// assert!(router.lookup("GET", "/api/v1/users").is_some());
    /// assert!(router.lookup("GET", "/users").is_none());
    /// # Ok(())
    /// # }
    /// ```
    pub fn group(&mut self, prefix: &str) -> Group<'_, H, M> {
        Group::new(self, join_paths("", prefix), vec![])
    }

    /// Starts a [`Group`] at the given prefix, with middleware that every
    /// route registered through it inherits.
    pub fn group_with<I>(&mut self, prefix: &str, middleware: I) -> Group<'_, H, M>
    where
        I: IntoIterator<Item = M>,
    {
        Group::new(self, join_paths("", prefix), middleware.into_iter().collect())
    }

    /// Starts a [`Group`] at the given prefix, and passes it to the closure.
    ///
    /// # Examples
    /// ```rust
    /// # fn main() -> Result<(), anyhow::Error> {
    /// let mut router = underpass::router();
    /// router.under("/users", |users| {
    ///     users.get("/", "index")?.under("/:id", |user| {
    ///         user.get("/", "show")?.delete("/", "destroy")?;
    ///         Ok(())
    ///     })?;
    ///     Ok(())
    /// })?;
    /// assert_eq!(*router.lookup("DELETE", "/users/3").unwrap().handler(), "destroy");
    /// # Ok(())
    /// # }
    /// ```
    ///
    /// # Errors
    /// Returns the first error from the closure.
    pub fn under<F>(&mut self, prefix: &str, build: F) -> Result<&mut Self, RouteError>
    where
        F: FnOnce(&mut Group<'_, H, M>) -> Result<(), RouteError>,
    {
        let mut group = self.group(prefix);
        build(&mut group)?;
        Ok(self)
    }

    /// Finds the route for the given method and path.
    ///
    /// The method is compared case-insensitively; a method that is not a
    /// valid HTTP method token matches nothing.  The path should be the
    /// decoded path of the request, without a query string.
    pub fn lookup(&self, method: &str, path: &str) -> Option<RouteMatch<H, M>> {
        let method = http::Method::from_bytes(method.to_ascii_uppercase().as_bytes()).ok()?;
        self.lookup_method(&method, path)
    }

    /// Finds the route for the given method and path.
    pub fn lookup_method(&self, method: &http::Method, path: &str) -> Option<RouteMatch<H, M>> {
        let found = self.table.lookup(method, path);
        log::trace!(
            "{} {} --> {:?}",
            method,
            path,
            found.as_ref().map(|m| m.route().pattern().as_str())
        );
        found
    }

    /// Lists the methods that have a route matching the given path, in
    /// registration order.  `None` stands for a route registered for any
    /// method.
    ///
    /// This is useful for telling apart a path that does not exist from a
    /// path that exists but not for the request's method.  The answer comes
    /// from the router's own strategy, so a method is listed exactly when
    /// [`Router::lookup`] with that method would find a route.
    ///
    /// # Examples
    /// ```rust
    /// # fn main() -> Result<(), anyhow::Error> {
    /// let mut router = underpass::router();
    /// router.get("/users/:id", "show")?.delete("/users/:id", "destroy")?;
    /// let allowed = router.allowed_methods("/users/3");
    /// assert_eq!(allowed, vec![Some(http::Method::GET), Some(http::Method::DELETE)]);
    /// assert!(router.allowed_methods("/posts").is_empty());
    /// # Ok(())
    /// # }
    /// ```
    pub fn allowed_methods(&self, path: &str) -> Vec<Option<http::Method>> {
        table::methods_of(self.table.candidates(path))
    }

    /// Builds a concrete path from the route registered under the given
    /// name.  If more than one route has the name, the last one registered
    /// is used.
    ///
    /// # Errors
    /// Fails if no route has the name, or if the parameters do not fit the
    /// route's pattern.
    ///
    /// # Examples
    /// ```rust
    /// # fn main() -> Result<(), anyhow::Error> {
    /// use underpass::{Params, RouteOptions};
    /// let mut router = underpass::router::<&str>();
    /// router.get_with("/users/:id<\\d+>", "show", RouteOptions::new().named("user"))?;
    /// let params = [("id", "42")].into_iter().collect::<Params>();
    /// assert_eq!(router.path_for("user", &params)?, "/users/42");
    /// assert!(router.path_for("nobody", &params).is_err());
    /// # Ok(())
    /// # }
    /// ```
    pub fn path_for(&self, name: &str, params: &Params) -> Result<String, RouteError> {
        self.routes
            .iter()
            .rev()
            .find(|route| route.name() == Some(name))
            .ok_or_else(|| RouteError::UnknownRoute(name.to_owned()))?
            .path_for(params)
    }

    /// Describes every registered route, in registration order.
    pub fn routes(&self) -> Vec<RouteInfo> {
        self.routes.iter().map(|route| RouteInfo::from(&**route)).collect()
    }

    /// The number of routes registered.
    pub fn route_count(&self) -> usize {
        self.routes.len()
    }

    /// The strategy this router stores its routes with.
    pub fn router_type(&self) -> Strategy {
        self.table.strategy()
    }

    /// The shape of the route tree, for routers using
    /// [`Strategy::RadixTree`]; `None` otherwise.
    pub fn tree_stats(&self) -> Option<TreeStats> {
        self.table.tree_stats()
    }
}

impl<H, M> Default for Router<H, M>
where
    H: Send + Sync + 'static,
    M: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Router::new(Strategy::default())
    }
}

impl<H, M> std::fmt::Debug for Router<H, M>
where
    H: 'static,
    M: 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("table", &self.table)
            .field("routes", &self.routes)
            .finish()
    }
}

// Base *MUST* be either `""` or start with `"/"`.
fn join_paths(base: &str, extend: &str) -> String {
    let mut buffer = String::with_capacity(base.len() + extend.len() + 1);
    buffer.push_str(base);

    match (base.ends_with('/'), extend.starts_with('/')) {
        (true, true) => {
            buffer.push_str(&extend[1..]);
        }
        (false, true) | (true, false) => {
            buffer.push_str(extend);
        }
        (false, false) => {
            buffer.push('/');
            buffer.push_str(extend);
        }
    }

    buffer
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_join_paths() {
        assert_eq!(join_paths("", "/id"), "/id");
        assert_eq!(join_paths("", "id"), "/id");
        assert_eq!(join_paths("", ""), "/");
        assert_eq!(join_paths("/user", "/id"), "/user/id");
        assert_eq!(join_paths("/user/", "/id"), "/user/id");
        assert_eq!(join_paths("/user/", "id"), "/user/id");
        assert_eq!(join_paths("/user", "/"), "/user/");
    }

    #[test]
    fn test_strategy_parse() {
        assert_eq!("exact".parse::<Strategy>().unwrap(), Strategy::ExactIndex);
        assert_eq!("Sorted-Scan".parse::<Strategy>().unwrap(), Strategy::SortedScan);
        assert_eq!(" radix ".parse::<Strategy>().unwrap(), Strategy::RadixTree);
        assert!(matches!(
            "hash".parse::<Strategy>(),
            Err(RouteError::UnknownStrategy(ref s)) if s == "hash"
        ));
        for strategy in [Strategy::ExactIndex, Strategy::SortedScan, Strategy::RadixTree] {
            assert_eq!(strategy.to_string().parse::<Strategy>().unwrap(), strategy);
        }
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_strategy_serde() {
        let json = serde_json::to_string(&Strategy::SortedScan).unwrap();
        assert_eq!(json, "\"sorted-scan\"");
        let strategy: Strategy = serde_json::from_str("\"radix-tree\"").unwrap();
        assert_eq!(strategy, Strategy::RadixTree);
    }

    #[test]
    fn test_expected_routes() {
        let router = Router::<(), ()>::with_expected_routes(3);
        assert_eq!(router.router_type(), Strategy::ExactIndex);
        assert!(router.tree_stats().is_none());
        let router = Router::<(), ()>::with_expected_routes(1000);
        assert_eq!(router.router_type(), Strategy::RadixTree);
        assert!(router.tree_stats().is_some());
        assert_eq!(Router::<(), ()>::default().router_type(), Strategy::RadixTree);
    }

    // Runs the same body against a router of every strategy.
    macro_rules! conformance {
        ($($name:ident($router:ident) $body:block)+) => {
            $(
                mod $name {
                    use super::*;

                    fn run(strategy: Strategy) {
                        let mut $router = Router::<&'static str, &'static str>::new(strategy);
                        $body
                    }

                    #[test]
                    fn exact_index() {
                        run(Strategy::ExactIndex);
                    }

                    #[test]
                    fn sorted_scan() {
                        run(Strategy::SortedScan);
                    }

                    #[test]
                    fn radix_tree() {
                        run(Strategy::RadixTree);
                    }
                }
            )+
        };
    }

    type TestRouter = Router<&'static str, &'static str>;

    fn handler_of(router: &TestRouter, method: &str, path: &str) -> Option<&'static str> {
        router.lookup(method, path).map(|m| *m.handler())
    }

    fn params_of(router: &TestRouter, method: &str, path: &str) -> Params {
        router.lookup(method, path).unwrap().params().clone()
    }

    fn params(pairs: &[(&str, &str)]) -> Params {
        pairs.iter().copied().collect()
    }

    conformance! {
        idempotent_static(router) {
            router.get("/health", "health").unwrap();
            for _ in 0..3 {
                assert_eq!(handler_of(&router, "GET", "/health"), Some("health"));
            }
            assert_eq!(params_of(&router, "GET", "/health"), Params::new());
        }

        trailing_slash(router) {
            router.get("/users", "users").unwrap();
            assert_eq!(handler_of(&router, "GET", "/users"), Some("users"));
            assert_eq!(handler_of(&router, "GET", "/users/"), Some("users"));
        }

        case_insensitive(router) {
            router.get("/users", "users").unwrap();
            router.get("/Teams/:id", "team").unwrap();
            assert_eq!(handler_of(&router, "GET", "/USERS"), Some("users"));
            assert_eq!(handler_of(&router, "get", "/users"), Some("users"));
            assert_eq!(params_of(&router, "GET", "/teams/AbC"), params(&[("id", "AbC")]));
        }

        root_route(router) {
            router.get("/", "root").unwrap();
            assert_eq!(handler_of(&router, "GET", "/"), Some("root"));
            assert_eq!(handler_of(&router, "GET", "/x"), None);
        }

        static_beats_dynamic_static_last(router) {
            router.get("/users/:id", "dynamic").unwrap();
            router.get("/users/me", "static").unwrap();
            assert_eq!(handler_of(&router, "GET", "/users/me"), Some("static"));
            assert_eq!(handler_of(&router, "GET", "/users/123"), Some("dynamic"));
            assert_eq!(params_of(&router, "GET", "/users/123"), params(&[("id", "123")]));
        }

        static_beats_dynamic_static_first(router) {
            router.get("/users/me", "static").unwrap();
            router.get("/users/:id", "dynamic").unwrap();
            assert_eq!(handler_of(&router, "GET", "/users/me"), Some("static"));
            assert_eq!(handler_of(&router, "GET", "/users/123"), Some("dynamic"));
        }

        fewer_params_wins(router) {
            router.get("/a/:b/:c", "two").unwrap();
            router.get("/a/:b", "one").unwrap();
            assert_eq!(handler_of(&router, "GET", "/a/x"), Some("one"));
            assert_eq!(params_of(&router, "GET", "/a/x/y"), params(&[("b", "x"), ("c", "y")]));
        }

        constraint(router) {
            router.get("/users/:id<\\d+>", "user").unwrap();
            assert_eq!(params_of(&router, "GET", "/users/123"), params(&[("id", "123")]));
            assert_eq!(handler_of(&router, "GET", "/users/abc"), None);
        }

        wildcard(router) {
            router.get("/files/*", "files").unwrap();
            assert_eq!(
                params_of(&router, "GET", "/files/docs/readme.md"),
                params(&[("*", "docs/readme.md")])
            );
        }

        multiple_params(router) {
            router.get("/users/:userId/posts/:postId", "post").unwrap();
            assert_eq!(
                params_of(&router, "GET", "/users/42/posts/100"),
                params(&[("userId", "42"), ("postId", "100")])
            );
        }

        optional_param(router) {
            router.get("/users/:id?", "users").unwrap();
            assert_eq!(params_of(&router, "GET", "/users"), Params::new());
            assert_eq!(params_of(&router, "GET", "/users/7"), params(&[("id", "7")]));
        }

        method_dispatch(router) {
            router.get("/items", "list").unwrap();
            router.post("/items", "create").unwrap();
            router.all("/items/:id", "any").unwrap();
            router.put("/items/:id", "replace").unwrap();
            assert_eq!(handler_of(&router, "GET", "/items"), Some("list"));
            assert_eq!(handler_of(&router, "POST", "/items"), Some("create"));
            assert_eq!(handler_of(&router, "PATCH", "/items"), None);
            assert_eq!(handler_of(&router, "OPTIONS", "/items/1"), Some("any"));
            assert_eq!(handler_of(&router, "NOT A METHOD", "/items"), None);
        }

        all_method_fallback(router) {
            router.head("/ping", "head").unwrap();
            router.all("/ping", "any").unwrap();
            assert_eq!(handler_of(&router, "HEAD", "/ping"), Some("head"));
            assert_eq!(handler_of(&router, "DELETE", "/ping"), Some("any"));
        }

        no_match(router) {
            router.get("/users", "users").unwrap();
            assert!(router.lookup("GET", "/posts").is_none());
            assert!(router.lookup("GET", "/users/1").is_none());
        }

        group_prefix_and_middleware(router) {
            router
                .group_with("/api", ["api"])
                .group_with("/v1", ["v1"])
                .get_with("/users", "users", RouteOptions::new().with("own").named("users"))
                .unwrap();
            let found = router.lookup("GET", "/api/v1/users").unwrap();
            assert_eq!(*found.handler(), "users");
            assert_eq!(found.middleware(), &["api", "v1", "own"]);
            assert_eq!(found.name(), Some("users"));
            assert!(router.lookup("GET", "/users").is_none());
            assert!(router.lookup("GET", "/v1/users").is_none());
        }

        group_shares_storage(router) {
            router.get("/", "root").unwrap();
            {
                let mut admin = router.group("/admin");
                admin.patch("/settings", "settings").unwrap();
            }
            router.options("/admin", "admin").unwrap();
            assert_eq!(router.route_count(), 3);
            assert_eq!(handler_of(&router, "PATCH", "/admin/settings"), Some("settings"));
            assert_eq!(handler_of(&router, "OPTIONS", "/admin"), Some("admin"));
        }

        malformed_pattern(router) {
            assert!(router.get("/users/:id<\\d+", "bad").is_err());
            assert!(router.get("/users/:", "bad").is_err());
            assert!(router.get("/users/:id<(>", "bad").is_err());
            assert_eq!(router.route_count(), 0);
            router.get("/users", "good").unwrap();
            assert_eq!(router.routes()[0].pattern, "/users");
        }

        many_routes(router) {
            for n in 0..100 {
                router.get(&format!("/api/v1/resource{}", n), "list").unwrap();
                router.get(&format!("/api/v1/resource{}/:id", n), "show").unwrap();
            }
            assert_eq!(router.route_count(), 200);
            assert_eq!(handler_of(&router, "GET", "/api/v1/resource50"), Some("list"));
            assert_eq!(
                params_of(&router, "GET", "/api/v1/resource50/123"),
                params(&[("id", "123")])
            );
        }

        introspection(router) {
            router.get("/a", "a").unwrap();
            router.all_with("b", "b", RouteOptions::new().named("bee")).unwrap();
            let routes = router.routes();
            assert_eq!(
                routes,
                vec![
                    RouteInfo {
                        method: "GET".to_owned(),
                        pattern: "/a".to_owned(),
                        name: None,
                    },
                    RouteInfo {
                        method: "ALL".to_owned(),
                        pattern: "/b".to_owned(),
                        name: Some("bee".to_owned()),
                    },
                ]
            );
            #[cfg(feature = "serde")]
            {
                let json = serde_json::to_value(&routes).unwrap();
                assert_eq!(json[1]["name"], "bee");
                assert!(json[0].get("name").is_none());
            }
        }

        allowed_methods(router) {
            router.get("/a/:b", "get").unwrap();
            router.all("/a/*", "all").unwrap();
            router.post("/a/:b", "post").unwrap();
            router.get("/:z/x", "again").unwrap();
            router.put("/b", "put").unwrap();
            assert_eq!(
                router.allowed_methods("/a/x"),
                vec![Some(http::Method::GET), None, Some(http::Method::POST)]
            );
            assert_eq!(router.allowed_methods("/B/"), vec![Some(http::Method::PUT)]);
            assert!(router.allowed_methods("/c").is_empty());
            assert!(handler_of(&router, "GET", "/c").is_none());
        }

        reverse(router) {
            router
                .get_with("/posts/:year<\\d{4}>/:slug?", "post", RouteOptions::new().named("post"))
                .unwrap();
            let path = router
                .path_for("post", &params(&[("year", "2024"), ("slug", "hello")]))
                .unwrap();
            assert_eq!(path, "/posts/2024/hello");
            assert_eq!(handler_of(&router, "GET", &path), Some("post"));
            let path = router.path_for("post", &params(&[("year", "2024")])).unwrap();
            assert_eq!(path, "/posts/2024");
            assert!(router.path_for("post", &params(&[("year", "24")])).is_err());
        }
    }

    #[test]
    fn test_allowed_methods_agree_with_lookup() {
        let mut router = Router::<&'static str>::new(Strategy::RadixTree);
        router
            .get("/users/:id<\\d+>", "show")
            .unwrap()
            .post("/users/:name/posts", "posts")
            .unwrap()
            .delete("/files/:p<.+>", "files")
            .unwrap();
        // the second route renamed the shared parameter and dropped its
        // constraint, so `abc` reaches the first route's handler.
        assert_eq!(*router.lookup("GET", "/users/abc").unwrap().handler(), "show");
        assert_eq!(router.allowed_methods("/users/abc"), vec![Some(http::Method::GET)]);
        assert_eq!(
            router.allowed_methods("/users/abc/posts"),
            vec![Some(http::Method::POST)]
        );
        // constraints apply to one segment at a time in the tree.
        assert!(router.lookup("DELETE", "/files/a/b").is_none());
        assert!(router.allowed_methods("/files/a/b").is_empty());
        assert_eq!(router.allowed_methods("/files/a"), vec![Some(http::Method::DELETE)]);

        for strategy in [Strategy::ExactIndex, Strategy::SortedScan, Strategy::RadixTree] {
            let mut router = Router::<&'static str>::new(strategy);
            router
                .get("/", "root")
                .unwrap()
                .head("/docs/:page?", "docs")
                .unwrap()
                .all("/docs/*", "any")
                .unwrap()
                .patch("/docs/intro", "intro")
                .unwrap();
            for path in ["/", "/docs", "/docs/intro", "/docs/a/b", "/nope", "//x"] {
                let allowed = router.allowed_methods(path);
                for method in [http::Method::GET, http::Method::HEAD, http::Method::PATCH] {
                    let expected = router.lookup_method(&method, path).is_some();
                    let listed = allowed.contains(&Some(method.clone())) || allowed.contains(&None);
                    assert_eq!(listed, expected, "{} {} {:?}", method, path, strategy);
                }
            }
        }
    }

    #[test]
    fn test_duplicate_registration_winner() {
        let cases = [
            (Strategy::ExactIndex, "second", "first"),
            (Strategy::SortedScan, "first", "first"),
            (Strategy::RadixTree, "second", "second"),
        ];
        for (strategy, static_winner, dynamic_winner) in cases {
            let mut router = Router::<&'static str>::new(strategy);
            router
                .get("/a", "first")
                .unwrap()
                .get("/a", "second")
                .unwrap()
                .get("/b/:id", "first")
                .unwrap()
                .get("/b/:id", "second")
                .unwrap();
            assert_eq!(router.route_count(), 4, "{:?}", strategy);
            let found = router.lookup("GET", "/a").unwrap();
            assert_eq!(*found.handler(), static_winner, "{:?}", strategy);
            let found = router.lookup("GET", "/b/1").unwrap();
            assert_eq!(*found.handler(), dynamic_winner, "{:?}", strategy);
            assert_eq!(found.params().get("id"), Some("1"));
        }
    }

    #[test]
    fn test_debug_names_strategy() {
        let mut router = Router::<&'static str>::new(Strategy::SortedScan);
        router.get("/a", "a").unwrap();
        let debug = format!("{:?}", router);
        assert!(debug.starts_with("Router"));
        assert!(debug.contains("sorted-scan"));
        assert!(debug.contains("\"/a\""));
    }

    #[test]
    fn test_tree_stats_consistency() {
        let mut router = Router::<&'static str>::new(Strategy::RadixTree);
        router
            .get("/", "root")
            .unwrap()
            .get("/a", "a")
            .unwrap()
            .get("/a/b/c", "abc")
            .unwrap()
            .get("/a/:id/d/e", "deep")
            .unwrap()
            .get("/f/*", "files")
            .unwrap();
        let stats = router.tree_stats().unwrap();
        assert_eq!(stats.routes, 5);
        assert!(stats.nodes >= stats.routes);
        assert!(stats.depth >= 1);
        assert_eq!(stats.depth, 5);
    }

    #[test]
    fn test_radix_rejects_partial_segment() {
        let mut router = Router::<&'static str>::new(Strategy::RadixTree);
        assert!(matches!(
            router.get("/files/:name.:ext", "file"),
            Err(RouteError::PartialSegment { .. })
        ));
        assert_eq!(router.route_count(), 0);
        let mut router = Router::<&'static str>::new(Strategy::SortedScan);
        router.get("/files/:name.:ext", "file").unwrap();
        assert_eq!(
            router.lookup("GET", "/files/a.txt").unwrap().params().get("ext"),
            Some("txt")
        );
    }

    #[test]
    fn test_insertion_index_per_router() {
        let mut first = Router::<&'static str>::new(Strategy::SortedScan);
        let mut second = Router::<&'static str>::new(Strategy::SortedScan);
        first.get("/a", "a").unwrap().get("/b", "b").unwrap();
        second.get("/c", "c").unwrap();
        assert_eq!(first.lookup("GET", "/b").unwrap().route().insertion_index(), 1);
        assert_eq!(second.lookup("GET", "/c").unwrap().route().insertion_index(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_lookups() {
        let mut router = Router::<usize>::new(Strategy::RadixTree);
        router
            .get("/a/:x/c", 0)
            .unwrap()
            .get("/a/b/:y/d", 1)
            .unwrap()
            .get("/u/:id/*", 2)
            .unwrap();
        let router = Arc::new(router);

        let tasks = (0..64)
            .map(|n| {
                let router = router.clone();
                tokio::spawn(async move {
                    for _ in 0..100 {
                        let found = router.lookup("GET", "/a/b/c").unwrap();
                        assert_eq!(*found.handler(), 0);
                        assert_eq!(found.params().len(), 1);
                        assert_eq!(found.params().get("x"), Some("b"));

                        let path = format!("/u/{}/rest/{}", n, n);
                        let found = router.lookup("GET", &path).unwrap();
                        assert_eq!(found.params().get("id"), Some(n.to_string().as_str()));
                        assert_eq!(found.params().get("*"), Some(format!("rest/{}", n).as_str()));
                    }
                })
            })
            .collect::<Vec<_>>();

        for task in tasks {
            task.await.unwrap();
        }
    }
}
