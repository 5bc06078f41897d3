use super::{join_paths, RouteOptions, Router};
use crate::RouteError;

/// A prefix, and a middleware chain, over a [`Router`].
///
/// This is generated when you call [`Router::group`], and it borrows the
/// router it came from: there is no separate storage, and every route
/// registered through the group lands in the router itself, with the
/// group's prefix joined onto its pattern and the group's middleware placed
/// in front of its own.  Groups nest; a group of a group carries both
/// prefixes, and both middleware chains (outer first).
///
/// # Examples
/// ```rust
/// # fn main() -> Result<(), anyhow::Error> {
/// use underpass::{RouteOptions, Router, Strategy};
/// let mut router = Router::<&str, &str>::new(Strategy::ExactIndex);
/// let mut api = router.group_with("/api", ["cors"]);
/// api.get("/status", "status")?;
/// api.group_with("/admin", ["auth"])
///     .post_with("/reload", "reload", RouteOptions::new().with("audit"))?;
///
/// let found = router.lookup("POST", "/api/admin/reload").unwrap();
/// assert_eq!(found.middleware(), &["cors", "auth", "audit"]);
/// assert_eq!(router.lookup("GET", "/api/status").unwrap().middleware(), &["cors"]);
/// # Ok(())
/// # }
/// ```
pub struct Group<'r, H, M> {
    router: &'r mut Router<H, M>,
    prefix: String,
    middleware: Vec<M>,
}

impl<'r, H, M> Group<'r, H, M>
where
    H: Send + Sync + 'static,
    M: Clone + Send + Sync + 'static,
{
    pub(super) fn new(router: &'r mut Router<H, M>, prefix: String, middleware: Vec<M>) -> Self {
        Group {
            router,
            prefix,
            middleware,
        }
    }

    /// The prefix every route registered through this group receives.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// The middleware every route registered through this group inherits.
    pub fn middleware(&self) -> &[M] {
        &self.middleware
    }

    /// Starts a nested group, extending this group's prefix.  The nested group
    /// inherits this group's middleware.
    pub fn group(&mut self, prefix: &str) -> Group<'_, H, M> {
        Group {
            prefix: join_paths(&self.prefix, prefix),
            middleware: self.middleware.clone(),
            router: &mut *self.router,
        }
    }

    /// Starts a nested group, extending this group's prefix and appending to
    /// its middleware.
    pub fn group_with<I>(&mut self, prefix: &str, middleware: I) -> Group<'_, H, M>
    where
        I: IntoIterator<Item = M>,
    {
        let mut nested = self.group(prefix);
        nested.middleware.extend(middleware);
        nested
    }

    /// Starts a nested group, and passes it to the closure.  See
    /// [`Router::under`].
    ///
    /// # Errors
    /// Returns the first error from the closure.
    pub fn under<F>(&mut self, prefix: &str, build: F) -> Result<&mut Self, RouteError>
    where
        F: FnOnce(&mut Group<'_, H, M>) -> Result<(), RouteError>,
    {
        let mut nested = self.group(prefix);
        build(&mut nested)?;
        Ok(self)
    }

    /// Registers a route for the given method (or, for `None`, any method),
    /// under this group's prefix and middleware.
    ///
    /// # Errors
    /// Fails if the pattern is malformed; see [`Router::route`].
    pub fn route(
        &mut self,
        method: Option<http::Method>,
        pattern: &str,
        handler: H,
        options: RouteOptions<M>,
    ) -> Result<&mut Self, RouteError> {
        let path = join_paths(&self.prefix, pattern);
        let mut middleware = self.middleware.clone();
        middleware.extend(options.middleware);
        let options = RouteOptions {
            name: options.name,
            middleware,
        };
        self.router.route(method, &path, handler, options)?;
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
        /// Registers a GET route under this group.
        pub fn get, get_with = Some(http::Method::GET);
        /// Registers a POST route under this group.
        pub fn post, post_with = Some(http::Method::POST);
        /// Registers a PUT route under this group.
        pub fn put, put_with = Some(http::Method::PUT);
        /// Registers a PATCH route under this group.
        pub fn patch, patch_with = Some(http::Method::PATCH);
        /// Registers a DELETE route under this group.
        pub fn delete, delete_with = Some(http::Method::DELETE);
        /// Registers a HEAD route under this group.
        pub fn head, head_with = Some(http::Method::HEAD);
        /// Registers an OPTIONS route under this group.
        pub fn options, options_with = Some(http::Method::OPTIONS);
        /// Registers a route under this group responding to any method.
        pub fn all, all_with = None;
    ];
}

impl<H, M> std::fmt::Debug for Group<'_, H, M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Group")
            .field("prefix", &self.prefix)
            .field("middleware", &self.middleware.len())
            .finish_non_exhaustive()
    }
}
