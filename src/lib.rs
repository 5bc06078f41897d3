//! Underpass is the request routing core of an HTTP server.  It maps a method
//! and a path to a registered handler, and extracts the path's parameters
//! along the way.  Underpass does not speak HTTP itself, and does not call
//! handlers or middleware; it only stores them and hands them back.
//!
//! Routes are stored using one of three strategies (see [`Strategy`]), which
//! agree on every unambiguous route set:
//!
//! - an exact index, hashing static paths and scanning the rest;
//! - a sorted scan, walking one list ordered by specificity; and
//! - a radix tree over path segments.
//!
//! # Getting Started
//! To get started, just add underpass to your `Cargo.toml`:
//!
//! ```toml
//! underpass = "0.1.0"
//! ```
//!
//! # Examples
//! ```rust
//! # fn main() -> Result<(), anyhow::Error> {
//! use underpass::{RouteOptions, Router, Strategy};
//!
//! let mut router = Router::<&str, &str>::new(Strategy::RadixTree);
//! router.get("/", "home")?;
//! router.under("/users", |users| {
//!     users
//!         .get("/", "index")?
//!         .get("/me", "me")?
//!         .get_with("/:id<\\d+>", "show", RouteOptions::new().named("user"))?;
//!     Ok(())
//! })?;
//! router.group_with("/files", ["auth"]).get("/*", "files")?;
//!
//! let found = router.lookup("GET", "/users/42").unwrap();
//! assert_eq!(*found.handler(), "show");
//! assert_eq!(found.params().get("id"), Some("42"));
//! assert_eq!(*router.lookup("GET", "/users/me").unwrap().handler(), "me");
//!
//! let found = router.lookup("GET", "/files/docs/readme.md").unwrap();
//! assert_eq!(found.params().get("*"), Some("docs/readme.md"));
//! assert_eq!(found.middleware(), &["auth"]);
//! # Ok(())
//! # }
//! ```
#![warn(missing_debug_implementations, missing_docs, rust_2018_idioms)]
#![deny(clippy::correctness, unused_must_use)]

mod error;
mod params;
mod router;

pub use self::error::RouteError;
pub use self::params::Params;
pub use self::router::{
    Constraint, ExactTable, Group, Matcher, Pattern, RadixTable, Route, RouteInfo, RouteMatch,
    RouteOptions, RouteTable, Router, Segment, SortedTable, Strategy, TreeStats,
};

#[must_use]
#[inline]
/// This creates a new router, using the default strategy.  This is a shortcut
/// for [`Router::default`], with no middleware.
pub fn router<H>() -> Router<H>
where
    H: Send + Sync + 'static,
{
    Router::default()
}
