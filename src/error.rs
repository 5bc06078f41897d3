#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
/// Errors generated while registering routes, or while building paths from
/// them.
///
/// Lookups never produce an error; a request that matches no route is simply
/// a `None`.  Everything here happens at registration time (or while
/// reversing a named route), so that a misconfigured router fails before it
/// can start serving.
pub enum RouteError {
    #[error("parameter in pattern {:?} has no name (at byte {})", .pattern, .position)]
    /// Generated when a `:` in a pattern is not followed by at least one
    /// `[A-Za-z0-9_]` character.
    EmptyParameterName {
        /// The pattern being compiled.
        pattern: String,
        /// The byte offset of the offending `:`.
        position: usize,
    },
    #[error("constraint in pattern {:?} is missing its closing `>`", .pattern)]
    /// Generated when a parameter constraint (`<...>`) is not balanced.
    UnclosedConstraint {
        /// The pattern being compiled.
        pattern: String,
    },
    #[error(
        "constraint {:?} in pattern {:?} is not a valid regular expression",
        .constraint,
        .pattern
    )]
    /// Generated when the body of a parameter constraint, or the pattern as a
    /// whole, fails to compile as a regular expression.
    InvalidConstraint {
        /// The pattern being compiled.
        pattern: String,
        /// The constraint body that failed to compile.
        constraint: String,
        #[source]
        /// The underlying regex error.
        source: regex::Error,
    },
    #[error("wildcard in pattern {:?} must be the last part of the pattern", .pattern)]
    /// Generated when anything follows a `*` in a pattern.
    WildcardNotTerminal {
        /// The pattern being compiled.
        pattern: String,
    },
    #[error("pattern {:?} mixes a parameter with literal text in one path segment", .pattern)]
    /// Generated by the radix tree when a parameter or wildcard does not
    /// occupy a whole path segment (e.g. `/files/:name.:ext`).  The tree
    /// branches per segment, so it cannot express these.
    PartialSegment {
        /// The pattern being inserted.
        pattern: String,
    },
    #[error("no route is named {:?}", .0)]
    /// Generated when reversing a route name that was never registered.
    UnknownRoute(String),
    #[error("route {:?} requires the parameter {:?}", .route, .param)]
    /// Generated when reversing a route without one of its required
    /// parameters.
    MissingParameter {
        /// The name of the route.
        route: String,
        /// The name of the parameter.
        param: String,
    },
    #[error(
        "value {:?} does not satisfy the constraint on {:?} in route {:?}",
        .value,
        .param,
        .route
    )]
    /// Generated when reversing a route with a parameter value that its
    /// constraint rejects.
    ConstraintMismatch {
        /// The name of the route.
        route: String,
        /// The name of the parameter.
        param: String,
        /// The rejected value.
        value: String,
    },
    #[error("could not parse the given string ({:?}) as a routing strategy", .0)]
    /// Generated when parsing a [`crate::Strategy`] from an unknown name.
    UnknownStrategy(String),
}
