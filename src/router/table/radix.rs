use super::RouteTable;
use crate::router::pattern::{Constraint, Segment};
use crate::router::{Route, RouteMatch, Strategy};
use crate::{Params, RouteError};
use std::collections::HashMap;
use std::sync::Arc;

/// The shape of a [`RadixTable`], for debugging and capacity planning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TreeStats {
    /// The number of nodes in the tree, including the root.
    pub nodes: usize,
    /// The number of levels in the tree; a tree holding only the root has a
    /// depth of one.
    pub depth: usize,
    /// The number of routes inserted.
    pub routes: usize,
}

/// A tree over path segments.
///
/// Each node owns a map of static children (keyed by the lower-cased
/// segment), at most one parameter child, and at most one wildcard child.
/// Routes live on the node their pattern ends at, keyed by method.
///
/// Lookup descends one path segment at a time, trying the static child, then
/// the parameter child, then the wildcard, and backing out of a branch that
/// fails further down.  Precedence is therefore structural: `/users/me`
/// beats `/users/:id` regardless of which was registered first.
///
/// Since a node has only one parameter child, two patterns that put
/// differently named (or differently constrained) parameters at the same
/// position share it, and the one registered last decides its name and
/// constraint.  Registering the same pattern and method twice replaces the
/// earlier route.
///
/// The tree branches on whole segments, which makes it stricter than the
/// regex strategies in two ways.  A parameter must fill its segment, so
/// `/files/:name.:ext` is rejected with [`RouteError::PartialSegment`].  And
/// a constraint is checked against one segment at a time, so `/a/:p<.+>`
/// matches `/a/x` but never `/a/x/y`, which the regex strategies would
/// accept with `p = "x/y"`.  Use a wildcard to capture across slashes.
pub struct RadixTable<H, M> {
    root: Node<H, M>,
    routes: usize,
}

struct Node<H, M> {
    label: String,
    children: HashMap<String, Node<H, M>>,
    param: Option<Box<ParamChild<H, M>>>,
    wildcard: Option<Box<Node<H, M>>>,
    handlers: HashMap<Option<http::Method>, Arc<Route<H, M>>>,
}

struct ParamChild<H, M> {
    name: String,
    constraint: Option<Constraint>,
    node: Node<H, M>,
}

// A pattern, cut at its slashes.
#[derive(Debug)]
enum Chunk<'s> {
    Static(String),
    Param {
        name: &'s str,
        optional: bool,
        constraint: Option<&'s Constraint>,
    },
    Wildcard,
}

impl<H, M> RadixTable<H, M> {
    /// Creates an empty tree.
    pub fn new() -> Self {
        RadixTable {
            root: Node::new(""),
            routes: 0,
        }
    }

    /// Counts the nodes and levels of the tree.
    pub fn stats(&self) -> TreeStats {
        let (nodes, depth) = self.root.measure();
        TreeStats {
            nodes,
            depth,
            routes: self.routes,
        }
    }
}

impl<H, M> Default for RadixTable<H, M> {
    fn default() -> Self {
        RadixTable::new()
    }
}

impl<H, M> RouteTable<H, M> for RadixTable<H, M>
where
    H: Send + Sync + 'static,
    M: Send + Sync + 'static,
{
    fn insert(&mut self, route: Arc<Route<H, M>>) -> Result<(), RouteError> {
        let chunks = chunks(route.pattern().as_str(), route.pattern().segments())?;
        self.root.insert(&chunks, &route);
        self.routes += 1;
        Ok(())
    }

    fn lookup(&self, method: &http::Method, path: &str) -> Option<RouteMatch<H, M>> {
        let segments = split_path(path)?;

        // One buffer per lookup; the search binds and unbinds into it as it
        // backtracks, so it must never be shared between lookups.
        let mut params = Params::new();
        let route = self.root.find(&segments, method, &mut params)?;
        Some(RouteMatch::new(route.clone(), params))
    }

    fn candidates(&self, path: &str) -> Vec<&Arc<Route<H, M>>> {
        let mut found = vec![];
        if let Some(segments) = split_path(path) {
            self.root.collect(&segments, &mut found);
        }
        found
    }

    fn strategy(&self) -> Strategy {
        Strategy::RadixTree
    }

    fn tree_stats(&self) -> Option<TreeStats> {
        Some(self.stats())
    }
}

impl<H, M> Node<H, M> {
    fn new(label: impl Into<String>) -> Self {
        Node {
            label: label.into(),
            children: HashMap::new(),
            param: None,
            wildcard: None,
            handlers: HashMap::new(),
        }
    }

    fn insert(&mut self, chunks: &[Chunk<'_>], route: &Arc<Route<H, M>>) {
        let (chunk, rest) = match chunks.split_first() {
            Some(split) => split,
            None => {
                let method = route.method().cloned();
                if let Some(previous) = self.handlers.insert(method, route.clone()) {
                    if previous.insertion_index() != route.insertion_index() {
                        log::warn!(
                            "route {} {} replaces {} at the same tree position",
                            route.method_str(),
                            route.pattern().as_str(),
                            previous.pattern().as_str()
                        );
                    }
                }
                return;
            }
        };

        match chunk {
            Chunk::Static(label) => self
                .children
                .entry(label.clone())
                .or_insert_with(|| Node::new(label.clone()))
                .insert(rest, route),
            Chunk::Param {
                name,
                optional,
                constraint,
            } => {
                let constraint: Option<&Constraint> = *constraint;
                if *optional {
                    self.insert(rest, route);
                }
                let param = self.param.get_or_insert_with(|| {
                    Box::new(ParamChild {
                        name: (*name).to_owned(),
                        constraint: constraint.cloned(),
                        node: Node::new(format!(":{}", name)),
                    })
                });
                if param.name != *name || param.constraint.as_ref() != constraint {
                    log::warn!(
                        "parameter :{} in {} replaces :{} at the same tree position",
                        name,
                        route.pattern().as_str(),
                        param.name
                    );
                    param.name = (*name).to_owned();
                    param.constraint = constraint.cloned();
                    param.node.label = format!(":{}", name);
                }
                param.node.insert(rest, route);
            }
            Chunk::Wildcard => self
                .wildcard
                .get_or_insert_with(|| Box::new(Node::new("*")))
                .insert(rest, route),
        }
    }

    fn handler(&self, method: &http::Method) -> Option<&Arc<Route<H, M>>> {
        self.handlers
            .get(&Some(method.clone()))
            .or_else(|| self.handlers.get(&None))
    }

    fn find(
        &self,
        segments: &[&str],
        method: &http::Method,
        params: &mut Params,
    ) -> Option<&Arc<Route<H, M>>> {
        let (segment, rest) = match segments.split_first() {
            Some(split) => split,
            None => {
                if let Some(route) = self.handler(method) {
                    return Some(route);
                }
                let route = self.wildcard.as_ref()?.handler(method)?;
                params.insert("*", "");
                return Some(route);
            }
        };

        if let Some(child) = self.children.get(&segment.to_lowercase()) {
            if let Some(route) = child.find(rest, method, params) {
                return Some(route);
            }
        }

        if let Some(param) = &self.param {
            if param.accepts(segment) {
                let previous = params.insert(param.name.as_str(), *segment);
                if let Some(route) = param.node.find(rest, method, params) {
                    return Some(route);
                }
                match previous {
                    Some(value) => {
                        params.insert(param.name.as_str(), value);
                    }
                    None => params.remove(&param.name),
                }
            }
        }

        let route = self.wildcard.as_ref()?.handler(method)?;
        params.insert("*", segments.join("/"));
        Some(route)
    }

    // Every handler reachable along any branch that `find` could take.
    fn collect<'n>(&'n self, segments: &[&str], found: &mut Vec<&'n Arc<Route<H, M>>>) {
        let (segment, rest) = match segments.split_first() {
            Some(split) => split,
            None => {
                found.extend(self.handlers.values());
                if let Some(wildcard) = &self.wildcard {
                    found.extend(wildcard.handlers.values());
                }
                return;
            }
        };

        if let Some(child) = self.children.get(&segment.to_lowercase()) {
            child.collect(rest, found);
        }

        if let Some(param) = &self.param {
            if param.accepts(segment) {
                param.node.collect(rest, found);
            }
        }

        if let Some(wildcard) = &self.wildcard {
            found.extend(wildcard.handlers.values());
        }
    }

    // (nodes, depth) of the subtree rooted here.
    fn measure(&self) -> (usize, usize) {
        let children = self
            .children
            .values()
            .chain(self.param.as_ref().map(|p| &p.node))
            .chain(self.wildcard.as_deref());
        let mut nodes = 1;
        let mut depth = 0;
        for child in children {
            let (n, d) = child.measure();
            nodes += n;
            depth = depth.max(d);
        }
        (nodes, depth + 1)
    }
}

impl<H, M> ParamChild<H, M> {
    fn accepts(&self, segment: &str) -> bool {
        match &self.constraint {
            Some(constraint) => constraint.is_match(segment),
            None => !segment.is_empty(),
        }
    }
}

// Splits a request path into segments, dropping one trailing slash.
fn split_path(path: &str) -> Option<Vec<&str>> {
    let path = path.strip_prefix('/')?;
    let path = path.strip_suffix('/').unwrap_or(path);
    if path.is_empty() {
        Some(vec![])
    } else {
        Some(path.split('/').collect())
    }
}

fn chunks<'s>(pattern: &str, segments: &'s [Segment]) -> Result<Vec<Chunk<'s>>, RouteError> {
    let partial = || RouteError::PartialSegment {
        pattern: pattern.to_owned(),
    };
    let mut chunks = vec![];
    let mut text = String::new();
    let mut dynamic: Option<Chunk<'s>> = None;
    // Slashes seen so far.  The text before the first one is not a segment.
    let mut slashes = 0usize;

    for segment in segments {
        match segment {
            Segment::Static(literal) => {
                for (i, part) in literal.split('/').enumerate() {
                    if i > 0 {
                        if slashes > 0 {
                            chunks.push(
                                dynamic
                                    .take()
                                    .unwrap_or_else(|| Chunk::Static(std::mem::take(&mut text))),
                            );
                        } else if dynamic.is_some() || !text.is_empty() {
                            return Err(partial());
                        }
                        slashes += 1;
                    }
                    if !part.is_empty() {
                        if dynamic.is_some() {
                            return Err(partial());
                        }
                        text.push_str(&part.to_lowercase());
                    }
                }
            }
            Segment::Param {
                name,
                optional,
                constraint,
            } => {
                if slashes == 0 || dynamic.is_some() || !text.is_empty() {
                    return Err(partial());
                }
                dynamic = Some(Chunk::Param {
                    name,
                    optional: *optional,
                    constraint: constraint.as_ref(),
                });
            }
            Segment::Wildcard => {
                if slashes == 0 || dynamic.is_some() || !text.is_empty() {
                    return Err(partial());
                }
                dynamic = Some(Chunk::Wildcard);
            }
        }
    }

    // The root pattern, `/`, has no segments at all.
    if let Some(chunk) = dynamic {
        chunks.push(chunk);
    } else if !(text.is_empty() && chunks.is_empty()) {
        chunks.push(Chunk::Static(text));
    }

    Ok(chunks)
}

impl<H, M> std::fmt::Debug for RadixTable<H, M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RadixTable")
            .field("root", &self.root)
            .field("routes", &self.routes)
            .finish()
    }
}

impl<H, M> std::fmt::Debug for Node<H, M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut children = self.children.values().collect::<Vec<_>>();
        children.sort_by(|a, b| a.label.cmp(&b.label));
        f.debug_struct("Node")
            .field("label", &self.label)
            .field("handlers", &self.handlers.values().collect::<Vec<_>>())
            .field("children", &children)
            .field("param", &self.param.as_ref().map(|p| (&p.constraint, &p.node)))
            .field("wildcard", &self.wildcard)
            .finish()
    }
}
