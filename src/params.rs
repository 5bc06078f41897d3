use std::collections::HashMap;

/// The path parameters extracted while matching a route.
///
/// Parameters are keyed by the name given in the pattern (`:id` is keyed
/// `"id"`), and a wildcard is keyed `"*"`.  Values are the raw slices of the
/// matched path; no decoding is performed.  An optional parameter that was
/// absent from the path is absent from the map.
///
/// Every lookup builds its own `Params`, so two lookups running at the same
/// time never observe each other's bindings.
///
/// # Examples
/// ```rust
/// # fn main() -> Result<(), anyhow::Error> {
/// let mut router = underpass::router();
/// router.get("/users/:id", "show")?;
/// let found = router.lookup("GET", "/users/42").unwrap();
/// assert_eq!(found.params().get("id"), Some("42"));
/// assert_eq!(found.params().get("name"), None);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params(HashMap<String, String>);

impl Params {
    /// Creates an empty set of parameters.
    pub fn new() -> Self {
        Params(HashMap::new())
    }

    /// Returns the value bound to the given parameter name.
    pub fn get<Q>(&self, name: &Q) -> Option<&str>
    where
        Q: ?Sized + std::hash::Hash + Eq,
        String: std::borrow::Borrow<Q>,
    {
        self.0.get(name).map(String::as_str)
    }

    /// Whether or not the given parameter was bound.
    pub fn contains<Q>(&self, name: &Q) -> bool
    where
        Q: ?Sized + std::hash::Hash + Eq,
        String: std::borrow::Borrow<Q>,
    {
        self.0.contains_key(name)
    }

    /// The number of bound parameters.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether or not no parameters were bound.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over the bound `(name, value)` pairs, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Consumes the parameters, returning the underlying map.
    pub fn into_inner(self) -> HashMap<String, String> {
        self.0
    }

    pub(crate) fn insert(
        &mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Option<String> {
        self.0.insert(name.into(), value.into())
    }

    pub(crate) fn remove(&mut self, name: &str) {
        self.0.remove(name);
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Params(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl From<HashMap<String, String>> for Params {
    fn from(map: HashMap<String, String>) -> Self {
        Params(map)
    }
}
