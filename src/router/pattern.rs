use crate::{Params, RouteError};
use std::sync::Arc;

/// One piece of a parsed route pattern.
///
/// A pattern is scanned left to right into a sequence of these.  Literal
/// text (slashes included) is collected into [`Segment::Static`]; a `:name`
/// becomes a [`Segment::Param`], and a trailing `*` becomes a
/// [`Segment::Wildcard`].
#[derive(Debug, Clone)]
pub enum Segment {
    /// Literal text that must appear in the path (compared case-insensitively).
    Static(String),
    /// A named parameter, matching one path segment (or whatever its
    /// constraint allows).
    Param {
        /// The name the matched text is bound to.
        name: String,
        /// Whether the parameter may be absent (`:name?`).
        optional: bool,
        /// A custom constraint (`:name<regex>`), replacing the default
        /// `[^/]+`.
        constraint: Option<Constraint>,
    },
    /// Matches the remainder of the path, bound to `"*"`.
    Wildcard,
}

/// A custom parameter constraint: the regex body given between `<` and `>`.
#[derive(Clone)]
pub struct Constraint {
    source: Arc<str>,
    regex: regex::Regex,
}

impl Constraint {
    fn new(pattern: &str, source: &str) -> Result<Self, RouteError> {
        let regex = regex::Regex::new(&format!("(?i)^(?:{})$", source)).map_err(|source_err| {
            RouteError::InvalidConstraint {
                pattern: pattern.to_owned(),
                constraint: source.to_owned(),
                source: source_err,
            }
        })?;
        Ok(Constraint {
            source: Arc::from(source),
            regex,
        })
    }

    /// The regex body, as written in the pattern.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Whether an entire path segment satisfies this constraint.
    pub fn is_match(&self, segment: &str) -> bool {
        self.regex.is_match(segment)
    }
}

impl PartialEq for Constraint {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl std::fmt::Debug for Constraint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Constraint").field(&self.source).finish()
    }
}

/// The compiled form of a pattern: one anchored, case-insensitive regular
/// expression, along with the parameter names it captures.
#[derive(Debug, Clone)]
pub struct Matcher {
    regex: regex::Regex,
    // (parameter name, capture group index), in pattern order.
    slots: Arc<[(Arc<str>, usize)]>,
    is_static: bool,
}

impl Matcher {
    /// Get a reference to the matcher's regex.
    pub fn regex(&self) -> &regex::Regex {
        &self.regex
    }

    /// The parameter names, in the order they appear in the pattern.  A
    /// wildcard appears as `"*"`.
    pub fn param_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.slots.iter().map(|(name, _)| &**name)
    }

    /// The number of parameters (wildcard included).
    pub fn param_count(&self) -> usize {
        self.slots.len()
    }

    /// Whether the pattern has no parameters and no wildcard.
    pub fn is_static(&self) -> bool {
        self.is_static
    }

    /// Matches the full path against this pattern, returning the extracted
    /// parameters.
    pub fn captures(&self, path: &str) -> Option<Params> {
        let captures = self.regex.captures(path)?;
        let mut params = Params::new();
        for (name, index) in self.slots.iter() {
            match captures.get(*index) {
                Some(value) => {
                    params.insert(&**name, value.as_str());
                }
                None if &**name == "*" => {
                    params.insert("*", "");
                }
                None => {}
            }
        }
        Some(params)
    }
}

/// A parsed and compiled route pattern.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: Arc<str>,
    segments: Arc<[Segment]>,
    matcher: Matcher,
}

impl Pattern {
    /// Parses and compiles the given pattern.
    ///
    /// # Errors
    /// Fails if a parameter has no name, if a constraint is unbalanced or not
    /// a valid regular expression, or if anything follows a wildcard.
    ///
    /// # Examples
    /// ```rust
    /// use underpass::Pattern;
    /// let pattern = Pattern::new("/users/:id<\\d+>").unwrap();
    /// assert!(!pattern.matcher().is_static());
    /// let params = pattern.matcher().captures("/users/42/").unwrap();
    /// assert_eq!(params.get("id"), Some("42"));
    /// assert!(pattern.matcher().captures("/users/abc").is_none());
    /// assert!(Pattern::new("/users/:id<\\d+").is_err());
    /// ```
    pub fn new(pattern: &str) -> Result<Self, RouteError> {
        let trimmed = match pattern.strip_suffix('/') {
            Some(rest) if !rest.is_empty() => rest,
            _ => pattern,
        };
        let segments = parse(trimmed)?;
        let matcher = compile(trimmed, &segments)?;
        Ok(Pattern {
            source: Arc::from(trimmed),
            segments: segments.into(),
            matcher,
        })
    }

    /// The pattern as registered (with any trailing slash removed).
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// The parsed segments of the pattern.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Get a reference to the pattern's compiled matcher.
    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }
}

lazy_static::lazy_static! {
    static ref PARAM_NAME: regex::Regex = regex::Regex::new("^[A-Za-z0-9_]+").unwrap();
}

struct Lexer<'p> {
    source: &'p str,
    pos: usize,
}

impl<'p> Lexer<'p> {
    fn peek(&self) -> Option<char> {
        self.source[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.pos += c.len_utf8();
            true
        } else {
            false
        }
    }

    fn name(&mut self) -> Option<&'p str> {
        let source = self.source;
        let found = PARAM_NAME.find(&source[self.pos..])?;
        self.pos += found.end();
        Some(found.as_str())
    }

    // Expects the opening `<` to be next.  Nested `<`/`>` pairs are kept
    // balanced, and a backslash escapes the character after it.
    fn constraint(&mut self) -> Result<&'p str, RouteError> {
        let source = self.source;
        self.bump();
        let start = self.pos;
        let mut depth = 1usize;
        while let Some(c) = self.bump() {
            match c {
                '\\' => {
                    self.bump();
                }
                '<' => depth += 1,
                '>' => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(&source[start..self.pos - 1]);
                    }
                }
                _ => {}
            }
        }

        Err(RouteError::UnclosedConstraint {
            pattern: self.source.to_owned(),
        })
    }
}

fn parse(pattern: &str) -> Result<Vec<Segment>, RouteError> {
    let mut lexer = Lexer {
        source: pattern,
        pos: 0,
    };
    let mut segments = vec![];
    let mut literal = String::new();

    while let Some(c) = lexer.bump() {
        match c {
            ':' => {
                let position = lexer.pos - 1;
                let name = lexer
                    .name()
                    .ok_or_else(|| RouteError::EmptyParameterName {
                        pattern: pattern.to_owned(),
                        position,
                    })?;
                let mut optional = false;
                let mut constraint = None;
                loop {
                    if !optional && lexer.eat('?') {
                        optional = true;
                    } else if constraint.is_none() && lexer.peek() == Some('<') {
                        constraint = Some(Constraint::new(pattern, lexer.constraint()?)?);
                    } else {
                        break;
                    }
                }

                flush(&mut segments, &mut literal);
                segments.push(Segment::Param {
                    name: name.to_owned(),
                    optional,
                    constraint,
                });
            }
            '*' => {
                if lexer.peek().is_some() {
                    return Err(RouteError::WildcardNotTerminal {
                        pattern: pattern.to_owned(),
                    });
                }
                flush(&mut segments, &mut literal);
                segments.push(Segment::Wildcard);
            }
            c => literal.push(c),
        }
    }

    flush(&mut segments, &mut literal);
    Ok(segments)
}

fn flush(segments: &mut Vec<Segment>, literal: &mut String) {
    if !literal.is_empty() {
        segments.push(Segment::Static(std::mem::take(literal)));
    }
}

fn compile(pattern: &str, segments: &[Segment]) -> Result<Matcher, RouteError> {
    let mut buffer = String::with_capacity(pattern.len() + 12);
    let mut names = vec![];
    buffer.push_str("(?i)^");

    for segment in segments {
        let (name, body, optional) = match segment {
            Segment::Static(text) => {
                buffer.push_str(&regex::escape(text));
                continue;
            }
            Segment::Param {
                name,
                optional,
                constraint,
            } => (
                &name[..],
                constraint.as_ref().map_or("[^/]+", Constraint::as_str),
                *optional,
            ),
            Segment::Wildcard => ("*", ".*?", true),
        };

        let group_name = format!("__p{}", names.len());
        let group = format!("(?P<{}>{})", group_name, body);
        names.push((name, group_name));
        // An optional part takes its leading slash with it, so that
        // `/users/:id?` matches `/users` as well as `/users/7`.
        if optional && buffer.ends_with('/') {
            buffer.pop();
            buffer.push_str(&format!("(?:/{})?", group));
        } else if optional {
            buffer.push_str(&format!("{}?", group));
        } else {
            buffer.push_str(&group);
        }
    }

    buffer.push_str("/?$");

    let regex = regex::Regex::new(&buffer).map_err(|source| RouteError::InvalidConstraint {
        pattern: pattern.to_owned(),
        constraint: buffer.clone(),
        source,
    })?;
    let slots = names
        .into_iter()
        .map(|(name, group)| {
            let index = regex
                .capture_names()
                .position(|n| n == Some(group.as_str()))
                .unwrap_or(usize::MAX);
            (Arc::from(name), index)
        })
        .collect::<Arc<[_]>>();

    Ok(Matcher {
        regex,
        is_static: slots.is_empty(),
        slots,
    })
}
