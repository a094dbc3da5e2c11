//! Route registry and path matching.
//!
//! Patterns are `/`-separated segments: literals, `{name}` for one segment and
//! `{name+}` (last segment only) for the rest of the path.

use crate::domain::model::Method;
use crate::domain::ports::Handler;
use crate::utils::error::{ApiError, Result};
use crate::utils::validation::validate_route_path;
use percent_encoding::percent_decode_str;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
    Greedy(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    raw: String,
    segments: Vec<Segment>,
}

impl PathPattern {
    pub fn parse(path: &str) -> Result<Self> {
        validate_route_path("path", path).map_err(|e| ApiError::RouteError {
            path: path.to_string(),
            reason: e.to_string(),
        })?;

        let parts = split_path(path);
        let mut segments = Vec::with_capacity(parts.len());

        for (i, part) in parts.iter().enumerate() {
            let segment = match part.strip_prefix('{').and_then(|p| p.strip_suffix('}')) {
                Some(inner) => {
                    let (name, greedy) = match inner.strip_suffix('+') {
                        Some(name) => (name, true),
                        None => (inner, false),
                    };
                    if name.is_empty() || name.contains(['{', '}', '+']) {
                        return Err(route_error(path, format!("invalid parameter '{}'", part)));
                    }
                    if greedy && i + 1 != parts.len() {
                        return Err(route_error(
                            path,
                            "greedy parameter must be the last segment".to_string(),
                        ));
                    }
                    if greedy {
                        Segment::Greedy(name.to_string())
                    } else {
                        Segment::Param(name.to_string())
                    }
                }
                None if part.contains(['{', '}']) => {
                    return Err(route_error(path, format!("malformed segment '{}'", part)));
                }
                None => Segment::Literal(part.to_string()),
            };
            segments.push(segment);
        }

        Ok(Self {
            raw: format!("/{}", parts.join("/")),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// 比對成功時回傳 path 參數
    pub fn matches(&self, path: &str) -> Option<HashMap<String, String>> {
        let parts = split_path(path);
        let mut params = HashMap::new();

        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Literal(literal) => {
                    if parts.get(i) != Some(&literal.as_str()) {
                        return None;
                    }
                }
                Segment::Param(name) => {
                    let value = parts.get(i)?;
                    params.insert(name.clone(), decode_param(value));
                }
                Segment::Greedy(name) => {
                    if i >= parts.len() {
                        return None;
                    }
                    params.insert(name.clone(), decode_param(&parts[i..].join("/")));
                    return Some(params);
                }
            }
        }

        (parts.len() == self.segments.len()).then_some(params)
    }

    // 越小越優先：沒有 greedy 的先，再來 literal 越多越先
    fn specificity(&self) -> (bool, std::cmp::Reverse<usize>) {
        let greedy = matches!(self.segments.last(), Some(Segment::Greedy(_)));
        let literals = self
            .segments
            .iter()
            .filter(|s| matches!(s, Segment::Literal(_)))
            .count();
        (greedy, std::cmp::Reverse(literals))
    }
}

// literal 以原始字串比對，參數值才做 percent-decode
fn decode_param(raw: &str) -> String {
    percent_decode_str(raw).decode_utf8_lossy().into_owned()
}

fn route_error(path: &str, reason: String) -> ApiError {
    ApiError::RouteError {
        path: path.to_string(),
        reason,
    }
}

/// 去掉空段，所以 `/a/`、`/a//` 都等同 `/a`
pub fn split_path(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

struct RouteEntry {
    pattern: PathPattern,
    handlers: BTreeMap<Method, Arc<dyn Handler>>,
}

pub enum Resolution {
    Matched {
        handler: Arc<dyn Handler>,
        /// 實際對應到的 method (HEAD 走 GET 時為 GET)
        method: Method,
        path_params: HashMap<String, String>,
        pattern: String,
    },
    MethodNotAllowed {
        allowed: Vec<Method>,
    },
    NotFound,
}

impl fmt::Debug for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolution::Matched {
                method,
                path_params,
                pattern,
                ..
            } => f
                .debug_struct("Matched")
                .field("method", method)
                .field("pattern", pattern)
                .field("path_params", path_params)
                .finish_non_exhaustive(),
            Resolution::MethodNotAllowed { allowed } => f
                .debug_struct("MethodNotAllowed")
                .field("allowed", allowed)
                .finish(),
            Resolution::NotFound => f.write_str("NotFound"),
        }
    }
}

#[derive(Default)]
pub struct Router {
    routes: Vec<RouteEntry>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// 註冊路由；同一個 path pattern 可分多次註冊不同 method
    pub fn route<H>(&mut self, path: &str, methods: &[Method], handler: H) -> Result<&mut Self>
    where
        H: Handler + 'static,
    {
        if methods.is_empty() {
            return Err(route_error(path, "at least one method is required".to_string()));
        }

        let pattern = PathPattern::parse(path)?;
        let handler: Arc<dyn Handler> = Arc::new(handler);

        let index = match self.routes.iter().position(|r| r.pattern == pattern) {
            Some(index) => index,
            None => {
                self.routes.push(RouteEntry {
                    pattern,
                    handlers: BTreeMap::new(),
                });
                self.routes.len() - 1
            }
        };
        let entry = &mut self.routes[index];

        for method in methods {
            if entry.handlers.contains_key(method) {
                return Err(route_error(
                    path,
                    format!("{} is already registered", method),
                ));
            }
        }
        for method in methods {
            entry.handlers.insert(*method, Arc::clone(&handler));
        }

        tracing::debug!("Registered route {} {:?}", entry.pattern.as_str(), methods);
        Ok(self)
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn resolve(&self, method: Method, path: &str) -> Resolution {
        let candidates = self.candidates(path);
        if candidates.is_empty() {
            return Resolution::NotFound;
        }

        for (entry, params) in &candidates {
            let handler = entry.handlers.get(&method).map(|h| (method, h)).or_else(|| {
                // HEAD 沒有明確註冊時沿用 GET
                (method == Method::Head)
                    .then(|| entry.handlers.get(&Method::Get))
                    .flatten()
                    .map(|h| (Method::Get, h))
            });
            if let Some((matched, handler)) = handler {
                return Resolution::Matched {
                    handler: Arc::clone(handler),
                    method: matched,
                    path_params: params.clone(),
                    pattern: entry.pattern.as_str().to_string(),
                };
            }
        }

        Resolution::MethodNotAllowed {
            allowed: collect_methods(&candidates),
        }
    }

    /// path 對應到的所有 method；找不到路由時回傳 None
    pub fn allowed_methods(&self, path: &str) -> Option<Vec<Method>> {
        let candidates = self.candidates(path);
        (!candidates.is_empty()).then(|| collect_methods(&candidates))
    }

    fn candidates(&self, path: &str) -> Vec<(&RouteEntry, HashMap<String, String>)> {
        let mut matched: Vec<(usize, &RouteEntry, HashMap<String, String>)> = self
            .routes
            .iter()
            .enumerate()
            .filter_map(|(i, entry)| entry.pattern.matches(path).map(|p| (i, entry, p)))
            .collect();

        matched.sort_by_key(|(i, entry, _)| (entry.pattern.specificity(), *i));
        matched.into_iter().map(|(_, e, p)| (e, p)).collect()
    }
}

fn collect_methods(candidates: &[(&RouteEntry, HashMap<String, String>)]) -> Vec<Method> {
    let mut methods: BTreeSet<Method> = candidates
        .iter()
        .flat_map(|(entry, _)| entry.handlers.keys().copied())
        .collect();
    if methods.contains(&Method::Get) {
        methods.insert(Method::Head);
    }
    methods.into_iter().collect()
}
