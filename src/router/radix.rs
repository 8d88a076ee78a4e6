//! Radix tree implementation for HTTP route matching
//!
//! Paths are split into segments; each node represents one segment:
//! - Static segments (e.g., `items`) match exactly
//! - Parameter segments (e.g., `{id}`) match any single segment
//! - Routes are stored at terminal nodes, keyed by HTTP method
//!
//! Static children are tried before parameter children, and a failed parameter branch is
//! backtracked, so `/items/new` and `/items/{id}` coexist.
//!
//! Captured parameters are returned in path order. The binder visits them in that order, which
//! keeps error maps and span attributes deterministic.

use http::Method;
use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::Arc;

use super::core::{ParamVec, RouteMeta};

/// Node in the radix tree
#[derive(Clone)]
struct RadixNode {
    /// The path segment this node represents (without leading /)
    segment: Cow<'static, str>,
    /// Route metadata per HTTP method, if this node terminates a route
    routes: HashMap<Method, Arc<RouteMeta>>,
    /// Parameter name if this segment is a path parameter (e.g., "{id}" -> Some("id"))
    param_name: Option<Arc<str>>,
    /// Child nodes for static segments
    children: Vec<RadixNode>,
    /// Parameter children. Several are kept so that `/users/{id}/posts` and
    /// `/users/{user_id}/comments` each report their own parameter name.
    param_children: Vec<RadixNode>,
}

impl RadixNode {
    fn new(segment: Cow<'static, str>) -> Self {
        Self {
            segment,
            routes: HashMap::new(),
            param_name: None,
            children: Vec::new(),
            param_children: Vec::new(),
        }
    }

    fn new_param(param_name: Arc<str>) -> Self {
        Self {
            segment: Cow::Borrowed(""),
            routes: HashMap::new(),
            param_name: Some(param_name),
            children: Vec::new(),
            param_children: Vec::new(),
        }
    }

    /// Insert a route into the tree
    fn insert(&mut self, segments: &[&str], method: Method, route: Arc<RouteMeta>) {
        let Some((segment, remaining)) = segments.split_first() else {
            self.routes.insert(method, route);
            return;
        };

        if segment.starts_with('{') && segment.ends_with('}') {
            let param_name = segment.trim_start_matches('{').trim_end_matches('}');

            for param_child in &mut self.param_children {
                if param_child.param_name.as_deref() == Some(param_name) {
                    param_child.insert(remaining, method, route);
                    return;
                }
            }

            let mut new_param_child = RadixNode::new_param(Arc::from(param_name));
            new_param_child.insert(remaining, method, route);
            self.param_children.push(new_param_child);
            return;
        }

        for child in &mut self.children {
            if child.segment == *segment {
                child.insert(remaining, method, route);
                return;
            }
        }

        let mut new_child = RadixNode::new(Cow::Owned((*segment).to_string()));
        new_child.insert(remaining, method, route);
        self.children.push(new_child);
    }

    /// Search for a matching route, pushing captured parameters onto `params`
    fn search(
        &self,
        segments: &[&str],
        method: &Method,
        params: &mut ParamVec,
    ) -> Option<Arc<RouteMeta>> {
        let Some((segment, remaining)) = segments.split_first() else {
            return self.routes.get(method).cloned();
        };

        for child in &self.children {
            if child.segment == *segment {
                if let Some(route) = child.search(remaining, method, params) {
                    return Some(route);
                }
            }
        }

        for param_child in &self.param_children {
            if let Some(param_name) = &param_child.param_name {
                params.push((Arc::clone(param_name), (*segment).to_string()));
                if let Some(route) = param_child.search(remaining, method, params) {
                    return Some(route);
                }
                // Backtrack
                params.pop();
            }
        }

        None
    }
}

fn split_segments(path: &str) -> Vec<&str> {
    path.trim_start_matches('/')
        .split('/')
        .filter(|s| !s.is_empty())
        .collect()
}

/// Radix tree-based route table
#[derive(Clone)]
pub(crate) struct RadixRouter {
    root: RadixNode,
}

impl RadixRouter {
    pub(crate) fn new() -> Self {
        Self {
            root: RadixNode::new(Cow::Borrowed("")),
        }
    }

    pub(crate) fn insert(&mut self, route: Arc<RouteMeta>) {
        let pattern = route.path_pattern.clone();
        let segments = split_segments(&pattern);
        let method = route.method.clone();
        self.root.insert(&segments, method, route);
    }

    /// Match `method` and `path`, returning the route and its parameters in path order
    pub(crate) fn route(&self, method: &Method, path: &str) -> Option<(Arc<RouteMeta>, ParamVec)> {
        let segments = split_segments(path);
        let mut params = ParamVec::new();
        let route = self.root.search(&segments, method, &mut params)?;
        Some((route, params))
    }
}
