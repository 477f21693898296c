//! Splits resource URLs into the pieces the project tree is keyed on.
//!
//! Every URL maps to a partition URL (its origin, `scheme://host[:port]`), a
//! parent path inside that partition, and a file name. URLs that don't look
//! like absolute hierarchical URLs still split, just less usefully: they land
//! in the partition with an empty URL under their full text.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

lazy_static! {
    static ref ABSOLUTE_URL: Regex =
        Regex::new(r"^([A-Za-z][A-Za-z0-9+.\-]*)://([^\s/:]*)(?::(\d+))?(?:(/[^#]*)(?:#(.*))?)?$")
            .unwrap();
}

/// A structural breakdown of a URL. Construction never fails; check
/// `is_valid` before trusting any of the components.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedUrl {
    pub is_valid: bool,
    pub scheme: String,
    pub host: String,
    pub port: Option<String>,
    pub path: String,
    pub query: Option<String>,
    pub fragment: Option<String>,

    /// Everything in `path` before the last `/`.
    pub folder_path: String,

    /// Everything in `path` after the last `/`.
    pub last_path_component: String,
}

impl ParsedUrl {
    pub fn parse(url: &str) -> ParsedUrl {
        let captures = match ABSOLUTE_URL.captures(url) {
            Some(captures) => captures,
            None => return ParsedUrl::default(),
        };

        let scheme = captures[1].to_owned();
        let host = captures[2].to_owned();
        let port = captures.get(3).map(|port| port.as_str().to_owned());
        let fragment = captures.get(5).map(|fragment| fragment.as_str().to_owned());

        let mut path = captures
            .get(4)
            .map(|path| path.as_str())
            .unwrap_or("/")
            .to_owned();

        let mut query = None;
        if let Some(query_index) = path.find('?') {
            query = Some(path[query_index + 1..].to_owned());
            path.truncate(query_index);
        }

        let (folder_path, last_path_component) = match path.rfind('/') {
            Some(index) => (path[..index].to_owned(), path[index + 1..].to_owned()),
            None => (String::new(), path.clone()),
        };

        ParsedUrl {
            is_valid: true,
            scheme,
            host,
            port,
            path,
            query,
            fragment,
            folder_path,
            last_path_component,
        }
    }

    /// `host` or `host:port`, or an empty string for invalid URLs.
    pub fn host_and_port(&self) -> String {
        match &self.port {
            Some(port) => format!("{}:{}", self.host, port),
            None => self.host.clone(),
        }
    }

    /// `scheme://host[:port]`, or an empty string for invalid URLs.
    pub fn origin(&self) -> String {
        if !self.is_valid {
            return String::new();
        }

        format!("{}://{}", self.scheme, self.host_and_port())
    }
}

/// Splits a URL into `[origin, folder components..., name]`.
///
/// Empty folder components are dropped. The name carries the query string,
/// if any. The returned vector always has at least two elements.
pub fn split_url_into_path_components(url: &str) -> Vec<String> {
    let parsed = ParsedUrl::parse(url);

    let (origin, folder_path, name) = if parsed.is_valid {
        let mut name = parsed.last_path_component.clone();
        if let Some(query) = &parsed.query {
            name.push('?');
            name.push_str(query);
        }

        (parsed.origin(), parsed.folder_path, name)
    } else {
        (String::new(), String::new(), url.to_owned())
    };

    let mut components = vec![origin];
    components.extend(
        folder_path
            .split('/')
            .filter(|component| !component.is_empty())
            .map(str::to_owned),
    );
    components.push(name);

    components
}

/// The location of a URL inside the project tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UrlParts {
    pub partition_url: String,
    pub parent_path: String,
    pub name: String,
}

impl UrlParts {
    /// The path of the entry relative to its partition root.
    pub fn path(&self) -> String {
        join_path(&self.parent_path, &self.name)
    }
}

pub fn split_url(url: &str) -> UrlParts {
    let mut components = split_url_into_path_components(url);

    let name = components.pop().unwrap_or_default();
    let partition_url = if components.is_empty() {
        String::new()
    } else {
        components.remove(0)
    };

    UrlParts {
        partition_url,
        parent_path: components.join("/"),
        name,
    }
}

/// Joins a parent path and a name with `/`, skipping the separator when the
/// parent is the partition root.
pub fn join_path(parent_path: &str, name: &str) -> String {
    if parent_path.is_empty() {
        name.to_owned()
    } else {
        format!("{}/{}", parent_path, name)
    }
}
