//! Page URL splitting and route classification.
//!
//! Each site owns an ordered [`RouteTable`]; the first route whose pattern
//! matches the URL path wins and its named groups become the route's
//! identifier fields (tree id, profile id, image share id, ...).

use std::collections::BTreeMap;

use regex::Regex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlParts {
    pub protocol: String,
    pub sub_domain: String,
    pub domain: String,
    /// Everything after the host, up to (not including) `?`.
    pub path: String,
    pub query: Option<String>,
}

impl UrlParts {
    /// `https://www.findmypast.co.uk/transcript?id=X` → sub_domain `www`,
    /// domain `findmypast.co.uk`, path `transcript`, query `id=X`.
    pub fn parse(url: &str) -> Option<UrlParts> {
        let double_slash = url.find("//")?;
        let protocol = url[..double_slash].trim_end_matches(':').to_string();
        let after_scheme = &url[double_slash + 2..];
        let slash = after_scheme.find('/')?;
        let full_domain = &after_scheme[..slash];
        let remainder = &after_scheme[slash + 1..];

        let (sub_domain, domain) = full_domain.split_once('.')?;

        let (path, query) = match remainder.split_once('?') {
            Some((path, query)) => (path.to_string(), Some(query.to_string())),
            None => (remainder.to_string(), None),
        };

        Some(UrlParts {
            protocol,
            sub_domain: sub_domain.to_string(),
            domain: domain.to_string(),
            path,
            query,
        })
    }

    pub fn host(&self) -> String {
        format!("{}.{}", self.sub_domain, self.domain)
    }

    /// Raw (still percent-encoded) value of a query parameter.
    pub fn query_param(&self, key: &str) -> Option<&str> {
        self.query
            .as_deref()?
            .split('&')
            .filter_map(|pair| pair.split_once('='))
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v)
            .filter(|v| !v.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch<K> {
    pub kind: K,
    captures: BTreeMap<String, String>,
}

impl<K> RouteMatch<K> {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.captures.get(name).map(String::as_str)
    }
}

pub struct RouteTable<K> {
    routes: Vec<(K, Regex)>,
}

impl<K: Copy> RouteTable<K> {
    /// Patterns are compiled case-insensitively. Intended for `LazyLock` statics.
    pub fn new(routes: &[(K, &str)]) -> Self {
        let routes = routes
            .iter()
            .map(|(kind, pattern)| (*kind, Regex::new(&format!("(?i){}", pattern)).unwrap()))
            .collect();
        RouteTable { routes }
    }

    /// First matching route, or `None` for an unclassifiable path.
    pub fn classify(&self, path: &str) -> Option<RouteMatch<K>> {
        self.routes.iter().find_map(|(kind, re)| {
            let caps = re.captures(path)?;
            let captures = re
                .capture_names()
                .flatten()
                .filter_map(|name| caps.name(name).map(|m| (name.to_string(), m.as_str().to_string())))
                .collect();
            Some(RouteMatch { kind: *kind, captures })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Page {
        Transcript,
        Profile,
        Share,
    }

    #[test]
    fn splits_url() {
        let parts = UrlParts::parse("https://www.findmypast.co.uk/transcript?id=BMD%2FB%2F1852&x=1").unwrap();
        assert_eq!(parts.protocol, "https");
        assert_eq!(parts.sub_domain, "www");
        assert_eq!(parts.domain, "findmypast.co.uk");
        assert_eq!(parts.path, "transcript");
        assert_eq!(parts.query_param("id"), Some("BMD%2FB%2F1852"));
        assert_eq!(parts.query_param("missing"), None);
        assert_eq!(parts.host(), "www.findmypast.co.uk");
    }

    #[test]
    fn rejects_malformed_urls() {
        assert_eq!(UrlParts::parse("not a url"), None);
        assert_eq!(UrlParts::parse("https://localhost/path"), None);
        assert_eq!(UrlParts::parse("https://www.example.com"), None);
    }

    #[test]
    fn first_matching_route_wins() {
        let table = RouteTable::new(&[
            (Page::Transcript, r"^transcript$"),
            (Page::Profile, r"^trees/(?P<tree>[a-f0-9-]+)/people/(?P<person>\d+)/facts-and-events"),
            (Page::Share, r"^image-share/(?P<share>[a-f0-9-]+)$"),
            (Page::Profile, r"^trees/"),
        ]);

        let m = table.classify("trees/918c5b61-df62/people/1181964851/facts-and-events").unwrap();
        assert_eq!(m.kind, Page::Profile);
        assert_eq!(m.get("tree"), Some("918c5b61-df62"));
        assert_eq!(m.get("person"), Some("1181964851"));

        let m = table.classify("Image-Share/1eb2fb56").unwrap();
        assert_eq!(m.kind, Page::Share);
        assert_eq!(m.get("share"), Some("1eb2fb56"));

        assert_eq!(table.classify("TRANSCRIPT").map(|m| m.kind), Some(Page::Transcript));
        assert!(table.classify("search/results").is_none());
    }
}
