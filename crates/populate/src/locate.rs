//! Gating and form-to-request matching.

use markup::Node;
use url::Url;

use crate::config::PopulateConfig;
use crate::request::RequestContext;

/// An explicit override on the request wins in both directions; otherwise the
/// request method must be in the configured set.
pub(crate) fn should_populate(ctx: &RequestContext, config: &PopulateConfig) -> bool {
    match ctx.populate_override {
        Some(forced) => forced,
        None => config.methods.contains(&ctx.method),
    }
}

/// Path component of the first `<base href>` inside `<head>`, default empty.
pub(crate) fn base_href_path(doc: &Node) -> String {
    fn find_head(node: &Node) -> Option<&Node> {
        if node.is_element_named("head") {
            return Some(node);
        }
        node.children().iter().find_map(find_head)
    }

    let Some(head) = find_head(doc) else {
        return String::new();
    };
    head.children()
        .iter()
        .find_map(|child| {
            if child.is_element_named("base") {
                child.attr_str("href").map(path_component)
            } else {
                None
            }
        })
        .unwrap_or_default()
}

// Absolute URLs contribute only their path; anything unparsable as an
// absolute URL is already a path, minus query and fragment.
fn path_component(href: &str) -> String {
    match Url::parse(href) {
        Ok(url) => url.path().to_string(),
        Err(_) => {
            let end = href
                .find(['?', '#'])
                .unwrap_or(href.len());
            href[..end].to_string()
        }
    }
}

/// A form matches when any one of four path equivalences holds. This is a
/// permissive union covering common deployment variations of trailing
/// slashes and base-path prefixes.
pub(crate) fn form_matches(base_href: &str, action: &str, request_path: &str) -> bool {
    if format!("{base_href}{action}") == request_path {
        return true;
    }
    if format!("{base_href}/{action}") == request_path {
        return true;
    }
    if action.starts_with('/') && action == request_path {
        return true;
    }
    request_path.ends_with(action)
}

#[cfg(test)]
mod tests {
    use super::*;
    use markup::{build_dom, tokenize};

    fn ctx(method: &str, over: Option<bool>) -> RequestContext {
        RequestContext {
            populate_override: over,
            ..RequestContext::new(method, "/x")
        }
    }

    #[test]
    fn gating_honors_method_set_and_overrides() {
        let config = PopulateConfig::default();
        assert!(should_populate(&ctx("POST", None), &config));
        assert!(!should_populate(&ctx("GET", None), &config));
        assert!(should_populate(&ctx("GET", Some(true)), &config));
        assert!(!should_populate(&ctx("POST", Some(false)), &config));
    }

    #[test]
    fn base_href_path_reads_first_base_in_head() {
        let doc = build_dom(&tokenize(
            "<html><head><base href=\"http://example.org/app/\"></head><body></body></html>",
        ));
        assert_eq!(base_href_path(&doc), "/app/");

        let doc = build_dom(&tokenize("<head><base href=\"/app\"></head>"));
        assert_eq!(base_href_path(&doc), "/app");

        let doc = build_dom(&tokenize("<head><base href=\"/app?x=1#frag\"></head>"));
        assert_eq!(base_href_path(&doc), "/app");

        let doc = build_dom(&tokenize("<head></head>"));
        assert_eq!(base_href_path(&doc), "");
    }

    #[test]
    fn form_matching_covers_all_four_equivalences() {
        // base + action
        assert!(form_matches("/app/", "login", "/app/login"));
        // base + "/" + action
        assert!(form_matches("/app", "login", "/app/login"));
        // absolute action
        assert!(form_matches("", "/login", "/login"));
        // request path tail
        assert!(form_matches("", "module/login", "/site/module/login"));
    }

    #[test]
    fn form_matching_rejects_non_tail_overlap() {
        assert!(!form_matches("", "/login", "/login/confirm"));
        assert!(!form_matches("", "signup", "/login"));
        assert!(!form_matches("/app", "login", "/other/login2"));
    }
}
