//! Response-document repopulation engine.
//!
//! A post-render filter: given a rendered markup document plus the current
//! request's submitted values and validation errors, it locates the forms
//! that correspond to the request and rewrites each matching control so the
//! page reflects what the user actually submitted. The page author does
//! nothing special, and no templating layer is involved.
//!
//! The contract is atomic: a complete repopulated string, or the original
//! body untouched (unparsable input and documents with no matching forms
//! both pass through byte-identical).

pub mod config;
pub mod detect;
pub mod request;

mod annotate;
mod controls;
mod locate;

pub use crate::config::PopulateConfig;
pub use crate::detect::OutputMode;
pub use crate::request::RequestContext;

use log::debug;
use markup::{Dialect, Node};

/// The one capability the surrounding pipeline needs: rewrite a response
/// body against a request context.
pub trait ResponseFilter {
    fn apply(&self, body: &str, ctx: &RequestContext) -> String;
}

pub struct FormPopulationFilter {
    config: PopulateConfig,
}

impl FormPopulationFilter {
    pub fn new(config: PopulateConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PopulateConfig {
        &self.config
    }
}

impl Default for FormPopulationFilter {
    fn default() -> Self {
        Self::new(PopulateConfig::default())
    }
}

impl ResponseFilter for FormPopulationFilter {
    fn apply(&self, body: &str, ctx: &RequestContext) -> String {
        if !locate::should_populate(ctx, &self.config) {
            debug!(
                "skipping population: method {:?} not eligible and no override",
                ctx.method
            );
            return body.to_string();
        }

        let prolog = markup::xml_prolog(body);
        let tokens = markup::tokenize(body);
        let mut doc = markup::build_dom(&tokens);

        let base_href = locate::base_href_path(&doc);
        let (matched, _) = populate_forms(&mut doc, &base_href, ctx, &self.config);
        if matched == 0 {
            debug!("no form action matches {:?}; passing body through", ctx.path);
            return body.to_string();
        }
        debug!("repopulated {matched} form(s) for {:?}", ctx.path);

        let dialect = detect::dialect(self.config.force_output_mode, doc.doctype());
        let mut out = markup::serialize(&doc, dialect);
        match dialect {
            Dialect::Xhtml => {
                if self.config.cdata_fix {
                    out = markup::cdata_fix(&out);
                }
                if self.config.remove_xml_prolog && prolog.is_none() {
                    out = markup::strip_xml_prolog(&out);
                }
            }
            Dialect::Html => {
                // The parser drops processing instructions; a prolog the
                // document carried is restored at the front. Whitespace that
                // followed it survives as an ordinary text node.
                if let Some(prolog) = prolog {
                    out = format!("{prolog}{out}");
                }
            }
        }
        out
    }
}

// Every qualifying form is processed independently and completely; there is
// no first-match short-circuit. The boolean carries invalid state upward so
// implicit labels enclosing a whole form are flagged too.
fn populate_forms(
    node: &mut Node,
    base_href: &str,
    ctx: &RequestContext,
    config: &PopulateConfig,
) -> (usize, bool) {
    let mut matched = 0;
    let mut has_invalid = false;
    if node.is_element_named("form") {
        let action = node.attr_str("action").map(str::to_string);
        if let Some(action) = action {
            if locate::form_matches(base_href, &action, &ctx.path) {
                has_invalid |= controls::repopulate_form(node, ctx, config);
                matched += 1;
            } else {
                debug!("form action {action:?} does not match {:?}", ctx.path);
            }
        }
    }
    if let Some(children) = node.children_mut() {
        for child in children {
            let (m, invalid) = populate_forms(child, base_href, ctx, config);
            matched += m;
            has_invalid |= invalid;
        }
    }
    if has_invalid && annotate::is_implicit_label(node) {
        annotate::append_class(node, &config.error_class);
    }
    (matched, has_invalid)
}
