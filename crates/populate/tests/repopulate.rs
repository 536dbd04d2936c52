//! End-to-end filter behavior: parse, locate, mutate, serialize.

use std::collections::BTreeMap;

use populate::{FormPopulationFilter, PopulateConfig, RequestContext, ResponseFilter};

fn post(path: &str, params: &[(&str, &str)]) -> RequestContext {
    let mut ctx = RequestContext::new("POST", path);
    ctx.params = params
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect::<BTreeMap<_, _>>();
    ctx
}

const LOGIN_FORM: &str = "<form action=\"/login\"><input type=\"text\" name=\"user\"><input type=\"checkbox\" name=\"remember\" value=\"1\"></form>";

#[test]
fn populates_text_and_checkbox_from_submission() {
    let filter = FormPopulationFilter::default();
    let ctx = post("/login", &[("user", "alice"), ("remember", "1")]);
    let out = filter.apply(LOGIN_FORM, &ctx);
    assert!(
        out.contains("<input type=\"text\" name=\"user\" value=\"alice\">"),
        "got: {out}"
    );
    assert!(
        out.contains("<input type=\"checkbox\" name=\"remember\" value=\"1\" checked=\"checked\">"),
        "got: {out}"
    );
}

#[test]
fn flags_invalid_fields_with_the_error_class() {
    let filter = FormPopulationFilter::default();
    let mut ctx = post("/login", &[("user", "alice")]);
    ctx.invalid_fields.insert("user".to_string());
    let out = filter.apply(LOGIN_FORM, &ctx);
    assert!(
        out.contains("name=\"user\"") && out.contains("class=\"error\""),
        "got: {out}"
    );
}

#[test]
fn is_idempotent_under_reapplication() {
    let filter = FormPopulationFilter::default();
    let ctx = post("/login", &[("user", "alice"), ("remember", "1")]);
    let once = filter.apply(LOGIN_FORM, &ctx);
    let twice = filter.apply(&once, &ctx);
    assert_eq!(once, twice);
}

#[test]
fn implicit_label_enclosing_the_form_is_flagged() {
    let filter = FormPopulationFilter::default();
    let body = "<label><form action=\"/login\"><input type=\"text\" name=\"user\"></form></label>";
    let mut ctx = post("/login", &[("user", "alice")]);
    ctx.invalid_fields.insert("user".to_string());
    let out = filter.apply(body, &ctx);
    assert!(out.starts_with("<label class=\"error\">"), "got: {out}");
    assert!(out.contains("name=\"user\" class=\"error\" value=\"alice\""), "got: {out}");
}

#[test]
fn reapplication_with_errors_keeps_the_class_token_present() {
    let filter = FormPopulationFilter::default();
    let mut ctx = post("/login", &[("user", "alice")]);
    ctx.invalid_fields.insert("user".to_string());
    let once = filter.apply(LOGIN_FORM, &ctx);
    let twice = filter.apply(&once, &ctx);
    // Class tokens may accumulate; assert presence, not count.
    assert!(twice.contains("error"), "got: {twice}");
}

#[test]
fn submitted_values_survive_byte_for_byte() {
    let filter = FormPopulationFilter::default();
    let value = "weird &<>\" payload π";
    let ctx = post("/login", &[("user", value)]);
    let out = filter.apply(LOGIN_FORM, &ctx);
    let reparsed = filter.apply(&out, &ctx);
    assert_eq!(out, reparsed, "escaping must round-trip");
    assert!(
        out.contains("value=\"weird &amp;&lt;&gt;&quot; payload π\""),
        "got: {out}"
    );
}

#[test]
fn passwords_are_not_echoed_by_default() {
    let filter = FormPopulationFilter::default();
    let body = "<form action=\"/login\"><input type=\"password\" name=\"pw\" value=\"x\"></form>";
    let ctx = post("/login", &[("pw", "hunter2")]);
    let out = filter.apply(body, &ctx);
    assert!(out.contains("<input type=\"password\" name=\"pw\">"), "got: {out}");
    assert!(!out.contains("hunter2"), "got: {out}");
}

#[test]
fn array_named_controls_are_never_mutated() {
    let filter = FormPopulationFilter::default();
    let body = "<form action=\"/login\"><input type=\"text\" name=\"tags[]\" value=\"keep\"><input type=\"text\" name=\"user\"></form>";
    let ctx = post("/login", &[("tags[]", "changed"), ("user", "alice")]);
    let out = filter.apply(body, &ctx);
    assert!(out.contains("name=\"tags[]\" value=\"keep\""), "got: {out}");
    assert!(out.contains("name=\"user\" value=\"alice\""), "got: {out}");
}

#[test]
fn passes_through_byte_identical_when_no_form_matches() {
    let filter = FormPopulationFilter::default();
    let body = "<form action=\"/other\"><input type=\"text\" name=\"user\" value='single'></form>";
    let ctx = post("/login", &[("user", "alice")]);
    assert_eq!(filter.apply(body, &ctx), body);
}

#[test]
fn passes_through_when_method_is_not_eligible() {
    let filter = FormPopulationFilter::default();
    let mut ctx = post("/login", &[("user", "alice")]);
    ctx.method = "GET".to_string();
    assert_eq!(filter.apply(LOGIN_FORM, &ctx), LOGIN_FORM);
}

#[test]
fn populate_override_forces_and_suppresses() {
    let filter = FormPopulationFilter::default();

    let mut forced = post("/login", &[("user", "alice")]);
    forced.method = "GET".to_string();
    forced.populate_override = Some(true);
    assert!(filter.apply(LOGIN_FORM, &forced).contains("value=\"alice\""));

    let mut suppressed = post("/login", &[("user", "alice")]);
    suppressed.populate_override = Some(false);
    assert_eq!(filter.apply(LOGIN_FORM, &suppressed), LOGIN_FORM);
}

#[test]
fn passes_through_degenerate_markup_unchanged() {
    let filter = FormPopulationFilter::default();
    let ctx = post("/login", &[("user", "alice")]);
    for body in ["", "not markup at all", "<<<><><", "<p>no forms here</p>"] {
        assert_eq!(filter.apply(body, &ctx), body);
    }
}

#[test]
fn matches_forms_through_base_href() {
    let filter = FormPopulationFilter::default();
    let body = "<html><head><base href=\"http://example.org/app/\"></head><body>\
                <form action=\"login\"><input type=\"text\" name=\"user\"></form>\
                </body></html>";
    let ctx = post("/app/login", &[("user", "alice")]);
    let out = filter.apply(body, &ctx);
    assert!(out.contains("value=\"alice\""), "got: {out}");
}

#[test]
fn every_matching_form_is_processed() {
    let filter = FormPopulationFilter::default();
    let body = "<form action=\"/login\"><input type=\"text\" name=\"user\"></form>\
                <form action=\"/login\"><input type=\"text\" name=\"user\"></form>";
    let ctx = post("/login", &[("user", "alice")]);
    let out = filter.apply(body, &ctx);
    assert_eq!(out.matches("value=\"alice\"").count(), 2, "got: {out}");
}

const XHTML_DOC: &str = "<!DOCTYPE html PUBLIC \"-//W3C//DTD XHTML 1.0 Strict//EN\" \"http://www.w3.org/TR/xhtml1/DTD/xhtml1-strict.dtd\">\
<html><head><style type=\"text/css\">body { color: red; }</style></head>\
<body><form action=\"/login\"><input type=\"text\" name=\"user\" /></form></body></html>";

#[test]
fn xhtml_documents_serialize_strictly() {
    let filter = FormPopulationFilter::default();
    let ctx = post("/login", &[("user", "alice")]);
    let out = filter.apply(XHTML_DOC, &ctx);
    assert!(
        out.starts_with("<!DOCTYPE html PUBLIC \"-//W3C//DTD XHTML"),
        "prolog must be stripped when the original had none, got: {out}"
    );
    assert!(
        out.contains("<input type=\"text\" name=\"user\" value=\"alice\" />"),
        "got: {out}"
    );
    assert!(
        out.contains("<style type=\"text/css\"><!--/*--><![CDATA[/*><!--*/body { color: red; }/*]]>*/--></style>"),
        "got: {out}"
    );
}

#[test]
fn xhtml_pipeline_is_idempotent_under_reapplication() {
    let filter = FormPopulationFilter::default();
    let ctx = post("/login", &[("user", "alice")]);
    let once = filter.apply(XHTML_DOC, &ctx);
    let twice = filter.apply(&once, &ctx);
    assert_eq!(once, twice);
    assert_eq!(
        twice.matches("<![CDATA[").count(),
        1,
        "the style payload must keep a single CDATA section, got: {twice}"
    );
}

#[test]
fn xhtml_pipeline_is_idempotent_with_cdata_fix_disabled() {
    let config = PopulateConfig {
        cdata_fix: false,
        ..PopulateConfig::default()
    };
    let filter = FormPopulationFilter::new(config);
    let ctx = post("/login", &[("user", "alice")]);
    let once = filter.apply(XHTML_DOC, &ctx);
    let twice = filter.apply(&once, &ctx);
    assert_eq!(once, twice);
}

#[test]
fn existing_xml_prolog_is_kept() {
    let filter = FormPopulationFilter::default();
    let body = format!("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n{XHTML_DOC}");
    let ctx = post("/login", &[("user", "alice")]);
    let out = filter.apply(&body, &ctx);
    assert!(out.starts_with("<?xml"), "got: {out}");
}

#[test]
fn html_documents_keep_an_existing_xml_prolog() {
    let filter = FormPopulationFilter::default();
    let body = format!("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n{LOGIN_FORM}");
    let ctx = post("/login", &[("user", "alice")]);
    let out = filter.apply(&body, &ctx);
    assert!(
        out.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n"),
        "got: {out}"
    );
    assert!(out.contains("value=\"alice\""), "got: {out}");
    let again = filter.apply(&out, &ctx);
    assert_eq!(out, again);
}

#[test]
fn cdata_fix_can_be_disabled() {
    let config = PopulateConfig {
        cdata_fix: false,
        ..PopulateConfig::default()
    };
    let filter = FormPopulationFilter::new(config);
    let ctx = post("/login", &[("user", "alice")]);
    let out = filter.apply(XHTML_DOC, &ctx);
    assert!(
        out.contains("<style type=\"text/css\"><![CDATA[body { color: red; }]]></style>"),
        "got: {out}"
    );
}
