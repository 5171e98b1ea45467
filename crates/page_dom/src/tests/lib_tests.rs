use super::*;

const SHELL: &str = r#"<!DOCTYPE html>
<html>
<head><title>Share File</title></head>
<body>
<header id="header"></header>
<nav id="nav"></nav>
<main id="file-list" class="panel"></main>
</body>
</html>"#;

#[test]
fn default_document_serializes_empty_shell() {
    assert_eq!(
        Document::new().to_html(),
        "<!DOCTYPE html><html><head></head><body></body></html>"
    );
}

#[test]
fn wraps_bare_fragments_in_html_head_and_body() {
    let doc = Document::parse(r#"<div id="x">hi</div>"#);
    assert_eq!(
        doc.to_html(),
        r#"<html><head></head><body><div id="x">hi</div></body></html>"#
    );
    assert_eq!(doc.parent(doc.get_element_by_id("x").expect("x")), Some(doc.body()));
}

#[test]
fn resolves_id_class_tag_and_descendant_selectors() {
    let mut doc = Document::parse(SHELL);
    let list = doc.query_selector("#file-list").expect("file list");
    assert_eq!(doc.tag_name(list), Some("main"));
    assert_eq!(doc.query_selector("main.panel"), Some(list));
    assert_eq!(doc.query_selector("body"), Some(doc.body()));
    assert_eq!(doc.query_selector("#missing"), None);
    assert_eq!(doc.query_selector("main > p"), None);

    doc.set_inner_html(
        list,
        r#"<div class="overlay"><p class="dialog-code">x9k2</p></div>"#,
    );
    let code = doc
        .query_selector("#file-list .dialog-code")
        .expect("nested code panel");
    assert_eq!(doc.text_content(code), "x9k2");
    assert_eq!(doc.query_selector("#nav .dialog-code"), None);
}

#[test]
fn inner_html_replaces_children() {
    let mut doc = Document::parse(SHELL);
    let header = doc.get_element_by_id("header").expect("header");
    doc.set_inner_html(header, "<h1 id=\"header-title\">old</h1>");
    doc.set_inner_html(header, "<h1>new</h1><p>x</p>");

    assert_eq!(doc.inner_html(header), "<h1>new</h1><p>x</p>");
    assert_eq!(doc.get_element_by_id("header-title"), None);
}

#[test]
fn appends_created_rows_in_order() {
    let mut doc = Document::parse(SHELL);
    let list = doc.get_element_by_id("file-list").expect("file list");
    for name in ["Kernel", "MIUI"] {
        let row = doc.create_element("tr");
        doc.add_class(row, "row");
        doc.add_class(row, "row");
        doc.set_inner_html(row, &format!("<td>{name}</td>"));
        doc.append_child(list, row);
    }

    assert_eq!(
        doc.inner_html(list),
        r#"<tr class="row"><td>Kernel</td></tr><tr class="row"><td>MIUI</td></tr>"#
    );
    assert_eq!(doc.query_selector_all(".row").len(), 2);
}

#[test]
fn inline_styles_update_in_place() {
    let mut doc = Document::parse(r#"<div class="overlay" style="color: red; display: none"></div>"#);
    let overlay = doc.query_selector(".overlay").expect("overlay");

    doc.set_style(overlay, "display", "flex");
    doc.set_style(overlay, "opacity", "1");

    assert_eq!(doc.style(overlay, "display").as_deref(), Some("flex"));
    assert_eq!(
        doc.attribute(overlay, "style"),
        Some("color: red; display: flex; opacity: 1")
    );
}

#[test]
fn title_and_meta_live_in_head() {
    let mut doc = Document::new();
    doc.set_title("/software/ - Share File");
    doc.append_meta(&[("http-equiv", "Refresh"), ("content", "0; URL=https://example.com")]);

    assert_eq!(doc.title(), "/software/ - Share File");
    assert_eq!(
        doc.inner_html(doc.head()),
        r#"<title>/software/ - Share File</title><meta http-equiv="Refresh" content="0; URL=https://example.com">"#
    );

    let mut parsed = Document::parse(SHELL);
    parsed.set_title("replaced");
    assert_eq!(parsed.title(), "replaced");
    assert_eq!(parsed.query_selector_all("title").len(), 1);
}

#[test]
fn quotes_are_escaped_when_serializing_attributes() {
    let doc = Document::parse(r#"<a title='say "hi"' href=/x>go</a>"#);
    let link = doc.query_selector("a").expect("link");
    assert_eq!(
        doc.outer_html(link),
        r#"<a title="say &quot;hi&quot;" href="/x">go</a>"#
    );
}

#[test]
fn recorded_history_counts_back_steps() {
    let history = RecordedHistory::new();
    history.back();
    history.back();
    assert_eq!(history.back_steps(), 2);
}
