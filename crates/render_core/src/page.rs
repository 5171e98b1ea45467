//! Small page-level helpers shared by the pipeline, the dialog and the
//! behavior scripts.

use std::time::Duration;

use page_dom::Document;
use shared::protocol::{RefreshDirective, REFRESH_HTTP_EQUIV};
use tracing::{error, info};

/// Sets the document title to `"<path> - <suffix>"`.
pub fn set_page_title(document: &mut Document, path: &str, suffix: &str) {
    document.set_title(&format!("{path} - {suffix}"));
}

/// Schedules navigation by appending a refresh `<meta>` tag to the head.
pub fn redirect_to_url(document: &mut Document, url: &str, delay: Duration) -> RefreshDirective {
    let directive = RefreshDirective::new(url, delay);
    let content = directive.content();
    document.append_meta(&[("http-equiv", REFRESH_HTTP_EQUIV), ("content", &content)]);
    info!(%url, delay_ms = directive.delay_ms, "scheduled page redirect");
    directive
}

/// The first refresh directive in the document head, if any.
pub fn scheduled_redirect(document: &Document) -> Option<RefreshDirective> {
    document
        .element_children(document.head())
        .into_iter()
        .filter(|node| document.tag_name(*node) == Some("meta"))
        .find(|node| {
            document
                .attribute(*node, "http-equiv")
                .is_some_and(|value| value.eq_ignore_ascii_case(REFRESH_HTTP_EQUIV))
        })
        .and_then(|node| document.attribute(node, "content")?.parse().ok())
}

/// Applies inline styles to the first element matching `selector`.
/// A missing element is reported and otherwise ignored.
pub fn apply_styles(document: &mut Document, selector: &str, styles: &[(&str, &str)]) -> bool {
    let Some(target) = document.query_selector(selector) else {
        error!(%selector, "element not found; styles not applied");
        return false;
    };
    for (property, value) in styles {
        document.set_style(target, property, value);
    }
    true
}

/// Replaces the content of the element with id `element_id`.
pub fn insert_html(document: &mut Document, element_id: &str, html: &str) -> bool {
    let Some(target) = document.get_element_by_id(element_id) else {
        error!(id = %element_id, "target element not found; content not inserted");
        return false;
    };
    document.set_inner_html(target, html);
    true
}
