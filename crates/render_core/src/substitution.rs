use shared::domain::Record;

const TOKEN_OPEN: &str = "${";
const TOKEN_CLOSE: char = '}';

/// Replaces every `${<namespace>.<field>}` token in `template` with the
/// record's field value.
///
/// Fields the record lacks render as empty text. Values are inserted as-is and
/// never scanned again, so a value that itself looks like a token stays
/// literal. Tokens under another namespace, or without a field name, are
/// copied through unchanged.
pub fn substitute(template: &str, namespace: &str, record: &Record) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find(TOKEN_OPEN) {
        out.push_str(&rest[..start]);
        let after_open = &rest[start + TOKEN_OPEN.len()..];

        let Some(close) = after_open.find(TOKEN_CLOSE) else {
            out.push_str(&rest[start..]);
            return out;
        };

        let inner = &after_open[..close];
        let field = inner
            .strip_prefix(namespace)
            .and_then(|tail| tail.strip_prefix('.'))
            .filter(|field| !field.is_empty());

        match field {
            Some(field) => out.push_str(record.get(field).unwrap_or_default()),
            None => {
                // Keep the opening marker and rescan right after it, so a
                // real token nested in an unrelated one is still found.
                out.push_str(TOKEN_OPEN);
                rest = after_open;
                continue;
            }
        }
        rest = &after_open[close + TOKEN_CLOSE.len_utf8()..];
    }

    out.push_str(rest);
    out
}
