use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectorError {
    #[error("empty selector")]
    Empty,
    #[error("unsupported selector syntax in '{selector}' at '{at}'")]
    Unsupported { selector: String, at: char },
}

/// One `tag#id.class` unit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Compound {
    pub tag: Option<String>,
    pub id: Option<String>,
    pub classes: Vec<String>,
}

impl Compound {
    pub(crate) fn matches(&self, tag: &str, id: Option<&str>, classes: &[&str]) -> bool {
        if let Some(expected) = &self.tag {
            if expected != tag {
                return false;
            }
        }
        if let Some(expected) = &self.id {
            if id != Some(expected.as_str()) {
                return false;
            }
        }
        self.classes
            .iter()
            .all(|class| classes.contains(&class.as_str()))
    }
}

/// Compound selectors joined by the descendant combinator (whitespace).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    pub(crate) parts: Vec<Compound>,
}

impl Selector {
    pub fn parse(selector: &str) -> Result<Self, SelectorError> {
        let parts = selector
            .split_whitespace()
            .map(|part| parse_compound(selector, part))
            .collect::<Result<Vec<_>, _>>()?;
        if parts.is_empty() {
            return Err(SelectorError::Empty);
        }
        Ok(Self { parts })
    }

    pub fn parts(&self) -> &[Compound] {
        &self.parts
    }
}

fn is_ident_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '-' || ch == '_'
}

fn parse_compound(selector: &str, part: &str) -> Result<Compound, SelectorError> {
    let mut compound = Compound::default();
    let mut chars = part.char_indices().peekable();

    let tag_end = part.find(|ch: char| !is_ident_char(ch)).unwrap_or(part.len());
    if part.starts_with('*') {
        chars.next();
    } else if tag_end > 0 {
        compound.tag = Some(part[..tag_end].to_ascii_lowercase());
        while chars.peek().is_some_and(|(idx, _)| *idx < tag_end) {
            chars.next();
        }
    }

    while let Some((idx, marker)) = chars.next() {
        let start = idx + marker.len_utf8();
        let end = part[start..]
            .find(|ch: char| !is_ident_char(ch))
            .map_or(part.len(), |offset| start + offset);
        let name = &part[start..end];
        if name.is_empty() {
            return Err(SelectorError::Unsupported {
                selector: selector.to_string(),
                at: marker,
            });
        }
        match marker {
            '#' if compound.id.is_none() => compound.id = Some(name.to_string()),
            '.' => compound.classes.push(name.to_string()),
            other => {
                return Err(SelectorError::Unsupported {
                    selector: selector.to_string(),
                    at: other,
                })
            }
        }
        while chars.peek().is_some_and(|(next, _)| *next < end) {
            chars.next();
        }
    }

    Ok(compound)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_compound_and_descendant_selectors() {
        let selector = Selector::parse("table#files .row.dir").expect("selector");
        assert_eq!(
            selector.parts(),
            &[
                Compound {
                    tag: Some("table".into()),
                    id: Some("files".into()),
                    classes: vec![],
                },
                Compound {
                    tag: None,
                    id: None,
                    classes: vec!["row".into(), "dir".into()],
                },
            ]
        );
    }

    #[test]
    fn rejects_unsupported_syntax() {
        assert_eq!(Selector::parse("   "), Err(SelectorError::Empty));
        assert!(matches!(
            Selector::parse("a > b"),
            Err(SelectorError::Unsupported { at: '>', .. })
        ));
        assert!(matches!(
            Selector::parse("meta[http-equiv]"),
            Err(SelectorError::Unsupported { at: '[', .. })
        ));
        assert!(matches!(
            Selector::parse("#a#b"),
            Err(SelectorError::Unsupported { at: '#', .. })
        ));
    }
}
