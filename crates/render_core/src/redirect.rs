use serde::Serialize;
use shared::domain::RedirectRecord;

/// Which dialog panels are revealed for a confirm redirect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DialogPanels {
    pub prompt: bool,
    pub code: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum RedirectDecision {
    /// A normal listing page.
    NoRedirect,
    /// Nothing to show the visitor: navigate straight away.
    SilentRedirect { url: String },
    ConfirmRedirect { url: String, panels: DialogPanels },
}

impl RedirectDecision {
    pub fn classify(record: &RedirectRecord) -> Self {
        if record.redirect_url.is_empty() {
            return Self::NoRedirect;
        }

        let panels = DialogPanels {
            prompt: !record.redirect_prompt_html.is_empty(),
            code: !record.extract_code.is_empty(),
        };
        let url = record.redirect_url.clone();
        if panels.prompt || panels.code {
            Self::ConfirmRedirect { url, panels }
        } else {
            Self::SilentRedirect { url }
        }
    }

    pub fn target_url(&self) -> Option<&str> {
        match self {
            Self::NoRedirect => None,
            Self::SilentRedirect { url } | Self::ConfirmRedirect { url, .. } => Some(url),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(url: &str, prompt: &str, code: &str) -> RedirectRecord {
        RedirectRecord {
            extract_code: code.into(),
            redirect_url: url.into(),
            redirect_prompt_html: prompt.into(),
        }
    }

    #[test]
    fn empty_url_is_not_a_redirect() {
        assert_eq!(
            RedirectDecision::classify(&record("", "", "")),
            RedirectDecision::NoRedirect
        );
        assert_eq!(
            RedirectDecision::classify(&record("", "<b>copy</b>", "ABC")),
            RedirectDecision::NoRedirect
        );
    }

    #[test]
    fn url_without_prompt_or_code_is_silent() {
        assert_eq!(
            RedirectDecision::classify(&record("X", "", "")),
            RedirectDecision::SilentRedirect { url: "X".into() }
        );
    }

    #[test]
    fn code_only_shows_code_panel() {
        let decision = RedirectDecision::classify(&record("X", "", "ABC"));
        assert_eq!(
            decision,
            RedirectDecision::ConfirmRedirect {
                url: "X".into(),
                panels: DialogPanels {
                    prompt: false,
                    code: true,
                },
            }
        );
        assert_eq!(decision.target_url(), Some("X"));
    }

    #[test]
    fn prompt_only_shows_prompt_panel() {
        let decision = RedirectDecision::classify(&record("X", "请注意<b>复制提取码</b>", ""));
        assert!(matches!(
            decision,
            RedirectDecision::ConfirmRedirect {
                panels: DialogPanels {
                    prompt: true,
                    code: false
                },
                ..
            }
        ));
    }

    #[test]
    fn serializes_with_decision_tag() {
        let json = serde_json::to_value(RedirectDecision::SilentRedirect { url: "X".into() })
            .expect("json");
        assert_eq!(json["decision"], "silent_redirect");
        assert_eq!(json["url"], "X");
    }
}
