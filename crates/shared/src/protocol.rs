use std::{fmt, str::FromStr, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const REFRESH_HTTP_EQUIV: &str = "Refresh";

/// Page-level navigation request, carried by a
/// `<meta http-equiv="Refresh" content="<seconds>; URL=<target>">` tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshDirective {
    pub delay_ms: u64,
    pub url: String,
}

impl RefreshDirective {
    pub fn new(url: impl Into<String>, delay: Duration) -> Self {
        Self {
            delay_ms: u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            url: url.into(),
        }
    }

    pub fn immediate(url: impl Into<String>) -> Self {
        Self::new(url, Duration::ZERO)
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    /// Value of the meta tag's `content` attribute.
    pub fn content(&self) -> String {
        let seconds = self.delay_ms as f64 / 1000.0;
        format!("{seconds}; URL={}", self.url)
    }
}

impl fmt::Display for RefreshDirective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.content())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RefreshParseError {
    #[error("refresh content has no URL part: {0}")]
    MissingUrl(String),
    #[error("refresh delay is not a number: {0}")]
    InvalidDelay(String),
}

impl FromStr for RefreshDirective {
    type Err = RefreshParseError;

    fn from_str(content: &str) -> Result<Self, Self::Err> {
        let (delay, rest) = content
            .split_once(';')
            .ok_or_else(|| RefreshParseError::MissingUrl(content.to_string()))?;
        let seconds: f64 = delay
            .trim()
            .parse()
            .map_err(|_| RefreshParseError::InvalidDelay(delay.trim().to_string()))?;
        if !seconds.is_finite() || seconds < 0.0 {
            return Err(RefreshParseError::InvalidDelay(delay.trim().to_string()));
        }
        let rest = rest.trim_start();
        let url = rest
            .get(..4)
            .filter(|prefix| prefix.eq_ignore_ascii_case("url="))
            .map(|_| &rest[4..])
            .ok_or_else(|| RefreshParseError::MissingUrl(content.to_string()))?;

        Ok(Self {
            delay_ms: (seconds * 1000.0).round() as u64,
            url: url.to_string(),
        })
    }
}
