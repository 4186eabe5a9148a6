//! User-agent classification for the open-app flow.
//!
//! The same signature tables feed the inline browser script, so the server
//! and the page agree on what counts as iOS, Android or an in-app browser.

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use strum::{AsRefStr, Display};

/// Case-sensitive iOS device tokens.
pub const IOS_SIGNATURES: &[&str] = &["iPad", "iPhone", "iPod"];

/// Case-sensitive Android token.
pub const ANDROID_SIGNATURES: &[&str] = &["Android"];

/// Case-insensitive markers of embedded webviews inside social apps.
pub const IN_APP_SIGNATURES: &[&str] = &[
    "FBAN",
    "FBAV",
    "Instagram",
    "Line",
    "Twitter",
    "WhatsApp",
    "WeChat",
    "LinkedIn",
    "Messenger",
];

static IOS_RE: Lazy<Regex> = Lazy::new(|| signature_regex(IOS_SIGNATURES, false));
static ANDROID_RE: Lazy<Regex> = Lazy::new(|| signature_regex(ANDROID_SIGNATURES, false));
static IN_APP_RE: Lazy<Regex> = Lazy::new(|| signature_regex(IN_APP_SIGNATURES, true));

fn signature_regex(tokens: &[&str], case_insensitive: bool) -> Regex {
    RegexBuilder::new(&alternation(tokens))
        .case_insensitive(case_insensitive)
        .build()
        .expect("signature tables are literal tokens")
}

/// `a|b|c` with every token escaped. Valid both as a Rust regex and as the
/// body of a JavaScript regex literal.
pub fn alternation(tokens: &[&str]) -> String {
    tokens
        .iter()
        .map(|t| regex::escape(t))
        .collect::<Vec<_>>()
        .join("|")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum Platform {
    Ios,
    Android,
    Desktop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub platform: Platform,
    pub in_app_browser: bool,
}

/// Classify a user-agent string. iOS wins over Android when both match.
pub fn classify(user_agent: &str) -> Classification {
    let platform = if IOS_RE.is_match(user_agent) {
        Platform::Ios
    } else if ANDROID_RE.is_match(user_agent) {
        Platform::Android
    } else {
        Platform::Desktop
    };

    Classification {
        platform,
        in_app_browser: IN_APP_RE.is_match(user_agent),
    }
}
