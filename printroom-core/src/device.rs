//! Device classification from the requesting client's user-agent string.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

/// Mobile markers, shared with the script embedded in the spawned window.
pub const MOBILE_UA_PATTERN: &str = "android|ipad|iphone|ipod|windows phone";

static MOBILE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!("(?i){MOBILE_UA_PATTERN}")).expect("mobile user-agent pattern is valid")
});

static IOS_DEVICE: Lazy<Regex> =
    Lazy::new(|| Regex::new("iPad|iPhone|iPod").expect("iOS user-agent pattern is valid"));

static LEGACY_MS: Lazy<Regex> =
    Lazy::new(|| Regex::new("MSIE|Trident|Edge").expect("legacy browser pattern is valid"));

pub fn is_mobile(user_agent: &str) -> bool {
    MOBILE.is_match(user_agent)
}

/// iPad/iPhone/iPod that is not an old Microsoft browser spoofing one.
pub fn is_ios_safari(user_agent: &str) -> bool {
    IOS_DEVICE.is_match(user_agent)
        && !LEGACY_MS.is_match(user_agent)
        && !user_agent.contains("MSStream")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceClass {
    /// Native print can be scoped to the surface directly.
    Desktop,
    /// Print goes through a spawned window.
    Mobile,
}

impl fmt::Display for DeviceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceClass::Desktop => f.write_str("desktop"),
            DeviceClass::Mobile => f.write_str("mobile"),
        }
    }
}

pub fn classify(user_agent: &str) -> DeviceClass {
    if is_mobile(user_agent) || is_ios_safari(user_agent) {
        DeviceClass::Mobile
    } else {
        DeviceClass::Desktop
    }
}
