//! User-agent heuristics for the device panel.
//!
//! Plain substring checks, not a user-agent parser.

const UNKNOWN: &str = "Unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceProfile {
    pub device_type: &'static str,
    pub os: &'static str,
    pub browser: &'static str,
}

impl DeviceProfile {
    pub const UNKNOWN: DeviceProfile = DeviceProfile {
        device_type: UNKNOWN,
        os: UNKNOWN,
        browser: UNKNOWN,
    };
}

/// Infer device type, OS and browser from a user-agent string.
pub fn infer(user_agent: Option<&str>) -> DeviceProfile {
    let Some(ua) = user_agent.map(str::trim).filter(|ua| !ua.is_empty()) else {
        return DeviceProfile::UNKNOWN;
    };

    let device_type = if ua.contains("Mobile") {
        "Mobile"
    } else {
        "Desktop"
    };

    let os = if ua.contains("Macintosh") {
        "macOS"
    } else if ua.contains("Windows") {
        "Windows"
    } else if ua.contains("Linux") {
        "Linux"
    } else {
        UNKNOWN
    };

    // Chrome user agents also mention Safari.
    let browser = if ua.contains("Chrome") {
        "Chrome"
    } else if ua.contains("Safari") {
        "Safari"
    } else if ua.contains("Firefox") {
        "Firefox"
    } else {
        UNKNOWN
    };

    DeviceProfile {
        device_type,
        os,
        browser,
    }
}
