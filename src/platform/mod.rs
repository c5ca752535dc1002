//! Host platform detection.
//!
//! The `User-Agent` header depends on whether the process runs on a mobile
//! OS. Detection sits behind [`PlatformInfo`] so callers and tests can pin
//! the category instead of depending on the build target.

/// Coarse platform family used for the `User-Agent` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformCategory {
    /// Android or iOS.
    Mobile,
    Other,
}

impl PlatformCategory {
    pub fn user_agent(self) -> String {
        let family = match self {
            PlatformCategory::Mobile => "mobile",
            PlatformCategory::Other => "other",
        };
        format!("httpcall/{} ({})", env!("CARGO_PKG_VERSION"), family)
    }
}

#[cfg_attr(test, mockall::automock)]
pub trait PlatformInfo: Send + Sync {
    fn category(&self) -> PlatformCategory;
}

/// Reports the platform the crate was compiled for.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostPlatform;

impl PlatformInfo for HostPlatform {
    fn category(&self) -> PlatformCategory {
        if cfg!(any(target_os = "android", target_os = "ios")) {
            PlatformCategory::Mobile
        } else {
            PlatformCategory::Other
        }
    }
}

/// A fixed answer, for callers that know better than the build target.
#[derive(Debug, Clone, Copy)]
pub struct FixedPlatform(pub PlatformCategory);

impl PlatformInfo for FixedPlatform {
    fn category(&self) -> PlatformCategory {
        self.0
    }
}
