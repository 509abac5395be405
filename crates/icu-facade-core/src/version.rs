use std::fmt;

/// Release of the ICU4X data and algorithms linked into this build.
const ICU_VERSION: VersionInfo = VersionInfo {
    major: 1,
    minor: 5,
    patch: 0,
    build: 0,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VersionInfo {
    pub major: u8,
    pub minor: u8,
    pub patch: u8,
    pub build: u8,
}

impl fmt::Display for VersionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if self.build != 0 {
            write!(f, ".{}", self.build)?;
        }
        Ok(())
    }
}

impl From<VersionInfo> for (u8, u8, u8, u8) {
    fn from(info: VersionInfo) -> Self {
        (info.major, info.minor, info.patch, info.build)
    }
}

pub fn icu_version() -> String {
    ICU_VERSION.to_string()
}

pub fn icu_version_info() -> VersionInfo {
    ICU_VERSION
}
