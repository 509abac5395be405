use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("unsupported platform {0}")]
    UnsupportedPlatform(String),
    #[error("no checksum found for {0}")]
    MissingChecksum(String),
    #[error("checksum mismatch for {file}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        file: String,
        expected: String,
        actual: String,
    },
}

/// The published release archives and their SHA-256 digests.
#[derive(Debug, Clone, Deserialize)]
pub struct AssetTable {
    pub version: String,
    pub base_url: String,
    #[serde(default)]
    pub checksums: BTreeMap<String, String>,
}

impl AssetTable {
    pub fn checksum(&self, file: &str) -> Result<&str, AssetError> {
        self.checksums
            .get(file)
            .map(String::as_str)
            .ok_or_else(|| AssetError::MissingChecksum(file.to_string()))
    }

    pub fn url(&self, file: &str) -> String {
        format!("{}/{file}", self.base_url.trim_end_matches('/'))
    }
}

pub fn load_asset_table(path: &Path) -> Result<AssetTable, AssetError> {
    let contents = fs::read_to_string(path)?;
    Ok(toml::from_str(&contents)?)
}

/// The platform a release archive is built for, spelled the way archive
/// names spell it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetTarget {
    pub os: &'static str,
    pub libc: &'static str,
    pub arch: &'static str,
}

impl AssetTarget {
    pub fn current() -> Result<Self, AssetError> {
        let libc = if cfg!(target_env = "musl") { "musl" } else { "" };
        Self::resolve(std::env::consts::OS, libc, std::env::consts::ARCH)
    }

    /// Resolves a Rust target triple such as `aarch64-unknown-linux-musl`.
    pub fn from_triple(triple: &str) -> Result<Self, AssetError> {
        let mut parts = triple.split('-');
        let arch = parts.next().unwrap_or_default();
        let rest: Vec<&str> = parts.collect();
        let os = if rest.contains(&"linux") {
            "linux"
        } else if rest.contains(&"darwin") || rest.contains(&"apple") {
            "macos"
        } else if rest.contains(&"windows") {
            "windows"
        } else {
            return Err(AssetError::UnsupportedPlatform(triple.to_string()));
        };
        let libc = if rest.iter().any(|part| part.starts_with("musl")) {
            "musl"
        } else {
            ""
        };
        Self::resolve(os, libc, arch)
    }

    fn resolve(os: &str, libc: &'static str, arch: &str) -> Result<Self, AssetError> {
        let unsupported = || AssetError::UnsupportedPlatform(format!("{os}/{arch}"));
        let arch = arch.to_ascii_lowercase();
        let (os, arch) = match os {
            "linux" => (
                "linux",
                match arch.as_str() {
                    "x86_64" | "amd64" => "x86_64",
                    "aarch64" | "arm64" => "aarch64",
                    "i386" | "i586" | "i686" | "x86" => "i686",
                    _ => return Err(unsupported()),
                },
            ),
            "macos" => (
                "macos",
                match arch.as_str() {
                    "x86_64" | "amd64" => "x86_64",
                    "aarch64" | "arm64" => "arm64",
                    _ => return Err(unsupported()),
                },
            ),
            "windows" => (
                "windows",
                match arch.as_str() {
                    "x86_64" | "amd64" => "AMD64",
                    "aarch64" | "arm64" => "ARM64",
                    "i386" | "i586" | "i686" | "x86" => "x86",
                    _ => return Err(unsupported()),
                },
            ),
            _ => return Err(unsupported()),
        };
        let libc = if os == "linux" { libc } else { "" };
        Ok(Self { os, libc, arch })
    }

    pub fn file_name(&self, version: &str) -> String {
        if self.libc.is_empty() {
            format!("icu-{version}-{}-{}.tar.gz", self.os, self.arch)
        } else {
            format!("icu-{version}-{}-{}-{}.tar.gz", self.os, self.libc, self.arch)
        }
    }
}

pub fn sha256_file(path: &Path) -> Result<String, AssetError> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 8192];
    loop {
        let read = file.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// Checks `archive` against `expected`. A mismatching archive is deleted.
pub fn verify_checksum(archive: &Path, expected: &str) -> Result<(), AssetError> {
    let actual = sha256_file(archive)?;
    if actual == expected {
        debug!(archive = %archive.display(), "checksum verified");
        return Ok(());
    }
    warn!(archive = %archive.display(), "checksum mismatch, removing archive");
    fs::remove_file(archive)?;
    let file = archive
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| archive.display().to_string());
    Err(AssetError::ChecksumMismatch {
        file,
        expected: expected.to_string(),
        actual,
    })
}
