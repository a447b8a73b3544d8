//! # pdfium-fetch
//!
//! Resolve a [PDFium](https://pdfium.googlesource.com/pdfium/) shared library
//! for `pdfium-render`, pinned to a single release of
//! [bblanchon/pdfium-binaries](https://github.com/bblanchon/pdfium-binaries).
//!
//! The caller decides *where* the library comes from (a release URL, or a
//! local directory); this crate does the mechanical part:
//!
//! 1. `PDFIUM_LIB_PATH` wins when it points to an existing file.
//! 2. Otherwise the per-version cache directory is checked.
//! 3. Otherwise the release archive is downloaded from the given URL, the
//!    platform library is extracted into the cache, and a `VERSION` marker is
//!    written next to it.
//!
//! ```rust,no_run
//! use pdfium_fetch::{bind, current_platform, fetch_library, PDFIUM_VERSION};
//!
//! let platform = current_platform().expect("supported platform");
//! let url = format!(
//!     "https://github.com/bblanchon/pdfium-binaries/releases/download/chromium%2F{}/{}",
//!     PDFIUM_VERSION, platform.archive_name
//! );
//! let path = fetch_library(&url, PDFIUM_VERSION, None).expect("download failed");
//! let pdfium = bind(&path).expect("bind failed");
//! ```
//!
//! ## Environment variable overrides
//!
//! - `PDFIUM_LIB_PATH` — path to an existing pdfium library; skips download.
//! - `PDF2IMG_CACHE_DIR` — override the default cache directory.

use std::io::Read;
use std::path::{Path, PathBuf};

use pdfium_render::prelude::Pdfium;
use thiserror::Error;
use tracing::{debug, info, warn};

// ── Public constants ─────────────────────────────────────────────────────────

/// The pdfium-binaries release this crate's bindings are built against.
///
/// Maps to [`chromium/7690`](https://github.com/bblanchon/pdfium-binaries/releases/tag/chromium%2F7690).
pub const PDFIUM_VERSION: &str = "7690";

/// Name of the marker file recording which release a cached library came from.
pub const VERSION_MARKER: &str = "VERSION";

/// Download progress sink: `(bytes_downloaded, total_bytes)`.
pub type ProgressFn<'a> = &'a (dyn Fn(u64, Option<u64>) + Send + Sync);

// ── Error type ───────────────────────────────────────────────────────────────

/// Errors returned while locating, downloading or binding PDFium.
#[derive(Error, Debug)]
pub enum FetchError {
    /// No release archive is published for this OS/architecture.
    #[error("Unsupported platform: {os}/{arch}")]
    UnsupportedPlatform { os: String, arch: String },

    /// Could not create the local cache directory or write into it.
    #[error("Cache directory error: {0}")]
    CacheDir(#[source] std::io::Error),

    /// Network download failed.
    #[error("Download failed: {0}")]
    Download(String),

    /// gzip/tar extraction failed.
    #[error("Archive extraction failed: {0}")]
    Extract(String),

    /// `pdfium-render` could not load the library.
    #[error("Failed to bind PDFium from '{path}': {reason}")]
    Bind { path: PathBuf, reason: String },
}

// ── Platform metadata ────────────────────────────────────────────────────────

/// Release asset layout for one OS/architecture pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Platform {
    /// Asset filename in the GitHub release, e.g. `pdfium-linux-x64.tgz`.
    pub archive_name: &'static str,
    /// Relative path inside the archive, e.g. `lib/libpdfium.so`.
    pub lib_path_in_archive: &'static str,
    /// Filename written on disk, e.g. `libpdfium.so`.
    pub lib_name: &'static str,
}

const fn layout(archive_name: &'static str, lib_name: &'static str, in_archive: &'static str) -> Platform {
    Platform {
        archive_name,
        lib_path_in_archive: in_archive,
        lib_name,
    }
}

static PLATFORMS: &[(&str, &str, Platform)] = &[
    ("macos", "aarch64", layout("pdfium-mac-arm64.tgz", "libpdfium.dylib", "lib/libpdfium.dylib")),
    ("macos", "x86_64", layout("pdfium-mac-x64.tgz", "libpdfium.dylib", "lib/libpdfium.dylib")),
    ("linux", "x86_64", layout("pdfium-linux-x64.tgz", "libpdfium.so", "lib/libpdfium.so")),
    ("linux", "aarch64", layout("pdfium-linux-arm64.tgz", "libpdfium.so", "lib/libpdfium.so")),
    ("windows", "x86_64", layout("pdfium-win-x64.tgz", "pdfium.dll", "bin/pdfium.dll")),
    ("windows", "aarch64", layout("pdfium-win-arm64.tgz", "pdfium.dll", "bin/pdfium.dll")),
    ("windows", "x86", layout("pdfium-win-x86.tgz", "pdfium.dll", "bin/pdfium.dll")),
];

/// Look up the release layout for an explicit OS/architecture pair.
pub fn platform_for(os: &str, arch: &str) -> Result<&'static Platform, FetchError> {
    PLATFORMS
        .iter()
        .find(|(o, a, _)| *o == os && *a == arch)
        .map(|(_, _, p)| p)
        .ok_or_else(|| FetchError::UnsupportedPlatform {
            os: os.to_string(),
            arch: arch.to_string(),
        })
}

/// Release layout for the platform this binary was compiled for.
pub fn current_platform() -> Result<&'static Platform, FetchError> {
    platform_for(std::env::consts::OS, std::env::consts::ARCH)
}

// ── Locations ────────────────────────────────────────────────────────────────

/// Per-release cache directory.
///
/// Defaults to `<os cache dir>/pdf2img/pdfium-{version}/`; override the base
/// with `PDF2IMG_CACHE_DIR`.
pub fn cache_dir(version: &str) -> PathBuf {
    if let Ok(override_dir) = std::env::var("PDF2IMG_CACHE_DIR") {
        return PathBuf::from(override_dir).join(format!("pdfium-{version}"));
    }

    let base = dirs::cache_dir()
        .or_else(|| dirs::home_dir().map(|h| h.join(".cache")))
        .unwrap_or_else(std::env::temp_dir);

    base.join("pdf2img").join(format!("pdfium-{version}"))
}

/// `PDFIUM_LIB_PATH`, when it is set and the file exists.
pub fn env_library_override() -> Option<PathBuf> {
    let path = PathBuf::from(std::env::var_os("PDFIUM_LIB_PATH")?);
    if path.exists() {
        Some(path)
    } else {
        warn!(
            "PDFIUM_LIB_PATH '{}' does not exist; ignoring it",
            path.display()
        );
        None
    }
}

/// Platform library filename inside `dir`, e.g. `./libpdfium.so`.
pub fn local_library(dir: &Path) -> PathBuf {
    use std::env::consts::{DLL_PREFIX, DLL_SUFFIX};
    dir.join(format!("{DLL_PREFIX}pdfium{DLL_SUFFIX}"))
}

/// Returns `true` when [`fetch_library`] would not touch the network.
pub fn is_cached(version: &str) -> bool {
    if env_library_override().is_some() {
        return true;
    }
    current_platform()
        .map(|p| cache_dir(version).join(p.lib_name).exists())
        .unwrap_or(false)
}

/// Release recorded in the `VERSION` marker next to `lib_path`, if any.
pub fn read_version_marker(lib_path: &Path) -> Option<String> {
    let marker = lib_path.parent()?.join(VERSION_MARKER);
    let raw = std::fs::read_to_string(marker).ok()?;
    let version = raw.trim();
    if version.is_empty() {
        None
    } else {
        Some(version.to_string())
    }
}

// ── Public API ───────────────────────────────────────────────────────────────

/// Return a path to the PDFium library for `version`, downloading the release
/// archive from `url` when neither the env override nor the cache has it.
///
/// Blocking: call it from `spawn_blocking` in async code.
pub fn fetch_library(
    url: &str,
    version: &str,
    on_progress: Option<ProgressFn<'_>>,
) -> Result<PathBuf, FetchError> {
    if let Some(path) = env_library_override() {
        debug!("Using PDFIUM_LIB_PATH: {}", path.display());
        return Ok(path);
    }

    let platform = current_platform()?;
    let dir = cache_dir(version);
    let lib_path = dir.join(platform.lib_name);

    if lib_path.exists() {
        debug!("PDFium {} found in cache: {}", version, lib_path.display());
        return Ok(lib_path);
    }

    info!("Downloading PDFium {} from {}", version, url);
    std::fs::create_dir_all(&dir).map_err(FetchError::CacheDir)?;

    let archive = download_bytes(url, on_progress)?;
    extract_library(&archive, platform.lib_path_in_archive, &lib_path)?;
    std::fs::write(dir.join(VERSION_MARKER), version).map_err(FetchError::CacheDir)?;

    info!("PDFium {} cached at {}", version, lib_path.display());
    Ok(lib_path)
}

/// Bind `pdfium-render` to the library at `path`.
pub fn bind(path: &Path) -> Result<Pdfium, FetchError> {
    Pdfium::bind_to_library(path)
        .map(Pdfium::new)
        .map_err(|e| FetchError::Bind {
            path: path.to_path_buf(),
            reason: format!("{:?}", e),
        })
}

// ── Internal helpers ─────────────────────────────────────────────────────────

/// Read a URL into memory, reporting progress every 64 KiB chunk.
fn download_bytes(url: &str, on_progress: Option<ProgressFn<'_>>) -> Result<Vec<u8>, FetchError> {
    let client = reqwest::blocking::Client::builder()
        .user_agent(concat!("pdfium-fetch/", env!("CARGO_PKG_VERSION")))
        .redirect(reqwest::redirect::Policy::limited(5))
        .build()
        .map_err(|e| FetchError::Download(e.to_string()))?;

    let mut response = client
        .get(url)
        .send()
        .map_err(|e| FetchError::Download(format!("GET {url}: {e}")))?;

    if !response.status().is_success() {
        return Err(FetchError::Download(format!(
            "HTTP {} for {url}",
            response.status()
        )));
    }

    let total = response.content_length();
    let mut buf = Vec::with_capacity(total.unwrap_or(32 * 1024 * 1024) as usize);
    let mut chunk = vec![0u8; 64 * 1024];
    let mut downloaded: u64 = 0;

    loop {
        match response.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => {
                buf.extend_from_slice(&chunk[..n]);
                downloaded += n as u64;
                if let Some(cb) = on_progress {
                    cb(downloaded, total);
                }
            }
            Err(ref e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(FetchError::Download(format!("Read error: {e}"))),
        }
    }

    Ok(buf)
}

/// Copy one entry of a `.tgz` archive to `dest_path`.
fn extract_library(archive: &[u8], entry_name: &str, dest_path: &Path) -> Result<(), FetchError> {
    use flate2::read::GzDecoder;
    use tar::Archive;

    let mut archive = Archive::new(GzDecoder::new(archive));
    let entries = archive
        .entries()
        .map_err(|e| FetchError::Extract(e.to_string()))?;

    for entry in entries {
        let mut entry = entry.map_err(|e| FetchError::Extract(e.to_string()))?;
        let matches = entry
            .path()
            .map(|p| p.to_string_lossy() == entry_name)
            .map_err(|e| FetchError::Extract(e.to_string()))?;

        if matches {
            entry
                .unpack(dest_path)
                .map_err(|e| FetchError::Extract(format!("Unpack failed: {e}")))?;
            return Ok(());
        }
    }

    Err(FetchError::Extract(format!(
        "'{entry_name}' not found in archive"
    )))
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn tgz_with(entry: &str, body: &[u8]) -> Vec<u8> {
        let gz = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::fast());
        let mut builder = tar::Builder::new(gz);
        let mut header = tar::Header::new_gnu();
        header.set_size(body.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder.append_data(&mut header, entry, body).unwrap();
        builder.into_inner().unwrap().finish().unwrap()
    }

    #[test]
    fn known_platforms_resolve() {
        let linux = platform_for("linux", "x86_64").unwrap();
        assert_eq!(linux.lib_name, "libpdfium.so");
        assert!(linux.archive_name.ends_with(".tgz"));

        let win = platform_for("windows", "x86").unwrap();
        assert_eq!(win.lib_path_in_archive, "bin/pdfium.dll");
    }

    #[test]
    fn unknown_platform_is_an_error() {
        let err = platform_for("plan9", "mips").unwrap_err();
        assert!(err.to_string().contains("plan9/mips"), "got: {err}");
    }

    #[test]
    fn cache_dir_is_versioned_and_overridable() {
        let d = cache_dir("1234");
        assert_eq!(d, cache_dir("1234"));
        assert!(d.to_string_lossy().contains("pdfium-1234"));

        std::env::set_var("PDF2IMG_CACHE_DIR", "/tmp/pdf2img_cache_override");
        let overridden = cache_dir("1234");
        std::env::remove_var("PDF2IMG_CACHE_DIR");
        assert_eq!(
            overridden,
            PathBuf::from("/tmp/pdf2img_cache_override/pdfium-1234")
        );
    }

    #[test]
    fn version_marker_is_read_next_to_library() {
        let dir = tempfile::tempdir().unwrap();
        let lib = dir.path().join("libpdfium.so");
        assert_eq!(read_version_marker(&lib), None);

        std::fs::write(dir.path().join(VERSION_MARKER), "7690\n").unwrap();
        assert_eq!(read_version_marker(&lib).as_deref(), Some("7690"));
    }

    #[test]
    fn extract_finds_the_library_entry() {
        let archive = tgz_with("lib/libpdfium.so", b"not really a library");
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("libpdfium.so");

        extract_library(&archive, "lib/libpdfium.so", &dest).unwrap();
        assert_eq!(std::fs::read(&dest).unwrap(), b"not really a library");
    }

    #[test]
    fn extract_reports_missing_entry() {
        let archive = tgz_with("lib/other.so", b"x");
        let dir = tempfile::tempdir().unwrap();
        let err = extract_library(&archive, "lib/libpdfium.so", &dir.path().join("out"))
            .unwrap_err();
        assert!(matches!(err, FetchError::Extract(_)));
    }

    #[test]
    fn local_library_uses_platform_name() {
        let p = local_library(Path::new("/opt/engine"));
        assert!(p.starts_with("/opt/engine"));
        assert!(p.to_string_lossy().contains("pdfium"));
    }
}
