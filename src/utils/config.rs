//! Application configuration constants.
//! Defaults, limits and environment keys in one place.

use std::sync::OnceLock;

// ---- Package / paths (from CARGO_PKG_NAME, cached) ----

/// Package-derived names: built once from `CARGO_PKG_NAME`, then cached.
pub struct PackagePaths {
    pkg_name: &'static str,
    config_filename: String,
    output_dir_name: &'static str,
}

static PACKAGE_PATHS: OnceLock<PackagePaths> = OnceLock::new();

impl PackagePaths {
    /// Build and cache names from `CARGO_PKG_NAME`. Called once on first use.
    pub fn get() -> &'static PackagePaths {
        PACKAGE_PATHS.get_or_init(|| {
            let pkg = env!("CARGO_PKG_NAME");
            PackagePaths {
                pkg_name: pkg,
                config_filename: format!(".{pkg}.toml"),
                output_dir_name: "summaries",
            }
        })
    }

    pub fn pkg_name(&self) -> &str {
        self.pkg_name
    }

    /// Config file looked up in the source directory when `SUMMARIZE_CONFIG_FILE` is unset.
    pub fn config_filename(&self) -> &str {
        &self.config_filename
    }

    /// Default output directory name, created under the source directory.
    pub fn output_dir_name(&self) -> &str {
        self.output_dir_name
    }

    /// Default summary filename, timestamped in UTC.
    pub fn summary_filename(&self) -> String {
        format!(
            "summary.{}.md",
            chrono::Utc::now().format(Limits::TIMESTAMP_FORMAT)
        )
    }
}

// ---- Environment ----

/// Environment variables read on top of CLI and config file.
pub struct EnvKeys;

impl EnvKeys {
    /// Path to a TOML config file; overrides `<DIR>/.summarize.toml`.
    pub const CONFIG_FILE: &'static str = "SUMMARIZE_CONFIG_FILE";
    /// Comma separated skip-substrings appended to the skip list.
    pub const IGNORE_CONTAINS: &'static str = "SUMMARIZE_IGNORE_CONTAINS";
    /// Comma separated extensions appended to the include list.
    pub const INCLUDE_EXT: &'static str = "SUMMARIZE_INCLUDE_EXT";
    /// Comma separated extensions appended to the exclude list.
    pub const EXCLUDE_EXT: &'static str = "SUMMARIZE_EXCLUDE_EXT";
    pub const ALWAYS_WRITE: &'static str = "SUMMARIZE_ALWAYS_WRITE";
    pub const ALWAYS_PRINT: &'static str = "SUMMARIZE_ALWAYS_PRINT";
    pub const ALWAYS_JSON: &'static str = "SUMMARIZE_ALWAYS_JSON";
    pub const ALWAYS_COMPRESS: &'static str = "SUMMARIZE_ALWAYS_COMPRESS";
}

// ---- Limits ----

/// Defaults and accepted ranges for the numeric knobs.
pub struct Limits;

impl Limits {
    /// Default file pool width.
    pub const MAX_FILES: usize = 369;
    /// Accepted range for the file pool width.
    pub const MAX_FILES_RANGE: (usize, usize) = (1, 17_369);
    /// Default soft byte ceiling of the summary.
    pub const MAX_OUTPUT_SIZE: u64 = 1_776_369;
    /// Accepted range for the byte ceiling.
    pub const MAX_OUTPUT_RANGE: (u64, u64) = (369, 369_369_369_369);
    /// chrono format for the default summary filename.
    pub const TIMESTAMP_FORMAT: &'static str = "%Y.%m.%d.%H.%M.%S.UTC";
}

/// Pool widths for the two limiters.
/// Use [`ConcurrencyLimits::current()`] to fill `category_width` from rayon.
#[derive(Clone, Copy, Debug)]
pub struct ConcurrencyLimits {
    /// Category pool width (host parallelism by default).
    pub category_width: usize,
    /// File pool width.
    pub file_width: usize,
}

impl Default for ConcurrencyLimits {
    fn default() -> Self {
        Self {
            category_width: 1, // use current() to set from rayon
            file_width: Limits::MAX_FILES,
        }
    }
}

impl ConcurrencyLimits {
    /// Build limits with `category_width` set from `rayon::current_num_threads()`.
    pub fn current() -> Self {
        Self {
            category_width: rayon::current_num_threads().max(1),
            ..Self::default()
        }
    }
}

// ---- Default lists ----

/// Built-in include / exclude / skip lists.
pub struct DefaultLists;

impl DefaultLists {
    const INCLUDE: &'static [&'static str] = &[
        "go",
        "ts",
        "tf",
        "sh",
        "py",
        "js",
        "Makefile",
        "mod",
        "Dockerfile",
        "dockerignore",
        "gitignore",
        "esconfigs",
        "md",
    ];

    const EXCLUDE: &'static [&'static str] = &[
        // Archives
        "7z", "gz", "xz", "zst", "zstd", "bz", "bz2", "bzip2", "zip", "tar", "rar", "lz4", "lzma",
        "cab", "arj",
        // Keys and certificates
        "crt", "cert", "cer", "key", "pub", "asc", "pem", "p12", "pfx", "jks", "keystore",
        "id_rsa", "id_dsa", "id_ed25519", "id_ecdsa", "gpg", "pgp",
        // Binaries
        "exe", "dll", "so", "dylib", "bin", "out", "o", "obj", "a", "lib", "dsym", "class", "pyc",
        "pyo", "__pycache__", "jar", "war", "ear", "apk", "ipa", "dex", "odex", "wasm", "node",
        "beam", "elc",
        // Disk images
        "iso", "img", "dmg", "vhd", "vdi", "vmdk", "qcow2",
        // Databases
        "db", "sqlite", "sqlite3", "db3", "mdb", "accdb", "sdf", "ldb",
        // Logs
        "log", "trace", "dump", "crash",
        // Images
        "jpg", "jpeg", "png", "gif", "bmp", "tiff", "tif", "webp", "ico", "svg", "heic", "heif",
        "raw", "cr2", "nef", "dng",
        // Audio
        "mp3", "wav", "flac", "aac", "ogg", "wma", "m4a", "opus", "aiff",
        // Video
        "mp4", "avi", "mov", "mkv", "webm", "flv", "wmv", "m4v", "3gp", "ogv",
        // Fonts
        "ttf", "otf", "woff", "woff2", "eot", "fon", "pfb", "pfm",
        // Documents
        "pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx", "odt", "ods", "odp", "rtf",
        // IDE / tooling
        "suo", "sln", "user", "ncb", "pdb", "ipch", "ilk", "tlog", "idb", "aps", "res", "iml",
        "idea", "vscode", "project", "classpath", "factorypath", "prefs", "vcxproj", "vcproj",
        "filters", "xcworkspace", "xcuserstate", "xcscheme", "pbxproj", "ds_store",
        // Lockfiles
        "lock", "sum", "resolved",
        // Temp / backup
        "tmp", "temp", "swp", "swo", "bak", "backup", "orig", "rej", "patch", "~", "old", "new",
        "part", "incomplete",
        // Generated
        "map",
        // Runtime data
        "dat", "data", "cache", "pid", "sock",
        // VCS internals
        "pack", "idx", "rev",
        // Serialized data
        "pickle", "pkl", "npy", "npz", "mat", "rdata", "rds",
    ];

    const SKIP: &'static [&'static str] = &[
        ".min.js",
        ".min.css",
        ".git/",
        ".svn/",
        ".vscode/",
        ".vs/",
        ".idea/",
        "logs/",
        "secrets/",
        ".venv/",
        "/site-packages",
        ".terraform/",
        "summaries/",
        "node_modules/",
        "/tmp",
        "tmp/",
    ];

    pub fn include() -> Vec<String> {
        Self::INCLUDE.iter().map(|s| s.to_string()).collect()
    }

    pub fn exclude() -> Vec<String> {
        Self::EXCLUDE.iter().map(|s| s.to_string()).collect()
    }

    pub fn skip() -> Vec<String> {
        Self::SKIP.iter().map(|s| s.to_string()).collect()
    }
}
