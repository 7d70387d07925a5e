//! Environment overlays: `.env` in the source dir → list additions and always-on switches.

use log::debug;
use std::path::Path;

use crate::Opts;
use crate::engine::tools::dedup_preserving_order;
use crate::utils::config::EnvKeys;

/// Load `<dir>/.env` into the process environment. Existing variables win; missing file is fine.
pub fn load_dotenv(dir: &Path) {
    let env_path = dir.join(".env");
    if env_path.is_file() {
        match dotenvy::from_path(&env_path) {
            Ok(()) => debug!("Loaded environment from {}", env_path.display()),
            Err(e) => log::warn!("{}: {}", env_path.display(), e),
        }
    }
}

/// Split a comma separated list, trimming entries and dropping empties.
pub fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse a boolean the way most shells write one. Anything unrecognised is false.
pub fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim(),
        "1" | "t" | "T" | "true" | "TRUE" | "True" | "yes" | "YES" | "on" | "ON"
    )
}

fn env_list(key: &str) -> Vec<String> {
    std::env::var(key).map(|v| parse_list(&v)).unwrap_or_default()
}

fn env_flag(key: &str) -> bool {
    std::env::var(key).map(|v| parse_flag(&v)).unwrap_or(false)
}

/// Append env-provided entries to `list`, then dedup order-preserving (first wins).
pub fn extend_from_env(list: &mut Vec<String>, key: &str) {
    let extra = env_list(key);
    if !extra.is_empty() {
        debug!("{}: adding {}", key, extra.join(", "));
        list.extend(extra);
    }
    *list = dedup_preserving_order(std::mem::take(list));
}

/// Apply env lists and always-on switches to opts. Call after file config and CLI.
pub fn apply_env_to_opts(opts: &mut Opts) {
    extend_from_env(&mut opts.skip, EnvKeys::IGNORE_CONTAINS);
    extend_from_env(&mut opts.include, EnvKeys::INCLUDE_EXT);
    extend_from_env(&mut opts.exclude, EnvKeys::EXCLUDE_EXT);
    opts.write |= env_flag(EnvKeys::ALWAYS_WRITE);
    opts.print |= env_flag(EnvKeys::ALWAYS_PRINT);
    opts.json |= env_flag(EnvKeys::ALWAYS_JSON);
    opts.compress |= env_flag(EnvKeys::ALWAYS_COMPRESS);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_list_trims_and_drops_empty() {
        assert_eq!(parse_list(" go, rs ,,md,"), vec!["go", "rs", "md"]);
        assert!(parse_list("").is_empty());
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("true"));
        assert!(parse_flag("TRUE"));
        assert!(parse_flag("1"));
        assert!(!parse_flag("false"));
        assert!(!parse_flag("nope"));
    }
}
