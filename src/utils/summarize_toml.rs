//! Load the TOML config file (CLI only). Lib does not use this; the consuming program injects config via SummarizeOpts.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::Opts;
use crate::utils::config::{EnvKeys, PackagePaths};

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SummarizeToml {
    #[serde(default)]
    settings: SettingsSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct SettingsSection {
    output_dir: Option<String>,
    filename: Option<String>,
    include: Option<Vec<String>>,
    exclude: Option<Vec<String>>,
    skip: Option<Vec<String>>,
    dotfiles: Option<bool>,
    follow_links: Option<bool>,
    category_width: Option<usize>,
    max_files: Option<usize>,
    max_output_size: Option<u64>,
    print: Option<bool>,
    write: Option<bool>,
    json: Option<bool>,
    compress: Option<bool>,
    verbose: Option<bool>,
}

/// Path of the config file for `dir`: `$SUMMARIZE_CONFIG_FILE` when set, else `<dir>/.summarize.toml`.
pub(crate) fn config_path_for(dir: &Path) -> PathBuf {
    match std::env::var_os(EnvKeys::CONFIG_FILE) {
        Some(p) if !p.is_empty() => PathBuf::from(p),
        _ => dir.join(PackagePaths::get().config_filename()),
    }
}

/// Parse config text. Errors are logged and yield None.
pub(crate) fn parse_summarize_toml(s: &str, origin: &Path) -> Option<SummarizeToml> {
    toml::from_str(s)
        .map_err(|e| log::warn!("{}: {}", origin.display(), e))
        .ok()
}

/// Load the config file for `dir` if present. Returns None if file missing, unreadable or malformed. CLI only.
pub(crate) fn load_summarize_toml(dir: &Path) -> Option<SummarizeToml> {
    let path = config_path_for(dir);
    let s = std::fs::read_to_string(&path).ok()?;
    log::debug!("Loaded config from {}", path.display());
    parse_summarize_toml(&s, &path)
}

/// Overwrite opts field from file when present.
macro_rules! apply_file_opt {
    ($file:expr, $opts:expr, $file_field:ident => $opts_field:ident) => {
        if let Some(v) = $file.$file_field.clone() {
            $opts.$opts_field = v;
        }
    };
}

/// Apply file config to opts (only set fields present in the file). Call before applying CLI.
pub(crate) fn apply_file_to_opts(file: &SummarizeToml, opts: &mut Opts) {
    let s = &file.settings;
    if let Some(ref p) = s.output_dir {
        opts.output_dir = Some(PathBuf::from(p));
    }
    if let Some(ref f) = s.filename {
        opts.filename = Some(f.clone());
    }
    if s.category_width.is_some() {
        opts.category_width = s.category_width;
    }
    apply_file_opt!(s, opts, include => include);
    apply_file_opt!(s, opts, exclude => exclude);
    apply_file_opt!(s, opts, skip => skip);
    apply_file_opt!(s, opts, dotfiles => dotfiles);
    apply_file_opt!(s, opts, follow_links => follow_links);
    apply_file_opt!(s, opts, max_files => max_files);
    apply_file_opt!(s, opts, max_output_size => max_output_size);
    apply_file_opt!(s, opts, print => print);
    apply_file_opt!(s, opts, write => write);
    apply_file_opt!(s, opts, json => json);
    apply_file_opt!(s, opts, compress => compress);
    apply_file_opt!(s, opts, verbose => verbose);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_only_present_fields() {
        let file = parse_summarize_toml(
            "[settings]\ninclude = [\"rs\"]\nmax_files = 8\n",
            Path::new("test.toml"),
        )
        .unwrap();
        let mut opts = Opts::default();
        let skip_before = opts.skip.clone();
        apply_file_to_opts(&file, &mut opts);
        assert_eq!(opts.include, vec!["rs".to_string()]);
        assert_eq!(opts.max_files, 8);
        assert_eq!(opts.skip, skip_before);
        assert!(opts.output_dir.is_none());
    }

    #[test]
    fn test_malformed_file_is_ignored() {
        assert!(parse_summarize_toml("[settings]\nmax_files = \"x\"", Path::new("bad.toml")).is_none());
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        assert!(parse_summarize_toml("[settings]\nbogus = 1", Path::new("bad.toml")).is_none());
    }

    #[test]
    fn test_empty_file_is_default() {
        let file = parse_summarize_toml("", Path::new("empty.toml")).unwrap();
        let mut opts = Opts::default();
        apply_file_to_opts(&file, &mut opts);
        assert_eq!(opts.max_files, Opts::default().max_files);
    }
}
