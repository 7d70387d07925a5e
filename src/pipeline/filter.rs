//! Path filter: decides whether a discovered file takes part in the summary and under which category.

use std::fmt;

use crate::SummarizeOpts;

/// Outcome of [`PathFilter::admit`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Admission {
    /// Passed every rule; carries the computed category.
    Admit(String),
    /// Dotfile, or under a dot-directory, with dotfile exclusion on.
    Dotfile,
    /// Matched a skip-substring (carried).
    Skipped(String),
    /// Extension is on the exclude list (carried).
    Excluded(String),
}

impl Admission {
    pub fn is_admitted(&self) -> bool {
        matches!(self, Admission::Admit(_))
    }
}

impl fmt::Display for Admission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Admission::Admit(c) => write!(f, "admitted as {c:?}"),
            Admission::Dotfile => write!(f, "dotfile"),
            Admission::Skipped(s) => write!(f, "matches skip entry {s:?}"),
            Admission::Excluded(e) => write!(f, "excluded extension {e:?}"),
        }
    }
}

/// Normalize a category / extension key: trimmed, lower-cased, no leading `.`.
pub fn normalize_category(raw: &str) -> String {
    raw.trim().trim_start_matches('.').to_lowercase()
}

/// Category of a file name: text after the last `.`, lower-cased.
/// Names without a `.` use the whole name, so `Makefile` files land in the `makefile` category.
pub fn category_of(filename: &str) -> String {
    match filename.rfind('.') {
        Some(i) => filename[i + 1..].to_lowercase(),
        None => filename.to_lowercase(),
    }
}

/// Pure predicate over (root-relative path, file name). Cheap to clone and share.
#[derive(Clone, Debug)]
pub struct PathFilter {
    exclude_dotfiles: bool,
    skip: Vec<String>,
    exclude: Vec<String>,
}

impl PathFilter {
    pub fn new(exclude_dotfiles: bool, skip: &[String], exclude: &[String]) -> Self {
        Self {
            exclude_dotfiles,
            skip: skip.iter().filter(|s| !s.is_empty()).cloned().collect(),
            exclude: exclude
                .iter()
                .map(|e| normalize_category(e))
                .filter(|e| !e.is_empty())
                .collect(),
        }
    }

    pub fn from_opts(opts: &SummarizeOpts) -> Self {
        Self::new(opts.exclude_dotfiles, &opts.skip, &opts.exclude)
    }

    pub fn excludes_dotfiles(&self) -> bool {
        self.exclude_dotfiles
    }

    /// Decide for one file. `rel_path` is relative to the walk root with `/` separators.
    ///
    /// Rules in order: dotfile, skip-substring (name or path), excluded extension.
    pub fn admit(&self, rel_path: &str, filename: &str) -> Admission {
        if self.exclude_dotfiles
            && (filename.starts_with('.') || rel_path.split('/').any(|c| c.starts_with('.')))
        {
            return Admission::Dotfile;
        }

        // Prefix and suffix matches are substring matches too.
        if let Some(hit) = self
            .skip
            .iter()
            .find(|s| filename.contains(s.as_str()) || rel_path.contains(s.as_str()))
        {
            return Admission::Skipped(hit.clone());
        }

        let category = category_of(filename);
        if self.exclude.iter().any(|e| e.eq_ignore_ascii_case(&category)) {
            return Admission::Excluded(category);
        }
        Admission::Admit(category)
    }

    /// True when a directory should be pruned from the walk without visiting its children.
    /// Only dot-directories are pruned, and only when dotfile exclusion is on.
    pub fn prunes_dir(&self, dir_name: &str) -> bool {
        self.exclude_dotfiles && dir_name.starts_with('.') && dir_name != "." && dir_name != ".."
    }
}
