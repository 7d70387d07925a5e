use std::path::{Path, PathBuf};
use summarize::engine::{dedup_preserving_order, path_relative_to, path_to_slash_string};
use summarize::pipeline::{
    Admission, CategoryIndex, DedupGate, PathFilter, category_of, fence_for, format_record,
    is_denied_artifact, normalize_category,
};
use summarize::utils::config::DefaultLists;

fn filter(exclude_dotfiles: bool, skip: &[&str], exclude: &[&str]) -> PathFilter {
    let skip: Vec<String> = skip.iter().map(|s| s.to_string()).collect();
    let exclude: Vec<String> = exclude.iter().map(|s| s.to_string()).collect();
    PathFilter::new(exclude_dotfiles, &skip, &exclude)
}

// --- path_relative_to ---

#[test]
fn test_path_relative_under_base() {
    let base = PathBuf::from("/foo/bar");
    let path = PathBuf::from("/foo/bar/baz/qux.go");
    assert_eq!(
        path_relative_to(&path, &base),
        Some(PathBuf::from("baz/qux.go"))
    );
}

#[test]
fn test_path_relative_not_under_base() {
    let base = PathBuf::from("/foo/bar");
    let path = PathBuf::from("/other/qux.go");
    assert_eq!(path_relative_to(&path, &base), None);
}

#[test]
fn test_path_to_slash_string_normalizes_backslashes() {
    assert_eq!(
        path_to_slash_string(Path::new("src\\main.go")),
        "src/main.go"
    );
    assert_eq!(path_to_slash_string(Path::new("src/main.go")), "src/main.go");
}

// --- dedup_preserving_order ---

#[test]
fn test_dedup_preserving_order_first_wins() {
    let list = vec!["go", "md", "go", "ts", "md"]
        .into_iter()
        .map(String::from)
        .collect();
    assert_eq!(dedup_preserving_order(list), vec!["go", "md", "ts"]);
}

// --- category_of / normalize_category ---

#[test]
fn test_category_is_last_extension_lowercased() {
    assert_eq!(category_of("main.go"), "go");
    assert_eq!(category_of("bundle.min.JS"), "js");
    assert_eq!(category_of(".gitignore"), "gitignore");
}

#[test]
fn test_category_of_extensionless_is_name() {
    assert_eq!(category_of("Makefile"), "makefile");
    assert_eq!(category_of("Dockerfile"), "dockerfile");
}

#[test]
fn test_normalize_category() {
    assert_eq!(normalize_category(" .Go "), "go");
    assert_eq!(normalize_category("Makefile"), "makefile");
}

// --- PathFilter ---

#[test]
fn test_filter_admits_plain_file() {
    let f = filter(true, &[], &[]);
    assert_eq!(f.admit("cmd/main.go", "main.go"), Admission::Admit("go".into()));
}

#[test]
fn test_filter_skip_node_modules() {
    let f = filter(true, &["node_modules/"], &[]);
    let a = f.admit("proj/node_modules/x.go", "x.go");
    assert_eq!(a, Admission::Skipped("node_modules/".into()));
    assert!(!a.is_admitted());
}

#[test]
fn test_filter_skip_matches_filename_substring() {
    let f = filter(true, &[".min.js"], &[]);
    assert!(!f.admit("web/app.min.js", "app.min.js").is_admitted());
    assert!(f.admit("web/app.js", "app.js").is_admitted());
}

#[test]
fn test_filter_dotfile_and_dot_dir() {
    let f = filter(true, &[], &[]);
    assert_eq!(f.admit(".env", ".env"), Admission::Dotfile);
    assert_eq!(f.admit(".git/config", "config"), Admission::Dotfile);

    let f = filter(false, &[], &[]);
    assert!(f.admit(".git/config", "config").is_admitted());
}

#[test]
fn test_filter_exclude_is_case_insensitive() {
    let f = filter(true, &[], &["png"]);
    assert_eq!(
        f.admit("img/logo.PNG", "logo.PNG"),
        Admission::Excluded("png".into())
    );
}

#[test]
fn test_filter_default_skip_is_relative() {
    let f = PathFilter::new(true, &DefaultLists::skip(), &DefaultLists::exclude());
    // "/tmp" must not reject everything when the root itself lives under /tmp.
    assert!(f.admit("src/main.go", "main.go").is_admitted());
    assert!(!f.admit("a/tmp/x.go", "x.go").is_admitted());
}

// --- CategoryIndex ---

#[test]
fn test_index_registers_includes_up_front() {
    let index = CategoryIndex::with_categories(&["go", ".MD", "go"]);
    assert_eq!(index.categories(), vec!["go", "md"]);
    assert_eq!(index.len_of("go"), Some(0));
    assert_eq!(index.len_of("bin"), None);
}

#[test]
fn test_index_insert_gates_unregistered() {
    let index = CategoryIndex::with_categories(&["go"]);
    assert!(index.insert("go", PathBuf::from("a.go")));
    assert!(!index.insert("bin", PathBuf::from("a.bin")));
    assert_eq!(index.total_paths(), 1);
}

#[test]
fn test_index_freezes_on_take() {
    let index = CategoryIndex::with_categories(&["go", "md"]);
    index.insert("go", PathBuf::from("a.go"));
    let buckets = index.take_buckets();
    assert!(index.is_frozen());
    assert_eq!(buckets.len(), 2);
    let go = buckets.iter().find(|b| b.category == "go").unwrap();
    assert_eq!(go.paths, vec![PathBuf::from("a.go")]);
    assert!(!index.insert("go", PathBuf::from("b.go")));
    assert!(index.take_buckets().iter().all(|b| b.paths.is_empty()));
}

// --- DedupGate ---

#[test]
fn test_dedup_gate_claims_once() {
    let gate = DedupGate::new();
    let p = Path::new("/x/main.go");
    assert!(!gate.contains(p));
    assert!(gate.claim(p));
    assert!(!gate.claim(p));
    assert!(gate.contains(p));
    assert_eq!(gate.len(), 1);
}

#[test]
fn test_dedup_gate_concurrent_claims_single_winner() {
    let gate = std::sync::Arc::new(DedupGate::new());
    let wins: usize = (0..8)
        .map(|_| {
            let gate = std::sync::Arc::clone(&gate);
            std::thread::spawn(move || gate.claim(Path::new("/same")) as usize)
        })
        .collect::<Vec<_>>()
        .into_iter()
        .map(|h| h.join().unwrap())
        .sum();
    assert_eq!(wins, 1);
}

// --- worker helpers ---

#[test]
fn test_denied_artifacts() {
    assert!(is_denied_artifact(Path::new("dir/.DS_Store")));
    assert!(is_denied_artifact(Path::new("dir/._main.go")));
    assert!(is_denied_artifact(Path::new("bin/tool-amd64")));
    assert!(is_denied_artifact(Path::new("setup.EXE")));
    assert!(!is_denied_artifact(Path::new("main.go")));
}

#[test]
fn test_fence_outgrows_content_backticks() {
    assert_eq!(fence_for(b"plain"), "```");
    assert_eq!(fence_for(b"has ``` inside"), "````");
}

#[test]
fn test_format_record_layout() {
    let tmp = tempfile::tempdir().unwrap();
    let file = tmp.path().join("main.go");
    std::fs::write(&file, "package main").unwrap();
    let meta = std::fs::metadata(&file).unwrap();

    let rec = format_record("cmd/main.go", "go", &meta, b"package main").unwrap();
    let rec = String::from_utf8(rec).unwrap();
    assert!(rec.starts_with("## main.go\n\n"));
    assert!(rec.contains("Metadata for `cmd/main.go`:"));
    assert!(rec.contains("\"size\": 12"));
    assert!(rec.contains("```go\npackage main\n```\n\n"));
}
