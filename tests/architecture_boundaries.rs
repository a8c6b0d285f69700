use std::fs;
use std::path::{Path, PathBuf};

fn rs_files(root: &Path) -> Vec<PathBuf> {
    let mut out = Vec::new();
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(_) => continue,
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                stack.push(path);
            } else if path.extension().and_then(|s| s.to_str()) == Some("rs") {
                out.push(path);
            }
        }
    }
    out.sort();
    out
}

fn rel(path: &Path) -> String {
    let root = Path::new(env!("CARGO_MANIFEST_DIR"));
    let rel = path
        .strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .to_string();
    rel.replace('\\', "/")
}

fn violations_in(dir: &str, forbidden: &[&str]) -> Vec<String> {
    let root = Path::new(env!("CARGO_MANIFEST_DIR")).join(dir);
    let mut violations = Vec::new();
    for file in rs_files(&root) {
        let content = fs::read_to_string(&file).unwrap_or_default();
        for needle in forbidden {
            if content.contains(needle) {
                violations.push(format!(
                    "{} imports forbidden dependency `{}`",
                    rel(&file),
                    needle
                ));
            }
        }
    }
    violations
}

#[test]
fn reconcile_module_is_pure() {
    let violations = violations_in(
        "src/reconcile",
        &["crate::ui", "crate::poller", "ratatui", "crossterm", "sysinfo", "tokio"],
    );

    assert!(
        violations.is_empty(),
        "Reconcile layering violations:\n{}",
        violations.join("\n")
    );
}

#[test]
fn ui_module_does_not_touch_the_os() {
    let violations = violations_in("src/ui", &["sysinfo", "crate::system::signal"]);

    assert!(
        violations.is_empty(),
        "UI/OS boundary violations:\n{}",
        violations.join("\n")
    );
}

#[test]
fn sysinfo_is_scoped_to_system_module() {
    let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("src");
    let mut violations = Vec::new();

    for file in rs_files(&root) {
        let content = fs::read_to_string(&file).unwrap_or_default();
        if !content.contains("sysinfo::") {
            continue;
        }
        let rel_path = rel(&file);
        if !rel_path.starts_with("src/system/") {
            violations.push(format!(
                "{} uses sysinfo outside src/system",
                rel_path
            ));
        }
    }

    assert!(
        violations.is_empty(),
        "Unexpected sysinfo usage:\n{}",
        violations.join("\n")
    );
}
