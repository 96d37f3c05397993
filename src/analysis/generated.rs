//! Detection of generated source files.
//!
//! Generated files are recognized by name (`Foo.g.cs`, `Form.Designer.cs`)
//! or by a marker comment in the leading comment block:
//! `<auto-generated>` for .NET tooling and `Code generated ... DO NOT EDIT.`
//! for Go tooling.

use std::path::Path;

/// File name suffixes used by code generators, compared case-insensitively.
const GENERATED_SUFFIXES: &[&str] = &[
    ".designer.cs",
    ".generated.cs",
    ".g.cs",
    ".g.i.cs",
    ".pb.go",
    "_pb2.py",
];

/// Leading lines inspected for a generator marker.
const HEADER_SCAN_LINES: usize = 40;

/// Whether the file name follows a code generator naming convention.
pub fn is_generated_file_name(path: &Path) -> bool {
    let name = match path.file_name().and_then(|n| n.to_str()) {
        Some(n) => n.to_ascii_lowercase(),
        None => return false,
    };
    name.starts_with("temporarygeneratedfile_")
        || GENERATED_SUFFIXES.iter().any(|s| name.ends_with(s))
}

/// Whether the leading comment block carries a generator marker.
///
/// Only comments before the first line of code are considered.
pub fn has_generated_header(source: &str) -> bool {
    for line in source.lines().take(HEADER_SCAN_LINES) {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if !is_comment_line(trimmed) {
            return false;
        }

        let lower = trimmed.to_ascii_lowercase();
        if lower.contains("<auto-generated") || lower.contains("<autogenerated") {
            return true;
        }
        if trimmed.contains("Code generated") && trimmed.contains("DO NOT EDIT") {
            return true;
        }
    }
    false
}

/// Whether a file is generated, by name or by header.
pub fn is_generated(path: &Path, source: &str) -> bool {
    is_generated_file_name(path) || has_generated_header(source)
}

fn is_comment_line(line: &str) -> bool {
    line.starts_with("//")
        || line.starts_with("/*")
        || line.starts_with('*')
        || line.starts_with('#')
}
