//! File kind classification: extension first, then a small content sniff
//! for ambiguous or extension-less files.

use std::path::Path;

use codesearch_core::entities::FileKind;

const CODE_EXTENSIONS: &[&str] = &[
    "rs", "py", "js", "jsx", "ts", "tsx", "go", "java", "kt", "c", "h", "cc", "cpp", "hpp", "cs",
    "rb", "php", "swift", "scala", "sh", "bash", "zsh", "sql", "lua", "ex", "exs", "hs", "clj",
];

const STRUCTURED_DOC_EXTENSIONS: &[&str] =
    &["md", "mdx", "rst", "adoc", "yaml", "yml", "toml", "json", "xml", "html"];

const PLAIN_TEXT_EXTENSIONS: &[&str] = &["txt", "log", "cfg", "conf", "ini", "env"];

pub fn classify(path: &Path, sniff: Option<&[u8]>) -> FileKind {
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        let ext = ext.to_ascii_lowercase();
        if CODE_EXTENSIONS.contains(&ext.as_str()) {
            return FileKind::Code;
        }
        if STRUCTURED_DOC_EXTENSIONS.contains(&ext.as_str()) {
            return FileKind::StructuredDoc;
        }
        if PLAIN_TEXT_EXTENSIONS.contains(&ext.as_str()) {
            return FileKind::PlainText;
        }
    }

    match sniff {
        Some(bytes) => sniff_content(bytes),
        None => FileKind::Unknown,
    }
}

/// A cheap heuristic for extension-less files (e.g. `Makefile`, `Dockerfile`):
/// binary content (a NUL byte in the first chunk) is `Unknown`; anything
/// printable enough is treated as plain text.
fn sniff_content(bytes: &[u8]) -> FileKind {
    if bytes.contains(&0) {
        return FileKind::Unknown;
    }
    let printable = bytes
        .iter()
        .filter(|b| b.is_ascii_graphic() || b.is_ascii_whitespace())
        .count();
    if bytes.is_empty() || printable * 100 / bytes.len() >= 85 {
        FileKind::PlainText
    } else {
        FileKind::Unknown
    }
}
