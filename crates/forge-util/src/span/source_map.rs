//! Source map for managing source files and extracting source lines.

use std::sync::Arc;

use thiserror::Error;

use super::{FileId, Span};

/// Error type for source map operations
#[derive(Debug, Error)]
pub enum SourceMapError {
    /// File not found in the source map
    #[error("file not found: {0}")]
    FileNotFound(String),

    /// Span out of bounds for file
    #[error("span out of bounds: file has {file_len} bytes, span is {span_start}..{span_end}")]
    SpanOutOfBounds {
        file_len: usize,
        span_start: usize,
        span_end: usize,
    },
}

/// A source file with its content and metadata
#[derive(Clone)]
pub struct SourceFile {
    /// Unique file identifier
    id: FileId,
    /// File name (path or display name)
    name: String,
    /// File content
    content: Arc<str>,
    /// Precomputed line start offsets
    line_starts: Arc<[usize]>,
}

impl SourceFile {
    /// Create a new source file
    pub fn new(id: FileId, name: impl Into<String>, content: impl Into<Arc<str>>) -> Self {
        let content = content.into();
        let line_starts = Self::compute_line_starts(&content);
        Self {
            id,
            name: name.into(),
            content,
            line_starts,
        }
    }

    fn compute_line_starts(content: &str) -> Arc<[usize]> {
        let mut line_starts = vec![0];
        for (i, ch) in content.char_indices() {
            if ch == '\n' {
                line_starts.push(i + 1);
            }
        }
        line_starts.into()
    }

    /// Get the file identifier
    #[inline]
    pub fn id(&self) -> FileId {
        self.id
    }

    /// Get the file name
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the file content
    #[inline]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Get the total number of lines
    #[inline]
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Get the text of a line (1-based), without the trailing newline
    pub fn line_text(&self, line: u32) -> Option<&str> {
        let index = (line as usize).checked_sub(1)?;
        let start = *self.line_starts.get(index)?;
        let end = self
            .line_starts
            .get(index + 1)
            .map(|next| next - 1)
            .unwrap_or(self.content.len());
        self.content.get(start..end)
    }

    /// Get the source text covered by a span
    pub fn snippet(&self, span: Span) -> Result<&str, SourceMapError> {
        self.content
            .get(span.start..span.end)
            .ok_or(SourceMapError::SpanOutOfBounds {
                file_len: self.content.len(),
                span_start: span.start,
                span_end: span.end,
            })
    }
}

/// Holds every source file loaded for one compiler invocation
///
/// Files are assigned sequential [`FileId`]s in insertion order.
#[derive(Default)]
pub struct SourceMap {
    files: Vec<SourceFile>,
}

impl SourceMap {
    /// Create an empty source map
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file and return its id
    pub fn add_file(&mut self, name: impl Into<String>, content: impl Into<Arc<str>>) -> FileId {
        let id = FileId(self.files.len());
        self.files.push(SourceFile::new(id, name, content));
        id
    }

    /// Get a file by id
    pub fn get(&self, id: FileId) -> Option<&SourceFile> {
        self.files.get(id.index())
    }

    /// Look up a file by name
    pub fn get_by_name(&self, name: &str) -> Result<&SourceFile, SourceMapError> {
        self.files
            .iter()
            .find(|f| f.name() == name)
            .ok_or_else(|| SourceMapError::FileNotFound(name.to_string()))
    }

    /// Iterate over all files in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &SourceFile> {
        self.files.iter()
    }

    /// Number of loaded files
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Returns true if no files are loaded
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_get() {
        let mut map = SourceMap::new();
        let id = map.add_file("main.fr", "func f() -> void {}\n");
        assert_eq!(id, FileId(0));
        assert_eq!(map.get(id).unwrap().name(), "main.fr");
        assert_eq!(map.get(id).unwrap().content(), "func f() -> void {}\n");
    }

    #[test]
    fn test_sequential_ids() {
        let mut map = SourceMap::new();
        let a = map.add_file("a.fr", "");
        let b = map.add_file("b.fr", "");
        assert_eq!(a, FileId(0));
        assert_eq!(b, FileId(1));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_line_text() {
        let file = SourceFile::new(FileId(0), "t.fr", "line1\nline2\nline3");
        assert_eq!(file.line_text(1), Some("line1"));
        assert_eq!(file.line_text(2), Some("line2"));
        assert_eq!(file.line_text(3), Some("line3"));
        assert_eq!(file.line_text(4), None);
        assert_eq!(file.line_count(), 3);
    }

    #[test]
    fn test_snippet() {
        let file = SourceFile::new(FileId(0), "t.fr", "let x = 42;");
        let span = Span::new(4, 5, 1, 5);
        assert_eq!(file.snippet(span).unwrap(), "x");
        assert!(file.snippet(Span::new(0, 100, 1, 1)).is_err());
    }

    #[test]
    fn test_get_by_name() {
        let mut map = SourceMap::new();
        map.add_file("main.fr", "x");
        assert!(map.get_by_name("main.fr").is_ok());
        assert!(map.get_by_name("other.fr").is_err());
    }
}
