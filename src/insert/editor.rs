use std::path::PathBuf;

/// Position of the editing cursor inside the active note.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    pub line: usize,
    pub column: usize,
}

/// Seam to the host editor.
///
/// `active_cursor` returning `None` models "no note is open for editing" and
/// forces callers to handle that case instead of discovering it at insert
/// time.
pub trait EditorTarget {
    fn active_cursor(&self) -> Option<Cursor>;

    fn insert_at_cursor(&mut self, cursor: Cursor, text: &str) -> std::io::Result<()>;
}

/// Editor target backed by a markdown note on disk, with the cursor pinned
/// to the end of the file. A missing note means there is nothing to insert
/// into.
pub struct NoteFileEditor {
    path: PathBuf,
}

impl NoteFileEditor {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl EditorTarget for NoteFileEditor {
    fn active_cursor(&self) -> Option<Cursor> {
        let content = std::fs::read_to_string(&self.path).ok()?;
        Some(Cursor {
            line: content.lines().count(),
            column: 0,
        })
    }

    fn insert_at_cursor(&mut self, cursor: Cursor, text: &str) -> std::io::Result<()> {
        let mut content = std::fs::read_to_string(&self.path)?;
        content.insert_str(offset_for(&content, cursor), text);
        if !content.ends_with('\n') {
            content.push('\n');
        }
        std::fs::write(&self.path, content)
    }
}

/// Byte offset of a line/column cursor, clamped to the end of the content.
/// The column counts characters, not bytes, so the offset always lands on a
/// char boundary even in multibyte content.
fn offset_for(content: &str, cursor: Cursor) -> usize {
    let mut offset = 0;
    for (idx, line) in content.split_inclusive('\n').enumerate() {
        if idx == cursor.line {
            return offset + column_offset(line.trim_end_matches('\n'), cursor.column);
        }
        offset += line.len();
    }
    content.len()
}

/// Byte offset of a character column within one line, clamped to line end.
fn column_offset(line: &str, column: usize) -> usize {
    line.char_indices()
        .nth(column)
        .map(|(byte, _)| byte)
        .unwrap_or(line.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_clamps_to_content() {
        let content = "alpha\nbeta\n";

        assert_eq!(offset_for(content, Cursor { line: 0, column: 2 }), 2);
        assert_eq!(offset_for(content, Cursor { line: 1, column: 0 }), 6);
        // Past the last line or column: clamp, never panic.
        assert_eq!(offset_for(content, Cursor { line: 9, column: 9 }), 11);
        assert_eq!(offset_for(content, Cursor { line: 0, column: 99 }), 5);
    }

    #[test]
    fn test_cursor_columns_count_characters() {
        let content = "héllo world\n";

        // Column 2 sits after 'h' and 'é' — 3 bytes in, on a char boundary.
        assert_eq!(offset_for(content, Cursor { line: 0, column: 2 }), 3);
        assert_eq!(
            offset_for(content, Cursor { line: 0, column: 99 }),
            "héllo world".len()
        );
    }

    #[test]
    fn test_insert_into_multibyte_note() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let note = dir.path().join("daily.md");
        std::fs::write(&note, "héllo world\n").unwrap();

        let mut editor = NoteFileEditor::new(&note);
        editor
            .insert_at_cursor(Cursor { line: 0, column: 2 }, "![[d.png]]")
            .expect("insert must not split a character");

        let content = std::fs::read_to_string(&note).unwrap();
        assert_eq!(content, "hé![[d.png]]llo world\n");
    }

    #[test]
    fn test_note_file_editor_appends() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let note = dir.path().join("daily.md");
        std::fs::write(&note, "# Notes\n").unwrap();

        let mut editor = NoteFileEditor::new(&note);
        let cursor = editor.active_cursor().expect("note exists");
        editor.insert_at_cursor(cursor, "![[drawing.png]]").unwrap();

        let content = std::fs::read_to_string(&note).unwrap();
        assert_eq!(content, "# Notes\n![[drawing.png]]\n");
    }

    #[test]
    fn test_missing_note_has_no_cursor() {
        let editor = NoteFileEditor::new("/definitely/not/a/note.md");
        assert!(editor.active_cursor().is_none());
    }
}
