use crate::line::Line;
use std::ops::Range;
use std::sync::Arc;

/// Immutable, cheaply clonable document snapshot.
///
/// Editing helpers return a new snapshot that shares every untouched
/// `Arc<Line>` with the source snapshot; the line sequence itself is always a fresh
/// allocation, so its identity changes with every edit.
#[derive(Clone, Debug)]
pub struct Document {
    lines: Arc<[Arc<Line>]>,
}

impl Document {
    pub fn new(lines: impl IntoIterator<Item = Line>) -> Self {
        Self::from_shared(lines.into_iter().map(Arc::new).collect())
    }

    pub fn from_shared(lines: Vec<Arc<Line>>) -> Self {
        Self {
            lines: Arc::from(lines),
        }
    }

    pub fn lines(&self) -> &Arc<[Arc<Line>]> {
        &self.lines
    }

    pub fn line(&self, index: usize) -> Option<&Arc<Line>> {
        self.lines.get(index)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total document length, line breaks included.
    pub fn length(&self) -> usize {
        self.lines.iter().map(|line| line.len()).sum()
    }

    /// Each line with its `[start, end)` document offsets. The range includes
    /// the line break.
    pub fn line_spans(&self) -> impl Iterator<Item = (&Arc<Line>, Range<usize>)> + '_ {
        let mut offset = 0usize;
        self.lines.iter().map(move |line| {
            let start = offset;
            offset += line.len();
            (line, start..offset)
        })
    }

    pub fn replace_line(&self, index: usize, line: Line) -> Self {
        let mut lines = self.lines.to_vec();
        lines[index] = Arc::new(line);
        Self::from_shared(lines)
    }

    pub fn insert_line(&self, index: usize, line: Line) -> Self {
        let mut lines = self.lines.to_vec();
        lines.insert(index, Arc::new(line));
        Self::from_shared(lines)
    }

    pub fn remove_line(&self, index: usize) -> Self {
        let mut lines = self.lines.to_vec();
        lines.remove(index);
        Self::from_shared(lines)
    }
}
