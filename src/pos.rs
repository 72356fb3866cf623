//! Source positions.

/// A 1-based line/column position in a source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Pos {
    /// The line, starting from 1.
    pub line: usize,
    /// The column (in characters), starting from 1.
    pub column: usize,
}

impl Pos {
    /// Constructs a new [`Pos`].
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl std::fmt::Display for Pos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A value paired with the [`Pos`] where it starts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spanned<T> {
    /// The wrapped value.
    pub node: T,
    /// Where `node` starts in the source.
    pub pos: Pos,
}

impl<T> Spanned<T> {
    /// Pairs `node` with `pos`.
    pub const fn new(node: T, pos: Pos) -> Self {
        Self { node, pos }
    }
}

/// Maps byte offsets in a source text to [`Pos`]itions.
#[derive(Debug, Clone)]
pub struct LineIndex<'src> {
    source: &'src str,
    /// Byte offset of the first character of every line.
    starts: Vec<usize>,
}

impl<'src> LineIndex<'src> {
    /// Indexes the line starts of `source`.
    pub fn new(source: &'src str) -> Self {
        let starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self { source, starts }
    }

    /// Returns the position of the byte at `offset`.
    pub fn pos(&self, offset: usize) -> Pos {
        let line = self.starts.partition_point(|&start| start <= offset);
        let start = self.starts[line - 1];
        let column = self.source[start..offset.min(self.source.len())]
            .chars()
            .count();
        Pos::new(line, column + 1)
    }

    /// Returns the position just past the end of the source.
    pub fn end(&self) -> Pos {
        self.pos(self.source.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_map_to_lines_and_columns() {
        let index = LineIndex::new("int x = 1;\n  x += 2\n");
        assert_eq!(index.pos(0), Pos::new(1, 1));
        assert_eq!(index.pos(4), Pos::new(1, 5));
        assert_eq!(index.pos(11), Pos::new(2, 1));
        assert_eq!(index.pos(13), Pos::new(2, 3));
        assert_eq!(index.end(), Pos::new(3, 1));
    }
}
