use std::fmt;

/// One classified unit of a diff.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EditOp {
    /// Unit present, unchanged, on both sides
    Equal(String),
    /// Unit present only in the "after" text
    Insert(String),
    /// Unit present only in the "before" text
    Delete(String),
}

impl EditOp {
    /// The unit's text, including any line terminator it was split with
    pub fn content(&self) -> &str {
        match self {
            EditOp::Equal(content) | EditOp::Insert(content) | EditOp::Delete(content) => content,
        }
    }

    /// True for inserts and deletes
    pub fn is_change(&self) -> bool {
        !matches!(self, EditOp::Equal(_))
    }

    /// Two-character ndiff tag
    pub fn tag(&self) -> &'static str {
        match self {
            EditOp::Equal(_) => "  ",
            EditOp::Insert(_) => "+ ",
            EditOp::Delete(_) => "- ",
        }
    }
}

/// Op counts for an edit script
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScriptStats {
    pub equal: usize,
    pub inserted: usize,
    pub deleted: usize,
}

/// Ordered edit script turning the "before" units into the "after" units.
///
/// Equal and Delete ops, in order, spell out the "before" units; Equal and
/// Insert ops spell out the "after" units.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditScript {
    pub ops: Vec<EditOp>,
}

impl EditScript {
    pub fn new(ops: Vec<EditOp>) -> Self {
        Self { ops }
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, EditOp> {
        self.ops.iter()
    }

    /// Units of the "before" side, in order
    pub fn before_units(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter(|op| !matches!(op, EditOp::Insert(_)))
            .map(EditOp::content)
            .collect()
    }

    /// Units of the "after" side, in order
    pub fn after_units(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter(|op| !matches!(op, EditOp::Delete(_)))
            .map(EditOp::content)
            .collect()
    }

    pub fn has_changes(&self) -> bool {
        self.ops.iter().any(EditOp::is_change)
    }

    pub fn stats(&self) -> ScriptStats {
        self.ops
            .iter()
            .fold(ScriptStats::default(), |mut stats, op| {
                match op {
                    EditOp::Equal(_) => stats.equal += 1,
                    EditOp::Insert(_) => stats.inserted += 1,
                    EditOp::Delete(_) => stats.deleted += 1,
                }
                stats
            })
    }
}

impl<'a> IntoIterator for &'a EditScript {
    type Item = &'a EditOp;
    type IntoIter = std::slice::Iter<'a, EditOp>;

    fn into_iter(self) -> Self::IntoIter {
        self.ops.iter()
    }
}

impl FromIterator<EditOp> for EditScript {
    fn from_iter<I: IntoIterator<Item = EditOp>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Record following a unit that was written with a `\n` it did not have
pub const NO_NEWLINE_MARKER: &str = "\\ No newline at end of unit";

/// ndiff form: each op on its own line behind its two-character tag.
///
/// Units that lack a terminator (sentences, or the last line of a file with
/// no final newline) get one so every op stays on a line of its own, followed
/// by a [`NO_NEWLINE_MARKER`] record so the unit parses back unchanged.
impl fmt::Display for EditScript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for op in &self.ops {
            let content = op.content();
            write!(f, "{}{}", op.tag(), content)?;
            if !content.ends_with('\n') {
                writeln!(f)?;
                writeln!(f, "{NO_NEWLINE_MARKER}")?;
            }
        }
        Ok(())
    }
}
