//! Line-level (or sentence-level) diffing.
//!
//! [`compute_edit_script`] aligns the two unit sequences with
//! [`SequenceMatcher`] and classifies every unit as equal, inserted or
//! deleted. Replaced regions get a second look: the most similar pair of
//! lines inside the region is emitted as a delete immediately followed by
//! its insert, so an edited line reads next to its previous version instead
//! of after a whole block of removals.
//!
//! # Examples
//!
//! ```
//! use seodiff::diff::{EditOp, compute_edit_script};
//!
//! let script = compute_edit_script(&["A\n", "B\n", "C\n"], &["A\n", "X\n", "C\n"]);
//! assert_eq!(
//!     script.ops,
//!     vec![
//!         EditOp::Equal("A\n".into()),
//!         EditOp::Delete("B\n".into()),
//!         EditOp::Insert("X\n".into()),
//!         EditOp::Equal("C\n".into()),
//!     ]
//! );
//! ```

pub mod matcher;
pub mod script;

pub use matcher::{Match, Opcode, SequenceMatcher, Tag};
pub use script::{EditOp, EditScript, NO_NEWLINE_MARKER, ScriptStats};

/// Similarity a line pair must beat to be considered for pairing
const PAIR_SEARCH_FLOOR: f64 = 0.74;
/// Similarity the best pair must reach to actually be paired
const PAIR_CUTOFF: f64 = 0.75;

/// Compute the edit script turning `before` into `after`.
///
/// Never fails: empty inputs produce an empty script, and identical inputs
/// produce an all-[`EditOp::Equal`] script.
pub fn compute_edit_script<S: AsRef<str>>(before: &[S], after: &[S]) -> EditScript {
    let a: Vec<&str> = before.iter().map(|unit| unit.as_ref()).collect();
    let b: Vec<&str> = after.iter().map(|unit| unit.as_ref()).collect();

    let mut differ = Differ {
        a: &a,
        b: &b,
        ops: Vec::with_capacity(a.len().max(b.len())),
    };

    for opcode in SequenceMatcher::new(&a, &b).opcodes() {
        let Opcode {
            tag,
            a: old,
            b: new,
        } = opcode;
        match tag {
            Tag::Equal => differ.dump_equal(old),
            Tag::Delete => differ.dump_deleted(old),
            Tag::Insert => differ.dump_inserted(new),
            Tag::Replace => differ.fancy_replace(old.start, old.end, new.start, new.end),
        }
    }

    let script = EditScript::new(differ.ops);
    let stats = script.stats();
    tracing::debug!(
        before = before.len(),
        after = after.len(),
        equal = stats.equal,
        inserted = stats.inserted,
        deleted = stats.deleted,
        "computed edit script"
    );
    script
}

/// Space and tab never seed a character-level match
fn is_character_junk(c: &char) -> bool {
    matches!(c, ' ' | '\t')
}

/// Pending work inside a replaced region, processed last-in first-out
enum Task {
    Region {
        alo: usize,
        ahi: usize,
        blo: usize,
        bhi: usize,
    },
    Pair {
        i: usize,
        j: usize,
        identical: bool,
    },
}

struct Differ<'a> {
    a: &'a [&'a str],
    b: &'a [&'a str],
    ops: Vec<EditOp>,
}

impl Differ<'_> {
    fn dump_equal(&mut self, range: std::ops::Range<usize>) {
        let a = self.a;
        self.ops
            .extend(a[range].iter().map(|line| EditOp::Equal(line.to_string())));
    }

    fn dump_deleted(&mut self, range: std::ops::Range<usize>) {
        let a = self.a;
        self.ops
            .extend(a[range].iter().map(|line| EditOp::Delete(line.to_string())));
    }

    fn dump_inserted(&mut self, range: std::ops::Range<usize>) {
        let b = self.b;
        self.ops
            .extend(b[range].iter().map(|line| EditOp::Insert(line.to_string())));
    }

    /// Emit a replaced region, synchronising on its most similar line pair.
    fn fancy_replace(&mut self, alo: usize, ahi: usize, blo: usize, bhi: usize) {
        let mut tasks = vec![Task::Region { alo, ahi, blo, bhi }];

        while let Some(task) = tasks.pop() {
            match task {
                Task::Pair { i, j, identical } => {
                    if identical {
                        self.ops.push(EditOp::Equal(self.a[i].to_string()));
                    } else {
                        self.ops.push(EditOp::Delete(self.a[i].to_string()));
                        self.ops.push(EditOp::Insert(self.b[j].to_string()));
                    }
                }
                Task::Region { alo, ahi, blo, bhi } => match (alo < ahi, blo < bhi) {
                    (true, true) => {
                        let Some((i, j, identical)) = self.best_pair(alo, ahi, blo, bhi) else {
                            self.plain_replace(alo, ahi, blo, bhi);
                            continue;
                        };
                        tasks.push(Task::Region {
                            alo: i + 1,
                            ahi,
                            blo: j + 1,
                            bhi,
                        });
                        tasks.push(Task::Pair { i, j, identical });
                        tasks.push(Task::Region {
                            alo,
                            ahi: i,
                            blo,
                            bhi: j,
                        });
                    }
                    (true, false) => self.dump_deleted(alo..ahi),
                    (false, true) => self.dump_inserted(blo..bhi),
                    (false, false) => {}
                },
            }
        }
    }

    /// Most similar non-identical line pair in the region, if similar enough.
    ///
    /// Falls back to the first identical pair when no pair is close enough;
    /// identical lines only survive into a replaced region through the junk
    /// heuristics.
    fn best_pair(
        &self,
        alo: usize,
        ahi: usize,
        blo: usize,
        bhi: usize,
    ) -> Option<(usize, usize, bool)> {
        let a_chars: Vec<Vec<char>> = self.a[alo..ahi]
            .iter()
            .map(|line| line.chars().collect())
            .collect();

        let mut best_ratio = PAIR_SEARCH_FLOOR;
        let mut best = None;
        let mut first_identical = None;

        for j in blo..bhi {
            let b_chars: Vec<char> = self.b[j].chars().collect();
            let mut cruncher = SequenceMatcher::with_junk(Some(is_character_junk), &[], &b_chars);

            for i in alo..ahi {
                if self.a[i] == self.b[j] {
                    first_identical.get_or_insert((i, j));
                    continue;
                }
                cruncher.set_a(&a_chars[i - alo]);
                if cruncher.real_quick_ratio() > best_ratio && cruncher.quick_ratio() > best_ratio
                {
                    let ratio = cruncher.ratio();
                    if ratio > best_ratio {
                        best_ratio = ratio;
                        best = Some((i, j));
                    }
                }
            }
        }

        match best {
            Some((i, j)) if best_ratio >= PAIR_CUTOFF => Some((i, j, false)),
            _ => first_identical.map(|(i, j)| (i, j, true)),
        }
    }

    /// Dump both sides of a region, the side with fewer lines first.
    fn plain_replace(&mut self, alo: usize, ahi: usize, blo: usize, bhi: usize) {
        if bhi - blo < ahi - alo {
            self.dump_inserted(blo..bhi);
            self.dump_deleted(alo..ahi);
        } else {
            self.dump_deleted(alo..ahi);
            self.dump_inserted(blo..bhi);
        }
    }
}
