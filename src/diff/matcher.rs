//! Junk-aware longest-matching-block sequence alignment.
//!
//! The aligner repeatedly finds the longest contiguous run shared by both
//! sequences, then recurses into the unmatched regions on either side of it.
//! The result is not a minimal edit script, but it tends to line up with what
//! a reader perceives as "the same text moved around", which is what matters
//! when comparing two versions of a page.
//!
//! Two heuristics keep the search honest on real pages:
//!
//! - An optional junk predicate: junk elements of `b` never start a match, but
//!   a match may grow over them at its edges.
//! - Auto-junk: once `b` has 200 or more elements, any element occurring in
//!   more than 1% of `b` (plus one) is considered popular and also never
//!   starts a match. Think `</div>` on a page made of nested divs.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;
use std::ops::Range;

const AUTOJUNK_MIN_LEN: usize = 200;

/// A matching block: `a[a..a + size] == b[b..b + size]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Match {
    pub a: usize,
    pub b: usize,
    pub size: usize,
}

/// How a region of `a` turns into a region of `b`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    Equal,
    Replace,
    Delete,
    Insert,
}

/// One step of the alignment, covering `a[a]` and `b[b]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Opcode {
    pub tag: Tag,
    pub a: Range<usize>,
    pub b: Range<usize>,
}

/// Aligns `a` against a fixed `b`.
///
/// The index over `b` is built once, so comparing many `a`s against one `b`
/// only pays for it once (see [`SequenceMatcher::set_a`]).
pub struct SequenceMatcher<'a, T: Eq + Hash> {
    a: &'a [T],
    b: &'a [T],
    b2j: HashMap<&'a T, Vec<usize>>,
    bjunk: HashSet<&'a T>,
    full_b_count: Option<HashMap<&'a T, usize>>,
}

impl<'a, T: Eq + Hash> SequenceMatcher<'a, T> {
    /// Matcher with no junk predicate (auto-junk still applies).
    pub fn new(a: &'a [T], b: &'a [T]) -> Self {
        Self::with_junk(None, a, b)
    }

    /// Matcher whose `is_junk` elements of `b` never seed a match.
    pub fn with_junk(is_junk: Option<fn(&T) -> bool>, a: &'a [T], b: &'a [T]) -> Self {
        let mut b2j: HashMap<&T, Vec<usize>> = HashMap::new();
        for (j, elt) in b.iter().enumerate() {
            b2j.entry(elt).or_default().push(j);
        }

        let mut bjunk = HashSet::new();
        if let Some(is_junk) = is_junk {
            bjunk.extend(b2j.keys().copied().filter(|elt| is_junk(elt)));
            b2j.retain(|elt, _| !bjunk.contains(elt));
        }

        if b.len() >= AUTOJUNK_MIN_LEN {
            let ntest = b.len() / 100 + 1;
            b2j.retain(|_, indices| indices.len() <= ntest);
        }

        Self {
            a,
            b,
            b2j,
            bjunk,
            full_b_count: None,
        }
    }

    /// Swap in a new `a`, keeping the index over `b`.
    pub fn set_a(&mut self, a: &'a [T]) {
        self.a = a;
    }

    /// Longest matching block within `a[alo..ahi]` and `b[blo..bhi]`.
    ///
    /// Of all maximal blocks, the one starting earliest in `a` wins, then the
    /// one starting earliest in `b`. Returns a zero-sized match at
    /// `(alo, blo)` when nothing matches.
    pub fn find_longest_match(&self, alo: usize, ahi: usize, blo: usize, bhi: usize) -> Match {
        let (a, b) = (self.a, self.b);
        let (mut best_i, mut best_j, mut best_size) = (alo, blo, 0);

        // j2len[j] = length of the match ending at a[i - 1], b[j]
        let mut j2len: HashMap<usize, usize> = HashMap::new();
        for (i, elt) in a.iter().enumerate().take(ahi).skip(alo) {
            let mut new_j2len = HashMap::new();
            if let Some(indices) = self.b2j.get(elt) {
                for &j in indices {
                    if j < blo {
                        continue;
                    }
                    if j >= bhi {
                        break;
                    }
                    let k = j
                        .checked_sub(1)
                        .and_then(|prev| j2len.get(&prev))
                        .copied()
                        .unwrap_or(0)
                        + 1;
                    new_j2len.insert(j, k);
                    if k > best_size {
                        best_i = i + 1 - k;
                        best_j = j + 1 - k;
                        best_size = k;
                    }
                }
            }
            j2len = new_j2len;
        }

        // Grow over non-junk neighbours first (popular elements included),
        // then over junk, so a block of junk never outweighs real content.
        let is_junk = |elt: &T| self.bjunk.contains(elt);
        for junk_pass in [false, true] {
            while best_i > alo
                && best_j > blo
                && is_junk(&b[best_j - 1]) == junk_pass
                && a[best_i - 1] == b[best_j - 1]
            {
                best_i -= 1;
                best_j -= 1;
                best_size += 1;
            }
            while best_i + best_size < ahi
                && best_j + best_size < bhi
                && is_junk(&b[best_j + best_size]) == junk_pass
                && a[best_i + best_size] == b[best_j + best_size]
            {
                best_size += 1;
            }
        }

        Match {
            a: best_i,
            b: best_j,
            size: best_size,
        }
    }

    /// All matching blocks in order, with adjacent blocks merged.
    ///
    /// The last entry is always the sentinel `Match { a: a.len(), b: b.len(), size: 0 }`.
    pub fn matching_blocks(&self) -> Vec<Match> {
        let (la, lb) = (self.a.len(), self.b.len());
        let mut queue = vec![(0, la, 0, lb)];
        let mut blocks = Vec::new();

        while let Some((alo, ahi, blo, bhi)) = queue.pop() {
            let m = self.find_longest_match(alo, ahi, blo, bhi);
            if m.size == 0 {
                continue;
            }
            blocks.push(m);
            if alo < m.a && blo < m.b {
                queue.push((alo, m.a, blo, m.b));
            }
            if m.a + m.size < ahi && m.b + m.size < bhi {
                queue.push((m.a + m.size, ahi, m.b + m.size, bhi));
            }
        }
        blocks.sort_unstable();

        let mut merged: Vec<Match> = Vec::with_capacity(blocks.len() + 1);
        for block in blocks {
            match merged.last_mut() {
                Some(last) if last.a + last.size == block.a && last.b + last.size == block.b => {
                    last.size += block.size;
                }
                _ => merged.push(block),
            }
        }
        merged.push(Match {
            a: la,
            b: lb,
            size: 0,
        });
        merged
    }

    /// Steps turning `a` into `b`, covering both sequences end to end.
    pub fn opcodes(&self) -> Vec<Opcode> {
        let (mut i, mut j) = (0, 0);
        let mut opcodes = Vec::new();

        for m in self.matching_blocks() {
            let tag = match (i < m.a, j < m.b) {
                (true, true) => Some(Tag::Replace),
                (true, false) => Some(Tag::Delete),
                (false, true) => Some(Tag::Insert),
                (false, false) => None,
            };
            if let Some(tag) = tag {
                opcodes.push(Opcode {
                    tag,
                    a: i..m.a,
                    b: j..m.b,
                });
            }
            i = m.a + m.size;
            j = m.b + m.size;
            if m.size > 0 {
                opcodes.push(Opcode {
                    tag: Tag::Equal,
                    a: m.a..i,
                    b: m.b..j,
                });
            }
        }

        opcodes
    }

    /// Similarity in `[0, 1]`: twice the matched elements over the total.
    pub fn ratio(&self) -> f64 {
        let matches = self.matching_blocks().iter().map(|m| m.size).sum();
        scaled_ratio(matches, self.a.len() + self.b.len())
    }

    /// Upper bound on [`ratio`](Self::ratio) from element counts alone.
    pub fn quick_ratio(&mut self) -> f64 {
        let b = self.b;
        let full_b_count = self.full_b_count.get_or_insert_with(|| {
            let mut counts = HashMap::new();
            for elt in b {
                *counts.entry(elt).or_insert(0) += 1;
            }
            counts
        });

        let mut avail: HashMap<&T, usize> = HashMap::new();
        let mut matches = 0;
        for elt in self.a {
            let left = avail
                .entry(elt)
                .or_insert_with(|| full_b_count.get(elt).copied().unwrap_or(0));
            if *left > 0 {
                *left -= 1;
                matches += 1;
            }
        }

        scaled_ratio(matches, self.a.len() + self.b.len())
    }

    /// Cheapest upper bound on [`ratio`](Self::ratio), from lengths alone.
    pub fn real_quick_ratio(&self) -> f64 {
        let (la, lb) = (self.a.len(), self.b.len());
        scaled_ratio(la.min(lb), la + lb)
    }
}

fn scaled_ratio(matches: usize, length: usize) -> f64 {
    if length == 0 {
        1.0
    } else {
        2.0 * matches as f64 / length as f64
    }
}
