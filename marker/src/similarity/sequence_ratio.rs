//! Matching-blocks similarity ratio.
//!
//! The ratio is `2 * M / (len(a) + len(b))`, where `M` is the number of
//! characters covered by the matching blocks found by repeatedly taking the
//! longest common block and recursing on both sides of it. For long second
//! sequences, characters that make up more than 1% of it are not used to
//! seed matches ("autojunk"), which keeps large documents tractable. A
//! match can still be extended across such characters.

use std::collections::HashMap;

use crate::traits::similarity::SimilarityMeasure;

/// Sequences shorter than this never drop popular characters.
const AUTOJUNK_MIN_LEN: usize = 200;

#[derive(Debug, Clone, Copy)]
pub struct SequenceRatio {
    autojunk: bool,
}

impl SequenceRatio {
    pub fn new() -> Self {
        Self { autojunk: true }
    }

    /// Disables the popularity heuristic. Exact but quadratic on long inputs.
    pub fn without_autojunk() -> Self {
        Self { autojunk: false }
    }
}

impl Default for SequenceRatio {
    fn default() -> Self {
        Self::new()
    }
}

impl SimilarityMeasure for SequenceRatio {
    fn ratio(&self, a: &str, b: &str) -> f64 {
        let a: Vec<char> = a.chars().collect();
        let b: Vec<char> = b.chars().collect();
        let total = a.len() + b.len();
        if total == 0 {
            return 1.0;
        }
        let matched = Matcher::new(&a, &b, self.autojunk).matched_len();
        2.0 * matched as f64 / total as f64
    }
}

struct Matcher<'a> {
    a: &'a [char],
    b: &'a [char],
    /// Positions of each character in `b`, ascending.
    b2j: HashMap<char, Vec<usize>>,
}

impl<'a> Matcher<'a> {
    fn new(a: &'a [char], b: &'a [char], autojunk: bool) -> Self {
        let mut b2j: HashMap<char, Vec<usize>> = HashMap::new();
        for (j, &c) in b.iter().enumerate() {
            b2j.entry(c).or_default().push(j);
        }

        let n = b.len();
        if autojunk && n >= AUTOJUNK_MIN_LEN {
            let ntest = n / 100 + 1;
            b2j.retain(|_, positions| positions.len() <= ntest);
        }

        Self { a, b, b2j }
    }

    /// Longest block `a[i..i+k] == b[j..j+k]` inside the given window,
    /// preferring the earliest `i`, then the earliest `j`.
    fn longest_match(&self, alo: usize, ahi: usize, blo: usize, bhi: usize) -> (usize, usize, usize) {
        let (mut besti, mut bestj, mut bestsize) = (alo, blo, 0usize);

        // j2len[j] = length of the match ending at a[i-1], b[j]
        let mut j2len: HashMap<usize, usize> = HashMap::new();
        let mut next: HashMap<usize, usize> = HashMap::new();

        for i in alo..ahi {
            next.clear();
            if let Some(positions) = self.b2j.get(&self.a[i]) {
                for &j in positions {
                    if j < blo {
                        continue;
                    }
                    if j >= bhi {
                        break;
                    }
                    let k = j.checked_sub(1).and_then(|p| j2len.get(&p)).copied().unwrap_or(0) + 1;
                    next.insert(j, k);
                    if k > bestsize {
                        besti = i + 1 - k;
                        bestj = j + 1 - k;
                        bestsize = k;
                    }
                }
            }
            std::mem::swap(&mut j2len, &mut next);
        }

        while besti > alo && bestj > blo && self.a[besti - 1] == self.b[bestj - 1] {
            besti -= 1;
            bestj -= 1;
            bestsize += 1;
        }
        while besti + bestsize < ahi
            && bestj + bestsize < bhi
            && self.a[besti + bestsize] == self.b[bestj + bestsize]
        {
            bestsize += 1;
        }

        (besti, bestj, bestsize)
    }

    /// Total length of all matching blocks.
    fn matched_len(&self) -> usize {
        let mut matched = 0;
        let mut queue = vec![(0, self.a.len(), 0, self.b.len())];

        while let Some((alo, ahi, blo, bhi)) = queue.pop() {
            let (i, j, k) = self.longest_match(alo, ahi, blo, bhi);
            if k == 0 {
                continue;
            }
            matched += k;
            if alo < i && blo < j {
                queue.push((alo, i, blo, j));
            }
            if i + k < ahi && j + k < bhi {
                queue.push((i + k, ahi, j + k, bhi));
            }
        }

        matched
    }
}
