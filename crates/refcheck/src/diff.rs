//! Line diff for text references.

/// One line of a diff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffLine<'a> {
    Same(&'a str),
    Removed(&'a str),
    Added(&'a str),
}

impl DiffLine<'_> {
    pub fn is_change(&self) -> bool {
        !matches!(self, DiffLine::Same(_))
    }
}

/// Above this many LCS cells the diff degrades to "all removed, all added".
const MAX_LCS_CELLS: usize = 4_000_000;

/// Longest-common-subsequence diff of `old` against `new`, line by line.
pub fn diff_lines<'a>(old: &'a str, new: &'a str) -> Vec<DiffLine<'a>> {
    let a: Vec<&str> = old.lines().collect();
    let b: Vec<&str> = new.lines().collect();

    // Common prefix and suffix are cheap and keep the table small.
    let prefix = a.iter().zip(&b).take_while(|(x, y)| x == y).count();
    let suffix = a[prefix..]
        .iter()
        .rev()
        .zip(b[prefix..].iter().rev())
        .take_while(|(x, y)| x == y)
        .count();
    let a_mid = &a[prefix..a.len() - suffix];
    let b_mid = &b[prefix..b.len() - suffix];

    let mut out: Vec<DiffLine<'a>> = a[..prefix].iter().copied().map(DiffLine::Same).collect();

    if a_mid.len().saturating_mul(b_mid.len()) > MAX_LCS_CELLS {
        out.extend(a_mid.iter().copied().map(DiffLine::Removed));
        out.extend(b_mid.iter().copied().map(DiffLine::Added));
    } else {
        out.extend(lcs_diff(a_mid, b_mid));
    }

    out.extend(a[a.len() - suffix..].iter().copied().map(DiffLine::Same));
    out
}

fn lcs_diff<'a>(a: &[&'a str], b: &[&'a str]) -> Vec<DiffLine<'a>> {
    let (n, m) = (a.len(), b.len());
    // table[i][j] = LCS length of a[i..] and b[j..]
    let mut table = vec![vec![0u32; m + 1]; n + 1];
    for i in (0..n).rev() {
        for j in (0..m).rev() {
            table[i][j] = if a[i] == b[j] {
                table[i + 1][j + 1] + 1
            } else {
                table[i + 1][j].max(table[i][j + 1])
            };
        }
    }

    let mut out = Vec::with_capacity(n + m);
    let (mut i, mut j) = (0, 0);
    while i < n && j < m {
        if a[i] == b[j] {
            out.push(DiffLine::Same(a[i]));
            i += 1;
            j += 1;
        } else if table[i + 1][j] >= table[i][j + 1] {
            out.push(DiffLine::Removed(a[i]));
            i += 1;
        } else {
            out.push(DiffLine::Added(b[j]));
            j += 1;
        }
    }
    out.extend(a[i..].iter().copied().map(DiffLine::Removed));
    out.extend(b[j..].iter().copied().map(DiffLine::Added));
    out
}

/// Groups a diff into hunks with `context` unchanged lines around each
/// change. Returns index ranges into `lines`.
pub fn hunks(lines: &[DiffLine<'_>], context: usize) -> Vec<std::ops::Range<usize>> {
    let mut ranges: Vec<std::ops::Range<usize>> = Vec::new();
    for (idx, line) in lines.iter().enumerate() {
        if !line.is_change() {
            continue;
        }
        let start = idx.saturating_sub(context);
        let end = (idx + context + 1).min(lines.len());
        match ranges.last_mut() {
            Some(last) if start <= last.end => last.end = last.end.max(end),
            _ => ranges.push(start..end),
        }
    }
    ranges
}
