/// Ratcliff–Obershelp similarity: twice the number of characters in the
/// recursively matched longest common blocks, divided by the combined
/// length. Returns a value in `[0.0, 1.0]`; `1.0` iff the inputs are
/// identical. Callers pass pre-normalized text, so case differences never
/// reach this function.
pub fn fuzzy_ratio(a: &str, b: &str) -> f32 {
    if a == b {
        return 1.0;
    }
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let total = a_chars.len() + b_chars.len();
    if total == 0 {
        return 1.0;
    }

    // Longest-common-substring ties are broken by position, which is
    // order-sensitive; canonical argument order keeps the ratio symmetric.
    let matches = if a_chars <= b_chars {
        matching_chars(&a_chars, &b_chars)
    } else {
        matching_chars(&b_chars, &a_chars)
    };

    let ratio = 2.0 * matches as f32 / total as f32;
    debug_assert!((0.0..=1.0).contains(&ratio), "ratio {ratio} out of range [0.0, 1.0]");
    ratio
}

/// Total characters covered by matching blocks: find the longest common
/// substring, then recurse into the unmatched regions on both sides.
fn matching_chars(a: &[char], b: &[char]) -> usize {
    let (a_start, b_start, len) = longest_common_block(a, b);
    if len == 0 {
        return 0;
    }

    len + matching_chars(&a[..a_start], &b[..b_start])
        + matching_chars(&a[a_start + len..], &b[b_start + len..])
}

/// Longest common substring of `a` and `b` as `(start_a, start_b, len)`,
/// earliest occurrence winning ties. O(|a| * |b|) with a rolling row.
fn longest_common_block(a: &[char], b: &[char]) -> (usize, usize, usize) {
    let mut best = (0, 0, 0);
    let mut row = vec![0usize; b.len() + 1];

    for (i, &ca) in a.iter().enumerate() {
        let mut prev_diag = 0;
        for (j, &cb) in b.iter().enumerate() {
            let current = row[j + 1];
            if ca == cb {
                let run = prev_diag + 1;
                row[j + 1] = run;
                if run > best.2 {
                    best = (i + 1 - run, j + 1 - run, run);
                }
            } else {
                row[j + 1] = 0;
            }
            prev_diag = current;
        }
    }

    best
}
