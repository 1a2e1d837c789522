//! Fuzzy token-set similarity used for duplicate detection.
use std::collections::BTreeSet;

/// Default threshold at or above which two quotes count as duplicates.
pub const DEFAULT_SIMILARITY_THRESHOLD: u8 = 90;

/// Order-independent token overlap score in `0.0..=100.0`.
///
/// Both inputs are lowercased and stripped of punctuation before being split
/// on whitespace. The score is the best of three normalized Indel similarities:
/// the two set differences against each other, and the sorted intersection
/// against the intersection extended by either difference. A string with no
/// tokens scores 0 against anything.
pub fn token_set_ratio(a: &str, b: &str) -> f64 {
    let tokens_a = tokenize(a);
    let tokens_b = tokenize(b);
    if tokens_a.is_empty() || tokens_b.is_empty() {
        return 0.0;
    }

    let intersection = join(tokens_a.intersection(&tokens_b));
    let diff_ab = join(tokens_a.difference(&tokens_b));
    let diff_ba = join(tokens_b.difference(&tokens_a));

    if !intersection.is_empty() && (diff_ab.is_empty() || diff_ba.is_empty()) {
        return 100.0;
    }

    let sect_len = char_len(&intersection);
    let ab_len = char_len(&diff_ab);
    let ba_len = char_len(&diff_ba);
    let separator = usize::from(sect_len != 0);

    // Lengths of "sect + ' ' + diff" without building those strings.
    let sect_ab_len = sect_len + separator + ab_len;
    let sect_ba_len = sect_len + separator + ba_len;

    let dist = indel_distance(&diff_ab, &diff_ba);
    let result = normalized(dist, sect_ab_len + sect_ba_len);
    if sect_len == 0 {
        return result;
    }

    // Against its own extension the intersection differs only by the appended part.
    let sect_ab_ratio = normalized(separator + ab_len, sect_len + sect_ab_len);
    let sect_ba_ratio = normalized(separator + ba_len, sect_len + sect_ba_len);

    result.max(sect_ab_ratio).max(sect_ba_ratio)
}

/// Closest history entry to `candidate` with its score, or `None` for empty history.
pub fn max_similarity<'a, I>(candidate: &str, history: I) -> Option<(f64, &'a str)>
where
    I: IntoIterator<Item = &'a str>,
{
    history
        .into_iter()
        .map(|previous| (token_set_ratio(candidate, previous), previous))
        .fold(None, |best, (score, previous)| match best {
            Some((b, _)) if b >= score => best,
            _ => Some((score, previous)),
        })
}

fn tokenize(text: &str) -> BTreeSet<String> {
    let normalized: String = text
        .chars()
        .map(|c| {
            if c.is_alphanumeric() {
                c.to_lowercase().next().unwrap_or(c)
            } else {
                ' '
            }
        })
        .collect();
    normalized.split_whitespace().map(str::to_owned).collect()
}

fn join<'a>(tokens: impl Iterator<Item = &'a String>) -> String {
    tokens.map(String::as_str).collect::<Vec<_>>().join(" ")
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn normalized(dist: usize, lensum: usize) -> f64 {
    if lensum == 0 {
        return 100.0;
    }
    100.0 - 100.0 * dist as f64 / lensum as f64
}

/// Insertions plus deletions needed to turn `a` into `b`.
fn indel_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    a.len() + b.len() - 2 * lcs_len(&a, &b)
}

fn lcs_len(a: &[char], b: &[char]) -> usize {
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    let mut prev = vec![0usize; b.len() + 1];
    let mut row = vec![0usize; b.len() + 1];
    for &ca in a {
        for (j, &cb) in b.iter().enumerate() {
            row[j + 1] = if ca == cb {
                prev[j] + 1
            } else {
                row[j].max(prev[j + 1])
            };
        }
        std::mem::swap(&mut prev, &mut row);
    }
    prev[b.len()]
}
