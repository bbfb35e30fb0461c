//! Reading-position keys for annotation ordering.
//!
//! Apple Books stores positions as EPUB CFI-like strings such as
//! `epubcfi(/6/24[chap01]!/4/2/1,:0,:52)`. We never interpret the
//! structure; the string is split on `/`, `,` and `:` and the numeric
//! prefix of each segment is compared position by position.

use std::cmp::Ordering;

const DELIMITERS: [char; 3] = ['/', ',', ':'];

/// Number of delimiter occurrences that split a location. Anything after
/// the last one is kept as a single trailing segment.
const MAX_SPLITS: usize = 10;

/// One segment of a location string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Number(i32),
    /// Segment with no leading integer. Skipped during comparison.
    Opaque(String),
}

impl Segment {
    fn parse(raw: &str) -> Self {
        match leading_int(raw) {
            Some(n) => Segment::Number(n),
            None => Segment::Opaque(raw.to_string()),
        }
    }

    pub fn as_number(&self) -> Option<i32> {
        match self {
            Segment::Number(n) => Some(*n),
            Segment::Opaque(_) => None,
        }
    }
}

/// Parsed sort key for a location string.
///
/// Not `Ord`: opaque segments compare equal to anything, so the relation
/// is not transitive. Sort with [`LocationKey::compare`] and a sort that
/// tolerates that.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocationKey {
    segments: Vec<Segment>,
}

impl LocationKey {
    pub fn parse(location: &str) -> Self {
        Self {
            segments: split_location(location)
                .into_iter()
                .map(Segment::parse)
                .collect(),
        }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Numeric view of the key, `None` for opaque segments.
    pub fn numbers(&self) -> Vec<Option<i32>> {
        self.segments.iter().map(Segment::as_number).collect()
    }

    /// Compare two keys in reading order.
    ///
    /// The first position where both segments are numbers and differ
    /// decides. Otherwise the shorter key comes first.
    pub fn compare(&self, other: &Self) -> Ordering {
        for (a, b) in self.segments.iter().zip(other.segments.iter()) {
            if let (Some(a), Some(b)) = (a.as_number(), b.as_number()) {
                if a != b {
                    return a.cmp(&b);
                }
            }
        }

        self.segments.len().cmp(&other.segments.len())
    }
}

/// Compare two raw location strings.
pub fn compare_locations(a: &str, b: &str) -> Ordering {
    LocationKey::parse(a).compare(&LocationKey::parse(b))
}

/// Split on any delimiter, dropping empty segments. After `MAX_SPLITS`
/// delimiters the rest of the string is one segment, delimiters included.
fn split_location(location: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut start = 0;
    let mut splits = 0;

    for (pos, ch) in location.char_indices() {
        if !DELIMITERS.contains(&ch) {
            continue;
        }
        splits += 1;
        if splits > MAX_SPLITS {
            break;
        }
        if pos > start {
            segments.push(&location[start..pos]);
        }
        start = pos + ch.len_utf8();
    }

    if start < location.len() {
        segments.push(&location[start..]);
    }

    segments
}

/// Integer prefix of a segment: optional whitespace, optional sign, digits.
/// Trailing text is ignored (`24[chap01]!` is 24). Out-of-range values
/// count as unparseable.
fn leading_int(raw: &str) -> Option<i32> {
    let trimmed = raw.trim_start();
    let sign_len = usize::from(trimmed.starts_with(['+', '-']));
    let digits = trimmed[sign_len..]
        .bytes()
        .take_while(u8::is_ascii_digit)
        .count();
    if digits == 0 {
        return None;
    }
    trimmed[..sign_len + digits].parse().ok()
}
