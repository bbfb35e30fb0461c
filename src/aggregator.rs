use std::cmp::Ordering;
use std::collections::BTreeMap;
use tracing::debug;

use crate::location::LocationKey;
use crate::model::Annotation;

/// Annotations of one book in reading order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportGroup {
    pub book_id: String,
    pub annotations: Vec<Annotation>,
}

/// Group annotations by book and order each group by location.
///
/// Non-exportable annotations are dropped, so every returned group has at
/// least one entry. Groups come back sorted by book id.
pub fn group_annotations(annotations: impl IntoIterator<Item = Annotation>) -> Vec<ExportGroup> {
    let mut by_book: BTreeMap<String, Vec<Annotation>> = BTreeMap::new();

    for annotation in annotations {
        if !annotation.is_exportable() {
            continue;
        }
        by_book
            .entry(annotation.book_id.clone())
            .or_default()
            .push(annotation);
    }

    by_book
        .into_iter()
        .map(|(book_id, annotations)| {
            debug!("{}, count: {}", book_id, annotations.len());
            ExportGroup {
                book_id,
                annotations: sort_by_location(annotations),
            }
        })
        .collect()
}

/// Stable sort by reading position. Keys are parsed once up front.
pub fn sort_by_location(annotations: Vec<Annotation>) -> Vec<Annotation> {
    let mut keyed: Vec<(LocationKey, Annotation)> = annotations
        .into_iter()
        .map(|a| (LocationKey::parse(&a.location), a))
        .collect();

    stable_sort_by(&mut keyed, |(a, _), (b, _)| a.compare(b));

    keyed.into_iter().map(|(_, a)| a).collect()
}

/// Stable insertion sort that accepts a comparator which is not a total
/// order. An element only moves past strictly greater neighbours.
/// Quadratic; a book carries at most a few hundred annotations.
fn stable_sort_by<T>(items: &mut [T], mut compare: impl FnMut(&T, &T) -> Ordering) {
    for i in 1..items.len() {
        let mut j = i;
        while j > 0 && compare(&items[j - 1], &items[j]) == Ordering::Greater {
            items.swap(j - 1, j);
            j -= 1;
        }
    }
}
