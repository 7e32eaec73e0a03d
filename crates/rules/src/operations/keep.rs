use chrono::{DateTime, Utc};
use docmerge_core::temporal::parse_time;
use docmerge_core::{FieldPath, Tree};

use super::{leaf_value, write_field};

/// Keep whichever timestamp is later.
///
/// The enricher value wins when it parses and the output value is missing,
/// unparseable or strictly earlier. The enricher's original text is written.
pub fn keep_latest(enricher: &Tree, output: &mut Tree, paths: &[FieldPath]) -> usize {
    keep_by(enricher, output, paths, |incoming, current| incoming > current)
}

/// Keep whichever timestamp is earlier. Mirror of [`keep_latest`].
pub fn keep_earliest(enricher: &Tree, output: &mut Tree, paths: &[FieldPath]) -> usize {
    keep_by(enricher, output, paths, |incoming, current| incoming < current)
}

fn keep_by(
    enricher: &Tree,
    output: &mut Tree,
    paths: &[FieldPath],
    wins: impl Fn(DateTime<Utc>, DateTime<Utc>) -> bool,
) -> usize {
    let mut changed = 0;
    for path in paths {
        let Some(candidate) = leaf_value(enricher, path) else {
            continue;
        };
        let Some(incoming) = parse_time(candidate) else {
            continue;
        };
        let take = match leaf_value(output, path).and_then(parse_time) {
            Some(current) => wins(incoming, current),
            None => true,
        };
        if take && write_field(output, path, candidate.clone()).is_applied() {
            changed += 1;
        }
    }
    changed
}
