use crate::sort::SortEntry;


pub fn sort_entries(entries: &mut [SortEntry]) {
    entries.sort_unstable_by(|a, b| {
        b.key.cmp(&a.key).then(a.index.cmp(&b.index))
    });
}
