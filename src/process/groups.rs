use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Row indices of one region, in date order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub region: String,
    pub indices: Vec<usize>,
}

/// Partition rows by region. Each group lists row indices sorted by date; rows sharing
/// a date keep their input order. Groups come back sorted by region name.
pub fn partition_by_region<T, F>(rows: &[T], key: F) -> Vec<Group>
where
    F: Fn(&T) -> (&str, NaiveDate),
{
    let mut by_region: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for (i, row) in rows.iter().enumerate() {
        by_region.entry(key(row).0).or_default().push(i);
    }

    by_region
        .into_iter()
        .map(|(region, mut indices)| {
            // stable: equal dates stay in input order
            indices.sort_by_key(|&i| key(&rows[i]).1);
            Group {
                region: region.to_string(),
                indices,
            }
        })
        .collect()
}
