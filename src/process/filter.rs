use super::table::RawRecord;

/// Multi-country aggregates published alongside the countries they sum.
pub const AGGREGATE_REGIONS: [&str; 3] = ["World", "European Union", "International"];

pub fn is_aggregate(location: &str) -> bool {
    AGGREGATE_REGIONS.contains(&location)
}

/// Drop aggregate rows in place, keeping the order of the rest. Returns how many went.
pub fn drop_aggregates(rows: &mut Vec<RawRecord>) -> usize {
    let before = rows.len();
    rows.retain(|r| !is_aggregate(&r.location));
    before - rows.len()
}
