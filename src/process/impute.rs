use super::groups::Group;
use super::table::{CleanRecord, Count, RawRecord, COUNT_COLUMNS};

/// Within each region (date order), replace a missing forward-filled count with the
/// last value seen earlier in that region. Leading gaps stay missing.
/// Returns the number of values filled.
pub fn forward_fill(rows: &mut [RawRecord], groups: &[Group]) -> usize {
    let mut filled = 0;
    for group in groups {
        for c in Count::FORWARD_FILLED {
            let mut last: Option<f64> = None;
            for &i in &group.indices {
                let slot = &mut rows[i].counts[c as usize];
                match *slot {
                    Some(v) => last = Some(v),
                    None if last.is_some() => {
                        *slot = last;
                        filled += 1;
                    }
                    None => {}
                }
            }
        }
    }
    filled
}

/// Set every still-missing count to zero, producing a clean record with derived
/// columns not yet computed. Returns the record and how many counts were zeroed.
pub fn zero_fill(raw: RawRecord) -> (CleanRecord, usize) {
    let mut counts = [0.0; COUNT_COLUMNS];
    let mut zeroed = 0;
    for (out, v) in counts.iter_mut().zip(raw.counts) {
        match v {
            Some(v) => *out = v,
            None => zeroed += 1,
        }
    }

    let record = CleanRecord {
        location: raw.location,
        date: raw.date,
        population: raw.population,
        counts,
        extra: raw.extra,
        death_rate: 0.0,
        vaccination_rate: 0.0,
        new_cases_smoothed: None,
        new_deaths_smoothed: None,
    };
    (record, zeroed)
}
