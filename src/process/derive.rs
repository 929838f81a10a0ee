use super::table::{CleanRecord, Count};

/// `numerator / denominator * 100`, or 0 when that is undefined: missing, zero, or
/// non-finite denominator, or a non-finite result. No clamping.
pub fn ratio_pct(numerator: f64, denominator: Option<f64>) -> f64 {
    match denominator {
        Some(d) if d != 0.0 && d.is_finite() && numerator.is_finite() => {
            let pct = numerator / d * 100.0;
            if pct.is_finite() {
                pct
            } else {
                0.0
            }
        }
        _ => 0.0,
    }
}

pub fn death_rate(r: &CleanRecord) -> f64 {
    ratio_pct(r.count(Count::TotalDeaths), Some(r.count(Count::TotalCases)))
}

pub fn vaccination_rate(r: &CleanRecord) -> f64 {
    ratio_pct(r.count(Count::PeopleVaccinated), r.population)
}

pub fn apply_ratios(rows: &mut [CleanRecord]) {
    for r in rows {
        r.death_rate = death_rate(r);
        r.vaccination_rate = vaccination_rate(r);
    }
}
