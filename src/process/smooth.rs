use super::groups::Group;
use super::table::{CleanRecord, Count};

/// Observations in the trailing window.
pub const SMOOTHING_WINDOW: usize = 7;

/// Trailing arithmetic mean over `window` observations. Positions before the first
/// full window are `None`.
pub fn trailing_mean(values: &[f64], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; values.len()];
    }
    (0..values.len())
        .map(|i| {
            if i + 1 < window {
                None
            } else {
                let sum: f64 = values[i + 1 - window..=i].iter().sum();
                Some(sum / window as f64)
            }
        })
        .collect()
}

/// Fill `new_cases_smoothed` / `new_deaths_smoothed` per region in date order.
pub fn apply_smoothing(rows: &mut [CleanRecord], groups: &[Group]) {
    for group in groups {
        let series = |c: Count| -> Vec<f64> {
            group.indices.iter().map(|&i| rows[i].count(c)).collect()
        };
        let cases = trailing_mean(&series(Count::NewCases), SMOOTHING_WINDOW);
        let deaths = trailing_mean(&series(Count::NewDeaths), SMOOTHING_WINDOW);

        for ((&i, c), d) in group.indices.iter().zip(cases).zip(deaths) {
            rows[i].new_cases_smoothed = c;
            rows[i].new_deaths_smoothed = d;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_six_are_undefined() {
        let v: Vec<f64> = (1..=9u8).map(f64::from).collect();
        let m = trailing_mean(&v, 7);
        assert!(m[..6].iter().all(Option::is_none));
        assert_eq!(m[6], Some(4.0));
        assert_eq!(m[7], Some(5.0));
        assert_eq!(m[8], Some(6.0));
    }

    #[test]
    fn short_series_never_defined() {
        assert_eq!(trailing_mean(&[1.0, 2.0], 7), vec![None, None]);
        assert!(trailing_mean(&[], 7).is_empty());
    }
}
