use crate::error::{PrepError, Result};
use chrono::NaiveDate;

/// Count columns that are imputed: forward-filled (first four) and zero-filled (all).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Count {
    TotalCases = 0,
    TotalDeaths = 1,
    NewCases = 2,
    NewDeaths = 3,
    TotalVaccinations = 4,
    PeopleVaccinated = 5,
}

pub const COUNT_COLUMNS: usize = 6;

impl Count {
    /// Carried forward within a region before zero-filling. Vaccination counts are
    /// zero-filled only.
    pub const FORWARD_FILLED: [Count; 4] = [
        Count::TotalCases,
        Count::TotalDeaths,
        Count::NewCases,
        Count::NewDeaths,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Count::TotalCases => "total_cases",
            Count::TotalDeaths => "total_deaths",
            Count::NewCases => "new_cases",
            Count::NewDeaths => "new_deaths",
            Count::TotalVaccinations => "total_vaccinations",
            Count::PeopleVaccinated => "people_vaccinated",
        }
    }
}

/// A column the pipeline reads and types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Field {
    Date,
    Location,
    Population,
    Count(Count),
}

impl Field {
    pub const REQUIRED: [Field; 9] = [
        Field::Date,
        Field::Location,
        Field::Population,
        Field::Count(Count::TotalCases),
        Field::Count(Count::TotalDeaths),
        Field::Count(Count::NewCases),
        Field::Count(Count::NewDeaths),
        Field::Count(Count::TotalVaccinations),
        Field::Count(Count::PeopleVaccinated),
    ];

    pub fn name(self) -> &'static str {
        match self {
            Field::Date => "date",
            Field::Location => "location",
            Field::Population => "population",
            Field::Count(c) => c.name(),
        }
    }

    pub fn from_name(name: &str) -> Option<Field> {
        Field::REQUIRED.iter().copied().find(|f| f.name() == name)
    }
}

/// Columns appended to every cleaned table, in output order.
pub const DERIVED_COLUMNS: [&str; 4] = [
    "death_rate",
    "vaccination_rate",
    "new_cases_smoothed",
    "new_deaths_smoothed",
];

/// What sits at one header position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Column {
    Known(Field),
    /// Carried through verbatim; index into `extra` of each record.
    Passthrough(usize),
}

/// Header row resolved against the required fields.
#[derive(Clone, Debug, PartialEq)]
pub struct Layout {
    pub headers: Vec<String>,
    pub columns: Vec<Column>,
}

impl Layout {
    /// Fails with a schema error naming every required column that is absent.
    /// A repeated required header is typed once (first occurrence); later copies pass
    /// through as text.
    pub fn from_headers<S: AsRef<str>>(headers: &[S]) -> Result<Self> {
        let mut columns = Vec::with_capacity(headers.len());
        let mut seen = Vec::with_capacity(Field::REQUIRED.len());
        let mut passthrough = 0;

        for h in headers {
            match Field::from_name(h.as_ref().trim()) {
                Some(f) if !seen.contains(&f) => {
                    seen.push(f);
                    columns.push(Column::Known(f));
                }
                _ => {
                    columns.push(Column::Passthrough(passthrough));
                    passthrough += 1;
                }
            }
        }

        let missing: Vec<String> = Field::REQUIRED
            .iter()
            .filter(|f| !seen.contains(f))
            .map(|f| f.name().to_string())
            .collect();
        if !missing.is_empty() {
            return Err(PrepError::Schema { missing });
        }

        Ok(Self {
            headers: headers.iter().map(|h| h.as_ref().to_string()).collect(),
            columns,
        })
    }

    pub fn passthrough_count(&self) -> usize {
        self.columns
            .iter()
            .filter(|c| matches!(c, Column::Passthrough(_)))
            .count()
    }

    /// Output header: input header order followed by the derived columns.
    pub fn output_headers(&self) -> Vec<&str> {
        let mut out: Vec<&str> = self.headers.iter().map(String::as_str).collect();
        for name in DERIVED_COLUMNS {
            out.push(name);
        }
        out
    }
}

/// One parsed (region, date) observation; any count may be missing.
#[derive(Clone, Debug, PartialEq)]
pub struct RawRecord {
    pub location: String,
    pub date: NaiveDate,
    pub population: Option<f64>,
    pub counts: [Option<f64>; COUNT_COLUMNS],
    pub extra: Vec<String>,
}

impl RawRecord {
    pub fn count(&self, c: Count) -> Option<f64> {
        self.counts[c as usize]
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RawTable {
    pub layout: Layout,
    pub rows: Vec<RawRecord>,
}

/// A row after imputation and derivation: counts are always present.
#[derive(Clone, Debug, PartialEq)]
pub struct CleanRecord {
    pub location: String,
    pub date: NaiveDate,
    pub population: Option<f64>,
    pub counts: [f64; COUNT_COLUMNS],
    pub extra: Vec<String>,
    /// Percent of cases that died; 0 when undefined
    pub death_rate: f64,
    /// Percent of population with at least one dose; 0 when undefined
    pub vaccination_rate: f64,
    /// Trailing 7-observation means; `None` until a region has 7 observations
    pub new_cases_smoothed: Option<f64>,
    pub new_deaths_smoothed: Option<f64>,
}

impl CleanRecord {
    pub fn count(&self, c: Count) -> f64 {
        self.counts[c as usize]
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CleanTable {
    pub layout: Layout,
    pub rows: Vec<CleanRecord>,
}
