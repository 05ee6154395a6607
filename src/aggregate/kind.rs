use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// Numeric reduction applied per (annotation, sample).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregationKind {
    Sum,
    UpSum,
    DownSum,
    Mean,
    UpMean,
    DownMean,
    UpFrac,
    DownFrac,
    ChangedFrac,
    Count,
}

/// Which member values a reduction looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignFilter {
    Any,
    Up,
    Down,
    Changed,
}

impl SignFilter {
    pub fn accepts(self, v: f64) -> bool {
        match self {
            SignFilter::Any => true,
            SignFilter::Up => v > 0.0,
            SignFilter::Down => v < 0.0,
            SignFilter::Changed => v != 0.0,
        }
    }
}

impl AggregationKind {
    pub const ALL: [AggregationKind; 10] = [
        AggregationKind::Sum,
        AggregationKind::UpSum,
        AggregationKind::DownSum,
        AggregationKind::Mean,
        AggregationKind::UpMean,
        AggregationKind::DownMean,
        AggregationKind::UpFrac,
        AggregationKind::DownFrac,
        AggregationKind::ChangedFrac,
        AggregationKind::Count,
    ];

    pub fn label(self) -> &'static str {
        match self {
            AggregationKind::Sum => "sum",
            AggregationKind::UpSum => "up_sum",
            AggregationKind::DownSum => "down_sum",
            AggregationKind::Mean => "mean",
            AggregationKind::UpMean => "up_mean",
            AggregationKind::DownMean => "down_mean",
            AggregationKind::UpFrac => "up_frac",
            AggregationKind::DownFrac => "down_frac",
            AggregationKind::ChangedFrac => "changed_frac",
            AggregationKind::Count => "count",
        }
    }

    /// Appended to the annotation id to form the feature name. Distinct per
    /// kind, and no suffix ends with another.
    pub fn suffix(self) -> &'static str {
        match self {
            AggregationKind::Sum => "_sum",
            AggregationKind::UpSum => "_upsum",
            AggregationKind::DownSum => "_downsum",
            AggregationKind::Mean => "_mean",
            AggregationKind::UpMean => "_upmean",
            AggregationKind::DownMean => "_downmean",
            AggregationKind::UpFrac => "_upfrac",
            AggregationKind::DownFrac => "_downfrac",
            AggregationKind::ChangedFrac => "_changedfrac",
            AggregationKind::Count => "_count",
        }
    }

    pub fn filter(self) -> SignFilter {
        match self {
            AggregationKind::Sum | AggregationKind::Mean | AggregationKind::Count => SignFilter::Any,
            AggregationKind::UpSum | AggregationKind::UpMean | AggregationKind::UpFrac => SignFilter::Up,
            AggregationKind::DownSum | AggregationKind::DownMean | AggregationKind::DownFrac => {
                SignFilter::Down
            }
            AggregationKind::ChangedFrac => SignFilter::Changed,
        }
    }
}

impl fmt::Display for AggregationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for AggregationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AggregationKind::ALL
            .into_iter()
            .find(|k| k.label() == s.trim())
            .ok_or_else(|| {
                let known: Vec<&str> = AggregationKind::ALL.iter().map(|k| k.label()).collect();
                format!("unknown aggregation '{}' (expected one of: {})", s, known.join(", "))
            })
    }
}
