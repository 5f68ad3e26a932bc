//! Degree ranking and highest-degree resolution

/// Display label for the merged Masters/JD rank
pub const GRADUATE_LABEL: &str = "Masters/JD";

/// Display label for unrecognised degree strings
pub const UNKNOWN_LABEL: &str = "Unknown";

/// Ordinal rank of an educational degree. Lower is more advanced.
///
/// `Unknown` sorts after every numeric rank so it is only ever the minimum
/// when nothing better is present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DegreeRank {
    Doctorate,
    Graduate,
    Undergraduate,
    Unknown,
}

impl DegreeRank {
    /// Numeric rank (1 = PhD, 2 = Masters/JD, 3 = Bachelors); `None` for unknown.
    pub fn ordinal(self) -> Option<u8> {
        match self {
            DegreeRank::Doctorate => Some(1),
            DegreeRank::Graduate => Some(2),
            DegreeRank::Undergraduate => Some(3),
            DegreeRank::Unknown => None,
        }
    }
}

/// Rank a degree label. Blank or absent labels have no rank.
pub fn rank_of(label: Option<&str>) -> Option<DegreeRank> {
    let label = label.map(str::trim).filter(|s| !s.is_empty())?;
    Some(match label {
        "PhD" => DegreeRank::Doctorate,
        "Masters" | "JD" => DegreeRank::Graduate,
        "Bachelors" => DegreeRank::Undergraduate,
        _ => DegreeRank::Unknown,
    })
}

/// Inverse of [`rank_of`]. Masters and JD collapse into one label.
pub fn label_of(rank: Option<DegreeRank>) -> Option<&'static str> {
    rank.map(|rank| match rank {
        DegreeRank::Doctorate => "PhD",
        DegreeRank::Graduate => GRADUATE_LABEL,
        DegreeRank::Undergraduate => "Bachelors",
        DegreeRank::Unknown => UNKNOWN_LABEL,
    })
}

/// Most advanced degree among the given observations.
pub fn highest_degree(labels: &[Option<&str>]) -> Option<&'static str> {
    label_of(labels.iter().filter_map(|label| rank_of(*label)).min())
}
