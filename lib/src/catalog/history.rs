use chrono::{DateTime, Utc};

use crate::error::Result;

/// Where element timestamps come from: the commit history of the record.
pub trait HistoryProvider: Send + Sync {
    /// Commit times touching `path`, relative to the repository root, newest
    /// first.
    fn commits(&self, path: &str) -> Result<Vec<DateTime<Utc>>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timestamps {
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

impl Timestamps {
    /// The oldest commit is the creation time and the newest the last
    /// modification. Without commits, both are `now`.
    pub fn from_commits(commits: &[DateTime<Utc>], now: DateTime<Utc>) -> Timestamps {
        match (commits.iter().min(), commits.iter().max()) {
            (Some(&created), Some(&modified)) => Timestamps { created, modified },
            _ => Timestamps { created: now, modified: now },
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn oldest_and_newest() {
        let day = |d| Utc.with_ymd_and_hms(2023, 1, d, 0, 0, 0).unwrap();
        let now = day(31);

        let stamps = Timestamps::from_commits(&[day(9), day(1), day(4)], now);
        assert_eq!(stamps, Timestamps { created: day(1), modified: day(9) });

        let stamps = Timestamps::from_commits(&[], now);
        assert_eq!(stamps, Timestamps { created: now, modified: now });
    }
}
