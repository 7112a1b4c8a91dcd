/// How the recorded backup relates to the installed Spotify version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackupStatus {
    /// No backup has been recorded.
    Empty,
    /// The backup was taken from a different Spotify version.
    Outdated,
    /// The backup matches the installed version.
    Current,
}

impl BackupStatus {
    pub fn of(installed: &str, recorded: &str) -> Self {
        if recorded.is_empty() {
            BackupStatus::Empty
        } else if recorded != installed {
            BackupStatus::Outdated
        } else {
            BackupStatus::Current
        }
    }
}

impl std::fmt::Display for BackupStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackupStatus::Empty => write!(f, "empty"),
            BackupStatus::Outdated => write!(f, "outdated"),
            BackupStatus::Current => write!(f, "current"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_record_is_empty_regardless_of_installed() {
        assert_eq!(BackupStatus::of("", ""), BackupStatus::Empty);
        assert_eq!(BackupStatus::of("1.2.0", ""), BackupStatus::Empty);
    }

    #[test]
    fn test_matching_versions_are_current() {
        assert_eq!(BackupStatus::of("1.2.0", "1.2.0"), BackupStatus::Current);
    }

    #[test]
    fn test_mismatched_versions_are_outdated() {
        assert_eq!(BackupStatus::of("1.3.0", "1.2.0"), BackupStatus::Outdated);
        assert_eq!(BackupStatus::of("", "1.2.0"), BackupStatus::Outdated);
    }

    #[test]
    fn test_truth_table() {
        let versions = ["", "1.1.10.546", "1.2.0", "1.3.0"];
        for installed in versions {
            for recorded in versions {
                let expected = if recorded.is_empty() {
                    BackupStatus::Empty
                } else if installed == recorded {
                    BackupStatus::Current
                } else {
                    BackupStatus::Outdated
                };
                assert_eq!(
                    BackupStatus::of(installed, recorded),
                    expected,
                    "installed={installed:?} recorded={recorded:?}"
                );
            }
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(BackupStatus::Outdated.to_string(), "outdated");
    }
}
