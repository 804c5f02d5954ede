//! Admin allow-list and usage statistics.

use std::collections::HashSet;
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use database::{message, pair, user, Database};

use crate::error::Result;

/// Identities allowed to run admin commands.
///
/// An empty policy refuses everyone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdminPolicy {
    admins: HashSet<i64>,
}

impl AdminPolicy {
    /// Nobody is an admin.
    pub fn none() -> Self {
        Self::default()
    }

    /// A single admin.
    pub fn single(user_id: i64) -> Self {
        Self::from_ids([user_id])
    }

    /// Build from any set of identities.
    pub fn from_ids(ids: impl IntoIterator<Item = i64>) -> Self {
        Self {
            admins: ids.into_iter().collect(),
        }
    }

    /// Check whether `user_id` may run admin commands.
    pub fn allows(&self, user_id: i64) -> bool {
        self.admins.contains(&user_id)
    }

    pub fn is_empty(&self) -> bool {
        self.admins.is_empty()
    }

    pub fn len(&self) -> usize {
        self.admins.len()
    }
}

/// Parses a comma-separated list of identities, e.g. `"123, 456"`.
/// Blank entries are skipped, so an empty string yields an empty policy.
impl FromStr for AdminPolicy {
    type Err = ParseIntError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let ids = s
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(i64::from_str)
            .collect::<std::result::Result<HashSet<_>, _>>()?;

        Ok(Self { admins: ids })
    }
}

/// Aggregate counters shown by `/stats`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    pub total_users: i64,
    /// Users seen in the last 24 hours.
    pub active_users: i64,
    pub total_pairs: i64,
    /// Pairs whose receiver has started the bot.
    pub resolved_pairs: i64,
    pub total_messages: i64,
}

impl Stats {
    /// Read all counters from the store.
    pub async fn collect(db: &Database) -> Result<Self> {
        let pool = db.pool();

        Ok(Self {
            total_users: user::count_users(pool).await?,
            active_users: user::count_active_users(pool).await?,
            total_pairs: pair::count_pairs(pool).await?,
            resolved_pairs: pair::count_resolved_pairs(pool).await?,
            total_messages: message::count_messages(pool).await?,
        })
    }

    /// Resolved pairs as a percentage of all pairs, or `None` with no pairs.
    pub fn conversion_rate(&self) -> Option<f64> {
        if self.total_pairs == 0 {
            return None;
        }
        Some(self.resolved_pairs as f64 / self.total_pairs as f64 * 100.0)
    }
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "📊 Bot Statistics 📊")?;
        writeln!(f)?;
        writeln!(f, "Total Users: {}", self.total_users)?;
        writeln!(f, "Active Users (24h): {}", self.active_users)?;
        writeln!(f, "Total Valentine Pairs: {}", self.total_pairs)?;
        writeln!(f, "Completed Pairs: {}", self.resolved_pairs)?;
        writeln!(f, "Total Messages Exchanged: {}", self.total_messages)?;
        writeln!(f)?;
        match self.conversion_rate() {
            Some(rate) => write!(f, "Conversion Rate: {:.2}%", rate),
            None => write!(f, "Conversion Rate: n/a"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_parse() {
        let policy: AdminPolicy = "123, 456,".parse().unwrap();
        assert!(policy.allows(123));
        assert!(policy.allows(456));
        assert!(!policy.allows(789));
        assert_eq!(policy.len(), 2);

        let empty: AdminPolicy = "".parse().unwrap();
        assert!(empty.is_empty());
        assert!(!empty.allows(0));

        assert!("12a".parse::<AdminPolicy>().is_err());
    }

    #[test]
    fn test_single_admin() {
        let policy = AdminPolicy::single(7);
        assert!(policy.allows(7));
        assert!(!policy.allows(8));
        assert!(!AdminPolicy::none().allows(7));
    }

    #[test]
    fn test_conversion_rate() {
        let stats = Stats {
            total_pairs: 3,
            resolved_pairs: 1,
            ..Default::default()
        };
        let text = stats.to_string();
        assert!(text.ends_with("Conversion Rate: 33.33%"));

        assert_eq!(Stats::default().conversion_rate(), None);
        assert!(Stats::default().to_string().ends_with("Conversion Rate: n/a"));
    }

    #[test]
    fn test_stats_layout() {
        let stats = Stats {
            total_users: 10,
            active_users: 4,
            total_pairs: 2,
            resolved_pairs: 2,
            total_messages: 17,
        };

        assert_eq!(
            stats.to_string(),
            "📊 Bot Statistics 📊\n\n\
             Total Users: 10\n\
             Active Users (24h): 4\n\
             Total Valentine Pairs: 2\n\
             Completed Pairs: 2\n\
             Total Messages Exchanged: 17\n\n\
             Conversion Rate: 100.00%"
        );
    }
}
