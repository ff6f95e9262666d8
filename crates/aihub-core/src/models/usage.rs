use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Daily,
    Weekly,
    Monthly,
}

impl Period {
    pub const ALL: [Period; 3] = [Period::Daily, Period::Weekly, Period::Monthly];

    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Daily => "daily",
            Period::Weekly => "weekly",
            Period::Monthly => "monthly",
        }
    }
}

impl std::str::FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "daily" => Ok(Period::Daily),
            "weekly" => Ok(Period::Weekly),
            "monthly" => Ok(Period::Monthly),
            other => Err(format!("unknown period: {other}")),
        }
    }
}

/// One usage row. Multiple rows may exist per (service, period) pair;
/// aggregation sums across exact period matches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageStats {
    /// AI service id (weak reference into the registry).
    pub ai_service: String,
    pub messages_count: u64,
    pub tokens_used: u64,
    pub cost: f64,
    pub period: Period,
}

/// Sums over all rows matching one period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodTotals {
    pub messages_count: u64,
    pub tokens_used: u64,
    pub cost: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_roundtrip() {
        for period in Period::ALL {
            let parsed: Period = period.as_str().parse().unwrap();
            assert_eq!(parsed, period);
        }
        assert!("yearly".parse::<Period>().is_err());
    }

    #[test]
    fn test_period_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Period::Weekly).unwrap(), "\"weekly\"");
    }
}
