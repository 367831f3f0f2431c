use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The advertiser's declared campaign goal. It decides which KPIs are primary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Objective {
    Awareness,
    Engagement,
    Traffic,
    Messages,
    AppInstalls,
    InAppActions,
    Leads,
    WebsiteSales,
    Retention,
}

impl Objective {
    pub const ALL: [Objective; 9] = [
        Objective::Awareness,
        Objective::Engagement,
        Objective::Traffic,
        Objective::Messages,
        Objective::AppInstalls,
        Objective::InAppActions,
        Objective::Leads,
        Objective::WebsiteSales,
        Objective::Retention,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Objective::Awareness => "awareness",
            Objective::Engagement => "engagement",
            Objective::Traffic => "traffic",
            Objective::Messages => "messages",
            Objective::AppInstalls => "app_installs",
            Objective::InAppActions => "in_app_actions",
            Objective::Leads => "leads",
            Objective::WebsiteSales => "website_sales",
            Objective::Retention => "retention",
        }
    }
}

impl fmt::Display for Objective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Objective {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Objective::ALL
            .into_iter()
            .find(|o| o.as_str() == wanted)
            .ok_or_else(|| CoreError::InvalidInput("objective".to_string(), s.to_string()))
    }
}

/// Which way is "better" for a KPI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    HigherIsBetter,
    LowerIsBetter,
}

impl Direction {
    /// Cost metrics are lower-is-better; rates, returns and counts are higher-is-better.
    pub fn for_metric(metric: &str) -> Self {
        match metric {
            "cpc" | "cpm" | "cpl" | "cpa" => Direction::LowerIsBetter,
            m if m.starts_with("cost_per_") => Direction::LowerIsBetter,
            _ => Direction::HigherIsBetter,
        }
    }
}

/// The outcome of comparing an actual KPI value against a benchmark band.
///
/// Variants are declared worst-to-best so the derived `Ord` ranks them,
/// with `NoData` below everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerformanceStatus {
    NoData,
    Poor,
    BelowAverage,
    Average,
    Good,
    Excellent,
}

impl PerformanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PerformanceStatus::NoData => "no_data",
            PerformanceStatus::Poor => "poor",
            PerformanceStatus::BelowAverage => "below_average",
            PerformanceStatus::Average => "average",
            PerformanceStatus::Good => "good",
            PerformanceStatus::Excellent => "excellent",
        }
    }
}

impl fmt::Display for PerformanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bucket size for KPI timeseries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    #[default]
    Day,
    Week,
    Month,
}

impl FromStr for Granularity {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "day" | "daily" => Ok(Granularity::Day),
            "week" | "weekly" => Ok(Granularity::Week),
            "month" | "monthly" => Ok(Granularity::Month),
            other => Err(CoreError::InvalidInput(
                "granularity".to_string(),
                other.to_string(),
            )),
        }
    }
}

/// Account classification dimensions that benchmark groups can be refined by.
/// Industry is always part of a group key and is therefore not listed here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Platform,
    FunnelStage,
    UserJourney,
    SubIndustry,
    HasPixelData,
}

impl FromStr for Dimension {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "platform" => Ok(Dimension::Platform),
            "funnel_stage" => Ok(Dimension::FunnelStage),
            "user_journey" => Ok(Dimension::UserJourney),
            "sub_industry" => Ok(Dimension::SubIndustry),
            "has_pixel_data" => Ok(Dimension::HasPixelData),
            other => Err(CoreError::InvalidInput("dimension".to_string(), other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn objective_parses_case_insensitively() {
        assert_eq!("Website_Sales".parse::<Objective>().unwrap(), Objective::WebsiteSales);
        assert_eq!(" leads ".parse::<Objective>().unwrap(), Objective::Leads);
        assert!("rocket_science".parse::<Objective>().is_err());
    }

    #[test]
    fn objective_names_round_trip_through_display() {
        for objective in Objective::ALL {
            assert_eq!(objective.to_string().parse::<Objective>().unwrap(), objective);
        }
    }

    #[test]
    fn cost_metrics_are_lower_is_better() {
        for metric in ["cpc", "cpm", "cpl", "cpa", "cost_per_call", "cost_per_result"] {
            assert_eq!(Direction::for_metric(metric), Direction::LowerIsBetter, "{metric}");
        }
        for metric in ["ctr", "cvr", "roas", "engagement_rate", "leads"] {
            assert_eq!(Direction::for_metric(metric), Direction::HigherIsBetter, "{metric}");
        }
    }

    #[test]
    fn status_ordering_ranks_worst_to_best() {
        assert!(PerformanceStatus::NoData < PerformanceStatus::Poor);
        assert!(PerformanceStatus::Poor < PerformanceStatus::BelowAverage);
        assert!(PerformanceStatus::Average < PerformanceStatus::Good);
        assert!(PerformanceStatus::Good < PerformanceStatus::Excellent);
    }

    #[test]
    fn status_serializes_snake_case() {
        let json = serde_json::to_string(&PerformanceStatus::BelowAverage).unwrap();
        assert_eq!(json, "\"below_average\"");
    }
}
