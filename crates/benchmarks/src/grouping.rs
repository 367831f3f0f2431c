use core_types::{AccountProfile, CoreError, Dimension};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

const UNSPECIFIED: &str = "unspecified";

/// The optional dimensions benchmark groups are refined by. Industry is
/// always part of the key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DimensionSet {
    dimensions: BTreeSet<Dimension>,
}

impl DimensionSet {
    pub fn industry_only() -> Self {
        Self::default()
    }

    pub fn with(mut self, dimension: Dimension) -> Self {
        self.dimensions.insert(dimension);
        self
    }

    /// Parses dimension names such as `["platform", "funnel_stage"]`.
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Result<Self, CoreError> {
        let dimensions = names
            .iter()
            .map(|n| n.as_ref().parse::<Dimension>())
            .collect::<Result<BTreeSet<_>, _>>()?;
        Ok(Self { dimensions })
    }

    pub fn contains(&self, dimension: Dimension) -> bool {
        self.dimensions.contains(&dimension)
    }

    /// The group an account belongs to under this dimension set.
    pub fn key_for(&self, profile: &AccountProfile) -> GroupKey {
        let text = |dimension: Dimension, value: Option<&str>| {
            self.contains(dimension)
                .then(|| normalize(value.unwrap_or(UNSPECIFIED)))
        };

        GroupKey {
            industry: normalize(&profile.industry),
            platform: text(Dimension::Platform, Some(&profile.platform)),
            funnel_stage: text(Dimension::FunnelStage, profile.funnel_stage.as_deref()),
            user_journey: text(Dimension::UserJourney, profile.user_journey.as_deref()),
            sub_industry: text(Dimension::SubIndustry, profile.sub_industry.as_deref()),
            has_pixel_data: self
                .contains(Dimension::HasPixelData)
                .then_some(profile.has_pixel_data),
        }
    }
}

fn normalize(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return UNSPECIFIED.to_string();
    }
    trimmed.to_lowercase()
}

/// Identifies a benchmark peer group. Fields are `None` when the dimension
/// was not requested.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct GroupKey {
    pub industry: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub funnel_stage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_journey: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_industry: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_pixel_data: Option<bool>,
}

impl fmt::Display for GroupKey {
    /// `industry` alone, or `industry/platform=meta/...` with refinements.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.industry)?;
        let parts = [
            ("platform", self.platform.clone()),
            ("funnel_stage", self.funnel_stage.clone()),
            ("user_journey", self.user_journey.clone()),
            ("sub_industry", self.sub_industry.clone()),
            ("has_pixel_data", self.has_pixel_data.map(|b| b.to_string())),
        ];
        for (name, value) in parts {
            if let Some(value) = value {
                write!(f, "/{name}={value}")?;
            }
        }
        Ok(())
    }
}
