use crate::classifier::ClassifiedMetric;
use core_types::PerformanceStatus;
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightKind {
    Improvement,
    Strength,
    BestPerforming,
    NeedsImprovement,
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightPriority {
    High,
    Medium,
    Low,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Insight {
    #[serde(rename = "type")]
    pub kind: InsightKind,
    /// The KPI or industry the insight is about. Absent for neutral insights.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    pub message: String,
    pub priority: InsightPriority,
}

/// Message templates for one KPI. `{label}`, `{actual}` and `{median}` are
/// substituted when the insight is rendered.
struct InsightTemplate {
    metric: &'static str,
    label: &'static str,
    poor: &'static str,
    below_average: &'static str,
    excellent: &'static str,
}

const TEMPLATES: &[InsightTemplate] = &[
    InsightTemplate {
        metric: "ctr",
        label: "CTR",
        poor: "{label} of {actual}% is well below the industry median of {median}%. Refresh creatives and tighten audience targeting.",
        below_average: "{label} of {actual}% trails the industry median of {median}%. Test new headlines and visuals.",
        excellent: "{label} of {actual}% is in the top quartile for your industry. Your creatives resonate with the audience.",
    },
    InsightTemplate {
        metric: "cpc",
        label: "CPC",
        poor: "{label} of {actual} is well above the industry median of {median}. Review bidding strategy and ad relevance.",
        below_average: "{label} of {actual} is above the industry median of {median}. Improving CTR usually lowers click costs.",
        excellent: "{label} of {actual} is among the lowest in your industry. Clicks are being bought efficiently.",
    },
    InsightTemplate {
        metric: "cpm",
        label: "CPM",
        poor: "{label} of {actual} is well above the industry median of {median}. Broaden audiences or adjust placements.",
        below_average: "{label} of {actual} is above the industry median of {median}. Check audience overlap and frequency.",
        excellent: "{label} of {actual} is among the lowest in your industry. Reach is being bought efficiently.",
    },
    InsightTemplate {
        metric: "cvr",
        label: "Conversion rate",
        poor: "{label} of {actual}% is well below the industry median of {median}%. Review landing pages and the conversion path.",
        below_average: "{label} of {actual}% trails the industry median of {median}%. Test offers and form length.",
        excellent: "{label} of {actual}% is in the top quartile for your industry. Traffic is converting strongly.",
    },
    InsightTemplate {
        metric: "cpl",
        label: "Cost per lead",
        poor: "{label} of {actual} is well above the industry median of {median}. Refine targeting and lead forms.",
        below_average: "{label} of {actual} is above the industry median of {median}. Shift budget to the best-converting campaigns.",
        excellent: "{label} of {actual} is among the lowest in your industry. Lead generation is highly efficient.",
    },
    InsightTemplate {
        metric: "cpa",
        label: "Cost per acquisition",
        poor: "{label} of {actual} is well above the industry median of {median}. Audit the funnel for drop-off points.",
        below_average: "{label} of {actual} is above the industry median of {median}. Optimize bids toward conversions.",
        excellent: "{label} of {actual} is among the lowest in your industry.",
    },
    InsightTemplate {
        metric: "roas",
        label: "ROAS",
        poor: "{label} of {actual} is well below the industry median of {median}. Reallocate spend away from unprofitable campaigns.",
        below_average: "{label} of {actual} trails the industry median of {median}. Review product feed and pricing.",
        excellent: "{label} of {actual} is in the top quartile for your industry. Consider scaling budget.",
    },
];

const GENERIC: InsightTemplate = InsightTemplate {
    metric: "",
    label: "",
    poor: "{label} of {actual} is performing poorly against the industry median of {median}.",
    below_average: "{label} of {actual} is below the industry median of {median}.",
    excellent: "{label} of {actual} is in the top quartile for your industry.",
};

fn template_for(metric: &str) -> &'static InsightTemplate {
    TEMPLATES.iter().find(|t| t.metric == metric).unwrap_or(&GENERIC)
}

fn render(text: &str, label: &str, metric: &ClassifiedMetric) -> String {
    let format = |value: Option<Decimal>| {
        value
            .map(|v| v.round_dp(2).normalize().to_string())
            .unwrap_or_else(|| "n/a".to_string())
    };
    text.replace("{label}", label)
        .replace("{actual}", &format(metric.actual))
        .replace("{median}", &format(metric.band.map(|b| b.p50)))
}

/// Turns classified KPIs into improvement and strength statements.
#[derive(Debug, Clone, Copy, Default)]
pub struct InsightGenerator;

impl InsightGenerator {
    pub fn new() -> Self {
        Self
    }

    /// One insight per poor, below-average or excellent metric, in input order.
    pub fn generate(&self, metrics: &[ClassifiedMetric]) -> Vec<Insight> {
        let insights: Vec<Insight> = metrics.iter().filter_map(|m| self.insight_for(m)).collect();
        tracing::debug!(metrics = metrics.len(), insights = insights.len(), "Generated KPI insights.");
        insights
    }

    fn insight_for(&self, metric: &ClassifiedMetric) -> Option<Insight> {
        let template = template_for(&metric.metric);
        let label = if template.label.is_empty() {
            metric.metric.as_str()
        } else {
            template.label
        };
        let (kind, priority, text) = match metric.status {
            PerformanceStatus::Poor => (InsightKind::Improvement, InsightPriority::High, template.poor),
            PerformanceStatus::BelowAverage => {
                (InsightKind::Improvement, InsightPriority::Medium, template.below_average)
            }
            PerformanceStatus::Excellent => (InsightKind::Strength, InsightPriority::Info, template.excellent),
            PerformanceStatus::NoData | PerformanceStatus::Average | PerformanceStatus::Good => return None,
        };
        Some(Insight {
            kind,
            subject: Some(metric.metric.clone()),
            message: render(text, label, metric),
            priority,
        })
    }
}

/// Mean performance score of a group's classified KPIs, ignoring KPIs
/// without a score.
pub fn mean_performance(metrics: &[ClassifiedMetric]) -> Option<Decimal> {
    let scores: Vec<Decimal> = metrics.iter().filter_map(|m| m.performance).collect();
    if scores.is_empty() {
        return None;
    }
    Some(scores.iter().sum::<Decimal>() / Decimal::from(scores.len()))
}

/// Produces at most one best-performing and one needs-improvement insight
/// from `(industry, classified KPIs)` groups. Always returns at least one
/// insight.
pub fn summarize_industries(groups: &[(String, Vec<ClassifiedMetric>)]) -> Vec<Insight> {
    let mut ranked: Vec<(&str, Decimal)> = groups
        .iter()
        .filter_map(|(name, metrics)| mean_performance(metrics).map(|score| (name.as_str(), score)))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

    let mut insights = Vec::with_capacity(2);
    if let Some((best, score)) = ranked.first() {
        insights.push(Insight {
            kind: InsightKind::BestPerforming,
            subject: Some(best.to_string()),
            message: format!(
                "{best} is the best performing industry with an average performance score of {}.",
                score.round_dp(1)
            ),
            priority: InsightPriority::Info,
        });
    }
    if ranked.len() >= 2 {
        if let Some((worst, score)) = ranked.last() {
            insights.push(Insight {
                kind: InsightKind::NeedsImprovement,
                subject: Some(worst.to_string()),
                message: format!(
                    "{worst} needs improvement with an average performance score of {}.",
                    score.round_dp(1)
                ),
                priority: InsightPriority::Medium,
            });
        }
    }

    if insights.is_empty() {
        insights.push(neutral_insight());
    }
    insights
}

/// Shown when there is not enough data to rank or classify anything.
pub fn neutral_insight() -> Insight {
    Insight {
        kind: InsightKind::Neutral,
        subject: None,
        message: "Not enough benchmark data yet to compare performance. Insights will appear as more accounts report results.".to_string(),
        priority: InsightPriority::Low,
    }
}

/// Shown when KPIs were classified but none stood out either way.
pub fn in_line_insight() -> Insight {
    Insight {
        kind: InsightKind::Neutral,
        subject: None,
        message: "All benchmarked KPIs are in line with your industry.".to_string(),
        priority: InsightPriority::Low,
    }
}
