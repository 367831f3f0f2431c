//! Resolution of a campaign's canonical "results" count.
//!
//! Different campaigns report success through different counters: a lead-gen
//! campaign's result is a lead, a sales campaign's is a purchase, a WhatsApp
//! campaign's is a conversation (reported as a conversion). The rules below are
//! applied in a fixed order, and ties are broken by list order rather than by
//! magnitude, so the summary and breakdown views always agree on
//! cost-per-result.

use core_types::{CampaignMeta, MetricAggregate};
use serde::Serialize;

/// The raw counter a results figure was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultsSource {
    Conversions,
    Leads,
    Purchases,
    Calls,
    /// Every candidate counter was zero.
    None,
}

/// Which rule picked the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionRule {
    CampaignName,
    DeclaredObjective,
    FirstNonZero,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResolvedResults {
    pub count: u64,
    pub source: ResultsSource,
    pub rule: ResolutionRule,
}

/// Name keywords, checked in order. The first keyword found wins even if its
/// counter is zero.
const NAME_KEYWORDS: [(&str, ResultsSource); 6] = [
    ("whatsapp", ResultsSource::Conversions),
    ("message", ResultsSource::Conversions),
    ("lead", ResultsSource::Leads),
    ("purchase", ResultsSource::Purchases),
    ("sales", ResultsSource::Purchases),
    ("call", ResultsSource::Calls),
];

/// Declared-objective fragments, checked in order.
const OBJECTIVE_KEYWORDS: [(&str, ResultsSource); 3] = [
    ("lead", ResultsSource::Leads),
    ("sale", ResultsSource::Purchases),
    ("call", ResultsSource::Calls),
];

/// Fallback priority when neither name nor objective is conclusive.
const FALLBACK_ORDER: [ResultsSource; 4] = [
    ResultsSource::Leads,
    ResultsSource::Purchases,
    ResultsSource::Calls,
    ResultsSource::Conversions,
];

/// Resolves the results count for a single row.
pub fn resolve_results(agg: &MetricAggregate) -> ResolvedResults {
    if let Some((source, rule)) = declared_source(agg.campaign.as_ref()) {
        return ResolvedResults {
            count: counter(agg, source),
            source,
            rule,
        };
    }

    let source = FALLBACK_ORDER
        .into_iter()
        .find(|s| counter(agg, *s) > 0)
        .unwrap_or(ResultsSource::None);

    ResolvedResults {
        count: counter(agg, source),
        source,
        rule: ResolutionRule::FirstNonZero,
    }
}

/// Applies the name and objective rules. `None` means the counters decide.
fn declared_source(campaign: Option<&CampaignMeta>) -> Option<(ResultsSource, ResolutionRule)> {
    let campaign = campaign?;

    let name = campaign.name.to_lowercase();
    if let Some((_, source)) = NAME_KEYWORDS.iter().find(|(kw, _)| name.contains(kw)) {
        return Some((*source, ResolutionRule::CampaignName));
    }

    let objective = campaign.objective.as_deref()?.to_lowercase();
    OBJECTIVE_KEYWORDS
        .iter()
        .find(|(kw, _)| objective.contains(kw))
        .map(|(_, source)| (*source, ResolutionRule::DeclaredObjective))
}

fn counter(agg: &MetricAggregate, source: ResultsSource) -> u64 {
    match source {
        ResultsSource::Conversions => agg.conversions,
        ResultsSource::Leads => agg.leads,
        ResultsSource::Purchases => agg.purchases,
        ResultsSource::Calls => agg.calls,
        ResultsSource::None => 0,
    }
}
