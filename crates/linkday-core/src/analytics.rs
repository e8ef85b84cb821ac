// ── Link analytics ──
//
// Aggregates derived from a link snapshot. Click counts are whatever the
// server last reported; nothing here talks to the network.

use std::sync::Arc;

use serde::Serialize;

use crate::model::Link;

/// How many links the "top performers" list shows.
pub const TOP_LINKS: usize = 5;

/// How many links the dashboard preview shows.
pub const RECENT_LINKS: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSummary {
    pub total_clicks: u64,
    pub total_links: usize,
    pub active_links: usize,
    /// Mean clicks per link, rounded half away from zero.
    pub average_clicks: u64,
    /// Most-clicked links, highest first.
    pub top_links: Vec<Arc<Link>>,
}

impl AnalyticsSummary {
    pub fn from_links(links: &[Arc<Link>]) -> Self {
        let total_clicks: u64 = links.iter().map(|l| l.clicks).sum();
        let total_links = links.len();
        let active_links = links.iter().filter(|l| l.is_active).count();

        let mut top_links = links.to_vec();
        top_links.sort_by(|a, b| b.clicks.cmp(&a.clicks).then_with(|| a.order.cmp(&b.order)));
        top_links.truncate(TOP_LINKS);

        Self {
            total_clicks,
            total_links,
            active_links,
            average_clicks: rounded_mean(total_clicks, total_links),
            top_links,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardOverview {
    pub total_links: usize,
    pub total_clicks: u64,
    pub recent_links: Vec<Arc<Link>>,
}

impl DashboardOverview {
    pub fn from_links(links: &[Arc<Link>]) -> Self {
        Self {
            total_links: links.len(),
            total_clicks: links.iter().map(|l| l.clicks).sum(),
            recent_links: links.iter().take(RECENT_LINKS).cloned().collect(),
        }
    }
}

fn rounded_mean(total: u64, count: usize) -> u64 {
    let Ok(count) = u64::try_from(count) else {
        return 0;
    };
    if count == 0 {
        return 0;
    }
    (total + count / 2) / count
}
