use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Click analytics for one invite code. Daily buckets are keyed by ISO
/// date (`YYYY-MM-DD`); counts only ever grow.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InviteAnalytics {
    pub total_clicks: i64,
    pub daily_clicks: BTreeMap<String, i64>,
}
