use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Value contributed by each accepted connection.
pub const BASE_CONNECTION_VALUE: f64 = 3.14;

/// Derived per-user network value, stored as a hash under
/// `networkValue:<userId>`. Mutated only through the ledger's increment;
/// readers never write it back wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkValueRecord {
    pub user_id: String,
    pub value: f64,
    pub last_change_at: DateTime<Utc>,
}

/// What one increment did, handed back for downstream broadcast.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueChange {
    pub old_value: f64,
    pub new_value: f64,
}

impl ValueChange {
    pub fn change(&self) -> f64 { self.new_value - self.old_value }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_change_is_delta() {
        let change = ValueChange {
            old_value: 3.14,
            new_value: 6.28,
        };
        assert!((change.change() - 3.14).abs() < 1e-9);
    }
}
