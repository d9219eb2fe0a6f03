use std::time::Duration;

/// Key families this subsystem caches. Each carries a fixed freshness
/// policy; nothing reconfigures them at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyType {
    User,
    Network,
    Invite,
    IndustryList,
    InterestList,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    pub ttl_secs: u64,
    pub stale_window_secs: u64,
    /// Entries serializing larger than this are served but never cached.
    pub max_payload_bytes: Option<usize>,
}

impl CachePolicy {
    pub fn ttl(&self) -> Duration { Duration::from_secs(self.ttl_secs) }

    pub fn stale_window(&self) -> Duration {
        Duration::from_secs(self.stale_window_secs)
    }
}

impl KeyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyType::User => "user",
            KeyType::Network => "network",
            KeyType::Invite => "invite",
            KeyType::IndustryList => "industryList",
            KeyType::InterestList => "interestList",
        }
    }

    pub const fn policy(&self) -> CachePolicy {
        match self {
            KeyType::User => {
                CachePolicy {
                    ttl_secs: 3600,
                    stale_window_secs: 600,
                    max_payload_bytes: None,
                }
            }
            // Graph snapshots churn constantly; keep them barely warm.
            KeyType::Network => {
                CachePolicy {
                    ttl_secs: 60,
                    stale_window_secs: 15,
                    max_payload_bytes: None,
                }
            }
            KeyType::Invite => {
                CachePolicy {
                    ttl_secs: 300,
                    stale_window_secs: 60,
                    max_payload_bytes: None,
                }
            }
            KeyType::IndustryList => {
                CachePolicy {
                    ttl_secs: 86400,
                    stale_window_secs: 3600,
                    max_payload_bytes: Some(64 * 1024),
                }
            }
            KeyType::InterestList => {
                CachePolicy {
                    ttl_secs: 86400,
                    stale_window_secs: 3600,
                    max_payload_bytes: Some(64 * 1024),
                }
            }
        }
    }
}
