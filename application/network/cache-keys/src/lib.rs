use redis_connection::store_key;

store_key!(ConnectionKey => "connection:{}"[id: str]);
store_key!(NetworkValueKey => "networkValue:{}"[user_id: str]);
store_key!(InviteClicksKey => "invite:{}:clicks"[code: str]);
store_key!(InviteDailyClicksKey => "invite:{}:daily_clicks"[code: str]);
store_key!(CacheEntryKey => "cache:{}:{}"[key_type: str, id: str]);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_namespace() {
        assert_eq!(ConnectionKey::of(("alice:bob",)), "connection:alice:bob");
        assert_eq!(NetworkValueKey::of(("u1",)), "networkValue:u1");
        assert_eq!(InviteClicksKey::of(("ABC123",)), "invite:ABC123:clicks");
        assert_eq!(
            InviteDailyClicksKey::of(("ABC123",)),
            "invite:ABC123:daily_clicks"
        );
        assert_eq!(
            CacheEntryKey::of(("industryList", "u1")),
            "cache:industryList:u1"
        );
    }
}
