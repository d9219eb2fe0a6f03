use network_connections::ConnectionStateMachine;
use network_errors::NetworkError;
use network_models::ConnectionStatus;
use test_utils::memory_store;

#[tokio::test]
async fn test_request_creates_pending_record() {
    let machine = ConnectionStateMachine::new(memory_store());

    let request = machine.request("alice", "bob").await.unwrap();

    assert_eq!(request.status, ConnectionStatus::Pending);
    assert_eq!(request.requester_id, "alice");
    assert_eq!(request.target_id, "bob");
    assert_eq!(request.id, "alice:bob");
    assert!(request.resolved_at.is_none());
}

#[tokio::test]
async fn test_duplicate_request_conflicts_in_either_direction() {
    let machine = ConnectionStateMachine::new(memory_store());

    machine.request("alice", "bob").await.unwrap();

    assert!(matches!(
        machine.request("alice", "bob").await,
        Err(NetworkError::Conflict)
    ));
    // The id is symmetric: the reverse direction collides too.
    assert!(matches!(
        machine.request("bob", "alice").await,
        Err(NetworkError::Conflict)
    ));
}

#[tokio::test]
async fn test_request_against_resolved_pair_still_conflicts() {
    let machine = ConnectionStateMachine::new(memory_store());

    let request = machine.request("alice", "bob").await.unwrap();
    machine.accept(&request.id, "bob").await.unwrap();

    // Resolved records occupy the pair until their ttl elapses.
    assert!(matches!(
        machine.request("alice", "bob").await,
        Err(NetworkError::Conflict)
    ));
}

#[tokio::test]
async fn test_request_validation() {
    let machine = ConnectionStateMachine::new(memory_store());

    assert!(matches!(
        machine.request("", "bob").await,
        Err(NetworkError::Validation { .. })
    ));
    assert!(matches!(
        machine.request("alice", "  ").await,
        Err(NetworkError::Validation { .. })
    ));
    assert!(matches!(
        machine.request("alice", "alice").await,
        Err(NetworkError::Validation { .. })
    ));
}

#[tokio::test]
async fn test_accept_by_target_resolves_the_request() {
    let machine = ConnectionStateMachine::new(memory_store());

    let request = machine.request("alice", "bob").await.unwrap();
    let accepted = machine.accept(&request.id, "bob").await.unwrap();

    assert_eq!(accepted.status, ConnectionStatus::Accepted);
    assert!(accepted.resolved_at.is_some());
}

#[tokio::test]
async fn test_reject_by_target_resolves_the_request() {
    let machine = ConnectionStateMachine::new(memory_store());

    let request = machine.request("alice", "bob").await.unwrap();
    let rejected = machine.reject(&request.id, "bob").await.unwrap();

    assert_eq!(rejected.status, ConnectionStatus::Rejected);
    assert!(rejected.resolved_at.is_some());
}

#[tokio::test]
async fn test_requester_cannot_resolve_their_own_request() {
    let machine = ConnectionStateMachine::new(memory_store());

    let request = machine.request("alice", "bob").await.unwrap();

    assert!(matches!(
        machine.accept(&request.id, "alice").await,
        Err(NetworkError::Unauthorized)
    ));
    assert!(matches!(
        machine.reject(&request.id, "alice").await,
        Err(NetworkError::Unauthorized)
    ));
}

#[tokio::test]
async fn test_non_participant_sees_not_found() {
    let machine = ConnectionStateMachine::new(memory_store());

    let request = machine.request("alice", "bob").await.unwrap();

    assert!(matches!(
        machine.accept(&request.id, "mallory").await,
        Err(NetworkError::NotFound)
    ));
}

#[tokio::test]
async fn test_missing_record_is_not_found() {
    let machine = ConnectionStateMachine::new(memory_store());

    assert!(matches!(
        machine.accept("alice:bob", "bob").await,
        Err(NetworkError::NotFound)
    ));
}

#[tokio::test]
async fn test_terminal_record_cannot_transition_again() {
    let machine = ConnectionStateMachine::new(memory_store());

    let request = machine.request("alice", "bob").await.unwrap();
    machine.accept(&request.id, "bob").await.unwrap();

    assert!(matches!(
        machine.reject(&request.id, "bob").await,
        Err(NetworkError::NotFound)
    ));
    assert!(matches!(
        machine.accept(&request.id, "bob").await,
        Err(NetworkError::NotFound)
    ));
}

#[tokio::test]
async fn test_racing_resolvers_settle_to_one_winner() {
    let store = memory_store();
    let machine = ConnectionStateMachine::new(store.clone());

    let request = machine.request("alice", "bob").await.unwrap();

    let accept = machine.accept(&request.id, "bob");
    let reject = machine.reject(&request.id, "bob");
    let (accepted, rejected) = tokio::join!(accept, reject);

    // Exactly one transition lands; the loser reads as already-terminal.
    assert_eq!(
        accepted.is_ok() as usize + rejected.is_ok() as usize,
        1,
        "exactly one resolver must win"
    );
}
