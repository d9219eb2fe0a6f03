pub mod connection;
pub mod delta;
pub mod events;
pub mod invite;
pub mod network_value;

pub use connection::{ConnectionRequest, ConnectionStatus};
pub use delta::{GraphDelta, GraphLink, GraphNode, LinkKind, NodeKind};
pub use events::{BroadcastEvent, InboundEvent, OutboundEvent};
pub use invite::InviteAnalytics;
pub use network_value::{
    BASE_CONNECTION_VALUE, NetworkValueRecord, ValueChange,
};
