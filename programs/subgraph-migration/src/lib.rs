//! L2 side of the subgraph and curator migration from L1.
//!
//! Subgraphs and curator balances travel from L1 as a GRT deposit through
//! the token gateway with an attached message. [`MigrationStateMachine`]
//! decodes the message, creates a disabled shell for each received subgraph
//! under its aliased L2 id, and publishes it once the owner calls
//! [`MigrationStateMachine::finish_transfer_from_l1`].

pub mod alias;
pub mod config;
pub mod curation;
pub mod error;
pub mod events;
pub mod gateway;
pub mod math;
pub mod message;
pub mod processor;
pub mod state;
pub mod token;
pub mod types;

pub use crate::config::{CurationConfig, GatewayConfig, MigrationConfig, ProtocolConfig};
pub use crate::curation::{Curation, LocalCuration};
pub use crate::error::{ErrorKind, MigrationError, MigrationResult};
pub use crate::events::{EventLog, EventType, MigrationEvent};
pub use crate::gateway::{CallhookReceiver, TokenGateway};
pub use crate::message::MigrationMessage;
pub use crate::processor::{MigrationStateMachine, RefundReason};
pub use crate::state::{SubgraphRecord, SubgraphRegistry, TransferRecord, TransferState};
pub use crate::token::{GraphToken, LocalGraphToken};
pub use crate::types::{CallContext, DeploymentId, SubgraphId};
