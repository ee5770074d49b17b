use ethereum_types::{Address, H256, U256};
use tracing::{debug, info, warn};

use crate::{
    alias::l2_subgraph_id,
    config::MigrationConfig,
    curation::Curation,
    error::{MigrationError, MigrationResult},
    events::{EventLog, MigrationEvent},
    math::{checked_add, mul_div},
    message::MigrationMessage,
    state::{SubgraphRecord, SubgraphRegistry, TransferRecord, TransferState, TransferStatus},
    token::GraphToken,
    types::{CallContext, DeploymentId, SubgraphId},
};

/// Why a curator balance message was refunded instead of credited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefundReason {
    SubgraphMissing,
    TransferNotFinalized,
    SubgraphDisabled,
    BelowMinimumDeposit,
}

/// State before a call, restored if the call fails.
struct Checkpoint<C, T> {
    registry: SubgraphRegistry,
    curation: C,
    token: T,
    events: usize,
}

/// Receives subgraphs and curator balances sent from L1 and publishes the
/// received subgraphs once their owners finish the transfer.
///
/// Every entry point is atomic: on `Err` the registry, the curation pools,
/// the token balances and the event log are exactly as before the call.
#[derive(Debug, Clone)]
pub struct MigrationStateMachine<C, T> {
    config: MigrationConfig,
    registry: SubgraphRegistry,
    curation: C,
    token: T,
    events: EventLog,
}

impl<C, T> MigrationStateMachine<C, T>
where
    C: Curation + Clone,
    T: GraphToken + Clone,
{
    pub fn new(config: MigrationConfig, curation: C, token: T) -> Self {
        Self::with_registry(config, SubgraphRegistry::new(), curation, token)
    }

    pub fn with_registry(
        config: MigrationConfig,
        registry: SubgraphRegistry,
        curation: C,
        token: T,
    ) -> Self {
        Self {
            config,
            registry,
            curation,
            token,
            events: EventLog::new(),
        }
    }

    pub fn config(&self) -> &MigrationConfig {
        &self.config
    }

    pub fn registry(&self) -> &SubgraphRegistry {
        &self.registry
    }

    /// Direct store access for hosts seeding or migrating storage. Bypasses
    /// every check.
    pub fn registry_mut(&mut self) -> &mut SubgraphRegistry {
        &mut self.registry
    }

    pub fn curation(&self) -> &C {
        &self.curation
    }

    pub fn curation_mut(&mut self) -> &mut C {
        &mut self.curation
    }

    pub fn token(&self) -> &T {
        &self.token
    }

    pub fn token_mut(&mut self) -> &mut T {
        &mut self.token
    }

    pub fn events(&self) -> &EventLog {
        &self.events
    }

    pub(crate) fn emit(&mut self, event: MigrationEvent) {
        self.events.emit(event);
    }

    fn checkpoint(&self) -> Checkpoint<C, T> {
        Checkpoint {
            registry: self.registry.clone(),
            curation: self.curation.clone(),
            token: self.token.clone(),
            events: self.events.len(),
        }
    }

    fn rollback(&mut self, checkpoint: Checkpoint<C, T>) {
        self.registry = checkpoint.registry;
        self.curation = checkpoint.curation;
        self.token = checkpoint.token;
        self.events.truncate(checkpoint.events);
    }

    /// Runs `f` as one transition: either all of its effects apply or none.
    pub fn transact<R>(
        &mut self,
        f: impl FnOnce(&mut Self) -> MigrationResult<R>,
    ) -> MigrationResult<R> {
        let checkpoint = self.checkpoint();
        match f(self) {
            Ok(value) => Ok(value),
            Err(err) => {
                warn!(error = %err, code = err.code(), "call reverted");
                self.rollback(checkpoint);
                Err(err)
            }
        }
    }

    // ---------------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------------

    pub fn get_aliased_l2_subgraph_id(&self, l1_subgraph_id: SubgraphId) -> SubgraphId {
        l2_subgraph_id(l1_subgraph_id)
    }

    pub fn subgraph(&self, id: &SubgraphId) -> Option<&SubgraphRecord> {
        self.registry.subgraph(id)
    }

    pub fn transfer(&self, id: &SubgraphId) -> Option<&TransferRecord> {
        self.registry.transfer(id)
    }

    pub fn transfer_state(&self, id: &SubgraphId) -> TransferState {
        self.registry.transfer_state(id)
    }

    pub fn owner_of(&self, id: &SubgraphId) -> Option<Address> {
        self.registry.owner_of(id)
    }

    pub fn curator_signal(&self, id: &SubgraphId, curator: &Address) -> u128 {
        self.registry.curator_signal(id, curator)
    }

    /// Converts pool signal into subgraph signal at the subgraph's current
    /// ratio; 1:1 while the subgraph holds no signal.
    pub fn v_signal_to_n_signal(&self, id: &SubgraphId, v_signal: u128) -> MigrationResult<u128> {
        match self.registry.subgraph(id) {
            Some(record) if record.v_signal > 0 => {
                mul_div(record.n_signal, v_signal, record.v_signal)
            }
            _ => Ok(v_signal),
        }
    }

    /// `None` if a curator balance for `l2_id` would be credited.
    pub fn curator_balance_refund_reason(
        &self,
        l2_id: &SubgraphId,
        tokens: u128,
    ) -> Option<RefundReason> {
        let record = match self.registry.subgraph(l2_id) {
            Some(record) => record,
            None => return Some(RefundReason::SubgraphMissing),
        };
        if self.registry.transfer_state(l2_id) != TransferState::Finalized {
            return Some(RefundReason::TransferNotFinalized);
        }
        if record.disabled {
            return Some(RefundReason::SubgraphDisabled);
        }
        if tokens < self.curation.minimum_curation_deposit() {
            return Some(RefundReason::BelowMinimumDeposit);
        }
        None
    }

    // ---------------------------------------------------------------------
    // Gateway callhook
    // ---------------------------------------------------------------------

    /// Entry point for tokens and a message arriving from L1. `ctx.caller`
    /// must be the gateway and `from` the L1 counterpart; the gateway has
    /// already credited `amount` to `to`.
    pub fn on_incoming_transfer(
        &mut self,
        ctx: &CallContext,
        from: Address,
        to: Address,
        amount: u128,
        payload: &[u8],
    ) -> MigrationResult<()> {
        self.transact(|sm| sm.process_incoming_transfer(ctx, from, to, amount, payload))
    }

    fn process_incoming_transfer(
        &mut self,
        ctx: &CallContext,
        from: Address,
        to: Address,
        amount: u128,
        payload: &[u8],
    ) -> MigrationResult<()> {
        if ctx.caller != self.config.gateway {
            return Err(MigrationError::NotGateway);
        }
        if from != self.config.l1_counterpart {
            return Err(MigrationError::NotL1Peer);
        }

        let message = MigrationMessage::unpack(payload)?;
        // Deposits and refunds are paid out of the registry's own balance
        if to != self.config.registry {
            return Err(MigrationError::WrongRecipient);
        }
        debug!(amount, "incoming transfer from L1");

        match message {
            MigrationMessage::ReceiveSubgraph {
                l1_subgraph_id,
                beneficiary,
            } => {
                info!("Message: ReceiveSubgraph");
                self.process_receive_subgraph(ctx, l1_subgraph_id, beneficiary, amount)
            }
            MigrationMessage::ReceiveCuratorBalance {
                l1_subgraph_id,
                beneficiary,
            } => {
                info!("Message: ReceiveCuratorBalance");
                self.process_receive_curator_balance(l1_subgraph_id, beneficiary, amount)
            }
        }
    }

    fn process_receive_subgraph(
        &mut self,
        ctx: &CallContext,
        l1_subgraph_id: SubgraphId,
        beneficiary: Address,
        tokens: u128,
    ) -> MigrationResult<()> {
        let l2_id = l2_subgraph_id(l1_subgraph_id);

        // A finished transfer cannot take a new deposit; do not strand it
        if self.registry.transfer_state(&l2_id) == TransferState::Finalized {
            warn!(subgraph = %l2_id, "subgraph already transferred, returning tokens");
            return self.return_to_beneficiary(l1_subgraph_id, beneficiary, tokens);
        }

        // A record without a transfer was published on L2; it is not ours to touch
        if self.registry.exists(&l2_id) && self.registry.transfer(&l2_id).is_none() {
            warn!(subgraph = %l2_id, "aliased id taken by an L2 subgraph, returning tokens");
            return self.return_to_beneficiary(l1_subgraph_id, beneficiary, tokens);
        }

        if self.registry.insert_shell_if_absent(l2_id) {
            info!(l1 = %l1_subgraph_id, l2 = %l2_id, "created subgraph shell");
        }
        self.registry.assign_owner_if_absent(l2_id, beneficiary);

        let locked_tokens = if tokens < self.curation.minimum_curation_deposit() {
            self.return_to_beneficiary(l1_subgraph_id, beneficiary, tokens)?;
            0
        } else {
            tokens
        };

        // Redelivery while pending re-sets the deposit rather than adding to it
        self.registry
            .set_transfer(l2_id, TransferRecord::pending(locked_tokens, ctx.block_number));

        self.emit(MigrationEvent::SubgraphReceivedFromL1 {
            l1_subgraph_id,
            l2_subgraph_id: l2_id,
            owner: beneficiary,
            tokens,
        });
        Ok(())
    }

    fn process_receive_curator_balance(
        &mut self,
        l1_subgraph_id: SubgraphId,
        beneficiary: Address,
        tokens: u128,
    ) -> MigrationResult<()> {
        let l2_id = l2_subgraph_id(l1_subgraph_id);

        if let Some(reason) = self.curator_balance_refund_reason(&l2_id, tokens) {
            info!(subgraph = %l2_id, ?reason, "returning curator balance");
            return self.return_to_beneficiary(l1_subgraph_id, beneficiary, tokens);
        }

        let deployment_id = self
            .registry
            .subgraph(&l2_id)
            .map(|record| record.deployment_id)
            .ok_or(MigrationError::NotTransferred)?;

        let v_signal = self.deposit_tax_free(&deployment_id, tokens)?;
        let n_signal = self.v_signal_to_n_signal(&l2_id, v_signal)?;
        self.add_signal(&l2_id, v_signal, n_signal)?;
        self.registry
            .add_curator_signal(l2_id, beneficiary, n_signal)?;

        self.emit(MigrationEvent::SignalMinted {
            subgraph_id: l2_id,
            curator: beneficiary,
            n_signal,
            v_signal,
            tokens,
        });
        self.emit(MigrationEvent::CuratorBalanceReceived {
            l1_subgraph_id,
            l2_subgraph_id: l2_id,
            curator: beneficiary,
            tokens,
        });
        Ok(())
    }

    fn return_to_beneficiary(
        &mut self,
        l1_subgraph_id: SubgraphId,
        beneficiary: Address,
        tokens: u128,
    ) -> MigrationResult<()> {
        let registry = self.config.registry;
        self.token.transfer(&registry, &beneficiary, tokens)?;
        self.emit(MigrationEvent::CuratorBalanceReturnedToBeneficiary {
            l1_subgraph_id,
            curator: beneficiary,
            tokens,
        });
        Ok(())
    }

    /// Moves custodied tokens to curation and mints without tax.
    fn deposit_tax_free(&mut self, deployment_id: &DeploymentId, tokens: u128) -> MigrationResult<u128> {
        let (registry, curation) = (self.config.registry, self.config.curation);
        self.token.transfer(&registry, &curation, tokens)?;
        self.curation.mint_tax_free(deployment_id, tokens)
    }

    fn add_signal(&mut self, id: &SubgraphId, v_signal: u128, n_signal: u128) -> MigrationResult<()> {
        let record = self
            .registry
            .subgraph_mut(id)
            .ok_or(MigrationError::NotTransferred)?;
        record.v_signal = checked_add(record.v_signal, v_signal)?;
        record.n_signal = checked_add(record.n_signal, n_signal)?;
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Owner entry points
    // ---------------------------------------------------------------------

    fn require_owner(&self, ctx: &CallContext, id: &SubgraphId) -> MigrationResult<Address> {
        match self.registry.owner_of(id) {
            Some(owner) if owner == ctx.caller && self.registry.exists(id) => Ok(owner),
            _ => Err(MigrationError::NotOwner),
        }
    }

    /// Publishes a subgraph received from L1 and mints its locked deposit
    /// as signal for the owner. Callable once per transfer.
    pub fn finish_transfer_from_l1(
        &mut self,
        ctx: &CallContext,
        subgraph_id: SubgraphId,
        deployment_id: DeploymentId,
        subgraph_metadata: H256,
        version_metadata: H256,
    ) -> MigrationResult<()> {
        self.transact(|sm| {
            sm.process_finish_transfer(
                ctx,
                subgraph_id,
                deployment_id,
                subgraph_metadata,
                version_metadata,
            )
        })
    }

    fn process_finish_transfer(
        &mut self,
        ctx: &CallContext,
        subgraph_id: SubgraphId,
        deployment_id: DeploymentId,
        subgraph_metadata: H256,
        version_metadata: H256,
    ) -> MigrationResult<()> {
        let owner = self.require_owner(ctx, &subgraph_id)?;
        let locked_tokens = match self.registry.transfer_state(&subgraph_id) {
            TransferState::Untransferred => return Err(MigrationError::NotTransferred),
            TransferState::Finalized => return Err(MigrationError::AlreadyFinalized),
            TransferState::Shelled { locked_tokens } => locked_tokens,
        };
        if deployment_id.is_zero() {
            return Err(MigrationError::ZeroDeployment);
        }

        // The curation minimum would reject an empty deposit
        let v_signal = if locked_tokens > 0 {
            self.deposit_tax_free(&deployment_id, locked_tokens)?
        } else {
            0
        };
        let n_signal = self.v_signal_to_n_signal(&subgraph_id, v_signal)?;

        let record = self
            .registry
            .subgraph_mut(&subgraph_id)
            .ok_or(MigrationError::NotOwner)?;
        record.deployment_id = deployment_id;
        record.disabled = false;
        let reserve_ratio = record.reserve_ratio;
        self.add_signal(&subgraph_id, v_signal, n_signal)?;
        self.registry
            .add_curator_signal(subgraph_id, owner, n_signal)?;

        if let Some(transfer) = self.registry.transfer_mut(&subgraph_id) {
            transfer.status = TransferStatus::Finalized;
        }

        info!(
            subgraph = %subgraph_id,
            deployment = ?deployment_id,
            v_signal,
            n_signal,
            "finished subgraph transfer from L1"
        );

        self.emit(MigrationEvent::SubgraphPublished {
            subgraph_id,
            deployment_id,
            reserve_ratio,
        });
        self.emit(MigrationEvent::SubgraphMetadataUpdated {
            subgraph_id,
            metadata: subgraph_metadata,
        });
        self.emit(MigrationEvent::SubgraphUpgraded {
            subgraph_id,
            v_signal,
            tokens: locked_tokens,
            deployment_id,
        });
        self.emit(MigrationEvent::SubgraphVersionUpdated {
            subgraph_id,
            deployment_id,
            version_metadata,
        });
        self.emit(MigrationEvent::SubgraphL2TransferFinalized {
            l2_subgraph_id: subgraph_id,
        });
        self.emit(MigrationEvent::SignalMinted {
            subgraph_id,
            curator: owner,
            n_signal,
            v_signal,
            tokens: locked_tokens,
        });
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Local subgraph operations
    // ---------------------------------------------------------------------

    /// Publishes a subgraph created on L2 itself.
    pub fn publish_new_subgraph(
        &mut self,
        ctx: &CallContext,
        deployment_id: DeploymentId,
        version_metadata: H256,
        subgraph_metadata: H256,
    ) -> MigrationResult<SubgraphId> {
        self.transact(|sm| {
            if deployment_id.is_zero() {
                return Err(MigrationError::ZeroDeployment);
            }
            let seq = sm.registry.next_account_seq(ctx.caller);
            let subgraph_id = SubgraphId::derive(
                &ctx.caller,
                U256::from(seq),
                U256::from(sm.config.chain_id),
            );
            let mut record = SubgraphRecord::published(deployment_id);
            record.reserve_ratio = sm.config.fixed_reserve_ratio;
            let reserve_ratio = record.reserve_ratio;
            sm.registry.create(subgraph_id, record)?;
            sm.registry.set_owner(subgraph_id, ctx.caller);

            info!(subgraph = %subgraph_id, owner = ?ctx.caller, "published subgraph");
            sm.emit(MigrationEvent::SubgraphPublished {
                subgraph_id,
                deployment_id,
                reserve_ratio,
            });
            sm.emit(MigrationEvent::SubgraphMetadataUpdated {
                subgraph_id,
                metadata: subgraph_metadata,
            });
            sm.emit(MigrationEvent::SubgraphVersionUpdated {
                subgraph_id,
                deployment_id,
                version_metadata,
            });
            Ok(subgraph_id)
        })
    }

    /// Curates `tokens` of the caller's GRT on an active subgraph. Returns
    /// `(n_signal, v_signal)`.
    pub fn mint_signal(
        &mut self,
        ctx: &CallContext,
        subgraph_id: SubgraphId,
        tokens: u128,
        min_n_signal: u128,
    ) -> MigrationResult<(u128, u128)> {
        self.transact(|sm| {
            let deployment_id = match sm.registry.subgraph(&subgraph_id) {
                Some(record) if !record.disabled => record.deployment_id,
                _ => return Err(MigrationError::SubgraphDisabled),
            };

            let curation = sm.config.curation;
            sm.token.transfer(&ctx.caller, &curation, tokens)?;
            let (v_signal, tax) = sm.curation.mint(&deployment_id, tokens, 0)?;
            sm.token.burn(&curation, tax)?;

            let n_signal = sm.v_signal_to_n_signal(&subgraph_id, v_signal)?;
            if n_signal < min_n_signal {
                return Err(MigrationError::SlippageProtection);
            }
            sm.add_signal(&subgraph_id, v_signal, n_signal)?;
            sm.registry
                .add_curator_signal(subgraph_id, ctx.caller, n_signal)?;

            sm.emit(MigrationEvent::SignalMinted {
                subgraph_id,
                curator: ctx.caller,
                n_signal,
                v_signal,
                tokens,
            });
            Ok((n_signal, v_signal))
        })
    }

    /// Owner-only. Burns the subgraph's pool signal into withdrawable tokens
    /// held by the registry and disables the subgraph for good.
    pub fn deprecate_subgraph(
        &mut self,
        ctx: &CallContext,
        subgraph_id: SubgraphId,
    ) -> MigrationResult<u128> {
        self.transact(|sm| {
            sm.require_owner(ctx, &subgraph_id)?;
            let record = sm
                .registry
                .subgraph(&subgraph_id)
                .cloned()
                .ok_or(MigrationError::NotOwner)?;
            if record.disabled {
                return Err(MigrationError::SubgraphDisabled);
            }

            let withdrawable_tokens = if record.v_signal > 0 {
                let tokens = sm.curation.burn(&record.deployment_id, record.v_signal, 0)?;
                let (curation, registry) = (sm.config.curation, sm.config.registry);
                sm.token.transfer(&curation, &registry, tokens)?;
                tokens
            } else {
                0
            };

            sm.registry.disable(&subgraph_id)?;
            if let Some(record) = sm.registry.subgraph_mut(&subgraph_id) {
                record.v_signal = 0;
                record.withdrawable_tokens = withdrawable_tokens;
            }
            sm.registry.burn_owner(&subgraph_id);

            info!(subgraph = %subgraph_id, withdrawable_tokens, "deprecated subgraph");
            sm.emit(MigrationEvent::SubgraphDeprecated {
                subgraph_id,
                withdrawable_tokens,
            });
            Ok(withdrawable_tokens)
        })
    }
}
