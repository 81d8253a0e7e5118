// Copyright 2025 Rocket Pool Indexer contributors.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Event-processing driver.
//!
//! One [`Indexer`] owns a store and a chain-state reader and consumes decoded
//! events strictly in on-chain order. Handlers are spread across the
//! `handlers` modules as `impl` blocks on this type.

use anyhow::Result;

use crate::chain::ChainStateReader;
use crate::config::IndexerConfig;
use crate::entity::Protocol;
use crate::events::{Event, EventMeta};
use crate::store::EntityStore;

pub struct Indexer<S, C> {
    pub(crate) store: S,
    pub(crate) chain: C,
    pub(crate) config: IndexerConfig,
}

impl<S: EntityStore, C: ChainStateReader> Indexer<S, C> {
    pub fn new(store: S, chain: C) -> Self {
        Self::with_config(store, chain, IndexerConfig::default())
    }

    pub fn with_config(store: S, chain: C, config: IndexerConfig) -> Self {
        Self { store, chain, config }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Mutable access to the chain-state reader, for moving fixture state
    /// between events.
    pub fn chain_mut(&mut self) -> &mut C {
        &mut self.chain
    }

    /// Applies one event. Events must arrive in (block, log index) order;
    /// replays of already-processed events are no-ops.
    pub fn process(&mut self, meta: &EventMeta, event: &Event) -> Result<()> {
        tracing::debug!(block = meta.block_number, log_index = meta.log_index, ?event, "processing event");
        match event {
            Event::RethTransfer { from, to, amount } => {
                self.handle_reth_transfer(meta, *from, *to, *amount)
            }
            Event::BalancesUpdated => self.handle_balances_updated(meta),
            Event::PricesUpdated { rpl_price } => self.handle_prices_updated(meta, *rpl_price),
            Event::NodeRegistered { node } => self.handle_node_registered(meta, *node),
            Event::NodeSmoothingPoolChanged { node, opted_in } => {
                self.handle_smoothing_pool_changed(meta, *node, *opted_in)
            }
            Event::RplStaked { node, amount } => {
                self.handle_rpl_stake_movement(meta, *node, *amount, crate::entity::RplStakeKind::Staked)
            }
            Event::RplWithdrawn { node, amount } => {
                self.handle_rpl_stake_movement(meta, *node, *amount, crate::entity::RplStakeKind::Withdrawn)
            }
            Event::RplSlashed { node, amount } => {
                self.handle_rpl_stake_movement(meta, *node, *amount, crate::entity::RplStakeKind::Slashed)
            }
            Event::RplRewardsClaimed { claiming_address, claiming_contract, amount } => {
                self.handle_rpl_rewards_claimed(meta, *claiming_address, *claiming_contract, *amount)
            }
            Event::MinipoolCreated { node, minipool } => {
                self.handle_minipool_created(meta, *node, *minipool)
            }
            Event::MinipoolEnteredStaking { minipool } => {
                self.handle_minipool_entered_staking(meta, *minipool)
            }
            Event::MinipoolMarkedWithdrawable { minipool } => {
                self.handle_minipool_marked_withdrawable(meta, *minipool)
            }
            Event::MinipoolFinalized { minipool } => self.handle_minipool_finalized(meta, *minipool),
            Event::MinipoolDestroyed { minipool } => self.handle_minipool_destroyed(meta, *minipool),
            Event::UnbondedValidatorAdded { node } => {
                self.handle_unbonded_validator_added(meta, *node)
            }
            Event::UnbondedValidatorRemoved { node } => {
                self.handle_unbonded_validator_removed(meta, *node)
            }
        }
    }

    /// Loads the protocol singleton, creating it on first use.
    pub(crate) fn protocol(&mut self) -> Protocol {
        match self.store.load_protocol() {
            Some(protocol) => protocol,
            None => {
                let protocol = Protocol::new();
                self.store.save_protocol(protocol.clone());
                protocol
            }
        }
    }
}
