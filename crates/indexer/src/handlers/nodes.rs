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

//! Node registration, RPL stake movements, and smoothing pool membership.

use alloy_primitives::{Address, U256};
use anyhow::Result;
use rocketpool_accounting::{wei_value, ActiveMinipoolFee};

use crate::chain::ChainStateReader;
use crate::entity::{address_id, Node, NodeRplStakeTransaction, RplStakeKind};
use crate::events::EventMeta;
use crate::indexer::Indexer;
use crate::store::EntityStore;

impl<S: EntityStore, C: ChainStateReader> Indexer<S, C> {
    pub(crate) fn handle_node_registered(&mut self, meta: &EventMeta, node: Address) -> Result<()> {
        let node_id = address_id(&node);
        if self.store.load_node(&node_id).is_some() {
            return Ok(());
        }

        let mut protocol = self.protocol();
        protocol.nodes.insert(node_id.clone());
        tracing::info!(node = %node_id, "node registered");
        self.store.save_node(Node::new(node_id, meta));
        self.store.save_protocol(protocol);
        Ok(())
    }

    /// Records one RPL stake/withdraw/slash and resyncs the node's staked
    /// and effective balances from contract state. Zero-amount movements
    /// and movements for unregistered nodes are dropped.
    pub(crate) fn handle_rpl_stake_movement(
        &mut self,
        meta: &EventMeta,
        node: Address,
        amount: U256,
        kind: RplStakeKind,
    ) -> Result<()> {
        if amount.is_zero() {
            return Ok(());
        }
        let transaction_id = meta.entity_id();
        if self.store.load_node_rpl_stake_transaction(&transaction_id).is_some() {
            return Ok(());
        }
        let node_id = address_id(&node);
        let Some(mut entity) = self.store.load_node(&node_id) else {
            tracing::warn!(node = %node_id, "RPL stake movement for unregistered node");
            return Ok(());
        };

        let rpl_price = self.chain.rpl_price()?;
        self.store.save_node_rpl_stake_transaction(NodeRplStakeTransaction {
            id: transaction_id,
            node_id: entity.id.clone(),
            amount,
            eth_amount: wei_value(amount, rpl_price),
            kind,
            block: meta.block_number,
            block_time: meta.block_time,
        });

        if kind == RplStakeKind::Slashed {
            entity.total_rpl_slashed += amount;
        }
        entity.rpl_staked = self.chain.node_rpl_stake(node)?;
        entity.effective_rpl_staked = self.chain.node_effective_rpl_stake(node)?;
        self.store.save_node(entity);
        Ok(())
    }

    pub(crate) fn handle_smoothing_pool_changed(
        &mut self,
        _meta: &EventMeta,
        node: Address,
        opted_in: bool,
    ) -> Result<()> {
        let node_id = address_id(&node);
        let Some(mut entity) = self.store.load_node(&node_id) else {
            return Ok(());
        };
        entity.smoothing_pool_opted_in = opted_in;
        self.store.save_node(entity);
        Ok(())
    }

    /// Resyncs a node's effective RPL stake and its bounds from contract
    /// state. Minipool transitions move all three.
    pub(crate) fn refresh_node_effective_rpl(
        &mut self,
        node: &mut Node,
        address: Address,
    ) -> Result<()> {
        node.effective_rpl_staked = self.chain.node_effective_rpl_stake(address)?;
        node.minimum_effective_rpl = self.chain.node_minimum_rpl_stake(address)?;
        node.maximum_effective_rpl = self.chain.node_maximum_rpl_stake(address)?;
        Ok(())
    }

    /// Recomputes the node's average commission over its non-finalized,
    /// non-destroyed minipools.
    pub(crate) fn refresh_node_average_minipool_fee(&mut self, node: &mut Node) {
        let mut fees = ActiveMinipoolFee::default();
        for minipool_id in &node.minipools {
            if let Some(minipool) = self.store.load_minipool(minipool_id) {
                fees.observe(
                    minipool.fee,
                    minipool.finalized_block_time,
                    minipool.destroyed_block_time,
                );
            }
        }
        node.average_fee_for_active_minipools = fees.average();
    }
}
