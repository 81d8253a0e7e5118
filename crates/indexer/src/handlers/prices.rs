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

//! Network node balance checkpoints, cut on each RPL price submission.

use alloy_primitives::{Address, U256};
use anyhow::Result;
use rocketpool_accounting::{
    effective_rpl_bound, network_average_minipool_fee, MinipoolMetadata,
};

use crate::chain::ChainStateReader;
use crate::entity::{NetworkNodeBalanceCheckpoint, NodeBalanceCheckpoint};
use crate::events::EventMeta;
use crate::indexer::Indexer;
use crate::store::EntityStore;

impl<S: EntityStore, C: ChainStateReader> Indexer<S, C> {
    /// Builds a network node balance checkpoint: refreshes every node's
    /// effective RPL at the new price, snapshots each node, and rolls the
    /// per-node state into network totals.
    pub(crate) fn handle_prices_updated(&mut self, meta: &EventMeta, rpl_price: U256) -> Result<()> {
        let checkpoint_id = meta.entity_id();
        if self.config.enforce_checkpoint_dedup
            && self.store.load_network_node_balance_checkpoint(&checkpoint_id).is_some()
        {
            tracing::debug!(id = %checkpoint_id, "node balance checkpoint already indexed");
            return Ok(());
        }

        let mut protocol = self.protocol();
        let fee_for_new_minipool = self.chain.node_fee()?;
        let half_deposit = self.chain.half_deposit_amount()?;
        let minimum_for_new_minipool =
            effective_rpl_bound(half_deposit, self.chain.minimum_per_minipool_stake()?, rpl_price);
        let maximum_for_new_minipool =
            effective_rpl_bound(half_deposit, self.chain.maximum_per_minipool_stake()?, rpl_price);

        let previous = protocol
            .last_network_node_balance_checkpoint
            .as_deref()
            .and_then(|id| self.store.load_network_node_balance_checkpoint(id));

        let mut checkpoint = NetworkNodeBalanceCheckpoint::new(
            checkpoint_id,
            previous.as_ref().map(|cp| cp.id.clone()),
            minimum_for_new_minipool,
            maximum_for_new_minipool,
            rpl_price,
            fee_for_new_minipool,
            meta,
        );

        let mut metadata = MinipoolMetadata::default();
        for node_id in protocol.nodes.clone() {
            let Some(mut node) = self.store.load_node(&node_id) else {
                continue;
            };
            let Ok(address) = node.id.parse::<Address>() else {
                continue;
            };

            // The price change moves every node's effective stake and
            // bounds.
            self.refresh_node_effective_rpl(&mut node, address)?;
            checkpoint.roll_in_node(&node);
            metadata.observe_node(
                node.average_fee_for_active_minipools,
                node.minimum_effective_rpl,
                node.maximum_effective_rpl,
            );

            let record = NodeBalanceCheckpoint::for_node(&checkpoint.id, &node, meta);
            node.last_node_balance_checkpoint = Some(record.id.clone());
            if node.total_claimed_rpl_rewards_rank == 1 {
                checkpoint.checkpoint_with_highest_rpl_rewards_rank = Some(record.id.clone());
            }
            self.store.save_node_balance_checkpoint(record);
            self.store.save_node(node);
        }

        checkpoint.minimum_effective_rpl = metadata.total_minimum_effective_rpl;
        checkpoint.maximum_effective_rpl = metadata.total_maximum_effective_rpl;
        checkpoint.average_fee_for_active_minipools = network_average_minipool_fee(&metadata);

        // Monotone running totals carry over when the fold found nothing,
        // same as on the staker side.
        if let Some(mut previous) = previous {
            if checkpoint.total_claimed_rpl_rewards.is_zero() {
                checkpoint.total_claimed_rpl_rewards = previous.total_claimed_rpl_rewards;
            }
            if checkpoint.total_rpl_slashed.is_zero() {
                checkpoint.total_rpl_slashed = previous.total_rpl_slashed;
            }
            if checkpoint.total_finalized_minipools == 0 {
                checkpoint.total_finalized_minipools = previous.total_finalized_minipools;
            }
            previous.next_checkpoint_id = Some(checkpoint.id.clone());
            self.store.save_network_node_balance_checkpoint(previous);
        }

        protocol.last_network_node_balance_checkpoint = Some(checkpoint.id.clone());
        tracing::info!(
            id = %checkpoint.id,
            nodes = checkpoint.nodes_registered,
            rpl_price = %checkpoint.rpl_price,
            "network node balance checkpoint"
        );
        self.store.save_network_node_balance_checkpoint(checkpoint);
        self.store.save_protocol(protocol);
        Ok(())
    }
}
