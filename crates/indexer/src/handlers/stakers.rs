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

//! rETH transfer tracking and network staker balance checkpoints.

use alloy_primitives::{Address, I256, U256};
use anyhow::Result;
use rocketpool_accounting::{
    apply_balance_change, dense_ranks, eth_rewards_since_checkpoint, to_signed, StakerBalancePair,
};

use crate::chain::ChainStateReader;
use crate::entity::{
    address_id, participant_checkpoint_id, NetworkStakerBalanceCheckpoint, RethTransfer, Staker,
    StakerBalanceCheckpoint,
};
use crate::events::EventMeta;
use crate::indexer::Indexer;
use crate::store::EntityStore;

impl<S: EntityStore, C: ChainStateReader> Indexer<S, C> {
    /// Applies one rETH transfer to both ends. The zero address stands in
    /// for the protocol on mints and burns and never becomes a staker.
    pub(crate) fn handle_reth_transfer(
        &mut self,
        meta: &EventMeta,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<()> {
        let transfer_id = meta.entity_id();
        if self.store.load_reth_transfer(&transfer_id).is_some() {
            return Ok(());
        }

        let mut protocol = self.protocol();
        let exchange_rate = self.chain.reth_exchange_rate()?;
        let from_id = address_id(&from);
        let to_id = address_id(&to);

        self.store.save_reth_transfer(RethTransfer {
            id: transfer_id,
            from: from_id.clone(),
            to: to_id.clone(),
            amount,
            block: meta.block_number,
            block_time: meta.block_time,
        });

        // Ends are applied sequentially through the store so a self-transfer
        // still nets out.
        if from != Address::ZERO {
            let mut sender = self
                .store
                .load_staker(&from_id)
                .unwrap_or_else(|| Staker::new(from_id.clone(), meta));
            (sender.reth_balance, sender.eth_balance) =
                apply_balance_change(sender.reth_balance, amount, exchange_rate, false);
            protocol.stakers.insert(sender.id.clone());
            if sender.reth_balance.is_zero() {
                protocol.active_stakers.remove(&sender.id);
            } else {
                protocol.active_stakers.insert(sender.id.clone());
            }
            self.store.save_staker(sender);
        }
        if to != Address::ZERO {
            let mut receiver = self
                .store
                .load_staker(&to_id)
                .unwrap_or_else(|| Staker::new(to_id.clone(), meta));
            (receiver.reth_balance, receiver.eth_balance) =
                apply_balance_change(receiver.reth_balance, amount, exchange_rate, true);
            protocol.stakers.insert(receiver.id.clone());
            if receiver.reth_balance.is_zero() {
                protocol.active_stakers.remove(&receiver.id);
            } else {
                protocol.active_stakers.insert(receiver.id.clone());
            }
            self.store.save_staker(receiver);
        }

        self.store.save_protocol(protocol);
        Ok(())
    }

    /// Builds a network staker balance checkpoint from contract state and
    /// folds every known staker into it, accruing per-staker ETH rewards
    /// since each staker's previous record.
    pub(crate) fn handle_balances_updated(&mut self, meta: &EventMeta) -> Result<()> {
        let checkpoint_id = meta.entity_id();
        if self.config.enforce_checkpoint_dedup
            && self.store.load_network_staker_balance_checkpoint(&checkpoint_id).is_some()
        {
            tracing::debug!(id = %checkpoint_id, "staker balance checkpoint already indexed");
            return Ok(());
        }

        let mut protocol = self.protocol();
        let exchange_rate = self.chain.reth_exchange_rate()?;
        let deposit_pool_balance = self.chain.deposit_pool_balance()?;
        let excess_balance = self.chain.deposit_pool_excess_balance()?;
        let total_collateral = self.chain.reth_total_collateral()?;

        let previous = protocol
            .last_network_staker_balance_checkpoint
            .as_deref()
            .and_then(|id| self.store.load_network_staker_balance_checkpoint(id));
        let previous_exchange_rate =
            previous.as_ref().map(|cp| cp.reth_exchange_rate).unwrap_or(exchange_rate);

        let mut checkpoint = NetworkStakerBalanceCheckpoint::new(
            checkpoint_id,
            previous.as_ref().map(|cp| cp.id.clone()),
            deposit_pool_balance,
            total_collateral.saturating_sub(excess_balance),
            exchange_rate,
            meta,
        );

        // Per-checkpoint records only exist for stakers holding rETH, but
        // every staker's accrued totals roll into the aggregates.
        let mut ranked = Vec::new();
        for staker_id in protocol.stakers.clone() {
            let Some(mut staker) = self.store.load_staker(&staker_id) else {
                continue;
            };

            let mut balances = StakerBalancePair::new(staker.reth_balance, exchange_rate);
            if let Some(record) = staker
                .last_balance_checkpoint
                .as_deref()
                .and_then(|id| self.store.load_staker_balance_checkpoint(id))
            {
                balances = balances.with_previous(record.reth_balance, record.eth_balance);
            }
            staker.eth_balance = balances.current_eth;

            let accrued =
                eth_rewards_since_checkpoint(&balances, previous_exchange_rate, exchange_rate);
            if accrued != I256::ZERO {
                staker.total_eth_rewards += accrued;
                staker.has_accrued_eth_rewards = true;
            }

            checkpoint.total_staker_eth_rewards += staker.total_eth_rewards;
            if staker.has_accrued_eth_rewards {
                checkpoint.stakers_with_eth_rewards += 1;
            }
            if !staker.reth_balance.is_zero() {
                checkpoint.stakers_with_reth_balance += 1;
                let record = StakerBalanceCheckpoint {
                    id: participant_checkpoint_id(&checkpoint.id, &staker.id),
                    staker_id: staker.id.clone(),
                    network_checkpoint_id: checkpoint.id.clone(),
                    reth_balance: staker.reth_balance,
                    eth_balance: staker.eth_balance,
                    total_eth_rewards: staker.total_eth_rewards,
                    rank: 0,
                    block: meta.block_number,
                    block_time: meta.block_time,
                };
                staker.last_balance_checkpoint = Some(record.id.clone());
                ranked.push((record.id.clone(), staker.total_eth_rewards, staker.block));
                self.store.save_staker_balance_checkpoint(record);
            }
            self.store.save_staker(staker);
        }

        // An all-zero fold means no staker moved since the last checkpoint;
        // running totals carry over rather than collapsing to zero.
        if let Some(mut previous) = previous {
            if checkpoint.total_staker_eth_rewards == I256::ZERO
                && previous.total_staker_eth_rewards != I256::ZERO
            {
                checkpoint.total_staker_eth_rewards = previous.total_staker_eth_rewards;
            }
            if checkpoint.stakers_with_eth_rewards == 0 && previous.stakers_with_eth_rewards != 0 {
                checkpoint.stakers_with_eth_rewards = previous.stakers_with_eth_rewards;
            }
            previous.next_checkpoint_id = Some(checkpoint.id.clone());
            self.store.save_network_staker_balance_checkpoint(previous);
        }

        if checkpoint.total_staker_eth_rewards != I256::ZERO
            && checkpoint.stakers_with_eth_rewards > 0
        {
            checkpoint.average_staker_eth_rewards = checkpoint.total_staker_eth_rewards
                / to_signed(U256::from(checkpoint.stakers_with_eth_rewards));
        }

        for (record_id, rank) in dense_ranks(ranked) {
            if let Some(mut record) = self.store.load_staker_balance_checkpoint(&record_id) {
                record.rank = rank;
                self.store.save_staker_balance_checkpoint(record);
            }
        }

        protocol.last_network_staker_balance_checkpoint = Some(checkpoint.id.clone());
        tracing::info!(
            id = %checkpoint.id,
            stakers_with_reth = checkpoint.stakers_with_reth_balance,
            total_rewards = %checkpoint.total_staker_eth_rewards,
            "network staker balance checkpoint"
        );
        self.store.save_network_staker_balance_checkpoint(checkpoint);
        self.store.save_protocol(protocol);
        Ok(())
    }
}
