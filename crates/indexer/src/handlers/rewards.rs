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

//! Reward claim intervals and per-claim accounting.
//!
//! The contracts expose only the current interval's start time; the ledger
//! infers interval boundaries from it. A claim whose external start time no
//! longer matches the open interval closes that interval and opens the next
//! one.

use alloy_primitives::{Address, U256};
use anyhow::Result;
use rocketpool_accounting::{classify_reward_claimer, dense_ranks, wei_value, RewardClaimerKind};

use crate::chain::ChainStateReader;
use crate::entity::{
    address_id, Protocol, RewardClaim, RewardInterval, REWARD_INTERVAL_ID_PREFIX,
};
use crate::events::EventMeta;
use crate::indexer::Indexer;
use crate::store::EntityStore;

impl<S: EntityStore, C: ChainStateReader> Indexer<S, C> {
    pub(crate) fn handle_rpl_rewards_claimed(
        &mut self,
        meta: &EventMeta,
        claiming_address: Address,
        claiming_contract: Address,
        amount: U256,
    ) -> Result<()> {
        let claim_id = meta.entity_id();
        if self.store.load_reward_claim(&claim_id).is_some() {
            return Ok(());
        }

        let mut protocol = self.protocol();
        let claimer_id = address_id(&claiming_address);
        let claimer_kind = classify_reward_claimer(
            claiming_contract,
            self.chain.protocol_dao_claim_contract()?,
            self.chain.is_oracle_node(claiming_address)?,
            self.store.load_node(&claimer_id).is_some(),
        );
        let Some(claimer_kind) = claimer_kind else {
            tracing::warn!(
                claimer = %claimer_id,
                contract = %claiming_contract,
                "dropping claim from unrecognized claimer"
            );
            return Ok(());
        };

        let mut interval = self.current_reward_interval(meta, &mut protocol, &claim_id)?;

        let rpl_price = self.chain.rpl_price()?;
        self.store.save_reward_claim(RewardClaim {
            id: claim_id,
            interval_id: interval.id.clone(),
            claimer: claimer_id.clone(),
            claimer_kind,
            amount,
            eth_amount: wei_value(amount, rpl_price),
            block: meta.block_number,
            block_time: meta.block_time,
        });

        interval.total_rpl_claimed += amount;
        interval.claim_count += 1;
        interval.average_rpl_claimed = interval.total_rpl_claimed / U256::from(interval.claim_count);
        interval.tallies.for_kind_mut(claimer_kind).record(amount);
        self.store.save_reward_interval(interval);

        // Node and oracle claims mirror onto the node entity.
        if claimer_kind != RewardClaimerKind::ProtocolDao {
            if let Some(mut node) = self.store.load_node(&claimer_id) {
                node.claimed_rewards.for_kind_mut(claimer_kind).record(amount);
                self.store.save_node(node);
            }
        }
        self.rank_nodes_by_claimed_rewards(&protocol);

        self.store.save_protocol(protocol);
        Ok(())
    }

    /// Returns the open interval for this claim, closing the previous one
    /// and opening a new one when the external interval start time has
    /// moved.
    fn current_reward_interval(
        &mut self,
        meta: &EventMeta,
        protocol: &mut Protocol,
        claim_id: &str,
    ) -> Result<RewardInterval> {
        let external_start = self.chain.claim_interval_start_time()?;
        let open = protocol
            .last_reward_interval
            .as_deref()
            .and_then(|id| self.store.load_reward_interval(id));

        if let Some(interval) = open {
            if interval.start_time == external_start {
                return Ok(interval);
            }
            let mut closed = interval;
            closed.is_closed = true;
            closed.closed_time = Some(meta.block_time);
            // A start time recorded ahead of this event's block time would
            // produce a negative span; fall back to the nominal duration.
            closed.duration_actual =
                meta.block_time.checked_sub(closed.start_time).unwrap_or(closed.duration);

            let next = RewardInterval::open(
                format!("{REWARD_INTERVAL_ID_PREFIX}{claim_id}"),
                Some(closed.id.clone()),
                external_start,
                self.chain.claim_interval_duration()?,
                self.chain.claim_interval_rewards_total()?,
                meta,
            );
            closed.next_interval_id = Some(next.id.clone());
            tracing::info!(
                closed = %closed.id,
                opened = %next.id,
                duration_actual = closed.duration_actual,
                "reward interval rollover"
            );
            self.store.save_reward_interval(closed);
            protocol.last_reward_interval = Some(next.id.clone());
            return Ok(next);
        }

        let first = RewardInterval::open(
            format!("{REWARD_INTERVAL_ID_PREFIX}{claim_id}"),
            None,
            external_start,
            self.chain.claim_interval_duration()?,
            self.chain.claim_interval_rewards_total()?,
            meta,
        );
        protocol.last_reward_interval = Some(first.id.clone());
        Ok(first)
    }

    /// Reassigns dense claimed-RPL ranks across all registered nodes,
    /// highest total first, earlier registration winning ties.
    fn rank_nodes_by_claimed_rewards(&mut self, protocol: &Protocol) {
        let mut population = Vec::with_capacity(protocol.nodes.len());
        for node_id in &protocol.nodes {
            if let Some(node) = self.store.load_node(node_id) {
                population.push((node.id.clone(), node.total_claimed_rpl_rewards(), node.block));
            }
        }
        for (node_id, rank) in dense_ranks(population) {
            if let Some(mut node) = self.store.load_node(&node_id) {
                node.total_claimed_rpl_rewards_rank = rank;
                self.store.save_node(node);
            }
        }
    }
}
