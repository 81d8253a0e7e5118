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

//! The derived entity model: participants, checkpoints, intervals, and
//! event-rooted records.
//!
//! Entities reference each other by string id only (`previous_id` /
//! `next_id` fields resolved through the store), never by in-memory pointer,
//! so the load-by-id access pattern holds everywhere.

use std::collections::BTreeSet;

use alloy_primitives::{Address, I256, U256};
use rocketpool_accounting::{ClaimTally, RewardClaimerKind};
use serde::{Deserialize, Serialize};

use crate::events::EventMeta;

/// Id of the process-wide protocol singleton.
pub const PROTOCOL_ROOT_ID: &str = "rocketpool-protocol";

/// Id prefix for reward intervals.
pub const REWARD_INTERVAL_ID_PREFIX: &str = "rplRewardInterval-";

/// Lower-case hex id for an account address.
pub fn address_id(address: &Address) -> String {
    format!("{address:#x}")
}

/// Composite id for a per-participant record under a network checkpoint.
pub fn participant_checkpoint_id(checkpoint_id: &str, participant_id: &str) -> String {
    format!("{checkpoint_id} - {participant_id}")
}

/// The protocol singleton: links to the latest checkpoints and interval, and
/// the participant id sets. Created lazily on first need, mutated forever.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Protocol {
    pub id: String,
    pub last_network_staker_balance_checkpoint: Option<String>,
    pub last_network_node_balance_checkpoint: Option<String>,
    pub last_reward_interval: Option<String>,
    /// Every staker ever observed.
    pub stakers: BTreeSet<String>,
    /// Stakers with a nonzero rETH balance.
    pub active_stakers: BTreeSet<String>,
    /// Every registered node.
    pub nodes: BTreeSet<String>,
}

impl Protocol {
    pub fn new() -> Self {
        Self { id: PROTOCOL_ROOT_ID.to_string(), ..Default::default() }
    }
}

/// A participant holding rETH. Never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Staker {
    pub id: String,
    pub reth_balance: U256,
    pub eth_balance: U256,
    /// Cumulative ETH rewards, signed: value can be lost on a falling rate.
    pub total_eth_rewards: I256,
    pub has_accrued_eth_rewards: bool,
    pub last_balance_checkpoint: Option<String>,
    pub block: u64,
    pub block_time: u64,
}

impl Staker {
    pub fn new(id: String, meta: &EventMeta) -> Self {
        Self {
            id,
            reth_balance: U256::ZERO,
            eth_balance: U256::ZERO,
            total_eth_rewards: I256::ZERO,
            has_accrued_eth_rewards: false,
            last_balance_checkpoint: None,
            block: meta.block_number,
            block_time: meta.block_time,
        }
    }
}

/// Immutable per-staker snapshot under one network checkpoint. Created only
/// for stakers with a nonzero balance at checkpoint time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StakerBalanceCheckpoint {
    pub id: String,
    pub staker_id: String,
    pub network_checkpoint_id: String,
    pub reth_balance: U256,
    pub eth_balance: U256,
    pub total_eth_rewards: I256,
    /// Dense rank among this checkpoint's records, assigned after all records
    /// for the network checkpoint are generated.
    pub rank: u64,
    pub block: u64,
    pub block_time: u64,
}

/// Protocol-wide staker rollup, one per balance-update event, chained by
/// creation order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkStakerBalanceCheckpoint {
    pub id: String,
    pub previous_checkpoint_id: Option<String>,
    pub next_checkpoint_id: Option<String>,
    pub staker_eth_in_deposit_pool: U256,
    /// Total collateral minus the deposit-pool excess, clamped at zero.
    pub staker_eth_in_protocol: U256,
    pub reth_exchange_rate: U256,
    pub total_staker_eth_rewards: I256,
    pub stakers_with_eth_rewards: u64,
    pub stakers_with_reth_balance: u64,
    pub average_staker_eth_rewards: I256,
    pub block: u64,
    pub block_time: u64,
}

impl NetworkStakerBalanceCheckpoint {
    pub fn new(
        id: String,
        previous_checkpoint_id: Option<String>,
        staker_eth_in_deposit_pool: U256,
        staker_eth_in_protocol: U256,
        reth_exchange_rate: U256,
        meta: &EventMeta,
    ) -> Self {
        Self {
            id,
            previous_checkpoint_id,
            next_checkpoint_id: None,
            staker_eth_in_deposit_pool,
            staker_eth_in_protocol,
            reth_exchange_rate,
            total_staker_eth_rewards: I256::ZERO,
            stakers_with_eth_rewards: 0,
            stakers_with_reth_balance: 0,
            average_staker_eth_rewards: I256::ZERO,
            block: meta.block_number,
            block_time: meta.block_time,
        }
    }
}

/// Per-claimant-class claim tallies, kept on both reward intervals and nodes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimerClassTallies {
    pub protocol_dao: ClaimTally,
    pub oracle_dao: ClaimTally,
    pub node: ClaimTally,
}

impl ClaimerClassTallies {
    pub fn for_kind_mut(&mut self, kind: RewardClaimerKind) -> &mut ClaimTally {
        match kind {
            RewardClaimerKind::ProtocolDao => &mut self.protocol_dao,
            RewardClaimerKind::OracleDao => &mut self.oracle_dao,
            RewardClaimerKind::Node => &mut self.node,
        }
    }

    pub fn total_claimed(&self) -> U256 {
        self.protocol_dao.total_claimed + self.oracle_dao.total_claimed + self.node.total_claimed
    }
}

/// A node operator. Never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    pub rpl_staked: U256,
    pub effective_rpl_staked: U256,
    pub minimum_effective_rpl: U256,
    pub maximum_effective_rpl: U256,
    pub total_rpl_slashed: U256,
    pub average_fee_for_active_minipools: U256,
    pub queued_minipools: u64,
    pub staking_minipools: u64,
    pub staking_unbonded_minipools: u64,
    pub withdrawable_minipools: u64,
    pub total_finalized_minipools: u64,
    pub claimed_rewards: ClaimerClassTallies,
    /// Dense rank by total claimed RPL rewards; 0 until first ranking pass.
    pub total_claimed_rpl_rewards_rank: u64,
    pub smoothing_pool_opted_in: bool,
    pub minipools: BTreeSet<String>,
    pub last_node_balance_checkpoint: Option<String>,
    pub block: u64,
    pub block_time: u64,
}

impl Node {
    pub fn new(id: String, meta: &EventMeta) -> Self {
        Self {
            id,
            rpl_staked: U256::ZERO,
            effective_rpl_staked: U256::ZERO,
            minimum_effective_rpl: U256::ZERO,
            maximum_effective_rpl: U256::ZERO,
            total_rpl_slashed: U256::ZERO,
            average_fee_for_active_minipools: U256::ZERO,
            queued_minipools: 0,
            staking_minipools: 0,
            staking_unbonded_minipools: 0,
            withdrawable_minipools: 0,
            total_finalized_minipools: 0,
            claimed_rewards: ClaimerClassTallies::default(),
            total_claimed_rpl_rewards_rank: 0,
            smoothing_pool_opted_in: false,
            minipools: BTreeSet::new(),
            last_node_balance_checkpoint: None,
            block: meta.block_number,
            block_time: meta.block_time,
        }
    }

    pub fn total_claimed_rpl_rewards(&self) -> U256 {
        self.claimed_rewards.total_claimed()
    }
}

/// A validator minipool owned by one node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Minipool {
    pub id: String,
    pub node_id: String,
    pub fee: U256,
    pub staking_block_time: u64,
    pub withdrawable_block_time: u64,
    pub finalized_block_time: u64,
    pub destroyed_block_time: u64,
    pub block: u64,
    pub block_time: u64,
}

impl Minipool {
    pub fn new(id: String, node_id: String, fee: U256, meta: &EventMeta) -> Self {
        Self {
            id,
            node_id,
            fee,
            staking_block_time: 0,
            withdrawable_block_time: 0,
            finalized_block_time: 0,
            destroyed_block_time: 0,
            block: meta.block_number,
            block_time: meta.block_time,
        }
    }
}

/// Per-node snapshot under one network node balance checkpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeBalanceCheckpoint {
    pub id: String,
    pub node_id: String,
    pub network_checkpoint_id: String,
    pub rpl_staked: U256,
    pub effective_rpl_staked: U256,
    pub minimum_effective_rpl: U256,
    pub maximum_effective_rpl: U256,
    pub total_rpl_slashed: U256,
    pub total_claimed_rpl_rewards: U256,
    pub average_fee_for_active_minipools: U256,
    pub queued_minipools: u64,
    pub staking_minipools: u64,
    pub staking_unbonded_minipools: u64,
    pub withdrawable_minipools: u64,
    pub total_finalized_minipools: u64,
    pub block: u64,
    pub block_time: u64,
}

impl NodeBalanceCheckpoint {
    pub fn for_node(network_checkpoint_id: &str, node: &Node, meta: &EventMeta) -> Self {
        Self {
            id: participant_checkpoint_id(network_checkpoint_id, &node.id),
            node_id: node.id.clone(),
            network_checkpoint_id: network_checkpoint_id.to_string(),
            rpl_staked: node.rpl_staked,
            effective_rpl_staked: node.effective_rpl_staked,
            minimum_effective_rpl: node.minimum_effective_rpl,
            maximum_effective_rpl: node.maximum_effective_rpl,
            total_rpl_slashed: node.total_rpl_slashed,
            total_claimed_rpl_rewards: node.total_claimed_rpl_rewards(),
            average_fee_for_active_minipools: node.average_fee_for_active_minipools,
            queued_minipools: node.queued_minipools,
            staking_minipools: node.staking_minipools,
            staking_unbonded_minipools: node.staking_unbonded_minipools,
            withdrawable_minipools: node.withdrawable_minipools,
            total_finalized_minipools: node.total_finalized_minipools,
            block: meta.block_number,
            block_time: meta.block_time,
        }
    }
}

/// Protocol-wide node rollup, one per price-update event, chained by creation
/// order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkNodeBalanceCheckpoint {
    pub id: String,
    pub previous_checkpoint_id: Option<String>,
    pub next_checkpoint_id: Option<String>,
    pub nodes_registered: u64,
    pub rpl_staked: U256,
    pub effective_rpl_staked: U256,
    /// Grand totals over per-node effective-RPL bounds.
    pub minimum_effective_rpl: U256,
    pub maximum_effective_rpl: U256,
    /// Bounds for collateralizing one new minipool at this price.
    pub minimum_effective_rpl_for_new_minipool: U256,
    pub maximum_effective_rpl_for_new_minipool: U256,
    pub total_rpl_slashed: U256,
    pub total_claimed_rpl_rewards: U256,
    pub queued_minipools: u64,
    pub staking_minipools: u64,
    pub staking_unbonded_minipools: u64,
    pub withdrawable_minipools: u64,
    pub total_finalized_minipools: u64,
    pub rpl_price: U256,
    pub fee_for_new_minipool: U256,
    pub average_fee_for_active_minipools: U256,
    /// Node balance checkpoint of the rank-1 node, when one exists.
    pub checkpoint_with_highest_rpl_rewards_rank: Option<String>,
    pub block: u64,
    pub block_time: u64,
}

impl NetworkNodeBalanceCheckpoint {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: String,
        previous_checkpoint_id: Option<String>,
        minimum_effective_rpl_for_new_minipool: U256,
        maximum_effective_rpl_for_new_minipool: U256,
        rpl_price: U256,
        fee_for_new_minipool: U256,
        meta: &EventMeta,
    ) -> Self {
        Self {
            id,
            previous_checkpoint_id,
            next_checkpoint_id: None,
            nodes_registered: 0,
            rpl_staked: U256::ZERO,
            effective_rpl_staked: U256::ZERO,
            minimum_effective_rpl: U256::ZERO,
            maximum_effective_rpl: U256::ZERO,
            minimum_effective_rpl_for_new_minipool,
            maximum_effective_rpl_for_new_minipool,
            total_rpl_slashed: U256::ZERO,
            total_claimed_rpl_rewards: U256::ZERO,
            queued_minipools: 0,
            staking_minipools: 0,
            staking_unbonded_minipools: 0,
            withdrawable_minipools: 0,
            total_finalized_minipools: 0,
            rpl_price,
            fee_for_new_minipool,
            average_fee_for_active_minipools: U256::ZERO,
            checkpoint_with_highest_rpl_rewards_rank: None,
            block: meta.block_number,
            block_time: meta.block_time,
        }
    }

    /// Order-independent rollup of one node's current state into this
    /// checkpoint's accumulators.
    pub fn roll_in_node(&mut self, node: &Node) {
        self.nodes_registered += 1;
        self.rpl_staked += node.rpl_staked;
        self.effective_rpl_staked += node.effective_rpl_staked;
        self.total_rpl_slashed += node.total_rpl_slashed;
        self.total_claimed_rpl_rewards += node.total_claimed_rpl_rewards();
        self.queued_minipools += node.queued_minipools;
        self.staking_minipools += node.staking_minipools;
        self.staking_unbonded_minipools += node.staking_unbonded_minipools;
        self.withdrawable_minipools += node.withdrawable_minipools;
        self.total_finalized_minipools += node.total_finalized_minipools;
    }
}

/// One reward-claim window. Exactly one interval is open at a time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewardInterval {
    pub id: String,
    pub previous_interval_id: Option<String>,
    pub next_interval_id: Option<String>,
    pub start_time: u64,
    /// Nominal duration, read from external state when the interval opened.
    pub duration: u64,
    /// Set on close: event time minus start, or the nominal duration if that
    /// difference would be negative.
    pub duration_actual: u64,
    pub closed_time: Option<u64>,
    pub is_closed: bool,
    /// Total reward allocation for the interval.
    pub allocation: U256,
    pub total_rpl_claimed: U256,
    pub claim_count: u64,
    pub average_rpl_claimed: U256,
    pub tallies: ClaimerClassTallies,
    pub block: u64,
    pub block_time: u64,
}

impl RewardInterval {
    pub fn open(
        id: String,
        previous_interval_id: Option<String>,
        start_time: u64,
        duration: u64,
        allocation: U256,
        meta: &EventMeta,
    ) -> Self {
        Self {
            id,
            previous_interval_id,
            next_interval_id: None,
            start_time,
            duration,
            duration_actual: 0,
            closed_time: None,
            is_closed: false,
            allocation,
            total_rpl_claimed: U256::ZERO,
            claim_count: 0,
            average_rpl_claimed: U256::ZERO,
            tallies: ClaimerClassTallies::default(),
            block: meta.block_number,
            block_time: meta.block_time,
        }
    }
}

/// Immutable record of one reward claim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewardClaim {
    pub id: String,
    pub interval_id: String,
    pub claimer: String,
    pub claimer_kind: RewardClaimerKind,
    pub amount: U256,
    /// Value of the claim at the RPL/ETH price in effect at claim time.
    pub eth_amount: U256,
    pub block: u64,
    pub block_time: u64,
}

/// Event-rooted record of one rETH transfer; doubles as the transfer dedup
/// marker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RethTransfer {
    pub id: String,
    pub from: String,
    pub to: String,
    pub amount: U256,
    pub block: u64,
    pub block_time: u64,
}

/// Direction of a node RPL stake movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RplStakeKind {
    Staked,
    Withdrawn,
    Slashed,
}

/// Event-rooted record of one node RPL stake movement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeRplStakeTransaction {
    pub id: String,
    pub node_id: String,
    pub amount: U256,
    pub eth_amount: U256,
    pub kind: RplStakeKind,
    pub block: u64,
    pub block_time: u64,
}
