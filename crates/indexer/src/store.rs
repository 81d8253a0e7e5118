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

//! Entity persistence facade.
//!
//! Handlers only ever load by id and save whole entities; saving an id that
//! already exists replaces the stored value. [`MemoryStore`] is the in-process
//! implementation; a durable backend would implement [`EntityStore`] the same
//! way.

use std::collections::HashMap;

use crate::entity::{
    Minipool, NetworkNodeBalanceCheckpoint, NetworkStakerBalanceCheckpoint, Node,
    NodeBalanceCheckpoint, NodeRplStakeTransaction, Protocol, RethTransfer, RewardClaim,
    RewardInterval, Staker, StakerBalanceCheckpoint,
};

/// Typed load/save surface over the entity model. Loads return `None` for
/// never-saved ids; saves are upserts.
pub trait EntityStore {
    fn load_protocol(&self) -> Option<Protocol>;
    fn save_protocol(&mut self, protocol: Protocol);

    fn load_staker(&self, id: &str) -> Option<Staker>;
    fn save_staker(&mut self, staker: Staker);

    fn load_staker_balance_checkpoint(&self, id: &str) -> Option<StakerBalanceCheckpoint>;
    fn save_staker_balance_checkpoint(&mut self, checkpoint: StakerBalanceCheckpoint);

    fn load_network_staker_balance_checkpoint(
        &self,
        id: &str,
    ) -> Option<NetworkStakerBalanceCheckpoint>;
    fn save_network_staker_balance_checkpoint(
        &mut self,
        checkpoint: NetworkStakerBalanceCheckpoint,
    );

    fn load_node(&self, id: &str) -> Option<Node>;
    fn save_node(&mut self, node: Node);

    fn load_minipool(&self, id: &str) -> Option<Minipool>;
    fn save_minipool(&mut self, minipool: Minipool);

    fn load_node_balance_checkpoint(&self, id: &str) -> Option<NodeBalanceCheckpoint>;
    fn save_node_balance_checkpoint(&mut self, checkpoint: NodeBalanceCheckpoint);

    fn load_network_node_balance_checkpoint(
        &self,
        id: &str,
    ) -> Option<NetworkNodeBalanceCheckpoint>;
    fn save_network_node_balance_checkpoint(&mut self, checkpoint: NetworkNodeBalanceCheckpoint);

    fn load_reward_interval(&self, id: &str) -> Option<RewardInterval>;
    fn save_reward_interval(&mut self, interval: RewardInterval);

    fn load_reward_claim(&self, id: &str) -> Option<RewardClaim>;
    fn save_reward_claim(&mut self, claim: RewardClaim);

    fn load_reth_transfer(&self, id: &str) -> Option<RethTransfer>;
    fn save_reth_transfer(&mut self, transfer: RethTransfer);

    fn load_node_rpl_stake_transaction(&self, id: &str) -> Option<NodeRplStakeTransaction>;
    fn save_node_rpl_stake_transaction(&mut self, transaction: NodeRplStakeTransaction);
}

/// HashMap-backed store. Iteration order never leaks into results: handlers
/// drive all multi-entity walks from the ordered id sets on [`Protocol`] or
/// from checkpoint chain links.
#[derive(Debug, Default)]
pub struct MemoryStore {
    protocol: Option<Protocol>,
    stakers: HashMap<String, Staker>,
    staker_balance_checkpoints: HashMap<String, StakerBalanceCheckpoint>,
    network_staker_balance_checkpoints: HashMap<String, NetworkStakerBalanceCheckpoint>,
    nodes: HashMap<String, Node>,
    minipools: HashMap<String, Minipool>,
    node_balance_checkpoints: HashMap<String, NodeBalanceCheckpoint>,
    network_node_balance_checkpoints: HashMap<String, NetworkNodeBalanceCheckpoint>,
    reward_intervals: HashMap<String, RewardInterval>,
    reward_claims: HashMap<String, RewardClaim>,
    reth_transfers: HashMap<String, RethTransfer>,
    node_rpl_stake_transactions: HashMap<String, NodeRplStakeTransaction>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn staker_balance_checkpoint_count(&self) -> usize {
        self.staker_balance_checkpoints.len()
    }

    pub fn network_staker_balance_checkpoint_count(&self) -> usize {
        self.network_staker_balance_checkpoints.len()
    }

    pub fn network_node_balance_checkpoint_count(&self) -> usize {
        self.network_node_balance_checkpoints.len()
    }

    pub fn reward_claim_count(&self) -> usize {
        self.reward_claims.len()
    }
}

impl EntityStore for MemoryStore {
    fn load_protocol(&self) -> Option<Protocol> {
        self.protocol.clone()
    }

    fn save_protocol(&mut self, protocol: Protocol) {
        self.protocol = Some(protocol);
    }

    fn load_staker(&self, id: &str) -> Option<Staker> {
        self.stakers.get(id).cloned()
    }

    fn save_staker(&mut self, staker: Staker) {
        self.stakers.insert(staker.id.clone(), staker);
    }

    fn load_staker_balance_checkpoint(&self, id: &str) -> Option<StakerBalanceCheckpoint> {
        self.staker_balance_checkpoints.get(id).cloned()
    }

    fn save_staker_balance_checkpoint(&mut self, checkpoint: StakerBalanceCheckpoint) {
        self.staker_balance_checkpoints.insert(checkpoint.id.clone(), checkpoint);
    }

    fn load_network_staker_balance_checkpoint(
        &self,
        id: &str,
    ) -> Option<NetworkStakerBalanceCheckpoint> {
        self.network_staker_balance_checkpoints.get(id).cloned()
    }

    fn save_network_staker_balance_checkpoint(
        &mut self,
        checkpoint: NetworkStakerBalanceCheckpoint,
    ) {
        self.network_staker_balance_checkpoints.insert(checkpoint.id.clone(), checkpoint);
    }

    fn load_node(&self, id: &str) -> Option<Node> {
        self.nodes.get(id).cloned()
    }

    fn save_node(&mut self, node: Node) {
        self.nodes.insert(node.id.clone(), node);
    }

    fn load_minipool(&self, id: &str) -> Option<Minipool> {
        self.minipools.get(id).cloned()
    }

    fn save_minipool(&mut self, minipool: Minipool) {
        self.minipools.insert(minipool.id.clone(), minipool);
    }

    fn load_node_balance_checkpoint(&self, id: &str) -> Option<NodeBalanceCheckpoint> {
        self.node_balance_checkpoints.get(id).cloned()
    }

    fn save_node_balance_checkpoint(&mut self, checkpoint: NodeBalanceCheckpoint) {
        self.node_balance_checkpoints.insert(checkpoint.id.clone(), checkpoint);
    }

    fn load_network_node_balance_checkpoint(
        &self,
        id: &str,
    ) -> Option<NetworkNodeBalanceCheckpoint> {
        self.network_node_balance_checkpoints.get(id).cloned()
    }

    fn save_network_node_balance_checkpoint(&mut self, checkpoint: NetworkNodeBalanceCheckpoint) {
        self.network_node_balance_checkpoints.insert(checkpoint.id.clone(), checkpoint);
    }

    fn load_reward_interval(&self, id: &str) -> Option<RewardInterval> {
        self.reward_intervals.get(id).cloned()
    }

    fn save_reward_interval(&mut self, interval: RewardInterval) {
        self.reward_intervals.insert(interval.id.clone(), interval);
    }

    fn load_reward_claim(&self, id: &str) -> Option<RewardClaim> {
        self.reward_claims.get(id).cloned()
    }

    fn save_reward_claim(&mut self, claim: RewardClaim) {
        self.reward_claims.insert(claim.id.clone(), claim);
    }

    fn load_reth_transfer(&self, id: &str) -> Option<RethTransfer> {
        self.reth_transfers.get(id).cloned()
    }

    fn save_reth_transfer(&mut self, transfer: RethTransfer) {
        self.reth_transfers.insert(transfer.id.clone(), transfer);
    }

    fn load_node_rpl_stake_transaction(&self, id: &str) -> Option<NodeRplStakeTransaction> {
        self.node_rpl_stake_transactions.get(id).cloned()
    }

    fn save_node_rpl_stake_transaction(&mut self, transaction: NodeRplStakeTransaction) {
        self.node_rpl_stake_transactions.insert(transaction.id.clone(), transaction);
    }
}
