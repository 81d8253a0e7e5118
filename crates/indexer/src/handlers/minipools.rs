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

//! Minipool lifecycle: queued, staking, withdrawable, finalized, destroyed.
//!
//! State times are recorded on the minipool, per-state counters on the
//! owning node. Counter decrements clamp at zero so a transition replayed
//! out of order never underflows.

use alloy_primitives::Address;
use anyhow::Result;

use crate::chain::ChainStateReader;
use crate::entity::{address_id, Minipool, Node};
use crate::events::EventMeta;
use crate::indexer::Indexer;
use crate::store::EntityStore;

impl<S: EntityStore, C: ChainStateReader> Indexer<S, C> {
    pub(crate) fn handle_minipool_created(
        &mut self,
        meta: &EventMeta,
        node: Address,
        minipool: Address,
    ) -> Result<()> {
        let minipool_id = address_id(&minipool);
        if self.store.load_minipool(&minipool_id).is_some() {
            return Ok(());
        }
        let node_id = address_id(&node);
        let Some(mut owner) = self.store.load_node(&node_id) else {
            tracing::warn!(node = %node_id, minipool = %minipool_id, "minipool for unregistered node");
            return Ok(());
        };

        let fee = self.chain.node_fee()?;
        owner.minipools.insert(minipool_id.clone());
        owner.queued_minipools += 1;
        self.store.save_minipool(Minipool::new(minipool_id, node_id, fee, meta));

        self.refresh_node_effective_rpl(&mut owner, node)?;
        self.refresh_node_average_minipool_fee(&mut owner);
        self.store.save_node(owner);
        Ok(())
    }

    pub(crate) fn handle_minipool_entered_staking(
        &mut self,
        meta: &EventMeta,
        minipool: Address,
    ) -> Result<()> {
        let Some((mut pool, mut owner)) = self.minipool_with_node(minipool) else {
            return Ok(());
        };
        if pool.staking_block_time != 0 {
            return Ok(());
        }
        pool.staking_block_time = meta.block_time;
        owner.queued_minipools = owner.queued_minipools.saturating_sub(1);
        owner.staking_minipools += 1;
        self.store.save_minipool(pool);
        self.store.save_node(owner);
        Ok(())
    }

    pub(crate) fn handle_minipool_marked_withdrawable(
        &mut self,
        meta: &EventMeta,
        minipool: Address,
    ) -> Result<()> {
        let Some((mut pool, mut owner)) = self.minipool_with_node(minipool) else {
            return Ok(());
        };
        if pool.withdrawable_block_time != 0 {
            return Ok(());
        }
        pool.withdrawable_block_time = meta.block_time;
        owner.staking_minipools = owner.staking_minipools.saturating_sub(1);
        owner.withdrawable_minipools += 1;
        self.store.save_minipool(pool);
        self.store.save_node(owner);
        Ok(())
    }

    pub(crate) fn handle_minipool_finalized(
        &mut self,
        meta: &EventMeta,
        minipool: Address,
    ) -> Result<()> {
        let Some((mut pool, mut owner)) = self.minipool_with_node(minipool) else {
            return Ok(());
        };
        if pool.finalized_block_time != 0 {
            return Ok(());
        }
        pool.finalized_block_time = meta.block_time;
        owner.withdrawable_minipools = owner.withdrawable_minipools.saturating_sub(1);
        owner.total_finalized_minipools += 1;
        self.store.save_minipool(pool.clone());

        // Finalization releases collateral and drops the pool from the fee
        // average.
        let address: Address = pool.node_id.parse()?;
        self.refresh_node_effective_rpl(&mut owner, address)?;
        self.refresh_node_average_minipool_fee(&mut owner);
        self.store.save_node(owner);
        Ok(())
    }

    pub(crate) fn handle_minipool_destroyed(
        &mut self,
        meta: &EventMeta,
        minipool: Address,
    ) -> Result<()> {
        let Some((mut pool, mut owner)) = self.minipool_with_node(minipool) else {
            return Ok(());
        };
        if pool.destroyed_block_time != 0 {
            return Ok(());
        }
        pool.destroyed_block_time = meta.block_time;
        if pool.withdrawable_block_time != 0 {
            owner.withdrawable_minipools = owner.withdrawable_minipools.saturating_sub(1);
        } else if pool.staking_block_time != 0 {
            owner.staking_minipools = owner.staking_minipools.saturating_sub(1);
        } else {
            owner.queued_minipools = owner.queued_minipools.saturating_sub(1);
        }
        self.store.save_minipool(pool.clone());

        let address: Address = pool.node_id.parse()?;
        self.refresh_node_effective_rpl(&mut owner, address)?;
        self.refresh_node_average_minipool_fee(&mut owner);
        self.store.save_node(owner);
        Ok(())
    }

    pub(crate) fn handle_unbonded_validator_added(
        &mut self,
        _meta: &EventMeta,
        node: Address,
    ) -> Result<()> {
        let Some(mut owner) = self.store.load_node(&address_id(&node)) else {
            return Ok(());
        };
        owner.staking_unbonded_minipools += 1;
        self.store.save_node(owner);
        Ok(())
    }

    pub(crate) fn handle_unbonded_validator_removed(
        &mut self,
        _meta: &EventMeta,
        node: Address,
    ) -> Result<()> {
        let Some(mut owner) = self.store.load_node(&address_id(&node)) else {
            return Ok(());
        };
        owner.staking_unbonded_minipools = owner.staking_unbonded_minipools.saturating_sub(1);
        self.store.save_node(owner);
        Ok(())
    }

    /// Loads a minipool and its owning node, or `None` when either side is
    /// unknown.
    fn minipool_with_node(&self, minipool: Address) -> Option<(Minipool, Node)> {
        let pool = self.store.load_minipool(&address_id(&minipool))?;
        let owner = self.store.load_node(&pool.node_id)?;
        Some((pool, owner))
    }
}
