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

//! Reward-claim classification and per-class tallies.

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

/// The class a reward claim is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RewardClaimerKind {
    /// Claimed through the protocol DAO claim contract.
    ProtocolDao,
    /// Claimed by an oracle (trusted-node) DAO member.
    OracleDao,
    /// Claimed by a registered regular node.
    Node,
}

/// Classifies a claim by its claiming contract and claiming address.
///
/// Precedence is fixed: the protocol-DAO claim contract wins over oracle-DAO
/// membership, which wins over regular node registration. `None` means the
/// claim comes from a configuration this ledger does not recognize; the
/// caller must drop it rather than record it under a guessed class.
pub fn classify_reward_claimer(
    claiming_contract: Address,
    protocol_dao_claim_contract: Address,
    is_oracle_node: bool,
    is_registered_node: bool,
) -> Option<RewardClaimerKind> {
    if claiming_contract == protocol_dao_claim_contract {
        return Some(RewardClaimerKind::ProtocolDao);
    }
    if is_oracle_node {
        return Some(RewardClaimerKind::OracleDao);
    }
    if is_registered_node {
        return Some(RewardClaimerKind::Node);
    }
    None
}

/// Running total, count, and average for one claimant class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimTally {
    pub total_claimed: U256,
    pub claim_count: u64,
    pub average_claimed: U256,
}

impl ClaimTally {
    /// Records one claim and refreshes the truncating average.
    pub fn record(&mut self, amount: U256) {
        self.total_claimed += amount;
        self.claim_count += 1;
        self.average_claimed = self.total_claimed / U256::from(self.claim_count);
    }
}
