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

//! End-to-end event sequences driven through a [`MemoryStore`]-backed
//! indexer with fixture chain state.

use alloy_primitives::{Address, B256, I256, U256};
use rocketpool_accounting::ONE_ETHER_IN_WEI;
use rocketpool_indexer::entity::{address_id, NetworkStakerBalanceCheckpoint, Protocol};
use rocketpool_indexer::{EntityStore, Event, EventMeta, FixedChainState, Indexer, MemoryStore};

fn ether(n: u64) -> U256 {
    U256::from(n) * ONE_ETHER_IN_WEI
}

/// An exchange rate or fee expressed in 1/1000ths of 1e18.
fn milli(n: u64) -> U256 {
    U256::from(n) * ONE_ETHER_IN_WEI / U256::from(1000)
}

fn meta(sequence: u64, block_time: u64) -> EventMeta {
    EventMeta::new(B256::with_last_byte(sequence as u8), sequence, sequence, block_time)
}

fn staking_chain() -> FixedChainState {
    let mut chain = FixedChainState::new();
    chain.reth_exchange_rate = milli(1100);
    chain.reth_total_collateral = ether(500);
    chain.deposit_pool_balance = ether(40);
    chain.deposit_pool_excess_balance = ether(10);
    chain
}

const ALICE: Address = Address::repeat_byte(0xa1);
const BOB: Address = Address::repeat_byte(0xb2);
const NODE_ONE: Address = Address::repeat_byte(0x51);
const NODE_TWO: Address = Address::repeat_byte(0x52);
const MINIPOOL_ONE: Address = Address::repeat_byte(0x71);
const MINIPOOL_TWO: Address = Address::repeat_byte(0x72);
const PDAO_CONTRACT: Address = Address::repeat_byte(0xdd);
const OTHER_CONTRACT: Address = Address::repeat_byte(0xee);

#[test_log::test]
fn burn_under_rising_rate_accrues_the_value_change_minus_principal() {
    let mut indexer = Indexer::new(MemoryStore::new(), staking_chain());

    // Mint 100 rETH at rate 1.1, checkpoint, then burn 40 at rate 1.2.
    indexer
        .process(&meta(1, 100), &Event::RethTransfer {
            from: Address::ZERO,
            to: ALICE,
            amount: ether(100),
        })
        .unwrap();
    indexer.process(&meta(2, 200), &Event::BalancesUpdated).unwrap();

    indexer.chain_mut().reth_exchange_rate = milli(1200);
    indexer
        .process(&meta(3, 300), &Event::RethTransfer {
            from: ALICE,
            to: Address::ZERO,
            amount: ether(40),
        })
        .unwrap();
    indexer.process(&meta(4, 400), &Event::BalancesUpdated).unwrap();

    let store = indexer.into_store();
    let staker = store.load_staker(&address_id(&ALICE)).unwrap();
    assert_eq!(staker.reth_balance, ether(60));
    assert_eq!(staker.eth_balance, ether(72));
    // 72 - (110 - 40 * 1.1) = 6 ETH of rewards.
    assert_eq!(staker.total_eth_rewards, I256::try_from(ether(6)).unwrap());
    assert!(staker.has_accrued_eth_rewards);

    let second = store
        .load_network_staker_balance_checkpoint(&meta(4, 400).entity_id())
        .unwrap();
    assert_eq!(second.total_staker_eth_rewards, I256::try_from(ether(6)).unwrap());
    assert_eq!(second.average_staker_eth_rewards, I256::try_from(ether(6)).unwrap());
    assert_eq!(second.stakers_with_eth_rewards, 1);
    assert_eq!(second.stakers_with_reth_balance, 1);
    assert_eq!(second.staker_eth_in_protocol, ether(490));
    assert_eq!(second.previous_checkpoint_id, Some(meta(2, 200).entity_id()));

    let first = store
        .load_network_staker_balance_checkpoint(&meta(2, 200).entity_id())
        .unwrap();
    assert_eq!(first.next_checkpoint_id, Some(meta(4, 400).entity_id()));
    assert_eq!(first.total_staker_eth_rewards, I256::ZERO);

    let record = store
        .load_staker_balance_checkpoint(&format!(
            "{} - {}",
            meta(4, 400).entity_id(),
            address_id(&ALICE)
        ))
        .unwrap();
    assert_eq!(record.rank, 1);
    assert_eq!(record.total_eth_rewards, I256::try_from(ether(6)).unwrap());
}

#[test_log::test]
fn replayed_events_do_not_double_count() {
    let mut indexer = Indexer::new(MemoryStore::new(), staking_chain());
    let mint = Event::RethTransfer { from: Address::ZERO, to: ALICE, amount: ether(10) };

    indexer.process(&meta(1, 100), &mint).unwrap();
    indexer.process(&meta(1, 100), &mint).unwrap();
    indexer.process(&meta(2, 200), &Event::BalancesUpdated).unwrap();
    indexer.process(&meta(2, 200), &Event::BalancesUpdated).unwrap();

    let store = indexer.into_store();
    assert_eq!(store.load_staker(&address_id(&ALICE)).unwrap().reth_balance, ether(10));
    assert_eq!(store.network_staker_balance_checkpoint_count(), 1);
    assert_eq!(store.staker_balance_checkpoint_count(), 1);
}

#[test_log::test]
fn per_staker_rewards_sum_to_the_checkpoint_total() {
    let mut indexer = Indexer::new(MemoryStore::new(), staking_chain());
    indexer
        .process(&meta(1, 100), &Event::RethTransfer {
            from: Address::ZERO,
            to: ALICE,
            amount: ether(100),
        })
        .unwrap();
    indexer
        .process(&meta(2, 110), &Event::RethTransfer {
            from: Address::ZERO,
            to: BOB,
            amount: ether(300),
        })
        .unwrap();
    indexer.process(&meta(3, 200), &Event::BalancesUpdated).unwrap();

    // Rate moves 1.1 -> 1.2 with balances untouched: each staker accrues the
    // raw value change of their holding.
    indexer.chain_mut().reth_exchange_rate = milli(1200);
    indexer.process(&meta(4, 300), &Event::BalancesUpdated).unwrap();

    let store = indexer.into_store();
    let alice = store.load_staker(&address_id(&ALICE)).unwrap();
    let bob = store.load_staker(&address_id(&BOB)).unwrap();
    let checkpoint = store
        .load_network_staker_balance_checkpoint(&meta(4, 300).entity_id())
        .unwrap();
    assert_eq!(
        checkpoint.total_staker_eth_rewards,
        alice.total_eth_rewards + bob.total_eth_rewards
    );
    assert_eq!(alice.total_eth_rewards, I256::try_from(ether(10)).unwrap());
    assert_eq!(bob.total_eth_rewards, I256::try_from(ether(30)).unwrap());
    assert_eq!(checkpoint.stakers_with_eth_rewards, 2);
    assert_eq!(
        checkpoint.average_staker_eth_rewards,
        I256::try_from(ether(20)).unwrap()
    );

    // Bob leads the ranking; Alice ties nothing and follows.
    let bob_record = store
        .load_staker_balance_checkpoint(&format!(
            "{} - {}",
            meta(4, 300).entity_id(),
            address_id(&BOB)
        ))
        .unwrap();
    let alice_record = store
        .load_staker_balance_checkpoint(&format!(
            "{} - {}",
            meta(4, 300).entity_id(),
            address_id(&ALICE)
        ))
        .unwrap();
    assert_eq!(bob_record.rank, 1);
    assert_eq!(alice_record.rank, 2);
}

#[test_log::test]
fn empty_fold_inherits_running_totals_from_the_previous_checkpoint() {
    // A seeded chain head with totals but no stakers to fold.
    let mut store = MemoryStore::new();
    let mut protocol = Protocol::new();
    let seed = NetworkStakerBalanceCheckpoint {
        id: "seed".to_string(),
        previous_checkpoint_id: None,
        next_checkpoint_id: None,
        staker_eth_in_deposit_pool: U256::ZERO,
        staker_eth_in_protocol: U256::ZERO,
        reth_exchange_rate: milli(1100),
        total_staker_eth_rewards: I256::try_from(ether(10)).unwrap(),
        stakers_with_eth_rewards: 2,
        stakers_with_reth_balance: 2,
        average_staker_eth_rewards: I256::try_from(ether(5)).unwrap(),
        block: 1,
        block_time: 50,
    };
    protocol.last_network_staker_balance_checkpoint = Some(seed.id.clone());
    store.save_network_staker_balance_checkpoint(seed);
    store.save_protocol(protocol);

    let mut indexer = Indexer::new(store, staking_chain());
    indexer.process(&meta(9, 900), &Event::BalancesUpdated).unwrap();

    let store = indexer.into_store();
    let checkpoint = store
        .load_network_staker_balance_checkpoint(&meta(9, 900).entity_id())
        .unwrap();
    assert_eq!(checkpoint.total_staker_eth_rewards, I256::try_from(ether(10)).unwrap());
    assert_eq!(checkpoint.stakers_with_eth_rewards, 2);
    assert_eq!(checkpoint.stakers_with_reth_balance, 0);
    assert_eq!(
        store.load_network_staker_balance_checkpoint("seed").unwrap().next_checkpoint_id,
        Some(meta(9, 900).entity_id())
    );
}

fn rewards_chain() -> FixedChainState {
    let mut chain = staking_chain();
    chain.rpl_price = milli(10);
    chain.claim_interval_start_time = 1_000;
    chain.claim_interval_duration = 2_000;
    chain.claim_interval_rewards_total = ether(70_000);
    chain.protocol_dao_claim_contract = PDAO_CONTRACT;
    chain
}

#[test_log::test]
fn claims_roll_the_interval_when_the_external_start_time_moves() {
    let mut indexer = Indexer::new(MemoryStore::new(), rewards_chain());
    indexer.process(&meta(1, 100), &Event::NodeRegistered { node: NODE_ONE }).unwrap();

    indexer
        .process(&meta(2, 1_500), &Event::RplRewardsClaimed {
            claiming_address: NODE_ONE,
            claiming_contract: OTHER_CONTRACT,
            amount: ether(100),
        })
        .unwrap();

    // The oracle advances the interval; the next claim closes the old one.
    indexer.chain_mut().claim_interval_start_time = 3_000;
    indexer
        .process(&meta(3, 3_400), &Event::RplRewardsClaimed {
            claiming_address: NODE_ONE,
            claiming_contract: OTHER_CONTRACT,
            amount: ether(50),
        })
        .unwrap();

    let store = indexer.into_store();
    let first_id = format!("rplRewardInterval-{}", meta(2, 1_500).entity_id());
    let second_id = format!("rplRewardInterval-{}", meta(3, 3_400).entity_id());

    let first = store.load_reward_interval(&first_id).unwrap();
    assert!(first.is_closed);
    assert_eq!(first.closed_time, Some(3_400));
    assert_eq!(first.duration_actual, 2_400);
    assert_eq!(first.next_interval_id, Some(second_id.clone()));
    assert_eq!(first.total_rpl_claimed, ether(100));
    assert_eq!(first.claim_count, 1);
    assert_eq!(first.tallies.node.total_claimed, ether(100));

    let second = store.load_reward_interval(&second_id).unwrap();
    assert!(!second.is_closed);
    assert_eq!(second.start_time, 3_000);
    assert_eq!(second.previous_interval_id, Some(first_id));
    assert_eq!(second.total_rpl_claimed, ether(50));

    let node = store.load_node(&address_id(&NODE_ONE)).unwrap();
    assert_eq!(node.total_claimed_rpl_rewards(), ether(150));
    assert_eq!(node.total_claimed_rpl_rewards_rank, 1);

    let claim = store.load_reward_claim(&meta(2, 1_500).entity_id()).unwrap();
    // 100 RPL at 0.01 ETH each.
    assert_eq!(claim.eth_amount, ether(1));
}

#[test_log::test]
fn negative_actual_duration_clamps_to_the_nominal_duration() {
    let mut chain = rewards_chain();
    chain.claim_interval_start_time = 2_000;
    let mut indexer = Indexer::new(MemoryStore::new(), chain);
    indexer.process(&meta(1, 100), &Event::NodeRegistered { node: NODE_ONE }).unwrap();
    indexer
        .process(&meta(2, 2_500), &Event::RplRewardsClaimed {
            claiming_address: NODE_ONE,
            claiming_contract: OTHER_CONTRACT,
            amount: ether(10),
        })
        .unwrap();

    // The recorded start (2000) is ahead of this event's block time (1500),
    // which can only come from clock skew in the source data.
    indexer.chain_mut().claim_interval_start_time = 5_000;
    indexer
        .process(&meta(3, 1_500), &Event::RplRewardsClaimed {
            claiming_address: NODE_ONE,
            claiming_contract: OTHER_CONTRACT,
            amount: ether(10),
        })
        .unwrap();

    let store = indexer.into_store();
    let first = store
        .load_reward_interval(&format!("rplRewardInterval-{}", meta(2, 2_500).entity_id()))
        .unwrap();
    assert!(first.is_closed);
    assert_eq!(first.duration_actual, first.duration);
}

#[test_log::test]
fn claimer_classes_are_tallied_separately_and_unknowns_dropped() {
    let mut chain = rewards_chain();
    chain.oracle_nodes = vec![NODE_TWO];
    let mut indexer = Indexer::new(MemoryStore::new(), chain);
    indexer.process(&meta(1, 100), &Event::NodeRegistered { node: NODE_ONE }).unwrap();
    indexer.process(&meta(2, 110), &Event::NodeRegistered { node: NODE_TWO }).unwrap();

    // Protocol DAO by contract, oracle by membership, node by registration,
    // and one claim matching nothing.
    indexer
        .process(&meta(3, 1_100), &Event::RplRewardsClaimed {
            claiming_address: PDAO_CONTRACT,
            claiming_contract: PDAO_CONTRACT,
            amount: ether(5),
        })
        .unwrap();
    indexer
        .process(&meta(4, 1_200), &Event::RplRewardsClaimed {
            claiming_address: NODE_TWO,
            claiming_contract: OTHER_CONTRACT,
            amount: ether(40),
        })
        .unwrap();
    indexer
        .process(&meta(5, 1_300), &Event::RplRewardsClaimed {
            claiming_address: NODE_ONE,
            claiming_contract: OTHER_CONTRACT,
            amount: ether(15),
        })
        .unwrap();
    indexer
        .process(&meta(6, 1_400), &Event::RplRewardsClaimed {
            claiming_address: Address::repeat_byte(0x99),
            claiming_contract: OTHER_CONTRACT,
            amount: ether(1_000),
        })
        .unwrap();

    let store = indexer.into_store();
    assert_eq!(store.reward_claim_count(), 3);
    assert!(store.load_reward_claim(&meta(6, 1_400).entity_id()).is_none());

    let interval = store
        .load_reward_interval(&format!("rplRewardInterval-{}", meta(3, 1_100).entity_id()))
        .unwrap();
    assert_eq!(interval.tallies.protocol_dao.total_claimed, ether(5));
    assert_eq!(interval.tallies.oracle_dao.total_claimed, ether(40));
    assert_eq!(interval.tallies.node.total_claimed, ether(15));
    assert_eq!(interval.total_rpl_claimed, ether(60));
    assert_eq!(interval.claim_count, 3);
    assert_eq!(interval.average_rpl_claimed, ether(20));

    // Dense ranking by claimed total, registration order breaking ties.
    assert_eq!(
        store.load_node(&address_id(&NODE_TWO)).unwrap().total_claimed_rpl_rewards_rank,
        1
    );
    assert_eq!(
        store.load_node(&address_id(&NODE_ONE)).unwrap().total_claimed_rpl_rewards_rank,
        2
    );
}

fn node_chain() -> FixedChainState {
    let mut chain = rewards_chain();
    chain.node_fee = milli(50);
    chain.half_deposit_amount = ether(16);
    chain.minimum_per_minipool_stake = milli(100);
    chain.maximum_per_minipool_stake = milli(1500);
    chain
}

#[test_log::test]
fn minipool_lifecycle_moves_per_state_counters() {
    let mut indexer = Indexer::new(MemoryStore::new(), node_chain());
    indexer.process(&meta(1, 100), &Event::NodeRegistered { node: NODE_ONE }).unwrap();
    indexer
        .process(&meta(2, 200), &Event::MinipoolCreated { node: NODE_ONE, minipool: MINIPOOL_ONE })
        .unwrap();
    indexer.chain_mut().node_fee = milli(150);
    indexer
        .process(&meta(3, 300), &Event::MinipoolCreated { node: NODE_ONE, minipool: MINIPOOL_TWO })
        .unwrap();

    let node_id = address_id(&NODE_ONE);
    {
        let node = indexer.store().load_node(&node_id).unwrap();
        assert_eq!(node.queued_minipools, 2);
        // Fees 0.05 and 0.15 both active.
        assert_eq!(node.average_fee_for_active_minipools, milli(100));
    }

    indexer
        .process(&meta(4, 400), &Event::MinipoolEnteredStaking { minipool: MINIPOOL_ONE })
        .unwrap();
    indexer
        .process(&meta(5, 500), &Event::MinipoolEnteredStaking { minipool: MINIPOOL_TWO })
        .unwrap();
    indexer
        .process(&meta(6, 600), &Event::MinipoolMarkedWithdrawable { minipool: MINIPOOL_TWO })
        .unwrap();
    indexer
        .process(&meta(7, 700), &Event::MinipoolFinalized { minipool: MINIPOOL_TWO })
        .unwrap();

    let node = indexer.store().load_node(&node_id).unwrap();
    assert_eq!(node.queued_minipools, 0);
    assert_eq!(node.staking_minipools, 1);
    assert_eq!(node.withdrawable_minipools, 0);
    assert_eq!(node.total_finalized_minipools, 1);
    // Only the 0.05 pool remains active.
    assert_eq!(node.average_fee_for_active_minipools, milli(50));

    let pool = indexer.store().load_minipool(&address_id(&MINIPOOL_TWO)).unwrap();
    assert_eq!(pool.staking_block_time, 500);
    assert_eq!(pool.withdrawable_block_time, 600);
    assert_eq!(pool.finalized_block_time, 700);
}

#[test_log::test]
fn price_updates_cut_linked_node_checkpoints_with_network_totals() {
    let mut chain = node_chain();
    chain.set_node_rpl_stake(NODE_ONE, ether(1_000), ether(900));
    chain.set_node_rpl_bounds(NODE_ONE, ether(160), ether(2_400));
    chain.set_node_rpl_stake(NODE_TWO, ether(500), ether(500));
    chain.set_node_rpl_bounds(NODE_TWO, ether(160), ether(2_400));

    let mut indexer = Indexer::new(MemoryStore::new(), chain);
    indexer.process(&meta(1, 100), &Event::NodeRegistered { node: NODE_ONE }).unwrap();
    indexer.process(&meta(2, 110), &Event::NodeRegistered { node: NODE_TWO }).unwrap();
    indexer
        .process(&meta(3, 150), &Event::RplStaked { node: NODE_ONE, amount: ether(1_000) })
        .unwrap();
    indexer
        .process(&meta(4, 200), &Event::PricesUpdated { rpl_price: milli(10) })
        .unwrap();
    indexer
        .process(&meta(5, 300), &Event::PricesUpdated { rpl_price: milli(20) })
        .unwrap();

    let store = indexer.into_store();
    let first = store
        .load_network_node_balance_checkpoint(&meta(4, 200).entity_id())
        .unwrap();
    let second = store
        .load_network_node_balance_checkpoint(&meta(5, 300).entity_id())
        .unwrap();
    assert_eq!(first.next_checkpoint_id, Some(second.id.clone()));
    assert_eq!(second.previous_checkpoint_id, Some(first.id.clone()));

    assert_eq!(first.nodes_registered, 2);
    // Only the staked event moved the entity balance; effective stakes are
    // re-read from contract state for every node.
    assert_eq!(first.rpl_staked, ether(1_000));
    assert_eq!(first.effective_rpl_staked, ether(1_400));
    assert_eq!(first.minimum_effective_rpl, ether(320));
    assert_eq!(first.maximum_effective_rpl, ether(4_800));
    // 16 ETH * 10% at 0.01 ETH/RPL => 160 RPL; 16 * 150% => 2400 RPL.
    assert_eq!(first.minimum_effective_rpl_for_new_minipool, ether(160));
    assert_eq!(first.maximum_effective_rpl_for_new_minipool, ether(2_400));
    assert_eq!(first.rpl_price, milli(10));
    // Doubling the price halves the RPL needed per minipool.
    assert_eq!(second.minimum_effective_rpl_for_new_minipool, ether(80));

    let record = store
        .load_node_balance_checkpoint(&format!("{} - {}", first.id, address_id(&NODE_ONE)))
        .unwrap();
    assert_eq!(record.rpl_staked, ether(1_000));
    assert_eq!(
        store.load_node(&address_id(&NODE_ONE)).unwrap().last_node_balance_checkpoint,
        Some(format!("{} - {}", second.id, address_id(&NODE_ONE)))
    );

    let transaction = store
        .load_node_rpl_stake_transaction(&meta(3, 150).entity_id())
        .unwrap();
    // 1000 RPL at 0.01 ETH each.
    assert_eq!(transaction.eth_amount, ether(10));
}

#[test_log::test]
fn slashing_accumulates_on_the_node_and_survives_checkpoints() {
    let mut chain = node_chain();
    chain.set_node_rpl_stake(NODE_ONE, ether(900), ether(900));
    let mut indexer = Indexer::new(MemoryStore::new(), chain);
    indexer.process(&meta(1, 100), &Event::NodeRegistered { node: NODE_ONE }).unwrap();
    indexer
        .process(&meta(2, 200), &Event::RplSlashed { node: NODE_ONE, amount: ether(100) })
        .unwrap();
    indexer
        .process(&meta(3, 300), &Event::PricesUpdated { rpl_price: milli(10) })
        .unwrap();

    let store = indexer.into_store();
    let node = store.load_node(&address_id(&NODE_ONE)).unwrap();
    assert_eq!(node.total_rpl_slashed, ether(100));
    assert_eq!(node.rpl_staked, ether(900));
    let checkpoint = store
        .load_network_node_balance_checkpoint(&meta(3, 300).entity_id())
        .unwrap();
    assert_eq!(checkpoint.total_rpl_slashed, ether(100));
}

#[test_log::test]
fn unregistered_participants_are_ignored_without_error() {
    let mut indexer = Indexer::new(MemoryStore::new(), node_chain());
    indexer
        .process(&meta(1, 100), &Event::RplStaked { node: NODE_ONE, amount: ether(10) })
        .unwrap();
    indexer
        .process(&meta(2, 200), &Event::MinipoolCreated { node: NODE_ONE, minipool: MINIPOOL_ONE })
        .unwrap();
    indexer
        .process(&meta(3, 300), &Event::MinipoolEnteredStaking { minipool: MINIPOOL_ONE })
        .unwrap();

    let store = indexer.into_store();
    assert!(store.load_node(&address_id(&NODE_ONE)).is_none());
    assert!(store.load_minipool(&address_id(&MINIPOOL_ONE)).is_none());
}
