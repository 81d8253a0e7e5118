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

//! Dense ranking of a participant population.

use std::cmp::Reverse;

/// Ranks a population by metric descending, tie-break ascending, assigning
/// ranks 1..N with no gaps and no shared ranks. On equal metrics the smaller
/// tie-break value takes the lower (better) rank.
///
/// Returns `(id, rank)` pairs in rank order. Rankings are recomputed in full
/// on every call; there is no incremental path.
pub fn dense_ranks<I, M, T>(mut population: Vec<(I, M, T)>) -> Vec<(I, u64)>
where
    M: Ord + Copy,
    T: Ord + Copy,
{
    population.sort_by_key(|(_, metric, tiebreak)| (Reverse(*metric), *tiebreak));
    population
        .into_iter()
        .zip(1u64..)
        .map(|((id, _, _), rank)| (id, rank))
        .collect()
}
