/// Local backtracking out of starved placement states
pub mod backtrack;
/// Efficient bitset over grid cells for retry exclusions
pub mod bitset;
/// Append-only audit trail of committed placements
pub mod record;
/// Placement sampler driver and orchestration
pub mod sampler;
/// Symmetry-aware candidate ranking
pub mod selection;
