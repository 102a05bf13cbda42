//! Entity records held by the cache, their patch counterparts, and the
//! snapshot envelope.

pub mod conversions;
pub mod farm;
pub mod fees_collector;
pub mod pair;
pub mod rewards;
pub mod snapshot;
pub mod staking;
pub mod token;

pub use farm::{Farm, FarmPatch};
pub use fees_collector::{FeesCollector, FeesCollectorPatch};
pub use pair::{CompoundedApr, Pair, PairInfo, PairInfoPatch, PairPatch, PairState};
pub use rewards::{
    BoostedYieldsFactors, EsdtTokenPayment, GlobalInfoByWeek, TokenDistribution,
    WeekTimekeeping, WeekTimekeepingPatch,
};
pub use snapshot::{FullSnapshot, InitCounts};
pub use staking::{StakingFarm, StakingFarmPatch, StakingProxy, StakingProxyPatch};
pub use token::{Token, TokenAssets, TokenPatch, TokenRole, TokenType};

use std::fmt;

/// Entity kinds known to the cache, used in errors, logs and metric labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Token,
    Pair,
    Farm,
    StakingFarm,
    StakingProxy,
    FeesCollector,
    Timekeeping,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Token => "token",
            EntityKind::Pair => "pair",
            EntityKind::Farm => "farm",
            EntityKind::StakingFarm => "staking_farm",
            EntityKind::StakingProxy => "staking_proxy",
            EntityKind::FeesCollector => "fees_collector",
            EntityKind::Timekeeping => "timekeeping",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
