//! Weekly timekeeping lookups and updates, resolved through whichever
//! contract owns the address: a farm, a staking farm, or the fees collector.

use indexmap::IndexMap;
use tracing::debug;

use super::farms::store_farm;
use super::patch::{apply_mask, Patch, PatchField, UpdateOutcome};
use super::query::{project, Projection};
use super::staking_farms::store_staking_farm;
use crate::cache_state::StateTables;
use crate::compute::distribution::refresh_fees_collector;
use crate::compute::farm::refresh_farm;
use crate::compute::staking::refresh_staking_farm;
use crate::error::{StateError, StateResult};
use crate::settings::ComputeSettings;
use crate::types::{EntityKind, Farm, FeesCollector, StakingFarm, WeekTimekeeping, WeekTimekeepingPatch};

impl Patch for WeekTimekeepingPatch {
    fn key(&self) -> Option<&str> {
        self.sc_address.as_deref()
    }
}

static TIMEKEEPING_PATCH_FIELDS: &[PatchField<WeekTimekeeping, WeekTimekeepingPatch>] = patch_fields!(WeekTimekeeping, WeekTimekeepingPatch;
    "scAddress" => sc_address immutable,
    "currentWeek" => current_week set,
    "firstWeekStartEpoch" => first_week_start_epoch set,
);

/// A contract carrying a `WeekTimekeeping`, cloned out of the tables.
enum Owner {
    Farm(Farm),
    StakingFarm(StakingFarm),
    FeesCollector(FeesCollector),
}

impl Owner {
    fn resolve(tables: &StateTables, address: &str) -> Option<Owner> {
        if let Some(farm) = tables.farms.get(address) {
            return Some(Owner::Farm(farm.clone()));
        }
        if let Some(farm) = tables.staking_farms.get(address) {
            return Some(Owner::StakingFarm(farm.clone()));
        }
        tables
            .fees_collector
            .as_ref()
            .filter(|collector| collector.address == address)
            .map(|collector| Owner::FeesCollector(collector.clone()))
    }

    fn time_mut(&mut self) -> &mut WeekTimekeeping {
        match self {
            Owner::Farm(farm) => &mut farm.time,
            Owner::StakingFarm(farm) => &mut farm.time,
            Owner::FeesCollector(collector) => &mut collector.time,
        }
    }

    fn refresh(&mut self, tables: &StateTables, settings: &ComputeSettings) -> StateResult<()> {
        match self {
            Owner::Farm(farm) => refresh_farm(farm, &tables.tokens, settings),
            Owner::StakingFarm(farm) => refresh_staking_farm(farm, &tables.tokens, settings),
            Owner::FeesCollector(collector) => {
                refresh_fees_collector(collector, &tables.tokens, settings)
            }
        }
    }

    fn store(self, tables: &mut StateTables) {
        match self {
            Owner::Farm(farm) => store_farm(tables, farm),
            Owner::StakingFarm(farm) => store_staking_farm(tables, farm),
            Owner::FeesCollector(collector) => tables.fees_collector = Some(collector),
        }
    }
}

fn timekeeping_of<'a>(tables: &'a StateTables, address: &str) -> Option<&'a WeekTimekeeping> {
    if let Some(farm) = tables.farms.get(address) {
        return Some(&farm.time);
    }
    if let Some(farm) = tables.staking_farms.get(address) {
        return Some(&farm.time);
    }
    tables
        .fees_collector
        .as_ref()
        .filter(|collector| collector.address == address)
        .map(|collector| &collector.time)
}

pub fn get_weekly_timekeeping(
    tables: &StateTables,
    sc_address: &str,
    mask: &[String],
) -> StateResult<Projection> {
    let time = timekeeping_of(tables, sc_address)
        .ok_or_else(|| StateError::not_found(EntityKind::Timekeeping, sc_address))?;
    project(time, mask)
}

/// Applies timekeeping patches keyed by contract address, then fully
/// recomputes every touched contract. Nothing is written unless every
/// recomputation succeeds.
pub fn update_weekly_timekeeping(
    tables: &mut StateTables,
    patches: &[WeekTimekeepingPatch],
    mask: &[String],
    settings: &ComputeSettings,
) -> StateResult<UpdateOutcome> {
    let mut staged: IndexMap<String, Owner> = IndexMap::new();
    let mut failed_keys = Vec::new();

    for patch in patches {
        let Some(key) = patch.key() else {
            continue;
        };
        if !staged.contains_key(key) {
            match Owner::resolve(tables, key) {
                Some(owner) => {
                    staged.insert(key.to_string(), owner);
                }
                None => {
                    failed_keys.push(key.to_string());
                    continue;
                }
            }
        }
        if let Some(owner) = staged.get_mut(key) {
            apply_mask(TIMEKEEPING_PATCH_FIELDS, owner.time_mut(), patch, mask);
        }
    }

    for owner in staged.values_mut() {
        owner.refresh(tables, settings)?;
    }

    let updated_count = staged.len();
    for (_, owner) in staged {
        owner.store(tables);
    }
    debug!(updated = updated_count, failed = failed_keys.len(), "timekeeping updated");
    Ok(UpdateOutcome {
        updated_count,
        failed_keys,
    })
}
