use tracing::debug;

use super::patch::{apply_mask, Patch, PatchField, UpdateOutcome};
use super::query::{project, Projection};
use crate::cache_state::StateTables;
use crate::compute::distribution::refresh_fees_collector;
use crate::error::StateResult;
use crate::settings::ComputeSettings;
use crate::types::{FeesCollector, FeesCollectorPatch};

impl Patch for FeesCollectorPatch {
    fn key(&self) -> Option<&str> {
        self.address.as_deref()
    }
}

static FEES_COLLECTOR_PATCH_FIELDS: &[PatchField<FeesCollector, FeesCollectorPatch>] = patch_fields!(FeesCollector, FeesCollectorPatch;
    "address" => address immutable,
    "time" => time set,
    "undistributedRewards" => undistributed_rewards set,
    "lastGlobalUpdateWeek" => last_global_update_week set,
    "allTokens" => all_tokens set,
    "knownContracts" => known_contracts set,
    "lockedTokenId" => locked_token_id set,
    "lockedTokensPerBlock" => locked_tokens_per_block set,
);

/// The fees collector, or `None` when the snapshot carried none.
pub fn get_fees_collector(tables: &StateTables, mask: &[String]) -> StateResult<Option<Projection>> {
    tables
        .fees_collector
        .as_ref()
        .map(|collector| project(collector, mask))
        .transpose()
}

/// Patches the fees collector and recomputes its week bounds and reward
/// distribution. A patch addressed to anything but the loaded collector is
/// reported as a failed key.
pub fn update_fees_collector(
    tables: &mut StateTables,
    patch: &FeesCollectorPatch,
    mask: &[String],
    settings: &ComputeSettings,
) -> StateResult<UpdateOutcome> {
    let Some(key) = patch.key() else {
        return Ok(UpdateOutcome::default());
    };
    let mut collector = match tables.fees_collector.as_ref() {
        Some(current) if current.address == key => current.clone(),
        _ => {
            return Ok(UpdateOutcome {
                updated_count: 0,
                failed_keys: vec![key.to_string()],
            })
        }
    };

    apply_mask(FEES_COLLECTOR_PATCH_FIELDS, &mut collector, patch, mask);
    refresh_fees_collector(&mut collector, &tables.tokens, settings)?;
    tables.fees_collector = Some(collector);
    debug!(address = key, "fees collector updated");

    Ok(UpdateOutcome {
        updated_count: 1,
        failed_keys: Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::test_support::{loaded_tables, mask, FEES_COLLECTOR};
    use crate::types::{EsdtTokenPayment, GlobalInfoByWeek};

    #[test]
    fn test_get_projects_fields() {
        let tables = loaded_tables();
        let collector = get_fees_collector(&tables, &mask(&["address", "lastGlobalUpdateWeek"]))
            .unwrap()
            .unwrap();
        assert_eq!(collector.len(), 2);
        assert_eq!(collector["lastGlobalUpdateWeek"], 10);

        let empty = StateTables::new();
        assert!(get_fees_collector(&empty, &[]).unwrap().is_none());
    }

    #[test]
    fn test_update_recomputes_distribution() {
        let mut tables = loaded_tables();
        let rewards = vec![GlobalInfoByWeek {
            week: 11,
            total_rewards_for_week: vec![EsdtTokenPayment {
                token_identifier: "USDC-c76f1f".to_string(),
                token_nonce: 0,
                amount: "5000000".to_string(),
            }],
            total_energy_for_week: "0".to_string(),
            total_locked_tokens_for_week: "0".to_string(),
            rewards_distribution_for_week: Vec::new(),
            apr: None,
        }];
        let outcome = update_fees_collector(
            &mut tables,
            &FeesCollectorPatch {
                address: Some(FEES_COLLECTOR.to_string()),
                undistributed_rewards: Some(rewards),
                last_global_update_week: Some(11),
                ..Default::default()
            },
            &mask(&["undistributedRewards", "lastGlobalUpdateWeek"]),
            &ComputeSettings::default(),
        )
        .unwrap();
        assert_eq!(outcome.updated_count, 1);

        let collector = tables.fees_collector.as_ref().unwrap();
        assert_eq!(collector.last_global_update_week, 11);
        let distribution = &collector.undistributed_rewards[0].rewards_distribution_for_week;
        assert_eq!(distribution[0].percentage, "100.0000");
    }

    #[test]
    fn test_update_wrong_address_is_failed_key() {
        let mut tables = loaded_tables();
        let outcome = update_fees_collector(
            &mut tables,
            &FeesCollectorPatch {
                address: Some("erd1other".to_string()),
                last_global_update_week: Some(99),
                ..Default::default()
            },
            &mask(&["lastGlobalUpdateWeek"]),
            &ComputeSettings::default(),
        )
        .unwrap();
        assert_eq!(outcome.updated_count, 0);
        assert_eq!(outcome.failed_keys, ["erd1other"]);
        assert_eq!(tables.fees_collector.as_ref().unwrap().last_global_update_week, 10);
    }
}
