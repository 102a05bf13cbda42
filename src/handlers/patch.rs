//! Mask-driven partial updates.
//!
//! Every entity kind declares a static table of patchable fields with
//! [`patch_fields!`]. An update walks the caller's mask against that table:
//! unknown names are ignored, immutable fields are skipped, and a field whose
//! patch value is absent is left untouched.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cache_state::{Keyed, Table};

/// One patchable field of record `R` read from patch `P`.
pub struct PatchField<R, P> {
    pub name: &'static str,
    pub immutable: bool,
    /// Copies the field from the patch; returns false if the patch does not carry it.
    pub apply: fn(&mut R, &P) -> bool,
}

/// A partial record keyed by the identifier of the record it patches.
pub trait Patch {
    fn key(&self) -> Option<&str>;
}

/// Field-by-field merge of a nested partial record into its full counterpart.
pub trait MergeInto<T> {
    fn merge_into(&self, target: &mut T);
}

/// Builds a `&[PatchField<R, P>]` table.
///
/// Modes: `set` replaces the field, `merge` merges a nested partial through
/// [`MergeInto`], `immutable` declares the name so masks naming it are skipped.
#[macro_export]
macro_rules! patch_fields {
    (@entry $record:ty, $patch:ty, $name:literal, $field:ident, set) => {
        $crate::handlers::patch::PatchField::<$record, $patch> {
            name: $name,
            immutable: false,
            apply: |target: &mut $record, patch: &$patch| match &patch.$field {
                Some(value) => {
                    target.$field = value.clone().into();
                    true
                }
                None => false,
            },
        }
    };
    (@entry $record:ty, $patch:ty, $name:literal, $field:ident, merge) => {
        $crate::handlers::patch::PatchField::<$record, $patch> {
            name: $name,
            immutable: false,
            apply: |target: &mut $record, patch: &$patch| match &patch.$field {
                Some(value) => {
                    $crate::handlers::patch::MergeInto::merge_into(value, &mut target.$field);
                    true
                }
                None => false,
            },
        }
    };
    (@entry $record:ty, $patch:ty, $name:literal, $field:ident, immutable) => {
        $crate::handlers::patch::PatchField::<$record, $patch> {
            name: $name,
            immutable: true,
            apply: |_: &mut $record, _: &$patch| false,
        }
    };
    ($record:ty, $patch:ty; $($name:literal => $field:ident $mode:ident),* $(,)?) => {
        &[$($crate::patch_fields!(@entry $record, $patch, $name, $field, $mode)),*]
    };
}

/// Applies every field named in `mask` from `patch` onto `record`.
/// Returns the number of fields written.
pub fn apply_mask<R, P>(
    fields: &[PatchField<R, P>],
    record: &mut R,
    patch: &P,
    mask: &[String],
) -> usize {
    let mut applied = 0;
    for path in mask {
        match fields.iter().find(|field| field.name == path.as_str()) {
            Some(field) if field.immutable => {
                debug!(field = field.name, "skipping immutable field in update mask");
            }
            Some(field) => {
                if (field.apply)(record, patch) {
                    applied += 1;
                }
            }
            None => {
                debug!(field = %path, "ignoring unknown field in update mask");
            }
        }
    }
    applied
}

/// Result of a batch update. Missing keys never fail the call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOutcome {
    pub updated_count: usize,
    pub failed_keys: Vec<String>,
}

/// Patched clones of the targeted records, not yet written back.
pub struct StagedUpdates<R> {
    pub records: IndexMap<String, R>,
    pub failed_keys: Vec<String>,
}

/// Clones every targeted record and applies its patch under `mask`.
///
/// Patches without a key are skipped; keys missing from `table` are reported
/// in `failed_keys`. Several patches for the same key apply in order.
pub fn stage<R, P>(
    table: &Table<R>,
    fields: &[PatchField<R, P>],
    patches: &[P],
    mask: &[String],
) -> StagedUpdates<R>
where
    R: Keyed + Clone,
    P: Patch,
{
    let mut records: IndexMap<String, R> = IndexMap::new();
    let mut failed_keys = Vec::new();

    for patch in patches {
        let Some(key) = patch.key() else {
            continue;
        };
        if !records.contains_key(key) {
            match table.get(key) {
                Some(existing) => {
                    records.insert(key.to_string(), existing.clone());
                }
                None => {
                    failed_keys.push(key.to_string());
                    continue;
                }
            }
        }
        if let Some(record) = records.get_mut(key) {
            apply_mask(fields, record, patch, mask);
        }
    }

    StagedUpdates {
        records,
        failed_keys,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Reserves {
        first: String,
        second: String,
    }

    #[derive(Debug, Clone, Default)]
    struct ReservesPatch {
        first: Option<String>,
        second: Option<String>,
    }

    impl MergeInto<Reserves> for ReservesPatch {
        fn merge_into(&self, target: &mut Reserves) {
            if let Some(first) = &self.first {
                target.first = first.clone();
            }
            if let Some(second) = &self.second {
                target.second = second.clone();
            }
        }
    }

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Record {
        id: String,
        label: String,
        note: Option<String>,
        reserves: Reserves,
    }

    #[derive(Debug, Clone, Default)]
    struct RecordPatch {
        id: Option<String>,
        label: Option<String>,
        note: Option<String>,
        reserves: Option<ReservesPatch>,
    }

    impl Keyed for Record {
        fn key(&self) -> &str {
            &self.id
        }
    }

    impl Patch for RecordPatch {
        fn key(&self) -> Option<&str> {
            self.id.as_deref()
        }
    }

    static RECORD_FIELDS: &[PatchField<Record, RecordPatch>] = patch_fields!(Record, RecordPatch;
        "id" => id immutable,
        "label" => label set,
        "note" => note set,
        "reserves" => reserves merge,
    );

    fn mask(fields: &[&str]) -> Vec<String> {
        fields.iter().map(|f| f.to_string()).collect()
    }

    fn record() -> Record {
        Record {
            id: "a".to_string(),
            label: "old".to_string(),
            note: None,
            reserves: Reserves {
                first: "1".to_string(),
                second: "2".to_string(),
            },
        }
    }

    #[test]
    fn test_only_masked_fields_change() {
        let mut target = record();
        let patch = RecordPatch {
            label: Some("new".to_string()),
            note: Some("n".to_string()),
            ..Default::default()
        };
        assert_eq!(apply_mask(RECORD_FIELDS, &mut target, &patch, &mask(&["label"])), 1);
        assert_eq!(target.label, "new");
        assert_eq!(target.note, None);
    }

    #[test]
    fn test_immutable_unknown_and_absent_are_skipped() {
        let mut target = record();
        let patch = RecordPatch {
            id: Some("b".to_string()),
            ..Default::default()
        };
        let applied = apply_mask(
            RECORD_FIELDS,
            &mut target,
            &patch,
            &mask(&["id", "doesNotExist", "label"]),
        );
        assert_eq!(applied, 0);
        assert_eq!(target, record());
    }

    #[test]
    fn test_nested_merge_keeps_untouched_members() {
        let mut target = record();
        let patch = RecordPatch {
            reserves: Some(ReservesPatch {
                first: Some("10".to_string()),
                second: None,
            }),
            ..Default::default()
        };
        apply_mask(RECORD_FIELDS, &mut target, &patch, &mask(&["reserves"]));
        assert_eq!(target.reserves.first, "10");
        assert_eq!(target.reserves.second, "2");
    }

    #[test]
    fn test_stage_reports_missing_and_skips_keyless() {
        let mut table = Table::default();
        table.set(record());
        let patches = vec![
            RecordPatch {
                id: Some("a".to_string()),
                label: Some("first".to_string()),
                ..Default::default()
            },
            RecordPatch {
                label: Some("no key".to_string()),
                ..Default::default()
            },
            RecordPatch {
                id: Some("missing".to_string()),
                ..Default::default()
            },
            RecordPatch {
                id: Some("a".to_string()),
                note: Some("second".to_string()),
                ..Default::default()
            },
        ];
        let staged = stage(&table, RECORD_FIELDS, &patches, &mask(&["label", "note"]));

        assert_eq!(staged.failed_keys, vec!["missing".to_string()]);
        assert_eq!(staged.records.len(), 1);
        let patched = &staged.records["a"];
        assert_eq!(patched.label, "first");
        assert_eq!(patched.note.as_deref(), Some("second"));
        // the table itself is untouched until the caller writes back
        assert_eq!(table.get("a").unwrap().label, "old");
    }
}
