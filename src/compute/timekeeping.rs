use crate::settings::ComputeSettings;
use crate::types::WeekTimekeeping;

/// Recomputes the epoch bounds of `time.current_week`.
///
/// Week numbering starts at 1; a zero week is treated as the first week.
pub fn refresh_week(time: &mut WeekTimekeeping, settings: &ComputeSettings) {
    let epochs_in_week = settings.epochs_in_week;
    let elapsed_weeks = u64::from(time.current_week.saturating_sub(1));
    time.start_epoch_for_week = time.first_week_start_epoch + elapsed_weeks * epochs_in_week;
    time.end_epoch_for_week = time.start_epoch_for_week + epochs_in_week - 1;
}
