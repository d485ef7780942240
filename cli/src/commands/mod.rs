mod backup;
mod entry;
mod food;
mod helpers;
mod log;
mod plan;
mod prefill;
mod summary;
mod trend;
mod weight;
mod workout;

pub(crate) use backup::{cmd_backup, cmd_restore};
pub(crate) use entry::{
    cmd_entry_clear, cmd_entry_copy, cmd_entry_delete, cmd_entry_edit, cmd_entry_include,
};
pub(crate) use food::{cmd_food_add, cmd_food_delete, cmd_food_list, cmd_food_suggest};
pub(crate) use helpers::parse_number;
pub(crate) use log::{MacroArgs, cmd_log};
pub(crate) use plan::{cmd_plan_clear, cmd_plan_set, cmd_plan_show};
pub(crate) use prefill::{PrefillAction, cmd_barcode, cmd_paste};
pub(crate) use summary::{cmd_history, cmd_summary};
pub(crate) use trend::cmd_trend;
pub(crate) use weight::{cmd_weight_delete, cmd_weight_history, cmd_weight_log, cmd_weight_show};
pub(crate) use workout::{
    cmd_workout_add, cmd_workout_delete, cmd_workout_edit, cmd_workout_forget, cmd_workout_list,
    cmd_workout_names,
};
