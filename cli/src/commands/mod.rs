mod ask;
mod food;
mod helpers;
mod log;
mod profile;
mod progress;
mod settings;
mod summary;
mod weight;

pub(crate) use ask::cmd_ask;
pub(crate) use food::{cmd_food_add, cmd_food_delete, cmd_food_list};
pub(crate) use helpers::parse_date;
pub(crate) use log::{LogArgs, cmd_log, cmd_log_delete};
pub(crate) use profile::{ProfileArgs, cmd_profile_set, cmd_profile_show};
pub(crate) use progress::cmd_progress;
pub(crate) use settings::{cmd_config_set_rollover, cmd_config_show};
pub(crate) use summary::cmd_summary;
pub(crate) use weight::{cmd_weight_delete, cmd_weight_history, cmd_weight_log};
