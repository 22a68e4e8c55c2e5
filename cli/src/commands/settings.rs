use anyhow::Result;

use crate::config::Config;

pub(crate) fn cmd_config_show(config: &Config, json: bool) -> Result<()> {
    if json {
        let out = serde_json::json!({
            "data_dir": config.data_dir,
            "db_path": config.db_path,
            "settings": config.settings,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("Config file:   {}", config.config_path().display());
        println!("Database:      {}", config.db_path.display());
        println!("Day starts at: {:02}:00", config.settings.day_rollover_hour);
    }
    Ok(())
}

pub(crate) fn cmd_config_set_rollover(config: &mut Config, hour: u32, json: bool) -> Result<()> {
    config.set_rollover_hour(hour)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&config.settings)?);
    } else {
        println!("Day now starts at {hour:02}:00");
    }
    Ok(())
}
