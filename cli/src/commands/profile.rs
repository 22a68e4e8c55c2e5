use anyhow::{Context, Result, bail};

use shred_core::{ShredError, ShredService};
use shred_core::models::{NewUser, UnitSystem, User};
use shred_core::units::{self, format_height, format_weight};

/// Fields supplied on the command line. Missing ones keep the stored value.
pub(crate) struct ProfileArgs {
    pub name: Option<String>,
    /// In the profile's (or `units`') weight unit.
    pub weight: Option<f64>,
    /// cm, or inches for imperial.
    pub height: Option<f64>,
    pub target: Option<i64>,
    pub units: Option<UnitSystem>,
}

fn merge(existing: Option<&User>, args: ProfileArgs) -> Result<NewUser> {
    let unit_system = args
        .units
        .or(existing.map(|u| u.unit_system))
        .unwrap_or_default();

    let name = match (args.name, existing) {
        (Some(n), _) => n.trim().to_string(),
        (None, Some(u)) => u.name.clone(),
        (None, None) => bail!("--name is required when creating a profile"),
    };
    let weight_kg = match (args.weight, existing) {
        (Some(w), _) => units::weight_to_canonical(w, unit_system),
        (None, Some(u)) => u.weight_kg,
        (None, None) => bail!("--weight is required when creating a profile"),
    };
    let height_cm = match (args.height, existing) {
        (Some(h), _) => units::height_to_canonical(h, unit_system),
        (None, Some(u)) => u.height_cm,
        (None, None) => bail!("--height is required when creating a profile"),
    };
    let target_calories = match (args.target, existing) {
        (Some(t), _) => t,
        (None, Some(u)) => u.target_calories,
        (None, None) => bail!("--target is required when creating a profile"),
    };

    Ok(NewUser {
        name,
        weight_kg,
        height_cm,
        target_calories,
        unit_system,
    })
}

fn print_profile(user: &User) {
    let units = user.unit_system;
    println!("Name:    {}", user.name);
    println!("Weight:  {}", format_weight(user.weight_kg, units));
    println!("Height:  {}", format_height(user.height_cm, units));
    println!("Target:  {} kcal/day", user.target_calories);
    println!("Units:   {}", units.as_str());
}

pub(crate) fn cmd_profile_show(svc: &ShredService, json: bool) -> Result<()> {
    let user = svc.get_user()?.ok_or(ShredError::MissingUser)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&user)?);
    } else {
        print_profile(&user);
    }
    Ok(())
}

pub(crate) fn cmd_profile_set(svc: &ShredService, args: ProfileArgs, json: bool) -> Result<()> {
    let existing = svc.get_user()?;
    let new_user = merge(existing.as_ref(), args)?;
    let user = svc
        .save_profile(&new_user)
        .context("Could not save profile")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&user)?);
    } else {
        let verb = if existing.is_some() { "updated" } else { "created" };
        println!("Profile {verb}\n");
        print_profile(&user);
    }
    Ok(())
}
