use anyhow::{Result, bail};
use std::path::Path;

use macrolog_core::backup::read_archive;
use macrolog_core::service::TrackerService;

pub(crate) fn cmd_backup(svc: &TrackerService, dir: &Path, json: bool) -> Result<()> {
    let path = svc.write_backup(dir)?;

    if json {
        println!("{}", serde_json::json!({ "path": path.display().to_string() }));
    } else {
        println!("Backup written to {}", path.display());
    }

    Ok(())
}

pub(crate) fn cmd_restore(svc: &TrackerService, file: &Path, json: bool) -> Result<()> {
    if !file.is_file() {
        bail!("Backup file not found: {}", file.display());
    }
    let archive = read_archive(file)?;
    let summary = svc.restore_backup(&archive)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("Restored from {}", file.display());
        println!("  Foods:          {}", summary.foods);
        println!("  Log entries:    {}", summary.totals);
        println!("  Weigh-ins:      {}", summary.weights);
        println!("  Workouts:       {}", summary.workout_entries);
        println!("  Exercise names: {}", summary.workout_names);
        if summary.plan_restored {
            println!("  Expected plan restored");
        }
    }

    Ok(())
}
