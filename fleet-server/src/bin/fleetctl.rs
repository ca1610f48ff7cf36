//! Maintenance commands run against the fleet database
//!
//! ```text
//! fleetctl --tenant ent:1 clear-inventory --yes
//! fleetctl --tenant ent:1 sync-payroll --month 3 --year 2025
//! ```

use std::process::ExitCode;

use anyhow::Context;
use chrono::Datelike;
use clap::{Args, Parser, Subcommand};
use fleet_server::db::DbService;
use fleet_server::services::maintenance::{self, PurgeReport};
use fleet_server::services::{coherence, payroll};
use fleet_server::utils::logger::init_logger;
use serde::Serialize;
use shared::models::SyncRequest;
use sqlx::SqlitePool;

#[derive(Parser)]
#[command(author, version, about = "Fleet server maintenance commands")]
struct Opts {
    /// SQLite database file
    #[arg(long, env = "DATABASE_PATH", default_value = "fleet.db", global = true)]
    database: String,

    /// Tenant key (`ent:<id>` or `usr:<id>`)
    #[arg(long, value_parser = parse_tenant)]
    tenant: String,

    #[command(subcommand)]
    cmd: Command,
}

fn parse_tenant(raw: &str) -> Result<String, String> {
    let id = raw
        .strip_prefix("ent:")
        .or_else(|| raw.strip_prefix("usr:"))
        .ok_or_else(|| format!("'{raw}' is not ent:<id> or usr:<id>"))?;
    id.parse::<i64>()
        .map(|_| raw.to_string())
        .map_err(|_| format!("'{id}' is not a numeric id"))
}

#[derive(Subcommand)]
enum Command {
    /// Delete the tenant's products, stock movements, purchase orders and invoices
    ClearInventory(Confirm),
    /// Delete the tenant's employees and their attendance, overtime, mileage and payroll
    PurgeEmployeeData(Confirm),
    /// Rebuild payroll statements from attendance
    SyncPayroll(Period),
    /// Insert a demo supplier, three vehicles and rentals for the current month
    SeedRentals,
    /// Compare payroll statements with attendance
    CheckCoherence(Period),
}

#[derive(Args)]
struct Confirm {
    /// Actually delete; without it the command only reports what would go
    #[arg(long)]
    yes: bool,
}

#[derive(Args)]
struct Period {
    /// 1-12, defaults to the current month
    #[arg(long)]
    month: Option<u32>,
    /// Defaults to the current year
    #[arg(long)]
    year: Option<i32>,
    /// Only this employee (sync-payroll)
    #[arg(long)]
    matricule: Option<String>,
}

impl Period {
    fn resolve(&self) -> (u32, i32) {
        let today = shared::util::today();
        (
            self.month.unwrap_or_else(|| today.month()),
            self.year.unwrap_or_else(|| today.year()),
        )
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_purge(report: &PurgeReport, applied: bool) {
    for table in &report.tables {
        println!("{:<28} {:>8}", table.table, table.rows);
    }
    let verb = if applied { "deleted" } else { "would be deleted" };
    println!("{} rows {verb}", report.total());
}

#[derive(Clone, Copy)]
enum PurgeTarget {
    Inventory,
    Employees,
}

async fn purge(
    pool: &SqlitePool,
    tenant: &str,
    target: PurgeTarget,
    confirm: &Confirm,
) -> anyhow::Result<ExitCode> {
    let dry_run = !confirm.yes;
    let report = match target {
        PurgeTarget::Inventory => maintenance::clear_inventory(pool, tenant, dry_run).await?,
        PurgeTarget::Employees => maintenance::purge_employee_data(pool, tenant, dry_run).await?,
    };
    print_purge(&report, confirm.yes);
    if confirm.yes {
        Ok(ExitCode::SUCCESS)
    } else {
        eprintln!("Dry run only, pass --yes to delete");
        Ok(ExitCode::FAILURE)
    }
}

async fn run(opts: Opts) -> anyhow::Result<ExitCode> {
    let tenant = opts.tenant.as_str();
    let db = DbService::new(&opts.database)
        .await
        .with_context(|| format!("Failed to open {}", opts.database))?;
    let pool = &db.pool;

    match &opts.cmd {
        Command::ClearInventory(confirm) => {
            purge(pool, tenant, PurgeTarget::Inventory, confirm).await
        }
        Command::PurgeEmployeeData(confirm) => {
            purge(pool, tenant, PurgeTarget::Employees, confirm).await
        }
        Command::SyncPayroll(period) => {
            let (mois, annee) = period.resolve();
            let report = payroll::sync_all(
                pool,
                tenant,
                &SyncRequest {
                    mois,
                    annee,
                    matricule: period.matricule.clone(),
                },
            )
            .await?;
            print_json(&report)?;
            Ok(if report.errors.is_empty() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Command::SeedRentals => {
            let report = maintenance::seed_rentals(pool, tenant).await?;
            print_json(&report)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::CheckCoherence(period) => {
            let (mois, annee) = period.resolve();
            let report = coherence::check_coherence(pool, tenant, mois, annee).await?;
            print_json(&report)?;
            Ok(if report.employes_incoherents == 0 {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let opts = Opts::parse();
    if let Err(e) = init_logger("fleet_server=warn", false) {
        eprintln!("Logger setup failed: {e}");
    }
    match run(opts).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tenant_is_required_before_running() {
        assert!(Opts::try_parse_from(["fleetctl", "sync-payroll"]).is_err());
        assert!(Opts::try_parse_from(["fleetctl", "--tenant", "ent-1", "sync-payroll"]).is_err());
        let opts = Opts::try_parse_from(["fleetctl", "--tenant", "usr:4", "sync-payroll"]).unwrap();
        assert_eq!(opts.tenant, "usr:4");
        assert!(matches!(opts.cmd, Command::SyncPayroll(_)));
    }

    #[test]
    fn command_definition_is_consistent() {
        use clap::CommandFactory;
        Opts::command().debug_assert();
    }
}
