//! Payroll ↔ attendance consistency check

use shared::models::{AttendanceStats, CoherenceIssue, CoherenceReport, Payroll};
use sqlx::SqlitePool;

use super::attendance::monthly_stats;
use crate::db::repository::{employee, payroll};
use crate::error::ServiceResult;
use crate::utils::time::month_bounds;

/// Fields where the statement disagrees with the attendance rows
pub fn divergences(p: &Payroll, stats: &AttendanceStats) -> Vec<String> {
    [
        ("jours_presence", p.jours_presence, stats.jours_presence),
        ("dimanches", p.dimanches, stats.dimanches),
        ("absences", p.absences, stats.absences),
        ("jours_repos", p.jours_repos, stats.jours_repos),
    ]
    .into_iter()
    .filter(|(_, paie, presence)| paie != presence)
    .map(|(field, paie, presence)| format!("{field}: paie={paie}, presence={presence}"))
    .collect()
}

/// Compare every active employee's statement with its attendance rows
pub async fn check_coherence(
    pool: &SqlitePool,
    tenant_id: &str,
    mois: u32,
    annee: i32,
) -> ServiceResult<CoherenceReport> {
    month_bounds(mois, annee)?;
    let employees = employee::find_active(pool, tenant_id).await?;

    let mut report = CoherenceReport {
        mois,
        annee,
        ..Default::default()
    };
    for emp in employees {
        report.employes_verifies += 1;
        let problemes = match payroll::find_for_period(pool, tenant_id, emp.id, mois, annee).await? {
            Some(p) => {
                let stats = monthly_stats(pool, tenant_id, emp.id, mois, annee).await?;
                divergences(&p, &stats)
            }
            None => vec!["no payroll for period".to_string()],
        };
        if problemes.is_empty() {
            report.employes_coherents += 1;
        } else {
            report.employes_incoherents += 1;
            report.problemes.push(CoherenceIssue {
                employee_id: emp.id,
                matricule: emp.matricule.clone(),
                nom: emp.full_name(),
                problemes,
            });
        }
    }

    if report.employes_incoherents > 0 {
        tracing::warn!(tenant_id, mois, annee, incoherents = report.employes_incoherents, "Payroll incoherences found");
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::attendance;
    use crate::db::repository::testing::{TENANT, seed_employee, test_pool};
    use crate::services::payroll::sync_payroll;
    use chrono::NaiveDate;
    use shared::models::AttendanceStatus;

    #[tokio::test]
    async fn detects_divergence_and_missing_payroll() {
        let pool = test_pool().await;
        let synced = seed_employee(&pool, TENANT, "EMP001").await;
        seed_employee(&pool, TENANT, "EMP002").await;

        let d = NaiveDate::from_ymd_opt(2025, 3, 3).unwrap();
        attendance::upsert(&pool, TENANT, synced.id, d, AttendanceStatus::PresentFull)
            .await
            .unwrap();
        {
            let mut conn = pool.acquire().await.unwrap();
            sync_payroll(&mut conn, TENANT, &synced, 3, 2025).await.unwrap();
        }

        let report = check_coherence(&pool, TENANT, 3, 2025).await.unwrap();
        assert_eq!(report.employes_verifies, 2);
        assert_eq!(report.employes_coherents, 1);
        assert_eq!(report.problemes[0].matricule, "EMP002");
        assert_eq!(report.problemes[0].problemes, vec!["no payroll for period"]);

        // a row written without the service leaves the statement stale
        let d = NaiveDate::from_ymd_opt(2025, 3, 4).unwrap();
        attendance::upsert(&pool, TENANT, synced.id, d, AttendanceStatus::Absent)
            .await
            .unwrap();
        let report = check_coherence(&pool, TENANT, 3, 2025).await.unwrap();
        assert_eq!(report.employes_incoherents, 2);
        let issue = report.problemes.iter().find(|i| i.matricule == "EMP001").unwrap();
        assert_eq!(issue.problemes, vec!["absences: paie=0, presence=1"]);
    }
}
