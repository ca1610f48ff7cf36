//! Payroll Repository (bulletins de paie)

use super::{RepoError, RepoResult};
use shared::models::{Payroll, PayrollExportRow};
use sqlx::{Executor, Sqlite};

const COLUMNS: &str = "id, employee_id, mois, annee, salaire_base, salaire_brut, salaire_net, salaire_net_a_payer, jours_mois, jours_presence, jours_repos, absences, dimanches, conge, montant_jours_travailles, heures_supplementaires, montant_heures_supplementaires, montant_heures_supplement_dimanches, montant_frais_km, indemnite_transport, indemnite_logement, cherete_vie, prime_discipline, prime_ferie, cnss, cnss_employeur, rts, vf, avance_sur_salaire, sanction_vol_carburant, created_at, updated_at";

pub async fn find_by_id(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    id: i64,
) -> RepoResult<Option<Payroll>> {
    let sql = format!("SELECT {COLUMNS} FROM payroll WHERE id = ? AND tenant_id = ?");
    let row = sqlx::query_as::<_, Payroll>(&sql)
        .bind(id)
        .bind(tenant_id)
        .fetch_optional(db)
        .await?;
    Ok(row)
}

pub async fn find_for_period(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    employee_id: i64,
    mois: u32,
    annee: i32,
) -> RepoResult<Option<Payroll>> {
    let sql = format!(
        "SELECT {COLUMNS} FROM payroll WHERE tenant_id = ? AND employee_id = ? AND mois = ? AND annee = ?"
    );
    let row = sqlx::query_as::<_, Payroll>(&sql)
        .bind(tenant_id)
        .bind(employee_id)
        .bind(mois)
        .bind(annee)
        .fetch_optional(db)
        .await?;
    Ok(row)
}

pub async fn list_for_period(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    mois: u32,
    annee: i32,
) -> RepoResult<Vec<Payroll>> {
    let sql = format!(
        "SELECT {COLUMNS} FROM payroll WHERE tenant_id = ? AND mois = ? AND annee = ? ORDER BY employee_id"
    );
    let rows = sqlx::query_as::<_, Payroll>(&sql)
        .bind(tenant_id)
        .bind(mois)
        .bind(annee)
        .fetch_all(db)
        .await?;
    Ok(rows)
}

/// New statement with zeroed amounts and `salaire_base` preset
pub async fn insert_empty(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    employee_id: i64,
    mois: u32,
    annee: i32,
    salaire_base: f64,
) -> RepoResult<Payroll> {
    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();
    let sql = format!(
        "INSERT INTO payroll (id, tenant_id, employee_id, mois, annee, salaire_base, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7) RETURNING {COLUMNS}"
    );
    let row = sqlx::query_as::<_, Payroll>(&sql)
        .bind(id)
        .bind(tenant_id)
        .bind(employee_id)
        .bind(mois)
        .bind(annee)
        .bind(salaire_base)
        .bind(now)
        .fetch_one(db)
        .await?;
    Ok(row)
}

/// Persist every computed and manual column of a statement
pub async fn save(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    p: &Payroll,
) -> RepoResult<Payroll> {
    let now = shared::util::now_millis();
    let sql = format!(
        "UPDATE payroll SET salaire_base = ?, salaire_brut = ?, salaire_net = ?, salaire_net_a_payer = ?, jours_mois = ?, jours_presence = ?, jours_repos = ?, absences = ?, dimanches = ?, conge = ?, montant_jours_travailles = ?, heures_supplementaires = ?, montant_heures_supplementaires = ?, montant_heures_supplement_dimanches = ?, montant_frais_km = ?, indemnite_transport = ?, indemnite_logement = ?, cherete_vie = ?, prime_discipline = ?, prime_ferie = ?, cnss = ?, cnss_employeur = ?, rts = ?, vf = ?, avance_sur_salaire = ?, sanction_vol_carburant = ?, updated_at = ? WHERE id = ? AND tenant_id = ? RETURNING {COLUMNS}"
    );
    sqlx::query_as::<_, Payroll>(&sql)
        .bind(p.salaire_base)
        .bind(p.salaire_brut)
        .bind(p.salaire_net)
        .bind(p.salaire_net_a_payer)
        .bind(p.jours_mois)
        .bind(p.jours_presence)
        .bind(p.jours_repos)
        .bind(p.absences)
        .bind(p.dimanches)
        .bind(p.conge)
        .bind(p.montant_jours_travailles)
        .bind(p.heures_supplementaires)
        .bind(p.montant_heures_supplementaires)
        .bind(p.montant_heures_supplement_dimanches)
        .bind(p.montant_frais_km)
        .bind(p.indemnite_transport)
        .bind(p.indemnite_logement)
        .bind(p.cherete_vie)
        .bind(p.prime_discipline)
        .bind(p.prime_ferie)
        .bind(p.cnss)
        .bind(p.cnss_employeur)
        .bind(p.rts)
        .bind(p.vf)
        .bind(p.avance_sur_salaire)
        .bind(p.sanction_vol_carburant)
        .bind(now)
        .bind(p.id)
        .bind(tenant_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Payroll {} not found", p.id)))
}

/// `(mois, annee)` of every statement the employee already has
pub async fn periods_for_employee(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    employee_id: i64,
) -> RepoResult<Vec<(u32, i32)>> {
    let rows = sqlx::query_as::<_, (u32, i32)>(
        "SELECT mois, annee FROM payroll WHERE tenant_id = ? AND employee_id = ? ORDER BY annee, mois",
    )
    .bind(tenant_id)
    .bind(employee_id)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn delete_period(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    mois: u32,
    annee: i32,
) -> RepoResult<u64> {
    let rows = sqlx::query("DELETE FROM payroll WHERE tenant_id = ? AND mois = ? AND annee = ?")
        .bind(tenant_id)
        .bind(mois)
        .bind(annee)
        .execute(db)
        .await?;
    Ok(rows.rows_affected())
}

/// Flat rows for the CSV export, ordered by matricule
pub async fn export_rows(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    mois: u32,
    annee: i32,
) -> RepoResult<Vec<PayrollExportRow>> {
    let rows = sqlx::query_as::<_, PayrollExportRow>(
        "SELECT e.matricule, e.prenom, e.nom, p.salaire_brut, p.cnss, p.rts, p.vf, p.avance_sur_salaire, p.sanction_vol_carburant, p.salaire_net_a_payer FROM payroll p JOIN employee e ON e.id = p.employee_id WHERE p.tenant_id = ? AND p.mois = ? AND p.annee = ? ORDER BY e.matricule",
    )
    .bind(tenant_id)
    .bind(mois)
    .bind(annee)
    .fetch_all(db)
    .await?;
    Ok(rows)
}
