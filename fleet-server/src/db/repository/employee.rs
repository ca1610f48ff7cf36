//! Employee Repository

use super::{RepoError, RepoResult};
use shared::models::{Employee, EmployeeCreate, EmployeeStatus, EmployeeUpdate};
use sqlx::{Executor, Sqlite};

const COLUMNS: &str = "id, matricule, prenom, nom, fonction, telephone, date_embauche, statut, salaire_journalier, avances, montant_heure_supp_jour_ouvrable, montant_heure_supp_dimanche_ferie, valeur_km, taux_cnss_salarie_custom, taux_cnss_employeur_custom, taux_vf_custom, appliquer_cnss, appliquer_rts, appliquer_vf, calcul_salaire_auto, created_at, updated_at";

pub async fn find_all(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    statut: Option<EmployeeStatus>,
) -> RepoResult<Vec<Employee>> {
    let sql = format!(
        "SELECT {COLUMNS} FROM employee WHERE tenant_id = ?1 AND (?2 IS NULL OR statut = ?2) ORDER BY nom, prenom"
    );
    let rows = sqlx::query_as::<_, Employee>(&sql)
        .bind(tenant_id)
        .bind(statut)
        .fetch_all(db)
        .await?;
    Ok(rows)
}

/// Employees with status `Actif`, ordered by matricule
pub async fn find_active(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
) -> RepoResult<Vec<Employee>> {
    let sql = format!(
        "SELECT {COLUMNS} FROM employee WHERE tenant_id = ? AND statut = 'Actif' ORDER BY matricule"
    );
    let rows = sqlx::query_as::<_, Employee>(&sql)
        .bind(tenant_id)
        .fetch_all(db)
        .await?;
    Ok(rows)
}

/// Case-insensitive search on matricule, names and function
pub async fn search(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    query: &str,
) -> RepoResult<Vec<Employee>> {
    let pattern = format!("%{}%", query.trim());
    let sql = format!(
        "SELECT {COLUMNS} FROM employee WHERE tenant_id = ?1 AND (matricule LIKE ?2 OR nom LIKE ?2 OR prenom LIKE ?2 OR fonction LIKE ?2) ORDER BY nom, prenom LIMIT 50"
    );
    let rows = sqlx::query_as::<_, Employee>(&sql)
        .bind(tenant_id)
        .bind(pattern)
        .fetch_all(db)
        .await?;
    Ok(rows)
}

pub async fn find_by_id(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    id: i64,
) -> RepoResult<Option<Employee>> {
    let sql = format!("SELECT {COLUMNS} FROM employee WHERE id = ? AND tenant_id = ?");
    let employee = sqlx::query_as::<_, Employee>(&sql)
        .bind(id)
        .bind(tenant_id)
        .fetch_optional(db)
        .await?;
    Ok(employee)
}

pub async fn find_by_matricule(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    matricule: &str,
) -> RepoResult<Option<Employee>> {
    let sql = format!("SELECT {COLUMNS} FROM employee WHERE tenant_id = ? AND matricule = ?");
    let employee = sqlx::query_as::<_, Employee>(&sql)
        .bind(tenant_id)
        .bind(matricule)
        .fetch_optional(db)
        .await?;
    Ok(employee)
}

pub async fn create(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    data: EmployeeCreate,
) -> RepoResult<Employee> {
    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();
    let sql = format!(
        "INSERT INTO employee (id, tenant_id, matricule, prenom, nom, fonction, telephone, date_embauche, statut, salaire_journalier, avances, montant_heure_supp_jour_ouvrable, montant_heure_supp_dimanche_ferie, valeur_km, taux_cnss_salarie_custom, taux_cnss_employeur_custom, taux_vf_custom, appliquer_cnss, appliquer_rts, appliquer_vf, calcul_salaire_auto, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?22) RETURNING {COLUMNS}"
    );
    let employee = sqlx::query_as::<_, Employee>(&sql)
        .bind(id)
        .bind(tenant_id)
        .bind(&data.matricule)
        .bind(&data.prenom)
        .bind(&data.nom)
        .bind(&data.fonction)
        .bind(&data.telephone)
        .bind(data.date_embauche)
        .bind(data.statut)
        .bind(data.salaire_journalier)
        .bind(data.avances)
        .bind(data.montant_heure_supp_jour_ouvrable)
        .bind(data.montant_heure_supp_dimanche_ferie)
        .bind(data.valeur_km)
        .bind(data.taux_cnss_salarie_custom)
        .bind(data.taux_cnss_employeur_custom)
        .bind(data.taux_vf_custom)
        .bind(data.appliquer_cnss)
        .bind(data.appliquer_rts)
        .bind(data.appliquer_vf)
        .bind(data.calcul_salaire_auto)
        .bind(now)
        .fetch_one(db)
        .await
        .map_err(|e| match RepoError::from(e) {
            RepoError::Duplicate(_) => {
                RepoError::Duplicate(format!("Matricule '{}' already exists", data.matricule))
            }
            other => other,
        })?;
    Ok(employee)
}

pub async fn update(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    id: i64,
    data: EmployeeUpdate,
) -> RepoResult<Employee> {
    let now = shared::util::now_millis();
    let sql = format!(
        "UPDATE employee SET matricule = COALESCE(?1, matricule), prenom = COALESCE(?2, prenom), nom = COALESCE(?3, nom), fonction = COALESCE(?4, fonction), telephone = COALESCE(?5, telephone), date_embauche = COALESCE(?6, date_embauche), statut = COALESCE(?7, statut), salaire_journalier = COALESCE(?8, salaire_journalier), avances = COALESCE(?9, avances), montant_heure_supp_jour_ouvrable = COALESCE(?10, montant_heure_supp_jour_ouvrable), montant_heure_supp_dimanche_ferie = COALESCE(?11, montant_heure_supp_dimanche_ferie), valeur_km = COALESCE(?12, valeur_km), taux_cnss_salarie_custom = COALESCE(?13, taux_cnss_salarie_custom), taux_cnss_employeur_custom = COALESCE(?14, taux_cnss_employeur_custom), taux_vf_custom = COALESCE(?15, taux_vf_custom), appliquer_cnss = COALESCE(?16, appliquer_cnss), appliquer_rts = COALESCE(?17, appliquer_rts), appliquer_vf = COALESCE(?18, appliquer_vf), calcul_salaire_auto = COALESCE(?19, calcul_salaire_auto), updated_at = ?20 WHERE id = ?21 AND tenant_id = ?22 RETURNING {COLUMNS}"
    );
    sqlx::query_as::<_, Employee>(&sql)
        .bind(data.matricule)
        .bind(data.prenom)
        .bind(data.nom)
        .bind(data.fonction)
        .bind(data.telephone)
        .bind(data.date_embauche)
        .bind(data.statut)
        .bind(data.salaire_journalier)
        .bind(data.avances)
        .bind(data.montant_heure_supp_jour_ouvrable)
        .bind(data.montant_heure_supp_dimanche_ferie)
        .bind(data.valeur_km)
        .bind(data.taux_cnss_salarie_custom)
        .bind(data.taux_cnss_employeur_custom)
        .bind(data.taux_vf_custom)
        .bind(data.appliquer_cnss)
        .bind(data.appliquer_rts)
        .bind(data.appliquer_vf)
        .bind(data.calcul_salaire_auto)
        .bind(now)
        .bind(id)
        .bind(tenant_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Employee {id} not found")))
}

pub async fn delete(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    id: i64,
) -> RepoResult<()> {
    let rows = sqlx::query("DELETE FROM employee WHERE id = ? AND tenant_id = ?")
        .bind(id)
        .bind(tenant_id)
        .execute(db)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Employee {id} not found")));
    }
    Ok(())
}
