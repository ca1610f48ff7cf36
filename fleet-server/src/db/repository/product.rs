//! Product Repository
//!
//! `stock_actuel` is never stored: every read derives it from the entry
//! and exit ledgers.

use super::{RepoError, RepoResult};
use shared::models::{Product, ProductCategory, ProductCreate, ProductUpdate};
use sqlx::{Executor, Sqlite};

const SELECT: &str = "SELECT p.id, p.nom, p.categorie, p.unite, p.seuil_minimum, p.prix_unitaire, p.fournisseur, p.date_ajout, \
    (SELECT COALESCE(SUM(e.quantite), 0) FROM stock_entry e WHERE e.tenant_id = p.tenant_id AND e.product_id = p.id) \
    - (SELECT COALESCE(SUM(x.quantite), 0) FROM stock_exit x WHERE x.tenant_id = p.tenant_id AND x.product_id = p.id) AS stock_actuel \
    FROM product p";

pub async fn find_all(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    categorie: Option<ProductCategory>,
) -> RepoResult<Vec<Product>> {
    let sql = format!(
        "{SELECT} WHERE p.tenant_id = ?1 AND (?2 IS NULL OR p.categorie = ?2) ORDER BY p.nom"
    );
    let rows = sqlx::query_as::<_, Product>(&sql)
        .bind(tenant_id)
        .bind(categorie)
        .fetch_all(db)
        .await?;
    Ok(rows.into_iter().map(Product::with_status).collect())
}

/// Search by id, name or supplier
pub async fn search(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    query: &str,
) -> RepoResult<Vec<Product>> {
    let pattern = format!("%{}%", query.trim());
    let sql = format!(
        "{SELECT} WHERE p.tenant_id = ?1 AND (p.id LIKE ?2 OR p.nom LIKE ?2 OR p.fournisseur LIKE ?2) ORDER BY p.nom LIMIT 50"
    );
    let rows = sqlx::query_as::<_, Product>(&sql)
        .bind(tenant_id)
        .bind(pattern)
        .fetch_all(db)
        .await?;
    Ok(rows.into_iter().map(Product::with_status).collect())
}

pub async fn find_by_id(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    id: &str,
) -> RepoResult<Option<Product>> {
    let sql = format!("{SELECT} WHERE p.tenant_id = ? AND p.id = ?");
    let row = sqlx::query_as::<_, Product>(&sql)
        .bind(tenant_id)
        .bind(id)
        .fetch_optional(db)
        .await?;
    Ok(row.map(Product::with_status))
}

/// Highest numeric suffix among `PRD…` ids of the tenant
pub async fn max_generated_number(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
) -> RepoResult<i64> {
    let max: Option<i64> = sqlx::query_scalar(
        "SELECT MAX(CAST(SUBSTR(id, 4) AS INTEGER)) FROM product WHERE tenant_id = ? AND id LIKE 'PRD%'",
    )
    .bind(tenant_id)
    .fetch_one(db)
    .await?;
    Ok(max.unwrap_or(0))
}

/// Insert with an already-resolved id
pub async fn insert(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    id: &str,
    data: &ProductCreate,
    date_ajout: chrono::NaiveDate,
) -> RepoResult<()> {
    sqlx::query(
        "INSERT INTO product (tenant_id, id, nom, categorie, unite, seuil_minimum, prix_unitaire, fournisseur, date_ajout) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(tenant_id)
    .bind(id)
    .bind(&data.nom)
    .bind(data.categorie)
    .bind(data.unite)
    .bind(data.seuil_minimum)
    .bind(data.prix_unitaire)
    .bind(&data.fournisseur)
    .bind(date_ajout)
    .execute(db)
    .await
    .map_err(|e| match RepoError::from(e) {
        RepoError::Duplicate(_) => RepoError::Duplicate(format!("Product '{id}' already exists")),
        other => other,
    })?;
    Ok(())
}

pub async fn update(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    id: &str,
    data: ProductUpdate,
) -> RepoResult<()> {
    let rows = sqlx::query(
        "UPDATE product SET nom = COALESCE(?1, nom), categorie = COALESCE(?2, categorie), unite = COALESCE(?3, unite), seuil_minimum = COALESCE(?4, seuil_minimum), prix_unitaire = COALESCE(?5, prix_unitaire), fournisseur = COALESCE(?6, fournisseur) WHERE tenant_id = ?7 AND id = ?8",
    )
    .bind(data.nom)
    .bind(data.categorie)
    .bind(data.unite)
    .bind(data.seuil_minimum)
    .bind(data.prix_unitaire)
    .bind(data.fournisseur)
    .bind(tenant_id)
    .bind(id)
    .execute(db)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Product '{id}' not found")));
    }
    Ok(())
}

pub async fn delete(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    id: &str,
) -> RepoResult<()> {
    let rows = sqlx::query("DELETE FROM product WHERE tenant_id = ? AND id = ?")
        .bind(tenant_id)
        .bind(id)
        .execute(db)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Product '{id}' not found")));
    }
    Ok(())
}

/// Whether any entry or exit references the product
pub async fn has_stock_rows(
    db: impl Executor<'_, Database = Sqlite>,
    tenant_id: &str,
    id: &str,
) -> RepoResult<bool> {
    let exists: bool = sqlx::query_scalar(
        "SELECT EXISTS (SELECT 1 FROM stock_entry WHERE tenant_id = ?1 AND product_id = ?2) OR EXISTS (SELECT 1 FROM stock_exit WHERE tenant_id = ?1 AND product_id = ?2)",
    )
    .bind(tenant_id)
    .bind(id)
    .fetch_one(db)
    .await?;
    Ok(exists)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::testing::{OTHER_TENANT, TENANT, test_pool};
    use chrono::NaiveDate;
    use shared::models::{StockStatus, Unit};

    fn payload(nom: &str) -> ProductCreate {
        ProductCreate {
            id: None,
            nom: nom.into(),
            categorie: ProductCategory::Piece,
            unite: Unit::Piece,
            seuil_minimum: 2,
            prix_unitaire: 15_000.0,
            fournisseur: "Sonit".into(),
            date_ajout: None,
        }
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()
    }

    #[tokio::test]
    async fn new_product_has_zero_stock_in_alert() {
        let pool = test_pool().await;
        insert(&pool, TENANT, "PRD001", &payload("Filtre à huile"), day()).await.unwrap();
        let p = find_by_id(&pool, TENANT, "PRD001").await.unwrap().unwrap();
        assert_eq!(p.stock_actuel, 0);
        assert_eq!(p.statut_stock, StockStatus::Alerte);
        assert!(!has_stock_rows(&pool, TENANT, "PRD001").await.unwrap());
    }

    #[tokio::test]
    async fn generated_number_is_per_tenant() {
        let pool = test_pool().await;
        assert_eq!(max_generated_number(&pool, TENANT).await.unwrap(), 0);
        insert(&pool, TENANT, "PRD007", &payload("Filtre"), day()).await.unwrap();
        insert(&pool, TENANT, "CUSTOM", &payload("Huile"), day()).await.unwrap();
        assert_eq!(max_generated_number(&pool, TENANT).await.unwrap(), 7);
        assert_eq!(max_generated_number(&pool, OTHER_TENANT).await.unwrap(), 0);

        let err = insert(&pool, TENANT, "PRD007", &payload("Doublon"), day()).await.unwrap_err();
        assert!(matches!(err, RepoError::Duplicate(_)));
    }

    #[tokio::test]
    async fn update_and_search() {
        let pool = test_pool().await;
        insert(&pool, TENANT, "PRD001", &payload("Filtre à huile"), day()).await.unwrap();
        update(
            &pool,
            TENANT,
            "PRD001",
            ProductUpdate {
                prix_unitaire: Some(18_000.0),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        let found = search(&pool, TENANT, "filtre").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].prix_unitaire, 18_000.0);
        assert!(search(&pool, OTHER_TENANT, "filtre").await.unwrap().is_empty());

        let err = update(&pool, OTHER_TENANT, "PRD001", ProductUpdate::default())
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::NotFound(_)));
    }
}
