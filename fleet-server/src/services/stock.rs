//! Inventory ledger
//!
//! Stock is never stored on the product. Each entry or exit captures the
//! balance before and after it, and every ledger write appends a movement
//! in the same transaction. A write that would drive stock below zero is
//! refused with `InsufficientStock`.

use rust_decimal::Decimal;
use shared::error::{AppError, ErrorCode};
use shared::models::{
    InventoryLine, InventoryState, MovementType, Product, ProductCreate, ProductUpdate,
    StockEntry, StockEntryInput, StockExit, StockExitInput,
};
use sqlx::{SqliteConnection, SqlitePool};

use super::found;
use crate::db::repository::stock::{self as ledger, Balance, NewMovement};
use crate::db::repository::{RepoError, product};
use crate::error::{ServiceError, ServiceResult};
use crate::utils::money::{sum, to_decimal, to_f64};
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, validate_amount, validate_quantity, validate_required_text,
};

const GENERATED_PREFIX: &str = "PRD";

fn insufficient(product_id: &str, available: i64, requested: i64) -> ServiceError {
    AppError::with_message(
        ErrorCode::InsufficientStock,
        format!("Stock insuffisant pour {product_id}: disponible {available}, demandé {requested}"),
    )
    .into()
}

fn mapped(code: ErrorCode, what: String) -> impl FnOnce(RepoError) -> ServiceError {
    move |e| match e {
        RepoError::NotFound(_) => AppError::with_message(code, format!("{what} not found")).into(),
        other => other.into(),
    }
}

/// Next generated id: `PRD` + max numeric suffix + 1, zero-padded to 3
pub fn generated_id(max: i64) -> String {
    format!("{GENERATED_PREFIX}{:03}", max + 1)
}

// ── Products ────────────────────────────────────────────────────────

pub async fn create_product(
    pool: &SqlitePool,
    tenant_id: &str,
    data: &ProductCreate,
) -> ServiceResult<Product> {
    validate_required_text(&data.nom, "nom", MAX_NAME_LEN)?;
    validate_amount(data.prix_unitaire, "prix_unitaire")?;
    if data.seuil_minimum < 0 {
        return Err(AppError::validation("seuil_minimum must be non-negative").into());
    }

    let mut tx = pool.begin().await?;
    let id = match data.id.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(custom) => {
            validate_required_text(custom, "id", MAX_SHORT_TEXT_LEN)?;
            custom.to_string()
        }
        None => generated_id(product::max_generated_number(&mut *tx, tenant_id).await?),
    };
    let date_ajout = data.date_ajout.unwrap_or_else(shared::util::today);
    product::insert(&mut *tx, tenant_id, &id, data, date_ajout).await?;
    let created = found(
        product::find_by_id(&mut *tx, tenant_id, &id).await?,
        ErrorCode::ProductNotFound,
        format!("Product '{id}'"),
    )?;
    tx.commit().await?;

    tracing::info!(tenant_id, product_id = %created.id, "Product created");
    Ok(created)
}

pub async fn update_product(
    pool: &SqlitePool,
    tenant_id: &str,
    id: &str,
    data: ProductUpdate,
) -> ServiceResult<Product> {
    if let Some(nom) = &data.nom {
        validate_required_text(nom, "nom", MAX_NAME_LEN)?;
    }
    if let Some(prix) = data.prix_unitaire {
        validate_amount(prix, "prix_unitaire")?;
    }
    product::update(pool, tenant_id, id, data)
        .await
        .map_err(mapped(ErrorCode::ProductNotFound, format!("Product '{id}'")))?;
    found(
        product::find_by_id(pool, tenant_id, id).await?,
        ErrorCode::ProductNotFound,
        format!("Product '{id}'"),
    )
}

/// Refused while any entry or exit still references the product
pub async fn delete_product(pool: &SqlitePool, tenant_id: &str, id: &str) -> ServiceResult<()> {
    let mut tx = pool.begin().await?;
    if product::has_stock_rows(&mut *tx, tenant_id, id).await? {
        return Err(AppError::with_message(
            ErrorCode::ProductHasStock,
            format!("Product '{id}' still has stock entries or exits"),
        )
        .into());
    }
    product::delete(&mut *tx, tenant_id, id)
        .await
        .map_err(mapped(ErrorCode::ProductNotFound, format!("Product '{id}'")))?;
    tx.commit().await?;
    Ok(())
}

async fn ensure_product(
    conn: &mut SqliteConnection,
    tenant_id: &str,
    product_id: &str,
) -> ServiceResult<Product> {
    found(
        product::find_by_id(&mut *conn, tenant_id, product_id).await?,
        ErrorCode::ProductNotFound,
        format!("Product '{product_id}'"),
    )
}

// ── Entries ─────────────────────────────────────────────────────────

/// Write an entry and its `Entrée` movement inside the caller's transaction
pub(crate) async fn record_entry(
    conn: &mut SqliteConnection,
    tenant_id: &str,
    input: &StockEntryInput,
) -> ServiceResult<StockEntry> {
    validate_quantity(input.quantite, "quantite")?;
    validate_amount(input.prix_unitaire, "prix_unitaire")?;
    ensure_product(conn, tenant_id, &input.product_id).await?;

    let avant = ledger::current_stock(&mut *conn, tenant_id, &input.product_id).await?;
    let balance = Balance {
        avant,
        apres: avant + input.quantite,
    };
    let entry = ledger::insert_entry(&mut *conn, tenant_id, input, balance).await?;
    ledger::insert_movement(
        &mut *conn,
        tenant_id,
        &NewMovement {
            product_id: &entry.product_id,
            date: entry.date,
            type_mouvement: MovementType::Entree,
            quantite: entry.quantite,
            balance,
            reference_id: Some(entry.id),
            observations: if entry.reference_facture.is_empty() {
                format!("Entrée {}", entry.fournisseur)
            } else {
                format!("Entrée {} ({})", entry.fournisseur, entry.reference_facture)
            },
        },
    )
    .await?;
    Ok(entry)
}

pub async fn create_entry(
    pool: &SqlitePool,
    tenant_id: &str,
    input: &StockEntryInput,
) -> ServiceResult<StockEntry> {
    let mut tx = pool.begin().await?;
    let entry = record_entry(&mut tx, tenant_id, input).await?;
    tx.commit().await?;
    Ok(entry)
}

/// Replace an entry's quantity: `avant = current − old`, `apres = avant + new`
pub async fn update_entry(
    pool: &SqlitePool,
    tenant_id: &str,
    id: i64,
    input: &StockEntryInput,
) -> ServiceResult<StockEntry> {
    validate_quantity(input.quantite, "quantite")?;
    validate_amount(input.prix_unitaire, "prix_unitaire")?;
    let mut tx = pool.begin().await?;
    let previous = found(
        ledger::find_entry(&mut *tx, tenant_id, id).await?,
        ErrorCode::StockEntryNotFound,
        format!("Stock entry {id}"),
    )?;
    if previous.product_id != input.product_id {
        return Err(AppError::validation("An entry cannot be moved to another product").into());
    }

    let current = ledger::current_stock(&mut *tx, tenant_id, &previous.product_id).await?;
    let avant = current - previous.quantite;
    let balance = Balance {
        avant,
        apres: avant + input.quantite,
    };
    if balance.apres < 0 {
        return Err(insufficient(&previous.product_id, current, previous.quantite - input.quantite));
    }
    let entry = ledger::update_entry(&mut *tx, tenant_id, id, input, balance)
        .await
        .map_err(mapped(ErrorCode::StockEntryNotFound, format!("Stock entry {id}")))?;
    ledger::insert_movement(
        &mut *tx,
        tenant_id,
        &NewMovement {
            product_id: &entry.product_id,
            date: entry.date,
            type_mouvement: MovementType::Ajustement,
            quantite: entry.quantite - previous.quantite,
            balance: Balance {
                avant: current,
                apres: balance.apres,
            },
            reference_id: Some(entry.id),
            observations: format!(
                "Modification entrée {}: {} → {}",
                entry.id, previous.quantite, entry.quantite
            ),
        },
    )
    .await?;
    tx.commit().await?;
    Ok(entry)
}

pub async fn delete_entry(pool: &SqlitePool, tenant_id: &str, id: i64) -> ServiceResult<StockEntry> {
    let mut tx = pool.begin().await?;
    let removed = ledger::delete_entry(&mut *tx, tenant_id, id)
        .await
        .map_err(mapped(ErrorCode::StockEntryNotFound, format!("Stock entry {id}")))?;
    // current stock no longer counts the deleted row
    let apres = ledger::current_stock(&mut *tx, tenant_id, &removed.product_id).await?;
    if apres < 0 {
        return Err(insufficient(&removed.product_id, apres + removed.quantite, removed.quantite));
    }
    ledger::insert_movement(
        &mut *tx,
        tenant_id,
        &NewMovement {
            product_id: &removed.product_id,
            date: shared::util::today(),
            type_mouvement: MovementType::Ajustement,
            quantite: -removed.quantite,
            balance: Balance {
                avant: apres + removed.quantite,
                apres,
            },
            reference_id: Some(removed.id),
            observations: format!("Suppression entrée {}", removed.id),
        },
    )
    .await?;
    tx.commit().await?;
    Ok(removed)
}

// ── Exits ───────────────────────────────────────────────────────────

pub async fn create_exit(
    pool: &SqlitePool,
    tenant_id: &str,
    input: &StockExitInput,
) -> ServiceResult<StockExit> {
    validate_quantity(input.quantite, "quantite")?;
    let mut tx = pool.begin().await?;
    ensure_product(&mut tx, tenant_id, &input.product_id).await?;

    let avant = ledger::current_stock(&mut *tx, tenant_id, &input.product_id).await?;
    let balance = Balance {
        avant,
        apres: avant - input.quantite,
    };
    if balance.apres < 0 {
        return Err(insufficient(&input.product_id, avant, input.quantite));
    }
    let exit = ledger::insert_exit(&mut *tx, tenant_id, input, balance).await?;
    ledger::insert_movement(
        &mut *tx,
        tenant_id,
        &NewMovement {
            product_id: &exit.product_id,
            date: exit.date,
            type_mouvement: MovementType::Sortie,
            quantite: exit.quantite,
            balance,
            reference_id: Some(exit.id),
            observations: format!("Sortie vers {} ({})", exit.destination, exit.motif),
        },
    )
    .await?;
    tx.commit().await?;
    Ok(exit)
}

/// Replace an exit's quantity: `avant = current + old`, `apres = avant − new`
pub async fn update_exit(
    pool: &SqlitePool,
    tenant_id: &str,
    id: i64,
    input: &StockExitInput,
) -> ServiceResult<StockExit> {
    validate_quantity(input.quantite, "quantite")?;
    let mut tx = pool.begin().await?;
    let previous = found(
        ledger::find_exit(&mut *tx, tenant_id, id).await?,
        ErrorCode::StockExitNotFound,
        format!("Stock exit {id}"),
    )?;
    if previous.product_id != input.product_id {
        return Err(AppError::validation("An exit cannot be moved to another product").into());
    }

    let current = ledger::current_stock(&mut *tx, tenant_id, &previous.product_id).await?;
    let avant = current + previous.quantite;
    let balance = Balance {
        avant,
        apres: avant - input.quantite,
    };
    if balance.apres < 0 {
        return Err(insufficient(&previous.product_id, avant, input.quantite));
    }
    let exit = ledger::update_exit(&mut *tx, tenant_id, id, input, balance)
        .await
        .map_err(mapped(ErrorCode::StockExitNotFound, format!("Stock exit {id}")))?;
    ledger::insert_movement(
        &mut *tx,
        tenant_id,
        &NewMovement {
            product_id: &exit.product_id,
            date: exit.date,
            type_mouvement: MovementType::Ajustement,
            quantite: previous.quantite - exit.quantite,
            balance: Balance {
                avant: current,
                apres: balance.apres,
            },
            reference_id: Some(exit.id),
            observations: format!(
                "Modification sortie {}: {} → {}",
                exit.id, previous.quantite, exit.quantite
            ),
        },
    )
    .await?;
    tx.commit().await?;
    Ok(exit)
}

pub async fn delete_exit(pool: &SqlitePool, tenant_id: &str, id: i64) -> ServiceResult<StockExit> {
    let mut tx = pool.begin().await?;
    let removed = ledger::delete_exit(&mut *tx, tenant_id, id)
        .await
        .map_err(mapped(ErrorCode::StockExitNotFound, format!("Stock exit {id}")))?;
    let apres = ledger::current_stock(&mut *tx, tenant_id, &removed.product_id).await?;
    ledger::insert_movement(
        &mut *tx,
        tenant_id,
        &NewMovement {
            product_id: &removed.product_id,
            date: shared::util::today(),
            type_mouvement: MovementType::Ajustement,
            quantite: removed.quantite,
            balance: Balance {
                avant: apres - removed.quantite,
                apres,
            },
            reference_id: Some(removed.id),
            observations: format!("Suppression sortie {}", removed.id),
        },
    )
    .await?;
    tx.commit().await?;
    Ok(removed)
}

// ── Reports ─────────────────────────────────────────────────────────

/// Stock level, value and status of every product
pub async fn inventory_state(pool: &SqlitePool, tenant_id: &str) -> ServiceResult<InventoryState> {
    let products = product::find_all(pool, tenant_id, None).await?;
    let produits: Vec<InventoryLine> = products
        .into_iter()
        .map(|p| {
            let valeur = Decimal::from(p.stock_actuel) * to_decimal(p.prix_unitaire);
            InventoryLine {
                valeur_stock: to_f64(valeur),
                id: p.id,
                nom: p.nom,
                categorie: p.categorie,
                unite: p.unite,
                stock_actuel: p.stock_actuel,
                seuil_minimum: p.seuil_minimum,
                prix_unitaire: p.prix_unitaire,
                statut_stock: p.statut_stock,
            }
        })
        .collect();
    let valeur_totale = to_f64(sum(produits.iter().map(|l| l.valeur_stock)));
    let produits_en_alerte = produits
        .iter()
        .filter(|l| l.statut_stock == shared::models::StockStatus::Alerte)
        .count();
    Ok(InventoryState {
        produits,
        valeur_totale,
        produits_en_alerte,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::testing::{TENANT, test_pool};
    use chrono::NaiveDate;
    use shared::models::{ProductCategory, StockStatus, Unit};

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 2).unwrap()
    }

    fn product_payload(id: Option<&str>, nom: &str) -> ProductCreate {
        ProductCreate {
            id: id.map(String::from),
            nom: nom.into(),
            categorie: ProductCategory::Piece,
            unite: Unit::Piece,
            seuil_minimum: 3,
            prix_unitaire: 12_500.0,
            fournisseur: "Sonit".into(),
            date_ajout: Some(day()),
        }
    }

    fn entry(product_id: &str, quantite: i64) -> StockEntryInput {
        StockEntryInput {
            product_id: product_id.into(),
            date: day(),
            quantite,
            prix_unitaire: 12_500.0,
            fournisseur: "Sonit".into(),
            reference_facture: "BL-42".into(),
        }
    }

    fn exit(product_id: &str, quantite: i64) -> StockExitInput {
        StockExitInput {
            product_id: product_id.into(),
            date: day(),
            quantite,
            destination: "Atelier".into(),
            motif: "Révision".into(),
        }
    }

    #[test]
    fn generated_ids_are_zero_padded() {
        assert_eq!(generated_id(0), "PRD001");
        assert_eq!(generated_id(41), "PRD042");
        assert_eq!(generated_id(999), "PRD1000");
    }

    #[tokio::test]
    async fn product_ids_follow_the_highest_generated_one() {
        let pool = test_pool().await;
        let a = create_product(&pool, TENANT, &product_payload(None, "Filtre")).await.unwrap();
        let b = create_product(&pool, TENANT, &product_payload(Some("HUILE-5W30"), "Huile"))
            .await
            .unwrap();
        let c = create_product(&pool, TENANT, &product_payload(None, "Bougie")).await.unwrap();
        assert_eq!((a.id.as_str(), b.id.as_str(), c.id.as_str()), ("PRD001", "HUILE-5W30", "PRD002"));
    }

    #[tokio::test]
    async fn exit_beyond_stock_is_refused_without_movement() {
        let pool = test_pool().await;
        let p = create_product(&pool, TENANT, &product_payload(None, "Filtre")).await.unwrap();
        let e = create_entry(&pool, TENANT, &entry(&p.id, 5)).await.unwrap();
        assert_eq!((e.stock_avant, e.stock_apres), (0, 5));

        let err = create_exit(&pool, TENANT, &exit(&p.id, 6)).await.unwrap_err();
        match err {
            ServiceError::App(a) => {
                assert_eq!(a.code, ErrorCode::InsufficientStock);
                assert!(a.message.starts_with("Stock insuffisant"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        let movements = ledger::list_movements(&pool, TENANT, Some(&p.id)).await.unwrap();
        assert_eq!(movements.len(), 1);
        assert_eq!(movements[0].type_mouvement, MovementType::Entree);

        let x = create_exit(&pool, TENANT, &exit(&p.id, 5)).await.unwrap();
        assert_eq!((x.stock_avant, x.stock_apres), (5, 0));
        let p = product::find_by_id(&pool, TENANT, &p.id).await.unwrap().unwrap();
        assert_eq!(p.stock_actuel, 0);
        assert_eq!(p.statut_stock, StockStatus::Alerte);
    }

    #[tokio::test]
    async fn entry_update_recomputes_balance() {
        let pool = test_pool().await;
        let p = create_product(&pool, TENANT, &product_payload(None, "Filtre")).await.unwrap();
        let e = create_entry(&pool, TENANT, &entry(&p.id, 10)).await.unwrap();
        create_exit(&pool, TENANT, &exit(&p.id, 4)).await.unwrap();

        // 4 already left the warehouse: 3 would leave the stock at -1
        let err = update_entry(&pool, TENANT, e.id, &entry(&p.id, 3)).await.unwrap_err();
        assert!(matches!(err, ServiceError::App(ref a) if a.code == ErrorCode::InsufficientStock));

        let updated = update_entry(&pool, TENANT, e.id, &entry(&p.id, 8)).await.unwrap();
        assert_eq!((updated.stock_avant, updated.stock_apres), (-4, 4));
        assert_eq!(ledger::current_stock(&pool, TENANT, &p.id).await.unwrap(), 4);

        let movements = ledger::list_movements(&pool, TENANT, Some(&p.id)).await.unwrap();
        let adjustment = movements
            .iter()
            .find(|m| m.type_mouvement == MovementType::Ajustement)
            .unwrap();
        assert_eq!(adjustment.quantite, -2);
        assert_eq!((adjustment.stock_avant, adjustment.stock_apres), (6, 4));
    }

    #[tokio::test]
    async fn deleting_consumed_entry_is_refused() {
        let pool = test_pool().await;
        let p = create_product(&pool, TENANT, &product_payload(None, "Filtre")).await.unwrap();
        let e = create_entry(&pool, TENANT, &entry(&p.id, 5)).await.unwrap();
        let x = create_exit(&pool, TENANT, &exit(&p.id, 2)).await.unwrap();

        let err = delete_entry(&pool, TENANT, e.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::App(ref a) if a.code == ErrorCode::InsufficientStock));
        assert!(ledger::find_entry(&pool, TENANT, e.id).await.unwrap().is_some());

        delete_exit(&pool, TENANT, x.id).await.unwrap();
        delete_entry(&pool, TENANT, e.id).await.unwrap();
        assert_eq!(ledger::current_stock(&pool, TENANT, &p.id).await.unwrap(), 0);
        delete_product(&pool, TENANT, &p.id).await.unwrap();
    }

    #[tokio::test]
    async fn product_with_ledger_rows_cannot_be_deleted() {
        let pool = test_pool().await;
        let p = create_product(&pool, TENANT, &product_payload(None, "Filtre")).await.unwrap();
        create_entry(&pool, TENANT, &entry(&p.id, 1)).await.unwrap();
        let err = delete_product(&pool, TENANT, &p.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::App(ref a) if a.code == ErrorCode::ProductHasStock));
    }

    #[tokio::test]
    async fn inventory_values_stock() {
        let pool = test_pool().await;
        let a = create_product(&pool, TENANT, &product_payload(None, "Filtre")).await.unwrap();
        create_product(&pool, TENANT, &product_payload(None, "Bougie")).await.unwrap();
        create_entry(&pool, TENANT, &entry(&a.id, 10)).await.unwrap();

        let state = inventory_state(&pool, TENANT).await.unwrap();
        assert_eq!(state.produits.len(), 2);
        assert_eq!(state.valeur_totale, 125_000.0);
        assert_eq!(state.produits_en_alerte, 1);
        let filtre = state.produits.iter().find(|l| l.id == a.id).unwrap();
        assert_eq!(filtre.statut_stock, StockStatus::Ok);
    }
}
