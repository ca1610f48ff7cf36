//! Purchase orders (commandes)
//!
//! Numbered `CMD{YYYYMM}{seq:04}` per tenant. Lines snapshot the product's
//! name and category. Receiving an order (`Livrée`) books one stock entry
//! per line in the same transaction.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use shared::error::{AppError, ErrorCode};
use shared::models::{
    PurchaseOrder, PurchaseOrderCreate, PurchaseOrderDetail, PurchaseOrderLineInput,
    PurchaseOrderStatus, PurchaseOrderUpdate, StockEntryInput,
};
use sqlx::{SqliteConnection, SqlitePool};

use super::{found, stock};
use crate::db::repository::purchase_order::{self as repo, NewLine, NewOrder};
use crate::db::repository::{RepoError, product};
use crate::error::{ServiceError, ServiceResult};
use crate::utils::money::{percent_of, sum, to_decimal, to_f64};
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, validate_amount, validate_quantity, validate_required_text,
    validate_text_len,
};

/// `CMD{YYYYMM}` prefix of a date
pub fn number_prefix(date: NaiveDate) -> String {
    format!("CMD{:04}{:02}", date.year(), date.month())
}

/// `(montant_total, montant_final)` for the line amounts and discount
pub fn totals(montants: impl IntoIterator<Item = f64>, remise_pourcent: f64) -> (Decimal, Decimal) {
    let total = sum(montants);
    let remise = percent_of(total, to_decimal(remise_pourcent));
    (total, total - remise)
}

fn validate_discount(remise: f64) -> Result<(), AppError> {
    if !(0.0..=100.0).contains(&remise) {
        return Err(AppError::with_message(
            ErrorCode::InvalidDiscount,
            format!("remise_pourcent must be between 0 and 100, got {remise}"),
        ));
    }
    Ok(())
}

fn not_found(id: i64) -> String {
    format!("Purchase order {id}")
}

fn ensure_editable(order: &PurchaseOrder) -> ServiceResult<()> {
    if order.statut.lines_editable() {
        Ok(())
    } else {
        Err(AppError::with_message(
            ErrorCode::OrderNotEditable,
            format!("Order {} is {}", order.numero, order.statut.label()),
        )
        .into())
    }
}

async fn next_number(
    conn: &mut SqliteConnection,
    tenant_id: &str,
    date: NaiveDate,
) -> ServiceResult<String> {
    let prefix = number_prefix(date);
    let last = repo::last_number_with_prefix(&mut *conn, tenant_id, &prefix).await?;
    let seq = shared::util::next_sequence(&prefix, last.as_deref());
    Ok(format!("{prefix}{seq:04}"))
}

/// Resolve the product snapshot of each line, then write lines and totals
async fn write_lines(
    conn: &mut SqliteConnection,
    tenant_id: &str,
    order: &PurchaseOrder,
    lignes: &[PurchaseOrderLineInput],
) -> ServiceResult<PurchaseOrder> {
    let mut montants = Vec::with_capacity(lignes.len());
    for input in lignes {
        validate_quantity(input.quantite, "quantite")?;
        let p = found(
            product::find_by_id(&mut *conn, tenant_id, &input.product_id).await?,
            ErrorCode::ProductNotFound,
            format!("Product '{}'", input.product_id),
        )?;
        let prix = input.prix_unitaire.unwrap_or(p.prix_unitaire);
        validate_amount(prix, "prix_unitaire")?;
        let montant = to_f64(Decimal::from(input.quantite) * to_decimal(prix));
        repo::insert_line(
            &mut *conn,
            tenant_id,
            order.id,
            &NewLine {
                product_id: p.id,
                designation: p.nom,
                categorie: p.categorie.label().to_string(),
                quantite: input.quantite,
                prix_unitaire: prix,
                montant_ligne: montant,
            },
        )
        .await?;
        montants.push(montant);
    }
    let (total, final_) = totals(montants, order.remise_pourcent);
    Ok(repo::set_totals(&mut *conn, tenant_id, order.id, to_f64(total), to_f64(final_)).await?)
}

pub async fn create(
    pool: &SqlitePool,
    tenant_id: &str,
    data: &PurchaseOrderCreate,
) -> ServiceResult<PurchaseOrderDetail> {
    validate_required_text(&data.fournisseur, "fournisseur", MAX_NAME_LEN)?;
    validate_text_len(&data.observations, "observations", MAX_NOTE_LEN)?;
    validate_discount(data.remise_pourcent)?;

    let date_commande = data.date_commande.unwrap_or_else(shared::util::today);
    let mut tx = pool.begin().await?;
    let numero = next_number(&mut tx, tenant_id, date_commande).await?;
    let order = repo::insert(
        &mut *tx,
        tenant_id,
        &NewOrder {
            numero: &numero,
            fournisseur: data.fournisseur.trim(),
            date_commande,
            date_livraison_prevue: data.date_livraison_prevue,
            remise_pourcent: data.remise_pourcent,
            observations: &data.observations,
        },
    )
    .await?;
    let order = write_lines(&mut tx, tenant_id, &order, &data.lignes).await?;
    let lignes = repo::lines(&mut *tx, tenant_id, order.id).await?;
    tx.commit().await?;

    tracing::info!(tenant_id, numero = %order.numero, montant_final = order.montant_final, "Purchase order created");
    Ok(PurchaseOrderDetail { order, lignes })
}

pub async fn detail(pool: &SqlitePool, tenant_id: &str, id: i64) -> ServiceResult<PurchaseOrderDetail> {
    let order = found(
        repo::find_by_id(pool, tenant_id, id).await?,
        ErrorCode::PurchaseOrderNotFound,
        not_found(id),
    )?;
    let lignes = repo::lines(pool, tenant_id, id).await?;
    Ok(PurchaseOrderDetail { order, lignes })
}

/// Header changes; a new discount re-derives `montant_final`
pub async fn update(
    pool: &SqlitePool,
    tenant_id: &str,
    id: i64,
    data: &PurchaseOrderUpdate,
) -> ServiceResult<PurchaseOrder> {
    if let Some(fournisseur) = &data.fournisseur {
        validate_required_text(fournisseur, "fournisseur", MAX_NAME_LEN)?;
    }
    if let Some(remise) = data.remise_pourcent {
        validate_discount(remise)?;
    }
    let mut tx = pool.begin().await?;
    let current = found(
        repo::find_by_id(&mut *tx, tenant_id, id).await?,
        ErrorCode::PurchaseOrderNotFound,
        not_found(id),
    )?;
    ensure_editable(&current)?;
    let order = repo::update_header(&mut *tx, tenant_id, id, data).await?;
    let lignes = repo::lines(&mut *tx, tenant_id, id).await?;
    let (total, final_) = totals(lignes.iter().map(|l| l.montant_ligne), order.remise_pourcent);
    let order = repo::set_totals(&mut *tx, tenant_id, id, to_f64(total), to_f64(final_)).await?;
    tx.commit().await?;
    Ok(order)
}

/// Replace all lines of an order still in `Brouillon` or `En attente`
pub async fn replace_lines(
    pool: &SqlitePool,
    tenant_id: &str,
    id: i64,
    lignes: &[PurchaseOrderLineInput],
) -> ServiceResult<PurchaseOrderDetail> {
    let mut tx = pool.begin().await?;
    let current = found(
        repo::find_by_id(&mut *tx, tenant_id, id).await?,
        ErrorCode::PurchaseOrderNotFound,
        not_found(id),
    )?;
    ensure_editable(&current)?;
    repo::delete_lines(&mut *tx, tenant_id, id).await?;
    let order = write_lines(&mut tx, tenant_id, &current, lignes).await?;
    let lignes = repo::lines(&mut *tx, tenant_id, id).await?;
    tx.commit().await?;
    Ok(PurchaseOrderDetail { order, lignes })
}

/// Move an order along its status flow. `Livrée` books the stock entries.
pub async fn change_status(
    pool: &SqlitePool,
    tenant_id: &str,
    id: i64,
    next: PurchaseOrderStatus,
) -> ServiceResult<PurchaseOrder> {
    let mut tx = pool.begin().await?;
    let current = found(
        repo::find_by_id(&mut *tx, tenant_id, id).await?,
        ErrorCode::PurchaseOrderNotFound,
        not_found(id),
    )?;
    if !current.statut.can_transition_to(next) {
        return Err(AppError::invalid_transition(current.statut.label(), next.label()).into());
    }
    let lignes = repo::lines(&mut *tx, tenant_id, id).await?;
    if lignes.is_empty() && next != PurchaseOrderStatus::Annulee {
        return Err(AppError::with_message(
            ErrorCode::OrderEmpty,
            format!("Order {} has no lines", current.numero),
        )
        .into());
    }

    let order = repo::set_status(&mut *tx, tenant_id, id, current.statut, next)
        .await?
        .ok_or_else(|| AppError::invalid_transition(current.statut.label(), next.label()))?;

    if next == PurchaseOrderStatus::Livree {
        let date = shared::util::today();
        for line in &lignes {
            stock::record_entry(
                &mut tx,
                tenant_id,
                &StockEntryInput {
                    product_id: line.product_id.clone(),
                    date,
                    quantite: line.quantite,
                    prix_unitaire: line.prix_unitaire,
                    fournisseur: order.fournisseur.clone(),
                    reference_facture: order.numero.clone(),
                },
            )
            .await?;
        }
        tracing::info!(tenant_id, numero = %order.numero, lignes = lignes.len(), "Purchase order received into stock");
    }
    tx.commit().await?;
    Ok(order)
}

/// Delivered orders are kept: their stock entries reference the number
pub async fn delete(pool: &SqlitePool, tenant_id: &str, id: i64) -> ServiceResult<()> {
    let mut tx = pool.begin().await?;
    let current = found(
        repo::find_by_id(&mut *tx, tenant_id, id).await?,
        ErrorCode::PurchaseOrderNotFound,
        not_found(id),
    )?;
    if current.statut == PurchaseOrderStatus::Livree {
        return Err(AppError::with_message(
            ErrorCode::OrderNotEditable,
            format!("Order {} has been delivered", current.numero),
        )
        .into());
    }
    repo::delete(&mut *tx, tenant_id, id).await.map_err(|e| match e {
        RepoError::NotFound(_) => ServiceError::App(AppError::with_message(
            ErrorCode::PurchaseOrderNotFound,
            format!("{} not found", not_found(id)),
        )),
        other => other.into(),
    })?;
    tx.commit().await?;
    Ok(())
}
