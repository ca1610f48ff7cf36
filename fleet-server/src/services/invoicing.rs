//! Customer invoices (factures)
//!
//! Numbered `FG-{YYYYMM}-{seq:03}` per tenant. The discount is an absolute
//! amount taken off before VAT.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use shared::error::{AppError, ErrorCode};
use shared::models::{
    Invoice, InvoiceCreate, InvoiceDetail, InvoiceLineInput, InvoiceStatus, InvoiceUpdate,
};
use sqlx::{SqliteConnection, SqlitePool};

use super::found;
use crate::db::repository::invoice::{self as repo, InvoiceTotals, NewInvoice};
use crate::db::repository::{RepoError, product};
use crate::error::{ServiceError, ServiceResult};
use crate::utils::money::{sum, to_decimal, to_f64};
use crate::utils::validation::{
    MAX_ADDRESS_LEN, MAX_NAME_LEN, MAX_NOTE_LEN, validate_amount, validate_quantity,
    validate_required_text, validate_text_len,
};

/// VAT applied to every invoice
pub const TVA_RATE: Decimal = Decimal::from_parts(18, 0, 0, false, 2);

pub fn number_prefix(date: NaiveDate) -> String {
    format!("FG-{:04}{:02}-", date.year(), date.month())
}

/// `tva = (total − remise) × 18%`, `final = total − remise + tva`
pub fn compute_totals(
    montants: impl IntoIterator<Item = f64>,
    remise: f64,
) -> Result<InvoiceTotals, AppError> {
    let total = sum(montants);
    let remise = to_decimal(remise);
    if remise > total {
        return Err(AppError::with_message(
            ErrorCode::InvalidDiscount,
            format!("Discount {remise} exceeds the invoice total {total}"),
        ));
    }
    let base = total - remise;
    let tva = base * TVA_RATE;
    Ok(InvoiceTotals {
        montant_total: to_f64(total),
        tva: to_f64(tva),
        montant_final: to_f64(base + tva),
    })
}

fn not_found(id: i64) -> String {
    format!("Invoice {id}")
}

fn ensure_draft(invoice: &Invoice) -> ServiceResult<()> {
    if invoice.statut == InvoiceStatus::Brouillon {
        Ok(())
    } else {
        Err(AppError::with_message(
            ErrorCode::InvoiceNotEditable,
            format!("Invoice {} is {}", invoice.numero, invoice.statut.as_str()),
        )
        .into())
    }
}

async fn write_lines(
    conn: &mut SqliteConnection,
    tenant_id: &str,
    invoice: &Invoice,
    lignes: &[InvoiceLineInput],
) -> ServiceResult<Invoice> {
    let mut montants = Vec::with_capacity(lignes.len());
    for input in lignes {
        validate_quantity(input.quantite, "quantite")?;
        validate_amount(input.prix_unitaire, "prix_unitaire")?;
        let mut line = input.clone();
        if let Some(product_id) = &input.product_id {
            let p = found(
                product::find_by_id(&mut *conn, tenant_id, product_id).await?,
                ErrorCode::ProductNotFound,
                format!("Product '{product_id}'"),
            )?;
            if line.designation.trim().is_empty() {
                line.designation = p.nom;
            }
        }
        validate_required_text(&line.designation, "designation", MAX_NAME_LEN)?;
        let montant = to_f64(Decimal::from(line.quantite) * to_decimal(line.prix_unitaire));
        repo::insert_line(&mut *conn, tenant_id, invoice.id, &line, montant).await?;
        montants.push(montant);
    }
    let totals = compute_totals(montants, invoice.remise)?;
    Ok(repo::set_totals(&mut *conn, tenant_id, invoice.id, totals).await?)
}

pub async fn create(
    pool: &SqlitePool,
    tenant_id: &str,
    data: &InvoiceCreate,
) -> ServiceResult<InvoiceDetail> {
    validate_required_text(&data.client_nom, "client_nom", MAX_NAME_LEN)?;
    validate_text_len(&data.client_adresse, "client_adresse", MAX_ADDRESS_LEN)?;
    validate_text_len(&data.observations, "observations", MAX_NOTE_LEN)?;
    validate_amount(data.remise, "remise")?;

    let date_facture = data.date_facture.unwrap_or_else(shared::util::today);
    let mut tx = pool.begin().await?;
    let prefix = number_prefix(date_facture);
    let last = repo::last_number_with_prefix(&mut *tx, tenant_id, &prefix).await?;
    let seq = shared::util::next_sequence(&prefix, last.as_deref());
    let numero = format!("{prefix}{seq:03}");
    let invoice = repo::insert(
        &mut *tx,
        tenant_id,
        &NewInvoice {
            numero: &numero,
            client_nom: data.client_nom.trim(),
            client_adresse: &data.client_adresse,
            date_facture,
            date_echeance: data.date_echeance,
            remise: data.remise,
            observations: &data.observations,
        },
    )
    .await?;
    let invoice = write_lines(&mut tx, tenant_id, &invoice, &data.lignes).await?;
    let lignes = repo::lines(&mut *tx, tenant_id, invoice.id).await?;
    tx.commit().await?;

    tracing::info!(tenant_id, numero = %invoice.numero, montant_final = invoice.montant_final, "Invoice created");
    Ok(InvoiceDetail { invoice, lignes })
}

pub async fn detail(pool: &SqlitePool, tenant_id: &str, id: i64) -> ServiceResult<InvoiceDetail> {
    let invoice = found(
        repo::find_by_id(pool, tenant_id, id).await?,
        ErrorCode::InvoiceNotFound,
        not_found(id),
    )?;
    let lignes = repo::lines(pool, tenant_id, id).await?;
    Ok(InvoiceDetail { invoice, lignes })
}

pub async fn update(
    pool: &SqlitePool,
    tenant_id: &str,
    id: i64,
    data: &InvoiceUpdate,
) -> ServiceResult<Invoice> {
    if let Some(nom) = &data.client_nom {
        validate_required_text(nom, "client_nom", MAX_NAME_LEN)?;
    }
    if let Some(remise) = data.remise {
        validate_amount(remise, "remise")?;
    }
    let mut tx = pool.begin().await?;
    let current = found(
        repo::find_by_id(&mut *tx, tenant_id, id).await?,
        ErrorCode::InvoiceNotFound,
        not_found(id),
    )?;
    ensure_draft(&current)?;
    let invoice = repo::update_header(&mut *tx, tenant_id, id, data).await?;
    let lignes = repo::lines(&mut *tx, tenant_id, id).await?;
    let totals = compute_totals(lignes.iter().map(|l| l.montant), invoice.remise)?;
    let invoice = repo::set_totals(&mut *tx, tenant_id, id, totals).await?;
    tx.commit().await?;
    Ok(invoice)
}

pub async fn replace_lines(
    pool: &SqlitePool,
    tenant_id: &str,
    id: i64,
    lignes: &[InvoiceLineInput],
) -> ServiceResult<InvoiceDetail> {
    let mut tx = pool.begin().await?;
    let current = found(
        repo::find_by_id(&mut *tx, tenant_id, id).await?,
        ErrorCode::InvoiceNotFound,
        not_found(id),
    )?;
    ensure_draft(&current)?;
    repo::delete_lines(&mut *tx, tenant_id, id).await?;
    let invoice = write_lines(&mut tx, tenant_id, &current, lignes).await?;
    let lignes = repo::lines(&mut *tx, tenant_id, id).await?;
    tx.commit().await?;
    Ok(InvoiceDetail { invoice, lignes })
}

pub async fn change_status(
    pool: &SqlitePool,
    tenant_id: &str,
    id: i64,
    next: InvoiceStatus,
) -> ServiceResult<Invoice> {
    let current = found(
        repo::find_by_id(pool, tenant_id, id).await?,
        ErrorCode::InvoiceNotFound,
        not_found(id),
    )?;
    if !current.statut.can_transition_to(next) {
        return Err(AppError::invalid_transition(current.statut.as_str(), next.as_str()).into());
    }
    let invoice = repo::set_status(pool, tenant_id, id, current.statut, next)
        .await?
        .ok_or_else(|| AppError::invalid_transition(current.statut.as_str(), next.as_str()))?;
    tracing::info!(tenant_id, numero = %invoice.numero, statut = next.as_str(), "Invoice status changed");
    Ok(invoice)
}

/// Only drafts and cancelled invoices can be removed
pub async fn delete(pool: &SqlitePool, tenant_id: &str, id: i64) -> ServiceResult<()> {
    let current = found(
        repo::find_by_id(pool, tenant_id, id).await?,
        ErrorCode::InvoiceNotFound,
        not_found(id),
    )?;
    if !matches!(current.statut, InvoiceStatus::Brouillon | InvoiceStatus::Annulee) {
        return Err(AppError::with_message(
            ErrorCode::InvoiceNotEditable,
            format!("Invoice {} is {}", current.numero, current.statut.as_str()),
        )
        .into());
    }
    repo::delete(pool, tenant_id, id).await.map_err(|e| match e {
        RepoError::NotFound(_) => ServiceError::App(AppError::with_message(
            ErrorCode::InvoiceNotFound,
            format!("{} not found", not_found(id)),
        )),
        other => other.into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::testing::{TENANT, test_pool};

    fn line(designation: &str, quantite: i64, prix: f64) -> InvoiceLineInput {
        InvoiceLineInput {
            product_id: None,
            designation: designation.into(),
            quantite,
            prix_unitaire: prix,
        }
    }

    fn invoice(lignes: Vec<InvoiceLineInput>, remise: f64) -> InvoiceCreate {
        InvoiceCreate {
            client_nom: "Société Minière de Boké".into(),
            client_adresse: "Kamsar".into(),
            date_facture: NaiveDate::from_ymd_opt(2025, 9, 30),
            date_echeance: None,
            remise,
            observations: String::new(),
            lignes,
        }
    }

    #[test]
    fn vat_is_charged_after_discount() {
        let t = compute_totals([600_000.0, 400_000.0], 100_000.0).unwrap();
        assert_eq!(t.montant_total, 1_000_000.0);
        assert_eq!(t.tva, 162_000.0);
        assert_eq!(t.montant_final, 1_062_000.0);

        let err = compute_totals([100.0], 150.0).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidDiscount);
    }

    #[tokio::test]
    async fn numbering_and_totals() {
        let pool = test_pool().await;
        let a = create(&pool, TENANT, &invoice(vec![line("Location 4x4", 10, 150_000.0)], 0.0))
            .await
            .unwrap();
        let b = create(&pool, TENANT, &invoice(vec![], 0.0)).await.unwrap();
        assert_eq!(a.invoice.numero, "FG-202509-001");
        assert_eq!(b.invoice.numero, "FG-202509-002");
        assert_eq!(a.invoice.montant_total, 1_500_000.0);
        assert_eq!(a.invoice.tva, 270_000.0);
        assert_eq!(a.invoice.montant_final, 1_770_000.0);
        assert_eq!(a.lignes[0].montant, 1_500_000.0);
    }

    #[tokio::test]
    async fn numbering_continues_after_a_deletion() {
        let pool = test_pool().await;
        let a = create(&pool, TENANT, &invoice(vec![], 0.0)).await.unwrap();
        create(&pool, TENANT, &invoice(vec![], 0.0)).await.unwrap();
        delete(&pool, TENANT, a.invoice.id).await.unwrap();

        let c = create(&pool, TENANT, &invoice(vec![], 0.0)).await.unwrap();
        assert_eq!(c.invoice.numero, "FG-202509-003");
    }

    #[tokio::test]
    async fn lines_are_frozen_once_validated() {
        let pool = test_pool().await;
        let d = create(&pool, TENANT, &invoice(vec![line("Transport", 1, 500_000.0)], 0.0))
            .await
            .unwrap();
        let id = d.invoice.id;

        let replaced = replace_lines(&pool, TENANT, id, &[line("Transport", 2, 500_000.0)])
            .await
            .unwrap();
        assert_eq!(replaced.invoice.montant_total, 1_000_000.0);
        assert_eq!(replaced.lignes.len(), 1);

        change_status(&pool, TENANT, id, InvoiceStatus::Validee).await.unwrap();
        let err = replace_lines(&pool, TENANT, id, &[]).await.unwrap_err();
        assert!(matches!(err, ServiceError::App(ref a) if a.code == ErrorCode::InvoiceNotEditable));
        let err = delete(&pool, TENANT, id).await.unwrap_err();
        assert!(matches!(err, ServiceError::App(ref a) if a.code == ErrorCode::InvoiceNotEditable));

        change_status(&pool, TENANT, id, InvoiceStatus::Payee).await.unwrap();
        let err = change_status(&pool, TENANT, id, InvoiceStatus::Annulee).await.unwrap_err();
        assert!(matches!(err, ServiceError::App(ref a) if a.code == ErrorCode::InvalidStatusTransition));
    }

    #[tokio::test]
    async fn unknown_product_on_line_is_rejected() {
        let pool = test_pool().await;
        let mut l = line("", 1, 1_000.0);
        l.product_id = Some("PRD999".into());
        let err = create(&pool, TENANT, &invoice(vec![l], 0.0)).await.unwrap_err();
        assert!(matches!(err, ServiceError::App(ref a) if a.code == ErrorCode::ProductNotFound));
    }
}
