//! Statutory payroll charges (Guinea): CNSS, RTS and VF
//!
//! All arithmetic runs on `Decimal`; results are rounded half-up to 0.01.

use rust_decimal::Decimal;
use rust_decimal::prelude::*;
use shared::models::{Charges, ChargesRequest, Employee};

use crate::utils::money::{percent_of, round2, to_decimal, to_f64};

/// Default employee CNSS rate (%)
pub const CNSS_SALARIE: Decimal = Decimal::from_parts(5, 0, 0, false, 0);
/// Default employer CNSS rate (%)
pub const CNSS_EMPLOYEUR: Decimal = Decimal::from_parts(18, 0, 0, false, 0);
/// Default VF rate (%), also the lower clamp of a custom rate
pub const VF_MIN: Decimal = Decimal::from_parts(7, 0, 0, false, 0);
/// Upper clamp of a custom VF rate (%)
pub const VF_MAX: Decimal = Decimal::from_parts(10, 0, 0, false, 0);

/// RTS bracket: `(lower, upper, rate %)`, `upper = None` for the open bracket
const RTS_BRACKETS: [(i64, Option<i64>, i64); 6] = [
    (0, Some(1_000_000), 0),
    (1_000_001, Some(1_500_000), 10),
    (1_500_001, Some(2_000_000), 15),
    (2_000_001, Some(4_000_000), 20),
    (4_000_001, Some(6_000_000), 25),
    (6_000_001, None, 35),
];

/// Custom rate when strictly positive, default otherwise
fn rate_or_default(custom: f64, default: Decimal) -> Decimal {
    let custom = to_decimal(custom);
    if custom > Decimal::ZERO { custom } else { default }
}

/// VF rate: 7% by default, a custom rate is clamped to [7, 10]
pub fn vf_rate(custom: f64) -> Decimal {
    let custom = to_decimal(custom);
    if custom > Decimal::ZERO {
        custom.clamp(VF_MIN, VF_MAX)
    } else {
        VF_MIN
    }
}

/// Progressive RTS on a taxable base
///
/// Each bracket whose lower bound is below the base contributes
/// `min(base, upper) − lower + 1` at its rate.
pub fn rts(base: Decimal) -> Decimal {
    let mut tax = Decimal::ZERO;
    for (lower, upper, rate) in RTS_BRACKETS {
        let lower = Decimal::from(lower);
        if lower >= base {
            break;
        }
        let top = upper.map_or(base, |u| base.min(Decimal::from(u)));
        let portion = top - lower + Decimal::ONE;
        tax += percent_of(portion, Decimal::from(rate));
    }
    round2(tax)
}

/// Compute every charge of a gross salary
pub fn compute_charges(req: &ChargesRequest) -> Charges {
    let brut = round2(to_decimal(req.salaire_brut).max(Decimal::ZERO));
    let taux_cnss_salarie = rate_or_default(req.taux_cnss_salarie, CNSS_SALARIE);
    let taux_cnss_employeur = rate_or_default(req.taux_cnss_employeur, CNSS_EMPLOYEUR);
    let taux_vf = vf_rate(req.taux_vf);

    let (cnss_salarie, cnss_employeur) = if req.appliquer_cnss {
        (
            round2(percent_of(brut, taux_cnss_salarie)),
            round2(percent_of(brut, taux_cnss_employeur)),
        )
    } else {
        (Decimal::ZERO, Decimal::ZERO)
    };

    let rts = if req.appliquer_rts {
        rts((brut - cnss_salarie).max(Decimal::ZERO))
    } else {
        Decimal::ZERO
    };

    let vf = if req.appliquer_vf {
        round2(percent_of(brut, taux_vf))
    } else {
        Decimal::ZERO
    };

    let total_deductions = cnss_salarie + rts + vf;
    Charges {
        salaire_brut: to_f64(brut),
        cnss_salarie: to_f64(cnss_salarie),
        cnss_employeur: to_f64(cnss_employeur),
        rts: to_f64(rts),
        vf: to_f64(vf),
        total_deductions: to_f64(total_deductions),
        salaire_net: to_f64(brut - total_deductions),
        cout_employeur: to_f64(brut + cnss_employeur),
        taux_cnss_salarie: taux_cnss_salarie.to_f64().unwrap_or_default(),
        taux_cnss_employeur: taux_cnss_employeur.to_f64().unwrap_or_default(),
        taux_vf: taux_vf.to_f64().unwrap_or_default(),
    }
}

/// Charges request built from an employee's flags and custom rates
pub fn request_for(employee: &Employee, salaire_brut: f64) -> ChargesRequest {
    ChargesRequest {
        salaire_brut,
        taux_cnss_salarie: employee.taux_cnss_salarie_custom,
        taux_cnss_employeur: employee.taux_cnss_employeur_custom,
        taux_vf: employee.taux_vf_custom,
        appliquer_cnss: employee.appliquer_cnss,
        appliquer_rts: employee.appliquer_rts,
        appliquer_vf: employee.appliquer_vf,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn req(brut: f64) -> ChargesRequest {
        ChargesRequest {
            salaire_brut: brut,
            taux_cnss_salarie: 0.0,
            taux_cnss_employeur: 0.0,
            taux_vf: 0.0,
            appliquer_cnss: true,
            appliquer_rts: true,
            appliquer_vf: false,
        }
    }

    #[test]
    fn first_bracket_is_tax_free() {
        assert_eq!(rts(Decimal::from(1_000_000)), Decimal::ZERO);
        assert_eq!(rts(Decimal::from(1_000_001)), Decimal::ZERO);
        assert_eq!(rts(Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn rts_follows_brackets() {
        // 500 000 × 10% + 500 000 × 15% + 500 000 × 20%
        assert_eq!(rts(Decimal::from(2_500_000)), Decimal::from(225_000));
        // 10% on the first franc above the threshold
        assert_eq!(rts(Decimal::from(1_000_002)), Decimal::new(20, 2));
        // open bracket
        let expected = 50_000 + 75_000 + 400_000 + 500_000 + 350_000;
        assert_eq!(rts(Decimal::from(7_000_000)), Decimal::from(expected));
    }

    #[test]
    fn default_rates_on_one_million() {
        let c = compute_charges(&req(1_000_000.0));
        assert_eq!(c.cnss_salarie, 50_000.0);
        assert_eq!(c.cnss_employeur, 180_000.0);
        assert_eq!(c.rts, 0.0);
        assert_eq!(c.vf, 0.0);
        assert_eq!(c.salaire_net, 950_000.0);
        assert_eq!(c.cout_employeur, 1_180_000.0);
        assert_eq!(c.taux_cnss_salarie, 5.0);
    }

    #[test]
    fn rts_base_excludes_employee_cnss() {
        let c = compute_charges(&req(2_500_000.0));
        assert_eq!(c.cnss_salarie, 125_000.0);
        // base 2 375 000 → 50 000 + 75 000 + 375 000 × 20%
        assert_eq!(c.rts, 200_000.0);
        assert_eq!(c.total_deductions, 325_000.0);
        assert_eq!(c.salaire_net, 2_175_000.0);
    }

    #[test]
    fn vf_rate_is_clamped() {
        assert_eq!(vf_rate(0.0), Decimal::from(7));
        assert_eq!(vf_rate(5.0), Decimal::from(7));
        assert_eq!(vf_rate(8.5), Decimal::new(85, 1));
        assert_eq!(vf_rate(12.0), Decimal::from(10));

        let c = compute_charges(&ChargesRequest {
            appliquer_vf: true,
            taux_vf: 15.0,
            ..req(1_000_000.0)
        });
        assert_eq!(c.vf, 100_000.0);
        assert_eq!(c.taux_vf, 10.0);
    }

    #[test]
    fn flags_disable_each_charge() {
        let c = compute_charges(&ChargesRequest {
            appliquer_cnss: false,
            appliquer_rts: false,
            appliquer_vf: false,
            ..req(3_000_000.0)
        });
        assert_eq!(c.cnss_salarie, 0.0);
        assert_eq!(c.cnss_employeur, 0.0);
        assert_eq!(c.rts, 0.0);
        assert_eq!(c.vf, 0.0);
        assert_eq!(c.salaire_net, 3_000_000.0);
    }

    #[test]
    fn custom_cnss_rates_apply_when_positive() {
        let c = compute_charges(&ChargesRequest {
            taux_cnss_salarie: 4.0,
            taux_cnss_employeur: 0.0,
            ..req(1_000_000.0)
        });
        assert_eq!(c.cnss_salarie, 40_000.0);
        assert_eq!(c.cnss_employeur, 180_000.0);
    }

    #[test]
    fn cnss_is_uncapped() {
        let c = compute_charges(&req(20_000_000.0));
        assert_eq!(c.cnss_salarie, 1_000_000.0);
        assert_eq!(c.cnss_employeur, 3_600_000.0);
    }
}
