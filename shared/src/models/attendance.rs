//! Attendance Model (pointage)

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Daily attendance status code
///
/// Half-day and full-day presence on working days, the same on Sundays,
/// absence, sick leave (unpaid / paid) and rest day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
pub enum AttendanceStatus {
    #[serde(rename = "P(Am)")]
    #[cfg_attr(feature = "db", sqlx(rename = "P(Am)"))]
    PresentAm,
    #[serde(rename = "P(Pm)")]
    #[cfg_attr(feature = "db", sqlx(rename = "P(Pm)"))]
    PresentPm,
    #[default]
    #[serde(rename = "P(Am_&_Pm)")]
    #[cfg_attr(feature = "db", sqlx(rename = "P(Am_&_Pm)"))]
    PresentFull,
    #[serde(rename = "P(dim_Am)")]
    #[cfg_attr(feature = "db", sqlx(rename = "P(dim_Am)"))]
    SundayAm,
    #[serde(rename = "P(dim_Pm)")]
    #[cfg_attr(feature = "db", sqlx(rename = "P(dim_Pm)"))]
    SundayPm,
    #[serde(rename = "P(dim_Am_&_Pm)")]
    #[cfg_attr(feature = "db", sqlx(rename = "P(dim_Am_&_Pm)"))]
    SundayFull,
    #[serde(rename = "A")]
    #[cfg_attr(feature = "db", sqlx(rename = "A"))]
    Absent,
    #[serde(rename = "M")]
    #[cfg_attr(feature = "db", sqlx(rename = "M"))]
    Sick,
    #[serde(rename = "M(Payer)")]
    #[cfg_attr(feature = "db", sqlx(rename = "M(Payer)"))]
    SickPaid,
    #[serde(rename = "OFF")]
    #[cfg_attr(feature = "db", sqlx(rename = "OFF"))]
    Off,
}

impl AttendanceStatus {
    pub const ALL: [AttendanceStatus; 10] = [
        AttendanceStatus::PresentAm,
        AttendanceStatus::PresentPm,
        AttendanceStatus::PresentFull,
        AttendanceStatus::SundayAm,
        AttendanceStatus::SundayPm,
        AttendanceStatus::SundayFull,
        AttendanceStatus::Absent,
        AttendanceStatus::Sick,
        AttendanceStatus::SickPaid,
        AttendanceStatus::Off,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            AttendanceStatus::PresentAm => "P(Am)",
            AttendanceStatus::PresentPm => "P(Pm)",
            AttendanceStatus::PresentFull => "P(Am_&_Pm)",
            AttendanceStatus::SundayAm => "P(dim_Am)",
            AttendanceStatus::SundayPm => "P(dim_Pm)",
            AttendanceStatus::SundayFull => "P(dim_Am_&_Pm)",
            AttendanceStatus::Absent => "A",
            AttendanceStatus::Sick => "M",
            AttendanceStatus::SickPaid => "M(Payer)",
            AttendanceStatus::Off => "OFF",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.code() == code)
    }

    /// Working-day presence (any half or full day)
    pub fn is_weekday_presence(&self) -> bool {
        matches!(
            self,
            AttendanceStatus::PresentAm | AttendanceStatus::PresentPm | AttendanceStatus::PresentFull
        )
    }

    /// Sunday presence (any half or full day)
    pub fn is_sunday_presence(&self) -> bool {
        matches!(
            self,
            AttendanceStatus::SundayAm | AttendanceStatus::SundayPm | AttendanceStatus::SundayFull
        )
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Attendance {
    pub id: i64,
    pub employee_id: i64,
    pub date: NaiveDate,
    pub statut: AttendanceStatus,
    pub created_at: i64,
}

/// Record (upsert) one day
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceInput {
    pub employee_id: i64,
    pub date: NaiveDate,
    #[serde(default)]
    pub statut: AttendanceStatus,
}

/// One cell of a month grid
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceDay {
    pub date: NaiveDate,
    pub statut: AttendanceStatus,
}

/// Record a whole grid for one employee
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkAttendanceInput {
    pub employee_id: i64,
    pub days: Vec<AttendanceDay>,
}

/// Monthly counters derived from attendance rows
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceStats {
    pub jours_mois: i64,
    pub jours_presence: i64,
    pub dimanches: i64,
    pub absences: i64,
    pub maladies: i64,
    pub maladies_payees: i64,
    pub jours_repos: i64,
    /// Count per status code
    pub detail: BTreeMap<String, i64>,
}

impl AttendanceStats {
    /// Tally a set of statuses for a month of `jours_mois` days
    pub fn tally<I>(jours_mois: i64, statuses: I) -> Self
    where
        I: IntoIterator<Item = AttendanceStatus>,
    {
        let mut stats = AttendanceStats {
            jours_mois,
            ..Default::default()
        };
        for status in statuses {
            *stats.detail.entry(status.code().to_string()).or_insert(0) += 1;
            match status {
                s if s.is_weekday_presence() => stats.jours_presence += 1,
                s if s.is_sunday_presence() => stats.dimanches += 1,
                AttendanceStatus::Absent => stats.absences += 1,
                AttendanceStatus::Sick => stats.maladies += 1,
                AttendanceStatus::SickPaid => stats.maladies_payees += 1,
                AttendanceStatus::Off => stats.jours_repos += 1,
                _ => {}
            }
        }
        stats
    }

    pub fn count_of(&self, status: AttendanceStatus) -> i64 {
        self.detail.get(status.code()).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_code_parses_back() {
        for status in AttendanceStatus::ALL {
            assert_eq!(AttendanceStatus::from_code(status.code()), Some(status));
        }
        assert_eq!(AttendanceStatus::from_code("P"), None);
        assert_eq!(AttendanceStatus::from_code("p(am)"), None);
    }

    #[test]
    fn default_is_full_day() {
        assert_eq!(AttendanceStatus::default().code(), "P(Am_&_Pm)");
    }

    #[test]
    fn tally_counts_typed_vocabulary() {
        use AttendanceStatus::*;
        let stats = AttendanceStats::tally(
            31,
            [
                PresentAm, PresentPm, PresentFull, PresentFull, SundayAm, SundayFull, Absent,
                Sick, SickPaid, Off, Off,
            ],
        );
        assert_eq!(stats.jours_mois, 31);
        assert_eq!(stats.jours_presence, 4);
        assert_eq!(stats.dimanches, 2);
        assert_eq!(stats.absences, 1);
        assert_eq!(stats.maladies, 1);
        assert_eq!(stats.maladies_payees, 1);
        assert_eq!(stats.jours_repos, 2);
        assert_eq!(stats.count_of(PresentFull), 2);
        assert_eq!(stats.count_of(SundayPm), 0);
    }

    #[test]
    fn half_day_counts_as_present() {
        let stats = AttendanceStats::tally(30, [AttendanceStatus::PresentAm]);
        assert_eq!(stats.jours_presence, 1);
    }

    #[test]
    fn unknown_status_is_rejected_by_serde() {
        let res: Result<AttendanceInput, _> =
            serde_json::from_str(r#"{"employee_id":1,"date":"2025-03-03","statut":"P"}"#);
        assert!(res.is_err());
    }
}
