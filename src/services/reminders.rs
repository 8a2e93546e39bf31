// src/services/reminders.rs
//
// Lembretes derivados de `nextActionDate` sobre a lista em memória.
// Atrasado: data <= hoje. Próximos: hoje < data <= hoje + 7.
// Oportunidades ganhas ou perdidas nunca geram lembrete.

use chrono::{Days, NaiveDate};

use crate::models::{dashboard::Reminders, opportunity::OpportunityView};

pub const UPCOMING_WINDOW_DAYS: u64 = 7;

/// Lê a parte de data (YYYY-MM-DD) do texto, sem conversão de fuso.
/// Aceita "2026-10-20" e "2026-10-20T15:00:00Z".
pub fn parse_action_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    let date_part = value.get(..10)?;
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

pub fn derive_reminders(items: &[OpportunityView], today: NaiveDate) -> Reminders {
    let horizon = today
        .checked_add_days(Days::new(UPCOMING_WINDOW_DAYS))
        .unwrap_or(NaiveDate::MAX);

    let mut overdue: Vec<(NaiveDate, &OpportunityView)> = Vec::new();
    let mut upcoming: Vec<(NaiveDate, &OpportunityView)> = Vec::new();

    for item in items {
        if item.opportunity.stage.is_closed() {
            continue;
        }
        let Some(date) = item
            .opportunity
            .next_action_date
            .as_deref()
            .and_then(parse_action_date)
        else {
            continue;
        };

        if date <= today {
            overdue.push((date, item));
        } else if date <= horizon {
            upcoming.push((date, item));
        }
    }

    // sort estável: empates mantêm a ordem da lista de origem
    overdue.sort_by_key(|(date, _)| *date);
    upcoming.sort_by_key(|(date, _)| *date);

    Reminders {
        overdue: overdue.into_iter().map(|(_, item)| item.clone()).collect(),
        upcoming: upcoming.into_iter().map(|(_, item)| item.clone()).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::opportunity::{Opportunity, Stage};
    use chrono::Utc;
    use uuid::Uuid;

    fn item(date: Option<&str>, stage: Stage) -> OpportunityView {
        let mut opportunity = Opportunity::new(Uuid::new_v4(), Utc::now());
        opportunity.next_action_date = date.map(str::to_string);
        opportunity.stage = stage;
        OpportunityView {
            opportunity,
            customer_name: "Cliente".into(),
            vehicle_name: None,
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    #[test]
    fn today_is_overdue_not_upcoming() {
        let reminders = derive_reminders(&[item(Some("2026-10-16"), Stage::Contacted)], today());
        assert_eq!(reminders.overdue.len(), 1);
        assert!(reminders.upcoming.is_empty());
    }

    #[test]
    fn upcoming_window_ends_at_seven_days_inclusive() {
        let items = [
            item(Some("2026-10-17"), Stage::New),
            item(Some("2026-10-23"), Stage::New),
            item(Some("2026-10-24"), Stage::New),
        ];
        let reminders = derive_reminders(&items, today());
        let dates: Vec<&str> = reminders
            .upcoming
            .iter()
            .filter_map(|v| v.opportunity.next_action_date.as_deref())
            .collect();
        assert_eq!(dates, vec!["2026-10-17", "2026-10-23"]);
    }

    #[test]
    fn closed_missing_and_unparseable_dates_are_skipped() {
        let items = [
            item(Some("2026-10-01"), Stage::Won),
            item(Some("2026-10-01"), Stage::Lost),
            item(None, Stage::New),
            item(Some("amanhã"), Stage::New),
            item(Some(""), Stage::New),
        ];
        let reminders = derive_reminders(&items, today());
        assert!(reminders.overdue.is_empty());
        assert!(reminders.upcoming.is_empty());
    }

    #[test]
    fn overdue_is_sorted_ascending() {
        let items = [
            item(Some("2026-10-15"), Stage::Negotiation),
            item(Some("2026-09-30T10:00:00Z"), Stage::New),
            item(Some("2026-10-02"), Stage::Contacted),
        ];
        let reminders = derive_reminders(&items, today());
        let dates: Vec<NaiveDate> = reminders
            .overdue
            .iter()
            .filter_map(|v| v.opportunity.next_action_date.as_deref().and_then(parse_action_date))
            .collect();
        assert_eq!(
            dates,
            vec![
                NaiveDate::from_ymd_opt(2026, 9, 30).unwrap(),
                NaiveDate::from_ymd_opt(2026, 10, 2).unwrap(),
                NaiveDate::from_ymd_opt(2026, 10, 15).unwrap(),
            ]
        );
    }
}
