use std::fmt::Display;

use chrono::{DateTime, Duration, Months, Utc};
use serde::{Deserialize, Serialize};

/// How often a subscription ships. The frequency alone decides the
/// subscriber discount and the delivery cadence.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum DeliveryFrequency {
    #[serde(rename = "weekly")]
    Weekly,
    #[serde(rename = "bi-weekly")]
    BiWeekly,
    #[serde(rename = "monthly")]
    Monthly,
}

impl DeliveryFrequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryFrequency::Weekly => "weekly",
            DeliveryFrequency::BiWeekly => "bi-weekly",
            DeliveryFrequency::Monthly => "monthly",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "weekly" => Some(DeliveryFrequency::Weekly),
            "bi-weekly" => Some(DeliveryFrequency::BiWeekly),
            "monthly" => Some(DeliveryFrequency::Monthly),
            _ => None,
        }
    }

    /// Subscriber discount in whole percent.
    pub fn discount_percent(&self) -> i32 {
        match self {
            DeliveryFrequency::Weekly => 15,
            DeliveryFrequency::BiWeekly => 12,
            DeliveryFrequency::Monthly => 10,
        }
    }

    /// Next delivery one interval after `from`. Monthly steps are calendar
    /// months, clamped to the last day of shorter months.
    pub fn next_delivery_from(&self, from: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            DeliveryFrequency::Weekly => from.checked_add_signed(Duration::days(7)),
            DeliveryFrequency::BiWeekly => from.checked_add_signed(Duration::days(14)),
            DeliveryFrequency::Monthly => from.checked_add_months(Months::new(1)),
        }
    }
}

impl Display for DeliveryFrequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn discount_follows_frequency_table() {
        assert_eq!(DeliveryFrequency::Weekly.discount_percent(), 15);
        assert_eq!(DeliveryFrequency::BiWeekly.discount_percent(), 12);
        assert_eq!(DeliveryFrequency::Monthly.discount_percent(), 10);
    }

    #[test]
    fn parses_only_known_frequencies() {
        for frequency in [
            DeliveryFrequency::Weekly,
            DeliveryFrequency::BiWeekly,
            DeliveryFrequency::Monthly,
        ] {
            assert_eq!(DeliveryFrequency::from_str(frequency.as_str()), Some(frequency));
        }

        for raw in ["daily", "Weekly", "biweekly", ""] {
            assert_eq!(DeliveryFrequency::from_str(raw), None);
        }
    }

    #[test]
    fn fixed_intervals_add_days() {
        let from = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();

        assert_eq!(
            DeliveryFrequency::Weekly.next_delivery_from(from),
            Some(Utc.with_ymd_and_hms(2024, 3, 8, 9, 0, 0).unwrap())
        );
        assert_eq!(
            DeliveryFrequency::BiWeekly.next_delivery_from(from),
            Some(Utc.with_ymd_and_hms(2024, 3, 15, 9, 0, 0).unwrap())
        );
    }

    #[test]
    fn monthly_interval_is_a_calendar_month() {
        let from = Utc.with_ymd_and_hms(2024, 4, 10, 12, 30, 0).unwrap();
        assert_eq!(
            DeliveryFrequency::Monthly.next_delivery_from(from),
            Some(Utc.with_ymd_and_hms(2024, 5, 10, 12, 30, 0).unwrap())
        );

        let end_of_january = Utc.with_ymd_and_hms(2024, 1, 31, 0, 0, 0).unwrap();
        assert_eq!(
            DeliveryFrequency::Monthly.next_delivery_from(end_of_january),
            Some(Utc.with_ymd_and_hms(2024, 2, 29, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn serializes_with_wire_names() {
        let json = serde_json::to_string(&DeliveryFrequency::BiWeekly).unwrap();
        assert_eq!(json, "\"bi-weekly\"");
    }
}
