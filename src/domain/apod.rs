//! Astronomy Picture of the Day records and request validation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::error::{FieldError, ValidationError};

/// The first published APOD.
pub const FIRST_APOD_DATE: NaiveDate = match NaiveDate::from_ymd_opt(1995, 6, 16) {
    Some(date) => date,
    None => panic!("invalid first APOD date"),
};

/// Longest accepted `start_date..end_date` span, in days.
pub const MAX_RANGE_DAYS: i64 = 365;

/// Largest accepted random `count`.
pub const MAX_COUNT: u32 = 100;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// One APOD entry as served by NASA.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Apod {
    pub title: String,
    pub date: String,
    pub explanation: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hdurl: Option<String>,
    pub media_type: String,
    #[serde(default)]
    pub service_version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub copyright: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
}

impl Apod {
    #[must_use]
    pub fn is_video(&self) -> bool {
        self.media_type == "video"
    }

    /// Image URLs to try in order: `hdurl`, `url` (images only), then
    /// `thumbnail_url`. Empty when nothing displayable exists.
    #[must_use]
    pub fn image_candidates(&self) -> Vec<&str> {
        let mut out = Vec::with_capacity(3);
        if let Some(hd) = self.hdurl.as_deref().filter(|u| !u.is_empty()) {
            out.push(hd);
        }
        if !self.is_video() && !self.url.is_empty() && !out.contains(&self.url.as_str()) {
            out.push(self.url.as_str());
        }
        if let Some(thumb) = self.thumbnail_url.as_deref().filter(|u| !u.is_empty()) {
            if !out.contains(&thumb) {
                out.push(thumb);
            }
        }
        out
    }

    /// Parsed `date`, if well-formed.
    #[must_use]
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.date, DATE_FORMAT).ok()
    }
}

/// Raw APOD query as received from a caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApodParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbs: Option<bool>,
}

/// What the APOD service is being asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApodSelection {
    Today,
    Date(NaiveDate),
    Range { start: NaiveDate, end: NaiveDate },
    Random { count: u32 },
}

/// A validated APOD request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApodRequest {
    pub selection: ApodSelection,
    pub thumbs: bool,
}

impl ApodRequest {
    #[must_use]
    pub fn today() -> Self {
        Self {
            selection: ApodSelection::Today,
            thumbs: true,
        }
    }

    #[must_use]
    pub fn date(date: NaiveDate) -> Self {
        Self {
            selection: ApodSelection::Date(date),
            thumbs: true,
        }
    }

    #[must_use]
    pub fn range(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            selection: ApodSelection::Range { start, end },
            thumbs: true,
        }
    }

    #[must_use]
    pub fn random(count: u32) -> Self {
        Self {
            selection: ApodSelection::Random { count },
            thumbs: true,
        }
    }

    /// Whether the upstream answers with a list rather than one object.
    #[must_use]
    pub fn expects_list(&self) -> bool {
        matches!(
            self.selection,
            ApodSelection::Range { .. } | ApodSelection::Random { .. }
        )
    }

    /// Query pairs for the upstream call (without credentials).
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::with_capacity(3);
        match self.selection {
            ApodSelection::Today => {}
            ApodSelection::Date(date) => pairs.push(("date", format_date(date))),
            ApodSelection::Range { start, end } => {
                pairs.push(("start_date", format_date(start)));
                pairs.push(("end_date", format_date(end)));
            }
            ApodSelection::Random { count } => pairs.push(("count", count.to_string())),
        }
        pairs.push(("thumbs", self.thumbs.to_string()));
        pairs
    }

    /// Raw parameters that validate back to this request.
    #[must_use]
    pub fn to_params(&self) -> ApodParams {
        let mut params = ApodParams {
            thumbs: Some(self.thumbs),
            ..ApodParams::default()
        };
        match self.selection {
            ApodSelection::Today => {}
            ApodSelection::Date(date) => params.date = Some(format_date(date)),
            ApodSelection::Range { start, end } => {
                params.start_date = Some(format_date(start));
                params.end_date = Some(format_date(end));
            }
            ApodSelection::Random { count } => params.count = Some(count.to_string()),
        }
        params
    }
}

#[must_use]
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Title-cased field label used in messages (`start_date` → `Start Date`).
fn label(field: &str) -> String {
    field
        .split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn parse_field(
    field: &'static str,
    raw: Option<&str>,
    today: NaiveDate,
    errors: &mut Vec<FieldError>,
) -> Option<NaiveDate> {
    let raw = raw.map(str::trim).filter(|s| !s.is_empty())?;

    let well_formed = raw.len() == 10
        && raw
            .bytes()
            .enumerate()
            .all(|(i, b)| if i == 4 || i == 7 { b == b'-' } else { b.is_ascii_digit() });
    let parsed = if well_formed {
        NaiveDate::parse_from_str(raw, DATE_FORMAT).ok()
    } else {
        None
    };

    let Some(date) = parsed else {
        errors.push(FieldError::value(
            field,
            format!("Invalid {field} format. Expected YYYY-MM-DD, got: {raw}"),
        ));
        return None;
    };

    if date < FIRST_APOD_DATE {
        errors.push(FieldError::value(
            field,
            format!(
                "{} must be on or after {} (first APOD). Got: {raw}",
                label(field),
                format_date(FIRST_APOD_DATE)
            ),
        ));
        return None;
    }
    if date > today {
        errors.push(FieldError::value(
            field,
            format!("{} cannot be in the future. Got: {raw}", label(field)),
        ));
        return None;
    }
    Some(date)
}

impl ApodParams {
    /// Validate against `today`, collecting every field problem.
    pub fn validate(&self, today: NaiveDate) -> Result<ApodRequest, ValidationError> {
        let mut errors = Vec::new();

        let has = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        let has_date = has(&self.date);
        let has_start = has(&self.start_date);
        let has_end = has(&self.end_date);
        let has_count = has(&self.count);

        let date = parse_field("date", self.date.as_deref(), today, &mut errors);
        let start = parse_field("start_date", self.start_date.as_deref(), today, &mut errors);
        let end = parse_field("end_date", self.end_date.as_deref(), today, &mut errors);

        let count = match self.count.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            None => None,
            Some(raw) => match raw.parse::<i64>() {
                Ok(n) if (1..=i64::from(MAX_COUNT)).contains(&n) => u32::try_from(n).ok(),
                Ok(_) => {
                    errors.push(FieldError::value(
                        "count",
                        format!("Count must be between 1 and {MAX_COUNT}. Got: {raw}"),
                    ));
                    None
                }
                Err(_) => {
                    errors.push(FieldError::value(
                        "count",
                        format!("Count must be an integer. Got: {raw}"),
                    ));
                    None
                }
            },
        };

        if has_date && (has_start || has_end) {
            errors.push(FieldError::conflict(
                "date",
                r#"Cannot use "date" parameter with "start_date" or "end_date""#,
            ));
        }
        if has_count && (has_date || has_start || has_end) {
            errors.push(FieldError::conflict(
                "count",
                r#"Cannot use "count" parameter with date parameters"#,
            ));
        }
        if has_start != has_end {
            let missing = if has_start { "end_date" } else { "start_date" };
            errors.push(FieldError::missing(
                missing,
                r#"Both "start_date" and "end_date" must be provided for date range queries"#,
            ));
        }
        if let (Some(start), Some(end)) = (start, end) {
            if start >= end {
                errors.push(FieldError::value(
                    "start_date",
                    format!(
                        "Start date ({}) must be before end date ({})",
                        format_date(start),
                        format_date(end)
                    ),
                ));
            } else {
                let days = (end - start).num_days();
                if days > MAX_RANGE_DAYS {
                    errors.push(FieldError::value(
                        "end_date",
                        format!(
                            "Date range cannot exceed {MAX_RANGE_DAYS} days. Current range: {days} days"
                        ),
                    ));
                }
            }
        }

        if !errors.is_empty() {
            return Err(ValidationError::new(errors));
        }

        let selection = match (date, start, end, count) {
            (Some(date), None, None, None) => ApodSelection::Date(date),
            (None, Some(start), Some(end), None) => ApodSelection::Range { start, end },
            (None, None, None, Some(count)) => ApodSelection::Random { count },
            _ => ApodSelection::Today,
        };

        Ok(ApodRequest {
            selection,
            thumbs: self.thumbs.unwrap_or(true),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    fn params(f: impl FnOnce(&mut ApodParams)) -> ApodParams {
        let mut p = ApodParams::default();
        f(&mut p);
        p
    }

    // =========================================================================
    // Validation
    // =========================================================================

    #[test]
    fn empty_params_mean_today_with_thumbs() {
        let req = ApodParams::default().validate(today()).unwrap();
        assert_eq!(req, ApodRequest::today());
        assert!(req.thumbs);
        assert!(!req.expects_list());
    }

    #[test]
    fn single_date() {
        let req = params(|p| p.date = Some("2024-01-15".into()))
            .validate(today())
            .unwrap();
        assert_eq!(
            req.selection,
            ApodSelection::Date(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap())
        );
    }

    #[test]
    fn first_apod_date_is_accepted_and_day_before_rejected() {
        assert!(params(|p| p.date = Some("1995-06-16".into()))
            .validate(today())
            .is_ok());

        let err = params(|p| p.date = Some("1995-06-15".into()))
            .validate(today())
            .unwrap_err();
        assert!(err.mentions("date"));
        assert!(err.details[0].message.contains("on or after 1995-06-16"));
    }

    #[test]
    fn future_date_rejected() {
        let err = params(|p| p.date = Some("2024-06-02".into()))
            .validate(today())
            .unwrap_err();
        assert!(err.details[0].message.contains("cannot be in the future"));
    }

    #[test]
    fn malformed_dates_rejected() {
        for raw in ["2024-1-05", "2024/01/05", "20240105", "2024-02-30", "yesterday"] {
            let err = params(|p| p.date = Some(raw.into()))
                .validate(today())
                .unwrap_err();
            assert!(err.details[0].message.contains("Expected YYYY-MM-DD"), "{raw}");
        }
    }

    #[test]
    fn date_conflicts_with_range() {
        let err = params(|p| {
            p.date = Some("2024-01-01".into());
            p.start_date = Some("2024-01-02".into());
            p.end_date = Some("2024-01-05".into());
        })
        .validate(today())
        .unwrap_err();
        assert!(err.details.iter().any(|d| d.kind == "conflict"));
    }

    #[test]
    fn count_conflicts_with_dates() {
        let err = params(|p| {
            p.date = Some("2024-01-01".into());
            p.count = Some("5".into());
        })
        .validate(today())
        .unwrap_err();
        assert!(err.mentions("count"));
    }

    #[test]
    fn range_needs_both_ends() {
        let err = params(|p| p.start_date = Some("2024-01-01".into()))
            .validate(today())
            .unwrap_err();
        assert!(err.mentions("end_date"));
        assert_eq!(err.details[0].kind, "missing");
    }

    #[test]
    fn range_order_and_length() {
        let err = params(|p| {
            p.start_date = Some("2024-01-05".into());
            p.end_date = Some("2024-01-05".into());
        })
        .validate(today())
        .unwrap_err();
        assert!(err.details[0].message.contains("must be before"));

        let err = params(|p| {
            p.start_date = Some("2022-01-01".into());
            p.end_date = Some("2023-01-03".into());
        })
        .validate(today())
        .unwrap_err();
        assert!(err.details[0].message.contains("cannot exceed 365 days"));

        let ok = params(|p| {
            p.start_date = Some("2023-01-01".into());
            p.end_date = Some("2024-01-01".into());
        })
        .validate(today())
        .unwrap();
        assert!(ok.expects_list());
    }

    #[test]
    fn count_bounds() {
        for raw in ["0", "101", "-3"] {
            assert!(params(|p| p.count = Some(raw.into())).validate(today()).is_err());
        }
        assert!(params(|p| p.count = Some("ten".into())).validate(today()).is_err());

        let req = params(|p| p.count = Some("100".into()))
            .validate(today())
            .unwrap();
        assert_eq!(req.selection, ApodSelection::Random { count: 100 });
    }

    #[test]
    fn multiple_problems_reported_together() {
        let err = params(|p| {
            p.date = Some("bad".into());
            p.count = Some("500".into());
        })
        .validate(today())
        .unwrap_err();
        assert!(err.mentions("date"));
        assert!(err.mentions("count"));
    }

    #[test]
    fn params_round_trip_through_validation() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 1, 7).unwrap();
        let req = ApodRequest::range(start, end);
        assert_eq!(req.to_params().validate(today()).unwrap(), req);
        assert_eq!(
            req.query_pairs(),
            vec![
                ("start_date", "2024-01-01".to_string()),
                ("end_date", "2024-01-07".to_string()),
                ("thumbs", "true".to_string()),
            ]
        );
    }

    // =========================================================================
    // Records
    // =========================================================================

    fn sample() -> Apod {
        Apod {
            title: "Pillars".into(),
            date: "2024-01-01".into(),
            explanation: "Gas and dust".into(),
            url: "https://apod.nasa.gov/image.jpg".into(),
            hdurl: Some("https://apod.nasa.gov/image_hd.jpg".into()),
            media_type: "image".into(),
            service_version: "v1".into(),
            copyright: None,
            thumbnail_url: None,
        }
    }

    #[test]
    fn image_candidates_prefer_hd() {
        assert_eq!(
            sample().image_candidates(),
            vec![
                "https://apod.nasa.gov/image_hd.jpg",
                "https://apod.nasa.gov/image.jpg"
            ]
        );
    }

    #[test]
    fn video_falls_back_to_thumbnail() {
        let video = Apod {
            url: "https://youtube.com/embed/x".into(),
            hdurl: None,
            media_type: "video".into(),
            thumbnail_url: Some("https://img.youtube.com/x.jpg".into()),
            ..sample()
        };
        assert_eq!(video.image_candidates(), vec!["https://img.youtube.com/x.jpg"]);

        let bare = Apod {
            thumbnail_url: None,
            ..video
        };
        assert!(bare.image_candidates().is_empty());
    }

    #[test]
    fn decodes_minimal_record() {
        let json = r#"{"title":"t","date":"2024-01-01","explanation":"e","url":"u","media_type":"image"}"#;
        let apod: Apod = serde_json::from_str(json).unwrap();
        assert_eq!(apod.hdurl, None);
        assert_eq!(apod.parsed_date(), NaiveDate::from_ymd_opt(2024, 1, 1));
    }
}
