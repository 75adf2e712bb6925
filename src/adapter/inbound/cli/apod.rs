//! Handler for the `apod` command.

use chrono::{NaiveDate, Utc};
use tabled::{Table, Tabled};

use crate::adapter::inbound::cli::command::ApodArgs;
use crate::adapter::inbound::cli::output;
use crate::adapter::inbound::cli::session::SessionOptions;
use crate::domain::apod::{format_date, Apod, ApodParams, ApodRequest, ApodSelection};
use crate::domain::preferences::Preferences;
use crate::error::Result;
use crate::port::outbound::upstream::ApodResponse;

/// Explanations are cut to this many characters unless `-v` is given.
const EXPLANATION_PREVIEW: usize = 280;

#[derive(Tabled)]
struct ApodRow {
    #[tabled(rename = "")]
    favorite: String,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Type")]
    media_type: String,
}

pub fn build_request(args: &ApodArgs, today: NaiveDate) -> Result<ApodRequest> {
    let params = ApodParams {
        date: args.date.clone(),
        start_date: args.start.clone(),
        end_date: args.end.clone(),
        count: args.count.clone(),
        thumbs: Some(!args.no_thumbs),
    };
    Ok(params.validate(today)?)
}

/// The date whose neighbours `--prefetch` should warm.
fn prefetch_anchor(request: &ApodRequest, today: NaiveDate) -> Option<NaiveDate> {
    match request.selection {
        ApodSelection::Today => Some(today),
        ApodSelection::Date(date) => Some(date),
        ApodSelection::Range { .. } | ApodSelection::Random { .. } => None,
    }
}

pub async fn execute(session: &SessionOptions, args: &ApodArgs) -> Result<()> {
    let today = Utc::now().date_naive();
    let request = build_request(args, today)?;
    let dashboard = session.open()?;

    let spinner = output::spinner("Fetching Astronomy Picture of the Day...");
    let response = match dashboard.apod(&request).await {
        Ok(response) => {
            output::spinner_success(&spinner, "Fetched APOD");
            response
        }
        Err(err) => {
            output::spinner_fail(&spinner, "APOD request failed");
            return Err(err);
        }
    };

    if args.prefetch {
        if let Some(anchor) = prefetch_anchor(&request, today) {
            let warmed = dashboard.prefetch_adjacent(anchor).await;
            if output::verbosity() > 0 {
                let dates: Vec<String> = warmed.into_iter().map(format_date).collect();
                output::note(&format!("Prefetched: {}", dates.join(", ")));
            }
        }
    }

    let preferences = dashboard.preferences()?;
    render(&response, &preferences);
    Ok(())
}

fn render(response: &ApodResponse, preferences: &Preferences) {
    if output::data("apod", response) {
        return;
    }
    match response {
        ApodResponse::Single(apod) => render_one(apod, preferences),
        ApodResponse::Many(items) => {
            let rows: Vec<ApodRow> = items
                .iter()
                .map(|apod| ApodRow {
                    favorite: output::favorite_marker(is_favorite(apod, preferences)),
                    date: apod.date.clone(),
                    title: apod.title.clone(),
                    media_type: apod.media_type.clone(),
                })
                .collect();
            output::section(&format!("{} pictures", items.len()));
            output::lines(&Table::new(rows).to_string());
        }
    }
}

fn is_favorite(apod: &Apod, preferences: &Preferences) -> bool {
    apod.parsed_date()
        .is_some_and(|date| preferences.is_favorite_date(date))
}

fn render_one(apod: &Apod, preferences: &Preferences) {
    let marker = if is_favorite(apod, preferences) {
        format!(" {}", output::favorite_marker(true))
    } else {
        String::new()
    };
    output::section(&format!("{}{marker}", apod.title));
    output::field("Date", &apod.date);
    output::field("Type", &apod.media_type);
    if let Some(copyright) = &apod.copyright {
        output::field("Copyright", copyright.trim());
    }
    match apod.image_candidates().first() {
        Some(url) => output::field("Image", output::highlight(url)),
        None => output::field("Media", output::highlight(&apod.url)),
    }

    output::section("Explanation");
    output::lines(&preview(&apod.explanation, output::verbosity() > 0));
}

fn preview(text: &str, full: bool) -> String {
    if full || text.chars().count() <= EXPLANATION_PREVIEW {
        return text.to_string();
    }
    let cut: String = text.chars().take(EXPLANATION_PREVIEW).collect();
    format!("{}...", cut.trim_end())
}
