use std::{sync::Arc, time::Duration};

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use tabled::{Table, settings::Style};
use tokio::{sync::mpsc, time::MissedTickBehavior};

use crate::{
    cli::{report_failure, session},
    error::Result,
    info,
    management::{LoadTicket, ReceiptLoader, ReceiptView},
    types::{
        ArtistReceiptRow, Metric, Receipt, ReceiptItems, StatReceiptRow, TimeRange,
        TrackReceiptRow,
    },
    utils, warning,
};

const RULE: &str = "--------------------------------------------";

/// Loads and prints a receipt, optionally reloading every `watch` seconds.
pub async fn receipt(metric: Metric, range: TimeRange, limit: u32, json: bool, watch: Option<u64>) {
    let loader = ReceiptLoader::new(session::client());
    let view = ReceiptView::new();

    match watch {
        None => {
            let ticket = view.begin_load();
            let result = with_spinner("Loading your receipt...", loader.load(metric, range, limit)).await;
            match result {
                Ok(receipt) => {
                    view.apply(ticket, receipt);
                    if let Some(receipt) = view.current() {
                        print_receipt(&receipt, json);
                    }
                }
                Err(e) => report_failure(&e),
            }
        }
        Some(seconds) => watch_receipt(loader, view, metric, range, limit, json, seconds).await,
    }
}

/// Reloads on a timer until interrupted.
///
/// Each load runs as its own task and is never cancelled. A tick that comes
/// while the previous load is still running is skipped, and [`ReceiptView`]
/// keeps only the newest result.
async fn watch_receipt(
    loader: ReceiptLoader,
    view: ReceiptView,
    metric: Metric,
    range: TimeRange,
    limit: u32,
    json: bool,
    seconds: u64,
) {
    let loader = Arc::new(loader);
    let (tx, mut rx) = mpsc::unbounded_channel::<(LoadTicket, Result<Receipt>)>();
    let mut interval = tokio::time::interval(Duration::from_secs(seconds.max(1)));
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    info!("Refreshing every {}s, press Ctrl-C to stop.", seconds.max(1));

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let Some(ticket) = view.try_begin_load() else {
                    log::debug!("previous load still running, skipping this tick");
                    continue;
                };
                let loader = Arc::clone(&loader);
                let tx = tx.clone();
                tokio::spawn(async move {
                    let result = loader.load(metric, range, limit).await;
                    let _ = tx.send((ticket, result));
                });
            }
            Some((ticket, result)) = rx.recv() => match result {
                Ok(receipt) => {
                    if view.apply(ticket, receipt) {
                        if let Some(receipt) = view.current() {
                            print_receipt(&receipt, json);
                        }
                    }
                }
                Err(e) if e.is_session_failure() => report_failure(&e),
                Err(e) => {
                    view.settle(ticket);
                    warning!("Failed to load data. Please try again. Err: {}", e);
                }
            },
            _ = &mut ctrl_c => return,
        }
    }
}

pub(crate) async fn with_spinner<T>(message: &str, fut: impl Future<Output = T>) -> T {
    let pb = ProgressBar::new_spinner();
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    if let Ok(style) = ProgressStyle::with_template("{spinner:.green} {msg}") {
        pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
    }

    let out = fut.await;
    pb.finish_and_clear();
    out
}

fn print_receipt(receipt: &Receipt, json: bool) {
    if json {
        match serde_json::to_string_pretty(receipt) {
            Ok(s) => println!("{s}"),
            Err(e) => warning!("Failed to serialize receipt: {}", e),
        }
        return;
    }

    println!("{}", render_receipt(receipt));
}

/// Renders a receipt as plain text.
pub fn render_receipt(receipt: &Receipt) -> String {
    let name = receipt
        .profile
        .display_name
        .clone()
        .unwrap_or_else(|| receipt.profile.id.clone());

    let mut lines = vec![
        format!("{}", "RECEIPTIFY".bold()),
        receipt.metric.title().to_uppercase(),
        receipt.range.label().to_uppercase(),
        format!("ORDER #{:04} FOR {}", order_number(receipt), name.to_uppercase()),
        utils::format_receipt_date(&receipt.generated_at),
    ];
    if let Some(product) = &receipt.profile.product {
        lines.push(format!("PLAN: {}", product.to_uppercase()));
    }
    lines.push(RULE.to_string());

    match (&receipt.items, receipt.metric) {
        (ReceiptItems::Tracks(tracks), _) => {
            if tracks.is_empty() {
                lines.push("No tracks data available".to_string());
            } else {
                let rows: Vec<TrackReceiptRow> = tracks
                    .iter()
                    .enumerate()
                    .map(|(i, t)| TrackReceiptRow {
                        qty: format!("{:02}", i + 1),
                        item: format!("{} - {}", t.name, t.artist_names.join(", ")),
                        amount: utils::format_duration(t.duration_ms),
                    })
                    .collect();
                lines.push(Table::new(rows).with(Style::blank()).to_string());
                lines.push(RULE.to_string());
                lines.push(format!("ITEM COUNT: {}", tracks.len()));
                lines.push(format!("TOTAL: {}", utils::total_duration(tracks)));
                if let Some(id) = tracks[0].uri.rsplit(':').next() {
                    lines.push(format!("#1 https://open.spotify.com/track/{id}"));
                }
            }
        }
        (ReceiptItems::Artists(artists), _) => {
            if artists.is_empty() {
                lines.push("No artists data available".to_string());
            } else {
                let rows: Vec<ArtistReceiptRow> = artists
                    .iter()
                    .enumerate()
                    .map(|(i, a)| ArtistReceiptRow {
                        qty: format!("{:02}", i + 1),
                        name: a.name.clone(),
                        genres: a.genres.iter().take(2).cloned().collect::<Vec<_>>().join(", "),
                        followers: utils::format_count(a.follower_count),
                    })
                    .collect();
                lines.push(Table::new(rows).with(Style::blank()).to_string());
                lines.push(RULE.to_string());
                lines.push(format!("ITEM COUNT: {}", artists.len()));
                if !artists[0].external_url.is_empty() {
                    lines.push(format!("#1 {}", artists[0].external_url));
                }
            }
        }
        (ReceiptItems::Summary, Metric::TopGenres) => lines.push(genre_table(receipt)),
        (ReceiptItems::Summary, _) => {
            let stats = &receipt.stats;
            let rows = vec![
                StatReceiptRow {
                    label: "LISTENING TIME (EST.)".to_string(),
                    value: utils::format_listening_time(stats.total_minutes_listened),
                },
                StatReceiptRow {
                    label: "TOTAL MINUTES (EST.)".to_string(),
                    value: utils::format_count(stats.total_minutes_listened),
                },
                StatReceiptRow {
                    label: "FAVORITE TIME".to_string(),
                    value: stats.favorite_day_time_label(),
                },
                StatReceiptRow {
                    label: "LIKED SONGS".to_string(),
                    value: utils::format_count(stats.total_liked_songs),
                },
            ];
            lines.push(Table::new(rows).with(Style::blank()).to_string());
            lines.push(RULE.to_string());
            lines.push(genre_table(receipt));
        }
    }

    lines.push(RULE.to_string());
    lines.push(format!(
        "{} listened · most active: {} · {} liked songs",
        utils::format_listening_time(receipt.stats.total_minutes_listened),
        receipt.stats.favorite_day_time_label(),
        receipt.stats.total_liked_songs
    ));
    lines.push(format!("CARDHOLDER: {}", name.to_uppercase()));
    lines.push("THANK YOU FOR VISITING!".to_string());
    lines.join("\n")
}

fn genre_table(receipt: &Receipt) -> String {
    let genres = &receipt.stats.genre_distribution;
    if genres.is_empty() {
        return "No genre data available".to_string();
    }

    let rows: Vec<StatReceiptRow> = genres
        .iter()
        .map(|g| StatReceiptRow {
            label: g.name.to_uppercase(),
            value: format!("{}%", g.percentage),
        })
        .collect();
    format!(
        "{}\nBased on your top artists",
        Table::new(rows).with(Style::blank())
    )
}

fn order_number(receipt: &Receipt) -> u32 {
    receipt.generated_at.timestamp().rem_euclid(10_000) as u32
}
