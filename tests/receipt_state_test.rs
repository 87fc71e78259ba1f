use chrono::{Local, TimeZone};
use receiptify::{
    cli::render_receipt,
    management::{LoadTracker, ReceiptView},
    types::{GenreShare, Metric, Profile, Receipt, ReceiptItems, TimeRange, Track, UserStats},
};

fn receipt(metric: Metric, items: ReceiptItems) -> Receipt {
    Receipt {
        profile: Profile {
            id: "user-1".to_string(),
            display_name: Some("Ada".to_string()),
            product: Some("premium".to_string()),
            image_url: None,
        },
        metric,
        range: TimeRange::ShortTerm,
        stats: UserStats {
            total_minutes_listened: 125,
            favorite_day_time: None,
            total_liked_songs: 1234,
            genre_distribution: vec![GenreShare {
                name: "pop".to_string(),
                percentage: 67,
            }],
        },
        items,
        generated_at: Local.with_ymd_and_hms(2024, 3, 1, 17, 42, 0).unwrap(),
    }
}

fn track(name: &str, duration_ms: u64) -> Track {
    Track {
        id: name.to_lowercase(),
        name: name.to_string(),
        artist_names: vec!["Someone".to_string()],
        duration_ms,
        uri: format!("spotify:track:{}", name.to_lowercase()),
        album_image_url: None,
    }
}

#[test]
fn test_load_tracker_generations() {
    let tracker = LoadTracker::new();

    let first = tracker.begin();
    assert!(tracker.is_current(first));

    let second = tracker.begin();
    assert!(second.generation() > first.generation());
    assert!(!tracker.is_current(first));
    assert!(tracker.is_current(second));
}

#[test]
fn test_stale_load_is_dropped() {
    let view = ReceiptView::new();

    let slow = view.begin_load();
    let fast = view.begin_load();

    assert!(view.apply(fast, receipt(Metric::Stats, ReceiptItems::Summary)));
    // the older load finishes last and must not overwrite the newer one
    assert!(!view.apply(slow, receipt(Metric::TopGenres, ReceiptItems::Summary)));

    assert_eq!(view.current().unwrap().metric, Metric::Stats);
    assert_eq!(view.current_generation(), Some(fast.generation()));
}

#[test]
fn test_nothing_shown_before_first_load() {
    let view = ReceiptView::new();
    assert!(view.current().is_none());

    let ticket = view.begin_load();
    view.begin_load();
    assert!(!view.apply(ticket, receipt(Metric::Stats, ReceiptItems::Summary)));
    assert!(view.current().is_none());
}

#[test]
fn test_reload_waits_for_running_load() {
    let view = ReceiptView::new();

    let first = view.try_begin_load().unwrap();
    // a slow load blocks further reloads instead of being superseded
    assert!(view.try_begin_load().is_none());
    assert!(view.try_begin_load().is_none());

    assert!(view.apply(first, receipt(Metric::Stats, ReceiptItems::Summary)));
    assert_eq!(view.current_generation(), Some(first.generation()));

    let second = view.try_begin_load().unwrap();
    assert!(second.generation() > first.generation());
}

#[test]
fn test_failed_load_allows_next_reload() {
    let view = ReceiptView::new();

    let ticket = view.try_begin_load().unwrap();
    assert!(view.try_begin_load().is_none());

    view.settle(ticket);
    assert!(view.try_begin_load().is_some());
    assert!(view.current().is_none());
}

#[test]
fn test_render_track_receipt() {
    colored::control::set_override(false);
    let r = receipt(
        Metric::TopTracks,
        ReceiptItems::Tracks(vec![track("Intro", 61_000), track("Outro", 200_500)]),
    );

    let out = render_receipt(&r);

    assert!(out.contains("YOUR TOP TRACKS"));
    assert!(out.contains("LAST MONTH"));
    assert!(out.contains("FOR ADA"));
    assert!(out.contains("3/1/2024, 5:42 PM"));
    assert!(out.contains("Intro - Someone"));
    assert!(out.contains("1:01"));
    assert!(out.contains("ITEM COUNT: 2"));
    assert!(out.contains("TOTAL: 4:21"));
    assert!(out.contains("https://open.spotify.com/track/intro"));
    assert!(out.contains("2h 5m listened"));
    assert!(out.contains("Not available"));
}

#[test]
fn test_render_empty_and_summary_receipts() {
    colored::control::set_override(false);

    let out = render_receipt(&receipt(Metric::TopTracks, ReceiptItems::Tracks(vec![])));
    assert!(out.contains("No tracks data available"));

    let out = render_receipt(&receipt(Metric::TopArtists, ReceiptItems::Artists(vec![])));
    assert!(out.contains("No artists data available"));

    let out = render_receipt(&receipt(Metric::Stats, ReceiptItems::Summary));
    assert!(out.contains("LIKED SONGS"));
    assert!(out.contains("1,234"));
    assert!(out.contains("POP"));
    assert!(out.contains("67%"));
}
