use chrono::NaiveDateTime;
use rfm_core::{
    compute_rfm,
    config::RfmConfig,
    dataset::{Dataset, GeoLocation, Order, Payment, Review},
    loader::parse_timestamp,
    segment::Segment,
    summary::{
        city_locations, mean_review_per_month, orders_per_month, overview,
        payment_type_counts, review_score_distribution, segment_counts, top_cities,
        DashboardReport, NumericSummary,
    },
    synthetic::generate_dataset,
    RfmError,
};

// ── Helpers ──────────────────────────────────────────────────────────────────

fn ts(raw: &str) -> NaiveDateTime {
    parse_timestamp(raw).expect("valid timestamp")
}

fn orders() -> Vec<Order> {
    vec![
        Order::new("o1", "c1", ts("2017-11-03 10:00:00")),
        Order::new("o2", "c2", ts("2017-11-20 10:00:00")),
        Order::new("o3", "c1", ts("2017-12-01 10:00:00")),
        Order::new("o4", "c3", ts("2018-01-15 10:00:00")),
    ]
}

fn reviews() -> Vec<Review> {
    vec![
        Review { order_id: "o1".into(), review_score: 5 },
        Review { order_id: "o2".into(), review_score: 2 },
        Review { order_id: "o3".into(), review_score: 4 },
        Review { order_id: "o3".into(), review_score: 5 },
        // Unknown order: excluded by the inner join.
        Review { order_id: "zz".into(), review_score: 1 },
    ]
}

fn geo(city: &str, lat: f64, lng: f64) -> GeoLocation {
    GeoLocation { city: city.into(), state: None, lat, lng }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[test]
fn overview_counts_distinct_ids() {
    let payments = vec![
        Payment::new("o1", 10.0),
        Payment::new("o1", 2.5),
        Payment::unvalued("o2"),
    ];
    let o = overview(&orders(), &payments);
    assert_eq!(o.total_orders, 4);
    assert_eq!(o.total_customers, 3);
    assert!((o.total_payment - 12.5).abs() < 1e-9);
}

#[test]
fn orders_grouped_by_purchase_month() {
    let monthly = orders_per_month(&orders());
    let pairs: Vec<(&str, usize)> = monthly.iter().map(|m| (m.month.as_str(), m.orders)).collect();
    assert_eq!(pairs, vec![("2017-11", 2), ("2017-12", 1), ("2018-01", 1)]);
}

#[test]
fn review_means_use_inner_join() {
    let means = mean_review_per_month(&orders(), &reviews());
    assert_eq!(means.len(), 2, "2018-01 has no reviews, unknown order dropped");

    assert_eq!(means[0].month, "2017-11");
    assert_eq!(means[0].review_count, 2);
    assert!((means[0].mean_score - 3.5).abs() < 1e-9);

    assert_eq!(means[1].month, "2017-12");
    assert!((means[1].mean_score - 4.5).abs() < 1e-9);
}

#[test]
fn review_distribution_sorted_by_score() {
    let dist = review_score_distribution(&reviews());
    let pairs: Vec<(u8, usize)> = dist.iter().map(|d| (d.score, d.count)).collect();
    assert_eq!(pairs, vec![(1, 1), (2, 1), (4, 1), (5, 2)]);
}

#[test]
fn payment_types_most_common_first() {
    let payments = vec![
        Payment::new("o1", 1.0).with_type("boleto"),
        Payment::new("o2", 1.0).with_type("credit_card"),
        Payment::new("o3", 1.0).with_type("credit_card"),
        Payment::new("o4", 1.0).with_type("voucher"),
        Payment::new("o5", 1.0),
    ];
    let counts = payment_type_counts(&payments);
    let labels: Vec<(&str, usize)> = counts.iter().map(|c| (c.label.as_str(), c.count)).collect();
    assert_eq!(labels, vec![("credit_card", 2), ("boleto", 1), ("voucher", 1)]);
}

#[test]
fn numeric_summary_matches_hand_computation() {
    let s = NumericSummary::of([4.0, 1.0, 3.0, 2.0]).unwrap();
    assert_eq!(s.count, 4);
    assert!((s.mean - 2.5).abs() < 1e-12);
    // Sample variance of 1..4 is 5/3.
    assert!((s.std - (5.0f64 / 3.0).sqrt()).abs() < 1e-12);
    assert_eq!(s.min, 1.0);
    assert!((s.p25 - 1.75).abs() < 1e-12);
    assert!((s.p50 - 2.5).abs() < 1e-12);
    assert!((s.p75 - 3.25).abs() < 1e-12);
    assert_eq!(s.max, 4.0);

    assert!(NumericSummary::of(Vec::<f64>::new()).is_none());
    let single = NumericSummary::of([7.0]).unwrap();
    assert!(single.std.is_nan());
    assert_eq!(single.p50, 7.0);
}

#[test]
fn cities_averaged_and_ranked() {
    let rows = vec![
        geo("recife", -8.0, -35.0),
        geo("sao paulo", -23.0, -46.0),
        geo("sao paulo", -24.0, -47.0),
        geo("curitiba", -25.4, -49.3),
        geo("recife", -8.2, -35.2),
        geo("sao paulo", -23.5, -46.5),
    ];

    let cities = city_locations(&rows);
    assert_eq!(cities.len(), 3);
    let sp = cities.iter().find(|c| c.city == "sao paulo").unwrap();
    assert_eq!(sp.entries, 3);
    assert!((sp.lat - (-23.5)).abs() < 1e-9);
    assert!((sp.lng - (-46.5)).abs() < 1e-9);

    let top = top_cities(&rows, 2);
    let labels: Vec<(&str, usize)> = top.iter().map(|c| (c.label.as_str(), c.count)).collect();
    assert_eq!(labels, vec![("sao paulo", 3), ("recife", 2)]);
}

#[test]
fn segment_counts_cover_every_customer() {
    let dataset = generate_dataset(3, 150);
    let scored = compute_rfm(&dataset.orders, &dataset.payments).unwrap();
    let counts = segment_counts(&scored);

    let total: usize = counts.iter().map(|c| c.count).sum();
    assert_eq!(total, scored.len());
    assert!(counts.windows(2).all(|w| w[0].count >= w[1].count));
    for c in &counts {
        let expected = scored.iter().filter(|s| s.segment == c.segment).count();
        assert_eq!(c.count, expected, "{}", c.segment);
    }
}

#[test]
fn report_not_built_when_scoring_fails() {
    let dataset = Dataset {
        orders: vec![Order::new("o1", "", ts("2018-01-01 00:00:00"))],
        ..Dataset::default()
    };
    let err = DashboardReport::build(&dataset, &RfmConfig::default()).unwrap_err();
    assert!(matches!(err, RfmError::MalformedInput { .. }));
}

#[test]
fn report_serializes_segment_labels() {
    let dataset = generate_dataset(9, 60);
    let report = DashboardReport::build(&dataset, &RfmConfig::default()).unwrap();
    let json = serde_json::to_value(&report).unwrap();

    let labels: Vec<&str> = Segment::ALL.iter().map(Segment::label).collect();
    for customer in json["customers"].as_array().unwrap() {
        let segment = customer["segment"].as_str().unwrap();
        assert!(labels.contains(&segment), "unexpected segment label {segment}");
    }
    assert!(report.top_cities.len() <= 10);
}
