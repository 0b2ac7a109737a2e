mod common;

use chapter_directory::models::{BusinessCategory, ParticipantStatus};
use chapter_directory::search::{ParticipantSearchService, SearchError, SearchMode, SearchOptions};
use chapter_directory::state::{CategoryStore, InMemoryStore, ParticipantStore};
use common::{ids, participant, seeded_store, tagged, Fault, FaultyStore};
use std::sync::Arc;
use std::time::{Duration, Instant};

fn service(store: &InMemoryStore) -> ParticipantSearchService {
    ParticipantSearchService::new(Arc::new(store.clone()), Arc::new(store.clone()))
}

fn faulty_service(store: &InMemoryStore, faulty: FaultyStore) -> ParticipantSearchService {
    let participants: Arc<dyn ParticipantStore> = Arc::new(faulty);
    let categories: Arc<dyn CategoryStore> = Arc::new(store.clone());
    ParticipantSearchService::new(participants, categories)
}

#[tokio::test]
async fn test_startup_scenario_finds_tag_and_field_matches() {
    let a = tagged("T1", "สมชาย ใจดี", &["ไอที", "Startup"], 0);
    let mut b = participant("T1", "สมหญิง รักดี", 1);
    b.company = Some("Startup Hub".to_string());
    let store = seeded_store(&[a.clone(), b.clone()]).await;

    let result = service(&store)
        .search(&SearchOptions::new("T1", "Startup").with_limit(10))
        .await
        .unwrap();

    assert_eq!(result.count, 2);
    let found = ids(&result.participants);
    assert!(found.contains(&a.id));
    assert!(found.contains(&b.id));
    assert!(result.timed_out_queries.is_empty());
}

#[tokio::test]
async fn test_results_never_leave_the_tenant() {
    let mine = tagged("T1", "Somchai", &["startup"], 0);
    let theirs_field = participant("T2", "Somchai", 1);
    let theirs_tag = tagged("T2", "Other", &["somchai"], 2);
    let prefix_tenant = participant("T10", "Somchai", 3);
    let store = seeded_store(&[
        mine.clone(),
        theirs_field,
        theirs_tag,
        prefix_tenant,
    ])
    .await;

    let result = service(&store)
        .search(&SearchOptions::new("T1", "somchai startup"))
        .await
        .unwrap();

    assert_eq!(ids(&result.participants), vec![mine.id]);
    assert!(result.participants.iter().all(|p| p.tenant_id == "T1"));
}

#[tokio::test]
async fn test_result_is_capped_at_limit_in_store_order() {
    let all: Vec<_> = (0..30)
        .map(|i| participant("T1", &format!("Startup founder {}", i), i))
        .collect();
    let store = seeded_store(&all).await;

    let result = service(&store)
        .search(&SearchOptions::new("T1", "startup founder").with_limit(5))
        .await
        .unwrap();

    assert_eq!(result.count, 5);
    assert_eq!(ids(&result.participants), ids(&all[..5]));
}

#[tokio::test]
async fn test_participant_matched_twice_appears_once() {
    let mut both = tagged("T1", "Coffee Somchai", &["coffee roaster"], 0);
    both.company = Some("Somchai Coffee".to_string());
    let other = participant("T1", "Somchai Roaster", 1);
    let store = seeded_store(&[both.clone(), other.clone()]).await;

    let result = service(&store)
        .search(&SearchOptions::new("T1", "coffee somchai roaster"))
        .await
        .unwrap();

    assert_eq!(ids(&result.participants), vec![both.id, other.id]);
    assert_eq!(result.count, 2);
}

#[tokio::test]
async fn test_blank_and_fully_sanitized_terms_return_empty() {
    let store = seeded_store(&[tagged("T1", "Somchai", &["%"], 0)]).await;
    let search = service(&store);

    for term in ["", "    ", "%%% ;;", "'\"(),\\_"] {
        let result = search.search(&SearchOptions::new("T1", term)).await.unwrap();
        assert_eq!(result.count, 0, "term {:?}", term);
        assert!(result.participants.is_empty());
        assert!(result.timed_out_queries.is_empty());
    }
}

#[tokio::test]
async fn test_pattern_characters_are_stripped_from_keywords() {
    let mut p = participant("T1", "สมชาย", 0);
    p.full_name_en = Some("Somchai Jaidee".to_string());
    let store = seeded_store(&[p.clone()]).await;
    let search = service(&store);

    // A wildcard must not widen the match
    let result = search.search(&SearchOptions::new("T1", "j%e")).await.unwrap();
    assert_eq!(result.count, 0);

    let result = search
        .search(&SearchOptions::new("T1", "som%chai';"))
        .await
        .unwrap();
    assert_eq!(ids(&result.participants), vec![p.id]);
}

#[tokio::test]
async fn test_field_timeout_degrades_to_tag_matches() {
    let tag_only = tagged("T1", "สมหญิง", &["coffee"], 0);
    let field_only = participant("T1", "Coffee Bean", 1);
    let store = seeded_store(&[tag_only.clone(), field_only]).await;
    let faulty = FaultyStore::new(store.clone()).with_text(Fault::Hang(Duration::from_secs(10)));

    let options = SearchOptions::new("T1", "coffee").with_query_timeout(Duration::from_millis(50));
    let start = Instant::now();
    let result = faulty_service(&store, faulty).search(&options).await.unwrap();

    assert!(start.elapsed() < Duration::from_secs(2));
    assert_eq!(ids(&result.participants), vec![tag_only.id]);
    assert_eq!(result.timed_out_queries, vec!["fields:coffee".to_string()]);
    assert!(result.is_degraded());
}

#[tokio::test]
async fn test_tag_scan_timeout_keeps_field_matches() {
    let field_only = participant("T1", "Coffee Bean", 0);
    let tag_only = tagged("T1", "สมหญิง", &["coffee"], 1);
    let store = seeded_store(&[field_only.clone(), tag_only]).await;
    let faulty = FaultyStore::new(store.clone()).with_tagged(Fault::Hang(Duration::from_secs(10)));

    let options = SearchOptions::new("T1", "coffee bean")
        .with_query_timeout(Duration::from_millis(50));
    let start = Instant::now();
    let result = faulty_service(&store, faulty).search(&options).await.unwrap();

    assert!(start.elapsed() < Duration::from_secs(2));
    assert_eq!(ids(&result.participants), vec![field_only.id]);
    // The tag page is requested once per call, not once per keyword
    assert_eq!(result.timed_out_queries, vec!["tag_scan".to_string()]);
}

#[tokio::test]
async fn test_store_errors_are_absorbed() {
    let tag_only = tagged("T1", "สมหญิง", &["coffee"], 0);
    let store = seeded_store(&[tag_only.clone(), participant("T1", "Coffee Bean", 1)]).await;
    let faulty = FaultyStore::new(store.clone()).with_text(Fault::Fail);

    let result = faulty_service(&store, faulty)
        .search(&SearchOptions::new("T1", "coffee"))
        .await
        .unwrap();

    assert_eq!(ids(&result.participants), vec![tag_only.id]);
    assert!(result.timed_out_queries.is_empty());
    assert!(!result.is_degraded());
}

#[tokio::test]
async fn test_tag_match_depends_on_scan_window() {
    let mut earlier: Vec<_> = (0..5)
        .map(|i| tagged("T1", &format!("Member {}", i), &["networking"], i))
        .collect();
    let golfer = tagged("T1", "สมศักดิ์", &["Golf"], 10);
    earlier.push(golfer.clone());
    let store = seeded_store(&earlier).await;
    let search = service(&store);

    let narrow = search
        .search(&SearchOptions::new("T1", "golf").with_tag_scan_limit(3))
        .await
        .unwrap();
    assert_eq!(narrow.count, 0);

    let wide = search
        .search(&SearchOptions::new("T1", "golf").with_tag_scan_limit(100))
        .await
        .unwrap();
    assert_eq!(ids(&wide.participants), vec![golfer.id]);
}

#[tokio::test]
async fn test_field_matches_precede_tag_matches() {
    let tag_match = tagged("T1", "สมหญิง", &["golf"], 0);
    let mut field_match = participant("T1", "สมชาย", 1);
    field_match.company = Some("Golf Club Co".to_string());
    let store = seeded_store(&[tag_match.clone(), field_match.clone()]).await;

    let result = service(&store)
        .search(&SearchOptions::new("T1", "golf"))
        .await
        .unwrap();

    assert_eq!(ids(&result.participants), vec![field_match.id, tag_match.id]);
}

#[tokio::test]
async fn test_status_filter_defaults_to_visible() {
    let member = participant("T1", "Somchai Member", 0);
    let mut prospect = participant("T1", "Somchai Prospect", 1);
    prospect.status = ParticipantStatus::Prospect;
    let store = seeded_store(&[member.clone(), prospect.clone()]).await;
    let search = service(&store);

    let default = search.search(&SearchOptions::new("T1", "somchai")).await.unwrap();
    assert_eq!(ids(&default.participants), vec![member.id]);

    let prospects = search
        .search(
            &SearchOptions::new("T1", "somchai")
                .with_status_filter(vec![ParticipantStatus::Prospect]),
        )
        .await
        .unwrap();
    assert_eq!(ids(&prospects.participants), vec![prospect.id]);
}

#[tokio::test]
async fn test_category_matches_are_appended_last() {
    let mut barista = participant("T1", "สมศรี", 0);
    barista.business_type_code = Some("CAFE".to_string());
    let mut roaster = participant("T1", "Coffee Roaster", 1);
    roaster.business_type_code = Some("CAFE".to_string());
    let store = seeded_store(&[barista.clone(), roaster.clone()]).await;
    store
        .save_category(&BusinessCategory::new("CAFE", "ร้านกาแฟ", "Coffee Shop"))
        .await
        .unwrap();
    let search = service(&store);

    let without = search.search(&SearchOptions::new("T1", "coffee")).await.unwrap();
    assert_eq!(ids(&without.participants), vec![roaster.id]);
    assert!(without.matching_category_codes.is_empty());

    let with = search
        .search(&SearchOptions::new("T1", "coffee").with_category_matching(true))
        .await
        .unwrap();
    assert_eq!(ids(&with.participants), vec![roaster.id, barista.id]);
    assert_eq!(with.matching_category_codes, vec!["CAFE".to_string()]);
}

#[tokio::test]
async fn test_category_query_timeout_is_recorded() {
    let mut barista = participant("T1", "สมศรี", 0);
    barista.business_type_code = Some("CAFE".to_string());
    let store = seeded_store(&[barista]).await;
    store
        .save_category(&BusinessCategory::new("CAFE", "ร้านกาแฟ", "Coffee Shop"))
        .await
        .unwrap();
    let faulty =
        FaultyStore::new(store.clone()).with_category(Fault::Hang(Duration::from_secs(10)));

    let options = SearchOptions::new("T1", "coffee")
        .with_category_matching(true)
        .with_query_timeout(Duration::from_millis(50));
    let result = faulty_service(&store, faulty).search(&options).await.unwrap();

    assert_eq!(result.count, 0);
    assert_eq!(result.matching_category_codes, vec!["CAFE".to_string()]);
    assert_eq!(result.timed_out_queries, vec!["category:CAFE".to_string()]);
}

#[tokio::test]
async fn test_blank_tenant_is_rejected() {
    let store = InMemoryStore::new();
    let search = service(&store);

    assert!(matches!(
        search.search(&SearchOptions::new("  ", "somchai")).await,
        Err(SearchError::InvalidOptions(_))
    ));
}

#[tokio::test]
async fn test_zero_limit_yields_empty_result() {
    let store = seeded_store(&[participant("T1", "Somchai", 0)]).await;

    let result = service(&store)
        .search(&SearchOptions::new("T1", "somchai").with_limit(0))
        .await
        .unwrap();

    assert_eq!(result.count, 0);
    assert!(result.participants.is_empty());
    assert!(result.timed_out_queries.is_empty());
}

#[tokio::test]
async fn test_empty_status_filter_matches_nobody() {
    let mut declined = tagged("T1", "Startup Declined", &["startup"], 0);
    declined.status = ParticipantStatus::Declined;
    let store = seeded_store(&[declined]).await;

    let result = service(&store)
        .search(&SearchOptions::new("T1", "startup").with_status_filter(vec![]))
        .await
        .unwrap();

    assert_eq!(result.count, 0);
    assert!(result.participants.is_empty());
}

#[tokio::test]
async fn test_timeout_order_is_the_same_in_both_modes() {
    let store = seeded_store(&[tagged("T1", "สมหญิง", &["tea"], 0)]).await;
    let options = SearchOptions::new("T1", "coffee tea")
        .with_query_timeout(Duration::from_millis(50));
    let hanging = || {
        FaultyStore::new(store.clone())
            .with_text(Fault::Hang(Duration::from_secs(10)))
            .with_tagged(Fault::Hang(Duration::from_secs(10)))
    };

    let sequential = faulty_service(&store, hanging()).search(&options).await.unwrap();
    let concurrent = faulty_service(&store, hanging())
        .with_mode(SearchMode::Concurrent { max_concurrent: 4 })
        .search(&options)
        .await
        .unwrap();

    let expected = vec![
        "fields:coffee".to_string(),
        "tag_scan".to_string(),
        "fields:tea".to_string(),
    ];
    assert_eq!(sequential.timed_out_queries, expected);
    assert_eq!(concurrent.timed_out_queries, expected);
}

#[tokio::test]
async fn test_concurrent_mode_bounds_latency_by_timeout() {
    let tag_only = tagged("T1", "สมหญิง", &["tea"], 0);
    let store = seeded_store(&[tag_only.clone()]).await;
    let faulty = FaultyStore::new(store.clone()).with_text(Fault::Hang(Duration::from_secs(10)));
    let search = faulty_service(&store, faulty).with_mode(SearchMode::Concurrent { max_concurrent: 4 });

    let options = SearchOptions::new("T1", "coffee tea juice")
        .with_query_timeout(Duration::from_millis(100));
    let start = Instant::now();
    let result = search.search(&options).await.unwrap();

    // All three field queries run side by side, so one timeout bounds the call
    assert!(start.elapsed() < Duration::from_secs(1));
    assert_eq!(ids(&result.participants), vec![tag_only.id]);
    assert_eq!(
        result.timed_out_queries,
        vec![
            "fields:coffee".to_string(),
            "fields:tea".to_string(),
            "fields:juice".to_string()
        ]
    );
}

#[tokio::test]
async fn test_concurrent_mode_matches_sequential_order() {
    let all = vec![
        tagged("T1", "Alpha", &["startup"], 0),
        participant("T1", "Startup Beta", 1),
        tagged("T1", "Gamma Coffee", &["coffee", "startup"], 2),
        participant("T1", "Delta Coffee", 3),
        tagged("T1", "Epsilon", &["coffee"], 4),
    ];
    let store = seeded_store(&all).await;
    let options = SearchOptions::new("T1", "startup coffee").with_limit(4);

    let sequential = service(&store).search(&options).await.unwrap();
    let concurrent = service(&store)
        .with_mode(SearchMode::Concurrent { max_concurrent: 2 })
        .search(&options)
        .await
        .unwrap();

    assert_eq!(sequential.count, 4);
    assert_eq!(ids(&sequential.participants), ids(&concurrent.participants));
}
