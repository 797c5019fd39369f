//! Integration tests for the feed state machine and search debounce.
//!
//! No network: responses are fed straight into `FeedController::apply`.
//! Property tests cover ordering guarantees that are hard to enumerate by
//! hand (out-of-order responses, paging without duplicates).

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use std::time::{Duration, Instant};
use techflow::api::{ApiError, Article, ArticlePage, ErrorNotice};
use techflow::feed::{
    ApplyOutcome, FeedController, FeedRequest, PendingFetch, SearchDebouncer, SearchIntent,
};

fn article(id: i64) -> Article {
    serde_json::from_value(serde_json::json!({
        "id": id,
        "title": format!("Article {id}"),
        "url": format!("https://example.com/{id}"),
    }))
    .unwrap()
}

fn page(ids: std::ops::Range<i64>, page: u32, page_size: u32, has_next: bool) -> ArticlePage {
    ArticlePage {
        articles: ids.map(article).collect(),
        total: 1000,
        page,
        page_size,
        has_next,
    }
}

#[derive(Debug, Clone)]
enum Op {
    Search(&'static str),
    Category(&'static str),
    Refresh,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        prop::sample::select(vec!["", "ai", "rust", "llm"]).prop_map(Op::Search),
        prop::sample::select(vec!["all", "Learning", "Design"]).prop_map(Op::Category),
        Just(Op::Refresh),
    ]
}

fn run_op(controller: &mut FeedController, op: &Op) -> Option<PendingFetch> {
    match op {
        Op::Search(s) => controller.set_search(s),
        Op::Category(c) => controller.set_category(c),
        Op::Refresh => Some(controller.refresh()),
    }
}

proptest! {
    /// However responses interleave, only the most recently issued request
    /// may change the list.
    #[test]
    fn only_latest_request_lands(
        ops in prop::collection::vec(op_strategy(), 0..10),
        reverse in any::<bool>(),
    ) {
        let mut controller = FeedController::new(20);
        let mut fetches = vec![controller.start()];
        fetches.extend(ops.iter().filter_map(|op| run_op(&mut controller, op)));

        let latest = fetches.pop().unwrap();
        if reverse {
            fetches.reverse();
        }
        for (i, stale) in fetches.iter().enumerate() {
            let start = i as i64 * 100;
            let outcome = controller.apply(&stale.key, Ok(page(start..start + 3, 1, 20, true)));
            prop_assert_eq!(outcome, ApplyOutcome::Stale);
        }
        prop_assert!(controller.is_loading());

        let outcome = controller.apply(&latest.key, Ok(page(900..905, 1, 20, false)));
        prop_assert_eq!(outcome, ApplyOutcome::Replaced);
        let ids: Vec<i64> = controller.articles().iter().map(|a| a.id).collect();
        prop_assert_eq!(ids, (900..905).collect::<Vec<_>>());
        prop_assert!(!controller.is_loading());
    }

    /// Loading every page in turn yields each article exactly once, in order.
    #[test]
    fn paging_appends_without_duplicates(pages in 1u32..6, page_size in 1u32..8) {
        let mut controller = FeedController::new(page_size);
        let mut fetch = Some(controller.start());
        let mut page_no = 1;
        while let Some(current) = fetch.take() {
            let start = i64::from((page_no - 1) * page_size);
            let end = start + i64::from(page_size);
            let has_next = page_no < pages;
            controller.apply(&current.key, Ok(page(start..end, page_no, page_size, has_next)));
            fetch = controller.load_more();
            page_no += 1;
        }

        let ids: Vec<i64> = controller.articles().iter().map(|a| a.id).collect();
        let expected: Vec<i64> = (0..i64::from(pages * page_size)).collect();
        prop_assert_eq!(ids, expected);
        prop_assert!(!controller.can_load_more());
    }
}

#[test]
fn search_then_category_keeps_both_filters() {
    let mut controller = FeedController::new(20);
    controller.start();
    controller.set_search("ai").unwrap();
    let fetch = controller.set_category("Learning").unwrap();

    match fetch.request {
        FeedRequest::Search(q) => {
            assert_eq!(q.q, "ai");
            assert_eq!(q.page, 1);
            assert_eq!(q.filter.category.as_deref(), Some("Learning"));
        }
        other => panic!("expected a search request, got {other:?}"),
    }
}

#[test]
fn failed_load_more_keeps_list_and_retries_same_page() {
    let mut controller = FeedController::new(2);
    let first = controller.start();
    controller.apply(&first.key, Ok(page(0..2, 1, 2, true)));

    let more = controller.load_more().unwrap();
    assert_eq!(more.request.page(), 2);
    let notice = ErrorNotice::from_error(&ApiError::Connection("refused".into()), None);
    assert_eq!(
        controller.apply(&more.key, Err(notice)),
        ApplyOutcome::Failed
    );
    assert_eq!(controller.articles().len(), 2);
    assert!(controller.error().is_some());

    let retry = controller.retry().unwrap();
    assert_eq!(retry.request.page(), 2);
    assert_eq!(
        controller.apply(&retry.key, Ok(page(2..4, 2, 2, false))),
        ApplyOutcome::Appended
    );
    assert_eq!(controller.articles().len(), 4);
    assert!(controller.error().is_none());
}

#[test]
fn retry_is_refused_after_the_query_changed() {
    let mut controller = FeedController::new(20);
    let first = controller.start();
    let notice = ErrorNotice::from_error(&ApiError::Timeout(10), None);
    controller.apply(&first.key, Err(notice));
    controller.set_search("rust").unwrap();
    assert!(controller.retry().is_none());
}

// ============================================================================
// Debounce
// ============================================================================

#[test]
fn debounce_sends_only_the_settled_value() {
    let mut debouncer = SearchDebouncer::new(Duration::from_millis(300));
    let t0 = Instant::now();

    debouncer.input("r", t0);
    debouncer.input("ru", t0 + Duration::from_millis(100));
    debouncer.input("rust", t0 + Duration::from_millis(200));

    assert_eq!(debouncer.poll(t0 + Duration::from_millis(400)), None);
    assert_eq!(
        debouncer.poll(t0 + Duration::from_millis(500)),
        Some(SearchIntent::Search("rust".into()))
    );
    assert!(!debouncer.is_pending());
}

#[test]
fn debounce_ignores_single_char_and_repeats() {
    let mut debouncer = SearchDebouncer::new(Duration::from_millis(300));
    let t0 = Instant::now();
    let later = t0 + Duration::from_secs(1);

    debouncer.input("a", t0);
    assert_eq!(debouncer.poll(later), None);

    debouncer.input(" ai ", t0);
    assert_eq!(debouncer.poll(later), Some(SearchIntent::Search("ai".into())));

    debouncer.input("ai", t0);
    assert_eq!(debouncer.poll(later), None);

    debouncer.input("", t0);
    assert_eq!(debouncer.poll(later), Some(SearchIntent::Clear));
}

#[test]
fn flush_dispatches_before_the_deadline() {
    let mut debouncer = SearchDebouncer::new(Duration::from_millis(300));
    debouncer.input("llm", Instant::now());
    assert_eq!(debouncer.flush(), Some(SearchIntent::Search("llm".into())));
    assert_eq!(debouncer.flush(), None);
}
