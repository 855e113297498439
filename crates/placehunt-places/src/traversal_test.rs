use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::time::Instant;

use super::*;
use crate::types::{DetailRecord, LatLng, ResultStatus, SummaryRecord};

/// Search stub: answers call `n` (0-based) with `respond(n)` and records the
/// parameters and virtual time of every call.
struct FakeSearch<F> {
    respond: F,
    calls: Mutex<Vec<(QueryParameters, Instant)>>,
}

impl<F> FakeSearch<F>
where
    F: Fn(usize) -> Result<SearchPage, PlacesError> + Send + Sync,
{
    fn new(respond: F) -> Arc<Self> {
        Arc::new(Self {
            respond,
            calls: Mutex::new(Vec::new()),
        })
    }

    fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn calls(&self) -> Vec<(QueryParameters, Instant)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl<F> SearchClient for FakeSearch<F>
where
    F: Fn(usize) -> Result<SearchPage, PlacesError> + Send + Sync,
{
    async fn nearby_search(&self, params: &QueryParameters) -> Result<SearchPage, PlacesError> {
        let n = {
            let mut calls = self.calls.lock().unwrap();
            calls.push((params.clone(), Instant::now()));
            calls.len() - 1
        };
        (self.respond)(n)
    }
}

/// Detail stub backed by a place-id → phone map. Ids missing from the map
/// have no phone number.
#[derive(Default)]
struct FakeDetails {
    phones: HashMap<String, String>,
    fail: bool,
    calls: Mutex<Vec<Vec<String>>>,
}

impl FakeDetails {
    fn with_phones(entries: &[(&str, &str)]) -> Arc<Self> {
        Arc::new(Self {
            phones: entries
                .iter()
                .map(|(id, phone)| ((*id).to_owned(), (*phone).to_owned()))
                .collect(),
            ..Self::default()
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail: true,
            ..Self::default()
        })
    }

    fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl DetailFetcher for FakeDetails {
    async fn fetch_details(&self, place_ids: &[String]) -> Result<Vec<DetailRecord>, PlacesError> {
        self.calls.lock().unwrap().push(place_ids.to_vec());
        if self.fail {
            return Err(PlacesError::UnexpectedStatus {
                status: 500,
                endpoint: "place/details/json".to_owned(),
            });
        }
        Ok(place_ids
            .iter()
            .filter(|id| !id.is_empty())
            .filter_map(|id| {
                self.phones.get(id).map(|phone| DetailRecord {
                    place_id: Some(id.clone()),
                    name: Some(format!("Place {id}")),
                    formatted_address: None,
                    formatted_phone_number: phone.clone(),
                    international_phone_number: None,
                    website: None,
                    url: None,
                })
            })
            .collect())
    }
}

fn search_page(ids: &[Option<&str>], token: Option<&str>) -> SearchPage {
    SearchPage {
        status: 200,
        status_text: "OK".to_owned(),
        data: NearbySearchResponse {
            results: ids
                .iter()
                .map(|id| SummaryRecord {
                    place_id: id.map(str::to_owned),
                    ..SummaryRecord::default()
                })
                .collect(),
            next_page_token: token.map(str::to_owned),
            error_message: None,
            status: Some(if ids.is_empty() {
                ResultStatus::ZeroResults
            } else {
                ResultStatus::Ok
            }),
        },
    }
}

fn params() -> QueryParameters {
    QueryParameters {
        radius: Some(500),
        keyword: Some("boulangerie".to_owned()),
        ..QueryParameters::new(LatLng {
            lat: 48.8566,
            lng: 2.3522,
        })
    }
}

fn options(max_depth: u32) -> TraversalOptions {
    TraversalOptions {
        max_depth,
        current_depth: 0,
        page_delay: Duration::ZERO,
    }
}

async fn collect_pages<S, D>(traversal: PageTraversal<S, D>) -> Vec<Result<PageResult, PlacesError>>
where
    S: SearchClient + ?Sized + 'static,
    D: DetailFetcher + ?Sized + 'static,
{
    traversal.into_stream().collect().await
}

fn page_numbers(items: &[Result<PageResult, PlacesError>]) -> Vec<u32> {
    items
        .iter()
        .map(|item| item.as_ref().expect("page should be Ok").page_number)
        .collect()
}

#[tokio::test]
async fn depth_zero_emits_nothing_and_never_searches() {
    let search = FakeSearch::new(|_| Ok(search_page(&[Some("A")], Some("T"))));
    let details = FakeDetails::with_phones(&[]);
    let traversal = PageTraversal::new(search.clone(), details.clone(), params(), options(0));

    let items = collect_pages(traversal).await;

    assert!(items.is_empty());
    assert_eq!(search.call_count(), 0);
    assert!(details.calls().is_empty());
}

#[tokio::test]
async fn without_cursor_emits_exactly_one_page_for_any_positive_depth() {
    for depth in 1..=4 {
        let search = FakeSearch::new(|_| Ok(search_page(&[Some("A")], None)));
        let details = FakeDetails::with_phones(&[]);
        let traversal = PageTraversal::new(search.clone(), details, params(), options(depth));

        let items = collect_pages(traversal).await;

        assert_eq!(page_numbers(&items), vec![1], "depth {depth}");
        assert_eq!(search.call_count(), 1, "depth {depth}");
    }
}

#[tokio::test]
async fn with_endless_cursor_emits_exactly_depth_pages() {
    for depth in 0..=5u32 {
        let search =
            FakeSearch::new(|n| Ok(search_page(&[Some("A")], Some(&format!("token-{n}")))));
        let details = FakeDetails::with_phones(&[]);
        let traversal = PageTraversal::new(search.clone(), details, params(), options(depth));

        let items = collect_pages(traversal).await;

        let expected: Vec<u32> = (1..=depth).collect();
        assert_eq!(page_numbers(&items), expected, "depth {depth}");
        assert_eq!(search.call_count(), depth as usize, "depth {depth}");
    }
}

#[tokio::test]
async fn single_page_with_mobile_number() {
    let search = FakeSearch::new(|_| Ok(search_page(&[Some("A")], None)));
    let details = FakeDetails::with_phones(&[("A", "0612345678")]);
    let traversal = PageTraversal::new(
        search.clone(),
        details.clone(),
        params(),
        TraversalOptions::default(),
    );

    let items = collect_pages(traversal).await;

    assert_eq!(items.len(), 1);
    let page = items[0].as_ref().unwrap();
    assert_eq!(page.page_number, 1);
    assert_eq!(page.status, 200);
    assert_eq!(page.res_status, Some(ResultStatus::Ok));
    assert!(page.next_page_token.is_none());
    assert_eq!(page.single_location.len(), 1);
    assert_eq!(page.single_location[0].formatted_phone_number, "0612345678");
    assert_eq!(details.calls(), vec![vec!["A".to_owned()]]);
}

#[tokio::test(start_paused = true)]
async fn follows_cursor_with_pacing_delay_between_pages() {
    let search = FakeSearch::new(|n| {
        Ok(if n == 0 {
            search_page(&[Some("A")], Some("NEXT"))
        } else {
            search_page(&[Some("B")], None)
        })
    });
    let details = FakeDetails::with_phones(&[("A", "0611111111"), ("B", "0722222222")]);
    let traversal = PageTraversal::new(
        search.clone(),
        details,
        params(),
        TraversalOptions::default(),
    );

    let items = collect_pages(traversal).await;

    assert_eq!(page_numbers(&items), vec![1, 2]);
    let calls = search.calls();
    assert_eq!(calls.len(), 2);
    let gap = calls[1].1 - calls[0].1;
    assert!(gap >= Duration::from_millis(2_000), "gap was {gap:?}");

    assert!(calls[0].0.pagetoken.is_none());
    assert_eq!(calls[1].0.pagetoken.as_deref(), Some("NEXT"));
    assert_eq!(
        QueryParameters {
            pagetoken: None,
            ..calls[1].0.clone()
        },
        params(),
        "only the cursor changes between pages"
    );
}

#[tokio::test(start_paused = true)]
async fn no_delay_is_paid_when_depth_bound_stops_the_traversal() {
    let search = FakeSearch::new(|_| Ok(search_page(&[Some("A")], Some("MORE"))));
    let details = FakeDetails::with_phones(&[]);
    let traversal = PageTraversal::new(
        search.clone(),
        details,
        params(),
        TraversalOptions {
            max_depth: 1,
            ..TraversalOptions::default()
        },
    );

    let started = Instant::now();
    let items = collect_pages(traversal).await;

    assert_eq!(page_numbers(&items), vec![1]);
    assert!(
        started.elapsed() < Duration::from_millis(2_000),
        "traversal slept before stopping: {:?}",
        started.elapsed()
    );
}

#[tokio::test]
async fn detail_fetcher_receives_every_identifier_on_the_page() {
    let search = FakeSearch::new(|_| Ok(search_page(&[Some("A"), None, Some("C")], None)));
    let details = FakeDetails::with_phones(&[("A", "0611111111"), ("C", "0133333333")]);
    let traversal = PageTraversal::new(search, details.clone(), params(), options(3));

    let items = collect_pages(traversal).await;

    let page = items[0].as_ref().unwrap();
    assert_eq!(
        details.calls(),
        vec![vec!["A".to_owned(), String::new(), "C".to_owned()]]
    );
    assert_eq!(page.results.len(), 3);
    assert!(page.single_location.len() <= page.results.len());
    let ids: Vec<_> = page
        .single_location
        .iter()
        .map(|r| r.place_id.as_deref().unwrap())
        .collect();
    assert_eq!(ids, vec!["A", "C"]);
}

#[tokio::test]
async fn empty_page_still_produces_a_result() {
    let search = FakeSearch::new(|_| Ok(search_page(&[], None)));
    let details = FakeDetails::with_phones(&[]);
    let traversal = PageTraversal::new(search, details, params(), options(3));

    let items = collect_pages(traversal).await;

    assert_eq!(items.len(), 1);
    let page = items[0].as_ref().unwrap();
    assert!(page.results.is_empty());
    assert!(page.single_location.is_empty());
    assert_eq!(page.res_status, Some(ResultStatus::ZeroResults));
}

#[tokio::test]
async fn result_status_is_passed_through_without_failing() {
    let search = FakeSearch::new(|_| {
        let mut page = search_page(&[], None);
        page.data.status = Some(ResultStatus::OverQueryLimit);
        page.data.error_message = Some("You have exceeded your daily request quota".to_owned());
        Ok(page)
    });
    let details = FakeDetails::with_phones(&[]);
    let traversal = PageTraversal::new(search, details, params(), options(3));

    let items = collect_pages(traversal).await;

    assert_eq!(items.len(), 1);
    let page = items[0].as_ref().unwrap();
    assert_eq!(page.res_status, Some(ResultStatus::OverQueryLimit));
    assert!(page.error_message.as_deref().unwrap().contains("quota"));
}

#[tokio::test]
async fn empty_cursor_string_ends_the_traversal() {
    let search = FakeSearch::new(|_| Ok(search_page(&[Some("A")], Some(""))));
    let details = FakeDetails::with_phones(&[]);
    let traversal = PageTraversal::new(search.clone(), details, params(), options(3));

    let items = collect_pages(traversal).await;

    assert_eq!(page_numbers(&items), vec![1]);
    assert!(items[0].as_ref().unwrap().next_page_token.is_none());
    assert_eq!(search.call_count(), 1);
}

#[tokio::test]
async fn search_failure_ends_stream_after_earlier_pages() {
    let search = FakeSearch::new(|n| {
        if n == 0 {
            Ok(search_page(&[Some("A")], Some("NEXT")))
        } else {
            Err(PlacesError::UnexpectedStatus {
                status: 503,
                endpoint: "place/nearbysearch/json".to_owned(),
            })
        }
    });
    let details = FakeDetails::with_phones(&[]);
    let traversal = PageTraversal::new(search.clone(), details, params(), options(5));

    let items = collect_pages(traversal).await;

    assert_eq!(items.len(), 2);
    assert_eq!(items[0].as_ref().unwrap().page_number, 1);
    assert!(matches!(
        items[1],
        Err(PlacesError::UnexpectedStatus { status: 503, .. })
    ));
    assert_eq!(search.call_count(), 2, "failed page must not be retried");
}

#[tokio::test]
async fn detail_fetcher_failure_aborts_traversal() {
    let search = FakeSearch::new(|_| Ok(search_page(&[Some("A")], Some("NEXT"))));
    let details = FakeDetails::failing();
    let traversal = PageTraversal::new(search.clone(), details, params(), options(3));

    let items = collect_pages(traversal).await;

    assert_eq!(items.len(), 1);
    assert!(items[0].is_err());
    assert_eq!(search.call_count(), 1);
}

#[tokio::test]
async fn resumed_traversal_continues_page_numbers() {
    let search = FakeSearch::new(|n| Ok(search_page(&[Some("A")], Some(&format!("t{n}")))));
    let details = FakeDetails::with_phones(&[]);
    let traversal = PageTraversal::new(
        search.clone(),
        details,
        params().with_page_token("RESUME"),
        TraversalOptions {
            max_depth: 3,
            current_depth: 1,
            page_delay: Duration::ZERO,
        },
    );

    let items = collect_pages(traversal).await;

    assert_eq!(page_numbers(&items), vec![2, 3]);
    assert_eq!(search.calls()[0].0.pagetoken.as_deref(), Some("RESUME"));
}

#[tokio::test]
async fn resumed_traversal_past_bound_emits_nothing() {
    let search = FakeSearch::new(|_| Ok(search_page(&[Some("A")], None)));
    let details = FakeDetails::with_phones(&[]);
    let traversal = PageTraversal::new(
        search.clone(),
        details,
        params(),
        TraversalOptions {
            max_depth: 2,
            current_depth: 2,
            page_delay: Duration::ZERO,
        },
    );

    assert!(collect_pages(traversal).await.is_empty());
    assert_eq!(search.call_count(), 0);
}

#[tokio::test]
async fn cancelled_token_prevents_any_request() {
    let search = FakeSearch::new(|_| Ok(search_page(&[Some("A")], None)));
    let details = FakeDetails::with_phones(&[]);
    let cancel = CancellationToken::new();
    cancel.cancel();
    let traversal =
        PageTraversal::new(search.clone(), details, params(), options(3)).with_cancellation(cancel);

    assert!(collect_pages(traversal).await.is_empty());
    assert_eq!(search.call_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn cancelling_from_the_sink_stops_before_the_next_page() {
    let search = FakeSearch::new(|n| Ok(search_page(&[Some("A")], Some(&format!("t{n}")))));
    let details = FakeDetails::with_phones(&[]);
    let traversal = PageTraversal::new(
        search.clone(),
        details,
        params(),
        TraversalOptions::default(),
    );
    let cancel = traversal.cancellation_token();

    let mut seen = Vec::new();
    let delivered = traversal
        .for_each_page(|page| {
            seen.push(page.page_number);
            cancel.cancel();
        })
        .await
        .unwrap();

    assert_eq!(delivered, 1);
    assert_eq!(seen, vec![1]);
    assert_eq!(search.call_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn cancelling_during_page_delay_ends_the_stream_without_waiting() {
    let search = FakeSearch::new(|n| Ok(search_page(&[Some("A")], Some(&format!("t{n}")))));
    let details = FakeDetails::with_phones(&[]);
    let traversal = PageTraversal::new(
        search.clone(),
        details,
        params(),
        TraversalOptions::default(),
    );
    let cancel = traversal.cancellation_token();
    let mut pages = traversal.into_stream();

    let first = pages.next().await.expect("first page").expect("page 1");
    assert_eq!(first.page_number, 1);

    let started = Instant::now();
    let (next, ()) = tokio::join!(pages.next(), async move {
        tokio::time::sleep(Duration::from_millis(500)).await;
        cancel.cancel();
    });

    assert!(next.is_none());
    let waited = started.elapsed();
    assert!(waited >= Duration::from_millis(500), "waited {waited:?}");
    assert!(waited < DEFAULT_PAGE_DELAY, "waited {waited:?}");
    assert_eq!(search.call_count(), 1);
}

#[tokio::test]
async fn dropping_the_stream_stops_further_requests() {
    let search = FakeSearch::new(|n| Ok(search_page(&[Some("A")], Some(&format!("t{n}")))));
    let details = FakeDetails::with_phones(&[]);
    let traversal = PageTraversal::new(search.clone(), details, params(), options(10));

    let first: Vec<_> = traversal.into_stream().take(1).collect().await;

    assert_eq!(page_numbers(&first), vec![1]);
    assert_eq!(search.call_count(), 1);
}

#[tokio::test]
async fn for_each_page_delivers_in_order_and_reports_count() {
    let search = FakeSearch::new(|n| {
        Ok(if n < 2 {
            search_page(&[Some("A")], Some(&format!("t{n}")))
        } else {
            search_page(&[Some("A")], None)
        })
    });
    let details = FakeDetails::with_phones(&[("A", "0612345678")]);
    let traversal = PageTraversal::new(search, details, params(), options(5));

    let mut seen = Vec::new();
    let delivered = traversal
        .for_each_page(|page| seen.push(page.page_number))
        .await
        .unwrap();

    assert_eq!(delivered, 3);
    assert_eq!(seen, vec![1, 2, 3]);
}

#[tokio::test]
async fn for_each_page_returns_error_after_delivering_earlier_pages() {
    let search = FakeSearch::new(|n| {
        if n == 0 {
            Ok(search_page(&[Some("A")], Some("NEXT")))
        } else {
            Err(PlacesError::InvalidParameters("boom".to_owned()))
        }
    });
    let details = FakeDetails::with_phones(&[]);
    let traversal = PageTraversal::new(search, details, params(), options(3));

    let mut seen = Vec::new();
    let result = traversal
        .for_each_page(|page| seen.push(page.page_number))
        .await;

    assert!(matches!(result, Err(PlacesError::InvalidParameters(_))));
    assert_eq!(seen, vec![1]);
}

#[tokio::test]
async fn works_with_trait_objects() {
    let search: Arc<dyn SearchClient> =
        FakeSearch::new(|_| Ok(search_page(&[Some("A")], None)));
    let details: Arc<dyn DetailFetcher> = FakeDetails::with_phones(&[("A", "0612345678")]);
    let traversal = PageTraversal::new(search, details, params(), options(3));

    let items = collect_pages(traversal).await;

    assert_eq!(page_numbers(&items), vec![1]);
}
