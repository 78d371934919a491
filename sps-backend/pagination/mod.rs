//! Incremental loader behind the infinite-scroll prompt lists.
//!
//! A [`PaginatedList`] starts from a first page (usually fetched while the
//! page is rendered) and appends further pages each time the view reports
//! that the end of the list came into sight via
//! [`PaginatedList::notify_near_end`]. At most one fetch is in flight at a
//! time; a fetch that completes after a category reset is dropped.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;

use crate::gateway::{GatewayError, PromptGateway};
use crate::prompts::{Prompt, PromptListParams};

/// Describes the next page to fetch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cursor {
    pub offset: u32,
    pub limit: u32,
    pub category: Option<String>,
    /// Cleared once the service answers with an empty page.
    pub has_more: bool,
}

impl Cursor {
    fn new(limit: u32, category: Option<String>) -> Self {
        Self {
            offset: 0,
            limit,
            category,
            has_more: true,
        }
    }

    pub fn params(&self) -> PromptListParams {
        PromptListParams::new(self.offset, self.limit, self.category.clone())
    }
}

/// What a call to [`PaginatedList::load_more`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// A non-empty page was appended.
    Appended(usize),
    /// The service returned an empty page; pagination is over.
    Exhausted,
    /// A fetch was already running or there is nothing more to load.
    Skipped,
    /// The list was reset while this fetch was in flight; its page was dropped.
    Discarded,
}

/// Point-in-time copy of the list, for rendering.
#[derive(Debug, Clone, Serialize)]
pub struct ListSnapshot {
    pub items: Vec<Prompt>,
    pub cursor: Cursor,
    pub loading: bool,
    pub error: Option<String>,
}

struct ListState {
    items: Vec<Prompt>,
    cursor: Cursor,
    loading: bool,
    last_error: Option<String>,
    // Bumped on every reset so late pages from an older filter are ignored.
    generation: u64,
}

/// Clears `loading` if a `load_more` future is dropped mid-fetch, unless the
/// list was reset in the meantime.
struct InFlight<'a> {
    list: &'a PaginatedList,
    generation: u64,
    armed: bool,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut state = self.list.state();
        if state.generation == self.generation {
            tracing::debug!(offset = state.cursor.offset, "page fetch cancelled");
            state.loading = false;
        }
    }
}

pub struct PaginatedList {
    gateway: Arc<dyn PromptGateway>,
    state: Mutex<ListState>,
}

impl PaginatedList {
    pub fn new(gateway: Arc<dyn PromptGateway>, limit: u32, category: Option<String>) -> Self {
        let category = category.filter(|c| !c.is_empty());
        Self {
            gateway,
            state: Mutex::new(ListState {
                items: Vec::new(),
                cursor: Cursor::new(limit, category),
                loading: false,
                last_error: None,
                generation: 0,
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, ListState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Seed the list with a page fetched ahead of time.
    pub fn initialize(&self, server_page: Vec<Prompt>) {
        let mut state = self.state();
        state.generation += 1;
        state.cursor.offset = server_page.len() as u32;
        state.cursor.has_more = true;
        state.items = server_page;
        state.loading = false;
        state.last_error = None;
    }

    /// Fetch the next page unless a fetch is already running or the list is
    /// exhausted.
    ///
    /// The offset advances by the number of items actually returned. Only an
    /// empty page ends pagination. On error the items and cursor are left as
    /// they were and the error is kept for display; calling again retries the
    /// same page.
    pub async fn load_more(&self) -> Result<LoadOutcome, GatewayError> {
        let (params, generation) = {
            let mut state = self.state();
            if state.loading || !state.cursor.has_more {
                return Ok(LoadOutcome::Skipped);
            }
            state.loading = true;
            (state.cursor.params(), state.generation)
        };

        let mut in_flight = InFlight {
            list: self,
            generation,
            armed: true,
        };
        let result = self.gateway.list(&params).await;
        in_flight.armed = false;

        let mut state = self.state();
        if state.generation != generation {
            tracing::debug!(offset = params.offset, "dropping page fetched before reset");
            return Ok(LoadOutcome::Discarded);
        }
        state.loading = false;

        match result {
            Ok(page) if page.is_empty() => {
                state.cursor.has_more = false;
                state.last_error = None;
                tracing::debug!(total = state.items.len(), "reached end of prompt list");
                Ok(LoadOutcome::Exhausted)
            }
            Ok(page) => {
                let count = page.len();
                state.cursor.offset += count as u32;
                state.items.extend(page);
                state.last_error = None;
                tracing::debug!(count, offset = state.cursor.offset, "appended prompt page");
                Ok(LoadOutcome::Appended(count))
            }
            Err(e) => {
                tracing::warn!(offset = params.offset, error = %e, "failed to load prompt page");
                state.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// The sentinel after the last item became visible.
    pub async fn notify_near_end(&self) -> Result<LoadOutcome, GatewayError> {
        self.load_more().await
    }

    /// Drop everything loaded so far and start over under `category`.
    pub async fn set_category(
        &self,
        category: Option<String>,
    ) -> Result<LoadOutcome, GatewayError> {
        {
            let mut state = self.state();
            state.generation += 1;
            state.items.clear();
            let limit = state.cursor.limit;
            state.cursor = Cursor::new(limit, category.filter(|c| !c.is_empty()));
            state.loading = false;
            state.last_error = None;
        }
        self.load_more().await
    }

    pub fn items(&self) -> Vec<Prompt> {
        self.state().items.clone()
    }

    pub fn len(&self) -> usize {
        self.state().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn cursor(&self) -> Cursor {
        self.state().cursor.clone()
    }

    pub fn category(&self) -> Option<String> {
        self.state().cursor.category.clone()
    }

    pub fn has_more(&self) -> bool {
        self.state().cursor.has_more
    }

    pub fn is_loading(&self) -> bool {
        self.state().loading
    }

    pub fn last_error(&self) -> Option<String> {
        self.state().last_error.clone()
    }

    pub fn snapshot(&self) -> ListSnapshot {
        let state = self.state();
        ListSnapshot {
            items: state.items.clone(),
            cursor: state.cursor.clone(),
            loading: state.loading,
            error: state.last_error.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::sync::Semaphore;

    use super::*;
    use crate::gateway::mock::{MockGateway, make_categorized, make_page};

    fn make_list(mock: &Arc<MockGateway>, limit: u32) -> PaginatedList {
        PaginatedList::new(mock.clone(), limit, None)
    }

    async fn wait_for_calls(mock: &MockGateway, n: usize) {
        for _ in 0..200 {
            if mock.list_calls() >= n {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("gateway never saw {n} list calls");
    }

    #[tokio::test]
    async fn test_pages_until_empty_page() {
        let mock = Arc::new(MockGateway::with_pages(vec![
            Ok(make_page("p1", 12)),
            Ok(make_page("p2", 12)),
            Ok(make_page("p3", 5)),
            Ok(vec![]),
        ]));
        let list = make_list(&mock, 12);

        while list.has_more() {
            list.notify_near_end().await.unwrap();
        }

        assert_eq!(list.len(), 29);
        assert!(!list.has_more());
        assert_eq!(mock.list_calls(), 4);
        let offsets: Vec<u32> = mock.list_params().iter().map(|p| p.offset).collect();
        assert_eq!(offsets, vec![0, 12, 24, 29]);

        // Exhausted lists make no further calls.
        assert_eq!(list.load_more().await.unwrap(), LoadOutcome::Skipped);
        assert_eq!(mock.list_calls(), 4);
    }

    #[tokio::test]
    async fn test_short_page_does_not_end_pagination() {
        let mock = Arc::new(MockGateway::with_pages(vec![Ok(make_page("p", 5))]));
        let list = make_list(&mock, 12);

        assert_eq!(list.load_more().await.unwrap(), LoadOutcome::Appended(5));
        assert!(list.has_more());
        assert_eq!(list.cursor().offset, 5);
    }

    #[tokio::test]
    async fn test_initialize_seeds_offset() {
        let mock = Arc::new(MockGateway::with_pages(vec![Ok(make_page("next", 3))]));
        let list = make_list(&mock, 12);
        list.initialize(make_page("server", 12));

        assert_eq!(list.cursor().offset, 12);
        list.notify_near_end().await.unwrap();
        assert_eq!(mock.list_params()[0].offset, 12);
        assert_eq!(list.len(), 15);
        assert_eq!(list.items()[12].id, "next-0");
    }

    #[tokio::test]
    async fn test_load_more_while_loading_is_noop() {
        let gate = Arc::new(Semaphore::new(0));
        let mock = Arc::new(
            MockGateway::with_pages(vec![Ok(make_page("p", 12))]).gated(gate.clone()),
        );
        let list = Arc::new(make_list(&mock, 12));

        let first = tokio::spawn({
            let list = list.clone();
            async move { list.load_more().await }
        });
        wait_for_calls(&mock, 1).await;
        assert!(list.is_loading());

        for _ in 0..3 {
            assert_eq!(list.notify_near_end().await.unwrap(), LoadOutcome::Skipped);
        }
        assert_eq!(mock.list_calls(), 1);

        gate.add_permits(1);
        assert_eq!(first.await.unwrap().unwrap(), LoadOutcome::Appended(12));
        assert!(!list.is_loading());
        assert_eq!(list.len(), 12);
    }

    #[tokio::test]
    async fn test_cancelled_fetch_releases_loading() {
        let gate = Arc::new(Semaphore::new(0));
        let mock = Arc::new(
            MockGateway::with_pages(vec![Ok(make_page("p", 12))]).gated(gate.clone()),
        );
        let list = make_list(&mock, 12);

        let timed_out =
            tokio::time::timeout(Duration::from_millis(20), list.load_more()).await;
        assert!(timed_out.is_err());
        assert!(!list.is_loading());
        assert_eq!(list.cursor().offset, 0);

        gate.add_permits(1);
        assert_eq!(list.notify_near_end().await.unwrap(), LoadOutcome::Appended(12));
        let offsets: Vec<u32> = mock.list_params().iter().map(|p| p.offset).collect();
        assert_eq!(offsets, vec![0, 0]);
    }

    #[tokio::test]
    async fn test_failed_fetch_keeps_state_and_retries_same_cursor() {
        let mock = Arc::new(MockGateway::with_pages(vec![
            Ok(make_page("p1", 12)),
            Err("upstream exploded".to_string()),
            Ok(make_page("p2", 4)),
        ]));
        let list = make_list(&mock, 12);

        list.load_more().await.unwrap();
        let before = list.cursor();

        let err = list.load_more().await.unwrap_err();
        assert!(matches!(err, GatewayError::Status { status: 500, .. }));
        assert_eq!(list.len(), 12);
        assert_eq!(list.cursor(), before);
        assert!(list.has_more());
        assert!(!list.is_loading());
        assert!(list.last_error().unwrap().contains("upstream exploded"));

        assert_eq!(list.load_more().await.unwrap(), LoadOutcome::Appended(4));
        let offsets: Vec<u32> = mock.list_params().iter().map(|p| p.offset).collect();
        assert_eq!(offsets, vec![0, 12, 12]);
        assert_eq!(list.len(), 16);
        assert_eq!(list.last_error(), None);
    }

    #[tokio::test]
    async fn test_set_category_is_hard_reset() {
        let mut prompts = Vec::new();
        for i in 0..20 {
            let category = if i % 4 == 0 { "rust" } else { "python" };
            prompts.push(make_categorized(&format!("p{i}"), category));
        }
        let mock = Arc::new(MockGateway::with_prompts(prompts));
        let list = make_list(&mock, 20);

        list.load_more().await.unwrap();
        assert_eq!(list.len(), 20);

        let outcome = list.set_category(Some("rust".into())).await.unwrap();
        assert_eq!(outcome, LoadOutcome::Appended(5));

        let items = list.items();
        assert_eq!(items.len(), 5);
        assert!(items.iter().all(|p| p.category() == Some("rust")));
        assert_eq!(list.cursor().offset, 5);
        assert_eq!(list.category().as_deref(), Some("rust"));

        let last = mock.list_params().pop().unwrap();
        assert_eq!(last.offset, 0);
        assert_eq!(last.category.as_deref(), Some("rust"));
    }

    #[tokio::test]
    async fn test_set_category_revives_exhausted_list() {
        let mock = Arc::new(MockGateway::with_pages(vec![
            Ok(vec![]),
            Ok(make_page("go", 2)),
        ]));
        let list = make_list(&mock, 12);

        list.load_more().await.unwrap();
        assert!(!list.has_more());

        list.set_category(Some("go".into())).await.unwrap();
        assert!(list.has_more());
        assert_eq!(list.len(), 2);
    }

    #[tokio::test]
    async fn test_page_in_flight_during_reset_is_dropped() {
        let gate = Arc::new(Semaphore::new(0));
        let prompts = vec![
            make_categorized("r1", "rust"),
            make_categorized("g1", "go"),
            make_categorized("r2", "rust"),
        ];
        let mock = Arc::new(MockGateway::with_prompts(prompts).gated(gate.clone()));
        let list = Arc::new(make_list(&mock, 12));

        let stale = tokio::spawn({
            let list = list.clone();
            async move { list.load_more().await }
        });
        wait_for_calls(&mock, 1).await;

        let fresh = tokio::spawn({
            let list = list.clone();
            async move { list.set_category(Some("rust".into())).await }
        });
        wait_for_calls(&mock, 2).await;

        gate.add_permits(2);
        assert_eq!(stale.await.unwrap().unwrap(), LoadOutcome::Discarded);
        assert_eq!(fresh.await.unwrap().unwrap(), LoadOutcome::Appended(2));

        let ids: Vec<String> = list.items().into_iter().map(|p| p.id).collect();
        assert_eq!(ids, vec!["r1", "r2"]);
        assert!(!list.is_loading());
    }

    #[tokio::test]
    async fn test_empty_category_means_unfiltered() {
        let mock = Arc::new(MockGateway::with_pages(vec![Ok(make_page("p", 1))]));
        let list = PaginatedList::new(mock.clone(), 12, Some(String::new()));
        list.load_more().await.unwrap();
        assert_eq!(mock.list_params()[0].category, None);
    }

    #[test]
    fn test_snapshot_serializes() {
        let list = PaginatedList::new(Arc::new(MockGateway::default()), 12, None);
        list.initialize(make_page("s", 2));
        let value = serde_json::to_value(list.snapshot()).unwrap();
        assert_eq!(value["cursor"]["offset"], 2);
        assert_eq!(value["items"].as_array().unwrap().len(), 2);
        assert_eq!(value["loading"], false);
    }
}
