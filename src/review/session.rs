//! Review session controller.
//!
//! A session owns the document list of one batch and at most one selected
//! document detail. Every transition publishes a fresh [`SessionSnapshot`]
//! through a `tokio::sync::watch` channel, so presentation code only ever
//! reads immutable state.
//!
//! Each list or detail dispatch takes a new [`RequestId`]. A response is
//! applied only if its id is still the current one for its kind; otherwise it
//! is dropped. In-flight fetches are also cancelled as soon as they are
//! superseded.

use std::{
    future::Future,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::{
    error::{Result, ReviewError},
    gateway::VerificationGateway,
    review::{
        aggregate::{aggregate, BatchStats},
        models::{DocumentDetail, DocumentSummary},
    },
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    List,
    Detail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    ListLoading,
    ListLoaded,
    ListError,
    DetailLoading,
    DetailLoaded,
    DetailError,
}

#[derive(Debug, Clone, Default)]
pub enum ListState {
    #[default]
    Idle,
    Loading,
    Loaded(Arc<Vec<DocumentSummary>>),
    Failed { reason: String },
}

#[derive(Debug, Clone, Default)]
pub enum DetailState {
    #[default]
    None,
    Loading { id: String },
    Loaded(Arc<DocumentDetail>),
    Failed { id: String, reason: String },
}

/// What became of a dispatched request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// The response was applied to the session.
    Applied,
    /// The request failed and the failure is now the session's error state.
    Failed,
    /// A newer request of the same kind replaced this one; nothing was applied.
    Superseded,
}

#[derive(Debug, Clone, Default)]
pub struct SessionSnapshot {
    batch_id: Option<String>,
    list: ListState,
    detail: DetailState,
    list_request: RequestId,
    detail_request: RequestId,
}

impl SessionSnapshot {
    pub fn phase(&self) -> Phase {
        match &self.list {
            ListState::Idle => Phase::Idle,
            ListState::Loading => Phase::ListLoading,
            ListState::Failed { .. } => Phase::ListError,
            ListState::Loaded(_) => match &self.detail {
                DetailState::None => Phase::ListLoaded,
                DetailState::Loading { .. } => Phase::DetailLoading,
                DetailState::Loaded(_) => Phase::DetailLoaded,
                DetailState::Failed { .. } => Phase::DetailError,
            },
        }
    }

    pub fn batch_id(&self) -> Option<&str> {
        self.batch_id.as_deref()
    }

    pub fn list_state(&self) -> &ListState {
        &self.list
    }

    pub fn detail_state(&self) -> &DetailState {
        &self.detail
    }

    /// Loaded documents in server order; empty in every other list state.
    pub fn documents(&self) -> &[DocumentSummary] {
        match &self.list {
            ListState::Loaded(docs) => docs.as_slice(),
            _ => &[],
        }
    }

    pub fn document(&self, id: &str) -> Option<&DocumentSummary> {
        self.documents().iter().find(|d| d.id == id)
    }

    /// Id of the document the detail pane is about, whatever its state.
    pub fn selected_id(&self) -> Option<&str> {
        match &self.detail {
            DetailState::None => None,
            DetailState::Loading { id } | DetailState::Failed { id, .. } => Some(id),
            DetailState::Loaded(detail) => Some(detail.id()),
        }
    }

    pub fn detail(&self) -> Option<&DocumentDetail> {
        match &self.detail {
            DetailState::Loaded(detail) => Some(detail),
            _ => None,
        }
    }

    pub fn list_error(&self) -> Option<&str> {
        match &self.list {
            ListState::Failed { reason } => Some(reason),
            _ => None,
        }
    }

    pub fn detail_error(&self) -> Option<&str> {
        match &self.detail {
            DetailState::Failed { reason, .. } => Some(reason),
            _ => None,
        }
    }

    pub fn last_error(&self) -> Option<&str> {
        self.list_error().or_else(|| self.detail_error())
    }

    pub fn is_list_loading(&self) -> bool {
        matches!(self.list, ListState::Loading)
    }

    pub fn is_detail_loading(&self) -> bool {
        matches!(self.detail, DetailState::Loading { .. })
    }

    /// The list loaded successfully and the batch has no documents.
    pub fn no_documents_found(&self) -> bool {
        matches!(&self.list, ListState::Loaded(docs) if docs.is_empty())
    }

    /// Tier counts for the loaded list (no consistency, that needs details).
    pub fn summary_stats(&self) -> BatchStats {
        aggregate(self.documents())
    }

    pub fn current_request(&self, kind: RequestKind) -> RequestId {
        match kind {
            RequestKind::List => self.list_request,
            RequestKind::Detail => self.detail_request,
        }
    }
}

pub struct ReviewSession<G: ?Sized> {
    gateway: Arc<G>,
    state: watch::Sender<SessionSnapshot>,
    next_request: AtomicU64,
}

impl<G> ReviewSession<G>
where
    G: VerificationGateway + ?Sized,
{
    pub fn new(gateway: Arc<G>) -> Self {
        let (state, _) = watch::channel(SessionSnapshot::default());
        Self {
            gateway,
            state,
            next_request: AtomicU64::new(1),
        }
    }

    pub fn gateway(&self) -> &Arc<G> {
        &self.gateway
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.state.subscribe()
    }

    fn next_request_id(&self) -> RequestId {
        RequestId(self.next_request.fetch_add(1, Ordering::Relaxed))
    }

    /// Start reviewing `batch_id`. Any previous list, selection and in-flight
    /// request is discarded.
    pub async fn load_batch(&self, batch_id: &str) -> Completion {
        let request = self.begin_list(batch_id.to_string());
        info!("Loading batch {}", batch_id);
        self.fetch_list(batch_id, request).await
    }

    /// Fetch the current batch again, whatever state the session is in.
    pub async fn reload_batch(&self) -> Result<Completion> {
        let batch_id = self
            .state
            .borrow()
            .batch_id
            .clone()
            .ok_or(ReviewError::NoActiveBatch)?;
        Ok(self.load_batch(&batch_id).await)
    }

    fn begin_list(&self, batch_id: String) -> RequestId {
        let list_request = self.next_request_id();
        let detail_request = self.next_request_id();
        self.state.send_modify(|s| {
            s.batch_id = Some(batch_id);
            s.list = ListState::Loading;
            s.list_request = list_request;
            s.detail = DetailState::None;
            s.detail_request = detail_request;
        });
        list_request
    }

    async fn fetch_list(&self, batch_id: &str, request: RequestId) -> Completion {
        let fetch = self.gateway.get_batch_documents(batch_id);
        match self.unless_superseded(RequestKind::List, request, fetch).await {
            Some(result) => self.finish_list(request, result),
            None => {
                debug!("List request for batch {} superseded in flight", batch_id);
                Completion::Superseded
            }
        }
    }

    pub(crate) fn finish_list(
        &self,
        request: RequestId,
        result: Result<Vec<DocumentSummary>>,
    ) -> Completion {
        let mut completion = Completion::Superseded;
        self.state.send_if_modified(|s| {
            if s.list_request != request {
                return false;
            }
            match result {
                Ok(documents) => {
                    debug!("Batch list loaded with {} documents", documents.len());
                    s.list = ListState::Loaded(Arc::new(documents));
                    completion = Completion::Applied;
                }
                Err(e) => {
                    warn!("Batch list failed: {}", e);
                    s.list = ListState::Failed { reason: e.to_string() };
                    completion = Completion::Failed;
                }
            }
            true
        });
        completion
    }

    /// Select a document from the loaded list and fetch its detail.
    ///
    /// Fails with `InvalidState` (and changes nothing) if no list is loaded.
    /// An id that is not in the list becomes a detail error without any
    /// gateway call.
    pub async fn select_document(&self, document_id: &str) -> Result<Completion> {
        let Some(request) = self.begin_detail(document_id)? else {
            return Ok(Completion::Failed);
        };

        let fetch = self.gateway.get_document_detail(document_id);
        match self.unless_superseded(RequestKind::Detail, request, fetch).await {
            Some(result) => Ok(self.finish_detail(request, document_id, result)),
            None => {
                debug!("Detail request for {} superseded in flight", document_id);
                Ok(Completion::Superseded)
            }
        }
    }

    pub(crate) fn begin_detail(&self, document_id: &str) -> Result<Option<RequestId>> {
        let request = self.next_request_id();
        let mut outcome = Err(ReviewError::InvalidState(
            "cannot select a document before the batch list has loaded".to_string(),
        ));

        self.state.send_if_modified(|s| {
            let ListState::Loaded(documents) = &s.list else {
                return false;
            };
            s.detail_request = request;
            if documents.iter().any(|d| d.id == document_id) {
                s.detail = DetailState::Loading { id: document_id.to_string() };
                outcome = Ok(Some(request));
            } else {
                let reason = ReviewError::NotFound(document_id.to_string()).to_string();
                warn!("Selected document {} is not in the batch list", document_id);
                s.detail = DetailState::Failed { id: document_id.to_string(), reason };
                outcome = Ok(None);
            }
            true
        });

        outcome
    }

    pub(crate) fn finish_detail(
        &self,
        request: RequestId,
        document_id: &str,
        result: Result<DocumentDetail>,
    ) -> Completion {
        let result = result.and_then(|detail| {
            if detail.id() == document_id {
                Ok(detail)
            } else {
                Err(ReviewError::MalformedData(format!(
                    "requested document {} but received {}",
                    document_id,
                    detail.id()
                )))
            }
        });

        let mut completion = Completion::Superseded;
        self.state.send_if_modified(|s| {
            if s.detail_request != request {
                return false;
            }
            match result {
                Ok(detail) => {
                    s.detail = DetailState::Loaded(Arc::new(detail));
                    completion = Completion::Applied;
                }
                Err(e) => {
                    warn!("Detail for {} failed: {}", document_id, e);
                    s.detail = DetailState::Failed {
                        id: document_id.to_string(),
                        reason: e.to_string(),
                    };
                    completion = Completion::Failed;
                }
            }
            true
        });
        completion
    }

    /// Back to the list. Returns `false` if nothing was selected.
    pub fn clear_selection(&self) -> bool {
        let request = self.next_request_id();
        self.state.send_if_modified(|s| {
            if matches!(s.detail, DetailState::None) {
                return false;
            }
            s.detail = DetailState::None;
            s.detail_request = request;
            true
        })
    }

    /// Repeat whatever last failed: the list, or the failed selection.
    pub async fn retry(&self) -> Result<Option<Completion>> {
        let snapshot = self.snapshot();
        match snapshot.phase() {
            Phase::ListError => self.reload_batch().await.map(Some),
            Phase::DetailError => match snapshot.selected_id() {
                Some(id) => self.select_document(id).await.map(Some),
                None => Ok(None),
            },
            _ => Ok(None),
        }
    }

    /// Run `fetch` unless a newer request of `kind` replaces `request` first.
    async fn unless_superseded<T, F>(&self, kind: RequestKind, request: RequestId, fetch: F) -> Option<T>
    where
        F: Future<Output = T>,
    {
        let superseded = wait_superseded(self.state.subscribe(), kind, request);
        tokio::select! {
            out = fetch => Some(out),
            _ = superseded => None,
        }
    }
}

async fn wait_superseded(
    mut rx: watch::Receiver<SessionSnapshot>,
    kind: RequestKind,
    request: RequestId,
) {
    loop {
        let current = rx.borrow_and_update().current_request(kind);
        if current != request {
            return;
        }
        if rx.changed().await.is_err() {
            // Session dropped; let the fetch decide.
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::review::{models::FileKind, risk::Tier};
    use async_trait::async_trait;
    use std::{collections::HashMap, sync::Mutex};
    use tokio::sync::oneshot;

    fn summary(id: &str, score: &str) -> DocumentSummary {
        DocumentSummary {
            id: id.to_string(),
            score: score.to_string(),
            file_kind: FileKind::Document,
            created_at: None,
            file_url: None,
            status: None,
        }
    }

    fn detail(id: &str, name: &str) -> DocumentDetail {
        let mut d = DocumentDetail::new(summary(id, "NORMAL"));
        d.name = Some(name.to_string());
        d
    }

    /// Gateway whose detail responses are released by the test through
    /// oneshot channels, so arrival order is under test control.
    #[derive(Default)]
    struct ScriptedGateway {
        lists: Mutex<Vec<Result<Vec<DocumentSummary>>>>,
        pending: Mutex<HashMap<String, oneshot::Receiver<Result<DocumentDetail>>>>,
        detail_calls: Mutex<Vec<String>>,
    }

    impl ScriptedGateway {
        fn with_list(docs: Vec<DocumentSummary>) -> Self {
            let gateway = Self::default();
            gateway.push_list(Ok(docs));
            gateway
        }

        fn push_list(&self, result: Result<Vec<DocumentSummary>>) {
            self.lists.lock().unwrap().push(result);
        }

        fn script_detail(&self, id: &str) -> oneshot::Sender<Result<DocumentDetail>> {
            let (tx, rx) = oneshot::channel();
            self.pending.lock().unwrap().insert(id.to_string(), rx);
            tx
        }

        fn detail_calls(&self) -> Vec<String> {
            self.detail_calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl VerificationGateway for ScriptedGateway {
        async fn get_batch_documents(&self, _batch_id: &str) -> Result<Vec<DocumentSummary>> {
            let mut lists = self.lists.lock().unwrap();
            if lists.is_empty() {
                return Err(ReviewError::Gateway("no scripted list".to_string()));
            }
            lists.remove(0)
        }

        async fn get_document_detail(&self, document_id: &str) -> Result<DocumentDetail> {
            self.detail_calls.lock().unwrap().push(document_id.to_string());
            let rx = self.pending.lock().unwrap().remove(document_id);
            match rx {
                Some(rx) => rx
                    .await
                    .unwrap_or_else(|_| Err(ReviewError::Gateway("dropped".to_string()))),
                None => Err(ReviewError::NotFound(document_id.to_string())),
            }
        }

        async fn get_batch_stats(&self, _batch_id: &str) -> Result<BatchStats> {
            Err(ReviewError::Gateway("not scripted".to_string()))
        }
    }

    async fn loaded_session(docs: Vec<DocumentSummary>) -> (Arc<ScriptedGateway>, ReviewSession<ScriptedGateway>) {
        let gateway = Arc::new(ScriptedGateway::with_list(docs));
        let session = ReviewSession::new(gateway.clone());
        assert_eq!(session.load_batch("upload-1").await, Completion::Applied);
        (gateway, session)
    }

    #[test]
    fn test_new_session_is_idle() {
        let session = ReviewSession::new(Arc::new(ScriptedGateway::default()));
        let snap = session.snapshot();
        assert_eq!(snap.phase(), Phase::Idle);
        assert!(snap.documents().is_empty());
        assert!(!snap.no_documents_found());
        assert_eq!(snap.last_error(), None);
    }

    #[tokio::test]
    async fn test_load_batch_preserves_order() {
        let (_, session) = loaded_session(vec![
            summary("c", "WARNING"),
            summary("a", "HIGH_RISK"),
            summary("b", "TRUSTED"),
        ])
        .await;

        let snap = session.snapshot();
        assert_eq!(snap.phase(), Phase::ListLoaded);
        assert_eq!(snap.batch_id(), Some("upload-1"));
        let ids: Vec<&str> = snap.documents().iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);

        let stats = snap.summary_stats();
        assert_eq!(stats.total_documents, 3);
        assert_eq!(stats.overall_status, Tier::HighRisk);
    }

    #[tokio::test]
    async fn test_empty_batch_is_not_an_error() {
        let (_, session) = loaded_session(vec![]).await;
        let snap = session.snapshot();
        assert_eq!(snap.phase(), Phase::ListLoaded);
        assert!(snap.no_documents_found());
        assert_eq!(snap.last_error(), None);
    }

    #[tokio::test]
    async fn test_list_error_clears_list_and_retry_recovers() {
        let (gateway, session) = loaded_session(vec![summary("a", "NORMAL")]).await;
        gateway.push_list(Err(ReviewError::Gateway("HTTP 503".to_string())));

        assert_eq!(session.reload_batch().await.unwrap(), Completion::Failed);
        let snap = session.snapshot();
        assert_eq!(snap.phase(), Phase::ListError);
        assert!(snap.documents().is_empty());
        assert!(snap.list_error().unwrap().contains("HTTP 503"));

        gateway.push_list(Ok(vec![summary("a", "NORMAL")]));
        assert_eq!(session.retry().await.unwrap(), Some(Completion::Applied));
        assert_eq!(session.snapshot().phase(), Phase::ListLoaded);
    }

    #[tokio::test]
    async fn test_reload_without_batch() {
        let session = ReviewSession::new(Arc::new(ScriptedGateway::default()));
        assert!(matches!(
            session.reload_batch().await,
            Err(ReviewError::NoActiveBatch)
        ));
        assert_eq!(session.snapshot().phase(), Phase::Idle);
    }

    #[tokio::test]
    async fn test_select_requires_loaded_list() {
        let session = ReviewSession::new(Arc::new(ScriptedGateway::default()));
        let err = session.select_document("a").await.unwrap_err();
        assert!(matches!(err, ReviewError::InvalidState(_)));
        assert_eq!(session.snapshot().phase(), Phase::Idle);
    }

    #[tokio::test]
    async fn test_select_and_clear() {
        let (gateway, session) = loaded_session(vec![summary("a", "NORMAL")]).await;
        let tx = gateway.script_detail("a");
        tx.send(Ok(detail("a", "Jane Doe"))).unwrap();

        assert_eq!(session.select_document("a").await.unwrap(), Completion::Applied);
        let snap = session.snapshot();
        assert_eq!(snap.phase(), Phase::DetailLoaded);
        assert_eq!(snap.detail().unwrap().display_name(), "Jane Doe");

        assert!(session.clear_selection());
        let snap = session.snapshot();
        assert_eq!(snap.phase(), Phase::ListLoaded);
        assert!(snap.detail().is_none());
        assert!(!session.clear_selection());

        // No cache: selecting again goes back to the gateway.
        gateway.script_detail("a").send(Ok(detail("a", "Jane Doe"))).unwrap();
        session.select_document("a").await.unwrap();
        assert_eq!(gateway.detail_calls(), vec!["a", "a"]);
    }

    #[tokio::test]
    async fn test_last_selection_wins() {
        let (gateway, session) =
            loaded_session(vec![summary("a", "NORMAL"), summary("b", "WARNING")]).await;
        let slow_a = gateway.script_detail("a");
        let fast_b = gateway.script_detail("b");

        let (a, b, _) = tokio::join!(
            session.select_document("a"),
            session.select_document("b"),
            async {
                tokio::task::yield_now().await;
                fast_b.send(Ok(detail("b", "Bob"))).unwrap();
                tokio::task::yield_now().await;
                // A's response arrives after B's; its receiver may already be gone.
                let _ = slow_a.send(Ok(detail("a", "Alice")));
            }
        );

        assert_eq!(a.unwrap(), Completion::Superseded);
        assert_eq!(b.unwrap(), Completion::Applied);
        let snap = session.snapshot();
        assert_eq!(snap.phase(), Phase::DetailLoaded);
        assert_eq!(snap.detail().unwrap().id(), "b");
        assert_eq!(snap.detail().unwrap().display_name(), "Bob");
    }

    #[tokio::test]
    async fn test_stale_response_is_discarded() {
        let (_, session) =
            loaded_session(vec![summary("a", "NORMAL"), summary("b", "NORMAL")]).await;

        let first = session.begin_detail("a").unwrap().unwrap();
        let second = session.begin_detail("b").unwrap().unwrap();
        assert!(second > first);

        assert_eq!(
            session.finish_detail(second, "b", Ok(detail("b", "Bob"))),
            Completion::Applied
        );
        assert_eq!(
            session.finish_detail(first, "a", Ok(detail("a", "Alice"))),
            Completion::Superseded
        );
        assert_eq!(session.snapshot().detail().unwrap().id(), "b");
    }

    #[tokio::test]
    async fn test_detail_error_keeps_list_and_hides_previous_detail() {
        let (gateway, session) =
            loaded_session(vec![summary("a", "NORMAL"), summary("b", "HIGH_RISK")]).await;
        gateway.script_detail("a").send(Ok(detail("a", "Alice"))).unwrap();
        session.select_document("a").await.unwrap();

        gateway
            .script_detail("b")
            .send(Err(ReviewError::Gateway("HTTP 500".to_string())))
            .unwrap();
        assert_eq!(session.select_document("b").await.unwrap(), Completion::Failed);

        let snap = session.snapshot();
        assert_eq!(snap.phase(), Phase::DetailError);
        assert_eq!(snap.selected_id(), Some("b"));
        assert!(snap.detail().is_none());
        assert_eq!(snap.documents().len(), 2);
        assert!(snap.detail_error().unwrap().contains("HTTP 500"));

        gateway.script_detail("b").send(Ok(detail("b", "Bob"))).unwrap();
        assert_eq!(session.retry().await.unwrap(), Some(Completion::Applied));
        assert_eq!(session.snapshot().detail().unwrap().id(), "b");
    }

    #[tokio::test]
    async fn test_unknown_id_is_detail_error() {
        let (gateway, session) = loaded_session(vec![summary("a", "NORMAL")]).await;
        assert_eq!(session.select_document("zzz").await.unwrap(), Completion::Failed);

        let snap = session.snapshot();
        assert_eq!(snap.phase(), Phase::DetailError);
        assert!(snap.detail_error().unwrap().contains("zzz"));
        assert!(gateway.detail_calls().is_empty());
    }

    #[tokio::test]
    async fn test_mismatched_detail_id_is_malformed() {
        let (gateway, session) = loaded_session(vec![summary("a", "NORMAL")]).await;
        gateway.script_detail("a").send(Ok(detail("other", "X"))).unwrap();

        assert_eq!(session.select_document("a").await.unwrap(), Completion::Failed);
        assert_eq!(session.snapshot().phase(), Phase::DetailError);
    }

    #[tokio::test]
    async fn test_clear_selection_drops_in_flight_detail() {
        let (gateway, session) = loaded_session(vec![summary("a", "NORMAL")]).await;
        let tx = gateway.script_detail("a");

        let (completion, _) = tokio::join!(session.select_document("a"), async {
            tokio::task::yield_now().await;
            assert_eq!(session.snapshot().phase(), Phase::DetailLoading);
            session.clear_selection();
            let _ = tx.send(Ok(detail("a", "Alice")));
        });

        assert_eq!(completion.unwrap(), Completion::Superseded);
        assert_eq!(session.snapshot().phase(), Phase::ListLoaded);
    }

    #[tokio::test]
    async fn test_reload_discards_selection() {
        let (gateway, session) = loaded_session(vec![summary("a", "NORMAL")]).await;
        gateway.script_detail("a").send(Ok(detail("a", "Alice"))).unwrap();
        session.select_document("a").await.unwrap();

        gateway.push_list(Ok(vec![summary("a", "WARNING")]));
        assert_eq!(session.reload_batch().await.unwrap(), Completion::Applied);
        let snap = session.snapshot();
        assert_eq!(snap.phase(), Phase::ListLoaded);
        assert_eq!(snap.documents()[0].score, "WARNING");
    }

    #[tokio::test]
    async fn test_subscribers_see_each_transition() {
        let (gateway, session) = loaded_session(vec![summary("a", "NORMAL")]).await;
        let mut rx = session.subscribe();
        rx.borrow_and_update();

        gateway.script_detail("a").send(Ok(detail("a", "Alice"))).unwrap();
        session.select_document("a").await.unwrap();

        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().phase(), Phase::DetailLoaded);
    }
}
