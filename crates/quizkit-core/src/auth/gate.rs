//! Single-flight token refresh in front of the HTTP transport.
//!
//! Every authenticated call goes through [`RefreshGate::request`]. When the
//! API answers 401 the gate renews the access token exactly once, no matter
//! how many calls failed at the same time: the first caller becomes the
//! leader and calls the refresh endpoint, later callers queue behind it and
//! receive the leader's outcome. Each call is then replayed once with the new
//! token. A failed refresh ends the session: the credential is dropped, every
//! queued caller gets the same error, and the teardown hook runs once.

use std::mem;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use reqwest::StatusCode;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use super::token::TokenResponse;
use super::{AccessToken, SessionTeardown};
use crate::api::{ApiError, ApiRequest, ApiResponse, Transport};

/// Shared result of one refresh, handed to every queued caller
type Outcome = Result<AccessToken, Arc<ApiError>>;

struct GateState {
    credential: Option<AccessToken>,
    refreshing: bool,
    waiters: Vec<oneshot::Sender<Outcome>>,
    /// Why the session ended, until a new credential is set
    ended: Option<Arc<ApiError>>,
}

/// What a caller that saw a 401 has to do next
enum Renewal {
    /// No refresh in flight: this caller performs it
    Lead,
    /// A refresh is in flight: wait for its outcome
    Wait(oneshot::Receiver<Outcome>),
    /// The token was already replaced since the request was sent
    Reuse(AccessToken),
    /// The session ended since the request was sent
    Ended(Option<Arc<ApiError>>),
}

pub struct RefreshGate {
    transport: Arc<dyn Transport>,
    refresh: ApiRequest,
    teardown: Arc<dyn SessionTeardown>,
    // Never held across an await
    state: Mutex<GateState>,
}

impl RefreshGate {
    /// `refresh` describes the call that exchanges the server-held refresh
    /// cookie for a new access token.
    pub fn new(
        transport: Arc<dyn Transport>,
        mut refresh: ApiRequest,
        teardown: Arc<dyn SessionTeardown>,
    ) -> Self {
        refresh.strip_authorization();
        Self {
            transport,
            refresh,
            teardown,
            state: Mutex::new(GateState {
                credential: None,
                refreshing: false,
                waiters: Vec::new(),
                ended: None,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, GateState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn credential(&self) -> Option<AccessToken> {
        self.lock().credential.clone()
    }

    pub fn set_credential(&self, token: AccessToken) {
        let mut state = self.lock();
        state.credential = Some(token);
        state.ended = None;
    }

    pub fn clear_credential(&self) {
        let mut state = self.lock();
        state.credential = None;
        state.ended = None;
    }

    pub fn is_refreshing(&self) -> bool {
        self.lock().refreshing
    }

    /// Number of callers waiting on the refresh in flight
    pub fn queued(&self) -> usize {
        self.lock().waiters.len()
    }

    /// Whether `request` targets the refresh endpoint itself
    pub fn is_refresh_call(&self, request: &ApiRequest) -> bool {
        request.path == self.refresh.path
    }

    /// Send `request` with the current credential attached, renewing the
    /// credential and replaying once if the API answers 401.
    pub async fn request(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        if request.is_public() {
            let mut request = request;
            request.strip_authorization();
            return self.transport.send(&request).await?.into_result();
        }
        if self.is_refresh_call(&request) {
            return self.direct_refresh(request).await;
        }

        let sent_with = self.credential();
        let response = self.send_with(&request, sent_with.as_ref()).await?;
        if response.status != StatusCode::UNAUTHORIZED {
            return response.into_result();
        }
        if request.is_retried() {
            debug!(path = %request.path, "Replayed request rejected again");
            return Err(ApiError::Unauthorized);
        }
        if !request.is_renewable() {
            return Err(ApiError::Unauthorized);
        }

        debug!(path = %request.path, "Access token rejected, renewing");
        let token = self.renew(sent_with.as_ref(), false).await?;
        let replay = request.retried();
        self.send_with(&replay, Some(&token)).await?.into_result()
    }

    /// Force a refresh now, joining one already in flight.
    /// Used to restore a session from the refresh cookie alone.
    pub async fn refresh(&self) -> Result<AccessToken, ApiError> {
        self.renew(None, true).await
    }

    async fn send_with(
        &self,
        request: &ApiRequest,
        token: Option<&AccessToken>,
    ) -> Result<ApiResponse, ApiError> {
        let mut request = request.clone();
        match token {
            Some(token) => request.authorize(token)?,
            None => request.strip_authorization(),
        }
        self.transport.send(&request).await
    }

    async fn renew(&self, stale: Option<&AccessToken>, force: bool) -> Result<AccessToken, ApiError> {
        let step = {
            let mut state = self.lock();
            if state.refreshing {
                let (tx, rx) = oneshot::channel();
                state.waiters.push(tx);
                Renewal::Wait(rx)
            } else if !force && stale.is_some() && state.credential.is_none() {
                // Rejected after the session was already torn down
                Renewal::Ended(state.ended.clone())
            } else {
                let renewed = state
                    .credential
                    .as_ref()
                    .filter(|current| !force && !stale.is_some_and(|sent| sent.same_as(current)))
                    .cloned();
                match renewed {
                    Some(token) => Renewal::Reuse(token),
                    None => {
                        state.refreshing = true;
                        Renewal::Lead
                    }
                }
            }
        };

        match step {
            Renewal::Lead => {
                let (token, _) = self.lead_refresh(&self.refresh).await?;
                Ok(token)
            }
            Renewal::Wait(rx) => Self::join_refresh(rx).await,
            Renewal::Reuse(token) => {
                debug!("Access token already renewed, replaying");
                Ok(token)
            }
            Renewal::Ended(Some(cause)) => Err(ApiError::SessionExpired(cause)),
            Renewal::Ended(None) => Err(ApiError::Unauthorized),
        }
    }

    async fn join_refresh(rx: oneshot::Receiver<Outcome>) -> Result<AccessToken, ApiError> {
        match rx.await {
            Ok(Ok(token)) => Ok(token),
            Ok(Err(cause)) => Err(ApiError::SessionExpired(cause)),
            Err(_) => Err(ApiError::RefreshAbandoned),
        }
    }

    /// Run `request` as the one refresh in flight. The caller has already
    /// set the in-flight flag.
    async fn lead_refresh(&self, request: &ApiRequest) -> Result<(AccessToken, ApiResponse), ApiError> {
        let in_flight = InFlight { gate: self, settled: false };

        match self.call_refresh(request).await {
            Ok((token, response)) => {
                let woken = in_flight.settle(&Ok(token.clone()));
                info!(queued = woken, "Access token refreshed");
                Ok((token, response))
            }
            Err(e) => {
                let cause = Arc::new(e);
                let woken = in_flight.settle(&Err(Arc::clone(&cause)));
                warn!(queued = woken, error = %cause, "Token refresh failed, ending session");
                self.teardown.on_session_expired();
                Err(ApiError::SessionExpired(cause))
            }
        }
    }

    async fn call_refresh(&self, request: &ApiRequest) -> Result<(AccessToken, ApiResponse), ApiError> {
        debug!(path = %request.path, "Calling refresh endpoint");
        let response = self.transport.send(request).await?.into_result()?;
        let body: TokenResponse = response.json()?;
        Ok((AccessToken::new(body.access_token), response))
    }

    /// A caller sent the refresh request itself. It is never retried, but it
    /// still counts as the refresh in flight: it either leads, or joins the
    /// one already running.
    async fn direct_refresh(&self, mut request: ApiRequest) -> Result<ApiResponse, ApiError> {
        request.strip_authorization();
        let joining = {
            let mut state = self.lock();
            if state.refreshing {
                let (tx, rx) = oneshot::channel();
                state.waiters.push(tx);
                Some(rx)
            } else {
                state.refreshing = true;
                None
            }
        };

        match joining {
            Some(rx) => {
                debug!("Refresh already in flight, joining it");
                let token = Self::join_refresh(rx).await?;
                let body = serde_json::json!({ "accessToken": token.as_str() });
                Ok(ApiResponse::new(StatusCode::OK, body.to_string()))
            }
            None => {
                let (_, response) = self.lead_refresh(&request).await?;
                Ok(response)
            }
        }
    }

    /// Store the outcome, clear the in-flight flag and wake every queued
    /// caller in arrival order. Returns how many were woken.
    fn settle(&self, outcome: &Outcome) -> usize {
        let waiters = {
            let mut state = self.lock();
            state.refreshing = false;
            state.credential = outcome.as_ref().ok().cloned();
            state.ended = outcome.as_ref().err().cloned();
            mem::take(&mut state.waiters)
        };
        let woken = waiters.len();
        for waiter in waiters {
            // Receiver gone means that caller was dropped; nothing to deliver
            let _ = waiter.send(outcome.clone());
        }
        woken
    }

    /// The leader was dropped mid-refresh. Dropping the senders rejects the
    /// queued callers with `RefreshAbandoned`.
    fn abandon(&self) {
        let waiters = {
            let mut state = self.lock();
            state.refreshing = false;
            mem::take(&mut state.waiters)
        };
        warn!(queued = waiters.len(), "Token refresh abandoned");
    }
}

/// Clears the in-flight flag even if the leading future is dropped
struct InFlight<'a> {
    gate: &'a RefreshGate,
    settled: bool,
}

impl InFlight<'_> {
    fn settle(mut self, outcome: &Outcome) -> usize {
        self.settled = true;
        self.gate.settle(outcome)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.gate.abandon();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use futures::future::BoxFuture;
    use futures::FutureExt;
    use reqwest::header::AUTHORIZATION;
    use tokio::sync::Notify;

    use super::*;

    const REFRESH_PATH: &str = "/auth/refresh";

    /// Answers 401 unless the request carries `Bearer <fresh>`.
    struct ScriptedTransport {
        fresh: String,
        refresh_status: StatusCode,
        hold_refresh: bool,
        always_unauthorized: bool,
        release: Notify,
        refresh_calls: AtomicUsize,
        sent: Mutex<Vec<(String, Option<String>)>>,
    }

    impl ScriptedTransport {
        fn new(refresh_status: StatusCode) -> Self {
            Self {
                fresh: "fresh".to_string(),
                refresh_status,
                hold_refresh: false,
                always_unauthorized: false,
                release: Notify::new(),
                refresh_calls: AtomicUsize::new(0),
                sent: Mutex::new(Vec::new()),
            }
        }

        fn holding(mut self) -> Self {
            self.hold_refresh = true;
            self
        }

        fn refresh_calls(&self) -> usize {
            self.refresh_calls.load(Ordering::SeqCst)
        }

        /// Authorization headers seen on non-refresh requests
        fn auth_headers(&self) -> Vec<Option<String>> {
            self.sent
                .lock()
                .unwrap()
                .iter()
                .filter(|(path, _)| path != REFRESH_PATH)
                .map(|(_, auth)| auth.clone())
                .collect()
        }
    }

    impl Transport for ScriptedTransport {
        fn send<'a>(&'a self, request: &'a ApiRequest) -> BoxFuture<'a, Result<ApiResponse, ApiError>> {
            async move {
                let auth = request
                    .headers
                    .get(AUTHORIZATION)
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string);
                self.sent.lock().unwrap().push((request.path.clone(), auth.clone()));

                if request.path == REFRESH_PATH {
                    self.refresh_calls.fetch_add(1, Ordering::SeqCst);
                    if self.hold_refresh {
                        self.release.notified().await;
                    }
                    if self.refresh_status.is_success() {
                        let body = format!(r#"{{"accessToken":"{}"}}"#, self.fresh);
                        return Ok(ApiResponse::new(self.refresh_status, body));
                    }
                    return Ok(ApiResponse::new(self.refresh_status, "refresh cookie revoked"));
                }
                if request.path == "/missing" {
                    return Ok(ApiResponse::new(StatusCode::NOT_FOUND, "no such quiz"));
                }

                let expected = format!("Bearer {}", self.fresh);
                if !self.always_unauthorized && auth.as_deref() == Some(expected.as_str()) {
                    Ok(ApiResponse::new(StatusCode::OK, format!(r#"{{"path":"{}"}}"#, request.path)))
                } else {
                    Ok(ApiResponse::new(StatusCode::UNAUTHORIZED, "jwt expired"))
                }
            }
            .boxed()
        }
    }

    fn gate_for(transport: &Arc<ScriptedTransport>, teardowns: &Arc<AtomicUsize>) -> RefreshGate {
        let counter = Arc::clone(teardowns);
        let teardown = move || {
            counter.fetch_add(1, Ordering::SeqCst);
        };
        let gate = RefreshGate::new(
            Arc::clone(transport) as Arc<dyn Transport>,
            ApiRequest::post(REFRESH_PATH),
            Arc::new(teardown),
        );
        gate.set_credential(AccessToken::new("stale"));
        gate
    }

    #[tokio::test]
    async fn test_concurrent_401s_share_one_refresh() {
        let transport = Arc::new(ScriptedTransport::new(StatusCode::OK).holding());
        let teardowns = Arc::new(AtomicUsize::new(0));
        let gate = gate_for(&transport, &teardowns);

        let release = async {
            while gate.queued() < 2 {
                tokio::task::yield_now().await;
            }
            transport.release.notify_one();
        };
        let (quizzes, teams, board, ()) = tokio::join!(
            gate.request(ApiRequest::get("/quizzes")),
            gate.request(ApiRequest::get("/teams")),
            gate.request(ApiRequest::get("/leaderboard")),
            release,
        );

        assert_eq!(quizzes.unwrap().body, r#"{"path":"/quizzes"}"#);
        assert_eq!(teams.unwrap().body, r#"{"path":"/teams"}"#);
        assert_eq!(board.unwrap().body, r#"{"path":"/leaderboard"}"#);
        assert_eq!(transport.refresh_calls(), 1);
        assert_eq!(gate.credential().unwrap().as_str(), "fresh");
        assert!(!gate.is_refreshing());
        assert_eq!(gate.queued(), 0);
        assert_eq!(teardowns.load(Ordering::SeqCst), 0);

        // Three stale attempts, then three replays with the renewed token
        let headers = transport.auth_headers();
        let replays = headers.iter().filter(|h| h.as_deref() == Some("Bearer fresh")).count();
        let stale = headers.iter().filter(|h| h.as_deref() == Some("Bearer stale")).count();
        assert_eq!((stale, replays), (3, 3));
    }

    #[tokio::test]
    async fn test_refresh_403_rejects_everyone_and_tears_down_once() {
        let transport = Arc::new(ScriptedTransport::new(StatusCode::FORBIDDEN).holding());
        let teardowns = Arc::new(AtomicUsize::new(0));
        let gate = gate_for(&transport, &teardowns);

        let release = async {
            while gate.queued() < 2 {
                tokio::task::yield_now().await;
            }
            transport.release.notify_one();
        };
        let (a, b, c, ()) = tokio::join!(
            gate.request(ApiRequest::get("/quizzes")),
            gate.request(ApiRequest::get("/teams")),
            gate.request(ApiRequest::get("/analytics/me")),
            release,
        );

        let causes: Vec<Arc<ApiError>> = [a, b, c]
            .into_iter()
            .map(|result| match result {
                Err(ApiError::SessionExpired(cause)) => cause,
                other => panic!("expected SessionExpired, got {:?}", other),
            })
            .collect();
        for cause in &causes {
            assert!(matches!(**cause, ApiError::AccessDenied(ref msg) if msg == "refresh cookie revoked"));
            assert!(Arc::ptr_eq(cause, &causes[0]));
        }

        assert_eq!(transport.refresh_calls(), 1);
        assert_eq!(teardowns.load(Ordering::SeqCst), 1);
        assert!(gate.credential().is_none());
        assert!(!gate.is_refreshing());
    }

    #[tokio::test]
    async fn test_late_401_after_failed_refresh_does_not_refresh_again() {
        let transport = Arc::new(ScriptedTransport::new(StatusCode::FORBIDDEN));
        let teardowns = Arc::new(AtomicUsize::new(0));
        let gate = gate_for(&transport, &teardowns);

        let first = gate.request(ApiRequest::get("/quizzes")).await;
        // Sent with the old token before the refresh failed, answered after
        let late = gate.renew(Some(&AccessToken::new("stale")), false).await;

        let (Err(ApiError::SessionExpired(first)), Err(ApiError::SessionExpired(late))) = (first, late) else {
            panic!("expected both callers to see the expired session");
        };
        assert!(Arc::ptr_eq(&first, &late));
        assert_eq!(transport.refresh_calls(), 1);
        assert_eq!(teardowns.load(Ordering::SeqCst), 1);

        // A new login starts over
        gate.set_credential(AccessToken::new("fresh"));
        assert!(gate.request(ApiRequest::get("/quizzes")).await.is_ok());
    }

    #[tokio::test]
    async fn test_retried_request_does_not_refresh_again() {
        let transport = Arc::new(ScriptedTransport::new(StatusCode::OK));
        let teardowns = Arc::new(AtomicUsize::new(0));
        let gate = gate_for(&transport, &teardowns);

        let result = gate.request(ApiRequest::get("/quizzes").retried()).await;

        assert!(matches!(result, Err(ApiError::Unauthorized)));
        assert_eq!(transport.refresh_calls(), 0);
        assert_eq!(gate.credential().unwrap().as_str(), "stale");
    }

    #[tokio::test]
    async fn test_replay_rejected_again_propagates() {
        let mut scripted = ScriptedTransport::new(StatusCode::OK);
        scripted.always_unauthorized = true;
        let transport = Arc::new(scripted);
        let teardowns = Arc::new(AtomicUsize::new(0));
        let gate = gate_for(&transport, &teardowns);

        let result = gate.request(ApiRequest::get("/quizzes")).await;

        assert!(matches!(result, Err(ApiError::Unauthorized)));
        assert_eq!(transport.refresh_calls(), 1);
        assert_eq!(transport.auth_headers().len(), 2);
        assert_eq!(teardowns.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_refresh_call_never_queues_or_retries() {
        let transport = Arc::new(ScriptedTransport::new(StatusCode::UNAUTHORIZED));
        let teardowns = Arc::new(AtomicUsize::new(0));
        let gate = gate_for(&transport, &teardowns);

        let result = gate.request(ApiRequest::post(REFRESH_PATH)).await;

        assert!(matches!(result, Err(ApiError::SessionExpired(ref cause)) if matches!(**cause, ApiError::Unauthorized)));
        assert_eq!(transport.refresh_calls(), 1);
        assert_eq!(teardowns.load(Ordering::SeqCst), 1);
        assert!(gate.credential().is_none());
        assert!(!gate.is_refreshing());
    }

    #[tokio::test]
    async fn test_refresh_call_success_adopts_token() {
        let transport = Arc::new(ScriptedTransport::new(StatusCode::OK));
        let teardowns = Arc::new(AtomicUsize::new(0));
        let gate = gate_for(&transport, &teardowns);

        let response = gate.request(ApiRequest::post(REFRESH_PATH)).await.unwrap();

        assert!(response.is_success());
        assert_eq!(gate.credential().unwrap().as_str(), "fresh");
        // Sent without the stale bearer
        let sent = transport.sent.lock().unwrap();
        assert_eq!(sent[0], (REFRESH_PATH.to_string(), None));
    }

    #[tokio::test]
    async fn test_refresh_call_joins_refresh_in_flight() {
        let transport = Arc::new(ScriptedTransport::new(StatusCode::OK).holding());
        let teardowns = Arc::new(AtomicUsize::new(0));
        let gate = gate_for(&transport, &teardowns);

        let direct = async {
            while !gate.is_refreshing() {
                tokio::task::yield_now().await;
            }
            gate.request(ApiRequest::post(REFRESH_PATH)).await
        };
        let release = async {
            while gate.queued() < 1 {
                tokio::task::yield_now().await;
            }
            transport.release.notify_one();
        };
        let (quizzes, direct, ()) = tokio::join!(gate.request(ApiRequest::get("/quizzes")), direct, release);

        assert!(quizzes.is_ok());
        let direct = direct.unwrap();
        assert!(direct.is_success());
        assert_eq!(direct.json::<TokenResponse>().unwrap().access_token, "fresh");
        assert_eq!(transport.refresh_calls(), 1);
        assert_eq!(gate.credential().unwrap().as_str(), "fresh");
        assert!(!gate.is_refreshing());
    }

    #[tokio::test]
    async fn test_refresh_call_leads_queued_callers() {
        let transport = Arc::new(ScriptedTransport::new(StatusCode::OK).holding());
        let teardowns = Arc::new(AtomicUsize::new(0));
        let gate = gate_for(&transport, &teardowns);

        let mut direct = Box::pin(gate.request(ApiRequest::post(REFRESH_PATH)));
        assert!(futures::poll!(direct.as_mut()).is_pending());
        assert!(gate.is_refreshing());

        // Expired while the direct refresh is running: waits for it
        let mut quizzes = Box::pin(gate.request(ApiRequest::get("/quizzes")));
        assert!(futures::poll!(quizzes.as_mut()).is_pending());
        assert_eq!(gate.queued(), 1);

        transport.release.notify_one();
        assert!(direct.await.unwrap().is_success());
        assert!(quizzes.await.is_ok());
        assert_eq!(transport.refresh_calls(), 1);
    }

    #[test]
    fn test_settle_resolves_every_waiter_before_returning() {
        let transport = Arc::new(ScriptedTransport::new(StatusCode::OK));
        let teardowns = Arc::new(AtomicUsize::new(0));
        let gate = gate_for(&transport, &teardowns);

        let (first_tx, mut first_rx) = oneshot::channel();
        let (second_tx, mut second_rx) = oneshot::channel();
        {
            let mut state = gate.lock();
            state.refreshing = true;
            state.waiters.push(first_tx);
            state.waiters.push(second_tx);
        }

        let woken = gate.settle(&Ok(AccessToken::new("fresh")));

        // Both outcomes are delivered inside settle, before any replay can run
        assert_eq!(woken, 2);
        assert_eq!(first_rx.try_recv().unwrap().unwrap().as_str(), "fresh");
        assert_eq!(second_rx.try_recv().unwrap().unwrap().as_str(), "fresh");
        assert!(!gate.is_refreshing());
        assert_eq!(gate.queued(), 0);
    }

    #[tokio::test]
    async fn test_non_renewable_request_returns_401() {
        let transport = Arc::new(ScriptedTransport::new(StatusCode::FORBIDDEN));
        let teardowns = Arc::new(AtomicUsize::new(0));
        let gate = gate_for(&transport, &teardowns);

        let result = gate.request(ApiRequest::post("/auth/logout").without_renewal()).await;

        assert!(matches!(result, Err(ApiError::Unauthorized)));
        assert_eq!(transport.refresh_calls(), 0);
        assert_eq!(teardowns.load(Ordering::SeqCst), 0);
        assert_eq!(transport.auth_headers(), vec![Some("Bearer stale".to_string())]);
    }

    #[tokio::test]
    async fn test_other_errors_pass_through() {
        let transport = Arc::new(ScriptedTransport::new(StatusCode::OK));
        let teardowns = Arc::new(AtomicUsize::new(0));
        let gate = gate_for(&transport, &teardowns);

        let result = gate.request(ApiRequest::get("/missing")).await;

        assert!(matches!(result, Err(ApiError::NotFound(ref msg)) if msg == "no such quiz"));
        assert_eq!(transport.refresh_calls(), 0);
    }

    #[tokio::test]
    async fn test_public_request_skips_credential_and_refresh() {
        let transport = Arc::new(ScriptedTransport::new(StatusCode::OK));
        let teardowns = Arc::new(AtomicUsize::new(0));
        let gate = gate_for(&transport, &teardowns);

        let result = gate.request(ApiRequest::post("/auth/login").public()).await;

        assert!(matches!(result, Err(ApiError::Unauthorized)));
        assert_eq!(transport.refresh_calls(), 0);
        assert_eq!(transport.auth_headers(), vec![None]);
        assert_eq!(teardowns.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_stale_401_reuses_renewed_token() {
        let transport = Arc::new(ScriptedTransport::new(StatusCode::OK));
        let teardowns = Arc::new(AtomicUsize::new(0));
        let gate = gate_for(&transport, &teardowns);
        gate.set_credential(AccessToken::new("fresh"));

        let token = gate.renew(Some(&AccessToken::new("stale")), false).await.unwrap();

        assert_eq!(token.as_str(), "fresh");
        assert_eq!(transport.refresh_calls(), 0);
    }

    #[tokio::test]
    async fn test_forced_refresh_ignores_current_token() {
        let transport = Arc::new(ScriptedTransport::new(StatusCode::OK));
        let teardowns = Arc::new(AtomicUsize::new(0));
        let gate = gate_for(&transport, &teardowns);

        let token = gate.refresh().await.unwrap();

        assert_eq!(token.as_str(), "fresh");
        assert_eq!(transport.refresh_calls(), 1);
    }

    #[tokio::test]
    async fn test_dropped_leader_releases_waiters() {
        let transport = Arc::new(ScriptedTransport::new(StatusCode::OK).holding());
        let teardowns = Arc::new(AtomicUsize::new(0));
        let gate = gate_for(&transport, &teardowns);

        let mut leader = Box::pin(gate.request(ApiRequest::get("/quizzes")));
        assert!(futures::poll!(leader.as_mut()).is_pending());
        assert!(gate.is_refreshing());

        let mut follower = Box::pin(gate.request(ApiRequest::get("/teams")));
        assert!(futures::poll!(follower.as_mut()).is_pending());
        assert_eq!(gate.queued(), 1);

        drop(leader);

        assert!(matches!(follower.await, Err(ApiError::RefreshAbandoned)));
        assert!(!gate.is_refreshing());
        assert_eq!(teardowns.load(Ordering::SeqCst), 0);
        assert_eq!(gate.credential().unwrap().as_str(), "stale");
    }
}
