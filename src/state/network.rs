use crate::state::messages::{NetworkRequest, NetworkResponse};
use chrono::Utc;
use log::{debug, error, info, warn};
use playoff_api::auth::{Session, SessionState, WatchAction, watch_action};
use playoff_api::client::{ApiError, PlayoffApi};
use playoff_api::store::{LoadRequest, fetch_snapshot};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;

const SPINNER_CHARS: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];
pub const ERROR_CHAR: char = '!';

#[derive(Debug, Copy, Clone)]
pub struct LoadingState {
    pub is_loading: bool,
    pub spinner_char: char,
}

impl Default for LoadingState {
    fn default() -> Self {
        Self { is_loading: false, spinner_char: ' ' }
    }
}

/// Serves network requests one at a time, so bracket responses arrive in the
/// order they were requested.
pub struct NetworkWorker {
    client: PlayoffApi,
    requests: mpsc::Receiver<NetworkRequest>,
    responses: mpsc::Sender<NetworkResponse>,
    is_loading: Arc<AtomicBool>,
    session: Option<Session>,
    session_state: SessionState,
}

impl NetworkWorker {
    pub fn new(
        client: PlayoffApi,
        requests: mpsc::Receiver<NetworkRequest>,
        responses: mpsc::Sender<NetworkResponse>,
    ) -> Self {
        Self {
            client,
            requests,
            responses,
            is_loading: Arc::new(AtomicBool::new(false)),
            session: None,
            session_state: SessionState::Idle,
        }
    }

    pub async fn run(mut self) {
        while let Some(request) = self.requests.recv().await {
            let response = match request {
                NetworkRequest::LoadBracket { request } => Some(self.with_spinner(request).await),
                NetworkRequest::Login { user_name, password } => {
                    Some(self.handle_login(&user_name, &password).await)
                }
                NetworkRequest::Logout => Some(self.handle_logout().await),
                NetworkRequest::CheckSession => self.handle_check_session().await,
            };

            let Some(response) = response else {
                continue;
            };

            if let Err(e) = self.responses.send(response).await {
                error!("Failed to send network response: {e}");
                break;
            }
        }
    }

    async fn with_spinner(&mut self, request: LoadRequest) -> NetworkResponse {
        self.start_loading_animation().await;
        let response = self.handle_load_bracket(request).await;
        debug!("network request complete");
        let is_ok = matches!(response, NetworkResponse::BracketLoaded { .. });
        self.stop_loading_animation(is_ok).await;
        response
    }

    async fn handle_load_bracket(&self, request: LoadRequest) -> NetworkResponse {
        match fetch_snapshot(&self.client, &request).await {
            Ok(snapshot) => NetworkResponse::BracketLoaded { snapshot },
            Err(e) => NetworkResponse::BracketLoadFailed { message: e.to_string() },
        }
    }

    async fn handle_login(&mut self, user_name: &str, password: &str) -> NetworkResponse {
        let result = match self.client.login(user_name, password).await {
            Ok(token) => Session::from_token(token),
            Err(e) => Err(e),
        };
        match result {
            Ok(session) => {
                info!("signed in as {}", session.user_name);
                self.client.set_access_token(Some(session.access_token.clone()));
                let user_name = Some(session.user_name.clone());
                self.session = Some(session);
                self.session_state = SessionState::Scheduled;
                NetworkResponse::SessionChanged { state: self.session_state, user_name }
            }
            Err(e) => NetworkResponse::Error { message: e.to_string() },
        }
    }

    async fn handle_logout(&mut self) -> NetworkResponse {
        if let Some(session) = &self.session
            && let Err(e) = self.client.logout(session.person_id).await
        {
            warn!("logout request failed: {e}");
        }
        self.clear_session(SessionState::Idle)
    }

    async fn handle_check_session(&mut self) -> Option<NetworkResponse> {
        let (expires_at, person_id) = self
            .session
            .as_ref()
            .map(|s| (s.expires_at, s.person_id))?;

        match watch_action(expires_at, Utc::now().timestamp()) {
            WatchAction::Wait => None,
            WatchAction::Refresh => {
                self.session_state = SessionState::Refreshing;
                let _ = self
                    .responses
                    .send(NetworkResponse::SessionChanged {
                        state: SessionState::Refreshing,
                        user_name: self.session.as_ref().map(|s| s.user_name.clone()),
                    })
                    .await;
                Some(self.refresh_session(person_id).await)
            }
            WatchAction::Expire => {
                warn!("session expired before it could be refreshed");
                let _ = self.client.logout(person_id).await;
                Some(self.clear_session(SessionState::Expired))
            }
        }
    }

    async fn refresh_session(&mut self, person_id: i64) -> NetworkResponse {
        let result = match self.client.refresh(person_id).await {
            Ok(token) => match self.session.as_mut() {
                Some(session) => session.renew(token),
                None => Err(ApiError::Auth("no session to refresh".into())),
            },
            Err(e) => Err(e),
        };

        // A failed refresh is retried on the next tick until the token runs out.
        self.session_state = SessionState::Scheduled;
        match result {
            Ok(()) => {
                debug!("session token refreshed");
                let token = self.session.as_ref().map(|s| s.access_token.clone());
                self.client.set_access_token(token);
                NetworkResponse::SessionChanged {
                    state: self.session_state,
                    user_name: self.session.as_ref().map(|s| s.user_name.clone()),
                }
            }
            Err(e) => NetworkResponse::Error { message: e.to_string() },
        }
    }

    fn clear_session(&mut self, state: SessionState) -> NetworkResponse {
        self.session = None;
        self.client.set_access_token(None);
        self.session_state = state;
        NetworkResponse::SessionChanged { state, user_name: None }
    }

    async fn start_loading_animation(&self) {
        self.is_loading.store(true, Ordering::Relaxed);

        let mut loading_state =
            LoadingState { is_loading: true, spinner_char: SPINNER_CHARS[0] };
        let _ = self
            .responses
            .send(NetworkResponse::LoadingStateChanged { loading_state })
            .await;

        let responses = self.responses.clone();
        let is_loading = self.is_loading.clone();

        tokio::spawn(async move {
            let mut spinner_index = 1;
            let mut interval = tokio::time::interval(Duration::from_millis(33));
            loop {
                interval.tick().await;
                if !is_loading.load(Ordering::Relaxed) {
                    break;
                }
                loading_state.spinner_char = SPINNER_CHARS[spinner_index];
                spinner_index = (spinner_index + 1) % SPINNER_CHARS.len();
                let _ = responses
                    .send(NetworkResponse::LoadingStateChanged { loading_state })
                    .await;
            }
        });
    }

    async fn stop_loading_animation(&self, is_ok: bool) {
        self.is_loading.store(false, Ordering::Relaxed);
        tokio::time::sleep(Duration::from_millis(15)).await;

        let spinner_char = if is_ok { ' ' } else { ERROR_CHAR };
        let _ = self
            .responses
            .send(NetworkResponse::LoadingStateChanged {
                loading_state: LoadingState { is_loading: false, spinner_char },
            })
            .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use playoff_api::SeasonType;

    /// Receive responses until one that isn't a spinner update.
    async fn next_response(rx: &mut mpsc::Receiver<NetworkResponse>) -> NetworkResponse {
        loop {
            match rx.recv().await.expect("worker is running") {
                NetworkResponse::LoadingStateChanged { .. } => continue,
                other => return other,
            }
        }
    }

    fn jwt(payload: &str) -> String {
        use base64::Engine;
        use base64::engine::general_purpose::URL_SAFE_NO_PAD;
        format!(
            "{}.{}.sig",
            URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#),
            URL_SAFE_NO_PAD.encode(payload)
        )
    }

    fn spawn_worker(server: &Server) -> (mpsc::Sender<NetworkRequest>, mpsc::Receiver<NetworkResponse>) {
        let (req_tx, req_rx) = mpsc::channel(16);
        let (resp_tx, resp_rx) = mpsc::channel(256);
        let worker = NetworkWorker::new(PlayoffApi::with_base_url(server.url()), req_rx, resp_tx);
        tokio::spawn(worker.run());
        (req_tx, resp_rx)
    }

    #[tokio::test]
    async fn repeated_loads_are_each_served() {
        let mut server = Server::new_async().await;
        let standings = server
            .mock("GET", "/standings")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("[]")
            .expect(2)
            .create_async()
            .await;
        let bracket = server
            .mock("GET", "/schedules/playoffBracket")
            .match_query(Matcher::UrlEncoded("week".into(), "2".into()))
            .with_status(200)
            .with_body(r#"{ "events": [ { "id": 1, "status": "Final" } ] }"#)
            .expect(2)
            .create_async()
            .await;

        let (tx, mut rx) = spawn_worker(&server);
        let request = LoadRequest::new(2024, SeasonType::Postseason, Some(2));
        tx.send(NetworkRequest::LoadBracket { request }).await.unwrap();
        match next_response(&mut rx).await {
            NetworkResponse::BracketLoaded { snapshot } => assert_eq!(snapshot.events.len(), 1),
            other => panic!("unexpected response {other:?}"),
        }

        tx.send(NetworkRequest::LoadBracket { request }).await.unwrap();
        assert!(matches!(next_response(&mut rx).await, NetworkResponse::BracketLoaded { .. }));

        standings.assert_async().await;
        bracket.assert_async().await;
    }

    #[tokio::test]
    async fn failed_load_is_reported_as_bracket_failure() {
        let mut server = Server::new_async().await;
        let _standings = server
            .mock("GET", "/standings")
            .match_query(Matcher::Any)
            .with_status(500)
            .create_async()
            .await;

        let (tx, mut rx) = spawn_worker(&server);
        let request = LoadRequest::new(2024, SeasonType::Postseason, None);
        tx.send(NetworkRequest::LoadBracket { request }).await.unwrap();
        assert!(matches!(
            next_response(&mut rx).await,
            NetworkResponse::BracketLoadFailed { .. }
        ));
    }

    #[tokio::test]
    async fn session_login_check_and_logout() {
        let mut server = Server::new_async().await;
        let far_future = Utc::now().timestamp() + 3_600;
        let token = jwt(&format!(r#"{{"sub":7,"userName":"coach","exp":{far_future}}}"#));
        let _login = server
            .mock("POST", "/auth/login")
            .with_status(200)
            .with_body(format!(r#"{{ "accessToken": "{token}" }}"#))
            .create_async()
            .await;
        let logout = server
            .mock("POST", "/auth/logout")
            .match_header("authorization", format!("Bearer {token}").as_str())
            .with_status(204)
            .create_async()
            .await;

        let (tx, mut rx) = spawn_worker(&server);
        tx.send(NetworkRequest::Login { user_name: "coach".into(), password: "pw".into() })
            .await
            .unwrap();
        match next_response(&mut rx).await {
            NetworkResponse::SessionChanged { state, user_name } => {
                assert_eq!(state, SessionState::Scheduled);
                assert_eq!(user_name.as_deref(), Some("coach"));
            }
            other => panic!("unexpected response {other:?}"),
        }

        // Far from expiry: the tick is silent, so the next response is the logout.
        tx.send(NetworkRequest::CheckSession).await.unwrap();
        tx.send(NetworkRequest::Logout).await.unwrap();
        match next_response(&mut rx).await {
            NetworkResponse::SessionChanged { state, user_name } => {
                assert_eq!(state, SessionState::Idle);
                assert!(user_name.is_none());
            }
            other => panic!("unexpected response {other:?}"),
        }
        logout.assert_async().await;
    }

    #[tokio::test]
    async fn near_expiry_tick_refreshes_token() {
        let mut server = Server::new_async().await;
        let soon = Utc::now().timestamp() + 30;
        let later = Utc::now().timestamp() + 3_600;
        let first = jwt(&format!(r#"{{"sub":7,"userName":"coach","exp":{soon}}}"#));
        let renewed = jwt(&format!(r#"{{"sub":7,"userName":"coach","exp":{later}}}"#));
        let _login = server
            .mock("POST", "/auth/login")
            .with_status(200)
            .with_body(format!(r#"{{ "accessToken": "{first}" }}"#))
            .create_async()
            .await;
        let refresh = server
            .mock("POST", "/auth/refresh")
            .match_body(Matcher::Json(serde_json::json!({ "personId": 7 })))
            .with_status(200)
            .with_body(format!(r#"{{ "accessToken": "{renewed}" }}"#))
            .create_async()
            .await;

        let (tx, mut rx) = spawn_worker(&server);
        tx.send(NetworkRequest::Login { user_name: "coach".into(), password: "pw".into() })
            .await
            .unwrap();
        let _ = next_response(&mut rx).await;

        tx.send(NetworkRequest::CheckSession).await.unwrap();
        let states: Vec<SessionState> = [next_response(&mut rx).await, next_response(&mut rx).await]
            .into_iter()
            .filter_map(|r| match r {
                NetworkResponse::SessionChanged { state, .. } => Some(state),
                _ => None,
            })
            .collect();
        assert_eq!(states, vec![SessionState::Refreshing, SessionState::Scheduled]);
        refresh.assert_async().await;
    }
}
