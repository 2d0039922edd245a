//! # Session Lifecycle Manager
//!
//! Owns the session handle and drives it through
//! `create → initialize → [use] → reset`.
//!
//! - `initialize` runs up to `max_retry_attempts` handshakes with linear
//!   backoff (`attempt × retry_base_delay`), none after the last attempt
//! - on success two background tasks start: the activity tracker and the
//!   liveness ping
//! - `reset` stops both tasks and drops all key material

use crate::adapters::SystemTimeSource;
use crate::algorithms::ServerHello;
use crate::application::channel::SecureChannel;
use crate::application::handshake::HandshakeEngine;
use crate::config::SessionConfig;
use crate::domain::{
    backoff_delay_ms, redact_id, ActivityEvent, SessionError, SessionSnapshot, SessionState,
    SharedSession,
};
use crate::ports::{
    FingerprintProvider, HttpRequest, HttpResponse, HttpTransport, SecureSessionApi, TimeSource,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, error, info, trace, warn};

/// Handles of the tasks started by a successful `initialize`.
#[derive(Default)]
struct BackgroundTasks {
    activity_tx: Option<mpsc::UnboundedSender<ActivityEvent>>,
    handles: Vec<JoinHandle<()>>,
}

impl BackgroundTasks {
    fn stop(&mut self) {
        self.activity_tx = None;
        for handle in self.handles.drain(..) {
            handle.abort();
        }
    }

    fn is_running(&self) -> bool {
        !self.handles.is_empty()
    }
}

/// Secure session manager - the public entry point.
pub struct SessionManager<T: HttpTransport + 'static, F: FingerprintProvider + 'static> {
    config: Arc<SessionConfig>,
    session: SharedSession,
    transport: Arc<T>,
    time: Arc<dyn TimeSource>,
    engine: HandshakeEngine<T, F>,
    channel: SecureChannel<T>,
    tasks: Mutex<BackgroundTasks>,
    /// Serializes handshakes.
    handshake_lock: tokio::sync::Mutex<()>,
}

impl<T: HttpTransport + 'static, F: FingerprintProvider + 'static> SessionManager<T, F> {
    /// Create a manager with the system clock.
    ///
    /// # Errors
    ///
    /// `Config` if the configuration fails validation.
    pub fn new(config: SessionConfig, transport: T, fingerprint: F) -> Result<Self, SessionError> {
        Self::with_parts(
            config,
            Arc::new(transport),
            Arc::new(fingerprint),
            Arc::new(SystemTimeSource),
        )
    }

    /// Create a manager from shared collaborators.
    pub fn with_parts(
        config: SessionConfig,
        transport: Arc<T>,
        fingerprint: Arc<F>,
        time: Arc<dyn TimeSource>,
    ) -> Result<Self, SessionError> {
        config.validate()?;
        let config = Arc::new(config);
        let session = SessionState::with_client_id(config.client_id.clone()).into_shared();
        let engine = HandshakeEngine::new(
            transport.clone(),
            fingerprint,
            config.clone(),
            time.clone(),
        );
        let channel = SecureChannel::new(session.clone(), transport.clone(), time.clone());

        Ok(Self {
            config,
            session,
            transport,
            time,
            engine,
            channel,
            tasks: Mutex::new(BackgroundTasks::default()),
            handshake_lock: tokio::sync::Mutex::new(()),
        })
    }

    /// Inject the client identifier the device assigned.
    pub fn set_client_id(&self, client_id: impl Into<String>) {
        self.session.write().client_id = Some(client_id.into());
    }

    /// The secure channel, for direct `seal`/`open`.
    pub fn channel(&self) -> &SecureChannel<T> {
        &self.channel
    }

    /// Shared session handle.
    pub fn session(&self) -> SharedSession {
        self.session.clone()
    }

    /// Active configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Whether the background tasks are running.
    pub fn background_running(&self) -> bool {
        self.tasks.lock().is_running()
    }

    async fn run_attempts(&self) -> bool {
        let max_attempts = self.config.max_retry_attempts;
        for attempt in 1..=max_attempts {
            match self.engine.perform(&self.session, attempt).await {
                Ok(()) => return true,
                Err(e) if !e.is_retryable() => {
                    error!("[secure-session] handshake aborted: {}", e);
                    return false;
                }
                Err(e) => {
                    warn!(
                        attempt,
                        max_attempts, "[secure-session] handshake attempt failed: {}", e
                    );
                    if let Some(delay) =
                        backoff_delay_ms(attempt, max_attempts, self.config.retry_base_delay_ms)
                    {
                        debug!("[secure-session] retrying in {} ms", delay);
                        tokio::time::sleep(Duration::from_millis(delay)).await;
                    }
                }
            }
        }
        false
    }

    fn start_background(&self) {
        let mut tasks = self.tasks.lock();
        tasks.stop();

        let (tx, mut rx) = mpsc::unbounded_channel::<ActivityEvent>();
        let session = self.session.clone();
        let time = self.time.clone();
        let tracker = tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                session.write().last_activity = Some(time.now_millis());
                trace!(?event, "[secure-session] activity");
            }
        });

        let session = self.session.clone();
        let transport = self.transport.clone();
        let path = self.config.activity_path.clone();
        let period = self.config.activity_interval();
        let keepalive = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let (client_id, established) = {
                    let state = session.read();
                    (state.client_id.clone().unwrap_or_default(), state.established)
                };
                let ping = HttpRequest::post(path.as_str())
                    .with_header("X-Client-ID", client_id)
                    .with_header("X-Secure-Session", established.to_string());
                match transport.send(ping).await {
                    Ok(resp) if resp.is_success() => {
                        trace!(established, "[secure-session] activity ping ok")
                    }
                    Ok(resp) => warn!(
                        status = resp.status,
                        "[secure-session] activity ping rejected"
                    ),
                    Err(e) => warn!("[secure-session] activity ping failed: {}", e),
                }
            }
        });

        tasks.activity_tx = Some(tx);
        tasks.handles = vec![tracker, keepalive];
    }
}

#[async_trait]
impl<T: HttpTransport + 'static, F: FingerprintProvider + 'static> SecureSessionApi
    for SessionManager<T, F>
{
    async fn initialize(&self) -> bool {
        let _guard = self.handshake_lock.lock().await;

        let client_id = self.session.read().client_id.clone();
        let Some(client_id) = client_id else {
            error!(
                "[secure-session] cannot initialize: {}",
                SessionError::MissingClientId
            );
            return false;
        };
        if self.channel.is_established() {
            debug!("[secure-session] already established");
            return true;
        }

        info!(
            client = %redact_id(&client_id),
            variant = %self.config.variant,
            "[secure-session] initializing secure session"
        );
        if self.run_attempts().await {
            self.start_background();
            true
        } else {
            error!(
                "[secure-session] secure session failed after {} attempts",
                self.config.max_retry_attempts
            );
            false
        }
    }

    async fn reinitialize(&self) -> bool {
        self.reset().await;
        self.initialize().await
    }

    async fn reset(&self) {
        let _guard = self.handshake_lock.lock().await;
        self.tasks.lock().stop();
        self.session.write().reset();
        info!("[secure-session] session reset");
    }

    fn is_initialized(&self) -> bool {
        self.channel.is_established()
    }

    fn snapshot(&self) -> SessionSnapshot {
        self.session.read().snapshot()
    }

    fn record_activity(&self, event: ActivityEvent) {
        let tasks = self.tasks.lock();
        match &tasks.activity_tx {
            Some(tx) => {
                if tx.send(event).is_err() {
                    debug!("[secure-session] activity tracker stopped");
                }
            }
            None => trace!(?event, "[secure-session] activity before initialization ignored"),
        }
    }

    async fn dispatch(&self, request: HttpRequest) -> Result<HttpResponse, SessionError> {
        self.channel.dispatch(request).await
    }

    async fn secure_fetch(&self, request: HttpRequest) -> Result<HttpResponse, SessionError> {
        self.channel
            .secure_fetch(request, &self.config.secure_endpoints)
            .await
    }

    async fn hello(&self) -> Result<ServerHello, SessionError> {
        let request = HttpRequest::get(self.config.hello_path.as_str());
        let response = tokio::time::timeout(
            self.config.handshake_timeout(),
            self.transport.send(request),
        )
        .await
        .map_err(|_| SessionError::Timeout(self.config.handshake_timeout_ms))??
        .error_for_status()?;
        response.parse_json()
    }
}

impl<T: HttpTransport + 'static, F: FingerprintProvider + 'static> Drop for SessionManager<T, F> {
    fn drop(&mut self) {
        self.tasks.lock().stop();
    }
}
