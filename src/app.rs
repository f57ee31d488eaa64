//! # Application: composition root.
//!
//! [`Application`] wires the pieces together: resolves the session account
//! from a token, builds the [`MarketApi`], owns the [`Bus`] and the
//! [`Scheduler`], and runs the start/stop choreography.
//!
//! ## Startup
//! ```text
//! connect(token, config)
//!   ├─ resolve Account from token
//!   ├─ invalid ─► publish ApplicationStopping(reason) ─► Err(InvalidSession)
//!   │             (no module is ever started)
//!   └─ valid ───► Application { api, bus, scheduler }
//!
//! start()
//!   ├─ scheduler.start()           (modules begin ticking)
//!   └─ publish ApplicationReady
//! ```
//!
//! ## Shutdown
//! `stop()` publishes a cancellable `ApplicationStopping`; a subscriber
//! veto aborts the shutdown. The invalid-session path publishes the same
//! event but proceeds regardless.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{error, info};

use crate::client::{HttpTransport, MarketApi, Transport};
use crate::config::Config;
use crate::domain::Account;
use crate::error::RuntimeError;
use crate::events::{Bus, Event};
use crate::modules::{
    ChatWatchModule, LotsRaiseModule, ModuleRef, OrderWatchModule, ReviewWatchModule, Scheduler,
};
use crate::shutdown::wait_for_shutdown_signal;

/// The wired-up automation client for one marketplace session.
pub struct Application {
    account: Account,
    api: Arc<MarketApi>,
    bus: Bus,
    scheduler: Scheduler,
}

impl Application {
    /// Resolves the session over a reqwest transport and wires the
    /// application.
    ///
    /// Fails with [`RuntimeError::InvalidSession`] when the token does not
    /// resolve to a valid account; a non-vetoed `ApplicationStopping` event
    /// is published first and no module is ever started.
    pub async fn connect(token: &str, config: Config) -> Result<Self, RuntimeError> {
        let transport = Arc::new(HttpTransport::new(&config.http)?);
        Self::with_transport(transport, token, config).await
    }

    /// Same as [`Application::connect`], over an injected transport.
    pub async fn with_transport(
        transport: Arc<dyn Transport>,
        token: &str,
        config: Config,
    ) -> Result<Self, RuntimeError> {
        let bus = Bus::new();

        let resolved = Account::from_token(transport.as_ref(), token).await;
        let account = match resolved {
            Ok(Some(account)) if account.is_valid() => account,
            Ok(_) => {
                return Self::refuse(&bus, "session token did not resolve to a valid account")
                    .await;
            }
            Err(err) => {
                return Self::refuse(&bus, &format!("session resolution failed: {err}")).await;
            }
        };
        info!(user_id = account.user_id, user = %account.username, "session resolved");

        let api = Arc::new(MarketApi::new(transport, account.clone()));
        let scheduler = Scheduler::new(config.tick_interval);

        Ok(Self {
            account,
            api,
            bus,
            scheduler,
        })
    }

    /// The fatal startup path: announce, shut the bus, fail.
    async fn refuse(bus: &Bus, reason: &str) -> Result<Self, RuntimeError> {
        error!(reason, "refusing to start");
        bus.publish(&Event::application_stopping(reason)).await;
        bus.shutdown();
        Err(RuntimeError::InvalidSession {
            reason: reason.to_string(),
        })
    }

    /// The resolved session account.
    pub fn account(&self) -> &Account {
        &self.account
    }

    /// The typed marketplace API this application polls through.
    pub fn api(&self) -> Arc<MarketApi> {
        Arc::clone(&self.api)
    }

    /// The event bus; subscribe handlers here.
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// The module scheduler.
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Registers the four built-in pollers.
    ///
    /// Returns the raise module handle so the host can configure
    /// categories, including after startup.
    pub async fn install_default_modules(
        &self,
    ) -> Result<Arc<Mutex<LotsRaiseModule>>, RuntimeError> {
        let raise = Arc::new(Mutex::new(LotsRaiseModule::new(
            self.api(),
            self.bus.clone(),
        )));
        self.scheduler.add(raise.clone() as ModuleRef).await?;
        self.add_module(Arc::new(Mutex::new(ChatWatchModule::new(
            self.api(),
            self.bus.clone(),
        ))))
        .await?;
        self.add_module(Arc::new(Mutex::new(OrderWatchModule::new(
            self.api(),
            self.bus.clone(),
        ))))
        .await?;
        self.add_module(Arc::new(Mutex::new(ReviewWatchModule::new(
            self.api(),
            self.bus.clone(),
        ))))
        .await?;
        Ok(raise)
    }

    /// Registers a host-provided module; usable before or after `start()`.
    pub async fn add_module(&self, module: ModuleRef) -> Result<(), RuntimeError> {
        self.scheduler.add(module).await
    }

    /// Stops and removes a module by name.
    pub async fn remove_module(&self, name: &str) -> Result<(), RuntimeError> {
        self.scheduler.remove(name).await
    }

    /// Starts the scheduler and announces readiness on the bus.
    pub async fn start(&self) {
        self.scheduler.start().await;
        self.bus
            .publish(&Event::application_ready(self.account.clone()))
            .await;
    }

    /// Runs until the process receives a termination signal, then stops.
    ///
    /// A subscriber veto of the resulting `ApplicationStopping` event is
    /// not honored on this path: the process is going down.
    pub async fn run(&self) -> Result<(), RuntimeError> {
        self.start().await;
        wait_for_shutdown_signal().await?;
        let event = Event::application_stopping("termination signal");
        self.bus.publish(&event).await;
        self.shutdown().await;
        Ok(())
    }

    /// Requests an orderly stop.
    ///
    /// Publishes a cancellable `ApplicationStopping`; returns `false`
    /// without stopping anything when a subscriber vetoes it. Otherwise
    /// stops the scheduler (running every module's `on_stop`) and shuts
    /// the bus down.
    pub async fn stop(&self) -> bool {
        let event = Event::application_stopping("stop requested");
        self.bus.publish(&event).await;
        if event.is_cancelled() {
            info!("stop vetoed by a subscriber");
            return false;
        }
        self.shutdown().await;
        true
    }

    async fn shutdown(&self) {
        self.scheduler.stop().await;
        self.bus.shutdown();
        info!("stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::testing::FakeTransport;
    use crate::events::{EventKind, FnHandler};
    use std::sync::atomic::{AtomicBool, Ordering};

    const LANDING: &str = concat!(
        r#"<body data-app-data="{&quot;userId&quot;:1184111,&quot;csrf-token&quot;:&quot;tok123&quot;}">"#,
        r#"<div class="user-link-name">seller42</div>"#,
    );

    #[tokio::test]
    async fn test_connect_resolves_a_valid_session() {
        let transport = FakeTransport::new();
        transport.on_get_response(
            "/",
            crate::client::Response {
                status: 200,
                body: LANDING.to_string(),
                set_cookies: vec!["PHPSESSID=abc123; path=/; HttpOnly".to_string()],
            },
        );

        let app = Application::with_transport(transport, "golden", Config::default())
            .await
            .unwrap();
        assert_eq!(app.account().user_id, 1184111);
        assert_eq!(app.account().session_id, "abc123");
        assert_eq!(app.account().csrf_token, "tok123");
        assert_eq!(app.account().username, "seller42");
    }

    #[tokio::test]
    async fn test_invalid_session_never_starts_modules() {
        let transport = FakeTransport::new();
        transport.on_get("/", "<body>logged out</body>");

        let err = Application::with_transport(transport, "dead-token", Config::default())
            .await
            .err()
            .unwrap();
        assert!(matches!(err, RuntimeError::InvalidSession { .. }));
    }

    #[tokio::test]
    async fn test_install_registers_the_four_pollers() {
        let transport = FakeTransport::new();
        transport.on_get_response(
            "/",
            crate::client::Response {
                status: 200,
                body: LANDING.to_string(),
                set_cookies: vec!["PHPSESSID=abc123".to_string()],
            },
        );

        let app = Application::with_transport(transport, "golden", Config::default())
            .await
            .unwrap();
        app.install_default_modules().await.unwrap();
        assert_eq!(
            app.scheduler().list().await,
            vec!["chat-watch", "lots-raise", "order-watch", "review-watch"]
        );
    }

    #[tokio::test]
    async fn test_stop_honors_a_veto() {
        let transport = FakeTransport::new();
        transport.on_get_response(
            "/",
            crate::client::Response {
                status: 200,
                body: LANDING.to_string(),
                set_cookies: vec!["PHPSESSID=abc123".to_string()],
            },
        );

        let app = Application::with_transport(transport, "golden", Config::default())
            .await
            .unwrap();

        let veto_armed = Arc::new(AtomicBool::new(true));
        let armed = Arc::clone(&veto_armed);
        app.bus().subscribe(
            EventKind::ApplicationStopping,
            FnHandler::arc("keepalive", move |ev: crate::events::Event| {
                let armed = Arc::clone(&armed);
                async move {
                    if armed.load(Ordering::SeqCst) {
                        ev.cancel();
                    }
                    Ok(())
                }
            }),
        );

        assert!(!app.stop().await, "armed veto must abort the stop");
        assert!(!app.bus().is_closed());

        veto_armed.store(false, Ordering::SeqCst);
        assert!(app.stop().await);
        assert!(app.bus().is_closed());
    }
}
