//! Wiring of the session core, the adapters and the backend services.

use std::sync::Arc;

use anyhow::Context;
use procura_application::ErrorHandler;
use procura_application::api::{
    ApiClient, EmailService, InventoryService, LedgerService, OrderService, TaskService,
};
use procura_application::auth::{
    AuthGate, RefreshController, RequestPipeline, SessionService, TokenStore,
};
use procura_application::ports::{
    Clock, HttpClient, IdentityClient, LoginRedirect, Notifier, SessionStorage,
};
use procura_infrastructure::{AppConfig, KeycloakClient, ReqwestHttpClient, SystemClock};

/// Everything one interactive session needs.
pub struct Console {
    /// Effective configuration.
    pub config: AppConfig,
    /// The in-memory token.
    pub tokens: TokenStore,
    /// Identity provider client.
    pub identity: Arc<KeycloakClient>,
    /// Route guard.
    pub gate: AuthGate,
    /// Session facts, manual refresh and logout.
    pub session: Arc<SessionService>,
    /// 401 recovery, shared by every backend call.
    pub refresh: Arc<RefreshController>,
    /// Workflow tasks.
    pub tasks: TaskService,
    /// Purchase orders.
    pub orders: OrderService,
    /// Inventory.
    pub inventory: InventoryService,
    /// General ledger.
    pub ledger: LedgerService,
    /// PO email threads.
    pub emails: EmailService,
    /// Notices for failed calls.
    pub errors: ErrorHandler,
    /// Clock used for token status.
    pub clock: Arc<dyn Clock>,
}

impl Console {
    /// Builds the session from `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend base URL is unusable.
    pub fn build(
        config: AppConfig,
        redirect: Arc<dyn LoginRedirect>,
        notifier: Arc<dyn Notifier>,
        storage: Arc<dyn SessionStorage>,
    ) -> anyhow::Result<Self> {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock::new());
        let tokens = TokenStore::new();

        let identity = Arc::new(KeycloakClient::new(
            config.oidc_settings(),
            tokens.clone(),
            redirect,
            Arc::clone(&clock),
        ));
        let identity_port: Arc<dyn IdentityClient> = Arc::clone(&identity) as Arc<dyn IdentityClient>;

        let http: Arc<dyn HttpClient> = Arc::new(
            ReqwestHttpClient::new(&config.api_base_url, config.request_timeout())
                .with_context(|| format!("invalid api_base_url {}", config.api_base_url))?,
        );
        let refresh = Arc::new(RefreshController::new(
            Arc::clone(&identity_port),
            config.refresh_policy(),
            config.app_origin.clone(),
        ));
        let pipeline = Arc::new(RequestPipeline::new(
            http,
            tokens.clone(),
            Arc::clone(&refresh),
            config.pipeline_settings(),
        ));
        let client = ApiClient::new(pipeline);

        let session = Arc::new(SessionService::new(
            Arc::clone(&identity_port),
            tokens.clone(),
            storage,
            Arc::clone(&clock),
            config.app_origin.clone(),
            config.refresh.min_validity_secs,
        ));

        Ok(Self {
            gate: AuthGate::new(identity_port, config.app_origin.clone()),
            tasks: TaskService::new(client.clone(), config.task_api_prefix.clone()),
            orders: OrderService::new(client.clone()),
            inventory: InventoryService::new(client.clone()),
            ledger: LedgerService::new(client.clone()),
            emails: EmailService::new(client),
            errors: ErrorHandler::new(notifier),
            config,
            tokens,
            identity,
            session,
            refresh,
            clock,
        })
    }
}

impl std::fmt::Debug for Console {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Console")
            .field("api_base_url", &self.config.api_base_url)
            .field("app_origin", &self.config.app_origin)
            .finish_non_exhaustive()
    }
}
