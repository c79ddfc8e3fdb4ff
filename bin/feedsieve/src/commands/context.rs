use feedsieve_client::{build_http_client, CookieSession, ReqwestTransport, SessionIdentity, Transport};
use feedsieve_core::{Config, Identity, Paths};
use feedsieve_filter::{
    shared_state, FilterController, GroupDirectory, InterceptedTransport, MembershipResolver, SharedFilterState,
};
use std::sync::Arc;
use tracing::debug;

/// Everything a command needs, wired from the config file.
pub struct AppContext {
    pub paths: Paths,
    pub config: Config,
    pub state: SharedFilterState,
    raw: Arc<dyn Transport>,
    session: Arc<CookieSession>,
}

impl AppContext {
    pub fn load(cookie_override: Option<String>) -> anyhow::Result<Self> {
        let paths = Paths::new();
        let mut config = Config::load_or_default(&paths)?;
        if let Some(cookie) = cookie_override {
            config.session.cookie = cookie;
        }
        debug!(config = %paths.config_file().display(), "Loaded configuration");

        let client = build_http_client(&config.network, &config.api.feed_url);
        let raw: Arc<dyn Transport> = Arc::new(ReqwestTransport::new(client, &config.session));
        let session = Arc::new(CookieSession::new(config.session.cookie.clone()));

        Ok(Self {
            paths,
            config,
            state: shared_state(),
            raw,
            session,
        })
    }

    pub fn user(&self) -> Option<Identity> {
        self.session.current_identity()
    }

    /// Bail out early with a readable message when no session is configured.
    pub fn require_login(&self) -> anyhow::Result<Identity> {
        self.user().ok_or_else(|| {
            anyhow::anyhow!(
                "No logged-in session: set session.cookie in {} or pass --cookie",
                self.paths.config_file().display()
            )
        })
    }

    pub fn resolver(&self) -> MembershipResolver {
        MembershipResolver::new(
            Arc::clone(&self.raw),
            self.session.clone(),
            self.state.clone(),
            &self.config.api,
            &self.config.members,
        )
    }

    pub fn controller(&self) -> FilterController {
        FilterController::new(self.state.clone(), self.resolver())
    }

    pub fn directory(&self) -> GroupDirectory {
        GroupDirectory::new(Arc::clone(&self.raw), &self.config.api)
    }

    pub fn intercepted(&self) -> InterceptedTransport {
        InterceptedTransport::from_config(Arc::clone(&self.raw), self.state.clone(), &self.config)
    }
}
