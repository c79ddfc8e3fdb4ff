use feedsieve_core::Identity;

/// Reads the logged-in user's identity from ambient session state.
pub trait SessionIdentity: Send + Sync {
    /// `None` when nobody is logged in.
    fn current_identity(&self) -> Option<Identity>;
}

const USER_ID_COOKIE: &str = "DedeUserID";

/// Session identity taken from a raw `Cookie` header string.
#[derive(Debug, Clone, Default)]
pub struct CookieSession {
    cookie: String,
}

impl CookieSession {
    pub fn new(cookie: impl Into<String>) -> Self {
        Self { cookie: cookie.into() }
    }

    /// Value of a single cookie, if present.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.cookie.split(';').find_map(|pair| {
            let (key, value) = pair.split_once('=')?;
            (key.trim() == name).then(|| value.trim())
        })
    }
}

impl SessionIdentity for CookieSession {
    fn current_identity(&self) -> Option<Identity> {
        self.get(USER_ID_COOKIE).and_then(Identity::new)
    }
}
