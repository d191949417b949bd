/// The signed-in user's credential.
///
/// Only two transitions exist: `login` after a successful sign-in and `clear`
/// when the API rejects the credential.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    token: Option<String>,
}

impl Session {
    pub fn new(token: Option<String>) -> Self {
        let mut session = Self::default();
        if let Some(token) = token {
            session.login(token);
        }
        session
    }

    pub fn login(&mut self, token: impl Into<String>) {
        let token = token.into();
        let token = token.trim();
        self.token = (!token.is_empty()).then(|| token.to_string());
    }

    pub fn clear(&mut self) {
        self.token = None;
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// `Authorization` header value, when signed in.
    pub fn authorization(&self) -> Option<String> {
        self.token.as_ref().map(|token| format!("Bearer {}", token))
    }
}
