use serde::Deserialize;

/// Session obtained from `access/ticket`.
#[derive(Clone, Deserialize)]
pub(crate) struct Ticket {
    ticket: String,
    #[serde(rename = "CSRFPreventionToken")]
    csrf: String,
}

impl Ticket {
    pub(crate) const CSRF_HEADER: &'static str = "CSRFPreventionToken";

    #[cfg(test)]
    pub(crate) fn new(ticket: impl Into<String>, csrf: impl Into<String>) -> Self {
        Self {
            ticket: ticket.into(),
            csrf: csrf.into(),
        }
    }

    /// `Cookie` header value. The ticket contains `:` and `=`, which are
    /// escaped for the cookie.
    pub(crate) fn cookie(&self) -> String {
        let escaped = self.ticket.replace(':', "%3A").replace('=', "%3D");
        format!("PVEAuthCookie={escaped}")
    }

    pub(crate) fn csrf(&self) -> &str {
        &self.csrf
    }
}

impl std::fmt::Debug for Ticket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Ticket(<redacted>)")
    }
}
