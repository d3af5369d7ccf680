use sessionlog_types::SessionResource;
use std::fmt;
use std::sync::Arc;

type ScopePredicate = Arc<dyn Fn(&SessionResource) -> bool + Send + Sync>;

/// Which sessions the log records.
///
/// Sessions outside the scope are dropped silently at `log` and
/// `invoke_providers` entry.
#[derive(Clone)]
pub enum SessionScope {
    Any,
    Schemes(Vec<String>),
    Custom(ScopePredicate),
}

impl SessionScope {
    /// Scope admitting the given schemes; an empty list admits everything.
    pub fn from_schemes(schemes: &[String]) -> Self {
        if schemes.is_empty() {
            SessionScope::Any
        } else {
            SessionScope::Schemes(schemes.to_vec())
        }
    }

    pub fn custom<F>(predicate: F) -> Self
    where
        F: Fn(&SessionResource) -> bool + Send + Sync + 'static,
    {
        SessionScope::Custom(Arc::new(predicate))
    }

    pub fn admits(&self, session: &SessionResource) -> bool {
        match self {
            SessionScope::Any => true,
            SessionScope::Schemes(schemes) => session
                .scheme()
                .is_some_and(|scheme| schemes.iter().any(|allowed| allowed == scheme)),
            SessionScope::Custom(predicate) => predicate(session),
        }
    }
}

impl fmt::Debug for SessionScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionScope::Any => write!(f, "Any"),
            SessionScope::Schemes(schemes) => f.debug_tuple("Schemes").field(schemes).finish(),
            SessionScope::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}
