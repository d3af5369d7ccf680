use sessionlog_types::{DiagnosticEvent, LogLevel, SessionResource};

/// Read-side filter over stored events
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventFilter {
    pub session: Option<SessionResource>,
    pub min_level: Option<LogLevel>,
}

impl EventFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn session(mut self, session: SessionResource) -> Self {
        self.session = Some(session);
        self
    }

    pub fn min_level(mut self, level: LogLevel) -> Self {
        self.min_level = Some(level);
        self
    }

    pub fn matches(&self, event: &DiagnosticEvent) -> bool {
        if let Some(session) = &self.session
            && event.session_resource != *session
        {
            return false;
        }
        if let Some(min_level) = self.min_level
            && event.level < min_level
        {
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_by_session_and_level() {
        let s1 = SessionResource::local("s1");
        let s2 = SessionResource::local("s2");
        let warn = DiagnosticEvent::new(s1.clone(), "w").with_level(LogLevel::Warning);
        let debug = DiagnosticEvent::new(s1.clone(), "d").with_level(LogLevel::Debug);
        let other = DiagnosticEvent::new(s2, "o");

        let filter = EventFilter::all().session(s1).min_level(LogLevel::Info);
        assert!(filter.matches(&warn));
        assert!(!filter.matches(&debug));
        assert!(!filter.matches(&other));

        assert!(EventFilter::all().matches(&debug));
    }
}
