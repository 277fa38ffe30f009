use tracing::{metadata::LevelFilter, Level, Metadata};
use tracing_subscriber::layer::{Context, Filter};

pub struct LogFilter {
    level: Level,
}

impl LogFilter {
    pub fn new(level: Level) -> Self {
        LogFilter { level }
    }

    fn wants(&self, target: &str, level: &Level) -> bool {
        // the exporter itself, and the tower_http response log
        (target.starts_with("ilm_exporter") || target.starts_with("tower_http::trace::on_response"))
            && *level <= self.level
    }
}

impl<S> Filter<S> for LogFilter {
    fn enabled(&self, meta: &Metadata<'_>, _cx: &Context<'_, S>) -> bool {
        self.wants(meta.target(), meta.level())
    }

    fn max_level_hint(&self) -> Option<LevelFilter> {
        Some(LevelFilter::from(self.level))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_own_targets() {
        let filter = LogFilter::new(Level::INFO);

        assert!(filter.wants("ilm_exporter::collector::ilm", &Level::WARN));
        assert!(filter.wants("tower_http::trace::on_response", &Level::INFO));
        assert!(!filter.wants("hyper::proto", &Level::WARN));
        assert!(!filter.wants("ilm_exporter::collector::ilm", &Level::DEBUG));
    }
}
