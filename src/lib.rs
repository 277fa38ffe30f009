pub mod collector;
pub mod config;
pub mod log_filter;
pub mod parsers;
pub mod sink;
pub mod targets;

use std::sync::Arc;

use futures::future::BoxFuture;
use futures::StreamExt;

use collector::Collector;
use sink::{PrometheusSink, Scrape, Sink};

const MAX_CONCURRENT_COLLECTORS: usize = 25;

pub type BoxedCollector = Box<dyn Collector + Send + Sync>;

#[derive(Clone)]
pub struct Exporter {
    collectors: Arc<Vec<BoxedCollector>>,
}

impl Exporter {
    pub fn new(collectors: Vec<BoxedCollector>) -> Self {
        Exporter {
            collectors: Arc::new(collectors),
        }
    }

    /// Describes, then collects every collector into `sink`.
    ///
    /// Collectors run concurrently. Each one fills its own buffer, and the
    /// buffers are written to `sink` in collector order once all are done.
    pub async fn collect(&self, sink: &mut (dyn Sink + Send)) {
        for collector in self.collectors.iter() {
            for desc in collector.describe().iter().chain(&collector.describe_series()) {
                sink.describe(desc);
            }
        }

        let pending: Vec<_> = self
            .collectors
            .iter()
            .map(|collector| scrape(collector.as_ref()))
            .collect();

        let scrapes: Vec<Scrape> = futures::stream::iter(pending)
            .buffered(MAX_CONCURRENT_COLLECTORS)
            .collect()
            .await;

        for scrape in scrapes {
            scrape.replay(sink);
        }
    }

    /// Runs a full pull and renders it in the Prometheus text format.
    pub async fn render(&self) -> String {
        let mut sink = PrometheusSink::new();
        self.collect(&mut sink).await;
        sink.render()
    }
}

fn scrape<'a>(collector: &'a (dyn Collector + Send + Sync)) -> BoxFuture<'a, Scrape> {
    Box::pin(async move {
        let mut scrape = Scrape::default();
        collector.collect(&mut scrape).await;
        scrape
    })
}
