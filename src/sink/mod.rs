use metrics::{Key, KeyName, Label, Recorder, SharedString};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusRecorder};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Gauge,
    Counter,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Desc {
    pub name: String,
    pub help: String,
    pub kind: MetricKind,
}

impl Desc {
    pub fn new(name: impl Into<String>, help: impl Into<String>, kind: MetricKind) -> Self {
        Desc {
            name: name.into(),
            help: help.into(),
            kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub name: String,
    pub kind: MetricKind,
    pub value: f64,
    pub labels: Vec<(String, String)>,
}

impl Observation {
    pub fn gauge(name: impl Into<String>, value: f64) -> Self {
        Observation {
            name: name.into(),
            kind: MetricKind::Gauge,
            value,
            labels: Vec::new(),
        }
    }

    pub fn counter(name: impl Into<String>, value: u64) -> Self {
        Observation {
            name: name.into(),
            kind: MetricKind::Counter,
            value: value as f64,
            labels: Vec::new(),
        }
    }

    pub fn label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.push((key.into(), value.into()));
        self
    }

    /// Label value for `key`, if set.
    pub fn get_label(&self, key: &str) -> Option<&str> {
        self.labels
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Receives metric descriptions and observations from collectors.
pub trait Sink {
    fn describe(&mut self, desc: &Desc);
    fn emit(&mut self, observation: Observation);
}

/// In-memory sink, replayable into another sink.
#[derive(Debug, Default)]
pub struct Scrape {
    pub descs: Vec<Desc>,
    pub observations: Vec<Observation>,
}

impl Scrape {
    pub fn replay(self, sink: &mut dyn Sink) {
        for desc in &self.descs {
            sink.describe(desc);
        }
        for observation in self.observations {
            sink.emit(observation);
        }
    }

    pub fn find(&self, name: &str) -> impl Iterator<Item = &Observation> {
        let name = name.to_owned();
        self.observations.iter().filter(move |o| o.name == name)
    }

    /// Value of the first unlabelled observation named `name`.
    pub fn value(&self, name: &str) -> Option<f64> {
        self.find(name).find(|o| o.labels.is_empty()).map(|o| o.value)
    }
}

impl Sink for Scrape {
    fn describe(&mut self, desc: &Desc) {
        self.descs.push(desc.clone());
    }

    fn emit(&mut self, observation: Observation) {
        self.observations.push(observation);
    }
}

/// Sink backed by a private Prometheus recorder.
///
/// Each instance only holds what was emitted into it, so series that were not
/// emitted during a pull never show up in its rendering.
pub struct PrometheusSink {
    recorder: PrometheusRecorder,
}

impl PrometheusSink {
    pub fn new() -> Self {
        PrometheusSink {
            recorder: PrometheusBuilder::new().build_recorder(),
        }
    }

    /// Renders everything emitted so far in the Prometheus text format.
    pub fn render(&self) -> String {
        self.recorder.handle().render()
    }
}

impl Default for PrometheusSink {
    fn default() -> Self {
        Self::new()
    }
}

impl Sink for PrometheusSink {
    fn describe(&mut self, desc: &Desc) {
        let name = KeyName::from(desc.name.clone());
        let help = SharedString::from(desc.help.clone());

        match desc.kind {
            MetricKind::Gauge => self.recorder.describe_gauge(name, None, help),
            MetricKind::Counter => self.recorder.describe_counter(name, None, help),
        }
    }

    fn emit(&mut self, observation: Observation) {
        let labels: Vec<Label> = observation
            .labels
            .into_iter()
            .map(|(k, v)| Label::new(k, v))
            .collect();
        let key = Key::from_parts(observation.name, labels);

        match observation.kind {
            MetricKind::Gauge => self.recorder.register_gauge(&key).set(observation.value),
            MetricKind::Counter => self
                .recorder
                .register_counter(&key)
                .absolute(observation.value as u64),
        }
    }
}

/// Joins the non-empty parts of a metric name with `_`.
pub fn fq_name(namespace: &str, subsystem: &str, name: &str) -> String {
    [namespace, subsystem, name]
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join("_")
}
