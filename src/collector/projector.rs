use crate::parsers::ilm::IlmExplain;
use crate::sink::Observation;

/// One gauge per index in `explain`, always set to 1.
///
/// The series existing is the signal. Healthy indices are not in the response
/// and get no series, so entries are never filtered or merged here.
pub fn project(name: &str, explain: &IlmExplain) -> Vec<Observation> {
    explain
        .indices
        .iter()
        .map(|(index, status)| {
            Observation::gauge(name, 1.0)
                .label("index", index.as_str())
                .label("step", status.failed_step.as_str())
                .label("reason", status.step_info.reason.as_str())
        })
        .collect()
}
