use std::{collections::BTreeMap, fmt, str::FromStr, sync::Arc};

use http::Method;
use log::warn;

use crate::core::Argument;

/// HTTP verbs a step can declare.
///
/// PATCH is accepted but has no execution behaviour; steps using it are
/// skipped without issuing a request.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Verb {
    GET,
    POST,
    DELETE,
    PATCH,
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let verb = match self {
            Verb::GET => "GET",
            Verb::POST => "POST",
            Verb::DELETE => "DELETE",
            Verb::PATCH => "PATCH",
        };
        write!(f, "{}", verb)
    }
}

impl FromStr for Verb {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Verb::GET),
            "POST" => Ok(Verb::POST),
            "DELETE" => Ok(Verb::DELETE),
            "PATCH" => Ok(Verb::PATCH),
            _ => Err(format!("unsupported verb: {s}")),
        }
    }
}

impl From<Verb> for Method {
    fn from(verb: Verb) -> Self {
        match verb {
            Verb::GET => Method::GET,
            Verb::POST => Method::POST,
            Verb::DELETE => Method::DELETE,
            Verb::PATCH => Method::PATCH,
        }
    }
}

/// One ordering-keyed HTTP operation.
#[derive(Clone, Debug)]
pub struct Step {
    pub sequence: u32,
    pub verb: Verb,
    pub argument: Option<Arc<dyn Argument>>,
    pub label: String,
    pub target: String,
}

impl Step {
    pub fn new(sequence: u32, verb: Verb, label: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            sequence,
            verb,
            argument: None,
            label: label.into(),
            target: target.into(),
        }
    }

    pub fn get(sequence: u32, label: impl Into<String>, target: impl Into<String>) -> Self {
        Self::new(sequence, Verb::GET, label, target)
    }

    pub fn post(sequence: u32, label: impl Into<String>, target: impl Into<String>) -> Self {
        Self::new(sequence, Verb::POST, label, target)
    }

    pub fn delete(sequence: u32, label: impl Into<String>, target: impl Into<String>) -> Self {
        Self::new(sequence, Verb::DELETE, label, target)
    }

    /// Attach a payload; only POST steps send it.
    pub fn with_argument(mut self, argument: Arc<dyn Argument>) -> Self {
        self.argument = Some(argument);
        self
    }
}

/// The steps of one operation, held in ascending `sequence` order.
///
/// Built once and never mutated. When two steps share a sequence key the one
/// declared later replaces the earlier one.
#[derive(Clone, Debug, Default)]
pub struct CommandTable {
    steps: Vec<Step>,
}

impl CommandTable {
    pub fn new(steps: impl IntoIterator<Item = Step>) -> Self {
        let mut by_sequence = BTreeMap::new();
        for step in steps {
            let sequence = step.sequence;
            if let Some(replaced) = by_sequence.insert(sequence, step) {
                warn!(
                    "Duplicate sequence key {sequence}, step '{}' replaced",
                    replaced.label
                );
            }
        }

        Self {
            steps: by_sequence.into_values().collect(),
        }
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn sequences(&self) -> Vec<u32> {
        self.steps.iter().map(|s| s.sequence).collect()
    }
}

impl FromIterator<Step> for CommandTable {
    fn from_iter<I: IntoIterator<Item = Step>>(iter: I) -> Self {
        Self::new(iter)
    }
}
