//! Scenario replay: feeds a recorded pipeline payload and a timed list of input events through
//! a [`MessageView`] and records what the UI would render after every step.

use std::fs;
use std::path::Path;

use cite_core::config::InteractionConfig;
use cite_core::error::{AppError, ValidationWarning};
use cite_core::ingest::{build_message, PipelinePayload};
use cite_interaction::{
    AffordanceSizes, AffordanceView, GestureAction, InputEvent, Key, MarkerId, MessageView, Mode, Surface, Viewport,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Scenario {
    pub surface: Surface,
    pub viewport: Viewport,
    #[serde(default)]
    pub sizes: Option<AffordanceSizes>,
    pub payload: PipelinePayload,
    #[serde(default)]
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Step {
    pub at_ms: u64,
    #[serde(flatten)]
    pub target: StepTarget,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "target", rename_all = "snake_case")]
pub enum StepTarget {
    Marker { marker: usize, event: InputEvent },
    Document { event: DocumentEvent },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DocumentEvent {
    PointerDown {
        #[serde(default)]
        inside: Option<usize>,
    },
    KeyDown {
        key: Key,
    },
    Resize {
        viewport: Viewport,
    },
    ReplaceMessage {
        payload: PipelinePayload,
    },
    Unmount {
        #[serde(default)]
        marker: Option<usize>,
    },
    Tick,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MarkerSnapshot {
    pub marker: MarkerId,
    pub mode: Mode,
    pub active_index: usize,
}

/// One output line: the outcome of a step and the resulting render state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReplayRecord {
    pub step: usize,
    pub at_ms: u64,
    pub action: Option<GestureAction>,
    pub prevent_default: bool,
    pub closed: Vec<MarkerId>,
    pub reset: bool,
    pub markers: Vec<MarkerSnapshot>,
    pub views: Vec<AffordanceView>,
    pub outside_listeners: usize,
    pub scroll_locked_by: Option<MarkerId>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReplayOutcome {
    pub message_id: String,
    pub fingerprint: String,
    pub warnings: Vec<ValidationWarning>,
    pub records: Vec<ReplayRecord>,
}

pub fn parse_scenario(raw: &str) -> Result<Scenario, AppError> {
    let scenario: Scenario = serde_json::from_str(raw).map_err(|e| {
        AppError::new("REPLAY_SCENARIO_INVALID", "Failed to parse replay scenario")
            .with_details(e.to_string())
    })?;
    let mut last = 0;
    for (i, step) in scenario.steps.iter().enumerate() {
        if step.at_ms < last {
            return Err(AppError::new(
                "REPLAY_SCENARIO_INVALID",
                "Scenario steps must be in non-decreasing time order",
            )
            .with_details(format!("step={i}; at_ms={}; previous={last}", step.at_ms)));
        }
        last = step.at_ms;
    }
    Ok(scenario)
}

pub fn load_scenario(path: &Path) -> Result<Scenario, AppError> {
    let raw = fs::read_to_string(path).map_err(|e| {
        AppError::new("REPLAY_SCENARIO_INVALID", "Failed to read replay scenario")
            .with_details(format!("path={}; err={}", path.display(), e))
    })?;
    parse_scenario(&raw)
}

pub fn run_scenario(scenario: &Scenario, config: &InteractionConfig) -> Result<ReplayOutcome, AppError> {
    config.validate()?;

    let message = build_message(scenario.payload.clone());
    let message_id = message.message_id.clone();
    let fingerprint = message.fingerprint.clone();
    let warnings = message.warnings.clone();

    let mut view = MessageView::new(message, scenario.surface, scenario.viewport, *config);
    if let Some(sizes) = scenario.sizes {
        view = view.with_sizes(sizes);
    }

    let mut records = Vec::with_capacity(scenario.steps.len());
    for (i, step) in scenario.steps.iter().enumerate() {
        let mut action = None;
        let mut prevent_default = false;
        let mut closed = Vec::new();
        let mut reset = false;

        match &step.target {
            StepTarget::Marker { marker, event } => {
                let update = view.dispatch(MarkerId(*marker), *event, step.at_ms)?;
                action = update.action;
                prevent_default = update.prevent_default;
                let closed_self = update.closed();
                closed = update.closed_others;
                if closed_self {
                    closed.push(update.marker);
                }
            }
            StepTarget::Document { event } => match event {
                DocumentEvent::PointerDown { inside } => {
                    closed = view.document_pointer_down(inside.map(MarkerId), step.at_ms);
                }
                DocumentEvent::KeyDown { key } => {
                    closed = view.document_key_down(*key, step.at_ms);
                }
                DocumentEvent::Resize { viewport } => {
                    view.advance_time(step.at_ms);
                    view.set_viewport(*viewport);
                }
                DocumentEvent::ReplaceMessage { payload } => {
                    view.advance_time(step.at_ms);
                    reset = view.replace_message(build_message(payload.clone()));
                }
                DocumentEvent::Unmount { marker } => {
                    view.advance_time(step.at_ms);
                    match marker {
                        Some(m) => {
                            view.unmount_marker(MarkerId(*m));
                        }
                        None => view.unmount_all(),
                    }
                }
                DocumentEvent::Tick => view.advance_time(step.at_ms),
            },
        }

        records.push(snapshot(&view, i, step.at_ms, action, prevent_default, closed, reset));
    }

    tracing::info!(message = %message_id, steps = records.len(), "scenario replayed");

    Ok(ReplayOutcome {
        message_id,
        fingerprint,
        warnings,
        records,
    })
}

fn snapshot(
    view: &MessageView,
    step: usize,
    at_ms: u64,
    action: Option<GestureAction>,
    prevent_default: bool,
    closed: Vec<MarkerId>,
    reset: bool,
) -> ReplayRecord {
    let markers = view
        .marker_ids()
        .into_iter()
        .filter_map(|id| view.marker(id))
        .map(|m| MarkerSnapshot {
            marker: m.id(),
            mode: m.mode(),
            active_index: m.active_index(),
        })
        .collect();
    let doc = view.document();
    ReplayRecord {
        step,
        at_ms,
        action,
        prevent_default,
        closed,
        reset,
        markers,
        views: view.views(),
        outside_listeners: doc.listener_count(),
        scroll_locked_by: doc.scroll_locked_by(),
    }
}
