//! Interaction gateway.
//!
//! Abstraction over "present one piece of UI, await one user response or
//! a timeout" for the three UI shapes the betting flow needs: a modal
//! with text fields, a single-select menu, and a button group. The saga
//! suspends at these calls and resumes with a [`Submission`].
//!
//! Contract for all three shapes: exactly one of {designated actor
//! responds, actor picks the Cancel option, timeout elapses} resolves
//! the suspend point. Responses from any other actor are ignored.
//! Timeout durations are gateway configuration, not saga parameters.

pub mod console;

use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use uuid::Uuid;

/// Key carried by the synthetic Cancel control. Not a corner and not a
/// match; selecting it ends the saga without a bet.
pub const CANCEL_KEY: &str = "Cancel";

// ---------------------------------------------------------------------------
// Context
// ---------------------------------------------------------------------------

/// Per-run interaction context, threaded explicitly through every
/// gateway call: which actor may resolve suspend points, and a run id
/// for log correlation. Never held as ambient/global state.
#[derive(Debug, Clone)]
pub struct SagaContext {
    pub user_id: String,
    pub run_id: Uuid,
}

impl SagaContext {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            run_id: Uuid::new_v4(),
        }
    }
}

// ---------------------------------------------------------------------------
// Requests & results
// ---------------------------------------------------------------------------

/// How one suspend point resolved. Timeout and explicit cancel are both
/// terminal for the saga but stay distinct for telemetry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission<T> {
    Answered(T),
    Cancelled,
    TimedOut,
}

/// A text field on a modal.
#[derive(Debug, Clone)]
pub struct ModalField {
    pub id: String,
    pub label: String,
}

impl ModalField {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}

/// A modal with one or more text fields.
#[derive(Debug, Clone)]
pub struct ModalRequest {
    pub title: String,
    pub fields: Vec<ModalField>,
}

/// Submitted modal field values, keyed by field id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModalReply {
    values: HashMap<String, String>,
}

impl ModalReply {
    pub fn new(values: HashMap<String, String>) -> Self {
        Self { values }
    }

    /// Single-field convenience constructor.
    pub fn single(id: impl Into<String>, value: impl Into<String>) -> Self {
        let mut values = HashMap::new();
        values.insert(id.into(), value.into());
        Self { values }
    }

    pub fn value(&self, field_id: &str) -> Option<&str> {
        self.values.get(field_id).map(String::as_str)
    }
}

/// One selectable option — used for both select menus and button groups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceOption {
    /// Stable key reported back on selection.
    pub key: String,
    /// Human-readable label.
    pub label: String,
    /// Whether this option is the Cancel sentinel.
    pub is_cancel: bool,
}

impl ChoiceOption {
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            is_cancel: false,
        }
    }

    pub fn cancel() -> Self {
        Self {
            key: CANCEL_KEY.to_string(),
            label: CANCEL_KEY.to_string(),
            is_cancel: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Timeouts
// ---------------------------------------------------------------------------

/// Per-shape suspend timeouts. Owned by the gateway implementation.
#[derive(Debug, Clone, Copy)]
pub struct GatewayConfig {
    pub modal_timeout: Duration,
    pub choice_timeout: Duration,
    pub button_timeout: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            modal_timeout: Duration::from_secs(120),
            choice_timeout: Duration::from_secs(60),
            button_timeout: Duration::from_secs(60),
        }
    }
}

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Suspend-and-resume UI primitives plus the reply channel.
///
/// Implementations own delivery and collection mechanics (chat platform,
/// console, scripted test double). UI transport faults are the
/// implementation's concern and surface as `TimedOut`; the saga only
/// ever sees the three-way [`Submission`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InteractionGateway: Send + Sync {
    /// Show a modal and await the designated actor's field values.
    async fn present_modal(&self, ctx: &SagaContext, request: ModalRequest)
        -> Submission<ModalReply>;

    /// Show a single-select menu; resolves to the chosen option's key.
    async fn present_choice(
        &self,
        ctx: &SagaContext,
        prompt: &str,
        options: &[ChoiceOption],
    ) -> Submission<String>;

    /// Show a button group; resolves to the pressed button's key.
    async fn present_buttons(
        &self,
        ctx: &SagaContext,
        prompt: &str,
        options: &[ChoiceOption],
    ) -> Submission<String>;

    /// Post one user-visible message, replacing any interim UI elements
    /// (selectors, buttons) still showing.
    async fn reply(&self, ctx: &SagaContext, text: &str) -> Result<()>;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
