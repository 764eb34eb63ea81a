//! Per-unit-of-work tracking state.
//!
//! An [`ActivityContext`] is created for each logical unit of work (one
//! request, one job, one console command) and passed to every `track` call
//! made by that unit. Nothing here is global, so concurrent units never
//! observe each other's causer, meta or batch.
//!
//! The tracker flushes the causer, contextual batch id and meta after every
//! tracked write. The disabled toggle, explicit batch scopes, the ambient
//! actor/request and the auto batch id belong to the unit and survive flushes.

use std::ops::{Deref, DerefMut};

use activity_core::{Attributes, ModelRef};
use serde_json::Value;
use uuid::Uuid;

/// The HTTP request a unit of work is serving.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestInfo {
    pub method: String,
    pub host: Option<String>,
    pub ip: Option<String>,
}

impl RequestInfo {
    #[must_use]
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            host: None,
            ip: None,
        }
    }

    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    #[must_use]
    pub fn with_ip(mut self, ip: impl Into<String>) -> Self {
        self.ip = Some(ip.into());
        self
    }
}

#[derive(Debug, Default)]
pub struct ActivityContext {
    causer: Option<ModelRef>,
    batch_id: Option<String>,
    meta: Attributes,
    disabled: bool,
    batch_stack: Vec<String>,
    auto_batch_id: Option<String>,
    actor: Option<ModelRef>,
    request: Option<RequestInfo>,
}

impl ActivityContext {
    /// Context for a unit of work that is not serving a request.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Context for a unit of work serving `request`.
    #[must_use]
    pub fn for_request(request: RequestInfo) -> Self {
        Self {
            request: Some(request),
            ..Self::default()
        }
    }

    /// Set the authenticated actor for this unit of work.
    #[must_use]
    pub fn authenticated_as(mut self, actor: ModelRef) -> Self {
        self.actor = Some(actor);
        self
    }

    /// Replace the authenticated actor (login/logout within a unit).
    pub fn set_actor(&mut self, actor: Option<ModelRef>) {
        self.actor = actor;
    }

    #[must_use]
    pub const fn actor(&self) -> Option<&ModelRef> {
        self.actor.as_ref()
    }

    #[must_use]
    pub const fn request(&self) -> Option<&RequestInfo> {
        self.request.as_ref()
    }

    pub fn set_causer(&mut self, causer: Option<ModelRef>) {
        self.causer = causer;
    }

    #[must_use]
    pub const fn causer(&self) -> Option<&ModelRef> {
        self.causer.as_ref()
    }

    /// Set the contextual batch id, typically from a request initializer.
    pub fn set_batch_id(&mut self, batch_id: impl Into<String>) {
        self.batch_id = Some(batch_id.into());
    }

    #[must_use]
    pub fn batch_id(&self) -> Option<&str> {
        self.batch_id.as_deref()
    }

    /// Merge `meta` into the accumulated meta. Later keys win.
    pub fn add_meta(&mut self, meta: Attributes) -> &Attributes {
        self.meta.extend(meta);
        &self.meta
    }

    pub fn insert_meta(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.meta.insert(key.into(), value.into());
    }

    #[must_use]
    pub const fn meta(&self) -> &Attributes {
        &self.meta
    }

    #[must_use]
    pub const fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub const fn disable(&mut self) {
        self.disabled = true;
    }

    pub const fn enable(&mut self) {
        self.disabled = false;
    }

    /// Suppress tracking until the returned guard is dropped. The previous
    /// value of the toggle is restored on drop.
    pub fn without_logging(&mut self) -> LoggingDisabled<'_> {
        let previous = self.disabled;
        self.disabled = true;
        LoggingDisabled {
            ctx: self,
            previous,
        }
    }

    /// Group every activity tracked through the returned guard under a fresh
    /// batch id.
    pub fn batch(&mut self) -> BatchScope<'_> {
        self.batch_with_id(Uuid::new_v4().to_string())
    }

    /// Like [`Self::batch`] with a caller-chosen id.
    pub fn batch_with_id(&mut self, batch_id: impl Into<String>) -> BatchScope<'_> {
        let id = batch_id.into();
        let depth = self.batch_stack.len();
        self.batch_stack.push(id.clone());
        BatchScope {
            ctx: self,
            depth,
            id,
        }
    }

    /// Id of the innermost active batch scope.
    #[must_use]
    pub fn explicit_batch_id(&self) -> Option<&str> {
        self.batch_stack.last().map(String::as_str)
    }

    /// The unit's auto-generated batch id, created on first use.
    pub(crate) fn auto_batch_id(&mut self) -> String {
        self.auto_batch_id
            .get_or_insert_with(|| Uuid::new_v4().to_string())
            .clone()
    }

    /// Clear causer, contextual batch id and meta.
    pub fn flush(&mut self) {
        self.causer = None;
        self.batch_id = None;
        self.meta.clear();
    }
}

/// Guard returned by [`ActivityContext::without_logging`].
#[derive(Debug)]
pub struct LoggingDisabled<'a> {
    ctx: &'a mut ActivityContext,
    previous: bool,
}

impl Deref for LoggingDisabled<'_> {
    type Target = ActivityContext;

    fn deref(&self) -> &ActivityContext {
        self.ctx
    }
}

impl DerefMut for LoggingDisabled<'_> {
    fn deref_mut(&mut self) -> &mut ActivityContext {
        self.ctx
    }
}

impl Drop for LoggingDisabled<'_> {
    fn drop(&mut self) {
        self.ctx.disabled = self.previous;
    }
}

/// Guard returned by [`ActivityContext::batch`].
#[derive(Debug)]
pub struct BatchScope<'a> {
    ctx: &'a mut ActivityContext,
    depth: usize,
    id: String,
}

impl BatchScope<'_> {
    /// The batch id shared by activities tracked in this scope.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl Deref for BatchScope<'_> {
    type Target = ActivityContext;

    fn deref(&self) -> &ActivityContext {
        self.ctx
    }
}

impl DerefMut for BatchScope<'_> {
    fn deref_mut(&mut self) -> &mut ActivityContext {
        self.ctx
    }
}

impl Drop for BatchScope<'_> {
    fn drop(&mut self) {
        // Also discards any inner scope that was leaked instead of dropped.
        self.ctx.batch_stack.truncate(self.depth);
    }
}
