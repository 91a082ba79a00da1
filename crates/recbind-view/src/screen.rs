#![forbid(unsafe_code)]

//! Mounted package screen.
//!
//! [`PackageScreen`] owns a [`BindingController`] and drives it from its
//! lifecycle hooks: `on_mount` activates and wires the renderer to record
//! changes, `on_unmount` releases every subscription. Each re-render appends
//! a [`Frame`] to the screen's frame log, which is what a host would paint.
//!
//! # Invariants
//!
//! 1. Exactly one frame per change of the held record, plus one per failure
//!    published while no record is held.
//! 2. After `on_unmount()` no further frames are produced.
//! 3. Remounting starts a fresh binding (the frame log is kept).

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use recbind_core::{BindingPolicy, KeyResolver, Record};
use recbind_runtime::{
    Activation, BindError, BindingController, BindingScope, ContextSource, RecordStore,
    RouteContext, Subscription,
};

use crate::sheet::PackageSheet;

/// One painted state of the screen.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Frame {
    /// A package is shown.
    Sheet(PackageSheet),
    /// Nothing to show (no record held).
    Empty,
    /// The binding failed; the message is user-facing.
    Failed(String),
}

impl Frame {
    fn for_record(record: Option<&Record>) -> Self {
        match record {
            Some(record) => Self::Sheet(PackageSheet::from_record(record)),
            None => Self::Empty,
        }
    }

    /// Text form of the frame.
    #[must_use]
    pub fn render_text(&self) -> String {
        match self {
            Self::Sheet(sheet) => sheet.render_text(),
            Self::Empty => String::new(),
            Self::Failed(message) => format!("{}\n\n{message}\n", crate::sheet::HEADING),
        }
    }
}

/// Package detail screen bound to a record store.
pub struct PackageScreen<S: RecordStore + 'static> {
    controller: BindingController<S>,
    scope: BindingScope,
    following: Option<Subscription>,
    frames: Rc<RefCell<Vec<Frame>>>,
}

impl<S: RecordStore + 'static> PackageScreen<S> {
    /// Screen over `store`, resolving keys from `context`.
    pub fn new(
        store: S,
        resolver: impl KeyResolver + 'static,
        context: impl ContextSource + 'static,
        policy: BindingPolicy,
    ) -> Self {
        Self {
            controller: BindingController::with_policy(store, resolver, context, policy),
            scope: BindingScope::new(),
            following: None,
            frames: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Mount hook: wire the renderer, then activate the binding.
    pub fn on_mount(&mut self) -> Result<Activation, BindError> {
        self.scope.clear();

        let holding = Rc::new(Cell::new(self.controller.with_record(|r| r.is_some())));

        let frames = Rc::clone(&self.frames);
        let held = Rc::clone(&holding);
        self.scope.hold(self.controller.subscribe(move |record| {
            #[cfg(feature = "tracing")]
            let _span = tracing::debug_span!("render", present = record.is_some()).entered();
            held.set(record.is_some());
            frames.borrow_mut().push(Frame::for_record(record));
        }));

        // While a record is held the sheet stays valid; only paint failures
        // that leave nothing to show.
        let frames = Rc::clone(&self.frames);
        self.scope
            .hold(self.controller.subscribe_errors(move |err| match err {
                Some(err) if !holding.get() => {
                    frames.borrow_mut().push(Frame::Failed(err.to_string()));
                }
                #[cfg(feature = "tracing")]
                Some(err) => tracing::debug!(%err, "keeping sheet over transient failure"),
                _ => {}
            }));

        self.controller.activate()
    }

    /// Rebind on navigation while mounted. Replaces any route followed
    /// before; unmounting stops following.
    pub fn follow(&mut self, route: &RouteContext) {
        self.following = Some(self.controller.follow(route));
    }

    /// Unmount hook: stop rendering and release the store subscription.
    pub fn on_unmount(&mut self) {
        self.following = None;
        self.scope.clear();
        self.controller.deactivate();
    }

    /// The controller this screen drives.
    #[must_use]
    pub fn controller(&self) -> &BindingController<S> {
        &self.controller
    }

    /// All frames painted so far.
    #[must_use]
    pub fn frames(&self) -> Vec<Frame> {
        self.frames.borrow().clone()
    }

    /// Most recent frame.
    #[must_use]
    pub fn current_frame(&self) -> Option<Frame> {
        self.frames.borrow().last().cloned()
    }

    /// Number of frames painted so far.
    #[must_use]
    pub fn render_count(&self) -> usize {
        self.frames.borrow().len()
    }
}

impl<S: RecordStore + 'static> std::fmt::Debug for PackageScreen<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PackageScreen")
            .field("controller", &self.controller)
            .field("scope", &self.scope)
            .field("following", &self.following.is_some())
            .field("frames", &self.frames.borrow().len())
            .finish()
    }
}
