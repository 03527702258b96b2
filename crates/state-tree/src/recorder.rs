//! Recorders collect the patches or actions a subtree emits so they can be
//! replayed onto another tree later.

use std::cell::RefCell;
use std::rc::Rc;

use crate::action::{apply_actions, on_action, ActionRecord};
use crate::error::TreeError;
use crate::node::{Disposer, Node};
use crate::patch::{apply_patches, on_patch, Patch};

/// Patches emitted under a node since [`record_patches`] was called.
#[derive(Debug)]
pub struct PatchRecorder {
    patches: Rc<RefCell<Vec<Patch>>>,
    disposer: Option<Disposer>,
}

impl PatchRecorder {
    pub fn patches(&self) -> Vec<Patch> {
        self.patches.borrow().clone()
    }

    pub fn is_recording(&self) -> bool {
        self.disposer.is_some()
    }

    /// Stops listening. The patches recorded so far are kept.
    pub fn stop(&mut self) {
        if let Some(disposer) = self.disposer.take() {
            disposer.dispose();
        }
    }

    /// Applies the recorded patches to `target` in order.
    pub fn replay(&self, target: &Node) -> Result<(), TreeError> {
        let patches = self.patches();
        apply_patches(target, &patches)
    }
}

/// Starts recording every patch emitted under `node`.
pub fn record_patches(node: &Node) -> PatchRecorder {
    let patches = Rc::new(RefCell::new(Vec::new()));
    let sink = patches.clone();
    let disposer = on_patch(node, move |patch| {
        sink.borrow_mut().push(patch.clone());
        Ok(())
    });
    PatchRecorder {
        patches,
        disposer: Some(disposer),
    }
}

/// Outermost action calls made under a node since [`record_actions`] was
/// called.
#[derive(Debug)]
pub struct ActionRecorder {
    actions: Rc<RefCell<Vec<ActionRecord>>>,
    disposer: Option<Disposer>,
}

impl ActionRecorder {
    pub fn actions(&self) -> Vec<ActionRecord> {
        self.actions.borrow().clone()
    }

    pub fn is_recording(&self) -> bool {
        self.disposer.is_some()
    }

    pub fn stop(&mut self) {
        if let Some(disposer) = self.disposer.take() {
            disposer.dispose();
        }
    }

    pub fn replay(&self, target: &Node) -> Result<(), TreeError> {
        let actions = self.actions();
        apply_actions(target, &actions)
    }
}

pub fn record_actions(node: &Node) -> ActionRecorder {
    let actions = Rc::new(RefCell::new(Vec::new()));
    let sink = actions.clone();
    let disposer = on_action(node, move |record| {
        sink.borrow_mut().push(record.clone());
        Ok(())
    });
    ActionRecorder {
        actions,
        disposer: Some(disposer),
    }
}
