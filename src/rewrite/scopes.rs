use crate::rewrite::binding::{Binding, BindingKind, Origin};
use std::collections::HashMap;

#[derive(Clone, Debug)]
enum Entry {
    Bound(Binding),
    /// A declaration whose kind is unknown; hides any outer binding.
    Shadow { visible_from: usize },
}

#[derive(Clone, Debug)]
struct Slot {
    entry: Entry,
    /// Frame index that declared the entry.
    depth: usize,
}

impl Slot {
    fn visible_from(&self) -> usize {
        match &self.entry {
            Entry::Bound(binding) => binding.visible_from,
            Entry::Shadow { visible_from } => *visible_from,
        }
    }
}

/// Lexical frames of tracked names.
///
/// Pushing copies the current frame, so a child starts with everything its
/// parent can see and popping restores the parent exactly as it was.
#[derive(Debug, Default)]
pub struct ScopeStack {
    frames: Vec<HashMap<String, Slot>>,
}

impl ScopeStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self) {
        let frame = self.frames.last().cloned().unwrap_or_default();
        self.frames.push(frame);
    }

    /// Starts an empty frame; nothing from enclosing frames is visible.
    pub fn push_root(&mut self) {
        self.frames.push(HashMap::new());
    }

    pub fn pop(&mut self) {
        self.frames.pop();
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn bind(&mut self, name: &str, kind: BindingKind, pos: usize, origin: Origin) {
        self.insert(name, Entry::Bound(Binding::new(name, kind, pos, origin)));
    }

    pub fn bind_derived(&mut self, name: &str, target: &str, pos: usize, source: BindingKind) {
        self.insert(
            name,
            Entry::Bound(Binding::derived(name, target, pos, source)),
        );
    }

    pub fn shadow(&mut self, name: &str, pos: usize) {
        self.insert(name, Entry::Shadow { visible_from: pos });
    }

    fn insert(&mut self, name: &str, entry: Entry) {
        let depth = self.frames.len();
        if let Some(frame) = self.frames.last_mut() {
            frame.insert(name.to_string(), Slot { entry, depth });
        }
    }

    /// The binding `name` refers to at offset `at`, if it is a known kind.
    pub fn resolve(&self, name: &str, at: usize) -> Option<&Binding> {
        let slot = self.lookup(name, at)?;
        match &slot.entry {
            Entry::Bound(binding) => Some(binding),
            Entry::Shadow { .. } => None,
        }
    }

    /// Whether `name` is declared locally at `at`, known kind or not.
    pub fn is_declared(&self, name: &str, at: usize) -> bool {
        self.lookup(name, at).is_some()
    }

    /// Whether `name` was declared by the innermost frame itself.
    pub fn declared_here(&self, name: &str) -> bool {
        let depth = self.frames.len();
        self.frames
            .last()
            .and_then(|frame| frame.get(name))
            .is_some_and(|slot| slot.depth == depth)
    }

    fn lookup(&self, name: &str, at: usize) -> Option<&Slot> {
        self.frames
            .last()?
            .get(name)
            .filter(|slot| slot.visible_from() <= at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn child_frames_see_parent_bindings() {
        let mut scopes = ScopeStack::new();
        scopes.push_root();
        scopes.bind("ctx", BindingKind::Value, 0, Origin::Param);
        scopes.push();
        assert_eq!(
            scopes.resolve("ctx", 5).map(|b| b.kind),
            Some(BindingKind::Value)
        );
        assert!(!scopes.declared_here("ctx"));
    }

    #[test]
    fn pop_restores_the_shadowed_binding() {
        let mut scopes = ScopeStack::new();
        scopes.push_root();
        scopes.bind("ctx", BindingKind::Pointer, 0, Origin::Param);
        scopes.push();
        scopes.shadow("ctx", 10);
        assert!(scopes.resolve("ctx", 20).is_none());
        assert!(scopes.is_declared("ctx", 20));
        scopes.pop();
        let binding = scopes.resolve("ctx", 30).expect("restored");
        assert_eq!(binding.kind, BindingKind::Pointer);
        assert_eq!(binding.origin, Origin::Param);
    }

    #[test]
    fn bindings_are_invisible_before_their_declaration() {
        let mut scopes = ScopeStack::new();
        scopes.push_root();
        scopes.bind("ctx", BindingKind::Value, 50, Origin::Local);
        assert!(scopes.resolve("ctx", 40).is_none());
        assert!(scopes.resolve("ctx", 50).is_some());
    }

    #[test]
    fn rebinding_in_the_same_frame_overwrites() {
        let mut scopes = ScopeStack::new();
        scopes.push_root();
        scopes.bind("ctx", BindingKind::Value, 0, Origin::Local);
        scopes.bind("ctx", BindingKind::Pointer, 10, Origin::Local);
        assert_eq!(
            scopes.resolve("ctx", 20).map(|b| b.kind),
            Some(BindingKind::Pointer)
        );
        assert!(scopes.declared_here("ctx"));
    }

    #[test]
    fn root_frames_start_empty() {
        let mut scopes = ScopeStack::new();
        scopes.push_root();
        scopes.bind("ctx", BindingKind::Value, 0, Origin::Param);
        scopes.push_root();
        assert!(scopes.resolve("ctx", 10).is_none());
        scopes.pop();
        assert!(scopes.resolve("ctx", 10).is_some());
        assert_eq!(scopes.depth(), 1);
    }

    #[test]
    fn derived_bindings_keep_their_source_kind() {
        let mut scopes = ScopeStack::new();
        scopes.push_root();
        scopes.bind_derived("ctx", "detachedCtx", 0, BindingKind::Pointer);
        let binding = scopes.resolve("ctx", 1).expect("derived");
        assert_eq!(binding.target, "detachedCtx");
        assert_eq!(
            binding.origin,
            Origin::Derived {
                source: BindingKind::Pointer
            }
        );
    }
}
