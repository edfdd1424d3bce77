//! Lexical scope tracking for the rule engine and the fix pipeline.
//!
//! A [`ScopeStack`] is created fresh per analysis call; nothing is shared
//! between calls. The bottom frame holds the builtin globals and is never
//! popped.

use crate::ast::Span;
use std::collections::{HashMap, HashSet};

/// Identifiers treated as always-declared and exempt from the
/// undeclared/unused rules.
pub const BUILTIN_GLOBALS: &[&str] = &["console", "Math", "Date", "setTimeout", "clearTimeout"];

/// A stack of lexical scopes plus the declaration-position map.
///
/// Declaring a name already visible in an enclosing frame adds a new
/// binding in the innermost frame; no shadowing diagnostic is raised.
/// Redeclaring in the same scope overwrites the recorded position
/// (last wins).
#[derive(Debug)]
pub struct ScopeStack {
    frames: Vec<HashSet<String>>,
    positions: HashMap<String, Span>,
}

impl ScopeStack {
    /// A fresh stack whose root frame is pre-seeded with
    /// [`BUILTIN_GLOBALS`].
    pub fn new() -> Self {
        let builtins = BUILTIN_GLOBALS.iter().map(|s| s.to_string()).collect();
        Self {
            frames: vec![builtins],
            positions: HashMap::new(),
        }
    }

    /// Push an empty frame. Every call must be paired with
    /// [`ScopeStack::exit_scope`] on leaving the same construct.
    pub fn enter_scope(&mut self) {
        self.frames.push(HashSet::new());
    }

    /// Pop the innermost frame. The root/builtin frame is never popped,
    /// keeping the invariant that the stack always has at least one frame.
    pub fn exit_scope(&mut self) {
        if self.frames.len() > 1 {
            self.frames.pop();
        } else {
            tracing::warn!("exit_scope called with only the root frame on the stack");
        }
    }

    /// Add `name` to the innermost frame and record its declaration span.
    pub fn declare(&mut self, name: &str, span: Span) {
        // `frames` is never empty.
        if let Some(frame) = self.frames.last_mut() {
            frame.insert(name.to_string());
        }
        self.positions.insert(name.to_string(), span);
    }

    /// Whether `name` is visible here, scanning frames from innermost to
    /// outermost, builtins included.
    pub fn is_declared(&self, name: &str) -> bool {
        self.frames.iter().rev().any(|frame| frame.contains(name))
    }

    /// Whether `name` is one of the pre-seeded builtin globals.
    pub fn is_builtin(name: &str) -> bool {
        BUILTIN_GLOBALS.contains(&name)
    }

    /// The name-to-declaration-span map accumulated so far (last
    /// declaration wins on redeclaration).
    pub fn positions(&self) -> &HashMap<String, Span> {
        &self.positions
    }

    /// Current nesting depth, root frame included.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }
}

impl Default for ScopeStack {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtins_visible_from_the_start() {
        let scopes = ScopeStack::new();
        assert!(scopes.is_declared("console"));
        assert!(scopes.is_declared("setTimeout"));
        assert!(!scopes.is_declared("window"));
        assert!(ScopeStack::is_builtin("Math"));
        assert!(!ScopeStack::is_builtin("myVar"));
    }

    #[test]
    fn test_declare_then_lookup_through_enclosing_scopes() {
        let mut scopes = ScopeStack::new();
        scopes.declare("outer", Span::new(4, 9));
        scopes.enter_scope();
        scopes.declare("inner", Span::new(20, 25));

        assert!(scopes.is_declared("inner"));
        assert!(scopes.is_declared("outer"));

        scopes.exit_scope();
        assert!(!scopes.is_declared("inner"));
        assert!(scopes.is_declared("outer"));
    }

    #[test]
    fn test_root_frame_never_popped() {
        let mut scopes = ScopeStack::new();
        scopes.exit_scope();
        scopes.exit_scope();
        assert_eq!(scopes.depth(), 1);
        assert!(scopes.is_declared("console"));
    }

    #[test]
    fn test_redeclaration_overwrites_position() {
        let mut scopes = ScopeStack::new();
        scopes.declare("x", Span::new(4, 5));
        scopes.declare("x", Span::new(14, 15));
        assert_eq!(scopes.positions()["x"], Span::new(14, 15));
    }

    #[test]
    fn test_positions_survive_scope_exit() {
        // The position map is global to the analysis; exit_scope only
        // affects visibility.
        let mut scopes = ScopeStack::new();
        scopes.enter_scope();
        scopes.declare("temp", Span::new(10, 14));
        scopes.exit_scope();
        assert!(!scopes.is_declared("temp"));
        assert!(scopes.positions().contains_key("temp"));
    }
}
