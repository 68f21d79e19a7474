// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Scope tree for name lookup.

use std::collections::HashMap;

use pgsl_ast::NodeId;

/// Unique identifier for a scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(pub u32);

/// The kind of scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    /// Module scope (top-level variables).
    Module,
    /// Function parameters and the outermost body block.
    Function,
    /// Block scope (within a function).
    Block,
    /// Loop body, for break/continue validation.
    Loop,
    /// Switch case body, a target for break only.
    Switch,
}

/// A scope in the scope tree.
#[derive(Debug)]
pub struct Scope {
    pub id: ScopeId,
    pub parent: Option<ScopeId>,
    pub kind: ScopeKind,
    /// Name to declaring node.
    pub bindings: HashMap<String, NodeId>,
}

/// Tree of scopes for name lookup.
#[derive(Debug)]
pub struct ScopeTree {
    scopes: Vec<Scope>,
    current: ScopeId,
}

impl ScopeTree {
    /// Create a new scope tree with a module scope.
    pub fn new() -> Self {
        let module = Scope {
            id: ScopeId(0),
            parent: None,
            kind: ScopeKind::Module,
            bindings: HashMap::new(),
        };
        Self {
            scopes: vec![module],
            current: ScopeId(0),
        }
    }

    /// Push a new scope.
    pub fn push(&mut self, kind: ScopeKind) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(Scope {
            id,
            parent: Some(self.current),
            kind,
            bindings: HashMap::new(),
        });
        self.current = id;
        id
    }

    /// Pop the current scope and return to parent.
    pub fn pop(&mut self) {
        if let Some(parent) = self.scopes.get(self.current.0 as usize).and_then(|s| s.parent) {
            self.current = parent;
        }
    }

    pub fn current(&self) -> ScopeId {
        self.current
    }

    pub fn get(&self, id: ScopeId) -> Option<&Scope> {
        self.scopes.get(id.0 as usize)
    }

    /// Look up a name in the current scope chain.
    pub fn lookup(&self, name: &str) -> Option<NodeId> {
        self.chain().find_map(|scope| scope.bindings.get(name).copied())
    }

    /// Define a name in the current scope.
    ///
    /// Redeclaring a name in the same frame fails with the earlier
    /// declaration. Inner frames may shadow outer ones.
    pub fn define(&mut self, name: &str, node: NodeId) -> Result<(), NodeId> {
        let scope = &mut self.scopes[self.current.0 as usize];
        match scope.bindings.get(name) {
            Some(&previous) => Err(previous),
            None => {
                scope.bindings.insert(name.to_string(), node);
                Ok(())
            }
        }
    }

    /// Every name visible from the current scope.
    pub fn visible_names(&self) -> impl Iterator<Item = &str> {
        self.chain().flat_map(|scope| scope.bindings.keys().map(String::as_str))
    }

    /// Check if we're currently inside a loop.
    pub fn in_loop(&self) -> bool {
        self.enclosing(|kind| kind == ScopeKind::Loop)
    }

    /// Check if `break` has a target.
    pub fn in_breakable(&self) -> bool {
        self.enclosing(|kind| matches!(kind, ScopeKind::Loop | ScopeKind::Switch))
    }

    /// Search up to the function boundary.
    fn enclosing(&self, matches: impl Fn(ScopeKind) -> bool) -> bool {
        for scope in self.chain() {
            if matches(scope.kind) {
                return true;
            }
            if scope.kind == ScopeKind::Function {
                return false;
            }
        }
        false
    }

    fn chain(&self) -> impl Iterator<Item = &Scope> {
        std::iter::successors(self.get(self.current), |scope| scope.parent.and_then(|p| self.get(p)))
    }
}

impl Default for ScopeTree {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inner_scope_shadows_until_popped() {
        let mut scopes = ScopeTree::new();
        scopes.define("x", NodeId(1)).unwrap();
        scopes.push(ScopeKind::Block);
        scopes.define("x", NodeId(2)).unwrap();
        assert_eq!(scopes.lookup("x"), Some(NodeId(2)));
        scopes.pop();
        assert_eq!(scopes.lookup("x"), Some(NodeId(1)));
    }

    #[test]
    fn redeclaration_in_same_frame_fails() {
        let mut scopes = ScopeTree::new();
        scopes.push(ScopeKind::Function);
        scopes.define("a", NodeId(1)).unwrap();
        assert_eq!(scopes.define("a", NodeId(2)), Err(NodeId(1)));
    }

    #[test]
    fn loops_stop_at_function_boundary() {
        let mut scopes = ScopeTree::new();
        scopes.push(ScopeKind::Function);
        assert!(!scopes.in_breakable());
        scopes.push(ScopeKind::Switch);
        assert!(scopes.in_breakable());
        assert!(!scopes.in_loop());
        scopes.pop();
        scopes.push(ScopeKind::Loop);
        scopes.push(ScopeKind::Block);
        assert!(scopes.in_loop());
    }
}
