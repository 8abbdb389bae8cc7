//! # Symbol Tables
//!
//! Three tables back the checker:
//!
//! - [`QualifierTable`]: qualifier name → defining module name. Populated
//!   from module declarations (a qualifier is defined exactly by the module
//!   of the same name); a qualifier used in a type expression but never
//!   defined is an error.
//! - [`ProcTable`]: procedure name → signatures in declaration order (the
//!   dispatch set). Inserting a signature whose return type disagrees with
//!   an existing same-named signature is rejected.
//! - [`Scopes`]: a stack of variable frames. Module-level variables form
//!   the outermost frame for that module's procedures; parameters and
//!   locals are pushed per procedure body. Lookups search innermost out.

use std::collections::HashMap;

use lachs::Span;

use super::error::{NameKind, TypeError};
use super::ty::{Signature, Type};

/// Qualifier name → defining module name (always string-equal).
#[derive(Debug, Clone, Default)]
pub struct QualifierTable {
    defined: HashMap<String, String>,
}

impl QualifierTable {
    pub fn new() -> Self {
        QualifierTable::default()
    }

    /// Register the qualifier a module defines. Two modules with the same
    /// name are a duplicate declaration.
    pub fn define(&mut self, module: &str, span: &Span) -> Result<(), TypeError> {
        if self.defined.contains_key(module) {
            return Err(TypeError::duplicate(NameKind::Module, module, span.clone()));
        }
        self.defined
            .insert(module.to_string(), module.to_string());
        Ok(())
    }

    pub fn is_defined(&self, qualifier: &str) -> bool {
        self.defined.contains_key(qualifier)
    }

    /// Entries sorted by qualifier name, for the symbol-table dump.
    pub fn entries(&self) -> Vec<(String, String)> {
        let mut entries: Vec<(String, String)> = self
            .defined
            .iter()
            .map(|(q, m)| (q.clone(), m.clone()))
            .collect();
        entries.sort();
        entries
    }
}

/// Procedure name → dispatch set, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct ProcTable {
    by_name: HashMap<String, Vec<Signature>>,
    next_id: usize,
}

impl ProcTable {
    pub fn new() -> Self {
        ProcTable::default()
    }

    /// Add a signature, enforcing return-type coherence against the
    /// signatures already declared under the same name. Returns the new
    /// signature's id.
    pub fn insert(
        &mut self,
        name: &str,
        params: Vec<Type>,
        return_type: Type,
        module: Option<String>,
        span: &Span,
    ) -> Result<usize, TypeError> {
        if let Some(existing) = self.by_name.get(name).and_then(|sigs| sigs.first()) {
            if !existing.return_type.equal_modulo_vars(&return_type) {
                return Err(TypeError::ReturnTypeDivergence {
                    name: name.to_string(),
                    expected: existing.return_type.clone(),
                    found: return_type,
                    span: span.clone(),
                });
            }
        }

        let id = self.next_id;
        self.next_id += 1;
        self.by_name.entry(name.to_string()).or_default().push(Signature {
            id,
            name: name.to_string(),
            params,
            return_type,
            module,
            position: span.clone(),
        });
        Ok(id)
    }

    pub fn lookup(&self, name: &str) -> Option<&[Signature]> {
        self.by_name.get(name).map(|sigs| sigs.as_slice())
    }

    /// Number of candidates declared under a name.
    pub fn candidate_count(&self, name: &str) -> usize {
        self.by_name.get(name).map_or(0, |sigs| sigs.len())
    }

    /// All signatures in declaration (id) order, pretty-printed.
    pub fn entries(&self) -> Vec<String> {
        let mut sigs: Vec<&Signature> = self.by_name.values().flatten().collect();
        sigs.sort_by_key(|sig| sig.id);
        sigs.iter().map(|sig| sig.pretty()).collect()
    }
}

/// Stack of variable frames, innermost last.
#[derive(Debug, Clone, Default)]
pub struct Scopes {
    frames: Vec<HashMap<String, Type>>,
}

impl Scopes {
    pub fn new() -> Self {
        Scopes::default()
    }

    pub fn push_frame(&mut self) {
        self.frames.push(HashMap::new());
    }

    pub fn pop_frame(&mut self) {
        self.frames.pop();
    }

    /// Declare a variable in the innermost frame. Shadowing an outer frame
    /// is fine; redeclaring within the same frame is not.
    pub fn declare(&mut self, name: &str, ty: Type, span: &Span) -> Result<(), TypeError> {
        let frame = self
            .frames
            .last_mut()
            .expect("declare called with no open scope frame");
        if frame.contains_key(name) {
            return Err(TypeError::duplicate(NameKind::Variable, name, span.clone()));
        }
        frame.insert(name.to_string(), ty);
        Ok(())
    }

    /// Look a variable up, innermost frame first.
    pub fn lookup(&self, name: &str) -> Option<&Type> {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.get(name))
    }
}
