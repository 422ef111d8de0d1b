//! The traversal driver: one depth-first pass that turns a parsed tree
//! and its scope analysis into per-scope symbol tables.

use crate::ancestors::AncestorStack;
use crate::path::{escape_table_key, join_context, resolve_member};
use crate::table::{FileIndex, ScopeIndex, SymbolTable};
use bumpalo::Bump;
use jstags_ast::node::{Expression, NodeId, SourceFile};
use jstags_ast::walk::{ChildField, NodeRef};
use jstags_ast::SyntaxKind;
use jstags_core::intern::StringInterner;
use jstags_core::text::TextRange;
use jstags_diagnostics::DiagnosticCollection;
use jstags_parser::Parser;
use jstags_scopes::{ScopeError, ScopeManager};
use thiserror::Error;
use tracing::{debug, trace};

/// Fatal conditions that abort indexing of a file. Unresolvable name
/// fragments are not among them; those degrade to placeholder fragments
/// and the pass continues.
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("cannot index '{file}': {} syntax error(s)", .diagnostics.error_count())]
    ParseFailed {
        file: String,
        diagnostics: DiagnosticCollection,
    },
    #[error("cannot index '{file}': scope analysis produced no scopes")]
    MissingScopeData { file: String },
    #[error("scope closed without a matching open at offset {offset} in '{file}'")]
    ScopeMismatch { file: String, offset: u32 },
    #[error("scope engine contract violation in '{file}'")]
    Engine {
        file: String,
        #[source]
        source: ScopeError,
    },
}

/// An open scope during traversal: where its table lives in the result
/// vector, which node closes it, and the object-literal context active
/// inside it.
struct Frame {
    scope_idx: usize,
    block: NodeId,
    object_context: Vec<String>,
    /// Nodes that pushed an object-context entry, innermost last, so the
    /// matching pop happens on their exit without marking the tree.
    context_owners: Vec<NodeId>,
}

/// Walks one parsed file and records every occurrence of every path into
/// the symbol table of the scope that owns it.
pub struct Indexer<'a> {
    file_name: String,
    scopes: ScopeManager,
    ancestors: AncestorStack<'a>,
    frames: Vec<Frame>,
    result: Vec<ScopeIndex>,
}

impl<'a> Indexer<'a> {
    pub fn new(file_name: &str, scopes: ScopeManager) -> Self {
        Self {
            file_name: file_name.to_string(),
            scopes,
            ancestors: AncestorStack::new(),
            frames: Vec::new(),
            result: Vec::new(),
        }
    }

    /// Run the single pass over `file` and hand back the completed index.
    pub fn index(mut self, file: &'a SourceFile<'a>) -> Result<FileIndex, IndexError> {
        self.walk(NodeRef::SourceFile(file))?;
        if let Err(source) = self.scopes.close() {
            return Err(IndexError::Engine {
                file: self.file_name,
                source,
            });
        }
        debug!(
            file = %self.file_name,
            scopes = self.result.len(),
            "indexing complete"
        );
        Ok(FileIndex {
            file: self.file_name,
            scopes: self.result,
        })
    }

    fn walk(&mut self, node: NodeRef<'a>) -> Result<(), IndexError> {
        self.enter(node)?;
        let mut deferred = None;
        node.for_each_child(&mut |child| {
            if deferred.is_none() {
                if let Err(e) = self.walk(child) {
                    deferred = Some(e);
                }
            }
        });
        if let Some(e) = deferred {
            return Err(e);
        }
        self.leave(node)
    }

    // ========================================================================
    // Entry: scope opening, object-literal context, classification
    // ========================================================================

    fn enter(&mut self, node: NodeRef<'a>) -> Result<(), IndexError> {
        self.ancestors.push(node);

        if let Some(scope) = self.scopes.acquire(node.id()) {
            trace!(kind = ?scope.kind, range = ?scope.range, "open scope");
            let scope_idx = self.result.len();
            self.result.push(ScopeIndex {
                kind: scope.kind,
                range: scope.range,
                table: SymbolTable::new(),
            });
            self.frames.push(Frame {
                scope_idx,
                block: node.id(),
                object_context: Vec::new(),
                context_owners: Vec::new(),
            });
        }
        if self.frames.is_empty() {
            // the root node must open the global scope before anything records
            return Err(IndexError::MissingScopeData {
                file: self.file_name.clone(),
            });
        }

        match node {
            NodeRef::ObjectLiteral(_) => {
                if self.ancestors.is_child(ChildField::Init)
                    && self.ancestors.parent_kind_is(SyntaxKind::VariableDeclarator)
                {
                    if let Some(NodeRef::VariableDeclarator(decl)) = self.ancestors.parent() {
                        self.push_object_context(node.id(), decl.name.text_name.clone());
                    }
                } else if self.ancestors.is_child(ChildField::Value)
                    && self.ancestors.parent_kind_is(SyntaxKind::Property)
                {
                    if let Some(NodeRef::Property(prop)) = self.ancestors.parent() {
                        self.push_object_context(node.id(), prop.key.text().to_string());
                    }
                }
            }
            NodeRef::MemberAccess(access) => {
                // a constant computed key never shows up as an identifier
                // visit, so the whole chain is recorded here
                if let Expression::Literal(lit) = access.property {
                    let path = self.prefixed(&resolve_member(access));
                    self.record(path, lit.data.range, false);
                }
            }
            NodeRef::Identifier(ident) => {
                let mut declaring = false;
                let suffix = if self.ancestors.parent_kind_is(SyntaxKind::MemberAccess)
                    && self.ancestors.is_child(ChildField::Property)
                {
                    match self.ancestors.parent() {
                        Some(NodeRef::MemberAccess(access)) => resolve_member(access),
                        _ => ident.text_name.clone(),
                    }
                } else {
                    declaring = self.declares_binding();
                    ident.text_name.clone()
                };
                let path = self.prefixed(&suffix);
                self.record(path, ident.data.range, declaring);
            }
            _ => {}
        }
        Ok(())
    }

    /// Whether the identifier on top of the stack introduces its name:
    /// the name of a variable declarator, or a property key directly
    /// under an object literal that initializes a variable declarator.
    fn declares_binding(&self) -> bool {
        if self.ancestors.parent_kind_is(SyntaxKind::VariableDeclarator)
            && self.ancestors.is_child(ChildField::Name)
        {
            return true;
        }
        let top = self.ancestors.top_offset();
        top >= 2
            && self.ancestors.parent_kind_is(SyntaxKind::Property)
            && self.ancestors.is_child(ChildField::Key)
            && self.ancestors.parent_kind_is_at(SyntaxKind::ObjectLiteral, top - 1)
            && self.ancestors.parent_kind_is_at(SyntaxKind::VariableDeclarator, top - 2)
            && self.ancestors.is_child_at(ChildField::Init, top - 2)
    }

    // ========================================================================
    // Exit: context pops, scope closing
    // ========================================================================

    fn leave(&mut self, node: NodeRef<'a>) -> Result<(), IndexError> {
        if let Some(frame) = self.frames.last_mut() {
            if frame.context_owners.last() == Some(&node.id()) {
                frame.context_owners.pop();
                frame.object_context.pop();
            }
        }

        self.ancestors.pop();

        if self.scopes.release(node.id()) {
            match self.frames.pop() {
                Some(frame) if frame.block == node.id() => {
                    trace!(range = ?node.range(), "close scope");
                }
                _ => {
                    return Err(IndexError::ScopeMismatch {
                        file: self.file_name.clone(),
                        offset: node.range().pos,
                    });
                }
            }
        }
        Ok(())
    }

    // ========================================================================
    // Recording
    // ========================================================================

    fn push_object_context(&mut self, owner: NodeId, name: String) {
        let frame = self
            .frames
            .last_mut()
            .expect("object context requires an open scope");
        frame.object_context.push(name);
        frame.context_owners.push(owner);
    }

    fn prefixed(&self, suffix: &str) -> String {
        match self.frames.last() {
            Some(frame) => join_context(&frame.object_context, suffix),
            None => suffix.to_string(),
        }
    }

    /// The insertion rule. A declaring occurrence always lands in the
    /// innermost scope; a referencing occurrence attaches to the
    /// innermost scope already holding the path, falling back to the
    /// innermost scope when none does.
    fn record(&mut self, path: String, range: TextRange, declaring: bool) {
        let path = escape_table_key(path);
        let mut target = self.frames.len() - 1;
        if !declaring {
            for i in (0..self.frames.len()).rev() {
                if self.result[self.frames[i].scope_idx].table.contains(&path) {
                    target = i;
                    break;
                }
            }
        }
        let scope_idx = self.frames[target].scope_idx;
        trace!(%path, ?range, declaring, scope = scope_idx, "record");
        self.result[scope_idx].table.push(path, range);
    }
}

// ============================================================================
// File-level entry points
// ============================================================================

/// Parse and index one file. Fatal conditions (syntax errors, scope
/// engine violations) abort this file only and surface as `Err`.
pub fn index_source(file_name: &str, source: &str) -> Result<FileIndex, IndexError> {
    let arena = Bump::new();
    let interner = StringInterner::new();
    let mut parser = Parser::new(&arena, &interner, file_name, source);
    let file = parser.parse_source_file();
    let diagnostics = parser.take_diagnostics();
    if diagnostics.has_errors() {
        return Err(IndexError::ParseFailed {
            file: file_name.to_string(),
            diagnostics,
        });
    }

    let manager = ScopeManager::open(&file);
    Indexer::new(file_name, manager).index(&file)
}

/// Parse and index one file, delivering the completed index to `receive`
/// once the pass finishes.
pub fn index_with<F>(file_name: &str, source: &str, receive: F) -> Result<(), IndexError>
where
    F: FnOnce(&FileIndex),
{
    let index = index_source(file_name, source)?;
    receive(&index);
    Ok(())
}
