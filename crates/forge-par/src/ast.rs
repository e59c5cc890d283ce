//! Syntax tree node definitions.
//!
//! The whole tree for one translation unit lives in a single [`SyntaxTree`]
//! arena; nodes refer to their children through [`NodeId`] indices. This
//! gives the tree a simple ownership story: the arena owns every node, and
//! back-references (a symbol to the declaration it names) are plain ids
//! that never form ownership cycles.
//!
//! Children that the language requires are still `Option<NodeId>` in the
//! data model. A `None` there is a malformed tree, which is exactly what
//! the well-formedness pass exists to detect before any later pass relies
//! on the shape.
//!
//! Annotations (`resolved_type`, `referenced_declaration`, attached scopes)
//! are not children: traversal never descends into them.

use forge_util::Span;

/// Index of a node in a [`SyntaxTree`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    fn from_index(index: usize) -> Self {
        assert!(index <= u32::MAX as usize);
        NodeId(index as u32)
    }
}

/// Index of a scope attached to a block or translation unit
///
/// Scopes themselves are owned by the resolver's scope table; the tree only
/// records which scope a scope-owning node carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ScopeId(pub u32);

/// Kind of a basic (unsized) type
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TypeBasicKind {
    Bool,
    Void,
    Isize,
    Usize,
}

/// Kind of a sized numeric type
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TypeWithBitWidthKind {
    SignedInt,
    UnsignedInt,
    Float,
}

/// Kind of a unary type constructor
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TypeUnaryKind {
    Pointer,
}

/// Unary value operators
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOperator {
    BoolNot,
    BitNot,
    Pos,
    Neg,
    Deref,
    GetAddr,
}

/// Binary value operators
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOperator {
    BoolAnd,
    BoolOr,
    BitAnd,
    BitOr,
    BitXor,
    BitShl,
    BitShr,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Exp,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Assign,
    BitAndAssign,
    BitOrAssign,
    BitXorAssign,
    BitShlAssign,
    BitShrAssign,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
    ModAssign,
    ExpAssign,
    MemberAccess,
}

impl BinaryOperator {
    /// `== != < <= > >=`
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            Self::Eq | Self::Ne | Self::Lt | Self::Le | Self::Gt | Self::Ge
        )
    }

    /// `&& ||`
    pub fn is_logical(self) -> bool {
        matches!(self, Self::BoolAnd | Self::BoolOr)
    }

    /// `& | ^ << >>`
    pub fn is_bitwise(self) -> bool {
        matches!(
            self,
            Self::BitAnd | Self::BitOr | Self::BitXor | Self::BitShl | Self::BitShr
        )
    }

    /// `+ - * / % **`
    pub fn is_arithmetic(self) -> bool {
        matches!(
            self,
            Self::Add | Self::Sub | Self::Mul | Self::Div | Self::Mod | Self::Exp
        )
    }

    /// For a compound assignment, the operator it applies before storing
    pub fn compound_base(self) -> Option<BinaryOperator> {
        match self {
            Self::BitAndAssign => Some(Self::BitAnd),
            Self::BitOrAssign => Some(Self::BitOr),
            Self::BitXorAssign => Some(Self::BitXor),
            Self::BitShlAssign => Some(Self::BitShl),
            Self::BitShrAssign => Some(Self::BitShr),
            Self::AddAssign => Some(Self::Add),
            Self::SubAssign => Some(Self::Sub),
            Self::MulAssign => Some(Self::Mul),
            Self::DivAssign => Some(Self::Div),
            Self::ModAssign => Some(Self::Mod),
            Self::ExpAssign => Some(Self::Exp),
            _ => None,
        }
    }

    /// `=` or any compound assignment
    pub fn is_assignment(self) -> bool {
        self == Self::Assign || self.compound_base().is_some()
    }
}

/// Kind of a childless statement
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatementBasicKind {
    Continue,
    Break,
    ReturnVoid,
}

/// Kind of a value-carrying statement
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatementValueKind {
    /// Evaluate and discard the result
    Execute,
    /// Return the value from the enclosing function
    Return,
}

/// Raw storage of a number literal, matching its declared type
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum NumberValue {
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
}

/// The payload of a syntax-tree node
///
/// One closed sum for every kind in the language: types, values,
/// statements, declarations, and the translation unit root. Dispatch
/// tables match on this enum without wildcard arms, so a missing branch is
/// a compile error rather than a runtime surprise.
#[derive(Clone, Debug)]
pub enum NodeKind {
    // -- Types ------------------------------------------------------------
    TypeBasic {
        basic_kind: TypeBasicKind,
        is_const: bool,
    },
    TypeWithBitWidth {
        width_kind: TypeWithBitWidthKind,
        bit_width: u32,
        is_const: bool,
    },
    TypeSymbol {
        name: String,
        referenced_declaration: Option<NodeId>,
        is_const: bool,
    },
    TypeUnary {
        unary_kind: TypeUnaryKind,
        operand_type: Option<NodeId>,
        is_const: bool,
    },
    TypeFunction {
        return_type: Option<NodeId>,
        arg_types: Vec<NodeId>,
        is_const: bool,
    },
    TypeStructured {
        members: Vec<NodeId>,
        is_const: bool,
    },

    // -- Values -----------------------------------------------------------
    ValueLiteralBool {
        value: bool,
        resolved_type: Option<NodeId>,
    },
    ValueLiteralNumber {
        /// The literal's declared type (a `TypeWithBitWidth`)
        ty: Option<NodeId>,
        value: NumberValue,
        resolved_type: Option<NodeId>,
    },
    ValueSymbol {
        name: String,
        referenced_declaration: Option<NodeId>,
        resolved_type: Option<NodeId>,
    },
    ValueUnary {
        operator: UnaryOperator,
        operand: Option<NodeId>,
        resolved_type: Option<NodeId>,
    },
    ValueBinary {
        operator: BinaryOperator,
        lhs: Option<NodeId>,
        rhs: Option<NodeId>,
        resolved_type: Option<NodeId>,
    },
    ValueCall {
        callee: Option<NodeId>,
        args: Vec<NodeId>,
        resolved_type: Option<NodeId>,
    },
    ValueCast {
        value: Option<NodeId>,
        ty: Option<NodeId>,
        resolved_type: Option<NodeId>,
    },

    // -- Statements -------------------------------------------------------
    StatementBasic {
        basic_kind: StatementBasicKind,
    },
    StatementValue {
        value_kind: StatementValueKind,
        value: Option<NodeId>,
    },
    StatementDeclaration {
        declaration: Option<NodeId>,
    },
    StatementBlock {
        statements: Vec<NodeId>,
        scope: Option<ScopeId>,
    },
    StatementIf {
        condition: Option<NodeId>,
        then_branch: Option<NodeId>,
        /// If present, must be a block or another if (else-if chain)
        else_branch: Option<NodeId>,
    },
    StatementWhile {
        condition: Option<NodeId>,
        body: Option<NodeId>,
        is_do_while: bool,
    },

    // -- Declarations -----------------------------------------------------
    DeclarationVariable {
        name: String,
        /// May be omitted when an initial value supplies the type
        ty: Option<NodeId>,
        initial_value: Option<NodeId>,
        resolved_type: Option<NodeId>,
    },
    DeclarationFunction {
        name: String,
        /// `DeclarationVariable` nodes, one per argument
        args: Vec<NodeId>,
        return_type: Option<NodeId>,
        /// A `StatementBlock`
        body: Option<NodeId>,
        resolved_type: Option<NodeId>,
    },
    DeclarationTypeAlias {
        name: String,
        ty: Option<NodeId>,
        resolved_type: Option<NodeId>,
    },
    DeclarationStructuredType {
        name: String,
        members: Vec<NodeId>,
        /// `TypeSymbol` nodes naming the inherited structured types
        inherits: Vec<NodeId>,
        resolved_type: Option<NodeId>,
    },
    DeclarationNamespace {
        name: String,
        members: Vec<NodeId>,
    },

    // -- Root -------------------------------------------------------------
    TranslationUnit {
        declarations: Vec<NodeId>,
        scope: Option<ScopeId>,
    },
}

/// The bare discriminator of a [`NodeKind`]
///
/// Dispatch tables match on this copyable tag so they can release the node
/// borrow before handing control to a handler. The enum is closed: every
/// `match` over it is exhaustive with no wildcard arm.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Kind {
    TypeBasic,
    TypeWithBitWidth,
    TypeSymbol,
    TypeUnary,
    TypeFunction,
    TypeStructured,
    ValueLiteralBool,
    ValueLiteralNumber,
    ValueSymbol,
    ValueUnary,
    ValueBinary,
    ValueCall,
    ValueCast,
    StatementBasic,
    StatementValue,
    StatementDeclaration,
    StatementBlock,
    StatementIf,
    StatementWhile,
    DeclarationVariable,
    DeclarationFunction,
    DeclarationTypeAlias,
    DeclarationStructuredType,
    DeclarationNamespace,
    TranslationUnit,
}

impl NodeKind {
    /// The bare discriminator for this payload
    pub fn tag(&self) -> Kind {
        match self {
            NodeKind::TypeBasic { .. } => Kind::TypeBasic,
            NodeKind::TypeWithBitWidth { .. } => Kind::TypeWithBitWidth,
            NodeKind::TypeSymbol { .. } => Kind::TypeSymbol,
            NodeKind::TypeUnary { .. } => Kind::TypeUnary,
            NodeKind::TypeFunction { .. } => Kind::TypeFunction,
            NodeKind::TypeStructured { .. } => Kind::TypeStructured,
            NodeKind::ValueLiteralBool { .. } => Kind::ValueLiteralBool,
            NodeKind::ValueLiteralNumber { .. } => Kind::ValueLiteralNumber,
            NodeKind::ValueSymbol { .. } => Kind::ValueSymbol,
            NodeKind::ValueUnary { .. } => Kind::ValueUnary,
            NodeKind::ValueBinary { .. } => Kind::ValueBinary,
            NodeKind::ValueCall { .. } => Kind::ValueCall,
            NodeKind::ValueCast { .. } => Kind::ValueCast,
            NodeKind::StatementBasic { .. } => Kind::StatementBasic,
            NodeKind::StatementValue { .. } => Kind::StatementValue,
            NodeKind::StatementDeclaration { .. } => Kind::StatementDeclaration,
            NodeKind::StatementBlock { .. } => Kind::StatementBlock,
            NodeKind::StatementIf { .. } => Kind::StatementIf,
            NodeKind::StatementWhile { .. } => Kind::StatementWhile,
            NodeKind::DeclarationVariable { .. } => Kind::DeclarationVariable,
            NodeKind::DeclarationFunction { .. } => Kind::DeclarationFunction,
            NodeKind::DeclarationTypeAlias { .. } => Kind::DeclarationTypeAlias,
            NodeKind::DeclarationStructuredType { .. } => Kind::DeclarationStructuredType,
            NodeKind::DeclarationNamespace { .. } => Kind::DeclarationNamespace,
            NodeKind::TranslationUnit { .. } => Kind::TranslationUnit,
        }
    }

    /// Short kind name for diagnostics and internal errors
    pub fn kind_name(&self) -> &'static str {
        match self {
            NodeKind::TypeBasic { .. } => "TypeBasic",
            NodeKind::TypeWithBitWidth { .. } => "TypeWithBitWidth",
            NodeKind::TypeSymbol { .. } => "TypeSymbol",
            NodeKind::TypeUnary { .. } => "TypeUnary",
            NodeKind::TypeFunction { .. } => "TypeFunction",
            NodeKind::TypeStructured { .. } => "TypeStructured",
            NodeKind::ValueLiteralBool { .. } => "ValueLiteralBool",
            NodeKind::ValueLiteralNumber { .. } => "ValueLiteralNumber",
            NodeKind::ValueSymbol { .. } => "ValueSymbol",
            NodeKind::ValueUnary { .. } => "ValueUnary",
            NodeKind::ValueBinary { .. } => "ValueBinary",
            NodeKind::ValueCall { .. } => "ValueCall",
            NodeKind::ValueCast { .. } => "ValueCast",
            NodeKind::StatementBasic { .. } => "StatementBasic",
            NodeKind::StatementValue { .. } => "StatementValue",
            NodeKind::StatementDeclaration { .. } => "StatementDeclaration",
            NodeKind::StatementBlock { .. } => "StatementBlock",
            NodeKind::StatementIf { .. } => "StatementIf",
            NodeKind::StatementWhile { .. } => "StatementWhile",
            NodeKind::DeclarationVariable { .. } => "DeclarationVariable",
            NodeKind::DeclarationFunction { .. } => "DeclarationFunction",
            NodeKind::DeclarationTypeAlias { .. } => "DeclarationTypeAlias",
            NodeKind::DeclarationStructuredType { .. } => "DeclarationStructuredType",
            NodeKind::DeclarationNamespace { .. } => "DeclarationNamespace",
            NodeKind::TranslationUnit { .. } => "TranslationUnit",
        }
    }

    /// Returns true for the type family
    pub fn is_type(&self) -> bool {
        matches!(
            self,
            NodeKind::TypeBasic { .. }
                | NodeKind::TypeWithBitWidth { .. }
                | NodeKind::TypeSymbol { .. }
                | NodeKind::TypeUnary { .. }
                | NodeKind::TypeFunction { .. }
                | NodeKind::TypeStructured { .. }
        )
    }

    /// Returns true for the value family
    pub fn is_value(&self) -> bool {
        matches!(
            self,
            NodeKind::ValueLiteralBool { .. }
                | NodeKind::ValueLiteralNumber { .. }
                | NodeKind::ValueSymbol { .. }
                | NodeKind::ValueUnary { .. }
                | NodeKind::ValueBinary { .. }
                | NodeKind::ValueCall { .. }
                | NodeKind::ValueCast { .. }
        )
    }

    /// Returns true for the declaration family
    pub fn is_declaration(&self) -> bool {
        matches!(
            self,
            NodeKind::DeclarationVariable { .. }
                | NodeKind::DeclarationFunction { .. }
                | NodeKind::DeclarationTypeAlias { .. }
                | NodeKind::DeclarationStructuredType { .. }
                | NodeKind::DeclarationNamespace { .. }
        )
    }
}

/// A node: a span plus its kind-specific payload
#[derive(Clone, Debug)]
pub struct Node {
    pub span: Span,
    pub kind: NodeKind,
}

/// Arena owning every node of one parsed translation unit
#[derive(Default)]
pub struct SyntaxTree {
    nodes: Vec<Node>,
}

impl SyntaxTree {
    /// Create an empty tree
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a node and return its id
    pub fn alloc(&mut self, span: Span, kind: NodeKind) -> NodeId {
        let id = NodeId::from_index(self.nodes.len());
        self.nodes.push(Node { span, kind });
        id
    }

    /// Number of nodes in the arena
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the arena holds no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Borrow a node
    #[inline]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    /// Borrow a node's payload
    #[inline]
    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.index()].kind
    }

    /// Mutably borrow a node's payload
    #[inline]
    pub fn kind_mut(&mut self, id: NodeId) -> &mut NodeKind {
        &mut self.nodes[id.index()].kind
    }

    /// A node's source span
    #[inline]
    pub fn span(&self, id: NodeId) -> Span {
        self.nodes[id.index()].span
    }

    /// Iterate over every node id in allocation order
    pub fn ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.nodes.len()).map(NodeId::from_index)
    }

    /// The owned children of a node, in declared field order
    ///
    /// Annotations (`resolved_type`, `referenced_declaration`) are not
    /// children. Traversal order over the tree is exactly the order
    /// returned here.
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        match self.kind(id) {
            NodeKind::TypeBasic { .. }
            | NodeKind::TypeWithBitWidth { .. }
            | NodeKind::TypeSymbol { .. } => {}
            NodeKind::TypeUnary { operand_type, .. } => out.extend(operand_type.iter().copied()),
            NodeKind::TypeFunction {
                return_type,
                arg_types,
                ..
            } => {
                out.extend(return_type.iter().copied());
                out.extend(arg_types.iter().copied());
            }
            NodeKind::TypeStructured { members, .. } => out.extend(members.iter().copied()),
            NodeKind::ValueLiteralBool { .. } => {}
            NodeKind::ValueLiteralNumber { ty, .. } => out.extend(ty.iter().copied()),
            NodeKind::ValueSymbol { .. } => {}
            NodeKind::ValueUnary { operand, .. } => out.extend(operand.iter().copied()),
            NodeKind::ValueBinary { lhs, rhs, .. } => {
                out.extend(lhs.iter().copied());
                out.extend(rhs.iter().copied());
            }
            NodeKind::ValueCall { callee, args, .. } => {
                out.extend(callee.iter().copied());
                out.extend(args.iter().copied());
            }
            NodeKind::ValueCast { value, ty, .. } => {
                out.extend(value.iter().copied());
                out.extend(ty.iter().copied());
            }
            NodeKind::StatementBasic { .. } => {}
            NodeKind::StatementValue { value, .. } => out.extend(value.iter().copied()),
            NodeKind::StatementDeclaration { declaration } => {
                out.extend(declaration.iter().copied())
            }
            NodeKind::StatementBlock { statements, .. } => out.extend(statements.iter().copied()),
            NodeKind::StatementIf {
                condition,
                then_branch,
                else_branch,
            } => {
                out.extend(condition.iter().copied());
                out.extend(then_branch.iter().copied());
                out.extend(else_branch.iter().copied());
            }
            NodeKind::StatementWhile {
                condition, body, ..
            } => {
                out.extend(condition.iter().copied());
                out.extend(body.iter().copied());
            }
            NodeKind::DeclarationVariable {
                ty, initial_value, ..
            } => {
                out.extend(ty.iter().copied());
                out.extend(initial_value.iter().copied());
            }
            NodeKind::DeclarationFunction {
                args,
                return_type,
                body,
                ..
            } => {
                out.extend(args.iter().copied());
                out.extend(return_type.iter().copied());
                out.extend(body.iter().copied());
            }
            NodeKind::DeclarationTypeAlias { ty, .. } => out.extend(ty.iter().copied()),
            NodeKind::DeclarationStructuredType {
                members, inherits, ..
            } => {
                out.extend(members.iter().copied());
                out.extend(inherits.iter().copied());
            }
            NodeKind::DeclarationNamespace { members, .. } => out.extend(members.iter().copied()),
            NodeKind::TranslationUnit { declarations, .. } => {
                out.extend(declarations.iter().copied())
            }
        }
        out
    }

    /// The declared name of a declaration or symbol node
    pub fn name_of(&self, id: NodeId) -> Option<&str> {
        match self.kind(id) {
            NodeKind::TypeSymbol { name, .. }
            | NodeKind::ValueSymbol { name, .. }
            | NodeKind::DeclarationVariable { name, .. }
            | NodeKind::DeclarationFunction { name, .. }
            | NodeKind::DeclarationTypeAlias { name, .. }
            | NodeKind::DeclarationStructuredType { name, .. }
            | NodeKind::DeclarationNamespace { name, .. } => Some(name),
            _ => None,
        }
    }

    /// The `resolved_type` annotation of a value or declaration
    pub fn resolved_type_of(&self, id: NodeId) -> Option<NodeId> {
        match self.kind(id) {
            NodeKind::ValueLiteralBool { resolved_type, .. }
            | NodeKind::ValueLiteralNumber { resolved_type, .. }
            | NodeKind::ValueSymbol { resolved_type, .. }
            | NodeKind::ValueUnary { resolved_type, .. }
            | NodeKind::ValueBinary { resolved_type, .. }
            | NodeKind::ValueCall { resolved_type, .. }
            | NodeKind::ValueCast { resolved_type, .. }
            | NodeKind::DeclarationVariable { resolved_type, .. }
            | NodeKind::DeclarationFunction { resolved_type, .. }
            | NodeKind::DeclarationTypeAlias { resolved_type, .. }
            | NodeKind::DeclarationStructuredType { resolved_type, .. } => *resolved_type,
            _ => None,
        }
    }

    /// Set the `resolved_type` annotation of a value or declaration
    ///
    /// Setting a resolved type on a node kind that carries none is an
    /// internal error.
    pub fn set_resolved_type(&mut self, id: NodeId, ty: NodeId) {
        match self.kind_mut(id) {
            NodeKind::ValueLiteralBool { resolved_type, .. }
            | NodeKind::ValueLiteralNumber { resolved_type, .. }
            | NodeKind::ValueSymbol { resolved_type, .. }
            | NodeKind::ValueUnary { resolved_type, .. }
            | NodeKind::ValueBinary { resolved_type, .. }
            | NodeKind::ValueCall { resolved_type, .. }
            | NodeKind::ValueCast { resolved_type, .. }
            | NodeKind::DeclarationVariable { resolved_type, .. }
            | NodeKind::DeclarationFunction { resolved_type, .. }
            | NodeKind::DeclarationTypeAlias { resolved_type, .. }
            | NodeKind::DeclarationStructuredType { resolved_type, .. } => {
                *resolved_type = Some(ty)
            }
            other => forge_util::ice!(
                "cannot attach a resolved type to a {} node",
                other.kind_name()
            ),
        }
    }

    /// The `referenced_declaration` annotation of a symbol node
    pub fn referenced_declaration_of(&self, id: NodeId) -> Option<NodeId> {
        match self.kind(id) {
            NodeKind::TypeSymbol {
                referenced_declaration,
                ..
            }
            | NodeKind::ValueSymbol {
                referenced_declaration,
                ..
            } => *referenced_declaration,
            _ => None,
        }
    }

    /// Bind a symbol node to its declaration
    pub fn set_referenced_declaration(&mut self, id: NodeId, declaration: NodeId) {
        match self.kind_mut(id) {
            NodeKind::TypeSymbol {
                referenced_declaration,
                ..
            }
            | NodeKind::ValueSymbol {
                referenced_declaration,
                ..
            } => *referenced_declaration = Some(declaration),
            other => forge_util::ice!("{} nodes reference no declaration", other.kind_name()),
        }
    }

    /// The scope attached to a block or translation unit
    pub fn scope_of(&self, id: NodeId) -> Option<ScopeId> {
        match self.kind(id) {
            NodeKind::StatementBlock { scope, .. } | NodeKind::TranslationUnit { scope, .. } => {
                *scope
            }
            _ => None,
        }
    }

    /// Attach a scope to a block or translation unit
    pub fn set_scope(&mut self, id: NodeId, scope_id: ScopeId) {
        match self.kind_mut(id) {
            NodeKind::StatementBlock { scope, .. } | NodeKind::TranslationUnit { scope, .. } => {
                *scope = Some(scope_id)
            }
            other => forge_util::ice!("{} nodes own no scope", other.kind_name()),
        }
    }

    /// Deep-clone a type subtree into fresh arena slots
    ///
    /// Used to attach `resolved_type` annotations: every annotated node
    /// gets its own copy, so types stay value-like. The clone keeps
    /// `referenced_declaration` bindings on cloned `TypeSymbol`s.
    pub fn clone_type(&mut self, id: NodeId) -> NodeId {
        let span = self.span(id);
        let kind = match self.kind(id).clone() {
            NodeKind::TypeBasic {
                basic_kind,
                is_const,
            } => NodeKind::TypeBasic {
                basic_kind,
                is_const,
            },
            NodeKind::TypeWithBitWidth {
                width_kind,
                bit_width,
                is_const,
            } => NodeKind::TypeWithBitWidth {
                width_kind,
                bit_width,
                is_const,
            },
            NodeKind::TypeSymbol {
                name,
                referenced_declaration,
                is_const,
            } => NodeKind::TypeSymbol {
                name,
                referenced_declaration,
                is_const,
            },
            NodeKind::TypeUnary {
                unary_kind,
                operand_type,
                is_const,
            } => {
                let operand_type = operand_type.map(|t| self.clone_type(t));
                NodeKind::TypeUnary {
                    unary_kind,
                    operand_type,
                    is_const,
                }
            }
            NodeKind::TypeFunction {
                return_type,
                arg_types,
                is_const,
            } => {
                let return_type = return_type.map(|t| self.clone_type(t));
                let arg_types = arg_types.into_iter().map(|t| self.clone_type(t)).collect();
                NodeKind::TypeFunction {
                    return_type,
                    arg_types,
                    is_const,
                }
            }
            NodeKind::TypeStructured { members, is_const } => {
                // Members of a synthesized structured type are variable
                // declarations; clone them shallowly with their types.
                let members = members
                    .into_iter()
                    .map(|m| self.clone_structured_member(m))
                    .collect();
                NodeKind::TypeStructured { members, is_const }
            }
            other => forge_util::ice!("cannot clone a {} node as a type", other.kind_name()),
        };
        self.alloc(span, kind)
    }

    fn clone_structured_member(&mut self, id: NodeId) -> NodeId {
        let span = self.span(id);
        match self.kind(id).clone() {
            NodeKind::DeclarationVariable {
                name,
                ty,
                resolved_type,
                ..
            } => {
                let ty = ty.map(|t| self.clone_type(t));
                let resolved_type = resolved_type.map(|t| self.clone_type(t));
                self.alloc(
                    span,
                    NodeKind::DeclarationVariable {
                        name,
                        ty,
                        initial_value: None,
                        resolved_type,
                    },
                )
            }
            other => forge_util::ice!(
                "structured type member must be a variable, not {}",
                other.kind_name()
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree_with(kind: NodeKind) -> (SyntaxTree, NodeId) {
        let mut tree = SyntaxTree::new();
        let id = tree.alloc(Span::DUMMY, kind);
        (tree, id)
    }

    #[test]
    fn test_alloc_and_access() {
        let (tree, id) = tree_with(NodeKind::TypeBasic {
            basic_kind: TypeBasicKind::Bool,
            is_const: false,
        });
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.kind(id).kind_name(), "TypeBasic");
        assert!(tree.kind(id).is_type());
        assert!(!tree.kind(id).is_value());
    }

    #[test]
    fn test_children_declared_order_if() {
        let mut tree = SyntaxTree::new();
        let condition = tree.alloc(
            Span::DUMMY,
            NodeKind::ValueLiteralBool {
                value: true,
                resolved_type: None,
            },
        );
        let then_branch = tree.alloc(
            Span::DUMMY,
            NodeKind::StatementBlock {
                statements: vec![],
                scope: None,
            },
        );
        let else_branch = tree.alloc(
            Span::DUMMY,
            NodeKind::StatementBlock {
                statements: vec![],
                scope: None,
            },
        );
        let stmt = tree.alloc(
            Span::DUMMY,
            NodeKind::StatementIf {
                condition: Some(condition),
                then_branch: Some(then_branch),
                else_branch: Some(else_branch),
            },
        );
        assert_eq!(tree.children(stmt), vec![condition, then_branch, else_branch]);
    }

    #[test]
    fn test_children_declared_order_function() {
        let mut tree = SyntaxTree::new();
        let arg = tree.alloc(
            Span::DUMMY,
            NodeKind::DeclarationVariable {
                name: "a".into(),
                ty: None,
                initial_value: None,
                resolved_type: None,
            },
        );
        let ret = tree.alloc(
            Span::DUMMY,
            NodeKind::TypeBasic {
                basic_kind: TypeBasicKind::Void,
                is_const: false,
            },
        );
        let body = tree.alloc(
            Span::DUMMY,
            NodeKind::StatementBlock {
                statements: vec![],
                scope: None,
            },
        );
        let func = tree.alloc(
            Span::DUMMY,
            NodeKind::DeclarationFunction {
                name: "f".into(),
                args: vec![arg],
                return_type: Some(ret),
                body: Some(body),
                resolved_type: None,
            },
        );
        // args come before return type, which comes before the body
        assert_eq!(tree.children(func), vec![arg, ret, body]);
    }

    #[test]
    fn test_resolved_type_is_not_a_child() {
        let mut tree = SyntaxTree::new();
        let symbol = tree.alloc(
            Span::DUMMY,
            NodeKind::ValueSymbol {
                name: "x".into(),
                referenced_declaration: None,
                resolved_type: None,
            },
        );
        let ty = tree.alloc(
            Span::DUMMY,
            NodeKind::TypeBasic {
                basic_kind: TypeBasicKind::Bool,
                is_const: false,
            },
        );
        tree.set_resolved_type(symbol, ty);
        assert_eq!(tree.resolved_type_of(symbol), Some(ty));
        assert!(tree.children(symbol).is_empty());
    }

    #[test]
    fn test_clone_type_is_deep() {
        let mut tree = SyntaxTree::new();
        let pointee = tree.alloc(
            Span::DUMMY,
            NodeKind::TypeWithBitWidth {
                width_kind: TypeWithBitWidthKind::UnsignedInt,
                bit_width: 8,
                is_const: false,
            },
        );
        let pointer = tree.alloc(
            Span::DUMMY,
            NodeKind::TypeUnary {
                unary_kind: TypeUnaryKind::Pointer,
                operand_type: Some(pointee),
                is_const: false,
            },
        );

        let clone = tree.clone_type(pointer);
        assert_ne!(clone, pointer);

        let cloned_pointee = match tree.kind(clone) {
            NodeKind::TypeUnary { operand_type, .. } => operand_type.unwrap(),
            other => panic!("unexpected kind {}", other.kind_name()),
        };
        assert_ne!(cloned_pointee, pointee);
        assert!(matches!(
            tree.kind(cloned_pointee),
            NodeKind::TypeWithBitWidth { bit_width: 8, .. }
        ));
    }

    #[test]
    fn test_clone_type_keeps_symbol_binding() {
        let mut tree = SyntaxTree::new();
        let decl = tree.alloc(
            Span::DUMMY,
            NodeKind::DeclarationTypeAlias {
                name: "T".into(),
                ty: None,
                resolved_type: None,
            },
        );
        let symbol = tree.alloc(
            Span::DUMMY,
            NodeKind::TypeSymbol {
                name: "T".into(),
                referenced_declaration: Some(decl),
                is_const: false,
            },
        );
        let clone = tree.clone_type(symbol);
        assert_eq!(tree.referenced_declaration_of(clone), Some(decl));
    }

    #[test]
    fn test_compound_base() {
        assert_eq!(
            BinaryOperator::AddAssign.compound_base(),
            Some(BinaryOperator::Add)
        );
        assert_eq!(
            BinaryOperator::BitShlAssign.compound_base(),
            Some(BinaryOperator::BitShl)
        );
        assert_eq!(BinaryOperator::Assign.compound_base(), None);
        assert_eq!(BinaryOperator::Add.compound_base(), None);
        assert!(BinaryOperator::Assign.is_assignment());
        assert!(BinaryOperator::ExpAssign.is_assignment());
        assert!(!BinaryOperator::MemberAccess.is_assignment());
    }
}
