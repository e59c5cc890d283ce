//! Type predicates and the type algebra shared by resolution, validation,
//! and codegen: the arithmetic containing type and the casting-mode table.

use forge_par::ast::{
    NodeId, NodeKind, SyntaxTree, TypeBasicKind, TypeUnaryKind, TypeWithBitWidthKind,
};
use forge_util::{DiagnosticBuilder, DiagnosticCode, Messages, Span};

/// Target facts the passes need before codegen exists
///
/// `isize`/`usize` are sized integers of the target's pointer width; the
/// passes resolve them against this.
#[derive(Clone, Copy, Debug)]
pub struct TargetInfo {
    pub pointer_bit_width: u32,
}

impl Default for TargetInfo {
    fn default() -> Self {
        Self {
            pointer_bit_width: 64,
        }
    }
}

/// Follow `TypeSymbol` links to the underlying concrete type
///
/// A resolved type tree may contain symbols naming aliases or structured
/// types; predicates and casting rules want the type behind them. Cyclic
/// aliases bottom out after a fixed number of hops.
pub fn concrete_type(tree: &SyntaxTree, mut ty: NodeId) -> NodeId {
    for _ in 0..32 {
        match tree.kind(ty) {
            NodeKind::TypeSymbol {
                referenced_declaration: Some(decl),
                ..
            } => match tree.resolved_type_of(*decl) {
                Some(resolved) => ty = resolved,
                None => return ty,
            },
            _ => return ty,
        }
    }
    ty
}

/// Is this `bool`?
pub fn is_type_bool(tree: &SyntaxTree, ty: NodeId) -> bool {
    matches!(
        tree.kind(concrete_type(tree, ty)),
        NodeKind::TypeBasic {
            basic_kind: TypeBasicKind::Bool,
            ..
        }
    )
}

/// Is this `void`?
pub fn is_type_void(tree: &SyntaxTree, ty: NodeId) -> bool {
    matches!(
        tree.kind(concrete_type(tree, ty)),
        NodeKind::TypeBasic {
            basic_kind: TypeBasicKind::Void,
            ..
        }
    )
}

/// Is this an integer (sized, or `isize`/`usize`)?
pub fn is_type_integer(tree: &SyntaxTree, ty: NodeId) -> bool {
    match tree.kind(concrete_type(tree, ty)) {
        NodeKind::TypeWithBitWidth { width_kind, .. } => {
            matches!(
                width_kind,
                TypeWithBitWidthKind::SignedInt | TypeWithBitWidthKind::UnsignedInt
            )
        }
        NodeKind::TypeBasic { basic_kind, .. } => {
            matches!(basic_kind, TypeBasicKind::Isize | TypeBasicKind::Usize)
        }
        _ => false,
    }
}

/// Is this a float?
pub fn is_type_float(tree: &SyntaxTree, ty: NodeId) -> bool {
    matches!(
        tree.kind(concrete_type(tree, ty)),
        NodeKind::TypeWithBitWidth {
            width_kind: TypeWithBitWidthKind::Float,
            ..
        }
    )
}

/// Is this numeric (integer or float)?
pub fn is_type_number(tree: &SyntaxTree, ty: NodeId) -> bool {
    is_type_integer(tree, ty) || is_type_float(tree, ty)
}

/// Is this a pointer?
pub fn is_type_pointer(tree: &SyntaxTree, ty: NodeId) -> bool {
    matches!(
        tree.kind(concrete_type(tree, ty)),
        NodeKind::TypeUnary {
            unary_kind: TypeUnaryKind::Pointer,
            ..
        }
    )
}

/// The pointee of a pointer type, if it is one
pub fn pointer_element_type(tree: &SyntaxTree, ty: NodeId) -> Option<NodeId> {
    match tree.kind(concrete_type(tree, ty)) {
        NodeKind::TypeUnary {
            unary_kind: TypeUnaryKind::Pointer,
            operand_type,
            ..
        } => *operand_type,
        _ => None,
    }
}

/// `Some(true)` for signed integers, `Some(false)` for unsigned,
/// `None` for non-integers
pub fn integer_signedness(tree: &SyntaxTree, ty: NodeId) -> Option<bool> {
    match tree.kind(concrete_type(tree, ty)) {
        NodeKind::TypeWithBitWidth { width_kind, .. } => match width_kind {
            TypeWithBitWidthKind::SignedInt => Some(true),
            TypeWithBitWidthKind::UnsignedInt => Some(false),
            TypeWithBitWidthKind::Float => None,
        },
        NodeKind::TypeBasic { basic_kind, .. } => match basic_kind {
            TypeBasicKind::Isize => Some(true),
            TypeBasicKind::Usize => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Numeric shape of a type, with `isize`/`usize` sized to the target
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum NumericShape {
    Int { signed: bool, bit_width: u32 },
    Float { bit_width: u32 },
}

fn numeric_shape(tree: &SyntaxTree, target: &TargetInfo, ty: NodeId) -> Option<NumericShape> {
    match tree.kind(concrete_type(tree, ty)) {
        NodeKind::TypeWithBitWidth {
            width_kind,
            bit_width,
            ..
        } => match width_kind {
            TypeWithBitWidthKind::SignedInt => Some(NumericShape::Int {
                signed: true,
                bit_width: *bit_width,
            }),
            TypeWithBitWidthKind::UnsignedInt => Some(NumericShape::Int {
                signed: false,
                bit_width: *bit_width,
            }),
            TypeWithBitWidthKind::Float => Some(NumericShape::Float {
                bit_width: *bit_width,
            }),
        },
        NodeKind::TypeBasic { basic_kind, .. } => match basic_kind {
            TypeBasicKind::Isize => Some(NumericShape::Int {
                signed: true,
                bit_width: target.pointer_bit_width,
            }),
            TypeBasicKind::Usize => Some(NumericShape::Int {
                signed: false,
                bit_width: target.pointer_bit_width,
            }),
            _ => None,
        },
        _ => None,
    }
}

/// Structural type equality, ignoring spans and const qualifiers
///
/// Symbols compare by their referenced declaration when both are bound,
/// by name otherwise.
pub fn types_equal(tree: &SyntaxTree, a: NodeId, b: NodeId) -> bool {
    match (tree.kind(a), tree.kind(b)) {
        (
            NodeKind::TypeBasic { basic_kind: ka, .. },
            NodeKind::TypeBasic { basic_kind: kb, .. },
        ) => ka == kb,
        (
            NodeKind::TypeWithBitWidth {
                width_kind: ka,
                bit_width: wa,
                ..
            },
            NodeKind::TypeWithBitWidth {
                width_kind: kb,
                bit_width: wb,
                ..
            },
        ) => ka == kb && wa == wb,
        (
            NodeKind::TypeSymbol {
                name: na,
                referenced_declaration: da,
                ..
            },
            NodeKind::TypeSymbol {
                name: nb,
                referenced_declaration: db,
                ..
            },
        ) => match (da, db) {
            (Some(da), Some(db)) => da == db,
            _ => na == nb,
        },
        (
            NodeKind::TypeUnary {
                unary_kind: ka,
                operand_type: oa,
                ..
            },
            NodeKind::TypeUnary {
                unary_kind: kb,
                operand_type: ob,
                ..
            },
        ) => {
            ka == kb
                && match (oa, ob) {
                    (Some(oa), Some(ob)) => types_equal(tree, *oa, *ob),
                    (None, None) => true,
                    _ => false,
                }
        }
        (
            NodeKind::TypeFunction {
                return_type: ra,
                arg_types: aa,
                ..
            },
            NodeKind::TypeFunction {
                return_type: rb,
                arg_types: ab,
                ..
            },
        ) => {
            let returns_equal = match (ra, rb) {
                (Some(ra), Some(rb)) => types_equal(tree, *ra, *rb),
                (None, None) => true,
                _ => false,
            };
            returns_equal
                && aa.len() == ab.len()
                && aa.iter().zip(ab).all(|(&a, &b)| types_equal(tree, a, b))
        }
        (
            NodeKind::TypeStructured { members: ma, .. },
            NodeKind::TypeStructured { members: mb, .. },
        ) => {
            ma.len() == mb.len()
                && ma.iter().zip(mb).all(|(&a, &b)| {
                    tree.name_of(a) == tree.name_of(b)
                        && match (tree.resolved_type_of(a), tree.resolved_type_of(b)) {
                            (Some(a), Some(b)) => types_equal(tree, a, b),
                            (None, None) => true,
                            _ => false,
                        }
                })
        }
        _ => false,
    }
}

/// Render a type for diagnostics (`u8`, `*i32`, `func(u8) -> bool`, ...)
pub fn type_display(tree: &SyntaxTree, ty: NodeId) -> String {
    let prefix = match tree.kind(ty) {
        NodeKind::TypeBasic { is_const: true, .. }
        | NodeKind::TypeWithBitWidth { is_const: true, .. }
        | NodeKind::TypeSymbol { is_const: true, .. }
        | NodeKind::TypeUnary { is_const: true, .. }
        | NodeKind::TypeFunction { is_const: true, .. }
        | NodeKind::TypeStructured { is_const: true, .. } => "const ",
        _ => "",
    };
    let body = match tree.kind(ty) {
        NodeKind::TypeBasic { basic_kind, .. } => match basic_kind {
            TypeBasicKind::Bool => "bool".to_string(),
            TypeBasicKind::Void => "void".to_string(),
            TypeBasicKind::Isize => "isize".to_string(),
            TypeBasicKind::Usize => "usize".to_string(),
        },
        NodeKind::TypeWithBitWidth {
            width_kind,
            bit_width,
            ..
        } => match width_kind {
            TypeWithBitWidthKind::SignedInt => format!("i{bit_width}"),
            TypeWithBitWidthKind::UnsignedInt => format!("u{bit_width}"),
            TypeWithBitWidthKind::Float => format!("f{bit_width}"),
        },
        NodeKind::TypeSymbol { name, .. } => name.clone(),
        NodeKind::TypeUnary {
            unary_kind: TypeUnaryKind::Pointer,
            operand_type,
            ..
        } => match operand_type {
            Some(operand) => format!("*{}", type_display(tree, *operand)),
            None => "*<missing>".to_string(),
        },
        NodeKind::TypeFunction {
            return_type,
            arg_types,
            ..
        } => {
            let args: Vec<String> = arg_types
                .iter()
                .map(|&arg| type_display(tree, arg))
                .collect();
            let ret = match return_type {
                Some(ret) => type_display(tree, *ret),
                None => "<missing>".to_string(),
            };
            format!("func({}) -> {}", args.join(", "), ret)
        }
        NodeKind::TypeStructured { members, .. } => {
            let members: Vec<String> = members
                .iter()
                .map(|&member| {
                    let name = tree.name_of(member).unwrap_or("<unnamed>");
                    match tree.resolved_type_of(member) {
                        Some(ty) => format!("{}: {}", name, type_display(tree, ty)),
                        None => name.to_string(),
                    }
                })
                .collect();
            format!("struct {{ {} }}", members.join(", "))
        }
        other => forge_util::ice!("cannot display a {} node as a type", other.kind_name()),
    };
    format!("{prefix}{body}")
}

/// Legality of converting one type to another
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CastingMode {
    /// Allowed silently wherever a value of the target type is expected
    Implicit,
    /// Allowed only through an `as` cast
    Explicit,
    /// Not allowed at all
    Illegal,
}

/// How (and whether) `from` converts to `to`
///
/// - identical types: implicit
/// - value-preserving integer widening (same signedness, or unsigned into
///   a strictly wider signed) and float widening: implicit
/// - sign changes, narrowing, and float/int conversions: explicit
/// - pointer/pointer and pointer/pointer-width-integer: explicit
/// - everything else: illegal
pub fn casting_mode(
    tree: &SyntaxTree,
    target: &TargetInfo,
    from: NodeId,
    to: NodeId,
) -> CastingMode {
    let from = concrete_type(tree, from);
    let to = concrete_type(tree, to);

    if types_equal(tree, from, to) {
        return CastingMode::Implicit;
    }

    match (
        numeric_shape(tree, target, from),
        numeric_shape(tree, target, to),
    ) {
        (Some(NumericShape::Float { bit_width: wf }), Some(NumericShape::Float { bit_width: wt })) => {
            return if wt >= wf {
                CastingMode::Implicit
            } else {
                CastingMode::Explicit
            };
        }
        (
            Some(NumericShape::Int {
                signed: sf,
                bit_width: wf,
            }),
            Some(NumericShape::Int {
                signed: st,
                bit_width: wt,
            }),
        ) => {
            return match (sf, st) {
                (true, true) | (false, false) => {
                    if wt >= wf {
                        CastingMode::Implicit
                    } else {
                        CastingMode::Explicit
                    }
                }
                // Unsigned fits in any strictly wider signed type
                (false, true) => {
                    if wt > wf {
                        CastingMode::Implicit
                    } else {
                        CastingMode::Explicit
                    }
                }
                (true, false) => CastingMode::Explicit,
            };
        }
        (Some(NumericShape::Int { .. }), Some(NumericShape::Float { .. }))
        | (Some(NumericShape::Float { .. }), Some(NumericShape::Int { .. })) => {
            return CastingMode::Explicit;
        }
        _ => {}
    }

    let from_pointer = is_type_pointer(tree, from);
    let to_pointer = is_type_pointer(tree, to);
    if from_pointer && to_pointer {
        return CastingMode::Explicit;
    }

    let pointer_width_int = |ty: NodeId| {
        matches!(
            numeric_shape(tree, target, ty),
            Some(NumericShape::Int { bit_width, .. }) if bit_width == target.pointer_bit_width
        )
    };
    if (from_pointer && pointer_width_int(to)) || (to_pointer && pointer_width_int(from)) {
        return CastingMode::Explicit;
    }

    CastingMode::Illegal
}

fn round_up_bit_width(bits: u32) -> u32 {
    match bits {
        0..=8 => 8,
        9..=16 => 16,
        17..=32 => 32,
        _ => 64,
    }
}

/// The smallest numeric type both operands implicitly convert to
///
/// Returns `None` when either operand is not numeric. The result is a
/// freshly allocated `TypeWithBitWidth` node. When a signed/unsigned mix
/// would need more than 64 bits, the result is capped at `i64` and a
/// lossy-arithmetic warning is emitted at `span`.
pub fn arithmetic_containing_type(
    tree: &mut SyntaxTree,
    target: &TargetInfo,
    lhs: NodeId,
    rhs: NodeId,
    span: Span,
    messages: &mut Messages,
) -> Option<NodeId> {
    let a = numeric_shape(tree, target, lhs)?;
    let b = numeric_shape(tree, target, rhs)?;

    let (width_kind, bit_width) = match (a, b) {
        (NumericShape::Float { bit_width: wa }, NumericShape::Float { bit_width: wb }) => {
            (TypeWithBitWidthKind::Float, wa.max(wb))
        }
        (NumericShape::Float { bit_width: wf }, NumericShape::Int { bit_width: wi, .. })
        | (NumericShape::Int { bit_width: wi, .. }, NumericShape::Float { bit_width: wf }) => {
            // An integer wider than f32's exact range forces f64
            let needed = if wi <= 16 { 32 } else { 64 };
            (TypeWithBitWidthKind::Float, wf.max(needed))
        }
        (
            NumericShape::Int {
                signed: sa,
                bit_width: wa,
            },
            NumericShape::Int {
                signed: sb,
                bit_width: wb,
            },
        ) => match (sa, sb) {
            (true, true) => (TypeWithBitWidthKind::SignedInt, wa.max(wb)),
            (false, false) => (TypeWithBitWidthKind::UnsignedInt, wa.max(wb)),
            (true, false) | (false, true) => {
                let (signed_width, unsigned_width) = if sa { (wa, wb) } else { (wb, wa) };
                let needed = signed_width.max(unsigned_width + 1);
                if needed > 64 {
                    DiagnosticBuilder::warning(
                        "mixed signed/unsigned arithmetic does not fit in 64 bits and may lose values",
                    )
                    .code(DiagnosticCode::VALUE_DOES_NOT_FIT_IN_TYPE)
                    .span(span)
                    .emit(messages);
                }
                (
                    TypeWithBitWidthKind::SignedInt,
                    round_up_bit_width(needed).min(64),
                )
            }
        },
    };

    Some(tree.alloc(
        span,
        NodeKind::TypeWithBitWidth {
            width_kind,
            bit_width,
            is_const: false,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sized(
        tree: &mut SyntaxTree,
        width_kind: TypeWithBitWidthKind,
        bit_width: u32,
    ) -> NodeId {
        tree.alloc(
            Span::DUMMY,
            NodeKind::TypeWithBitWidth {
                width_kind,
                bit_width,
                is_const: false,
            },
        )
    }

    fn basic(tree: &mut SyntaxTree, basic_kind: TypeBasicKind) -> NodeId {
        tree.alloc(
            Span::DUMMY,
            NodeKind::TypeBasic {
                basic_kind,
                is_const: false,
            },
        )
    }

    fn unsigned(tree: &mut SyntaxTree, bits: u32) -> NodeId {
        sized(tree, TypeWithBitWidthKind::UnsignedInt, bits)
    }

    fn signed(tree: &mut SyntaxTree, bits: u32) -> NodeId {
        sized(tree, TypeWithBitWidthKind::SignedInt, bits)
    }

    fn float(tree: &mut SyntaxTree, bits: u32) -> NodeId {
        sized(tree, TypeWithBitWidthKind::Float, bits)
    }

    fn mode(tree: &SyntaxTree, from: NodeId, to: NodeId) -> CastingMode {
        casting_mode(tree, &TargetInfo::default(), from, to)
    }

    #[test]
    fn test_predicates() {
        let mut tree = SyntaxTree::new();
        let b = basic(&mut tree, TypeBasicKind::Bool);
        let v = basic(&mut tree, TypeBasicKind::Void);
        let u8t = unsigned(&mut tree, 8);
        let f32t = float(&mut tree, 32);
        let usize_t = basic(&mut tree, TypeBasicKind::Usize);
        let ptr = tree.alloc(
            Span::DUMMY,
            NodeKind::TypeUnary {
                unary_kind: TypeUnaryKind::Pointer,
                operand_type: Some(u8t),
                is_const: false,
            },
        );

        assert!(is_type_bool(&tree, b));
        assert!(is_type_void(&tree, v));
        assert!(is_type_integer(&tree, u8t));
        assert!(is_type_integer(&tree, usize_t));
        assert!(!is_type_integer(&tree, f32t));
        assert!(is_type_float(&tree, f32t));
        assert!(is_type_number(&tree, u8t));
        assert!(!is_type_number(&tree, b));
        assert!(is_type_pointer(&tree, ptr));
        assert_eq!(pointer_element_type(&tree, ptr), Some(u8t));
        assert_eq!(integer_signedness(&tree, u8t), Some(false));
        assert_eq!(integer_signedness(&tree, usize_t), Some(false));
        assert_eq!(integer_signedness(&tree, f32t), None);
    }

    #[test]
    fn test_type_display() {
        let mut tree = SyntaxTree::new();
        let u8t = unsigned(&mut tree, 8);
        let i64t = signed(&mut tree, 64);
        let b = basic(&mut tree, TypeBasicKind::Bool);
        let ptr = tree.alloc(
            Span::DUMMY,
            NodeKind::TypeUnary {
                unary_kind: TypeUnaryKind::Pointer,
                operand_type: Some(u8t),
                is_const: false,
            },
        );
        let func = tree.alloc(
            Span::DUMMY,
            NodeKind::TypeFunction {
                return_type: Some(b),
                arg_types: vec![u8t, i64t],
                is_const: false,
            },
        );
        assert_eq!(type_display(&tree, u8t), "u8");
        assert_eq!(type_display(&tree, ptr), "*u8");
        assert_eq!(type_display(&tree, func), "func(u8, i64) -> bool");
    }

    #[test]
    fn test_casting_identical_is_implicit() {
        let mut tree = SyntaxTree::new();
        let a = unsigned(&mut tree, 8);
        let b = unsigned(&mut tree, 8);
        assert_eq!(mode(&tree, a, b), CastingMode::Implicit);
    }

    #[test]
    fn test_casting_unsigned_widening() {
        let mut tree = SyntaxTree::new();
        let u8t = unsigned(&mut tree, 8);
        let u16t = unsigned(&mut tree, 16);
        let u64t = unsigned(&mut tree, 64);
        assert_eq!(mode(&tree, u8t, u16t), CastingMode::Implicit);
        assert_eq!(mode(&tree, u8t, u64t), CastingMode::Implicit);
        assert_eq!(mode(&tree, u64t, u8t), CastingMode::Explicit);
    }

    #[test]
    fn test_casting_sign_changes() {
        let mut tree = SyntaxTree::new();
        let u8t = unsigned(&mut tree, 8);
        let i8t = signed(&mut tree, 8);
        let i16t = signed(&mut tree, 16);
        // Same width, different sign: explicit
        assert_eq!(mode(&tree, u8t, i8t), CastingMode::Explicit);
        // Unsigned into strictly wider signed: implicit
        assert_eq!(mode(&tree, u8t, i16t), CastingMode::Implicit);
        // Signed into unsigned, any width: explicit
        assert_eq!(mode(&tree, i8t, u8t), CastingMode::Explicit);
        let u64t = unsigned(&mut tree, 64);
        assert_eq!(mode(&tree, i8t, u64t), CastingMode::Explicit);
    }

    #[test]
    fn test_casting_int_float() {
        let mut tree = SyntaxTree::new();
        let u8t = unsigned(&mut tree, 8);
        let f32t = float(&mut tree, 32);
        let f64t = float(&mut tree, 64);
        assert_eq!(mode(&tree, u8t, f32t), CastingMode::Explicit);
        assert_eq!(mode(&tree, f32t, u8t), CastingMode::Explicit);
        assert_eq!(mode(&tree, f32t, f64t), CastingMode::Implicit);
        assert_eq!(mode(&tree, f64t, f32t), CastingMode::Explicit);
    }

    #[test]
    fn test_casting_pointers() {
        let mut tree = SyntaxTree::new();
        let u8t = unsigned(&mut tree, 8);
        let i32t = signed(&mut tree, 32);
        let p1 = tree.alloc(
            Span::DUMMY,
            NodeKind::TypeUnary {
                unary_kind: TypeUnaryKind::Pointer,
                operand_type: Some(u8t),
                is_const: false,
            },
        );
        let p2 = tree.alloc(
            Span::DUMMY,
            NodeKind::TypeUnary {
                unary_kind: TypeUnaryKind::Pointer,
                operand_type: Some(i32t),
                is_const: false,
            },
        );
        let u64t = unsigned(&mut tree, 64);
        let u16t = unsigned(&mut tree, 16);

        assert_eq!(mode(&tree, p1, p2), CastingMode::Explicit);
        // Pointer to pointer-width integer and back: explicit
        assert_eq!(mode(&tree, p1, u64t), CastingMode::Explicit);
        assert_eq!(mode(&tree, u64t, p1), CastingMode::Explicit);
        // Narrower integers are not addresses
        assert_eq!(mode(&tree, p1, u16t), CastingMode::Illegal);
    }

    #[test]
    fn test_casting_bool_and_void_are_walled_off() {
        let mut tree = SyntaxTree::new();
        let b = basic(&mut tree, TypeBasicKind::Bool);
        let v = basic(&mut tree, TypeBasicKind::Void);
        let u8t = unsigned(&mut tree, 8);
        assert_eq!(mode(&tree, b, u8t), CastingMode::Illegal);
        assert_eq!(mode(&tree, u8t, b), CastingMode::Illegal);
        assert_eq!(mode(&tree, v, u8t), CastingMode::Illegal);
        assert_eq!(mode(&tree, b, b), CastingMode::Implicit);
    }

    #[test]
    fn test_casting_isize_is_pointer_width() {
        let mut tree = SyntaxTree::new();
        let isize_t = basic(&mut tree, TypeBasicKind::Isize);
        let i64t = signed(&mut tree, 64);
        // Same representation on a 64-bit target
        assert_eq!(mode(&tree, isize_t, i64t), CastingMode::Implicit);
        assert_eq!(mode(&tree, i64t, isize_t), CastingMode::Implicit);
    }

    fn act(tree: &mut SyntaxTree, lhs: NodeId, rhs: NodeId) -> Option<(TypeWithBitWidthKind, u32)> {
        let mut messages = Messages::new();
        let result = arithmetic_containing_type(
            tree,
            &TargetInfo::default(),
            lhs,
            rhs,
            Span::DUMMY,
            &mut messages,
        )?;
        match tree.kind(result) {
            NodeKind::TypeWithBitWidth {
                width_kind,
                bit_width,
                ..
            } => Some((*width_kind, *bit_width)),
            _ => None,
        }
    }

    #[test]
    fn test_act_same_signedness() {
        let mut tree = SyntaxTree::new();
        let u8t = unsigned(&mut tree, 8);
        let u32t = unsigned(&mut tree, 32);
        let i16t = signed(&mut tree, 16);
        let i64t = signed(&mut tree, 64);
        assert_eq!(
            act(&mut tree, u8t, u32t),
            Some((TypeWithBitWidthKind::UnsignedInt, 32))
        );
        assert_eq!(
            act(&mut tree, i16t, i64t),
            Some((TypeWithBitWidthKind::SignedInt, 64))
        );
    }

    #[test]
    fn test_act_mixed_signedness_widens() {
        let mut tree = SyntaxTree::new();
        let u8t = unsigned(&mut tree, 8);
        let i8t = signed(&mut tree, 8);
        // i8 can't hold u8, so the result needs 9 bits, rounded up to 16
        assert_eq!(
            act(&mut tree, u8t, i8t),
            Some((TypeWithBitWidthKind::SignedInt, 16))
        );

        let u32t = unsigned(&mut tree, 32);
        let i32t = signed(&mut tree, 32);
        assert_eq!(
            act(&mut tree, u32t, i32t),
            Some((TypeWithBitWidthKind::SignedInt, 64))
        );
    }

    #[test]
    fn test_act_mixed_signedness_caps_at_64_with_warning() {
        let mut tree = SyntaxTree::new();
        let u64t = unsigned(&mut tree, 64);
        let i8t = signed(&mut tree, 8);
        let mut messages = Messages::new();
        let result = arithmetic_containing_type(
            &mut tree,
            &TargetInfo::default(),
            u64t,
            i8t,
            Span::DUMMY,
            &mut messages,
        )
        .unwrap();
        assert!(matches!(
            tree.kind(result),
            NodeKind::TypeWithBitWidth {
                width_kind: TypeWithBitWidthKind::SignedInt,
                bit_width: 64,
                ..
            }
        ));
        assert_eq!(messages.warning_count(), 1);
    }

    #[test]
    fn test_act_floats() {
        let mut tree = SyntaxTree::new();
        let f32t = float(&mut tree, 32);
        let f64t = float(&mut tree, 64);
        let u8t = unsigned(&mut tree, 8);
        let u32t = unsigned(&mut tree, 32);
        assert_eq!(
            act(&mut tree, f32t, f64t),
            Some((TypeWithBitWidthKind::Float, 64))
        );
        // A u8 fits exactly in f32
        assert_eq!(
            act(&mut tree, f32t, u8t),
            Some((TypeWithBitWidthKind::Float, 32))
        );
        // A u32 does not; it forces f64
        assert_eq!(
            act(&mut tree, f32t, u32t),
            Some((TypeWithBitWidthKind::Float, 64))
        );
    }

    #[test]
    fn test_act_rejects_non_numeric() {
        let mut tree = SyntaxTree::new();
        let b = basic(&mut tree, TypeBasicKind::Bool);
        let u8t = unsigned(&mut tree, 8);
        assert_eq!(act(&mut tree, b, u8t), None);
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        fn any_numeric() -> impl Strategy<Value = (TypeWithBitWidthKind, u32)> {
            prop_oneof![
                (Just(TypeWithBitWidthKind::SignedInt), prop_oneof![Just(8u32), Just(16), Just(32), Just(64)]),
                (Just(TypeWithBitWidthKind::UnsignedInt), prop_oneof![Just(8u32), Just(16), Just(32), Just(64)]),
                (Just(TypeWithBitWidthKind::Float), prop_oneof![Just(32u32), Just(64)]),
            ]
        }

        proptest! {
            /// act(T, U) == act(U, T) structurally
            #[test]
            fn act_is_commutative(a in any_numeric(), b in any_numeric()) {
                let mut tree = SyntaxTree::new();
                let ta = sized(&mut tree, a.0, a.1);
                let tb = sized(&mut tree, b.0, b.1);
                let ab = act(&mut tree, ta, tb);
                let ba = act(&mut tree, tb, ta);
                prop_assert_eq!(ab, ba);
            }

            /// casting_mode(T, T) == Implicit
            #[test]
            fn casting_mode_is_reflexive(a in any_numeric()) {
                let mut tree = SyntaxTree::new();
                let ta = sized(&mut tree, a.0, a.1);
                let tb = sized(&mut tree, a.0, a.1);
                prop_assert_eq!(mode(&tree, ta, tb), CastingMode::Implicit);
            }

            /// Both operands implicitly convert to their containing type
            #[test]
            fn act_contains_both_operands(a in any_numeric(), b in any_numeric()) {
                let mut tree = SyntaxTree::new();
                let ta = sized(&mut tree, a.0, a.1);
                let tb = sized(&mut tree, b.0, b.1);
                let mut messages = Messages::new();
                let result = arithmetic_containing_type(
                    &mut tree,
                    &TargetInfo::default(),
                    ta,
                    tb,
                    Span::DUMMY,
                    &mut messages,
                ).unwrap();
                // The cap is the one case where containment is lossy;
                // it is reported, so skip it here
                if messages.warning_count() == 0 {
                    // int -> float containment is explicit by the casting
                    // table, so only check int/int and float/float pairs
                    let same_family = (a.0 == TypeWithBitWidthKind::Float)
                        == (b.0 == TypeWithBitWidthKind::Float);
                    if same_family {
                        prop_assert_ne!(mode(&tree, ta, result), CastingMode::Illegal);
                        prop_assert_ne!(mode(&tree, tb, result), CastingMode::Illegal);
                        prop_assert_ne!(mode(&tree, ta, result), CastingMode::Explicit);
                        prop_assert_ne!(mode(&tree, tb, result), CastingMode::Explicit);
                    }
                }
            }
        }
    }
}
