//! forge-gen - LLVM IR code generation and JIT execution.
//!
//! Consumes a tree that went through all four semantic passes and emits an
//! LLVM module through inkwell. [`Codegen`] implements the translation
//! contract (block threading, if/while emission, the operator instruction
//! table, shared cast emission); [`Jit`] wraps LLVM's MCJIT for in-process
//! execution.

mod error;
mod jit;
mod llvm;
mod types;

pub use error::{CodegenError, Result};
pub use jit::Jit;
pub use llvm::Codegen;
pub use types::TypeMapper;

#[cfg(test)]
mod tests {
    use super::*;
    use forge_par::ast::{NodeId, SyntaxTree};
    use forge_sem::TargetInfo;
    use forge_util::{FileId, Messages};
    use inkwell::context::Context;

    fn analyzed(source: &str) -> (SyntaxTree, NodeId) {
        let mut messages = Messages::new();
        let tokens = forge_lex::tokenize(source, FileId::DUMMY, &mut messages);
        let (mut tree, unit) = forge_par::parse(tokens, &mut messages);
        forge_sem::analyze(&mut tree, unit, &TargetInfo::default(), &mut messages);
        assert!(
            !messages.has_errors(),
            "analysis failed for {source:?}: {:?}",
            messages.diagnostics()
        );
        (tree, unit)
    }

    fn emit_ir(source: &str) -> String {
        let (mut tree, unit) = analyzed(source);
        let context = Context::create();
        let mut codegen = Codegen::new(&context, "test", &mut tree, TargetInfo::default());
        codegen.translation_unit(unit).expect("codegen failed");
        codegen.module.print_to_string().to_string()
    }

    #[test]
    fn test_identity_function_ir() {
        let ir = emit_ir("func f(a: u8) -> u8 { return a; }");
        assert!(ir.contains("define i8 @f(i8 %a)"), "{ir}");
        assert!(ir.contains("ret i8 %a"), "{ir}");
    }

    #[test]
    fn test_widening_return_zero_extends() {
        let ir = emit_ir("func f(a: u8) -> u16 { return a; }");
        assert!(ir.contains("zext i8 %a to i16"), "{ir}");
    }

    #[test]
    fn test_signed_widening_sign_extends() {
        let ir = emit_ir("func f(a: i8) -> i16 { return a; }");
        assert!(ir.contains("sext i8 %a to i16"), "{ir}");
    }

    #[test]
    fn test_explicit_cast_same_width_is_a_no_op() {
        let ir = emit_ir("func f(a: u8) -> i8 { return a as i8; }");
        assert!(ir.contains("ret i8 %a"), "{ir}");
    }

    #[test]
    fn test_if_else_with_terminating_branches_prunes_after(/* scenario 6 */) {
        let ir = emit_ir(
            "func abs(x: i32) -> i32 { if (x < 0) { return -x; } else { return x; } }",
        );
        assert!(ir.contains("if:then"), "{ir}");
        assert!(ir.contains("if:else"), "{ir}");
        // All branches terminate, so the join block is pruned
        assert!(!ir.contains("if:after"), "{ir}");
    }

    #[test]
    fn test_unsigned_division_selects_udiv() {
        let ir = emit_ir("func f(a: u32, b: u32) -> u32 { return a / b; }");
        assert!(ir.contains("udiv"), "{ir}");

        let ir = emit_ir("func f(a: i32, b: i32) -> i32 { return a / b; }");
        assert!(ir.contains("sdiv"), "{ir}");
    }

    #[test]
    fn test_comparison_uses_containing_type() {
        // u8 and i8 compare through their containing type i16
        let ir = emit_ir("func f(a: u8, b: i8) -> bool { return a < b; }");
        assert!(ir.contains("zext i8 %a to i16"), "{ir}");
        assert!(ir.contains("sext i8 %b to i16"), "{ir}");
        assert!(ir.contains("icmp slt"), "{ir}");
    }

    #[test]
    fn test_while_loop_blocks() {
        let ir = emit_ir(
            "func f(n: i32) -> i32 {\n  let i: i32 = 0;\n  while (i < n) { i += 1; }\n  return i;\n}",
        );
        assert!(ir.contains("while:body"), "{ir}");
        assert!(ir.contains("while:after"), "{ir}");
    }

    #[test]
    fn test_local_variables_use_slots() {
        let ir = emit_ir("func f() -> i32 { let x: i32 = 41; return x + 1; }");
        assert!(ir.contains("alloca i32"), "{ir}");
        assert!(ir.contains("store i32 41"), "{ir}");
        assert!(ir.contains("value_of:x"), "{ir}");
    }

    #[test]
    fn test_void_function_gets_implicit_return() {
        let ir = emit_ir("func f() -> void { let x: i32 = 1; }");
        assert!(ir.contains("ret void"), "{ir}");
    }

    #[test]
    fn test_call_with_implicit_arg_widening() {
        let ir = emit_ir(
            "func g(x: u32) -> u32 { return x; }\nfunc f(a: u8) -> u32 { return g(a); }",
        );
        assert!(ir.contains("call i32 @g"), "{ir}");
        assert!(ir.contains("zext i8 %a to i32"), "{ir}");
    }

    #[test]
    fn test_forward_call_order_does_not_matter() {
        let ir = emit_ir(
            "func f() -> i32 { return g(); }\nfunc g() -> i32 { return 7; }",
        );
        assert!(ir.contains("define i32 @f"), "{ir}");
        assert!(ir.contains("call i32 @g"), "{ir}");
    }

    #[test]
    fn test_missing_return_is_reported() {
        let (mut tree, unit) = analyzed("func f() -> i32 { let x: i32 = 1; }");
        let context = Context::create();
        let mut codegen = Codegen::new(&context, "test", &mut tree, TargetInfo::default());
        let error = codegen.translation_unit(unit).unwrap_err();
        assert!(matches!(error, CodegenError::MissingReturn(name) if name == "f"));
    }

    #[test]
    fn test_exponentiation_is_not_supported_yet() {
        let (mut tree, unit) = analyzed("func f(a: i32) -> i32 { return a ** a; }");
        let context = Context::create();
        let mut codegen = Codegen::new(&context, "test", &mut tree, TargetInfo::default());
        let error = codegen.translation_unit(unit).unwrap_err();
        assert!(matches!(error, CodegenError::Unsupported(_)));
    }

    #[test]
    fn test_jit_identity_function() {
        let (mut tree, unit) = analyzed("func f(a: u8) -> u8 { return a; }");
        let context = Context::create();
        let mut codegen = Codegen::new(&context, "test", &mut tree, TargetInfo::default());
        codegen.translation_unit(unit).expect("codegen failed");

        let jit = Jit::new(&codegen.module).expect("jit failed");
        unsafe {
            let f = jit
                .function::<unsafe extern "C" fn(u8) -> u8>("f")
                .expect("lookup failed");
            assert_eq!(f.call(0), 0);
            assert_eq!(f.call(255), 255);
        }
    }

    #[test]
    fn test_jit_abs() {
        let (mut tree, unit) = analyzed(
            "func abs(x: i32) -> i32 { if (x < 0) { return -x; } else { return x; } }",
        );
        let context = Context::create();
        let mut codegen = Codegen::new(&context, "test", &mut tree, TargetInfo::default());
        codegen.translation_unit(unit).expect("codegen failed");

        let jit = Jit::new(&codegen.module).expect("jit failed");
        unsafe {
            let abs = jit
                .function::<unsafe extern "C" fn(i32) -> i32>("abs")
                .expect("lookup failed");
            assert_eq!(abs.call(5), 5);
            assert_eq!(abs.call(-5), 5);
            assert_eq!(abs.call(0), 0);
        }
    }

    #[test]
    fn test_jit_loop_sum() {
        let (mut tree, unit) = analyzed(
            "func sum(n: i32) -> i32 {\n  let total: i32 = 0;\n  let i: i32 = 1;\n  while (i <= n) { total += i; i += 1; }\n  return total;\n}",
        );
        let context = Context::create();
        let mut codegen = Codegen::new(&context, "test", &mut tree, TargetInfo::default());
        codegen.translation_unit(unit).expect("codegen failed");

        let jit = Jit::new(&codegen.module).expect("jit failed");
        unsafe {
            let sum = jit
                .function::<unsafe extern "C" fn(i32) -> i32>("sum")
                .expect("lookup failed");
            assert_eq!(sum.call(10), 55);
            assert_eq!(sum.call(0), 0);
        }
    }

    #[test]
    fn test_jit_u8_explicit_cast_wraps() {
        let (mut tree, unit) = analyzed("func f(a: u8) -> i8 { return a as i8; }");
        let context = Context::create();
        let mut codegen = Codegen::new(&context, "test", &mut tree, TargetInfo::default());
        codegen.translation_unit(unit).expect("codegen failed");

        let jit = Jit::new(&codegen.module).expect("jit failed");
        unsafe {
            let f = jit
                .function::<unsafe extern "C" fn(u8) -> i8>("f")
                .expect("lookup failed");
            assert_eq!(f.call(127), 127);
            assert_eq!(f.call(128), -128);
            assert_eq!(f.call(255), -1);
        }
    }
}
