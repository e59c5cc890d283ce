//! Embeddable JIT over a generated module.

use inkwell::execution_engine::{ExecutionEngine, JitFunction, UnsafeFunctionPointer};
use inkwell::module::Module;
use inkwell::targets::{InitializationConfig, Target};
use inkwell::OptimizationLevel;

use crate::error::{CodegenError, Result};

/// JIT execution engine wrapping a compiled module
///
/// Consumes the module's ownership of its functions; look symbols up by
/// name and call them through typed function pointers.
pub struct Jit<'ctx> {
    engine: ExecutionEngine<'ctx>,
}

impl<'ctx> Jit<'ctx> {
    /// Create a JIT for the module.
    pub fn new(module: &Module<'ctx>) -> Result<Self> {
        Target::initialize_native(&InitializationConfig::default())
            .map_err(|message| CodegenError::Jit(message.to_string()))?;
        let engine = module
            .create_jit_execution_engine(OptimizationLevel::None)
            .map_err(|message| CodegenError::Jit(message.to_string()))?;
        Ok(Self { engine })
    }

    /// Look up a compiled function by name.
    ///
    /// # Safety
    ///
    /// `F` must match the function's actual signature; calling through a
    /// mismatched type is undefined behavior.
    pub unsafe fn function<F>(&self, name: &str) -> Result<JitFunction<'ctx, F>>
    where
        F: UnsafeFunctionPointer,
    {
        self.engine
            .get_function(name)
            .map_err(|error| CodegenError::Jit(error.to_string()))
    }

    /// Run a `func main() -> i32` entry point.
    pub fn run_main(&self) -> Result<i32> {
        unsafe {
            let main = self.function::<unsafe extern "C" fn() -> i32>("main")?;
            Ok(main.call())
        }
    }
}
