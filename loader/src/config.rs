// Module configuration

use vtoy_hwinit::TargetDescriptor;

/// Startup inputs, fixed before activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModuleConfig {
    /// CPU family and firmware class the module runs on
    pub target: TargetDescriptor,
    /// Verbose diagnostics
    pub debug: bool,
}

impl ModuleConfig {
    pub const fn new(target: TargetDescriptor, debug: bool) -> Self {
        Self { target, debug }
    }

    /// Describe the compilation target, diagnostics off.
    pub const fn host() -> Self {
        Self::new(TargetDescriptor::host(), false)
    }

    pub const fn with_debug(self, debug: bool) -> Self {
        Self { debug, ..self }
    }
}

impl Default for ModuleConfig {
    fn default() -> Self {
        Self::host()
    }
}
