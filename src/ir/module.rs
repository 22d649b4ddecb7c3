use super::{Func, FunctionBody, ModuleDisplay};
use crate::entity::EntityVec;
use crate::frontend;
use anyhow::Result;

/// A collection of independent functions. Analyses never look across
/// function boundaries.
#[derive(Clone, Debug, Default)]
pub struct Module {
    pub funcs: EntityVec<Func, FunctionBody>,
}

impl Module {
    pub fn empty() -> Module {
        Module::default()
    }

    /// Parse IR text (see `frontend`).
    pub fn from_text(text: &str) -> Result<Module> {
        frontend::text_to_ir(text)
    }

    pub fn func_by_name(&self, name: &str) -> Option<Func> {
        self.funcs
            .entries()
            .find(|(_, body)| body.name == name)
            .map(|(func, _)| func)
    }

    pub fn display(&self) -> ModuleDisplay<'_> {
        ModuleDisplay(self)
    }
}
