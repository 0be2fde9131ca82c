// Platform abstraction layer for ipcmd.
//
// Everything that talks to the operating system goes through a trait here so that command logic
// can be tested against mocks. Each abstraction has three layers: abstraction (trait), facade
// (enum dispatching to real or mock) and the real implementation.

mod kernel;
mod launcher;

pub(crate) use kernel::*;
pub(crate) use launcher::*;
