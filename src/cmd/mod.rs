/*!
Command layer.

  params.rs     parameter declarations, metadata registry, bound invocations
  introspect.rs which collection methods are sub-commands
  synth.rs      method → runnable sub-command (help splitting, parameter cloning)
  resolver.rs   compiled catalog of collections, name → collection handle
  dispatch.rs   two-phase argv parsing, `--version`, execution
  format.rs     boxes / tables for human output
  render.rs     dispatch result → stdout text (human or JSON)
*/

pub mod dispatch;
pub mod format;
pub mod introspect;
pub mod params;
pub mod render;
pub mod resolver;
pub mod synth;

#[cfg(test)]
pub mod test_support;

pub use dispatch::Dispatcher;
pub use resolver::Catalog;
