/// File-level information command.
pub mod info;
/// Root variable listing command.
pub mod list;
/// Array tree printing helpers.
pub mod print;
/// Root variable decode and print command.
pub mod show;
#[cfg(test)]
pub(crate) mod test_support;
/// Shared helpers for command implementations.
pub mod util;
