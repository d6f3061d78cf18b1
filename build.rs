//! Retrieves information about the version of the crate from Git and the build
//! environment. It is exposed at runtime through `uct_table::version()` so that
//! the engines embedding the table can report how it was built.

fn main() -> shadow_rs::SdResult<()> {
    shadow_rs::new()
}
