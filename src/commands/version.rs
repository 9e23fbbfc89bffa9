//! Command: print version information.

/// Version string: `DST_INSTALL_VERSION` from the build, else the crate version.
#[must_use]
pub fn version() -> &'static str {
    option_env!("DST_INSTALL_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"))
}

/// Print the installer version to stdout.
#[allow(clippy::print_stdout)]
pub fn run() {
    println!("dst-install {}", version());
}
