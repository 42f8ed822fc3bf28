//! Version and build metadata.

/// `symdex {version} ({commit} {date}) rustc {rustc_version}`
pub fn version() -> String {
    format!(
        "symdex {} ({} {}) rustc {}",
        package_version(),
        build_commit(),
        build_date(),
        rustc_version()
    )
}

pub fn package_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Short commit SHA, or "unknown" outside a git checkout.
pub fn build_commit() -> &'static str {
    option_env!("SYMDEX_COMMIT_SHA").unwrap_or("unknown")
}

pub fn build_date() -> &'static str {
    option_env!("SYMDEX_BUILD_DATE").unwrap_or("unknown")
}

pub fn rustc_version() -> &'static str {
    option_env!("SYMDEX_RUSTC_VERSION").unwrap_or("unknown")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_includes_package_version() {
        let v = version();
        assert!(v.starts_with("symdex "));
        assert!(v.contains(package_version()));
    }
}
