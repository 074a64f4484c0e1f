//! Embeds git metadata for `tasplay --version`.
//!
//! Builds without the `release` feature emit `VERGEN_GIT_SHA` and
//! `VERGEN_GIT_COMMIT_DATE`. Release builds report the package version only.

fn main() {
    #[cfg(not(feature = "release"))]
    {
        use vergen_gitcl::{Emitter, GitclBuilder};

        let emitted = GitclBuilder::default()
            .sha(true)
            .commit_date(true)
            .build()
            .map_err(|e| e.to_string())
            .and_then(|git| {
                Emitter::default()
                    .add_instructions(&git)
                    .and_then(|emitter| emitter.emit())
                    .map_err(|e| e.to_string())
            });

        if let Err(e) = emitted {
            // Not in a git repo or git unavailable
            println!("cargo:warning=Failed to get git info: {}", e);
            println!("cargo:rustc-env=VERGEN_GIT_SHA=unknown");
            println!("cargo:rustc-env=VERGEN_GIT_COMMIT_DATE=unknown");
        }
    }
}
