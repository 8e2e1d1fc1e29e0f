//! Build script for wolflog - embeds the git commit hash for dev builds.
//!
//! Default dev builds emit `VERGEN_GIT_SHA` so `--version` shows which
//! commit a binary came from. Official builds set the `release` feature and
//! get a clean version string.

fn main() {
    #[cfg(not(feature = "release"))]
    {
        use vergen_gitcl::{Emitter, GitclBuilder};

        let git = GitclBuilder::default()
            .sha(true)
            .build()
            .expect("Failed to configure git info");

        if let Err(e) = Emitter::default()
            .add_instructions(&git)
            .expect("Failed to add git instructions")
            .emit()
        {
            // Not fatal - e.g. building from a source tarball without .git
            eprintln!("cargo:warning=Failed to get git info: {}", e);
            println!("cargo:rustc-env=VERGEN_GIT_SHA=unknown");
        }
    }
}
