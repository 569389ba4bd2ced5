//! Post-sync hook installer
//!
//! Writes a fixed pair of hook scripts into each mirror after its sync.
//! The hooks refuse local commits and pushes: these working copies are
//! read-only mirrors and any local change is discarded by the next
//! recovery. Installer failures are reported by the caller but never
//! change a sync outcome.

use std::fs;
use std::io;
use std::path::Path;

const PRE_COMMIT: &str = "#!/bin/sh\n\
# Installed by gitmirror. This working copy is a read-only mirror;\n\
# local commits are discarded on the next sync.\n\
echo 'gitmirror: refusing to commit in a read-only mirror' >&2\n\
exit 1\n";

const PRE_PUSH: &str = "#!/bin/sh\n\
# Installed by gitmirror. This working copy is a read-only mirror;\n\
# nothing is ever pushed upstream from it.\n\
echo 'gitmirror: refusing to push from a read-only mirror' >&2\n\
exit 1\n";

/// Installs the fixed hook scripts into a mirror's hook directory
#[derive(Debug, Clone, Default)]
pub struct HookInstaller;

impl HookInstaller {
    /// Creates a new hook installer
    pub fn new() -> Self {
        Self
    }

    /// Writes `pre-commit` and `pre-push` into `<mirror>/.git/hooks`
    ///
    /// Creates the hooks directory if needed and overwrites any existing
    /// scripts of the same name. On unix the scripts are made executable.
    pub fn install(&self, mirror: &Path) -> io::Result<()> {
        let hooks_dir = mirror.join(".git").join("hooks");
        fs::create_dir_all(&hooks_dir)?;

        write_hook(&hooks_dir.join("pre-commit"), PRE_COMMIT)?;
        write_hook(&hooks_dir.join("pre-push"), PRE_PUSH)?;
        Ok(())
    }
}

fn write_hook(path: &Path, contents: &str) -> io::Result<()> {
    fs::write(path, contents)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o755))?;
    }

    Ok(())
}
