// # Token File
//
// Single-line secret file holding the provider API token.
//
// ## Expected shape
//
// - Regular file, mode exactly 0600
// - Owned by the effective user and group of the hook process
// - One line: the token, optionally followed by a newline
//
// Deviations from the expected ownership or mode are reported as
// `PermissionWarning`s; they never fail an invocation.

use std::fmt;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::Error;

/// Mode bits the token file must carry
pub const TOKEN_FILE_MODE: u32 = 0o600;

/// File type bits of a regular file (`S_IFREG`)
const REGULAR_FILE: u32 = 0o100000;

/// Advisory finding about the token file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PermissionWarning {
    /// File owner differs from the effective user
    DifferentOwner {
        /// Owner uid of the file
        file: u32,
        /// Effective uid of the process
        effective: u32,
    },
    /// File group differs from the effective group
    DifferentGroup {
        /// Group gid of the file
        file: u32,
        /// Effective gid of the process
        effective: u32,
    },
    /// Not a regular file with mode 0600
    InsecureMode {
        /// Full `st_mode` of the file
        mode: u32,
    },
}

impl fmt::Display for PermissionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PermissionWarning::DifferentOwner { file, effective } => {
                write!(f, "Different user for token file: {}/{}", file, effective)
            }
            PermissionWarning::DifferentGroup { file, effective } => {
                write!(f, "Different group for token file: {}/{}", file, effective)
            }
            PermissionWarning::InsecureMode { mode } => {
                write!(f, "Dangerous file mode: {:o}, use 0600!", mode)
            }
        }
    }
}

/// Compare file ownership and mode against the process identity
#[cfg_attr(not(unix), allow(dead_code))]
fn evaluate(uid: u32, gid: u32, mode: u32, euid: u32, egid: u32) -> Vec<PermissionWarning> {
    let mut warnings = Vec::new();

    if uid != euid {
        warnings.push(PermissionWarning::DifferentOwner {
            file: uid,
            effective: euid,
        });
    }

    if gid != egid {
        warnings.push(PermissionWarning::DifferentGroup {
            file: gid,
            effective: egid,
        });
    }

    if mode != REGULAR_FILE | TOKEN_FILE_MODE {
        warnings.push(PermissionWarning::InsecureMode { mode });
    }

    warnings
}

/// The token file at a fixed path
///
/// # Example
///
/// ```rust,no_run
/// use txthook_core::credentials::TokenFile;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let file = TokenFile::new("/home/acme/.txthook-token");
///     file.init().await?;
///
///     for warning in file.check_permissions().await? {
///         eprintln!("{}", warning);
///     }
///
///     let token = file.read_token().await?;
///     assert!(!token.is_empty());
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenFile {
    path: PathBuf,
}

impl TokenFile {
    /// Point at a token file
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Path of the file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn error(&self, message: impl Into<String>) -> Error {
        Error::token_file(self.path.display().to_string(), message)
    }

    /// Read the token, dropping surrounding whitespace and newlines
    pub async fn read_token(&self) -> Result<String, Error> {
        let content = fs::read_to_string(&self.path)
            .await
            .map_err(|e| self.error(format!("failed to read: {}", e)))?;

        let token = content.trim();
        if token.is_empty() {
            return Err(self.error("file is empty, put the API token in it"));
        }

        tracing::debug!(path = %self.path.display(), "Read API token");
        Ok(token.to_string())
    }

    /// Create the file if missing, then force mode 0600
    ///
    /// An existing token is never truncated.
    pub async fn init(&self) -> Result<(), Error> {
        let mut options = fs::OpenOptions::new();
        options.read(true).write(true).create(true);
        #[cfg(unix)]
        options.mode(TOKEN_FILE_MODE);

        tracing::info!(path = %self.path.display(), "Creating token file");
        options
            .open(&self.path)
            .await
            .map_err(|e| self.error(format!("failed to create: {}", e)))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;

            tracing::info!(path = %self.path.display(), "Changing token file mode to 0600");
            fs::set_permissions(&self.path, std::fs::Permissions::from_mode(TOKEN_FILE_MODE))
                .await
                .map_err(|e| self.error(format!("failed to chmod: {}", e)))?;
        }

        Ok(())
    }

    /// Inspect ownership and mode
    ///
    /// Failing to stat the file is an error; anything found wrong with a
    /// file that exists is returned as warnings.
    #[cfg(unix)]
    pub async fn check_permissions(&self) -> Result<Vec<PermissionWarning>, Error> {
        use std::os::unix::fs::MetadataExt;

        let metadata = fs::metadata(&self.path)
            .await
            .map_err(|e| self.error(format!("failed to stat: {}", e)))?;

        // SAFETY: geteuid/getegid have no preconditions and cannot fail
        let (euid, egid) = unsafe { (libc::geteuid(), libc::getegid()) };

        let warnings = evaluate(metadata.uid(), metadata.gid(), metadata.mode(), euid, egid);
        for warning in &warnings {
            tracing::warn!(path = %self.path.display(), "{}", warning);
        }
        Ok(warnings)
    }

    /// Inspect ownership and mode
    ///
    /// Ownership and mode bits are not inspected on this platform.
    #[cfg(not(unix))]
    pub async fn check_permissions(&self) -> Result<Vec<PermissionWarning>, Error> {
        fs::metadata(&self.path)
            .await
            .map_err(|e| self.error(format!("failed to stat: {}", e)))?;
        Ok(Vec::new())
    }
}
