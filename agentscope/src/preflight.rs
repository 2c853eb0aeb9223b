//! Pre-flight checks for table dumps
//!
//! Spots the usual reasons a pinned table cannot be read before the first
//! open fails. Everything here is advisory: the dump still runs and reports
//! its own error.

#![allow(unsafe_code)] // geteuid() and statfs() require unsafe

use std::ffi::CString;
use std::mem::MaybeUninit;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;

use log::warn;

/// `BPF_FS_MAGIC` from `linux/magic.h`
const BPF_FS_MAGIC: u64 = 0xcafe_4a11;

/// Collect warnings about the environment for reading tables under `root`
pub fn preflight_warnings(root: &Path) -> Vec<String> {
    let mut warnings = Vec::new();

    // SAFETY: geteuid takes no arguments and cannot fail
    if unsafe { libc::geteuid() } != 0 {
        warnings.push(
            "Not running as root: reading pinned tables usually requires CAP_BPF.\n\
             Run with: sudo agentscope ..."
                .to_string(),
        );
    }

    if !root.exists() {
        warnings.push(format!(
            "bpf root {} not found. Is bpffs mounted? (mount -t bpf bpf {})",
            root.display(),
            root.display()
        ));
    } else if is_bpffs(root) == Some(false) {
        warnings.push(format!("{} is not a bpf filesystem", root.display()));
    }

    warnings
}

/// Log every pre-flight warning
pub fn run_preflight_checks(root: &Path) {
    for warning in preflight_warnings(root) {
        warn!("{warning}");
    }
}

/// `None` when the filesystem type cannot be determined
fn is_bpffs(path: &Path) -> Option<bool> {
    let c_path = CString::new(path.as_os_str().as_bytes()).ok()?;
    let mut stat = MaybeUninit::<libc::statfs>::uninit();
    // SAFETY: c_path is NUL-terminated and stat points to writable storage
    // of the right size
    if unsafe { libc::statfs(c_path.as_ptr(), stat.as_mut_ptr()) } != 0 {
        return None;
    }
    // SAFETY: statfs returned 0, so it filled in stat
    let stat = unsafe { stat.assume_init() };
    #[allow(clippy::cast_sign_loss, clippy::unnecessary_cast)]
    let magic = stat.f_type as u64;
    Some(magic == BPF_FS_MAGIC)
}
