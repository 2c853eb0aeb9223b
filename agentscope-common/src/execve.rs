//! Execve tracking table
//!
//! One entry per live thread group, written by the agent's exec/fork hooks.
//! Key is the [`Tgid`](crate::Tgid); the value records the process and parent
//! exec keys, namespaces, capabilities and the binary path seen at exec.
//!
//! ## Value Layout (368 bytes)
//!
//! ```text
//! offset  size  field
//!      0    16  process      (pid u32, pad u32, ktime u64)
//!     16    16  parent       (pid u32, pad u32, ktime u64)
//!     32     4  flags
//!     36     4  nspid
//!     40    40  namespaces   (10 x u32 inode numbers)
//!     80    24  capabilities (permitted, effective, inheritable u64)
//!    104   264  binary       (path_length i32, reserved u32, path [u8; 256])
//! ```

use core::fmt::{self, Write as _};

use crate::{i32_at, put, u32_at, u64_at, DecodeError, FixedLayout};

/// Table name under the agent's pin directory
pub const MAP_NAME: &str = "execve_map";

/// Maximum binary path bytes stored per entry
pub const BINARY_PATH_MAX: usize = 256;

const PROCESS_OFFSET: usize = 0;
const PARENT_OFFSET: usize = 16;
const FLAGS_OFFSET: usize = 32;
const NSPID_OFFSET: usize = 36;
const NAMESPACES_OFFSET: usize = 40;
const CAPS_OFFSET: usize = 80;
const BINARY_OFFSET: usize = 104;
const PATH_OFFSET: usize = BINARY_OFFSET + 8;

/// Exec identity of a process: pid plus exec time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessKey {
    pub pid: u32,
    /// Exec timestamp (`bpf_ktime_get_ns()`, boot-relative)
    pub ktime: u64,
}

impl ProcessKey {
    const SIZE: usize = 16;

    fn read(raw: &[u8], at: usize) -> Self {
        Self { pid: u32_at(raw, at), ktime: u64_at(raw, at + 8) }
    }

    fn write(&self, buf: &mut [u8], at: usize) {
        put(buf, at, &self.pid.to_ne_bytes());
        put(buf, at + 8, &self.ktime.to_ne_bytes());
    }
}

/// Namespace inode numbers of the process
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Namespaces {
    pub uts: u32,
    pub ipc: u32,
    pub mnt: u32,
    pub pid: u32,
    pub pid_for_children: u32,
    pub net: u32,
    pub time: u32,
    pub time_for_children: u32,
    pub cgroup: u32,
    pub user: u32,
}

impl Namespaces {
    const COUNT: usize = 10;

    fn names() -> [&'static str; Self::COUNT] {
        [
            "uts",
            "ipc",
            "mnt",
            "pid",
            "pid_for_children",
            "net",
            "time",
            "time_for_children",
            "cgroup",
            "user",
        ]
    }

    fn to_array(self) -> [u32; Self::COUNT] {
        [
            self.uts,
            self.ipc,
            self.mnt,
            self.pid,
            self.pid_for_children,
            self.net,
            self.time,
            self.time_for_children,
            self.cgroup,
            self.user,
        ]
    }

    fn from_array(ns: [u32; Self::COUNT]) -> Self {
        let [uts, ipc, mnt, pid, pid_for_children, net, time, time_for_children, cgroup, user] = ns;
        Self { uts, ipc, mnt, pid, pid_for_children, net, time, time_for_children, cgroup, user }
    }
}

/// Capability sets of the process
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
    pub permitted: u64,
    pub effective: u64,
    pub inheritable: u64,
}

/// Binary path captured at exec (may be truncated by the agent)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Binary {
    path: [u8; BINARY_PATH_MAX],
    len: usize,
}

impl Binary {
    /// Paths longer than [`BINARY_PATH_MAX`] are truncated.
    #[must_use]
    pub fn new(path: &[u8]) -> Self {
        let len = path.len().min(BINARY_PATH_MAX);
        let mut buf = [0u8; BINARY_PATH_MAX];
        buf[..len].copy_from_slice(&path[..len]);
        Self { path: buf, len }
    }

    #[must_use]
    pub fn path(&self) -> &[u8] {
        &self.path[..self.len]
    }
}

impl Default for Binary {
    fn default() -> Self {
        Self::new(&[])
    }
}

impl fmt::Display for Binary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for chunk in self.path().utf8_chunks() {
            f.write_str(chunk.valid())?;
            if !chunk.invalid().is_empty() {
                f.write_char(char::REPLACEMENT_CHARACTER)?;
            }
        }
        Ok(())
    }
}

/// Decoded execve table value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecveValue {
    pub process: ProcessKey,
    pub parent: ProcessKey,
    pub flags: u32,
    pub nspid: u32,
    pub namespaces: Namespaces,
    pub capabilities: Capabilities,
    pub binary: Binary,
}

/// Encoded size of [`ExecveValue`]
pub const VALUE_SIZE: usize = PATH_OFFSET + BINARY_PATH_MAX;

/// Encoded size of the table key ([`Tgid`](crate::Tgid))
pub const KEY_SIZE: usize = 4;

const _: () = assert!(VALUE_SIZE == 368);
const _: () = assert!(PARENT_OFFSET == PROCESS_OFFSET + ProcessKey::SIZE);
const _: () = assert!(CAPS_OFFSET == NAMESPACES_OFFSET + 4 * Namespaces::COUNT);

impl FixedLayout for ExecveValue {
    const LAYOUT: &'static str = "execve_value";
    const SIZE: usize = VALUE_SIZE;
    type Bytes = [u8; VALUE_SIZE];

    fn encode(&self) -> Self::Bytes {
        let mut buf = [0u8; VALUE_SIZE];
        self.process.write(&mut buf, PROCESS_OFFSET);
        self.parent.write(&mut buf, PARENT_OFFSET);
        put(&mut buf, FLAGS_OFFSET, &self.flags.to_ne_bytes());
        put(&mut buf, NSPID_OFFSET, &self.nspid.to_ne_bytes());
        for (i, ns) in self.namespaces.to_array().iter().enumerate() {
            put(&mut buf, NAMESPACES_OFFSET + 4 * i, &ns.to_ne_bytes());
        }
        put(&mut buf, CAPS_OFFSET, &self.capabilities.permitted.to_ne_bytes());
        put(&mut buf, CAPS_OFFSET + 8, &self.capabilities.effective.to_ne_bytes());
        put(&mut buf, CAPS_OFFSET + 16, &self.capabilities.inheritable.to_ne_bytes());
        #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
        let path_length = self.binary.len as i32;
        put(&mut buf, BINARY_OFFSET, &path_length.to_ne_bytes());
        put(&mut buf, PATH_OFFSET, &self.binary.path);
        buf
    }

    fn decode(raw: &[u8]) -> Result<Self, DecodeError> {
        Self::check_size(raw)?;

        let path_length = i32_at(raw, BINARY_OFFSET);
        let len = usize::try_from(path_length)
            .ok()
            .filter(|len| *len <= BINARY_PATH_MAX)
            .ok_or(DecodeError::InvalidField {
                layout: Self::LAYOUT,
                field: "binary.path_length",
                value: i64::from(path_length),
            })?;

        let mut ns = [0u32; Namespaces::COUNT];
        for (i, slot) in ns.iter_mut().enumerate() {
            *slot = u32_at(raw, NAMESPACES_OFFSET + 4 * i);
        }

        Ok(Self {
            process: ProcessKey::read(raw, PROCESS_OFFSET),
            parent: ProcessKey::read(raw, PARENT_OFFSET),
            flags: u32_at(raw, FLAGS_OFFSET),
            nspid: u32_at(raw, NSPID_OFFSET),
            namespaces: Namespaces::from_array(ns),
            capabilities: Capabilities {
                permitted: u64_at(raw, CAPS_OFFSET),
                effective: u64_at(raw, CAPS_OFFSET + 8),
                inheritable: u64_at(raw, CAPS_OFFSET + 16),
            },
            binary: Binary::new(&raw[PATH_OFFSET..PATH_OFFSET + len]),
        })
    }
}

impl fmt::Display for ExecveValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "process=(pid={} ktime={}) parent=(pid={} ktime={}) flags={:#x} nspid={}",
            self.process.pid, self.process.ktime, self.parent.pid, self.parent.ktime, self.flags, self.nspid
        )?;
        write!(
            f,
            " caps=(permitted={:#x} effective={:#x} inheritable={:#x})",
            self.capabilities.permitted, self.capabilities.effective, self.capabilities.inheritable
        )?;
        f.write_str(" ns=(")?;
        for (i, (name, ino)) in Namespaces::names().iter().zip(self.namespaces.to_array()).enumerate() {
            if i > 0 {
                f.write_char(' ')?;
            }
            write!(f, "{name}={ino}")?;
        }
        write!(f, ") binary={}", self.binary)
    }
}
