//! Read-only access to tables pinned under bpffs
//!
//! The pin is opened with `BPF_F_RDONLY`, so the kernel refuses updates
//! through this handle. Inner tables of a hash of maps are opened by id with
//! the same flag. Every fd is owned by aya's [`MapData`] and closed when it
//! is dropped, whichever way the scan ends.

use std::ffi::CString;
use std::io;
use std::os::fd::{FromRawFd, OwnedFd, RawFd};
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};

use agentscope_common::{DecodeError, FixedLayout, MapId};
use aya::maps::{HashMap, Map, MapData};
use log::debug;

use crate::domain::{BoxError, TableError};
use crate::table::{decode_entry, decode_inner_entry, NestedTableLayout, TableLayout, TableSource};

const BPF_OBJ_GET: libc::c_int = 7;
const BPF_MAP_GET_FD_BY_ID: libc::c_int = 14;
const BPF_F_RDONLY: u32 = 1 << 3;

/// Raw hash-of-maps value as returned by a userspace lookup
type RawMapId = [u8; 4];

/// `union bpf_attr` as used by `BPF_OBJ_GET`, padded so no byte is left
/// uninitialized
#[repr(C)]
struct ObjGetAttr {
    pathname: u64,
    bpf_fd: u32,
    file_flags: u32,
    path_fd: i32,
    pad: u32,
}

/// `union bpf_attr` as used by `BPF_MAP_GET_FD_BY_ID`
#[repr(C)]
struct GetFdByIdAttr {
    map_id: u32,
    next_id: u32,
    open_flags: u32,
}

/// A pinned table opened for reading
pub struct PinnedTable {
    path: PathBuf,
    data: MapData,
}

impl PinnedTable {
    /// Open the table pinned at `path`.
    ///
    /// # Errors
    /// [`TableError::NotFound`] if nothing is pinned there,
    /// [`TableError::Permission`] without access rights (usually missing
    /// `CAP_BPF`), [`TableError::Backend`] for anything else.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, TableError> {
        let path = path.as_ref();
        std::fs::metadata(path).map_err(|e| TableError::from_open(path, e))?;

        let fd = obj_get_readonly(path).map_err(|e| TableError::from_open(path, e))?;
        let data = MapData::from_fd(fd)
            .map_err(|e| TableError::Backend { path: path.to_path_buf(), source: Box::new(e) })?;

        debug!("Opened pinned table {} read-only", path.display());
        Ok(Self { path: path.to_path_buf(), data })
    }
}

impl TableSource for PinnedTable {
    fn scan<L, F>(self, mut visit: F) -> Result<usize, TableError>
    where
        L: TableLayout,
        F: FnMut(L::Key, L::Value),
    {
        let Self { path, data } = self;

        // aya checks the table's key/value sizes against the raw arrays here
        let map: HashMap<MapData, L::RawKey, L::RawValue> = HashMap::try_from(Map::HashMap(data))
            .map_err(|e| TableError::Backend { path: path.clone(), source: Box::new(e) })?;

        let mut count = 0;
        for entry in map.iter() {
            let (raw_key, raw_value) = entry.map_err(|e| TableError::IterationFailed {
                path: path.clone(),
                source: Box::new(e),
            })?;
            let (key, value) = decode_entry::<L>(raw_key.as_ref(), raw_value.as_ref())
                .map_err(|source| TableError::Decode { path: path.clone(), source })?;
            visit(key, value);
            count += 1;
        }

        debug!("Scanned {count} entries from {}", path.display());
        Ok(count)
    }

    fn scan_nested<L, F>(self, mut visit: F) -> Result<usize, TableError>
    where
        L: NestedTableLayout,
        F: FnMut(L::OuterKey, Vec<(L::Key, L::Value)>),
    {
        let Self { path, data } = self;
        let iteration_failed =
            |source: BoxError| TableError::IterationFailed { path: path.clone(), source };
        let decode_failed =
            |source: DecodeError| TableError::Decode { path: path.clone(), source };

        let outer: HashMap<MapData, L::RawOuterKey, RawMapId> =
            HashMap::try_from(Map::HashMap(data))
                .map_err(|e| TableError::Backend { path: path.clone(), source: Box::new(e) })?;

        let mut count = 0;
        for entry in outer.iter() {
            let (raw_key, raw_id) = entry.map_err(|e| iteration_failed(e.into()))?;
            let outer_key = L::OuterKey::decode(raw_key.as_ref()).map_err(decode_failed)?;
            let id = MapId::decode(raw_id.as_ref()).map_err(decode_failed)?;

            let inner_data = map_get_fd_readonly(id)
                .map_err(|e| iteration_failed(e.into()))
                .and_then(|fd| MapData::from_fd(fd).map_err(|e| iteration_failed(e.into())))?;
            let inner: HashMap<MapData, L::RawKey, L::RawValue> =
                HashMap::try_from(Map::HashMap(inner_data))
                    .map_err(|e| iteration_failed(e.into()))?;

            let mut entries = Vec::new();
            for entry in inner.iter() {
                let (raw_key, raw_value) = entry.map_err(|e| iteration_failed(e.into()))?;
                entries.push(
                    decode_inner_entry::<L>(raw_key.as_ref(), raw_value.as_ref())
                        .map_err(decode_failed)?,
                );
            }

            debug!("Inner table {id} holds {} entries", entries.len());
            visit(outer_key, entries);
            count += 1;
        }

        debug!("Scanned {count} outer entries from {}", path.display());
        Ok(count)
    }
}

/// `BPF_OBJ_GET` with `BPF_F_RDONLY`; aya's `MapData::from_pin` always asks
/// for a read-write fd.
fn obj_get_readonly(path: &Path) -> io::Result<OwnedFd> {
    let c_path = CString::new(path.as_os_str().as_bytes())
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
    let attr = ObjGetAttr {
        pathname: c_path.as_ptr() as u64,
        bpf_fd: 0,
        file_flags: BPF_F_RDONLY,
        path_fd: 0,
        pad: 0,
    };
    // c_path stays alive until bpf_fd returns
    bpf_fd(BPF_OBJ_GET, &attr)
}

/// `BPF_MAP_GET_FD_BY_ID` with `BPF_F_RDONLY`
fn map_get_fd_readonly(id: MapId) -> io::Result<OwnedFd> {
    let attr = GetFdByIdAttr { map_id: id.0, next_id: 0, open_flags: BPF_F_RDONLY };
    bpf_fd(BPF_MAP_GET_FD_BY_ID, &attr)
}

/// Issue a `bpf(2)` command that returns a new fd
#[allow(unsafe_code)]
fn bpf_fd<A>(cmd: libc::c_int, attr: &A) -> io::Result<OwnedFd> {
    // SAFETY: attr is a fully initialized bpf_attr prefix for cmd, and the
    // kernel reads at most size_of::<A>() bytes from it
    let ret = unsafe {
        libc::syscall(libc::SYS_bpf, cmd, std::ptr::from_ref(attr), std::mem::size_of::<A>())
    };
    if ret < 0 {
        return Err(io::Error::last_os_error());
    }

    let fd = RawFd::try_from(ret).map_err(|_| io::Error::other("bpf returned an invalid fd"))?;
    // SAFETY: the kernel just handed us this fd and nothing else owns it
    Ok(unsafe { OwnedFd::from_raw_fd(fd) })
}
