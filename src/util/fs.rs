use std::fs;
use std::io;
use std::path::Path;

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

/// Set Unix permission bits on `path`. No-op elsewhere.
pub fn set_permissions(path: &Path, mode: u32) -> io::Result<()> {
    #[cfg(unix)]
    {
        fs::set_permissions(path, fs::Permissions::from_mode(mode))?;
    }
    #[cfg(not(unix))]
    {
        let _ = (path, mode);
    }
    Ok(())
}

/// Permission bits of `path`, masked to `0o777`.
#[cfg(unix)]
pub fn mode_of(path: &Path) -> io::Result<u32> {
    Ok(fs::metadata(path)?.permissions().mode() & 0o777)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_set_permissions_roundtrip() {
        let tmp = NamedTempFile::new().unwrap();
        set_permissions(tmp.path(), 0o600).unwrap();
        assert_eq!(mode_of(tmp.path()).unwrap(), 0o600);
        set_permissions(tmp.path(), 0o640).unwrap();
        assert_eq!(mode_of(tmp.path()).unwrap(), 0o640);
    }
}
