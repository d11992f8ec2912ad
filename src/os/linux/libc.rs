//! linux standard c library compatibility

// std, libc, ffi
use std::ffi::CString;
use std::io;

// c_ifnametoindex() function
/// see 'man 3 if_nametoindex'
pub fn c_ifnametoindex(ifname: &String) -> io::Result<u32> {
    unsafe {
        let c_ifname = CString::new(ifname.clone()).unwrap();
        let r = libc::if_nametoindex(c_ifname.as_ptr());
        if r == 0 {
            Err(io::Error::last_os_error())
        } else {
            Ok(r)
        }
    }
}

// Tests
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loopback_interface_has_an_index() {
        let idx = c_ifnametoindex(&"lo".to_string()).unwrap();
        assert!(idx > 0);
    }

    #[test]
    fn unknown_interface_is_an_error() {
        assert!(c_ifnametoindex(&"does-not-exist0".to_string()).is_err());
    }
}
