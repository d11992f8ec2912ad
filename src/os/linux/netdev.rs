//! linux specific network device functions module
//! This module interfaces with the linux netdevice kernel API through the
//! standard C library's ioctl interface.
#![allow(non_camel_case_types)]

// debugging
use crate::constants::*;
use crate::debug::{print_debug, Verbose};

// std, libc, ffi
use libc::{c_short, ioctl, ETH_ALEN, IFF_PROMISC, IFF_RUNNING, IFF_UP, IF_NAMESIZE};
use std::ffi::CString;
use std::io;

/// Promiscuous Flag Operations
pub enum PflagOp {
    Set,
    Unset,
}

/// ioctl_flags Structure
#[repr(C)]
struct ioctl_flags {
    ifr_name: [u8; IF_NAMESIZE],
    ifr_flags: c_short,
}

/// ioctl_ether_mac Structure
#[repr(C)]
#[derive(Debug)]
struct ioctl_ether_mac {
    ifr_name: [u8; IF_NAMESIZE],
    ifr_hwaddr: int_sockaddr_ether,
}

/// internal int_sockaddr_ether Structure
#[derive(Debug)]
#[repr(C)]
struct int_sockaddr_ether {
    sa_family: u16,
    sa_data: [u8; ETH_ALEN as usize],
}

// ifname_buf() function
// copy a C interface name into the fixed-size array the ioctls expect
fn ifname_buf(ifname: &CString) -> [u8; IF_NAMESIZE] {
    let name = ifname.as_bytes_with_nul();
    // check interface name size
    if name.len() > IF_NAMESIZE {
        panic!("Interface name is longer than {}", IF_NAMESIZE - 1);
    }
    let mut buf = [0u8; IF_NAMESIZE];
    buf[..name.len()].copy_from_slice(name);
    buf
}

// set_if_promiscuous() function
/// Set (or Unset) interface in promiscuous mode
pub fn set_if_promiscuous(sockfd: i32, ifname: &CString, op: PflagOp) -> io::Result<()> {
    // construct ioctl_flags structure
    let mut ifopts = ioctl_flags {
        ifr_name: ifname_buf(ifname),
        ifr_flags: 0,
    };

    // operation to perform on promiscuous flag
    match op {
        PflagOp::Set => {
            // set the flags to UP,RUNNING,PROMISC using bitwise OR operation.
            ifopts.ifr_flags |= IFF_UP as c_short | IFF_RUNNING as c_short | IFF_PROMISC as c_short;
            let res = unsafe { ioctl(sockfd, libc::SIOCSIFFLAGS, &mut ifopts) };
            if res < 0 {
                return Err(io::Error::last_os_error());
            }
        }
        PflagOp::Unset => {
            // unset PROMISC flag
            ifopts.ifr_flags |= IFF_UP as c_short | IFF_RUNNING as c_short;
            let res = unsafe { ioctl(sockfd, libc::SIOCSIFFLAGS, &mut ifopts) };
            if res < 0 {
                return Err(io::Error::last_os_error());
            }
        }
    }

    Ok(())
}

// get_mac_addr() function
/// Get the MAC address of an interface
/// this function return the interface's MAC address if read sucessfully
pub fn get_mac_addr(sockfd: i32, ifname: &CString, debug: &Verbose) -> io::Result<[u8; 6]> {
    // constuct ifmac structure
    let mut ifmac = ioctl_ether_mac {
        ifr_name: ifname_buf(ifname),
        ifr_hwaddr: int_sockaddr_ether {
            sa_family: 0,
            sa_data: [0u8; ETH_ALEN as usize],
        },
    };

    print_debug(
        debug,
        DEBUG_LEVEL_HIGH,
        DEBUG_SRC_MAC,
        format!("getting mac address on interface {:?}", ifname),
    );
    let result = unsafe { ioctl(sockfd, libc::SIOCGIFHWADDR, &mut ifmac) };
    if result < 0 {
        return Err(io::Error::last_os_error());
    }
    print_debug(
        debug,
        DEBUG_LEVEL_HIGH,
        DEBUG_SRC_MAC,
        format!("got interface {:?} mac address {:?}", ifname, ifmac),
    );

    // return the mac address
    Ok(ifmac.ifr_hwaddr.sa_data)
}
