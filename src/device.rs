//! network device module
//! This module provides the narrow interface to the network hardware and
//! its Linux AF_PACKET implementation.

// constants
use crate::constants::*;

// debugging
use crate::debug::{print_debug, Verbose};

// operating systems support
use crate::os::linux::libc::c_ifnametoindex;
use crate::os::linux::netdev::{get_mac_addr, set_if_promiscuous, PflagOp};

// itertools
use itertools::Itertools;

// std
use std::ffi::CString;
use std::io;
use std::mem;

// libc
use libc::{
    bind, c_void, close, recvfrom, sendto, sockaddr, sockaddr_ll, socket, socklen_t, AF_PACKET,
    SOCK_RAW,
};

/// NicDevice Trait
/// the three operations the responder needs from the hardware
pub trait NicDevice {
    /// block until one frame is available; the frame is written starting
    /// at the NET_IP_ALIGN offset of `buf` and its byte length returned
    fn recv_frame(&mut self, buf: &mut [u8]) -> io::Result<usize>;
    /// transmit the first `len` bytes of `buf`, alignment padding
    /// included; `len` must be a multiple of NIC_TX_ALIGN
    fn send_frame(&mut self, buf: &[u8], len: usize) -> io::Result<()>;
    /// the device's own hardware address
    fn mac_addr(&self) -> [u8; ETHER_MAC_SIZE];
}

/// PacketSocket Structure
/// raw AF_PACKET socket bound to a single interface
pub struct PacketSocket {
    fd: i32,
    ifindex: i32,
    ifname: CString,
    mac: [u8; ETHER_MAC_SIZE],
    promiscuous: bool,
}

// PacketSocket Type Implementation
impl PacketSocket {
    // open() method
    /// open a raw socket for every ethertype, bind it to the interface,
    /// and read the device's MAC address
    pub fn open(ifname: &str, promiscuous: bool, debug: &Verbose) -> io::Result<PacketSocket> {
        // man 2 socket
        // returns a file descriptor or -1 if error.
        let fd = unsafe {
            match socket(AF_PACKET, SOCK_RAW, ETHER_P_ALL.to_be() as i32) {
                -1 => return Err(io::Error::last_os_error()),
                fd => fd,
            }
        };

        // bind to the interface so only its frames are delivered
        let ifindex = c_ifnametoindex(&ifname.to_string())? as i32;
        let mut sa = sockaddr_ll {
            sll_family: AF_PACKET as u16,
            sll_protocol: ETHER_P_ALL.to_be(),
            sll_ifindex: ifindex,
            sll_hatype: 0,
            sll_pkttype: 0,
            sll_halen: 0,
            sll_addr: [0; 8],
        };
        unsafe {
            let ptr_sockaddr = mem::transmute::<*mut sockaddr_ll, *mut sockaddr>(&mut sa);
            if bind(fd, ptr_sockaddr, mem::size_of::<sockaddr_ll>() as socklen_t) == -1 {
                return Err(io::Error::last_os_error());
            }
        }

        let c_ifname = CString::new(ifname.as_bytes() as &[u8]).unwrap();
        if promiscuous {
            set_if_promiscuous(fd, &c_ifname, PflagOp::Set)?;
        }

        // read the device's own MAC address, once
        let mac = get_mac_addr(fd, &c_ifname, debug)?;
        print_debug(
            debug,
            DEBUG_LEVEL_INFO,
            DEBUG_SRC_NIC,
            format!(
                "listening on {}, mac address {}",
                ifname,
                mac.iter().map(|b| format!("{:02x}", b)).join(":")
            ),
        );

        Ok(PacketSocket {
            fd,
            ifindex,
            ifname: c_ifname,
            mac,
            promiscuous,
        })
    }
}

// NicDevice Implementation for PacketSocket
impl NicDevice for PacketSocket {
    // recv_frame() method
    fn recv_frame(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let frame = &mut buf[NET_IP_ALIGN..];
        let mut sockaddr: sockaddr_ll = unsafe { mem::zeroed() };
        let mut addr_buf_len: socklen_t = mem::size_of::<sockaddr_ll>() as socklen_t;
        let len: isize;

        unsafe {
            // unsafe transmut of sockaddr_ll to a sockaddr type
            let addr_ptr: *mut sockaddr =
                mem::transmute::<*mut sockaddr_ll, *mut sockaddr>(&mut sockaddr);
            // unsafe call to libc's recvfrom (man 2 recvfrom)
            // returns length of message, -1 if error
            len = match recvfrom(
                self.fd,                           // socket file descriptor
                frame.as_mut_ptr() as *mut c_void, // pointer to buffer
                frame.len(),                       // buffer length
                0,                                 // flags
                addr_ptr as *mut sockaddr,         // pointer to source address
                &mut addr_buf_len,                 // address buffer length
            ) {
                -1 => {
                    return Err(io::Error::last_os_error());
                }
                len => len,
            }
        }

        Ok(len as usize)
    }

    // send_frame() method
    fn send_frame(&mut self, buf: &[u8], len: usize) -> io::Result<()> {
        // the alignment padding never reaches the wire
        let frame = &buf[NET_IP_ALIGN..len];

        // sockaddr_ll (man 7 packet)
        let mut sa = sockaddr_ll {
            sll_family: AF_PACKET as u16,
            sll_protocol: 0,
            sll_ifindex: self.ifindex,
            sll_hatype: 0,
            sll_pkttype: 0,
            sll_halen: 0,
            sll_addr: [0; 8],
        };

        unsafe {
            let ptr_sockaddr = mem::transmute::<*mut sockaddr_ll, *mut sockaddr>(&mut sa);
            match sendto(
                self.fd,
                frame.as_ptr() as *const c_void,
                frame.len(),
                0,
                ptr_sockaddr,
                mem::size_of_val(&sa) as u32,
            ) {
                -1 => Err(io::Error::last_os_error()),
                _ => Ok(()),
            }
        }
    }

    // mac_addr() getter
    fn mac_addr(&self) -> [u8; ETHER_MAC_SIZE] {
        self.mac
    }
}

// Drop Implementation for PacketSocket
impl Drop for PacketSocket {
    fn drop(&mut self) {
        // leave the interface the way we found it
        if self.promiscuous {
            let _ = set_if_promiscuous(self.fd, &self.ifname, PflagOp::Unset);
        }
        unsafe {
            close(self.fd);
        }
    }
}
