//! frame responder module
//! This module implements the dispatch state machine and the per-protocol
//! frame handlers. Replies are built by rewriting the received frame in
//! place inside the one frame buffer; the values a rewrite would clobber
//! are copied into a reply context first.

// constants
use crate::constants::*;

// checksums
use crate::checksums::rfc1071;

// debugging
use crate::debug::{print_debug, Verbose};

// network device
use crate::device::NicDevice;

// header codecs
use crate::frames::{ArpFrame, EthFrame, IcmpFrame, Ipv4Frame, LnicFrame, UdpFrame};

// itertools
use itertools::Itertools;

// std
use std::fmt;
use std::io;

/// Dispatcher States "Enumerator"
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum States {
    Idle,       // waiting for the next frame
    Received,   // a frame is in the buffer
    Classified, // the ethertype has been read
    ArpPath,    // routed to the ARP handler
    Ipv4Path,   // routed to the IPv4 protocol handlers
    Replied,    // a reply frame was transmitted
    Dropped,    // the cycle ended without a transmission
}

/// Drop Reason Type
/// validation failures carry the offending field with the expected and
/// actual values so one log line is enough to diagnose a bad frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DropReason {
    Ethertype {
        ethertype: u16,
    },
    IpProtocol {
        protocol: u8,
    },
    IpChecksum {
        cksum: u16,
    },
    IcmpChecksum {
        cksum: u16,
    },
    FieldMismatch {
        field: &'static str,
        expected: u32,
        actual: u32,
    },
    Truncated {
        field: &'static str,
        needed: usize,
        actual: usize,
    },
}

// DropReason Display Implementation
impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DropReason::Ethertype { ethertype } => write!(f, "wrong ethertype 0x{:04x}", ethertype),
            DropReason::IpProtocol { protocol } => write!(f, "wrong IP protocol {}", protocol),
            DropReason::IpChecksum { cksum } => {
                write!(f, "bad IP header checksum 0x{:04x}", cksum)
            }
            DropReason::IcmpChecksum { cksum } => write!(f, "bad ICMP checksum 0x{:04x}", cksum),
            DropReason::FieldMismatch {
                field,
                expected,
                actual,
            } => write!(f, "wrong {}: expected {}, got {}", field, expected, actual),
            DropReason::Truncated {
                field,
                needed,
                actual,
            } => write!(
                f,
                "frame too short for {}: needed {} bytes, got {}",
                field, needed, actual
            ),
        }
    }
}

/// Cycle Outcome Type
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Outcome {
    /// a reply of the carried wire length was transmitted
    Replied(usize),
    /// a UDP/LNIC message was decoded and reported, nothing transmitted
    Inspected,
    /// the frame was dropped without a reply
    Dropped(DropReason),
}

// handler verdict: Some(wire length) when a reply was built in place,
// None when the cycle legitimately ends without a transmission
type HandlerResult = Result<Option<usize>, DropReason>;

/// Reply Context Structure
/// request addresses copied out before the aliased fields are rewritten
struct ReplyContext {
    sha: [u8; ETHER_MAC_SIZE],
    spa: [u8; IP_ADDR_SIZE],
    tpa: [u8; IP_ADDR_SIZE],
}

/// Frame Buffer Structure
/// the single receive/process/transmit buffer, 64-bit aligned for the NIC;
/// the first NET_IP_ALIGN bytes are padding and never carry payload
#[repr(align(8))]
pub struct FrameBuffer([u8; FRAME_BUF_SIZE]);

// FrameBuffer Type Implementation
impl FrameBuffer {
    // new() method
    pub fn new() -> FrameBuffer {
        FrameBuffer([0u8; FRAME_BUF_SIZE])
    }
}

// align_frame_size() function
/// round a protocol message size up to the NIC transfer granularity,
/// leading alignment padding included
pub fn align_frame_size(size: usize) -> usize {
    let total = size + NET_IP_ALIGN;
    ((total - 1) / NIC_TX_ALIGN + 1) * NIC_TX_ALIGN
}

/// Responder Structure
/// owns the network device and the frame buffer for the whole loop
pub struct Responder<D: NicDevice> {
    dev: D,
    mac: [u8; ETHER_MAC_SIZE],
    buf: FrameBuffer,
    state: States,
}

// Responder Type Implementation
impl<D: NicDevice> Responder<D> {
    // new() method
    pub fn new(dev: D) -> Responder<D> {
        let mac = dev.mac_addr();
        Responder {
            dev,
            mac,
            buf: FrameBuffer::new(),
            state: States::Idle,
        }
    }
    // state() getter
    pub fn state(&self) -> States {
        self.state
    }
    // mac() getter
    pub fn mac(&self) -> [u8; ETHER_MAC_SIZE] {
        self.mac
    }
    // device() getter
    pub fn device(&self) -> &D {
        &self.dev
    }

    // process_cycle() method
    /// receive one frame, classify it, and reply or drop; a validation
    /// failure ends the cycle, never the loop
    pub fn process_cycle(&mut self, debug: &Verbose) -> io::Result<Outcome> {
        self.state = States::Idle;
        let len = self.dev.recv_frame(&mut self.buf.0)?;
        self.state = States::Received;

        let end = FRAME_BUF_SIZE.min(NET_IP_ALIGN + len);
        let min_len = ETHER_FRAME_OFFSET + EthFrame::SIZE;
        if end < min_len {
            self.state = States::Dropped;
            return Ok(Outcome::Dropped(DropReason::Truncated {
                field: "ethernet header",
                needed: min_len,
                actual: end,
            }));
        }

        let ethertype = EthFrame::new(&mut self.buf.0[..end]).ethertype();
        self.state = States::Classified;
        print_debug(
            debug,
            DEBUG_LEVEL_LOW,
            DEBUG_SRC_PACKET,
            format!("got frame [ethtype=0x{:04x}]", ethertype),
        );

        let mac = self.mac;
        let verdict = match ethertype {
            ETHER_P_IP => {
                self.state = States::Ipv4Path;
                process_ipv4(&mut self.buf.0[..end], &mac, debug)
            }
            ETHER_P_ARP => {
                self.state = States::ArpPath;
                process_arp(&mut self.buf.0[..end], &mac, debug).map(Some)
            }
            _ => Err(DropReason::Ethertype { ethertype }),
        };

        match verdict {
            Ok(Some(wire)) => {
                self.dev.send_frame(&self.buf.0, wire)?;
                self.state = States::Replied;
                Ok(Outcome::Replied(wire))
            }
            Ok(None) => {
                // diagnostic path, terminal without a transmission
                self.state = States::Dropped;
                Ok(Outcome::Inspected)
            }
            Err(reason) => {
                self.state = States::Dropped;
                Ok(Outcome::Dropped(reason))
            }
        }
    }
}

// process_arp() function
/// validate an ARP request and rewrite it in place into an ARP reply;
/// returns the aligned wire length to transmit
fn process_arp(
    frame: &mut [u8],
    mac: &[u8; ETHER_MAC_SIZE],
    debug: &Verbose,
) -> Result<usize, DropReason> {
    let needed = ARP_FRAME_OFFSET + ArpFrame::SIZE;
    if frame.len() < needed {
        return Err(DropReason::Truncated {
            field: "arp message",
            needed,
            actual: frame.len(),
        });
    }

    // verify the request and copy the reply context out of it
    let ctx = {
        let arp = ArpFrame::new(&mut *frame);
        if arp.oper() != ARP_OP_REQUEST {
            return Err(DropReason::FieldMismatch {
                field: "arp.oper",
                expected: ARP_OP_REQUEST as u32,
                actual: arp.oper() as u32,
            });
        }
        if arp.htype() != ARP_HW_TYPE_ETHER {
            return Err(DropReason::FieldMismatch {
                field: "arp.htype",
                expected: ARP_HW_TYPE_ETHER as u32,
                actual: arp.htype() as u32,
            });
        }
        if arp.ptype() != ETHER_P_IP {
            return Err(DropReason::FieldMismatch {
                field: "arp.ptype",
                expected: ETHER_P_IP as u32,
                actual: arp.ptype() as u32,
            });
        }
        if arp.hlen() != ARP_HW_ADDR_LEN {
            return Err(DropReason::FieldMismatch {
                field: "arp.hlen",
                expected: ARP_HW_ADDR_LEN as u32,
                actual: arp.hlen() as u32,
            });
        }
        if arp.plen() != ARP_PROTO_ADDR_LEN {
            return Err(DropReason::FieldMismatch {
                field: "arp.plen",
                expected: ARP_PROTO_ADDR_LEN as u32,
                actual: arp.plen() as u32,
            });
        }
        ReplyContext {
            sha: arp.sha(),
            spa: arp.spa(),
            tpa: arp.tpa(),
        }
    };

    // make the source the destination, and add our mac address
    {
        let mut eth = EthFrame::new(&mut *frame);
        let src = eth.src_mac();
        eth.set_dst_mac(&src);
        eth.set_src_mac(mac);
    }

    // create the ARP reply: flip the operation, make tha the sha, fill in
    // sha with our mac address, and swap the protocol addresses
    {
        let mut arp = ArpFrame::new(&mut *frame);
        arp.set_oper(ARP_OP_REPLY);
        arp.set_tha(&ctx.sha);
        arp.set_sha(mac);
        arp.set_spa(&ctx.tpa);
        arp.set_tpa(&ctx.spa);
    }

    print_debug(
        debug,
        DEBUG_LEVEL_MEDIUM,
        DEBUG_SRC_ARP,
        format!(
            "replying to arp request for {}",
            ctx.tpa.iter().format(".")
        ),
    );

    Ok(align_frame_size(ETHER_FRAME_SIZE + ARP_FRAME_SIZE))
}

// process_ipv4() function
/// verify the IPv4 header checksum and route on the upper-layer protocol
fn process_ipv4(frame: &mut [u8], mac: &[u8; ETHER_MAC_SIZE], debug: &Verbose) -> HandlerResult {
    let needed = IP_FRAME_OFFSET + IP_HDR_MIN_SIZE;
    if frame.len() < needed {
        return Err(DropReason::Truncated {
            field: "ipv4 header",
            needed,
            actual: frame.len(),
        });
    }

    let (hdr_size, protocol, cksum) = {
        let ipv4 = Ipv4Frame::new(&mut *frame);
        (ipv4.header_size(), ipv4.protocol(), ipv4.cksum())
    };
    if hdr_size < IP_HDR_MIN_SIZE {
        return Err(DropReason::FieldMismatch {
            field: "ipv4.ihl",
            expected: 5,
            actual: (hdr_size >> 2) as u32,
        });
    }
    if frame.len() < IP_FRAME_OFFSET + hdr_size {
        return Err(DropReason::Truncated {
            field: "ipv4 options",
            needed: IP_FRAME_OFFSET + hdr_size,
            actual: frame.len(),
        });
    }

    // the checksum of the header words, checksum field included, must
    // come out zero
    if rfc1071(&frame[IP_FRAME_OFFSET..IP_FRAME_OFFSET + hdr_size]) != 0 {
        return Err(DropReason::IpChecksum { cksum });
    }

    match protocol {
        IP_UPPER_PROTO_ICMP => process_icmp(frame, mac, debug).map(Some),
        IP_UPPER_PROTO_UDP => process_lnic(frame, debug).map(|_| None),
        protocol => Err(DropReason::IpProtocol { protocol }),
    }
}

// process_icmp() function
/// validate an ICMP echo request and rewrite it in place into an echo
/// reply; the IPv4 header checksum was already verified by the dispatcher
fn process_icmp(
    frame: &mut [u8],
    mac: &[u8; ETHER_MAC_SIZE],
    debug: &Verbose,
) -> Result<usize, DropReason> {
    let (hdr_size, total_len) = {
        let ipv4 = Ipv4Frame::new(&mut *frame);
        (ipv4.header_size(), ipv4.total_len() as usize)
    };
    let icmp_off = IP_FRAME_OFFSET + hdr_size;

    // the ICMP message spans the rest of the IPv4 payload
    let icmp_len = match total_len.checked_sub(hdr_size) {
        Some(len) if len >= IcmpFrame::SIZE => len,
        _ => {
            return Err(DropReason::Truncated {
                field: "icmp message",
                needed: hdr_size + IcmpFrame::SIZE,
                actual: total_len,
            });
        }
    };
    if frame.len() < icmp_off + icmp_len {
        return Err(DropReason::Truncated {
            field: "icmp message",
            needed: icmp_off + icmp_len,
            actual: frame.len(),
        });
    }

    {
        let icmp = IcmpFrame::new(&mut *frame, icmp_off);
        if icmp.icmp_type() != ICMP_TYPE_ECHO_REQUEST {
            return Err(DropReason::FieldMismatch {
                field: "icmp.type",
                expected: ICMP_TYPE_ECHO_REQUEST as u32,
                actual: icmp.icmp_type() as u32,
            });
        }
        if icmp.code() != 0 {
            return Err(DropReason::FieldMismatch {
                field: "icmp.code",
                expected: 0,
                actual: icmp.code() as u32,
            });
        }
    }
    if rfc1071(&frame[icmp_off..icmp_off + icmp_len]) != 0 {
        let cksum = IcmpFrame::new(&mut *frame, icmp_off).cksum();
        return Err(DropReason::IcmpChecksum { cksum });
    }

    // set the destination and source MACs
    {
        let mut eth = EthFrame::new(&mut *frame);
        let src = eth.src_mac();
        eth.set_dst_mac(&src);
        eth.set_src_mac(mac);
    }

    // swap the source and destination IP addresses, then recompute the
    // header checksum over the zeroed field
    {
        let mut ipv4 = Ipv4Frame::new(&mut *frame);
        let src = ipv4.src_addr();
        let dst = ipv4.dst_addr();
        ipv4.set_src_addr(&dst);
        ipv4.set_dst_addr(&src);
        ipv4.set_cksum(0);
    }
    let ip_cksum = rfc1071(&frame[IP_FRAME_OFFSET..IP_FRAME_OFFSET + hdr_size]);
    Ipv4Frame::new(&mut *frame).set_cksum(ip_cksum);

    // set the ICMP type to reply and recompute the message checksum
    {
        let mut icmp = IcmpFrame::new(&mut *frame, icmp_off);
        icmp.set_icmp_type(ICMP_TYPE_ECHO_REPLY);
        icmp.set_cksum(0);
    }
    let icmp_cksum = rfc1071(&frame[icmp_off..icmp_off + icmp_len]);
    IcmpFrame::new(&mut *frame, icmp_off).set_cksum(icmp_cksum);

    print_debug(
        debug,
        DEBUG_LEVEL_MEDIUM,
        DEBUG_SRC_ICMP,
        format!("echo reply ready, {} byte icmp message", icmp_len),
    );

    Ok(align_frame_size(ETHER_FRAME_SIZE + total_len))
}

// process_lnic() function
/// decode and report a UDP/LNIC message; this path is a diagnostic
/// inspector and never transmits a reply
fn process_lnic(frame: &mut [u8], debug: &Verbose) -> Result<(), DropReason> {
    let (hdr_size, src_addr, dst_addr) = {
        let ipv4 = Ipv4Frame::new(&mut *frame);
        (ipv4.header_size(), ipv4.src_addr(), ipv4.dst_addr())
    };
    let udp_off = IP_FRAME_OFFSET + hdr_size;

    let needed = udp_off + UdpFrame::SIZE + UDP_REPLY_PORT_SIZE;
    if frame.len() < needed {
        return Err(DropReason::Truncated {
            field: "udp header",
            needed,
            actual: frame.len(),
        });
    }
    let (src_port, dst_port, udp_len, reply_port) = {
        let udp = UdpFrame::new(&mut *frame, udp_off);
        (
            udp.src_port(),
            udp.dst_port(),
            udp.length() as usize,
            udp.reply_port(),
        )
    };

    // every message carries the fixed trailers: the UDP header, the reply
    // port, and the LNIC header; what remains is whole message words
    let fixed = UDP_HDR_SIZE + UDP_REPLY_PORT_SIZE + LNIC_HDR_SIZE;
    if udp_len < fixed {
        return Err(DropReason::Truncated {
            field: "lnic message",
            needed: fixed,
            actual: udp_len,
        });
    }
    if frame.len() < udp_off + udp_len {
        return Err(DropReason::Truncated {
            field: "udp datagram",
            needed: udp_off + udp_len,
            actual: frame.len(),
        });
    }
    let words = (udp_len - fixed) / LNIC_WORD_SIZE;

    let lnic = LnicFrame::new(&mut *frame, udp_off + UDP_HDR_SIZE + UDP_REPLY_PORT_SIZE);
    print_debug(
        debug,
        DEBUG_LEVEL_INFO,
        DEBUG_SRC_LNIC,
        "start of message --------------".to_string(),
    );
    print_debug(
        debug,
        DEBUG_LEVEL_INFO,
        DEBUG_SRC_LNIC,
        format!(
            "ip layer: src addr {}, dst addr {}",
            src_addr.iter().format("."),
            dst_addr.iter().format(".")
        ),
    );
    print_debug(
        debug,
        DEBUG_LEVEL_INFO,
        DEBUG_SRC_LNIC,
        format!(
            "udp layer: src port {}, dst port {}, datagram size in bytes {}",
            src_port, dst_port, udp_len
        ),
    );
    print_debug(
        debug,
        DEBUG_LEVEL_INFO,
        DEBUG_SRC_LNIC,
        format!("udp reply layer: reply port {}", reply_port),
    );
    print_debug(
        debug,
        DEBUG_LEVEL_INFO,
        DEBUG_SRC_LNIC,
        format!(
            "lnic header layer: magic number {:#018x}, src port {}, dst port {}",
            lnic.magic(),
            lnic.src_port(),
            lnic.dst_port()
        ),
    );
    print_debug(
        debug,
        DEBUG_LEVEL_INFO,
        DEBUG_SRC_LNIC,
        format!("lnic message length in words: {}", words),
    );
    for i in 0..words {
        print_debug(
            debug,
            DEBUG_LEVEL_INFO,
            DEBUG_SRC_LNIC,
            format!("    {}: {:#018x}", i, lnic.message_word(i)),
        );
    }
    print_debug(
        debug,
        DEBUG_LEVEL_INFO,
        DEBUG_SRC_LNIC,
        "end of message ----------------".to_string(),
    );

    Ok(())
}

// Mock device for handler and loop tests
#[cfg(test)]
pub(crate) mod mock {
    use super::*;
    use std::collections::VecDeque;

    /// in-memory NicDevice: queued receive frames, recorded transmissions
    pub(crate) struct MockNic {
        mac: [u8; ETHER_MAC_SIZE],
        rx: VecDeque<Vec<u8>>,
        pub(crate) tx: Vec<Vec<u8>>,
    }

    impl MockNic {
        pub(crate) fn new(mac: [u8; ETHER_MAC_SIZE], frames: Vec<Vec<u8>>) -> MockNic {
            MockNic {
                mac,
                rx: frames.into(),
                tx: Vec::new(),
            }
        }
    }

    impl NicDevice for MockNic {
        fn recv_frame(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.rx.pop_front() {
                Some(frame) => {
                    buf[NET_IP_ALIGN..NET_IP_ALIGN + frame.len()].copy_from_slice(&frame);
                    Ok(frame.len())
                }
                None => Err(io::Error::new(io::ErrorKind::WouldBlock, "no frame queued")),
            }
        }
        fn send_frame(&mut self, buf: &[u8], len: usize) -> io::Result<()> {
            assert_eq!(len % NIC_TX_ALIGN, 0, "unaligned transmit length");
            self.tx.push(buf[..len].to_vec());
            Ok(())
        }
        fn mac_addr(&self) -> [u8; ETHER_MAC_SIZE] {
            self.mac
        }
    }
}

// Tests
#[cfg(test)]
mod tests {
    use super::mock::MockNic;
    use super::*;
    use byteorder::{ByteOrder, NetworkEndian};

    const OWN_MAC: [u8; 6] = [0x11, 0x22, 0x33, 0x44, 0x55, 0x66];
    const PEER_MAC: [u8; 6] = [0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff];
    const PEER_IP: [u8; 4] = [10, 0, 0, 5];
    const OWN_IP: [u8; 4] = [10, 0, 0, 1];

    fn quiet() -> Verbose {
        Verbose::new(DEBUG_LEVEL_INFO, 0, 0)
    }

    // frame builders; frames start at the Ethernet header, the mock device
    // inserts the alignment padding on receive

    fn eth_frame(dst: [u8; 6], src: [u8; 6], ethertype: u16, payload: &[u8]) -> Vec<u8> {
        let mut frame = Vec::new();
        frame.extend_from_slice(&dst);
        frame.extend_from_slice(&src);
        frame.extend_from_slice(&ethertype.to_be_bytes());
        frame.extend_from_slice(payload);
        frame
    }

    fn arp_request() -> Vec<u8> {
        let mut arp = Vec::new();
        arp.extend_from_slice(&ARP_HW_TYPE_ETHER.to_be_bytes());
        arp.extend_from_slice(&ETHER_P_IP.to_be_bytes());
        arp.push(ARP_HW_ADDR_LEN);
        arp.push(ARP_PROTO_ADDR_LEN);
        arp.extend_from_slice(&ARP_OP_REQUEST.to_be_bytes());
        arp.extend_from_slice(&PEER_MAC);
        arp.extend_from_slice(&PEER_IP);
        arp.extend_from_slice(&[0u8; 6]);
        arp.extend_from_slice(&OWN_IP);
        eth_frame([0xff; 6], PEER_MAC, ETHER_P_ARP, &arp)
    }

    fn ipv4_frame(protocol: u8, payload: &[u8]) -> Vec<u8> {
        let total = IP_HDR_MIN_SIZE + payload.len();
        let mut ip = vec![0u8; IP_HDR_MIN_SIZE];
        ip[0] = 0x45;
        NetworkEndian::write_u16(&mut ip[2..4], total as u16);
        ip[8] = 64;
        ip[9] = protocol;
        ip[12..16].copy_from_slice(&PEER_IP);
        ip[16..20].copy_from_slice(&OWN_IP);
        let cksum = rfc1071(&ip);
        NetworkEndian::write_u16(&mut ip[10..12], cksum);
        ip.extend_from_slice(payload);
        eth_frame(OWN_MAC, PEER_MAC, ETHER_P_IP, &ip)
    }

    fn icmp_echo_request(data: &[u8]) -> Vec<u8> {
        let mut icmp = vec![0u8; ICMP_HDR_SIZE];
        icmp[0] = ICMP_TYPE_ECHO_REQUEST;
        NetworkEndian::write_u32(&mut icmp[4..8], 0x1234_0001);
        icmp.extend_from_slice(data);
        let cksum = rfc1071(&icmp);
        NetworkEndian::write_u16(&mut icmp[2..4], cksum);
        ipv4_frame(IP_UPPER_PROTO_ICMP, &icmp)
    }

    fn lnic_message(words: &[[u8; 8]]) -> Vec<u8> {
        let udp_len = UDP_HDR_SIZE + UDP_REPLY_PORT_SIZE + LNIC_HDR_SIZE + words.len() * 8;
        let mut udp = vec![0u8; UDP_HDR_SIZE];
        NetworkEndian::write_u16(&mut udp[0..2], 5000);
        NetworkEndian::write_u16(&mut udp[2..4], 1234);
        NetworkEndian::write_u16(&mut udp[4..6], udp_len as u16);
        udp.extend_from_slice(&4321u16.to_be_bytes()); // reply port
        udp.extend_from_slice(&0x4c4e_4943_0000_0001u64.to_be_bytes()); // magic
        udp.extend_from_slice(&7u64.to_be_bytes()); // lnic src port
        udp.extend_from_slice(&9u64.to_be_bytes()); // lnic dst port
        for word in words {
            udp.extend_from_slice(word);
        }
        ipv4_frame(IP_UPPER_PROTO_UDP, &udp)
    }

    fn run_one(frame: Vec<u8>) -> (Outcome, Responder<MockNic>) {
        let mut responder = Responder::new(MockNic::new(OWN_MAC, vec![frame]));
        let outcome = responder.process_cycle(&quiet()).unwrap();
        (outcome, responder)
    }

    #[test]
    fn arp_request_produces_reply() {
        let (outcome, responder) = run_one(arp_request());
        assert_eq!(
            outcome,
            Outcome::Replied(align_frame_size(ETHER_FRAME_SIZE + ARP_FRAME_SIZE))
        );
        assert_eq!(responder.state(), States::Replied);

        let mut reply = responder.device().tx[0].clone();
        assert_eq!(reply.len(), 48);
        let eth = EthFrame::new(&mut reply);
        assert_eq!(eth.dst_mac(), PEER_MAC);
        assert_eq!(eth.src_mac(), OWN_MAC);
        let arp = ArpFrame::new(&mut reply);
        assert_eq!(arp.oper(), ARP_OP_REPLY);
        assert_eq!(arp.sha(), OWN_MAC);
        assert_eq!(arp.spa(), OWN_IP);
        assert_eq!(arp.tha(), PEER_MAC);
        assert_eq!(arp.tpa(), PEER_IP);
    }

    #[test]
    fn arp_field_mismatches_are_dropped() {
        // (byte offset in the frame, bad value, reported field)
        let cases = [
            (21usize, 2u8, "arp.oper"),  // reply instead of request
            (15, 2, "arp.htype"),        // not ethernet
            (17, 0x06, "arp.ptype"),     // not ipv4
            (18, 8, "arp.hlen"),
            (19, 16, "arp.plen"),
        ];
        for &(off, value, field) in cases.iter() {
            let mut frame = arp_request();
            frame[off] = value;
            let (outcome, responder) = run_one(frame);
            match outcome {
                Outcome::Dropped(DropReason::FieldMismatch { field: f, .. }) => {
                    assert_eq!(f, field)
                }
                other => panic!("expected a field mismatch for {}, got {:?}", field, other),
            }
            assert!(responder.device().tx.is_empty());
        }
    }

    #[test]
    fn icmp_echo_request_produces_reply() {
        let data = [0x42u8; 32];
        let (outcome, responder) = run_one(icmp_echo_request(&data));

        let total = IP_HDR_MIN_SIZE + ICMP_HDR_SIZE + data.len();
        let wire = align_frame_size(ETHER_FRAME_SIZE + total);
        assert_eq!(outcome, Outcome::Replied(wire));
        assert_eq!(wire % NIC_TX_ALIGN, 0);
        assert!(wire >= NET_IP_ALIGN + ETHER_FRAME_SIZE + total);

        let mut reply = responder.device().tx[0].clone();
        {
            let ipv4 = Ipv4Frame::new(&mut reply);
            assert_eq!(ipv4.src_addr(), OWN_IP);
            assert_eq!(ipv4.dst_addr(), PEER_IP);
        }
        let icmp_off = IP_FRAME_OFFSET + IP_HDR_MIN_SIZE;
        assert_eq!(IcmpFrame::new(&mut reply, icmp_off).icmp_type(), ICMP_TYPE_ECHO_REPLY);
        // both checksums must verify to zero independently
        assert_eq!(
            rfc1071(&reply[IP_FRAME_OFFSET..IP_FRAME_OFFSET + IP_HDR_MIN_SIZE]),
            0
        );
        assert_eq!(
            rfc1071(&reply[icmp_off..icmp_off + ICMP_HDR_SIZE + data.len()]),
            0
        );
        // the echoed data is carried back unchanged
        assert_eq!(&reply[icmp_off + ICMP_HDR_SIZE..icmp_off + ICMP_HDR_SIZE + data.len()], &data[..]);
    }

    #[test]
    fn corrupted_ip_header_is_dropped() {
        let mut frame = icmp_echo_request(&[0u8; 8]);
        frame[ETHER_FRAME_SIZE + 8] = 13; // rewrite the TTL, checksum untouched
        let (outcome, responder) = run_one(frame);
        match outcome {
            Outcome::Dropped(DropReason::IpChecksum { .. }) => {}
            other => panic!("expected an IP checksum drop, got {:?}", other),
        }
        assert!(responder.device().tx.is_empty());
    }

    #[test]
    fn corrupted_icmp_message_is_dropped() {
        let mut frame = icmp_echo_request(&[0u8; 8]);
        let last = frame.len() - 1;
        frame[last] ^= 0xff; // corrupt echo data, ICMP checksum untouched
        let (outcome, responder) = run_one(frame);
        match outcome {
            Outcome::Dropped(DropReason::IcmpChecksum { .. }) => {}
            other => panic!("expected an ICMP checksum drop, got {:?}", other),
        }
        assert!(responder.device().tx.is_empty());
    }

    #[test]
    fn icmp_wrong_type_is_dropped() {
        let mut icmp = vec![0u8; ICMP_HDR_SIZE];
        icmp[0] = ICMP_TYPE_ECHO_REPLY; // a reply, not a request
        let cksum = rfc1071(&icmp);
        NetworkEndian::write_u16(&mut icmp[2..4], cksum);
        let (outcome, responder) = run_one(ipv4_frame(IP_UPPER_PROTO_ICMP, &icmp));
        match outcome {
            Outcome::Dropped(DropReason::FieldMismatch { field, .. }) => {
                assert_eq!(field, "icmp.type")
            }
            other => panic!("expected an icmp.type drop, got {:?}", other),
        }
        assert!(responder.device().tx.is_empty());
    }

    #[test]
    fn unsupported_ip_protocol_is_dropped() {
        // TCP is not handled, whatever the checksum says
        let (outcome, responder) = run_one(ipv4_frame(6, &[0u8; 20]));
        assert_eq!(
            outcome,
            Outcome::Dropped(DropReason::IpProtocol { protocol: 6 })
        );
        assert!(responder.device().tx.is_empty());
    }

    #[test]
    fn unknown_ethertype_is_dropped() {
        let frame = eth_frame(OWN_MAC, PEER_MAC, 0x86dd, &[0u8; 40]);
        let (outcome, responder) = run_one(frame);
        assert_eq!(
            outcome,
            Outcome::Dropped(DropReason::Ethertype { ethertype: 0x86dd })
        );
        assert!(responder.device().tx.is_empty());
    }

    #[test]
    fn truncated_frame_is_dropped() {
        let (outcome, responder) = run_one(vec![0u8; 8]);
        match outcome {
            Outcome::Dropped(DropReason::Truncated { field, .. }) => {
                assert_eq!(field, "ethernet header")
            }
            other => panic!("expected a truncation drop, got {:?}", other),
        }
        assert!(responder.device().tx.is_empty());
    }

    #[test]
    fn lnic_message_is_reported_not_answered() {
        let words = [
            [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08],
            [0x11, 0x12, 0x13, 0x14, 0x15, 0x16, 0x17, 0x18],
            [0xde, 0xad, 0xbe, 0xef, 0xca, 0xfe, 0xba, 0xbe],
        ];
        let (outcome, responder) = run_one(lnic_message(&words));
        assert_eq!(outcome, Outcome::Inspected);
        assert!(responder.device().tx.is_empty());
    }

    #[test]
    fn lnic_decoding_leaves_the_buffer_untouched() {
        let words = [
            [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08],
            [0x11, 0x12, 0x13, 0x14, 0x15, 0x16, 0x17, 0x18],
            [0xde, 0xad, 0xbe, 0xef, 0xca, 0xfe, 0xba, 0xbe],
        ];
        let mut buf = vec![0u8; NET_IP_ALIGN];
        buf.extend_from_slice(&lnic_message(&words));
        let before = buf.clone();

        process_lnic(&mut buf, &quiet()).unwrap();
        assert_eq!(buf, before);

        // the decoded words are the literal wire bytes
        let udp_off = IP_FRAME_OFFSET + IP_HDR_MIN_SIZE;
        let lnic = LnicFrame::new(&mut buf, udp_off + UDP_HDR_SIZE + UDP_REPLY_PORT_SIZE);
        let udp_len = UDP_HDR_SIZE + UDP_REPLY_PORT_SIZE + LNIC_HDR_SIZE + words.len() * 8;
        let count = (udp_len - UDP_HDR_SIZE - UDP_REPLY_PORT_SIZE - LNIC_HDR_SIZE) / LNIC_WORD_SIZE;
        assert_eq!(count, 3);
        for (i, word) in words.iter().enumerate() {
            assert_eq!(lnic.message_word_bytes(i), *word);
        }
    }

    #[test]
    fn lnic_short_udp_length_is_dropped() {
        let mut frame = lnic_message(&[]);
        // shrink the UDP length below the fixed trailers
        let udp_len_off = ETHER_FRAME_SIZE + IP_HDR_MIN_SIZE + 4;
        NetworkEndian::write_u16(&mut frame[udp_len_off..udp_len_off + 2], 20);
        let (outcome, responder) = run_one(frame);
        match outcome {
            Outcome::Dropped(DropReason::Truncated { field, .. }) => {
                assert_eq!(field, "lnic message")
            }
            other => panic!("expected an lnic truncation drop, got {:?}", other),
        }
        assert!(responder.device().tx.is_empty());
    }

    #[test]
    fn transmit_sizes_round_up_to_the_nic_granularity() {
        // ethernet + arp, padding included: 44 bytes rounds to 48
        assert_eq!(align_frame_size(ETHER_FRAME_SIZE + ARP_FRAME_SIZE), 48);
        // an exact multiple stays put
        assert_eq!(align_frame_size(46), 48);
        assert_eq!(align_frame_size(47), 56);
    }
}
