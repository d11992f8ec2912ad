//! frames handling module
//! This module includes the header codec views overlaid on the frame buffer.
//!
//! Every view borrows the whole frame buffer (alignment padding included)
//! and addresses its header at a fixed or computed byte offset, so decode
//! and encode share one field definition per header. Multi-byte fields are
//! big-endian on the wire and converted on every read/write; byte-for-byte
//! fields (MAC and IP addresses) are copied without conversion.
//!
//! Constructors do not bounds-check: the responder validates the received
//! length against each header's offset and size before overlaying a view.

// constants
use crate::constants::*;

// byteorder
use byteorder::{ByteOrder, NetworkEndian};

/// Ethernet Header View
/// fixed layout: destination MAC, source MAC, ethertype
pub struct EthFrame<'a> {
    buf: &'a mut [u8],
}

// EthFrame Type Implementation
impl<'a> EthFrame<'a> {
    pub const SIZE: usize = ETHER_FRAME_SIZE;

    // new() method
    pub fn new(buf: &'a mut [u8]) -> EthFrame<'a> {
        debug_assert!(buf.len() >= ETHER_FRAME_OFFSET + Self::SIZE);
        EthFrame { buf }
    }
    // dst_mac() getter
    pub fn dst_mac(&self) -> [u8; ETHER_MAC_SIZE] {
        let mut mac = [0u8; ETHER_MAC_SIZE];
        mac.copy_from_slice(&self.buf[ETHER_FRAME_OFFSET..ETHER_FRAME_OFFSET + 6]);
        mac
    }
    // set_dst_mac() setter
    pub fn set_dst_mac(&mut self, mac: &[u8; ETHER_MAC_SIZE]) {
        self.buf[ETHER_FRAME_OFFSET..ETHER_FRAME_OFFSET + 6].copy_from_slice(mac);
    }
    // src_mac() getter
    pub fn src_mac(&self) -> [u8; ETHER_MAC_SIZE] {
        let mut mac = [0u8; ETHER_MAC_SIZE];
        mac.copy_from_slice(&self.buf[ETHER_FRAME_OFFSET + 6..ETHER_FRAME_OFFSET + 12]);
        mac
    }
    // set_src_mac() setter
    pub fn set_src_mac(&mut self, mac: &[u8; ETHER_MAC_SIZE]) {
        self.buf[ETHER_FRAME_OFFSET + 6..ETHER_FRAME_OFFSET + 12].copy_from_slice(mac);
    }
    // ethertype() getter
    pub fn ethertype(&self) -> u16 {
        NetworkEndian::read_u16(&self.buf[ETHER_FRAME_OFFSET + 12..])
    }
    // set_ethertype() setter
    pub fn set_ethertype(&mut self, ethertype: u16) {
        NetworkEndian::write_u16(&mut self.buf[ETHER_FRAME_OFFSET + 12..], ethertype);
    }
}

/// ARP Message View
/// fixed layout after the Ethernet header
pub struct ArpFrame<'a> {
    buf: &'a mut [u8],
}

// ArpFrame Type Implementation
impl<'a> ArpFrame<'a> {
    pub const SIZE: usize = ARP_FRAME_SIZE;

    // new() method
    pub fn new(buf: &'a mut [u8]) -> ArpFrame<'a> {
        debug_assert!(buf.len() >= ARP_FRAME_OFFSET + Self::SIZE);
        ArpFrame { buf }
    }
    // htype() getter
    pub fn htype(&self) -> u16 {
        NetworkEndian::read_u16(&self.buf[ARP_FRAME_OFFSET..])
    }
    // ptype() getter
    pub fn ptype(&self) -> u16 {
        NetworkEndian::read_u16(&self.buf[ARP_FRAME_OFFSET + 2..])
    }
    // hlen() getter
    pub fn hlen(&self) -> u8 {
        self.buf[ARP_FRAME_OFFSET + 4]
    }
    // plen() getter
    pub fn plen(&self) -> u8 {
        self.buf[ARP_FRAME_OFFSET + 5]
    }
    // oper() getter
    pub fn oper(&self) -> u16 {
        NetworkEndian::read_u16(&self.buf[ARP_FRAME_OFFSET + 6..])
    }
    // set_oper() setter
    pub fn set_oper(&mut self, oper: u16) {
        NetworkEndian::write_u16(&mut self.buf[ARP_FRAME_OFFSET + 6..], oper);
    }
    // sha() getter
    pub fn sha(&self) -> [u8; ETHER_MAC_SIZE] {
        let mut mac = [0u8; ETHER_MAC_SIZE];
        mac.copy_from_slice(&self.buf[ARP_FRAME_OFFSET + 8..ARP_FRAME_OFFSET + 14]);
        mac
    }
    // set_sha() setter
    pub fn set_sha(&mut self, mac: &[u8; ETHER_MAC_SIZE]) {
        self.buf[ARP_FRAME_OFFSET + 8..ARP_FRAME_OFFSET + 14].copy_from_slice(mac);
    }
    // spa() getter
    pub fn spa(&self) -> [u8; IP_ADDR_SIZE] {
        let mut addr = [0u8; IP_ADDR_SIZE];
        addr.copy_from_slice(&self.buf[ARP_FRAME_OFFSET + 14..ARP_FRAME_OFFSET + 18]);
        addr
    }
    // set_spa() setter
    pub fn set_spa(&mut self, addr: &[u8; IP_ADDR_SIZE]) {
        self.buf[ARP_FRAME_OFFSET + 14..ARP_FRAME_OFFSET + 18].copy_from_slice(addr);
    }
    // tha() getter
    pub fn tha(&self) -> [u8; ETHER_MAC_SIZE] {
        let mut mac = [0u8; ETHER_MAC_SIZE];
        mac.copy_from_slice(&self.buf[ARP_FRAME_OFFSET + 18..ARP_FRAME_OFFSET + 24]);
        mac
    }
    // set_tha() setter
    pub fn set_tha(&mut self, mac: &[u8; ETHER_MAC_SIZE]) {
        self.buf[ARP_FRAME_OFFSET + 18..ARP_FRAME_OFFSET + 24].copy_from_slice(mac);
    }
    // tpa() getter
    pub fn tpa(&self) -> [u8; IP_ADDR_SIZE] {
        let mut addr = [0u8; IP_ADDR_SIZE];
        addr.copy_from_slice(&self.buf[ARP_FRAME_OFFSET + 24..ARP_FRAME_OFFSET + 28]);
        addr
    }
    // set_tpa() setter
    pub fn set_tpa(&mut self, addr: &[u8; IP_ADDR_SIZE]) {
        self.buf[ARP_FRAME_OFFSET + 24..ARP_FRAME_OFFSET + 28].copy_from_slice(addr);
    }
}

/// IPv4 Header View
/// variable length header after the Ethernet header; the low nibble of the
/// first byte sizes the header in 32-bit words
pub struct Ipv4Frame<'a> {
    buf: &'a mut [u8],
}

// Ipv4Frame Type Implementation
impl<'a> Ipv4Frame<'a> {
    // new() method
    pub fn new(buf: &'a mut [u8]) -> Ipv4Frame<'a> {
        debug_assert!(buf.len() >= IP_FRAME_OFFSET + IP_HDR_MIN_SIZE);
        Ipv4Frame { buf }
    }
    // version() getter
    pub fn version(&self) -> u8 {
        self.buf[IP_FRAME_OFFSET] >> 4
    }
    // ihl() getter
    pub fn ihl(&self) -> u8 {
        self.buf[IP_FRAME_OFFSET] & 0x0f
    }
    // header_size() method
    /// header length in bytes
    pub fn header_size(&self) -> usize {
        (self.ihl() as usize) << 2
    }
    // dscp_ecn() getter
    pub fn dscp_ecn(&self) -> u8 {
        self.buf[IP_FRAME_OFFSET + 1]
    }
    // total_len() getter
    pub fn total_len(&self) -> u16 {
        NetworkEndian::read_u16(&self.buf[IP_FRAME_OFFSET + 2..])
    }
    // ident() getter
    pub fn ident(&self) -> u16 {
        NetworkEndian::read_u16(&self.buf[IP_FRAME_OFFSET + 4..])
    }
    // flags_frag() getter
    pub fn flags_frag(&self) -> u16 {
        NetworkEndian::read_u16(&self.buf[IP_FRAME_OFFSET + 6..])
    }
    // ttl() getter
    pub fn ttl(&self) -> u8 {
        self.buf[IP_FRAME_OFFSET + 8]
    }
    // protocol() getter
    pub fn protocol(&self) -> u8 {
        self.buf[IP_FRAME_OFFSET + 9]
    }
    // cksum() getter
    pub fn cksum(&self) -> u16 {
        NetworkEndian::read_u16(&self.buf[IP_FRAME_OFFSET + 10..])
    }
    // set_cksum() setter
    pub fn set_cksum(&mut self, cksum: u16) {
        NetworkEndian::write_u16(&mut self.buf[IP_FRAME_OFFSET + 10..], cksum);
    }
    // src_addr() getter
    pub fn src_addr(&self) -> [u8; IP_ADDR_SIZE] {
        let mut addr = [0u8; IP_ADDR_SIZE];
        addr.copy_from_slice(&self.buf[IP_FRAME_OFFSET + 12..IP_FRAME_OFFSET + 16]);
        addr
    }
    // set_src_addr() setter
    pub fn set_src_addr(&mut self, addr: &[u8; IP_ADDR_SIZE]) {
        self.buf[IP_FRAME_OFFSET + 12..IP_FRAME_OFFSET + 16].copy_from_slice(addr);
    }
    // dst_addr() getter
    pub fn dst_addr(&self) -> [u8; IP_ADDR_SIZE] {
        let mut addr = [0u8; IP_ADDR_SIZE];
        addr.copy_from_slice(&self.buf[IP_FRAME_OFFSET + 16..IP_FRAME_OFFSET + 20]);
        addr
    }
    // set_dst_addr() setter
    pub fn set_dst_addr(&mut self, addr: &[u8; IP_ADDR_SIZE]) {
        self.buf[IP_FRAME_OFFSET + 16..IP_FRAME_OFFSET + 20].copy_from_slice(addr);
    }
}

/// ICMP Header View
/// overlaid at the end of the IPv4 header; the message body it heads runs
/// to the IPv4 total length
pub struct IcmpFrame<'a> {
    buf: &'a mut [u8],
    off: usize,
}

// IcmpFrame Type Implementation
impl<'a> IcmpFrame<'a> {
    pub const SIZE: usize = ICMP_HDR_SIZE;

    // new() method
    pub fn new(buf: &'a mut [u8], off: usize) -> IcmpFrame<'a> {
        debug_assert!(buf.len() >= off + Self::SIZE);
        IcmpFrame { buf, off }
    }
    // icmp_type() getter
    pub fn icmp_type(&self) -> u8 {
        self.buf[self.off]
    }
    // set_icmp_type() setter
    pub fn set_icmp_type(&mut self, icmp_type: u8) {
        self.buf[self.off] = icmp_type;
    }
    // code() getter
    pub fn code(&self) -> u8 {
        self.buf[self.off + 1]
    }
    // cksum() getter
    pub fn cksum(&self) -> u16 {
        NetworkEndian::read_u16(&self.buf[self.off + 2..])
    }
    // set_cksum() setter
    pub fn set_cksum(&mut self, cksum: u16) {
        NetworkEndian::write_u16(&mut self.buf[self.off + 2..], cksum);
    }
    // rest() getter
    /// opaque rest-of-header field (identifier and sequence for echo)
    pub fn rest(&self) -> u32 {
        NetworkEndian::read_u32(&self.buf[self.off + 4..])
    }
}

/// UDP Header View
/// overlaid at the end of the IPv4 header; also exposes the private 2-byte
/// reply-port convention layered right after the header
pub struct UdpFrame<'a> {
    buf: &'a mut [u8],
    off: usize,
}

// UdpFrame Type Implementation
impl<'a> UdpFrame<'a> {
    pub const SIZE: usize = UDP_HDR_SIZE;

    // new() method
    pub fn new(buf: &'a mut [u8], off: usize) -> UdpFrame<'a> {
        debug_assert!(buf.len() >= off + Self::SIZE);
        UdpFrame { buf, off }
    }
    // src_port() getter
    pub fn src_port(&self) -> u16 {
        NetworkEndian::read_u16(&self.buf[self.off..])
    }
    // dst_port() getter
    pub fn dst_port(&self) -> u16 {
        NetworkEndian::read_u16(&self.buf[self.off + 2..])
    }
    // length() getter
    /// datagram length in bytes, header included
    pub fn length(&self) -> u16 {
        NetworkEndian::read_u16(&self.buf[self.off + 4..])
    }
    // cksum() getter
    pub fn cksum(&self) -> u16 {
        NetworkEndian::read_u16(&self.buf[self.off + 6..])
    }
    // reply_port() getter
    /// the 2-byte reply port following the UDP header
    pub fn reply_port(&self) -> u16 {
        NetworkEndian::read_u16(&self.buf[self.off + 8..])
    }
}

/// LNIC Transport Header View
/// private convention: an 8-byte magic number and 64-bit logical ports,
/// followed by a run of 8-byte message words
pub struct LnicFrame<'a> {
    buf: &'a mut [u8],
    off: usize,
}

// LnicFrame Type Implementation
impl<'a> LnicFrame<'a> {
    pub const SIZE: usize = LNIC_HDR_SIZE;

    // new() method
    pub fn new(buf: &'a mut [u8], off: usize) -> LnicFrame<'a> {
        debug_assert!(buf.len() >= off + Self::SIZE);
        LnicFrame { buf, off }
    }
    // magic() getter
    pub fn magic(&self) -> u64 {
        NetworkEndian::read_u64(&self.buf[self.off..])
    }
    // src_port() getter
    pub fn src_port(&self) -> u64 {
        NetworkEndian::read_u64(&self.buf[self.off + 8..])
    }
    // dst_port() getter
    pub fn dst_port(&self) -> u64 {
        NetworkEndian::read_u64(&self.buf[self.off + 16..])
    }
    // message_word() getter
    /// the i-th 8-byte message word following the header
    pub fn message_word(&self, i: usize) -> u64 {
        NetworkEndian::read_u64(&self.buf[self.off + Self::SIZE + i * LNIC_WORD_SIZE..])
    }
    // message_word_bytes() getter
    /// the i-th message word as raw wire bytes
    pub fn message_word_bytes(&self, i: usize) -> [u8; LNIC_WORD_SIZE] {
        let mut word = [0u8; LNIC_WORD_SIZE];
        let start = self.off + Self::SIZE + i * LNIC_WORD_SIZE;
        word.copy_from_slice(&self.buf[start..start + LNIC_WORD_SIZE]);
        word
    }
}

// Tests
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eth_accessors_are_symmetric() {
        let mut buf = [0u8; 64];
        {
            let mut eth = EthFrame::new(&mut buf);
            eth.set_dst_mac(&[0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff]);
            eth.set_src_mac(&[0x11, 0x22, 0x33, 0x44, 0x55, 0x66]);
            eth.set_ethertype(ETHER_P_ARP);
        }
        let eth = EthFrame::new(&mut buf);
        assert_eq!(eth.dst_mac(), [0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff]);
        assert_eq!(eth.src_mac(), [0x11, 0x22, 0x33, 0x44, 0x55, 0x66]);
        assert_eq!(eth.ethertype(), 0x0806);
    }

    #[test]
    fn ethertype_is_network_order() {
        let mut buf = [0u8; 64];
        EthFrame::new(&mut buf).set_ethertype(ETHER_P_IP);
        // big-endian on the wire, most significant byte first
        assert_eq!(buf[ETHER_FRAME_OFFSET + 12], 0x08);
        assert_eq!(buf[ETHER_FRAME_OFFSET + 13], 0x00);
    }

    #[test]
    fn ipv4_header_size_follows_ihl() {
        let mut buf = [0u8; 64];
        buf[IP_FRAME_OFFSET] = 0x46; // version 4, ihl 6
        let ipv4 = Ipv4Frame::new(&mut buf);
        assert_eq!(ipv4.version(), 4);
        assert_eq!(ipv4.ihl(), 6);
        assert_eq!(ipv4.header_size(), 24);
    }

    #[test]
    fn arp_addresses_round_trip() {
        let mut buf = [0u8; 64];
        {
            let mut arp = ArpFrame::new(&mut buf);
            arp.set_oper(ARP_OP_REQUEST);
            arp.set_sha(&[1, 2, 3, 4, 5, 6]);
            arp.set_spa(&[10, 0, 0, 5]);
            arp.set_tha(&[0; 6]);
            arp.set_tpa(&[10, 0, 0, 1]);
        }
        let arp = ArpFrame::new(&mut buf);
        assert_eq!(arp.oper(), 1);
        assert_eq!(arp.sha(), [1, 2, 3, 4, 5, 6]);
        assert_eq!(arp.spa(), [10, 0, 0, 5]);
        assert_eq!(arp.tpa(), [10, 0, 0, 1]);
    }

    #[test]
    fn lnic_words_read_as_wire_bytes() {
        let mut buf = [0u8; 128];
        let off = 64;
        buf[off + LnicFrame::SIZE..off + LnicFrame::SIZE + 8]
            .copy_from_slice(&[0x01, 0x23, 0x45, 0x67, 0x89, 0xab, 0xcd, 0xef]);
        let lnic = LnicFrame::new(&mut buf, off);
        assert_eq!(lnic.message_word(0), 0x0123_4567_89ab_cdef);
        assert_eq!(
            lnic.message_word_bytes(0),
            [0x01, 0x23, 0x45, 0x67, 0x89, 0xab, 0xcd, 0xef]
        );
    }
}
