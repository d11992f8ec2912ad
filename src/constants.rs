//! Constants module
//! This module regroups all the program's and protocols constants.

// Program Constants
pub const RPINGD_BANNER: &str = r"
           _                  _
  _ __ _ __(_)_ __   __ _  __| |
 | '__| '_ \ | '_ \ / _` |/ _` |
 | |  | |_) | | | | | (_| | (_| |
 |_|  | .__/|_|_| |_|\__, |\__,_|
      |_|            |___/
";
pub const RPINGD_DFLT_CFG_FILE: &str = "/etc/rpingd/rpingd.conf";
pub const RPINGD_DFLT_PIDFILE: &str = "/var/run/rpingd.pid";
pub const RPINGD_DFLT_WORKDIR: &str = "/tmp";
pub const RPINGD_DFLT_LOGFILE: &str = "/var/log/rpingd.log";
pub const RPINGD_DFLT_ELOGFILE: &str = "/var/log/rpingd-error.log";
pub const RPINGD_DFLT_DATE_FORMAT: &str = "%b %e %Y %T";
pub const RPINGD_NAME: &str = env!("CARGO_PKG_NAME");
pub const RPINGD_VERSION: &str = env!("CARGO_PKG_VERSION");

// Debug Constants
pub const DEBUG_LEVEL_INFO: u8 = 0;
pub const DEBUG_LEVEL_LOW: u8 = 1;
pub const DEBUG_LEVEL_MEDIUM: u8 = 2;
pub const DEBUG_LEVEL_HIGH: u8 = 3;
pub const DEBUG_LEVEL_EXTENSIVE: u8 = 5;
pub const DEBUG_SRC_INFO: &str = "info";
pub const DEBUG_SRC_MAIN: &str = "main";
pub const DEBUG_SRC_NIC: &str = "nic";
pub const DEBUG_SRC_MAC: &str = "mac";
pub const DEBUG_SRC_PACKET: &str = "packet";
pub const DEBUG_SRC_ARP: &str = "arp";
pub const DEBUG_SRC_ICMP: &str = "icmp";
pub const DEBUG_SRC_LNIC: &str = "lnic";

// Ethernet Constants
pub const ETHER_P_IP: u16 = 0x0800; // IPv4 (/usr/include/linux/if_ether.h)
pub const ETHER_P_ARP: u16 = 0x0806;
pub const ETHER_P_ALL: u16 = 0x0003;
pub const ETHER_FRAME_SIZE: usize = 14;
pub const ETHER_MAC_SIZE: usize = 6;

// Frame Buffer Constants
// the buffer holds 190 64-bit words, the largest frame the NIC delivers
pub const FRAME_BUF_SIZE: usize = 1520;
// leading alignment padding, keeps the IP header 32-bit aligned
pub const NET_IP_ALIGN: usize = 2;
// hardware transfer granularity, transmit lengths round up to this
pub const NIC_TX_ALIGN: usize = 8;
pub const ETHER_FRAME_OFFSET: usize = NET_IP_ALIGN;
pub const ARP_FRAME_OFFSET: usize = NET_IP_ALIGN + ETHER_FRAME_SIZE;
pub const IP_FRAME_OFFSET: usize = NET_IP_ALIGN + ETHER_FRAME_SIZE;

// ARP Constants
pub const ARP_HW_TYPE_ETHER: u16 = 1;
pub const ARP_OP_REQUEST: u16 = 1;
pub const ARP_OP_REPLY: u16 = 2;
pub const ARP_HW_ADDR_LEN: u8 = 6;
pub const ARP_PROTO_ADDR_LEN: u8 = 4;
pub const ARP_FRAME_SIZE: usize = 28;

// IP Constants
pub const IP_ADDR_SIZE: usize = 4;
pub const IP_HDR_MIN_SIZE: usize = 20;
pub const IP_UPPER_PROTO_ICMP: u8 = 1;
pub const IP_UPPER_PROTO_UDP: u8 = 17;

// ICMP Constants
pub const ICMP_TYPE_ECHO_REPLY: u8 = 0;
pub const ICMP_TYPE_ECHO_REQUEST: u8 = 8;
pub const ICMP_HDR_SIZE: usize = 8;

// UDP Constants
pub const UDP_HDR_SIZE: usize = 8;
// the private reply-port convention layered right after the UDP header
pub const UDP_REPLY_PORT_SIZE: usize = 2;

// LNIC Constants
pub const LNIC_HDR_SIZE: usize = 24;
pub const LNIC_WORD_SIZE: usize = 8;
