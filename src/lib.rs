//! # rpingd library
//!
//! `rpingd` answers ARP requests and ICMP echo requests directly at the
//! Ethernet layer, rewriting each received frame in place inside a single
//! fixed buffer, and decodes UDP/LNIC diagnostic messages.

// libc
extern crate libc;

// byteorder
extern crate byteorder;

// itertools
extern crate itertools;

// serde
extern crate serde;
#[macro_use]
extern crate serde_derive;
extern crate toml;

// chrono
extern crate chrono;

// daemonize
extern crate daemonize;
use daemonize::Daemonize;

// generic constants
pub mod constants;
use constants::*;

// checksums
pub mod checksums;

// debug
pub mod debug;
use debug::{print_debug, Verbose};

// header codecs
pub mod frames;

// frame responder
pub mod responder;
use responder::{Outcome, Responder};

// network device
pub mod device;
use device::{NicDevice, PacketSocket};

// operating systems support
pub mod os;

// config
pub mod config;
use config::{decode_config, CConfig};

// std
use std::fs::File;
use std::io;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Library Config Structure
///
/// Includes library configuration parameters
pub struct Config {
    iface: Option<String>,
    mode: u8,
    conf: Option<String>,
    debug: Option<u8>,
}

// Config Implementation
impl Config {
    // new() method
    pub fn new(iface: Option<String>, mode: u8, conf: Option<String>, debug: Option<u8>) -> Config {
        Config {
            iface,
            mode,
            conf,
            debug,
        }
    }
    // iface() getter
    pub fn iface(&self) -> String {
        match &self.iface {
            Some(s) => s.clone(),
            None => String::new(),
        }
    }
    // mode() getter
    pub fn mode(&self) -> &u8 {
        &self.mode
    }
    // conf() getter
    pub fn conf(&self) -> String {
        match &self.conf {
            Some(s) => s.clone(),
            // default configuration file path
            None => RPINGD_DFLT_CFG_FILE.to_string(),
        }
    }
    // debug() getter
    pub fn debug(&self) -> Option<u8> {
        self.debug
    }
}

// run_responder() function
/// Answer ARP requests and ICMP echo requests on one interface
///
/// Library entry point for the frame responder
pub fn run_responder(cfg: &Config, shutdown: Arc<AtomicBool>) -> io::Result<()> {
    // read the configuration file when one is present
    let config = if Path::new(&cfg.conf()).exists() {
        decode_config(cfg.conf())
    } else {
        CConfig::default()
    };

    // read debugging level from Config first
    let debug_level = match cfg.debug() {
        Some(v) => v,
        // if None, then read debug level from configuration file
        None => config.debug(),
    };

    // initialize 'debug' variable of type Verbose
    // and pass time format string from configuration file
    let debug: Verbose = Verbose::new(debug_level, config.time_zone(), config.time_format());

    // the interface comes from the command line first, the file second
    let iface = if !cfg.iface().is_empty() {
        cfg.iface()
    } else {
        match config.interface() {
            Some(s) => s,
            None => {
                return Err(io::Error::new(
                    io::ErrorKind::Other,
                    "no interface specified (-i)",
                ));
            }
        }
    };

    // if the mode is 1, then daemonize:
    if *cfg.mode() == 1 {
        // create log files
        let stdout = File::create(config.main_log())?;
        let stderr = File::create(config.error_log())?;
        // initialize the daemon
        let daemon = Daemonize::new()
            .pid_file(config.pid())
            .chown_pid_file(true)
            .working_directory(config.working_dir())
            .user("root")
            .group("root")
            .umask(0o027)
            .stdout(stdout)
            .stderr(stderr);
        // daemonize the process
        match daemon.start() {
            Ok(_) => println!("rpingd (v{}) daemon started", RPINGD_VERSION),
            Err(e) => eprintln!("Error while starting rpingd daemon: {}", e),
        }
    }

    // open the packet socket and hand it to the responder
    let sock = PacketSocket::open(&iface, config.promiscuous(), &debug)?;
    let mut responder = Responder::new(sock);
    print_debug(
        &debug,
        DEBUG_LEVEL_EXTENSIVE,
        DEBUG_SRC_MAIN,
        format!("created responder, state {:?}", responder.state()),
    );

    run_loop(&mut responder, config.fail_fast(), &debug, &shutdown)
}

// run_loop() function
// process frames until shutdown; the fail_fast policy decides whether a
// validation failure ends the loop or only its cycle
fn run_loop<D: NicDevice>(
    responder: &mut Responder<D>,
    fail_fast: bool,
    debug: &Verbose,
    shutdown: &AtomicBool,
) -> io::Result<()> {
    loop {
        // check if global shutdown variable is set
        if shutdown.load(Ordering::Relaxed) {
            println!("Exiting...");
            return Ok(());
        }

        // block on receiving the next frame, then process it
        match responder.process_cycle(debug)? {
            Outcome::Replied(len) => print_debug(
                debug,
                DEBUG_LEVEL_LOW,
                DEBUG_SRC_PACKET,
                format!("replied with {} bytes", len),
            ),
            Outcome::Inspected => {}
            Outcome::Dropped(reason) => {
                print_debug(
                    debug,
                    DEBUG_LEVEL_INFO,
                    DEBUG_SRC_PACKET,
                    format!("dropped frame: {}", reason),
                );
                if fail_fast {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidData,
                        format!("{}", reason),
                    ));
                }
            }
        }
    }
}

// Tests
#[cfg(test)]
mod tests {
    use super::*;
    use crate::responder::mock::MockNic;

    fn arp_request(oper: u16) -> Vec<u8> {
        let mut frame = Vec::new();
        frame.extend_from_slice(&[0xff; 6]); // ethernet destination: broadcast
        frame.extend_from_slice(&[0xaa; 6]); // ethernet source
        frame.extend_from_slice(&ETHER_P_ARP.to_be_bytes());
        frame.extend_from_slice(&ARP_HW_TYPE_ETHER.to_be_bytes());
        frame.extend_from_slice(&ETHER_P_IP.to_be_bytes());
        frame.push(ARP_HW_ADDR_LEN);
        frame.push(ARP_PROTO_ADDR_LEN);
        frame.extend_from_slice(&oper.to_be_bytes());
        frame.extend_from_slice(&[0xaa; 6]);
        frame.extend_from_slice(&[10, 0, 0, 5]);
        frame.extend_from_slice(&[0u8; 6]);
        frame.extend_from_slice(&[10, 0, 0, 1]);
        frame
    }

    #[test]
    fn loop_continues_past_bad_frames_by_default() {
        // an ARP reply (wrong opcode) then a valid request
        let dev = MockNic::new([2; 6], vec![arp_request(2), arp_request(1)]);
        let mut responder = Responder::new(dev);
        let debug = Verbose::new(DEBUG_LEVEL_INFO, 0, 0);
        let shutdown = AtomicBool::new(false);

        // both frames are consumed, then the drained queue surfaces as a
        // device error
        let err = run_loop(&mut responder, false, &debug, &shutdown).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::WouldBlock);
        assert_eq!(responder.device().tx.len(), 1);
    }

    #[test]
    fn fail_fast_stops_on_the_first_bad_frame() {
        let dev = MockNic::new([2; 6], vec![arp_request(2), arp_request(1)]);
        let mut responder = Responder::new(dev);
        let debug = Verbose::new(DEBUG_LEVEL_INFO, 0, 0);
        let shutdown = AtomicBool::new(false);

        let err = run_loop(&mut responder, true, &debug, &shutdown).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        assert!(responder.device().tx.is_empty());
    }

    #[test]
    fn shutdown_flag_ends_the_loop() {
        let dev = MockNic::new([2; 6], vec![]);
        let mut responder = Responder::new(dev);
        let debug = Verbose::new(DEBUG_LEVEL_INFO, 0, 0);
        let shutdown = AtomicBool::new(true);

        run_loop(&mut responder, false, &debug, &shutdown).unwrap();
    }
}
