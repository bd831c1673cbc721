//! Integration tests for the scan engine
//!
//! These tests run complete sweeps against the simulated instrument:
//! - Result shape and ordering for arbitrary valid ranges
//! - The de-energize step after success and after failures
//! - Physical plausibility of the reduced I-U curve
//! - Channel release on drop and after a lost connection

use daq_detect::{Address, DeviceRegistry, StaticRegistry};
use daq_protocol::{Command, Transport};
use daq_scan::{scan, scan_with_progress, ErrorKind, InstrumentChannel, ScanParams};
use daq_sim::VirtualArduino;

// ============================================================================
// Helper Functions
// ============================================================================

mod helpers {
    use super::*;

    /// Open a channel to a simulated instrument
    pub fn sim_channel(noise_lsb: u16) -> InstrumentChannel<VirtualArduino> {
        let mut device = VirtualArduino::new("bench");
        device.set_noise(noise_lsb);
        InstrumentChannel::new(Address::virtual_instrument("bench"), device)
    }

    /// Last output value the instrument was told to use
    pub fn last_set_output(device: &VirtualArduino) -> Option<u16> {
        device.history().iter().rev().find_map(|c| match c {
            Command::SetOutput(v) => Some(*v),
            _ => None,
        })
    }
}

// ============================================================================
// Sweep Tests
// ============================================================================

mod sweep_tests {
    use super::*;

    #[test]
    fn full_range_scan() {
        let mut channel = helpers::sim_channel(1);
        let result = scan(&mut channel, 0, 1023, 2).unwrap();

        assert_eq!(result.len(), 1024);
        assert_eq!(result.points()[0].output, 0);
        assert_eq!(result.points()[1023].output, 1023);
        assert_eq!(channel.transport().output(), 0);
    }

    #[test]
    fn curve_is_physically_plausible() {
        let mut channel = helpers::sim_channel(0);
        let result = scan(&mut channel, 0, 1023, 1).unwrap();

        // No current and no diode voltage with the output off
        let first = result.points()[0];
        assert_eq!(first.current, 0.0);
        assert_eq!(first.voltage, 0.0);

        // Several mA at full scale with the diode near its forward voltage
        let last = result.points()[1023];
        assert!(last.current > 5e-3 && last.current < 8e-3);
        assert!(last.voltage > 1.6 && last.voltage < 2.0);

        // Current never falls by more than one ADC step as the output rises
        let step = 3.3 / 1023.0 / 220.0;
        for pair in result.points().windows(2) {
            assert!(pair[1].current >= pair[0].current - step - 1e-12);
        }
    }

    #[test]
    fn noise_shows_up_as_uncertainty() {
        let mut channel = helpers::sim_channel(4);
        let result = scan(&mut channel, 900, 910, 10).unwrap();

        assert!(result.iter().any(|p| p.voltage_sem > 0.0));
        assert!(result.iter().any(|p| p.current_sem > 0.0));
    }

    #[test]
    fn progress_counts_every_step() {
        let mut channel = helpers::sim_channel(1);
        let mut last = (0, 0);
        let mut calls = 0;
        let mut reporter = |step: usize, total: usize| {
            calls += 1;
            last = (step, total);
        };

        scan_with_progress(&mut channel, ScanParams::new(10, 59, 1), &mut reporter).unwrap();

        assert_eq!(calls, 50);
        assert_eq!(last, (50, 50));
    }

    #[test]
    fn boxed_transport_scans() {
        let device: Box<dyn Transport> = Box::new(VirtualArduino::new("boxed"));
        let mut channel = InstrumentChannel::new(Address::virtual_instrument("boxed"), device);

        assert_eq!(
            channel.identify().unwrap(),
            "Arduino VISA firmware v1.1.0"
        );
        assert_eq!(scan(&mut channel, 0, 9, 1).unwrap().len(), 10);
        assert_eq!(channel.get_output().unwrap(), 0);
    }
}

// ============================================================================
// Failure Tests
// ============================================================================

mod failure_tests {
    use super::*;

    #[test]
    fn disconnect_mid_scan_aborts() {
        let mut device = VirtualArduino::new("flaky");
        device.disconnect_after(25);
        let mut channel = InstrumentChannel::new(Address::virtual_instrument("flaky"), device);

        let err = scan(&mut channel, 0, 100, 3).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConnectionLost);
        assert!(!channel.is_open());
        assert!(!channel.transport().is_connected());
    }

    #[test]
    fn rejected_parameters_leave_instrument_untouched() {
        let mut channel = helpers::sim_channel(0);

        assert_eq!(
            scan(&mut channel, 500, 400, 3).unwrap_err().kind(),
            ErrorKind::InvalidScanRange
        );
        assert_eq!(
            scan(&mut channel, 0, 10, 0).unwrap_err().kind(),
            ErrorKind::InvalidRepeatCount
        );
        assert!(channel.transport().history().is_empty());
    }

    #[test]
    fn resolved_address_opens_channel() {
        let registry = StaticRegistry::new(["VSIM:bench", "/dev/ttyACM0"]);
        let address = registry.resolve("VSIM").unwrap();

        let mut channel = InstrumentChannel::new(address, VirtualArduino::new("bench"));
        assert!(channel.is_open());
        assert_eq!(channel.address().virtual_name(), Some("bench"));

        channel.close();
        assert!(!channel.is_open());
        assert!(!channel.transport().is_connected());
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

mod proptest_tests {
    use super::*;
    use proptest::prelude::*;

    fn valid_range() -> impl Strategy<Value = (i32, i32)> {
        (0i32..=1023).prop_flat_map(|start| (Just(start), start..=(start + 40).min(1023)))
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn length_matches_range((start, stop) in valid_range(), repeats in 1usize..4) {
            let mut channel = helpers::sim_channel(2);
            let result = scan(&mut channel, start, stop, repeats).unwrap();
            prop_assert_eq!(result.len(), (stop - start + 1) as usize);
        }

        #[test]
        fn output_zeroed_or_channel_lost(
            (start, stop) in valid_range(),
            fail_after in 0usize..60,
        ) {
            let mut device = VirtualArduino::new("flaky");
            device.set_noise(0);
            device.disconnect_after(fail_after);
            let mut channel = InstrumentChannel::new(Address::virtual_instrument("flaky"), device);

            match scan(&mut channel, start, stop, 1) {
                Ok(result) => {
                    prop_assert_eq!(result.len(), (stop - start + 1) as usize);
                    prop_assert_eq!(helpers::last_set_output(channel.transport()), Some(0));
                    prop_assert_eq!(channel.transport().output(), 0);
                }
                Err(e) => {
                    prop_assert_eq!(e.kind(), ErrorKind::ConnectionLost);
                    prop_assert!(!channel.is_open());
                }
            }
        }
    }
}
