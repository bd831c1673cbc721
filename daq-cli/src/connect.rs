//! Opening instrument channels by address

use anyhow::{Context, Result};
use daq_detect::{Address, DeviceRegistry, SerialTransport};
use daq_protocol::Transport;
use daq_scan::InstrumentChannel;
use daq_sim::VirtualArduino;
use tracing::info;

use crate::settings::Settings;

/// Channel over either a serial port or a simulated instrument
pub type Channel = InstrumentChannel<Box<dyn Transport>>;

/// Pick the search string from the command line or the settings
pub fn search_string<'a>(port: Option<&'a str>, settings: &'a Settings) -> Result<&'a str> {
    port.or(settings.default_port.as_deref())
        .context("no instrument given; pass --port or set default_port in the settings file")
}

/// Resolve `search` against the registry and open a channel to it
pub fn open(search: &str, settings: &Settings) -> Result<Channel> {
    let registry = settings.registry();
    let address = registry
        .resolve(search)
        .with_context(|| format!("cannot select an instrument for \"{}\"", search))?;
    open_address(address, settings)
}

/// Open a channel to a known address
pub fn open_address(address: Address, settings: &Settings) -> Result<Channel> {
    let transport: Box<dyn Transport> = match address.virtual_name() {
        Some(name) => {
            let config = settings.virtual_instrument(name).with_context(|| {
                format!("no simulated instrument {:?} in the settings file", name)
            })?;
            info!("Opening simulated instrument {}", name);
            Box::new(VirtualArduino::from_config(config.clone()))
        }
        None => {
            info!("Opening serial port {}", address);
            let port = SerialTransport::open(&address, &settings.serial_config())
                .with_context(|| format!("failed to open {}", address))?;
            Box::new(port)
        }
    };

    Ok(InstrumentChannel::new(address, transport))
}
