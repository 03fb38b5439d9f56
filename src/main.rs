//! Panel firmware main entry point.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  Adapters: GpioInterruptLines · MonotonicClock · LogSink     │
//! │  ───────────────── listener / bus boundary ───────────────── │
//! │  InputPortManager ──▶ EventRecorder ──▶ event loop           │
//! │  OutputPortManager                                           │
//! │  ─────────────────────── I2cDriver ───────────────────────── │
//! │  PCA9555 × N (inputs)          PCA9685 × M (outputs)         │
//! └──────────────────────────────────────────────────────────────┘
//! ```

use anyhow::{Result, anyhow};
use esp_idf_hal::i2c::{I2cConfig, I2cDriver};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_hal::units::Hertz;
use log::{info, warn};

use panelio::adapters::hardware::GpioInterruptLines;
use panelio::adapters::log_sink::LogSink;
use panelio::adapters::time::MonotonicClock;
use panelio::app::events::{EventRecorder, PanelEvent};
use panelio::diagnostics::PanelHealth;
use panelio::inputs::InputPortManager;
use panelio::outputs::OutputPortManager;
use panelio::profiles;

/// Board revision this image is built for.
const PRODUCT_ID: u32 = 0x3232_2505;

const I2C_BAUDRATE_HZ: u32 = 100_000;
const POLL_INTERVAL_MS: u64 = 10;
const HEALTH_LOG_INTERVAL_MS: u64 = 60_000;

fn main() -> Result<()> {
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  panelio v{}                        ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    let profile = profiles::for_product(PRODUCT_ID)
        .ok_or_else(|| anyhow!("no built-in profile for product 0x{PRODUCT_ID:08x}"))?;

    // ── 1. Bus ────────────────────────────────────────────────
    let peripherals = Peripherals::take()?;
    let mut bus = I2cDriver::new(
        peripherals.i2c0,
        peripherals.pins.gpio21,
        peripherals.pins.gpio22,
        &I2cConfig::new().baudrate(Hertz(I2C_BAUDRATE_HZ)),
    )?;

    // ── 2. Port managers ──────────────────────────────────────
    let mut inputs = InputPortManager::new(
        profile.inputs,
        profile.debounce,
        GpioInterruptLines::new(),
        EventRecorder::new(),
    );
    let mut outputs = OutputPortManager::new(profile.outputs, LogSink::new());

    if let Err(e) = inputs.begin(&mut bus) {
        warn!("Inputs disabled: {e}");
    }
    if let Err(e) = outputs.begin(&mut bus) {
        warn!("Outputs disabled: {e}");
    }

    let health = PanelHealth::collect(&inputs, &outputs);
    info!("Health: {}", health.to_json()?);

    // ── 3. Event loop ─────────────────────────────────────────
    let clock = MonotonicClock::new();
    let mut last_health_ms = clock.uptime_ms();
    info!("System ready. Entering event loop.");

    loop {
        let now = clock.uptime_ms();
        inputs.poll(&mut bus, now);

        inputs.listener_mut().drain(|event| match event {
            PanelEvent::Port { port, long_press } => {
                // Downstream consumers (event log, display, network) hook in here.
                info!("Input {port} {}", if long_press { "held" } else { "pressed" });
            }
            PanelEvent::DeviceFault { address, reason } => {
                warn!("Input device 0x{address:02x} lost: {reason}");
            }
        });

        if now.saturating_sub(last_health_ms) >= HEALTH_LOG_INTERVAL_MS {
            last_health_ms = now;
            let health = PanelHealth::collect(&inputs, &outputs);
            if health.is_degraded() {
                warn!("Health: {} devices offline", health.offline_count());
            }
            info!("Health: {}", health.to_json()?);
        }

        esp_idf_hal::delay::FreeRtos::delay_ms(POLL_INTERVAL_MS as u32);
    }
}
