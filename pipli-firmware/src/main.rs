//! Pipli - Medication Reminder Firmware
//!
//! Main firmware binary for RP2040-based reminder boards. Receives a dosing
//! schedule over a BLE-UART bridge, buzzes when a dose is due, records the
//! button response and reports back to the companion app.

#![no_std]
#![no_main]

extern crate alloc;

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::Pull;
use embassy_rp::peripherals::UART0;
use embassy_rp::uart::{BufferedInterruptHandler, BufferedUart, Config as UartConfig};
use embassy_time::Delay;
use embedded_alloc::LlffHeap as Heap;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use pipli_core::{Devices, Reminder};
use pipli_hal_rp2040::clock::EmbassyClock;
use pipli_hal_rp2040::flash::Rp2040FlashStorage;
use pipli_hal_rp2040::gpio::{Rp2040Input, Rp2040Output};
use pipli_hal_rp2040::link::BleUartLink;
use pipli_hal_rp2040::FlashStorageTrait;

use crate::channels::LINK_UP;

// Heap for schedule documents, JSON payloads and reports
#[global_allocator]
static HEAP: Heap = Heap::empty();

// Heap size: 48KB
const HEAP_SIZE: usize = 48 * 1024;

mod channels;
mod config;
mod tasks;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
});

// Static cells for UART buffers (must live forever)
static TX_BUF: StaticCell<[u8; 256]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 512]> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Pipli firmware starting...");

    init_heap();

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let config = config::load_config();

    // Storage partition must be usable before anything else runs
    let mut storage = Rp2040FlashStorage::new(p.FLASH, p.DMA_CH0);
    init_storage(&mut storage);
    info!("Flash storage ready");

    // BLE-UART bridge on UART0 (GP0 TX, GP1 RX), 115200 baud default
    let tx_buf = TX_BUF.init([0u8; 256]);
    let rx_buf = RX_BUF.init([0u8; 512]);
    let uart = BufferedUart::new(
        p.UART0,
        p.PIN_0,
        p.PIN_1,
        Irqs,
        tx_buf,
        rx_buf,
        UartConfig::default(),
    );
    let (tx, rx) = uart.split();
    info!("UART initialized for BLE bridge");

    // Board pins (Pico):
    // GP14 button (pull-down, pressed = high), GP15 motor driver,
    // GP16 bridge STATE, GP25 status LED
    let button = Rp2040Input::new(p.PIN_14, Pull::Down);
    let motor = Rp2040Output::new(p.PIN_15);
    let link_state = Rp2040Input::new(p.PIN_16, Pull::Down);
    let led = Rp2040Output::new(p.PIN_25);

    let tick_ms = config.reminder.tick_ms;
    let idle_gap_ms = config.link.idle_gap_ms;

    let devices = Devices {
        clock: EmbassyClock,
        storage,
        actuator: motor,
        button,
        transport: BleUartLink::new(tx, &LINK_UP),
        delay: Delay,
    };
    let reminder = Reminder::start(config, devices);
    info!("Reminder started in {:?}", reminder.state());

    // Spawn tasks
    spawner.spawn(tasks::led_task(led)).unwrap();
    spawner.spawn(tasks::link_state_task(link_state)).unwrap();
    spawner.spawn(tasks::link_rx_task(rx, idle_gap_ms)).unwrap();
    spawner.spawn(tasks::controller_task(reminder)).unwrap();
    spawner.spawn(tasks::tick_task(tick_ms)).unwrap();

    info!("All tasks spawned, firmware running");

    loop {
        embassy_time::Timer::after_secs(60).await;
        trace!("Main loop heartbeat");
    }
}

/// Initialize the heap allocator
fn init_heap() {
    use core::mem::MaybeUninit;
    static mut HEAP_MEM: [MaybeUninit<u8>; HEAP_SIZE] = [MaybeUninit::uninit(); HEAP_SIZE];
    #[allow(static_mut_refs)]
    unsafe {
        HEAP.init(HEAP_MEM.as_ptr() as usize, HEAP_SIZE)
    }
}

/// Make sure the storage partition can be read
///
/// A partition sequential-storage cannot parse (fresh chip, or left over
/// from other firmware) is erased once. If it still fails the device halts.
fn init_storage(storage: &mut Rp2040FlashStorage<'static>) {
    if storage.probe().is_ok() {
        return;
    }

    warn!("Storage partition unreadable, erasing");
    if let Err(e) = storage.erase_all() {
        defmt::panic!("Storage erase failed: {:?}", e);
    }
    if let Err(e) = storage.probe() {
        defmt::panic!("Storage unusable after erase: {:?}", e);
    }
}
