#![no_std]
#![no_main]

use core::cell::Cell;

use embassy_executor::Spawner;
use embassy_sync::blocking_mutex::{Mutex, raw::CriticalSectionRawMutex};
use embassy_time::{Duration, Instant, Timer};

use esp_backtrace as _;
use esp_hal::{
    clock::CpuClock,
    gpio::{Level, Output, OutputConfig},
    timer::timg::TimerGroup,
};
use log::info;

use octolamp::LampController;
use octolamp::config::{GPIO, LAMP};
use octolamp::infrastructure::adapters::bind_edge_inputs;
use octolamp::infrastructure::drivers::{GpioInputLine, GpioOutputBlock};
use octolamp::infrastructure::services::SessionChannelHost;
use octolamp::infrastructure::tasks::run_edge_workers;

esp_bootloader_esp_idf::esp_app_desc!();

type Lamp = LampController<GpioOutputBlock, GpioInputLine, SessionChannelHost>;

/// Controller reference for the interrupt-context top-halves
static LAMP_REF: Mutex<CriticalSectionRawMutex, Cell<Option<&'static Lamp>>> =
    Mutex::new(Cell::new(None));

fn on_detection_edge(now: Instant) {
    if let Some(lamp) = LAMP_REF.lock(Cell::get) {
        lamp.on_detection_edge(now);
    }
}

fn on_removal_edge(now: Instant) {
    if let Some(lamp) = LAMP_REF.lock(Cell::get) {
        lamp.on_removal_edge(now);
    }
}

#[esp_rtos::main]
async fn main(spawner: Spawner) -> ! {
    esp_println::logger::init_logger_from_env();

    // Initialize hardware
    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(config);

    // Start rtos
    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    // Route the lamp lines through the GPIO matrix. The register driver
    // toggles them from here on, the pins only have to stay claimed.
    let (line_a, line_b, line_c) = octolamp::lamp_gpios!(peripherals);
    let _lines = [
        Output::new(line_a, Level::Low, OutputConfig::default()),
        Output::new(line_b, Level::Low, OutputConfig::default()),
        Output::new(line_c, Level::Low, OutputConfig::default()),
    ];

    // SAFETY: GPIO.register_base is the ESP32 GPIO block, mapped for the
    // whole program lifetime
    let registers = unsafe { GpioOutputBlock::map(GPIO.register_base, GPIO.lines) }
        .expect("GPIO register block must be mappable");
    let sense = unsafe { GpioInputLine::map(GPIO.register_base, GPIO.detection_pin) }
        .expect("detection line must be readable");

    let lamp: &'static Lamp = octolamp::mk_static!(
        Lamp,
        LampController::new(
            LAMP,
            registers,
            sense,
            SessionChannelHost::new("octolamp"),
            Instant::now(),
        )
    );
    LAMP_REF.lock(|cell| cell.set(Some(lamp)));

    bind_edge_inputs(
        peripherals.IO_MUX,
        octolamp::detection_gpio!(peripherals),
        octolamp::removal_gpio!(peripherals),
        on_detection_edge,
        on_removal_edge,
    );
    spawner.spawn(edge_worker_task(lamp)).ok();
    info!("firmware: lamp controller running");

    loop {
        Timer::after(Duration::from_secs(5)).await;
    }
}

#[embassy_executor::task]
async fn edge_worker_task(lamp: &'static Lamp) {
    run_edge_workers(lamp).await;
}
